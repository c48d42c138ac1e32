mod attachments;
mod products;
