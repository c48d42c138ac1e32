pub mod attachment;
pub mod dates;
pub mod error;
pub mod identifier;
pub mod locale;
pub mod merge;
pub mod pagination;
pub mod product;
pub mod tenant;

pub use attachment::{AttachmentDto, AttachmentKind, AttachmentRecord, WorkflowStatus};
pub use error::CatalogError;
pub use identifier::IdLookup;
pub use product::Product;
pub use tenant::Tenant;
