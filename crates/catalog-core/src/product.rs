use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner type discriminator stored on attachments that belong to a product.
pub const PRODUCT_OWNER_TYPE: &str = "product";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub tenant_id: i64,
    pub group_id: i64,
    pub external_reference_code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn owner_type(&self) -> &'static str {
        PRODUCT_OWNER_TYPE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: i64,
    pub group_id: i64,
    #[serde(default)]
    pub external_reference_code: Option<String>,
    pub name: String,
}
