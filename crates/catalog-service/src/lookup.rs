use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::{IdLookup, Product, Tenant};
use catalog_db::ProductStore;
use tracing::debug;

use crate::{ProductLookup, ServiceError};

/// `ProductLookup` over a `ProductStore`, honouring both id schemes.
pub struct DbProductLookup {
    products: Arc<dyn ProductStore>,
}

impl DbProductLookup {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductLookup for DbProductLookup {
    async fn resolve(&self, id: &str, tenant: &Tenant) -> Result<Product, ServiceError> {
        let not_found = || ServiceError::NotFound(format!("product {id}"));
        let product = match IdLookup::parse(id) {
            IdLookup::ByPrimaryKey(pk) => {
                let pk = i64::try_from(pk).map_err(|_| not_found())?;
                self.products.get_product(pk).await?
            }
            IdLookup::ByReferenceCode(code) => self
                .products
                .fetch_product_by_reference_code(tenant.id, &code)
                .await?
                .ok_or_else(not_found)?,
        };
        if product.tenant_id != tenant.id {
            debug!(product = product.id, tenant = tenant.id, "product belongs to another tenant");
            return Err(not_found());
        }
        Ok(product)
    }
}
