use std::path::PathBuf;
use std::sync::Arc;

use catalog_core::attachment::{
    AttachmentDto, AttachmentFilter, AttachmentKind, AttachmentRecord, UpsertAttachment,
    WorkflowStatus,
};
use catalog_core::merge::{merge, AttachmentPatch, DefaultPolicy};
use catalog_core::pagination::{CollectionDto, Pagination};
use catalog_core::{IdLookup, Tenant};
use catalog_db::{AttachmentStore, ProductStore};
use catalog_store::{unique_file_name, FileStore, TempScope};
use tracing::{debug, info};

use crate::files::FileSource;
use crate::lookup::DbProductLookup;
use crate::translate::{DefaultLocalization, DtoTranslator};
use crate::{LocalizationHelper, ProductLookup, ServiceError, Translator};

/// Orchestrates reads and writes of product attachments.
///
/// Ids accepted by the public methods are either primary keys or external
/// reference codes. All collaborators are injected.
pub struct AttachmentHelper {
    attachments: Arc<dyn AttachmentStore>,
    files: Arc<dyn FileStore>,
    products: Arc<dyn ProductLookup>,
    translator: Arc<dyn Translator>,
    localization: Arc<dyn LocalizationHelper>,
    src_root: Option<PathBuf>,
}

impl AttachmentHelper {
    pub fn new(
        attachments: Arc<dyn AttachmentStore>,
        files: Arc<dyn FileStore>,
        products: Arc<dyn ProductLookup>,
        translator: Arc<dyn Translator>,
        localization: Arc<dyn LocalizationHelper>,
    ) -> Self {
        Self {
            attachments,
            files,
            products,
            translator,
            localization,
            src_root: None,
        }
    }

    /// Only read `src` files that live below `root`.
    pub fn with_src_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.src_root = Some(root.into());
        self
    }

    /// Wire the default lookup, translator and localization around one
    /// database that stores both products and attachments.
    pub fn with_defaults<D>(db: Arc<D>, files: Arc<dyn FileStore>) -> Self
    where
        D: AttachmentStore + ProductStore + 'static,
    {
        let products: Arc<dyn ProductStore> = db.clone();
        Self::new(
            db,
            files.clone(),
            Arc::new(DbProductLookup::new(products)),
            Arc::new(DtoTranslator::new(files)),
            Arc::new(DefaultLocalization),
        )
    }

    pub async fn resolve_by_id(
        &self,
        id: &str,
        tenant: &Tenant,
    ) -> Result<AttachmentRecord, ServiceError> {
        let not_found = || ServiceError::NotFound(format!("attachment {id}"));
        let record = match IdLookup::parse(id) {
            IdLookup::ByPrimaryKey(pk) => {
                let pk = i64::try_from(pk).map_err(|_| not_found())?;
                self.attachments.get_attachment(pk).await?
            }
            IdLookup::ByReferenceCode(code) => self
                .attachments
                .fetch_attachment_by_reference_code(tenant.id, &code)
                .await?
                .ok_or_else(not_found)?,
        };
        if record.tenant_id != tenant.id {
            debug!(attachment = record.id, tenant = tenant.id, "attachment belongs to another tenant");
            return Err(not_found());
        }
        Ok(record)
    }

    pub async fn delete_attachment(&self, id: &str, tenant: &Tenant) -> Result<(), ServiceError> {
        let record = self.resolve_by_id(id, tenant).await?;
        self.attachments.delete_attachment(record.id).await?;
        info!(attachment = record.id, "deleted attachment");
        Ok(())
    }

    pub async fn get_attachment(
        &self,
        id: &str,
        tenant: &Tenant,
    ) -> Result<AttachmentDto, ServiceError> {
        let record = self.resolve_by_id(id, tenant).await?;
        self.translator.to_wire(&record).await
    }

    /// One page of approved attachments of `kind` plus the unpaged total.
    pub async fn list(
        &self,
        owner_id: &str,
        kind: AttachmentKind,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> Result<CollectionDto<AttachmentDto>, ServiceError> {
        let product = self.products.resolve(owner_id, tenant).await?;
        let filter = AttachmentFilter {
            owner_type: product.owner_type().to_string(),
            owner_id: product.id,
            kind,
            status: WorkflowStatus::Approved,
        };

        let records = self
            .attachments
            .list_attachments(
                &filter,
                pagination.start_position(),
                pagination.end_position(),
            )
            .await?;
        let total = self.attachments.count_attachments(&filter).await?;

        let mut items = Vec::with_capacity(records.len());
        for record in &records {
            items.push(self.translator.to_wire(record).await?);
        }
        Ok(CollectionDto::new(items, total))
    }

    pub async fn list_attachments(
        &self,
        owner_id: &str,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> Result<CollectionDto<AttachmentDto>, ServiceError> {
        self.list(owner_id, AttachmentKind::Other, tenant, pagination)
            .await
    }

    pub async fn list_images(
        &self,
        owner_id: &str,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> Result<CollectionDto<AttachmentDto>, ServiceError> {
        self.list(owner_id, AttachmentKind::Image, tenant, pagination)
            .await
    }

    /// Replace the fields of an existing attachment.
    ///
    /// Omitted fields keep their stored values, except the dates which
    /// fall back to now and now + 1 month. The DTO must carry a `type`.
    pub async fn update_attachment(
        &self,
        id: &str,
        dto: &AttachmentDto,
        tenant: &Tenant,
    ) -> Result<AttachmentDto, ServiceError> {
        let existing = self.resolve_by_id(id, tenant).await?;
        if dto.kind.is_none() {
            return Err(ServiceError::InvalidInput(
                "attachment type is required".into(),
            ));
        }
        let mut patch = self.patch_from(dto, dto.kind)?;

        let scope = TempScope {
            group_id: existing.group_id,
            user_id: tenant.user_id,
        };
        patch.file_id = self.store_file(dto, scope).await?;

        let fields = merge(Some(&existing), &patch, &DefaultPolicy::for_tenant(tenant))
            .into_fields()?;
        let updated = self
            .attachments
            .update_attachment(existing.id, &fields)
            .await?;
        info!(attachment = updated.id, kind = %updated.kind, "updated attachment");

        self.translator.to_wire(&updated).await
    }

    /// Create or update the attachment of `kind` that `dto`'s reference
    /// code names under the product `owner_id`.
    pub async fn upsert(
        &self,
        owner_id: &str,
        dto: &AttachmentDto,
        kind: AttachmentKind,
        tenant: &Tenant,
    ) -> Result<AttachmentDto, ServiceError> {
        let product = self.products.resolve(owner_id, tenant).await?;
        let mut patch = self.patch_from(dto, Some(kind))?;

        let scope = TempScope {
            group_id: product.group_id,
            user_id: tenant.user_id,
        };
        patch.file_id = self.store_file(dto, scope).await?;

        let fields = merge(None, &patch, &DefaultPolicy::for_tenant(tenant)).into_fields()?;
        let input = UpsertAttachment {
            tenant_id: tenant.id,
            group_id: product.group_id,
            owner_type: product.owner_type().to_string(),
            owner_id: product.id,
            external_reference_code: dto
                .external_reference_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(String::from),
            fields,
        };
        let record = self.attachments.upsert_attachment(&input).await?;
        info!(
            attachment = record.id,
            product = product.id,
            kind = %kind,
            code = %record.external_reference_code,
            "upserted attachment"
        );

        self.translator.to_wire(&record).await
    }

    pub async fn upsert_attachment(
        &self,
        owner_id: &str,
        dto: &AttachmentDto,
        tenant: &Tenant,
    ) -> Result<AttachmentDto, ServiceError> {
        self.upsert(owner_id, dto, AttachmentKind::Other, tenant)
            .await
    }

    pub async fn upsert_image(
        &self,
        owner_id: &str,
        dto: &AttachmentDto,
        tenant: &Tenant,
    ) -> Result<AttachmentDto, ServiceError> {
        self.upsert(owner_id, dto, AttachmentKind::Image, tenant)
            .await
    }

    fn patch_from(
        &self,
        dto: &AttachmentDto,
        kind: Option<AttachmentKind>,
    ) -> Result<AttachmentPatch, ServiceError> {
        let title = dto
            .title
            .as_ref()
            .map(|title| self.localization.to_locale_map(title))
            .transpose()?;
        Ok(AttachmentPatch {
            kind,
            file_id: None,
            display_date: dto.display_date,
            expiration_date: dto.expiration_date,
            never_expire: dto.never_expire,
            title,
            options: dto.options.clone(),
            priority: dto.priority,
        })
    }

    /// Store the file the DTO carries, if any, under a name that is free in
    /// `scope`. Returns the new handle id.
    async fn store_file(
        &self,
        dto: &AttachmentDto,
        scope: TempScope,
    ) -> Result<Option<String>, ServiceError> {
        let Some(source) = FileSource::from_dto(dto, self.src_root.as_deref()).await? else {
            return Ok(None);
        };

        let files = &self.files;
        let file_name = unique_file_name(&source.file_name, move |candidate| async move {
            match files.temp_exists(&scope, &candidate).await {
                Ok(exists) => exists,
                Err(e) => {
                    debug!(file_name = %candidate, error = %e, "temp file existence check failed");
                    false
                }
            }
        })
        .await?;

        let handle = self
            .files
            .store_temp(&scope, &file_name, source.data, &source.content_type)
            .await?;
        info!(file = %handle.id, content_type = %handle.content_type, "stored attachment file");
        Ok(Some(handle.id))
    }
}
