use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::attachment::{AttachmentDto, AttachmentRecord};
use catalog_core::locale::{to_localized_map, LocalizedMap};
use catalog_store::{FileStore, StoreError};
use tracing::warn;

use crate::{LocalizationHelper, ServiceError, Translator};

/// Route prefix under which stored files are downloadable.
pub const DEFAULT_DOWNLOAD_PREFIX: &str = "/api/files";

/// Builds DTOs from records, filling the file fields from the file store.
pub struct DtoTranslator {
    files: Arc<dyn FileStore>,
    download_prefix: String,
}

impl DtoTranslator {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self::with_download_prefix(files, DEFAULT_DOWNLOAD_PREFIX)
    }

    pub fn with_download_prefix(files: Arc<dyn FileStore>, prefix: &str) -> Self {
        Self {
            files,
            download_prefix: prefix.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Translator for DtoTranslator {
    async fn to_wire(&self, record: &AttachmentRecord) -> Result<AttachmentDto, ServiceError> {
        let mut dto = AttachmentDto {
            id: Some(record.id),
            external_reference_code: Some(record.external_reference_code.clone()),
            display_date: Some(record.display_date),
            expiration_date: record.expiration_date,
            never_expire: Some(record.never_expire()),
            title: Some(record.title.clone().into_iter().collect()),
            options: Some(record.options.clone()),
            priority: Some(record.priority),
            kind: Some(record.kind),
            ..Default::default()
        };

        if let Some(file_id) = &record.file_id {
            match self.files.resolve(file_id).await {
                Ok(handle) => {
                    dto.src = Some(format!("{}/{}", self.download_prefix, handle.id));
                    dto.file_name = Some(handle.file_name);
                    dto.content_type = Some(handle.content_type);
                }
                Err(StoreError::NotFound(_)) => {
                    warn!(attachment = record.id, file_id = %file_id, "attachment file is missing");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(dto)
    }
}

/// Accepts `en-US`, `en_us` and friends, keyed as `en_US`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLocalization;

impl LocalizationHelper for DefaultLocalization {
    fn to_locale_map(&self, map: &HashMap<String, String>) -> Result<LocalizedMap, ServiceError> {
        Ok(to_localized_map(map)?)
    }
}
