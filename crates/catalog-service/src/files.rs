//! Turning the file fields of an incoming DTO into bytes ready for storage.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use bytes::Bytes;
use catalog_core::attachment::AttachmentDto;
use catalog_store::{default_file_name, detect_content_type};
use url::Url;

use crate::ServiceError;

/// New file content supplied with a write.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSource {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl FileSource {
    /// Inline bytes win over `src`. Returns `None` when the DTO carries
    /// neither. With `src_root` set, `src` must point below it.
    pub async fn from_dto(
        dto: &AttachmentDto,
        src_root: Option<&Path>,
    ) -> Result<Option<Self>, ServiceError> {
        if let Some(encoded) = non_blank(dto.attachment.as_deref()) {
            return Self::from_base64(encoded).map(Some);
        }
        if let Some(src) = non_blank(dto.src.as_deref()) {
            return Self::from_file_url(src, src_root).await.map(Some);
        }
        Ok(None)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, ServiceError> {
        let data = B64
            .decode(encoded)
            .map_err(|e| ServiceError::InvalidInput(format!("attachment is not valid base64: {e}")))?;
        let file_name = default_file_name(&data);
        let content_type = detect_content_type(&file_name, &data);
        Ok(Self {
            file_name,
            content_type,
            data: Bytes::from(data),
        })
    }

    pub async fn from_file_url(src: &str, src_root: Option<&Path>) -> Result<Self, ServiceError> {
        let url =
            Url::parse(src).map_err(|e| ServiceError::InvalidInput(format!("src {src}: {e}")))?;
        if url.scheme() != "file" {
            return Err(ServiceError::InvalidInput(format!(
                "src {src}: only file URLs are supported"
            )));
        }
        let path = url
            .to_file_path()
            .map_err(|()| ServiceError::InvalidInput(format!("src {src}: not a local path")))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::InvalidInput(format!("src {src}: no file name")))?;
        if let Some(root) = src_root {
            check_below(src, &path, root).await?;
        }
        let data = tokio::fs::read(&path).await.map_err(|e| {
            ServiceError::InvalidInput(format!("src {src}: cannot read {}: {e}", path.display()))
        })?;
        let content_type = detect_content_type(&file_name, &data);
        Ok(Self {
            file_name,
            content_type,
            data: Bytes::from(data),
        })
    }
}

/// Symlinks and `..` are resolved on both sides before comparing.
async fn check_below(src: &str, path: &Path, root: &Path) -> Result<(), ServiceError> {
    let resolved = tokio::fs::canonicalize(path).await.map_err(|e| {
        ServiceError::InvalidInput(format!("src {src}: cannot read {}: {e}", path.display()))
    })?;
    let root = tokio::fs::canonicalize(root).await.map_err(|e| {
        ServiceError::InvalidInput(format!("src root {}: {e}", root.display()))
    })?;
    if !resolved.starts_with(&root) {
        return Err(ServiceError::InvalidInput(format!(
            "src {src}: outside {}",
            root.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    fn file_url(path: &std::path::Path) -> String {
        Url::from_file_path(path).unwrap().to_string()
    }

    #[tokio::test]
    async fn neither_source_yields_none() {
        assert_eq!(FileSource::from_dto(&AttachmentDto::default(), None).await.unwrap(), None);

        let blank = AttachmentDto {
            attachment: Some("  ".into()),
            src: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(FileSource::from_dto(&blank, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn inline_bytes_are_decoded_and_sniffed() {
        let dto = AttachmentDto {
            attachment: Some(B64.encode(PNG_HEADER)),
            ..Default::default()
        };
        let source = FileSource::from_dto(&dto, None).await.unwrap().unwrap();
        assert_eq!(source.file_name, "attachment.png");
        assert_eq!(source.content_type, "image/png");
        assert_eq!(source.data.as_ref(), PNG_HEADER);
    }

    #[tokio::test]
    async fn bytes_win_over_src() {
        let dto = AttachmentDto {
            attachment: Some(B64.encode(b"inline")),
            src: Some("file:///does/not/exist.txt".into()),
            ..Default::default()
        };
        let source = FileSource::from_dto(&dto, None).await.unwrap().unwrap();
        assert_eq!(source.data.as_ref(), b"inline");
    }

    #[tokio::test]
    async fn bad_base64_is_invalid_input() {
        let dto = AttachmentDto {
            attachment: Some("not base64 !!".into()),
            ..Default::default()
        };
        let err = FileSource::from_dto(&dto, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn src_reads_local_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let dto = AttachmentDto {
            src: Some(file_url(&path)),
            ..Default::default()
        };
        let source = FileSource::from_dto(&dto, None).await.unwrap().unwrap();
        assert_eq!(source.file_name, "notes.txt");
        assert_eq!(source.content_type, "text/plain");
        assert_eq!(source.data.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn bad_src_is_invalid_input() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = file_url(&tmp.path().join("missing.pdf"));

        for src in ["::not a url::", "https://example.com/a.png", missing.as_str()] {
            let err = FileSource::from_file_url(src, None).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "src {src}");
        }
    }

    #[tokio::test]
    async fn src_outside_root_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("ok.txt"), "inside").unwrap();
        std::fs::write(tmp.path().join("secret.txt"), "outside").unwrap();

        let inside = file_url(&root.join("ok.txt"));
        let source = FileSource::from_file_url(&inside, Some(&root)).await.unwrap();
        assert_eq!(source.data.as_ref(), b"inside");

        let escapes = [
            file_url(&tmp.path().join("secret.txt")),
            format!("{}/../secret.txt", file_url(&root)),
        ];
        for src in &escapes {
            let err = FileSource::from_file_url(src, Some(&root)).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "src {src}");
        }
    }
}
