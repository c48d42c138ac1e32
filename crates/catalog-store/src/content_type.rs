pub const OCTET_STREAM: &str = "application/octet-stream";

/// Best-effort content type for an upload.
///
/// Magic bytes win over the file name; a name with an unknown extension and
/// unrecognised content falls back to `application/octet-stream`.
pub fn detect_content_type(file_name: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Base name for inline uploads, which carry no name of their own.
pub fn default_file_name(data: &[u8]) -> String {
    match infer::get(data) {
        Some(kind) => format!("attachment.{}", kind.extension()),
        None => "attachment".to_string(),
    }
}
