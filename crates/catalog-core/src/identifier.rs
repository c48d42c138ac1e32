/// Prefix callers may put in front of a reference code to make the intent
/// explicit, e.g. `externalReferenceCode:FRONT-1`.
pub const REFERENCE_CODE_PREFIX: &str = "externalReferenceCode:";

/// How an identifier from the outside world addresses a stored entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdLookup {
    ByPrimaryKey(u64),
    ByReferenceCode(String),
}

impl IdLookup {
    /// Digits-only identifiers that fit in a `u64` are primary keys. Every
    /// other string is an external reference code.
    pub fn parse(id: &str) -> Self {
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(pk) = id.parse::<u64>() {
                return IdLookup::ByPrimaryKey(pk);
            }
        }
        let code = id.strip_prefix(REFERENCE_CODE_PREFIX).unwrap_or(id);
        IdLookup::ByReferenceCode(code.to_string())
    }
}
