mod files;
mod helper;
mod lookup;
mod traits;
mod translate;

pub use files::FileSource;
pub use helper::AttachmentHelper;
pub use lookup::DbProductLookup;
pub use traits::{LocalizationHelper, ProductLookup, ServiceError, Translator};
pub use translate::{DefaultLocalization, DtoTranslator, DEFAULT_DOWNLOAD_PREFIX};
