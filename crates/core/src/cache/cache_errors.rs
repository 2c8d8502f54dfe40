use thiserror::Error;

/// Errors raised by cache backends.
///
/// These never fail an estimation; [`super::ResultCache`] logs them and
/// carries on as if the entry were missing.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache payload could not be (de)serialized: {0}")]
    Serialization(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}
