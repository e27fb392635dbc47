use thiserror::Error;

pub type Result<T> = core::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing datastore could not complete the request. Nothing was applied.
    #[error("datastore unavailable: {0}")]
    Datastore(#[from] tokio_postgres::Error),
    /// A stored counter could not be read back as an unsigned 64-bit integer.
    #[error("stored value {0:?} is not a valid u64")]
    Corrupt(Box<str>),
}

impl StoreError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Datastore(_))
    }
}
