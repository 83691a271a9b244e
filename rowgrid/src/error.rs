use thiserror::Error;

/// Invariant violations treated as unrecoverable programmer errors.
///
/// Neither variant is a retryable runtime state: `ViewportUnbound` means an
/// operation that needs a mounted scroll container ran before
/// [`setup`](crate::RowGrid::setup), and `MissingRowElement` means the pool
/// and the render surface fell out of sync.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The named operation requires a bound render surface.
    #[error("viewport not bound; `setup` must complete before `{0}`")]
    ViewportUnbound(&'static str),
    /// A handle reached the paint pass without its materialized element.
    #[error("row handle for index {index} has no materialized element")]
    MissingRowElement { index: usize },
}
