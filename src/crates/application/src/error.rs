use domain::catalog::CatalogError;
use domain::grouping::GroupingError;
use domain::lookup::LookupError;
use domain::queue::QueueError;
use domain::random_pool::RandomPoolError;
use model::ModelError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity or item absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed candidate; handled inside the advancement loop and only
    /// surfaced when every source has been exhausted.
    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    /// Duration/age-restriction lookup errored. Treated as a validity
    /// failure: the candidate is discarded, not retried.
    #[error("External lookup failed: {0}")]
    ExternalLookupFailure(String),

    /// Durable write failed; the operation aborted with state unchanged.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Queue empty and no fallback tier produced a playable item.
    #[error("No playable item: queue and fallback sources are exhausted")]
    ExhaustedFallback,

    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),
    #[error("Grouping error: {0}")]
    GroupingError(#[from] GroupingError),
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),
    #[error("Lookup error: {0}")]
    LookupError(#[from] LookupError),
    #[error("Random pool error: {0}")]
    RandomPoolError(#[from] RandomPoolError),
    #[error("Model error: {0}")]
    ModelError(#[from] ModelError),
}
