//! Error taxonomy for the cross-match and merge engine.
//!
//! Mirrors the propagation policy of the original scenario executor: a
//! primary-seed fetch failure aborts the whole scenario, while a secondary
//! entry's failure is recorded and execution continues with the current
//! working list.

use thiserror::Error;

use crate::property::MetaId;

//tp Error
/// Errors produced by the cross-match and merge engine
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed geometry, unknown band, negative radius, ...
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A scenario entry referenced a catalog that has no registered client
    #[error("unknown catalog: {0}")]
    UnknownCatalog(String),

    /// Surfaced from a [`crate::external::CatalogClient`]; the scenario decides
    /// whether to continue (secondary catalogs) or abort (primary seed)
    #[error("fetch failed for catalog {catalog}: {reason}")]
    FetchFailure { catalog: String, reason: String },

    /// Required coordinates missing on an incoming star; the row is skipped
    #[error("row missing required data: {0}")]
    BadData(String),

    /// Invariant violated, e.g. RA/DEC cleared while the star was indexed
    #[error("index corruption: {0}")]
    IndexCorruption(String),

    /// Cooperative cancellation observed between scenario steps
    #[error("scenario cancelled")]
    Cancelled,

    /// A property access failed because the value was never set
    #[error("property {0:?} not set")]
    PropertyNotSet(MetaId),

    /// A property id used in configuration did not resolve in the registry
    #[error("unknown property id: {0}")]
    UnknownPropertyId(String),

    /// Criteria-list construction error (e.g. missing mandatory radius criterion)
    #[error("invalid criteria list: {0}")]
    InvalidCriteria(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
