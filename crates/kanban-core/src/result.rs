use crate::api_error::NormalizedError;
use crate::error::KanbanError;

pub type KanbanResult<T> = Result<T, KanbanError>;

/// Outcome of a single remote round trip.
pub type ApiResult<T> = Result<T, NormalizedError>;
