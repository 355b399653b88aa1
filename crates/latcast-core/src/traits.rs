//! Trait definitions for the collaborators around the prediction engine

use crate::{RawRow, Result};

/// Read-only access to stored benchmark rows.
///
/// Implementations own persistence. The prediction engine only calls these
/// methods and never mutates the source within a prediction call.
pub trait ObservationSource: Send + Sync {
    /// Fetch every raw benchmark row recorded for `model_name`.
    ///
    /// An unknown model is not an error: it yields an empty list.
    fn fetch_rows(&self, model_name: &str) -> Result<Vec<RawRow>>;

    /// List the model names that have at least one row, sorted ascending.
    fn model_names(&self) -> Result<Vec<String>>;
}
