//! Errors raised while loading, configuring or filtering a stimulus graph.

use thiserror::Error;

/// Errors reported to the caller of the filtering and configuration layer.
///
/// Nothing here is fatal to the page: the home route renders these through an
/// `ErrorBoundary`.
#[derive(Debug, Error)]
pub enum FilterError {
	/// Malformed graph shape or an out-of-range parameter.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The dataset is not valid JSON, or lacks `nodes`/`links`.
	#[error("invalid input: {0}")]
	Json(#[from] serde_json::Error),
}

impl FilterError {
	pub(crate) fn invalid(msg: impl Into<String>) -> Self {
		Self::InvalidInput(msg.into())
	}
}
