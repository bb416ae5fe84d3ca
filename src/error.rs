//! Error types for loading the page configuration and the diagram.

/// Why a diagram could not be shown.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
	/// The endpoint answered with a non-2xx status.
	#[error("Diagram file not found ({status})")]
	NotFound { status: u16 },

	/// The request itself failed.
	#[error("Network error while fetching the diagram: {0}")]
	Network(String),

	/// No response within the configured timeout.
	#[error("Diagram request timed out after {0} ms")]
	TimedOut(u32),

	/// The inserted markup has nothing to draw.
	#[error("No <svg> element found in the diagram")]
	MissingRoot,
}

/// The page-supplied configuration could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid cartography config: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Cartography config is not serializable")]
	Unserializable,
}
