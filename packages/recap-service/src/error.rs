use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which generation-path call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStage {
	Embedding,
	Completion,
}
impl fmt::Display for DependencyStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Embedding => f.write_str("embedding failure"),
			Self::Completion => f.write_str("completion failure"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, fields: Vec<String> },
	#[error("Dependency error ({stage}): {message}")]
	Dependency { stage: DependencyStage, message: String },
	#[error("Storage is not configured.")]
	StorageUnconfigured,
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), fields: vec![field.to_string()] }
	}

	pub(crate) fn dependency(stage: DependencyStage, err: recap_providers::Error) -> Self {
		Self::Dependency { stage, message: err.to_string() }
	}
}

impl From<recap_storage::Error> for Error {
	fn from(err: recap_storage::Error) -> Self {
		match err {
			recap_storage::Error::NotConfigured => Self::StorageUnconfigured,
			other => Self::Storage { message: other.to_string() },
		}
	}
}
