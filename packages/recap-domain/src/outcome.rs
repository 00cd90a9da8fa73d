use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
	Similarity,
	Recency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
	Ok,
	OpenaiKeyMissing,
	NoSimilarityResults,
	RpcFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
	Rpc,
	Rest,
}

/// Terminal retrieval states of a chat request. Each maps to exactly one outcome triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalPath {
	/// Embedding credential absent; recency rows answered locally.
	NoKey,
	/// Similarity RPC returned at least one row.
	Similarity,
	/// Similarity RPC succeeded with zero rows; recency read issued afterwards.
	NoSimilarityResults,
	/// Similarity RPC errored; the search client degraded to recency itself.
	RpcFailed,
}
impl RetrievalPath {
	pub fn mode(self) -> RetrievalMode {
		match self {
			Self::Similarity => RetrievalMode::Similarity,
			Self::NoKey | Self::NoSimilarityResults | Self::RpcFailed => RetrievalMode::Recency,
		}
	}

	pub fn reason(self) -> FallbackReason {
		match self {
			Self::NoKey => FallbackReason::OpenaiKeyMissing,
			Self::Similarity => FallbackReason::Ok,
			Self::NoSimilarityResults => FallbackReason::NoSimilarityResults,
			Self::RpcFailed => FallbackReason::RpcFailed,
		}
	}

	pub fn source(self) -> RetrievalSource {
		match self {
			Self::Similarity => RetrievalSource::Rpc,
			Self::NoKey | Self::NoSimilarityResults | Self::RpcFailed => RetrievalSource::Rest,
		}
	}

	pub fn outcome(self, context_count: usize) -> RetrievalOutcome {
		RetrievalOutcome {
			mode: self.mode(),
			reason: self.reason(),
			source: self.source(),
			context_count,
		}
	}
}

/// How a chat response was produced. Built once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
	pub mode: RetrievalMode,
	pub reason: FallbackReason,
	pub source: RetrievalSource,
	pub context_count: usize,
}
