use std::time::Instant;

use serde::{Deserialize, Serialize};

use recap_domain::{
	ContextSnippet, RetrievalOutcome, RetrievalPath, context,
	gate::{self, RejectCode},
};

use crate::{DependencyStage, Error, RecapService, Result, SimilarityHits};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	pub query: String,
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	pub query: String,
	pub context: Vec<ContextSnippet>,
	pub answer: String,
	pub debug: RetrievalOutcome,
}

/// Retrieval states. `Done` is terminal; an embedding failure leaves the loop as an error.
enum ChatState {
	Start,
	Embedding,
	Similarity { embedding: Vec<f32> },
	Recency { path: RetrievalPath },
	Done { path: RetrievalPath, snippets: Vec<ContextSnippet> },
}

impl RecapService {
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		let top_k = req.top_k.unwrap_or(self.cfg.chat.default_top_k);

		if let Err(code) = gate::chat_gate(&req.query, top_k, &self.cfg.chat) {
			tracing::info!(code = code.as_str(), "Chat request rejected.");

			return Err(reject_to_error(code, &self.cfg.chat));
		}

		let top_k = gate::clamp_top_k(top_k, self.cfg.chat.max_top_k);

		tracing::info!(query_chars = req.query.chars().count(), top_k, "Chat request received.");

		let (path, snippets) = self.retrieve(&req.query, top_k).await?;
		let answer = match path {
			RetrievalPath::NoKey => context::recency_answer(&snippets),
			_ => {
				let started = Instant::now();
				let answer = self.compose_answer(&snippets, &req.query).await?;

				tracing::info!(
					gen_ms = started.elapsed().as_millis() as u64,
					answer_chars = answer.chars().count(),
					"Answer composed."
				);

				answer
			},
		};
		let outcome = path.outcome(snippets.len());

		tracing::info!(
			mode = ?outcome.mode,
			reason = ?outcome.reason,
			source = ?outcome.source,
			context_count = outcome.context_count,
			"Chat request completed."
		);

		Ok(ChatResponse { query: req.query, context: snippets, answer, debug: outcome })
	}

	async fn retrieve(
		&self,
		query: &str,
		top_k: u32,
	) -> Result<(RetrievalPath, Vec<ContextSnippet>)> {
		let mut state = ChatState::Start;

		loop {
			state = match state {
				ChatState::Start =>
					if self.cfg.providers.embedding.api_key.is_none() {
						tracing::warn!("Embedding api_key is not configured; using recency fallback.");

						ChatState::Recency { path: RetrievalPath::NoKey }
					} else {
						ChatState::Embedding
					},
				ChatState::Embedding =>
					ChatState::Similarity { embedding: self.embed_query(query).await? },
				ChatState::Similarity { embedding } =>
					match self.search_similar(&embedding, top_k).await {
						SimilarityHits::Ranked(snippets) if snippets.is_empty() => {
							tracing::info!("Similarity search returned no rows; using recency fallback.");

							ChatState::Recency { path: RetrievalPath::NoSimilarityResults }
						},
						SimilarityHits::Ranked(snippets) =>
							ChatState::Done { path: RetrievalPath::Similarity, snippets },
						SimilarityHits::Degraded(snippets) =>
							ChatState::Done { path: RetrievalPath::RpcFailed, snippets },
					},
				ChatState::Recency { path } =>
					ChatState::Done { path, snippets: self.recent_updates(top_k).await },
				ChatState::Done { path, snippets } => return Ok((path, snippets)),
			};
		}
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let started = Instant::now();
		let embedding = self
			.providers
			.embedding
			.embed(cfg, query)
			.await
			.map_err(|err| Error::dependency(DependencyStage::Embedding, err))?;

		if embedding.is_empty() {
			return Err(Error::Dependency {
				stage: DependencyStage::Embedding,
				message: "Embedding provider returned an empty vector.".to_string(),
			});
		}

		tracing::info!(
			model = %cfg.model,
			dur_ms = started.elapsed().as_millis() as u64,
			dims = embedding.len(),
			"Query embedded."
		);

		Ok(embedding)
	}
}

fn reject_to_error(code: RejectCode, cfg: &recap_config::Chat) -> Error {
	match code {
		RejectCode::RejectEmpty => Error::invalid("query", "query must be non-empty."),
		RejectCode::RejectTooLong => Error::invalid(
			"query",
			format!("query must be at most {} characters.", cfg.max_query_chars),
		),
		RejectCode::RejectTopKOutOfRange =>
			Error::invalid("top_k", format!("top_k must be in the range 1-{}.", cfg.max_top_k)),
	}
}
