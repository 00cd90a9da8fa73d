use std::time::Instant;

use recap_domain::ContextSnippet;
use recap_storage::models::UpdateRow;

use crate::RecapService;

/// Result of the similarity step, as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityHits {
	/// The RPC answered (or storage is unconfigured). Rows are in remote rank order; may be empty.
	Ranked(Vec<ContextSnippet>),
	/// The RPC failed and recency rows were substituted.
	Degraded(Vec<ContextSnippet>),
}

impl RecapService {
	/// Similarity search over latest-per-user updates.
	///
	/// An unconfigured store yields an empty ranking. A failed RPC is absorbed here: the
	/// recency read runs in its place and the result is tagged [`SimilarityHits::Degraded`].
	/// Empty rankings are left to the caller.
	pub async fn search_similar(&self, embedding: &[f32], top_k: u32) -> SimilarityHits {
		let started = Instant::now();

		match self.store.match_latest_updates(embedding, top_k).await {
			Ok(rows) => {
				tracing::info!(
					rows = rows.len(),
					dur_ms = started.elapsed().as_millis() as u64,
					"Similarity search completed."
				);

				SimilarityHits::Ranked(into_snippets(rows, top_k, ScoreSource::Remote))
			},
			Err(recap_storage::Error::NotConfigured) => {
				tracing::debug!("Storage is not configured; similarity search skipped.");

				SimilarityHits::Ranked(Vec::new())
			},
			Err(err) => {
				tracing::warn!(
					status = err.status(),
					error = %err,
					"Similarity search failed; falling back to recency."
				);

				SimilarityHits::Degraded(self.recent_updates(top_k).await)
			},
		}
	}

	/// Newest `top_k` latest-per-user updates, most recent first, similarity stamped to `0.0`.
	///
	/// Never fails: storage errors are logged and produce an empty list.
	pub async fn recent_updates(&self, top_k: u32) -> Vec<ContextSnippet> {
		let started = Instant::now();
		let limit = top_k.max(1);

		match self.store.latest_updates(limit).await {
			Ok(rows) => {
				tracing::info!(
					rows = rows.len(),
					dur_ms = started.elapsed().as_millis() as u64,
					"Recency read completed."
				);

				let mut snippets = into_snippets(rows, limit, ScoreSource::Recency);

				snippets.sort_by(|a, b| b.created_at.cmp(&a.created_at));

				snippets
			},
			Err(recap_storage::Error::NotConfigured) => {
				tracing::debug!("Storage is not configured; recency read skipped.");

				Vec::new()
			},
			Err(err) => {
				tracing::error!(status = err.status(), error = %err, "Recency read failed.");

				Vec::new()
			},
		}
	}
}

#[derive(Clone, Copy)]
enum ScoreSource {
	Remote,
	Recency,
}

fn into_snippets(rows: Vec<UpdateRow>, limit: u32, source: ScoreSource) -> Vec<ContextSnippet> {
	rows.into_iter()
		.take(limit as usize)
		.map(|row| {
			let snippet = ContextSnippet {
				id: row.id,
				user_id: row.user_id,
				content: row.content,
				created_at: row.created_at,
				similarity: row.similarity.unwrap_or(0.0),
			};

			match source {
				ScoreSource::Remote => snippet,
				ScoreSource::Recency => snippet.with_recency_score(),
			}
		})
		.collect()
}
