use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One latest-per-user update as handed to the answer step and returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnippet {
	pub id: i64,
	pub user_id: Uuid,
	pub content: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	/// In `[0, 1]` for similarity hits, `0.0` for recency rows.
	#[serde(default)]
	pub similarity: f64,
}
impl ContextSnippet {
	/// Recency rows carry no similarity; stamp the placeholder so both paths share one shape.
	pub fn with_recency_score(mut self) -> Self {
		self.similarity = 0.0;

		self
	}
}
