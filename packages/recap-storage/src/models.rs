use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Row shape shared by the similarity RPC, the latest-per-user view and the updates table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRow {
	/// Bigint primary key of the updates table.
	pub id: i64,
	pub user_id: Uuid,
	pub content: String,
	#[serde(with = "recap_domain::time_serde")]
	pub created_at: OffsetDateTime,
	/// Present only on similarity RPC rows.
	#[serde(default)]
	pub similarity: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUpdate<'a> {
	pub user_id: Uuid,
	pub content: &'a str,
}
