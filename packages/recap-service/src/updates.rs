use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use recap_domain::gate::{self, RejectCode};
use recap_storage::models::UpdateRow;

use crate::{Error, RecapService, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUpdateRequest {
	pub user_id: Uuid,
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
	pub id: i64,
	pub user_id: Uuid,
	pub content: String,
	#[serde(with = "recap_domain::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<UpdateRow> for UpdateItem {
	fn from(row: UpdateRow) -> Self {
		Self { id: row.id, user_id: row.user_id, content: row.content, created_at: row.created_at }
	}
}

impl RecapService {
	/// Stores a status update. Returns the stored row when the database echoes one.
	pub async fn add_update(&self, req: AddUpdateRequest) -> Result<Option<UpdateItem>> {
		if let Err(code) = gate::update_gate(&req.content, &self.cfg.chat) {
			tracing::info!(code = code.as_str(), "Update rejected.");

			let message = match code {
				RejectCode::RejectTooLong => format!(
					"content must be at most {} characters.",
					self.cfg.chat.max_query_chars
				),
				_ => "content must be non-empty.".to_string(),
			};

			return Err(Error::invalid("content", message));
		}

		let stored = self.store.insert_update(req.user_id, &req.content).await.map_err(|err| {
			tracing::error!(status = err.status(), error = %err, "Update insert failed.");

			Error::from(err)
		})?;

		tracing::info!(user_id = %req.user_id, stored = stored.is_some(), "Update stored.");

		Ok(stored.map(UpdateItem::from))
	}
}
