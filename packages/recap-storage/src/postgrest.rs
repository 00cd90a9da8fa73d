use std::time::Duration;

use reqwest::{
	Client, RequestBuilder, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{NewUpdate, UpdateRow},
};

const APIKEY: HeaderName = HeaderName::from_static("apikey");
const PREFER: HeaderName = HeaderName::from_static("prefer");
const RECENCY_COLUMNS: &str = "id,user_id,content,created_at";

/// PostgREST endpoint of the updates database. Every call is a single request bounded by the
/// configured timeout.
pub struct PostgrestStore {
	client: Client,
	credentials: Option<(String, String)>,
	match_rpc: String,
	latest_view: String,
	updates_table: String,
}
impl PostgrestStore {
	pub fn new(cfg: &recap_config::Supabase) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let credentials =
			cfg.credentials().map(|(url, key)| (url.trim_end_matches('/').to_string(), key.to_string()));

		Ok(Self {
			client,
			credentials,
			match_rpc: cfg.match_rpc.clone(),
			latest_view: cfg.latest_view.clone(),
			updates_table: cfg.updates_table.clone(),
		})
	}

	pub fn is_configured(&self) -> bool {
		self.credentials.is_some()
	}

	/// Calls the similarity procedure. Ranking is the procedure's; rows are returned as received.
	pub async fn match_latest_updates(
		&self,
		embedding: &[f32],
		match_count: u32,
	) -> Result<Vec<UpdateRow>> {
		let body = serde_json::json!({
			"query_embedding": embedding,
			"match_count": match_count,
		});
		let req = self.request(|client, base| {
			client.post(format!("{base}/rest/v1/rpc/{}", self.match_rpc)).json(&body)
		})?;
		let res = check_status(req.send().await?).await?;

		Ok(res.json().await?)
	}

	/// Reads the newest `limit` rows of the latest-per-user view, most recent first.
	pub async fn latest_updates(&self, limit: u32) -> Result<Vec<UpdateRow>> {
		let limit = limit.max(1).to_string();
		let req = self.request(|client, base| {
			client.get(format!("{base}/rest/v1/{}", self.latest_view)).query(&[
				("select", RECENCY_COLUMNS),
				("order", "created_at.desc"),
				("limit", limit.as_str()),
			])
		})?;
		let res = check_status(req.send().await?).await?;

		Ok(res.json().await?)
	}

	/// Inserts one update and returns the stored row, if the database echoed one.
	pub async fn insert_update(&self, user_id: Uuid, content: &str) -> Result<Option<UpdateRow>> {
		let body = [NewUpdate { user_id, content }];
		let req = self.request(|client, base| {
			client
				.post(format!("{base}/rest/v1/{}", self.updates_table))
				.header(PREFER, HeaderValue::from_static("return=representation"))
				.json(&body)
		})?;
		let res = check_status(req.send().await?).await?;
		let rows: Vec<UpdateRow> = res.json().await?;

		Ok(rows.into_iter().next())
	}

	fn request<F>(&self, build: F) -> Result<RequestBuilder>
	where
		F: FnOnce(&Client, &str) -> RequestBuilder,
	{
		let Some((base, key)) = self.credentials.as_ref() else {
			return Err(Error::NotConfigured);
		};

		Ok(build(&self.client, base).headers(auth_headers(key)?))
	}
}

fn auth_headers(key: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {key}").parse()?);
	headers.insert(APIKEY, key.parse()?);

	Ok(headers)
}

async fn check_status(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_client_error() || status.is_server_error() {
		let body = res.text().await.unwrap_or_default();

		return Err(Error::Status { status: status.as_u16(), body });
	}

	Ok(res)
}
