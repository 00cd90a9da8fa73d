use serde::Deserialize;
use serde_json::{Map, Value};

/// Upper bound on `top_k` accepted from callers.
pub const TOP_K_CEILING: u32 = 20;
/// Upper bound on query length, in characters.
pub const QUERY_CHARS_CEILING: u32 = 8_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_cors_allow_origins")]
	pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub supabase: Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Supabase {
	/// Optional. Storage is treated as unconfigured unless both `url` and `service_role_key`
	/// are present.
	pub url: Option<String>,
	pub service_role_key: Option<String>,
	#[serde(default = "default_match_rpc")]
	pub match_rpc: String,
	#[serde(default = "default_latest_view")]
	pub latest_view: String,
	#[serde(default = "default_updates_table")]
	pub updates_table: String,
	#[serde(default = "default_storage_timeout_ms")]
	pub timeout_ms: u64,
}
impl Supabase {
	/// Base URL and key, when both are present.
	pub fn credentials(&self) -> Option<(&str, &str)> {
		match (self.url.as_deref(), self.service_role_key.as_deref()) {
			(Some(url), Some(key)) => Some((url, key)),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Optional. When absent, chat requests skip embedding and answer from recency alone.
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	#[serde(default = "default_embedding_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_llm_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Chat {
	pub default_top_k: u32,
	pub max_top_k: u32,
	pub max_query_chars: u32,
}
impl Default for Chat {
	fn default() -> Self {
		Self { default_top_k: 5, max_top_k: TOP_K_CEILING, max_query_chars: QUERY_CHARS_CEILING }
	}
}

fn default_cors_allow_origins() -> Vec<String> {
	vec!["*".to_string()]
}

fn default_match_rpc() -> String {
	"match_latest_updates".to_string()
}

fn default_latest_view() -> String {
	"latest_updates_per_user".to_string()
}

fn default_updates_table() -> String {
	"updates".to_string()
}

fn default_storage_timeout_ms() -> u64 {
	30_000
}

fn default_embedding_timeout_ms() -> u64 {
	30_000
}

fn default_llm_timeout_ms() -> u64 {
	60_000
}

fn default_temperature() -> f32 {
	0.2
}
