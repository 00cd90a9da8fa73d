//! Scripted collaborators for exercising the chat pipeline without network access.

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicU32, AtomicUsize, Ordering},
};

use serde_json::Map;
use time::OffsetDateTime;
use uuid::Uuid;

use recap_config::{
	Chat, Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Service, Storage,
	Supabase,
};
use recap_providers::chat::ChatMessage;
use recap_service::{BoxFuture, CompletionProvider, EmbeddingProvider, UpdateStore};
use recap_storage::models::UpdateRow;

pub fn test_config(embedding_key: Option<&str>) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			cors_allow_origins: vec!["*".to_string()],
		},
		storage: Storage {
			supabase: Supabase {
				url: Some("http://127.0.0.1:1".to_string()),
				service_role_key: Some("service-role".to_string()),
				match_rpc: "match_latest_updates".to_string(),
				latest_view: "latest_updates_per_user".to_string(),
				updates_table: "updates".to_string(),
				timeout_ms: 1_000,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: embedding_key.map(str::to_string),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: Some("test-key".to_string()),
				path: "/v1/chat/completions".to_string(),
				model: "test-llm".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		chat: Chat::default(),
	}
}

/// Row with a deterministic id derived from `n`, created `n` hours after a fixed epoch.
pub fn update_row(n: u32, content: &str, similarity: Option<f64>) -> UpdateRow {
	UpdateRow {
		id: i64::from(n),
		user_id: Uuid::from_u128(1_000 + u128::from(n)),
		content: content.to_string(),
		created_at: OffsetDateTime::from_unix_timestamp(1_741_305_600 + i64::from(n) * 3_600)
			.unwrap_or(OffsetDateTime::UNIX_EPOCH),
		similarity,
	}
}

#[derive(Debug, Clone)]
pub enum EmbeddingReply {
	Vector(Vec<f32>),
	Status(u16),
	Malformed,
}

pub struct StubEmbedding {
	pub reply: EmbeddingReply,
	pub calls: Arc<AtomicUsize>,
}
impl StubEmbedding {
	pub fn new(reply: EmbeddingReply) -> Self {
		Self { reply, calls: Arc::new(AtomicUsize::new(0)) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, recap_providers::Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let reply = self.reply.clone();

		Box::pin(async move {
			match reply {
				EmbeddingReply::Vector(vec) => Ok(vec),
				EmbeddingReply::Status(status) => Err(recap_providers::Error::Status {
					status,
					body: "embedding upstream error".to_string(),
				}),
				EmbeddingReply::Malformed => Err(recap_providers::Error::InvalidResponse {
					message: "Embedding response is missing data[0].embedding.".to_string(),
				}),
			}
		})
	}
}

#[derive(Debug, Clone)]
pub enum CompletionReply {
	/// Answers with the user turn of the request, so tests can see the context block.
	Echo,
	Text(String),
	Status(u16),
}

pub struct SpyCompletion {
	pub reply: CompletionReply,
	pub calls: Arc<AtomicUsize>,
	pub last_messages: Mutex<Vec<ChatMessage>>,
}
impl SpyCompletion {
	pub fn new(reply: CompletionReply) -> Self {
		Self { reply, calls: Arc::new(AtomicUsize::new(0)), last_messages: Mutex::new(Vec::new()) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_messages(&self) -> Vec<ChatMessage> {
		self.last_messages.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl CompletionProvider for SpyCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, recap_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		*self.last_messages.lock().unwrap_or_else(|err| err.into_inner()) = messages.to_vec();

		let reply = match &self.reply {
			CompletionReply::Echo => Ok(messages
				.iter()
				.find(|message| message.role == "user")
				.map(|message| message.content.clone())
				.unwrap_or_default()),
			CompletionReply::Text(text) => Ok(text.clone()),
			CompletionReply::Status(status) => Err(recap_providers::Error::Status {
				status: *status,
				body: "completion upstream error".to_string(),
			}),
		};

		Box::pin(async move { reply })
	}
}

#[derive(Debug, Clone)]
pub enum StoreReply {
	Rows(Vec<UpdateRow>),
	Status(u16),
	Unconfigured,
}
impl StoreReply {
	fn resolve(&self) -> recap_storage::Result<Vec<UpdateRow>> {
		match self {
			Self::Rows(rows) => Ok(rows.clone()),
			Self::Status(status) => Err(recap_storage::Error::Status {
				status: *status,
				body: "storage upstream error".to_string(),
			}),
			Self::Unconfigured => Err(recap_storage::Error::NotConfigured),
		}
	}
}

/// Store whose three endpoints answer from fixed scripts and count their calls.
pub struct ScriptedStore {
	pub similarity: StoreReply,
	pub recency: StoreReply,
	pub insert: StoreReply,
	pub similarity_calls: AtomicUsize,
	pub recency_calls: AtomicUsize,
	pub insert_calls: AtomicUsize,
	pub last_match_count: AtomicU32,
	pub last_limit: AtomicU32,
}
impl ScriptedStore {
	pub fn new(similarity: StoreReply, recency: StoreReply) -> Self {
		Self {
			similarity,
			recency,
			insert: StoreReply::Rows(Vec::new()),
			similarity_calls: AtomicUsize::new(0),
			recency_calls: AtomicUsize::new(0),
			insert_calls: AtomicUsize::new(0),
			last_match_count: AtomicU32::new(0),
			last_limit: AtomicU32::new(0),
		}
	}

	pub fn with_insert(mut self, insert: StoreReply) -> Self {
		self.insert = insert;

		self
	}

	pub fn similarity_count(&self) -> usize {
		self.similarity_calls.load(Ordering::SeqCst)
	}

	pub fn recency_count(&self) -> usize {
		self.recency_calls.load(Ordering::SeqCst)
	}

	pub fn insert_count(&self) -> usize {
		self.insert_calls.load(Ordering::SeqCst)
	}
}
impl UpdateStore for ScriptedStore {
	fn match_latest_updates<'a>(
		&'a self,
		_embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, recap_storage::Result<Vec<UpdateRow>>> {
		self.similarity_calls.fetch_add(1, Ordering::SeqCst);
		self.last_match_count.store(match_count, Ordering::SeqCst);

		let reply = self.similarity.resolve();

		Box::pin(async move { reply })
	}

	fn latest_updates(&self, limit: u32) -> BoxFuture<'_, recap_storage::Result<Vec<UpdateRow>>> {
		self.recency_calls.fetch_add(1, Ordering::SeqCst);
		self.last_limit.store(limit, Ordering::SeqCst);

		let reply = self.recency.resolve();

		Box::pin(async move { reply })
	}

	fn insert_update<'a>(
		&'a self,
		user_id: Uuid,
		content: &'a str,
	) -> BoxFuture<'a, recap_storage::Result<Option<UpdateRow>>> {
		self.insert_calls.fetch_add(1, Ordering::SeqCst);

		let reply = self.insert.resolve().map(|rows| {
			rows.into_iter().next().map(|mut row| {
				row.user_id = user_id;
				row.content = content.to_string();

				row
			})
		});

		Box::pin(async move { reply })
	}
}
