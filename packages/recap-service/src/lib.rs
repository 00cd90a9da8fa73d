pub mod chat;
pub mod compose;
pub mod retrieval;
pub mod updates;

mod error;

pub use chat::{ChatRequest, ChatResponse};
pub use error::{DependencyStage, Error, Result};
pub use retrieval::SimilarityHits;
pub use updates::{AddUpdateRequest, UpdateItem};

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use recap_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use recap_providers::{chat::ChatMessage, embedding};
use recap_storage::{models::UpdateRow, postgrest::PostgrestStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, recap_providers::Result<Vec<f32>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, recap_providers::Result<String>>;
}

/// Read/write access to the updates database.
pub trait UpdateStore
where
	Self: Send + Sync,
{
	fn match_latest_updates<'a>(
		&'a self,
		embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, recap_storage::Result<Vec<UpdateRow>>>;

	fn latest_updates(&self, limit: u32) -> BoxFuture<'_, recap_storage::Result<Vec<UpdateRow>>>;

	fn insert_update<'a>(
		&'a self,
		user_id: Uuid,
		content: &'a str,
	) -> BoxFuture<'a, recap_storage::Result<Option<UpdateRow>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

pub struct RecapService {
	pub cfg: Config,
	pub providers: Providers,
	pub store: Arc<dyn UpdateStore>,
}
impl RecapService {
	pub fn new(cfg: Config) -> Result<Self> {
		let store = PostgrestStore::new(&cfg.storage.supabase)?;

		Ok(Self { cfg, providers: Providers::default(), store: Arc::new(store) })
	}

	pub fn with_parts(cfg: Config, providers: Providers, store: Arc<dyn UpdateStore>) -> Self {
		Self { cfg, providers, store }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, recap_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}
impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, recap_providers::Result<String>> {
		Box::pin(recap_providers::chat::complete(cfg, messages))
	}
}

impl UpdateStore for PostgrestStore {
	fn match_latest_updates<'a>(
		&'a self,
		embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, recap_storage::Result<Vec<UpdateRow>>> {
		Box::pin(PostgrestStore::match_latest_updates(self, embedding, match_count))
	}

	fn latest_updates(&self, limit: u32) -> BoxFuture<'_, recap_storage::Result<Vec<UpdateRow>>> {
		Box::pin(PostgrestStore::latest_updates(self, limit))
	}

	fn insert_update<'a>(
		&'a self,
		user_id: Uuid,
		content: &'a str,
	) -> BoxFuture<'a, recap_storage::Result<Option<UpdateRow>>> {
		Box::pin(PostgrestStore::insert_update(self, user_id, content))
	}
}
