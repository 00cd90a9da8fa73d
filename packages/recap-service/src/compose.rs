use recap_domain::{ContextSnippet, context};
use recap_providers::chat::ChatMessage;

use crate::{DependencyStage, Error, RecapService, Result};

pub const SYSTEM_PROMPT: &str = "You are an assistant summarizing weekly team updates. Use the provided context snippets to answer the user concisely, citing relevant updates.";

/// System instruction plus one user turn carrying the context block and the question.
pub fn build_messages(snippets: &[ContextSnippet], query: &str) -> Vec<ChatMessage> {
	let context_text = context::context_block(snippets);

	vec![
		ChatMessage::system(SYSTEM_PROMPT),
		ChatMessage::user(format!("Context:\n{context_text}\n\nQuestion: {query}")),
	]
}

impl RecapService {
	pub async fn compose_answer(&self, snippets: &[ContextSnippet], query: &str) -> Result<String> {
		let messages = build_messages(snippets, query);
		let cfg = &self.cfg.providers.llm;

		self.providers
			.completion
			.complete(cfg, &messages)
			.await
			.map_err(|err| Error::dependency(DependencyStage::Completion, err))
	}
}
