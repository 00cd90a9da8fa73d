mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chat, Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, QUERY_CHARS_CEILING,
	Service, Storage, Supabase, TOP_K_CEILING,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.cors_allow_origins.is_empty() {
		return Err(Error::Validation {
			message: "service.cors_allow_origins must be non-empty.".to_string(),
		});
	}

	let supabase = &cfg.storage.supabase;

	for (label, value) in [
		("storage.supabase.match_rpc", &supabase.match_rpc),
		("storage.supabase.latest_view", &supabase.latest_view),
		("storage.supabase.updates_table", &supabase.updates_table),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, timeout_ms) in [
		("storage.supabase.timeout_ms", supabase.timeout_ms),
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.llm.timeout_ms", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	let temperature = cfg.providers.llm.temperature;

	if !temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.is_some() && cfg.providers.llm.api_key.is_none() {
		return Err(Error::Validation {
			message: "providers.llm.api_key must be set when providers.embedding.api_key is set."
				.to_string(),
		});
	}

	for (label, headers) in [
		("providers.embedding.default_headers", &cfg.providers.embedding.default_headers),
		("providers.llm.default_headers", &cfg.providers.llm.default_headers),
	] {
		if headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: format!("{label} values must be strings."),
			});
		}
	}

	let chat = &cfg.chat;

	if chat.max_top_k == 0 || chat.max_top_k > TOP_K_CEILING {
		return Err(Error::Validation {
			message: format!("chat.max_top_k must be in the range 1-{TOP_K_CEILING}."),
		});
	}
	if chat.default_top_k == 0 || chat.default_top_k > chat.max_top_k {
		return Err(Error::Validation {
			message: "chat.default_top_k must be in the range 1-chat.max_top_k.".to_string(),
		});
	}
	if chat.max_query_chars == 0 || chat.max_query_chars > QUERY_CHARS_CEILING {
		return Err(Error::Validation {
			message: format!("chat.max_query_chars must be in the range 1-{QUERY_CHARS_CEILING}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	blank_to_none(&mut cfg.providers.embedding.api_key);
	blank_to_none(&mut cfg.providers.llm.api_key);
	blank_to_none(&mut cfg.storage.supabase.url);
	blank_to_none(&mut cfg.storage.supabase.service_role_key);

	if let Some(url) = cfg.storage.supabase.url.as_mut() {
		trim_trailing_slash(url);
	}

	trim_trailing_slash(&mut cfg.providers.embedding.api_base);
	trim_trailing_slash(&mut cfg.providers.llm.api_base);

	for origin in cfg.service.cors_allow_origins.iter_mut() {
		*origin = origin.trim().to_string();
	}

	cfg.service.cors_allow_origins.retain(|origin| !origin.is_empty());
}

fn blank_to_none(value: &mut Option<String>) {
	if value.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false) {
		*value = None;
	}
}

fn trim_trailing_slash(value: &mut String) {
	while value.ends_with('/') {
		value.pop();
	}
}
