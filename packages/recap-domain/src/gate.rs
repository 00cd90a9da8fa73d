#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmpty,
	RejectTooLong,
	RejectTopKOutOfRange,
}
impl RejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RejectEmpty => "REJECT_EMPTY",
			Self::RejectTooLong => "REJECT_TOO_LONG",
			Self::RejectTopKOutOfRange => "REJECT_TOP_K_OUT_OF_RANGE",
		}
	}
}

pub fn chat_gate(query: &str, top_k: u32, cfg: &recap_config::Chat) -> Result<(), RejectCode> {
	if query.is_empty() {
		return Err(RejectCode::RejectEmpty);
	}
	if query.chars().count() as u32 > cfg.max_query_chars {
		return Err(RejectCode::RejectTooLong);
	}
	if top_k == 0 || top_k > cfg.max_top_k {
		return Err(RejectCode::RejectTopKOutOfRange);
	}

	Ok(())
}

pub fn update_gate(content: &str, cfg: &recap_config::Chat) -> Result<(), RejectCode> {
	if content.trim().is_empty() {
		return Err(RejectCode::RejectEmpty);
	}
	if content.chars().count() as u32 > cfg.max_query_chars {
		return Err(RejectCode::RejectTooLong);
	}

	Ok(())
}

/// Row count sent to either retrieval path; never below one.
pub fn clamp_top_k(top_k: u32, max_top_k: u32) -> u32 {
	top_k.clamp(1, max_top_k.max(1))
}
