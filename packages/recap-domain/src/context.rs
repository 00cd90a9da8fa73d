use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::ContextSnippet;

pub const RECENCY_ANSWER_HEADER: &str = "Here are the latest updates by recency:";

pub fn format_timestamp(ts: &OffsetDateTime) -> String {
	ts.format(&Rfc3339).unwrap_or_else(|_| "?".to_string())
}

/// `- (<timestamp>) sim=<score to 3 places>: <content>`
pub fn context_line(snippet: &ContextSnippet) -> String {
	format!(
		"- ({}) sim={:.3}: {}",
		format_timestamp(&snippet.created_at),
		snippet.similarity,
		snippet.content
	)
}

/// One line per snippet, input order preserved.
pub fn context_block(snippets: &[ContextSnippet]) -> String {
	snippets.iter().map(context_line).collect::<Vec<_>>().join("\n")
}

/// Answer used when no language model is reachable: header plus a bullet per snippet.
pub fn recency_answer(snippets: &[ContextSnippet]) -> String {
	let mut out = String::from(RECENCY_ANSWER_HEADER);

	out.push_str("\n\n");

	for (i, snippet) in snippets.iter().enumerate() {
		if i > 0 {
			out.push('\n');
		}

		out.push_str(&format!("- ({}) {}", format_timestamp(&snippet.created_at), snippet.content));
	}

	out
}
