pub mod context;
pub mod gate;
pub mod outcome;
pub mod snippet;
pub mod time_serde;

pub use outcome::{FallbackReason, RetrievalMode, RetrievalOutcome, RetrievalPath, RetrievalSource};
pub use snippet::ContextSnippet;
