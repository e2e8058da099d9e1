pub mod index;
pub mod retrieval;
pub mod tokenizer;
pub mod vector;
pub mod vocab;

pub use index::{ParagraphIndex, SentenceId};
pub use retrieval::{Decision, ScoredSentence, DEFAULT_THRESHOLD, FALLBACK_ANSWER};
pub use vector::{cosine, vectorize, TermVector};
pub use vocab::{TermId, TermStats, Vocabulary};
