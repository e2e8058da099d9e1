use crate::index::{ParagraphIndex, SentenceId};
use crate::vector::cosine;
use serde::Serialize;
use std::cmp::Ordering;

/// Fixed reply when no sentence is relevant enough to ground an answer.
pub const FALLBACK_ANSWER: &str = "I don't have enough information in my notes to answer that.";

/// Default minimum cosine score to attempt generation.
pub const DEFAULT_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    pub sentence_id: SentenceId,
    pub score: f64,
    pub sentence: String,
}

/// Outcome of the threshold gate. Both branches carry the best score found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Answerable { sentence_id: SentenceId, context: String, similarity: f64 },
    NoAnswer { similarity: f64 },
}

impl Decision {
    pub fn similarity(&self) -> f64 {
        match self {
            Decision::Answerable { similarity, .. } | Decision::NoAnswer { similarity } => *similarity,
        }
    }

    /// Grounding sentence, or `""` for a no-answer decision.
    pub fn context(&self) -> &str {
        match self {
            Decision::Answerable { context, .. } => context,
            Decision::NoAnswer { .. } => "",
        }
    }

    pub fn is_answerable(&self) -> bool {
        matches!(self, Decision::Answerable { .. })
    }
}

impl ParagraphIndex {
    /// Score every sentence against the question; best first, ties in sentence order.
    pub fn rank(&self, question: &str, k: usize) -> Vec<ScoredSentence> {
        let query = self.vectorize_text(question);
        let mut scored: Vec<ScoredSentence> = self
            .vectors()
            .iter()
            .zip(self.sentences())
            .enumerate()
            .map(|(i, (vector, sentence))| ScoredSentence {
                sentence_id: i as SentenceId,
                score: cosine(&query, vector),
                sentence: sentence.clone(),
            })
            .collect();
        // sort_by is stable, so equal scores stay in sentence order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Highest-scoring sentence; the earliest one wins a tie.
    pub fn best_match(&self, question: &str) -> Option<ScoredSentence> {
        let query = self.vectorize_text(question);
        let mut best: Option<(usize, f64)> = None;
        for (i, vector) in self.vectors().iter().enumerate() {
            let score = cosine(&query, vector);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((i, score));
            }
        }
        let (i, score) = best?;
        let sentence_id = i as SentenceId;
        let sentence = self.sentence(sentence_id)?.to_string();
        Some(ScoredSentence { sentence_id, score, sentence })
    }

    /// Retrieve and apply the minimum-similarity gate.
    pub fn decide(&self, question: &str, threshold: f64) -> Decision {
        let decision = match self.best_match(question) {
            Some(hit) if hit.score >= threshold && !hit.sentence.is_empty() => Decision::Answerable {
                sentence_id: hit.sentence_id,
                context: hit.sentence,
                similarity: hit.score,
            },
            Some(hit) => Decision::NoAnswer { similarity: hit.score },
            None => Decision::NoAnswer { similarity: 0.0 },
        };
        tracing::debug!(
            similarity = decision.similarity(),
            threshold,
            answerable = decision.is_answerable(),
            "retrieval decision"
        );
        decision
    }
}
