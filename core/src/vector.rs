use crate::vocab::{TermId, Vocabulary};
use std::collections::HashMap;

/// Dense tf-idf vector with one column per vocabulary term.
pub type TermVector = Vec<f64>;

/// Build `tf * idf` for a token sequence. Terms outside the vocabulary are dropped;
/// tf is normalized by the full token count (floored at 1).
pub fn vectorize(tokens: &[String], vocab: &Vocabulary, idf: &[f64]) -> TermVector {
    let len = tokens.len().max(1) as f64;
    let mut counts: HashMap<TermId, u32> = HashMap::new();
    for token in tokens {
        if let Some(tid) = vocab.get(token) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    let mut vector = vec![0.0; vocab.len()];
    for (tid, count) in counts {
        let col = tid as usize;
        vector[col] = (count as f64 / len) * idf[col];
    }
    vector
}

/// Cosine similarity; `0.0` when either side has zero norm.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
