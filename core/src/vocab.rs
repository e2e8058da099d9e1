use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

pub type TermId = u32;

/// Sorted term dictionary; a term's column is its rank in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    dictionary: HashMap<String, TermId>,
}

impl Vocabulary {
    pub fn from_docs(docs: &[Vec<String>]) -> Self {
        let sorted: BTreeSet<&str> = docs.iter().flatten().map(String::as_str).collect();
        let terms: Vec<String> = sorted.into_iter().map(str::to_string).collect();
        let dictionary = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        Self { terms, dictionary }
    }

    pub fn get(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Per-term statistics row, as printed by diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct TermStats {
    pub term_id: TermId,
    pub term: String,
    pub df: u32,
    pub idf: f64,
}

/// Count, per column, the sentences containing the term at least once.
pub fn document_frequencies(vocab: &Vocabulary, docs: &[Vec<String>]) -> Vec<u32> {
    let mut df = vec![0u32; vocab.len()];
    for tokens in docs {
        let seen_in_doc: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        for term in seen_in_doc {
            if let Some(tid) = vocab.get(term) {
                df[tid as usize] += 1;
            }
        }
    }
    df
}

/// Smoothed idf: `ln((N + 1) / (df + 1)) + 1`.
pub fn smoothed_idf(df: &[u32], num_docs: usize) -> Vec<f64> {
    let n = num_docs as f64;
    df.iter()
        .map(|&df_t| ((n + 1.0) / (df_t as f64 + 1.0)).ln() + 1.0)
        .collect()
}
