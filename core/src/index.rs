use crate::tokenizer::{split_sentences, tokenize};
use crate::vector::{vectorize, TermVector};
use crate::vocab::{document_frequencies, smoothed_idf, TermStats, Vocabulary};
use anyhow::{Context, Result};
use std::path::Path;

pub type SentenceId = u32;

/// Immutable corpus index over one paragraph: the sentences, the frozen
/// vocabulary and idf weights, and one tf-idf vector per sentence.
#[derive(Debug, Clone, Default)]
pub struct ParagraphIndex {
    sentences: Vec<String>,
    vocabulary: Vocabulary,
    df: Vec<u32>,
    idf: Vec<f64>,
    vectors: Vec<TermVector>,
}

impl ParagraphIndex {
    pub fn build(paragraph: &str) -> Self {
        let sentences = split_sentences(paragraph);
        let docs: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();
        let vocabulary = Vocabulary::from_docs(&docs);
        let df = document_frequencies(&vocabulary, &docs);
        let idf = smoothed_idf(&df, sentences.len());
        let vectors = docs
            .iter()
            .map(|tokens| vectorize(tokens, &vocabulary, &idf))
            .collect();
        tracing::debug!(sentences = sentences.len(), terms = vocabulary.len(), "built paragraph index");
        Self { sentences, vocabulary, df, idf, vectors }
    }

    /// Read a UTF-8 paragraph file and index it. A missing file is fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let paragraph = std::fs::read_to_string(path)
            .with_context(|| format!("paragraph file not readable: {}", path.display()))?;
        let index = Self::build(paragraph.trim());
        tracing::info!(
            path = %path.display(),
            sentences = index.len(),
            terms = index.vocabulary.len(),
            "loaded paragraph"
        );
        Ok(index)
    }

    /// Vectorize free text against the frozen vocabulary.
    pub fn vectorize_text(&self, text: &str) -> TermVector {
        vectorize(&tokenize(text), &self.vocabulary, &self.idf)
    }

    pub fn sentence(&self, id: SentenceId) -> Option<&str> {
        self.sentences.get(id as usize).map(String::as_str)
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn df(&self) -> &[u32] {
        &self.df
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn vectors(&self) -> &[TermVector] {
        &self.vectors
    }

    pub fn term_stats(&self) -> Vec<TermStats> {
        self.vocabulary
            .terms()
            .iter()
            .enumerate()
            .map(|(i, term)| TermStats {
                term_id: i as u32,
                term: term.clone(),
                df: self.df[i],
                idf: self.idf[i],
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}
