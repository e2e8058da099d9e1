use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[a-z']+").expect("valid regex");
    // A terminal mark followed by whitespace; the cut falls right after the mark.
    static ref BOUNDARY_RE: Regex = Regex::new(r"[.!?]\s+").expect("valid regex");
}

/// Split a paragraph into trimmed, non-empty sentences, in order of appearance.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for mat in BOUNDARY_RE.find_iter(text) {
        // the mark is ASCII, so +1 stays on a char boundary
        push_trimmed(&mut sentences, &text[start..mat.start() + 1]);
        start = mat.end();
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}

/// Lowercase the text and keep maximal runs of `a-z` and apostrophes.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|mat| mat.as_str().to_string())
        .collect()
}
