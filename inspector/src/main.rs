use anyhow::Result;
use clap::{Parser, Subcommand};
use paragraph_core::{Decision, ParagraphIndex, ScoredSentence, DEFAULT_THRESHOLD, FALLBACK_ANSWER};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "paragraph-inspect")]
#[command(about = "Inspect the tf-idf index and retrieval decisions for a paragraph", long_about = None)]
struct Cli {
    /// Reference paragraph file
    #[arg(long, env = "PARAGRAPH_PATH", default_value = "paragraph.txt")]
    paragraph: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sentences with their ids
    Sentences,
    /// Print one JSON line per vocabulary term: id, df, idf
    Vocab,
    /// Rank sentences for a question and show the gate decision
    Ask {
        question: String,
        /// Minimum similarity to count as answerable
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Number of ranked sentences to print
        #[arg(long, default_value_t = 3)]
        k: usize,
    },
}

#[derive(Serialize)]
struct AskReport<'a> {
    question: &'a str,
    threshold: f64,
    decision: Decision,
    answer: Option<&'static str>,
    ranked: Vec<ScoredSentence>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let index = ParagraphIndex::load(&cli.paragraph)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Sentences => {
            for (id, sentence) in index.sentences().iter().enumerate() {
                writeln!(out, "{}", serde_json::json!({ "sentence_id": id, "sentence": sentence }))?;
            }
        }
        Commands::Vocab => {
            for row in index.term_stats() {
                writeln!(out, "{}", serde_json::to_string(&row)?)?;
            }
        }
        Commands::Ask { question, threshold, k } => {
            let decision = index.decide(&question, threshold);
            let answer = (!decision.is_answerable()).then_some(FALLBACK_ANSWER);
            let report = AskReport { question: &question, threshold, decision, answer, ranked: index.rank(&question, k.max(1)) };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }
    out.flush()?;
    Ok(())
}
