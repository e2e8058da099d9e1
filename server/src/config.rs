use anyhow::{ensure, Result};
use clap::Parser;
use paragraph_core::DEFAULT_THRESHOLD;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "paragraph-server")]
#[command(about = "Answer questions grounded in a single reference paragraph")]
pub struct Settings {
    /// Reference paragraph file
    #[arg(long, env = "PARAGRAPH_PATH", default_value = "paragraph.txt")]
    pub paragraph: PathBuf,
    /// Minimum cosine similarity required to attempt an answer
    #[arg(long, env = "SIM_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
    /// Name the model is served under
    #[arg(long, env = "MODEL_NAME", default_value = "paragraph-chatbot")]
    pub model_name: String,
    #[command(flatten)]
    pub generation: GenerationSettings,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerationSettings {
    /// Text2text inference endpoint; answers are extractive when unset
    #[arg(long, env = "GENERATOR_URL")]
    pub generator_url: Option<String>,
    /// Bearer token for the inference endpoint
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub generator_token: Option<String>,
    #[arg(long, env = "HF_MODEL_NAME", default_value = "google/flan-t5-small")]
    pub model: String,
    #[arg(long, env = "HF_FALLBACK_NAME", default_value = "t5-small")]
    pub fallback_model: String,
    #[arg(long, env = "HF_MAX_NEW_TOKENS", default_value_t = 64)]
    pub max_new_tokens: u32,
    #[arg(long, env = "HF_NUM_BEAMS", default_value_t = 1)]
    pub num_beams: u32,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.threshold.is_finite(), "similarity threshold must be finite, got {}", self.threshold);
        ensure!(self.generation.num_beams >= 1, "num_beams must be at least 1");
        Ok(())
    }
}
