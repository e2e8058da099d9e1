use crate::config::GenerationSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Produces an answer for a question from one grounding sentence.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question using only the context.\nContext: {context}\nQuestion: {question}\nAnswer concisely:"
    )
}

/// Extractive mode: the grounding sentence is the answer.
#[derive(Debug, Default, Clone)]
pub struct ContextEcho;

#[async_trait]
impl Generator for ContextEcho {
    async fn generate(&self, _question: &str, context: &str) -> Result<String> {
        Ok(context.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize, Clone, Copy)]
struct GenerateParameters {
    max_new_tokens: u32,
    num_beams: u32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for a text2text-generation inference endpoint. Falls back to a
/// second model when the primary one fails.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    base_url: String,
    token: Option<String>,
    model: String,
    fallback_model: String,
    parameters: GenerateParameters,
}

impl HttpGenerator {
    pub fn new(base_url: &str, settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building generation client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: settings.generator_token.clone(),
            model: settings.model.clone(),
            fallback_model: settings.fallback_model.clone(),
            parameters: GenerateParameters {
                max_new_tokens: settings.max_new_tokens,
                num_beams: settings.num_beams,
                do_sample: false,
            },
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn call_model(&self, model: &str, prompt: &str) -> Result<String> {
        let body = GenerateRequest { inputs: prompt, parameters: self.parameters };
        let mut req = self.client.post(self.model_url(model)).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.with_context(|| format!("calling model {model}"))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("model {model} returned HTTP {status}: {text}"));
        }
        let out: Vec<GeneratedText> = resp.json().await.with_context(|| format!("decoding output of {model}"))?;
        parse_generated(out)
    }
}

fn parse_generated(out: Vec<GeneratedText>) -> Result<String> {
    out.into_iter()
        .next()
        .map(|g| g.generated_text.trim().to_string())
        .ok_or_else(|| anyhow!("generation returned no candidates"))
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let prompt = build_prompt(question, context);
        match self.call_model(&self.model, &prompt).await {
            Ok(answer) => Ok(answer),
            Err(err) => {
                tracing::warn!(model = %self.model, fallback = %self.fallback_model, error = %err, "primary model failed, using fallback");
                self.call_model(&self.fallback_model, &prompt).await
            }
        }
    }
}
