use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("invalid JSON body: {0}")]
    Json(String),
    #[error("Missing 'question' in request.")]
    MissingQuestion,
    #[error("Unsupported 'inputs' format; expected list with 'data'.")]
    UnsupportedInputs,
    #[error("question must be a string")]
    NotAString,
}

/// Accepted request bodies. The direct form wins when both keys are present.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PredictRequest {
    Direct { question: Value },
    /// v2-style `inputs` list; only the first entry is read.
    Inputs { inputs: Vec<Value> },
}

impl PredictRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| RequestError::Json(e.to_string()))?;
        serde_json::from_value(value).map_err(|_| RequestError::MissingQuestion)
    }

    /// Normalize either shape into the single question string.
    pub fn into_question(self) -> Result<String, RequestError> {
        match self {
            PredictRequest::Direct { question } => match question {
                Value::String(q) => Ok(q),
                _ => Err(RequestError::NotAString),
            },
            PredictRequest::Inputs { inputs } => {
                let first = inputs.into_iter().next().ok_or(RequestError::MissingQuestion)?;
                let Value::Object(mut entry) = first else {
                    return Err(RequestError::UnsupportedInputs);
                };
                // `contents` stands in for a missing or falsy `data`
                let data = match entry.remove("data") {
                    Some(d) if !is_falsy(&d) => Some(d),
                    _ => entry.remove("contents"),
                };
                match data {
                    Some(Value::Array(items)) => match items.into_iter().next() {
                        Some(Value::String(q)) => Ok(q),
                        Some(_) => Err(RequestError::NotAString),
                        None => Err(RequestError::UnsupportedInputs),
                    },
                    _ => Err(RequestError::UnsupportedInputs),
                }
            }
        }
    }
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

pub fn parse_question(body: &[u8]) -> Result<String, RequestError> {
    PredictRequest::from_slice(body)?.into_question()
}
