use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use clap::Parser;
use http_body_util::BodyExt;
use paragraph_core::{ParagraphIndex, FALLBACK_ANSWER};
use paragraph_server::config::Settings;
use paragraph_server::generate::Generator;
use paragraph_server::{router, AppState, PredictResponse};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const PARAGRAPH: &str = "Cats are small mammals. Dogs are loyal companions and friends to many \
families around our world. Birds can fly.";

#[derive(Default)]
struct RecordingGenerator {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("model offline"));
        }
        Ok(format!("{question} => {context}"))
    }
}

fn app_with(generator: Arc<RecordingGenerator>, threshold: f64) -> Router {
    router(AppState {
        index: Arc::new(ParagraphIndex::build(PARAGRAPH)),
        generator,
        threshold,
        model_name: "paragraph-chatbot".into(),
    })
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn answerable_question_is_grounded() {
    let generator = Arc::new(RecordingGenerator::default());
    let app = app_with(generator.clone(), 0.05);

    let (status, json) = call(app, post_json("/predict", serde_json::json!({"question": "What are cats?"}))).await;
    assert_eq!(status, StatusCode::OK);
    let resp: PredictResponse = serde_json::from_value(json).unwrap();
    assert_eq!(resp.context, "Cats are small mammals.");
    assert_eq!(resp.answer, "What are cats? => Cats are small mammals.");
    assert!(resp.similarity > 0.0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrelated_question_gets_fallback_without_generation() {
    let generator = Arc::new(RecordingGenerator::default());
    let app = app_with(generator.clone(), 0.05);

    let (status, json) = call(
        app,
        post_json("/predict", serde_json::json!({"question": "What is the capital of France?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], FALLBACK_ANSWER);
    assert_eq!(json["context"], "");
    assert_eq!(json["similarity"].as_f64(), Some(0.0));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn low_confidence_still_reports_similarity() {
    let generator = Arc::new(RecordingGenerator::default());
    let app = app_with(generator.clone(), 0.5);
    let question = "are there any dogs or trucks or planes here today";
    let expected = ParagraphIndex::build(PARAGRAPH).best_match(question).unwrap().score;

    let (_, json) = call(app, post_json("/predict", serde_json::json!({"question": question}))).await;
    assert_eq!(json["answer"], FALLBACK_ANSWER);
    assert_eq!(json["context"], "");
    // JSON float parsing may land one ulp away from the in-memory score
    let got = json["similarity"].as_f64().unwrap();
    assert!((got - expected).abs() < 1e-12, "similarity {got} vs {expected}");
    assert!(got > 0.0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nested_inputs_on_model_route() {
    let app = app_with(Arc::new(RecordingGenerator::default()), 0.05);
    let body = serde_json::json!({"inputs": [{"name": "question", "datatype": "BYTES", "data": ["Can birds fly?"]}]});
    let (status, json) = call(app, post_json("/v1/models/paragraph-chatbot/predict", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["context"], "Birds can fly.");
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let generator = Arc::new(RecordingGenerator::default());
    let app = app_with(generator.clone(), 0.05);

    let (status, json) = call(app.clone(), post_json("/predict", serde_json::json!({"query": "cats"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("question"));

    let (status, _) = call(app.clone(), post_json("/predict", serde_json::json!({"inputs": [{"data": []}]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let raw = Request::post("/predict").body(Body::from("{not json")).unwrap();
    let (status, _) = call(app, raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generator_failure_is_bad_gateway() {
    let generator = Arc::new(RecordingGenerator { fail: true, ..Default::default() });
    let app = app_with(generator, 0.05);
    let (status, json) = call(app, post_json("/predict", serde_json::json!({"question": "What are cats?"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("model offline"));
}

#[tokio::test]
async fn readiness_and_unknown_model() {
    let app = app_with(Arc::new(RecordingGenerator::default()), 0.05);
    let (status, json) = call(app.clone(), Request::get("/v1/models/paragraph-chatbot").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);

    let (status, _) = call(app, post_json("/v1/models/other/predict", serde_json::json!({"question": "cats"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_returns_ranked_sentences() {
    let app = app_with(Arc::new(RecordingGenerator::default()), 0.05);
    let (status, json) = call(app, Request::get("/search?q=cats%20and%20dogs&k=2").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert!(arr[0]["score"].as_f64().unwrap() >= arr[1]["score"].as_f64().unwrap());
}

/// Settings pinned to an extractive generator and the default threshold,
/// whatever the ambient environment exports.
fn local_settings(path: &std::path::Path) -> Settings {
    let mut settings = Settings::try_parse_from([
        "paragraph-server",
        "--paragraph",
        path.to_str().unwrap(),
        "--threshold",
        "0.05",
        "--model-name",
        "paragraph-chatbot",
    ])
    .unwrap();
    settings.generation.generator_url = None;
    settings.generation.num_beams = 1;
    settings
}

#[tokio::test]
async fn build_app_loads_paragraph_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paragraph.txt");
    std::fs::write(&path, PARAGRAPH).unwrap();
    let settings = local_settings(&path);
    let app = paragraph_server::build_app(&settings).unwrap();

    let (status, json) = call(app, post_json("/predict", serde_json::json!({"question": "What are cats?"}))).await;
    assert_eq!(status, StatusCode::OK);
    // no generator endpoint configured: extractive answer
    assert_eq!(json["answer"], "Cats are small mammals.");
}

#[test]
fn build_app_fails_without_paragraph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let settings = local_settings(&path);
    assert!(paragraph_server::build_app(&settings).is_err());
}
