use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use ytt_server::{
    router, Result, ServerConfig, Transcript, TranscriptError, TranscriptItem, TranscriptList,
    TranscriptProvider, TranslationLanguage,
};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

#[derive(Clone, Copy, PartialEq)]
enum ListOutcome {
    Ok,
    Disabled,
    Empty,
    HttpError,
}

#[derive(Clone, Copy, PartialEq)]
enum FetchOutcome {
    Ok,
    Disabled,
    ParseError,
}

/// In-memory provider standing in for YouTube
struct FakeProvider {
    list: ListOutcome,
    manually_created: Vec<Transcript>,
    generated: Vec<Transcript>,
    fail_find: bool,
    fail_translation: bool,
    fetch: FetchOutcome,
    version: Option<String>,
    translate_calls: AtomicUsize,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            list: ListOutcome::Ok,
            manually_created: vec![track("de", "German", false, true)],
            generated: vec![track("en", "English (auto-generated)", true, true)],
            fail_find: false,
            fail_translation: false,
            fetch: FetchOutcome::Ok,
            version: Some("9.9.9".to_string()),
            translate_calls: AtomicUsize::new(0),
        }
    }
}

fn track(code: &str, name: &str, is_generated: bool, is_translatable: bool) -> Transcript {
    Transcript {
        video_id: VIDEO_ID.to_string(),
        language_code: code.to_string(),
        language: name.to_string(),
        is_generated,
        is_translatable,
        base_url: format!("fake://{code}"),
        translation_languages: if is_translatable {
            vec![
                TranslationLanguage {
                    language: "French".to_string(),
                    language_code: "fr".to_string(),
                },
                TranslationLanguage {
                    language: "Japanese".to_string(),
                    language_code: "ja".to_string(),
                },
            ]
        } else {
            vec![]
        },
    }
}

#[async_trait]
impl TranscriptProvider for FakeProvider {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList> {
        match self.list {
            ListOutcome::Disabled => Err(TranscriptError::TranscriptsDisabled(video_id.to_string())),
            ListOutcome::HttpError => Err(TranscriptError::HttpError("HTTP 503: Service Unavailable".to_string())),
            ListOutcome::Empty => Ok(TranscriptList {
                video_id: video_id.to_string(),
                ..TranscriptList::default()
            }),
            ListOutcome::Ok => Ok(TranscriptList {
                video_id: video_id.to_string(),
                manually_created: self.manually_created.clone(),
                generated: self.generated.clone(),
                translation_languages: vec![],
            }),
        }
    }

    async fn find_transcript(&self, list: &TranscriptList, language_codes: &[&str]) -> Result<Transcript> {
        if self.fail_find {
            return Err(TranscriptError::HttpError("find boom".to_string()));
        }
        list.find_transcript(language_codes).cloned()
    }

    async fn translate(&self, transcript: &Transcript, language_code: &str) -> Result<Transcript> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_translation {
            return Err(TranscriptError::HttpError("translation backend down".to_string()));
        }
        transcript.translate(language_code)
    }

    async fn fetch(&self, transcript: &Transcript) -> Result<Vec<TranscriptItem>> {
        match self.fetch {
            FetchOutcome::Disabled => {
                return Err(TranscriptError::TranscriptsDisabled(transcript.video_id.clone()));
            }
            FetchOutcome::ParseError => {
                return Err(TranscriptError::XmlParseError("Failed to parse XML: unexpected EOF".to_string()));
            }
            FetchOutcome::Ok => {}
        }
        Ok(vec![
            TranscriptItem {
                text: format!("[{}] hello", transcript.language_code),
                start: 0.0,
                duration: 1.5,
            },
            TranscriptItem {
                text: "world".to_string(),
                start: 1.5,
                duration: 2.0,
            },
        ])
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn app(provider: Arc<FakeProvider>) -> Router {
    router(provider, &ServerConfig::default())
}

const UNAVAILABLE: &str = "Transcripts are disabled or not available for this video.";

async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcript")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(provider: Arc<FakeProvider>, body: Value) -> (StatusCode, Value) {
    post_raw(app(provider), body.to_string()).await
}

#[tokio::test]
async fn exact_match_is_served_without_translation() {
    let provider = Arc::new(FakeProvider::new());
    let (status, body) = post(
        provider.clone(),
        json!({ "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "lang": "de" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], VIDEO_ID);
    assert_eq!(body["language_code"], "de");
    assert_eq!(body["language_name"], "German");
    assert_eq!(body["is_generated"], false);
    assert_eq!(body["transcript"][0]["text"], "[de] hello");
    assert_eq!(body["transcript"][1]["start"], 1.5);
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_lang_is_not_replaced_by_the_default() {
    let provider = Arc::new(FakeProvider::new());
    let (status, body) = post(provider.clone(), json!({ "url": VIDEO_ID, "lang": "" })).await;

    // "" has no exact match and no translation, so the English fallback serves it
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "en");
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lang_defaults_to_english() {
    let provider = Arc::new(FakeProvider::new());
    let (status, body) = post(provider.clone(), json!({ "url": "https://youtu.be/dQw4w9WgXcQ" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "en");
    assert_eq!(body["is_generated"], true);
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_transcript_is_translated_when_no_exact_match() {
    let provider = Arc::new(FakeProvider::new());
    let (status, body) = post(provider.clone(), json!({ "url": VIDEO_ID, "lang": "fr" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "fr");
    assert_eq!(body["language_name"], "French");
    assert_eq!(body["is_generated"], true);
    assert_eq!(body["transcript"][0]["text"], "[fr] hello");
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn untranslatable_first_transcript_is_served_as_is() {
    let mut provider = FakeProvider::new();
    provider.manually_created = vec![track("de", "German", false, false)];
    let provider = Arc::new(provider);

    let (status, body) = post(provider.clone(), json!({ "url": VIDEO_ID, "lang": "fr" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "de");
    assert_eq!(body["language_name"], "German");
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_translation_falls_back_to_english() {
    let mut provider = FakeProvider::new();
    provider.fail_translation = true;

    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID, "lang": "fr" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "en");
    assert_eq!(body["language_name"], "English (auto-generated)");
}

#[tokio::test]
async fn failed_translation_without_english_falls_back_to_first() {
    let mut provider = FakeProvider::new();
    provider.generated = vec![track("es", "Spanish", true, false)];

    // "xx" is not among the translation languages, so translate() fails
    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID, "lang": "xx" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language_code"], "de");
}

#[tokio::test]
async fn available_languages_follow_provider_order() {
    let mut provider = FakeProvider::new();
    provider.manually_created = vec![
        track("pt", "Portuguese", false, false),
        track("de", "German", false, true),
    ];
    provider.generated = vec![
        track("en", "English (auto-generated)", true, true),
        track("ko", "Korean (auto-generated)", true, true),
    ];

    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["available_languages"],
        json!([
            { "code": "pt", "name": "Portuguese", "is_generated": false },
            { "code": "de", "name": "German", "is_generated": false },
            { "code": "en", "name": "English (auto-generated)", "is_generated": true },
            { "code": "ko", "name": "Korean (auto-generated)", "is_generated": true }
        ])
    );
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let provider = Arc::new(FakeProvider::new());
    let request = json!({ "url": VIDEO_ID, "lang": "ja" });

    let (_, first) = post(provider.clone(), request.clone()).await;
    let (_, second) = post(provider, request).await;

    assert_eq!(first["available_languages"], second["available_languages"]);
    assert_eq!(first["transcript"], second["transcript"]);
}

#[tokio::test]
async fn missing_url_is_rejected() {
    for body in [
        json!({}),
        json!({ "lang": "de" }),
        json!({ "url": "" }),
        json!({ "url": null, "lang": "fr" }),
    ] {
        let (status, body) = post(Arc::new(FakeProvider::new()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'url'. Library Version: 9.9.9");
    }
}

#[tokio::test]
async fn missing_url_reports_unknown_version() {
    let mut provider = FakeProvider::new();
    provider.version = None;

    let (status, body) = post(Arc::new(provider), json!({ "lang": "de" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'url'. Library Version: unknown");
}

#[tokio::test]
async fn wrongly_typed_url_is_rejected() {
    let (status, body) = post(Arc::new(FakeProvider::new()), json!({ "url": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn unextractable_video_id_is_rejected() {
    let (status, body) = post(Arc::new(FakeProvider::new()), json!({ "url": "not a url" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Could not extract Video ID from URL" }));
}

#[tokio::test]
async fn non_object_bodies_are_rejected() {
    for body in [json!([VIDEO_ID, "de"]), json!(VIDEO_ID), json!(42), json!(null)] {
        let provider = Arc::new(FakeProvider::new());
        let (status, body) = post(provider, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Invalid request: request body must be a JSON object" })
        );
    }
}

#[tokio::test]
async fn oversized_body_is_rejected_as_json() {
    let config = ServerConfig {
        body_limit: 64,
        ..ServerConfig::default()
    };
    let app = router(Arc::new(FakeProvider::new()), &config);
    let padding = "x".repeat(256);

    let (status, body) = post_raw(app, json!({ "url": VIDEO_ID, "pad": padding }).to_string()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().starts_with("Request body is too large"));
}

#[tokio::test]
async fn invalid_json_is_a_server_error() {
    let (status, body) = post_raw(app(Arc::new(FakeProvider::new())), "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Server Error: "));
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn disabled_or_empty_transcripts_are_client_errors() {
    for outcome in [ListOutcome::Disabled, ListOutcome::Empty] {
        let mut provider = FakeProvider::new();
        provider.list = outcome;

        let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": UNAVAILABLE
            })
        );
    }
}

#[tokio::test]
async fn upstream_list_failure_is_a_server_error() {
    let mut provider = FakeProvider::new();
    provider.list = ListOutcome::HttpError;

    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "HTTP error: HTTP 503: Service Unavailable (Lib Version: 9.9.9)"
    );
}

#[tokio::test]
async fn fetch_failure_is_a_server_error() {
    let mut provider = FakeProvider::new();
    provider.fetch = FetchOutcome::ParseError;
    provider.version = None;

    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "XML parse error: Failed to parse XML: unexpected EOF (Lib Version: unknown)"
    );
}

#[tokio::test]
async fn health_probe() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app(Arc::new(FakeProvider::new())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn disabled_transcript_at_fetch_is_a_client_error() {
    let mut provider = FakeProvider::new();
    provider.fetch = FetchOutcome::Disabled;

    let (status, body) = post(Arc::new(provider), json!({ "url": VIDEO_ID })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": UNAVAILABLE }));
}

#[tokio::test]
async fn find_failure_is_a_server_error_without_fallback() {
    let mut provider = FakeProvider::new();
    provider.fail_find = true;
    provider.version = None;
    let provider = Arc::new(provider);

    let (status, body) = post(provider.clone(), json!({ "url": VIDEO_ID, "lang": "fr" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "HTTP error: find boom (Lib Version: unknown)" })
    );
    assert_eq!(provider.translate_calls.load(Ordering::SeqCst), 0);
}
