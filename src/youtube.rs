use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::{
    config::ProviderConfig,
    error::{Result, TranscriptError},
    parser::TranscriptParser,
    provider::TranscriptProvider,
    transcript::{Transcript, TranscriptItem, TranscriptList, TranslationLanguage},
};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_API_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const CONSENT_FORM: &str = "action=\"https://consent.youtube.com/s\"";

static INNERTUBE_API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key regex")
});

static CONSENT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent regex"));

/// Transcript provider backed by YouTube's watch page and InnerTube player API
///
/// Holds no per-video state: the consent cookie is sent only on the request
/// that needs it.
pub struct YouTubeProvider {
    client: reqwest::Client,
    delay_ms: u64,
    preserve_formatting: bool,
}

impl YouTubeProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_str(&config.accept_language).map_err(|e| {
                TranscriptError::HttpError(format!("Invalid Accept-Language header: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranscriptError::HttpError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            delay_ms: config.delay_ms,
            preserve_formatting: config.preserve_formatting,
        })
    }

    async fn delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
    }

    async fn fetch_video_html(&self, video_id: &str) -> Result<String> {
        self.delay().await;

        let url = watch_url(video_id)?;
        let html = self.get_text(url.as_str(), None, video_id, "HTML").await?;

        if !html.contains(CONSENT_FORM) {
            return Ok(html);
        }

        tracing::debug!(video_id, "YouTube asked for cookie consent, retrying with consent cookie");
        let cookie = consent_cookie(&html, video_id)?;
        self.delay().await;

        let html = self
            .get_text(url.as_str(), Some(&cookie), video_id, "HTML after consent")
            .await?;
        if html.contains(CONSENT_FORM) {
            return Err(TranscriptError::FailedToCreateConsentCookie(
                video_id.to_string(),
            ));
        }

        Ok(html)
    }

    async fn get_text(
        &self,
        url: &str,
        cookie: Option<&str>,
        video_id: &str,
        what: &str,
    ) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranscriptError::HttpError(format!("Failed to fetch {what}: {e}")))?;

        check_http_errors(&response, video_id)?;

        response
            .text()
            .await
            .map_err(|e| TranscriptError::HttpError(format!("Failed to read {what}: {e}")))
    }

    async fn fetch_innertube_data(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<serde_json::Value> {
        let url = Url::parse_with_params(INNERTUBE_API_URL, &[("key", api_key)])
            .map_err(|e| TranscriptError::HttpError(format!("Invalid InnerTube URL: {e}")))?;

        let context = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video_id
        });

        self.delay().await;

        let response = self
            .client
            .post(url)
            .json(&context)
            .send()
            .await
            .map_err(|e| {
                TranscriptError::HttpError(format!("Failed to fetch InnerTube data: {e}"))
            })?;

        check_http_errors(&response, video_id)?;

        response.json().await.map_err(|e| {
            TranscriptError::JsonParseError(format!("Failed to parse InnerTube response: {e}"))
        })
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeProvider {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList> {
        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_innertube_api_key(&html, video_id)?;
        let innertube_data = self.fetch_innertube_data(video_id, &api_key).await?;
        extract_captions_json(video_id, &innertube_data)
    }

    async fn fetch(&self, transcript: &Transcript) -> Result<Vec<TranscriptItem>> {
        let video_id = transcript.video_id.as_str();

        if transcript.base_url.contains("&exp=xpe") {
            return Err(TranscriptError::PoTokenRequired(video_id.to_string()));
        }

        self.delay().await;

        let xml = self
            .get_text(&transcript.base_url, None, video_id, "transcript")
            .await?;

        TranscriptParser::new(self.preserve_formatting)
            .parse(&xml)
            .map_err(|e| TranscriptError::XmlParseError(format!("Failed to parse XML: {e}")))
    }

    fn version(&self) -> Option<String> {
        Some(env!("CARGO_PKG_VERSION").to_string())
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

fn watch_url(video_id: &str) -> Result<Url> {
    Url::parse_with_params(WATCH_URL, &[("v", video_id)])
        .map_err(|e| TranscriptError::HttpError(format!("Invalid watch URL: {e}")))
}

/// `Cookie` header value accepting the consent form found in `html`
fn consent_cookie(html: &str, video_id: &str) -> Result<String> {
    CONSENT_VALUE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|value| format!("CONSENT=YES+{}", value.as_str()))
        .ok_or_else(|| TranscriptError::FailedToCreateConsentCookie(video_id.to_string()))
}

fn check_http_errors(response: &reqwest::Response, video_id: &str) -> Result<()> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscriptError::IpBlocked(video_id.to_string()));
    }
    if !status.is_success() {
        return Err(TranscriptError::HttpError(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }
    Ok(())
}

fn extract_innertube_api_key(html: &str, video_id: &str) -> Result<String> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(TranscriptError::IpBlocked(video_id.to_string()));
    }

    INNERTUBE_API_KEY
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TranscriptError::YouTubeDataUnparsable(video_id.to_string()))
}

fn extract_captions_json(video_id: &str, innertube_data: &serde_json::Value) -> Result<TranscriptList> {
    assert_playability(video_id, innertube_data)?;

    let captions_json = innertube_data
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
        .ok_or_else(|| TranscriptError::TranscriptsDisabled(video_id.to_string()))?;

    let translation_languages: Vec<TranslationLanguage> = captions_json
        .get("translationLanguages")
        .and_then(|tl| tl.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|lang| {
                    Some(TranslationLanguage {
                        language_code: lang.get("languageCode")?.as_str()?.to_string(),
                        language: run_text(lang.get("languageName")?)?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let mut list = TranscriptList {
        video_id: video_id.to_string(),
        translation_languages,
        ..TranscriptList::default()
    };

    let caption_tracks = captions_json
        .get("captionTracks")
        .and_then(|ct| ct.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    for caption in caption_tracks {
        let Some(language_code) = caption.get("languageCode").and_then(|l| l.as_str()) else {
            continue;
        };
        let Some(base_url) = caption.get("baseUrl").and_then(|u| u.as_str()) else {
            continue;
        };

        let language = caption
            .get("name")
            .and_then(run_text)
            .unwrap_or(language_code)
            .to_string();

        let is_generated = caption.get("kind").and_then(|k| k.as_str()) == Some("asr");
        let is_translatable = caption
            .get("isTranslatable")
            .and_then(|t| t.as_bool())
            .unwrap_or(false);

        let transcript = Transcript {
            video_id: video_id.to_string(),
            language_code: language_code.to_string(),
            language,
            is_generated,
            is_translatable,
            base_url: base_url.replace("&fmt=srv3", ""),
            translation_languages: if is_translatable {
                list.translation_languages.clone()
            } else {
                Vec::new()
            },
        };

        if is_generated {
            list.generated.push(transcript);
        } else {
            list.manually_created.push(transcript);
        }
    }

    if list.is_empty() {
        return Err(TranscriptError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(list)
}

/// Text of `{"runs": [{"text": ..}]}` or `{"simpleText": ..}` nodes
fn run_text(node: &serde_json::Value) -> Option<&str> {
    node.get("runs")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
        .and_then(|r| r.get("text"))
        .or_else(|| node.get("simpleText"))
        .and_then(|t| t.as_str())
}

fn assert_playability(video_id: &str, innertube_data: &serde_json::Value) -> Result<()> {
    let Some(playability_status) = innertube_data.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability_status
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or("");

    if status == "OK" {
        return Ok(());
    }

    let reason = playability_status
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("");

    match status {
        "LOGIN_REQUIRED" if reason.contains("Sign in to confirm you're not a bot") => {
            Err(TranscriptError::RequestBlocked(video_id.to_string()))
        }
        "LOGIN_REQUIRED" if reason.contains("inappropriate for some users") => {
            Err(TranscriptError::AgeRestricted(video_id.to_string()))
        }
        "ERROR" if reason.contains("unavailable") => {
            Err(TranscriptError::VideoUnavailable(video_id.to_string()))
        }
        _ => Err(TranscriptError::VideoUnplayable(
            video_id.to_string(),
            reason.to_string(),
        )),
    }
}
