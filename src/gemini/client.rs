use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::errors::RuntimeError;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Minimal REST client for `models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RuntimeError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RuntimeError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!(model, turns = request.contents.len(), "generateContent");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RuntimeError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::types::WireContent;
    use crate::runtime::Content;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![WireContent::from(&Content::user_text("hello"))],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn posts_to_model_endpoint_with_api_key() {
        let router = Router::new().route(
            "/models/{call}",
            post(
                |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let prompt = body["contents"][0]["parts"][0]["text"].clone();
                    Json(json!({
                        "candidates": [{"content": {"role": "model", "parts": [
                            {"text": format!("{call}|{key}|{}", prompt.as_str().unwrap_or_default())}
                        ]}}]
                    }))
                },
            ),
        );
        let base = serve(router).await;
        let client = GeminiClient::new("secret", format!("{base}/"), Duration::from_secs(5)).unwrap();

        let response = client.generate_content("gemini-test", &request()).await.unwrap();
        assert_eq!(response.text(), "gemini-test:generateContent|secret|hello");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let router = Router::new().route(
            "/models/{call}",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exhausted") }),
        );
        let base = serve(router).await;
        let client = GeminiClient::new("k", base, Duration::from_secs(5)).unwrap();

        let err = client.generate_content("m", &request()).await.unwrap_err();
        match err {
            RuntimeError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let router = Router::new().route("/models/{call}", post(|| async { "not json" }));
        let base = serve(router).await;
        let client = GeminiClient::new("k", base, Duration::from_secs(5)).unwrap();

        let err = client.generate_content("m", &request()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Decode(_)));
    }
}
