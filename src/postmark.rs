//! Postmark API transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use postmark_transport::{Message, PostmarkTransport, Transport};
//!
//! let transport = PostmarkTransport::new("xxxxx-xxxx-xxxx-xxxx-xxxxxx");
//!
//! let message = Message::new()
//!     .from("sender@example.com")
//!     .to("recipient@example.com")
//!     .subject("Hello")
//!     .html_body("<h1>Hello</h1>")
//!     .part("text/plain", "Hello")
//!     .tag("welcome");
//!
//! let recipients = transport.send(&message).await?;
//! ```
//!
//! Every call is exactly one `POST /email`. Failures are not retried.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::PostmarkConfig;
use crate::error::MailError;
use crate::message::Message;
use crate::payload::{build_payload, Payload};
use crate::transport::Transport;

const POSTMARK_API_URL: &str = "https://api.postmarkapp.com";
const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Postmark API transport.
#[derive(Clone)]
pub struct PostmarkTransport {
    server_token: String,
    client: Client,
    base_url: String,
}

impl PostmarkTransport {
    /// Create a new transport with the given server token.
    pub fn new(server_token: impl Into<String>) -> Self {
        Self::with_client(server_token, Client::new())
    }

    /// Create with a caller-owned reqwest client.
    pub fn with_client(server_token: impl Into<String>, client: Client) -> Self {
        Self {
            server_token: server_token.into(),
            client,
            base_url: POSTMARK_API_URL.to_string(),
        }
    }

    /// Create from settings, building an HTTP client from its options.
    pub fn from_config(config: &PostmarkConfig) -> Result<Self, MailError> {
        config.validate()?;
        let client = config.http.build_client()?;
        Ok(Self::with_client(config.secret.clone(), client))
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// The request body that [`send`](Transport::send) would post.
    pub fn build_payload(&self, message: &Message) -> Payload {
        build_payload(message)
    }

    fn endpoint(&self) -> String {
        format!("{}/email", self.base_url)
    }

    fn parse_error(status: StatusCode, error: Option<PostmarkError>) -> MailError {
        let message = match error {
            Some(e) => format!("[{}] {}", e.error_code, e.message),
            None => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        MailError::transport_with_status(message, status.as_u16())
    }
}

impl std::fmt::Debug for PostmarkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostmarkTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for PostmarkTransport {
    async fn send(&self, message: &Message) -> Result<usize, MailError> {
        message.validate()?;

        let payload = build_payload(message);
        let url = self.endpoint();

        tracing::debug!(
            url = %url,
            attachments = payload.attachments.as_ref().map_or(0, Vec::len),
            headers = payload.headers.as_ref().map_or(0, Vec::len),
            "Posting message to Postmark"
        );

        let response = self
            .client
            .post(&url)
            .header(SERVER_TOKEN_HEADER, &self.server_token)
            .header("Accept", "application/json")
            .header("User-Agent", format!("postmark-transport/{}", crate::VERSION))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(message.recipient_count())
        } else {
            let error = response.json::<PostmarkError>().await.ok();
            Err(Self::parse_error(status, error))
        }
    }

    fn name(&self) -> &'static str {
        "postmark"
    }
}

/// Error body returned by the Postmark API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkError {
    error_code: i32,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_with_body() {
        let err = PostmarkTransport::parse_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(PostmarkError {
                error_code: 300,
                message: "Invalid email request".into(),
            }),
        );
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("[300] Invalid email request"));
    }

    #[test]
    fn test_parse_error_without_body() {
        let err = PostmarkTransport::parse_error(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_endpoint() {
        let transport = PostmarkTransport::new("token");
        assert_eq!(transport.endpoint(), "https://api.postmarkapp.com/email");

        let transport = transport.base_url("http://localhost:8080/");
        assert_eq!(transport.endpoint(), "http://localhost:8080/email");
    }

    #[test]
    fn test_debug_hides_token() {
        let transport = PostmarkTransport::new("secret-token");
        assert!(!format!("{:?}", transport).contains("secret-token"));
    }

    #[test]
    fn test_name() {
        assert_eq!(PostmarkTransport::new("token").name(), "postmark");
    }
}
