//! # postmark-transport
//!
//! Turn structured email messages into Postmark API payloads and send them
//! with a single HTTP request.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use postmark_transport::{Message, PostmarkTransport, Transport};
//!
//! let transport = PostmarkTransport::new("server-token");
//!
//! let message = Message::new()
//!     .from(("Acme", "noreply@acme.test"))
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .html_body("<h1>Hello</h1>")
//!     .part("text/plain", "Hello")
//!     .tag("welcome");
//!
//! let recipients = transport.send(&message).await?;
//! ```
//!
//! ## Global Transport
//!
//! With `POSTMARK_API_KEY` set, messages can be sent from anywhere:
//!
//! ```rust,ignore
//! postmark_transport::send(&message).await?;
//! ```
//!
//! See [`PostmarkConfig`] for the environment variables that are read.
//!
//! ## Payload Only
//!
//! [`build_payload`] is a pure function and can be used without any I/O, e.g.
//! to inspect or log exactly what would be posted.
//!
//! ## Feature Flags
//!
//! - `metrics` - Prometheus-style metrics (counters/histograms) for [`send`]
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `postmark_transport_messages_total` | Counter | transport, status | Messages sent |
//! | `postmark_transport_send_duration_seconds` | Histogram | transport | Send duration |

/// The version of the postmark-transport crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod attachment;
mod config;
mod error;
mod header;
mod interceptor;
mod message;
mod payload;
mod postmark;
mod transport;

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

pub use address::{join_addresses, Address, ToAddress};
pub use attachment::{Attachment, Disposition};
pub use config::{HttpOptions, PostmarkConfig};
pub use error::MailError;
pub use header::{Header, HeaderKind};
pub use interceptor::{Interceptor, InterceptorExt, WithInterceptor};
pub use message::{Child, Message, Part};
pub use payload::{build_payload, Payload, PayloadAttachment, PayloadHeader};
pub use postmark::PostmarkTransport;
pub use transport::Transport;

// ============================================================================
// Global Transport
// ============================================================================

static TRANSPORT: RwLock<Option<Arc<dyn Transport>>> = RwLock::new(None);

fn create_transport_from_env() -> Result<Arc<dyn Transport>, MailError> {
    let config = PostmarkConfig::from_env()?;
    tracing::debug!(
        connect_timeout_secs = config.http.connect_timeout_secs,
        "Configuring Postmark transport from environment"
    );
    Ok(Arc::new(PostmarkTransport::from_config(&config)?))
}

/// Get or initialize the global transport.
fn get_transport() -> Result<Arc<dyn Transport>, MailError> {
    {
        let guard = TRANSPORT.read();
        if let Some(ref transport) = *guard {
            return Ok(Arc::clone(transport));
        }
    }

    let created = create_transport_from_env()?;
    let mut guard = TRANSPORT.write();

    // Another caller may have won the race while we were building.
    let transport = guard.get_or_insert(created);
    Ok(Arc::clone(transport))
}

/// Check whether the global transport is configured or can be created from
/// the environment.
pub fn is_configured() -> bool {
    TRANSPORT.read().is_some() || std::env::var("POSTMARK_API_KEY").is_ok()
}

/// Initialize the global transport from environment variables.
///
/// ```rust,ignore
/// // In main.rs
/// postmark_transport::init().ok(); // Ignore error if mail is not configured
/// ```
pub fn init() -> Result<(), MailError> {
    if !is_configured() {
        return Err(MailError::NotConfigured);
    }
    get_transport().map(|_| ())
}

/// Send a message through the global transport.
///
/// Auto-configures from environment variables on first call. Returns the
/// number of recipients the message was submitted for.
pub async fn send(message: &Message) -> Result<usize, MailError> {
    let transport = get_transport()?;
    send_with(message, &*transport).await
}

/// Send a message through a specific transport (per-call override).
pub async fn send_with<T: Transport + ?Sized>(
    message: &Message,
    transport: &T,
) -> Result<usize, MailError> {
    let name = transport.name();

    let span = tracing::info_span!(
        "postmark_transport.send",
        transport = name,
        to = ?message.to.iter().map(|a| &a.email).collect::<Vec<_>>(),
        subject = %message.subject,
    );

    #[cfg(feature = "metrics")]
    let start = Instant::now();

    let result = async {
        tracing::debug!("Sending message");
        let result = transport.send(message).await;
        match &result {
            Ok(count) => tracing::info!(recipients = count, "Message sent"),
            Err(e) => tracing::error!(error = %e, status = ?e.status(), "Message send failed"),
        }
        result
    }
    .instrument(span)
    .await;

    #[cfg(feature = "metrics")]
    {
        let duration = start.elapsed().as_secs_f64();
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("postmark_transport_messages_total", "transport" => name, "status" => status)
            .increment(1);
        metrics::histogram!("postmark_transport_send_duration_seconds", "transport" => name)
            .record(duration);
    }

    result
}

/// Manually configure the global transport.
///
/// Later calls replace the previous transport.
pub fn configure<T: Transport + 'static>(transport: T) {
    *TRANSPORT.write() = Some(Arc::new(transport));
}

/// Configure with an Arc'd transport.
pub fn configure_arc(transport: Arc<dyn Transport>) {
    *TRANSPORT.write() = Some(transport);
}

/// Reset the global transport (useful for tests).
///
/// The next [`send`] re-initializes from environment variables.
pub fn reset() {
    *TRANSPORT.write() = None;
}

/// The configured global transport, if initialized.
pub fn transport() -> Option<Arc<dyn Transport>> {
    TRANSPORT.read().as_ref().cloned()
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        build_payload, configure, send, send_with, Address, Attachment, Header, MailError,
        Message, PostmarkTransport, ToAddress, Transport,
    };
}
