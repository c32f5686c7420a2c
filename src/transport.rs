//! Transport trait.
//!
//! `#[async_trait]` is used instead of native async traits so that
//! transports stay object safe: the global [`send`](crate::send) API stores an
//! `Arc<dyn Transport>`, and wrappers such as
//! [`WithInterceptor`](crate::WithInterceptor) forward to any inner transport.
//! Calling a concrete type directly avoids the boxing:
//!
//! ```ignore
//! let transport = PostmarkTransport::new(token);
//! transport.send(&message).await?;  // No dynamic dispatch
//! ```

use async_trait::async_trait;

use crate::error::MailError;
use crate::message::Message;

/// Something that can deliver a [`Message`].
///
/// # Example
///
/// ```ignore
/// use postmark_transport::{Message, PostmarkTransport, Transport};
///
/// let transport = PostmarkTransport::new("server-token");
///
/// let message = Message::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Hello")
///     .text_body("World");
///
/// let sent = transport.send(&message).await?;
/// println!("Sent to {} recipients", sent);
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a single message.
    ///
    /// Returns the number of recipients (to + cc + bcc) the message was
    /// submitted for.
    async fn send(&self, message: &Message) -> Result<usize, MailError>;

    /// Transport name (for logging/debugging).
    fn name(&self) -> &'static str {
        "unknown"
    }
}
