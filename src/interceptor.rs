//! Pre-send hooks.
//!
//! Interceptors sit in front of a transport and see every message before it is
//! translated and posted. They can rewrite the message or block it by
//! returning an error, in which case no request is made.
//!
//! # Example
//!
//! ```rust,ignore
//! use postmark_transport::{Header, InterceptorExt, PostmarkTransport};
//!
//! let transport = PostmarkTransport::new(token)
//!     .with_interceptor(|message: Message| {
//!         Ok(message.header(Header::text("X-Env", "staging")))
//!     });
//! ```

use async_trait::async_trait;

use crate::error::MailError;
use crate::message::Message;
use crate::transport::Transport;

/// Transforms a message before it is sent.
///
/// Return `Ok(message)` to continue with the (possibly modified) message,
/// `Err(...)` to block it.
///
/// ```rust,ignore
/// struct TenantBranding { tenant_id: String }
///
/// impl Interceptor for TenantBranding {
///     fn intercept(&self, message: Message) -> Result<Message, MailError> {
///         Ok(message.header(Header::text("X-Tenant-ID", &self.tenant_id)))
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync {
    fn intercept(&self, message: Message) -> Result<Message, MailError>;
}

impl<F> Interceptor for F
where
    F: Fn(Message) -> Result<Message, MailError> + Send + Sync,
{
    fn intercept(&self, message: Message) -> Result<Message, MailError> {
        (self)(message)
    }
}

/// A transport wrapper that applies an interceptor before sending.
///
/// Created by [`InterceptorExt::with_interceptor`].
#[derive(Debug, Clone)]
pub struct WithInterceptor<T, I> {
    inner: T,
    interceptor: I,
}

impl<T, I> WithInterceptor<T, I> {
    pub(crate) fn new(inner: T, interceptor: I) -> Self {
        Self { inner, interceptor }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T, I> Transport for WithInterceptor<T, I>
where
    T: Transport,
    I: Interceptor,
{
    async fn send(&self, message: &Message) -> Result<usize, MailError> {
        let message = self.interceptor.intercept(message.clone())?;
        self.inner.send(&message).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Extension trait for adding interceptors to any transport.
///
/// Interceptors chain; the last one added runs first:
///
/// ```rust,ignore
/// let transport = PostmarkTransport::new(token)
///     .with_interceptor(add_tracking)
///     .with_interceptor(validate_recipients);
/// ```
pub trait InterceptorExt: Transport + Sized {
    fn with_interceptor<I>(self, interceptor: I) -> WithInterceptor<Self, I>
    where
        I: Interceptor,
    {
        WithInterceptor::new(self, interceptor)
    }
}

impl<T: Transport + Sized> InterceptorExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;

    struct AddHeader {
        name: &'static str,
        value: &'static str,
    }

    impl Interceptor for AddHeader {
        fn intercept(&self, message: Message) -> Result<Message, MailError> {
            Ok(message.header(Header::text(self.name, self.value)))
        }
    }

    #[test]
    fn test_closure_interceptor_compiles() {
        fn assert_interceptor<I: Interceptor>(_: I) {}

        let closure = |message: Message| -> Result<Message, MailError> { Ok(message) };
        assert_interceptor(closure);
    }

    #[test]
    fn test_struct_interceptor_adds_header() {
        let interceptor = AddHeader {
            name: "X-Test",
            value: "test",
        };
        let message = interceptor.intercept(Message::new()).unwrap();
        assert_eq!(message.headers.len(), 1);
        assert_eq!(message.headers[0].unstructured_value(), Some("test"));
    }
}
