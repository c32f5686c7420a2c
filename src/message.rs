//! Message struct with builder pattern.

use serde::{Deserialize, Serialize};

use crate::address::{Address, ToAddress};
use crate::attachment::Attachment;
use crate::error::MailError;
use crate::header::Header;

/// An alternative view of the message body (plain text or HTML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub content_type: String,
    pub body: String,
}

impl Part {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// A child entity of a message: either a body alternative or an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Child {
    Part(Part),
    Attachment(Attachment),
}

impl From<Part> for Child {
    fn from(part: Part) -> Self {
        Self::Part(part)
    }
}

impl From<Attachment> for Child {
    fn from(attachment: Attachment) -> Self {
        Self::Attachment(attachment)
    }
}

/// An email message.
///
/// ```
/// use postmark_transport::{Attachment, Message};
///
/// let message = Message::new()
///     .from(("Jarvis", "jarvis@example.com"))
///     .to("tony.stark@example.com")
///     .subject("Suit diagnostics")
///     .html_body("<h1>All systems nominal</h1>")
///     .part("text/plain", "All systems nominal")
///     .attachment(Attachment::from_bytes("report.pdf", b"%PDF".to_vec()))
///     .tag("diagnostics");
///
/// assert_eq!(message.recipient_count(), 1);
/// ```
///
/// The top-level `content_type` decides which payload field `body` lands in;
/// alternative views and attachments live in `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender addresses
    pub from: Vec<Address>,
    /// Primary recipients
    pub to: Vec<Address>,
    /// Carbon copy recipients
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients
    pub bcc: Vec<Address>,
    pub reply_to: Vec<Address>,
    pub subject: String,
    /// Top-level MIME type (e.g. `text/plain`, `multipart/alternative`)
    pub content_type: String,
    /// Primary body for `content_type`
    pub body: String,
    /// Alternative bodies and attachments, in order
    pub children: Vec<Child>,
    /// Headers, in order
    pub headers: Vec<Header>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            from: Vec::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            subject: String::new(),
            content_type: "text/plain".to_string(),
            body: String::new(),
            children: Vec::new(),
            headers: Vec::new(),
        }
    }
}

impl Message {
    /// Create a new empty `text/plain` message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sender address.
    ///
    /// Accepts anything that implements `ToAddress`:
    /// - `"email@example.com"` - just email
    /// - `("Name", "email@example.com")` - name and email
    pub fn from(mut self, addr: impl ToAddress) -> Self {
        self.from.push(addr.to_address());
        self
    }

    /// Add a recipient.
    pub fn to(mut self, addr: impl ToAddress) -> Self {
        self.to.push(addr.to_address());
        self
    }

    /// Replace all recipients.
    pub fn put_to(mut self, addrs: Vec<Address>) -> Self {
        self.to = addrs;
        self
    }

    pub fn cc(mut self, addr: impl ToAddress) -> Self {
        self.cc.push(addr.to_address());
        self
    }

    pub fn put_cc(mut self, addrs: Vec<Address>) -> Self {
        self.cc = addrs;
        self
    }

    pub fn bcc(mut self, addr: impl ToAddress) -> Self {
        self.bcc.push(addr.to_address());
        self
    }

    pub fn put_bcc(mut self, addrs: Vec<Address>) -> Self {
        self.bcc = addrs;
        self
    }

    pub fn reply_to(mut self, addr: impl ToAddress) -> Self {
        self.reply_to.push(addr.to_address());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the primary body and its content type.
    pub fn body(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self.body = body.into();
        self
    }

    /// Set a `text/plain` primary body.
    pub fn text_body(self, body: impl Into<String>) -> Self {
        self.body("text/plain", body)
    }

    /// Set a `text/html` primary body.
    pub fn html_body(self, body: impl Into<String>) -> Self {
        self.body("text/html", body)
    }

    /// Add an alternative body view.
    pub fn part(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.children.push(Child::Part(Part::new(content_type, body)));
        self
    }

    /// Add an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.children.push(Child::Attachment(attachment));
        self
    }

    /// Append a header.
    pub fn header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Tag the message for Postmark statistics (`X-PM-Tag`).
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.header(Header::text("X-PM-Tag", tag))
    }

    /// Set an explicit `Message-ID` (without angle brackets).
    pub fn message_id(self, id: impl Into<String>) -> Self {
        self.header(Header::id("Message-ID", id))
    }

    /// Attach a freshly generated `Message-ID` under `domain`.
    pub fn generate_message_id(self, domain: &str) -> Self {
        let id = format!("{}@{}", uuid::Uuid::new_v4().simple(), domain);
        self.message_id(id)
    }

    /// Number of recipients a send addresses (to + cc + bcc).
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// All recipients in to, cc, bcc order.
    pub fn all_recipients(&self) -> Vec<&Address> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .collect()
    }

    /// Attachment children only.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.children.iter().filter_map(|child| match child {
            Child::Attachment(a) => Some(a),
            Child::Part(_) => None,
        })
    }

    /// Body alternative children only.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.children.iter().filter_map(|child| match child {
            Child::Part(p) => Some(p),
            Child::Attachment(_) => None,
        })
    }

    /// Check the fields the delivery API cannot do without.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.from.is_empty() {
            return Err(MailError::MissingField("from"));
        }
        if self.to.is_empty() {
            return Err(MailError::MissingField("to"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderKind;

    #[test]
    fn test_builder() {
        let message = Message::new()
            .from("sender@example.com")
            .to("recipient@example.com")
            .subject("Test")
            .text_body("Hello");

        assert_eq!(message.from[0].email, "sender@example.com");
        assert_eq!(message.to.len(), 1);
        assert_eq!(message.subject, "Test");
        assert_eq!(message.content_type, "text/plain");
        assert_eq!(message.body, "Hello");
    }

    #[test]
    fn test_default_content_type() {
        assert_eq!(Message::new().content_type, "text/plain");
    }

    #[test]
    fn test_recipient_count() {
        let message = Message::new()
            .to("one@example.com")
            .to("two@example.com")
            .cc("cc@example.com")
            .bcc("bcc@example.com")
            .reply_to("reply@example.com");

        assert_eq!(message.recipient_count(), 4);
        assert_eq!(message.all_recipients().len(), 4);
    }

    #[test]
    fn test_children_split() {
        let message = Message::new()
            .part("text/plain", "plain")
            .attachment(Attachment::from_bytes("a.txt", b"a".to_vec()))
            .part("text/html", "<p>html</p>");

        assert_eq!(message.children.len(), 3);
        assert_eq!(message.parts().count(), 2);
        assert_eq!(message.attachments().count(), 1);
    }

    #[test]
    fn test_tag_and_message_id_headers() {
        let message = Message::new().tag("welcome").message_id("abc@example.com");

        assert_eq!(message.headers[0].name, "X-PM-Tag");
        assert_eq!(message.headers[0].unstructured_value(), Some("welcome"));
        assert_eq!(message.headers[1].name, "Message-ID");
        assert_eq!(
            message.headers[1].kind,
            HeaderKind::Identification(vec!["abc@example.com".to_string()])
        );
    }

    #[test]
    fn test_generate_message_id() {
        let message = Message::new().generate_message_id("example.com");
        match &message.headers[0].kind {
            HeaderKind::Identification(ids) => {
                assert_eq!(ids.len(), 1);
                assert!(ids[0].ends_with("@example.com"));
            }
            other => panic!("unexpected header kind: {:?}", other),
        }
    }

    #[test]
    fn test_validate() {
        let missing_from = Message::new().to("recipient@example.com");
        assert!(matches!(
            missing_from.validate(),
            Err(MailError::MissingField("from"))
        ));

        let missing_to = Message::new().from("sender@example.com");
        assert!(matches!(
            missing_to.validate(),
            Err(MailError::MissingField("to"))
        ));

        let valid = Message::new()
            .from("sender@example.com")
            .to("recipient@example.com");
        assert!(valid.validate().is_ok());
    }
}
