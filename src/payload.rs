//! Message to Postmark payload translation.
//!
//! [`build_payload`] is pure: the same message always yields the same payload
//! and nothing is read or written outside the arguments.
//!
//! ```
//! use postmark_transport::{build_payload, Message};
//!
//! let message = Message::new()
//!     .from("b@example.com")
//!     .to(("Alice", "a@example.com"))
//!     .subject("Hi")
//!     .text_body("hello");
//!
//! let json = serde_json::to_value(build_payload(&message)).unwrap();
//! assert_eq!(json, serde_json::json!({
//!     "From": "b@example.com",
//!     "To": "\"Alice\" <a@example.com>",
//!     "Subject": "Hi",
//!     "TextBody": "hello",
//! }));
//! ```

use serde::Serialize;

use crate::address::{join_addresses, Address};
use crate::message::{Child, Message, Part};

/// Content types whose primary body is sent as `HtmlBody`.
const HTML_CONTENT_TYPES: [&str; 3] = ["text/html", "multipart/alternative", "multipart/mixed"];

/// Headers already represented elsewhere in the payload or set by Postmark.
const EXCLUDED_HEADERS: [&str; 4] = ["Subject", "Content-Type", "MIME-Version", "Date"];

const TAG_HEADER: &str = "X-PM-Tag";
const MESSAGE_ID_HEADER: &str = "Message-ID";
const KEEP_ID_HEADER: &str = "X-PM-KeepID";

/// Body of a `POST /email` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payload {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<PayloadAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<PayloadHeader>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadHeader {
    pub name: String,
    pub value: String,
}

impl PayloadHeader {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadAttachment {
    pub name: String,
    pub content: String, // Base64 encoded
    pub content_type: String,
    #[serde(rename = "ContentID", skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// Translate a message into the Postmark payload.
///
/// Never fails: missing optional data is simply omitted. Required-field
/// checks belong to [`Message::validate`].
pub fn build_payload(message: &Message) -> Payload {
    let mut payload = Payload {
        from: join_addresses(&message.from),
        to: join_addresses(&message.to),
        subject: message.subject.clone(),
        cc: non_empty_list(&message.cc),
        reply_to: non_empty_list(&message.reply_to),
        bcc: non_empty_list(&message.bcc),
        html_body: None,
        text_body: None,
        attachments: None,
        headers: None,
        tag: None,
    };

    // Primary body
    if HTML_CONTENT_TYPES.contains(&message.content_type.as_str()) {
        payload.html_body = Some(message.body.clone());
    } else {
        payload.text_body = Some(message.body.clone());
    }

    // Alternative views override independently of the primary type
    if let Some(plain) = find_part(message, "text/plain") {
        payload.text_body = Some(plain.body.clone());
    }
    if let Some(html) = find_part(message, "text/html") {
        payload.html_body = Some(html.body.clone());
    }

    if !message.children.is_empty() {
        payload.attachments = Some(
            message
                .attachments()
                .map(|a| PayloadAttachment {
                    name: a.filename.clone(),
                    content: a.base64_data(),
                    content_type: a.content_type.clone(),
                    content_id: a.content_id(),
                })
                .collect(),
        );
    }

    if !message.headers.is_empty() {
        let mut headers = Vec::new();

        for header in &message.headers {
            let name = header.name.as_str();
            if EXCLUDED_HEADERS.contains(&name) {
                continue;
            }

            if let Some(value) = header.unstructured_value() {
                if name == TAG_HEADER {
                    payload.tag = Some(value.to_string());
                } else {
                    headers.push(PayloadHeader::new(name, value));
                }
            } else if let Some(body) = header.structured_body() {
                headers.push(PayloadHeader::new(name, body));
                if name == MESSAGE_ID_HEADER {
                    headers.push(PayloadHeader::new(KEEP_ID_HEADER, "true"));
                }
            }
        }

        payload.headers = Some(headers);
    }

    payload
}

fn non_empty_list(addrs: &[Address]) -> Option<String> {
    if addrs.is_empty() {
        None
    } else {
        Some(join_addresses(addrs))
    }
}

/// First body alternative whose content type starts with `mime_type`.
fn find_part<'a>(message: &'a Message, mime_type: &str) -> Option<&'a Part> {
    message.children.iter().find_map(|child| match child {
        Child::Part(part) if part.content_type.starts_with(mime_type) => Some(part),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attachment, Header};

    fn base() -> Message {
        Message::new()
            .from("sender@example.com")
            .to("recipient@example.com")
            .subject("Subject")
    }

    #[test]
    fn test_primary_body_html_types() {
        for ct in HTML_CONTENT_TYPES {
            let payload = build_payload(&base().body(ct, "<p>hi</p>"));
            assert_eq!(payload.html_body.as_deref(), Some("<p>hi</p>"), "{}", ct);
            assert_eq!(payload.text_body, None, "{}", ct);
        }
    }

    #[test]
    fn test_primary_body_other_types_are_text() {
        let payload = build_payload(&base().body("text/calendar", "BEGIN:VCALENDAR"));
        assert_eq!(payload.text_body.as_deref(), Some("BEGIN:VCALENDAR"));
        assert_eq!(payload.html_body, None);
    }

    #[test]
    fn test_part_prefix_match_with_parameters() {
        let message = base()
            .html_body("<p>primary</p>")
            .part("text/plain; charset=utf-8", "plain");
        let payload = build_payload(&message);
        assert_eq!(payload.text_body.as_deref(), Some("plain"));
        assert_eq!(payload.html_body.as_deref(), Some("<p>primary</p>"));
    }

    #[test]
    fn test_first_matching_part_wins() {
        let message = base()
            .body("multipart/alternative", "<p>primary</p>")
            .part("text/html", "<p>first</p>")
            .part("text/html", "<p>second</p>");
        let payload = build_payload(&message);
        assert_eq!(payload.html_body.as_deref(), Some("<p>first</p>"));
    }

    #[test]
    fn test_attachment_with_text_content_type_is_not_a_view() {
        let message = base().text_body("primary").attachment(
            Attachment::from_bytes("notes.txt", b"notes".to_vec()).content_type("text/plain"),
        );
        let payload = build_payload(&message);
        assert_eq!(payload.text_body.as_deref(), Some("primary"));
        assert_eq!(payload.attachments.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_only_parts_yield_empty_attachments() {
        let payload = build_payload(&base().part("text/html", "<p>x</p>"));
        assert_eq!(payload.attachments, Some(vec![]));
    }

    #[test]
    fn test_no_children_no_attachments_key() {
        let payload = build_payload(&base());
        assert_eq!(payload.attachments, None);
    }

    #[test]
    fn test_empty_headers_after_exclusion_still_emitted() {
        let message = base().header(Header::text("Subject", "ignored"));
        let payload = build_payload(&message);
        assert_eq!(payload.headers, Some(vec![]));
    }

    #[test]
    fn test_last_tag_wins() {
        let message = base().tag("first").tag("second");
        let payload = build_payload(&message);
        assert_eq!(payload.tag.as_deref(), Some("second"));
        assert_eq!(payload.headers, Some(vec![]));
    }

    #[test]
    fn test_unstructured_message_id_gets_no_keep_id() {
        let message = base().header(Header::text("Message-ID", "<raw@example.com>"));
        let payload = build_payload(&message);
        assert_eq!(
            payload.headers,
            Some(vec![PayloadHeader::new("Message-ID", "<raw@example.com>")])
        );
    }

    #[test]
    fn test_mailbox_headers_skipped() {
        let message = base().header(Header::mailbox(
            "Sender",
            vec!["ops@example.com".into()],
        ));
        let payload = build_payload(&message);
        assert_eq!(payload.headers, Some(vec![]));
    }
}
