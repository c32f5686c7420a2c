//! Message headers.
//!
//! A [`Header`] pairs a field name with a [`HeaderKind`]. Kinds fall into two
//! families that the payload builder treats differently:
//!
//! - raw text ([`HeaderKind::Unstructured`], [`HeaderKind::Dkim`]), exposed via
//!   [`Header::unstructured_value`]
//! - structured ([`HeaderKind::Date`], [`HeaderKind::Identification`],
//!   [`HeaderKind::Parameterized`], [`HeaderKind::Path`]), rendered via
//!   [`Header::structured_body`]
//!
//! [`HeaderKind::Mailbox`] belongs to neither and is never forwarded.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// A single message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Field name as it appears on the wire (e.g. `Message-ID`)
    pub name: String,
    pub kind: HeaderKind,
}

/// The shape of a header's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum HeaderKind {
    /// Free-form text.
    Unstructured(String),
    /// A DKIM signature value, kept verbatim.
    Dkim(String),
    /// A timestamp, rendered as RFC 2822.
    Date(DateTime<FixedOffset>),
    /// One or more message identifiers (without angle brackets).
    Identification(Vec<String>),
    /// A value followed by `key=value` parameters.
    Parameterized {
        value: String,
        params: Vec<(String, String)>,
    },
    /// A single path address (`Return-Path`), possibly empty.
    Path(Option<String>),
    /// A list of mailboxes.
    Mailbox(Vec<Address>),
}

impl Header {
    pub fn new(name: impl Into<String>, kind: HeaderKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A free-form text header.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, HeaderKind::Unstructured(value.into()))
    }

    /// A DKIM signature header.
    pub fn dkim(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, HeaderKind::Dkim(value.into()))
    }

    pub fn date(name: impl Into<String>, date: DateTime<FixedOffset>) -> Self {
        Self::new(name, HeaderKind::Date(date))
    }

    /// An identification header carrying a single id.
    ///
    /// ```
    /// use postmark_transport::Header;
    ///
    /// let header = Header::id("Message-ID", "abc@example.com");
    /// assert_eq!(header.structured_body().as_deref(), Some("<abc@example.com>"));
    /// ```
    pub fn id(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(name, HeaderKind::Identification(vec![id.into()]))
    }

    /// An identification header carrying several ids (`References`).
    pub fn ids<I, S>(name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            HeaderKind::Identification(ids.into_iter().map(Into::into).collect()),
        )
    }

    pub fn parameterized<I, K, V>(
        name: impl Into<String>,
        value: impl Into<String>,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            HeaderKind::Parameterized {
                value: value.into(),
                params: params
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        )
    }

    pub fn path(name: impl Into<String>, address: Option<String>) -> Self {
        Self::new(name, HeaderKind::Path(address))
    }

    pub fn mailbox(name: impl Into<String>, addresses: Vec<Address>) -> Self {
        Self::new(name, HeaderKind::Mailbox(addresses))
    }

    /// Raw value of a text or DKIM header.
    pub fn unstructured_value(&self) -> Option<&str> {
        match &self.kind {
            HeaderKind::Unstructured(value) | HeaderKind::Dkim(value) => Some(value),
            _ => None,
        }
    }

    /// Rendered field body of a date, identification, parameterized or path header.
    pub fn structured_body(&self) -> Option<String> {
        match &self.kind {
            HeaderKind::Date(date) => Some(date.to_rfc2822()),
            HeaderKind::Identification(ids) => Some(
                ids.iter()
                    .map(|id| format!("<{}>", id))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            HeaderKind::Parameterized { value, params } => {
                let mut body = value.clone();
                for (key, val) in params {
                    body.push_str("; ");
                    body.push_str(key);
                    body.push('=');
                    body.push_str(&quote_param(val));
                }
                Some(body)
            }
            HeaderKind::Path(address) => {
                Some(format!("<{}>", address.as_deref().unwrap_or_default()))
            }
            HeaderKind::Unstructured(_) | HeaderKind::Dkim(_) | HeaderKind::Mailbox(_) => None,
        }
    }

    /// Field body for any kind, as it would be written on the wire.
    pub fn field_body(&self) -> String {
        match &self.kind {
            HeaderKind::Mailbox(addresses) => addresses
                .iter()
                .map(Address::quoted)
                .collect::<Vec<_>>()
                .join(", "),
            _ => self
                .unstructured_value()
                .map(str::to_string)
                .or_else(|| self.structured_body())
                .unwrap_or_default(),
        }
    }
}

// RFC 2045 tspecials plus whitespace force a quoted-string.
fn quote_param(value: &str) -> String {
    const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || TSPECIALS.contains(c));

    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
