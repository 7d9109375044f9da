use std::fmt::{self, Display};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::chat::ChatId;

/// The maximum number of files a single generation request may carry.
///
/// Attachments beyond this limit are dropped silently.
pub const MAX_ATTACHMENTS: usize = 6;

/// Selects which model the backend should use for a request.
///
/// The value is forwarded as-is; the client performs no provider-specific
/// logic.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Let the backend pick.
    #[default]
    Auto,
    /// A canned backend used for testing.
    Mock,
    /// OpenAI models.
    #[serde(rename = "openai")]
    OpenAI,
    /// Google Gemini models.
    Gemini,
    /// Anthropic Claude models.
    Claude,
}

impl Provider {
    /// All recognized providers, in menu order.
    pub const ALL: [Provider; 5] = [
        Provider::Auto,
        Provider::Mock,
        Provider::OpenAI,
        Provider::Gemini,
        Provider::Claude,
    ];

    /// Returns the wire value of this provider.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Auto => "auto",
            Provider::Mock => "mock",
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownProvider(String);

impl Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {:?}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownProvider(s.to_owned()))
    }
}

/// A local file attached to a generation request for the backend to
/// modify.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attachment {
    /// File name reported to the backend.
    pub name: String,
    /// Raw file content.
    pub data: Bytes,
}

impl Attachment {
    /// Creates an attachment.
    #[inline]
    pub fn new<S: Into<String>, B: Into<Bytes>>(name: S, data: B) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A request to the generation endpoint.
///
/// The request is encoded as JSON when `attachments` is empty, and as a
/// multipart form otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    /// The natural-language prompt.
    pub prompt: String,
    /// The model selector.
    pub provider: Provider,
    /// The conversation to extend, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    /// Files to modify. Never serialized into the JSON body.
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl SendRequest {
    /// Returns `true` if this request must be sent as a multipart form.
    #[inline]
    pub fn is_multipart(&self) -> bool {
        !self.attachments.is_empty()
    }
}
