use std::fmt::{self, Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An opaque conversation identifier assigned by the backend.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Creates a `ChatId` from its raw representation.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Returns the raw representation of this id.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is empty, which the backend uses to
    /// mean "no conversation".
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for ChatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for ChatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChatId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An entry in the user's conversation list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversation {
    /// Identity of the conversation, stable for its lifetime.
    #[serde(alias = "_id")]
    pub id: ChatId,
    /// Title set when the conversation was started.
    #[serde(default)]
    pub title: String,
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The generation backend.
    Assistant,
}

/// A transcript message.
///
/// A user message carries `prompt`. An assistant message carries any
/// combination of the remaining fields, depending on what the backend
/// chose to return; they are independent, not alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// The author of this message.
    pub role: Role,
    /// The prompt text of a user message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Plain answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// A code block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// An explanation of the generated code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// A short summary of the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Message {
    /// Creates a user message with the given prompt.
    #[inline]
    pub fn user<S: Into<String>>(prompt: S) -> Self {
        Self {
            role: Role::User,
            prompt: Some(prompt.into()),
            ..Self::assistant()
        }
    }

    /// Creates an assistant message without any facet.
    #[inline]
    pub fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            prompt: None,
            text: None,
            code: None,
            explanation: None,
            summary: None,
        }
    }

    /// Sets the text facet.
    #[inline]
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the code facet.
    #[inline]
    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the explanation facet.
    #[inline]
    pub fn with_explanation<S: Into<String>>(mut self, explanation: S) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Sets the summary facet.
    #[inline]
    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns every non-empty assistant facet, in display order.
    pub fn facets(&self) -> impl Iterator<Item = Facet<'_>> {
        [
            self.text.as_deref().map(Facet::Text),
            self.code.as_deref().map(Facet::Code),
            self.explanation.as_deref().map(Facet::Explanation),
            self.summary.as_deref().map(Facet::Summary),
        ]
        .into_iter()
        .flatten()
        .filter(|facet| !facet.content().is_empty())
    }
}

/// A single displayable part of an assistant message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet<'a> {
    /// Plain answer text.
    Text(&'a str),
    /// A code block.
    Code(&'a str),
    /// An explanation.
    Explanation(&'a str),
    /// A summary.
    Summary(&'a str),
}

impl<'a> Facet<'a> {
    /// Returns the content of this facet.
    #[inline]
    pub fn content(&self) -> &'a str {
        match *self {
            Facet::Text(s)
            | Facet::Code(s)
            | Facet::Explanation(s)
            | Facet::Summary(s) => s,
        }
    }
}

/// An opaque bearer credential issued by the authentication layer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wraps a bearer token.
    #[inline]
    pub fn bearer<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[inline]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_conversation_accepts_mongo_id() {
        let chats: Vec<Conversation> = serde_json::from_value(json!([
            { "_id": "c1", "title": "landing page" },
            { "id": "c2", "title": "blog" },
        ]))
        .unwrap();
        assert_eq!(chats[0].id, ChatId::new("c1"));
        assert_eq!(chats[1].id.as_str(), "c2");
        assert_eq!(chats[1].title, "blog");
    }

    #[test]
    fn test_message_facets() {
        let msg: Message = serde_json::from_value(json!({
            "role": "assistant",
            "text": "Here you go",
            "code": "",
            "summary": "Adds a header",
        }))
        .unwrap();
        let facets: Vec<_> = msg.facets().collect();
        assert_eq!(
            facets,
            vec![Facet::Text("Here you go"), Facet::Summary("Adds a header")]
        );

        let msg = Message::user("build a landing page");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.facets().count(), 0);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::bearer("secret-token");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("secret-token"));
        assert_eq!(credential.token(), "secret-token");
    }
}
