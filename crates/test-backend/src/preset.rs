use std::collections::HashMap;

use ai_builder_model::SendResponse;
use serde::{Deserialize, Serialize};

/// The preset reply to a single `send` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    /// The backend accepts the prompt and answers with this payload.
    #[serde(rename = "success")]
    Success(SendResponse),
    /// The backend answers with a non-success status.
    #[serde(rename = "rejected")]
    Rejected {
        /// Message put into the error envelope, if any.
        message: Option<String>,
    },
    /// The request never reaches the backend.
    #[serde(rename = "transport")]
    Transport,
}

impl PresetReply {
    /// A plain answer carrying `text`, recorded in conversation `chat_id`.
    pub fn answer(chat_id: Option<&str>, text: &str) -> Self {
        Self::Success(SendResponse {
            chat_id: chat_id.map(Into::into),
            text: Some(text.to_owned()),
            ..Default::default()
        })
    }

    /// A generated project made of `files`, recorded in conversation
    /// `chat_id`.
    pub fn project<'a>(
        chat_id: Option<&str>,
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let (paths, file_map): (Vec<String>, HashMap<String, String>) = files
            .into_iter()
            .map(|(path, content)| {
                (path.to_owned(), (path.to_owned(), content.to_owned()))
            })
            .unzip();
        Self::Success(SendResponse {
            intent: Some(ai_builder_model::INTENT_GENERATE_PROJECT.to_owned()),
            chat_id: chat_id.map(Into::into),
            files: Some(paths),
            file_map: Some(file_map),
            ..Default::default()
        })
    }

    /// A modification report for `files` in `folder`, recorded in
    /// conversation `chat_id`.
    pub fn modified<'a>(
        chat_id: Option<&str>,
        folder: &str,
        files: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::Success(SendResponse {
            intent: Some(ai_builder_model::INTENT_MODIFY_FILES.to_owned()),
            chat_id: chat_id.map(Into::into),
            folder: Some(folder.to_owned()),
            files: Some(files.into_iter().map(ToOwned::to_owned).collect()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let replies = vec![
            PresetReply::project(
                Some("c1"),
                [("index.html", "<html></html>"), ("app.js", "run()")],
            ),
            PresetReply::Rejected {
                message: Some("Provider quota exceeded".to_owned()),
            },
            PresetReply::Transport,
        ];

        let serialized = serde_json::to_value(&replies).unwrap();
        assert_eq!(serialized[1], json!({
            "type": "rejected",
            "data": { "message": "Provider quota exceeded" },
        }));
        let deserialized: Vec<PresetReply> =
            serde_json::from_value(serialized).unwrap();
        assert_eq!(replies, deserialized);
    }
}
