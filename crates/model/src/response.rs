use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chat::ChatId;
use crate::tree::FileTree;

/// Intent tag for a freshly generated project.
pub const INTENT_GENERATE_PROJECT: &str = "generate_project";
/// Intent tag for an in-place modification report.
pub const INTENT_MODIFY_FILES: &str = "modify_files";

/// The payload returned by the generation endpoint.
///
/// Which fields are populated depends on `intent`; see [`Intent`] for the
/// typed interpretation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Server-declared classification of this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// The conversation this exchange was recorded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    /// Generated or modified file paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Generated file contents, keyed by path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_map: Option<HashMap<String, String>>,
    /// The folder a modification was applied in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Plain answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// A code answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Typed interpretation of a [`SendResponse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// A whole project was generated and replaces the displayed tree.
    GenerateProject(FileTree),
    /// Files were changed on the backend.
    ModifyFiles {
        /// The folder the files live in.
        folder: String,
        /// Names of the changed files.
        files: Vec<String>,
    },
    /// A plain chat or code answer.
    Answer(String),
}

impl SendResponse {
    /// Returns the conversation id echoed by the backend, treating an
    /// empty id as absent.
    #[inline]
    pub fn echoed_chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Interprets this response according to its `intent` tag.
    ///
    /// Unknown or missing tags are treated as a plain answer whose text is
    /// `text`, falling back to `code`, falling back to an empty string.
    pub fn into_intent(self) -> Intent {
        match self.intent.as_deref() {
            Some(INTENT_GENERATE_PROJECT) => Intent::GenerateProject(
                FileTree::new(
                    self.files.unwrap_or_default(),
                    self.file_map.unwrap_or_default(),
                ),
            ),
            Some(INTENT_MODIFY_FILES) => Intent::ModifyFiles {
                folder: self.folder.unwrap_or_default(),
                files: self.files.unwrap_or_default(),
            },
            _ => {
                let text = [self.text, self.code]
                    .into_iter()
                    .flatten()
                    .find(|s| !s.is_empty())
                    .unwrap_or_default();
                Intent::Answer(text)
            }
        }
    }
}
