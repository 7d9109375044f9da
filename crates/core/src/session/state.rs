use ai_builder_model::{
    Attachment, ChatId, Conversation, Intent, MAX_ATTACHMENTS, Message,
    Provider, SendRequest,
};

use super::{ChatTransition, IntentKind, SessionSnapshot};
use crate::artifacts::ArtifactStore;
use crate::conversation::ActiveConversation;
use crate::directory::ChatDirectory;

/// Everything a session owns. Only the session mutates it, and only as the
/// result of a user input or a completed network call.
#[derive(Default)]
pub(crate) struct SessionState {
    pub directory: ChatDirectory,
    pub conversation: ActiveConversation,
    pub artifacts: ArtifactStore,
    pub prompt: String,
    pub output: String,
    pub provider: Provider,
    pub edit_mode: bool,
    pub attachments: Vec<Attachment>,
    pub loading: bool,
    pub notice: Option<String>,
}

/// Data fetched after a send, to be committed together with the intent.
#[derive(Default)]
pub(crate) struct Refetched {
    pub transcript: Option<Vec<Message>>,
    pub chats: Option<Vec<Conversation>>,
}

impl SessionState {
    #[inline]
    pub fn has_input(&self) -> bool {
        !self.prompt.is_empty() || !self.attachments.is_empty()
    }

    /// Builds the generation request from the current inputs.
    ///
    /// Attachments are only carried in edit mode, and at most
    /// [`MAX_ATTACHMENTS`] of them.
    pub fn build_request(&self) -> SendRequest {
        let attachments = if self.edit_mode {
            if self.attachments.len() > MAX_ATTACHMENTS {
                debug!(
                    "dropping {} attachment(s) over the limit",
                    self.attachments.len() - MAX_ATTACHMENTS
                );
            }
            self.attachments
                .iter()
                .take(MAX_ATTACHMENTS)
                .cloned()
                .collect()
        } else {
            vec![]
        };
        SendRequest {
            prompt: self.prompt.clone(),
            provider: self.provider,
            chat_id: self.conversation.chat_id().cloned(),
            attachments,
        }
    }

    pub fn apply_transition(
        &mut self,
        transition: &ChatTransition,
        refetched: Refetched,
    ) {
        let Refetched { transcript, chats } = refetched;
        match transition {
            ChatTransition::Adopt(id) => {
                debug!("adopting conversation {id}");
                self.conversation
                    .open(id.clone(), transcript.unwrap_or_default());
                if let Some(chats) = chats {
                    self.directory.replace(chats);
                }
            }
            ChatTransition::Refresh(id) => {
                if let Some(messages) = transcript {
                    if !self.conversation.refresh(id, messages) {
                        debug!("conversation {id} is no longer active");
                    }
                }
            }
            ChatTransition::Unbound => {}
        }
    }

    pub fn apply_intent(&mut self, intent: Intent) -> IntentKind {
        match intent {
            Intent::GenerateProject(tree) => {
                debug!("replacing file tree with {} file(s)", tree.len());
                self.artifacts.replace(tree);
                self.output.clear();
                IntentKind::GenerateProject
            }
            Intent::ModifyFiles { folder, files } => {
                self.output = format!(
                    "Files updated in {folder}: {}",
                    files.join(", ")
                );
                IntentKind::ModifyFiles
            }
            Intent::Answer(text) => {
                self.output = text;
                IntentKind::Answer
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            directory: self.directory.clone(),
            conversation: self.conversation.clone(),
            artifacts: self.artifacts.clone(),
            prompt: self.prompt.clone(),
            output: self.output.clone(),
            provider: self.provider,
            edit_mode: self.edit_mode,
            attachments: self
                .attachments
                .iter()
                .map(|a| a.name.clone())
                .collect(),
            loading: self.loading,
            notice: self.notice.clone(),
        }
    }
}

impl ChatTransition {
    /// Decides how the active conversation follows a send.
    ///
    /// `sent` is the conversation the request was bound to and `echoed` is
    /// the one the backend reports. Empty ids count as absent.
    pub fn resolve(sent: Option<&ChatId>, echoed: Option<&ChatId>) -> Self {
        let sent = sent.filter(|id| !id.is_empty());
        let echoed = echoed.filter(|id| !id.is_empty());
        match (sent, echoed) {
            (sent, Some(echoed)) if sent != Some(echoed) => {
                ChatTransition::Adopt(echoed.clone())
            }
            (Some(sent), _) => ChatTransition::Refresh(sent.clone()),
            (None, _) => ChatTransition::Unbound,
        }
    }
}
