mod builder;
mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use ai_builder_model::{Attachment, ChatId, Credential, Message, Provider};

use crate::artifacts::ArtifactStore;
use crate::backend_client::BackendClient;
use crate::conversation::ActiveConversation;
use crate::directory::ChatDirectory;
use crate::error::SessionError;
pub use builder::SessionBuilder;
use state::{Refetched, SessionState};

/// How the active conversation followed a send.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatTransition {
    /// The backend recorded the exchange in a conversation other than the
    /// one the request was bound to (usually one it just created), and the
    /// session switched to it.
    Adopt(ChatId),
    /// The exchange was appended to the active conversation, whose
    /// transcript was re-fetched.
    Refresh(ChatId),
    /// Neither side named a conversation; the transcript was left as-is.
    Unbound,
}

/// The kind of payload a send produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentKind {
    /// A new project replaced the file tree.
    GenerateProject,
    /// Files were modified on the backend; a status line was produced.
    ModifyFiles,
    /// A plain answer was put into the output buffer.
    Answer,
}

/// Summary of a completed send.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SendReport {
    /// How the active conversation followed the send.
    pub transition: ChatTransition,
    /// What the backend produced.
    pub intent: IntentKind,
}

/// Result of [`Session::send`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SendOutcome {
    /// There was neither a prompt nor an attachment; nothing happened.
    Skipped,
    /// The backend answered and the session state was reconciled.
    Completed(SendReport),
}

/// An owned copy of everything a front end renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The conversation list.
    pub directory: ChatDirectory,
    /// The active conversation and its transcript.
    pub conversation: ActiveConversation,
    /// The generated file tree and the selected file.
    pub artifacts: ArtifactStore,
    /// The pending prompt.
    pub prompt: String,
    /// The plain-text output of the last send.
    pub output: String,
    /// The selected provider.
    pub provider: Provider,
    /// Whether attachments are sent.
    pub edit_mode: bool,
    /// Names of the pending attachments.
    pub attachments: Vec<String>,
    /// Whether a send is in flight.
    pub loading: bool,
    /// The user-visible message of the last failed send.
    pub notice: Option<String>,
}

/// A chat session with the code generation backend.
///
/// The session owns the conversation list, the active transcript and the
/// generated file tree, and keeps them consistent with each other: every
/// network operation fetches first and then commits all resulting changes
/// under a single lock, so a front end never observes a file tree or
/// transcript that disagrees with the response that produced it.
///
/// At most one send is in flight at any time. Navigation (opening a chat,
/// selecting a file) is not queued behind a send; it operates on whatever
/// state is committed.
pub struct Session {
    backend: BackendClient,
    credential: Credential,
    state: Mutex<SessionState>,
    on_change: Option<Box<dyn Fn() + Send + Sync>>,
}

/// Clears the loading flag when a send ends, however it ends.
struct BusyGuard<'a>(&'a Session);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.commit(|state| state.loading = false);
    }
}

impl Session {
    fn from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            backend,
            credential,
            provider,
            on_change,
        } = builder;

        let state = SessionState {
            provider,
            ..Default::default()
        };
        Self {
            backend,
            credential,
            state: Mutex::new(state),
            on_change,
        }
    }

    #[inline]
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the state and notifies the change listener once the
    /// lock is released.
    fn commit<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let result = {
            let mut state = self.state();
            f(&mut *state)
        };
        if let Some(on_change) = &self.on_change {
            on_change();
        }
        result
    }

    /// Returns a copy of the current state.
    #[inline]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state().snapshot()
    }

    /// Returns `true` while a send is in flight.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Returns the id of the active conversation.
    #[inline]
    pub fn active_chat(&self) -> Option<ChatId> {
        self.state().conversation.chat_id().cloned()
    }

    /// Replaces the pending prompt.
    pub fn set_prompt<S: Into<String>>(&self, prompt: S) {
        let prompt = prompt.into();
        self.commit(|state| state.prompt = prompt);
    }

    /// Selects the provider used by subsequent sends.
    pub fn set_provider(&self, provider: Provider) {
        self.commit(|state| state.provider = provider);
    }

    /// Toggles edit mode. Attachments are only sent in edit mode.
    pub fn set_edit_mode(&self, edit_mode: bool) {
        self.commit(|state| state.edit_mode = edit_mode);
    }

    /// Adds a file to the pending upload batch.
    pub fn attach(&self, attachment: Attachment) {
        self.commit(|state| state.attachments.push(attachment));
    }

    /// Empties the pending upload batch.
    pub fn clear_attachments(&self) {
        self.commit(|state| state.attachments.clear());
    }

    /// Selects a generated file for viewing. Returns `false`, leaving the
    /// selection unchanged, if the file is not in the current tree.
    pub fn select_file(&self, path: &str) -> bool {
        self.commit(|state| state.artifacts.select(path))
    }

    /// Re-lists the user's conversations.
    ///
    /// Listing is best-effort: on failure the previous list is kept and
    /// nothing is reported.
    pub async fn load_chats(&self) {
        match self.backend.list_chats(&self.credential).await {
            Ok(chats) => self.commit(|state| state.directory.replace(chats)),
            Err(err) => warn!("failed to list chats: {err}"),
        }
    }

    /// Opens a conversation, replacing the transcript with its messages,
    /// and re-lists the conversations.
    ///
    /// If the transcript cannot be fetched, the conversation is opened
    /// with an empty transcript.
    pub async fn open_chat(&self, id: ChatId) {
        let messages = self
            .backend
            .fetch_transcript(&id, &self.credential)
            .await
            .unwrap_or_else(|err| {
                warn!("failed to fetch conversation {id}: {err}");
                vec![]
            });
        self.commit(|state| state.conversation.open(id, messages));
        self.load_chats().await;
    }

    /// Starts a new conversation titled after the current prompt (or
    /// `"New Chat"`) and opens it.
    pub async fn new_chat(&self) -> Result<ChatId, SessionError> {
        let title = {
            let state = self.state();
            if state.prompt.is_empty() {
                "New Chat".to_owned()
            } else {
                state.prompt.clone()
            }
        };
        let id = self
            .backend
            .start_chat(&title, &self.credential)
            .await
            .inspect_err(|err| warn!("failed to start a chat: {err}"))?;
        info!("started conversation {id}");
        self.open_chat(id.clone()).await;
        Ok(id)
    }

    /// Re-fetches the transcript of the active conversation, if any.
    ///
    /// On failure the current transcript is kept.
    pub async fn refresh_transcript(&self) {
        let Some(id) = self.active_chat() else {
            return;
        };
        match self.backend.fetch_transcript(&id, &self.credential).await {
            Ok(messages) => {
                self.commit(|state| state.conversation.refresh(&id, messages));
            }
            Err(err) => warn!("failed to refresh conversation {id}: {err}"),
        }
    }

    /// Sends the current prompt (and, in edit mode, the attachments) to the
    /// backend, then reconciles the conversation list, the transcript and
    /// the file tree with the response.
    ///
    /// Returns [`SendOutcome::Skipped`] without touching any state if there
    /// is neither a prompt nor an attachment, and [`SessionError::Busy`] if
    /// another send is in flight. On a backend failure, the conversation
    /// list, transcript and file tree are left untouched and the
    /// user-visible message is stored as the session notice.
    pub async fn send(&self) -> Result<SendOutcome, SessionError> {
        let req = {
            let mut state = self.state();
            if !state.has_input() {
                trace!("nothing to send");
                return Ok(SendOutcome::Skipped);
            }
            if state.loading {
                debug!("rejecting a send while another is in flight");
                return Err(SessionError::Busy);
            }
            state.loading = true;
            state.build_request()
        };
        let _busy = BusyGuard(self);
        self.commit(|state| state.notice = None);

        let resp = match self.backend.send(&req, &self.credential).await {
            Ok(resp) => resp,
            Err(err) => {
                let err = SessionError::from(err);
                error!("send failed: {err}");
                let notice = err.user_message().to_owned();
                self.commit(|state| state.notice = Some(notice));
                return Err(err);
            }
        };

        let transition = ChatTransition::resolve(
            req.chat_id.as_ref(),
            resp.echoed_chat_id(),
        );
        let refetched = self.refetch(&transition).await;
        let intent = resp.into_intent();

        let intent = self.commit(|state| {
            state.apply_transition(&transition, refetched);
            let kind = state.apply_intent(intent);
            state.prompt.clear();
            kind
        });
        info!("send completed: {intent:?}, {transition:?}");

        Ok(SendOutcome::Completed(SendReport { transition, intent }))
    }

    async fn refetch(&self, transition: &ChatTransition) -> Refetched {
        match transition {
            ChatTransition::Adopt(id) => Refetched {
                transcript: self.fetch_transcript_or_warn(id).await,
                chats: self
                    .backend
                    .list_chats(&self.credential)
                    .await
                    .inspect_err(|err| warn!("failed to list chats: {err}"))
                    .ok(),
            },
            ChatTransition::Refresh(id) => Refetched {
                transcript: self.fetch_transcript_or_warn(id).await,
                chats: None,
            },
            ChatTransition::Unbound => Refetched::default(),
        }
    }

    async fn fetch_transcript_or_warn(
        &self,
        id: &ChatId,
    ) -> Option<Vec<Message>> {
        self.backend
            .fetch_transcript(id, &self.credential)
            .await
            .inspect_err(|err| {
                warn!("failed to fetch conversation {id}: {err}");
            })
            .ok()
    }
}
