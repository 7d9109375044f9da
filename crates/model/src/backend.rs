use std::error::Error;

use crate::chat::{ChatId, Conversation, Credential, Message};
use crate::error::ErrorKind;
use crate::request::SendRequest;
use crate::response::SendResponse;

/// The error type for a backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the human-readable message the server attached to the
    /// failure, if any.
    #[inline]
    fn server_message(&self) -> Option<&str> {
        None
    }
}

/// A type that represents the code generation service, which is the entry
/// for listing conversations, reading transcripts and sending prompts.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the backend should be prepared for being dropped anytime.
///
/// Every operation takes the caller's [`Credential`] so a single backend
/// can serve whichever user is currently signed in.
pub trait Backend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Lists the conversations owned by the user, in server order.
    fn list_chats(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>> + Send + 'static;

    /// Starts a new conversation with the given title and returns its id.
    fn start_chat(
        &self,
        title: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<ChatId, Self::Error>> + Send + 'static;

    /// Fetches the full transcript of a conversation, in chronological
    /// order.
    fn fetch_transcript(
        &self,
        id: &ChatId,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static;

    /// Sends a prompt to the generation endpoint.
    fn send(
        &self,
        req: &SendRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<SendResponse, Self::Error>> + Send + 'static;
}
