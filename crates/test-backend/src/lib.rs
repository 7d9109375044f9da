//! A local fake backend for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ai_builder_model::{
    Backend, BackendError, ChatId, Conversation, Credential, ErrorKind,
    Message, SendRequest, SendResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
    server_message: Option<String>,
}

impl Error {
    fn new(message: &'static str, kind: ErrorKind) -> Self {
        Self {
            message,
            kind,
            server_message: None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }
}

/// Number of calls the backend received, per endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CallCounts {
    pub list_chats: usize,
    pub start_chat: usize,
    pub fetch_transcript: usize,
    pub send: usize,
}

#[derive(Default)]
struct Script {
    chats: Vec<Conversation>,
    transcripts: HashMap<ChatId, Vec<Message>>,
    replies: VecDeque<PresetReply>,
    sent: Vec<SendRequest>,
    calls: CallCounts,
    failing_reads: bool,
    delay: Option<Duration>,
    next_chat: u64,
}

impl Script {
    fn ensure_chat(&mut self, id: &ChatId, title: &str) {
        if !self.chats.iter().any(|c| &c.id == id) {
            self.chats.push(Conversation {
                id: id.clone(),
                title: title.to_owned(),
            });
        }
        self.transcripts.entry(id.clone()).or_default();
    }

    /// Records the exchange the way the real server does, so that a
    /// subsequent transcript fetch reflects it.
    fn record_exchange(&mut self, req: &SendRequest, resp: &SendResponse) {
        let Some(id) = resp
            .echoed_chat_id()
            .or(req.chat_id.as_ref())
            .filter(|id| !id.is_empty())
            .cloned()
        else {
            return;
        };
        self.ensure_chat(&id, &req.prompt);

        let mut reply = Message::assistant();
        reply.text = resp.text.clone();
        reply.code = resp.code.clone();
        let transcript = self.transcripts.entry(id).or_default();
        transcript.push(Message::user(req.prompt.clone()));
        transcript.push(reply);
    }
}

/// A local fake backend for testing purpose.
///
/// The backend keeps a small in-memory server state: a conversation list
/// and a transcript per conversation. Replies to `send` are taken from a
/// queue of [`PresetReply`] values; if the queue is empty, the request is
/// rejected.
///
/// Clones share the same state, so a test can keep a clone around to
/// inspect what the code under test sent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestBackend {
    script: Arc<Mutex<Script>>,
}

impl Debug for TestBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestBackend").finish_non_exhaustive()
    }
}

impl TestBackend {
    #[inline]
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a conversation with an existing transcript.
    pub fn add_chat(&self, id: &str, title: &str, messages: Vec<Message>) {
        let id = ChatId::new(id);
        let mut script = self.script();
        script.ensure_chat(&id, title);
        script.transcripts.insert(id, messages);
    }

    #[inline]
    pub fn push_reply(&self, reply: PresetReply) {
        self.script().replies.push_back(reply);
    }

    /// Makes every listing and transcript read fail until reset.
    #[inline]
    pub fn set_failing_reads(&self, failing: bool) {
        self.script().failing_reads = failing;
    }

    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.script().delay = Some(duration);
    }

    /// Returns every request passed to `send`, in order.
    #[inline]
    pub fn sent_requests(&self) -> Vec<SendRequest> {
        self.script().sent.clone()
    }

    #[inline]
    pub fn calls(&self) -> CallCounts {
        self.script().calls
    }

    /// Returns the server-side transcript of a conversation.
    #[inline]
    pub fn transcript(&self, id: &str) -> Vec<Message> {
        self.script()
            .transcripts
            .get(&ChatId::new(id))
            .cloned()
            .unwrap_or_default()
    }

    async fn reply<T>(
        delay: Option<Duration>,
        result: Result<T, Error>,
    ) -> Result<T, Error> {
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        result
    }
}

impl Backend for TestBackend {
    type Error = crate::Error;

    fn list_chats(
        &self,
        _credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.calls.list_chats += 1;
        let result = if script.failing_reads {
            Err(Error::new("listing unavailable", ErrorKind::Transport))
        } else {
            Ok(script.chats.clone())
        };
        Self::reply(script.delay, result)
    }

    fn start_chat(
        &self,
        title: &str,
        _credential: &Credential,
    ) -> impl Future<Output = Result<ChatId, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.calls.start_chat += 1;
        script.next_chat += 1;
        let id = ChatId::new(format!("chat-{}", script.next_chat));
        script.ensure_chat(&id, title);
        Self::reply(script.delay, Ok(id))
    }

    fn fetch_transcript(
        &self,
        id: &ChatId,
        _credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.calls.fetch_transcript += 1;
        let result = if script.failing_reads {
            Err(Error::new("transcript unavailable", ErrorKind::Transport))
        } else {
            script.transcripts.get(id).cloned().ok_or_else(|| Error {
                server_message: Some("Chat not found".to_owned()),
                ..Error::new("unknown chat", ErrorKind::Rejected)
            })
        };
        Self::reply(script.delay, result)
    }

    fn send(
        &self,
        req: &SendRequest,
        _credential: &Credential,
    ) -> impl Future<Output = Result<SendResponse, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.calls.send += 1;
        script.sent.push(req.clone());

        let result = match script.replies.pop_front() {
            Some(PresetReply::Success(resp)) => {
                script.record_exchange(req, &resp);
                Ok(resp)
            }
            Some(PresetReply::Rejected { message }) => Err(Error {
                server_message: message,
                ..Error::new("request rejected", ErrorKind::Rejected)
            }),
            Some(PresetReply::Transport) => {
                Err(Error::new("connection refused", ErrorKind::Transport))
            }
            None => Err(Error::new("no preset reply", ErrorKind::Rejected)),
        };
        Self::reply(script.delay, result)
    }
}

#[cfg(test)]
mod tests {
    use ai_builder_model::{Intent, Provider, Role};

    use super::*;

    fn request(prompt: &str, chat_id: Option<&str>) -> SendRequest {
        SendRequest {
            prompt: prompt.to_owned(),
            provider: Provider::Mock,
            chat_id: chat_id.map(Into::into),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_records_exchange() {
        let backend = TestBackend::default();
        backend.push_reply(PresetReply::answer(Some("c1"), "Hello, world!"));
        backend.push_reply(PresetReply::modified(None, "proj1", ["a.js"]));
        let credential = Credential::bearer("t");

        let resp = backend
            .send(&request("Hi", None), &credential)
            .await
            .unwrap();
        assert_eq!(
            resp.into_intent(),
            Intent::Answer("Hello, world!".to_owned())
        );
        let chats = backend.list_chats(&credential).await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "Hi");

        backend
            .send(&request("Use const", Some("c1")), &credential)
            .await
            .unwrap();
        let transcript = backend
            .fetch_transcript(&ChatId::new("c1"), &credential)
            .await
            .unwrap();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[2].prompt.as_deref(), Some("Use const"));
        assert_eq!(transcript[1].text.as_deref(), Some("Hello, world!"));
        assert_eq!(transcript[3].role, Role::Assistant);
        assert_eq!(transcript[3].summary, None);
        assert_eq!(transcript[3].facets().count(), 0);

        let err = backend
            .send(&request("Again", None), &credential)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(backend.calls().send, 3);
        assert_eq!(backend.sent_requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_and_failures() {
        let backend = TestBackend::default();
        backend.set_delay(Duration::from_secs(5));
        backend.set_failing_reads(true);
        backend.push_reply(PresetReply::Rejected {
            message: Some("Quota exceeded".to_owned()),
        });
        let credential = Credential::bearer("t");

        let start = tokio::time::Instant::now();
        let err = backend.list_chats(&credential).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(start.elapsed() >= Duration::from_secs(5));

        let err = backend
            .send(&request("Hi", None), &credential)
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Quota exceeded"));
    }
}
