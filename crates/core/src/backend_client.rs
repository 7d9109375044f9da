use std::pin::Pin;
use std::sync::Arc;

use ai_builder_model::{
    Backend, BackendError, ChatId, Conversation, Credential, Message,
    SendRequest, SendResponse,
};
use tracing::Instrument;

pub(crate) type BackendResult<T> = Result<T, Box<dyn BackendError>>;
type BoxedFuture<T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send>>;

/// Object-safe mirror of [`Backend`].
trait ErasedBackend: Send + Sync {
    fn list_chats(&self, credential: &Credential)
    -> BoxedFuture<Vec<Conversation>>;

    fn start_chat(
        &self,
        title: &str,
        credential: &Credential,
    ) -> BoxedFuture<ChatId>;

    fn fetch_transcript(
        &self,
        id: &ChatId,
        credential: &Credential,
    ) -> BoxedFuture<Vec<Message>>;

    fn send(
        &self,
        req: &SendRequest,
        credential: &Credential,
    ) -> BoxedFuture<SendResponse>;
}

fn erase<T, E, F>(fut: F) -> BoxedFuture<T>
where
    T: Send + 'static,
    E: BackendError,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::pin(async move {
        fut.await.map_err(|err| {
            debug!("got an error: {err:?}");
            Box::new(err) as Box<dyn BackendError>
        })
    })
}

impl<B: Backend + 'static> ErasedBackend for B {
    fn list_chats(
        &self,
        credential: &Credential,
    ) -> BoxedFuture<Vec<Conversation>> {
        erase(Backend::list_chats(self, credential))
    }

    fn start_chat(
        &self,
        title: &str,
        credential: &Credential,
    ) -> BoxedFuture<ChatId> {
        erase(Backend::start_chat(self, title, credential))
    }

    fn fetch_transcript(
        &self,
        id: &ChatId,
        credential: &Credential,
    ) -> BoxedFuture<Vec<Message>> {
        erase(Backend::fetch_transcript(self, id, credential))
    }

    fn send(
        &self,
        req: &SendRequest,
        credential: &Credential,
    ) -> BoxedFuture<SendResponse> {
        erase(Backend::send(self, req, credential))
    }
}

/// A wrapper around a backend that provides a type-erased interface for
/// the other modules and traces every call.
#[derive(Clone)]
pub struct BackendClient {
    backend: Arc<dyn ErasedBackend>,
}

impl BackendClient {
    #[inline]
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `Session` doesn't have a
        // generic parameter and we don't want it either.
        Self {
            backend: Arc::new(backend),
        }
    }

    pub async fn list_chats(
        &self,
        credential: &Credential,
    ) -> BackendResult<Vec<Conversation>> {
        let fut = self.backend.list_chats(credential);
        async move {
            let chats = fut.await?;
            trace!("listed {} chat(s)", chats.len());
            Ok(chats)
        }
        .instrument(trace_span!("list chats"))
        .await
    }

    pub async fn start_chat(
        &self,
        title: &str,
        credential: &Credential,
    ) -> BackendResult<ChatId> {
        self.backend
            .start_chat(title, credential)
            .instrument(trace_span!("start chat", title))
            .await
    }

    pub async fn fetch_transcript(
        &self,
        id: &ChatId,
        credential: &Credential,
    ) -> BackendResult<Vec<Message>> {
        let fut = self.backend.fetch_transcript(id, credential);
        async move {
            let messages = fut.await?;
            trace!("fetched {} message(s)", messages.len());
            Ok(messages)
        }
        .instrument(trace_span!("fetch transcript", chat_id = %id))
        .await
    }

    pub async fn send(
        &self,
        req: &SendRequest,
        credential: &Credential,
    ) -> BackendResult<SendResponse> {
        trace!("got a request: {req:?}");
        let fut = self.backend.send(req, credential);
        async move {
            let resp = fut.await?;
            trace!("got a response with intent {:?}", resp.intent);
            Ok(resp)
        }
        .instrument(trace_span!("send", provider = %req.provider))
        .await
    }
}

#[cfg(test)]
mod tests {
    use ai_builder_model::{ErrorKind, Provider};
    use ai_builder_test_backend::{PresetReply, TestBackend};

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let backend = TestBackend::default();
        for i in 0..3 {
            backend
                .push_reply(PresetReply::answer(Some("c1"), "How are you?"));
            let client = BackendClient::new(backend.clone());
            let resp = client
                .send(
                    &SendRequest {
                        prompt: format!("Hi #{i}"),
                        provider: Provider::Mock,
                        chat_id: None,
                        attachments: vec![],
                    },
                    &Credential::bearer("t"),
                )
                .await
                .unwrap();
            assert_eq!(resp.text.as_deref(), Some("How are you?"));
        }
        assert_eq!(backend.transcript("c1").len(), 6);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client = BackendClient::new(TestBackend::default());
        let err = client
            .fetch_transcript(&ChatId::new("missing"), &Credential::bearer("t"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.server_message(), Some("Chat not found"));
    }
}
