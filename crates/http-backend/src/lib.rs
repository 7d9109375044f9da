//! A backend that talks to the AI builder REST API over HTTP.

#[macro_use]
extern crate tracing;

mod config;
mod envelope;
mod form;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use ai_builder_model::{
    Backend, BackendError, ChatId, Conversation, Credential, ErrorKind,
    Message, SendRequest, SendResponse,
};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, StatusCode, header};
use serde_json::json;

pub use config::{HttpConfig, HttpConfigBuilder};
use envelope::{StartedChat, Transcript, read_data};

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<StatusCode>,
    server_message: Option<String>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
            server_message: None,
        }
    }

    fn rejected(status: StatusCode, server_message: Option<String>) -> Self {
        Self {
            message: format!("Backend responded with {status}"),
            kind: ErrorKind::Rejected,
            status: Some(status),
            server_message,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status for rejected requests.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.server_message {
            Some(server_message) => {
                write!(f, "{}: {}", self.message, server_message)
            }
            None => write!(f, "{}", self.message),
        }
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

/// Backend for the AI builder REST API.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn request<U: IntoUrl>(
        &self,
        method: Method,
        url: U,
        credential: &Credential,
    ) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(credential.token())
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::ACCEPT, "application/json")
    }
}

impl Backend for HttpBackend {
    type Error = Error;

    fn list_chats(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>> + Send + 'static
    {
        let url = self.config.url("/chat");
        let resp_fut = self.request(Method::GET, url, credential).send();
        async move {
            let chats = read_data::<Vec<Conversation>>(resp_fut.await).await?;
            Ok(chats.unwrap_or_default())
        }
    }

    fn start_chat(
        &self,
        title: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<ChatId, Self::Error>> + Send + 'static
    {
        let url = self.config.url("/chat/start");
        let resp_fut = self
            .request(Method::POST, url, credential)
            .json(&json!({ "title": title }))
            .send();
        async move {
            read_data::<StartedChat>(resp_fut.await)
                .await?
                .and_then(|started| started.id)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    Error::new(
                        "Missing conversation id",
                        ErrorKind::InvalidResponse,
                    )
                })
        }
    }

    fn fetch_transcript(
        &self,
        id: &ChatId,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static
    {
        let resp_fut = match self.config.chat_url(id) {
            Some(url) => Ok(self.request(Method::GET, url, credential).send()),
            None => Err(Error::new(
                format!("Invalid conversation id: {id:?}"),
                ErrorKind::Rejected,
            )),
        };
        async move {
            let transcript = read_data::<Transcript>(resp_fut?.await).await?;
            Ok(transcript.and_then(|t| t.messages).unwrap_or_default())
        }
    }

    fn send(
        &self,
        req: &SendRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<SendResponse, Self::Error>> + Send + 'static
    {
        let url = self.config.url("/ai/send");
        let builder = self.request(Method::POST, url, credential);
        let builder = if req.is_multipart() {
            debug!("sending {} attachment(s)", req.attachments.len());
            form::build(req).map(|form| builder.multipart(form))
        } else {
            Ok(builder.json(req))
        };
        let resp_fut = builder.map(RequestBuilder::send);

        async move {
            let resp_fut = resp_fut.map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::Transport)
            })?;
            read_data::<SendResponse>(resp_fut.await)
                .await?
                .ok_or_else(|| {
                    Error::new(
                        "Missing generation payload",
                        ErrorKind::InvalidResponse,
                    )
                })
        }
    }
}
