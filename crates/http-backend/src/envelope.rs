use ai_builder_model::{ChatId, ErrorKind, Message};
use mime::Mime;
use reqwest::{Response, header};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::Error;

/// Every response body from the backend, successful or not, is wrapped in
/// this structure.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Payload of `POST /chat/start`.
#[derive(Debug, Deserialize)]
pub(crate) struct StartedChat {
    #[serde(alias = "_id")]
    pub id: Option<ChatId>,
}

/// Payload of `GET /chat/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Transcript {
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

/// Reads the `data` field of a successful response.
///
/// Non-success statuses are mapped to [`ErrorKind::Rejected`], carrying the
/// `message` of the error envelope when the body can be parsed.
pub(crate) async fn read_data<T: DeserializeOwned>(
    resp: Result<Response, reqwest::Error>,
) -> Result<Option<T>, Error> {
    let resp = resp.map_err(|err| {
        Error::new(format!("{err}"), ErrorKind::Transport)
    })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.bytes().await.unwrap_or_default();
        let server_message =
            serde_json::from_slice::<Envelope<IgnoredAny>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
        debug!("request rejected with {status}: {server_message:?}");
        return Err(Error::rejected(status, server_message));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    if let Some(content_type) = &content_type {
        let is_json = content_type
            .parse()
            .map(|m: Mime| {
                m.subtype().as_str() == "json"
                    || m.suffix().map(|s| s.as_str()) == Some("json")
            })
            .unwrap_or(false);
        if !is_json {
            return Err(Error::new(
                format!("Unexpected content type: {content_type:?}"),
                ErrorKind::InvalidResponse,
            ));
        }
    }

    let body = resp.bytes().await.map_err(|err| {
        Error::new(format!("{err}"), ErrorKind::Transport)
    })?;
    trace!("got a response body of {} bytes", body.len());
    let envelope: Envelope<T> =
        serde_json::from_slice(&body).map_err(|err| {
            Error::new(
                format!("Malformed response: {err}"),
                ErrorKind::InvalidResponse,
            )
        })?;
    Ok(envelope.data)
}
