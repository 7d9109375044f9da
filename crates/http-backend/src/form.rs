use ai_builder_model::{MAX_ATTACHMENTS, SendRequest};
use reqwest::multipart::{Form, Part};

/// Builds the multipart body for a request carrying attachments.
///
/// Field order follows the backend's expectations: `prompt`, `provider`,
/// an optional `chatId`, then one `files` part per attachment.
pub(crate) fn build(req: &SendRequest) -> Result<Form, reqwest::Error> {
    let mut form = Form::new()
        .text("prompt", req.prompt.clone())
        .text("provider", req.provider.as_str());
    if let Some(chat_id) = &req.chat_id {
        form = form.text("chatId", chat_id.as_str().to_owned());
    }

    for attachment in req.attachments.iter().take(MAX_ATTACHMENTS) {
        let part = Part::stream_with_length(
            attachment.data.clone(),
            attachment.data.len() as u64,
        )
        .file_name(attachment.name.clone())
        .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())?;
        form = form.part("files", part);
    }
    Ok(form)
}
