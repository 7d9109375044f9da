use std::net::SocketAddr;

use ai_builder_http::{HttpBackend, HttpConfigBuilder};
use ai_builder_model::{
    Attachment, Backend, BackendError, ChatId, Credential, ErrorKind, Intent,
    Provider, SendRequest,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serves exactly one canned response and returns the raw request it got.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (addr, handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = text[..header_end].to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        let complete = match content_length {
            Some(len) => buf.len() >= header_end + 4 + len,
            None if headers.contains("transfer-encoding: chunked") => {
                text.ends_with("0\r\n\r\n")
            }
            None => true,
        };
        if complete {
            break;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn backend(addr: SocketAddr) -> HttpBackend {
    let config = HttpConfigBuilder::new()
        .with_base_url(format!("http://{addr}/api"))
        .build();
    HttpBackend::new(config)
}

fn credential() -> Credential {
    Credential::bearer("tok-123")
}

#[tokio::test]
async fn test_list_chats() {
    let (addr, server) = serve_once(
        "200 OK",
        "application/json; charset=utf-8",
        r#"{"success":true,"data":[{"_id":"c1","title":"Landing"},{"_id":"c2","title":"Blog"}]}"#,
    )
    .await;

    let chats = backend(addr).list_chats(&credential()).await.unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].id, ChatId::new("c1"));
    assert_eq!(chats[1].title, "Blog");

    let request = server.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /api/chat http/1.1"));
    assert!(request.contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn test_start_chat_posts_title() {
    let (addr, server) = serve_once(
        "201 Created",
        "application/json",
        r#"{"data":{"id":"c9"}}"#,
    )
    .await;

    let id = backend(addr)
        .start_chat("New Chat", &credential())
        .await
        .unwrap();
    assert_eq!(id, ChatId::new("c9"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat/start HTTP/1.1"));
    assert!(request.ends_with(r#"{"title":"New Chat"}"#));
}

#[tokio::test]
async fn test_fetch_transcript() {
    let (addr, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"data":{"messages":[{"role":"user","prompt":"hi"},{"role":"assistant","text":"hello"}]}}"#,
    )
    .await;

    let messages = backend(addr)
        .fetch_transcript(&ChatId::new("c1"), &credential())
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].prompt.as_deref(), Some("hi"));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/chat/c1 HTTP/1.1"));
}

#[tokio::test]
async fn test_fetch_transcript_escapes_chat_id() {
    let (addr, server) =
        serve_once("200 OK", "application/json", r#"{"data":{}}"#).await;

    let messages = backend(addr)
        .fetch_transcript(&ChatId::new("../ai/send?x=1"), &credential())
        .await
        .unwrap();
    assert!(messages.is_empty());

    let request = server.await.unwrap();
    assert!(
        request.starts_with("GET /api/chat/..%2Fai%2Fsend%3Fx=1 HTTP/1.1")
    );
}

#[tokio::test]
async fn test_fetch_transcript_rejects_dot_segment() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let err = backend(addr)
        .fetch_transcript(&ChatId::new(".."), &credential())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.status(), None);
    drop(listener);
}

#[tokio::test]
async fn test_send_json() {
    let (addr, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"data":{"intent":"generate_project","chatId":"c1","files":["index.html"],"fileMap":{"index.html":"<html></html>"}}}"#,
    )
    .await;

    let req = SendRequest {
        prompt: "build a landing page".to_owned(),
        provider: Provider::Auto,
        chat_id: None,
        attachments: vec![],
    };
    let resp = backend(addr).send(&req, &credential()).await.unwrap();
    assert_eq!(resp.echoed_chat_id(), Some(&ChatId::new("c1")));
    assert!(matches!(resp.into_intent(), Intent::GenerateProject(_)));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/ai/send HTTP/1.1"));
    assert!(
        request.to_ascii_lowercase().contains("content-type: application/json")
    );
    assert!(
        request.ends_with(r#"{"prompt":"build a landing page","provider":"auto"}"#)
    );
}

#[tokio::test]
async fn test_send_multipart_caps_attachments() {
    let (addr, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"data":{"intent":"modify_files","folder":"proj1","files":["a.js"]}}"#,
    )
    .await;

    let req = SendRequest {
        prompt: "use const".to_owned(),
        provider: Provider::Claude,
        chat_id: Some(ChatId::new("c1")),
        attachments: (0..8)
            .map(|i| Attachment::new(format!("f{i}.js"), "let a;"))
            .collect(),
    };
    backend(addr).send(&req, &credential()).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.to_ascii_lowercase().contains("multipart/form-data"));
    assert_eq!(request.matches(r#"name="files""#).count(), 6);
    assert!(request.contains(r#"filename="f5.js""#));
    assert!(!request.contains(r#"filename="f6.js""#));
    assert!(request.contains(r#"name="chatId""#));
}

#[tokio::test]
async fn test_rejected_carries_server_message() {
    let (addr, _server) = serve_once(
        "429 Too Many Requests",
        "application/json",
        r#"{"success":false,"message":"Provider quota exceeded"}"#,
    )
    .await;

    let req = SendRequest {
        prompt: "hi".to_owned(),
        provider: Provider::OpenAI,
        chat_id: None,
        attachments: vec![],
    };
    let err = backend(addr).send(&req, &credential()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(429));
    assert_eq!(err.server_message(), Some("Provider quota exceeded"));
}

#[tokio::test]
async fn test_unexpected_content_type() {
    let (addr, _server) =
        serve_once("200 OK", "text/html", "<html>login</html>").await;

    let err = backend(addr).list_chats(&credential()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(addr).list_chats(&credential()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.server_message(), None);
}
