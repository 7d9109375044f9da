use ai_builder_model::ChatId;
use reqwest::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Builder for [`HttpConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
}

impl HttpConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL, e.g. `https://builder.example.com/api`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the `User-Agent` header sent with every request.
    #[inline]
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpConfig {
        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        HttpConfig {
            base_url,
            user_agent: self.user_agent.unwrap_or_else(|| {
                concat!("ai-builder/", env!("CARGO_PKG_VERSION")).to_owned()
            }),
        }
    }
}

/// Configuration for the HTTP backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfig {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
}

impl HttpConfig {
    /// Returns the base URL every endpoint is resolved against.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves the endpoint of conversation `id`, escaping the id as a
    /// single path segment.
    ///
    /// Returns `None` for ids that a URL parser would read as a dot segment,
    /// and for base URLs that can't carry a path.
    pub(crate) fn chat_url(&self, id: &ChatId) -> Option<Url> {
        if matches!(id.as_str(), "" | "." | "..") {
            return None;
        }
        let mut url = Url::parse(&self.url("/chat")).ok()?;
        url.path_segments_mut().ok()?.push(id.as_str());
        Some(url)
    }
}

impl Default for HttpConfig {
    #[inline]
    fn default() -> Self {
        HttpConfigBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let config = HttpConfig::default();
        assert_eq!(config.base_url(), "http://localhost:5000/api");
        assert_eq!(config.url("/chat"), "http://localhost:5000/api/chat");

        let config = HttpConfigBuilder::new()
            .with_base_url("https://builder.example.com/api//")
            .build();
        assert_eq!(
            config.url("/ai/send"),
            "https://builder.example.com/api/ai/send"
        );
    }

    #[test]
    fn test_chat_url_escapes_id() {
        let config = HttpConfig::default();
        let url = |id: &str| {
            config.chat_url(&ChatId::new(id)).map(|url| url.to_string())
        };

        assert_eq!(
            url("c1").as_deref(),
            Some("http://localhost:5000/api/chat/c1")
        );
        assert_eq!(
            url("../ai/send?x=1").as_deref(),
            Some("http://localhost:5000/api/chat/..%2Fai%2Fsend%3Fx=1")
        );
        assert_eq!(
            url("a b#c").as_deref(),
            Some("http://localhost:5000/api/chat/a%20b%23c")
        );
        assert_eq!(url(".."), None);
        assert_eq!(url("."), None);
        assert_eq!(url(""), None);
    }
}
