//! URL assembly for the news provider.
//!
//! [`NewsService`] knows the two provider endpoints and the API key, builds
//! the query string for each, and hands the request to a [`Transport`].
//! Results are forwarded unmodified.
//!
//! # Endpoints
//!
//! | Method | Path | Parameters |
//! |--------|------|------------|
//! | [`NewsService::top_headlines`] | `/top-headlines` | `country`, `category`, `apiKey` |
//! | [`NewsService::everything`] | `/everything` | `country`, `category`, `q`, `apiKey` |

use crate::config::ConfigError;
use crate::transport::{RequestResult, Transport};
use tracing::{debug, instrument};
use url::Url;

pub struct NewsService<T> {
    transport: T,
    api_key: String,
    base_url: Url,
}

impl<T> NewsService<T>
where
    T: Transport,
{
    /// Create a service for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseUrl`] if `base_url` is not an absolute URL.
    pub fn new(transport: T, api_key: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|source| ConfigError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            transport,
            api_key: api_key.into(),
            base_url,
        })
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Curated current articles for a country and category.
    #[instrument(level = "info", skip(self))]
    pub async fn top_headlines(&self, country: &str, category: &str) -> RequestResult {
        let url = self.endpoint("top-headlines", &[("country", country), ("category", category)]);
        self.transport.get(&url).await
    }

    /// Articles matching `query`, narrowed by country and category.
    #[instrument(level = "info", skip(self))]
    pub async fn everything(&self, country: &str, category: &str, query: &str) -> RequestResult {
        let url = self.endpoint(
            "everything",
            &[("country", country), ("category", category), ("q", query)],
        );
        self.transport.get(&url).await
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}/{path}"));
        url.query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().copied())
            .append_pair("apiKey", &self.api_key);
        debug!(endpoint = path, params = params.len(), "Built provider URL");
        url.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Transport double that records every URL and replays one canned result.
    pub(crate) struct RecordingTransport {
        pub requests: RefCell<Vec<String>>,
        pub respond: Box<dyn Fn() -> RequestResult>,
    }

    impl RecordingTransport {
        pub(crate) fn ok(body: Value) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                respond: Box::new(move || Ok(body.clone())),
            }
        }

        pub(crate) fn failing(make: impl Fn() -> crate::transport::TransportError + 'static) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                respond: Box::new(move || Err(make())),
            }
        }

        pub(crate) fn urls(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for RecordingTransport {
        async fn get(&self, url: &str) -> RequestResult {
            self.requests.borrow_mut().push(url.to_string());
            (self.respond)()
        }

        async fn post<B>(&self, url: &str, _body: &B, _headers: Option<&HashMap<String, String>>) -> RequestResult
        where
            B: Serialize + ?Sized,
        {
            self.requests.borrow_mut().push(url.to_string());
            (self.respond)()
        }
    }

    fn service() -> NewsService<RecordingTransport> {
        NewsService::new(RecordingTransport::ok(json!({"articles": []})), "KEY", "https://newsapi.org/v2").unwrap()
    }

    #[tokio::test]
    async fn test_top_headlines_url() {
        let news = service();
        news.top_headlines("us", "general").await.unwrap();
        assert_eq!(
            news.transport().urls(),
            vec!["https://newsapi.org/v2/top-headlines?country=us&category=general&apiKey=KEY"]
        );
    }

    #[tokio::test]
    async fn test_everything_url_encodes_query() {
        let news = service();
        news.everything("gb", "science", "mars & moon").await.unwrap();
        assert_eq!(
            news.transport().urls(),
            vec!["https://newsapi.org/v2/everything?country=gb&category=science&q=mars+%26+moon&apiKey=KEY"]
        );
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let news = NewsService::new(RecordingTransport::ok(json!({})), "KEY", "http://localhost:8080/v2/").unwrap();
        news.top_headlines("ua", "technology").await.unwrap();
        assert!(news.transport().urls()[0].starts_with("http://localhost:8080/v2/top-headlines?country=ua"));
    }

    #[tokio::test]
    async fn test_results_forwarded_unmodified() {
        let body = json!({"status": "ok", "totalResults": 1, "articles": [{"title": "t"}]});
        let news = NewsService::new(RecordingTransport::ok(body.clone()), "KEY", "https://newsapi.org/v2").unwrap();
        assert_eq!(news.top_headlines("us", "general").await.unwrap(), body);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = NewsService::new(RecordingTransport::ok(json!({})), "KEY", "newsapi.org/v2").err().unwrap();
        assert!(matches!(err, ConfigError::BaseUrl { .. }));
    }
}
