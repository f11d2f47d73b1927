use async_trait::async_trait;
use jokes_core::JokesConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Anything that can produce one joke on demand.
#[async_trait]
pub trait JokeSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<String, FetchError>;
}

/// `GET {base_url}/jokes/random` against the chucknorris.io API.
pub struct ChuckNorrisSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RandomJoke {
    value: String,
}

impl ChuckNorrisSource {
    pub fn new(config: &JokesConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.api.user_agent.clone())
            .timeout(config.api.timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.joke_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JokeSource for ChuckNorrisSource {
    fn name(&self) -> &str {
        "chucknorris.io"
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "fetching joke");

        let resp = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "joke API error");
            return Err(FetchError::Status { status });
        }

        let body = resp.text().await?;
        parse_joke(&body)
    }
}

/// Extract the non-blank `value` string from a response body.
pub fn parse_joke(body: &str) -> Result<String, FetchError> {
    let joke: RandomJoke =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let value = joke.value.trim();
    if value.is_empty() {
        return Err(FetchError::Malformed("empty joke".to_string()));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_field() {
        let body = r#"{"categories":[],"icon_url":"x","id":"abc","url":"y","value":"Chuck counted to infinity. Twice."}"#;
        assert_eq!(
            parse_joke(body).unwrap(),
            "Chuck counted to infinity. Twice."
        );
    }

    #[test]
    fn missing_value_is_malformed() {
        assert!(matches!(
            parse_joke(r#"{"id":"abc"}"#),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn non_string_value_is_malformed() {
        assert!(matches!(
            parse_joke(r#"{"value":42}"#),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn blank_value_is_malformed() {
        assert!(matches!(
            parse_joke(r#"{"value":"   "}"#),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn html_body_is_malformed() {
        assert!(matches!(
            parse_joke("<html>502 Bad Gateway</html>"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn url_comes_from_config() {
        let mut cfg = JokesConfig::default();
        cfg.api.base_url = "http://127.0.0.1:9".to_string();
        let source = ChuckNorrisSource::new(&cfg).unwrap();
        assert_eq!(source.url(), "http://127.0.0.1:9/jokes/random");
        assert_eq!(source.name(), "chucknorris.io");
    }
}
