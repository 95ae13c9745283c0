//! Fides Client
//!
//! Fides APIからデータカテゴリ一覧を取得する。

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{GleanFidesError, Result};
use crate::http::{build_client, join_url, send_json};

/// デフォルトのFides APIエンドポイント
pub const DEFAULT_FIDES_API_URL: &str =
    "https://prod.data-privacy-mapping.prod.dataservices.mozgcp.net";

/// デフォルトのトークン環境変数名
pub const DEFAULT_FIDES_TOKEN_ENV: &str = "FIDES_API_TOKEN";

const DATA_CATEGORY_PATH: &str = "api/v1/data_category";

/// Fides APIクライアント
pub struct FidesClient {
    client: Client,
    api_url: String,
    token: String,
}

impl FidesClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    /// 環境変数からトークンを読み込んでクライアントを構築
    ///
    /// トークンが未設定または空の場合、リクエスト送信前に`Configuration`エラー。
    pub fn from_env(api_url: impl Into<String>, token_env: &str) -> Result<Self> {
        let token = match std::env::var(token_env) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => {
                return Err(GleanFidesError::Configuration {
                    message: format!("{} environment variable is not set", token_env),
                })
            }
        };
        Self::new(api_url, token)
    }

    /// 全カテゴリレコードを取得（縮約前）
    pub fn fetch_categories(&self) -> Result<Vec<Value>> {
        let url = join_url(&self.api_url, DATA_CATEGORY_PATH);
        let request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .bearer_auth(&self.token);
        send_json(request, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_categories_sends_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v1/data_category")
            .match_header("authorization", "Bearer secret-token")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"fides_key": "user", "description": "User data", "parent_key": null}]"#)
            .create();

        let client = FidesClient::new(server.url(), "secret-token").unwrap();
        let records = client.fetch_categories().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["fides_key"], "user");
        mock.assert();
    }

    #[test]
    fn test_fetch_categories_non_success_is_transport_error() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v1/data_category")
            .with_status(401)
            .with_body("unauthorized")
            .create();

        let client = FidesClient::new(server.url(), "bad").unwrap();
        let err = client.fetch_categories().unwrap_err();

        assert!(matches!(err, GleanFidesError::Transport { .. }));
        assert!(err.to_string().contains("401"));
        mock.assert();
    }

    #[test]
    fn test_fetch_categories_unreachable_is_transport_error() {
        let client = FidesClient::new("http://127.0.0.1:1", "t").unwrap();
        let err = client.fetch_categories().unwrap_err();

        match err {
            GleanFidesError::Transport { url, .. } => {
                assert_eq!(url, "http://127.0.0.1:1/api/v1/data_category");
            }
            other => panic!("Expected Transport, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_without_token_is_configuration_error() {
        let result = FidesClient::from_env(
            DEFAULT_FIDES_API_URL,
            "GLEAN_FIDES_TEST_TOKEN_THAT_IS_NEVER_SET",
        );
        match result {
            Err(GleanFidesError::Configuration { message }) => {
                assert!(message.contains("GLEAN_FIDES_TEST_TOKEN_THAT_IS_NEVER_SET"));
            }
            Err(other) => panic!("Expected Configuration error, got {:?}", other),
            Ok(_) => panic!("Expected Configuration error"),
        }
    }
}
