//! Garmin Connect API client
//!
//! Provides credential login and paginated access to the activity list
//! endpoint. The client is deliberately thin: the sync pipeline owns
//! pagination and filtering, this module owns transport and status-code
//! handling.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::{MileageError, Result};

/// User agent for Connect API requests
const API_USER_AGENT: &str = "com.garmin.android.apps.connectmobile";

/// Activity list endpoint path
const ACTIVITY_LIST_PATH: &str = "/activitylist-service/activities/search/activities";

/// Signin endpoint path
const SIGNIN_PATH: &str = "/signin";

/// Bearer token obtained from login
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[derive(Deserialize)]
struct SigninResponse {
    access_token: String,
}

/// Garmin Connect API client
pub struct ConnectClient {
    client: Client,
    base_url: String,
}

impl ConnectClient {
    /// Create a new API client for the given domain
    pub fn new(domain: &str) -> Self {
        Self::new_with_base_url(&format!("https://connectapi.{}", domain))
    }

    /// Create a new API client with a custom base URL (for testing)
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build_headers(&self, session: &Session) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(API_USER_AGENT));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&session.authorization_header())
                .map_err(|e| MileageError::auth(format!("Invalid token: {}", e)))?,
        );
        Ok(headers)
    }

    /// Log in with email/password credentials
    ///
    /// Any 401/403 from the signin endpoint is an authentication failure,
    /// which callers treat as fatal to the sync run.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let response = self
            .client
            .post(self.build_url(SIGNIN_PATH))
            .header(USER_AGENT, API_USER_AGENT)
            .json(&serde_json::json!({
                "username": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(MileageError::Http)?;

        match response.status() {
            StatusCode::OK => {
                let body: SigninResponse = response.json().await.map_err(|e| {
                    MileageError::invalid_response(format!("Failed to parse signin response: {}", e))
                })?;
                Ok(Session {
                    access_token: body.access_token,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(MileageError::auth("Invalid credentials"))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(MileageError::RateLimited),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(MileageError::auth(format!(
                    "Signin failed with {}: {}",
                    status, body
                )))
            }
        }
    }

    /// Fetch one page of the activity list
    ///
    /// Returns raw JSON values; decoding into typed records happens
    /// per-record in the pipeline so one malformed entry cannot sink a page.
    pub async fn list_activities(
        &self,
        session: &Session,
        start: u32,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let url = format!(
            "{}?limit={}&start={}",
            self.build_url(ACTIVITY_LIST_PATH),
            limit,
            start
        );

        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(session)?)
            .send()
            .await
            .map_err(MileageError::Http)?;

        let response = self.handle_response_status(response).await?;
        response.json().await.map_err(|e| {
            MileageError::invalid_response(format!("Failed to parse activity list: {}", e))
        })
    }

    /// Handle response status codes and convert to errors
    async fn handle_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(response),
            StatusCode::UNAUTHORIZED => Err(MileageError::NotAuthenticated),
            StatusCode::TOO_MANY_REQUESTS => Err(MileageError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(MileageError::invalid_response(format!(
                    "API error {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client = ConnectClient::new("garmin.com");
        assert_eq!(
            client.build_url("/activitylist-service/activities/search/activities"),
            "https://connectapi.garmin.com/activitylist-service/activities/search/activities"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ConnectClient::new_with_base_url("http://localhost:8080/");
        assert_eq!(client.build_url("/signin"), "http://localhost:8080/signin");
    }
}
