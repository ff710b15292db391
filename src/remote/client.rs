//! HTTP client for the remote reservation authority

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

use super::ReservationAuthority;
use crate::models::{AvailabilityQuery, BookingRequest, RemoteReservation};
use crate::utils::error::RemoteError;
use crate::utils::retry::{with_retry_if, RetryConfig};

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the HTTP authority
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the reservation server
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Retry count for failed idempotent reads
    pub retry_count: u32,

    /// Base retry delay
    pub retry_delay: Duration,

    /// User agent string
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            retry_count: 0,
            retry_delay: Duration::from_millis(500),
            user_agent: format!("tablebook/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set base retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn retry_config(&self) -> RetryConfig {
        let base = self.retry_delay.as_millis() as u64;
        RetryConfig::with_delays(self.retry_count, base, base.saturating_mul(16))
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SlotsResponse {
    #[serde(default)]
    slots: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

// ============================================================================
// HTTP Authority
// ============================================================================

/// [`ReservationAuthority`] over the reservation server's REST API
pub struct HttpAuthority {
    config: ClientConfig,
    http_client: Client,
}

impl HttpAuthority {
    /// Create a new HTTP authority
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RemoteError::Init(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    // Internal: send, then decode a success body or classify the failure
    async fn decode<T: for<'de> Deserialize<'de>>(
        result: reqwest::Result<Response>,
    ) -> Result<T, RemoteError> {
        let response = result.map_err(|e| RemoteError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    // Internal: GET with retry on transient failures
    async fn get_with_retry<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, RemoteError> {
        with_retry_if(
            &self.config.retry_config(),
            move || async move {
                let mut request = self.http_client.get(url).query(query);
                if let Some(token) = token {
                    request = request.bearer_auth(token);
                }
                Self::decode::<T>(request.send().await).await
            },
            RemoteError::is_transient,
        )
        .await
    }
}

/// Classify a non-success response
///
/// 401 is always `Unauthorized`. 409, or any failure whose message says the
/// slot is full, is a `Conflict`.
async fn error_from_response(response: Response) -> RemoteError {
    static SLOT_FULL_RE: OnceLock<Regex> = OnceLock::new();

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return RemoteError::Unauthorized;
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());

    let re = SLOT_FULL_RE
        .get_or_init(|| Regex::new(r"(?i)slot full").expect("Invalid regex pattern"));
    let says_full = message.as_deref().is_some_and(|m| re.is_match(m));

    if status == StatusCode::CONFLICT || says_full {
        return RemoteError::Conflict { message };
    }

    RemoteError::Http {
        status: status.as_u16(),
        message: message.unwrap_or(body),
    }
}

#[async_trait]
impl ReservationAuthority for HttpAuthority {
    async fn availability(&self, query: &AvailabilityQuery) -> Result<Vec<String>, RemoteError> {
        let url = self.url("/api/availability");
        let params = [
            ("date", query.date.to_string()),
            ("partySize", query.party_size.to_string()),
            ("durationSlots", query.duration_slots.to_string()),
        ];

        tracing::debug!(date = %query.date, party_size = query.party_size, "Fetching availability");
        let response: SlotsResponse = self.get_with_retry(&url, &params, None).await?;
        Ok(response.slots)
    }

    async fn create_reservation(
        &self,
        request: &BookingRequest,
    ) -> Result<Option<RemoteReservation>, RemoteError> {
        let url = self.url("/api/reservations");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // Success bodies vary between server versions; the record is informational
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<RemoteReservation>(&body).ok())
    }

    async fn list_reservations(
        &self,
        token: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<RemoteReservation>, RemoteError> {
        let url = self.url("/api/reservations");
        let params: Vec<(&str, String)> = date
            .map(|d| vec![("date", d.to_string())])
            .unwrap_or_default();

        self.get_with_retry(&url, &params, Some(token)).await
    }

    async fn delete_reservation(&self, token: &str, id: &str) -> Result<(), RemoteError> {
        let url = self.url(&format!("/api/reservations/{id}"));

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, RemoteError> {
        let url = self.url("/api/admin/login");
        let result = self
            .http_client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await;

        let response: LoginResponse = Self::decode(result).await?;
        Ok(response.token)
    }

    async fn verify_session(&self, token: &str) -> Result<(), RemoteError> {
        let url = self.url("/api/auth/me");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_creation() {
        let config = ClientConfig::new("http://localhost:8080");

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.retry_count, 0);
        assert!(config.user_agent.starts_with("tablebook/"));
    }

    #[test]
    fn test_client_config_with_timeout() {
        let config = ClientConfig::new("http://localhost:8080")
            .with_timeout(Duration::from_secs(5))
            .with_retry_count(2);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry_count, 2);
        assert_eq!(config.retry_config().max_retries, 2);
    }

    #[test]
    fn test_url_joining() {
        let authority = HttpAuthority::new(ClientConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(
            authority.url("/api/availability"),
            "http://localhost:8080/api/availability"
        );
    }
}
