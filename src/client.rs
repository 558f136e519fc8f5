//! Attendance API client.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::{AttendanceEvent, Coordinates, LeaveRequest, LeaveStatus, User};

/// Remote data the dashboard and reports are built from.
pub trait AttendanceSource: Send + Sync {
    /// All user accounts.
    fn get_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Attendance events with timestamps in `[start, end]`.
    fn get_all_attendance_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AttendanceEvent>>> + Send;

    /// Leave requests with the given status overlapping `[start, end]`.
    fn get_leave_requests(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) -> impl Future<Output = Result<Vec<LeaveRequest>>> + Send;

    /// Reverse-geocode coordinates. Keys are `"lat,lon"` rounded to 6 decimals.
    fn batch_resolve_addresses(
        &self,
        coords: &[Coordinates],
    ) -> impl Future<Output = Result<HashMap<String, String>>> + Send;
}

/// HTTP client for the attendance API.
///
/// Sends JSON requests with an optional bearer token.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct GeocodeRequest<'a> {
    coords: &'a [Coordinates],
}

impl ApiClient {
    /// Create a new client instance from the API settings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{base}/{path}", base = self.base_url, path = path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path);
        debug!("GET {url}");

        let response = self.authorize(self.client.get(&url).query(query)).send().await?;
        read_json(response).await
    }

    /// Check that the API answers at all.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self.authorize(self.client.get(self.endpoint("users"))).send().await?;
        Ok(response.status().is_success())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(AppError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

impl AttendanceSource for ApiClient {
    async fn get_users(&self) -> Result<Vec<User>> {
        self.get_json("users", &[]).await
    }

    async fn get_all_attendance_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<AttendanceEvent>> {
        let query = [("start", start.to_rfc3339()), ("end", end.to_rfc3339())];
        self.get_json("attendance/events", &query).await
    }

    async fn get_leave_requests(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>> {
        let query = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
            ("status", status.as_str().to_string()),
        ];
        self.get_json("leave-requests", &query).await
    }

    async fn batch_resolve_addresses(&self, coords: &[Coordinates]) -> Result<HashMap<String, String>> {
        if coords.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.endpoint("geocode/batch");
        debug!("POST {url} ({} coordinates)", coords.len());

        let request = self.client.post(&url).json(&GeocodeRequest { coords });
        let response = self.authorize(request).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            token: token.map(str::to_string),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ApiClient::new(&config("https://api.example.com/v1/", None)).unwrap();
        assert_eq!(client.endpoint("users"), "https://api.example.com/v1/users");
        assert_eq!(client.endpoint("/geocode/batch"), "https://api.example.com/v1/geocode/batch");
    }

    #[test]
    fn test_empty_token_ignored() {
        let client = ApiClient::new(&config("https://api.example.com", Some(""))).unwrap();
        assert!(client.token.is_none());

        let client = ApiClient::new(&config("https://api.example.com", Some("abc"))).unwrap();
        assert_eq!(client.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_geocode_request_body() {
        let coords = [Coordinates {
            lat: 10.5,
            lon: 106.25,
        }];
        let body = serde_json::to_string(&GeocodeRequest { coords: &coords }).unwrap();
        assert_eq!(body, r#"{"coords":[{"lat":10.5,"lon":106.25}]}"#);
    }

    #[tokio::test]
    async fn test_empty_geocode_batch_skips_request() {
        // Unroutable host: any request would fail
        let client = ApiClient::new(&config("http://127.0.0.1:9", None)).unwrap();
        let resolved = client.batch_resolve_addresses(&[]).await.unwrap();
        assert!(resolved.is_empty());
    }
}
