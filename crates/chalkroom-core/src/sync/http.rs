//! HTTP transport for the room service.
//!
//! Thin wrapper around `reqwest`. URL building and body parsing are plain
//! functions so they can be tested without a network.

use super::wire::{parse_room_created, parse_room_document};
use super::{PullTicket, RoomBinding, RoomRequest, RoomResponse, SavePayload, SyncError, SyncResult};
use crate::elements::Element;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Performs [`RoomRequest`]s against a room service base URL.
#[derive(Debug, Clone)]
pub struct HttpRoomClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpRoomClient {
    /// Build a client. Every request is bounded by `timeout`.
    pub fn new(base: Url, timeout: Duration) -> SyncResult<Self> {
        if base.cannot_be_a_base() {
            return Err(SyncError::InvariantViolation(format!("not a base url: {base}")));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| SyncError::NetworkFailure(format!("http client: {e}")))?;
        Ok(Self { http, base })
    }

    /// Perform one request and wrap its outcome for the reconciler.
    pub async fn execute(&self, request: RoomRequest) -> RoomResponse {
        match request {
            RoomRequest::CreateRoom => RoomResponse::Created(self.create_room().await),
            RoomRequest::LoadRoom { binding, ticket } => self.load(binding, ticket).await,
            RoomRequest::SaveRoom { payload } => RoomResponse::Saved(self.save_room(&payload).await),
        }
    }

    async fn load(&self, binding: RoomBinding, ticket: PullTicket) -> RoomResponse {
        RoomResponse::Loaded {
            ticket,
            result: self.load_room(&binding).await,
        }
    }

    /// `GET /create-room`.
    pub async fn create_room(&self) -> SyncResult<RoomBinding> {
        let url = endpoint_url(&self.base, "create-room", &[])?;
        let body = self.fetch(self.http.get(url)).await?;
        parse_room_created(&body)
    }

    /// `GET /get-room?roomId=&key=`.
    pub async fn load_room(&self, binding: &RoomBinding) -> SyncResult<Vec<Element>> {
        let url = endpoint_url(
            &self.base,
            "get-room",
            &[("roomId", &binding.room_id), ("key", &binding.key)],
        )?;
        let body = self.fetch(self.http.get(url)).await?;
        parse_room_document(&body)
    }

    /// `POST /save-room`. The response body is ignored.
    pub async fn save_room(&self, payload: &SavePayload) -> SyncResult<()> {
        let url = endpoint_url(&self.base, "save-room", &[])?;
        self.fetch(self.http.post(url).json(payload)).await?;
        Ok(())
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> SyncResult<String> {
        let response = request.send().await.map_err(network_failure)?;
        let status = response.status();
        let text = response.text().await.map_err(network_failure)?;
        check_status(status.as_u16(), &text)?;
        Ok(text)
    }
}

fn network_failure(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::NetworkFailure("request timed out".to_string())
    } else {
        SyncError::NetworkFailure(err.to_string())
    }
}

/// Map a non-success status to a network failure, keeping a short body excerpt.
fn check_status(status: u16, body: &str) -> SyncResult<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let excerpt: String = body.chars().take(120).collect();
    Err(SyncError::NetworkFailure(format!("HTTP {status}: {excerpt}")))
}

/// Append `endpoint` to the base path and set the query parameters.
fn endpoint_url(base: &Url, endpoint: &str, query: &[(&str, &str)]) -> SyncResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| SyncError::InvariantViolation(format!("not a base url: {base}")))?
        .pop_if_empty()
        .push(endpoint);
    url.set_query(None);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
