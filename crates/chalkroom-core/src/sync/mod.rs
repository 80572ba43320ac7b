//! Room synchronization.
//!
//! The reconciler is sans-IO: it queues [`RoomRequest`]s that the shell
//! performs (see [`HttpRoomClient`] on native targets) and consumes the
//! matching [`RoomResponse`]s. Merging is last-writer-wins at whole-document
//! granularity: a pulled document replaces the local one when the element
//! counts differ. Concurrent edits between two polls are not merged.

#[cfg(not(target_arch = "wasm32"))]
mod http;
mod reconciler;
mod wire;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpRoomClient;
pub use reconciler::{DEFAULT_POLL_INTERVAL, Instant, PullOutcome, Reconciler};
pub use wire::{RoomCreated, RoomDocument, SavePayload, parse_room_created, parse_room_document};

use crate::elements::Element;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Sync errors. None of them is fatal; the board keeps working offline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Transport failure, timeout or non-success status.
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// The service answered with something that isn't a valid room document.
    #[error("malformed room payload: {0}")]
    InvariantViolation(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Identifies a remote room. Immutable once established.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomBinding {
    pub room_id: String,
    pub key: String,
}

impl RoomBinding {
    pub fn new(room_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            key: key.into(),
        }
    }

    /// Read `room` and `key` from a shareable location. Both must be present
    /// and non-empty.
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut room = None;
        let mut key = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "room" if !value.is_empty() => room = Some(value.into_owned()),
                "key" if !value.is_empty() => key = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Self::new(room?, key?))
    }

    /// Shareable location for this room, keeping `base`'s other query pairs.
    pub fn share_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(name, _)| name != "room" && name != "key")
            .map(|(n, v)| (n.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &kept {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("room", &self.room_id);
            pairs.append_pair("key", &self.key);
        }
        url
    }
}

impl fmt::Display for RoomBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.room_id)
    }
}

/// Reconciler state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No room; everything is local.
    Unbound,
    /// Bound, nothing in flight.
    Idle,
    /// Bound, at least one request in flight.
    Syncing,
    /// Bound, the last completed request failed.
    Error,
}

/// Status indicator shown by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Online,
    Offline,
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Online => "online",
            SyncStatus::Offline => "offline",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one scheduled pull so late or stale responses can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PullTicket(pub u64);

/// Work for the shell to perform against the room service.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomRequest {
    /// `GET /create-room`.
    CreateRoom,
    /// `GET /get-room?roomId=&key=`.
    LoadRoom {
        binding: RoomBinding,
        ticket: PullTicket,
    },
    /// `POST /save-room`.
    SaveRoom { payload: SavePayload },
}

/// Completion of a [`RoomRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoomResponse {
    Created(SyncResult<RoomBinding>),
    Loaded {
        ticket: PullTicket,
        result: SyncResult<Vec<Element>>,
    },
    Saved(SyncResult<()>),
}
