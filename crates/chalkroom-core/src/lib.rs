//! Chalkroom Core Library
//!
//! Platform-agnostic board state for the chalkroom whiteboard: the element
//! model, the camera, undo history and the room sync state machine.

pub mod board;
pub mod camera;
pub mod config;
pub mod elements;
pub mod history;
pub mod session;
pub mod sync;

pub use board::{Board, DEFAULT_MAX_ELEMENTS};
pub use camera::Camera;
pub use config::{ConfigError, SessionConfig};
pub use elements::{ACCENT_COLOR, Element, ElementError, SerializableColor, ToolKind};
pub use history::History;
pub use session::{ElementInput, Session, SessionError, SessionEvent};
pub use sync::{
    PullOutcome, Reconciler, RoomBinding, RoomRequest, RoomResponse, SyncError, SyncState,
    SyncStatus,
};

#[cfg(not(target_arch = "wasm32"))]
pub use sync::HttpRoomClient;
