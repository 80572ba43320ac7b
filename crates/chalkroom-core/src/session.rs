//! Session controller: the single owner of board, view and sync state.
//!
//! Every mutation from the shell goes through a [`Session`] method. Points
//! arrive in device space and are mapped through the camera here, so gesture
//! handlers never do coordinate math themselves.

use crate::board::Board;
use crate::camera::Camera;
use crate::config::SessionConfig;
use crate::elements::{ACCENT_COLOR, Element, ElementError, SerializableColor, ToolKind};
use crate::sync::{
    Instant, PullOutcome, Reconciler, RoomBinding, RoomRequest, RoomResponse, SyncState, SyncStatus,
};
use kurbo::{Point, Vec2};
use thiserror::Error;
use url::Url;

/// Session-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A room binding is immutable once established.
    #[error("session is already bound to a room")]
    AlreadyBound,
    /// A create-room call is already waiting for its response.
    #[error("a room is already being created")]
    CreatePending,
    /// The session has been torn down.
    #[error("session has been torn down")]
    TornDown,
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Notification for the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Board or view changed; paint again.
    RepaintNeeded,
    SyncStatusChanged { status: SyncStatus, text: String },
    /// A room was created or joined. The shell should update its shareable location.
    RoomBound { binding: RoomBinding },
}

/// One-shot element input from the shell, in device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementInput {
    /// Text typed at a point.
    Text { at: Point, text: String },
    /// Code pasted at a point.
    Code { at: Point, source: String },
    /// A complete drag, first sample to last.
    Drag { tool: ToolKind, samples: Vec<Point> },
}

/// A whiteboard session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    board: Board,
    camera: Camera,
    tool: ToolKind,
    color: SerializableColor,
    reconciler: Reconciler,
    events: Vec<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            board: Board::new(config.history_capacity, config.max_elements),
            camera: Camera::new(),
            tool: ToolKind::default(),
            color: ACCENT_COLOR,
            reconciler: Reconciler::new(config.poll_interval),
            events: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    pub fn is_drawing(&self) -> bool {
        self.board.is_drawing()
    }

    pub fn binding(&self) -> Option<&RoomBinding> {
        self.reconciler.binding()
    }

    /// Whether a create-room call is waiting for its response.
    pub fn is_creating(&self) -> bool {
        self.reconciler.is_creating()
    }

    pub fn sync_state(&self) -> SyncState {
        self.reconciler.state()
    }

    /// Drain pending notifications, oldest first.
    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        self.collect_status();
        std::mem::take(&mut self.events)
    }

    // --- Drawing -----------------------------------------------------------

    /// Commit a complete element in one call.
    ///
    /// Empty text or code is rejected with [`ElementError::InputRejected`]
    /// and leaves the session untouched.
    pub fn add_element(&mut self, input: ElementInput) -> Result<(), SessionError> {
        let element = match input {
            ElementInput::Text { at, text } => {
                Element::text(self.camera.to_logical(at), &text, self.color)
            }
            ElementInput::Code { at, source } => {
                Element::code(self.camera.to_logical(at), &source, self.color)
            }
            ElementInput::Drag { tool, samples } => {
                let logical: Vec<Point> =
                    samples.iter().map(|p| self.camera.to_logical(*p)).collect();
                Element::from_samples(tool, &logical, self.color)
            }
        }
        .inspect_err(|e| log::debug!("Rejected element input: {e}"))?;

        self.board.add_element(element);
        self.after_mutation();
        Ok(())
    }

    /// Pointer down with the current tool. Text and code tools are not drag
    /// tools; the shell collects their payload and calls [`Session::add_element`].
    pub fn pointer_down(&mut self, device: Point) -> Result<(), SessionError> {
        let start = self.camera.to_logical(device);
        self.board.begin_gesture(self.tool, start, self.color)?;
        self.request_repaint();
        Ok(())
    }

    /// Pointer move during a gesture. Returns false when no gesture is active.
    pub fn update_in_progress(&mut self, device: Point) -> bool {
        let point = self.camera.to_logical(device);
        let updated = self.board.update_in_progress(point);
        if updated {
            self.request_repaint();
        }
        updated
    }

    /// Pointer up. Returns false when no gesture is active.
    pub fn commit_in_progress(&mut self) -> bool {
        if !self.board.commit_in_progress() {
            return false;
        }
        self.after_mutation();
        true
    }

    /// Drop the active gesture without committing it.
    pub fn cancel_in_progress(&mut self) -> bool {
        let cancelled = self.board.cancel_in_progress();
        if cancelled {
            self.request_repaint();
        }
        cancelled
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.board.undo();
        if changed {
            self.after_mutation();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.board.redo();
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// Remove every element. Undoable.
    pub fn clear_all(&mut self) -> bool {
        let changed = self.board.clear();
        if changed {
            self.after_mutation();
        }
        changed
    }

    // --- View --------------------------------------------------------------

    /// Adjust zoom by `delta`, clamped to the minimum scale.
    pub fn set_zoom(&mut self, delta: f64) -> bool {
        let changed = self.camera.set_zoom(delta);
        if changed {
            self.request_repaint();
        }
        changed
    }

    /// Adjust zoom keeping `device` fixed on screen.
    pub fn zoom_at(&mut self, device: Point, delta: f64) -> bool {
        let changed = self.camera.zoom_at(device, delta);
        if changed {
            self.request_repaint();
        }
        changed
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
        self.request_repaint();
    }

    // --- Rooms -------------------------------------------------------------

    /// Ask the room service for a new room. The binding arrives through
    /// [`Session::handle_response`].
    pub fn create_room(&mut self) -> Result<(), SessionError> {
        self.ensure_alive()?;
        if self.reconciler.is_bound() {
            return Err(SessionError::AlreadyBound);
        }
        if !self.reconciler.request_create() {
            return Err(SessionError::CreatePending);
        }
        self.collect_status();
        Ok(())
    }

    /// Bind to an existing room.
    pub fn join_room(
        &mut self,
        room_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.bind(RoomBinding::new(room_id, key))
    }

    /// Bind to the room named by a shareable location. Returns false when the
    /// location does not carry both `room` and `key`.
    pub fn join_from_url(&mut self, url: &Url) -> Result<bool, SessionError> {
        match RoomBinding::from_url(url) {
            Some(binding) => self.bind(binding).map(|()| true),
            None => Ok(false),
        }
    }

    /// Shareable location for the bound room.
    pub fn share_url(&self, base: &Url) -> Option<Url> {
        self.binding().map(|b| b.share_url(base))
    }

    fn bind(&mut self, binding: RoomBinding) -> Result<(), SessionError> {
        self.ensure_alive()?;
        if !self.reconciler.bind(binding.clone()) {
            return Err(SessionError::AlreadyBound);
        }
        self.events.push(SessionEvent::RoomBound { binding });
        self.collect_status();
        Ok(())
    }

    // --- Sync --------------------------------------------------------------

    /// Timer tick. Queues a pull when one is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        let scheduled = self.reconciler.tick(now, self.board.is_drawing());
        self.collect_status();
        scheduled
    }

    /// Requests for the shell to perform, in order.
    pub fn take_requests(&mut self) -> Vec<RoomRequest> {
        self.reconciler.take_requests()
    }

    /// Feed back the completion of a request.
    pub fn handle_response(&mut self, response: RoomResponse) {
        match response {
            RoomResponse::Created(result) => {
                if let Some(binding) = self.reconciler.on_room_created(result) {
                    self.events.push(SessionEvent::RoomBound { binding });
                    // Seed the new room with whatever was drawn offline.
                    if !self.board.is_empty() {
                        self.push_board();
                    }
                }
            }
            RoomResponse::Loaded { ticket, result } => {
                let outcome = self.reconciler.on_pull(
                    ticket,
                    result,
                    self.board.len(),
                    self.board.is_drawing(),
                );
                if let PullOutcome::Replace(elements) = outcome {
                    self.board.replace_all(elements);
                    self.request_repaint();
                }
            }
            RoomResponse::Saved(result) => self.reconciler.on_push(result),
        }
        self.collect_status();
    }

    /// Stop syncing. Later ticks and responses are ignored; the board stays usable.
    pub fn teardown(&mut self) {
        self.reconciler.teardown();
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        if self.reconciler.is_torn_down() {
            Err(SessionError::TornDown)
        } else {
            Ok(())
        }
    }

    fn after_mutation(&mut self) {
        self.request_repaint();
        self.push_board();
    }

    fn push_board(&mut self) {
        self.reconciler
            .schedule_push(self.board.elements(), &self.config.display_name);
        self.collect_status();
    }

    fn request_repaint(&mut self) {
        if self.events.last() != Some(&SessionEvent::RepaintNeeded) {
            self.events.push(SessionEvent::RepaintNeeded);
        }
    }

    fn collect_status(&mut self) {
        for (status, text) in self.reconciler.take_status_events() {
            self.events.push(SessionEvent::SyncStatusChanged { status, text });
        }
    }
}
