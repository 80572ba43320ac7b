//! Push/pull scheduling and whole-document reconciliation.

use super::{PullTicket, RoomBinding, RoomRequest, SavePayload, SyncError, SyncResult, SyncState, SyncStatus};
use crate::elements::Element;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// Default interval between pulls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// What applying a pull response did.
#[derive(Debug, Clone, PartialEq)]
pub enum PullOutcome {
    /// Remote element count matched; local state kept.
    Unchanged,
    /// Remote differs; the caller must replace the local sequence.
    Replace(Vec<Element>),
    /// A gesture was in progress when the response arrived; discarded.
    Skipped,
    /// The pull failed; local state kept.
    Failed(SyncError),
    /// The response belongs to an old pull or a torn-down session.
    Stale,
}

/// Sync state machine for one session.
///
/// All methods run on the session's single thread; requests are queued in
/// `outgoing` and drained by the shell with [`Reconciler::take_requests`].
#[derive(Debug)]
pub struct Reconciler {
    binding: Option<RoomBinding>,
    state: SyncState,
    /// Last reported status and text, to suppress duplicate notifications.
    status: (SyncStatus, String),
    poll_interval: Duration,
    last_poll: Option<Instant>,
    pull_in_flight: Option<PullTicket>,
    pushes_in_flight: usize,
    creating: bool,
    next_ticket: u64,
    torn_down: bool,
    outgoing: Vec<RoomRequest>,
    status_events: Vec<(SyncStatus, String)>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Reconciler {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            binding: None,
            state: SyncState::Unbound,
            status: (SyncStatus::Offline, String::new()),
            poll_interval,
            last_poll: None,
            pull_in_flight: None,
            pushes_in_flight: 0,
            creating: false,
            next_ticket: 0,
            torn_down: false,
            outgoing: Vec::new(),
            status_events: Vec::new(),
        }
    }

    pub fn binding(&self) -> Option<&RoomBinding> {
        self.binding.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Drain queued requests for the shell to perform.
    pub fn take_requests(&mut self) -> Vec<RoomRequest> {
        std::mem::take(&mut self.outgoing)
    }

    /// Drain status changes (status, human-readable text).
    pub fn take_status_events(&mut self) -> Vec<(SyncStatus, String)> {
        std::mem::take(&mut self.status_events)
    }

    /// Queue a create-room call. Returns false if already bound, creating, or torn down.
    pub fn request_create(&mut self) -> bool {
        if self.torn_down || self.binding.is_some() || self.creating {
            return false;
        }
        self.creating = true;
        self.outgoing.push(RoomRequest::CreateRoom);
        self.report(SyncStatus::Offline, "creating room".to_string());
        true
    }

    /// Enter the bound state. A binding is never replaced once set.
    pub fn bind(&mut self, binding: RoomBinding) -> bool {
        if self.torn_down || self.binding.is_some() {
            return false;
        }
        log::info!("Bound to room {binding}");
        self.binding = Some(binding);
        self.creating = false;
        self.last_poll = None;
        self.set_state(SyncState::Idle, None);
        true
    }

    /// Apply a create-room completion. Returns the new binding on success.
    pub fn on_room_created(&mut self, result: SyncResult<RoomBinding>) -> Option<RoomBinding> {
        if self.torn_down {
            return None;
        }
        self.creating = false;
        match result {
            Ok(binding) if self.bind(binding.clone()) => Some(binding),
            Ok(binding) => {
                log::warn!("Ignoring created room {binding}: session already bound");
                None
            }
            Err(err) => {
                log::error!("Room creation failed: {err}");
                self.report(SyncStatus::Error, format!("could not create room: {err}"));
                None
            }
        }
    }

    /// Queue a push of the full element sequence. No-op when unbound.
    ///
    /// Any pull still in flight is invalidated; its response will be `Stale`.
    pub fn schedule_push(&mut self, elements: &[Element], user: &str) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(binding) = &self.binding else {
            return false;
        };
        let payload = SavePayload::new(binding, elements, user);
        log::debug!("Queueing push of {} elements to {binding}", elements.len());
        // A pull sent before this mutation describes an older document.
        if let Some(ticket) = self.pull_in_flight.take() {
            log::debug!("Invalidating pull {ticket:?} after local mutation");
        }
        self.outgoing.push(RoomRequest::SaveRoom { payload });
        self.pushes_in_flight += 1;
        self.set_state(SyncState::Syncing, None);
        true
    }

    /// Apply a push completion. Failures are reported, never retried.
    pub fn on_push(&mut self, result: SyncResult<()>) {
        if self.torn_down || self.binding.is_none() {
            return;
        }
        self.pushes_in_flight = self.pushes_in_flight.saturating_sub(1);
        match result {
            Ok(()) => self.settle(),
            Err(err) => {
                log::warn!("Push failed: {err}");
                self.set_state(SyncState::Error, Some(format!("save failed: {err}")));
            }
        }
    }

    /// Timer tick. Queues a pull when the interval has elapsed, no pull is in
    /// flight and no gesture is in progress. Returns true if a pull was queued.
    pub fn tick(&mut self, now: Instant, drawing: bool) -> bool {
        if self.torn_down || self.pull_in_flight.is_some() {
            return false;
        }
        let Some(binding) = self.binding.clone() else {
            return false;
        };
        let due = self
            .last_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= self.poll_interval);
        if !due {
            return false;
        }
        self.last_poll = Some(now);
        if drawing {
            log::debug!("Skipping pull: gesture in progress");
            return false;
        }

        self.next_ticket += 1;
        let ticket = PullTicket(self.next_ticket);
        self.pull_in_flight = Some(ticket);
        self.outgoing.push(RoomRequest::LoadRoom { binding, ticket });
        self.set_state(SyncState::Syncing, None);
        true
    }

    /// Apply a pull completion against the local state.
    ///
    /// `drawing` must reflect the gesture flag at the moment of application:
    /// a response landing after a gesture started is discarded.
    pub fn on_pull(
        &mut self,
        ticket: PullTicket,
        result: SyncResult<Vec<Element>>,
        local_len: usize,
        drawing: bool,
    ) -> PullOutcome {
        if self.torn_down || self.pull_in_flight != Some(ticket) {
            log::debug!("Discarding stale pull response {ticket:?}");
            return PullOutcome::Stale;
        }
        self.pull_in_flight = None;

        let remote = match result {
            Ok(remote) => remote,
            Err(err) => {
                log::warn!("Pull failed: {err}");
                self.set_state(SyncState::Error, Some(format!("load failed: {err}")));
                return PullOutcome::Failed(err);
            }
        };
        self.settle();

        if drawing {
            log::debug!("Discarding pull response: gesture in progress");
            return PullOutcome::Skipped;
        }
        if remote.len() == local_len {
            return PullOutcome::Unchanged;
        }
        log::info!("Remote board differs ({} local, {} remote), replacing", local_len, remote.len());
        PullOutcome::Replace(remote)
    }

    /// Stop all sync activity. Later ticks and late responses are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        log::info!("Sync torn down");
        self.torn_down = true;
        self.outgoing.clear();
        self.pull_in_flight = None;
        self.pushes_in_flight = 0;
        self.last_poll = None;
    }

    /// Go back to idle once nothing is in flight.
    fn settle(&mut self) {
        if self.pull_in_flight.is_none() && self.pushes_in_flight == 0 {
            self.set_state(SyncState::Idle, None);
        } else {
            self.set_state(SyncState::Syncing, None);
        }
    }

    fn set_state(&mut self, state: SyncState, error: Option<String>) {
        self.state = state;
        let room = self.binding.as_ref().map(ToString::to_string).unwrap_or_default();
        let (status, text) = match state {
            SyncState::Unbound => (SyncStatus::Offline, "local only".to_string()),
            SyncState::Idle => (SyncStatus::Online, format!("room {room}")),
            SyncState::Syncing => (SyncStatus::Online, format!("syncing room {room}")),
            SyncState::Error => (SyncStatus::Error, error.unwrap_or_else(|| "sync error".to_string())),
        };
        self.report(status, text);
    }

    fn report(&mut self, status: SyncStatus, text: String) {
        if self.status.0 == status && self.status.1 == text {
            return;
        }
        self.status = (status, text.clone());
        self.status_events.push((status, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ACCENT_COLOR, ToolKind};
    use kurbo::Point;

    fn dots(n: usize) -> Vec<Element> {
        (0..n)
            .map(|i| {
                Element::from_samples(ToolKind::Pen, &[Point::new(i as f64, 0.0)], ACCENT_COLOR)
                    .unwrap()
            })
            .collect()
    }

    fn bound() -> Reconciler {
        let mut r = Reconciler::default();
        assert!(r.bind(RoomBinding::new("abc", "xyz")));
        r
    }

    fn pull_ticket(r: &mut Reconciler) -> PullTicket {
        match r.take_requests().pop() {
            Some(RoomRequest::LoadRoom { ticket, .. }) => ticket,
            other => panic!("expected load request, got {other:?}"),
        }
    }

    #[test]
    fn test_unbound_never_queues() {
        let mut r = Reconciler::default();
        assert!(!r.tick(Instant::now(), false));
        assert!(!r.schedule_push(&dots(1), "ada"));
        assert!(r.take_requests().is_empty());
        assert_eq!(r.state(), SyncState::Unbound);
    }

    #[test]
    fn test_first_tick_pulls_with_binding() {
        let mut r = bound();
        assert!(r.tick(Instant::now(), false));
        let requests = r.take_requests();
        assert_eq!(requests.len(), 1);
        let RoomRequest::LoadRoom { binding, .. } = &requests[0] else {
            panic!("expected load request");
        };
        assert_eq!(binding, &RoomBinding::new("abc", "xyz"));
        assert_eq!(r.state(), SyncState::Syncing);
    }

    #[test]
    fn test_interval_respected() {
        let mut r = bound();
        let t0 = Instant::now();
        assert!(r.tick(t0, false));
        let ticket = pull_ticket(&mut r);
        r.on_pull(ticket, Ok(Vec::new()), 0, false);

        assert!(!r.tick(t0 + Duration::from_secs(1), false));
        assert!(r.tick(t0 + DEFAULT_POLL_INTERVAL, false));
    }

    #[test]
    fn test_no_overlapping_pulls() {
        let mut r = bound();
        let t0 = Instant::now();
        assert!(r.tick(t0, false));
        assert!(!r.tick(t0 + Duration::from_secs(10), false));
    }

    #[test]
    fn test_same_count_is_unchanged() {
        let mut r = bound();
        r.tick(Instant::now(), false);
        let ticket = pull_ticket(&mut r);
        assert_eq!(r.on_pull(ticket, Ok(dots(5)), 5, false), PullOutcome::Unchanged);
        assert_eq!(r.state(), SyncState::Idle);
    }

    #[test]
    fn test_different_count_replaces() {
        let mut r = bound();
        r.tick(Instant::now(), false);
        let ticket = pull_ticket(&mut r);
        assert_eq!(r.on_pull(ticket, Ok(dots(7)), 5, false), PullOutcome::Replace(dots(7)));
    }

    #[test]
    fn test_skip_when_drawing_at_tick() {
        let mut r = bound();
        assert!(!r.tick(Instant::now(), true));
        assert!(r.take_requests().is_empty());
    }

    #[test]
    fn test_skip_when_drawing_at_apply() {
        let mut r = bound();
        r.tick(Instant::now(), false);
        let ticket = pull_ticket(&mut r);
        assert_eq!(r.on_pull(ticket, Ok(dots(7)), 5, true), PullOutcome::Skipped);
    }

    #[test]
    fn test_error_then_recovery() {
        let mut r = bound();
        let t0 = Instant::now();
        r.tick(t0, false);
        let ticket = pull_ticket(&mut r);
        let err = SyncError::NetworkFailure("connection refused".to_string());
        assert_eq!(r.on_pull(ticket, Err(err.clone()), 0, false), PullOutcome::Failed(err));
        assert_eq!(r.state(), SyncState::Error);

        // The fixed interval keeps running in the error state.
        assert!(r.tick(t0 + DEFAULT_POLL_INTERVAL, false));
        let ticket = pull_ticket(&mut r);
        r.on_pull(ticket, Ok(Vec::new()), 0, false);
        assert_eq!(r.state(), SyncState::Idle);
    }

    #[test]
    fn test_push_invalidates_pull_in_flight() {
        let mut r = bound();
        let t0 = Instant::now();
        assert!(r.tick(t0, false));
        let ticket = pull_ticket(&mut r);
        assert!(r.schedule_push(&dots(6), "ada"));
        assert_eq!(r.on_pull(ticket, Ok(dots(5)), 6, false), PullOutcome::Stale);

        r.on_push(Ok(()));
        assert_eq!(r.state(), SyncState::Idle);
        assert!(r.tick(t0 + DEFAULT_POLL_INTERVAL, false));
    }

    #[test]
    fn test_push_failure_reported_not_retried() {
        let mut r = bound();
        assert!(r.schedule_push(&dots(2), "ada"));
        assert_eq!(r.take_requests().len(), 1);
        r.on_push(Err(SyncError::NetworkFailure("timeout".to_string())));
        assert_eq!(r.state(), SyncState::Error);
        assert!(r.take_requests().is_empty());
        let events = r.take_status_events();
        assert_eq!(events.last().map(|e| e.0), Some(SyncStatus::Error));
    }

    #[test]
    fn test_binding_is_immutable() {
        let mut r = bound();
        assert!(!r.bind(RoomBinding::new("other", "key")));
        assert!(!r.request_create());
        assert_eq!(r.binding(), Some(&RoomBinding::new("abc", "xyz")));
    }

    #[test]
    fn test_create_then_bind() {
        let mut r = Reconciler::default();
        assert!(r.request_create());
        assert!(!r.request_create());
        assert_eq!(r.take_requests(), vec![RoomRequest::CreateRoom]);
        let bound = r.on_room_created(Ok(RoomBinding::new("abc", "xyz")));
        assert_eq!(bound, Some(RoomBinding::new("abc", "xyz")));
        assert_eq!(r.state(), SyncState::Idle);
    }

    #[test]
    fn test_create_failure_stays_unbound() {
        let mut r = Reconciler::default();
        r.request_create();
        r.take_requests();
        assert_eq!(r.on_room_created(Err(SyncError::NetworkFailure("down".to_string()))), None);
        assert!(!r.is_bound());
        assert!(r.request_create());
    }

    #[test]
    fn test_teardown_ignores_late_responses() {
        let mut r = bound();
        r.tick(Instant::now(), false);
        let ticket = pull_ticket(&mut r);
        r.teardown();
        assert_eq!(r.on_pull(ticket, Ok(dots(3)), 0, false), PullOutcome::Stale);
        assert!(!r.tick(Instant::now() + Duration::from_secs(60), false));
        assert!(!r.schedule_push(&dots(1), "ada"));
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut r = bound();
        r.tick(Instant::now(), false);
        let ticket = pull_ticket(&mut r);
        let bogus = PullTicket(ticket.0 + 100);
        assert_eq!(r.on_pull(bogus, Ok(dots(3)), 0, false), PullOutcome::Stale);
        assert_eq!(r.on_pull(ticket, Ok(dots(3)), 0, false), PullOutcome::Replace(dots(3)));
    }
}
