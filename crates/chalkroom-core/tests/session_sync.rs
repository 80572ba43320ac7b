//! End-to-end session behavior through the request/response boundary.

use chalkroom_core::elements::ACCENT_COLOR;
use chalkroom_core::sync::{Instant, PullTicket};
use chalkroom_core::{
    Element, ElementInput, RoomBinding, RoomRequest, RoomResponse, Session, SessionConfig,
    SessionEvent, SyncError, SyncState, SyncStatus, ToolKind,
};
use kurbo::Point;
use std::time::Duration;

fn config() -> SessionConfig {
    SessionConfig {
        display_name: "ada".to_string(),
        ..SessionConfig::default()
    }
}

fn dots(n: usize) -> Vec<Element> {
    (0..n)
        .map(|i| Element::from_samples(ToolKind::Pen, &[Point::new(i as f64, 1.0)], ACCENT_COLOR).unwrap())
        .collect()
}

fn add_dot(session: &mut Session, x: f64) {
    session
        .add_element(ElementInput::Drag {
            tool: ToolKind::Pen,
            samples: vec![Point::new(x, 0.0)],
        })
        .unwrap();
}

fn expect_pull(session: &mut Session) -> (RoomBinding, PullTicket) {
    let requests = session.take_requests();
    let load = requests.into_iter().find_map(|r| match r {
        RoomRequest::LoadRoom { binding, ticket } => Some((binding, ticket)),
        _ => None,
    });
    load.expect("a load request")
}

#[test]
fn create_room_binds_and_pulls_with_its_params() {
    let mut session = Session::new(config());
    assert_eq!(session.sync_state(), SyncState::Unbound);

    session.create_room().unwrap();
    assert_eq!(session.take_requests(), vec![RoomRequest::CreateRoom]);

    session.handle_response(RoomResponse::Created(Ok(RoomBinding::new("abc", "xyz"))));
    assert_eq!(session.sync_state(), SyncState::Idle);
    let events = session.poll_events();
    assert!(events.contains(&SessionEvent::RoomBound {
        binding: RoomBinding::new("abc", "xyz")
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::SyncStatusChanged { status: SyncStatus::Online, .. }
    )));

    assert!(session.tick(Instant::now()));
    let (binding, _) = expect_pull(&mut session);
    assert_eq!(binding.room_id, "abc");
    assert_eq!(binding.key, "xyz");
}

#[test]
fn equal_counts_leave_board_alone() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    for i in 0..5 {
        add_dot(&mut session, f64::from(i));
    }
    let local = session.board().elements().to_vec();
    session.take_requests();
    session.poll_events();

    session.tick(Instant::now());
    let (_, ticket) = expect_pull(&mut session);
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(dots(5)),
    });

    assert_eq!(session.board().elements(), local.as_slice());
    assert!(!session.poll_events().contains(&SessionEvent::RepaintNeeded));
    assert!(session.board().can_undo());
}

#[test]
fn different_count_replaces_board() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    for i in 0..5 {
        add_dot(&mut session, f64::from(i));
    }
    session.take_requests();
    session.poll_events();

    session.tick(Instant::now());
    let (_, ticket) = expect_pull(&mut session);
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(dots(7)),
    });

    assert_eq!(session.board().elements(), dots(7).as_slice());
    assert!(session.poll_events().contains(&SessionEvent::RepaintNeeded));
    // Remote replacement is not undoable.
    assert!(!session.board().can_undo());
}

#[test]
fn response_during_gesture_is_discarded() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();

    session.tick(Instant::now());
    let (_, ticket) = expect_pull(&mut session);

    // Gesture starts between the request and its response.
    session.pointer_down(Point::new(3.0, 3.0)).unwrap();
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(dots(7)),
    });
    assert!(session.board().is_empty());
    assert!(session.is_drawing());

    assert!(session.commit_in_progress());
    assert_eq!(session.board().len(), 1);
}

#[test]
fn no_pull_scheduled_while_drawing() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    session.pointer_down(Point::ZERO).unwrap();
    assert!(!session.tick(Instant::now()));
    assert!(session.take_requests().is_empty());
}

#[test]
fn failures_surface_as_error_status_and_recover() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    let t0 = Instant::now();

    session.tick(t0);
    let (_, ticket) = expect_pull(&mut session);
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Err(SyncError::InvariantViolation("missing elements".to_string())),
    });
    assert_eq!(session.sync_state(), SyncState::Error);
    assert!(session.poll_events().iter().any(|e| matches!(
        e,
        SessionEvent::SyncStatusChanged { status: SyncStatus::Error, .. }
    )));

    // Drawing keeps working offline.
    add_dot(&mut session, 1.0);
    session.handle_response(RoomResponse::Saved(Err(SyncError::NetworkFailure("timeout".to_string()))));
    assert_eq!(session.board().len(), 1);

    session.tick(t0 + session.config().poll_interval);
    let (_, ticket) = expect_pull(&mut session);
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(dots(1)),
    });
    assert_eq!(session.sync_state(), SyncState::Idle);
}

#[test]
fn push_carries_display_name_and_full_document() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    add_dot(&mut session, 1.0);
    add_dot(&mut session, 2.0);

    let payloads: Vec<_> = session
        .take_requests()
        .into_iter()
        .filter_map(|r| match r {
            RoomRequest::SaveRoom { payload } => Some(payload),
            _ => None,
        })
        .collect();
    assert_eq!(payloads.len(), 2);
    let last = &payloads[1];
    assert_eq!(last.room_id, "abc");
    assert_eq!(last.key, "xyz");
    assert_eq!(last.user, "ada");
    assert_eq!(last.elements.len(), 2);
}

#[test]
fn created_room_is_seeded_with_offline_work() {
    let mut session = Session::new(config());
    add_dot(&mut session, 1.0);
    session.create_room().unwrap();
    session.take_requests();
    session.handle_response(RoomResponse::Created(Ok(RoomBinding::new("abc", "xyz"))));
    let requests = session.take_requests();
    assert!(matches!(
        requests.as_slice(),
        [RoomRequest::SaveRoom { payload }] if payload.elements.len() == 1
    ));
}

#[test]
fn teardown_ignores_late_pull() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    let t0 = Instant::now();
    session.tick(t0);
    let (_, ticket) = expect_pull(&mut session);

    session.teardown();
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(dots(4)),
    });
    assert!(session.board().is_empty());
    assert!(!session.tick(t0 + Duration::from_secs(30)));
    assert!(session.take_requests().is_empty());
}

#[test]
fn zoom_steps_and_clamps() {
    let mut session = Session::new(config());
    for _ in 0..10 {
        session.set_zoom(0.1);
    }
    assert!((session.camera().zoom - 2.0).abs() < 1e-9);
    for _ in 0..50 {
        session.set_zoom(-0.1);
    }
    assert!((session.camera().zoom - 0.1).abs() < 1e-9);
    assert!(session.camera().zoom > 0.0);
}

#[test]
fn undo_count_tracks_adds() {
    let mut session = Session::new(config());
    let mut before = Vec::new();
    for i in 0..12 {
        before.push(session.board().len());
        add_dot(&mut session, f64::from(i));
    }
    while let Some(expected) = before.pop() {
        assert!(session.undo());
        assert_eq!(session.board().len(), expected);
    }
    assert!(!session.undo());
}

#[test]
fn pull_sent_before_local_commit_does_not_drop_it() {
    let mut session = Session::new(config());
    session.join_room("abc", "xyz").unwrap();
    session.tick(Instant::now());
    let (_, ticket) = expect_pull(&mut session);

    add_dot(&mut session, 1.0);
    session.handle_response(RoomResponse::Loaded {
        ticket,
        result: Ok(Vec::new()),
    });
    assert_eq!(session.board().len(), 1);
    assert!(session.board().can_undo());
}

fn undo_redo_cycles(capacity: usize, adds: usize) {
    let mut session = Session::new(SessionConfig {
        history_capacity: capacity,
        ..config()
    });
    for i in 0..adds {
        add_dot(&mut session, i as f64);
    }
    let floor = adds.saturating_sub(capacity);

    for _ in 0..4 {
        for expected in (floor..adds).rev() {
            assert!(session.undo());
            assert_eq!(session.board().len(), expected);
        }
        assert!(!session.undo());
        for expected in floor + 1..=adds {
            assert!(session.redo());
            assert_eq!(session.board().len(), expected);
        }
        assert!(!session.redo());
    }
    assert_eq!(session.board().elements(), dots_at(adds).as_slice());
}

fn dots_at(n: usize) -> Vec<Element> {
    (0..n)
        .map(|i| Element::from_samples(ToolKind::Pen, &[Point::new(i as f64, 0.0)], ACCENT_COLOR).unwrap())
        .collect()
}

#[test]
fn repeated_undo_redo_cycles_do_not_drift() {
    undo_redo_cycles(10, 6);
}

#[test]
fn repeated_undo_redo_cycles_at_history_capacity() {
    undo_redo_cycles(10, 10);
    undo_redo_cycles(10, 13);
}
