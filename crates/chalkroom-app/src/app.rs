//! Runtime shell: drives a [`Session`] against the room service.

use crate::cli::{DrawArgs, RoomArgs, SnapshotTarget};
use chalkroom_core::sync::Instant;
use chalkroom_core::{
    ConfigError, ElementInput, HttpRoomClient, RoomResponse, Session, SessionConfig, SessionError,
    SessionEvent, SyncError, SyncState, SyncStatus, ToolKind,
};
use chalkroom_render::{RenderContext, RendererError, render_svg};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// How often the session clock is advanced. Pulls still follow the poll interval.
const TICK_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("location does not name a room (needs room and key): {0}")]
    NoRoom(Url),
    #[error("no room given: pass a shareable location or --room and --key")]
    MissingRoom,
    #[error("room service error: {0}")]
    Remote(String),
    #[error("interrupted")]
    Interrupted,
}

/// When [`App::drive`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    /// Run until Ctrl-C.
    Interrupted,
    /// Return after the first pull completes.
    Pulled,
    /// Return once every queued push has completed.
    Settled,
    /// Return once a create-room call has bound the session.
    Bound,
}

/// Shell state around one session.
pub struct App {
    session: Session,
    client: HttpRoomClient,
    responses_tx: mpsc::UnboundedSender<RoomResponse>,
    responses_rx: mpsc::UnboundedReceiver<RoomResponse>,
    in_flight: usize,
    /// Follow-mode snapshot file, rewritten on every repaint.
    snapshot: Option<(PathBuf, SnapshotTarget)>,
    share_base: Option<Url>,
}

impl App {
    pub fn new(config: SessionConfig) -> Result<Self, AppError> {
        let service_url = config.service_url()?;
        log::info!("Using room service {service_url} as {}", config.display_name);
        let client = HttpRoomClient::new(service_url, config.request_timeout)?;
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Ok(Self {
            session: Session::new(config),
            client,
            responses_tx,
            responses_rx,
            in_flight: 0,
            snapshot: None,
            share_base: None,
        })
    }

    /// Create a room and follow it until interrupted.
    pub async fn create(
        mut self,
        snapshot: Option<PathBuf>,
        view: SnapshotTarget,
        share_base: Url,
    ) -> Result<(), AppError> {
        self.snapshot = snapshot.map(|path| (path, view));
        self.share_base = Some(share_base);
        self.session.create_room()?;
        match self.drive(Until::Bound).await {
            Ok(()) => self.follow().await,
            Err(err) => {
                self.shutdown();
                match err {
                    AppError::Interrupted => Ok(()),
                    err => Err(err),
                }
            }
        }
    }

    /// Join a room and follow it until interrupted.
    pub async fn watch(
        mut self,
        room: &RoomArgs,
        snapshot: Option<PathBuf>,
        view: SnapshotTarget,
        share_base: Url,
    ) -> Result<(), AppError> {
        self.snapshot = snapshot.map(|path| (path, view));
        self.share_base = Some(share_base);
        self.join(room)?;
        self.follow().await
    }

    /// Pull a room once and write it as SVG.
    pub async fn snapshot(mut self, room: &RoomArgs, out: PathBuf, view: SnapshotTarget) -> Result<(), AppError> {
        self.join(room)?;
        self.drive(Until::Pulled).await?;
        self.fail_on_error()?;
        write_snapshot(&self.session, &out, &view)?;
        self.shutdown();
        Ok(())
    }

    /// Add one element to a room after catching up with its current state.
    pub async fn draw(mut self, args: DrawArgs) -> Result<(), AppError> {
        self.join(&args.room)?;
        self.drive(Until::Pulled).await?;
        self.fail_on_error()?;

        let input = element_input(&args);
        self.session.add_element(input)?;
        self.drive(Until::Settled).await?;
        self.fail_on_error()?;
        log::info!("Room now holds {} elements", self.session.board().len());
        self.shutdown();
        Ok(())
    }

    async fn follow(mut self) -> Result<(), AppError> {
        let result = self.drive(Until::Interrupted).await;
        self.shutdown();
        match result {
            Err(AppError::Interrupted) | Ok(()) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn join(&mut self, room: &RoomArgs) -> Result<(), AppError> {
        match (&room.url, &room.room, &room.key) {
            (Some(url), _, _) => {
                if !self.session.join_from_url(url)? {
                    return Err(AppError::NoRoom(url.clone()));
                }
            }
            (None, Some(id), Some(key)) => self.session.join_room(id.as_str(), key.as_str())?,
            (None, _, _) => return Err(AppError::MissingRoom),
        }
        Ok(())
    }

    fn fail_on_error(&self) -> Result<(), AppError> {
        if self.session.sync_state() == SyncState::Error {
            return Err(AppError::Remote("last room service call failed".to_string()));
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.session.teardown();
        log::info!("Session closed");
    }

    /// Pump requests, responses and timer ticks until `until` is reached.
    async fn drive(&mut self, until: Until) -> Result<(), AppError> {
        let mut ticker = tokio::time::interval(TICK_PERIOD);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            self.dispatch();
            self.handle_events()?;
            if until == Until::Settled && self.in_flight == 0 {
                return Ok(());
            }

            let mut pulled = false;
            let mut created = None;
            tokio::select! {
                _ = ticker.tick() => {
                    self.session.tick(Instant::now());
                }
                Some(response) = self.responses_rx.recv() => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    pulled = matches!(response, RoomResponse::Loaded { .. });
                    if let RoomResponse::Created(result) = &response {
                        created = Some(result.clone().map(|_| ()));
                    }
                    self.session.handle_response(response);
                }
                _ = &mut interrupt => {
                    log::info!("Interrupted");
                    return Err(AppError::Interrupted);
                }
            }

            if pulled && until == Until::Pulled {
                self.handle_events()?;
                return Ok(());
            }
            if until == Until::Bound {
                match created {
                    Some(Err(err)) => {
                        self.handle_events()?;
                        return Err(AppError::Sync(err));
                    }
                    Some(Ok(())) => {
                        self.handle_events()?;
                        if self.session.binding().is_none() {
                            return Err(AppError::Remote("created room was not bound".to_string()));
                        }
                        return Ok(());
                    }
                    None => {}
                }
            }
        }
    }

    /// Start every queued request on the runtime.
    fn dispatch(&mut self) {
        for request in self.session.take_requests() {
            log::debug!("Dispatching {request:?}");
            let client = self.client.clone();
            let tx = self.responses_tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let response = client.execute(request).await;
                // The receiver only goes away at shutdown.
                let _ = tx.send(response);
            });
        }
    }

    /// Log status changes and keep the follow-mode snapshot current.
    fn handle_events(&mut self) -> Result<(), AppError> {
        let mut repaint = false;
        for event in self.session.poll_events() {
            match event {
                SessionEvent::RepaintNeeded => repaint = true,
                SessionEvent::SyncStatusChanged { status, text } => match status {
                    SyncStatus::Error => log::warn!("[{status}] {text}"),
                    _ => log::info!("[{status}] {text}"),
                },
                SessionEvent::RoomBound { binding } => {
                    log::info!("Joined room {binding}");
                    if let Some(url) = self.share_base.as_ref().and_then(|b| self.session.share_url(b)) {
                        println!("{url}");
                    }
                }
            }
        }
        if repaint {
            if let Some((path, view)) = &self.snapshot {
                write_snapshot(&self.session, path, view)?;
            }
        }
        Ok(())
    }
}

fn write_snapshot(session: &Session, path: &Path, view: &SnapshotTarget) -> Result<(), AppError> {
    let ctx = RenderContext::for_session(session, view.viewport()).with_watermark(view.watermark.clone());
    render_svg(&ctx)?.save(path)?;
    Ok(())
}

/// Translate draw arguments into a session input.
fn element_input(args: &DrawArgs) -> ElementInput {
    let at = args.points.first().copied().unwrap_or_default();
    let payload = || args.text.clone().unwrap_or_default();
    match args.tool {
        ToolKind::Text => ElementInput::Text { at, text: payload() },
        ToolKind::Code => ElementInput::Code {
            at,
            source: payload().replace("\\n", "\n"),
        },
        tool => ElementInput::Drag {
            tool,
            samples: args.points.clone(),
        },
    }
}
