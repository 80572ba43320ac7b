//! Command-line interface.

use chalkroom_core::{SessionConfig, ToolKind};
use clap::{Args, Parser, Subcommand};
use kurbo::{Point, Size};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "chalkroom", about = "Headless chalkroom whiteboard client", version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

/// Session settings. Unset flags fall back to the environment, then defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct Settings {
    /// Base URL of the room service.
    #[arg(long, global = true, env = "CHALKROOM_SERVICE_URL")]
    pub service_url: Option<Url>,

    /// Milliseconds between pulls.
    #[arg(long, global = true, env = "CHALKROOM_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Timeout for every room service call, in seconds.
    #[arg(long, global = true, env = "CHALKROOM_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Name sent with every change.
    #[arg(long, global = true, env = "CHALKROOM_DISPLAY_NAME")]
    pub name: Option<String>,
}

impl Settings {
    /// Overlay explicit flags on `config`.
    pub fn apply(&self, config: &mut SessionConfig) {
        if let Some(url) = &self.service_url {
            config.service_url = Some(url.clone());
        }
        if let Some(ms) = self.poll_interval_ms.filter(|ms| *ms > 0) {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = self.request_timeout_secs.filter(|s| *s > 0) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            config.display_name = name.to_string();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new room, print its shareable location and follow it.
    Create(FollowArgs),
    /// Follow an existing room until interrupted.
    Watch(WatchArgs),
    /// Pull a room once and write an SVG snapshot.
    Snapshot(SnapshotArgs),
    /// Add one element to a room.
    Draw(DrawArgs),
}

/// Where the room comes from: a shareable location, or explicit id and key.
#[derive(Args, Debug, Clone)]
pub struct RoomArgs {
    /// Shareable location carrying `room` and `key` query parameters.
    #[arg(required_unless_present_all = ["room", "key"], conflicts_with_all = ["room", "key"])]
    pub url: Option<Url>,

    #[arg(long, requires = "key")]
    pub room: Option<String>,

    #[arg(long, requires = "room")]
    pub key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotTarget {
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,

    /// Watermark text painted behind the board.
    #[arg(long, default_value = chalkroom_render::DEFAULT_WATERMARK)]
    pub watermark: String,
}

impl SnapshotTarget {
    pub fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Args, Debug, Clone)]
pub struct FollowArgs {
    /// Rewrite this SVG file whenever the board changes.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Base for the printed shareable location.
    #[arg(long, default_value = "http://localhost:8080/")]
    pub share_base: Url,

    #[command(flatten)]
    pub view: SnapshotTarget,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub room: RoomArgs,

    #[command(flatten)]
    pub follow: FollowArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub room: RoomArgs,

    /// Output SVG path.
    #[arg(long, short)]
    pub out: PathBuf,

    #[command(flatten)]
    pub view: SnapshotTarget,
}

#[derive(Args, Debug, Clone)]
pub struct DrawArgs {
    #[command(flatten)]
    pub room: RoomArgs,

    /// Tool: pen, rect, ellipse, line, arrow, text or code.
    #[arg(long, default_value = "pen")]
    pub tool: ToolKind,

    /// Drag samples as `x,y`, first to last. Text and code use the first as anchor.
    #[arg(long = "point", value_parser = parse_point, num_args = 1.., required = true)]
    pub points: Vec<Point>,

    /// Payload for the text and code tools.
    #[arg(long)]
    pub text: Option<String>,
}

/// Parse `x,y` into a point.
pub fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {value:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in {value:?}: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in {value:?}: {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("coordinates must be finite: {value:?}"));
    }
    Ok(Point::new(x, y))
}
