//! Main application entry point.

use chalkroom_app::cli::{Cli, Command};
use chalkroom_app::{App, AppError};
use chalkroom_core::SessionConfig;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SessionConfig::from_env()?;
    cli.settings.apply(&mut config);
    log::info!("Starting chalkroom");

    let app = App::new(config)?;
    match cli.command {
        Command::Create(args) => app.create(args.snapshot, args.view, args.share_base).await,
        Command::Watch(args) => {
            let follow = args.follow;
            app.watch(&args.room, follow.snapshot, follow.view, follow.share_base)
                .await
        }
        Command::Snapshot(args) => app.snapshot(&args.room, args.out, args.view).await,
        Command::Draw(args) => app.draw(args).await,
    }
}
