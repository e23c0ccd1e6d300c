//! urlshort server entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use urlshort_server::app::{self, AppState};
use urlshort_server::{Cli, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    info!("starting urlshort server");

    let state = Arc::new(AppState::new(cli.auth_config()).context("invalid auth configuration")?);

    if let Some((username, password)) = cli.admin_credentials() {
        state
            .bootstrap_admin(username, password)
            .await
            .context("failed to seed admin account")?;
    }

    let sweeper = app::spawn_session_sweeper(Arc::clone(&state), cli.sweep_interval());
    let served = app::serve(state, cli.bind).await;
    sweeper.abort();
    served.context("server error")?;

    info!("urlshort server stopped");
    Ok(())
}
