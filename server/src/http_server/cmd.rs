use color_eyre::eyre::WrapErr;
use tracing::info;

use crate::{
    http_server::{make_app, run_server},
    AppState, Result,
};

const SESSION_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env()?;
    let port = app_state.app.port;

    info!(
        proxy_endpoint = %app_state.recipe_client.endpoint(),
        "Spawning Tasks"
    );
    let server = tokio::spawn(run_server(make_app(app_state.clone()), port));
    let sweeper = tokio::spawn(
        app_state
            .sessions
            .clone()
            .sweep_forever(SESSION_SWEEP_INTERVAL),
    );
    info!("Tasks Spawned");

    tokio::select! {
        result = server => result.wrap_err("Server task panicked")??,
        result = sweeper => result.wrap_err("Session sweeper panicked")?,
    }

    info!("Main Returning");

    Ok(())
}
