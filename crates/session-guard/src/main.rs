mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use guard_core::credential::{CredentialStore, FileCredentialStore};
use guard_core::navigation::History;
use guard_core::settings::Settings;
use guard_runtime::idle_monitor::{IdleMonitor, MonitorConfig};
use guard_runtime::session_gate::SessionGate;
use guard_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .unwrap_or_else(bootstrap::default_log_file);
    bootstrap::setup_logging(&settings.log_level, &log_file)?;

    tracing::info!("Session Guard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        idle_timeout_secs = settings.idle_timeout_secs,
        login_route = %settings.login_route,
        home_route = %settings.home_route,
        theme = %settings.theme,
        "settings loaded"
    );

    let store: Arc<dyn CredentialStore> = Arc::new(match &settings.credential_file {
        Some(path) => FileCredentialStore::new(path.clone()),
        None => FileCredentialStore::with_default_path(),
    });
    let history = History::new(settings.home_route.clone());
    let gate = SessionGate::new(store, Arc::new(history.clone()))
        .with_routes(settings.login_route.clone(), settings.home_route.clone());
    let monitor = IdleMonitor::new(
        MonitorConfig::new(settings.idle_duration()),
        Arc::new(gate.logout_sink()),
    );

    let app = App::new(
        &settings.theme,
        gate,
        monitor,
        history,
        settings.replaced_countdown_secs,
    );

    // Raw mode delivers Ctrl+C as a key event; the loop quits on it and
    // restores the terminal before returning.
    app.run().await?;

    tracing::info!("Session Guard stopped");
    Ok(())
}
