//! Console demo: runs the SDK against the real backend from a terminal.
//!
//! The push channel is simulated (a terminal has no push platform), but
//! registration, tags, activity, and opened reports all go to the backend
//! over HTTP, and identity persists in a JSON file between runs.
//!
//! ```text
//! GAMETHRIVE_APP_ID=<app id> RUST_LOG=debug cargo run -p gamethrive-console -- '<launch param>'
//! ```
//!
//! Environment:
//! - `GAMETHRIVE_APP_ID` (required): the application id
//! - `GAMETHRIVE_BASE_URL`: backend origin, default `https://gamethrive.com/`
//! - `GAMETHRIVE_STORE`: identity file, default in the temp directory
//! - `RUST_LOG`: log filter, default `info`

use std::path::PathBuf;
use std::time::Duration;

use gamethrive::prelude::*;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app_id = std::env::var("GAMETHRIVE_APP_ID")
        .map_err(|_| "GAMETHRIVE_APP_ID must be set")?;

    let mut backend_config = HttpBackendConfig::default();
    if let Ok(base_url) = std::env::var("GAMETHRIVE_BASE_URL") {
        backend_config.base_url = base_url;
    }
    let backend = HttpBackend::new(backend_config)?;

    let store_path = std::env::var_os("GAMETHRIVE_STORE")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("gamethrive-console.json"));
    let store = JsonFileStore::open(&store_path)?;
    tracing::info!(path = %store_path.display(), "identity store opened");

    let channels = SimulatedChannelProvider::with_issued_address(format!(
        "https://push.example/console/{}",
        std::process::id()
    ));
    let host = HeadlessHost::new(DeviceProfile {
        device_model: "console".into(),
        os_version: std::env::consts::OS.into(),
        app_version: env!("CARGO_PKG_VERSION").into(),
        ..DeviceProfile::default()
    });

    let mut builder = GameThriveBuilder::new(app_id).notification_handler(|data, already_active| {
        tracing::info!(?data, already_active, "notification opened");
    });
    if let Some(param) = std::env::args().nth(1) {
        builder = builder.launch_param(param);
    }
    let sdk = builder.start(backend, store, &channels, host).await?;

    // Wait for the backend to confirm the registration.
    let (ready_tx, ready_rx) = oneshot::channel();
    let ready_tx = std::sync::Mutex::new(Some(ready_tx));
    sdk.get_ids_available_with(move |player_id, address| {
        tracing::info!(%player_id, ?address, "ids available");
        if let Some(tx) = ready_tx.lock().ok().and_then(|mut slot| slot.take()) {
            let _ = tx.send(());
        }
    })
    .await;
    if tokio::time::timeout(Duration::from_secs(30), ready_rx).await.is_err() {
        tracing::warn!("registration did not complete within 30s");
        return Ok(());
    }

    sdk.send_tag("demo_runs", 1).await;
    sdk.get_tags_with(|tags| tracing::info!(?tags, "tags received"))
        .await;

    // One short foreground stretch, then the app is "closed".
    tokio::time::sleep(Duration::from_secs(2)).await;
    sdk.on_close().await;
    tracing::info!("done; run again to see the session refresh");
    Ok(())
}
