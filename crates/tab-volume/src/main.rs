//! Tab-Volume: per-tab volume control driven by a browser bridge and a
//! native companion process.

mod app;
mod bridge;
mod config;
mod error;
mod logging;
mod native_process;
mod preference_file;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    native_process::ProcessTransport,
    preference_file::FilePreferenceStore,
};

use crate::{
    bridge::{BrowserBridge, stdio},
    config::{Config, LoggingConfig},
};

use std::{sync::Arc, time::Duration};

use tab_volume_core::{
    Coordinator, CoordinatorParts, Indicator, MemoryPreferenceStore, PreferenceStore, TabCapture,
    Tabs,
    capture::{CaptureBackend, MediaDevices, OffscreenBackend},
    host::NativeTransport,
};
use tokio::{io::BufReader, sync::mpsc};
use tracing::{error, info, warn};

/// Browser events buffered before the stdin reader waits.
const EVENT_QUEUE: usize = 64;

/// Application entry point.
fn main() {
    let loaded = Config::load();
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    let _log_guard = logging::init(&logging);

    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));

    // Stdin reads sit on a blocking thread that may never return.
    rt.shutdown_timeout(Duration::from_millis(500));

    if let Err(e) = result {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);

    let preferences = open_preferences(&config);

    let bridge = Arc::new(BrowserBridge::new(output_tx.clone()));
    let backend = Arc::new(OffscreenBackend::new(
        Arc::clone(&bridge) as Arc<dyn MediaDevices>
    ));
    let transport = Arc::new(ProcessTransport::new(
        config.host.command.clone(),
        config.host.args.clone(),
    ));

    let parts = CoordinatorParts {
        transport: transport as Arc<dyn NativeTransport>,
        tabs: Arc::clone(&bridge) as Arc<dyn Tabs>,
        capture: Arc::clone(&bridge) as Arc<dyn TabCapture>,
        backend: backend as Arc<dyn CaptureBackend>,
        preferences,
        indicator: Arc::clone(&bridge) as Arc<dyn Indicator>,
    };
    let coordinator = Arc::new(Coordinator::new(parts, config.connector_config()));

    let reader = tokio::spawn(async move {
        if let Err(e) = stdio::read_events(BufReader::new(tokio::io::stdin()), event_tx).await {
            error!(error = ?e, "Browser bridge input failed");
        }
    });
    let writer = tokio::spawn(async move {
        if let Err(e) = stdio::write_output(tokio::io::stdout(), output_rx).await {
            error!(error = ?e, "Browser bridge output failed");
        }
    });

    let app = App {
        coordinator,
        bridge,
        events: event_rx,
        output: output_tx,
    };

    app.run().await?;

    reader.abort();

    // The coordinator's teardown output is still queued; give it a moment.
    match tokio::time::timeout(Duration::from_secs(1), writer).await {
        Ok(Ok(())) => info!("Bridge output drained"),
        Ok(Err(e)) => error!(error = ?e, "Bridge output task panicked"),
        Err(_) => info!("Bridge output did not drain within timeout"),
    }

    Ok(())
}

/// File-backed preferences, or an in-memory store when the file is unusable.
fn open_preferences(config: &Config) -> Arc<dyn PreferenceStore> {
    let opened = config
        .preferences_path()
        .and_then(|path| Ok(FilePreferenceStore::open(&path)?));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = ?e, "Preferences unavailable, volumes will not be remembered");
            Arc::new(MemoryPreferenceStore::new())
        }
    }
}
