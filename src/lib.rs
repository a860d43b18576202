pub mod arbiter;
pub mod capture;
pub mod error;
pub mod graph;
pub mod models;
pub mod navigation;
pub mod services;
pub mod settings;
pub mod telemetry;
mod utils;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch, Mutex};

pub use error::{GraphError, NavigationError};
pub use graph::{route, CampusGraph};
pub use models::{DetectionResult, DetectionRole, MovementSample, NodeId, SensorReading};
pub use navigation::{NavigationCommand, NavigationController, NavigationEvent, NavigationSnapshot};
pub use services::Collaborators;
pub use settings::{NavigatorSettings, SettingsStore};
pub use telemetry::TelemetryFeed;

const SETTINGS_FILE: &str = "settings.json";
const CAMPUS_FILE: &str = "campus.json";

/// Initialize logging (reads RUST_LOG env var). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Everything a front end holds on to: settings, the navigation controller
/// and the movement feed.
pub struct Navigator {
    pub settings: SettingsStore,
    pub controller: NavigationController,
    telemetry: Mutex<TelemetryFeed>,
}

impl Navigator {
    /// Load `settings.json` and `campus.json` from `data_dir`. A missing campus
    /// file means the built-in campus; a broken one is an error.
    pub fn bootstrap(data_dir: impl AsRef<Path>, services: Collaborators) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

        let campus_path = data_dir.join(CAMPUS_FILE);
        let graph = if campus_path.exists() {
            CampusGraph::load(&campus_path)?
        } else {
            CampusGraph::builtin()
        };
        log::info!(
            "campus loaded: {} locations, {} paths",
            graph.len(),
            graph.edges().len()
        );

        let current = settings.current();
        let telemetry = TelemetryFeed::new(current.movement.clone());
        let controller = NavigationController::new(Arc::new(graph), services, current);

        Ok(Self {
            settings,
            controller,
            telemetry: Mutex::new(telemetry),
        })
    }

    /// Persist new settings and hand them to the controller.
    pub async fn update_settings(&self, settings: NavigatorSettings) -> Result<()> {
        self.settings.update(settings.clone())?;
        self.controller.apply_settings(settings).await;
        Ok(())
    }

    pub async fn start_telemetry(&self, readings: mpsc::Receiver<SensorReading>) -> Result<()> {
        self.telemetry.lock().await.start(readings)
    }

    pub async fn stop_telemetry(&self) -> Result<()> {
        self.telemetry.lock().await.stop().await
    }

    pub async fn movement(&self) -> watch::Receiver<MovementSample> {
        self.telemetry.lock().await.subscribe()
    }
}
