use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{MovementSample, SensorReading};

use super::classifier::{MovementClassifier, MovementConfig};
use super::loop_worker::telemetry_loop;

/// Background movement classifier. Readings are pushed in over an `mpsc`
/// channel; the latest sample is always available on a `watch` channel.
pub struct TelemetryFeed {
    config: MovementConfig,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    sample_tx: Arc<watch::Sender<MovementSample>>,
}

impl TelemetryFeed {
    pub fn new(config: MovementConfig) -> Self {
        let (sample_tx, _) = watch::channel(MovementSample::default());
        Self {
            config,
            handle: None,
            cancel_token: None,
            sample_tx: Arc::new(sample_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MovementSample> {
        self.sample_tx.subscribe()
    }

    pub fn latest(&self) -> MovementSample {
        *self.sample_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn start(&mut self, readings: mpsc::Receiver<SensorReading>) -> Result<()> {
        if self.is_running() {
            bail!("telemetry feed already active");
        }

        let cancel_token = CancellationToken::new();
        let classifier = MovementClassifier::new(self.config.clone());
        let handle = tokio::spawn(telemetry_loop(
            readings,
            classifier,
            self.sample_tx.clone(),
            cancel_token.clone(),
        ));

        info!("telemetry feed started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let joined = if let Some(handle) = self.handle.take() {
            handle.await.context("telemetry loop task failed to join")
        } else {
            Ok(())
        };

        self.sample_tx
            .send_replace(MovementSample::neutral(self.latest().bearing));
        joined
    }
}
