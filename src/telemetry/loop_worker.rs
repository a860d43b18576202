use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::models::{MovementSample, SensorHealth, SensorReading};

use super::classifier::MovementClassifier;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

pub async fn telemetry_loop(
    mut readings: mpsc::Receiver<SensorReading>,
    mut classifier: MovementClassifier,
    publisher: Arc<watch::Sender<MovementSample>>,
    cancel_token: CancellationToken,
) {
    let stale_after = Duration::from_millis(classifier.config().stale_after_ms.max(1));
    let mut unavailable = false;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("telemetry loop shutting down");
                break;
            }
            next = tokio::time::timeout(stale_after, readings.recv()) => {
                match next {
                    Ok(Some(reading)) => {
                        let sample = classifier.classify(&reading);
                        let invalid = sample.health == SensorHealth::Unavailable;
                        if invalid && !unavailable {
                            log_warn!("invalid sensor reading {:?}; publishing neutral sample", reading);
                        } else if !invalid && unavailable {
                            log_info!("sensor readings resumed");
                        }
                        unavailable = invalid;
                        log_debug!("movement sample {:?}", sample);
                        publisher.send_replace(sample);
                    }
                    Ok(None) => {
                        log_warn!("sensor stream closed; publishing neutral sample");
                        publisher.send_replace(MovementSample::neutral(classifier.last_bearing()));
                        break;
                    }
                    Err(_) => {
                        if !unavailable {
                            log_warn!("no sensor reading for {}ms; sensor unavailable", stale_after.as_millis());
                            unavailable = true;
                            classifier.reset();
                            publisher.send_replace(MovementSample::neutral(classifier.last_bearing()));
                        }
                    }
                }
            }
        }
    }
}
