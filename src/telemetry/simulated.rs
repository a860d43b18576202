use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::SensorReading;

const GRAVITY: f64 = 9.81;

/// Development stand-in for the phone's compass and accelerometer.
pub struct SimulatedSensor {
    rng: StdRng,
    heading: f64,
    phase: f64,
    walking: bool,
    interval: Duration,
}

impl SimulatedSensor {
    pub fn new(seed: u64, interval: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            heading: 0.0,
            phase: 0.0,
            walking: false,
            interval,
        }
    }

    pub fn walking(mut self, walking: bool) -> Self {
        self.walking = walking;
        self
    }

    pub fn next_reading(&mut self) -> SensorReading {
        self.heading += self.rng.gen_range(-3.0..3.0);
        let noise: f64 = self.rng.gen_range(-0.05..0.05);

        let sway = if self.walking {
            // Roughly two steps per second at a 50ms interval.
            self.phase += std::f64::consts::PI / 5.0;
            3.0 * self.phase.sin()
        } else {
            0.0
        };

        SensorReading {
            heading: self.heading,
            acceleration: [sway + noise, noise, GRAVITY + sway.abs() * 0.5],
        }
    }

    /// Push readings into a fresh channel until cancelled or the receiver is dropped.
    pub fn spawn(
        mut self,
        cancel_token: CancellationToken,
    ) -> (mpsc::Receiver<SensorReading>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if tx.send(self.next_reading()).await.is_err() {
                            break;
                        }
                    }
                    _ = cancel_token.cancelled() => break,
                }
            }
        });
        (rx, handle)
    }
}
