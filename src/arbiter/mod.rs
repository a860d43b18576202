#[allow(clippy::module_inception)]
pub mod arbiter;
pub mod config;

pub use arbiter::{arbitrate, Decision, DetectionArbiter, PendingDetection, RejectReason};
pub use config::ArbiterConfig;
