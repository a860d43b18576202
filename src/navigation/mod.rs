pub mod commands;
pub mod controller;
pub mod events;
pub mod feedback;
pub mod fence;
pub mod state;
pub mod steps;

pub use commands::{dispatch, dispatch_json, NavigationCommand};
pub use controller::{CaptureOutcome, NavigationController, NavigationSnapshot};
pub use events::NavigationEvent;
pub use feedback::{FeedbackLog, FeedbackMessage, MessageRole};
pub use fence::{Fence, Fences};
pub use state::{ArrivalOutcome, ArrivalStatus, NavPhase, NavigationSession, RouteOutcome};
pub use steps::{build_steps, NavigationStep, StepDirection};
