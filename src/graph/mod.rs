mod builtin;
pub mod campus;
pub mod router;

pub use campus::{CampusConfig, CampusGraph};
pub use router::{path_distance, route, route_with_distance, Route};
