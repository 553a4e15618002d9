pub mod aggregate;
mod mapping;
pub mod routes;
mod service;
mod startup;
mod synoptic;
mod utils;
mod weather;
pub mod wind;

pub use aggregate::{StationReading, WeightedResult};
pub use mapping::*;
pub use routes::*;
pub use service::*;
pub use startup::*;
pub use synoptic::*;
pub use utils::*;
pub use weather::*;
