pub mod generator;
pub mod handlers;
pub mod models;
pub mod repository;

pub use generator::{LineGenerator, LineWeekSummary};
pub use models::{LineResult, PropLine};
pub use repository::{InMemoryLineRepository, LineRepository};
