pub mod handlers;
pub mod service;
pub mod verdict;

pub use service::{ResolutionService, ResolutionSummary};
pub use verdict::{
    benchmark_verdict, side_of_line, verdict_against_line, EventOutcome, StandardResolver,
    Verdict, VerdictResolver,
};
