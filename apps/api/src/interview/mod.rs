//! Interview answer pipeline: question generation, evaluation, improvement,
//! interviewer replies and final reports, each behind the Remote → Local →
//! Static fallback chain.

pub mod coerce;
pub mod evaluation;
pub mod fallback;
pub mod handlers;
pub mod heuristics;
pub mod improvement;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod question_gen;
pub mod reply;
pub mod report;
pub mod scoring;
pub mod session;

pub use pipeline::InterviewPipeline;
pub use session::SessionStore;
