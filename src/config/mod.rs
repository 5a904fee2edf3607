//! Configuration models for scheduler construction.

pub mod scheduler;

pub use scheduler::SchedulerConfig;
