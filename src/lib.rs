//! # Inference Scheduler
//!
//! A cooperative, dual-resource job scheduler for two-phase inference workloads.
//!
//! Jobs describe how many CPU threads they need for preprocessing and how much
//! GPU memory they need for inference. The scheduler admits each job against
//! fixed pool totals, runs it through a CPU phase followed by a GPU phase, and
//! resolves the submitter's handle with the job payload once the GPU phase
//! finishes.
//!
//! ## Core Problem Solved
//!
//! Inference workloads contend for two independent bounded resources:
//!
//! - **CPU threads**: tokenization and prompt preprocessing are CPU-bound
//! - **GPU memory**: model execution holds VRAM for the duration of a request
//! - **Priority**: interactive requests must be granted ahead of batch work
//! - **Cancellation**: callers withdraw, and held capacity must never leak
//!
//! ## Key Features
//!
//! - **Dual-resource accounting**: independent CPU and GPU-memory counters
//! - **Strict priority grants**: lower priority number wins, FIFO among ties
//! - **Head-of-line blocking**: a small job never jumps a blocked larger one
//! - **Event-driven coordinator**: one task owns all grant decisions, no polling
//! - **Cancel-safe**: cancellation releases held units before it is observable
//!
//! ## Example
//!
//! ```rust,ignore
//! use inference_scheduler::core::{JobRequest, Scheduler};
//!
//! let scheduler = Scheduler::with_defaults(8, 4096);
//!
//! let handle = scheduler.submit(
//!     JobRequest::new(0, "summarize the meeting notes")
//!         .with_cpu_units(2)
//!         .with_gpu_units(1024),
//! )?;
//!
//! let payload = handle.wait().await?;
//! ```
//!
//! For complete examples, see the integration tests under `tests/`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: jobs, pools, stage queues, and the coordinator.
pub mod core;
/// Configuration models for scheduler construction.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Runtime adapters for spawning coordinator and phase tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;
