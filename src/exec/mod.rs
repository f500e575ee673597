// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything jazzhands does that is not filesystem work is done by external
//! programs: `lessc`, `stylus`, `browserify`, `babel`, `npm` and `python`.
//!
//! - [`command`] describes one invocation (`ToolInvocation`) and its result
//!   (`ToolOutput`), and resolves configured program names.
//! - [`backend`] provides the `ToolBackend` trait and the concrete
//!   `RealToolBackend` built on `tokio::process::Command`. Tests replace it
//!   with a fake that records invocations.

pub mod backend;
pub mod command;

pub use backend::{RealToolBackend, ToolBackend};
pub use command::{resolve_program, OutputTarget, ToolInvocation, ToolOutput};
