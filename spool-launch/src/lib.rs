//! Spool Launch
//!
//! Turns a job graph into a scheduler job spec and launches it.
//!
//! Architecture:
//! - Command: builds the command line a worker runs for a layer
//! - Depend: encodes layer dependencies as spec records
//! - Spec: compiles a job into the XML spec document
//! - Launcher: submits the spec and optionally waits on or supervises the job
//!
//! Everything up to the compiled document is pure; the only I/O happens in
//! [`Launcher`] through the [`spool_client::Scheduler`] it is given.

pub mod command;
pub mod config;
pub mod depend;
pub mod error;
pub mod launcher;
pub mod sleeper;
pub mod spec;

pub use config::LauncherConfig;
pub use error::{LaunchError, Result};
pub use launcher::Launcher;
pub use sleeper::{Sleeper, TokioSleeper};
pub use spec::{CompiledSpec, SpecCompiler};
