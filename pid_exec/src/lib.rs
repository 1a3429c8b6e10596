//! # Controller library.
//!
//! This library allows other crates in the workspace, along with the tests and benchmarks, to
//! access items defined inside the controller crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// PID control module - turns telemetry into steering and throttle commands
pub mod pid_ctrl;

/// Simulator server - exchanges telemetry and commands with the driving simulator
pub mod sim_server;
