//! # Communications interface crate.
//!
//! Provides the messages exchanged with the driving simulator and the network layer they travel
//! over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulator frame encoding and decoding
pub mod sim;

/// Network module
pub mod net;
