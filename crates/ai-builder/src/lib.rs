//! A terminal client for the AI builder service.
//!
//! The crate includes a CLI tool for using in the terminal. The pieces it is
//! made of (command parsing, attachment loading and rendering) are exposed
//! so other front ends can drive a [`Session`](core::Session) the same way.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod attach;
pub mod commands;
pub mod render;

/// Re-exports of [`ai_builder_core`] crate.
pub mod core {
    pub use ai_builder_core::*;
}
