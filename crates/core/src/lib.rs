//! Session synchronization for the AI builder client: the conversation
//! list, the active transcript, the generated file tree, and the
//! orchestrator that keeps them consistent across sends.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod artifacts;
mod backend_client;
pub mod conversation;
pub mod directory;
mod error;
mod session;

pub use error::{GENERIC_FAILURE, SessionError};
pub use session::{
    ChatTransition, IntentKind, SendOutcome, SendReport, Session,
    SessionBuilder, SessionSnapshot,
};
