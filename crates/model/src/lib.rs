//! Data types shared between the AI builder client and its backends.
//!
//! This crate establishes the protocol the client uses to talk to the code
//! generation service: conversations, transcript messages, generation
//! requests and the shapes a generation response may take.
//!
//! Types in this crate don't define any networking behavior. Instead the
//! [`Backend`] trait is the constraint that transport implementors should
//! adhere to, so the session logic can run against a real HTTP service or
//! a scripted fake without modification.

#![deny(missing_docs)]

mod backend;
mod chat;
mod error;
mod request;
mod response;
mod tree;

pub use backend::*;
pub use chat::*;
pub use error::*;
pub use request::*;
pub use response::*;
pub use tree::*;
