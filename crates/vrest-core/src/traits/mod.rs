//! Core traits for the reconciliation engine
//!
//! This module defines the abstract interfaces that transports must follow.
//!
//! - [`Session`]: Authenticated request/response access to the management API
//! - [`SessionFactory`]: Opens sessions from connection configuration

pub mod session;

pub use session::{RawResponse, Session, SessionFactory};
