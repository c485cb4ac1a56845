//! Admin Login Types
//!
//! Core type definitions for the Zoho admin login flow.

pub mod callback;
pub mod config;
pub mod exchange;
pub mod session;

pub use callback::*;
pub use config::*;
pub use exchange::*;
pub use session::*;
