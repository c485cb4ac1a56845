//! Core Components
//!
//! Infrastructure shared by the login flows.

pub mod guard;
pub mod region;
pub mod transport;

pub use guard::*;
pub use region::*;
pub use transport::*;
