//! Admin Login Flows
//!
//! The two halves of the Zoho authorization-code login:
//!
//! - **Authorization URL**: where to send the browser to start the login
//! - **Callback**: one-shot processing of the provider redirect
//!
//! A signed-in session can refresh its profile through **User info**.

pub mod authorization_url;
pub mod callback;
pub mod user_info;

pub use authorization_url::{build_auth_url, is_zoho_host, ZOHO_ACCOUNTS_DOMAINS};
pub use callback::{CallbackOutcome, CallbackProcessor, CallbackState};
pub use user_info::fetch_user_info;
