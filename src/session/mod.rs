//! Session Management
//!
//! Persistence of the admin session and the check route guards use.

pub mod storage;

pub use storage::{
    FileSessionStore, InMemorySessionStore, MockSessionStore, SessionStore, SESSION_STORAGE_KEY,
};

use tracing::debug;

use crate::error::OAuthFlowError;
use crate::types::SessionRecord;

/// The current admin session, if one exists and has not expired.
///
/// Route guards call this to gate admin pages. Expired records are left in
/// place; only logout clears the store.
pub async fn active_admin_session(
    store: &dyn SessionStore,
) -> Result<Option<SessionRecord>, OAuthFlowError> {
    let Some(record) = store.load().await? else {
        return Ok(None);
    };

    if !record.is_admin() {
        debug!(session_type = %record.session_type, "Stored session is not an admin session");
        return Ok(None);
    }
    if record.is_expired() {
        debug!(expires_at = ?record.expires_at(), "Stored admin session has expired");
        return Ok(None);
    }

    Ok(Some(record))
}
