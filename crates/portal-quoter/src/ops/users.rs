//! Back-office user listing.

use crate::error::{PortalError, Result};
use crate::session::PortalSession;
use portal_extract::{find_declaration, Keyword};
use serde_json::Value;
use tracing::info;

impl PortalSession {
    /// Back-office users, read from the `let users = [...]` declaration of
    /// the users page.
    pub async fn list_backend_users(&mut self) -> Result<Vec<Value>> {
        let url = self.endpoints().backend_users();
        let resp = self.get(&url).await?.error_for_status()?;

        match find_declaration(&resp.body, Keyword::Let, "users") {
            Some(Value::Array(users)) => {
                info!(count = users.len(), "listed backend users");
                Ok(users)
            }
            Some(_) => Err(PortalError::shape(&url, "'users' is not an array")),
            None => Err(PortalError::shape(&url, "no 'users' declaration")),
        }
    }
}
