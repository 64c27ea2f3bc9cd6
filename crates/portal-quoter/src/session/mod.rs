//! Portal login and the authenticated session it produces.

pub mod auth;
pub mod diagnostics;
pub mod portal_session;
pub mod response;

pub use auth::PortalClient;
pub use diagnostics::{Diagnostics, RawFallback, RequestRecord};
pub use portal_session::PortalSession;
pub use response::PortalResponse;
