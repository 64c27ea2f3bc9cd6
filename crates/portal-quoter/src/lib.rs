//! Session client for the back-office portal.
//!
//! [`PortalClient::login`] is the only way to obtain a [`PortalSession`];
//! every read and write of companies, contacts, credit applications, orders,
//! quotes and series models is a method on that session. Page data is
//! recovered with [`portal_extract`].
//!
//! ```no_run
//! # async fn demo() -> portal_quoter::Result<()> {
//! use portal_quoter::{Credentials, PortalClient, PortalConfig};
//!
//! let config = PortalConfig::new("https://portal.example.com")?;
//! let client = PortalClient::new(&config)?;
//! let mut session = client
//!     .login(&Credentials::new("me@example.com", "secret"))
//!     .await?;
//! let quote = session.quote_info("company-id", "quote-id").await?;
//! println!("{:?}", quote.last_section_id());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod ops;
pub mod records;
pub mod session;

pub use catalog::{total_value, Catalog};
pub use config::{Credentials, PortalConfig};
pub use endpoints::Endpoints;
pub use error::{PortalError, Result};
pub use ops::{
    AddedLine, FailureReason, LineFailure, QuoteOutcome, Series, SeriesFailure, SeriesReport,
};
pub use records::{
    CompanyRecord, Contact, LineItem, LineTerms, NewContact, NewQuote, QuoteDetailsUpdate,
    QuoteRecord, Rank,
};
pub use session::{Diagnostics, PortalClient, PortalResponse, PortalSession};
