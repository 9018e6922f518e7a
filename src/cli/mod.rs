//! # CLI Module
//!
//! Command-line layer of txttoytmusic. It resolves the run configuration from
//! flags, prompts and defaults, then drives the sequential run:
//!
//! ```text
//! Config Resolver → Credential Store → Query Loader
//!     → (search → select/dedup) per query
//!     → Playlist Publisher → Run Reporter
//! ```
//!
//! Every remote call goes through the [`crate::ytmusic::MusicCatalog`] a
//! [`crate::ytmusic::Connector`] opens, and every prompt through a
//! [`crate::prompt::Console`], so a whole run can execute against fakes.
//!
//! ## Error handling
//!
//! Fatal errors stop the run and are returned as [`crate::error::RunError`].
//! A failed search only marks its own query as not found. Failures while
//! writing the report are printed as warnings.

mod resolve;
mod run;

pub use resolve::DEFAULT_AUTH_FILE;
pub use resolve::DEFAULT_INPUT_FILE;
pub use resolve::Overrides;
pub use resolve::resolve;
pub use run::run;
pub use run::run_until;
