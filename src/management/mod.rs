pub mod credential;
pub mod publisher;
pub mod queries;
mod report;

pub use credential::CredentialStore;
pub use publisher::Publisher;
pub use report::RunReport;
