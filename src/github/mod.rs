//! GitHub API client

pub mod client;
pub mod errors;
pub mod transport;
pub mod types;

pub use client::{BatchOutcome, Credentials, GitHubClient};
pub use errors::ApiError;
pub use transport::{ApiRequest, ApiResponse, Transport};
pub use types::*;
