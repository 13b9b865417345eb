//! Marketplace API client: login, publish, stats, listing and remote
//! manifest validation.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_URL, MarketplaceClient};
pub use error::{MarketplaceError, Operation};
pub use types::{
    ElementStats, ElementSummary, LoginRequest, LoginResponse, PublishRequest, PublishResponse,
    RemoteValidation, StatsResponse, UserInfo,
};
