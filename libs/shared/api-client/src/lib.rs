pub mod admin;

pub use admin::{AdminApiClient, ApiError};
