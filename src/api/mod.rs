// ABOUTME: CardioCheck service integration
// HTTP client and wire types for authentication, prediction and hospital lookup

pub mod client;
pub mod types;

pub use client::{ApiError, CardioApiClient};
pub use types::{Coordinates, EditUserDetailsRequest, Hospital, RegisterRequest, UserDetails};
