//! Registration and email verification handlers.

pub mod rate_limit;
pub mod register;
pub mod state;
mod storage;
pub mod types;
mod utils;
pub mod verification;

pub use rate_limit::{NoopRateLimiter, RateLimiter};
pub use register::register;
pub use state::{AuthConfig, AuthState};
pub use verification::{resend_verification, verify_email};
