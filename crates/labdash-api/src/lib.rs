//! labdash-api: REST API collaborators for labdash.
//!
//! The core crate only knows the shapes it consumes. This crate defines the
//! seams it pulls them through ([`AuthGateway`], [`LogSource`],
//! [`UserDirectory`]), the hyper-based [`ApiClient`] that implements all
//! three, and [`run_import`], which feeds a resolved spreadsheet through a
//! [`UserDirectory`] one row at a time.

pub mod client;
pub mod error;
pub mod import;

pub use client::ApiClient;
pub use error::ApiError;
pub use import::run_import;

use labdash_core::{CreateUserInput, LogRecord, LoginInput, Session, User};
use std::future::Future;

/// `POST /auth/login`.
pub trait AuthGateway: Send + Sync {
    fn login(&self, input: &LoginInput) -> impl Future<Output = Result<Session, ApiError>> + Send;
}

/// `GET /pginalog`.
pub trait LogSource: Send + Sync {
    /// Normalized records; rows the normalizer rejects are dropped.
    fn fetch_logs(&self) -> impl Future<Output = Result<Vec<LogRecord>, ApiError>> + Send;
}

/// The `/users` resource.
pub trait UserDirectory: Send + Sync {
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;

    fn create_user(
        &self,
        input: &CreateUserInput,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn set_activation(
        &self,
        user_id: i64,
        is_active: bool,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;
}
