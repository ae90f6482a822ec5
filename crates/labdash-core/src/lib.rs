//! labdash-core: core library for the lab-register admin console.
//!
//! Everything in this crate is synchronous and free of I/O except the config
//! and session files. Remote collaborators (the REST API) live in
//! `labdash-api`; this crate only describes the shapes they exchange.
//!
//! # Data flow
//!
//! ```text
//! API rows ──► normalizer ──► stats ──► renderer
//!
//! spreadsheet bytes ──► import::Sheet ──► import::ImportResolver ──► per-row create
//! ```

pub mod config;
pub mod import;
pub mod normalizer;
pub mod period;
pub mod session;
pub mod stats;
pub mod table;
pub mod types;

pub use period::{Period, Window};
pub use session::{AuthUser, Session, SessionStore};
pub use types::{
    CreateUserInput, DashboardStatistics, LogRecord, LoginInput, MachineStatistic,
    MonthlyStatistic, User, MISSING_MACHINE,
};
