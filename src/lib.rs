//! labdash: admin console for lab-register users and pGina access logs.
//!
//! The binary is a thin shell: [`cli`] parses arguments, [`commands`] talks
//! to the API through `labdash-api` and runs the `labdash-core` presenters,
//! [`render`] turns the results into plain text.
//!
//! # Architecture
//!
//! ```text
//! cli ──► commands ──► labdash-api ──► REST API
//!             │
//!             └──► labdash-core (normalize, aggregate, import, paginate) ──► render
//! ```

pub mod cli;
pub mod commands;
pub mod render;
