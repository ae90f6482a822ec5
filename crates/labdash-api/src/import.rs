//! Sequential import runner.
//!
//! Rows are created one at a time, each awaited before the next, so the
//! server sees them in sheet order. A failed create is recorded and the run
//! moves on.

use crate::UserDirectory;
use labdash_core::import::{ImportResolution, ImportSummary};
use labdash_core::CreateUserInput;

/// Submit every resolved row through `directory`. Rows the resolver already
/// rejected are carried into the summary as failures, ahead of any create
/// failures.
pub async fn run_import<D: UserDirectory>(directory: &D, resolution: &ImportResolution) -> ImportSummary {
    let mut summary = ImportSummary::from_rejections(&resolution.rejected);
    tracing::info!(
        strategy = resolution.strategy,
        rows = resolution.rows.len(),
        rejected = resolution.rejected.len(),
        "starting import"
    );

    for row in &resolution.rows {
        let input = CreateUserInput::from(row.clone());
        match directory.create_user(&input).await {
            Ok(user) => {
                tracing::info!(user = %user.user_name, "imported user");
                summary.record_success(user.user_name);
            }
            Err(err) => {
                tracing::warn!(user = %input.user_name, error = %err, "import row failed");
                summary.record_failure(format!("{}: {}", input.user_name, err));
            }
        }
    }

    summary
}
