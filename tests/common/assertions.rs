//! Domain-specific assertion macros for labdash harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which aggregate invariant was violated.

use labdash_core::DashboardStatistics;

/// Assert that machine groups are ordered by access count, descending.
#[macro_export]
macro_rules! assert_sorted_by_access {
    ($stats:expr) => {{
        let stats: &labdash_core::DashboardStatistics = &$stats;
        for pair in stats.machine_stats.windows(2) {
            if pair[0].total_access < pair[1].total_access {
                panic!(
                    "assert_sorted_by_access! failed: {:?} ({}) before {:?} ({})",
                    pair[0].machine, pair[0].total_access, pair[1].machine, pair[1].total_access
                );
            }
        }
    }};
}

/// Totals agree with the per-machine groups: access counts sum up, the
/// machine count matches and the user union never exceeds the per-machine sum.
pub fn assert_totals_consistent(stats: &DashboardStatistics) {
    let summed: usize = stats.machine_stats.iter().map(|m| m.total_access).sum();
    pretty_assertions::assert_eq!(summed, stats.total_access, "sum of machine accesses");
    pretty_assertions::assert_eq!(
        stats.machine_stats.len(),
        stats.total_machines,
        "machine count"
    );
    let per_machine: usize = stats.machine_stats.iter().map(|m| m.unique_users.len()).sum();
    assert!(
        stats.unique_users <= per_machine,
        "unique users {} exceeds per-machine sum {}",
        stats.unique_users,
        per_machine
    );
}
