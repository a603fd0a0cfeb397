use itertools::Itertools;
use took::Took;

use crate::lns::destroy::RemovalSet;
use crate::utils::stats::RemovalStats;

/// Longer id lists are cut after this many entries.
const MAX_LOGGED_IDS: usize = 12;

pub fn format_ids(ids: &[usize]) -> String {
    if ids.len() <= MAX_LOGGED_IDS {
        format!("[{}]", ids.iter().join(", "))
    } else {
        format!(
            "[{}, ... +{}]",
            ids.iter().take(MAX_LOGGED_IDS).join(", "),
            ids.len() - MAX_LOGGED_IDS
        )
    }
}

pub fn format_log_removal(set: &RemovalSet) -> String {
    format!(
        "{}/{} {}{}",
        set.len(),
        set.target(),
        format_ids(set.as_slice()),
        if set.is_degraded() { " (degraded)" } else { "" }
    )
}

pub fn format_log_stats(stats: &RemovalStats) -> String {
    format!(
        "{} iterations, {:.2} removed on avg, spread {:.3}, {} degraded",
        stats.iterations,
        stats.mean_size(),
        stats.mean_spread_ratio(),
        stats.degraded
    )
}

pub fn format_log_method_stats_timed(method: &str, stats: &RemovalStats, took: Took) -> String {
    format!("{method} - {}, took: {took}", format_log_stats(stats))
}
