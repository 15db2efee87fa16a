//! Stats command handler

use anyhow::Result;

use tomo_core::Library;

use crate::output::Output;

/// Show library statistics and reading progress
pub fn show(library: &Library, output: &Output) -> Result<()> {
    let stats = library.stats();
    let streak_label = if stats.streak > 0 {
        format!("{} day(s)", stats.streak)
    } else {
        "none".to_string()
    };

    output.print_stats(&library.category_counts(), stats, &streak_label);
    Ok(())
}
