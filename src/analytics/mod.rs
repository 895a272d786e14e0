// src/analytics/mod.rs
//! Statistics over assembled block records, for logs and diagnostics.

use crate::formatting::BlockRecord;

/// Quick statistics for an assembled page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total_blocks: usize,
    pub deepest_nesting: usize,
    /// `child_page`, `child_database` and `link_to_page` references.
    pub page_references: usize,
}

/// Measures a list of top-level records and everything nested in them.
pub fn measure_tree(blocks: &[BlockRecord]) -> TreeStats {
    let mut stats = TreeStats::default();
    walk_records(&mut stats, blocks, 1);
    stats
}

fn walk_records(stats: &mut TreeStats, records: &[BlockRecord], depth: usize) {
    if records.is_empty() {
        return;
    }
    stats.deepest_nesting = stats.deepest_nesting.max(depth);

    for record in records {
        stats.total_blocks += 1;
        if matches!(
            record.block_type.as_str(),
            "child_page" | "child_database" | "link_to_page"
        ) {
            stats.page_references += 1;
        }

        if let Some(children) = &record.children {
            walk_records(stats, children, depth + 1);
        }
        if let Some(columns) = &record.columns {
            walk_records(stats, columns, depth + 1);
        }
        if let Some(rows) = &record.rows {
            walk_records(stats, rows, depth + 1);
        }
        if let Some(synced) = &record.synced_content {
            walk_records(stats, std::slice::from_ref(synced.as_ref()), depth + 1);
        }
    }
}
