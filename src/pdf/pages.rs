//! Page-spec parsing
//!
//! Turns the textual page specs users type (`"1-3, 5"`, `"3, 1, 3"`) into
//! validated, zero-based page indices. Two modes with deliberately different
//! semantics: splitting answers "which pages" (unique, ascending), while
//! rearranging answers "what exact sequence" (order and repetition kept).

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// How a parsed spec is turned into an index sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecMode {
    /// Duplicates collapsed, result sorted ascending (split).
    UniqueSorted,
    /// Input order and repetition preserved exactly (rearrange).
    OrderedDuplicates,
}

/// Parse a comma-separated page spec into 0-indexed page indices.
///
/// Page numbers in the spec are 1-indexed. Tokens that fail to parse or fall
/// outside `1..=total_pages` are skipped rather than rejected; that leniency
/// is the contract, so a spec is only an error when *no* token survives.
/// Range tokens (`N-M`, both sides must parse) are honored in
/// `UniqueSorted` mode only; in `OrderedDuplicates` mode every token must be
/// a single page number.
pub fn parse_page_spec(spec: &str, total_pages: u32, mode: SpecMode) -> Result<Vec<u32>> {
    let indices = match mode {
        SpecMode::UniqueSorted => parse_unique_sorted(spec, total_pages),
        SpecMode::OrderedDuplicates => parse_ordered(spec, total_pages),
    };

    if indices.is_empty() {
        return Err(match mode {
            SpecMode::UniqueSorted => Error::InvalidRange {
                spec: spec.to_string(),
            },
            SpecMode::OrderedDuplicates => Error::InvalidOrder {
                spec: spec.to_string(),
            },
        });
    }

    Ok(indices)
}

fn parse_unique_sorted(spec: &str, total_pages: u32) -> Vec<u32> {
    // BTreeSet gives dedup and ascending order in one step.
    let mut pages: BTreeSet<u32> = BTreeSet::new();

    for token in spec.split(',') {
        let token = token.trim();

        if let Some((start, end)) = token.split_once('-') {
            let start: u32 = match start.trim().parse() {
                Ok(n) => n,
                Err(_) => continue,
            };
            let end: u32 = match end.trim().parse() {
                Ok(n) => n,
                Err(_) => continue,
            };
            // An inverted range selects nothing; its token is just skipped.
            for page in start..=end.min(total_pages) {
                if page >= 1 {
                    pages.insert(page - 1);
                }
            }
        } else if let Ok(page) = token.parse::<u32>() {
            if (1..=total_pages).contains(&page) {
                pages.insert(page - 1);
            }
        }
    }

    pages.into_iter().collect()
}

fn parse_ordered(spec: &str, total_pages: u32) -> Vec<u32> {
    spec.split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .filter(|page| (1..=total_pages).contains(page))
        .map(|page| page - 1)
        .collect()
}
