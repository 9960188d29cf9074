//! Page range parsing
//!
//! Turns user-typed selections such as `"1,3-5,8"` into a sorted, deduplicated
//! set of 1-based page numbers. Parsing is lenient: malformed tokens and
//! numbers outside the document are dropped here, and [`validate_selection`]
//! turns the leftovers into messages for the user.

mod validator;

pub use validator::{validate_selection, SelectionMode, ValidationCode, ValidationResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Ascending, duplicate-free set of 1-based page numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSelection {
    pages: Vec<u32>,
}

impl PageSelection {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from arbitrary page numbers. Zero is discarded,
    /// the rest is sorted and deduplicated.
    pub fn from_pages<I: IntoIterator<Item = u32>>(pages: I) -> Self {
        let set: BTreeSet<u32> = pages.into_iter().filter(|&p| p >= 1).collect();
        Self {
            pages: set.into_iter().collect(),
        }
    }

    /// Every page of a document with `total_pages` pages
    pub fn all(total_pages: u32) -> Self {
        Self {
            pages: (1..=total_pages).collect(),
        }
    }

    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.binary_search(&page).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }

    /// True when the selection covers every page of the document
    pub fn covers_all(&self, total_pages: u32) -> bool {
        total_pages > 0 && self.len() >= total_pages as usize
    }

    /// Pages of the document that are not part of this selection
    pub fn complement(&self, total_pages: u32) -> PageSelection {
        Self {
            pages: (1..=total_pages).filter(|p| !self.contains(*p)).collect(),
        }
    }

    /// Render the selection in the compact input grammar, e.g. `1-3,5`
    pub fn to_range_string(&self) -> String {
        format_runs(&runs(&self.pages))
    }
}

impl IntoIterator for PageSelection {
    type Item = u32;
    type IntoIter = std::vec::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl std::fmt::Display for PageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_range_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Single(u32),
    Span(u32, u32),
}

fn parse_token(token: &str) -> Option<Token> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = start.trim().parse::<u32>().ok()?;
            let end = end.trim().parse::<u32>().ok()?;
            (start <= end).then_some(Token::Span(start, end))
        }
        None => token.parse::<u32>().ok().map(Token::Single),
    }
}

fn tokens(input: &str) -> impl Iterator<Item = Token> + '_ {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(parse_token)
}

/// Parse a page range string into a sorted, deduplicated selection.
///
/// Tokens are comma separated, each either a page number or an inclusive
/// `start-end` span. Malformed tokens are skipped, spans are clamped to
/// `1..=max_page` and single pages outside it are dropped.
///
/// ```
/// use pdfdesk::ranges::parse_page_ranges;
///
/// assert_eq!(parse_page_ranges("2, 4-6, 9", 10).pages(), &[2, 4, 5, 6, 9]);
/// assert_eq!(parse_page_ranges("1-3,2", 3).pages(), &[1, 2, 3]);
/// assert!(parse_page_ranges("abc", 10).is_empty());
/// ```
pub fn parse_page_ranges(input: &str, max_page: u32) -> PageSelection {
    let mut pages = BTreeSet::new();

    for token in tokens(input) {
        match token {
            Token::Single(page) => {
                if (1..=max_page).contains(&page) {
                    pages.insert(page);
                }
            }
            Token::Span(start, end) => {
                let start = start.max(1);
                let end = end.min(max_page);
                if start <= end {
                    pages.extend(start..=end);
                }
            }
        }
    }

    tracing::debug!(input, max_page, selected = pages.len(), "parsed page ranges");

    PageSelection {
        pages: pages.into_iter().collect(),
    }
}

/// Page numbers mentioned in `input` that lie beyond `max_page`, merged
/// into inclusive runs. Malformed tokens are ignored just like the parser
/// does.
pub fn pages_beyond(input: &str, max_page: u32) -> Vec<RangeInclusive<u32>> {
    let mut spans: Vec<(u32, u32)> = tokens(input)
        .filter_map(|token| match token {
            Token::Single(page) if page > max_page => Some((page, page)),
            Token::Span(start, end) if end > max_page => Some((start.max(max_page.saturating_add(1)), end)),
            _ => None,
        })
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    merged.into_iter().map(|(s, e)| s..=e).collect()
}

fn runs(pages: &[u32]) -> Vec<RangeInclusive<u32>> {
    let mut out: Vec<RangeInclusive<u32>> = Vec::new();
    for &page in pages {
        match out.last_mut() {
            Some(run) if *run.end() + 1 == page => *run = *run.start()..=page,
            _ => out.push(page..=page),
        }
    }
    out
}

pub(crate) fn format_runs(runs: &[RangeInclusive<u32>]) -> String {
    runs.iter()
        .map(|run| {
            if run.start() == run.end() {
                run.start().to_string()
            } else {
                format!("{}-{}", run.start(), run.end())
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        assert_eq!(parse_page_ranges("5", 10).pages(), &[5]);
    }

    #[test]
    fn test_mixed_tokens() {
        assert_eq!(parse_page_ranges("2, 4-6, 9", 10).pages(), &[2, 4, 5, 6, 9]);
    }

    #[test]
    fn test_duplicates_are_merged() {
        assert_eq!(parse_page_ranges("1-3,2", 3).pages(), &[1, 2, 3]);
        assert_eq!(parse_page_ranges("4,4,4", 5).pages(), &[4]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        assert_eq!(parse_page_ranges("9,1,5-6", 10).pages(), &[1, 5, 6, 9]);
    }

    #[test]
    fn test_whitespace_and_empty_tokens() {
        assert_eq!(parse_page_ranges(" 1 , , 3 - 4 ,", 10).pages(), &[1, 3, 4]);
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        assert_eq!(parse_page_ranges("a,2,3-b,1-2-3,-4,7-", 10).pages(), &[2]);
    }

    #[test]
    fn test_reversed_span_is_skipped() {
        assert!(parse_page_ranges("5-3", 10).is_empty());
    }

    #[test]
    fn test_out_of_bounds_values_dropped() {
        assert_eq!(parse_page_ranges("0,3,11", 10).pages(), &[3]);
        assert_eq!(parse_page_ranges("8-15", 10).pages(), &[8, 9, 10]);
        assert_eq!(parse_page_ranges("0-2", 10).pages(), &[1, 2]);
        assert!(parse_page_ranges("12-20", 10).is_empty());
    }

    #[test]
    fn test_huge_span_is_clamped() {
        let selection = parse_page_ranges("1-4000000000", 4);
        assert_eq!(selection.pages(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_max_page_yields_nothing() {
        assert!(parse_page_ranges("1-3", 0).is_empty());
    }

    #[test]
    fn test_to_range_string_compacts_runs() {
        let selection = PageSelection::from_pages([5, 1, 2, 3, 9, 10]);
        assert_eq!(selection.to_range_string(), "1-3,5,9-10");
        assert_eq!(PageSelection::new().to_range_string(), "");
    }

    #[test]
    fn test_complement_and_coverage() {
        let selection = parse_page_ranges("1,3", 4);
        assert_eq!(selection.complement(4).pages(), &[2, 4]);
        assert!(!selection.covers_all(4));
        assert!(PageSelection::all(4).covers_all(4));
        assert!(!PageSelection::new().covers_all(0));
    }

    #[test]
    fn test_from_pages_discards_zero() {
        assert_eq!(PageSelection::from_pages([0, 2, 2, 1]).pages(), &[1, 2]);
    }

    #[test]
    fn test_pages_beyond() {
        assert!(pages_beyond("1-3", 5).is_empty());
        assert_eq!(pages_beyond("1,7,9", 5), vec![7..=7, 9..=9]);
        assert_eq!(pages_beyond("4-8,7,9", 5), vec![6..=9]);
        assert_eq!(pages_beyond("x,12", 5), vec![12..=12]);
    }
}
