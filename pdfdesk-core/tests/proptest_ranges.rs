//! Property-based tests for page range parsing and validation
//!
//! Generates range inputs, including junk tokens, and checks the invariants
//! every tool relies on.

use pdfdesk::ranges::{
    parse_page_ranges, validate_selection, PageSelection, SelectionMode, ValidationCode,
};
use proptest::prelude::*;

// A single token: page, span, or something the parser must skip
fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..60).prop_map(|p| p.to_string()),
        (0u32..60, 0u32..60).prop_map(|(a, b)| format!("{a}-{b}")),
        (0u32..60, 0u32..60).prop_map(|(a, b)| format!(" {a} - {b} ")),
        "[a-z]{1,3}",
        Just(String::new()),
        Just("-".to_string()),
        Just("1-2-3".to_string()),
    ]
}

prop_compose! {
    fn range_input_strategy()(
        tokens in prop::collection::vec(token_strategy(), 0..12)
    ) -> String {
        tokens.join(",")
    }
}

fn mode_strategy() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![Just(SelectionMode::Remove), Just(SelectionMode::Select)]
}

proptest! {
    #[test]
    fn test_output_is_strictly_ascending_and_bounded(
        input in range_input_strategy(),
        max_page in 0u32..50
    ) {
        let selection = parse_page_ranges(&input, max_page);
        let pages = selection.pages();

        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(pages.iter().all(|&p| p >= 1 && p <= max_page));
    }

    #[test]
    fn test_parsing_is_idempotent(
        input in range_input_strategy(),
        max_page in 1u32..50
    ) {
        let first = parse_page_ranges(&input, max_page);

        let joined = first
            .pages()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(&parse_page_ranges(&joined, max_page), &first);

        let compact = first.to_range_string();
        prop_assert_eq!(&parse_page_ranges(&compact, max_page), &first);
    }

    #[test]
    fn test_never_valid_when_selection_empty(
        input in range_input_strategy(),
        max_page in 0u32..50,
        mode in mode_strategy()
    ) {
        let selection = parse_page_ranges(&input, max_page);
        let result = validate_selection(&input, &selection, Some(max_page), mode);

        if selection.is_empty() {
            prop_assert!(!result.valid);
            prop_assert!(result.code.is_some());
        }
        prop_assert_eq!(result.valid, result.code.is_none());
    }

    #[test]
    fn test_remove_never_accepts_every_page(total in 1u32..40) {
        let input = format!("1-{total}");
        let selection = parse_page_ranges(&input, total);
        let result = validate_selection(&input, &selection, Some(total), SelectionMode::Remove);

        prop_assert!(!result.valid);
        prop_assert_eq!(result.code, Some(ValidationCode::AllPagesSelected));
    }

    #[test]
    fn test_complement_partitions_document(
        pages in prop::collection::vec(1u32..30, 0..20),
        total in 30u32..40
    ) {
        let selection = PageSelection::from_pages(pages);
        let rest = selection.complement(total);

        prop_assert_eq!(selection.len() + rest.len(), total as usize);
        prop_assert!(rest.iter().all(|p| !selection.contains(p)));
    }
}
