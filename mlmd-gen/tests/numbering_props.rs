//! Property tests for the Roman numeral conversions backing `&I` / `&i`
//! numbering symbols.

use mlmd_gen::numbering::{from_roman, to_roman};
use proptest::prelude::*;

proptest! {
    #[test]
    fn roman_round_trips(n in 1u32..=3999) {
        prop_assert_eq!(from_roman(&to_roman(n)), n);
    }

    #[test]
    fn roman_parsing_ignores_case(n in 1u32..=3999) {
        prop_assert_eq!(from_roman(&to_roman(n).to_lowercase()), n);
    }

    #[test]
    fn roman_never_repeats_a_symbol_four_times(n in 1u32..=3999) {
        let roman = to_roman(n);
        for symbol in ["I", "X", "C"] {
            prop_assert!(!roman.contains(&symbol.repeat(4)));
        }
    }
}
