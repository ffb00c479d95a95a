//! Property-based tests for the command argument grammar.
//!
//! Uses proptest to verify:
//! 1. Any input string parses without panicking.
//! 2. Known flags placed after arbitrary title text are always extracted.
//! 3. Flag keys are matched case-insensitively.
//! 4. Quoted values come back without their surrounding quotes.
//! 5. The list-filter and timeframe parsers never panic.

use proptest::prelude::*;

use taskbot_core::command::{CommandArgs, ListFilter, Timeframe};

/// Strategy for flag keys the handlers actually look up.
fn arb_known_key() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("desc"),
        Just("priority"),
        Just("deadline"),
        Just("team"),
        Just("name"),
    ]
}

/// Strategy for title text free of flag markers and quotes: one to four
/// words separated by single spaces.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,10}( [a-zA-Z0-9]{1,10}){0,3}"
}

/// Strategy for a single-word flag value.
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,20}"
}

proptest! {
    #[test]
    fn parse_never_panics(input in ".{0,256}") {
        let args = CommandArgs::parse(&input);
        // Exercise the accessors too.
        let _ = args.title();
        let _ = args.flag("desc");
        let _ = args.flags().count();
    }

    #[test]
    fn known_flag_after_title_is_extracted(
        title in arb_title(),
        key in arb_known_key(),
        value in arb_value(),
    ) {
        let input = format!("{title} --{key} {value}");
        let args = CommandArgs::parse(&input);
        prop_assert_eq!(args.flag(key), Some(value.as_str()));
        prop_assert_eq!(args.title(), Some(title.as_str()));
    }

    #[test]
    fn flag_keys_match_case_insensitively(
        key in arb_known_key(),
        value in arb_value(),
    ) {
        let input = format!("t --{} {value}", key.to_uppercase());
        let args = CommandArgs::parse(&input);
        prop_assert_eq!(args.flag(key), Some(value.as_str()));
    }

    #[test]
    fn quoted_values_lose_their_quotes(
        value in "[a-zA-Z0-9]{1,10}( [a-zA-Z0-9]{1,10}){0,3}",
    ) {
        let input = format!("t --desc \"{value}\"");
        let args = CommandArgs::parse(&input);
        prop_assert_eq!(args.flag("desc"), Some(value.as_str()));
    }

    #[test]
    fn multi_word_values_run_to_the_next_flag(
        first in arb_value(),
        second in arb_value(),
        team in arb_value(),
    ) {
        let input = format!("t --desc {first} {second} --team {team}");
        let args = CommandArgs::parse(&input);
        let expected = format!("{first} {second}");
        prop_assert_eq!(args.flag("desc"), Some(expected.as_str()));
        prop_assert_eq!(args.flag("team"), Some(team.as_str()));
    }

    #[test]
    fn list_filter_never_panics(input in ".{0,64}") {
        let _ = ListFilter::parse(&input);
    }

    #[test]
    fn timeframe_rejects_everything_but_the_three_tokens(input in "[a-z]{1,16}") {
        let parsed = Timeframe::parse(&input);
        let expected_ok = matches!(input.as_str(), "week" | "month" | "year");
        prop_assert_eq!(parsed.is_ok(), expected_ok);
    }
}
