//! Property tests for risk bucketing and tool option helpers

use devsecops_core::{format_config_key, ConfigValue, RiskBucket};
use proptest::prelude::*;

proptest! {
    #[test]
    fn risk_bucket_is_monotone_in_product(a in 0u32..=25, b in 0u32..=25) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RiskBucket::from_product(low) <= RiskBucket::from_product(high));
    }

    #[test]
    fn form_input_display_returns_raw_text(raw in "[a-zA-Z0-9,]{0,24}") {
        prop_assume!(raw != "on");
        prop_assert_eq!(ConfigValue::from_form_input(&raw).to_string(), raw);
    }

    #[test]
    fn form_input_list_only_with_commas(raw in "[a-zA-Z0-9,]{0,24}") {
        prop_assume!(raw != "on");
        let is_list = matches!(ConfigValue::from_form_input(&raw), ConfigValue::List(_));
        prop_assert_eq!(is_list, raw.contains(','));
    }

    #[test]
    fn config_key_splits_on_capitals(key in "[a-z][a-zA-Z]{0,15}") {
        let formatted = format_config_key(&key);
        let uppercase = key.chars().filter(|c| c.is_ascii_uppercase()).count();

        prop_assert_eq!(formatted.split(' ').count(), uppercase + 1);
        prop_assert!(formatted.split(' ').all(|word| word.starts_with(|c: char| c.is_ascii_uppercase())));

        let joined: String = formatted.split(' ').collect();
        let mut expected = key[..1].to_ascii_uppercase();
        expected.push_str(&key[1..]);
        prop_assert_eq!(joined, expected);
    }
}
