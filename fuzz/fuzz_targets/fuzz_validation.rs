//! Fuzz testing for request and endpoint validation.
//!
//! Checks that the validation functions never panic and that anything
//! `check_endpoint` accepts really is limited to the endpoint charset.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_validation -- -max_total_time=60
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use gamehub::validation::{
    check_endpoint,
    validate_json_content_type,
    validate_query_length,
    validate_query_param_names,
};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    endpoint: &'a str,
    query: &'a str,
    content_type: Option<&'a str>,
    max_query_length: u16,
}

fuzz_target!(|input: Input<'_>| {
    if check_endpoint(input.endpoint).is_ok() {
        assert!(input.endpoint.starts_with('/'));
        assert!(input.endpoint.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '?' | '=' | '&' | '-')
        }));
    }

    let max = usize::from(input.max_query_length);
    assert_eq!(
        validate_query_length(input.query, max).is_ok(),
        input.query.len() <= max
    );

    let _ = validate_query_param_names(input.query);
    let _ = validate_json_content_type(input.content_type);
});
