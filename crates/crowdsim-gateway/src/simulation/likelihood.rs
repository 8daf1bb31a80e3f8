//! Purchase-likelihood extraction from raw completion text.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static LIKELIHOOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(\d{1,3})%\*").expect("likelihood pattern is valid"));

/// First `*N%*` occurrence (1-3 digit integer) in the completion, or `None`
/// when no such pattern occurs. There is no upper-bound check: values above
/// 100 parse and are stored as returned.
pub fn extract_purchase_likelihood(text: &str) -> Option<u32> {
    LIKELIHOOD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}
