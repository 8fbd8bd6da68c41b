//! Secret processor, weak-randomness path
//!
//! The remember-me fixtures mint their token from a non-cryptographic
//! generator on purpose: predictable randomness is the vulnerability the
//! scanners are being graded on. `fastrand` is a small-state, seedable PRNG
//! with no security claims, which makes it the honest stand-in for
//! `Math.random()` / `Random.nextFloat()`.

/// Name of the user the remember-me fixtures recognize.
pub const REMEMBERED_USER: &str = "Floyd";

/// Mint a remember-me token: the fractional digits of a weak pseudo-random
/// double, exactly as `Double.toString(rand).substring("0.".len())` would
/// produce them.
pub fn mint_token() -> String {
    token_from(fastrand::f64())
}

/// Fractional-digit extraction, separated from the generator so it can be
/// pinned down in tests. Values small enough for `Display` to render in
/// scientific notation are reformatted in plain decimal first so the token
/// stays digit-only.
fn token_from(value: f64) -> String {
    let mut text = value.to_string();
    if text.contains(['e', 'E']) {
        text = format!("{value:.17}");
    }
    match text.split_once('.') {
        Some((_, fraction)) => fraction.to_string(),
        None => text,
    }
}

/// Cookie name for a remember-me fixture: `rememberMe` plus the test-case
/// number taken from the route (the original derives it from the servlet's
/// class-name suffix).
pub fn remember_me_cookie_name(test_case: &str) -> String {
    format!("rememberMe{test_case}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_fractional_digits_only() {
        assert_eq!(token_from(0.7297136), "7297136");
        assert_eq!(token_from(0.5), "5");
    }

    #[test]
    fn whole_values_fall_back_to_their_digits() {
        assert_eq!(token_from(0.0), "0");
    }

    #[test]
    fn tiny_values_stay_digit_only() {
        // Display renders these in scientific notation
        for value in [1e-7, 3.2e-9, 5e-300] {
            let token = token_from(value);
            assert!(
                token.chars().all(|c| c.is_ascii_digit()),
                "token {token} from {value} not numeric"
            );
        }
    }

    #[test]
    fn minted_tokens_are_numeric() {
        for _ in 0..32 {
            let token = mint_token();
            assert!(!token.is_empty());
            assert!(token.chars().all(|c| c.is_ascii_digit()), "token {token} not numeric");
        }
    }

    #[test]
    fn cookie_name_concatenates_test_case() {
        assert_eq!(remember_me_cookie_name("00086"), "rememberMe00086");
    }
}
