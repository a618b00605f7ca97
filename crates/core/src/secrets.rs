//! Strength checks for configured secrets.
//!
//! Both web binaries refuse to start with a secret that looks like a
//! placeholder, is too short, or is too predictable. The checks here are pure;
//! reading the environment is left to each binary's config module.

use std::collections::HashMap;

use thiserror::Error;

/// Minimum length for session secrets.
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Minimum Shannon entropy, in bits per character.
pub const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Fragments that give away a copied-from-docs value (compared lowercased).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Why a secret was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeakSecret {
    #[error("appears to be a placeholder (contains '{0}')")]
    Placeholder(&'static str),
    #[error("must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },
    #[error(
        "entropy too low ({0:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
    )]
    LowEntropy(f64),
}

/// Shannon entropy of `s` in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy values.
///
/// # Errors
///
/// Returns the first failed check.
pub fn check_strength(secret: &str) -> Result<(), WeakSecret> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(WeakSecret::Placeholder(pattern));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(WeakSecret::LowEntropy(entropy));
    }
    Ok(())
}

/// Require at least [`MIN_SESSION_SECRET_LENGTH`] characters.
///
/// # Errors
///
/// Returns `TooShort` with the actual length.
pub fn check_session_secret_length(secret: &str) -> Result<(), WeakSecret> {
    let actual = secret.chars().count();
    if actual < MIN_SESSION_SECRET_LENGTH {
        return Err(WeakSecret::TooShort {
            min: MIN_SESSION_SECRET_LENGTH,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_edges() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholders_rejected() {
        assert_eq!(
            check_strength("your-api-key-here"),
            Err(WeakSecret::Placeholder("your-"))
        );
        assert!(matches!(
            check_strength("ChangeMe-9f8e7d6c5b4a"),
            Err(WeakSecret::Placeholder("changeme"))
        ));
    }

    #[test]
    fn test_low_entropy_rejected() {
        assert!(matches!(
            check_strength(&"a".repeat(40)),
            Err(WeakSecret::LowEntropy(_))
        ));
    }

    #[test]
    fn test_random_value_accepted() {
        assert_eq!(check_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"), Ok(()));
    }

    #[test]
    fn test_session_secret_length() {
        assert_eq!(
            check_session_secret_length("short"),
            Err(WeakSecret::TooShort { min: 32, actual: 5 })
        );
        assert_eq!(check_session_secret_length(&"k".repeat(32)), Ok(()));
    }
}
