//! Validation of reverse-domain bundle identifiers (e.g. `com.mycompany.mygame`).
//!
//! Rules are evaluated in a fixed order and the first failure wins, so callers
//! always receive the most specific message for a malformed identifier.

/// Shortest accepted identifier, in characters.
pub const MIN_LENGTH: usize = 3;
/// Longest accepted identifier, in characters.
pub const MAX_LENGTH: usize = 100;

const EMPTY_MESSAGE: &str = "Bundle ID cannot be null or empty";
const CONSECUTIVE_DOTS_MESSAGE: &str = "Bundle ID cannot contain consecutive dots";
const EDGE_DOT_MESSAGE: &str = "Bundle ID cannot start or end with a dot";
const NOTATION_MESSAGE: &str =
    "Bundle ID must follow reverse domain notation (e.g., com.mycompany.myapp)";
const VALID_MESSAGE: &str = "Valid bundle ID";

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: VALID_MESSAGE.to_string(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Validates `bundle_id` and explains the first rule it breaks.
pub fn validate(bundle_id: &str) -> ValidationResult {
    if bundle_id.trim().is_empty() {
        return ValidationResult::invalid(EMPTY_MESSAGE);
    }

    let length = bundle_id.chars().count();
    if length < MIN_LENGTH {
        return ValidationResult::invalid(format!(
            "Bundle ID too short (minimum {MIN_LENGTH} characters)"
        ));
    }
    if length > MAX_LENGTH {
        return ValidationResult::invalid(format!(
            "Bundle ID too long (maximum {MAX_LENGTH} characters)"
        ));
    }

    if bundle_id.contains("..") {
        return ValidationResult::invalid(CONSECUTIVE_DOTS_MESSAGE);
    }

    if bundle_id.starts_with('.') || bundle_id.ends_with('.') {
        return ValidationResult::invalid(EDGE_DOT_MESSAGE);
    }

    if !bundle_id.split('.').all(is_valid_segment) {
        return ValidationResult::invalid(NOTATION_MESSAGE);
    }

    // A single segment is well formed but not a reverse domain.
    if !bundle_id.contains('.') {
        return ValidationResult::invalid(NOTATION_MESSAGE);
    }

    ValidationResult::valid()
}

/// Convenience wrapper around [`validate`].
pub fn is_valid(bundle_id: &str) -> bool {
    validate(bundle_id).is_valid
}

/// A segment starts with an ASCII letter followed by ASCII letters or digits.
fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_reverse_domain_identifiers() {
        for id in [
            "com.acme.game",
            "a.b",
            "io.soda.Game2",
            "com.mycompany.mygame",
            "x1.y2.z3",
        ] {
            assert!(is_valid(id), "{id} should be valid");
            assert_eq!(validate(id).message, VALID_MESSAGE);
        }
    }

    #[test]
    fn accepts_boundary_lengths() {
        assert!(is_valid("a.b"));
        let long = format!("com.{}", "a".repeat(MAX_LENGTH - 4));
        assert_eq!(long.len(), MAX_LENGTH);
        assert!(is_valid(&long));
    }

    #[test]
    fn reports_empty_identifier() {
        for id in ["", "   ", "\t\n"] {
            let result = validate(id);
            assert!(!result.is_valid);
            assert_eq!(result.message, EMPTY_MESSAGE);
        }
    }

    #[test]
    fn reports_length_violations() {
        let short = validate("ab");
        assert!(!short.is_valid);
        assert!(short.message.contains("too short"));

        let long = validate(&format!("com.{}", "a".repeat(MAX_LENGTH)));
        assert!(!long.is_valid);
        assert!(long.message.contains("too long"));
    }

    #[test]
    fn reports_dot_placement() {
        assert_eq!(validate("com..acme").message, CONSECUTIVE_DOTS_MESSAGE);
        assert_eq!(validate(".com.acme").message, EDGE_DOT_MESSAGE);
        assert_eq!(validate("com.acme.").message, EDGE_DOT_MESSAGE);
    }

    #[test]
    fn consecutive_dots_win_over_edge_dots() {
        assert_eq!(validate("..com").message, CONSECUTIVE_DOTS_MESSAGE);
    }

    #[test]
    fn reports_notation_violations() {
        for id in ["com.1acme", "com.ac-me", "com.acme_game", "com. acme", "comacme"] {
            let result = validate(id);
            assert!(!result.is_valid, "{id} should be rejected");
            assert_eq!(result.message, NOTATION_MESSAGE);
        }
    }

    #[test]
    fn rejects_non_ascii_letters() {
        assert!(!is_valid("com.açme"));
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9]{0,9}"
    }

    /// Two to eight well-formed segments; at most 87 characters.
    fn reverse_domain() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 2..=8).prop_map(|segments| segments.join("."))
    }

    proptest! {
        #[test]
        fn generated_reverse_domains_are_accepted(id in reverse_domain()) {
            prop_assert!(id.len() <= MAX_LENGTH);
            prop_assert_eq!(validate(&id), ValidationResult::valid());
        }

        #[test]
        fn blank_input_reports_empty(id in "[ \\t\\n]{0,6}") {
            prop_assert_eq!(validate(&id).message, EMPTY_MESSAGE);
        }

        #[test]
        fn short_input_reports_minimum(id in "[a-z.]{1,2}") {
            prop_assume!(!id.trim().is_empty());
            prop_assert_eq!(
                validate(&id).message,
                format!("Bundle ID too short (minimum {MIN_LENGTH} characters)")
            );
        }

        #[test]
        fn oversized_input_reports_maximum(id in reverse_domain()) {
            let long = format!("{id}.{}", "a".repeat(MAX_LENGTH));
            prop_assert_eq!(
                validate(&long).message,
                format!("Bundle ID too long (maximum {MAX_LENGTH} characters)")
            );
        }

        #[test]
        fn doubled_dot_reports_consecutive_dots(id in reverse_domain()) {
            let broken = id.replacen('.', "..", 1);
            prop_assert_eq!(validate(&broken).message, CONSECUTIVE_DOTS_MESSAGE);
        }

        #[test]
        fn edge_dot_reports_placement(id in reverse_domain(), leading in any::<bool>()) {
            let broken = if leading { format!(".{id}") } else { format!("{id}.") };
            prop_assert_eq!(validate(&broken).message, EDGE_DOT_MESSAGE);
        }

        #[test]
        fn bad_segment_reports_notation(id in reverse_domain(), bad in "[0-9_ -]") {
            let broken = format!("{bad}{id}");
            prop_assert_eq!(validate(&broken).message, NOTATION_MESSAGE);
        }

        #[test]
        fn single_segment_reports_notation(id in "[a-zA-Z][a-zA-Z0-9]{2,20}") {
            prop_assert_eq!(validate(&id).message, NOTATION_MESSAGE);
        }
    }
}
