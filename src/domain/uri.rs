//! URI reference checks for element and health check URLs.

use url::{ParseError, Url};

use crate::domain::error::DomainError;

/// Base used to resolve relative references during validation only.
const RELATIVE_BASE: &str = "http://localhost/";

/// Checks that `input` is a well-formed URI reference.
///
/// Absolute URLs are parsed as-is. Relative references are accepted when
/// `allow_relative` is set and they resolve against a placeholder base.
/// Whitespace, control characters and malformed percent-escapes are never
/// valid. A relative reference whose first segment holds a `:` would read
/// as a scheme and is rejected as well.
pub fn validate_url(input: &str, allow_relative: bool) -> Result<(), DomainError> {
    let invalid = |reason: String| DomainError::InvalidUrl {
        url: input.to_string(),
        reason,
    };

    if input.is_empty() {
        return Err(invalid("empty URL".to_string()));
    }
    if let Some((pos, ch)) = input
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control())
    {
        return Err(invalid(format!("invalid character {ch:?} at byte {pos}")));
    }
    check_escapes(input).map_err(invalid)?;

    match Url::parse(input) {
        Ok(_) => Ok(()),
        Err(ParseError::RelativeUrlWithoutBase) if allow_relative => {
            check_first_segment(input).map_err(invalid)?;
            Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(input))
                .map(|_| ())
                .map_err(|e| invalid(e.to_string()))
        }
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Every `%` must start a two-digit hex escape.
fn check_escapes(input: &str) -> Result<(), String> {
    let bytes = input.as_bytes();
    for (pos, _) in input.match_indices('%') {
        let valid = bytes
            .get(pos + 1..pos + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let escape: String = input[pos..].chars().take(3).collect();
            return Err(format!("invalid URL escape {escape:?}"));
        }
    }
    Ok(())
}

fn check_first_segment(input: &str) -> Result<(), String> {
    if input.starts_with(':') {
        return Err("missing protocol scheme".to_string());
    }
    let first = input.split(['/', '?', '#']).next().unwrap_or_default();
    if first.contains(':') {
        return Err("first path segment in URL cannot contain colon".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/x")]
    #[case("http://localhost:8080/health")]
    #[case("mailto:team@example.com")]
    #[case("/docs/system")]
    #[case("docs/system#intro")]
    #[case("https://example.com/a%20b")]
    #[case("/docs/a:b")]
    #[case("?page=1")]
    fn test_accepts_valid_references(#[case] input: &str) {
        assert!(validate_url(input, true).is_ok(), "{input} should be valid");
    }

    #[rstest]
    #[case("not a url")]
    #[case("https://exa mple.com")]
    #[case("http://[::1")]
    #[case("")]
    #[case("%zz")]
    #[case("://x")]
    #[case("http://example.com/%zz")]
    #[case("http://a.com/%")]
    #[case("http://a.com/%4")]
    #[case("1a:b/c")]
    fn test_rejects_malformed(#[case] input: &str) {
        assert!(validate_url(input, true).is_err(), "{input} should be invalid");
    }

    #[test]
    fn test_relative_rejected_when_disallowed() {
        let err = validate_url("/docs", false).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidUrl {
                url: "/docs".into(),
                reason: "relative URL without a base".into(),
            }
        );
    }

    #[test]
    fn test_reason_names_offending_character() {
        let err = validate_url("not a url", true).unwrap_err();
        assert!(err.to_string().contains("at byte 3"), "{err}");
    }

    #[rstest]
    #[case("http://a.com/%zz", "invalid URL escape \"%zz\"")]
    #[case("http://a.com/%", "invalid URL escape \"%\"")]
    #[case("://x", "missing protocol scheme")]
    #[case("1a:b", "first path segment in URL cannot contain colon")]
    fn test_reason_for_malformed_reference(#[case] input: &str, #[case] reason: &str) {
        let err = validate_url(input, true).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidUrl {
                url: input.into(),
                reason: reason.into(),
            }
        );
    }
}
