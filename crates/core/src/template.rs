//! Path materialization
//!
//! Turns a template into a literal store path by substituting its date
//! placeholder. Source and destination templates are materialized
//! independently, each with its own offset.

use jiff::Zoned;
use serde::Serialize;

use crate::error::Result;
use crate::path::RemotePath;
use crate::resolve::resolve;
use crate::token::{Token, parse};

/// A template after substitution
///
/// Only [`materialize`] builds one, so a `ResolvedPath` never contains a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPath {
    literal: String,
    is_prefix: bool,
}

impl ResolvedPath {
    /// The substituted string, usable as a store key or prefix
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Whether the literal ends with a path separator
    pub fn is_prefix(&self) -> bool {
        self.is_prefix
    }

    /// Parse the literal into bucket and key
    pub fn remote(&self) -> Result<RemotePath> {
        RemotePath::parse(&self.literal)
    }
}

impl std::fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Resolve `template` against `reference`
pub fn materialize(template: &str, reference: &Zoned) -> Result<ResolvedPath> {
    let literal = match parse(template)? {
        None => template.to_string(),
        Some(token) => substitute(template, &token, &resolve(&token, reference)?),
    };

    tracing::debug!(template, literal = %literal, "Materialized path template");

    Ok(ResolvedPath {
        is_prefix: literal.ends_with('/'),
        literal,
    })
}

/// Replace the token's span in `template` with `value`
pub fn substitute(template: &str, token: &Token, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + value.len());
    out.push_str(&template[..token.span.start]);
    out.push_str(value);
    out.push_str(&template[token.span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::resolve::parse_reference;
    use jiff::tz::TimeZone;

    fn at(text: &str) -> Zoned {
        parse_reference(text, &TimeZone::UTC).unwrap()
    }

    #[test]
    fn test_leap_year_prefix() {
        let r = materialize("store://bkt/data/{DATEID-1}/", &at("2024-03-01T00:00:00Z")).unwrap();
        assert_eq!(r.literal(), "store://bkt/data/2024-02-29/");
        assert!(r.is_prefix());
    }

    #[test]
    fn test_datetime_single_key() {
        let r = materialize(
            "store://bkt/snap/{DATETIMEID+1}/file.bin",
            &at("2023-12-31T23:59:00Z"),
        )
        .unwrap();
        assert_eq!(r.literal(), "store://bkt/snap/2024-01-01_23-59-00/file.bin");
        assert!(!r.is_prefix());
    }

    #[test]
    fn test_job_style_templates() {
        let reference = at("2017-11-28T23:55:59.342380Z");
        let cases = [
            ("s3://test-bucket/path/p2/{DATEID}", "s3://test-bucket/path/p2/2017-11-28"),
            (
                "s3://test-bucket/path/p2/some_{DATETIMEID-1}",
                "s3://test-bucket/path/p2/some_2017-11-27_23-55-59",
            ),
            (
                "s3://test-bucket/path/p2/some_{DATETIMEID-1}_postfix",
                "s3://test-bucket/path/p2/some_2017-11-27_23-55-59_postfix",
            ),
            ("s3://test-bucket/path/p2", "s3://test-bucket/path/p2"),
        ];
        for (template, expected) in cases {
            assert_eq!(materialize(template, &reference).unwrap().literal(), expected);
        }
    }

    #[test]
    fn test_literal_template_is_unchanged() {
        for reference in ["1999-12-31T23:59:59Z", "2024-02-29T12:00:00Z"] {
            for template in ["s3://bkt/a/b/", "s3://bkt/a/file.txt", "s3://bkt//x//"] {
                let r = materialize(template, &at(reference)).unwrap();
                assert_eq!(r.literal(), template);
                assert_eq!(r.is_prefix(), template.ends_with('/'));
            }
        }
    }

    #[test]
    fn test_substitution_only_touches_span() {
        let template = "s3://bkt/pre_{DATEID+2}_post/tail";
        let token = parse(template).unwrap().unwrap();
        let literal = materialize(template, &at("2024-02-28T00:00:00Z")).unwrap();
        let literal = literal.literal();

        assert_eq!(&literal[..token.span.start], &template[..token.span.start]);
        let tail = &template[token.span.end..];
        assert!(literal.ends_with(tail));
        assert_eq!(
            &literal[token.span.start..literal.len() - tail.len()],
            "2024-03-01"
        );
    }

    #[test]
    fn test_source_and_destination_resolve_independently() {
        let reference = at("2024-01-01T06:00:00Z");
        let src = materialize("s3://bkt/in/{DATEID-1}/", &reference).unwrap();
        let dst = materialize("s3://bkt/out/{DATEID}/", &reference).unwrap();
        assert_eq!(src.literal(), "s3://bkt/in/2023-12-31/");
        assert_eq!(dst.literal(), "s3://bkt/out/2024-01-01/");
    }

    #[test]
    fn test_malformed_propagates() {
        let err = materialize("s3://bkt/{DATEID+1.5}/", &at("2024-01-01T00:00:00Z")).unwrap_err();
        assert!(matches!(err, Error::MalformedToken { .. }));
    }
}
