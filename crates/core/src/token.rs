//! Date placeholder grammar
//!
//! A template carries at most one placeholder, written as one of:
//!
//! ```text
//! {DATEID}  {DATEID+N}  {DATEID-N}
//! {DATETIMEID}  {DATETIMEID+N}  {DATETIMEID-N}
//! ```
//!
//! where `N` is a run of ASCII digits counting whole days.

use std::ops::Range;

use serde::Serialize;

use crate::error::{Error, Result};

const DATEID: &str = "DATEID";
const DATETIMEID: &str = "DATETIMEID";

/// Which date format a placeholder expands to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// `YYYY-MM-DD`
    #[serde(rename = "DATEID")]
    DateId,
    /// `YYYY-MM-DD_HH-MM-SS`
    #[serde(rename = "DATETIMEID")]
    DateTimeId,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::DateId => DATEID,
            TokenKind::DateTimeId => DATETIMEID,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placeholder found inside a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Signed day offset, 0 when the placeholder has no suffix
    pub offset_days: i64,
    /// Byte range of the placeholder, braces included
    pub span: Range<usize>,
}

impl Token {
    /// The placeholder text exactly as written in `template`
    pub fn span_str<'a>(&self, template: &'a str) -> &'a str {
        &template[self.span.clone()]
    }
}

/// Find the date placeholder in `template`
///
/// Returns `Ok(None)` for a template without braces. Any brace region that
/// is not one of the six placeholder forms, an unbalanced brace, or a second
/// placeholder is a `MalformedToken` error.
pub fn parse(template: &str) -> Result<Option<Token>> {
    let mut found: Option<Token> = None;
    let mut pos = 0;

    while let Some(rel) = template[pos..].find(['{', '}']) {
        let start = pos + rel;
        if template.as_bytes()[start] == b'}' {
            return Err(Error::malformed(
                template,
                format!("unmatched '}}' at byte {start}"),
            ));
        }

        let body_start = start + 1;
        let close = template[body_start..]
            .find(['{', '}'])
            .map(|i| body_start + i)
            .filter(|&i| template.as_bytes()[i] == b'}')
            .ok_or_else(|| {
                Error::malformed(template, format!("unterminated '{{' at byte {start}"))
            })?;

        let (kind, offset_days) = parse_body(template, &template[body_start..close])?;

        if found.is_some() {
            return Err(Error::malformed(
                template,
                "more than one date placeholder",
            ));
        }
        found = Some(Token {
            kind,
            offset_days,
            span: start..close + 1,
        });
        pos = close + 1;
    }

    Ok(found)
}

fn parse_body(template: &str, body: &str) -> Result<(TokenKind, i64)> {
    let (kind, rest) = if let Some(rest) = body.strip_prefix(DATETIMEID) {
        (TokenKind::DateTimeId, rest)
    } else if let Some(rest) = body.strip_prefix(DATEID) {
        (TokenKind::DateId, rest)
    } else {
        return Err(Error::malformed(
            template,
            format!("unknown placeholder '{{{body}}}'"),
        ));
    };

    if rest.is_empty() {
        return Ok((kind, 0));
    }

    let (negative, digits) = match rest.as_bytes()[0] {
        b'+' => (false, &rest[1..]),
        b'-' => (true, &rest[1..]),
        _ => {
            return Err(Error::malformed(
                template,
                format!("unexpected '{rest}' after {kind}"),
            ));
        }
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed(
            template,
            format!("day offset '{digits}' is not a non-negative integer"),
        ));
    }

    let magnitude: i64 = digits.parse().map_err(|_| {
        Error::malformed(template, format!("day offset '{digits}' is too large"))
    })?;

    Ok((kind, if negative { -magnitude } else { magnitude }))
}
