//! Citation key pattern parsing (§4.F). Patterns are strings containing `{token}` or
//! `{token:N}` placeholders interleaved with literal text, e.g. `"{author}{year}"` or
//! `"{author}-{year:2}"`.
use crate::error::CitekeyError;

use super::case::Case;

/// A single parsed pattern segment: either literal text, or a token with an optional numeric
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token { name: String, param: Option<usize> },
}

const VALID_TOKENS: &[&str] = &["author", "authors", "year", "title", "word", "journal"];

/// A compiled key-generation pattern (§4.F).
#[derive(Debug, Clone)]
pub struct KeyPattern {
    pub segments: Vec<Segment>,
    pub case: Case,
    pub separator: String,
    pub min_length: usize,
    pub max_length: usize,
    pub min_author_chars: usize,
    pub max_author_chars: usize,
    pub min_title_chars: usize,
}

impl KeyPattern {
    /// Parse and validate a pattern string. Unknown tokens or a non-numeric `:param` are
    /// rejected at construction, matching the "invalid pattern is a construction-time error"
    /// rule in §7.
    pub fn parse(pattern: &str) -> Result<Self, CitekeyError> {
        if pattern.is_empty() {
            return Err(CitekeyError::InvalidPattern {
                offset: 0,
                message: "empty pattern".into(),
            });
        }
        if pattern.matches('{').count() != pattern.matches('}').count() {
            return Err(CitekeyError::InvalidPattern {
                offset: 0,
                message: "unclosed token in pattern".into(),
            });
        }

        let mut segments = Vec::new();
        let mut rest = pattern;
        let mut offset = 0usize;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }
            let Some(close) = rest[open..].find('}') else {
                return Err(CitekeyError::InvalidPattern {
                    offset: offset + open,
                    message: "unclosed token".into(),
                });
            };
            let token = &rest[open + 1..open + close];
            let (name, param) = match token.split_once(':') {
                Some((name, param_str)) => {
                    let param = param_str.parse::<usize>().map_err(|_| {
                        CitekeyError::InvalidPattern {
                            offset: offset + open,
                            message: format!("invalid parameter in token: {{{token}}}"),
                        }
                    })?;
                    (name, Some(param))
                }
                None => (token, None),
            };
            if !VALID_TOKENS.contains(&name) {
                return Err(CitekeyError::InvalidPattern {
                    offset: offset + open,
                    message: format!("invalid token: {{{token}}}"),
                });
            }
            segments.push(Segment::Token { name: name.to_owned(), param });
            offset += open + close + 1;
            rest = &rest[open + close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self {
            segments,
            case: Case::Lower,
            separator: String::new(),
            min_length: 3,
            max_length: 50,
            min_author_chars: 2,
            max_author_chars: 20,
            min_title_chars: 3,
        })
    }

    pub fn with_case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for KeyPattern {
    fn default() -> Self {
        Self::parse("{author}{year}").expect("default pattern is valid")
    }
}
