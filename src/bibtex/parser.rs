//! Lexer + recursive-descent parser for BibTeX source text (§4.B).
//!
//! The lexer and parser are combined into a single hand-rolled scanner: BibTeX's grammar is
//! small enough, and the balanced-brace value syntax irregular enough, that a token stream
//! buys little over scanning characters directly while tracking line/column state.
use std::collections::HashMap;

use crate::entry::KeyedEntry;
use crate::error::{BibtexError, BibtexErrorKind};
use crate::text::normalize_whitespace;

/// A table of `@string` macro definitions, seeded with the standard BibTeX month
/// abbreviations so `month = jan` resolves the way every BibTeX-consuming tool expects.
#[derive(Debug, Clone, Default)]
pub struct MacroTable(HashMap<String, String>);

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

impl MacroTable {
    pub fn with_month_macros() -> Self {
        let mut table = HashMap::new();
        for (k, v) in MONTHS {
            table.insert(k.to_owned(), v.to_owned());
        }
        Self(table)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn insert(&mut self, name: String, value: String) {
        self.0.insert(name.to_ascii_lowercase(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A `@comment` block, or a `%` line comment, recorded for format-preservation mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedComment {
    pub line: usize,
    pub text: String,
}

/// The full result of parsing a BibTeX source (§4.B "Failure semantics"): every entry that
/// parsed cleanly, plus every diagnostic raised along the way, plus enough format-preservation
/// bookkeeping to support round-trip editing when requested.
///
/// `raw_records` is populated only by [`parse_str_preserving`]/[`parse_bytes_preserving`]: it
/// holds, for each entry in `entries` at the same index, the verbatim source text of that
/// entry's `@type{key, ...}` block exactly as written. [`crate::bibtex::emit::to_bibtex_preserving`]
/// uses it to re-emit untouched entries byte-identically rather than through the
/// simplest-braced-form renderer (§4.B "format preservation mode", §8 "unchanged bytes re-emit
/// byte-identically").
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub entries: Vec<KeyedEntry>,
    pub errors: Vec<BibtexError>,
    pub string_table: MacroTable,
    pub preambles: Vec<String>,
    pub comments: Vec<RecordedComment>,
    pub raw_records: Vec<String>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(BibtexError::is_error)
    }
}

/// Parse a complete BibTeX source string, discarding original formatting once each field is
/// folded into its typed value (§4.B's default mode).
pub fn parse_str(input: &str) -> ParseOutcome {
    let mut parser = Parser::new(input, false);
    parser.run();
    parser.into_outcome()
}

/// Parse a complete BibTeX source string in format-preservation mode: `outcome.raw_records`
/// additionally holds each entry's verbatim source text, enabling byte-identical re-emission
/// of unmodified entries via [`crate::bibtex::emit::to_bibtex_preserving`] (§4.B).
pub fn parse_str_preserving(input: &str) -> ParseOutcome {
    let mut parser = Parser::new(input, true);
    parser.run();
    parser.into_outcome()
}

/// Parse bytes, attempting UTF-8 first and falling back to Latin-1 on failure (§4.B
/// "Failure semantics"). Latin-1 decoding of arbitrary bytes cannot itself fail (every byte
/// maps to the Unicode scalar of the same ordinal), so this only returns `Err` in the
/// (currently unreachable) case both strategies are exhausted, kept for forward-compatibility
/// with the documented fallback chain.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParseOutcome, BibtexError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(parse_str(s)),
        Err(_) => {
            let latin1: String = bytes.iter().map(|&b| b as char).collect();
            Ok(parse_str(&latin1))
        }
    }
}

/// As [`parse_bytes`], but in format-preservation mode (see [`parse_str_preserving`]).
pub fn parse_bytes_preserving(bytes: &[u8]) -> Result<ParseOutcome, BibtexError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(parse_str_preserving(s)),
        Err(_) => {
            let latin1: String = bytes.iter().map(|&b| b as char).collect();
            Ok(parse_str_preserving(&latin1))
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    outcome: ParseOutcome,
    seen_keys: std::collections::HashSet<String>,
    synth_counter: usize,
    preserve_format: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, preserve_format: bool) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            outcome: ParseOutcome {
                string_table: MacroTable::with_month_macros(),
                ..ParseOutcome::default()
            },
            seen_keys: std::collections::HashSet::new(),
            synth_counter: 0,
            preserve_format,
        }
    }

    fn into_outcome(self) -> ParseOutcome {
        self.outcome
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip whitespace and top-level `%` line comments. Used between `@`-commands.
    fn skip_ws_and_top_level_comments(&mut self) {
        loop {
            self.skip_inline_ws();
            if self.peek() == Some('%') {
                let line = self.line;
                let start = self.pos;
                while !matches!(self.peek(), None | Some('\n')) {
                    self.advance();
                }
                let text = self.input[start..self.pos].to_owned();
                self.outcome
                    .comments
                    .push(RecordedComment { line, text });
                continue;
            }
            break;
        }
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '.' | ':')) {
            self.advance();
        }
        self.input[start..self.pos].to_owned()
    }

    /// Run the parser over the whole input.
    fn run(&mut self) {
        loop {
            // Skip to the next top-level `@`, recording `%` comments along the way.
            loop {
                self.skip_ws_and_top_level_comments();
                match self.peek() {
                    Some('@') => break,
                    Some(_) => {
                        self.advance();
                    }
                    None => return,
                }
            }

            let at_line = self.line;
            let at_col = self.column;
            let record_start = self.pos;
            self.advance(); // consume '@'
            let command = self.read_ident();
            if command.is_empty() {
                self.outcome.errors.push(BibtexError::error(
                    at_line,
                    at_col,
                    "expected a command name after '@'",
                ));
                continue;
            }

            match command.to_ascii_lowercase().as_str() {
                "string" => self.parse_string_def(),
                "comment" => self.skip_balanced_command(true),
                "preamble" => self.parse_preamble(),
                _ => self.parse_entry(command, record_start),
            }
        }
    }

    /// Consume an opening delimiter (`{` or `(`), returning the matching closer.
    fn expect_opening_delim(&mut self) -> Option<char> {
        self.skip_inline_ws();
        match self.peek() {
            Some('{') => {
                self.advance();
                Some('}')
            }
            Some('(') => {
                self.advance();
                Some(')')
            }
            _ => None,
        }
    }

    fn parse_string_def(&mut self) {
        let Some(closer) = self.expect_opening_delim() else {
            self.outcome.errors.push(BibtexError::error(
                self.line,
                self.column,
                "expected '{' or '(' after @string",
            ));
            self.resync(0);
            return;
        };
        self.skip_inline_ws();
        let name = self.read_ident();
        self.skip_inline_ws();
        if self.peek() != Some('=') {
            self.outcome.errors.push(BibtexError::error(
                self.line,
                self.column,
                "expected '=' in @string definition",
            ));
            self.resync(1);
            return;
        }
        self.advance();
        self.skip_inline_ws();
        match self.parse_value() {
            Ok(value) => {
                self.outcome.string_table.insert(name, value);
                self.skip_inline_ws();
                if self.peek() == Some(closer) {
                    self.advance();
                } else {
                    self.outcome.errors.push(BibtexError::error(
                        self.line,
                        self.column,
                        format!("expected closing '{closer}' in @string definition"),
                    ));
                    self.resync(1);
                }
            }
            Err(e) => {
                self.outcome.errors.push(e);
                self.resync(1);
            }
        }
    }

    fn parse_preamble(&mut self) {
        let Some(closer) = self.expect_opening_delim() else {
            self.outcome.errors.push(BibtexError::error(
                self.line,
                self.column,
                "expected '{' or '(' after @preamble",
            ));
            self.resync(0);
            return;
        };
        self.skip_inline_ws();
        match self.parse_value() {
            Ok(value) => {
                self.outcome.preambles.push(value);
                self.skip_inline_ws();
                if self.peek() == Some(closer) {
                    self.advance();
                } else {
                    self.outcome.errors.push(BibtexError::error(
                        self.line,
                        self.column,
                        format!("expected closing '{closer}' in @preamble"),
                    ));
                    self.resync(1);
                }
            }
            Err(e) => {
                self.outcome.errors.push(e);
                self.resync(1);
            }
        }
    }

    /// Skip a balanced `{...}`/`(...)` block after `@comment`, optionally recording it.
    fn skip_balanced_command(&mut self, record: bool) {
        let line = self.line;
        let Some(closer) = self.expect_opening_delim() else {
            self.outcome.errors.push(BibtexError::error(
                self.line,
                self.column,
                "expected '{' or '(' after @comment",
            ));
            self.resync(0);
            return;
        };
        let opener = if closer == '}' { '{' } else { '(' };
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            match self.peek() {
                Some(c) if c == opener => {
                    depth += 1;
                    self.advance();
                }
                Some(c) if c == closer => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    self.outcome.errors.push(BibtexError::error(
                        self.line,
                        self.column,
                        "unterminated @comment block",
                    ));
                    return;
                }
            }
        }
        if record {
            let text = self.input[start..self.pos.saturating_sub(1)].to_owned();
            self.outcome.comments.push(RecordedComment { line, text });
        }
    }

    fn parse_entry(&mut self, type_name: String, record_start: usize) {
        let Some(closer) = self.expect_opening_delim() else {
            self.outcome.errors.push(BibtexError::error(
                self.line,
                self.column,
                format!("expected '{{' or '(' after @{type_name}"),
            ));
            self.resync(0);
            return;
        };

        self.skip_inline_ws();
        let key_start = self.pos;
        while !matches!(self.peek(), None | Some(',') | Some('}') | Some(')')) && !self.peek().is_some_and(char::is_whitespace)
        {
            self.advance();
        }
        let mut key = self.input[key_start..self.pos].to_owned();
        self.skip_inline_ws();

        if key.is_empty() {
            self.synth_counter += 1;
            key = format!("entry_{}", self.synth_counter);
            self.outcome.errors.push(BibtexError::warning(
                self.line,
                self.column,
                format!("entry has no citation key; synthesized '{key}'"),
            ));
        } else if !self.seen_keys.insert(key.clone()) {
            self.outcome.errors.push(BibtexError::warning(
                self.line,
                self.column,
                format!("duplicate citation key '{key}'"),
            ));
        } else {
            // already inserted by the `insert` call above when unique
        }

        let mut fields: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_inline_ws();
            match self.peek() {
                Some(c) if c == closer => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    self.advance();
                    self.skip_inline_ws();
                    if self.peek() == Some(closer) {
                        self.advance();
                        break;
                    }
                    match self.parse_field() {
                        Ok(Some((name, value))) => fields.push((name, value)),
                        Ok(None) => {}
                        Err(e) => {
                            self.outcome.errors.push(e);
                            if !self.resync_within_entry(closer) {
                                break;
                            }
                        }
                    }
                }
                Some(_) => {
                    self.outcome.errors.push(BibtexError::error(
                        self.line,
                        self.column,
                        format!("expected ',' or closing '{closer}' in entry '{key}'"),
                    ));
                    if !self.resync_within_entry(closer) {
                        break;
                    }
                }
                None => {
                    self.outcome.errors.push(BibtexError::error(
                        self.line,
                        self.column,
                        format!("unterminated entry '{key}'"),
                    ));
                    break;
                }
            }
        }

        if self.preserve_format {
            self.outcome.raw_records.push(self.input[record_start..self.pos].to_owned());
        }

        self.outcome.entries.push(KeyedEntry {
            key,
            entry_type: type_name,
            fields: {
                let mut f = crate::entry::Fields::default();
                for (name, value) in fields {
                    f.set(&name, value);
                }
                f
            },
        });
    }

    /// Recover from an error encountered inside an entry body by skipping forward until
    /// brace/paren depth returns to zero (i.e. the entry's closing delimiter) or a top-level
    /// `@` is seen. Returns `false` if the entry should be abandoned entirely (EOF reached).
    fn resync_within_entry(&mut self, closer: char) -> bool {
        let opener = if closer == '}' { '{' } else { '(' };
        let mut depth = 1usize;
        loop {
            match self.peek() {
                Some(c) if c == opener => {
                    depth += 1;
                    self.advance();
                }
                Some(c) if c == closer => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return false;
                    }
                }
                Some('@') if depth == 1 => {
                    // Looks like the entry was never properly closed; bail without consuming
                    // the `@`, so the outer loop picks up the next command.
                    return false;
                }
                Some(_) => {
                    self.advance();
                }
                None => return false,
            }
        }
    }

    /// Generic resync used outside entry bodies (e.g. malformed `@string`): skip to the next
    /// top-level `@` or EOF.
    fn resync(&mut self, _min_depth: usize) {
        loop {
            match self.peek() {
                Some('@') | None => return,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn parse_field(&mut self) -> Result<Option<(String, String)>, BibtexError> {
        self.skip_inline_ws();
        let name = self.read_ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(BibtexError::error(
                self.line,
                self.column,
                "expected a field name",
            ));
        }
        self.skip_inline_ws();
        if self.peek() != Some('=') {
            return Err(BibtexError::error(
                self.line,
                self.column,
                format!("expected '=' after field name '{name}'"),
            ));
        }
        self.advance();
        self.skip_inline_ws();
        let value = self.parse_value()?;
        Ok(Some((name, value)))
    }

    /// Parse a field value: any mix of quoted strings, braced strings, bare numbers, and
    /// macro references, concatenated with `#` (§4.B).
    fn parse_value(&mut self) -> Result<String, BibtexError> {
        let mut out = String::new();
        loop {
            self.skip_inline_ws();
            match self.peek() {
                Some('"') => out.push_str(&self.read_quoted_string()?),
                Some('{') => out.push_str(&self.read_braced_string()?),
                Some(c) if c.is_ascii_digit() => out.push_str(&self.read_number()),
                Some(c) if c.is_alphabetic() || c == '_' => {
                    let name = self.read_ident();
                    match self.outcome.string_table.get(&name) {
                        Some(value) => out.push_str(value),
                        None => {
                            self.outcome.errors.push(BibtexError::warning(
                                self.line,
                                self.column,
                                format!("undefined @string macro '{name}'; using literal name"),
                            ));
                            out.push_str(&name);
                        }
                    }
                }
                Some(c) => {
                    return Err(BibtexError::error(
                        self.line,
                        self.column,
                        format!("unexpected character '{c}' in field value"),
                    ))
                }
                None => {
                    return Err(BibtexError::error(
                        self.line,
                        self.column,
                        "unexpected end of input in field value",
                    ))
                }
            }
            self.skip_inline_ws();
            if self.peek() == Some('#') {
                self.advance();
                continue;
            }
            break;
        }
        Ok(out)
    }

    fn read_number(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.pos].to_owned()
    }

    fn read_quoted_string(&mut self) -> Result<String, BibtexError> {
        let (line, col) = (self.line, self.column);
        self.advance(); // opening quote
        let mut raw = String::new();
        let mut depth = 0i32;
        loop {
            match self.peek() {
                Some('\\') => {
                    self.advance();
                    raw.push('\\');
                    if let Some(c) = self.advance() {
                        raw.push(c);
                    }
                }
                Some('{') => {
                    depth += 1;
                    raw.push('{');
                    self.advance();
                }
                Some('}') => {
                    depth -= 1;
                    raw.push('}');
                    self.advance();
                }
                Some('"') if depth <= 0 => {
                    self.advance();
                    break;
                }
                // A top-level `@` while still unclosed strongly suggests a missing closing
                // quote rather than legitimate content; bail so the caller can resync (§4.B
                // "Error recovery").
                Some('@') if depth <= 0 => {
                    return Err(BibtexError::error(line, col, "unterminated quoted string"))
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
                None => {
                    return Err(BibtexError::error(
                        line,
                        col,
                        "unterminated quoted string",
                    ))
                }
            }
        }
        Ok(normalize_whitespace(&raw).unwrap_or(raw))
    }

    fn read_braced_string(&mut self) -> Result<String, BibtexError> {
        let (line, col) = (self.line, self.column);
        self.advance(); // opening brace
        let mut raw = String::new();
        let mut depth = 1u32;
        loop {
            match self.peek() {
                Some('\\') => {
                    self.advance();
                    raw.push('\\');
                    if let Some(c) = self.advance() {
                        raw.push(c);
                    }
                }
                Some('{') => {
                    depth += 1;
                    raw.push('{');
                    self.advance();
                }
                Some('}') => {
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    raw.push('}');
                }
                // Only the value's own enclosing brace is open (no further nesting yet); a
                // top-level `@` here means the brace was never closed (§4.B "Error recovery").
                Some('@') if depth == 1 => {
                    return Err(BibtexError::error(line, col, "unterminated braced string"))
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
                None => {
                    return Err(BibtexError::error(line, col, "unterminated braced string"))
                }
            }
        }
        Ok(normalize_whitespace(&raw).unwrap_or(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_entry() {
        let src = r#"@article{smith2024,
            author = {Smith, J.},
            title = {Quantum},
            journal = {Nature},
            year = 2024,
            doi = {10.1038/x}
        }"#;
        let outcome = parse_str(src);
        assert!(!outcome.has_errors());
        assert_eq!(outcome.entries.len(), 1);
        let e = &outcome.entries[0];
        assert_eq!(e.key, "smith2024");
        assert_eq!(e.entry_type, "article");
        assert_eq!(e.fields.year, Some(2024));
        assert_eq!(e.fields.doi.as_deref(), Some("10.1038/x"));
    }

    #[test]
    fn resolves_string_macros_and_month_defaults() {
        let src = r#"
            @string{ACM = "Association for Computing Machinery"}
            @article{a, publisher = ACM, month = jan}
        "#;
        let outcome = parse_str(src);
        assert!(!outcome.has_errors());
        let e = &outcome.entries[0];
        assert_eq!(e.fields.publisher.as_deref(), Some("Association for Computing Machinery"));
        assert_eq!(e.fields.month.as_deref(), Some("January"));
    }

    #[test]
    fn concatenates_values_with_hash() {
        let src = r#"@misc{a, title = "Foo " # "Bar"}"#;
        let outcome = parse_str(src);
        assert_eq!(outcome.entries[0].fields.title.as_deref(), Some("Foo Bar"));
    }

    #[test]
    fn synthesizes_missing_key_with_warning() {
        let src = r#"@misc{, title = {No key here}}"#;
        let outcome = parse_str(src);
        assert_eq!(outcome.entries[0].key, "entry_1");
        assert!(outcome.errors.iter().any(|e| !e.is_error()));
    }

    #[test]
    fn duplicate_keys_warn_but_both_parse() {
        let src = r#"
            @misc{dup, title = {One}}
            @misc{dup, title = {Two}}
        "#;
        let outcome = parse_str(src);
        assert_eq!(outcome.entries.len(), 2);
        assert!(outcome.errors.iter().any(|e| !e.is_error()));
    }

    #[test]
    fn unknown_entry_type_is_preserved_for_later_coercion() {
        let src = r#"@frobnicate{a, title = {X}}"#;
        let outcome = parse_str(src);
        assert_eq!(outcome.entries[0].entry_type, "frobnicate");
    }

    #[test]
    fn recovers_from_a_malformed_entry_and_continues() {
        let src = r#"
            @article{bad, title = {unterminated
            @misc{good, title = {This one is fine}}
        "#;
        let outcome = parse_str(src);
        assert!(outcome.has_errors());
        assert!(outcome.entries.iter().any(|e| e.key == "good"));
    }

    #[test]
    fn parens_as_entry_delimiters() {
        let src = r#"@misc(a, title = {Paren style})"#;
        let outcome = parse_str(src);
        assert!(!outcome.has_errors());
        assert_eq!(outcome.entries[0].fields.title.as_deref(), Some("Paren style"));
    }

    #[test]
    fn braced_value_collapses_internal_whitespace() {
        let src = "@misc{a, title = {Multi   word\ntitle}}";
        let outcome = parse_str(src);
        assert_eq!(outcome.entries[0].fields.title.as_deref(), Some("Multi word title"));
    }

    #[test]
    fn quoted_string_allows_balanced_braces_around_inner_quotes() {
        let src = r#"@misc{a, title = "A {"nested"} quote"}"#;
        let outcome = parse_str(src);
        assert!(!outcome.has_errors());
    }
}
