//! # Streaming BibTeX reader (§4.B "Streaming")
//! Parses a BibTeX document incrementally from a [`std::io::Read`] source without buffering the
//! whole file: input is read in chunks into a growing line buffer, and each time a balanced
//! top-level unit (`@word{...}` or `@word(...)`) is fully present, it is sliced out, parsed on
//! its own with [`crate::bibtex::parser::parse_str`], and the buffer is drained up to that
//! point. Memory use is bounded by the largest single entry in the document, not by the
//! document's total size.
use std::io::{self, BufRead};

use crate::bibtex::parser::{parse_str, ParseOutcome};
use crate::entry::KeyedEntry;
use crate::error::BibtexError;

/// Find the next complete top-level unit in `buf`, starting at or after `from`. Returns the
/// byte range `[start, end)` of the unit (including its leading `@` and trailing delimiter) if
/// one is fully buffered, or `None` if the buffer needs more data.
fn next_unit(buf: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = buf.as_bytes();
    let mut i = from;
    let start = loop {
        if i >= bytes.len() {
            return None;
        }
        if bytes[i] == b'@' {
            break i;
        }
        i += 1;
    };
    // Find the opening delimiter for this command.
    let mut j = start + 1;
    while j < bytes.len() && bytes[j] != b'{' && bytes[j] != b'(' {
        if bytes[j] == b'@' {
            // A bare `@command` with no delimiter (shouldn't occur in valid input); treat the
            // single `@` as its own unit so the caller can advance past it.
            return Some((start, j));
        }
        j += 1;
    }
    if j >= bytes.len() {
        return None; // command name not yet fully buffered
    }
    let opener = bytes[j];
    let closer = if opener == b'{' { b'}' } else { b')' };
    let mut depth: u32 = 0;
    let mut k = j;
    let mut in_quotes = false;
    while k < bytes.len() {
        let c = bytes[k];
        if c == b'"' && depth <= 1 {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if c == opener {
                depth += 1;
            } else if c == closer {
                depth -= 1;
                if depth == 0 {
                    return Some((start, k + 1));
                }
            }
        }
        k += 1;
    }
    None
}

/// Incrementally parses a BibTeX document from any [`BufRead`] source.
///
/// Each call to [`StreamingParser::next_entry`] returns the next parsed entry, or `None` once
/// the source is exhausted. Diagnostics raised while parsing an individual unit are returned
/// alongside it rather than deferred, since there is no final "whole-document" outcome to
/// attach them to.
pub struct StreamingParser<R> {
    reader: R,
    buf: String,
    pos: usize,
    eof: bool,
    pending: std::collections::VecDeque<Result<KeyedEntry, BibtexError>>,
}

impl<R: BufRead> StreamingParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            pos: 0,
            eof: false,
            pending: std::collections::VecDeque::new(),
        }
    }

    fn fill(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.buf.push_str(&line);
        Ok(true)
    }

    fn drain_consumed(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }

    /// Returns the next parsed entry, or `None` once the source is exhausted. Errors
    /// encountered while parsing a single buffered unit are yielded in place of an entry; the
    /// caller may continue calling this method afterward to resume from the next unit.
    pub fn next_entry(&mut self) -> io::Result<Option<Result<KeyedEntry, BibtexError>>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Ok(Some(item));
            }
            match next_unit(&self.buf, self.pos) {
                Some((start, end)) => {
                    let unit = &self.buf[start..end];
                    let ParseOutcome { entries, errors, .. } = parse_str(unit);
                    self.pos = end;
                    for entry in entries {
                        self.pending.push_back(Ok(entry));
                    }
                    for err in errors {
                        if err.is_error() {
                            self.pending.push_back(Err(err));
                        }
                    }
                    self.drain_consumed();
                    if self.pending.is_empty() {
                        continue;
                    }
                }
                None => {
                    if !self.fill()? {
                        // No more input; whatever remains in the buffer (a trailing comment,
                        // whitespace, or a genuinely truncated unit) is not a complete unit.
                        if !self.buf[self.pos..].trim().is_empty() {
                            let ParseOutcome { entries, errors, .. } =
                                parse_str(&self.buf[self.pos..]);
                            self.pos = self.buf.len();
                            self.drain_consumed();
                            for entry in entries {
                                self.pending.push_back(Ok(entry));
                            }
                            for err in errors {
                                if err.is_error() {
                                    self.pending.push_back(Err(err));
                                }
                            }
                        }
                        if self.pending.is_empty() {
                            return Ok(None);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn streams_entries_one_at_a_time() {
        let source = "@article{a, title = {First}}\n@article{b, title = {Second}}\n";
        let mut sp = StreamingParser::new(Cursor::new(source.as_bytes()));
        let first = sp.next_entry().unwrap().unwrap().unwrap();
        assert_eq!(first.key, "a");
        let second = sp.next_entry().unwrap().unwrap().unwrap();
        assert_eq!(second.key, "b");
        assert!(sp.next_entry().unwrap().is_none());
    }

    #[test]
    fn handles_an_entry_spanning_many_reads() {
        let source = "@article{multi,\n  title = {Spread\n  across\n  lines}\n}\n";
        let mut sp = StreamingParser::new(Cursor::new(source.as_bytes()));
        let entry = sp.next_entry().unwrap().unwrap().unwrap();
        assert_eq!(entry.key, "multi");
        assert!(entry.fields.title.as_deref().unwrap().contains("Spread"));
    }

    #[test]
    fn paren_delimited_entries_are_recognized() {
        let source = "@article(p, title = {Paren style})\n";
        let mut sp = StreamingParser::new(Cursor::new(source.as_bytes()));
        let entry = sp.next_entry().unwrap().unwrap().unwrap();
        assert_eq!(entry.key, "p");
    }
}
