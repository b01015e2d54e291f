//! Token extractors for citation key generation (§4.F): pull a single key component out of an
//! [`Entry`] for a given pattern token.
use crate::entry::Entry;

use super::sanitize::transliterate;

pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to",
    "with", "about", "after", "before", "between", "during", "through", "under", "over", "into",
    "onto",
];

fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect()
}

/// `{author}`/`{author:N}`: the first author's last name, optionally clamped to `N` characters.
pub fn extract_author(entry: &Entry, chars: Option<usize>, max_author_chars: usize) -> String {
    let authors = entry.authors();
    let Some(first) = authors.first() else { return "anonymous".to_owned() };

    if first.starts_with('{') && first.ends_with('}') && first.len() > 1 {
        let org = &first[1..first.len() - 1];
        let words: Vec<&str> = org.split_whitespace().collect();
        let acronym: String = words.iter().filter_map(|w| w.chars().next()).filter(|c| c.is_uppercase()).collect();
        return if !acronym.is_empty() {
            acronym.to_lowercase()
        } else {
            words.first().map(|w| w.to_lowercase()).unwrap_or_else(|| "org".to_owned())
        };
    }

    let last_name = if let Some((last, _)) = first.split_once(',') {
        last.trim().to_owned()
    } else {
        first.split_whitespace().last().unwrap_or("anonymous").to_owned()
    };

    let transliterated = transliterate(&last_name);
    let cleaned: String = transliterated.chars().filter(|c| c.is_ascii_alphabetic() || *c == '-').collect();
    let limit = chars.unwrap_or(max_author_chars);
    cleaned.chars().take(limit).collect()
}

/// `{authors}`/`{authors:N}`: the lowercase initial of up to `N` authors' last names.
pub fn extract_authors(entry: &Entry, count: Option<usize>) -> String {
    let mut authors = entry.authors();
    if let Some(count) = count {
        authors.truncate(count);
    }
    let mut initials = String::new();
    for author in &authors {
        let initial = if author.starts_with('{') && author.ends_with('}') && author.len() > 1 {
            author[1..author.len() - 1].split_whitespace().next().and_then(|w| w.chars().next())
        } else if let Some((last, _)) = author.split_once(',') {
            last.trim().chars().next()
        } else {
            author.split_whitespace().last().and_then(|w| w.chars().next())
        };
        if let Some(c) = initial {
            initials.push(c.to_ascii_lowercase());
        }
    }
    initials
}

/// `{year}`/`{year:2}`: full year, or its last two digits.
pub fn extract_year(entry: &Entry, digits: Option<usize>) -> String {
    let Some(year) = entry.fields.year else { return "nd".to_owned() };
    let year_str = year.to_string();
    match digits {
        Some(2) if year_str.len() >= 2 => year_str[year_str.len() - 2..].to_owned(),
        _ => year_str,
    }
}

/// `{title}`/`{title:N}`: the first significant (non-stopword, long-enough) word of the
/// title, optionally clamped to `N` characters.
pub fn extract_title(entry: &Entry, chars: Option<usize>, min_title_chars: usize) -> String {
    let Some(title) = &entry.fields.title else { return String::new() };
    let cleaned = clean_text(title);
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let chosen = words
        .iter()
        .find(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()) && w.len() >= min_title_chars)
        .or_else(|| words.first());
    match (chosen, chars) {
        (Some(w), Some(n)) => w.chars().take(n).collect(),
        (Some(w), None) => (*w).to_owned(),
        (None, _) => String::new(),
    }
}

/// `{word}`/`{word:N}`: the Nth significant (1-indexed) word of the title.
pub fn extract_word(entry: &Entry, position: Option<usize>, min_title_chars: usize) -> String {
    let Some(title) = &entry.fields.title else { return String::new() };
    let cleaned = clean_text(title);
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| {
            !STOPWORDS.contains(&w.to_lowercase().as_str())
                && w.len() >= min_title_chars
                && !w.chars().all(|c| c.is_ascii_digit())
        })
        .collect();
    match position {
        Some(p) if p > 0 && p <= words.len() => words[p - 1].to_owned(),
        _ => words.first().map(|w| (*w).to_owned()).unwrap_or_default(),
    }
}

/// `{journal}`/`{journal:N}`: first `N` characters of the journal name, or the first two words
/// joined if it looks like an acronym-style abbreviation (e.g. "IEEE Trans.").
pub fn extract_journal(entry: &Entry, chars: Option<usize>) -> String {
    let Some(journal) = &entry.fields.journal else { return String::new() };
    let cleaned = clean_text(journal);
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }
    if words.iter().take(3).all(|w| w.chars().all(|c| c.is_uppercase()) && w.len() <= 4) {
        return words.iter().take(2).map(|w| w.to_lowercase()).collect();
    }
    let joined: String = words.join("");
    match chars {
        Some(n) => joined.chars().take(n).collect(),
        None => joined.chars().take(4).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry_with(author: &str, year: &str, title: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("author", author);
        fields.set("year", year);
        fields.set("title", title);
        Entry::new(EntryKey::new("x").unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn extracts_last_name_from_comma_form() {
        let e = entry_with("Smith, John", "2024", "A Study of Widgets");
        assert_eq!(extract_author(&e, None, 20), "Smith");
    }

    #[test]
    fn extracts_last_name_from_natural_form() {
        let e = entry_with("John Smith", "2024", "A Study of Widgets");
        assert_eq!(extract_author(&e, None, 20), "Smith");
    }

    #[test]
    fn clamps_year_to_two_digits() {
        let e = entry_with("Smith, John", "2024", "Widgets");
        assert_eq!(extract_year(&e, Some(2)), "24");
    }

    #[test]
    fn title_skips_stopwords() {
        let e = entry_with("Smith, John", "2024", "The Quantum Mechanics of Widgets");
        assert_eq!(extract_title(&e, None, 3), "Quantum");
    }

    #[test]
    fn missing_author_falls_back_to_anonymous() {
        let e = entry_with("", "2024", "Widgets");
        assert_eq!(extract_author(&e, None, 20), "anonymous");
    }
}
