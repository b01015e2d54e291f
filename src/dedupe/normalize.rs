//! Normalizers used before computing similarity scores (§4.E).
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static LATEX_ARG_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\{([^}]*)\}").expect("static regex"));
static LATEX_BARE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+").expect("static regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(jr|sr|iii|ii|iv)\.?\b").expect("static regex"));

fn expand_abbreviation(word: &str) -> &str {
    match word {
        "proc" => "proceedings",
        "conf" => "conference",
        "intl" => "international",
        "natl" => "national",
        "trans" => "transactions",
        "j" => "journal",
        other => other,
    }
}

/// Normalize a title for duplicate comparison: strip LaTeX markup, lowercase, drop
/// punctuation, expand common abbreviations, and collapse whitespace (§4.E).
pub fn normalize_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let stripped = LATEX_ARG_CMD.replace_all(title, "$1");
    let stripped = LATEX_BARE_CMD.replace_all(&stripped, "");
    let lower = stripped.to_lowercase();
    let no_punct = NON_WORD.replace_all(&lower, " ");
    let expanded: Vec<&str> = no_punct.split_whitespace().map(expand_abbreviation).collect();
    let joined = expanded.join(" ");
    WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

/// Normalize a single author name to a canonical `lastname initials` form, stripping
/// diacritics via Unicode NFKD decomposition (§4.E).
pub fn normalize_author(author: &str) -> String {
    if author.is_empty() {
        return String::new();
    }
    let decomposed: String = author.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let no_punct: String = decomposed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == ',' || *c == '.')
        .collect();

    let reordered = if let Some((last, first)) = no_punct.split_once(',') {
        format!("{} {}", first.trim(), last.trim())
    } else {
        no_punct
    };

    let no_suffix = SUFFIX.replace_all(&reordered, "");
    let lower = no_suffix.to_lowercase();
    let parts: Vec<&str> = lower.split_whitespace().collect();

    match parts.as_slice() {
        [] => String::new(),
        [single] => (*single).to_owned(),
        many => {
            let last = many.last().unwrap();
            let initials: Vec<String> =
                many[..many.len() - 1].iter().filter_map(|p| p.chars().next()).map(String::from).collect();
            format!("{} {}", last, initials.join(" "))
        }
    }
}

/// Approximates Unicode's "Mark, Nonspacing" general category without pulling in a full
/// Unicode property table: every NFKD combining diacritic used by author names falls in the
/// `U+0300..=U+036F` combining diacritical marks block.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Split an author-list field into normalized individual names (§4.E), handling `et al.` and
/// the literal `others` BibTeX convention.
pub fn normalize_author_list(authors: &str) -> Vec<String> {
    if authors.is_empty() {
        return Vec::new();
    }
    let raw_parts: Vec<&str> = if authors.contains(" and ") {
        authors.split(" and ").collect()
    } else if authors.matches(',').count() > 1 {
        authors.split(',').collect()
    } else {
        vec![authors]
    };

    let mut out = Vec::new();
    for part in raw_parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let lower = part.to_lowercase();
        if lower == "others" {
            out.push("et al".to_owned());
            continue;
        }
        if let Some(idx) = lower.find("et al") {
            let before = part[..idx].trim();
            if !before.is_empty() {
                let norm = normalize_author(before);
                if !norm.is_empty() {
                    out.push(norm);
                }
            }
            out.push("et al".to_owned());
            continue;
        }
        let norm = normalize_author(part);
        if !norm.is_empty() {
            out.push(norm);
        }
    }
    out
}

/// Normalize a DOI for index lookup: strip a `https://doi.org/`, `https://dx.doi.org/`, or
/// `doi:` prefix and lowercase (§4.E).
pub fn normalize_doi(doi: &str) -> String {
    let trimmed = doi.trim();
    let without_url = trimmed
        .strip_prefix("https://dx.doi.org/")
        .or_else(|| trimmed.strip_prefix("http://dx.doi.org/"))
        .or_else(|| trimmed.strip_prefix("https://doi.org/"))
        .or_else(|| trimmed.strip_prefix("http://doi.org/"))
        .unwrap_or(trimmed);
    let without_scheme = without_url
        .strip_prefix("doi:")
        .or_else(|| without_url.strip_prefix("DOI:"))
        .unwrap_or(without_url);
    without_scheme.to_lowercase()
}
