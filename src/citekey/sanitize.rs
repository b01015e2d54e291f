//! ASCII transliteration and citation-key sanitization (§4.F).
const REPLACEMENTS: &[(&str, &str)] = &[
    ("ä", "ae"), ("ö", "oe"), ("ü", "ue"), ("Ä", "Ae"), ("Ö", "Oe"), ("Ü", "Ue"),
    ("ß", "ss"), ("æ", "ae"), ("ø", "o"), ("å", "a"), ("Æ", "AE"), ("Ø", "O"), ("Å", "A"),
];

/// Transliterate common Unicode letters to ASCII, applying language-specific digraph
/// replacements before falling back to NFD decomposition + diacritic stripping (§4.F).
pub fn transliterate(text: &str) -> String {
    let mut s = text.to_owned();
    for (old, new) in REPLACEMENTS {
        s = s.replace(old, new);
    }
    use unicode_normalization::UnicodeNormalization;
    s.nfd().filter(|c| !('\u{0300}'..='\u{036f}').contains(c)).collect()
}

/// Sanitize a generated key fragment into a valid citation key shape: ASCII
/// letters/digits/underscore/hyphen, starting with a letter, clamped to `[min_length,
/// max_length]` (§4.F).
pub fn sanitize(raw: &str, min_length: usize, max_length: usize) -> String {
    if raw.is_empty() {
        return "unknown".to_owned();
    }
    let transliterated = transliterate(raw);
    let mut cleaned: String = transliterated
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();

    if !cleaned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        cleaned.insert(0, 'k');
    }
    if cleaned.len() < min_length {
        cleaned.push_str(&"_".repeat(min_length - cleaned.len()));
    } else if cleaned.len() > max_length {
        cleaned.truncate(max_length);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_common_digraphs() {
        assert_eq!(transliterate("Müller"), "Mueller");
        assert_eq!(transliterate("Straße"), "Strasse");
    }

    #[test]
    fn sanitize_replaces_invalid_characters_and_prefixes_digits() {
        assert_eq!(sanitize("2024smith", 3, 50), "k2024smith");
        assert_eq!(sanitize("smith 2024!", 3, 50), "smith_2024_");
    }

    #[test]
    fn sanitize_pads_short_keys_and_truncates_long_ones() {
        assert_eq!(sanitize("ab", 5, 50), "ab___");
        assert_eq!(sanitize("abcdefgh", 3, 5), "abcde");
    }
}
