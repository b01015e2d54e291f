//! The quality rule registry (§4.D): a [`Rule`] inspects a single entry (optionally with the
//! whole collection for context) and contributes zero or more [`ValidationResult`]s.
use crate::entry::{Entry, EntryType, Severity, ValidationResult};
use crate::validate::validate_entry;

/// A rule's kind, used to dispatch and to group rules for reporting (§4.D "Rule").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    RequiredField,
    Format,
    Correlation,
    Consistency,
    Integrity,
    Custom,
}

/// A named, typed quality rule. Implementations may be field validators (already covered by
/// [`validate_entry`]), format checks, or correlation checks that look at more than one field
/// on the same entry (§4.D "Rule").
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> RuleKind;
    fn check(&self, entry: &Entry) -> Vec<ValidationResult>;
}

/// Runs [`validate::validate_entry`](crate::validate::validate_entry): field syntax/checksum
/// validators plus required-field groups.
pub struct FieldValidationRule;
impl Rule for FieldValidationRule {
    fn name(&self) -> &str {
        "field-validation"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::RequiredField
    }

    fn check(&self, entry: &Entry) -> Vec<ValidationResult> {
        validate_entry(entry)
    }
}

/// An `article` with `pages` set should also carry `volume` or `number` (§4.D "Correlation
/// rules").
pub struct ArticlePagesImplyVolumeRule;
impl Rule for ArticlePagesImplyVolumeRule {
    fn name(&self) -> &str {
        "article-pages-imply-volume"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Correlation
    }

    fn check(&self, entry: &Entry) -> Vec<ValidationResult> {
        if entry.entry_type == EntryType::Article
            && entry.fields.pages.is_some()
            && entry.fields.volume.is_none()
            && entry.fields.number.is_none()
        {
            vec![ValidationResult::invalid(
                "volume",
                None,
                Severity::Suggestion,
                "article has pages but no volume or number",
            )]
        } else {
            Vec::new()
        }
    }
}

/// A `book` with `isbn` set should also carry `publisher` (§4.D "Correlation rules").
pub struct BookIsbnImpliesPublisherRule;
impl Rule for BookIsbnImpliesPublisherRule {
    fn name(&self) -> &str {
        "book-isbn-implies-publisher"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Correlation
    }

    fn check(&self, entry: &Entry) -> Vec<ValidationResult> {
        if entry.entry_type == EntryType::Book && entry.fields.isbn.is_some() && entry.fields.publisher.is_none()
        {
            vec![ValidationResult::invalid(
                "publisher",
                None,
                Severity::Suggestion,
                "book has an ISBN but no publisher",
            )]
        } else {
            Vec::new()
        }
    }
}

/// A thesis entry (`phdthesis` or `mastersthesis`) requires `school` (§4.D "Correlation
/// rules").
pub struct ThesisRequiresSchoolRule;
impl Rule for ThesisRequiresSchoolRule {
    fn name(&self) -> &str {
        "thesis-requires-school"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Correlation
    }

    fn check(&self, entry: &Entry) -> Vec<ValidationResult> {
        let is_thesis = matches!(entry.entry_type, EntryType::Phdthesis | EntryType::Mastersthesis);
        if is_thesis && entry.fields.school.is_none() {
            vec![ValidationResult::invalid(
                "school",
                None,
                Severity::Suggestion,
                "thesis entry is missing school",
            )]
        } else {
            Vec::new()
        }
    }
}

/// A `misc` entry with `url` present but empty warns; an absent `url` is fine (§4.D
/// "Correlation rules").
pub struct MiscEmptyUrlWarnsRule;
impl Rule for MiscEmptyUrlWarnsRule {
    fn name(&self) -> &str {
        "misc-empty-url-warns"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Correlation
    }

    fn check(&self, entry: &Entry) -> Vec<ValidationResult> {
        if entry.entry_type == EntryType::Misc && entry.fields.url.as_deref().is_some_and(str::is_empty) {
            vec![ValidationResult::invalid(
                "url",
                Some(String::new()),
                Severity::Warning,
                "misc entry has an empty url field",
            )]
        } else {
            Vec::new()
        }
    }
}

/// Runs a set of rules against a single entry, in registration order. A disabled set is
/// skipped entirely during evaluation (§4.D "Rule set").
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    enabled: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new(), enabled: true }
    }

    /// The default rule set: field validation plus the correlation rules shipped with the
    /// engine (§4.D).
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.register(FieldValidationRule);
        set.register(ArticlePagesImplyVolumeRule);
        set.register(BookIsbnImpliesPublisherRule);
        set.register(ThesisRequiresSchoolRule);
        set.register(MiscEmptyUrlWarnsRule);
        set
    }

    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn run(&self, entry: &Entry) -> Vec<ValidationResult> {
        if !self.enabled {
            return Vec::new();
        }
        self.rules.iter().flat_map(|r| r.check(entry)).collect()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, Fields};

    #[test]
    fn standard_rule_set_flags_missing_required_fields() {
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Article, Fields::default());
        let results = RuleSet::standard().run(&entry);
        assert!(!results.is_empty());
    }

    #[test]
    fn disabled_rule_set_reports_nothing() {
        let mut set = RuleSet::standard();
        set.set_enabled(false);
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Article, Fields::default());
        assert!(set.run(&entry).is_empty());
    }

    #[test]
    fn article_with_pages_and_no_volume_or_number_is_flagged() {
        let mut fields = Fields::default();
        fields.set("pages", "1--10");
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Article, fields);
        let results = ArticlePagesImplyVolumeRule.check(&entry);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn book_with_isbn_and_no_publisher_is_flagged() {
        let mut fields = Fields::default();
        fields.set("isbn", "978-0-306-40615-7");
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Book, fields);
        let results = BookIsbnImpliesPublisherRule.check(&entry);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn thesis_without_school_is_flagged() {
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Phdthesis, Fields::default());
        let results = ThesisRequiresSchoolRule.check(&entry);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn misc_with_empty_url_warns() {
        let mut fields = Fields::default();
        fields.set("url", "");
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Misc, fields);
        let results = MiscEmptyUrlWarnsRule.check(&entry);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Warning);
    }

    #[test]
    fn misc_with_absent_url_is_fine() {
        let entry = Entry::new(EntryKey::new("e").unwrap(), EntryType::Misc, Fields::default());
        assert!(MiscEmptyUrlWarnsRule.check(&entry).is_empty());
    }
}
