//! Recognized fields - the fixed, versioned set of attributes the pipeline extracts

use serde::{Deserialize, Serialize};

/// Version of the built-in recognized field set
///
/// Bump whenever a field is added, removed or changes kind, since prompts,
/// parsing and normalization all key off this set.
pub const FIELD_SET_VERSION: u32 = 1;

/// Canonical type a field normalizes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text, trimmed and unwrapped
    Text,

    /// Calendar date (ISO `YYYY-MM-DD`), or null when unparseable
    Date,
}

impl FieldKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
        }
    }
}

/// Definition of a single recognized field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical key, snake_case (e.g. `article_date`)
    pub name: String,

    /// Canonical type
    pub kind: FieldKind,

    /// One-line description used in extraction prompts
    pub description: String,

    /// Alternate key spellings backends are known to emit
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl FieldSpec {
    /// Create a text field
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            description: description.into(),
            aliases: Vec::new(),
        }
    }

    /// Create a date field
    pub fn date(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Date,
            description: description.into(),
            aliases: Vec::new(),
        }
    }

    /// Add alternate key spellings
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Whether this field normalizes to a date
    pub fn is_date(&self) -> bool {
        self.kind == FieldKind::Date
    }
}

/// The set of fields the pipeline knows how to request, parse and normalize
///
/// Order is significant: it is the order fields are listed in prompts and
/// reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<FieldSpec>,
}

impl FieldRegistry {
    /// Create a registry from explicit field definitions
    ///
    /// Later definitions with a name already present replace the earlier one.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut registry = Self { fields: Vec::new() };
        for field in fields {
            registry.register(field);
        }
        registry
    }

    /// The built-in news article field set (version [`FIELD_SET_VERSION`])
    pub fn news() -> Self {
        Self::new(vec![
            FieldSpec::text("headline", "Main headline or title of the article")
                .with_aliases(["title", "article_title"]),
            FieldSpec::date("article_date", "Date the article was published")
                .with_aliases(["published", "published_date", "publication_date", "publish_date"]),
            FieldSpec::date("date", "Date of the main event the article reports on")
                .with_aliases(["event_date"]),
            FieldSpec::text("summary", "Two or three sentence summary of the article")
                .with_aliases(["article_summary", "abstract"]),
            FieldSpec::text("entities", "Companies, people and organisations mentioned, comma separated")
                .with_aliases(["named_entities", "organizations", "companies"]),
            FieldSpec::text("author", "Author or byline of the article")
                .with_aliases(["byline", "writer"]),
            FieldSpec::text("publisher", "Publication or website that published the article")
                .with_aliases(["source", "publication"]),
            FieldSpec::text("location", "Primary geographic location the article concerns")
                .with_aliases(["place", "region", "country"]),
            FieldSpec::text("category", "Topic category such as earnings, merger, regulation or product")
                .with_aliases(["topic", "type"]),
            FieldSpec::text("sentiment", "Overall tone: positive, negative or neutral")
                .with_aliases(["tone"]),
        ])
    }

    /// Register a field, replacing any field of the same name in place
    pub fn register(&mut self, field: FieldSpec) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Look up a field by canonical name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a canonical name is recognized
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether a canonical name is registered as date-typed
    pub fn is_date(&self, name: &str) -> bool {
        self.get(name).is_some_and(FieldSpec::is_date)
    }

    /// All fields, in registry order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// All canonical names, in registry order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Resolve a requested field list against the registry
    ///
    /// Preserves request order and drops repeated names.
    ///
    /// # Errors
    /// Returns the first name that is not recognized.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<FieldSpec>, String> {
        let mut selected: Vec<FieldSpec> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            let spec = self.get(name).ok_or_else(|| name.to_string())?;
            if !selected.iter().any(|f| f.name == spec.name) {
                selected.push(spec.clone());
            }
        }
        Ok(selected)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::news()
    }
}
