//! Query request data model.
//!
//! A [`QueryRequest`] is an ordered list of [`QueryField`] values. Each field
//! is one operator kind with its literal value(s); the composer turns it into
//! at most one token of the final query string.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The operator kinds, declared in canonical output order.
///
/// `Ord` follows declaration order, so sorting fields by kind yields the
/// order tokens appear in a composed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Keywords,
    Site,
    #[serde(rename = "intitle")]
    InTitle,
    #[serde(rename = "inurl")]
    InUrl,
    #[serde(rename = "filetype")]
    FileType,
    Exact,
    Exclude,
    OrGroup,
    Before,
    After,
    Related,
    Around,
    Cache,
    PriceRange,
    Custom,
}

impl FieldKind {
    /// Every kind, in canonical order.
    pub const ALL: [FieldKind; 15] = [
        FieldKind::Keywords,
        FieldKind::Site,
        FieldKind::InTitle,
        FieldKind::InUrl,
        FieldKind::FileType,
        FieldKind::Exact,
        FieldKind::Exclude,
        FieldKind::OrGroup,
        FieldKind::Before,
        FieldKind::After,
        FieldKind::Related,
        FieldKind::Around,
        FieldKind::Cache,
        FieldKind::PriceRange,
        FieldKind::Custom,
    ];

    /// The `name:` prefix for kinds written as `operator:value`.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            FieldKind::Site => Some("site"),
            FieldKind::InTitle => Some("intitle"),
            FieldKind::InUrl => Some("inurl"),
            FieldKind::FileType => Some("filetype"),
            FieldKind::Before => Some("before"),
            FieldKind::After => Some("after"),
            FieldKind::Related => Some("related"),
            FieldKind::Cache => Some("cache"),
            _ => None,
        }
    }

    /// Kinds whose value must look like a hostname.
    pub fn is_domain(&self) -> bool {
        matches!(self, FieldKind::Site | FieldKind::Related | FieldKind::Cache)
    }

    /// Look a kind up by its prefix (`site`, `intitle`, ...).
    pub fn from_prefix(prefix: &str) -> Option<FieldKind> {
        FieldKind::ALL
            .into_iter()
            .find(|k| k.prefix().is_some_and(|p| p.eq_ignore_ascii_case(prefix)))
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Keywords => write!(f, "keywords"),
            FieldKind::Site => write!(f, "site"),
            FieldKind::InTitle => write!(f, "intitle"),
            FieldKind::InUrl => write!(f, "inurl"),
            FieldKind::FileType => write!(f, "filetype"),
            FieldKind::Exact => write!(f, "exact"),
            FieldKind::Exclude => write!(f, "exclude"),
            FieldKind::OrGroup => write!(f, "or"),
            FieldKind::Before => write!(f, "before"),
            FieldKind::After => write!(f, "after"),
            FieldKind::Related => write!(f, "related"),
            FieldKind::Around => write!(f, "around"),
            FieldKind::Cache => write!(f, "cache"),
            FieldKind::PriceRange => write!(f, "range"),
            FieldKind::Custom => write!(f, "custom"),
        }
    }
}

/// One structured input field.
///
/// Serialized externally tagged, e.g. `{"site": "example.com"}` or
/// `{"around": {"first": "tesla", "second": "edison", "distance": 3}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryField {
    /// Plain search terms, emitted unescaped.
    Keywords(String),
    Site(String),
    #[serde(rename = "intitle")]
    InTitle(String),
    #[serde(rename = "inurl")]
    InUrl(String),
    #[serde(rename = "filetype")]
    FileType(String),
    /// Exact phrase, emitted as `"value"`.
    Exact(String),
    /// Term to exclude, emitted as `-value`.
    Exclude(String),
    /// Alternatives, emitted as `(a | b | c)`.
    OrGroup(Vec<String>),
    Before(NaiveDate),
    After(NaiveDate),
    Related(String),
    /// Proximity search: `"first" AROUND(distance) "second"`.
    Around {
        first: String,
        second: String,
        distance: u32,
    },
    Cache(String),
    /// Numeric range such as `$100..$500`.
    PriceRange {
        #[serde(default)]
        currency: Option<String>,
        min: f64,
        max: f64,
    },
    /// A raw token passed through verbatim.
    Custom(String),
}

impl QueryField {
    /// The operator kind of this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            QueryField::Keywords(_) => FieldKind::Keywords,
            QueryField::Site(_) => FieldKind::Site,
            QueryField::InTitle(_) => FieldKind::InTitle,
            QueryField::InUrl(_) => FieldKind::InUrl,
            QueryField::FileType(_) => FieldKind::FileType,
            QueryField::Exact(_) => FieldKind::Exact,
            QueryField::Exclude(_) => FieldKind::Exclude,
            QueryField::OrGroup(_) => FieldKind::OrGroup,
            QueryField::Before(_) => FieldKind::Before,
            QueryField::After(_) => FieldKind::After,
            QueryField::Related(_) => FieldKind::Related,
            QueryField::Around { .. } => FieldKind::Around,
            QueryField::Cache(_) => FieldKind::Cache,
            QueryField::PriceRange { .. } => FieldKind::PriceRange,
            QueryField::Custom(_) => FieldKind::Custom,
        }
    }

    /// Build a single-valued text field of the given kind.
    ///
    /// Returns `None` for kinds that don't carry one string.
    pub fn text(kind: FieldKind, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        Some(match kind {
            FieldKind::Keywords => QueryField::Keywords(value),
            FieldKind::Site => QueryField::Site(value),
            FieldKind::InTitle => QueryField::InTitle(value),
            FieldKind::InUrl => QueryField::InUrl(value),
            FieldKind::FileType => QueryField::FileType(value),
            FieldKind::Exact => QueryField::Exact(value),
            FieldKind::Exclude => QueryField::Exclude(value),
            FieldKind::Related => QueryField::Related(value),
            FieldKind::Cache => QueryField::Cache(value),
            FieldKind::Custom => QueryField::Custom(value),
            _ => return None,
        })
    }
}

/// An ordered set of fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRequest {
    pub fields: Vec<QueryField>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, field: QueryField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn keywords(self, text: impl Into<String>) -> Self {
        self.push(QueryField::Keywords(text.into()))
    }

    pub fn site(self, domain: impl Into<String>) -> Self {
        self.push(QueryField::Site(domain.into()))
    }

    pub fn intitle(self, phrase: impl Into<String>) -> Self {
        self.push(QueryField::InTitle(phrase.into()))
    }

    pub fn inurl(self, phrase: impl Into<String>) -> Self {
        self.push(QueryField::InUrl(phrase.into()))
    }

    pub fn filetype(self, ext: impl Into<String>) -> Self {
        self.push(QueryField::FileType(ext.into()))
    }

    pub fn exact(self, phrase: impl Into<String>) -> Self {
        self.push(QueryField::Exact(phrase.into()))
    }

    pub fn exclude(self, term: impl Into<String>) -> Self {
        self.push(QueryField::Exclude(term.into()))
    }

    pub fn or_group<S: Into<String>>(self, terms: impl IntoIterator<Item = S>) -> Self {
        let terms = terms.into_iter().map(Into::into).collect();
        self.push(QueryField::OrGroup(terms))
    }

    pub fn before(self, date: NaiveDate) -> Self {
        self.push(QueryField::Before(date))
    }

    pub fn after(self, date: NaiveDate) -> Self {
        self.push(QueryField::After(date))
    }

    pub fn related(self, domain: impl Into<String>) -> Self {
        self.push(QueryField::Related(domain.into()))
    }

    pub fn around(self, first: impl Into<String>, second: impl Into<String>, distance: u32) -> Self {
        self.push(QueryField::Around {
            first: first.into(),
            second: second.into(),
            distance,
        })
    }

    pub fn cache(self, url: impl Into<String>) -> Self {
        self.push(QueryField::Cache(url.into()))
    }

    pub fn price_range(self, currency: Option<&str>, min: f64, max: f64) -> Self {
        self.push(QueryField::PriceRange {
            currency: currency.map(str::to_string),
            min,
            max,
        })
    }

    pub fn custom(self, token: impl Into<String>) -> Self {
        self.push(QueryField::Custom(token.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryField> {
        self.fields.iter()
    }
}

impl FromIterator<QueryField> for QueryRequest {
    fn from_iter<I: IntoIterator<Item = QueryField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a QueryRequest {
    type Item = &'a QueryField;
    type IntoIter = std::slice::Iter<'a, QueryField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
