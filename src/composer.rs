//! Query composer.
//!
//! Converts a [`QueryRequest`] into a single search query string. Pure: no
//! I/O, no shared state, same input gives the same output.

use crate::ast::*;
use crate::error::ComposeWarning;
use crate::validator;

/// The outcome of composing a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    /// The finished query. Empty means "nothing to search".
    pub query: String,
    /// Fields that were skipped, and why.
    pub warnings: Vec<ComposeWarning>,
}

impl Composition {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Trait for turning structured input into a query string.
pub trait ToQuery {
    /// Compose the query, collecting warnings for skipped fields.
    fn to_query(&self) -> Composition;
}

impl ToQuery for QueryRequest {
    fn to_query(&self) -> Composition {
        compose(self)
    }
}

/// Compose a request into a query string.
///
/// Fields are emitted in canonical [`FieldKind`] order; fields of the same
/// kind keep their relative order. Tokens are joined with single spaces.
pub fn compose(request: &QueryRequest) -> Composition {
    let mut fields: Vec<&QueryField> = request.iter().collect();
    fields.sort_by_key(|f| f.kind());

    let mut tokens: Vec<String> = Vec::with_capacity(fields.len());
    let mut warnings = Vec::new();

    for field in fields {
        match field_token(field) {
            Ok(Some(token)) => {
                tracing::debug!(kind = %field.kind(), %token, "emit token");
                tokens.push(token);
            }
            Ok(None) => {}
            Err(warning) => {
                tracing::warn!(kind = %field.kind(), "{}", warning);
                warnings.push(warning);
            }
        }
    }

    let query = collapse_whitespace(&tokens.join(" "));
    if query.is_empty() {
        warnings.push(ComposeWarning::EmptyQuery);
    }

    Composition { query, warnings }
}

/// Produce the token for one field.
///
/// `Ok(None)` for blank fields, `Err` for fields that fail validation.
pub fn field_token(field: &QueryField) -> Result<Option<String>, ComposeWarning> {
    let kind = field.kind();
    let token = match field {
        QueryField::Keywords(text) | QueryField::Custom(text) => {
            validator::text(text).map(str::to_string)
        }
        QueryField::Site(value) | QueryField::Related(value) | QueryField::Cache(value) => {
            validator::domain(kind, value)?.map(|v| prefixed(kind, &v))
        }
        QueryField::InTitle(value) | QueryField::InUrl(value) => {
            validator::phrase(value).map(|v| prefixed(kind, &quote(&v)))
        }
        QueryField::FileType(ext) => validator::extension(ext).map(|v| prefixed(kind, v)),
        QueryField::Exact(phrase) => validator::phrase(phrase).map(|v| quote(&v)),
        QueryField::Exclude(term) => validator::text(term).map(|v| format!("-{}", v)),
        QueryField::OrGroup(terms) => or_group(terms),
        QueryField::Before(date) | QueryField::After(date) => {
            Some(prefixed(kind, &date.format("%Y-%m-%d").to_string()))
        }
        QueryField::Around {
            first,
            second,
            distance,
        } => validator::around_pair(first, second)?
            .map(|(a, b)| format!("{} AROUND({}) {}", quote(&a), distance, quote(&b))),
        QueryField::PriceRange { currency, min, max } => {
            validator::numeric_range(*min, *max)?;
            let symbol = currency.as_deref().map(str::trim).unwrap_or("");
            Some(format!("{symbol}{min}..{symbol}{max}"))
        }
    };
    Ok(token)
}

/// `(a | b | c)` for several terms, the bare term for one, nothing for none.
fn or_group(terms: &[String]) -> Option<String> {
    let terms: Vec<&str> = terms.iter().filter_map(|t| validator::text(t)).collect();
    match terms.as_slice() {
        [] => None,
        [single] => Some(single.to_string()),
        many => Some(format!("({})", many.join(" | "))),
    }
}

fn prefixed(kind: FieldKind, value: &str) -> String {
    match kind.prefix() {
        Some(prefix) => format!("{}:{}", prefix, value),
        None => value.to_string(),
    }
}

/// Wrap an already normalized phrase (see [`validator::phrase`]) in quotes.
fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_site() {
        let c = QueryRequest::new().site("example.com").to_query();
        assert_eq!(c.query, "site:example.com");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_exact_phrase() {
        let c = QueryRequest::new().exact("nikola tesla").to_query();
        assert_eq!(c.query, "\"nikola tesla\"");
    }

    #[test]
    fn test_intitle_and_inurl_are_quoted() {
        let c = QueryRequest::new()
            .intitle("write for us")
            .inurl("guest-post")
            .to_query();
        assert_eq!(c.query, "intitle:\"write for us\" inurl:\"guest-post\"");
    }

    #[test]
    fn test_exclude_and_filetype() {
        let c = QueryRequest::new().exclude("jobs").filetype(".pdf").to_query();
        assert_eq!(c.query, "filetype:pdf -jobs");
    }

    #[test]
    fn test_or_group() {
        let c = QueryRequest::new().or_group(["seo", "marketing"]).to_query();
        assert_eq!(c.query, "(seo | marketing)");

        let c = QueryRequest::new().or_group(["seo"]).to_query();
        assert_eq!(c.query, "seo");

        let c = QueryRequest::new().or_group(Vec::<String>::new()).to_query();
        assert_eq!(c.query, "");

        let c = QueryRequest::new().or_group([" seo ", "", "  "]).to_query();
        assert_eq!(c.query, "seo");
    }

    #[test]
    fn test_dates() {
        let c = QueryRequest::new()
            .after(date(2023, 1, 5))
            .before(date(2024, 12, 31))
            .to_query();
        assert_eq!(c.query, "before:2024-12-31 after:2023-01-05");
    }

    #[test]
    fn test_around() {
        let c = QueryRequest::new().around("tesla", "edison", 3).to_query();
        assert_eq!(c.query, "\"tesla\" AROUND(3) \"edison\"");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_around_with_one_term() {
        let c = QueryRequest::new().around("tesla", "", 3).to_query();
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings,
            vec![
                ComposeWarning::IncompleteOperatorPair {
                    operator: "AROUND",
                    present: "tesla".to_string(),
                },
                ComposeWarning::EmptyQuery,
            ]
        );
    }

    #[test]
    fn test_around_term_blank_after_quotes_stripped() {
        let c = QueryRequest::new().around("\"", "edison", 3).to_query();
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings,
            vec![
                ComposeWarning::IncompleteOperatorPair {
                    operator: "AROUND",
                    present: "edison".to_string(),
                },
                ComposeWarning::EmptyQuery,
            ]
        );
    }

    #[test]
    fn test_values_blank_after_normalizing() {
        for request in [
            QueryRequest::new().filetype("."),
            QueryRequest::new().intitle("\""),
            QueryRequest::new().inurl(" \"\" "),
            QueryRequest::new().exact("\"\""),
        ] {
            let c = request.to_query();
            assert_eq!(c.query, "");
            assert_eq!(c.warnings, vec![ComposeWarning::EmptyQuery]);
        }
    }

    #[test]
    fn test_inner_quotes_removed() {
        let c = QueryRequest::new().exact("say \"hi\" now").to_query();
        assert_eq!(c.query, "\"say hi now\"");

        let c = QueryRequest::new()
            .intitle("\"best\" tools")
            .around("a \"b\"", "c", 2)
            .to_query();
        assert_eq!(c.query, "intitle:\"best tools\" \"a b\" AROUND(2) \"c\"");
    }

    #[test]
    fn test_negative_price_range() {
        let c = QueryRequest::new().price_range(None, -5.0, 10.0).to_query();
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings,
            vec![
                ComposeWarning::InvalidNumericRange {
                    min: -5.0,
                    max: 10.0
                },
                ComposeWarning::EmptyQuery,
            ]
        );
    }

    #[test]
    fn test_invalid_domain_dropped() {
        let c = QueryRequest::new().site("not a domain!!").to_query();
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings[0],
            ComposeWarning::InvalidDomainFormat {
                field: FieldKind::Site,
                value: "not a domain!!".to_string(),
            }
        );
        assert!(c.is_empty());
    }

    #[test]
    fn test_invalid_domain_keeps_other_fields() {
        let c = QueryRequest::new()
            .keywords("seo")
            .related("bad domain")
            .to_query();
        assert_eq!(c.query, "seo");
        assert_eq!(c.warnings.len(), 1);
    }

    #[test]
    fn test_price_range() {
        let c = QueryRequest::new().price_range(Some("$"), 100.0, 499.5).to_query();
        assert_eq!(c.query, "$100..$499.5");

        let c = QueryRequest::new().price_range(None, 10.0, 20.0).to_query();
        assert_eq!(c.query, "10..20");
    }

    #[test]
    fn test_invalid_price_range() {
        let c = QueryRequest::new().price_range(None, 100.0, 10.0).to_query();
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings[0],
            ComposeWarning::InvalidNumericRange {
                min: 100.0,
                max: 10.0
            }
        );
    }

    #[test]
    fn test_empty_request() {
        let c = QueryRequest::new().to_query();
        assert_eq!(c.query, "");
        assert_eq!(c.warnings, vec![ComposeWarning::EmptyQuery]);
    }

    #[test]
    fn test_blank_fields_contribute_nothing() {
        let c = QueryRequest::new()
            .keywords("  ")
            .site("")
            .intitle("")
            .exact(" ")
            .exclude("")
            .keywords("seo")
            .to_query();
        assert_eq!(c.query, "seo");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_no_double_spaces() {
        let c = QueryRequest::new()
            .keywords("  seo    tips ")
            .exact("content   marketing")
            .to_query();
        assert_eq!(c.query, "seo tips \"content marketing\"");
        assert!(!c.query.contains("  "));
    }

    #[test]
    fn test_canonical_order() {
        let c = QueryRequest::new()
            .cache("example.com")
            .around("a", "b", 2)
            .related("example.org")
            .after(date(2020, 1, 1))
            .before(date(2021, 1, 1))
            .or_group(["x", "y"])
            .exclude("spam")
            .exact("phrase")
            .filetype("pdf")
            .inurl("blog")
            .intitle("guide")
            .site("example.net")
            .keywords("seo")
            .to_query();
        assert_eq!(
            c.query,
            "seo site:example.net intitle:\"guide\" inurl:\"blog\" filetype:pdf \"phrase\" \
             -spam (x | y) before:2021-01-01 after:2020-01-01 related:example.org \
             \"a\" AROUND(2) \"b\" cache:example.com"
        );
    }

    #[test]
    fn test_same_kind_keeps_caller_order() {
        let c = QueryRequest::new()
            .keywords("first")
            .site("example.com")
            .keywords("second")
            .to_query();
        assert_eq!(c.query, "first second site:example.com");
    }

    #[test]
    fn test_deterministic() {
        let req = QueryRequest::new()
            .keywords("seo")
            .site("bad domain")
            .or_group(["a", "b"]);
        let first = compose(&req);
        for _ in 0..5 {
            assert_eq!(compose(&req), first);
        }
    }

    #[test]
    fn test_custom_passthrough() {
        let c = QueryRequest::new()
            .custom("inurl:(ai | ml)")
            .keywords("allintitle:review")
            .to_query();
        assert_eq!(c.query, "allintitle:review inurl:(ai | ml)");
    }
}
