//! Preset registry.
//!
//! Each [`UseCase`] is a small static configuration: which inputs to ask
//! for, their defaults, and a builder that turns the inputs plus any fixed
//! field values into a [`QueryRequest`]. Every preset goes through the same
//! composer.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::ast::QueryRequest;
use crate::composer::{Composition, compose};
use crate::error::{ComposeWarning, ScoutError, ScoutResult};
use crate::validator;

/// How an input slot is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    /// A hostname, checked by the composer.
    Domain,
    /// Several values separated by `,`, `|` or newlines.
    List,
    /// `YYYY-MM-DD`.
    Date,
    /// `true`/`false`, `yes`/`no`, `1`/`0`, `on`/`off`.
    Flag,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::Text => write!(f, "text"),
            SlotKind::Domain => write!(f, "domain"),
            SlotKind::List => write!(f, "list"),
            SlotKind::Date => write!(f, "date"),
            SlotKind::Flag => write!(f, "flag"),
        }
    }
}

/// One input a preset asks for.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SlotKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

const fn slot(key: &'static str, label: &'static str, kind: SlotKind) -> Slot {
    Slot {
        key,
        label,
        kind,
        required: false,
        default: None,
    }
}

const fn required(key: &'static str, label: &'static str, kind: SlotKind) -> Slot {
    Slot {
        key,
        label,
        kind,
        required: true,
        default: None,
    }
}

const fn with_default(mut s: Slot, default: &'static str) -> Slot {
    s.default = Some(default);
    s
}

type Builder = fn(&Resolved, &mut Vec<ComposeWarning>) -> QueryRequest;

/// A named preset.
pub struct UseCase {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub slots: &'static [Slot],
    /// Inputs that produce a typical query, shown by `scout presets`.
    pub example: &'static [(&'static str, &'static str)],
    build: Builder,
}

impl std::fmt::Debug for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseCase")
            .field("id", &self.id)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Every preset, in menu order.
pub static REGISTRY: &[UseCase] = &[
    UseCase {
        id: "general",
        title: "General query builder",
        description: "Combine any operators and keywords.",
        slots: &[
            slot("keywords", "General keywords", SlotKind::Text),
            slot("site", "Site (e.g. example.com)", SlotKind::Domain),
            slot("intitle", "In title (phrase)", SlotKind::Text),
            slot("inurl", "In URL (phrase)", SlotKind::Text),
            slot("filetype", "File type (e.g. pdf)", SlotKind::Text),
            slot("exact", "Exact match phrase", SlotKind::Text),
            slot("exclude", "Exclude term", SlotKind::Text),
            slot("or", "OR terms", SlotKind::List),
            slot("before", "Before date", SlotKind::Date),
            slot("after", "After date", SlotKind::Date),
            slot("related", "Related site", SlotKind::Domain),
        ],
        example: &[("keywords", "seo tips"), ("site", "example.com"), ("or", "guide | checklist")],
        build: build_general,
    },
    UseCase {
        id: "indexing",
        title: "Find possible indexing issues",
        description: "Check how many pages of your site are indexed.",
        slots: &[required("domain", "Your website domain", SlotKind::Domain)],
        example: &[("domain", "yoursite.com")],
        build: |r, _| QueryRequest::new().site(r.get("domain")),
    },
    UseCase {
        id: "competitors",
        title: "Find and analyze your competitors",
        description: "Discover similar sites or competitors targeting your keywords.",
        slots: &[
            slot("domain", "Competitor domain (related:)", SlotKind::Domain),
            slot("keywords", "Keywords", SlotKind::Text),
            with_default(slot("intitle", "Use intitle: for keywords", SlotKind::Flag), "false"),
        ],
        example: &[("domain", "competitor.com"), ("keywords", "digital marketing"), ("intitle", "true")],
        build: build_competitors,
    },
    UseCase {
        id: "guest-posts",
        title: "Find guest post opportunities",
        description: "Find sites in your niche that accept guest contributions.",
        slots: &[
            required("niche", "Your niche or keywords", SlotKind::Text),
            with_default(
                required("phrases", "Guest post phrases", SlotKind::List),
                "write for us",
            ),
        ],
        example: &[("niche", "content marketing"), ("phrases", "write for us, guest post")],
        build: |r, _| {
            QueryRequest::new()
                .keywords(r.get("niche"))
                .or_group(r.list("phrases").iter().filter_map(|p| quoted(p)))
        },
    },
    UseCase {
        id: "resource-pages",
        title: "Find resource page opportunities",
        description: "Identify pages that list external resources.",
        slots: &[required("topic", "Your topic", SlotKind::Text)],
        example: &[("topic", "SEO tools")],
        build: |r, _| {
            QueryRequest::new().keywords(r.get("topic")).or_group([
                "intitle:resources",
                "inurl:resource",
                "intitle:links",
                "inurl:links",
                "intitle:directory",
            ])
        },
    },
    UseCase {
        id: "unwanted-files",
        title: "Find files you don't want indexed",
        description: "Locate unintended file types indexed on your site.",
        slots: &[
            required("domain", "Your site domain", SlotKind::Domain),
            with_default(required("filetypes", "File types", SlotKind::List), "pdf, doc, xls"),
        ],
        example: &[("domain", "yoursite.com"), ("filetypes", "pdf, env, bak")],
        build: |r, _| {
            QueryRequest::new().site(r.get("domain")).or_group(
                r.list("filetypes")
                    .iter()
                    .filter_map(|ft| validator::extension(ft))
                    .map(|ft| format!("filetype:{}", ft)),
            )
        },
    },
    UseCase {
        id: "internal-links",
        title: "Find internal link opportunities",
        description: "Find pages on your site that could link to a target topic.",
        slots: &[
            required("site", "Your blog or site URL", SlotKind::Domain),
            required("keyword", "Target keyword or phrase", SlotKind::Text),
        ],
        example: &[("site", "yoursite.com/blog"), ("keyword", "content strategy")],
        build: |r, _| QueryRequest::new().site(r.get("site")).exact(r.get("keyword")),
    },
    UseCase {
        id: "listicles",
        title: "Find \"best\" listicles without your brand",
        description: "Identify best-of lists your brand could be added to.",
        slots: &[
            required("brand", "Your brand name", SlotKind::Text),
            required("topic", "Topic keyword", SlotKind::Text),
        ],
        example: &[("brand", "MyAwesomeTool"), ("topic", "project management software")],
        build: |r, _| {
            QueryRequest::new()
                .intitle("best")
                .exact(r.get("topic"))
                .exclude(quoted(r.get("brand")).unwrap_or_default())
        },
    },
    UseCase {
        id: "competitor-reviews",
        title: "Find sites that reviewed competitors",
        description: "Find review sites covering your competitors.",
        slots: &[required("brands", "Competitor brand names", SlotKind::List)],
        example: &[("brands", "Asana, Trello")],
        build: |r, _| {
            let brands: Vec<String> = r.list("brands").iter().filter_map(|b| quoted(b)).collect();
            let req = QueryRequest::new().keywords("allintitle:review");
            if brands.is_empty() {
                return req;
            }
            req.custom(format!("({})", brands.join(" OR ")))
        },
    },
    UseCase {
        id: "qa-sites",
        title: "Find Q&A questions to answer",
        description: "Discover forum questions related to your topics.",
        slots: &[
            required("topics", "Topic keywords", SlotKind::List),
            with_default(slot("platforms", "Q&A platforms", SlotKind::List), "quora.com, reddit.com"),
        ],
        example: &[("topics", "AI, machine learning")],
        build: build_qa_sites,
    },
    UseCase {
        id: "content-velocity",
        title: "Track competitor publishing speed",
        description: "Count competitor pages published within a timeframe.",
        slots: &[
            required("domain", "Competitor domain", SlotKind::Domain),
            slot("after", "Published after", SlotKind::Date),
            slot("before", "Published before", SlotKind::Date),
        ],
        example: &[("domain", "competitorblog.com"), ("after", "2024-01-01")],
        build: |r, _| {
            let mut req = QueryRequest::new().site(r.get("domain"));
            if let Some(date) = r.date("after") {
                req = req.after(date);
            }
            if let Some(date) = r.date("before") {
                req = req.before(date);
            }
            req
        },
    },
];

/// Look a preset up by id.
pub fn find(id: &str) -> Option<&'static UseCase> {
    REGISTRY.iter().find(|u| u.id.eq_ignore_ascii_case(id.trim()))
}

/// Look a preset up by id, failing with [`ScoutError::UnknownPreset`].
pub fn get(id: &str) -> ScoutResult<&'static UseCase> {
    find(id).ok_or_else(|| ScoutError::UnknownPreset(id.to_string()))
}

impl UseCase {
    pub fn slot(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == key)
    }

    /// Build and compose this preset's query.
    ///
    /// Unknown keys and malformed dates are errors. A blank required input is
    /// a [`ComposeWarning::MissingInput`] and yields an empty query.
    pub fn compose(&self, inputs: &Inputs) -> ScoutResult<Composition> {
        let resolved = self.resolve(inputs)?;

        let missing: Vec<ComposeWarning> = self
            .slots
            .iter()
            .filter(|s| s.required && resolved.is_blank(s))
            .map(|s| ComposeWarning::MissingInput {
                preset: self.id,
                input: s.key,
            })
            .collect();
        if !missing.is_empty() {
            tracing::warn!(preset = self.id, missing = missing.len(), "required inputs missing");
            let mut warnings = missing;
            warnings.push(ComposeWarning::EmptyQuery);
            return Ok(Composition {
                query: String::new(),
                warnings,
            });
        }

        let mut warnings = Vec::new();
        let request = (self.build)(&resolved, &mut warnings);
        tracing::debug!(preset = self.id, fields = request.len(), "built preset request");

        let mut composition = compose(&request);
        warnings.append(&mut composition.warnings);
        composition.warnings = warnings;
        Ok(composition)
    }

    /// Compose with the preset's example inputs.
    pub fn compose_example(&self) -> ScoutResult<Composition> {
        let inputs: Inputs = self.example.iter().copied().collect();
        self.compose(&inputs)
    }

    fn resolve(&self, inputs: &Inputs) -> ScoutResult<Resolved> {
        if let Some(key) = inputs.keys().find(|k| self.slot(k).is_none()) {
            return Err(ScoutError::UnknownInput {
                preset: self.id.to_string(),
                key: key.to_string(),
            });
        }

        let mut values = BTreeMap::new();
        let mut dates = BTreeMap::new();
        let mut flags = BTreeMap::new();
        for slot in self.slots {
            let value = match inputs.get(slot.key) {
                Some(v) if validator::text(v).is_some() => v.trim().to_string(),
                _ => slot.default.unwrap_or_default().to_string(),
            };
            match slot.kind {
                SlotKind::Date => {
                    if let Some(text) = validator::text(&value) {
                        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                            .map_err(|_| ScoutError::InvalidDate(text.to_string()))?;
                        dates.insert(slot.key, date);
                    }
                }
                SlotKind::Flag => {
                    let flag = parse_flag(&value)
                        .ok_or_else(|| ScoutError::InvalidInput(format!("{}={}", slot.key, value)))?;
                    flags.insert(slot.key, flag);
                }
                _ => {}
            }
            values.insert(slot.key, value);
        }
        Ok(Resolved {
            values,
            dates,
            flags,
        })
    }
}

/// Raw `key=value` inputs for a preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs(BTreeMap<String, String>);

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parse `key=value` pairs. A later pair overrides an earlier one.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> ScoutResult<Self> {
        let mut inputs = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ScoutError::InvalidInput(pair.to_string()))?;
            inputs.0.insert(key.trim().to_string(), value.to_string());
        }
        Ok(inputs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Inputs after defaults are applied and dates are checked.
pub struct Resolved {
    values: BTreeMap<&'static str, String>,
    dates: BTreeMap<&'static str, NaiveDate>,
    flags: BTreeMap<&'static str, bool>,
}

impl Resolved {
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        validator::list(self.get(key))
    }

    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.dates.get(key).copied()
    }

    fn is_blank(&self, slot: &Slot) -> bool {
        match slot.kind {
            SlotKind::List => self.list(slot.key).is_empty(),
            _ => validator::text(self.get(slot.key)).is_none(),
        }
    }
}

/// `"value"` with inner quotes removed; `None` when nothing is left.
fn quoted(value: &str) -> Option<String> {
    validator::phrase(value).map(|v| format!("\"{}\"", v))
}

/// Blank reads as off; anything outside the two word sets is rejected.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}

fn build_general(r: &Resolved, _: &mut Vec<ComposeWarning>) -> QueryRequest {
    let mut req = QueryRequest::new()
        .keywords(r.get("keywords"))
        .site(r.get("site"))
        .intitle(r.get("intitle"))
        .inurl(r.get("inurl"))
        .filetype(r.get("filetype"))
        .exact(r.get("exact"))
        .exclude(r.get("exclude"))
        .or_group(r.list("or"));
    if let Some(date) = r.date("before") {
        req = req.before(date);
    }
    if let Some(date) = r.date("after") {
        req = req.after(date);
    }
    req.related(r.get("related"))
}

fn build_competitors(r: &Resolved, _: &mut Vec<ComposeWarning>) -> QueryRequest {
    let req = QueryRequest::new().related(r.get("domain"));
    if r.flag("intitle") {
        req.intitle(r.get("keywords"))
    } else {
        req.keywords(r.get("keywords"))
    }
}

fn build_qa_sites(r: &Resolved, warnings: &mut Vec<ComposeWarning>) -> QueryRequest {
    let mut platforms = Vec::new();
    for value in r.list("platforms") {
        match validator::domain(crate::ast::FieldKind::Site, &value) {
            Ok(Some(domain)) => platforms.push(format!("site:{}", domain)),
            Ok(None) => {}
            Err(warning) => warnings.push(warning),
        }
    }

    let mut req = QueryRequest::new();
    match platforms.as_slice() {
        [] => {}
        [single] => req = req.keywords(single.as_str()),
        many => req = req.keywords(format!("({})", many.join(" OR "))),
    }
    req.custom(format!("inurl:({})", r.list("topics").join(" | ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(id: &str, pairs: &[(&str, &str)]) -> Composition {
        let inputs: Inputs = pairs.iter().copied().collect();
        get(id).unwrap().compose(&inputs).unwrap()
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids: Vec<&str> = REGISTRY.iter().map(|u| u.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), REGISTRY.len());
    }

    #[test]
    fn test_every_example_composes() {
        for preset in REGISTRY {
            let c = preset.compose_example().unwrap();
            assert!(!c.query.is_empty(), "{} example is empty", preset.id);
            assert!(c.warnings.is_empty(), "{} example warned: {:?}", preset.id, c.warnings);
        }
    }

    #[test]
    fn test_indexing() {
        assert_eq!(run("indexing", &[("domain", "yoursite.com")]).query, "site:yoursite.com");
    }

    #[test]
    fn test_competitors() {
        let c = run("competitors", &[("domain", "competitor.com"), ("keywords", "digital marketing")]);
        assert_eq!(c.query, "digital marketing related:competitor.com");

        let c = run(
            "competitors",
            &[("domain", "competitor.com"), ("keywords", "digital marketing"), ("intitle", "yes")],
        );
        assert_eq!(c.query, "intitle:\"digital marketing\" related:competitor.com");
    }

    #[test]
    fn test_guest_posts_default_phrase() {
        let c = run("guest-posts", &[("niche", "content marketing")]);
        assert_eq!(c.query, "content marketing \"write for us\"");

        let c = run(
            "guest-posts",
            &[("niche", "content marketing"), ("phrases", "write for us, \"guest post\"")],
        );
        assert_eq!(c.query, "content marketing (\"write for us\" | \"guest post\")");
    }

    #[test]
    fn test_resource_pages() {
        let c = run("resource-pages", &[("topic", "SEO tools")]);
        assert_eq!(
            c.query,
            "SEO tools (intitle:resources | inurl:resource | intitle:links | inurl:links | intitle:directory)"
        );
    }

    #[test]
    fn test_unwanted_files_default_types() {
        let c = run("unwanted-files", &[("domain", "yoursite.com")]);
        assert_eq!(c.query, "site:yoursite.com (filetype:pdf | filetype:doc | filetype:xls)");
    }

    #[test]
    fn test_internal_links() {
        let c = run("internal-links", &[("site", "yoursite.com/blog"), ("keyword", "content strategy")]);
        assert_eq!(c.query, "site:yoursite.com/blog \"content strategy\"");
    }

    #[test]
    fn test_listicles() {
        let c = run("listicles", &[("brand", "MyAwesomeTool"), ("topic", "project management software")]);
        assert_eq!(
            c.query,
            "intitle:\"best\" \"project management software\" -\"MyAwesomeTool\""
        );
    }

    #[test]
    fn test_competitor_reviews() {
        let c = run("competitor-reviews", &[("brands", "Asana\nTrello")]);
        assert_eq!(c.query, "allintitle:review (\"Asana\" OR \"Trello\")");
    }

    #[test]
    fn test_qa_sites() {
        let c = run("qa-sites", &[("topics", "AI, machine learning")]);
        assert_eq!(
            c.query,
            "(site:quora.com OR site:reddit.com) inurl:(AI | machine learning)"
        );
    }

    #[test]
    fn test_qa_sites_invalid_platform_warns() {
        let c = run("qa-sites", &[("topics", "rust"), ("platforms", "stackoverflow.com, not valid!")]);
        assert_eq!(c.query, "site:stackoverflow.com inurl:(rust)");
        assert!(matches!(
            c.warnings.as_slice(),
            [ComposeWarning::InvalidDomainFormat { .. }]
        ));
    }

    #[test]
    fn test_content_velocity() {
        let c = run(
            "content-velocity",
            &[("domain", "competitorblog.com"), ("after", "2024-01-01"), ("before", "2024-03-31")],
        );
        assert_eq!(c.query, "site:competitorblog.com before:2024-03-31 after:2024-01-01");
    }

    #[test]
    fn test_missing_required_input() {
        let c = run("listicles", &[("topic", "crm software")]);
        assert_eq!(c.query, "");
        assert_eq!(
            c.warnings,
            vec![
                ComposeWarning::MissingInput {
                    preset: "listicles",
                    input: "brand",
                },
                ComposeWarning::EmptyQuery,
            ]
        );
    }

    #[test]
    fn test_invalid_domain_in_preset() {
        let c = run("indexing", &[("domain", "not a domain!!")]);
        assert_eq!(c.query, "");
        assert!(matches!(
            c.warnings[0],
            ComposeWarning::InvalidDomainFormat { .. }
        ));
    }

    #[test]
    fn test_unknown_input_and_preset() {
        let inputs = Inputs::new().set("nope", "x");
        let err = get("indexing").unwrap().compose(&inputs).unwrap_err();
        assert!(matches!(err, ScoutError::UnknownInput { .. }));

        assert!(matches!(get("missing"), Err(ScoutError::UnknownPreset(_))));
        assert!(find(" Indexing ").is_some());
    }

    #[test]
    fn test_unrecognized_flag_value() {
        let inputs = Inputs::new()
            .set("domain", "competitor.com")
            .set("keywords", "digital marketing")
            .set("intitle", "maybe");
        let err = get("competitors").unwrap().compose(&inputs).unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(ref pair) if pair == "intitle=maybe"));

        let c = run(
            "competitors",
            &[("domain", "competitor.com"), ("keywords", "digital marketing"), ("intitle", "OFF")],
        );
        assert_eq!(c.query, "digital marketing related:competitor.com");
    }

    #[test]
    fn test_quote_only_values_dropped() {
        let c = run("listicles", &[("brand", "\"\""), ("topic", "crm")]);
        assert_eq!(c.query, "intitle:\"best\" \"crm\"");

        let c = run("competitor-reviews", &[("brands", "Asana, \", Say \"Hi\"")]);
        assert_eq!(c.query, "allintitle:review (\"Asana\" OR \"Say Hi\")");

        let c = run("unwanted-files", &[("domain", "yoursite.com"), ("filetypes", "., .env")]);
        assert_eq!(c.query, "site:yoursite.com filetype:env");
    }

    #[test]
    fn test_bad_date_input() {
        let inputs = Inputs::new().set("domain", "example.com").set("after", "01/02/2024");
        let err = get("content-velocity").unwrap().compose(&inputs).unwrap_err();
        assert!(matches!(err, ScoutError::InvalidDate(_)));
    }

    #[test]
    fn test_parse_pairs() {
        let inputs = Inputs::parse_pairs(&["domain=example.com", "keywords=a=b"]).unwrap();
        assert_eq!(inputs.get("domain"), Some("example.com"));
        assert_eq!(inputs.get("keywords"), Some("a=b"));

        assert!(matches!(
            Inputs::parse_pairs(&["novalue"]),
            Err(ScoutError::InvalidInput(_))
        ));
        assert!(matches!(
            Inputs::parse_pairs(&["=x"]),
            Err(ScoutError::InvalidInput(_))
        ));
    }
}
