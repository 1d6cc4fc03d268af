//! # scout — search operator composer
//!
//! Turns structured input (keywords, site filters, date ranges, phrase
//! lists) into a single search engine query string, then into a search URL.
//!
//! ## Quick Example
//!
//! ```
//! use scout::prelude::*;
//!
//! let request = QueryRequest::new()
//!     .keywords("seo tips")
//!     .site("example.com")
//!     .or_group(["guide", "checklist"]);
//!
//! let composition = request.to_query();
//! assert_eq!(composition.query, "seo tips site:example.com (guide | checklist)");
//!
//! let url = LinkOpener::default().url(&composition.query).unwrap();
//! assert_eq!(
//!     url,
//!     "https://www.google.com/search?q=seo+tips+site%3Aexample.com+%28guide+%7C+checklist%29"
//! );
//! ```
//!
//! ## Operators
//!
//! | Field         | Token                         |
//! |---------------|-------------------------------|
//! | keywords      | `text`                        |
//! | site          | `site:example.com`            |
//! | intitle       | `intitle:"phrase"`            |
//! | inurl         | `inurl:"phrase"`              |
//! | filetype      | `filetype:pdf`                |
//! | exact         | `"phrase"`                    |
//! | exclude       | `-term`                       |
//! | or            | `(a \| b)`                    |
//! | before, after | `before:2024-01-31`           |
//! | related       | `related:example.com`         |
//! | around        | `"a" AROUND(3) "b"`           |
//! | cache         | `cache:example.com`           |
//! | range         | `$10..$20`                    |
//!
//! Invalid fields never abort composition: they are dropped and reported as
//! [`ComposeWarning`](error::ComposeWarning)s.

pub mod ast;
pub mod composer;
pub mod config;
pub mod error;
pub mod link;
pub mod parser;
pub mod usecase;
pub mod validator;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::composer::{Composition, ToQuery, compose};
    pub use crate::config::ScoutConfig;
    pub use crate::error::*;
    pub use crate::link::LinkOpener;
    pub use crate::parser::parse;
    pub use crate::usecase::{Inputs, UseCase};
}

/// Compose a request into a query string.
///
/// # Example
///
/// ```
/// use scout::ast::QueryRequest;
///
/// let c = scout::compose(&QueryRequest::new().site("not a domain!!"));
/// assert_eq!(c.query, "");
/// assert!(c.has_warnings());
/// ```
pub fn compose(request: &ast::QueryRequest) -> composer::Composition {
    composer::compose(request)
}

/// Parse an operator query string back into a request.
///
/// # Example
///
/// ```
/// let req = scout::parse("site:example.com \"nikola tesla\"").unwrap();
/// assert_eq!(req.len(), 2);
/// ```
pub fn parse(input: &str) -> Result<ast::QueryRequest, error::ScoutError> {
    parser::parse(input)
}
