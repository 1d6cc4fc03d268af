//! Operator query parser using nom.
//!
//! Reads an existing search query back into a [`QueryRequest`], the inverse
//! of the composer. Used by `scout explain`.
//!
//! ```text
//! seo tips site:example.com intitle:"guide" -spam (a | b) "x" AROUND(3) "y"
//! ────┬─── ────────┬─────── ───────┬─────── ──┬── ──┬──  ─────────┬────────
//!     │            │               │          │     │             └── Around
//!     │            │               │          │     └── OrGroup
//!     │            │               │          └── Exclude
//!     │            │               └── InTitle
//!     │            └── Site
//!     └── Keywords (adjacent bare words merge)
//! ```
//!
//! Unknown `name:value` operators (e.g. `allintitle:`) are kept as keywords;
//! operator values that are parenthesised groups become custom tokens.

use chrono::NaiveDate;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, char, digit1, multispace0, multispace1, one_of},
    combinator::{map, map_opt, map_res, opt, recognize},
    sequence::{pair, preceded, terminated, tuple},
};

use crate::ast::*;
use crate::error::{ScoutError, ScoutResult};

/// Parse an operator query string.
pub fn parse(input: &str) -> ScoutResult<QueryRequest> {
    let mut fields: Vec<QueryField> = Vec::new();
    let mut words: Vec<&str> = Vec::new();

    let (mut rest, _) = ws(input)?;
    while !rest.is_empty() {
        let position = input.len() - rest.len();
        let (remaining, token) = parse_token(rest)
            .map_err(|e| ScoutError::parse(position, format!("Parse failed: {:?}", e)))?;

        match token {
            Token::Word(word) => words.push(word),
            Token::Field(field) => {
                flush_words(&mut words, &mut fields);
                fields.push(field);
            }
            Token::Dated(kind, text) => {
                flush_words(&mut words, &mut fields);
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map_err(|_| ScoutError::InvalidDate(text.to_string()))?;
                fields.push(match kind {
                    FieldKind::Before => QueryField::Before(date),
                    _ => QueryField::After(date),
                });
            }
        }

        let (remaining, _) = ws(remaining)?;
        rest = remaining;
    }
    flush_words(&mut words, &mut fields);

    Ok(fields.into_iter().collect())
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Field(QueryField),
    /// `before:` / `after:` with the unchecked date text.
    Dated(FieldKind, &'a str),
}

/// The value after `operator:`.
enum OperatorValue<'a> {
    Quoted(&'a str),
    Group,
    Bare(&'a str),
}

fn ws(input: &str) -> ScoutResult<(&str, &str)> {
    multispace0::<&str, nom::error::Error<&str>>(input)
        .map_err(|e| ScoutError::parse(0, format!("Parse failed: {:?}", e)))
}

fn flush_words(words: &mut Vec<&str>, fields: &mut Vec<QueryField>) {
    if !words.is_empty() {
        fields.push(QueryField::Keywords(words.join(" ")));
        words.clear();
    }
}

/// Parse one whitespace-delimited token.
fn parse_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(parse_around, Token::Field),
        map(parse_range, Token::Field),
        map(parse_group, |inner| Token::Field(or_group_field(inner))),
        map(parse_exclude, |v| Token::Field(QueryField::Exclude(v.to_string()))),
        parse_operator,
        map(parse_quoted, |v| Token::Field(QueryField::Exact(v.to_string()))),
        map(parse_word, Token::Word),
    ))(input)
}

/// Parse `"first" AROUND(n) "second"`.
fn parse_around(input: &str) -> IResult<&str, QueryField> {
    let (input, (first, _, distance, _, second)) = tuple((
        parse_quoted,
        multispace1,
        preceded(
            tag("AROUND("),
            terminated(map_res(digit1, |d: &str| d.parse::<u32>()), char(')')),
        ),
        multispace1,
        parse_quoted,
    ))(input)?;

    Ok((
        input,
        QueryField::Around {
            first: first.to_string(),
            second: second.to_string(),
            distance,
        },
    ))
}

/// Parse a numeric range: `$100..$500`, `10..20`.
fn parse_range(input: &str) -> IResult<&str, QueryField> {
    let (remaining, (currency, min, _, _, max)) = tuple((
        opt(parse_currency),
        parse_number,
        tag(".."),
        opt(parse_currency),
        parse_number,
    ))(input)?;
    at_boundary(input, remaining)?;

    Ok((
        remaining,
        QueryField::PriceRange {
            currency: currency.map(|c| c.to_string()),
            min,
            max,
        },
    ))
}

fn parse_currency(input: &str) -> IResult<&str, char> {
    one_of("$€£¥")(input)
}

fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

/// Parse a parenthesised group, returning the inner text.
///
/// Tracks nesting depth and ignores parentheses inside double quotes.
fn parse_group(input: &str) -> IResult<&str, &str> {
    let fail = || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char));
    if !input.starts_with('(') {
        return Err(fail());
    }

    let mut depth = 0usize;
    let mut in_quote = false;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    let end = i + c.len_utf8();
                    return Ok((&input[end..], &input[1..i]));
                }
            }
            _ => {}
        }
    }
    Err(fail())
}

/// Split group contents on top-level `|` into an or-group.
///
/// Groups written with anything else (e.g. `OR`) are kept whole as custom.
fn or_group_field(inner: &str) -> QueryField {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            '|' if !in_quote && depth == 0 => {
                terms.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(inner[start..].trim().to_string());

    if terms.len() > 1 {
        QueryField::OrGroup(terms)
    } else {
        QueryField::Custom(format!("({})", inner.trim()))
    }
}

/// Parse `-term` or `-"phrase"`. The value keeps its quotes.
fn parse_exclude(input: &str) -> IResult<&str, &str> {
    preceded(char('-'), alt((recognize(parse_quoted), parse_word)))(input)
}

/// Parse a known `operator:value`.
fn parse_operator(input: &str) -> IResult<&str, Token<'_>> {
    let start = input;
    let (input, kind) = map_opt(terminated(alpha1, char(':')), FieldKind::from_prefix)(input)?;
    let (input, value) = alt((
        map(parse_quoted, OperatorValue::Quoted),
        map(parse_group, |_| OperatorValue::Group),
        map(parse_word, OperatorValue::Bare),
    ))(input)?;

    let whole = &start[..start.len() - input.len()];
    let token = match (kind, value) {
        (_, OperatorValue::Group) => Token::Field(QueryField::Custom(whole.to_string())),
        (FieldKind::Before | FieldKind::After, OperatorValue::Quoted(v) | OperatorValue::Bare(v)) => {
            Token::Dated(kind, v)
        }
        (_, OperatorValue::Quoted(v) | OperatorValue::Bare(v)) => match QueryField::text(kind, v) {
            Some(field) => Token::Field(field),
            None => Token::Word(whole),
        },
    };
    Ok((input, token))
}

/// Parse `"..."`, returning the text between the quotes.
fn parse_quoted(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_while(|c| c != '"')(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, content))
}

fn parse_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Fail unless `remaining` starts at whitespace or the end of input.
fn at_boundary<'a>(input: &'a str, remaining: &'a str) -> IResult<&'a str, ()> {
    match remaining.chars().next() {
        None => Ok((remaining, ())),
        Some(c) if c.is_whitespace() => Ok((remaining, ())),
        Some(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Space,
        ))),
    }
}
