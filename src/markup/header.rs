//! Procedure header parsing: `name(p1, p2=default) -> result`.

use std::collections::HashSet;

use pest::{
    error::{Error, InputLocation},
    iterators::Pair,
    Parser,
};
use pest_derive::Parser;
use serde::Serialize;

#[derive(Parser)]
#[grammar = "markup/header.pest"]
struct HeaderParser;

/// One declared parameter. The default is copied verbatim, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub default: Option<String>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, default: Option<&str>) -> Self {
        Self {
            name: name.into(),
            default: default.map(str::to_string),
        }
    }

    /// `name` or `name=default`, as written in a signature.
    pub fn declaration(&self) -> String {
        match &self.default {
            Some(default) => format!("{}={}", self.name, default),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub params: Vec<ParameterSpec>,
    pub returns: Vec<String>,
}

/// Why a header was rejected, and the byte column inside the header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderError {
    pub reason: String,
    pub column: usize,
}

/// Parses the payload of a define-begin tag.
pub fn parse_header(text: &str) -> Result<Header, HeaderError> {
    let text = text.trim_end();
    let header = HeaderParser::parse(Rule::header, text)
        .map_err(|e| describe(&e))?
        .next()
        .ok_or_else(|| HeaderError {
            reason: "empty header".into(),
            column: 0,
        })?;

    let mut name = String::new();
    let mut params = Vec::new();
    let mut returns = Vec::new();
    for pair in header.into_inner() {
        match pair.as_rule() {
            Rule::ident => name = pair.as_str().to_string(),
            Rule::params => params = pair.into_inner().map(build_param).collect(),
            Rule::returns => {
                returns = pair.into_inner().map(|p| p.as_str().to_string()).collect()
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    if let Some(dup) = params.iter().find(|p: &&ParameterSpec| !seen.insert(p.name.as_str())) {
        return Err(HeaderError {
            reason: format!("duplicate parameter '{}'", dup.name),
            column: text.find('(').unwrap_or(0),
        });
    }
    let mut seen = HashSet::new();
    if let Some(dup) = returns.iter().find(|r: &&String| !seen.insert(r.as_str())) {
        return Err(HeaderError {
            reason: format!("duplicate return name '{dup}'"),
            column: text.find("->").unwrap_or(0),
        });
    }

    Ok(Header {
        name,
        params,
        returns,
    })
}

/// Parses the payload of an example tag: an optional bare name.
pub fn parse_example_name(text: &str) -> Result<Option<String>, HeaderError> {
    let text = text.trim_end();
    let example = HeaderParser::parse(Rule::example, text)
        .map_err(|e| describe(&e))?
        .next();
    Ok(example
        .and_then(|p| p.into_inner().find(|i| i.as_rule() == Rule::ident))
        .map(|p| p.as_str().to_string()))
}

fn build_param(pair: Pair<Rule>) -> ParameterSpec {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
    let default = inner.next().map(|p| p.as_str().trim());
    ParameterSpec::new(name, default)
}

fn describe(error: &Error<Rule>) -> HeaderError {
    let column = match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    HeaderError {
        reason: error.variant.message().to_string(),
        column,
    }
}
