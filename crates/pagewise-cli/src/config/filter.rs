//! `--filter key=value` parsing.

use std::str::FromStr;

use pagewise_core::{NamedParams, ParamValue};

/// Errors produced while parsing a filter argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The argument had no `=` separator.
    #[error("expected `key=value`, got `{0}`")]
    MissingSeparator(String),

    /// The key was empty or not a valid placeholder name.
    #[error("invalid filter name `{0}`: use letters, digits and underscores")]
    InvalidName(String),
}

/// A single named query argument given on the command line.
///
/// Values are typed by their spelling: `null`, `true`/`false`, integers and
/// floats become the matching parameter type; anything else, or a value
/// wrapped in single quotes, is text.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub value: ParamValue,
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let (name, raw) = arg
            .split_once('=')
            .ok_or_else(|| FilterError::MissingSeparator(arg.to_owned()))?;

        let name = name.trim();
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(FilterError::InvalidName(name.to_owned()));
        }

        Ok(Self {
            name: name.to_owned(),
            value: parse_value(raw),
        })
    }
}

fn parse_value(raw: &str) -> ParamValue {
    if let Some(text) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return ParamValue::Text(text.to_owned());
    }

    match raw {
        "null" => ParamValue::Null,
        "true" => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .or_else(|_| raw.parse::<f64>().map(ParamValue::Float))
            .ok()
            .filter(|value| !matches!(value, ParamValue::Float(f) if !f.is_finite()))
            .unwrap_or_else(|| ParamValue::Text(raw.to_owned())),
    }
}

/// Collects filters into named parameters; later duplicates win.
pub fn to_params(filters: &[Filter]) -> NamedParams {
    filters
        .iter()
        .map(|filter| (filter.name.clone(), filter.value.clone()))
        .collect()
}
