//! Template function table.
//!
//! Every template set the composer builds gets the same functions and
//! filters, registered by name. The table is filled once at startup and
//! read-only afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use tera::{Filter, Function, Tera, Value};

use crate::build::parallel::{span_class, variant_prefix};
use crate::build::paths::DATE_FORMAT;

/// A function shared between template sets.
#[derive(Clone)]
struct SharedFunction(Arc<dyn Function>);

impl Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// A filter shared between template sets.
#[derive(Clone)]
struct SharedFilter(Arc<dyn Filter>);

impl Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// Named template functions and filters.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, SharedFunction>,
    filters: HashMap<String, SharedFilter>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-ins: the `variant_class` function and the
    /// `simple_date` filter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_function("variant_class", variant_class);
        registry.register_filter("simple_date", simple_date);
        registry
    }

    /// Register a function. A later registration replaces an earlier one.
    pub fn register_function<F: Function + 'static>(&mut self, name: &str, function: F) {
        self.functions
            .insert(name.to_string(), SharedFunction(Arc::new(function)));
    }

    /// Register a filter. A later registration replaces an earlier one.
    pub fn register_filter<F: Filter + 'static>(&mut self, name: &str, filter: F) {
        self.filters
            .insert(name.to_string(), SharedFilter(Arc::new(filter)));
    }

    /// Every registered name, functions and filters together, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.functions
            .keys()
            .chain(self.filters.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Register everything into a template set.
    pub fn install(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, function.clone());
        }
        for (name, filter) in &self.filters {
            tera.register_filter(name, filter.clone());
        }
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

// =============================================================================
// Built-ins
// =============================================================================

/// Format a date as `YYYY-MM-DD`, or with the strftime `format` argument.
///
/// Accepts dates and RFC 3339 timestamps. An undated value renders as an
/// empty string.
fn simple_date(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let format = match args.get("format") {
        Some(Value::String(format)) => format.as_str(),
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "simple_date: `format` must be a string, got {other}"
            )));
        }
        None => DATE_FORMAT,
    };

    let text = match value {
        Value::Null => return Ok(Value::String(String::new())),
        Value::String(text) => text,
        other => {
            return Err(tera::Error::msg(format!(
                "simple_date: expected a date string, got {other}"
            )));
        }
    };

    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.date_naive()))
        .map_err(|e| tera::Error::msg(format!("simple_date: cannot parse '{text}': {e}")))?;

    let mut formatted = String::new();
    write!(formatted, "{}", date.format(format))
        .map_err(|_| tera::Error::msg(format!("simple_date: invalid format '{format}'")))?;

    Ok(Value::String(formatted))
}

/// Class names of parallel-content spans, for stylesheets.
///
/// `variant_class(variant=2, snippet=1)` is `belbo_v2-s1`. Without `snippet`
/// it is the prefix every span of that variant starts with (`belbo_v2-`).
fn variant_class(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let number = |key: &str| -> tera::Result<Option<usize>> {
        match args.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .filter(|n| *n > 0)
                .map(|n| Some(n as usize))
                .ok_or_else(|| {
                    tera::Error::msg(format!(
                        "variant_class: `{key}` must be a positive integer, got {value}"
                    ))
                }),
        }
    };

    let variant =
        number("variant")?.ok_or_else(|| tera::Error::msg("variant_class: missing `variant`"))?;
    let class = match number("snippet")? {
        Some(snippet) => span_class(variant, snippet),
        None => variant_prefix(variant),
    };

    Ok(Value::String(class))
}
