//! Defines the [`Frontmatter`] and [`Value`] types and the lenient parser
//! that splits a source document into metadata and body. Parsing never fails:
//! a document without a well-formed frontmatter block is treated as all body.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const FENCE: &str = "---";

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)\s*:\s*(.*?)\s*$").expect("frontmatter line pattern is valid")
});

/// A frontmatter value. Only scalar strings and lists of strings are ever
/// produced; an absent key is simply missing from [`Frontmatter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A scalar value with any matching surrounding quotes removed.
    Text(String),

    /// A bracketed list value, e.g. `[a, b, c]` or `["a", "b"]`.
    List(Vec<String>),
}

/// Metadata parsed from the frontmatter block of a source document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter(HashMap<String, Value>);

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` if it is a non-empty scalar.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Returns the value for `key` if it is a list.
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.0.get(key) {
            Some(Value::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A source document split into its [`Frontmatter`] and body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
}

/// Splits `input` into frontmatter and body. The document must start with
/// `---` and the block ends at the next line starting with `---`. If either
/// fence is missing, the metadata is empty and the body is the whole input.
pub fn parse(input: &str) -> Record<'_> {
    if !input.starts_with(FENCE) {
        return Record {
            frontmatter: Frontmatter::default(),
            body: input,
        };
    }

    let closing = format!("\n{}", FENCE);
    match input[FENCE.len()..].find(&closing) {
        None => Record {
            frontmatter: Frontmatter::default(),
            body: input,
        },
        Some(offset) => {
            let yaml_stop = FENCE.len() + offset;
            let body_start = yaml_stop + closing.len();
            Record {
                frontmatter: parse_block(&input[FENCE.len()..yaml_stop]),
                body: strip_leading_blank_lines(&input[body_start..]),
            }
        }
    }
}

fn parse_block(block: &str) -> Frontmatter {
    let mut fields = HashMap::new();
    for line in block.trim().lines() {
        // lines that aren't `key: value` are skipped
        if let Some(captures) = LINE_PATTERN.captures(line) {
            fields.insert(captures[1].to_owned(), parse_value(&captures[2]));
        }
    }
    Frontmatter(fields)
}

fn parse_value(raw: &str) -> Value {
    let value = unquote(raw);
    if value.starts_with('[') && value.ends_with(']') {
        if let Ok(items) = serde_yaml::from_str::<Vec<String>>(value) {
            return Value::List(items);
        }
    }
    Value::Text(value.to_owned())
}

fn unquote(raw: &str) -> &str {
    for quote in &['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(*quote) && raw.ends_with(*quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn strip_leading_blank_lines(body: &str) -> &str {
    let mut rest = body;
    while let Some(newline) = rest.find('\n') {
        if !rest[..newline].trim().is_empty() {
            break;
        }
        rest = &rest[newline + 1..];
    }
    if rest.trim().is_empty() {
        ""
    } else {
        rest
    }
}
