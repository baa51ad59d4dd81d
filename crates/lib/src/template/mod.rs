//! Placeholder substitution for build scripts, config files and patches.
//!
//! Two placeholder syntaxes are supported, chosen per template:
//!
//! - [`TemplateSyntax::Braces`]: `{{name}}`, used for generated shell scripts
//!   and config files. Whitespace inside the braces is ignored.
//! - [`TemplateSyntax::At`]: `@name@`, used for unified-diff patch bodies so
//!   that `$`, `{` and `@@` hunk headers pass through untouched.
//!
//! Names are `[A-Za-z0-9_-]+`. Substitution is a single pass: replaced values
//! are never scanned again, and there is no nesting or conditional logic.
//! Choosing a different template is how callers branch.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use libforge_lib::template::{Template, TemplateSyntax};
//!
//! let template = Template::parse("greeting", "echo {{ who }}", TemplateSyntax::Braces).unwrap();
//! let mut bindings = BTreeMap::new();
//! bindings.insert("who".to_string(), "world".to_string());
//! assert_eq!(template.render(&bindings).unwrap(), "echo world");
//! ```

pub mod catalogue;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("template '{template}' references '{key}' but no value was bound")]
  MissingBinding { template: String, key: String },

  #[error("unclosed placeholder in template '{template}' at position {position}")]
  Unclosed { template: String, position: usize },

  #[error("malformed placeholder '{placeholder}' in template '{template}'")]
  Malformed { template: String, placeholder: String },

  #[error("no template named '{0}'")]
  UnknownTemplate(String),
}

/// Placeholder delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSyntax {
  /// `{{name}}`
  Braces,
  /// `@name@`
  At,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Literal(String),
  Placeholder(String),
}

/// Source of placeholder values.
pub trait Bindings {
  fn lookup(&self, key: &str) -> Option<&str>;
}

impl Bindings for BTreeMap<String, String> {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key).map(String::as_str)
  }
}

impl Bindings for HashMap<String, String> {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key).map(String::as_str)
  }
}

impl<B: Bindings + ?Sized> Bindings for &B {
  fn lookup(&self, key: &str) -> Option<&str> {
    (**self).lookup(key)
  }
}

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_name(s: &str) -> bool {
  !s.is_empty() && s.chars().all(is_name_char)
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  name: String,
  segments: Vec<Segment>,
}

impl Template {
  pub fn parse(name: impl Into<String>, text: &str, syntax: TemplateSyntax) -> Result<Self, TemplateError> {
    let name = name.into();
    let segments = match syntax {
      TemplateSyntax::Braces => parse_braces(&name, text)?,
      TemplateSyntax::At => parse_at(text),
    };
    Ok(Self { name, segments })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Keys referenced by this template.
  pub fn placeholders(&self) -> BTreeSet<&str> {
    self
      .segments
      .iter()
      .filter_map(|s| match s {
        Segment::Placeholder(key) => Some(key.as_str()),
        Segment::Literal(_) => None,
      })
      .collect()
  }

  /// Substitute every placeholder.
  ///
  /// Fails on the first unbound key in document order. Nothing is returned
  /// on failure, so a partially rendered script can never be written out.
  pub fn render(&self, bindings: &impl Bindings) -> Result<String, TemplateError> {
    let mut out = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => out.push_str(text),
        Segment::Placeholder(key) => {
          let value = bindings.lookup(key).ok_or_else(|| TemplateError::MissingBinding {
            template: self.name.clone(),
            key: key.clone(),
          })?;
          out.push_str(value);
        }
      }
    }
    Ok(out)
  }
}

/// Parse and render in one call.
pub fn render(name: &str, text: &str, syntax: TemplateSyntax, bindings: &impl Bindings) -> Result<String, TemplateError> {
  Template::parse(name, text, syntax)?.render(bindings)
}

fn push_literal(segments: &mut Vec<Segment>, literal: &mut String) {
  if !literal.is_empty() {
    segments.push(Segment::Literal(std::mem::take(literal)));
  }
}

fn parse_braces(template: &str, input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;
  let mut offset = 0;

  while let Some(open) = rest.find("{{") {
    literal.push_str(&rest[..open]);
    let after_open = &rest[open + 2..];
    let close = after_open.find("}}").ok_or_else(|| TemplateError::Unclosed {
      template: template.to_string(),
      position: offset + open,
    })?;

    let key = after_open[..close].trim();
    if !is_name(key) {
      return Err(TemplateError::Malformed {
        template: template.to_string(),
        placeholder: format!("{{{{{}}}}}", &after_open[..close]),
      });
    }

    push_literal(&mut segments, &mut literal);
    segments.push(Segment::Placeholder(key.to_string()));

    let consumed = open + 2 + close + 2;
    offset += consumed;
    rest = &rest[consumed..];
  }

  literal.push_str(rest);
  push_literal(&mut segments, &mut literal);
  Ok(segments)
}

/// `@name@` where the name is a valid identifier; any other `@` is literal.
fn parse_at(input: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;

  while let Some(open) = rest.find('@') {
    literal.push_str(&rest[..open]);
    let after_open = &rest[open + 1..];

    let candidate = after_open
      .find('@')
      .map(|close| &after_open[..close])
      .filter(|name| is_name(name));

    match candidate {
      Some(key) => {
        push_literal(&mut segments, &mut literal);
        segments.push(Segment::Placeholder(key.to_string()));
        rest = &after_open[key.len() + 1..];
      }
      None => {
        literal.push('@');
        rest = after_open;
      }
    }
  }

  literal.push_str(rest);
  push_literal(&mut segments, &mut literal);
  segments
}
