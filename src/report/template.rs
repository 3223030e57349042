// Template fragments - interpolation and conditionals over an explicit context
//
// Syntax:
//   {{ key }}                      HTML-escaped value
//   {{{ key }}}                    raw value
//   {{#if key}} .. {{else}} .. {{/if}}   nestable conditional

use crate::error::ReportError;
use crate::utils::escape_html;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

/// Fragment files making up a template directory
pub const FRAGMENTS: [&str; 5] = ["header", "suite", "test", "footer", "aborted"];

/// Template set shipped with the crate
pub const BUNDLED: [(&str, &str); 5] = [
    ("header", include_str!("../../templates/default/header.html")),
    ("suite", include_str!("../../templates/default/suite.html")),
    ("test", include_str!("../../templates/default/test.html")),
    ("footer", include_str!("../../templates/default/footer.html")),
    ("aborted", include_str!("../../templates/default/aborted.html")),
];

/// Template syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("{template}: unterminated tag at byte {offset}")]
    UnterminatedTag { template: String, offset: usize },

    #[error("{template}: unexpected tag '{tag}' at byte {offset}")]
    UnexpectedTag {
        template: String,
        tag: String,
        offset: usize,
    },

    #[error("{template}: '#if {key}' opened at byte {offset} is never closed")]
    UnclosedIf {
        template: String,
        key: String,
        offset: usize,
    },
}

/// A value visible to templates
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text, escaped by `{{ }}`
    Text(String),
    /// Markup produced by the renderer, never escaped
    Html(String),
    Count(usize),
    Flag(bool),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) | Value::Html(s) => !s.is_empty(),
            Value::Count(n) => *n > 0,
            Value::Flag(b) => *b,
        }
    }

    fn render(&self, raw: bool) -> String {
        match self {
            Value::Text(s) if raw => s.clone(),
            Value::Text(s) => escape_html(s),
            Value::Html(s) => s.clone(),
            Value::Count(n) => n.to_string(),
            Value::Flag(b) => b.to_string(),
        }
    }
}

/// Variables passed to one fragment render
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn text(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.set(key, Value::Text(value.to_string()))
    }

    pub fn html(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.set(key, Value::Html(value.into()))
    }

    pub fn count(&mut self, key: &str, value: usize) -> &mut Self {
        self.set(key, Value::Count(value))
    }

    pub fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.set(key, Value::Flag(value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(String),
    Var {
        key: String,
        raw: bool,
    },
    If {
        key: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

struct Frame {
    key: String,
    offset: usize,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

fn target<'a>(root: &'a mut Vec<Node>, stack: &'a mut [Frame]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => match frame.otherwise.as_mut() {
            Some(otherwise) => otherwise,
            None => &mut frame.then,
        },
        None => root,
    }
}

fn is_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// A parsed template fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source; `name` is used in error messages
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut pos = 0;

        while let Some(found) = source[pos..].find("{{") {
            let open = pos + found;
            if open > pos {
                target(&mut root, &mut stack).push(Node::Literal(source[pos..open].to_string()));
            }

            let raw = source[open..].starts_with("{{{");
            let (body_start, closer) = if raw { (open + 3, "}}}") } else { (open + 2, "}}") };
            let close = source[body_start..]
                .find(closer)
                .map(|i| body_start + i)
                .ok_or_else(|| TemplateError::UnterminatedTag {
                    template: name.to_string(),
                    offset: open,
                })?;
            let tag = source[body_start..close].trim();
            pos = close + closer.len();

            let unexpected = || TemplateError::UnexpectedTag {
                template: name.to_string(),
                tag: tag.to_string(),
                offset: open,
            };

            if raw {
                if !is_key(tag) {
                    return Err(unexpected());
                }
                target(&mut root, &mut stack).push(Node::Var {
                    key: tag.to_string(),
                    raw: true,
                });
            } else if let Some(key) = tag.strip_prefix("#if ") {
                let key = key.trim();
                if !is_key(key) {
                    return Err(unexpected());
                }
                stack.push(Frame {
                    key: key.to_string(),
                    offset: open,
                    then: Vec::new(),
                    otherwise: None,
                });
            } else if tag == "else" {
                match stack.last_mut() {
                    Some(frame) if frame.otherwise.is_none() => frame.otherwise = Some(Vec::new()),
                    _ => return Err(unexpected()),
                }
            } else if tag == "/if" {
                let frame = stack.pop().ok_or_else(unexpected)?;
                target(&mut root, &mut stack).push(Node::If {
                    key: frame.key,
                    then: frame.then,
                    otherwise: frame.otherwise.unwrap_or_default(),
                });
            } else if is_key(tag) {
                target(&mut root, &mut stack).push(Node::Var {
                    key: tag.to_string(),
                    raw: false,
                });
            } else {
                return Err(unexpected());
            }
        }

        if let Some(frame) = stack.pop() {
            return Err(TemplateError::UnclosedIf {
                template: name.to_string(),
                key: frame.key,
                offset: frame.offset,
            });
        }
        if pos < source.len() {
            root.push(Node::Literal(source[pos..].to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            nodes: root,
        })
    }

    /// Render with the given context. Missing keys render empty and are
    /// false in conditionals.
    pub fn render(&self, context: &Context) -> String {
        let mut out = String::new();
        self.render_nodes(&self.nodes, context, &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], context: &Context, out: &mut String) {
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::Var { key, raw } => match context.get(key) {
                    Some(value) => out.push_str(&value.render(*raw)),
                    None => trace!("{}: no value for '{}'", self.name, key),
                },
                Node::If {
                    key,
                    then,
                    otherwise,
                } => {
                    let truthy = context.get(key).is_some_and(Value::is_truthy);
                    self.render_nodes(if truthy { then } else { otherwise }, context, out);
                }
            }
        }
    }
}

/// The five fragments a report is assembled from
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub header: Template,
    pub suite: Template,
    pub test: Template,
    pub footer: Template,
    pub aborted: Template,
}

impl TemplateSet {
    /// Load `<fragment>.html` for every fragment from `dir`.
    ///
    /// Fails with a configuration error if `dir` is not a directory, or a
    /// fragment is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self, ReportError> {
        if !dir.is_dir() {
            return Err(ReportError::Configuration(format!(
                "no such template directory: {}",
                dir.display()
            )));
        }

        let set = Self::from_sources(|fragment| {
            let path = dir.join(format!("{}.html", fragment));
            std::fs::read_to_string(&path).map_err(|e| {
                ReportError::Configuration(format!(
                    "cannot read template {}: {}",
                    path.display(),
                    e
                ))
            })
        })?;
        debug!("Loaded templates from {}", dir.display());
        Ok(set)
    }

    /// The template set compiled into the binary
    pub fn bundled() -> Result<Self, ReportError> {
        Self::from_sources(|fragment| {
            BUNDLED
                .iter()
                .find(|(name, _)| *name == fragment)
                .map(|(_, source)| source.to_string())
                .ok_or_else(|| {
                    ReportError::Configuration(format!("no bundled template '{}'", fragment))
                })
        })
    }

    fn from_sources<F>(mut read: F) -> Result<Self, ReportError>
    where
        F: FnMut(&str) -> Result<String, ReportError>,
    {
        let mut load = |fragment: &str| -> Result<Template, ReportError> {
            let source = read(fragment)?;
            Template::parse(fragment, &source)
                .map_err(|e| ReportError::Configuration(e.to_string()))
        };

        Ok(Self {
            header: load("header")?,
            suite: load("suite")?,
            test: load("test")?,
            footer: load("footer")?,
            aborted: load("aborted")?,
        })
    }

    /// Write the bundled template set into `dir`, creating it if needed
    pub fn write_bundled(dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        for (fragment, source) in BUNDLED {
            std::fs::write(dir.join(format!("{}.html", fragment)), source)?;
        }
        Ok(())
    }
}
