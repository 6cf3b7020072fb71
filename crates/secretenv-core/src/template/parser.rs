use super::{Template, TemplateParser};
use crate::error::{EnvError, EnvResult};
use crate::readers::{SecretReader, VariableReader};
use crate::validation::SecretPath;

/// Parser for the built-in template syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Variable(String),
    Secret(Vec<PathPart>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPart {
    Text(String),
    Variable(String),
}

/// Template produced by `DefaultParser`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    nodes: Vec<Node>,
}

/// Tracks the file position of the body being parsed
struct Cursor<'a> {
    chars: &'a [char],
    line: Option<usize>,
    column: usize,
}

impl Cursor<'_> {
    fn error(&self, offset: usize, message: impl Into<String>) -> EnvError {
        EnvError::TemplateSyntax {
            line: self.line,
            column: self.column + offset,
            message: message.into(),
        }
    }

    fn starts_with(&self, at: usize, pair: [char; 2]) -> bool {
        self.chars.get(at) == Some(&pair[0]) && self.chars.get(at + 1) == Some(&pair[1])
    }

    /// Parse `${name}` starting at `at`, returning the name and the offset after `}`
    fn variable_ref(&self, at: usize) -> EnvResult<(String, usize)> {
        let start = at + 2;
        let end = (start..self.chars.len())
            .find(|&i| self.chars[i] == '}')
            .ok_or_else(|| self.error(at, "unclosed '${'"))?;
        let name: String = self.chars[start..end].iter().collect();
        if !is_identifier(&name) {
            return Err(self.error(start, format!("invalid variable name {:?}", name)));
        }
        Ok((name, end + 1))
    }

    /// Find the `}}` closing the `{{` at `at`, stepping over `${name}` groups
    fn closing_braces(&self, at: usize) -> EnvResult<usize> {
        let mut i = at + 2;
        while i < self.chars.len() {
            if self.starts_with(i, ['$', '{']) {
                i = self.variable_ref(i)?.1;
            } else if self.starts_with(i, ['}', '}']) {
                return Ok(i);
            } else {
                i += 1;
            }
        }
        Err(self.error(at, "unclosed '{{'"))
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl DefaultParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Compile `body` into a concrete `CompiledTemplate`
    pub fn compile(
        &self,
        body: &str,
        line: Option<usize>,
        column: usize,
    ) -> EnvResult<CompiledTemplate> {
        let chars: Vec<char> = body.chars().collect();
        let cursor = Cursor {
            chars: &chars,
            line,
            column,
        };

        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            if cursor.starts_with(i, ['{', '{']) {
                let close = cursor.closing_braces(i)?;

                let raw = &chars[i + 2..close];
                let leading = raw.iter().take_while(|c| c.is_whitespace()).count();
                let expr: String = raw.iter().collect::<String>().trim().to_string();
                if expr.is_empty() {
                    return Err(cursor.error(i, "empty expression"));
                }

                flush(&mut text, &mut nodes);
                if is_identifier(&expr) {
                    nodes.push(Node::Variable(expr));
                } else {
                    let parts = parse_secret_path(&cursor, i + 2 + leading, &expr)?;
                    nodes.push(Node::Secret(parts));
                }
                i = close + 2;
            } else if cursor.starts_with(i, ['$', '{']) {
                let (name, next) = cursor.variable_ref(i)?;
                flush(&mut text, &mut nodes);
                nodes.push(Node::Variable(name));
                i = next;
            } else {
                text.push(chars[i]);
                i += 1;
            }
        }
        flush(&mut text, &mut nodes);

        Ok(CompiledTemplate { nodes })
    }
}

fn flush(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

/// Split a secret path expression into literal and `${var}` parts
fn parse_secret_path(cursor: &Cursor<'_>, offset: usize, expr: &str) -> EnvResult<Vec<PathPart>> {
    let chars: Vec<char> = expr.chars().collect();
    let inner = Cursor {
        chars: &chars,
        line: cursor.line,
        column: cursor.column + offset,
    };

    let mut parts = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        if inner.starts_with(i, ['$', '{']) {
            let (name, next) = inner.variable_ref(i)?;
            if !text.is_empty() {
                parts.push(PathPart::Text(std::mem::take(&mut text)));
            }
            parts.push(PathPart::Variable(name));
            i = next;
        } else if chars[i] == '{' || chars[i] == '}' || chars[i].is_whitespace() {
            return Err(inner.error(i, format!("unexpected {:?} in secret path", chars[i])));
        } else {
            text.push(chars[i]);
            i += 1;
        }
    }
    if !text.is_empty() {
        parts.push(PathPart::Text(text));
    }

    if let [PathPart::Text(path)] = parts.as_slice() {
        SecretPath::parse(path).map_err(|e| inner.error(0, e.to_string()))?;
    }

    Ok(parts)
}

impl Template for CompiledTemplate {
    fn evaluate(&self, vars: &dyn VariableReader, secrets: &dyn SecretReader) -> EnvResult<String> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable(name) => out.push_str(&vars.read_variable(name)?),
                Node::Secret(parts) => {
                    let mut path = String::new();
                    for part in parts {
                        match part {
                            PathPart::Text(text) => path.push_str(text),
                            PathPart::Variable(name) => path.push_str(&vars.read_variable(name)?),
                        }
                    }
                    let path = SecretPath::parse(&path)?;
                    out.push_str(&secrets.read_secret(path.as_str())?);
                }
            }
        }
        Ok(out)
    }

    fn contains_secrets(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Secret(_)))
    }
}

impl TemplateParser for DefaultParser {
    fn parse(
        &self,
        body: &str,
        line: Option<usize>,
        column: usize,
    ) -> EnvResult<Box<dyn Template>> {
        Ok(Box::new(self.compile(body, line, column)?))
    }
}
