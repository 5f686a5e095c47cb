//! Python syntax lowering.
//!
//! Parses a module with tree-sitter and lowers every assignment statement into
//! a small crate-owned AST. Extraction and materialization only ever see
//! [`Assignment`] and [`Expr`]; the grammar's node kinds stay in this file.

use std::cell::Cell;
use tree_sitter::{Node, Parser};
use unicode_normalization::UnicodeNormalization;

/// Deepest expression nesting lowered. CPython's parser refuses sources
/// nested around 200 brackets deep, and lowering recurses once per level.
pub const MAX_NESTING: usize = 200;

/// Expression shapes the analyzer distinguishes. Everything else lowers to
/// [`Expr::Other`] carrying the grammar's node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal with escapes already processed
    Str(String),
    Integer(i128),
    Float(f64),
    Bool(bool),
    None,
    Name(String),
    Attribute { value: Box<Expr>, attr: String },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Call(Call),
    Other(String),
}

impl Expr {
    /// Dotted name for `a`, `a.b`, `a.b.c`; `None` for any other shape.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Name(name) => Some(name.clone()),
            Expr::Attribute { value, attr } => {
                value.dotted_name().map(|base| format!("{}.{}", base, attr))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub keywords: Vec<Keyword>,
    /// Count of positional arguments (ignored by extraction)
    pub positional: usize,
}

impl Call {
    /// Last keyword argument with the given name.
    pub fn keyword(&self, name: &str) -> Option<&Expr> {
        self.keywords
            .iter()
            .rev()
            .find(|k| k.name == name)
            .map(|k| &k.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

/// One assignment statement. `a = b = f()` has two targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub targets: Vec<Expr>,
    pub value: Expr,
    /// `x: T = value`
    pub annotated: bool,
    /// 1-based physical lines of the whole statement
    pub line_start: usize,
    pub line_end: usize,
}

/// Syntax failure with the 1-based line of the first offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {}", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

/// Create a parser for the Python grammar.
pub fn python_parser() -> Result<Parser, String> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| format!("Failed to set Python grammar: {}", e))?;
    Ok(parser)
}

/// Parse a module and lower its assignment statements in source order.
///
/// A tree containing any error or missing node is rejected as a whole.
pub fn parse_assignments(
    parser: &mut Parser,
    source: &str,
) -> Result<Vec<Assignment>, SyntaxError> {
    let tree = parser.parse(source, None).ok_or_else(|| SyntaxError {
        line: None,
        message: "parser produced no tree".to_string(),
    })?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(SyntaxError {
            line: first_error_line(root),
            message: "invalid syntax".to_string(),
        });
    }

    let lowering = Lowering::new(source);
    let mut assignments = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        // Python 2 statements the grammar still accepts
        if matches!(node.kind(), "print_statement" | "exec_statement") {
            return Err(SyntaxError {
                line: Some(node.start_position().row + 1),
                message: format!("unsupported Python 2 {}", node.kind().replace('_', " ")),
            });
        }
        if node.kind() == "assignment"
            && node.parent().map(|p| p.kind()) == Some("expression_statement")
        {
            if let Some(assignment) = lowering.assignment(node) {
                assignments.push(assignment);
            }
            if let Some(line) = lowering.too_deep.get() {
                return Err(SyntaxError {
                    line: Some(line),
                    message: "too many nested expressions".to_string(),
                });
            }
            continue;
        }
        // Reverse so the stack yields children in source order
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(assignments)
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

struct Lowering<'s> {
    source: &'s str,
    depth: Cell<usize>,
    /// Line where nesting first passed [`MAX_NESTING`]
    too_deep: Cell<Option<usize>>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            depth: Cell::new(0),
            too_deep: Cell::new(None),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn identifier(&self, node: Node) -> String {
        normalize_identifier(self.text(node))
    }

    fn assignment(&self, node: Node) -> Option<Assignment> {
        let annotated = node.child_by_field_name("type").is_some();
        let mut targets = Vec::new();
        let mut current = node;
        // `a = b = value` nests as assignment(a, assignment(b, value))
        let value = loop {
            targets.push(self.expr(current.child_by_field_name("left")?));
            let right = current.child_by_field_name("right")?;
            if right.kind() == "assignment" {
                current = right;
            } else {
                break self.expr(right);
            }
        };
        Some(Assignment {
            targets,
            value,
            annotated,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        })
    }

    fn expr(&self, node: Node) -> Expr {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            if self.too_deep.get().is_none() {
                self.too_deep.set(Some(node.start_position().row + 1));
            }
            return Expr::Other("nesting".to_string());
        }
        self.depth.set(depth + 1);
        let expr = self.lower(node);
        self.depth.set(depth);
        expr
    }

    fn lower(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.identifier(node)),
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "none" => Expr::None,
            "string" => self.string(node),
            "concatenated_string" => self.concatenated_string(node),
            "integer" => parse_integer(self.text(node)),
            "float" => parse_float(self.text(node)),
            "unary_operator" => self.unary(node),
            "attribute" => match (
                node.child_by_field_name("object"),
                node.child_by_field_name("attribute"),
            ) {
                (Some(object), Some(attr)) => Expr::Attribute {
                    value: Box::new(self.expr(object)),
                    attr: self.identifier(attr),
                },
                _ => Expr::Other("attribute".to_string()),
            },
            "list" => Expr::List(self.elements(node)),
            "tuple" => Expr::Tuple(self.elements(node)),
            "parenthesized_expression" => match self.named(node).into_iter().next() {
                Some(inner) => self.expr(inner),
                None => Expr::Other("parenthesized_expression".to_string()),
            },
            "call" => self.call(node),
            other => Expr::Other(other.to_string()),
        }
    }

    /// Named children without comments.
    fn named<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect()
    }

    fn elements(&self, node: Node) -> Vec<Expr> {
        self.named(node).into_iter().map(|c| self.expr(c)).collect()
    }

    fn call(&self, node: Node) -> Expr {
        let Some(function) = node.child_by_field_name("function") else {
            return Expr::Other("call".to_string());
        };
        let mut keywords = Vec::new();
        let mut positional = 0;
        if let Some(arguments) = node.child_by_field_name("arguments") {
            if arguments.kind() == "argument_list" {
                for arg in self.named(arguments) {
                    match arg.kind() {
                        "keyword_argument" => {
                            if let (Some(name), Some(value)) = (
                                arg.child_by_field_name("name"),
                                arg.child_by_field_name("value"),
                            ) {
                                keywords.push(Keyword {
                                    name: self.identifier(name),
                                    value: self.expr(value),
                                });
                            }
                        }
                        "list_splat" | "dictionary_splat" => {}
                        _ => positional += 1,
                    }
                }
            } else {
                // f(x for x in xs)
                positional = 1;
            }
        }
        Expr::Call(Call {
            callee: Box::new(self.expr(function)),
            keywords,
            positional,
        })
    }

    fn unary(&self, node: Node) -> Expr {
        let operator = node
            .child_by_field_name("operator")
            .map(|op| self.text(op))
            .unwrap_or("");
        let Some(argument) = node.child_by_field_name("argument") else {
            return Expr::Other("unary_operator".to_string());
        };
        match (operator, self.expr(argument)) {
            ("-", Expr::Integer(v)) => Expr::Integer(-v),
            ("-", Expr::Float(v)) => Expr::Float(-v),
            ("+", value @ (Expr::Integer(_) | Expr::Float(_))) => value,
            _ => Expr::Other("unary_operator".to_string()),
        }
    }

    fn string(&self, node: Node) -> Expr {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let start = children.iter().find(|c| c.kind() == "string_start");
        let end = children.iter().rev().find(|c| c.kind() == "string_end");
        let (Some(start), Some(end)) = (start, end) else {
            return Expr::Other("string".to_string());
        };

        let delimiter = self.text(*start);
        let prefix: String = delimiter
            .chars()
            .take_while(|c| *c != '"' && *c != '\'')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if prefix.contains('f') || prefix.contains('t') {
            return Expr::Other("f-string".to_string());
        }
        if prefix.contains('b') {
            return Expr::Other("bytes".to_string());
        }

        let body = &self.source[start.end_byte()..end.start_byte()];
        if prefix.contains('r') {
            Expr::Str(body.to_string())
        } else {
            Expr::Str(unescape(body))
        }
    }

    fn concatenated_string(&self, node: Node) -> Expr {
        let mut out = String::new();
        for part in self.named(node) {
            match self.expr(part) {
                Expr::Str(s) => out.push_str(&s),
                other @ Expr::Other(_) => return other,
                _ => return Expr::Other("concatenated_string".to_string()),
            }
        }
        Expr::Str(out)
    }
}

/// Identifiers compare after NFKC normalization, as in Python itself.
pub fn normalize_identifier(name: &str) -> String {
    if name.is_ascii() {
        name.to_string()
    } else {
        name.nfkc().collect()
    }
}

fn parse_integer(text: &str) -> Expr {
    if text.ends_with(&['j', 'J'][..]) {
        return Expr::Other("imaginary".to_string());
    }
    let digits: String = text
        .trim_end_matches(&['l', 'L'][..])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let lower = digits.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i128::from_str_radix(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i128::from_str_radix(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i128::from_str_radix(bin, 2)
    } else {
        lower.parse::<i128>()
    };
    match parsed {
        Ok(v) => Expr::Integer(v),
        Err(_) => Expr::Other("integer".to_string()),
    }
}

fn parse_float(text: &str) -> Expr {
    if text.ends_with(&['j', 'J'][..]) {
        return Expr::Other("imaginary".to_string());
    }
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    match cleaned.parse::<f64>() {
        // `1e999` overflows to infinity, which JSON cannot carry
        Ok(v) if v.is_finite() => Expr::Float(v),
        _ => Expr::Other("float".to_string()),
    }
}

/// Process backslash escapes of a non-raw string body. Unknown escapes are
/// kept verbatim, like Python does.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if let Some(ch) = u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                let code = if digits.len() == width {
                    u32::from_str_radix(&digits, 16).ok()
                } else {
                    None
                };
                match code.and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
