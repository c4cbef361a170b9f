//! Template rendering for generated HDL.
//!
//! Templates are plain text with `{{name}}` placeholders, filled from named pairs, and `{{1}}`..`{{n}}`
//! placeholders, filled from positional arguments. Every buffer knows its [`Dialect`], so the dialect
//! tokens (`{{assign}}`, `{{=}}`, `{{<}}`, `{{0b}}`, ...) are always available.
//!
//! A placeholder with no value is a bug in the generator that wrote the template, so rendering panics
//! instead of emitting broken HDL.

use crate::code_writer::INDENT;
use crate::dialect::Dialect;

use std::collections::BTreeMap;
use std::fmt;

/// Width of remark blocks, borders included.
pub const REMARK_WIDTH: usize = 80;

pub struct LineBuffer {
    dialect: Dialect,
    pairs: BTreeMap<String, String>,
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new(dialect: Dialect) -> LineBuffer {
        let pairs = dialect
            .keywords()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        LineBuffer {
            dialect,
            pairs,
            lines: Vec::new(),
        }
    }

    /// Makes `{{key}}` expand to `value` in every template added afterwards.
    pub fn pair(&mut self, key: &str, value: impl fmt::Display) -> &mut Self {
        self.pairs.insert(key.to_string(), value.to_string());
        self
    }

    /// Renders a (possibly multi-line) template using the named pairs.
    ///
    /// Multi-line templates are dedented to their least-indented line, and a leading empty line
    /// and trailing whitespace-only line are dropped, so raw string literals can be used as-is.
    pub fn add(&mut self, template: &str) -> &mut Self {
        self.add_args(template, &[])
    }

    /// Like [`LineBuffer::add`], additionally filling `{{1}}`..`{{n}}` from `args`.
    pub fn add_args(&mut self, template: &str, args: &[&dyn fmt::Display]) -> &mut Self {
        let args = args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
        for line in dedent(template) {
            let rendered = render(template, &line, &self.pairs, &args);
            self.lines.push(rendered.trim_end().to_string());
        }
        self
    }

    /// Appends lines verbatim, without placeholder substitution.
    pub fn add_lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn empty(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Appends a framed comment, word-wrapped to fit [`REMARK_WIDTH`] columns.
    pub fn add_remark_block(&mut self, text: &str) -> &mut Self {
        let lines = remark_block(self.dialect, text, 0);
        self.lines.extend(lines);
        self
    }

    /// Appends a single-line comment.
    pub fn add_remark_line(&mut self, text: &str) -> &mut Self {
        let line = format!("{}{}", self.dialect.line_comment(), text);
        self.lines.push(line);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Returns the lines, each non-empty one prefixed with `levels` indentation units.
    pub fn with_indent(self, levels: usize) -> Vec<String> {
        let prefix = INDENT.repeat(levels);
        self.lines
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    line
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect()
    }
}

/// Builds a remark block for `dialect`, indented by `indent` spaces.
pub fn remark_block(dialect: Dialect, text: &str, indent: usize) -> Vec<String> {
    let marker_len = dialect.remark_block_start().len();
    let text_width = REMARK_WIDTH - indent - 2 * marker_len;
    let prefix = " ".repeat(indent);
    let fill = dialect.remark_char().to_string();

    let mut lines = Vec::new();
    lines.push(format!(
        "{}{}{}",
        prefix,
        dialect.remark_block_start(),
        fill.repeat(REMARK_WIDTH - indent - marker_len)
    ));
    for row in textwrap::wrap(text, text_width) {
        lines.push(format!(
            "{}{}{:<width$}{}",
            prefix,
            dialect.remark_line_start(),
            row,
            dialect.remark_line_end(),
            width = text_width
        ));
    }
    lines.push(format!(
        "{}{}{}",
        prefix,
        fill.repeat(REMARK_WIDTH - indent - marker_len),
        dialect.remark_block_end()
    ));
    lines
}

/// Template lines with their common indentation removed, minus a leading empty line and a
/// trailing whitespace-only line.
fn dedent(template: &str) -> Vec<String> {
    let dedented = textwrap::dedent(template);
    let mut lines = dedented.split('\n').map(str::to_string).collect::<Vec<_>>();
    if lines.len() > 1 && lines[0].is_empty() {
        lines.remove(0);
    }
    if lines.len() > 1 && lines[lines.len() - 1].is_empty() {
        lines.pop();
    }
    lines
}

fn render(template: &str, line: &str, pairs: &BTreeMap<String, String>, args: &[String]) -> String {
    let mut ret = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find("{{") {
        let close = match rest[open + 2..].find("}}") {
            Some(close) => open + 2 + close,
            None => break,
        };
        // `{{{` opens a literal brace followed by a placeholder (Verilog concatenation).
        let open = if rest[open + 2..].starts_with('{') {
            open + 1
        } else {
            open
        };
        ret.push_str(&rest[..open]);

        let key = rest[open + 2..close].trim();
        let value = if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
            let index: usize = key.parse().unwrap_or(0);
            if index == 0 || index > args.len() {
                panic!("Cannot render template \"{}\" because it refers to positional argument {{{{{}}}}} but only {} argument(s) were given.", template, key, args.len());
            }
            &args[index - 1]
        } else {
            match pairs.get(key) {
                Some(value) => value,
                None => panic!("Cannot render template \"{}\" because placeholder {{{{{}}}}} has no value.", template, key),
            }
        };
        ret.push_str(value);
        rest = &rest[close + 2..];
    }
    ret.push_str(rest);
    ret
}
