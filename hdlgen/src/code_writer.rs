use std::io;

/// One level of indentation in emitted HDL.
pub const INDENT: &str = "   ";

/// Builds an indented sequence of lines.
///
/// Lines are kept in memory rather than streamed, as generated modules are assembled from pieces
/// (port lists, bodies, instantiations) that are produced out of order.
pub struct CodeWriter {
    lines: Vec<String>,
    current: Option<String>,
    indent_level: u32,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        CodeWriter {
            lines: Vec::new(),
            current: None,
            indent_level: 0,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) -> Result<(), Error> {
        if self.indent_level == 0 {
            return Err(Error::IndentUnderflow);
        }
        self.indent_level -= 1;
        Ok(())
    }

    pub fn append_indent(&mut self) {
        let current = self.current.get_or_insert_with(String::new);
        for _ in 0..self.indent_level {
            current.push_str(INDENT);
        }
    }

    pub fn append_newline(&mut self) {
        let line = self.current.take().unwrap_or_default();
        self.lines.push(line.trim_end().to_string());
    }

    pub fn append(&mut self, s: &str) {
        self.current.get_or_insert_with(String::new).push_str(s);
    }

    pub fn append_line(&mut self, s: &str) {
        if s.is_empty() {
            self.append_newline();
            return;
        }
        self.append_indent();
        self.append(s);
        self.append_newline();
    }

    /// Appends already-rendered lines at the current indentation level. Empty lines stay empty.
    pub fn append_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        for line in lines {
            self.append_line(line.as_ref());
        }
    }

    pub fn into_lines(mut self) -> Vec<String> {
        if self.current.is_some() {
            self.append_newline();
        }
        self.lines
    }
}

/// Writes finished lines, one per row, to `w`.
pub fn write_lines<W: io::Write, S: AsRef<str>>(w: &mut W, lines: &[S]) -> Result<(), Error> {
    for line in lines {
        writeln!(w, "{}", line.as_ref())?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("indentation level underflow")]
    IndentUnderflow,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lines_are_indented() {
        let mut w = CodeWriter::new();
        w.append_line("a");
        w.indent();
        w.append_line("b");
        w.append_line("");
        w.indent();
        w.append_indent();
        w.append("c");
        w.append(";");
        w.append_newline();
        w.unindent().unwrap();
        w.unindent().unwrap();
        w.append_line("d");

        assert_eq!(w.into_lines(), vec!["a", "   b", "", "      c;", "d"]);
    }

    #[test]
    fn unindent_underflow_is_an_error() {
        let mut w = CodeWriter::new();
        w.indent();
        assert!(w.unindent().is_ok());
        match w.unindent() {
            Err(Error::IndentUnderflow) => (),
            _ => panic!("expected indentation underflow"),
        }
    }

    #[test]
    fn write_lines_terminates_every_line() {
        let mut buf = Vec::new();
        write_lines(&mut buf, &["x", "", "y"]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "x\n\ny\n");
    }
}
