//! Textual vocabulary of the two supported output dialects.
//!
//! Everything that differs between VHDL and Verilog at the token level lives here, so generators can
//! describe logic once and render it for either dialect.

use crate::declarations::Width;

use std::fmt;
use std::str::FromStr;

/// Name prefix of single-bit nets in the enclosing circuit.
pub const NET_NAME: &str = "s_logisimNet";
/// Name prefix of multi-bit nets in the enclosing circuit.
pub const BUS_NAME: &str = "s_logisimBus";

/// An output HDL dialect.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Dialect {
    /// Strongly-typed, declarative (`entity`/`architecture`).
    Vhdl,
    /// C-like, procedural (`module`/`always`).
    Verilog,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Vhdl => "VHDL",
            Dialect::Verilog => "Verilog",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Dialect::Vhdl => "vhd",
            Dialect::Verilog => "v",
        }
    }

    /// Text preceding a concurrent assignment.
    pub fn assign_preamble(self) -> &'static str {
        match self {
            Dialect::Vhdl => "",
            Dialect::Verilog => "assign ",
        }
    }

    /// Operator of a concurrent assignment, padded with spaces.
    pub fn assign_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " <= ",
            Dialect::Verilog => " = ",
        }
    }

    pub fn not_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => "NOT ",
            Dialect::Verilog => "~",
        }
    }

    pub fn and_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " AND ",
            Dialect::Verilog => " & ",
        }
    }

    pub fn or_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " OR ",
            Dialect::Verilog => " | ",
        }
    }

    pub fn xor_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " XOR ",
            Dialect::Verilog => " ^ ",
        }
    }

    pub fn equal_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " = ",
            Dialect::Verilog => " == ",
        }
    }

    pub fn not_equal_operator(self) -> &'static str {
        match self {
            Dialect::Vhdl => " /= ",
            Dialect::Verilog => " != ",
        }
    }

    pub fn bracket_open(self) -> &'static str {
        match self {
            Dialect::Vhdl => "(",
            Dialect::Verilog => "[",
        }
    }

    pub fn bracket_close(self) -> &'static str {
        match self {
            Dialect::Vhdl => ")",
            Dialect::Verilog => "]",
        }
    }

    pub fn line_comment(self) -> &'static str {
        match self {
            Dialect::Vhdl => "-- ",
            Dialect::Verilog => "// ",
        }
    }

    /// Fill character of remark block borders.
    pub fn remark_char(self) -> char {
        match self {
            Dialect::Vhdl => '-',
            Dialect::Verilog => '*',
        }
    }

    pub fn remark_block_start(self) -> &'static str {
        match self {
            Dialect::Vhdl => "---",
            Dialect::Verilog => "/**",
        }
    }

    pub fn remark_block_end(self) -> &'static str {
        match self {
            Dialect::Vhdl => "---",
            Dialect::Verilog => "**/",
        }
    }

    pub fn remark_line_start(self) -> &'static str {
        match self {
            Dialect::Vhdl => "-- ",
            Dialect::Verilog => "** ",
        }
    }

    pub fn remark_line_end(self) -> &'static str {
        match self {
            Dialect::Vhdl => " --",
            Dialect::Verilog => " **",
        }
    }

    /// Single-bit literal.
    pub fn bit(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Vhdl, false) => "'0'",
            (Dialect::Vhdl, true) => "'1'",
            (Dialect::Verilog, false) => "1'b0",
            (Dialect::Verilog, true) => "1'b1",
        }
    }

    /// Tokens available to every template rendered for this dialect, keyed by placeholder name.
    pub fn keywords(self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("assign", self.assign_preamble()),
            ("=", self.assign_operator()),
            ("<=", " <= "),
            ("==", self.equal_operator()),
            ("!=", self.not_equal_operator()),
            ("not", self.not_operator()),
            ("and", self.and_operator()),
            ("or", self.or_operator()),
            ("xor", self.xor_operator()),
            ("<", self.bracket_open()),
            (">", self.bracket_close()),
            ("0b", self.bit(false)),
            ("1b", self.bit(true)),
            ("--", self.line_comment()),
        ]
    }

    /// Renders `value` as a literal of exactly `width` bits.
    ///
    /// The value is split into `width / 4` hex digits preceded by `width % 4` single bits. Bits of
    /// `value` above `width` are ignored.
    pub fn constant_vector(self, value: u64, width: u32) -> String {
        assert!(
            width > 0 && width <= 64,
            "Cannot render a constant of {} bits; widths must be in 1..=64.",
            width
        );

        let hex_digit_count = width / 4;
        let single_bit_count = width % 4;

        let hex_digits = (0..hex_digit_count)
            .rev()
            .map(|digit| format!("{:X}", (value >> (digit * 4)) & 0xf))
            .collect::<String>();
        let single_bits = (0..single_bit_count)
            .rev()
            .map(|bit| {
                if (value >> (hex_digit_count * 4 + bit)) & 1 != 0 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect::<String>();

        match self {
            Dialect::Vhdl => {
                if hex_digit_count > 0 && single_bit_count > 0 {
                    format!("\"{}\"&X\"{}\"", single_bits, hex_digits)
                } else if hex_digit_count > 0 {
                    format!("X\"{}\"", hex_digits)
                } else if width == 1 {
                    format!("'{}'", single_bits)
                } else {
                    format!("\"{}\"", single_bits)
                }
            }
            Dialect::Verilog => {
                if hex_digit_count > 0 && single_bit_count > 0 {
                    format!(
                        "{{{}'b{}, {}'h{}}}",
                        single_bit_count,
                        single_bits,
                        hex_digit_count * 4,
                        hex_digits
                    )
                } else if hex_digit_count > 0 {
                    format!("{}'h{}", hex_digit_count * 4, hex_digits)
                } else {
                    format!("{}'b{}", single_bit_count, single_bits)
                }
            }
        }
    }

    /// Names bit `index` of the vector signal `name`.
    pub fn bit_of(self, name: &str, index: impl fmt::Display) -> String {
        format!(
            "{}{}{}{}",
            name,
            self.bracket_open(),
            index,
            self.bracket_close()
        )
    }

    /// Names bits `high` down to `low` of the vector signal `name`.
    pub fn slice_of(self, name: &str, high: u32, low: u32) -> String {
        match self {
            Dialect::Vhdl => format!("{}({} DOWNTO {})", name, high, low),
            Dialect::Verilog => format!("{}[{}:{}]", name, high, low),
        }
    }

    /// Concatenation, most significant part first.
    pub fn concat(self, parts: &[String]) -> String {
        match self {
            Dialect::Vhdl => parts.join("&"),
            Dialect::Verilog => format!("{{{}}}", parts.join(",")),
        }
    }

    /// `signal - 1`, evaluated as an unsigned vector of the signal's own width.
    pub fn decrement(self, signal: &str) -> String {
        match self {
            Dialect::Vhdl => format!("std_logic_vector(unsigned({}) - 1)", signal),
            Dialect::Verilog => format!("{} - 1", signal),
        }
    }

    /// An unsigned constant expression `value` sized to `width` bits. Both may be parameter expressions.
    pub fn unsigned_constant(self, value: &str, width: &str) -> String {
        match self {
            Dialect::Vhdl => format!("std_logic_vector(to_unsigned({}, {}))", value, width),
            Dialect::Verilog => value.to_string(),
        }
    }

    /// A boolean comparison usable as a select or `if` condition.
    pub fn equals(self, lhs: &str, rhs: &str) -> String {
        format!("{}{}{}", lhs, self.equal_operator(), rhs)
    }

    /// A concurrent assignment of `target` from the first value whose condition holds, or `default`.
    pub fn select(self, target: &str, choices: &[(String, String)], default: &str) -> Vec<String> {
        if choices.is_empty() {
            return vec![self.assignment(target, default)];
        }

        let mut lines = Vec::new();
        match self {
            Dialect::Vhdl => {
                let continuation = " ".repeat(target.len() + 4);
                for (index, (condition, value)) in choices.iter().enumerate() {
                    let lead = if index == 0 {
                        format!("{} <= ", target)
                    } else {
                        continuation.clone()
                    };
                    lines.push(format!("{}{} WHEN {} ELSE", lead, value, condition));
                }
                lines.push(format!("{}{};", continuation, default));
            }
            Dialect::Verilog => {
                let continuation = " ".repeat(target.len() + 10);
                for (index, (condition, value)) in choices.iter().enumerate() {
                    let lead = if index == 0 {
                        format!("assign {} = ", target)
                    } else {
                        continuation.clone()
                    };
                    lines.push(format!("{}({}) ? {} :", lead, condition, value));
                }
                lines.push(format!("{}{};", continuation, default));
            }
        }
        lines
    }

    /// A concurrent assignment statement.
    pub fn assignment(self, target: &str, source: &str) -> String {
        format!(
            "{}{}{}{};",
            self.assign_preamble(),
            target,
            self.assign_operator(),
            source
        )
    }

    /// A register update inside a clocked process.
    pub fn register_update(self, target: &str, source: &str) -> String {
        format!("{} <= {};", target, source)
    }

    /// A process evaluated on every rising edge of `clock`, optionally gated by a single-bit `enable`.
    pub fn clocked_process<S: AsRef<str>>(
        self,
        label: &str,
        clock: &str,
        enable: Option<&str>,
        body: &[S],
    ) -> Vec<String> {
        let mut inner = Vec::new();
        match enable {
            Some(enable) => {
                let (open, close) = match self {
                    Dialect::Vhdl => (
                        vec![format!("IF ({} = '1') THEN", enable)],
                        vec!["END IF;".to_string()],
                    ),
                    Dialect::Verilog => (
                        vec![format!("if ({})", enable), "begin".to_string()],
                        vec!["end".to_string()],
                    ),
                };
                inner.extend(open);
                inner.extend(indented(body));
                inner.extend(close);
            }
            None => inner.extend(body.iter().map(|line| line.as_ref().to_string())),
        }

        let mut lines = Vec::new();
        match self {
            Dialect::Vhdl => {
                lines.push(format!("{} : PROCESS ( {} ) IS", label, clock));
                lines.push("BEGIN".to_string());
                lines.push(format!("   IF (rising_edge({})) THEN", clock));
                lines.extend(indented(&indented(&inner)));
                lines.push("   END IF;".to_string());
                lines.push(format!("END PROCESS {};", label));
            }
            Dialect::Verilog => {
                lines.push(format!("always @(posedge {})", clock));
                lines.push(format!("begin : {}", label));
                lines.extend(indented(&inner));
                lines.push("end".to_string());
            }
        }
        lines
    }

    /// Sequential loop assigning `body` for `variable` from `from` down to `down_to` inclusive.
    ///
    /// Only valid inside a clocked process. Verilog needs the loop variable declared, so the
    /// loop is wrapped in a named block that declares it.
    pub fn descending_loop<S: AsRef<str>>(
        self,
        label: &str,
        variable: &str,
        from: &str,
        down_to: &str,
        body: &[S],
    ) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            Dialect::Vhdl => {
                lines.push(format!(
                    "{} : FOR {} IN {} DOWNTO {} LOOP",
                    label, variable, from, down_to
                ));
                lines.extend(indented(body));
                lines.push(format!("END LOOP {};", label));
            }
            Dialect::Verilog => {
                lines.push(format!("begin : {}", label));
                lines.push(format!("   integer {};", variable));
                lines.push(format!(
                    "   for ({v} = {}; {v} >= {}; {v} = {v} - 1)",
                    from,
                    down_to,
                    v = variable
                ));
                lines.push("   begin".to_string());
                lines.extend(indented(&indented(body)));
                lines.push("   end".to_string());
                lines.push("end".to_string());
            }
        }
        lines
    }

    /// The type of a signal or port of `width` bits.
    pub fn vector_type(self, width: &Width) -> String {
        match self {
            Dialect::Vhdl => {
                if width.is_single_bit() {
                    "std_logic".to_string()
                } else {
                    format!("std_logic_vector( {} DOWNTO 0 )", width.upper_bound())
                }
            }
            Dialect::Verilog => {
                if width.is_single_bit() {
                    String::new()
                } else {
                    format!("[{}:0] ", width.upper_bound())
                }
            }
        }
    }

    /// Declares a combinational signal.
    pub fn wire_declaration(self, name: &str, width: &Width) -> String {
        match self {
            Dialect::Vhdl => format!("SIGNAL {} : {};", name, self.vector_type(width)),
            Dialect::Verilog => format!("wire {}{};", self.vector_type(width), name),
        }
    }

    /// Declares a state-holding signal, all bits starting at zero. The start value only matters to
    /// simulators; synthesis tools treat it as an initial register state at best.
    pub fn register_declaration(self, name: &str, width: &Width) -> String {
        match self {
            Dialect::Vhdl => {
                let zero = if width.is_single_bit() {
                    "'0'"
                } else {
                    "(OTHERS => '0')"
                };
                format!("SIGNAL {} : {} := {};", name, self.vector_type(width), zero)
            }
            Dialect::Verilog => format!("reg {}{} = 0;", self.vector_type(width), name),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vhdl" | "vhd" => Ok(Dialect::Vhdl),
            "verilog" | "v" => Ok(Dialect::Verilog),
            _ => Err(format!(
                "unknown HDL dialect `{}`; expected `vhdl` or `verilog`",
                s
            )),
        }
    }
}

/// Name of net `id` in the enclosing circuit, given its width.
pub fn net_name(id: usize, width: u32) -> String {
    if width == 1 {
        format!("{}{}", NET_NAME, id)
    } else {
        format!("{}{}", BUS_NAME, id)
    }
}

fn indented<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.is_empty() {
                String::new()
            } else {
                format!("   {}", line)
            }
        })
        .collect()
}
