//! [HDL](https://en.wikipedia.org/wiki/Hardware_description_language) code generation for
//! circuit netlists, targeting both [VHDL](https://en.wikipedia.org/wiki/VHDL) and
//! [Verilog](https://en.wikipedia.org/wiki/Verilog).
//!
//! hdlgen takes a [`Netlist`] of component instances connected by nets and turns every instance
//! into text in the chosen [`Dialect`]. Simple components are written straight into the enclosing
//! circuit; others become a stand-alone module that the circuit instantiates. A
//! [`CircuitGenerator`] drives the whole pass and collects the resulting files.
//!
//! Problems with individual instances (a missing attribute, a floating input) are reported to a
//! [`Reporter`] and the instance is skipped. Problems with the netlist itself, or generators that
//! break their contract, are bugs in the caller and panic with a descriptive message.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! hdlgen = "0.1"
//! ```
//!
//! # Examples
//!
//! ```rust
//! # fn main() -> Result<(), hdlgen::Error> {
//! use hdlgen::*;
//!
//! // Create a netlist, which owns all nets and components
//! let n = Netlist::new();
//!
//! // A 4-bit constant driving a bus
//! let bus = n.net(4);
//! n.component(
//!     ComponentKind::Constant,
//!     AttributeSet::new().with(Attribute::Value, 5i64),
//!     vec![End::whole(Direction::Output, bus)],
//! );
//!
//! // Generate VHDL
//! let mut log = DiagnosticLog::new();
//! let output = CircuitGenerator::new(Options::new(Dialect::Vhdl)).generate(&n, "main", &mut log)?;
//! assert!(output.circuit.lines.contains(&"   s_logisimBus0 <= X\"5\";".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! [`Netlist`]: ./netlist/struct.Netlist.html
//! [`Dialect`]: ./dialect/enum.Dialect.html
//! [`CircuitGenerator`]: ./circuit/struct.CircuitGenerator.html
//! [`Reporter`]: ./diagnostics/trait.Reporter.html

// Must be kept up-to-date with version in Cargo.toml
#![doc(html_root_url = "https://docs.rs/hdlgen/0.1.0")]

pub mod circuit;
mod code_writer;
pub mod declarations;
pub mod diagnostics;
pub mod dialect;
mod error;
pub mod generator;
pub mod generators;
pub mod line_buffer;
pub mod netlist;
pub mod runtime;
pub mod sim;
mod validation;

pub use circuit::*;
pub use code_writer::Error;
pub use diagnostics::{Diagnostic, DiagnosticLog, LogReporter, Reporter, Severity};
pub use dialect::Dialect;
pub use error::GenerateError;
pub use netlist::*;
