//! Whole-circuit generation: every instance of a netlist, plus the module tying them together.

use crate::code_writer::{self, CodeWriter, Error};
use crate::declarations::Width;
use crate::diagnostics::Reporter;
use crate::dialect::Dialect;
use crate::generator::ir::{Assignment, Expr};
use crate::generator::{
    generate_inlined, generate_module, GeneratedModule, GeneratorSet, HdlGenerator, InstanceNames,
};
use crate::generators::{self, clock_tree_bus, DERIVED_CLOCK_INDEX, FPGA_CLOCK, FPGA_TICK, NR_OF_CLOCK_BITS};
use crate::line_buffer;
use crate::netlist::{ComponentKind, Netlist};
use crate::validation;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Sub-directory the enclosing circuit's module is written to.
pub const CIRCUIT_DIRECTORY: &str = "circuit";

/// Settings for one generation pass.
#[derive(Clone, Debug)]
pub struct Options {
    pub dialect: Dialect,
    /// Emit explanatory remark blocks and per-instance remark lines.
    pub remarks: bool,
    /// Named in the header remark of the circuit module.
    pub project_name: String,
}

impl Options {
    pub fn new(dialect: Dialect) -> Options {
        Options {
            dialect,
            remarks: true,
            project_name: "hdlgen".to_string(),
        }
    }
}

/// One generated source file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleFile {
    pub sub_directory: String,
    pub name: String,
    pub extension: &'static str,
    pub lines: Vec<String>,
}

impl ModuleFile {
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.sub_directory).join(format!("{}.{}", self.name, self.extension))
    }

    /// Writes this file below `root`, creating directories as needed, and returns its path.
    pub fn write_to(&self, root: &Path) -> Result<PathBuf, Error> {
        let path = root.join(self.relative_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&path)?;
        code_writer::write_lines(&mut file, &self.lines)?;
        Ok(path)
    }

    pub fn contents(&self) -> String {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        contents
    }
}

/// Everything generated for one circuit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CircuitOutput {
    /// The module instantiating and connecting all components.
    pub circuit: ModuleFile,
    /// One file per distinct component module, ordered by name.
    pub modules: Vec<ModuleFile>,
}

impl CircuitOutput {
    pub fn files(&self) -> impl Iterator<Item = &ModuleFile> {
        std::iter::once(&self.circuit).chain(self.modules.iter())
    }

    pub fn write_to(&self, root: &Path) -> Result<Vec<PathBuf>, Error> {
        self.files().map(|file| file.write_to(root)).collect()
    }
}

pub struct CircuitGenerator {
    options: Options,
    generators: GeneratorSet,
}

impl CircuitGenerator {
    pub fn new(options: Options) -> CircuitGenerator {
        CircuitGenerator::with_generators(options, generators::standard())
    }

    pub fn with_generators(options: Options, generators: GeneratorSet) -> CircuitGenerator {
        CircuitGenerator {
            options,
            generators,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Generates the circuit module named `circuit_name` and the modules of its components.
    ///
    /// Instances are visited in creation order. An instance that cannot be generated is reported and
    /// left out; the rest of the circuit is still generated.
    ///
    /// # Panics
    ///
    /// Panics if a connection point lies outside its net, or if two outputs drive the same net bit.
    pub fn generate<'a>(
        &self,
        netlist: &Netlist<'a>,
        circuit_name: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<CircuitOutput, Error> {
        let start = Instant::now();
        let dialect = self.options.dialect;

        validation::validate_netlist(netlist, circuit_name);

        let mut inlined = Vec::new();
        let mut instantiations = Vec::new();
        let mut modules = BTreeMap::new();
        // Clock trees whose clock generator was actually instantiated.
        let mut clock_trees = BTreeSet::new();
        let mut names = InstanceNames::new();

        for component in netlist.components() {
            let generator = match self.generators.get(component.kind) {
                Some(generator) => generator,
                None => {
                    reporter.error(format!(
                        "Cannot generate {}: no generator for {} components.",
                        component.describe(),
                        component.kind
                    ));
                    continue;
                }
            };

            match generator {
                HdlGenerator::Inlined(generator) => {
                    let lines = generate_inlined(
                        generator.as_ref(),
                        dialect,
                        netlist,
                        component,
                        circuit_name,
                        &mut names,
                        reporter,
                    );
                    if lines.is_empty() {
                        continue;
                    }
                    if self.options.remarks {
                        let remark = match component.attrs.label() {
                            Some(label) => format!("{}: {}", component.kind, label),
                            None => component.kind.to_string(),
                        };
                        inlined.push(format!("{}{}", dialect.line_comment(), remark));
                    }
                    inlined.extend(lines);
                    inlined.push(String::new());
                }
                HdlGenerator::Module(generator) => {
                    let module = match generate_module(
                        generator.as_ref(),
                        dialect,
                        netlist,
                        component,
                        &mut names,
                        reporter,
                    )? {
                        Some(module) => module,
                        None => continue,
                    };
                    if component.kind == ComponentKind::Clock {
                        clock_trees.extend(netlist.clock_source_id(component));
                    }
                    let GeneratedModule {
                        name,
                        sub_directory,
                        lines,
                        instantiation,
                        ..
                    } = module;
                    instantiations.extend(instantiation);
                    instantiations.push(String::new());
                    modules.entry(name).or_insert_with(|| ModuleFile {
                        sub_directory: sub_directory.to_string(),
                        name: name.to_string(),
                        extension: dialect.file_extension(),
                        lines,
                    });
                }
            }
        }

        let clock_connections = clock_connections(dialect, netlist, &clock_trees);
        let lines = self.circuit_text(
            netlist,
            circuit_name,
            &clock_trees,
            &clock_connections,
            &inlined,
            &instantiations,
        )?;

        log::info!("Generated `{}` in {:?}", circuit_name, start.elapsed());

        Ok(CircuitOutput {
            circuit: ModuleFile {
                sub_directory: CIRCUIT_DIRECTORY.to_string(),
                name: circuit_name.to_string(),
                extension: dialect.file_extension(),
                lines,
            },
            modules: modules.into_iter().map(|(_, file)| file).collect(),
        })
    }

    fn circuit_text(
        &self,
        netlist: &Netlist<'_>,
        circuit_name: &str,
        clock_trees: &BTreeSet<usize>,
        clock_connections: &[String],
        inlined: &[String],
        instantiations: &[String],
    ) -> Result<Vec<String>, Error> {
        let dialect = self.options.dialect;
        let has_clocks = !clock_trees.is_empty();
        let mut w = CodeWriter::new();

        if self.options.remarks {
            w.append_lines(&line_buffer::remark_block(
                dialect,
                &format!(
                    "Project: {}. This file is generated automatically. It contains the circuit {}.",
                    self.options.project_name, circuit_name
                ),
                0,
            ));
            w.append_newline();
        }

        let mut signals = netlist
            .nets()
            .iter()
            .map(|net| dialect.wire_declaration(&net.name(), &Width::Literal(net.width)))
            .collect::<Vec<_>>();
        signals.extend(clock_trees.iter().map(|&tree| {
            dialect.wire_declaration(&clock_tree_bus(tree), &Width::Literal(NR_OF_CLOCK_BITS))
        }));

        match dialect {
            Dialect::Vhdl => {
                w.append_line("LIBRARY ieee;");
                w.append_line("USE ieee.std_logic_1164.all;");
                w.append_line("USE ieee.numeric_std.all;");
                w.append_newline();
                w.append_line(&format!("ENTITY {} IS", circuit_name));
                if has_clocks {
                    w.indent();
                    w.append_line(&format!("PORT ( {} : IN std_logic;", FPGA_CLOCK));
                    w.append_line(&format!("       {} : IN std_logic );", FPGA_TICK));
                    w.unindent()?;
                }
                w.append_line(&format!("END ENTITY {};", circuit_name));
                w.append_newline();
                w.append_line(&format!("ARCHITECTURE PlatformIndependent OF {} IS", circuit_name));
                w.indent();
                if !signals.is_empty() {
                    w.append_newline();
                }
                w.append_lines(&signals);
                w.unindent()?;
                w.append_newline();
                w.append_line("BEGIN");
            }
            Dialect::Verilog => {
                if has_clocks {
                    w.append_line(&format!(
                        "module {}( {}, {} );",
                        circuit_name, FPGA_CLOCK, FPGA_TICK
                    ));
                } else {
                    w.append_line(&format!("module {};", circuit_name));
                }
                w.indent();
                if has_clocks {
                    w.append_newline();
                    w.append_line(&format!("input {};", FPGA_CLOCK));
                    w.append_line(&format!("input {};", FPGA_TICK));
                }
                if !signals.is_empty() {
                    w.append_newline();
                }
                w.append_lines(&signals);
                w.unindent()?;
            }
        }

        w.indent();
        let sections = [
            ("Here all clock tree connections are defined", clock_connections),
            ("Here all in-lined components are defined", inlined),
            ("Here all normal components are defined", instantiations),
        ];
        for (remark, lines) in sections.iter() {
            if lines.is_empty() {
                continue;
            }
            w.append_newline();
            if self.options.remarks {
                w.append_lines(&line_buffer::remark_block(dialect, remark, 0));
            }
            let lines = trim_trailing_empty(lines);
            w.append_lines(lines);
        }
        w.unindent()?;

        w.append_newline();
        match dialect {
            Dialect::Vhdl => w.append_line("END PlatformIndependent;"),
            Dialect::Verilog => w.append_line("endmodule"),
        }

        Ok(w.into_lines())
    }
}

/// Drives each clock's output net from bit 0 of its clock tree, for the trees in `clock_trees`.
fn clock_connections(
    dialect: Dialect,
    netlist: &Netlist<'_>,
    clock_trees: &BTreeSet<usize>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for component in netlist.components() {
        if component.kind != ComponentKind::Clock {
            continue;
        }
        let tree = match netlist.clock_source_id(component) {
            Some(tree) if clock_trees.contains(&tree) => tree,
            _ => continue,
        };
        let points = component.end(0).map(|end| end.points.as_slice()).unwrap_or(&[]);
        for point in points {
            if let Some(target) = Expr::from_point(point) {
                let assignment = Assignment {
                    target,
                    source: Expr::RefBit {
                        name: clock_tree_bus(tree),
                        bit: DERIVED_CLOCK_INDEX,
                    },
                };
                lines.push(assignment.render(dialect));
            }
        }
    }
    lines
}

fn trim_trailing_empty(lines: &[String]) -> &[String] {
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |index| index + 1);
    &lines[..end]
}
