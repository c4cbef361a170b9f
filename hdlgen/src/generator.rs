//! The contracts every per-kind generator fulfils, and the orchestration around them.
//!
//! A [`ModuleGenerator`] produces a stand-alone module (VHDL entity/architecture or Verilog module)
//! plus the text instantiating it. An [`InlinedGenerator`] has no module of its own and emits
//! statements straight into the enclosing circuit.

pub mod ir;

use crate::code_writer::{CodeWriter, Error};
use crate::declarations::{Declarations, ParameterMap};
use crate::diagnostics::Reporter;
use crate::dialect::Dialect;
use crate::error::GenerateError;
use crate::line_buffer;
use crate::netlist::{AttributeSet, ComponentKind, Direction, Netlist, NetlistComponent};

use std::collections::{BTreeMap, BTreeSet};

/// Logical port name to the text naming what it connects to in the enclosing circuit.
pub type PortMap = BTreeMap<&'static str, String>;

pub trait ModuleGenerator {
    /// Module name, shared by all instances.
    fn component_identifier(&self) -> &'static str;

    /// Directory, relative to the output root, the module file is written to.
    fn sub_directory(&self) -> &'static str;

    fn declarations(&self) -> &Declarations;

    /// Whether this generator can produce an instance with `attrs` in `dialect`.
    fn supports(&self, _dialect: Dialect, _attrs: &AttributeSet) -> bool {
        true
    }

    /// Connects every declared port of `component` to a signal of the enclosing circuit.
    fn port_map<'a>(
        &self,
        netlist: &Netlist<'a>,
        component: &NetlistComponent<'a>,
    ) -> Result<PortMap, GenerateError>;

    /// The statements of the module body. They refer to parameters by name, so one module text
    /// serves every instance.
    fn module_functionality(&self, dialect: Dialect) -> Vec<String>;
}

pub trait InlinedGenerator {
    fn supports(&self, _dialect: Dialect, _attrs: &AttributeSet) -> bool {
        true
    }

    /// Statements implementing `component` directly in the circuit called `circuit_name`.
    ///
    /// Problems are reported to `reporter`; an instance that cannot be generated yields no lines.
    fn inlined_code<'a>(
        &self,
        dialect: Dialect,
        netlist: &Netlist<'a>,
        instance_id: &str,
        component: &NetlistComponent<'a>,
        circuit_name: &str,
        reporter: &mut dyn Reporter,
    ) -> Vec<String>;
}

/// The generator responsible for one component kind.
pub enum HdlGenerator {
    Module(Box<dyn ModuleGenerator>),
    Inlined(Box<dyn InlinedGenerator>),
}

/// One generator per component kind, built once and shared by every instance.
#[derive(Default)]
pub struct GeneratorSet {
    generators: BTreeMap<ComponentKind, HdlGenerator>,
}

impl GeneratorSet {
    pub fn new() -> GeneratorSet {
        GeneratorSet::default()
    }

    pub fn insert(&mut self, kind: ComponentKind, generator: HdlGenerator) -> &mut Self {
        self.generators.insert(kind, generator);
        self
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&HdlGenerator> {
        self.generators.get(&kind)
    }
}

/// A generated module and the instantiation of it for one instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedModule {
    pub name: &'static str,
    pub sub_directory: &'static str,
    pub instance_id: String,
    pub parameters: ParameterMap,
    /// Complete contents of the module's file.
    pub lines: Vec<String>,
    pub instantiation: Vec<String>,
}

/// The identifier a component instance goes by in the enclosing circuit.
///
/// Labels are reduced to letters, digits and single inner underscores. Labels starting with a
/// digit get an `L_` prefix; unlabelled instances are named after `prefix` and their id.
pub fn instance_identifier(prefix: &str, component: &NetlistComponent<'_>) -> String {
    let identifier = component
        .attrs
        .label()
        .map(sanitize)
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| sanitize(&format!("{}_{}", prefix.to_uppercase(), component.id)));
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        format!("L_{}", identifier)
    } else {
        identifier
    }
}

fn sanitize(text: &str) -> String {
    let mut identifier = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            identifier.push(c);
        } else if !identifier.is_empty() && !identifier.ends_with('_') {
            identifier.push('_');
        }
    }
    while identifier.ends_with('_') {
        identifier.pop();
    }
    identifier
}

/// Instance identifiers already taken in one circuit.
///
/// Identifiers compare case-insensitively, as VHDL does.
#[derive(Debug, Default)]
pub struct InstanceNames {
    taken: BTreeSet<String>,
}

impl InstanceNames {
    pub fn new() -> InstanceNames {
        InstanceNames::default()
    }

    /// Takes the identifier for `component`, suffixed with its id while the name is in use.
    pub fn claim(&mut self, prefix: &str, component: &NetlistComponent<'_>) -> String {
        let mut identifier = instance_identifier(prefix, component);
        while self.taken.contains(&identifier.to_lowercase()) {
            identifier = format!("{}_{}", identifier, component.id);
        }
        self.taken.insert(identifier.to_lowercase());
        identifier
    }
}

/// Runs `generator` for `component`: checks support, resolves declarations, maps ports and assembles
/// the module and instantiation texts.
///
/// Recoverable problems are reported and yield `Ok(None)`.
///
/// # Panics
///
/// Panics if the generator's declarations or port map break the generator contract.
pub fn generate_module<'a>(
    generator: &dyn ModuleGenerator,
    dialect: Dialect,
    netlist: &Netlist<'a>,
    component: &NetlistComponent<'a>,
    names: &mut InstanceNames,
    reporter: &mut dyn Reporter,
) -> Result<Option<GeneratedModule>, Error> {
    let name = generator.component_identifier();

    if !generator.supports(dialect, &component.attrs) {
        report_failure(
            reporter,
            component,
            GenerateError::Unsupported {
                generator: name,
                dialect,
            },
        );
        return Ok(None);
    }

    let declarations = generator.declarations();
    declarations.validate(name);

    let parameters = match declarations.resolve(&component.attrs) {
        Ok(parameters) => parameters,
        Err(error) => {
            report_failure(reporter, component, error);
            return Ok(None);
        }
    };

    let port_map = match generator.port_map(netlist, component) {
        Ok(port_map) => port_map,
        Err(error) => {
            report_failure(reporter, component, error);
            return Ok(None);
        }
    };
    check_port_map(name, component, declarations, &port_map);

    let body = generator.module_functionality(dialect);
    let lines = module_text(dialect, name, declarations, &body)?;

    let instance_id = names.claim(generator.sub_directory(), component);
    let instantiation = instantiation(
        dialect,
        name,
        &instance_id,
        &parameters,
        declarations,
        &port_map,
    );

    log::debug!("Generated instance `{}` of `{}`", instance_id, name);

    Ok(Some(GeneratedModule {
        name,
        sub_directory: generator.sub_directory(),
        instance_id,
        parameters,
        lines,
        instantiation,
    }))
}

/// Runs `generator` for `component`, reporting rather than generating when the dialect or
/// attributes aren't supported.
pub fn generate_inlined<'a>(
    generator: &dyn InlinedGenerator,
    dialect: Dialect,
    netlist: &Netlist<'a>,
    component: &NetlistComponent<'a>,
    circuit_name: &str,
    names: &mut InstanceNames,
    reporter: &mut dyn Reporter,
) -> Vec<String> {
    if !generator.supports(dialect, &component.attrs) {
        report_failure(
            reporter,
            component,
            GenerateError::Unsupported {
                generator: component.kind.display_name(),
                dialect,
            },
        );
        return Vec::new();
    }

    let instance_id = names.claim(component.kind.display_name(), component);
    generator.inlined_code(
        dialect,
        netlist,
        &instance_id,
        component,
        circuit_name,
        reporter,
    )
}

fn report_failure(
    reporter: &mut dyn Reporter,
    component: &NetlistComponent<'_>,
    error: GenerateError,
) {
    reporter.error(format!(
        "Cannot generate {}: {}.",
        component.describe(),
        error
    ));
}

fn check_port_map(
    module: &str,
    component: &NetlistComponent<'_>,
    declarations: &Declarations,
    port_map: &PortMap,
) {
    for port in declarations.ports() {
        if !port_map.contains_key(port.name) {
            panic!("Cannot generate code for module \"{}\" because the port map of {} does not connect port \"{}\".", module, component.describe(), port.name);
        }
    }
    for name in port_map.keys() {
        if !declarations.ports().iter().any(|port| port.name == *name) {
            panic!("Cannot generate code for module \"{}\" because the port map of {} connects \"{}\", which is not a declared port.", module, component.describe(), name);
        }
    }
}

/// Lays out `items` one per line, the first after `open`, the rest aligned under it.
fn aligned_list(open: &str, items: &[String], separator: &str, close: &str) -> Vec<String> {
    let continuation = " ".repeat(open.len());
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let lead = if index == 0 { open } else { &continuation };
            let tail = if index + 1 == items.len() {
                close
            } else {
                separator
            };
            format!("{}{}{}", lead, item, tail)
        })
        .collect()
}

fn padded(name: &str, width: usize) -> String {
    format!("{:<width$}", name, width = width)
}

fn module_text(
    dialect: Dialect,
    name: &str,
    declarations: &Declarations,
    body: &[String],
) -> Result<Vec<String>, Error> {
    let mut w = CodeWriter::new();

    w.append_lines(&line_buffer::remark_block(
        dialect,
        &format!("This file is generated automatically. It contains the {} component.", name),
        0,
    ));
    w.append_newline();

    let parameters = declarations.parameters();
    let ports = declarations.ports();
    let name_width = ports
        .iter()
        .map(|port| port.name.len())
        .chain(parameters.iter().map(|parameter| parameter.name.len()))
        .max()
        .unwrap_or(0);

    match dialect {
        Dialect::Vhdl => {
            w.append_line("LIBRARY ieee;");
            w.append_line("USE ieee.std_logic_1164.all;");
            w.append_line("USE ieee.numeric_std.all;");
            w.append_newline();

            w.append_line(&format!("ENTITY {} IS", name));
            w.indent();
            if !parameters.is_empty() {
                let items = parameters
                    .iter()
                    .map(|parameter| format!("{} : INTEGER", padded(parameter.name, name_width)))
                    .collect::<Vec<_>>();
                w.append_lines(&aligned_list("GENERIC ( ", &items, ";", " );"));
            }
            if !ports.is_empty() {
                let items = ports
                    .iter()
                    .map(|port| {
                        let direction = match port.direction {
                            Direction::Input => "IN ",
                            Direction::Output => "OUT",
                        };
                        format!(
                            "{} : {} {}",
                            padded(port.name, name_width),
                            direction,
                            dialect.vector_type(&port.width)
                        )
                    })
                    .collect::<Vec<_>>();
                w.append_lines(&aligned_list("PORT ( ", &items, ";", " );"));
            }
            w.unindent()?;
            w.append_line(&format!("END ENTITY {};", name));
            w.append_newline();

            w.append_line(&format!("ARCHITECTURE PlatformIndependent OF {} IS", name));
            w.indent();
            let has_signals = !declarations.wires().is_empty() || !declarations.registers().is_empty();
            if has_signals {
                w.append_newline();
            }
            for wire in declarations.wires() {
                w.append_line(&dialect.wire_declaration(wire.name, &wire.width));
            }
            for register in declarations.registers() {
                w.append_line(&dialect.register_declaration(register.name, &register.width));
            }
            w.unindent()?;
            w.append_newline();
            w.append_line("BEGIN");
            w.append_newline();
            w.indent();
            w.append_lines(body);
            w.unindent()?;
            w.append_newline();
            w.append_line("END PlatformIndependent;");
        }
        Dialect::Verilog => {
            let port_names = ports.iter().map(|port| port.name).collect::<Vec<_>>();
            w.append_line(&format!("module {}( {} );", name, port_names.join(", ")));
            w.indent();

            if !parameters.is_empty() {
                w.append_newline();
                for parameter in parameters {
                    // Placeholder default; every instantiation overrides it.
                    w.append_line(&format!("parameter {} = 1;", parameter.name));
                }
            }
            if !ports.is_empty() {
                w.append_newline();
                for port in ports {
                    let direction = match port.direction {
                        Direction::Input => "input",
                        Direction::Output => "output",
                    };
                    w.append_line(&format!(
                        "{} {}{};",
                        direction,
                        dialect.vector_type(&port.width),
                        port.name
                    ));
                }
            }
            let has_signals = !declarations.wires().is_empty() || !declarations.registers().is_empty();
            if has_signals {
                w.append_newline();
            }
            for wire in declarations.wires() {
                w.append_line(&dialect.wire_declaration(wire.name, &wire.width));
            }
            for register in declarations.registers() {
                w.append_line(&dialect.register_declaration(register.name, &register.width));
            }
            w.append_newline();
            w.append_lines(body);
            w.unindent()?;
            w.append_newline();
            w.append_line("endmodule");
        }
    }

    Ok(w.into_lines())
}

fn instantiation(
    dialect: Dialect,
    name: &str,
    instance_id: &str,
    parameters: &ParameterMap,
    declarations: &Declarations,
    port_map: &PortMap,
) -> Vec<String> {
    let connected = declarations
        .ports()
        .iter()
        .map(|port| (port.name, port_map[port.name].as_str()))
        .collect::<Vec<_>>();

    let mut lines = Vec::new();
    match dialect {
        Dialect::Vhdl => {
            lines.push(format!("{} : ENTITY work.{}", instance_id, name));
            if !parameters.is_empty() {
                let items = parameters
                    .iter()
                    .map(|(parameter, value)| format!("{} => {}", parameter, value))
                    .collect::<Vec<_>>();
                lines.extend(aligned_list("   GENERIC MAP ( ", &items, ",", " )"));
            }
            let items = connected
                .iter()
                .map(|(port, signal)| format!("{} => {}", port, signal))
                .collect::<Vec<_>>();
            lines.extend(aligned_list("   PORT MAP ( ", &items, ",", " );"));
        }
        Dialect::Verilog => {
            if parameters.is_empty() {
                lines.push(name.to_string());
            } else {
                let items = parameters
                    .iter()
                    .map(|(parameter, value)| format!(".{}({})", parameter, value))
                    .collect::<Vec<_>>();
                lines.extend(aligned_list(&format!("{} #(", name), &items, ",", ")"));
            }
            let items = connected
                .iter()
                .map(|(port, signal)| format!(".{}({})", port, signal))
                .collect::<Vec<_>>();
            lines.extend(aligned_list(
                &format!("   {} (", instance_id),
                &items,
                ",",
                ");",
            ));
        }
    }
    lines
}
