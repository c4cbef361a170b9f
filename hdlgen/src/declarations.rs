//! Declared parameters, ports, wires and registers of a generated module.
//!
//! Declarations are fixed when a generator is constructed. Parameter values are derived per instance
//! by [`Declarations::resolve`]; widths either are literal or name one of the declared parameters,
//! so the emitted module text only depends on the declarations, never on a particular instance.

use crate::error::GenerateError;
use crate::netlist::{Attribute, AttributeSet, Direction};

/// Bit width of a port, wire or register.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    Literal(u32),
    /// The width is the value of the named parameter.
    Parameter(&'static str),
}

impl Width {
    /// Literally one bit wide, so declared as a scalar.
    pub fn is_single_bit(&self) -> bool {
        *self == Width::Literal(1)
    }

    /// Index of the most significant bit, as HDL text.
    pub fn upper_bound(&self) -> String {
        match *self {
            Width::Literal(width) => (width.max(1) - 1).to_string(),
            Width::Parameter(name) => format!("{}-1", name),
        }
    }
}

/// Formulas over instance attributes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Formula {
    /// Bits needed to count down from the larger of two positive durations: `ceil(log2(max(a, b)))`,
    /// never less than one.
    MinBits(Attribute, Attribute),
    /// Depth of the shift register that delays a clock by `phase` ticks:
    /// `(high + low) - (phase mod (high + low))`.
    PhaseDelay {
        high: Attribute,
        low: Attribute,
        phase: Attribute,
    },
}

impl Formula {
    fn evaluate(&self, attrs: &AttributeSet) -> Result<i64, GenerateError> {
        match *self {
            Formula::MinBits(a, b) => {
                let max = positive(attrs, a)?.max(positive(attrs, b)?) as u64;
                Ok(i64::from(min_bits(max)))
            }
            Formula::PhaseDelay { high, low, phase } => {
                let low_ticks = positive(attrs, low)?;
                let period = positive(attrs, high)?.checked_add(low_ticks).ok_or(
                    GenerateError::InvalidAttribute {
                        attribute: low,
                        value: low_ticks,
                        reason: "makes the clock period overflow",
                    },
                )?;
                let phase = lookup(attrs, phase)?;
                Ok(period - phase.rem_euclid(period))
            }
        }
    }
}

/// `ceil(log2(max))`, clamped to at least one bit.
pub fn min_bits(max: u64) -> u32 {
    if max <= 2 {
        1
    } else {
        64 - (max - 1).leading_zeros()
    }
}

/// How a parameter gets its per-instance value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    Literal(i64),
    Attribute(Attribute),
    Formula(Formula),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterDecl {
    pub name: &'static str,
    pub resolution: Resolution,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignalDecl {
    pub name: &'static str,
    pub width: Width,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PortDecl {
    pub name: &'static str,
    pub direction: Direction,
    pub width: Width,
}

/// Resolved parameter values, in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParameterMap {
    values: Vec<(&'static str, i64)>,
}

impl ParameterMap {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|&(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.values.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Declarations {
    parameters: Vec<ParameterDecl>,
    ports: Vec<PortDecl>,
    wires: Vec<SignalDecl>,
    registers: Vec<SignalDecl>,
}

impl Declarations {
    pub fn new() -> Declarations {
        Declarations::default()
    }

    pub fn add_parameter(&mut self, name: &'static str, resolution: Resolution) -> &mut Self {
        self.assert_unique(name);
        self.parameters.push(ParameterDecl { name, resolution });
        self
    }

    pub fn add_input(&mut self, name: &'static str, width: Width) -> &mut Self {
        self.add_port(name, Direction::Input, width)
    }

    pub fn add_output(&mut self, name: &'static str, width: Width) -> &mut Self {
        self.add_port(name, Direction::Output, width)
    }

    fn add_port(&mut self, name: &'static str, direction: Direction, width: Width) -> &mut Self {
        self.assert_unique(name);
        self.ports.push(PortDecl {
            name,
            direction,
            width,
        });
        self
    }

    pub fn add_wire(&mut self, name: &'static str, width: Width) -> &mut Self {
        self.assert_unique(name);
        self.wires.push(SignalDecl { name, width });
        self
    }

    pub fn add_register(&mut self, name: &'static str, width: Width) -> &mut Self {
        self.assert_unique(name);
        self.registers.push(SignalDecl { name, width });
        self
    }

    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.parameters
    }

    pub fn ports(&self) -> &[PortDecl] {
        &self.ports
    }

    pub fn wires(&self) -> &[SignalDecl] {
        &self.wires
    }

    pub fn registers(&self) -> &[SignalDecl] {
        &self.registers
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|parameter| parameter.name == name)
    }

    /// Derives every parameter's value for an instance with attributes `attrs`.
    ///
    /// Pure: the same attributes always yield the same map.
    pub fn resolve(&self, attrs: &AttributeSet) -> Result<ParameterMap, GenerateError> {
        let mut values = Vec::with_capacity(self.parameters.len());
        for parameter in self.parameters.iter() {
            let value = match parameter.resolution {
                Resolution::Literal(value) => value,
                Resolution::Attribute(attribute) => lookup(attrs, attribute)?,
                Resolution::Formula(formula) => formula.evaluate(attrs)?,
            };
            values.push((parameter.name, value));
        }
        Ok(ParameterMap { values })
    }

    /// Checks that every parameter-valued width names a declared parameter.
    ///
    /// # Panics
    ///
    /// Panics naming `module` and the offending declaration otherwise.
    pub fn validate(&self, module: &str) {
        let widths = self
            .ports
            .iter()
            .map(|port| (port.name, port.width))
            .chain(self.wires.iter().map(|wire| (wire.name, wire.width)))
            .chain(self.registers.iter().map(|reg| (reg.name, reg.width)));
        for (name, width) in widths {
            match width {
                Width::Parameter(parameter) if !self.has_parameter(parameter) => {
                    panic!("Cannot generate code for module \"{}\" because \"{}\" is sized by parameter \"{}\", which is not declared.", module, name, parameter);
                }
                Width::Literal(0) => {
                    panic!("Cannot generate code for module \"{}\" because \"{}\" has a width of 0 bits.", module, name);
                }
                _ => (),
            }
        }
    }

    fn assert_unique(&self, name: &'static str) {
        let taken = self.has_parameter(name)
            || self.ports.iter().any(|port| port.name == name)
            || self.wires.iter().any(|wire| wire.name == name)
            || self.registers.iter().any(|reg| reg.name == name);
        if taken {
            panic!("Cannot declare \"{}\" twice.", name);
        }
    }
}

fn lookup(attrs: &AttributeSet, attribute: Attribute) -> Result<i64, GenerateError> {
    attrs
        .int(attribute)
        .ok_or(GenerateError::MissingAttribute(attribute))
}

fn positive(attrs: &AttributeSet, attribute: Attribute) -> Result<i64, GenerateError> {
    let value = lookup(attrs, attribute)?;
    if value < 1 {
        return Err(GenerateError::InvalidAttribute {
            attribute,
            value,
            reason: "must be at least 1",
        });
    }
    Ok(value)
}
