use super::{drive_bits, ones};

use crate::diagnostics::Reporter;
use crate::dialect::Dialect;
use crate::error::GenerateError;
use crate::generator::ir::Expr;
use crate::generator::InlinedGenerator;
use crate::netlist::{Attribute, Netlist, NetlistComponent};

/// Where a constant driver takes its value from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstantSource {
    /// The instance's `value` attribute.
    Attribute,
    /// All bits low (ground).
    Zeros,
    /// All bits high (power).
    Ones,
}

/// Drives end 0 with a constant.
pub struct ConstantGenerator {
    source: ConstantSource,
}

impl ConstantGenerator {
    pub fn new(source: ConstantSource) -> ConstantGenerator {
        ConstantGenerator { source }
    }

    fn value(&self, component: &NetlistComponent<'_>, width: u32) -> Result<u64, GenerateError> {
        match self.source {
            ConstantSource::Zeros => Ok(0),
            ConstantSource::Ones => Ok(ones(width)),
            ConstantSource::Attribute => {
                let value = component
                    .attrs
                    .int(Attribute::Value)
                    .ok_or(GenerateError::MissingAttribute(Attribute::Value))?;
                if value < 0 || (value as u64) > ones(width) {
                    return Err(GenerateError::ValueOutOfRange { value, width });
                }
                Ok(value as u64)
            }
        }
    }

    fn assignments(
        &self,
        dialect: Dialect,
        netlist: &Netlist<'_>,
        component: &NetlistComponent<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<String>, GenerateError> {
        let end = component
            .end(0)
            .ok_or(GenerateError::MissingEnd { end: 0 })?;
        let width = end.width();
        if width == 0 || width > 64 {
            return Err(GenerateError::InvalidAttribute {
                attribute: Attribute::Width,
                value: width.into(),
                reason: "constants must be 1 to 64 bits wide",
            });
        }
        let value = self.value(component, width)?;

        if end.is_floating() {
            reporter.warning(format!(
                "{} is not connected to anything; no code generated.",
                component.describe()
            ));
            return Ok(Vec::new());
        }

        let assignments = drive_bits(
            end,
            netlist.is_contiguous_bus(component, 0),
            0,
            width,
            Some(Expr::constant(value, width)),
            |bit| Some(Expr::constant((value >> bit) & 1, 1)),
        );
        Ok(assignments
            .iter()
            .map(|assignment| assignment.render(dialect))
            .collect())
    }
}

impl InlinedGenerator for ConstantGenerator {
    fn inlined_code<'a>(
        &self,
        dialect: Dialect,
        netlist: &Netlist<'a>,
        _instance_id: &str,
        component: &NetlistComponent<'a>,
        circuit_name: &str,
        reporter: &mut dyn Reporter,
    ) -> Vec<String> {
        match self.assignments(dialect, netlist, component, reporter) {
            Ok(lines) => lines,
            Err(error) => {
                reporter.error(format!(
                    "Cannot generate {} in circuit \"{}\": {}.",
                    component.describe(),
                    circuit_name,
                    error
                ));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::diagnostics::DiagnosticLog;
    use crate::netlist::{AttributeSet, ComponentKind, ConnectionPoint, Direction, End};

    fn generate<'a>(
        generator: &ConstantGenerator,
        dialect: Dialect,
        n: &Netlist<'a>,
        c: &NetlistComponent<'a>,
        log: &mut DiagnosticLog,
    ) -> Vec<String> {
        generator.inlined_code(dialect, n, "C", c, "main", log)
    }

    #[test]
    fn whole_bus_constant() {
        let n = Netlist::new();
        let bus = n.net(10);
        let c = n.component(
            ComponentKind::Constant,
            AttributeSet::new().with(Attribute::Value, 0x2a5i64),
            vec![End::whole(Direction::Output, bus)],
        );
        let mut log = DiagnosticLog::new();
        let generator = ConstantGenerator::new(ConstantSource::Attribute);

        assert_eq!(
            generate(&generator, Dialect::Vhdl, &n, c, &mut log),
            vec!["s_logisimBus0 <= \"10\"&X\"A5\";"]
        );
        assert_eq!(
            generate(&generator, Dialect::Verilog, &n, c, &mut log),
            vec!["assign s_logisimBus0 = {2'b10, 8'hA5};"]
        );
        assert!(log.diagnostics.is_empty());
    }

    #[test]
    fn slice_of_a_wider_bus() {
        let n = Netlist::new();
        let bus = n.net(8);
        let c = n.component(
            ComponentKind::Power,
            AttributeSet::new(),
            vec![End::new(
                Direction::Output,
                (4..8).map(|bit| ConnectionPoint::new(bus, bit)).collect(),
            )],
        );
        let mut log = DiagnosticLog::new();

        assert_eq!(
            generate(
                &ConstantGenerator::new(ConstantSource::Ones),
                Dialect::Verilog,
                &n,
                c,
                &mut log
            ),
            vec!["assign s_logisimBus0[7:4] = 4'hF;"]
        );
    }

    #[test]
    fn scattered_bits_are_driven_one_by_one() {
        let n = Netlist::new();
        let a = n.net(1);
        let b = n.net(1);
        let c = n.component(
            ComponentKind::Ground,
            AttributeSet::new(),
            vec![End::new(
                Direction::Output,
                vec![ConnectionPoint::new(b, 0), ConnectionPoint::new(a, 0)],
            )],
        );
        let mut log = DiagnosticLog::new();

        assert_eq!(
            generate(
                &ConstantGenerator::new(ConstantSource::Zeros),
                Dialect::Vhdl,
                &n,
                c,
                &mut log
            ),
            vec!["s_logisimNet1 <= '0';", "s_logisimNet0 <= '0';"]
        );
    }

    #[test]
    fn out_of_range_value_is_an_error() {
        let n = Netlist::new();
        let bus = n.net(4);
        let c = n.component(
            ComponentKind::Constant,
            AttributeSet::new().with(Attribute::Value, 16i64),
            vec![End::whole(Direction::Output, bus)],
        );
        let mut log = DiagnosticLog::new();

        let lines = generate(
            &ConstantGenerator::new(ConstantSource::Attribute),
            Dialect::Vhdl,
            &n,
            c,
            &mut log,
        );

        assert!(lines.is_empty());
        assert_eq!(log.errors().count(), 1);
        assert_eq!(
            log.diagnostics[0].message,
            "Cannot generate Constant #0 in circuit \"main\": value 16 does not fit in 4 bit(s)."
        );
    }

    #[test]
    fn floating_output_is_a_warning() {
        let n = Netlist::new();
        let c = n.component(
            ComponentKind::Constant,
            AttributeSet::new().with(Attribute::Value, 1i64),
            vec![End::floating(Direction::Output, 1)],
        );
        let mut log = DiagnosticLog::new();

        let lines = generate(
            &ConstantGenerator::new(ConstantSource::Attribute),
            Dialect::Verilog,
            &n,
            c,
            &mut log,
        );

        assert!(lines.is_empty());
        assert_eq!(log.warnings().count(), 1);
        assert!(!log.has_errors());
    }
}
