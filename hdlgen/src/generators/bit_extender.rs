use super::{drive_bits, ones};

use crate::diagnostics::Reporter;
use crate::dialect::Dialect;
use crate::error::GenerateError;
use crate::generator::ir::Expr;
use crate::generator::InlinedGenerator;
use crate::netlist::{Attribute, ExtensionMode, Netlist, NetlistComponent};

const OUTPUT: usize = 0;
const INPUT: usize = 1;
const EXTENSION: usize = 2;

/// Widens or narrows a bus.
///
/// End 0 is the output, end 1 the input, and end 2 the extension bit (used in
/// [`ExtensionMode::Input`] only). Output bits below the input width copy the input; the rest are
/// filled according to the instance's extension mode.
pub struct BitExtenderGenerator;

impl BitExtenderGenerator {
    fn assignments(
        &self,
        dialect: Dialect,
        netlist: &Netlist<'_>,
        component: &NetlistComponent<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<String>, GenerateError> {
        let mode = component
            .attrs
            .extension()
            .ok_or(GenerateError::MissingAttribute(Attribute::Extension))?;
        let output = component
            .end(OUTPUT)
            .ok_or(GenerateError::MissingEnd { end: OUTPUT })?;
        let input = component
            .end(INPUT)
            .ok_or(GenerateError::MissingEnd { end: INPUT })?;

        let declared_widths = [
            (Attribute::OutputWidth, OUTPUT, output),
            (Attribute::InputWidth, INPUT, input),
        ];
        for &(attribute, index, end) in declared_widths.iter() {
            let connected = end.width();
            match component.attrs.width(attribute) {
                Some(declared) if declared != connected => {
                    return Err(GenerateError::WidthMismatch {
                        attribute,
                        end: index,
                        declared,
                        connected,
                    });
                }
                _ => (),
            }
        }

        if !input.is_connected() {
            return Err(GenerateError::FloatingInput { end: INPUT });
        }
        let extension = if mode == ExtensionMode::Input {
            match component.end(EXTENSION) {
                Some(end) if end.is_connected() => Some(end),
                _ => return Err(GenerateError::FloatingInput { end: EXTENSION }),
            }
        } else {
            None
        };

        if output.is_floating() {
            reporter.warning(format!(
                "{} is not connected to anything; no code generated.",
                component.describe()
            ));
            return Ok(Vec::new());
        }

        let in_width = input.width();
        let out_width = output.width();
        let copied = in_width.min(out_width);
        let output_contiguous = netlist.is_contiguous_bus(component, OUTPUT);
        let input_contiguous = netlist.is_contiguous_bus(component, INPUT);

        let mut assignments = drive_bits(
            output,
            output_contiguous && input_contiguous,
            0,
            copied,
            Expr::from_end_range(input, 0, copied),
            |bit| Expr::from_point(&input.points[bit as usize]),
        );

        if out_width > copied {
            let fill_width = out_width - copied;
            let (wide, fill) = match mode {
                ExtensionMode::Zero => (
                    Some(Expr::constant(0, fill_width)),
                    Some(Expr::constant(0, 1)),
                ),
                ExtensionMode::One => (
                    Some(Expr::constant(ones(fill_width), fill_width)),
                    Some(Expr::constant(1, 1)),
                ),
                ExtensionMode::Sign => (None, Expr::from_point(&input.points[in_width as usize - 1])),
                ExtensionMode::Input => (
                    None,
                    extension.and_then(|end| end.points.first().and_then(Expr::from_point)),
                ),
            };
            let wide = wide.filter(|_| fill_width <= 64);
            assignments.extend(drive_bits(
                output,
                output_contiguous,
                copied,
                out_width,
                wide,
                |_| fill.clone(),
            ));
        }

        Ok(assignments
            .iter()
            .map(|assignment| assignment.render(dialect))
            .collect())
    }
}

impl InlinedGenerator for BitExtenderGenerator {
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
