use crate::diagnostics::Reporter;
use crate::dialect::Dialect;
use crate::generator::InlinedGenerator;
use crate::line_buffer::LineBuffer;
use crate::netlist::{Netlist, NetlistComponent};

use itertools::Itertools;

/// Marks a net as deliberately left open. Generates no logic, only a remark naming the open bits.
pub struct NoConnectGenerator;

impl InlinedGenerator for NoConnectGenerator {
    fn inlined_code<'a>(
        &self,
        dialect: Dialect,
        _netlist: &Netlist<'a>,
        instance_id: &str,
        component: &NetlistComponent<'a>,
        _circuit_name: &str,
        _reporter: &mut dyn Reporter,
    ) -> Vec<String> {
        let open = component
            .ends
            .iter()
            .flat_map(|end| end.points.iter())
            .filter_map(|point| point.net.map(|net| net.bit_name(dialect, point.bit)))
            .unique()
            .join(", ");
        if open.is_empty() {
            return Vec::new();
        }

        let mut contents = LineBuffer::new(dialect);
        contents.add_remark_line(&format!("{}: {} intentionally left open", instance_id, open));
        contents.into_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::diagnostics::DiagnosticLog;
    use crate::netlist::{AttributeSet, ComponentKind, Direction, End};

    #[test]
    fn connected_marker_emits_a_remark() {
        let n = Netlist::new();
        let net = n.net(2);
        let c = n.component(
            ComponentKind::NoConnect,
            AttributeSet::new(),
            vec![End::whole(Direction::Input, net)],
        );
        let mut log = DiagnosticLog::new();

        assert_eq!(
            NoConnectGenerator.inlined_code(Dialect::Vhdl, &n, "NC_0", c, "main", &mut log),
            vec!["-- NC_0: s_logisimBus0(0), s_logisimBus0(1) intentionally left open"]
        );
        assert!(log.diagnostics.is_empty());
    }

    #[test]
    fn floating_marker_emits_nothing() {
        let n = Netlist::new();
        let c = n.component(
            ComponentKind::NoConnect,
            AttributeSet::new(),
            vec![End::floating(Direction::Input, 1)],
        );
        let mut log = DiagnosticLog::new();

        assert!(NoConnectGenerator
            .inlined_code(Dialect::Verilog, &n, "NC_0", c, "main", &mut log)
            .is_empty());
    }
}
