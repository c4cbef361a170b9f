use crate::netlist::{Direction, Netlist};

use std::collections::BTreeMap;

/// Checks the structural invariants every generator relies on.
///
/// # Panics
///
/// Panics if a connection point refers to a bit its net doesn't have, or if two outputs drive the
/// same net bit.
pub fn validate_netlist<'a>(netlist: &Netlist<'a>, circuit_name: &str) {
    detect_out_of_range_bits(netlist, circuit_name);
    detect_multiple_drivers(netlist, circuit_name);
}

fn detect_out_of_range_bits<'a>(netlist: &Netlist<'a>, circuit_name: &str) {
    for component in netlist.components() {
        for (index, end) in component.ends.iter().enumerate() {
            for point in end.points.iter() {
                if let Some(net) = point.net {
                    if point.bit >= net.width {
                        panic!("Cannot generate code for circuit \"{}\" because end {} of {} connects to bit {} of net \"{}\", which is only {} bit(s) wide.", circuit_name, index, component.describe(), point.bit, net.name(), net.width);
                    }
                }
            }
        }
    }
}

fn detect_multiple_drivers<'a>(netlist: &Netlist<'a>, circuit_name: &str) {
    let mut drivers = BTreeMap::new();
    for component in netlist.components() {
        for end in component
            .ends
            .iter()
            .filter(|end| end.direction == Direction::Output)
        {
            for point in end.points.iter() {
                let net = match point.net {
                    Some(net) => net,
                    None => continue,
                };
                if let Some(previous) = drivers.insert((net.id, point.bit), component) {
                    if previous.id != component.id {
                        panic!("Cannot generate code for circuit \"{}\" because bit {} of net \"{}\" is driven by both {} and {}.", circuit_name, point.bit, net.name(), previous.describe(), component.describe());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::netlist::{Attribute, AttributeSet, ComponentKind, ConnectionPoint, End};

    #[test]
    fn well_formed_netlist_passes() {
        let n = Netlist::new();
        let a = n.net(4);
        let b = n.net(8);
        n.component(
            ComponentKind::Constant,
            AttributeSet::new().with(Attribute::Value, 2i64),
            vec![End::whole(Direction::Output, a)],
        );
        n.component(
            ComponentKind::BitExtender,
            AttributeSet::new(),
            vec![
                End::whole(Direction::Output, b),
                End::whole(Direction::Input, a),
            ],
        );
        // Several readers of one bit are fine.
        n.component(
            ComponentKind::NoConnect,
            AttributeSet::new(),
            vec![End::new(Direction::Input, vec![ConnectionPoint::new(a, 3)])],
        );

        validate_netlist(&n, "main");
    }

    #[test]
    #[should_panic(
        expected = "Cannot generate code for circuit \"main\" because end 0 of Ground #0 connects to bit 2 of net \"s_logisimBus0\", which is only 2 bit(s) wide."
    )]
    fn bit_outside_net_panics() {
        let n = Netlist::new();
        let a = n.net(2);
        n.component(
            ComponentKind::Ground,
            AttributeSet::new(),
            vec![End::new(
                Direction::Output,
                vec![ConnectionPoint::new(a, 1), ConnectionPoint::new(a, 2)],
            )],
        );

        validate_netlist(&n, "main");
    }

    #[test]
    #[should_panic(
        expected = "Cannot generate code for circuit \"main\" because bit 0 of net \"s_logisimNet0\" is driven by both Ground #0 and Power \"vcc\"."
    )]
    fn multiple_drivers_panic() {
        let n = Netlist::new();
        let a = n.net(1);
        n.component(
            ComponentKind::Ground,
            AttributeSet::new(),
            vec![End::whole(Direction::Output, a)],
        );
        n.component(
            ComponentKind::Power,
            AttributeSet::new().with(Attribute::Label, "vcc"),
            vec![End::whole(Direction::Output, a)],
        );

        validate_netlist(&n, "main");
    }
}
