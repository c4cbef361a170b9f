//! Generators for the supported component kinds.

mod bit_extender;
mod clock;
mod constant;
mod no_connect;

pub use bit_extender::BitExtenderGenerator;
pub use clock::*;
pub use constant::{ConstantGenerator, ConstantSource};
pub use no_connect::NoConnectGenerator;

use crate::generator::ir::{self, Assignment, Expr};
use crate::generator::{GeneratorSet, HdlGenerator};
use crate::netlist::{ComponentKind, End};

/// A generator for every [`ComponentKind`].
pub fn standard() -> GeneratorSet {
    let mut set = GeneratorSet::new();
    set.insert(
        ComponentKind::Clock,
        HdlGenerator::Module(Box::new(ClockGenerator::new())),
    )
    .insert(
        ComponentKind::Constant,
        HdlGenerator::Inlined(Box::new(ConstantGenerator::new(ConstantSource::Attribute))),
    )
    .insert(
        ComponentKind::Ground,
        HdlGenerator::Inlined(Box::new(ConstantGenerator::new(ConstantSource::Zeros))),
    )
    .insert(
        ComponentKind::Power,
        HdlGenerator::Inlined(Box::new(ConstantGenerator::new(ConstantSource::Ones))),
    )
    .insert(
        ComponentKind::BitExtender,
        HdlGenerator::Inlined(Box::new(BitExtenderGenerator)),
    )
    .insert(
        ComponentKind::NoConnect,
        HdlGenerator::Inlined(Box::new(NoConnectGenerator)),
    );
    set
}

/// All-ones mask of `width` bits.
pub(crate) fn ones(width: u32) -> u64 {
    if width >= 64 {
        u64::max_value()
    } else {
        (1 << width) - 1
    }
}

/// Assignments driving bits `low..high` of output `end`.
///
/// If the end is `contiguous` and a `wide_source` covering the whole range is given, the range is
/// driven by a single assignment. Otherwise every connected bit gets its own assignment from
/// `bit_source`; bits it yields nothing for are skipped.
pub(crate) fn drive_bits<F>(
    end: &End<'_>,
    contiguous: bool,
    low: u32,
    high: u32,
    wide_source: Option<Expr>,
    bit_source: F,
) -> Vec<Assignment>
where
    F: Fn(u32) -> Option<Expr>,
{
    let per_bit = (low..high)
        .filter_map(|bit| {
            let target = Expr::from_point(end.points.get(bit as usize)?)?;
            let source = bit_source(bit)?;
            Some(Assignment { target, source })
        })
        .collect::<Vec<_>>();

    let target = if contiguous {
        Expr::from_end_range(end, low, high)
    } else {
        None
    };
    match (target, wide_source) {
        (Some(target), Some(source)) => {
            let wide = vec![Assignment { target, source }];
            debug_assert_eq!(ir::bit_mapping(&wide), ir::bit_mapping(&per_bit));
            wide
        }
        _ => per_bit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dialect::Dialect;
    use crate::netlist::{ConnectionPoint, Direction, Netlist};

    #[test]
    fn standard_set_covers_every_kind() {
        let set = standard();
        for &kind in &[
            ComponentKind::Clock,
            ComponentKind::Constant,
            ComponentKind::Ground,
            ComponentKind::Power,
            ComponentKind::BitExtender,
            ComponentKind::NoConnect,
        ] {
            assert!(set.get(kind).is_some(), "{}", kind);
        }
        assert!(match set.get(ComponentKind::Clock) {
            Some(HdlGenerator::Module(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn contiguous_range_is_driven_by_one_assignment() {
        let n = Netlist::new();
        let bus = n.net(8);
        let end = End::whole(Direction::Output, bus);

        let assignments = drive_bits(&end, true, 0, 8, Some(Expr::constant(0x5a, 8)), |bit| {
            Some(Expr::constant((0x5a >> bit) & 1, 1))
        });

        assert_eq!(assignments.len(), 1);
        assert_eq!(
            assignments[0].render(Dialect::Vhdl),
            "s_logisimBus0 <= X\"5A\";"
        );
    }

    #[test]
    fn fragmented_range_is_driven_bit_by_bit() {
        let n = Netlist::new();
        let a = n.net(4);
        let b = n.net(1);
        let end = End::new(
            Direction::Output,
            vec![
                ConnectionPoint::new(a, 2),
                ConnectionPoint::floating(),
                ConnectionPoint::new(b, 0),
            ],
        );

        let assignments = drive_bits(&end, false, 0, 3, Some(Expr::constant(0b101, 3)), |bit| {
            Some(Expr::constant((0b101 >> bit) & 1, 1))
        });

        assert_eq!(
            assignments
                .iter()
                .map(|a| a.render(Dialect::Verilog))
                .collect::<Vec<_>>(),
            vec![
                "assign s_logisimBus0[2] = 1'b1;",
                "assign s_logisimNet1 = 1'b1;"
            ]
        );
    }

    #[test]
    fn mask() {
        assert_eq!(ones(1), 1);
        assert_eq!(ones(5), 0x1f);
        assert_eq!(ones(64), u64::max_value());
    }
}
