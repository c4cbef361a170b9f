use crate::dialect::{self, Dialect};
use crate::netlist::{ConnectionPoint, End, Net};

/// One bit an assignment reads or writes, used to compare differently-shaped assignments.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BitRef {
    Net { id: usize, bit: u32 },
    Constant(bool),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// All bits of a net.
    Net { id: usize, width: u32 },
    /// One bit of a net.
    NetBit { id: usize, width: u32, bit: u32 },
    /// Bits `range_high` down to `range_low` of a net.
    NetSlice {
        id: usize,
        width: u32,
        range_high: u32,
        range_low: u32,
    },
    Constant { bit_width: u32, value: u64 },
    /// A named signal outside the netlist, such as a clock tree bus.
    Ref { name: String },
    /// One bit of a named signal.
    RefBit { name: String, bit: u32 },
}

impl Expr {
    pub fn from_point(point: &ConnectionPoint<'_>) -> Option<Expr> {
        point.net.map(|net| Expr::NetBit {
            id: net.id,
            width: net.width,
            bit: point.bit,
        })
    }

    pub fn net(net: &Net) -> Expr {
        Expr::Net {
            id: net.id,
            width: net.width,
        }
    }

    /// Points `low..high` of a contiguous end, as the narrowest expression naming them.
    ///
    /// Returns `None` if the end has a floating bit in that range.
    pub fn from_end_range(end: &End<'_>, low: u32, high: u32) -> Option<Expr> {
        if high <= low {
            return None;
        }
        let first = end.points.get(low as usize)?;
        let net = first.net?;
        let range_low = first.bit;
        let range_high = first.bit + (high - low) - 1;

        if high - low == 1 {
            Some(Expr::NetBit {
                id: net.id,
                width: net.width,
                bit: range_low,
            })
        } else if range_low == 0 && range_high + 1 == net.width {
            Some(Expr::net(net))
        } else {
            Some(Expr::NetSlice {
                id: net.id,
                width: net.width,
                range_high,
                range_low,
            })
        }
    }

    pub fn constant(value: u64, bit_width: u32) -> Expr {
        Expr::Constant { bit_width, value }
    }

    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            Expr::Net { id, width } => dialect::net_name(*id, *width),
            Expr::NetBit { id, width, bit } => {
                let name = dialect::net_name(*id, *width);
                if *width == 1 {
                    name
                } else {
                    dialect.bit_of(&name, bit)
                }
            }
            Expr::NetSlice {
                id,
                width,
                range_high,
                range_low,
            } => dialect.slice_of(&dialect::net_name(*id, *width), *range_high, *range_low),
            Expr::Constant { bit_width, value } => dialect.constant_vector(*value, *bit_width),
            Expr::Ref { name } => name.clone(),
            Expr::RefBit { name, bit } => dialect.bit_of(name, bit),
        }
    }

    /// The bits this expression denotes, least significant first. Named signals have no netlist bits.
    pub fn expand_bits(&self) -> Option<Vec<BitRef>> {
        match *self {
            Expr::Net { id, width } => Some((0..width).map(|bit| BitRef::Net { id, bit }).collect()),
            Expr::NetBit { id, bit, .. } => Some(vec![BitRef::Net { id, bit }]),
            Expr::NetSlice {
                id,
                range_high,
                range_low,
                ..
            } => Some(
                (range_low..=range_high)
                    .map(|bit| BitRef::Net { id, bit })
                    .collect(),
            ),
            Expr::Constant { bit_width, value } => Some(
                (0..bit_width)
                    .map(|bit| BitRef::Constant((value >> bit) & 1 != 0))
                    .collect(),
            ),
            Expr::Ref { .. } | Expr::RefBit { .. } => None,
        }
    }
}

/// A concurrent assignment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub target: Expr,
    pub source: Expr,
}

impl Assignment {
    pub fn render(&self, dialect: Dialect) -> String {
        dialect.assignment(&self.target.render(dialect), &self.source.render(dialect))
    }

    /// `(target bit, source bit)` pairs, or `None` if either side is not made of netlist bits.
    ///
    /// # Panics
    ///
    /// Panics if the two sides differ in width.
    pub fn expand_bits(&self) -> Option<Vec<(BitRef, BitRef)>> {
        let targets = self.target.expand_bits()?;
        let sources = self.source.expand_bits()?;
        if targets.len() != sources.len() {
            panic!(
                "Cannot assign {} bit(s) to {} bit(s) in {:?}.",
                sources.len(),
                targets.len(),
                self
            );
        }
        Some(targets.into_iter().zip(sources).collect())
    }
}

/// All `(target bit, source bit)` pairs of `assignments`, sorted so that shape doesn't matter.
pub fn bit_mapping(assignments: &[Assignment]) -> Option<Vec<(BitRef, BitRef)>> {
    let mut mapping = Vec::new();
    for assignment in assignments.iter() {
        mapping.extend(assignment.expand_bits()?);
    }
    mapping.sort();
    Some(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::netlist::{Direction, Netlist};

    #[test]
    fn end_ranges_pick_the_narrowest_name() {
        let n = Netlist::new();
        let bus = n.net(8);
        let end = End::whole(Direction::Output, bus);

        assert_eq!(
            Expr::from_end_range(&end, 0, 8),
            Some(Expr::Net { id: 0, width: 8 })
        );
        assert_eq!(
            Expr::from_end_range(&end, 2, 5),
            Some(Expr::NetSlice {
                id: 0,
                width: 8,
                range_high: 4,
                range_low: 2
            })
        );
        assert_eq!(
            Expr::from_end_range(&end, 7, 8),
            Some(Expr::NetBit {
                id: 0,
                width: 8,
                bit: 7
            })
        );
        assert_eq!(
            Expr::from_end_range(&End::floating(Direction::Output, 2), 0, 2),
            None
        );
    }

    #[test]
    fn rendering() {
        let a = Assignment {
            target: Expr::NetSlice {
                id: 3,
                width: 8,
                range_high: 7,
                range_low: 4,
            },
            source: Expr::constant(0xa, 4),
        };

        assert_eq!(a.render(Dialect::Vhdl), "s_logisimBus3(7 DOWNTO 4) <= X\"A\";");
        assert_eq!(
            a.render(Dialect::Verilog),
            "assign s_logisimBus3[7:4] = 4'hA;"
        );

        let b = Assignment {
            target: Expr::NetBit {
                id: 1,
                width: 1,
                bit: 0,
            },
            source: Expr::RefBit {
                name: "s_LOGISIM_CLOCK_TREE_0".to_string(),
                bit: 0,
            },
        };
        assert_eq!(
            b.render(Dialect::Verilog),
            "assign s_logisimNet1 = s_LOGISIM_CLOCK_TREE_0[0];"
        );
    }

    #[test]
    fn wide_and_per_bit_assignments_map_the_same_bits() {
        let wide = vec![Assignment {
            target: Expr::Net { id: 0, width: 3 },
            source: Expr::constant(0b101, 3),
        }];
        let per_bit = (0..3)
            .map(|bit| Assignment {
                target: Expr::NetBit { id: 0, width: 3, bit },
                source: Expr::constant((0b101 >> bit) & 1, 1),
            })
            .collect::<Vec<_>>();

        assert_eq!(bit_mapping(&wide), bit_mapping(&per_bit));
        assert!(bit_mapping(&wide).is_some());
    }

    #[test]
    #[should_panic(expected = "Cannot assign 2 bit(s) to 3 bit(s)")]
    fn width_mismatch_panics() {
        let a = Assignment {
            target: Expr::Net { id: 0, width: 3 },
            source: Expr::constant(0, 2),
        };

        let _ = a.expand_bits();
    }
}
