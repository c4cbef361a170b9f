//! The read-only circuit graph generators consume.
//!
//! A [`Netlist`] owns every [`Net`] and [`NetlistComponent`] it hands out. Callers build the graph
//! once through `&'a self` methods and then pass shared references around freely.

mod attributes;

pub use attributes::*;

use crate::dialect::{self, Dialect};

use typed_arena::Arena;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

/// A wire or bus in the enclosing circuit.
#[derive(Debug)]
pub struct Net {
    pub id: usize,
    pub width: u32,
}

impl Net {
    /// The signal name this net is declared under in the enclosing circuit.
    pub fn name(&self) -> String {
        dialect::net_name(self.id, self.width)
    }

    /// Names bit `bit` of this net, which is the net itself for single-bit nets.
    pub fn bit_name(&self, dialect: Dialect, bit: u32) -> String {
        if self.width == 1 {
            self.name()
        } else {
            dialect.bit_of(&self.name(), bit)
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

/// One bit of an [`End`], soldered to bit `bit` of `net` when connected.
#[derive(Clone, Copy, Debug)]
pub struct ConnectionPoint<'a> {
    pub net: Option<&'a Net>,
    pub bit: u32,
}

impl<'a> ConnectionPoint<'a> {
    pub fn new(net: &'a Net, bit: u32) -> ConnectionPoint<'a> {
        ConnectionPoint {
            net: Some(net),
            bit,
        }
    }

    pub fn floating() -> ConnectionPoint<'a> {
        ConnectionPoint { net: None, bit: 0 }
    }

    pub fn is_connected(&self) -> bool {
        self.net.is_some()
    }
}

/// A port of a component instance, one [`ConnectionPoint`] per bit (least significant first).
#[derive(Clone, Debug)]
pub struct End<'a> {
    pub direction: Direction,
    pub points: Vec<ConnectionPoint<'a>>,
}

impl<'a> End<'a> {
    pub fn new(direction: Direction, points: Vec<ConnectionPoint<'a>>) -> End<'a> {
        End { direction, points }
    }

    /// An end covering all bits of `net`, in order.
    pub fn whole(direction: Direction, net: &'a Net) -> End<'a> {
        End::new(
            direction,
            (0..net.width).map(|bit| ConnectionPoint::new(net, bit)).collect(),
        )
    }

    /// An end of `width` bits, none of which are connected.
    pub fn floating(direction: Direction, width: u32) -> End<'a> {
        End::new(
            direction,
            (0..width).map(|_| ConnectionPoint::floating()).collect(),
        )
    }

    pub fn width(&self) -> u32 {
        self.points.len() as u32
    }

    /// Every bit has a net.
    pub fn is_connected(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(ConnectionPoint::is_connected)
    }

    /// No bit has a net.
    pub fn is_floating(&self) -> bool {
        self.points.iter().all(|point| !point.is_connected())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ComponentKind {
    Clock,
    Constant,
    Ground,
    Power,
    BitExtender,
    NoConnect,
}

impl ComponentKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ComponentKind::Clock => "Clock",
            ComponentKind::Constant => "Constant",
            ComponentKind::Ground => "Ground",
            ComponentKind::Power => "Power",
            ComponentKind::BitExtender => "Bit Extender",
            ComponentKind::NoConnect => "No-Connect",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A component instance with its attributes and ends.
#[derive(Debug)]
pub struct NetlistComponent<'a> {
    pub id: usize,
    pub kind: ComponentKind,
    pub attrs: AttributeSet,
    pub ends: Vec<End<'a>>,
}

impl<'a> NetlistComponent<'a> {
    pub fn end(&self, index: usize) -> Option<&End<'a>> {
        self.ends.get(index)
    }

    /// A human-readable reference for diagnostics: the label if present, else kind and id.
    pub fn describe(&self) -> String {
        match self.attrs.label() {
            Some(label) => format!("{} \"{}\"", self.kind, label),
            None => format!("{} #{}", self.kind, self.id),
        }
    }
}

/// Owner of a circuit's nets and component instances.
#[must_use]
pub struct Netlist<'a> {
    net_arena: Arena<Net>,
    component_arena: Arena<NetlistComponent<'a>>,

    nets: RefCell<Vec<&'a Net>>,
    components: RefCell<Vec<&'a NetlistComponent<'a>>>,
    clock_sources: RefCell<BTreeMap<usize, usize>>,
}

impl<'a> Netlist<'a> {
    pub fn new() -> Netlist<'a> {
        Netlist {
            net_arena: Arena::new(),
            component_arena: Arena::new(),

            nets: RefCell::new(Vec::new()),
            components: RefCell::new(Vec::new()),
            clock_sources: RefCell::new(BTreeMap::new()),
        }
    }

    /// Creates a net of `width` bits.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn net(&'a self, width: u32) -> &'a Net {
        if width == 0 {
            panic!("Cannot create a net with a width of 0 bits.");
        }
        let id = self.nets.borrow().len();
        let net = self.net_arena.alloc(Net { id, width });
        self.nets.borrow_mut().push(net);
        net
    }

    /// Creates a component instance. Instances get sequential ids in creation order.
    pub fn component(
        &'a self,
        kind: ComponentKind,
        attrs: AttributeSet,
        ends: Vec<End<'a>>,
    ) -> &'a NetlistComponent<'a> {
        let id = self.components.borrow().len();
        let component = self.component_arena.alloc(NetlistComponent {
            id,
            kind,
            attrs,
            ends,
        });
        self.components.borrow_mut().push(component);
        component
    }

    /// Registers `component` as the source of a new clock tree and returns the tree's id.
    ///
    /// # Panics
    ///
    /// Panics if `component` is not a clock, or already drives a clock tree.
    pub fn add_clock_source(&'a self, component: &'a NetlistComponent<'a>) -> usize {
        if component.kind != ComponentKind::Clock {
            panic!(
                "Cannot use {} as a clock source because it is not a clock.",
                component.describe()
            );
        }
        let mut clock_sources = self.clock_sources.borrow_mut();
        if clock_sources.contains_key(&component.id) {
            panic!(
                "Cannot use {} as a clock source twice.",
                component.describe()
            );
        }
        let tree = clock_sources.len();
        clock_sources.insert(component.id, tree);
        tree
    }

    /// The clock tree driven by `component`, if it is a registered clock source.
    pub fn clock_source_id(&self, component: &NetlistComponent<'a>) -> Option<usize> {
        self.clock_sources.borrow().get(&component.id).copied()
    }

    pub fn nets(&self) -> Vec<&'a Net> {
        self.nets.borrow().clone()
    }

    pub fn components(&self) -> Vec<&'a NetlistComponent<'a>> {
        self.components.borrow().clone()
    }

    /// Whether end `end_index` of `component` maps onto consecutive, increasing bits of one net.
    ///
    /// Single-bit ends are always contiguous. Ends with any floating bit never are.
    pub fn is_contiguous_bus(&self, component: &NetlistComponent<'_>, end_index: usize) -> bool {
        let end = match component.end(end_index) {
            Some(end) => end,
            None => return false,
        };
        if end.width() == 1 {
            return true;
        }
        let (first_net, first_bit) = match end.points.first() {
            Some(ConnectionPoint {
                net: Some(net),
                bit,
            }) => (*net, *bit),
            _ => return false,
        };
        end.points.iter().enumerate().all(|(offset, point)| {
            point.net.map_or(false, |net| net.id == first_net.id) && point.bit == first_bit + offset as u32
        })
    }
}
