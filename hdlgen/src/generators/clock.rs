//! Derived clock generation.
//!
//! Every clock in a circuit becomes one instance of the `CLOCKGEN` module. It runs off the global
//! FPGA clock and a tick enable, and drives a 5-bit clock tree bus:
//!
//! | bit | signal                                  |
//! |-----|-----------------------------------------|
//! | 0   | derived clock                           |
//! | 1   | inverted derived clock                  |
//! | 2   | one-cycle tick on derived rising edge   |
//! | 3   | one-cycle tick on derived falling edge  |
//! | 4   | global clock                            |
//!
//! On each global clock edge with the tick asserted, a down-counter either decrements or, at zero,
//! toggles the derived clock and reloads with the length of the next half period. The derived clock
//! then passes through a `Phase`-deep shift register that implements the phase offset.

use crate::declarations::{Declarations, Formula, Resolution, Width};
use crate::dialect::Dialect;
use crate::error::GenerateError;
use crate::generator::{ModuleGenerator, PortMap};
use crate::line_buffer::LineBuffer;
use crate::netlist::{Attribute, Netlist, NetlistComponent};

pub const NR_OF_CLOCK_BITS: u32 = 5;
pub const DERIVED_CLOCK_INDEX: u32 = 0;
pub const INVERTED_DERIVED_CLOCK_INDEX: u32 = 1;
pub const POSITIVE_EDGE_TICK_INDEX: u32 = 2;
pub const NEGATIVE_EDGE_TICK_INDEX: u32 = 3;
pub const GLOBAL_CLOCK_INDEX: u32 = 4;

/// Name prefix of clock tree buses, suffixed with the tree id.
pub const CLOCK_TREE_NAME: &str = "LOGISIM_CLOCK_TREE_";
/// Global clock input of the top-level circuit.
pub const FPGA_CLOCK: &str = "FPGA_GlobalClock";
/// Tick enable input of the top-level circuit.
pub const FPGA_TICK: &str = "FPGA_Tick";

pub const HIGH_TICKS: &str = "HighTicks";
pub const LOW_TICKS: &str = "LowTicks";
pub const PHASE: &str = "Phase";
pub const NR_OF_BITS: &str = "NrOfBits";

/// Signal carrying clock tree `tree` in the enclosing circuit.
pub fn clock_tree_bus(tree: usize) -> String {
    format!("s_{}{}", CLOCK_TREE_NAME, tree)
}

pub struct ClockGenerator {
    declarations: Declarations,
}

impl ClockGenerator {
    pub fn new() -> ClockGenerator {
        let mut declarations = Declarations::new();
        declarations
            .add_parameter(HIGH_TICKS, Resolution::Attribute(Attribute::HighTicks))
            .add_parameter(LOW_TICKS, Resolution::Attribute(Attribute::LowTicks))
            .add_parameter(
                PHASE,
                Resolution::Formula(Formula::PhaseDelay {
                    high: Attribute::HighTicks,
                    low: Attribute::LowTicks,
                    phase: Attribute::Phase,
                }),
            )
            .add_parameter(
                NR_OF_BITS,
                Resolution::Formula(Formula::MinBits(Attribute::HighTicks, Attribute::LowTicks)),
            )
            .add_input("GlobalClock", Width::Literal(1))
            .add_input("ClockTick", Width::Literal(1))
            .add_output("ClockBus", Width::Literal(NR_OF_CLOCK_BITS))
            .add_wire("s_counter_next", Width::Parameter(NR_OF_BITS))
            .add_wire("s_counter_is_zero", Width::Literal(1))
            .add_register("s_output_regs", Width::Literal(NR_OF_CLOCK_BITS - 1))
            .add_register("s_buf_regs", Width::Literal(2))
            .add_register("s_counter_reg", Width::Parameter(NR_OF_BITS))
            .add_register("s_derived_clock_reg", Width::Parameter(PHASE));

        ClockGenerator { declarations }
    }
}

impl Default for ClockGenerator {
    fn default() -> Self {
        ClockGenerator::new()
    }
}

impl ModuleGenerator for ClockGenerator {
    fn component_identifier(&self) -> &'static str {
        "CLOCKGEN"
    }

    fn sub_directory(&self) -> &'static str {
        "base"
    }

    fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    fn port_map<'a>(
        &self,
        netlist: &Netlist<'a>,
        component: &NetlistComponent<'a>,
    ) -> Result<PortMap, GenerateError> {
        let tree = netlist
            .clock_source_id(component)
            .ok_or(GenerateError::MissingClockTree)?;

        let mut map = PortMap::new();
        map.insert("GlobalClock", FPGA_CLOCK.to_string());
        map.insert("ClockTick", FPGA_TICK.to_string());
        map.insert("ClockBus", clock_tree_bus(tree));
        Ok(map)
    }

    fn module_functionality(&self, dialect: Dialect) -> Vec<String> {
        let tap = dialect.bit_of("s_derived_clock_reg", format!("{}-1", PHASE));
        let first = dialect.bit_of("s_derived_clock_reg", 0);

        let mut contents = LineBuffer::new(dialect);
        contents
            .add_remark_block(
                "Here the output signals are defined; we synchronize them all on the main clock",
            )
            .add_lines(vec![dialect.assignment(
                "ClockBus",
                &dialect.concat(&["GlobalClock".to_string(), "s_output_regs".to_string()]),
            )]);

        let mut outputs = LineBuffer::new(dialect);
        outputs
            .pair("tap", &tap)
            .add(
                "
                s_buf_regs{{<}}0{{>}}    <= {{tap}};
                s_buf_regs{{<}}1{{>}}    <= {{not}}{{tap}};
                s_output_regs{{<}}0{{>}} <= s_buf_regs{{<}}0{{>}};
                s_output_regs{{<}}1{{>}} <= s_buf_regs{{<}}1{{>}};
                s_output_regs{{<}}2{{>}} <= {{not}}s_buf_regs{{<}}0{{>}}{{and}}{{tap}};
                s_output_regs{{<}}3{{>}} <= s_buf_regs{{<}}0{{>}}{{and}}{{not}}{{tap}};
                ",
            );
        contents.add_lines(dialect.clocked_process(
            "makeOutputs",
            "GlobalClock",
            None,
            outputs.lines(),
        ));

        contents
            .empty()
            .add_remark_block("Here the control signals are defined")
            .add_lines(dialect.select(
                "s_counter_is_zero",
                &[(
                    dialect.equals(
                        "s_counter_reg",
                        &dialect.unsigned_constant("0", NR_OF_BITS),
                    ),
                    dialect.bit(true).to_string(),
                )],
                dialect.bit(false),
            ))
            .add_lines(dialect.select(
                "s_counter_next",
                &[
                    (
                        dialect.equals("s_counter_is_zero", dialect.bit(false)),
                        dialect.decrement("s_counter_reg"),
                    ),
                    (
                        dialect.equals(&first, dialect.bit(true)),
                        dialect.unsigned_constant(&format!("{}-1", LOW_TICKS), NR_OF_BITS),
                    ),
                ],
                &dialect.unsigned_constant(&format!("{}-1", HIGH_TICKS), NR_OF_BITS),
            ));

        let mut derived = LineBuffer::new(dialect);
        derived
            .add_lines(dialect.descending_loop(
                "shiftDerivedClock",
                "n",
                &format!("{}-1", PHASE),
                "1",
                &[dialect.register_update(
                    &dialect.bit_of("s_derived_clock_reg", "n"),
                    &dialect.bit_of("s_derived_clock_reg", "n-1"),
                )],
            ))
            .pair("first", &first)
            .add("{{first}} <= {{first}}{{xor}}s_counter_is_zero;");

        contents
            .empty()
            .add_remark_block("Here the state registers are defined")
            .add_lines(dialect.clocked_process(
                "makeDerivedClock",
                "GlobalClock",
                Some("ClockTick"),
                derived.lines(),
            ))
            .empty()
            .add_lines(dialect.clocked_process(
                "makeCounter",
                "GlobalClock",
                Some("ClockTick"),
                &[dialect.register_update("s_counter_reg", "s_counter_next")],
            ));

        contents.into_lines()
    }
}
