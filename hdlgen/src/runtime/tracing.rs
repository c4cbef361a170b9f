//! Tracing of reference model signals over time.

pub mod vcd;

use std::io;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceValue {
    /// Contains a boolean value
    Bool(bool),
    /// Contains an unsigned, 32-bit value
    U32(u32),
    /// Contains an unsigned, 64-bit value
    U64(u64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceValueType {
    Bool,
    U32,
    U64,
}

impl TraceValueType {
    pub(crate) fn from_bit_width(bit_width: u32) -> TraceValueType {
        if bit_width == 1 {
            TraceValueType::Bool
        } else if bit_width <= 32 {
            TraceValueType::U32
        } else if bit_width <= 64 {
            TraceValueType::U64
        } else {
            unreachable!()
        }
    }
}

/// A sink for signal changes, organized into a module hierarchy.
///
/// Signals are declared between `push_module` and the matching `pop_module`; value updates follow
/// once the outermost module has been popped.
pub trait Trace {
    type SignalId;

    fn push_module(&mut self, name: &str) -> io::Result<()>;
    fn pop_module(&mut self) -> io::Result<()>;
    fn add_signal(
        &mut self,
        name: &str,
        bit_width: u32,
        type_: TraceValueType,
    ) -> io::Result<Self::SignalId>;

    fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()>;
    fn update_signal(&mut self, signal_id: &Self::SignalId, value: TraceValue) -> io::Result<()>;
}
