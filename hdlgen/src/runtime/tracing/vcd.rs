//! [VCD](https://en.wikipedia.org/wiki/Value_change_dump) format tracing implementation.

extern crate vcd;

use super::*;

use std::io;

pub use self::vcd::TimescaleUnit;

/// Writes a trace as a value change dump, viewable in GTKWave and friends.
///
/// Only changes are written: updating a signal to the value it already holds emits nothing, and a
/// time stamp is emitted once the first change at it is. The header is closed by the first time
/// stamp or value update, after which no modules or signals can be added.
pub struct VcdTrace<W: io::Write> {
    open_modules: u32,
    header_closed: bool,
    pending_time_stamp: Option<u64>,

    signals: Vec<VcdSignal>,

    w: vcd::Writer<W>,
}

struct VcdSignal {
    bit_width: u32,
    type_: TraceValueType,
    id: vcd::IdCode,
    /// Last value written, as raw bits.
    value: Option<u64>,
}

impl<W: io::Write> VcdTrace<W> {
    pub fn new(w: W, time_scale: u32, unit: TimescaleUnit) -> io::Result<VcdTrace<W>> {
        let mut w = vcd::Writer::new(w);
        w.timescale(time_scale, unit)?;

        Ok(VcdTrace {
            open_modules: 0,
            header_closed: false,
            pending_time_stamp: None,

            signals: Vec::new(),

            w,
        })
    }

    fn close_header(&mut self) -> io::Result<()> {
        if self.header_closed {
            return Ok(());
        }
        if self.open_modules != 0 {
            return Err(invalid_input(format!(
                "{} module(s) still open when tracing values",
                self.open_modules
            )));
        }
        self.w.enddefinitions()?;
        self.header_closed = true;
        Ok(())
    }

    fn check_header_open(&self, what: &str) -> io::Result<()> {
        if self.header_closed {
            return Err(invalid_input(format!(
                "cannot add {} after values have been traced",
                what
            )));
        }
        Ok(())
    }
}

impl<W: io::Write> Trace for VcdTrace<W> {
    type SignalId = usize;

    fn push_module(&mut self, name: &str) -> io::Result<()> {
        self.check_header_open(&format!("module `{}`", name))?;
        self.w.add_module(name)?;
        self.open_modules += 1;
        Ok(())
    }

    fn pop_module(&mut self) -> io::Result<()> {
        if self.open_modules == 0 {
            return Err(invalid_input("module hierarchy underflow"));
        }
        self.w.upscope()?;
        self.open_modules -= 1;
        Ok(())
    }

    fn add_signal(
        &mut self,
        name: &str,
        bit_width: u32,
        type_: TraceValueType,
    ) -> io::Result<Self::SignalId> {
        self.check_header_open(&format!("signal `{}`", name))?;
        if bit_width == 0 || bit_width > 64 {
            return Err(invalid_input(format!(
                "signal `{}` has unsupported width {}",
                name, bit_width
            )));
        }

        let id = self.w.add_wire(bit_width, name)?;
        self.signals.push(VcdSignal {
            bit_width,
            type_,
            id,
            value: None,
        });
        Ok(self.signals.len() - 1)
    }

    fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()> {
        self.close_header()?;
        self.pending_time_stamp = Some(time_stamp);
        Ok(())
    }

    fn update_signal(&mut self, signal_id: &Self::SignalId, value: TraceValue) -> io::Result<()> {
        self.close_header()?;

        let signal = self
            .signals
            .get_mut(*signal_id)
            .ok_or_else(|| invalid_input("unknown signal id"))?;
        let bits = match (signal.type_, value) {
            (TraceValueType::Bool, TraceValue::Bool(value)) => u64::from(value),
            (TraceValueType::U32, TraceValue::U32(value)) => u64::from(value),
            (TraceValueType::U64, TraceValue::U64(value)) => value,
            _ => {
                return Err(invalid_input(format!(
                    "value {:?} doesn't match signal type {:?}",
                    value, signal.type_
                )));
            }
        };
        if signal.value == Some(bits) {
            return Ok(());
        }
        signal.value = Some(bits);

        if let Some(time_stamp) = self.pending_time_stamp.take() {
            self.w.timestamp(time_stamp)?;
        }
        if signal.type_ == TraceValueType::Bool {
            self.w.change_scalar(signal.id, bits != 0)
        } else {
            write_vector(&mut self.w, signal, bits)
        }
    }
}

/// Writes `value` most significant bit first.
fn write_vector<W: io::Write>(
    w: &mut vcd::Writer<W>,
    signal: &VcdSignal,
    value: u64,
) -> io::Result<()> {
    let bits = (0..signal.bit_width)
        .rev()
        .map(|bit| vcd::Value::from((value >> bit) & 1 != 0))
        .collect::<Vec<_>>();
    w.change_vector(signal.id, &bits)
}

fn invalid_input(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.into())
}
