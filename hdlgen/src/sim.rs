//! Cycle-accurate reference models of generated modules.
//!
//! A model steps once per rising edge of the global clock and updates its registers exactly the
//! way the generated text does, which makes it usable both as documentation of the intended
//! waveforms and as an oracle in tests.

use crate::declarations::ParameterMap;
use crate::generators::{HIGH_TICKS, LOW_TICKS, NR_OF_BITS, PHASE};
use crate::runtime::tracing::{Trace, TraceValue, TraceValueType};

use std::io;

/// Model of the clock generator module (`CLOCKGEN`).
#[derive(Clone, Debug)]
pub struct ClockGeneratorModel {
    high_ticks: u64,
    low_ticks: u64,
    nr_of_bits: u32,

    global_clock: bool,
    counter_reg: u64,
    derived_clock_reg: Vec<bool>,
    buf_regs: [bool; 2],
    output_regs: [bool; 4],
}

impl ClockGeneratorModel {
    /// Builds a model from the parameters a clock instance resolved to.
    ///
    /// Returns `None` if a parameter is missing or out of range.
    pub fn new(parameters: &ParameterMap) -> Option<ClockGeneratorModel> {
        let high_ticks = parameters.get(HIGH_TICKS)?;
        let low_ticks = parameters.get(LOW_TICKS)?;
        let phase = parameters.get(PHASE)?;
        let nr_of_bits = parameters.get(NR_OF_BITS)?;
        if high_ticks < 1 || low_ticks < 1 || phase < 1 || nr_of_bits < 1 || nr_of_bits > 64 {
            return None;
        }

        Some(ClockGeneratorModel {
            high_ticks: high_ticks as u64,
            low_ticks: low_ticks as u64,
            nr_of_bits: nr_of_bits as u32,

            global_clock: false,
            counter_reg: 0,
            derived_clock_reg: vec![false; phase as usize],
            buf_regs: [false; 2],
            output_regs: [false; 4],
        })
    }

    fn counter_mask(&self) -> u64 {
        if self.nr_of_bits >= 64 {
            u64::max_value()
        } else {
            (1 << self.nr_of_bits) - 1
        }
    }

    fn tap(&self) -> bool {
        self.derived_clock_reg[self.derived_clock_reg.len() - 1]
    }

    /// Simulates one rising edge of the global clock, with `tick` as the `ClockTick` input.
    pub fn posedge_global_clock(&mut self, tick: bool) {
        let tap = self.tap();
        let counter_is_zero = self.counter_reg == 0;
        let counter_next = if !counter_is_zero {
            self.counter_reg - 1
        } else if self.derived_clock_reg[0] {
            (self.low_ticks - 1) & self.counter_mask()
        } else {
            (self.high_ticks - 1) & self.counter_mask()
        };

        self.output_regs = [
            self.buf_regs[0],
            self.buf_regs[1],
            !self.buf_regs[0] && tap,
            self.buf_regs[0] && !tap,
        ];
        self.buf_regs = [tap, !tap];

        if tick {
            let first = self.derived_clock_reg[0] ^ counter_is_zero;
            self.derived_clock_reg.rotate_right(1);
            self.derived_clock_reg[0] = first;
            self.counter_reg = counter_next;
        }

        self.global_clock = true;
    }

    /// Simulates the falling edge of the global clock. Only the clock bus bit following the
    /// global clock changes.
    pub fn negedge_global_clock(&mut self) {
        self.global_clock = false;
    }

    pub fn derived_clock(&self) -> bool {
        self.output_regs[0]
    }

    pub fn inverted_derived_clock(&self) -> bool {
        self.output_regs[1]
    }

    /// High for one global clock cycle before each rising edge of the derived clock.
    pub fn positive_edge_tick(&self) -> bool {
        self.output_regs[2]
    }

    /// High for one global clock cycle before each falling edge of the derived clock.
    pub fn negative_edge_tick(&self) -> bool {
        self.output_regs[3]
    }

    pub fn global_clock(&self) -> bool {
        self.global_clock
    }

    /// The five-bit clock bus, bit 0 being the derived clock and bit 4 the global clock.
    pub fn clock_bus(&self) -> u8 {
        let bits = [
            self.derived_clock(),
            self.inverted_derived_clock(),
            self.positive_edge_tick(),
            self.negative_edge_tick(),
            self.global_clock,
        ];
        bits.iter()
            .enumerate()
            .fold(0, |bus, (index, &bit)| bus | ((bit as u8) << index))
    }

    pub fn counter(&self) -> u64 {
        self.counter_reg
    }
}

/// Runs `model` for one global clock cycle per element of `ticks`, recording every signal of the
/// clock bus and the counter into `trace`.
///
/// Each cycle takes two time units: the rising edge at even time stamps and the falling edge at
/// odd ones.
pub fn trace_clock<T, I>(model: &mut ClockGeneratorModel, ticks: I, trace: &mut T) -> io::Result<()>
where
    T: Trace,
    I: IntoIterator<Item = bool>,
{
    trace.push_module("CLOCKGEN")?;
    let global_clock = trace.add_signal("GlobalClock", 1, TraceValueType::Bool)?;
    let clock_tick = trace.add_signal("ClockTick", 1, TraceValueType::Bool)?;
    let derived_clock = trace.add_signal("DerivedClock", 1, TraceValueType::Bool)?;
    let inverted_derived_clock = trace.add_signal("InvertedDerivedClock", 1, TraceValueType::Bool)?;
    let positive_edge_tick = trace.add_signal("PositiveEdgeTick", 1, TraceValueType::Bool)?;
    let negative_edge_tick = trace.add_signal("NegativeEdgeTick", 1, TraceValueType::Bool)?;
    let counter_type = TraceValueType::from_bit_width(model.nr_of_bits);
    let counter = trace.add_signal("s_counter_reg", model.nr_of_bits, counter_type)?;
    trace.pop_module()?;

    let counter_value = |value: u64| match counter_type {
        TraceValueType::Bool => TraceValue::Bool(value != 0),
        TraceValueType::U32 => TraceValue::U32(value as u32),
        TraceValueType::U64 => TraceValue::U64(value),
    };

    for (cycle, tick) in ticks.into_iter().enumerate() {
        model.posedge_global_clock(tick);

        trace.update_time_stamp(2 * cycle as u64)?;
        trace.update_signal(&global_clock, TraceValue::Bool(model.global_clock()))?;
        trace.update_signal(&clock_tick, TraceValue::Bool(tick))?;
        trace.update_signal(&derived_clock, TraceValue::Bool(model.derived_clock()))?;
        trace.update_signal(
            &inverted_derived_clock,
            TraceValue::Bool(model.inverted_derived_clock()),
        )?;
        trace.update_signal(
            &positive_edge_tick,
            TraceValue::Bool(model.positive_edge_tick()),
        )?;
        trace.update_signal(
            &negative_edge_tick,
            TraceValue::Bool(model.negative_edge_tick()),
        )?;
        trace.update_signal(&counter, counter_value(model.counter()))?;

        model.negedge_global_clock();

        trace.update_time_stamp(2 * cycle as u64 + 1)?;
        trace.update_signal(&global_clock, TraceValue::Bool(model.global_clock()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::netlist::{Attribute, AttributeSet};
    use crate::generators::ClockGenerator;
    use crate::generator::ModuleGenerator;
    use crate::runtime::tracing::vcd::{TimescaleUnit, VcdTrace};

    fn model(high: i64, low: i64, phase: i64) -> ClockGeneratorModel {
        let attrs = AttributeSet::new()
            .with(Attribute::HighTicks, high)
            .with(Attribute::LowTicks, low)
            .with(Attribute::Phase, phase);
        let parameters = ClockGenerator::new()
            .declarations()
            .resolve(&attrs)
            .unwrap();
        ClockGeneratorModel::new(&parameters).unwrap()
    }

    /// Derived clock level after each of `cycles` rising edges, ticking every `tick_every` cycles.
    fn waveform(model: &mut ClockGeneratorModel, cycles: usize, tick_every: usize) -> Vec<bool> {
        (0..cycles)
            .map(|cycle| {
                model.posedge_global_clock(cycle % tick_every == 0);
                model.negedge_global_clock();
                model.derived_clock()
            })
            .collect()
    }

    /// Lengths of the runs of equal values, without the first and last (incomplete) runs.
    fn run_lengths(levels: &[bool]) -> Vec<(bool, usize)> {
        let mut runs: Vec<(bool, usize)> = Vec::new();
        for &level in levels {
            match runs.last_mut() {
                Some((value, length)) if *value == level => *length += 1,
                _ => runs.push((level, 1)),
            }
        }
        runs.pop();
        runs.into_iter().skip(1).collect()
    }

    #[test]
    fn duty_cycle_with_tick_every_cycle() {
        let mut m = model(3, 5, 1);
        let runs = run_lengths(&waveform(&mut m, 100, 1));

        assert!(runs.len() > 10);
        for (level, length) in runs {
            assert_eq!(length, if level { 3 } else { 5 });
        }
    }

    #[test]
    fn duty_cycle_with_tick_every_other_cycle() {
        let mut m = model(3, 5, 1);
        let runs = run_lengths(&waveform(&mut m, 200, 2));

        assert!(runs.len() > 10);
        for (level, length) in runs {
            assert_eq!(length, if level { 6 } else { 10 });
        }
    }

    #[test]
    fn symmetric_clock_without_phase() {
        let mut m = model(1, 1, 0);
        let levels = waveform(&mut m, 20, 1);

        for (level, length) in run_lengths(&levels) {
            assert_eq!(length, 1, "{} run", level);
        }
    }

    #[test]
    fn phase_shifts_the_waveform() {
        let mut reference = model(2, 2, 0);
        let mut shifted = model(2, 2, 1);
        let reference = waveform(&mut reference, 40, 1);
        let shifted = waveform(&mut shifted, 40, 1);

        // One tick of phase moves every edge one cycle earlier.
        assert_eq!(&shifted[10..39], &reference[11..40]);
    }

    #[test]
    fn edge_ticks_precede_derived_clock_edges() {
        let mut m = model(3, 5, 1);
        let mut samples = Vec::new();
        for _ in 0..80 {
            m.posedge_global_clock(true);
            samples.push((
                m.derived_clock(),
                m.inverted_derived_clock(),
                m.positive_edge_tick(),
                m.negative_edge_tick(),
            ));
        }

        for k in 2..samples.len() - 1 {
            let (out0, out1, out2, out3) = samples[k];
            let next = samples[k + 1].0;
            assert_eq!(out1, !out0, "cycle {}", k);
            assert_eq!(out2, !out0 && next, "cycle {}", k);
            assert_eq!(out3, out0 && !next, "cycle {}", k);
        }
        assert!(samples.iter().any(|sample| sample.2));
        assert!(samples.iter().any(|sample| sample.3));
    }

    #[test]
    fn clock_bus_packs_all_outputs() {
        let mut m = model(1, 1, 0);
        m.posedge_global_clock(true);
        assert_eq!(m.clock_bus() & 0x10, 0x10);
        m.negedge_global_clock();
        assert_eq!(m.clock_bus() & 0x10, 0);
    }

    #[test]
    fn missing_parameter_yields_no_model() {
        assert!(ClockGeneratorModel::new(&ParameterMap::default()).is_none());
    }

    #[test]
    fn trace_to_vcd() {
        let mut m = model(3, 5, 1);
        let mut buffer = Vec::new();
        {
            let mut trace = VcdTrace::new(&mut buffer, 10, TimescaleUnit::NS).unwrap();
            trace_clock(&mut m, std::iter::repeat(true).take(16), &mut trace).unwrap();
        }
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("$scope module CLOCKGEN $end"));
        assert!(text.contains("DerivedClock $end"));
        assert!(text.contains("s_counter_reg $end"));
        assert!(text.contains("#31"));
    }
}
