use argh::FromArgs;
use hdlgen::generator::ModuleGenerator;
use hdlgen::generators::ClockGenerator;
use hdlgen::runtime::tracing::vcd::{TimescaleUnit, VcdTrace};
use hdlgen::sim::{self, ClockGeneratorModel};
use hdlgen::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(FromArgs)]
/// Generate HDL for a small demonstration circuit.
struct Opts {
    /// output dialect: `vhdl` or `verilog`
    #[argh(option, default = "Dialect::Vhdl")]
    dialect: Dialect,

    /// directory to write the generated files to; printed to stdout if omitted
    #[argh(option)]
    out_dir: Option<PathBuf>,

    /// leave explanatory remarks out of the generated text
    #[argh(switch)]
    no_remarks: bool,

    /// write the reference waveform of the demo clock to this VCD file
    #[argh(option)]
    vcd: Option<PathBuf>,

    /// logging level
    #[argh(option, default = "log::LevelFilter::Warn")]
    log_level: log::LevelFilter,
}

/// High, low and phase ticks of the demo clock.
const DEMO_CLOCK: (i64, i64, i64) = (3, 5, 1);

fn build_demo<'a>(n: &'a Netlist<'a>) {
    let (high, low, phase) = DEMO_CLOCK;

    let clock_net = n.net(1);
    let clock = n.component(
        ComponentKind::Clock,
        AttributeSet::new()
            .with(Attribute::HighTicks, high)
            .with(Attribute::LowTicks, low)
            .with(Attribute::Phase, phase)
            .with(Attribute::Label, "sysclk"),
        vec![End::whole(Direction::Output, clock_net)],
    );
    n.add_clock_source(clock);

    let narrow = n.net(4);
    let wide = n.net(10);
    n.component(
        ComponentKind::Constant,
        AttributeSet::new()
            .with(Attribute::Value, 10i64)
            .with(Attribute::Label, "ten"),
        vec![End::whole(Direction::Output, narrow)],
    );
    n.component(
        ComponentKind::BitExtender,
        AttributeSet::new().with(Attribute::Extension, ExtensionMode::Sign),
        vec![
            End::whole(Direction::Output, wide),
            End::whole(Direction::Input, narrow),
        ],
    );

    let rails = n.net(2);
    n.component(
        ComponentKind::Power,
        AttributeSet::new(),
        vec![End::new(
            Direction::Output,
            vec![ConnectionPoint::new(rails, 1)],
        )],
    );
    n.component(
        ComponentKind::Ground,
        AttributeSet::new(),
        vec![End::new(
            Direction::Output,
            vec![ConnectionPoint::new(rails, 0)],
        )],
    );
    n.component(
        ComponentKind::NoConnect,
        AttributeSet::new(),
        vec![End::whole(Direction::Input, wide)],
    );
}

fn write_waveform(path: &Path) -> io::Result<()> {
    let (high, low, phase) = DEMO_CLOCK;
    let attrs = AttributeSet::new()
        .with(Attribute::HighTicks, high)
        .with(Attribute::LowTicks, low)
        .with(Attribute::Phase, phase);
    let parameters = ClockGenerator::new()
        .declarations()
        .resolve(&attrs)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let mut model = ClockGeneratorModel::new(&parameters).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "demo clock has invalid parameters")
    })?;

    let mut trace = VcdTrace::new(fs::File::create(path)?, 1, TimescaleUnit::NS)?;
    let period = (high + low) as usize;
    sim::trace_clock(&mut model, std::iter::repeat(true).take(4 * period), &mut trace)
}

fn main() -> Result<(), Error> {
    let opts: Opts = argh::from_env();

    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(opts.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    let mut options = Options::new(opts.dialect);
    options.remarks = !opts.no_remarks;
    options.project_name = "demo".to_string();

    let n = Netlist::new();
    build_demo(&n);

    let mut reporter = LogReporter::default();
    let output = CircuitGenerator::new(options).generate(&n, "demo", &mut reporter)?;

    match opts.out_dir {
        Some(ref root) => {
            for path in output.write_to(root)? {
                log::info!("Wrote {}", path.display());
            }
        }
        None => {
            for file in output.files() {
                println!("{}", file.relative_path().display());
                print!("{}", file.contents());
                println!();
            }
        }
    }

    if let Some(ref path) = opts.vcd {
        write_waveform(path)?;
        log::info!("Wrote {}", path.display());
    }

    if reporter.error_count > 0 {
        log::error!("{} component(s) could not be generated", reporter.error_count);
        process::exit(1);
    }

    Ok(())
}
