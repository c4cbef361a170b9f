// Shared between build.rs (via include!) and the crate's tests, so only absolute paths here.

/// Builds a circuit into an empty netlist.
pub type Fixture = for<'a> fn(&'a hdlgen::Netlist<'a>);

/// Every fixture with the circuit name it's generated under.
pub const FIXTURES: &[(&str, Fixture)] = &[
    ("clocked", clocked),
    ("extenders", extenders),
    ("rails", rails),
    ("faulty", faulty),
];

pub const DIALECTS: &[hdlgen::Dialect] = &[hdlgen::Dialect::Vhdl, hdlgen::Dialect::Verilog];

/// Two clocks with different timing, feeding two trees.
pub fn clocked<'a>(n: &'a hdlgen::Netlist<'a>) {
    use hdlgen::*;

    for &(high, low, phase, label) in &[(3i64, 5i64, 1i64, "slow"), (1, 1, 0, "fast")] {
        let net = n.net(1);
        let clock = n.component(
            ComponentKind::Clock,
            AttributeSet::new()
                .with(Attribute::HighTicks, high)
                .with(Attribute::LowTicks, low)
                .with(Attribute::Phase, phase)
                .with(Attribute::Label, label),
            vec![End::whole(Direction::Output, net)],
        );
        n.add_clock_source(clock);
    }
}

/// One extender per mode, widening a 4-bit constant to 9 bits.
pub fn extenders<'a>(n: &'a hdlgen::Netlist<'a>) {
    use hdlgen::*;

    let source = n.net(4);
    n.component(
        ComponentKind::Constant,
        AttributeSet::new().with(Attribute::Value, 0b1010i64),
        vec![End::whole(Direction::Output, source)],
    );
    let extension = n.net(1);
    n.component(
        ComponentKind::Power,
        AttributeSet::new(),
        vec![End::whole(Direction::Output, extension)],
    );

    for &mode in &[
        ExtensionMode::Zero,
        ExtensionMode::One,
        ExtensionMode::Sign,
        ExtensionMode::Input,
    ] {
        let target = n.net(9);
        n.component(
            ComponentKind::BitExtender,
            AttributeSet::new().with(Attribute::Extension, mode),
            vec![
                End::whole(Direction::Output, target),
                End::whole(Direction::Input, source),
                End::whole(Direction::Input, extension),
            ],
        );
    }
}

/// Supply rails soldered onto individual bits of a bus, plus an open marker.
pub fn rails<'a>(n: &'a hdlgen::Netlist<'a>) {
    use hdlgen::*;

    let bus = n.net(8);
    n.component(
        ComponentKind::Power,
        AttributeSet::new(),
        vec![End::new(
            Direction::Output,
            (4..8).map(|bit| ConnectionPoint::new(bus, bit)).collect(),
        )],
    );
    n.component(
        ComponentKind::Ground,
        AttributeSet::new(),
        vec![End::new(
            Direction::Output,
            vec![ConnectionPoint::new(bus, 0), ConnectionPoint::new(bus, 2)],
        )],
    );
    n.component(
        ComponentKind::NoConnect,
        AttributeSet::new(),
        vec![End::new(
            Direction::Input,
            vec![ConnectionPoint::new(bus, 1), ConnectionPoint::new(bus, 3)],
        )],
    );
}

/// Instances that cannot be generated, next to one that can.
pub fn faulty<'a>(n: &'a hdlgen::Netlist<'a>) {
    use hdlgen::*;

    let byte = n.net(8);
    n.component(
        ComponentKind::Constant,
        AttributeSet::new()
            .with(Attribute::Value, 300i64)
            .with(Attribute::Label, "big"),
        vec![End::whole(Direction::Output, byte)],
    );
    let unregistered = n.net(1);
    n.component(
        ComponentKind::Clock,
        AttributeSet::new()
            .with(Attribute::HighTicks, 2i64)
            .with(Attribute::LowTicks, 2i64)
            .with(Attribute::Phase, 0i64),
        vec![End::whole(Direction::Output, unregistered)],
    );
    let fine = n.net(3);
    n.component(
        ComponentKind::Constant,
        AttributeSet::new().with(Attribute::Value, 5i64),
        vec![End::whole(Direction::Output, fine)],
    );
}

/// Generates `fixture` and renders every file and diagnostic into one text.
///
/// Files start with a `== <relative path>` line; diagnostics follow as `!! <diagnostic>` lines.
pub fn render(
    fixture: Fixture,
    name: &str,
    dialect: hdlgen::Dialect,
) -> Result<String, hdlgen::Error> {
    use hdlgen::*;

    let n = Netlist::new();
    fixture(&n);

    let mut options = Options::new(dialect);
    options.project_name = "gen-tests".to_string();
    let mut log = DiagnosticLog::new();
    let output = CircuitGenerator::new(options).generate(&n, name, &mut log)?;

    let mut text = String::new();
    for file in output.files() {
        text.push_str(&format!("== {}\n", file.relative_path().display()));
        text.push_str(&file.contents());
    }
    for diagnostic in log.diagnostics.iter() {
        text.push_str(&format!("!! {}\n", diagnostic));
    }
    Ok(text)
}

/// File name a rendered fixture is stored under in `OUT_DIR`.
pub fn bundle_name(name: &str, dialect: hdlgen::Dialect) -> String {
    format!("{}.{}.txt", name, dialect.file_extension())
}
