pub mod fixtures;

#[cfg(test)]
mod tests {
    extern crate hdlgen;

    use super::fixtures::*;

    use hdlgen::Dialect;

    use std::collections::BTreeMap;

    macro_rules! bundle {
        ($name:literal, $extension:literal) => {
            include_str!(concat!(env!("OUT_DIR"), "/", $name, ".", $extension, ".txt"))
        };
    }

    fn bundles() -> Vec<(&'static str, Dialect, &'static str)> {
        vec![
            ("clocked", Dialect::Vhdl, bundle!("clocked", "vhd")),
            ("clocked", Dialect::Verilog, bundle!("clocked", "v")),
            ("extenders", Dialect::Vhdl, bundle!("extenders", "vhd")),
            ("extenders", Dialect::Verilog, bundle!("extenders", "v")),
            ("rails", Dialect::Vhdl, bundle!("rails", "vhd")),
            ("rails", Dialect::Verilog, bundle!("rails", "v")),
            ("faulty", Dialect::Vhdl, bundle!("faulty", "vhd")),
            ("faulty", Dialect::Verilog, bundle!("faulty", "v")),
        ]
    }

    struct Bundle {
        files: BTreeMap<String, Vec<String>>,
        diagnostics: Vec<String>,
    }

    impl Bundle {
        fn parse(text: &str) -> Bundle {
            let mut files = BTreeMap::new();
            let mut diagnostics = Vec::new();
            let mut current: Option<String> = None;
            for line in text.lines() {
                if let Some(path) = line.strip_prefix("== ") {
                    files.insert(path.to_string(), Vec::new());
                    current = Some(path.to_string());
                } else if let Some(diagnostic) = line.strip_prefix("!! ") {
                    diagnostics.push(diagnostic.to_string());
                } else if let Some(ref path) = current {
                    files
                        .get_mut(path)
                        .expect("line before first file header")
                        .push(line.to_string());
                }
            }
            Bundle { files, diagnostics }
        }

        fn file(&self, path: &str) -> &[String] {
            match self.files.get(path) {
                Some(lines) => lines,
                None => panic!("no file {} among {:?}", path, self.files.keys()),
            }
        }

        fn has_line(&self, path: &str, expected: &str) -> bool {
            self.file(path).iter().any(|line| line.trim() == expected)
        }
    }

    fn count(lines: &[String], predicate: impl Fn(&str) -> bool) -> usize {
        lines.iter().filter(|line| predicate(line.trim())).count()
    }

    #[test]
    fn generated_output_is_deterministic() {
        for (name, dialect, text) in bundles() {
            let &(_, fixture) = FIXTURES
                .iter()
                .find(|(fixture_name, _)| *fixture_name == name)
                .unwrap();

            assert_eq!(render(fixture, name, dialect).unwrap(), text, "{} in {}", name, dialect);
        }
    }

    #[test]
    fn verilog_blocks_are_balanced() {
        for (name, dialect, text) in bundles() {
            if dialect != Dialect::Verilog {
                continue;
            }
            for (path, lines) in Bundle::parse(text).files.iter() {
                let modules = count(lines, |line| line.starts_with("module "));
                assert_eq!(modules, 1, "{}: {}", name, path);
                assert_eq!(count(lines, |line| line == "endmodule"), modules, "{}: {}", name, path);
                assert_eq!(
                    count(lines, |line| line == "begin" || line.starts_with("begin :")),
                    count(lines, |line| line == "end"),
                    "{}: {}",
                    name,
                    path
                );
            }
        }
    }

    #[test]
    fn vhdl_blocks_are_balanced() {
        for (name, dialect, text) in bundles() {
            if dialect != Dialect::Vhdl {
                continue;
            }
            for (path, lines) in Bundle::parse(text).files.iter() {
                assert_eq!(
                    count(lines, |line| line.starts_with("ENTITY ") && line.ends_with(" IS")),
                    count(lines, |line| line.starts_with("END ENTITY ")),
                    "{}: {}",
                    name,
                    path
                );
                assert_eq!(
                    count(lines, |line| line.contains(": PROCESS")),
                    count(lines, |line| line.starts_with("END PROCESS")),
                    "{}: {}",
                    name,
                    path
                );
                assert_eq!(
                    count(lines, |line| line.ends_with(" LOOP") && !line.starts_with("END")),
                    count(lines, |line| line.starts_with("END LOOP")),
                    "{}: {}",
                    name,
                    path
                );
                assert_eq!(
                    count(lines, |line| line.starts_with("IF ")),
                    count(lines, |line| line == "END IF;"),
                    "{}: {}",
                    name,
                    path
                );
                assert_eq!(
                    lines.iter().rev().find(|line| !line.is_empty()).unwrap(),
                    "END PlatformIndependent;"
                );
            }
        }
    }

    #[test]
    fn clocks_share_one_module() {
        let vhdl = Bundle::parse(bundle!("clocked", "vhd"));

        assert_eq!(
            vhdl.files.keys().collect::<Vec<_>>(),
            vec!["base/CLOCKGEN.vhd", "circuit/clocked.vhd"]
        );
        assert!(vhdl.diagnostics.is_empty());

        let circuit = "circuit/clocked.vhd";
        assert!(vhdl.has_line(circuit, "PORT ( FPGA_GlobalClock : IN std_logic;"));
        assert!(vhdl.has_line(circuit, "SIGNAL s_LOGISIM_CLOCK_TREE_1 : std_logic_vector( 4 DOWNTO 0 );"));
        assert!(vhdl.has_line(circuit, "s_logisimNet1 <= s_LOGISIM_CLOCK_TREE_1(0);"));
        assert!(vhdl.has_line(circuit, "slow : ENTITY work.CLOCKGEN"));
        assert!(vhdl.has_line(circuit, "GENERIC MAP ( HighTicks => 3,"));
        assert!(vhdl.has_line(circuit, "Phase => 7,"));
        assert!(vhdl.has_line(circuit, "NrOfBits => 3 )"));
        assert!(vhdl.has_line(circuit, "fast : ENTITY work.CLOCKGEN"));
        assert!(vhdl.has_line(circuit, "Phase => 2,"));
        assert!(vhdl.has_line(circuit, "NrOfBits => 1 )"));
        assert!(vhdl.has_line(circuit, "ClockBus => s_LOGISIM_CLOCK_TREE_1 );"));

        let module = "base/CLOCKGEN.vhd";
        assert!(vhdl.has_line(module, "ENTITY CLOCKGEN IS"));
        assert!(vhdl.has_line(module, "ClockBus <= GlobalClock&s_output_regs;"));
        assert!(vhdl.has_line(module, "makeDerivedClock : PROCESS ( GlobalClock ) IS"));

        let verilog = Bundle::parse(bundle!("clocked", "v"));
        let circuit = "circuit/clocked.v";
        assert!(verilog.has_line(circuit, "module clocked( FPGA_GlobalClock, FPGA_Tick );"));
        assert!(verilog.has_line(circuit, "assign s_logisimNet0 = s_LOGISIM_CLOCK_TREE_0[0];"));
        assert!(verilog.has_line(circuit, "CLOCKGEN #(.HighTicks(1),"));
        assert!(verilog.has_line(circuit, "fast (.GlobalClock(FPGA_GlobalClock),"));
        assert!(verilog.has_line("base/CLOCKGEN.v", "always @(posedge GlobalClock)"));
    }

    #[test]
    fn every_extension_mode_is_generated() {
        let verilog = Bundle::parse(bundle!("extenders", "v"));
        let circuit = "circuit/extenders.v";

        assert_eq!(verilog.files.len(), 1);
        assert!(verilog.has_line(circuit, "assign s_logisimBus0 = 4'hA;"));
        assert!(verilog.has_line(circuit, "assign s_logisimNet1 = 1'b1;"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus2[3:0] = s_logisimBus0;"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus2[8:4] = {1'b0, 4'h0};"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus3[8:4] = {1'b1, 4'hF};"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus4[8] = s_logisimBus0[3];"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus5[4] = s_logisimNet1;"));
        assert_eq!(
            count(verilog.file(circuit), |line| line == "// Bit Extender"),
            4
        );

        let vhdl = Bundle::parse(bundle!("extenders", "vhd"));
        let circuit = "circuit/extenders.vhd";
        assert!(vhdl.has_line(circuit, "s_logisimBus3(8 DOWNTO 4) <= \"1\"&X\"F\";"));
        assert!(vhdl.has_line(circuit, "s_logisimBus4(5) <= s_logisimBus0(3);"));
    }

    #[test]
    fn rails_drive_individual_bits() {
        let verilog = Bundle::parse(bundle!("rails", "v"));
        let circuit = "circuit/rails.v";

        assert!(verilog.has_line(circuit, "assign s_logisimBus0[7:4] = 4'hF;"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus0[0] = 1'b0;"));
        assert!(verilog.has_line(circuit, "assign s_logisimBus0[2] = 1'b0;"));
        assert!(verilog
            .file(circuit)
            .iter()
            .any(|line| line.ends_with("s_logisimBus0[1], s_logisimBus0[3] intentionally left open")));
        assert!(verilog.has_line(circuit, "module rails;"));

        let vhdl = Bundle::parse(bundle!("rails", "vhd"));
        assert!(vhdl.has_line("circuit/rails.vhd", "s_logisimBus0(7 DOWNTO 4) <= X\"F\";"));
        assert!(vhdl.has_line("circuit/rails.vhd", "s_logisimBus0(2) <= '0';"));
    }

    #[test]
    fn faulty_instances_are_reported_and_skipped() {
        for (text, literal) in [
            (bundle!("faulty", "vhd"), "s_logisimBus2 <= \"101\";"),
            (bundle!("faulty", "v"), "assign s_logisimBus2 = 3'b101;"),
        ]
        .iter()
        {
            let bundle = Bundle::parse(text);

            assert_eq!(
                bundle.diagnostics,
                vec![
                    "error: Cannot generate Constant \"big\" in circuit \"faulty\": value 300 does not fit in 8 bit(s).",
                    "error: Cannot generate Clock #1: clock is not the source of any clock tree.",
                ]
            );
            assert_eq!(bundle.files.len(), 1);
            let circuit = bundle.files.values().next().unwrap();
            assert!(circuit.iter().any(|line| line.trim() == *literal));
            assert!(!circuit.iter().any(|line| line.contains("s_logisimBus0 <=")
                || line.contains("assign s_logisimBus0 =")));
            assert!(!circuit.iter().any(|line| line.contains("FPGA_GlobalClock")));
        }
    }
}
