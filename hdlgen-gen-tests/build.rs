use std::env;
use std::fs;
use std::path::Path;

include!("src/fixtures.rs");

fn main() -> Result<(), hdlgen::Error> {
    println!("cargo:rerun-if-changed=src/fixtures.rs");

    let out_dir = env::var("OUT_DIR").unwrap();

    for &(name, fixture) in FIXTURES {
        for &dialect in DIALECTS {
            let dest_path = Path::new(&out_dir).join(bundle_name(name, dialect));
            fs::write(&dest_path, render(fixture, name, dialect)?)?;
        }
    }

    Ok(())
}
