use std::env;
use std::fs;
use std::path::Path;

/// (input file, generated file, pattern width)
const DECODE_FILES: &[(&str, &str, u32)] = &[
    ("decode/a32.decode", "a32_decode.rs", 32),
    ("decode/a32-uncond.decode", "a32_uncond_decode.rs", 32),
    ("decode/t32.decode", "t32_decode.rs", 32),
    ("decode/t16.decode", "t16_decode.rs", 16),
    ("decode/vfp.decode", "vfp_decode.rs", 32),
    ("decode/mve.decode", "mve_decode.rs", 32),
    ("decode/m-nocp.decode", "m_nocp_decode.rs", 32),
];

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    for &(input, output, width) in DECODE_FILES {
        println!("cargo::rerun-if-changed={input}");

        let src = fs::read_to_string(input)
            .unwrap_or_else(|e| panic!("failed to read {input}: {e}"));

        let mut generated = Vec::new();
        decodetree::generate_with_width(&src, &mut generated, width)
            .unwrap_or_else(|e| panic!("{input}: {e}"));

        let out_path = Path::new(&out_dir).join(output);
        fs::write(&out_path, generated)
            .unwrap_or_else(|e| panic!("failed to write {output}: {e}"));
    }
}
