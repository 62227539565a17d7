//! irdump — static code image → IR dump tool.
//!
//! Reads a flat AArch32 code image, translates it block by block,
//! and prints the IR in a human-readable format. This is also the
//! reference consumer of the translation hand-off contract: one
//! `TranslationBlock` descriptor plus the drained op context per
//! unit, all-or-nothing.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::process;

use a32t_core::dump::dump_ops;
use a32t_core::Context;
use a32t_frontend::arm::cpu::{ArmFeatures, TbFlags};
use a32t_frontend::arm::translate_block;
use a32t_frontend::FlatImage;
use log::debug;

struct Args {
    image_path: String,
    base: u32,
    start: u32,
    count: usize,
    thumb: bool,
    cpu: ArmFeatures,
    output: Option<String>,
}

const USAGE: &str = "\
usage: irdump <image> [options]

Options:
  --base <hex>     Load address of the image (default: 0)
  --start <hex>    First PC to translate (default: base)
  --count <n>      Max blocks to translate (default: 16)
  --thumb          Start in Thumb state
  --cpu <name>     Core model: v7a, v8a, v8.1m (default: v8a)
  -o <file>        Output to file
  -h, --help       Show this help";

fn parse_hex(s: &str) -> Option<u32> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(s, 16).ok()
}

fn bad_arg(what: &str) -> ! {
    eprintln!("irdump: bad or missing value for {what}");
    process::exit(1);
}

fn parse_args() -> Args {
    let argv: Vec<String> = env::args().collect();
    if argv.len() < 2 || argv[1] == "-h" || argv[1] == "--help" {
        eprintln!("{USAGE}");
        process::exit(if argv.len() < 2 { 1 } else { 0 });
    }

    let mut args = Args {
        image_path: String::new(),
        base: 0,
        start: 0,
        count: 16,
        thumb: false,
        cpu: ArmFeatures::v8a(),
        output: None,
    };
    let mut start_set = false;

    let mut it = argv.into_iter().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--base" => {
                args.base = it
                    .next()
                    .as_deref()
                    .and_then(parse_hex)
                    .unwrap_or_else(|| bad_arg("--base"));
            }
            "--start" => {
                args.start = it
                    .next()
                    .as_deref()
                    .and_then(parse_hex)
                    .unwrap_or_else(|| bad_arg("--start"));
                start_set = true;
            }
            "--count" => {
                args.count = it
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| bad_arg("--count"));
            }
            "--thumb" => args.thumb = true,
            "--cpu" => {
                args.cpu = match it.next().as_deref() {
                    Some("v7a") => ArmFeatures::v7a(),
                    Some("v8a") => ArmFeatures::v8a(),
                    Some("v8.1m") => ArmFeatures::v8_1m(),
                    _ => bad_arg("--cpu"),
                };
            }
            "-o" => {
                args.output = Some(it.next().unwrap_or_else(|| bad_arg("-o")));
            }
            _ if args.image_path.is_empty() => args.image_path = arg,
            _ => {
                eprintln!("irdump: unexpected argument {arg}");
                process::exit(1);
            }
        }
    }
    if args.image_path.is_empty() {
        eprintln!("{USAGE}");
        process::exit(1);
    }
    if !start_set {
        args.start = args.base;
    }
    args
}

fn run(args: &Args) -> io::Result<()> {
    let bytes = fs::read(&args.image_path)?;
    let end = args.base.wrapping_add(bytes.len() as u32);
    let image = FlatImage::new(args.base, bytes);

    let mut flags = TbFlags::new(args.cpu);
    // M-profile cores execute Thumb only.
    flags.thumb = args.thumb || args.cpu.contains(ArmFeatures::M);

    let stdout = io::stdout();
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(stdout.lock())),
    };

    let mut ir = Context::new();
    let mut pc = args.start;
    for n in 0..args.count {
        if pc >= end {
            break;
        }
        let tb = match translate_block(&image, &flags, pc, 0, &mut ir) {
            Ok(tb) => tb,
            Err(e) => {
                eprintln!("irdump: stop at {pc:#010x}: {e}");
                break;
            }
        };
        debug!(
            "block {n}: pc={:#010x} size={} icount={}",
            tb.pc, tb.size, tb.icount
        );
        writeln!(
            out,
            "TB {n}: pc={:#010x} size={:#x} insns={} ops={}",
            tb.pc,
            tb.size,
            tb.icount,
            ir.num_ops()
        )?;
        dump_ops(&ir, &mut out)?;
        writeln!(out)?;
        pc = tb.pc.wrapping_add(tb.size);
    }
    out.flush()
}

fn main() {
    env_logger::init();
    let args = parse_args();
    if let Err(e) = run(&args) {
        eprintln!("irdump: {e}");
        process::exit(1);
    }
}
