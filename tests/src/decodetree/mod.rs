//! Decoder-generator tests: parse pattern files and check the
//! generated Rust text.

use decodetree::{generate_with_width, parse_with_width, ParseError};

fn generate(src: &str, width: u32) -> String {
    let mut out = Vec::new();
    generate_with_width(src, &mut out, width).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn parse_simple_pattern() {
    let src = "\
&rr rd rm
FOO 0000 0001 .... .... .... .... rd:4 rm:4 &rr
";
    let p = parse_with_width(src, 32).unwrap();
    assert_eq!(p.patterns.len(), 1);
    let pat = &p.patterns[0];
    assert_eq!(pat.name, "FOO");
    assert_eq!(pat.fixedmask, 0xff00_0000);
    assert_eq!(pat.fixedbits, 0x0100_0000);
}

#[test]
fn signed_multi_segment_field() {
    let src = "\
%imm 26:s1 16:10 0:11
&i imm
BAR 1111 0 . .......... 0000 0 ........... &i imm=%imm
";
    let text = generate(src, 32);
    // Signed leading segment, then concatenation of the rest.
    assert!(text.contains("fn extract_imm(insn: u32) -> i64"), "{text}");
    assert!(text.contains("<< 5) >> 31"), "{text}");
}

#[test]
fn transform_applied() {
    let src = "\
%imm 0:s24 !function=times_4
&i imm
B 1010 .... .... .... .... .... .... .... &i imm=%imm
";
    let text = generate(src, 32);
    assert!(text.contains("<< 2"), "{text}");
}

#[test]
fn unknown_transform_is_error() {
    let src = "%imm 0:4 !function=frobnicate\n";
    let err = parse_with_width(src, 32).unwrap_err();
    assert!(matches!(err, ParseError::UnknownTransform { .. }));
}

#[test]
fn decode_fn_returns_outcome() {
    let src = "\
&rr rd rm
FOO 0000 0001 .... .... .... .... rd:4 rm:4 &rr
";
    let text = generate(src, 32);
    assert!(
        text.contains("-> Outcome {"),
        "decode must return the three-way outcome: {text}"
    );
    assert!(text.contains("Outcome::Declined"), "{text}");
    assert!(text.contains("fn trans_FOO"), "{text}");
}

#[test]
fn format_bits_are_inherited() {
    let src = "\
&rr rd rm
@rr 0000 .... .... .... .... .... rd:4 rm:4 &rr
FOO .... 0001 .... .... .... .... .... .... @rr
";
    let p = parse_with_width(src, 32).unwrap();
    let pat = &p.patterns[0];
    assert_eq!(pat.fixedmask, 0xff00_0000);
    assert_eq!(pat.fixedbits, 0x0100_0000);
}

#[test]
fn const_field_mapping() {
    let src = "\
&ldst rn p u
LD 0000 0000 rn:4 .... .... .... .... .... &ldst p=1 u=0
";
    let text = generate(src, 32);
    assert!(text.contains("p: 1_i64"), "{text}");
    assert!(text.contains("u: 0_i64"), "{text}");
}

#[test]
fn sixteen_bit_width() {
    let src = "\
&ri rd imm
MOV 001 00 rd:3 imm:8 &ri
";
    let text = generate(src, 16);
    assert!(text.contains("pub fn decode16"), "{text}");
    assert!(text.contains("trait Decode16"), "{text}");
    assert!(text.contains("insn: u16"), "{text}");
}

#[test]
fn duplicate_pattern_names_share_one_handler() {
    let src = "\
&ri rd imm
LDR 0001 .... 1111 rd:4 imm:12 .... &ri
LDR 0010 .... .... rd:4 imm:12 .... &ri
";
    let text = generate(src, 32);
    let count = text.matches("fn trans_LDR(").count();
    // One trait method, two dispatch sites.
    assert_eq!(count, 1, "{text}");
    let calls = text.matches("ctx.trans_LDR(").count();
    assert_eq!(calls, 2, "{text}");
}

#[test]
fn full_mask_uses_equality() {
    let src = "NOP 0000 0000 0000 0000 0000 0000 0000 0000\n";
    let text = generate(src, 32);
    assert!(text.contains("if insn == 0x00000000"), "{text}");
}
