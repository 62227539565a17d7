//! Build-time decoder generator.
//!
//! Parses instruction pattern files (fields, argument sets, formats
//! and patterns over 16- or 32-bit words) and emits a Rust decode
//! function plus a handler trait. Patterns are matched in file
//! order; the first bit-match wins and its handler's outcome is
//! returned unchanged, so a handler may decline an encoding and let
//! the caller fall through to another decoder family.
//!
//! The file syntax is the usual one for table-driven decoders:
//!
//! ```text
//! %rd      12:4
//! %imm24   0:s24 !function=times_4
//! &rrr     rd rn rm
//! @rrr     .... ....... rm:4 ... rd:4 rn:4 &rrr
//! ADD      0000 1000000 .... ... .... .... @rrr
//! ```

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: bit pattern exceeds {width} bits")]
    PatternTooWide { line: usize, width: u32 },
    #[error("line {line}: bad field segment `{seg}`")]
    BadSegment { line: usize, seg: String },
    #[error("line {line}: bad inline field `{tok}`")]
    BadInlineField { line: usize, tok: String },
    #[error("line {line}: bad attribute `{tok}`")]
    BadAttr { line: usize, tok: String },
    #[error("line {line}: unknown format `@{name}`")]
    UnknownFormat { line: usize, name: String },
    #[error("line {line}: unknown field transform `{func}`")]
    UnknownTransform { line: usize, func: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Data structures ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct FieldSegment {
    pub pos: u32,
    pub len: u32,
    pub signed: bool,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub segments: Vec<FieldSegment>,
    pub func: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ArgSet {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Clone, Debug)]
pub enum FieldMapping {
    FieldRef(String),
    Inline { pos: u32, len: u32 },
    Const(i32),
}

#[derive(Clone, Debug)]
pub struct Format {
    pub fixedbits: u32,
    pub fixedmask: u32,
    pub args_name: String,
    pub field_map: BTreeMap<String, FieldMapping>,
}

#[derive(Clone, Debug)]
pub struct Pattern {
    pub name: String,
    pub fixedbits: u32,
    pub fixedmask: u32,
    pub args_name: String,
    pub field_map: BTreeMap<String, FieldMapping>,
}

#[derive(Debug)]
pub struct Parsed {
    pub fields: BTreeMap<String, Field>,
    pub argsets: BTreeMap<String, ArgSet>,
    pub patterns: Vec<Pattern>,
}

// ── Field transforms ───────────────────────────────────────────

/// Names accepted after `!function=`, with the Rust expression each
/// expands to. Anything else is a generation error — a silent
/// identity here would decode wrong and be miserable to find.
const TRANSFORMS: &[(&str, &str)] = &[
    ("times_2", "({val}) << 1"),
    ("times_4", "({val}) << 2"),
    // T32 B/BL: fix up J1:J2 (I1 = NOT(J1 XOR S) etc.) and append
    // the final zero bit.
    (
        "t32_branch24",
        "{ let x = {val}; (x ^ (((x >= 0) as i64) * (3 << 21))) << 1 }",
    ),
    // T32ExpandImm: low 8 bits replicated per the top selector.
    (
        "t32_expandimm_imm",
        "{ let x = {val}; let imm = x & 0xff; match (x >> 8) & 0xf {
        0 => imm, 1 => imm * 0x0001_0001, 2 => imm * 0x0100_0100,
        3 => imm * 0x0101_0101, _ => imm | 0x80 } }",
    ),
    // Rotation part of T32ExpandImm: zero unless a rotated constant.
    (
        "t32_expandimm_rot",
        "{ let x = {val}; if x & 0xc00 != 0 { (x >> 7) & 0x1f } else { 0 } }",
    ),
    // T16 PUSH/POP: bit 8 of the encoding is LR/PC.
    ("t16_push_list", "{ let x = {val}; (x & 0xff) | ((x & 0x100) << 6) }"),
    ("t16_pop_list", "{ let x = {val}; (x & 0xff) | ((x & 0x100) << 7) }"),
];

fn transform_expr(func: &str) -> Option<&'static str> {
    TRANSFORMS
        .iter()
        .find(|(name, _)| *name == func)
        .map(|(_, expr)| *expr)
}

// ── Bit-pattern parsing ─────────────────────────────────────────

pub fn is_bit_char(c: char) -> bool {
    matches!(c, '0' | '1' | '.' | '-')
}

pub fn is_bit_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_bit_char)
}

pub fn is_inline_field(s: &str) -> bool {
    if let Some(idx) = s.find(':') {
        let name = &s[..idx];
        let rest = &s[idx + 1..];
        !name.is_empty()
            && name.chars().all(|c| c.is_alphanumeric() || c == '_')
            && !rest.is_empty()
            && rest.chars().all(|c| c.is_ascii_digit())
    } else {
        false
    }
}

struct BitPattern {
    fixedbits: u32,
    fixedmask: u32,
    inline_fields: BTreeMap<String, (u32, u32)>,
}

fn parse_bit_tokens(
    tokens: &[&str],
    width: u32,
    line: usize,
) -> Result<BitPattern, ParseError> {
    let mut fixedbits: u32 = 0;
    let mut fixedmask: u32 = 0;
    let mut inline_fields = BTreeMap::new();
    let mut bit_pos: i32 = width as i32 - 1;

    for &tok in tokens {
        if is_bit_token(tok) {
            for c in tok.chars() {
                if bit_pos < 0 {
                    return Err(ParseError::PatternTooWide { line, width });
                }
                match c {
                    '1' => {
                        fixedbits |= 1 << bit_pos;
                        fixedmask |= 1 << bit_pos;
                    }
                    '0' => {
                        fixedmask |= 1 << bit_pos;
                    }
                    '.' | '-' => {}
                    _ => unreachable!(),
                }
                bit_pos -= 1;
            }
        } else if is_inline_field(tok) {
            let idx = tok.find(':').unwrap();
            let name = &tok[..idx];
            let len: u32 = tok[idx + 1..].parse().map_err(|_| {
                ParseError::BadInlineField {
                    line,
                    tok: tok.to_string(),
                }
            })?;
            let pos = (bit_pos - len as i32 + 1) as u32;
            inline_fields.insert(name.to_string(), (pos, len));
            bit_pos -= len as i32;
        } else {
            break;
        }
    }
    Ok(BitPattern {
        fixedbits,
        fixedmask,
        inline_fields,
    })
}

fn count_bit_tokens(tokens: &[&str]) -> usize {
    tokens
        .iter()
        .take_while(|t| is_bit_token(t) || is_inline_field(t))
        .count()
}

// ── Field / argset parsing ─────────────────────────────────────

fn parse_field_segment(s: &str, line: usize) -> Result<FieldSegment, ParseError> {
    let bad = || ParseError::BadSegment {
        line,
        seg: s.to_string(),
    };
    let (pos_str, rest) = s.split_once(':').ok_or_else(bad)?;
    let signed = rest.starts_with('s');
    let len_str = if signed { &rest[1..] } else { rest };
    let pos: u32 = pos_str.parse().map_err(|_| bad())?;
    let len: u32 = len_str.parse().map_err(|_| bad())?;
    Ok(FieldSegment { pos, len, signed })
}

fn parse_field(line_str: &str, line: usize) -> Result<Field, ParseError> {
    // %name seg1 seg2 ... [!function=func]
    let tokens: Vec<&str> = line_str.split_whitespace().collect();
    let name = tokens[0][1..].to_string(); // skip %
    let mut segments = Vec::new();
    let mut func = None;
    for &tok in &tokens[1..] {
        if let Some(f) = tok.strip_prefix("!function=") {
            if transform_expr(f).is_none() {
                return Err(ParseError::UnknownTransform {
                    line,
                    func: f.to_string(),
                });
            }
            func = Some(f.to_string());
        } else {
            segments.push(parse_field_segment(tok, line)?);
        }
    }
    Ok(Field {
        name,
        segments,
        func,
    })
}

fn parse_argset(line_str: &str) -> ArgSet {
    // &name field1 field2 ...
    let tokens: Vec<&str> = line_str.split_whitespace().collect();
    let name = tokens[0][1..].to_string(); // skip &
    let fields = tokens[1..].iter().map(|s| s.to_string()).collect();
    ArgSet { name, fields }
}

/// Parse trailing attributes after bit tokens.
/// Returns (args_name, field_map).
fn parse_attrs(
    tokens: &[&str],
    fields: &BTreeMap<String, Field>,
    line: usize,
) -> Result<(String, BTreeMap<String, FieldMapping>), ParseError> {
    let mut args_name = String::new();
    let mut field_map = BTreeMap::new();
    for &tok in tokens {
        if let Some(a) = tok.strip_prefix('&') {
            args_name = a.to_string();
        } else if let Some(f) = tok.strip_prefix('%') {
            // %field_ref → field_name = FieldRef(field_name)
            field_map
                .insert(f.to_string(), FieldMapping::FieldRef(f.to_string()));
        } else if let Some(idx) = tok.find('=') {
            let key = &tok[..idx];
            let val = &tok[idx + 1..];
            if let Some(fref) = val.strip_prefix('%') {
                field_map.insert(
                    key.to_string(),
                    FieldMapping::FieldRef(fref.to_string()),
                );
            } else if let Ok(c) = val.parse::<i32>() {
                field_map.insert(key.to_string(), FieldMapping::Const(c));
            } else {
                return Err(ParseError::BadAttr {
                    line,
                    tok: tok.to_string(),
                });
            }
        } else if tok.starts_with('@') || tok.starts_with('!') {
            // Format reference / field attribute, handled elsewhere.
        } else if fields.contains_key(tok) {
            field_map
                .insert(tok.to_string(), FieldMapping::FieldRef(tok.to_string()));
        }
    }
    Ok((args_name, field_map))
}

fn parse_format(
    line_str: &str,
    fields: &BTreeMap<String, Field>,
    width: u32,
    line: usize,
) -> Result<(String, Format), ParseError> {
    // @name bit_tokens... &argset [mappings...]
    let tokens: Vec<&str> = line_str.split_whitespace().collect();
    let name = tokens[0][1..].to_string(); // skip @
    let bit_count = count_bit_tokens(&tokens[1..]);
    let bp = parse_bit_tokens(&tokens[1..1 + bit_count], width, line)?;
    let rest = &tokens[1 + bit_count..];
    let (args_name, mut field_map) = parse_attrs(rest, fields, line)?;
    for (fname, &(pos, len)) in &bp.inline_fields {
        field_map
            .entry(fname.clone())
            .or_insert(FieldMapping::Inline { pos, len });
    }
    Ok((
        name,
        Format {
            fixedbits: bp.fixedbits,
            fixedmask: bp.fixedmask,
            args_name,
            field_map,
        },
    ))
}

fn parse_pattern(
    line_str: &str,
    formats: &BTreeMap<String, Format>,
    fields: &BTreeMap<String, Field>,
    auto_args: &mut BTreeMap<String, ArgSet>,
    width: u32,
    line: usize,
) -> Result<Pattern, ParseError> {
    let tokens: Vec<&str> = line_str.split_whitespace().collect();
    let name = tokens[0].to_string();
    let bit_count = count_bit_tokens(&tokens[1..]);
    let bp = parse_bit_tokens(&tokens[1..1 + bit_count], width, line)?;
    let rest = &tokens[1 + bit_count..];

    // Find @format reference
    let fmt_ref = rest
        .iter()
        .find_map(|t| t.strip_prefix('@').map(|s| s.to_string()));

    let (args_name, field_map, fmt_bits, fmt_mask);
    if let Some(ref fname) = fmt_ref {
        let fmt =
            formats
                .get(fname)
                .ok_or_else(|| ParseError::UnknownFormat {
                    line,
                    name: fname.clone(),
                })?;
        fmt_bits = fmt.fixedbits;
        fmt_mask = fmt.fixedmask;
        let (_, extra_map) = parse_attrs(rest, fields, line)?;
        let mut fm = fmt.field_map.clone();
        fm.extend(extra_map);
        for (fname, &(pos, len)) in &bp.inline_fields {
            fm.entry(fname.clone())
                .or_insert(FieldMapping::Inline { pos, len });
        }
        args_name = fmt.args_name.clone();
        field_map = fm;
    } else {
        fmt_bits = 0;
        fmt_mask = 0;
        let (an, mut fm) = parse_attrs(rest, fields, line)?;
        for (fname, &(pos, len)) in &bp.inline_fields {
            fm.entry(fname.clone())
                .or_insert(FieldMapping::Inline { pos, len });
        }
        if an.is_empty() && !fm.is_empty() {
            // Auto-generate an argset named after the pattern.
            let aname = format!("_auto_{name}");
            let afields: Vec<String> = fm.keys().cloned().collect();
            auto_args.insert(
                aname.clone(),
                ArgSet {
                    name: aname.clone(),
                    fields: afields,
                },
            );
            args_name = aname;
        } else {
            args_name = an;
        }
        field_map = fm;
    }

    Ok(Pattern {
        name,
        fixedbits: bp.fixedbits | fmt_bits,
        fixedmask: bp.fixedmask | fmt_mask,
        args_name,
        field_map,
    })
}

/// Merge backslash-continuation lines into single logical lines.
fn merge_continuations(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cont = false;
    for line in input.lines() {
        if cont {
            out.push(' ');
            out.push_str(line.trim());
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
        }
        cont = out.ends_with('\\');
        if cont {
            out.pop();
            while out.ends_with(' ') {
                out.pop();
            }
        }
    }
    out
}

pub fn parse_with_width(input: &str, width: u32) -> Result<Parsed, ParseError> {
    let merged = merge_continuations(input);
    let mut fields = BTreeMap::new();
    let mut argsets = BTreeMap::new();
    let mut formats = BTreeMap::new();
    let mut patterns = Vec::new();
    let mut auto_args = BTreeMap::new();

    for (lineno, raw) in merged.lines().enumerate() {
        let line = match raw.find('#') {
            Some(i) => &raw[..i],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = lineno + 1;
        match line.chars().next().unwrap() {
            '%' => {
                let f = parse_field(line, lineno)?;
                fields.insert(f.name.clone(), f);
            }
            '&' => {
                let a = parse_argset(line);
                argsets.insert(a.name.clone(), a);
            }
            '@' => {
                let (n, f) = parse_format(line, &fields, width, lineno)?;
                formats.insert(n, f);
            }
            // Overlap groups: ordering within the file already
            // encodes priority, so the brackets are structural only.
            '{' | '}' | '[' | ']' => {}
            _ => {
                let p = parse_pattern(
                    line,
                    &formats,
                    &fields,
                    &mut auto_args,
                    width,
                    lineno,
                )?;
                patterns.push(p);
            }
        }
    }
    argsets.extend(auto_args);
    Ok(Parsed {
        fields,
        argsets,
        patterns,
    })
}

// ── Code generation ────────────────────────────────────────────

fn format_hex(val: u32, width: u32) -> String {
    if width <= 16 {
        format!("{val:#06x}")
    } else {
        format!("{val:#010x}")
    }
}

pub fn to_camel(s: &str) -> String {
    let mut result = String::new();
    let mut upper = true;
    for c in s.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

fn args_struct_name(args_name: &str) -> String {
    if args_name.is_empty() {
        "ArgsEmpty".to_string()
    } else {
        format!("Args{}", to_camel(args_name))
    }
}

fn emit_arg_structs(
    w: &mut dyn Write,
    argsets: &BTreeMap<String, ArgSet>,
) -> std::io::Result<()> {
    writeln!(w, "#[derive(Debug, Clone, Copy, Default)]")?;
    writeln!(w, "pub struct ArgsEmpty {{}}\n")?;
    for a in argsets.values() {
        let sname = args_struct_name(&a.name);
        writeln!(w, "#[derive(Debug, Clone, Copy, Default)]")?;
        writeln!(w, "pub struct {sname} {{")?;
        for f in &a.fields {
            writeln!(w, "    pub {f}: i64,")?;
        }
        writeln!(w, "}}\n")?;
    }
    Ok(())
}

/// Emit the raw (pre-transform) extraction expression for a field.
fn raw_extract_expr(segs: &[FieldSegment], width: u32) -> String {
    use std::fmt::Write as _;
    let signed_ty = if width <= 16 { "i16" } else { "i32" };
    let mut out = String::new();
    let s0 = &segs[0];
    if s0.signed {
        let lshift = width - s0.pos - s0.len;
        let rshift = width - s0.len;
        if lshift == 0 {
            write!(out, "(((insn as {signed_ty}) >> {rshift}) as i64)").unwrap();
        } else {
            write!(
                out,
                "((((insn as {signed_ty}) << {lshift}) >> {rshift}) as i64)"
            )
            .unwrap();
        }
    } else {
        let mask = (1u64 << s0.len) - 1;
        write!(out, "(((insn >> {}) & {:#x}) as i64)", s0.pos, mask).unwrap();
    }
    for s in &segs[1..] {
        let mask = (1u64 << s.len) - 1;
        let prev = out.clone();
        out.clear();
        write!(
            out,
            "(({prev} << {}) | ((insn >> {}) & {:#x}) as i64)",
            s.len, s.pos, mask
        )
        .unwrap();
    }
    out
}

fn emit_extract_field(
    w: &mut dyn Write,
    field: &Field,
    width: u32,
) -> std::io::Result<()> {
    let insn_ty = if width <= 16 { "u16" } else { "u32" };
    writeln!(w, "#[inline]")?;
    writeln!(
        w,
        "#[allow(clippy::identity_op, clippy::eq_op)]\nfn extract_{}(insn: {insn_ty}) -> i64 {{",
        field.name
    )?;
    let raw = raw_extract_expr(&field.segments, width);
    if let Some(ref func) = field.func {
        // Validated at parse time.
        let expr = transform_expr(func).unwrap();
        let body = expr.replace("{val}", &raw);
        writeln!(w, "    {body}")?;
    } else {
        writeln!(w, "    {raw}")?;
    }
    writeln!(w, "}}\n")
}

fn emit_field_expr(
    w: &mut dyn Write,
    mapping: &FieldMapping,
) -> std::io::Result<()> {
    match mapping {
        FieldMapping::FieldRef(r) => {
            write!(w, "extract_{r}(insn)")?;
        }
        FieldMapping::Inline { pos, len } => {
            let mask = (1u64 << len) - 1;
            write!(w, "((insn >> {pos}) & {mask:#x}) as i64")?;
        }
        FieldMapping::Const(c) => {
            write!(w, "{c}_i64")?;
        }
    }
    Ok(())
}

fn emit_decode_trait(
    w: &mut dyn Write,
    patterns: &[Pattern],
    width: u32,
) -> std::io::Result<()> {
    let trait_name = if width <= 16 { "Decode16" } else { "Decode" };
    writeln!(w, "#[allow(non_snake_case)]")?;
    writeln!(w, "pub trait {trait_name}<Ir> {{")?;
    let mut seen = HashSet::new();
    for p in patterns {
        if !seen.insert(&p.name) {
            continue; // same handler bound to several encodings
        }
        let sname = args_struct_name(&p.args_name);
        writeln!(
            w,
            "    fn trans_{}(&mut self, ir: &mut Ir, a: &{sname}) -> Outcome;",
            p.name
        )?;
    }
    writeln!(w, "}}\n")
}

fn emit_decode_fn(
    w: &mut dyn Write,
    patterns: &[Pattern],
    argsets: &BTreeMap<String, ArgSet>,
    width: u32,
) -> std::io::Result<()> {
    let insn_ty = if width <= 16 { "u16" } else { "u32" };
    let trait_name = if width <= 16 { "Decode16" } else { "Decode" };
    let fn_name = if width <= 16 { "decode16" } else { "decode" };
    let full_mask: u32 = if width <= 16 { 0xffff } else { 0xffff_ffff };
    writeln!(
        w,
        "pub fn {fn_name}<Ir, T: {trait_name}<Ir>>(\
         ctx: &mut T, ir: &mut Ir, insn: {insn_ty}\
         ) -> Outcome {{"
    )?;
    for p in patterns {
        let sname = args_struct_name(&p.args_name);
        if p.fixedmask == full_mask {
            let bits = format_hex(p.fixedbits, width);
            writeln!(w, "    if insn == {bits} {{")?;
        } else {
            let mask = format_hex(p.fixedmask, width);
            let bits = format_hex(p.fixedbits, width);
            writeln!(w, "    if insn & {mask} == {bits} {{")?;
        }
        let arg_fields = if p.args_name.is_empty() {
            Vec::new()
        } else if let Some(a) = argsets.get(&p.args_name) {
            a.fields.clone()
        } else {
            Vec::new()
        };
        if arg_fields.is_empty() {
            writeln!(
                w,
                "        return ctx.trans_{}(ir, &{sname} {{}});",
                p.name
            )?;
        } else {
            writeln!(w, "        let a = {sname} {{")?;
            for af in &arg_fields {
                if let Some(mapping) = p.field_map.get(af) {
                    write!(w, "            {af}: ")?;
                    emit_field_expr(w, mapping)?;
                    writeln!(w, ",")?;
                } else {
                    writeln!(w, "            {af}: 0,")?;
                }
            }
            writeln!(w, "        }};")?;
            writeln!(w, "        return ctx.trans_{}(ir, &a);", p.name)?;
        }
        writeln!(w, "    }}")?;
    }
    writeln!(w, "    Outcome::Declined")?;
    writeln!(w, "}}\n")
}

// ── Public API ─────────────────────────────────────────────────

pub fn generate_with_width(
    input: &str,
    output: &mut dyn Write,
    width: u32,
) -> Result<(), ParseError> {
    let parsed = parse_with_width(input, width)?;
    writeln!(output, "// Auto-generated by decodetree.")?;
    writeln!(output, "// Do not edit.\n")?;
    emit_arg_structs(output, &parsed.argsets)?;
    for field in parsed.fields.values() {
        emit_extract_field(output, field, width)?;
    }
    emit_decode_trait(output, &parsed.patterns, width)?;
    emit_decode_fn(output, &parsed.patterns, &parsed.argsets, width)?;
    Ok(())
}

pub fn generate(input: &str, output: &mut dyn Write) -> Result<(), ParseError> {
    generate_with_width(input, output, 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_tokens_basic() {
        let bp = parse_bit_tokens(&["1010", "rd:4"], 8, 1).unwrap();
        assert_eq!(bp.fixedbits, 0b1010_0000);
        assert_eq!(bp.fixedmask, 0b1111_0000);
        assert_eq!(bp.inline_fields["rd"], (0, 4));
    }

    #[test]
    fn field_segment_signed() {
        let s = parse_field_segment("0:s24", 1).unwrap();
        assert_eq!(s.pos, 0);
        assert_eq!(s.len, 24);
        assert!(s.signed);
    }

    #[test]
    fn unknown_transform_rejected() {
        let err = parse_with_width("%x 0:4 !function=nope\n", 32).unwrap_err();
        assert!(matches!(err, ParseError::UnknownTransform { .. }));
    }

    #[test]
    fn pattern_with_format() {
        let src = "\
%rd 12:4
&rr rd rn
@rr ........ .... .... rd:4 .... .... rn:4 &rr
FOO 00000001 .... .... .... .... .... .... @rr
";
        let p = parse_with_width(src, 32).unwrap();
        assert_eq!(p.patterns.len(), 1);
        assert_eq!(p.patterns[0].fixedmask, 0xff00_0000);
        assert_eq!(p.patterns[0].fixedbits, 0x0100_0000);
        assert_eq!(p.patterns[0].args_name, "rr");
    }

    #[test]
    fn continuation_lines_merge() {
        let merged = merge_continuations("FOO 1010 \\\n  &rr");
        assert_eq!(merged, "FOO 1010 &rr");
    }
}
