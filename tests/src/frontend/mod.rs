//! Frontend translation tests — encode real AArch32 instructions,
//! run them through the translator, and check the produced IR both
//! structurally and by evaluating it.

mod eval;
mod thumb;

use proptest::prelude::*;

use a32t_core::{Context, Opcode, TranslationBlock};
use a32t_frontend::arm::cpu::{excp, ArmFeatures, TbFlags};
use a32t_frontend::arm::helper::Helper;
use a32t_frontend::arm::translate_block;
use a32t_frontend::FlatImage;

use eval::Machine;

pub const BASE: u32 = 0x4000;

// ── Instruction encoding helpers (A32) ────────────────────────

pub const COND_AL: u32 = 0xe;
pub const COND_EQ: u32 = 0x0;

fn dp_reg(cond: u32, opc: u32, s: u32, rn: u32, rd: u32, shim: u32, shty: u32, rm: u32) -> u32 {
    (cond << 28)
        | (opc << 21)
        | (s << 20)
        | (rn << 16)
        | (rd << 12)
        | (shim << 7)
        | (shty << 5)
        | rm
}

fn dp_imm(cond: u32, opc: u32, s: u32, rn: u32, rd: u32, rot: u32, imm8: u32) -> u32 {
    (cond << 28)
        | (1 << 25)
        | (opc << 21)
        | (s << 20)
        | (rn << 16)
        | (rd << 12)
        | (rot << 8)
        | imm8
}

pub fn add_reg(cond: u32, s: u32, rd: u32, rn: u32, rm: u32) -> u32 {
    dp_reg(cond, 0b0100, s, rn, rd, 0, 0, rm)
}

pub fn sub_reg(cond: u32, s: u32, rd: u32, rn: u32, rm: u32) -> u32 {
    dp_reg(cond, 0b0010, s, rn, rd, 0, 0, rm)
}

pub fn add_imm(cond: u32, s: u32, rd: u32, rn: u32, imm8: u32) -> u32 {
    dp_imm(cond, 0b0100, s, rn, rd, 0, imm8)
}

pub fn mov_imm(cond: u32, rd: u32, imm8: u32) -> u32 {
    dp_imm(cond, 0b1101, 0, 0, rd, 0, imm8)
}

/// MOVS rd, rm, <shift> #amount
pub fn movs_shift(rd: u32, rm: u32, shty: u32, shim: u32) -> u32 {
    dp_reg(COND_AL, 0b1101, 1, 0, rd, shim, shty, rm)
}

pub fn b(cond: u32, imm24: i32) -> u32 {
    (cond << 28) | (0b1010 << 24) | ((imm24 as u32) & 0x00ff_ffff)
}

pub fn bl(imm24: i32) -> u32 {
    (COND_AL << 28) | (0b1011 << 24) | ((imm24 as u32) & 0x00ff_ffff)
}

pub fn bx(rm: u32) -> u32 {
    (COND_AL << 28) | 0x012f_ff10 | rm
}

pub fn svc(imm24: u32) -> u32 {
    (COND_AL << 28) | (0xf << 24) | (imm24 & 0xff_ffff)
}

pub fn udf() -> u32 {
    // Permanently-undefined hole in the conditional space.
    0xe7f0_00f0
}

pub fn ldr_imm(rt: u32, rn: u32, imm12: u32) -> u32 {
    (COND_AL << 28) | (0b010 << 25) | (1 << 24) | (1 << 23) | (1 << 20) | (rn << 16) | (rt << 12) | imm12
}

pub fn str_imm(rt: u32, rn: u32, imm12: u32) -> u32 {
    (COND_AL << 28) | (0b010 << 25) | (1 << 24) | (1 << 23) | (rn << 16) | (rt << 12) | imm12
}

// ── Harness ───────────────────────────────────────────────────

pub fn arm_flags() -> TbFlags {
    let mut f = TbFlags::new(ArmFeatures::v8a());
    f.current_el = 1;
    f
}

pub fn translate_words(
    words: &[u32],
    flags: &TbFlags,
) -> (TranslationBlock, Context) {
    let mut bytes = Vec::new();
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    let image = FlatImage::new(BASE, bytes);
    let mut ir = Context::new();
    // Bound the block to the encoded words so translation never
    // walks off the end of the image.
    let cflags = words.len() as u32;
    let tb = translate_block(&image, flags, BASE, cflags, &mut ir)
        .expect("translation failed");
    (tb, ir)
}

pub fn translate_arm(words: &[u32]) -> (TranslationBlock, Context) {
    translate_words(words, &arm_flags())
}

/// Find the first helper call and return (helper id, const args).
pub fn first_call(ir: &Context) -> Option<(u32, Vec<Option<u64>>)> {
    ir.ops().iter().find(|op| op.opc == Opcode::Call).map(|op| {
        let id = op.cargs()[0].0;
        let args = op.iargs().iter().map(|&t| ir.const_val(t)).collect();
        (id, args)
    })
}

pub fn calls_exception(ir: &Context, excp_val: u32) -> bool {
    ir.ops().iter().any(|op| {
        op.opc == Opcode::Call
            && (op.cargs()[0].0 == Helper::Exception.id()
                || op.cargs()[0].0 == Helper::ExceptionEl.id())
            && ir.const_val(op.iargs()[0]) == Some(excp_val as u64)
    })
}

// ── Scenario: ADDS with flags ─────────────────────────────────

#[test]
fn adds_overflow_scenario() {
    // ADDS r0, r1, r2 with r1=0x7fffffff, r2=1: result 0x80000000,
    // N=1 Z=0 C=0 V=1.
    let (tb, ir) = translate_arm(&[add_reg(COND_AL, 1, 0, 1, 2)]);
    assert_eq!(tb.icount, 1);

    let mut m = Machine::new();
    m.set_reg(1, 0x7fff_ffff);
    m.set_reg(2, 1);
    m.run(&ir);

    assert_eq!(m.reg(0), 0x8000_0000);
    assert!(m.flag_n());
    assert!(!m.flag_z());
    assert!(!m.flag_c());
    assert!(m.flag_v());
}

#[test]
fn adds_carry_scenario() {
    let (_, ir) = translate_arm(&[add_reg(COND_AL, 1, 0, 1, 2)]);
    let mut m = Machine::new();
    m.set_reg(1, 0xffff_ffff);
    m.set_reg(2, 1);
    m.run(&ir);
    assert_eq!(m.reg(0), 0);
    assert!(m.flag_z());
    assert!(m.flag_c());
    assert!(!m.flag_v());
}

#[test]
fn subs_borrow_sets_carry_clear() {
    // SUBS r0, r1, r2 with r1 < r2: C (not-borrow) clear.
    let (_, ir) = translate_arm(&[sub_reg(COND_AL, 1, 0, 1, 2)]);
    let mut m = Machine::new();
    m.set_reg(1, 1);
    m.set_reg(2, 2);
    m.run(&ir);
    assert_eq!(m.reg(0), u32::MAX);
    assert!(!m.flag_c());
    assert!(m.flag_n());
}

// ── Scenario: conditional skip ────────────────────────────────

#[test]
fn conditional_skip_suppresses_side_effects() {
    // ADDEQ r0, r0, #1 ; MOV r1, #5
    let words = [add_imm(COND_EQ, 0, 0, 0, 1), mov_imm(COND_AL, 1, 5)];
    let (tb, ir) = translate_arm(&words);
    assert_eq!(tb.icount, 2);

    // Flags say "not equal": the store to r0 must not happen, r1 is
    // written on both paths.
    let mut m = Machine::new();
    m.set_nzcv(false, false, false, false);
    m.set_reg(0, 7);
    m.run(&ir);
    assert_eq!(m.reg(0), 7);
    assert_eq!(m.reg(1), 5);

    // And with Z set the add executes.
    let mut m = Machine::new();
    m.set_nzcv(false, true, false, false);
    m.set_reg(0, 7);
    m.run(&ir);
    assert_eq!(m.reg(0), 8);
    assert_eq!(m.reg(1), 5);
}

// ── Shift-by-zero special cases ───────────────────────────────

#[test]
fn shift_immediate_zero_cases() {
    // LSR #0 means shift by 32: result 0, C = bit 31.
    let (_, ir) = translate_arm(&[movs_shift(0, 1, 1, 0)]);
    let mut m = Machine::new();
    m.set_reg(1, 0x8000_0001);
    m.run(&ir);
    assert_eq!(m.reg(0), 0);
    assert!(m.flag_c());

    // ASR #0 means shift by 32: result is the sign fill.
    let (_, ir) = translate_arm(&[movs_shift(0, 1, 2, 0)]);
    let mut m = Machine::new();
    m.set_reg(1, 0x8000_0001);
    m.run(&ir);
    assert_eq!(m.reg(0), 0xffff_ffff);
    assert!(m.flag_c());

    // LSL #0 is the identity and leaves the carry untouched.
    let (_, ir) = translate_arm(&[movs_shift(0, 1, 0, 0)]);
    let mut m = Machine::new();
    m.set_reg(1, 0x1234_5678);
    m.set_nzcv(false, false, true, false);
    m.run(&ir);
    assert_eq!(m.reg(0), 0x1234_5678);
    assert!(m.flag_c());

    // ROR #0 is RRX: rotate right through carry.
    let (_, ir) = translate_arm(&[movs_shift(0, 1, 3, 0)]);
    let mut m = Machine::new();
    m.set_reg(1, 0x0000_0003);
    m.set_nzcv(false, false, true, false);
    m.run(&ir);
    assert_eq!(m.reg(0), 0x8000_0001);
    assert!(m.flag_c());
}

#[test]
fn shift_zero_equals_shift_32() {
    // LSR #0 behaves as a 32-bit shift for every input.
    for v in [0u32, 1, 0x8000_0000, 0xdead_beef] {
        let (_, ir) = translate_arm(&[movs_shift(0, 1, 1, 0)]);
        let mut m = Machine::new();
        m.set_reg(1, v);
        m.run(&ir);
        assert_eq!(m.reg(0), 0, "lsr#0 of {v:#x}");
        assert_eq!(m.flag_c(), v >> 31 != 0);
    }
}

// ── Branches ──────────────────────────────────────────────────

#[test]
fn branch_updates_pc() {
    let (_, ir) = translate_arm(&[b(COND_AL, 2)]);
    let mut m = Machine::new();
    m.run(&ir);
    // Target = pc + 8 + imm24*4.
    assert_eq!(m.reg(15), BASE + 8 + 8);
}

#[test]
fn branch_and_link_sets_lr() {
    let (_, ir) = translate_arm(&[bl(-4)]);
    let mut m = Machine::new();
    m.run(&ir);
    assert_eq!(m.reg(14), BASE + 4);
    assert_eq!(m.reg(15), BASE + 8 - 16);
}

#[test]
fn conditional_branch_falls_through() {
    let (_, ir) = translate_arm(&[b(COND_EQ, 2)]);
    let mut m = Machine::new();
    m.set_nzcv(false, false, false, false); // Z clear: not taken
    m.run(&ir);
    assert_eq!(m.reg(15), BASE + 4);

    let mut m = Machine::new();
    m.set_nzcv(false, true, false, false); // Z set: taken
    m.run(&ir);
    assert_eq!(m.reg(15), BASE + 16);
}

#[test]
fn bx_strips_thumb_bit() {
    let (_, ir) = translate_arm(&[bx(2)]);
    let mut m = Machine::new();
    m.set_reg(2, 0x8001);
    m.run(&ir);
    assert_eq!(m.reg(15), 0x8000);
    assert_eq!(
        m.env_read(
            a32t_frontend::arm::cpu::THUMB_OFFSET as usize,
            a32t_core::Type::I32
        ),
        1
    );
}

// ── Loads and stores ──────────────────────────────────────────

#[test]
fn load_store_roundtrip_through_memory() {
    let words = [str_imm(1, 2, 0x10), ldr_imm(0, 2, 0x10)];
    let (_, ir) = translate_arm(&words);
    let mut m = Machine::new();
    m.set_reg(1, 0xcafe_f00d);
    m.set_reg(2, 0x9000);
    m.run(&ir);
    assert_eq!(m.reg(0), 0xcafe_f00d);
}

#[test]
fn ldr_literal_uses_aligned_pc() {
    // LDR r0, [pc, #4]
    let (_, ir) = translate_arm(&[ldr_imm(0, 15, 4)]);
    let mut m = Machine::new();
    let addr = BASE + 8 + 4;
    for (i, byte) in 0x1122_3344u32.to_le_bytes().iter().enumerate() {
        m.mem.insert(addr + i as u32, *byte);
    }
    m.run(&ir);
    assert_eq!(m.reg(0), 0x1122_3344);
}

// ── Exceptions and terminators ────────────────────────────────

#[test]
fn svc_defers_exception_to_terminator() {
    let (_, ir) = translate_arm(&[svc(0x42)]);
    assert!(calls_exception(&ir, excp::SWI));
    // PC was advanced past the SVC before raising.
    let mut m = Machine::new();
    m.run(&ir);
    assert_eq!(m.reg(15), BASE + 4);
}

#[test]
fn undefined_instruction_raises_udef() {
    let (tb, ir) = translate_arm(&[udf()]);
    assert_eq!(tb.icount, 1);
    assert!(calls_exception(&ir, excp::UDEF));
}

#[test]
fn pc_alignment_fault_has_priority() {
    let image = FlatImage::new(BASE, vec![0; 64]);
    let flags = arm_flags();
    let mut ir = Context::new();
    translate_block(&image, &flags, BASE + 2, 0, &mut ir).unwrap();
    let (helper, _) = first_call(&ir).expect("no call emitted");
    assert_eq!(helper, Helper::ExceptionPcAlignment.id());
}

#[test]
fn arm_mode_on_m_profile_is_invstate() {
    let mut flags = TbFlags::new(ArmFeatures::v8_1m());
    flags.thumb = false;
    let (_, ir) = translate_words(&[add_reg(COND_AL, 0, 0, 1, 2)], &flags);
    assert!(calls_exception(&ir, excp::INVSTATE));
}

#[test]
fn wfi_ends_block_with_helper() {
    // WFI hint.
    let word = (COND_AL << 28) | 0x0320_f003;
    let (_, ir) = translate_arm(&[word]);
    assert!(ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::Wfi.id()));
}

// ── Block shaping ─────────────────────────────────────────────

#[test]
fn straightline_block_respects_budget() {
    let words = vec![mov_imm(COND_AL, 1, 1); 10];
    let image = {
        let mut bytes = Vec::new();
        for w in &words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        FlatImage::new(BASE, bytes)
    };
    let flags = arm_flags();
    let mut ir = Context::new();
    let tb = translate_block(&image, &flags, BASE, 4, &mut ir).unwrap();
    assert_eq!(tb.icount, 4);
    assert_eq!(tb.size, 16);
}

#[test]
fn single_step_limits_block_to_one_insn() {
    let mut flags = arm_flags();
    flags.ss_active = true;
    flags.pstate_ss = true;
    let words = [mov_imm(COND_AL, 1, 1), mov_imm(COND_AL, 2, 2)];
    let (tb, ir) = translate_words(&words, &flags);
    assert_eq!(tb.icount, 1);
    // The step exception is raised instead of chaining.
    assert!(ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::ExceptionSwstep.id()));
}

#[test]
fn retranslation_is_idempotent() {
    let words = [
        add_reg(COND_AL, 1, 0, 1, 2),
        add_imm(COND_EQ, 0, 3, 3, 1),
        str_imm(3, 2, 8),
        b(COND_AL, -3),
    ];
    let (tb1, ir1) = translate_arm(&words);
    let (tb2, ir2) = translate_arm(&words);
    assert_eq!(tb1.size, tb2.size);
    assert_eq!(tb1.icount, tb2.icount);
    assert_eq!(ir1.num_ops(), ir2.num_ops());
    assert_eq!(ir1.ops(), ir2.ops());
    assert_eq!(ir1.nb_temps(), ir2.nb_temps());
}

// ── Properties ────────────────────────────────────────────────

proptest! {
    /// Flag computation matches the widened-arithmetic reference.
    #[test]
    fn adds_flags_match_reference(a: u32, b_in: u32) {
        let (_, ir) = translate_arm(&[add_reg(COND_AL, 1, 0, 1, 2)]);
        let mut m = Machine::new();
        m.set_reg(1, a);
        m.set_reg(2, b_in);
        m.run(&ir);

        let wide = a as u64 + b_in as u64;
        let result = wide as u32;
        prop_assert_eq!(m.reg(0), result);
        prop_assert_eq!(m.flag_c(), wide > 0xffff_ffff);
        let overflow = (a as i32 >= 0) == (b_in as i32 >= 0)
            && (result as i32 >= 0) != (a as i32 >= 0);
        prop_assert_eq!(m.flag_v(), overflow);
        prop_assert_eq!(m.flag_z(), result == 0);
        prop_assert_eq!(m.flag_n(), (result as i32) < 0);
    }

    /// Decode totality: any 32-bit word translates to a well-formed
    /// block — a handler outcome or an undefined-instruction trap,
    /// never a crash or a dangling label.
    #[test]
    fn decode_any_word_terminates(word: u32) {
        let (tb, ir) = translate_arm(&[word]);
        prop_assert!(tb.icount >= 1);
        prop_assert!(ir.num_ops() > 0);
    }

    /// Same, for the M-profile Thumb configuration.
    #[test]
    fn decode_any_thumb_word_terminates(half: u16, half2: u16) {
        let mut flags = TbFlags::new(ArmFeatures::v8_1m());
        flags.thumb = true;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&half.to_le_bytes());
        bytes.extend_from_slice(&half2.to_le_bytes());
        // Pad so a 32-bit prefix always has a suffix to fetch.
        bytes.extend_from_slice(&[0, 0]);
        let image = FlatImage::new(BASE, bytes);
        let mut ir = Context::new();
        let tb = translate_block(&image, &flags, BASE, 0, &mut ir).unwrap();
        prop_assert!(tb.icount >= 1);
        prop_assert!(ir.num_ops() > 0);
    }
}
