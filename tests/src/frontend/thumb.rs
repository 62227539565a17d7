//! Thumb-mode tests: IT blocks, beatwise continuation state, page
//! straddling, and the M-profile trap priorities.

use a32t_core::{Context, Opcode, TranslationBlock};
use a32t_frontend::arm::cpu::{excp, ArmFeatures, TbFlags};
use a32t_frontend::arm::helper::Helper;
use a32t_frontend::arm::{eci, translate_block, TARGET_PAGE_SIZE};
use a32t_frontend::FlatImage;

use super::eval::Machine;
use super::{calls_exception, BASE};

// ── Encoders (T16/T32) ────────────────────────────────────────

/// IT with the raw firstcond:mask byte.
fn it_raw(cond_mask: u8) -> u16 {
    0xbf00 | cond_mask as u16
}

/// ADD rdn, #imm8 (flags only outside an IT block).
fn t16_add_imm8(rdn: u16, imm: u16) -> u16 {
    0x3000 | (rdn << 8) | imm
}

fn t16_mov_imm(rd: u16, imm: u16) -> u16 {
    0x2000 | (rd << 8) | imm
}

fn t16_bkpt(imm: u16) -> u16 {
    0xbe00 | imm
}

fn t16_cbz(nz: u16, rn: u16, imm: u16) -> u16 {
    0xb100 | (nz << 11) | (((imm >> 6) & 1) << 9) | (((imm >> 1) & 0x1f) << 3) | rn
}

/// BL <label>: returns the two halfwords.
fn t32_bl(offset: i32) -> [u16; 2] {
    let s = ((offset >> 24) & 1) as u32;
    let i1 = ((offset >> 23) & 1) as u32;
    let i2 = ((offset >> 22) & 1) as u32;
    let j1 = (!i1 & 1) ^ s;
    let j2 = (!i2 & 1) ^ s;
    let imm10 = ((offset >> 12) & 0x3ff) as u32;
    let imm11 = ((offset >> 1) & 0x7ff) as u32;
    [
        (0xf000 | (s << 10) as u16 | imm10 as u16),
        (0xd000 | ((j1 as u16) << 13) | ((j2 as u16) << 11) | imm11 as u16),
    ]
}

/// VADD.I<size> q-register form.
fn mve_vadd(size: u32, qd: u32, qn: u32, qm: u32) -> u32 {
    0xef00_0000 | (size << 18) | (qd << 15) | (qn << 11) | (qm << 7)
}

/// VADD.F32 s0, s0, s0 in the coprocessor space.
const VADD_F32_S0: u32 = 0xee30_0a00;

// ── Harness ───────────────────────────────────────────────────

fn m_flags() -> TbFlags {
    let mut f = TbFlags::new(ArmFeatures::v8_1m());
    f.thumb = true;
    f
}

fn translate_halves(
    halves: &[u16],
    flags: &TbFlags,
    max_insns: u32,
) -> (TranslationBlock, Context) {
    let mut bytes = Vec::new();
    for h in halves {
        bytes.extend_from_slice(&h.to_le_bytes());
    }
    let image = FlatImage::new(BASE, bytes);
    let mut ir = Context::new();
    let tb = translate_block(&image, flags, BASE, max_insns, &mut ir)
        .expect("translation failed");
    (tb, ir)
}

fn words_to_halves(words: &[u32]) -> Vec<u16> {
    let mut halves = Vec::new();
    for w in words {
        halves.push((w >> 16) as u16);
        halves.push(*w as u16);
    }
    halves
}

/// The condexec annotation of each insn_start marker.
fn insn_start_states(ir: &Context) -> Vec<u32> {
    ir.ops()
        .iter()
        .filter(|op| op.opc == Opcode::InsnStart)
        .map(|op| op.cargs()[1].0)
        .collect()
}

fn count_brconds(ir: &Context) -> usize {
    ir.ops().iter().filter(|op| op.opc == Opcode::BrCond).count()
}

// ── IT blocks ─────────────────────────────────────────────────

#[test]
fn it_block_exhausts_after_three_insns() {
    // ITTT EQ predicates exactly three instructions; the fourth
    // observes no predication.
    let halves = [
        it_raw(0x02), // ITTT EQ
        t16_add_imm8(0, 1),
        t16_add_imm8(1, 1),
        t16_add_imm8(2, 1),
        t16_mov_imm(3, 5),
    ];
    let (tb, ir) = translate_halves(&halves, &m_flags(), 5);
    assert_eq!(tb.icount, 5);

    let states = insn_start_states(&ir);
    assert_eq!(states.len(), 5);
    assert_eq!(states[0], 0, "IT itself is not predicated");
    assert!(states[1] != 0 && states[2] != 0 && states[3] != 0);
    assert_eq!(states[4], 0, "IT state must be exhausted");

    // Exactly the three block instructions get a conditional skip.
    assert_eq!(count_brconds(&ir), 3);
}

#[test]
fn it_block_condition_suppresses_writes() {
    let halves = [
        it_raw(0x08), // IT EQ (one instruction)
        t16_add_imm8(0, 1),
        t16_mov_imm(1, 7),
    ];
    let (_, ir) = translate_halves(&halves, &m_flags(), 3);

    let mut m = Machine::new();
    m.set_nzcv(false, false, false, false); // Z clear
    m.set_reg(0, 10);
    m.run(&ir);
    assert_eq!(m.reg(0), 10);
    assert_eq!(m.reg(1), 7);

    let mut m = Machine::new();
    m.set_nzcv(false, true, false, false); // Z set
    m.set_reg(0, 10);
    m.run(&ir);
    assert_eq!(m.reg(0), 11);
}

#[test]
fn t16_add_sets_flags_only_outside_it() {
    let halves = [t16_add_imm8(0, 1)];
    let (_, ir) = translate_halves(&halves, &m_flags(), 1);
    let mut m = Machine::new();
    m.set_reg(0, u32::MAX);
    m.run(&ir);
    assert_eq!(m.reg(0), 0);
    assert!(m.flag_z());
    assert!(m.flag_c());
}

// ── Beatwise continuation (ECI) ───────────────────────────────

fn flags_with_eci(val: u32) -> TbFlags {
    let mut f = m_flags();
    f.condexec = val << 4;
    f
}

#[test]
fn reserved_eci_value_faults_invstate() {
    let halves = words_to_halves(&[mve_vadd(2, 0, 1, 2)]);
    let (_, ir) = translate_halves(&halves, &flags_with_eci(3), 1);
    assert!(calls_exception(&ir, excp::INVSTATE));
}

#[test]
fn valid_eci_lets_beatwise_insn_execute() {
    let halves = words_to_halves(&[mve_vadd(2, 0, 1, 2)]);
    let (_, ir) = translate_halves(&halves, &flags_with_eci(eci::A0), 1);
    assert!(!calls_exception(&ir, excp::INVSTATE));
    assert!(ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::MveVaddW.id()));
}

#[test]
fn eci_safety_net_rewinds_unaware_insn() {
    // A plain ALU instruction is neither continuation-aware nor
    // transparent: with ECI live it must become an INVSTATE fault
    // and its own IR must be discarded.
    let halves = [t16_add_imm8(0, 1)];
    let (_, ir) = translate_halves(&halves, &flags_with_eci(eci::A0), 1);
    assert!(calls_exception(&ir, excp::INVSTATE));
    assert!(
        !ir.ops().iter().any(|op| op.opc == Opcode::Add2),
        "rewound instruction left IR behind"
    );
}

#[test]
fn bkpt_is_eci_transparent() {
    let halves = [t16_bkpt(0xab)];
    let (_, ir) = translate_halves(&halves, &flags_with_eci(eci::A0), 1);
    assert!(!calls_exception(&ir, excp::INVSTATE));
    assert!(ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::ExceptionBkpt.id()));
}

// ── Page straddling ───────────────────────────────────────────

#[test]
fn block_stops_before_straddling_insn() {
    // A 16-bit NOP two bytes before the page boundary, followed by
    // the first half of a 32-bit BL: the block must end after the
    // NOP rather than decode an instruction that crosses the page.
    let start = BASE + TARGET_PAGE_SIZE - 4;
    let bl = t32_bl(0);
    let halves = [0xbf00u16, bl[0], bl[1]];
    let mut bytes = Vec::new();
    for h in halves {
        bytes.extend_from_slice(&h.to_le_bytes());
    }
    let image = FlatImage::new(start, bytes);
    let mut ir = Context::new();
    let flags = m_flags();
    let tb = translate_block(&image, &flags, start, 0, &mut ir).unwrap();
    assert_eq!(tb.icount, 1);
    assert_eq!(tb.size, 2);
}

// ── Branches ──────────────────────────────────────────────────

#[test]
fn thumb_bl_links_and_jumps() {
    let halves = t32_bl(64);
    let (_, ir) = translate_halves(&halves, &m_flags(), 1);
    let mut m = Machine::new();
    m.run(&ir);
    assert_eq!(m.reg(14), (BASE + 4) | 1);
    assert_eq!(m.reg(15), BASE + 4 + 64);
}

#[test]
fn cbz_branches_on_zero() {
    let halves = [t16_cbz(0, 0, 8)];
    let (_, ir) = translate_halves(&halves, &m_flags(), 1);

    let mut m = Machine::new();
    m.set_reg(0, 0);
    m.run(&ir);
    assert_eq!(m.reg(15), BASE + 4 + 8);

    let mut m = Machine::new();
    m.set_reg(0, 1);
    m.run(&ir);
    assert_eq!(m.reg(15), BASE + 2);
}

// ── M-profile trap priorities ─────────────────────────────────

#[test]
fn nocp_takes_precedence_over_fp_decode() {
    let mut flags = m_flags();
    flags.vfp_enabled = false;
    let halves = words_to_halves(&[VADD_F32_S0]);
    let (_, ir) = translate_halves(&halves, &flags, 1);
    assert!(calls_exception(&ir, excp::NOCP));
    assert!(!ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::VfpAddS.id()));
}

#[test]
fn enabled_fp_reaches_the_vfp_decoder() {
    let halves = words_to_halves(&[VADD_F32_S0]);
    let (_, ir) = translate_halves(&halves, &m_flags(), 1);
    assert!(ir
        .ops()
        .iter()
        .any(|op| op.opc == Opcode::Call
            && op.cargs()[0].0 == Helper::VfpAddS.id()));
}

#[test]
fn illegal_state_beats_decode() {
    let mut flags = m_flags();
    flags.pstate_il = true;
    let halves = [t16_mov_imm(0, 1)];
    let (_, ir) = translate_halves(&halves, &flags, 1);
    assert!(calls_exception(&ir, excp::UDEF));
}
