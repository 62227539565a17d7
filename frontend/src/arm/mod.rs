//! AArch32 translator — ARM and Thumb instruction streams to IR.

pub mod cpu;
mod gen;
pub mod helper;
#[allow(dead_code)]
mod insn_decode;
mod ops;
mod trans_a32;
mod trans_mve;
mod trans_nocp;
mod trans_t16;
mod trans_t32;
mod trans_vfp;

use log::trace;

use a32t_core::tb::cflags::CF_SINGLE_STEP;
use a32t_core::{Context, TempIdx, TranslationBlock, Type};

use crate::{
    translator_loop, CodeMemory, DisasContextBase, DisasJumpType, Fault,
    Outcome, TranslateError, TranslatorOps,
};
use cpu::{reg_offset, ArmFeatures, TbFlags, CF_OFFSET, NF_OFFSET, VF_OFFSET,
    ZF_OFFSET, EXCLUSIVE_ADDR_OFFSET, EXCLUSIVE_VAL_OFFSET};
use insn_decode::{
    decode_a32, decode_a32_uncond, decode_mve, decode_nocp, decode_t16,
    decode_t32, decode_vfp,
};

/// Guest page size assumed for fetch-boundary purposes.
pub const TARGET_PAGE_SIZE: u32 = 4096;
const TARGET_PAGE_MASK: u32 = !(TARGET_PAGE_SIZE - 1);

/// Beatwise execution-continuation values (CPSR ECI field).
pub mod eci {
    pub const NONE: u32 = 0;
    /// Completed: A0.
    pub const A0: u32 = 1;
    /// Completed: A0, A1.
    pub const A0A1: u32 = 2;
    /// Completed: A0, A1, A2.
    pub const A0A1A2: u32 = 4;
    /// Completed: A0, A1, A2, B0.
    pub const A0A1A2B0: u32 = 5;
}

/// A pending conditional-skip label (ARM per-instruction condition
/// or a Thumb conditional branch), together with the PC-tracking
/// value at the point the label was created so both paths rejoin
/// with consistent bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct CondLabel {
    pub label: u32,
    pub pc_save: Option<u32>,
}

/// AArch32 disassembly context (extends `DisasContextBase`).
pub struct A32DisasContext<'a> {
    /// Generic base fields (pc, is_jmp, counters).
    pub base: DisasContextBase,
    /// Guest code backing store.
    mem: &'a dyn CodeMemory,
    /// Read-only CPU configuration snapshot.
    pub flags: TbFlags,

    // -- IR bindings --
    /// IR temp for the env pointer.
    pub env: TempIdx,
    /// IR temps for r0-r15 (globals).
    pub regs: [TempIdx; 16],
    /// NZCV flag globals (split representation).
    pub nf: TempIdx,
    pub zf: TempIdx,
    pub cf: TempIdx,
    pub vf: TempIdx,
    /// Exclusive-monitor globals.
    pub exclusive_addr: TempIdx,
    pub exclusive_val: TempIdx,

    // -- Per-instruction state --
    /// PC of the instruction currently being translated.
    pub pc_curr: u32,
    /// Translation-time value of the runtime PC register, when
    /// known. `None` after an indirect branch target was written.
    pub pc_save: Option<u32>,
    /// Raw instruction word being decoded.
    pub insn: u32,
    /// Thumb IT-block state: 5-bit mask (zero = not predicated).
    pub condexec_mask: u32,
    /// Thumb IT-block state: base condition.
    pub condexec_cond: u32,
    /// Beatwise continuation state (M-profile MVE).
    pub eci: u32,
    /// Set by any handler that either honours or is transparent to
    /// ECI; left clear, the safety net converts the instruction
    /// into an INVSTATE fault.
    pub eci_handled: bool,
    /// Pending conditional-skip label.
    pub condjmp: Option<CondLabel>,
    /// Immediate of a deferred SVC/HVC, raised by the terminator.
    pub svc_imm: u32,
    /// Last memory op was a load-exclusive (swstep syndrome detail).
    pub is_ldex: bool,
    /// Page containing the first instruction of the block.
    pub page_start: u32,
}

impl<'a> A32DisasContext<'a> {
    pub fn new(
        pc: u32,
        mem: &'a dyn CodeMemory,
        flags: TbFlags,
        max_insns: u32,
    ) -> Self {
        let mut condexec_mask = 0;
        let mut condexec_cond = 0;
        let mut eci_val = 0;
        // CONDEXEC holds the IT bits unless the low nibble is zero,
        // in which case an M-profile core may be carrying ECI state
        // for a partially executed beatwise instruction.
        if flags.condexec & 0xf != 0 {
            condexec_mask = (flags.condexec & 0xf) << 1;
            condexec_cond = flags.condexec >> 4;
        } else if flags.features.contains(ArmFeatures::M) {
            eci_val = flags.condexec >> 4;
        }

        let mut max_insns = max_insns;
        if flags.ss_active {
            // Architectural single-step: one instruction per block.
            max_insns = 1;
        }
        if !flags.thumb {
            // Fixed-length ISA: bound the block to the insns left on
            // the page so no fetch can cross into an unmapped page.
            let bound = (TARGET_PAGE_SIZE - (pc & !TARGET_PAGE_MASK)) / 4;
            max_insns = max_insns.min(bound.max(1));
        }

        Self {
            base: DisasContextBase {
                pc_first: pc,
                pc_next: pc,
                is_jmp: DisasJumpType::Next,
                num_insns: 0,
                max_insns,
            },
            mem,
            flags,
            env: TempIdx(0),
            regs: [TempIdx(0); 16],
            nf: TempIdx(0),
            zf: TempIdx(0),
            cf: TempIdx(0),
            vf: TempIdx(0),
            exclusive_addr: TempIdx(0),
            exclusive_val: TempIdx(0),
            pc_curr: pc,
            pc_save: Some(pc),
            insn: 0,
            condexec_mask,
            condexec_cond,
            eci: eci_val,
            eci_handled: false,
            condjmp: None,
            svc_imm: 0,
            is_ldex: false,
            page_start: pc & TARGET_PAGE_MASK,
        }
    }

    pub fn feature(&self, f: ArmFeatures) -> bool {
        self.flags.features.contains(f)
    }

    pub fn is_user(&self) -> bool {
        self.flags.current_el == 0
    }

    /// Length in bytes of the instruction being translated.
    pub fn curr_insn_len(&self) -> u32 {
        self.base.pc_next - self.pc_curr
    }

    /// Whether we are inside a Thumb IT block.
    pub fn in_it_block(&self) -> bool {
        self.condexec_mask != 0
    }

    // -- Fetching --

    fn ldl_code(&self, addr: u32) -> Result<u32, crate::MemFault> {
        let w = self.mem.read_u32(addr)?;
        Ok(if self.flags.bswap_code { w.swap_bytes() } else { w })
    }

    fn lduw_code(&self, addr: u32) -> Result<u16, crate::MemFault> {
        let w = self.mem.read_u16(addr)?;
        Ok(if self.flags.bswap_code { w.swap_bytes() } else { w })
    }

    /// Whether a Thumb halfword begins a 16-bit instruction.
    ///
    /// Top five bits 0b11101/0b11110/0b11111 start a 32-bit
    /// encoding on any Thumb-2 capable core. Thumb-1 cores treat
    /// only a BL/BLX prefix whose suffix is on the same page as the
    /// first half of a 32-bit pair; everything else decodes as a
    /// 16-bit instruction.
    fn thumb_insn_is_16bit(&self, pc: u32, insn: u16) -> bool {
        if (insn >> 11) < 0x1d {
            return true;
        }
        if self.feature(ArmFeatures::THUMB2) || self.feature(ArmFeatures::M) {
            return false;
        }
        if (insn >> 11) == 0x1e
            && pc.wrapping_sub(self.page_start) < TARGET_PAGE_SIZE - 3
        {
            return false;
        }
        true
    }

    /// Whether the Thumb insn at `base.pc_next` might cross a page
    /// boundary. False positives are fine, false negatives are not.
    fn insn_crosses_page(&self) -> bool {
        match self.lduw_code(self.base.pc_next) {
            Ok(insn) => !self.thumb_insn_is_16bit(self.base.pc_next, insn),
            // Unreadable suffix page: report a crossing so the
            // caller ends the block before decoding.
            Err(_) => true,
        }
    }

    // -- Common per-instruction checks --

    /// Single-step state Active-pending: take the step exception
    /// before translating anything.
    fn check_ss_active(&mut self, ir: &mut Context) -> bool {
        if self.flags.ss_active && !self.flags.pstate_ss {
            assert_eq!(self.base.num_insns, 1);
            self.gen_swstep_exception(ir, false, false);
            self.base.is_jmp = DisasJumpType::NoReturn;
            return true;
        }
        false
    }

    /// Resolve a pending conditional-skip label once the
    /// fall-through path has been fully emitted.
    fn post_translate_insn(&mut self, ir: &mut Context) {
        if self.base.is_jmp != DisasJumpType::Next {
            return;
        }
        if let Some(cl) = self.condjmp.take() {
            if self.pc_save != cl.pc_save {
                // Rejoin with the PC bookkeeping both paths agree on.
                let target = cl
                    .pc_save
                    .expect("conditional label lost PC tracking");
                self.gen_update_pc_abs(ir, target);
            }
            ir.gen_set_label(cl.label);
        }
    }

    // -- Decode drivers --

    /// Decode one ARM-mode instruction, scanning decoder families in
    /// priority order.
    fn disas_arm_insn(&mut self, ir: &mut Context, insn: u32) {
        // M-profile cores do not implement ARM mode; this is the
        // INVSTATE UsageFault, checked before any decode.
        if self.feature(ArmFeatures::M) {
            self.gen_fault(ir, Fault::Invstate);
            return;
        }

        if self.flags.pstate_il {
            // Illegal execution state, after instruction-abort but
            // before any decode of the instruction itself.
            self.gen_fault(ir, Fault::IllegalState);
            return;
        }

        let cond = insn >> 28;
        if cond == 0xf {
            // The 0b1111 condition is UNPREDICTABLE before v5 (we
            // choose to UNDEF) and the unconditional-instruction
            // space from v5 on.
            if !self.feature(ArmFeatures::V5) {
                self.gen_fault(ir, Fault::UnallocatedEncoding);
                return;
            }
            let out = decode_a32_uncond(self, ir, insn);
            self.resolve_outcome(ir, out);
            return;
        }

        if cond != 0xe {
            // Not always-execute: conditional skip to a label placed
            // just past this instruction's IR.
            self.arm_skip_unless(ir, cond);
        }

        let mut out = decode_a32(self, ir, insn);
        if out == Outcome::Declined {
            out = decode_vfp(self, ir, insn);
        }
        self.resolve_outcome(ir, out);
    }

    /// Decode one 32-bit Thumb instruction.
    fn disas_thumb2_insn(&mut self, ir: &mut Context, insn: u32) {
        if self.feature(ArmFeatures::M) && !self.feature(ArmFeatures::V7) {
            // v6-M supports only a small fixed subset of 32-bit
            // encodings.
            static ARMV6M_INSN: [u32; 6] = [
                0xf380_8000, // msr
                0xf3b0_8040, // dsb
                0xf3b0_8050, // dmb
                0xf3b0_8060, // isb
                0xf3e0_8000, // mrs
                0xf000_d000, // bl
            ];
            static ARMV6M_MASK: [u32; 6] = [
                0xffe0_d000,
                0xfff0_d0f0,
                0xfff0_d0f0,
                0xfff0_d0f0,
                0xffe0_d000,
                0xf800_d000,
            ];
            let found = ARMV6M_INSN
                .iter()
                .zip(&ARMV6M_MASK)
                .any(|(&i, &m)| insn & m == i);
            if !found {
                self.gen_fault(ir, Fault::UnallocatedEncoding);
                return;
            }
        } else if (insn & 0xf800_e800) != 0xf000_e800
            && !self.feature(ArmFeatures::THUMB2)
        {
            // Thumb-1 cores only have the combined BL/BLX pair here.
            self.gen_fault(ir, Fault::UnallocatedEncoding);
            return;
        }

        if self.feature(ArmFeatures::M) {
            // The coprocessor-disabled trap covers (almost) the
            // whole coprocessor encoding space and takes precedence
            // over deeper decode, so consult it first.
            let out = decode_nocp(self, ir, insn);
            if out != Outcome::Declined {
                self.resolve_outcome(ir, out);
                return;
            }
        }

        let mut out = decode_t32(self, ir, insn);
        if out == Outcome::Declined {
            out = decode_mve(self, ir, insn);
        }
        if out == Outcome::Declined && (insn >> 28) == 0xe {
            out = decode_vfp(self, ir, insn);
        }
        self.resolve_outcome(ir, out);
    }

    fn disas_thumb_insn(&mut self, ir: &mut Context, insn: u16) {
        let out = decode_t16(self, ir, insn);
        self.resolve_outcome(ir, out);
    }

    /// A Thumb insn that executes regardless of IT state: BKPT, and
    /// v8M SG. (A wider class is UNPREDICTABLE inside an IT block;
    /// performing the condition check anyway is a permitted
    /// CONSTRAINED UNPREDICTABLE choice for those.)
    fn thumb_insn_is_unconditional(&self, insn: u32) -> bool {
        if (insn & 0xffff_ff00) == 0xbe00 {
            return true; // BKPT
        }
        if insn == 0xe97f_e97f
            && self.feature(ArmFeatures::V8)
            && self.feature(ArmFeatures::M)
        {
            return true; // SG
        }
        false
    }

    /// Convert a handler outcome into emitted IR.
    fn resolve_outcome(&mut self, ir: &mut Context, out: Outcome) {
        match out {
            Outcome::Handled => {}
            Outcome::Declined => {
                self.gen_fault(ir, Fault::UnallocatedEncoding)
            }
            Outcome::Faulted(f) => self.gen_fault(ir, f),
        }
    }
}

// ---------------------------------------------------------------
// TranslatorOps implementations
// ---------------------------------------------------------------

fn init_disas_context(ctx: &mut A32DisasContext<'_>, ir: &mut Context) {
    // The env pointer and the architectural globals. Order matters:
    // globals must all be registered before the first local temp.
    ctx.env = ir.new_fixed(Type::I32, "env");
    static REG_NAMES: [&str; 16] = [
        "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10",
        "r11", "r12", "sp", "lr", "pc",
    ];
    for i in 0..16 {
        ctx.regs[i] =
            ir.new_global(Type::I32, ctx.env, reg_offset(i), REG_NAMES[i]);
    }
    ctx.nf = ir.new_global(Type::I32, ctx.env, NF_OFFSET, "nf");
    ctx.zf = ir.new_global(Type::I32, ctx.env, ZF_OFFSET, "zf");
    ctx.cf = ir.new_global(Type::I32, ctx.env, CF_OFFSET, "cf");
    ctx.vf = ir.new_global(Type::I32, ctx.env, VF_OFFSET, "vf");
    ctx.exclusive_addr = ir.new_global(
        Type::I32,
        ctx.env,
        EXCLUSIVE_ADDR_OFFSET,
        "exclusive_addr",
    );
    ctx.exclusive_val =
        ir.new_global(Type::I32, ctx.env, EXCLUSIVE_VAL_OFFSET, "exclusive_val");
}

fn tb_start(ctx: &mut A32DisasContext<'_>, ir: &mut Context) {
    // Zero the stored IT bits eagerly: the in-context copy is
    // authoritative during translation and is written back by
    // gen_set_condexec wherever the block can be left.
    if ctx.condexec_mask != 0 || ctx.condexec_cond != 0 {
        ctx.store_cpu_field_constant(ir, 0, cpu::CONDEXEC_OFFSET);
    }
}

fn insn_start(ctx: &mut A32DisasContext<'_>, ir: &mut Context) {
    // ECI and IT share the CONDEXEC bits; reconstitute whichever is
    // live so exceptions inside the instruction restore correctly.
    let cond_bits = if ctx.eci != 0 {
        ctx.eci << 4
    } else {
        (ctx.condexec_cond << 4) | (ctx.condexec_mask >> 1)
    };
    ir.gen_insn_start(ctx.base.pc_next, cond_bits);
    ctx.base.num_insns += 1;
}

/// Marker type for the ARM-mode translator.
pub struct ArmTranslator<'a>(std::marker::PhantomData<&'a ()>);

impl<'a> TranslatorOps for ArmTranslator<'a> {
    type DisasContext = A32DisasContext<'a>;

    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context) {
        init_disas_context(ctx, ir);
    }

    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        tb_start(ctx, ir);
    }

    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        insn_start(ctx, ir);
    }

    fn translate_insn(ctx: &mut Self::DisasContext, ir: &mut Context) {
        let pc = ctx.base.pc_next;

        // Single-step exceptions have the highest priority.
        if ctx.check_ss_active(ir) {
            ctx.base.pc_next = pc + 4;
            return;
        }

        if pc & 3 != 0 {
            // PC alignment fault. Only possible after an indirect
            // branch, i.e. at the first instruction of the block;
            // every later PC is derived and stays aligned.
            assert_eq!(ctx.base.num_insns, 1);
            ctx.gen_fault(ir, Fault::PcAlignment);
            ctx.base.pc_next = (pc + 3) & !3;
            return;
        }

        ctx.pc_curr = pc;
        let insn = match ctx.ldl_code(pc) {
            Ok(w) => w,
            Err(_) => {
                ctx.gen_fault(ir, Fault::PrefetchAbort);
                ctx.base.pc_next = pc + 4;
                return;
            }
        };
        ctx.insn = insn;
        ctx.base.pc_next = pc + 4;
        ctx.disas_arm_insn(ir, insn);

        ctx.post_translate_insn(ir);

        // Fixed-length ISA: the page-crossing bound was applied to
        // max_insns up front.
    }

    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context) {
        ctx.tb_stop(ir);
    }

    fn base(ctx: &Self::DisasContext) -> &DisasContextBase {
        &ctx.base
    }

    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase {
        &mut ctx.base
    }
}

/// Marker type for the Thumb-mode translator.
pub struct ThumbTranslator<'a>(std::marker::PhantomData<&'a ()>);

impl<'a> TranslatorOps for ThumbTranslator<'a> {
    type DisasContext = A32DisasContext<'a>;

    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context) {
        init_disas_context(ctx, ir);
    }

    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        tb_start(ctx, ir);
    }

    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        insn_start(ctx, ir);
    }

    fn translate_insn(ctx: &mut Self::DisasContext, ir: &mut Context) {
        let mut pc = ctx.base.pc_next;

        // A misaligned Thumb PC is architecturally impossible: bit 0
        // selects the Thumb state and is stripped by every write.
        assert_eq!(pc & 1, 0, "misaligned thumb pc {pc:#x}");

        if ctx.check_ss_active(ir) {
            ctx.base.pc_next = pc + 2;
            return;
        }

        ctx.pc_curr = pc;
        let half = match ctx.lduw_code(pc) {
            Ok(w) => w,
            Err(_) => {
                ctx.gen_fault(ir, Fault::PrefetchAbort);
                ctx.base.pc_next = pc + 2;
                return;
            }
        };
        let is_16bit = ctx.thumb_insn_is_16bit(pc, half);
        pc += 2;
        let mut insn = half as u32;
        if !is_16bit {
            let insn2 = match ctx.lduw_code(pc) {
                Ok(w) => w,
                Err(_) => {
                    ctx.gen_fault(ir, Fault::PrefetchAbort);
                    ctx.base.pc_next = pc + 2;
                    return;
                }
            };
            insn = (insn << 16) | insn2 as u32;
            pc += 2;
        }
        ctx.base.pc_next = pc;
        ctx.insn = insn;

        if ctx.flags.pstate_il {
            ctx.gen_fault(ir, Fault::IllegalState);
            return;
        }

        // Safety net for beatwise continuation: any instruction that
        // neither honours ECI nor is declared transparent to it must
        // become an INVSTATE fault. Mark the op list so the
        // partially emitted instruction can be rewound.
        let eci_rewind = ir.next_op_idx();
        let eci_pc_save = ctx.pc_save;

        if ctx.condexec_mask != 0 && !ctx.thumb_insn_is_unconditional(insn) {
            // Conditionally skip the insn. Both 0xe and 0xf mean
            // "always" here; 0xf is not "never".
            let cond = ctx.condexec_cond;
            if cond < 0xe {
                ctx.arm_skip_unless(ir, cond);
            }
        }

        if is_16bit {
            ctx.disas_thumb_insn(ir, insn as u16);
        } else {
            ctx.disas_thumb2_insn(ir, insn);
        }

        // Advance the IT-block state machine.
        if ctx.condexec_mask != 0 {
            ctx.condexec_cond =
                (ctx.condexec_cond & 0xe) | ((ctx.condexec_mask >> 4) & 1);
            ctx.condexec_mask = (ctx.condexec_mask << 1) & 0x1f;
            if ctx.condexec_mask == 0 {
                ctx.condexec_cond = 0;
            }
        }

        if ctx.eci != 0 && !ctx.eci_handled {
            // Not valid under ECI at all: drop what was generated
            // and raise the UsageFault instead.
            trace!(
                "eci safety net at {:#010x}: insn {insn:#010x}",
                ctx.pc_curr
            );
            ir.truncate_ops(eci_rewind);
            ctx.pc_save = eci_pc_save;
            ctx.condjmp = None;
            ctx.gen_fault(ir, Fault::Invstate);
        }

        ctx.post_translate_insn(ir);

        // Variable-length ISA: end the block when the next insn
        // starts on a new page, or would straddle into one.
        if ctx.base.is_jmp == DisasJumpType::Next {
            let off = ctx.base.pc_next.wrapping_sub(ctx.page_start);
            if off >= TARGET_PAGE_SIZE
                || (off >= TARGET_PAGE_SIZE - 3 && ctx.insn_crosses_page())
            {
                ctx.base.is_jmp = DisasJumpType::TooMany;
            }
        }
    }

    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context) {
        ctx.tb_stop(ir);
    }

    fn base(ctx: &Self::DisasContext) -> &DisasContextBase {
        &ctx.base
    }

    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase {
        &mut ctx.base
    }
}

// ---------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------

/// Translate one block starting at `pc` against the given memory
/// snapshot and CPU configuration, appending IR into `ir`.
///
/// On success the block descriptor and the filled `ir` context form
/// the unit handed to the consumer; on error nothing was committed
/// and `ir` is reset.
pub fn translate_block(
    mem: &dyn CodeMemory,
    flags: &TbFlags,
    pc: u32,
    cflags: u32,
    ir: &mut Context,
) -> Result<TranslationBlock, TranslateError> {
    // Refuse up front if the entry is unreadable: there is no
    // instruction to attribute a guest fault to.
    if flags.thumb {
        mem.read_u16(pc & !1)?;
    } else {
        mem.read_u32(pc & !3)?;
    }

    let mut cflags = cflags;
    if flags.ss_active {
        cflags |= CF_SINGLE_STEP;
    }
    let max_insns = TranslationBlock::max_insns(cflags);

    trace!(
        "translate_block pc={pc:#010x} thumb={} max_insns={max_insns}",
        flags.thumb
    );

    // All-or-nothing: anything left in the context from an earlier
    // attempt is discarded before the first op of this unit.
    ir.reset();

    let mut ctx = A32DisasContext::new(pc, mem, *flags, max_insns);

    if flags.thumb {
        translator_loop::<ThumbTranslator>(&mut ctx, ir);
    } else {
        translator_loop::<ArmTranslator>(&mut ctx, ir);
    }

    ir.assert_labels_resolved();

    let mut tb = TranslationBlock::new(pc, flags.hash(), cflags);
    tb.size = ctx.base.pc_next - ctx.base.pc_first;
    tb.icount = ctx.base.num_insns as u16;
    Ok(tb)
}
