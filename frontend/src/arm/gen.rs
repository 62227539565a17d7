//! Shared IR-emission helpers for the AArch32 translator: register
//! file access, flag computation, the shift/condition engines, and
//! exception/terminator generation.

use a32t_core::{Context, Cond, MemOp, TempIdx, Type};

use super::cpu::{
    self, excp, syn, ArmFeatures, EXC_RETURN_MIN_MAGIC, FNC_RETURN_MIN_MAGIC,
};
use super::helper::Helper;
use super::{A32DisasContext, CondLabel};
use crate::{DisasJumpType, Fault};

/// A lowered guest condition: IR condition plus the value to test
/// against zero.
pub struct DisasCompare {
    pub cond: Cond,
    pub value: TempIdx,
}

impl<'a> A32DisasContext<'a> {
    // ------------------------------------------------------------
    // CPU-state field access
    // ------------------------------------------------------------

    pub fn load_cpu_field(&mut self, ir: &mut Context, offset: i64) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        ir.gen_ld(Type::I32, t, self.env, offset);
        t
    }

    pub fn store_cpu_field(
        &mut self,
        ir: &mut Context,
        val: TempIdx,
        offset: i64,
    ) {
        ir.gen_st(Type::I32, val, self.env, offset);
    }

    pub fn store_cpu_field_constant(
        &mut self,
        ir: &mut Context,
        val: u32,
        offset: i64,
    ) {
        let c = ir.new_const(Type::I32, val as u64);
        ir.gen_st(Type::I32, c, self.env, offset);
    }

    // ------------------------------------------------------------
    // PC arithmetic
    // ------------------------------------------------------------

    /// The value the guest reads from r15: current instruction
    /// address plus 8 (ARM) or 4 (Thumb).
    pub fn read_pc_val(&self) -> u32 {
        self.pc_curr
            .wrapping_add(if self.flags.thumb { 4 } else { 8 })
    }

    /// Branch displacement `diff` relative to the architectural PC.
    pub fn jmp_diff(&self, diff: i32) -> i32 {
        diff.wrapping_add(if self.flags.thumb { 4 } else { 8 })
    }

    /// var = architectural PC + diff.
    pub fn gen_pc_plus_diff(
        &mut self,
        ir: &mut Context,
        var: TempIdx,
        diff: i32,
    ) {
        let val = self.pc_curr.wrapping_add(diff as u32);
        let c = ir.new_const(Type::I32, val as u64);
        ir.gen_mov(Type::I32, var, c);
    }

    /// Write r15 = pc_curr + diff and keep translation-time PC
    /// tracking in sync.
    pub fn gen_update_pc(&mut self, ir: &mut Context, diff: i32) {
        let target = self.pc_curr.wrapping_add(diff as u32);
        self.gen_update_pc_abs(ir, target);
    }

    /// Write r15 = target (absolute).
    pub fn gen_update_pc_abs(&mut self, ir: &mut Context, target: u32) {
        let c = ir.new_const(Type::I32, target as u64);
        ir.gen_mov(Type::I32, self.regs[15], c);
        self.pc_save = Some(target);
    }

    // ------------------------------------------------------------
    // Register file access
    // ------------------------------------------------------------

    /// Read register `reg` into a fresh temp. r15 reads as the
    /// architectural PC.
    pub fn load_reg(&mut self, ir: &mut Context, reg: usize) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        if reg == 15 {
            let c = ir.new_const(Type::I32, self.read_pc_val() as u64);
            ir.gen_mov(Type::I32, t, c);
        } else {
            ir.gen_mov(Type::I32, t, self.regs[reg]);
        }
        t
    }

    /// A fresh temp holding REG + OFS, except r15 is ALIGN(PC, 4).
    /// Used where the ARM ARM specifies a (literal) base or ADR.
    pub fn add_reg_for_lit(
        &mut self,
        ir: &mut Context,
        reg: usize,
        ofs: i32,
    ) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        if reg == 15 {
            let base = self.read_pc_val() & !3;
            let c = ir
                .new_const(Type::I32, base.wrapping_add(ofs as u32) as u64);
            ir.gen_mov(Type::I32, t, c);
        } else {
            let c = ir.new_const(Type::I32, ofs as u32 as u64);
            ir.gen_add(Type::I32, t, self.regs[reg], c);
        }
        t
    }

    /// Set register `reg` to `var`. Writing r15 strips the
    /// interworking bits (bit 0 in Thumb state, bits [1:0] in ARM
    /// state) and becomes a plain jump.
    pub fn store_reg(&mut self, ir: &mut Context, reg: usize, var: TempIdx) {
        let mut var = var;
        if reg == 15 {
            let mask = if self.flags.thumb { !1u32 } else { !3u32 };
            let t = ir.new_temp(Type::I32);
            let c = ir.new_const(Type::I32, mask as u64);
            ir.gen_and(Type::I32, t, var, c);
            var = t;
            self.base.is_jmp = DisasJumpType::Jump;
            self.pc_save = None;
        } else if reg == 13 && self.feature(ArmFeatures::M) {
            // M-profile SP bits [1:0] are always zero.
            let t = ir.new_temp(Type::I32);
            let c = ir.new_const(Type::I32, !3u32 as u64);
            ir.gen_and(Type::I32, t, var, c);
            var = t;
        }
        ir.gen_mov(Type::I32, self.regs[reg], var);
    }

    /// Variant of store_reg for SP writes that must respect the v8M
    /// stack-limit check.
    pub fn store_sp_checked(&mut self, ir: &mut Context, var: TempIdx) {
        if self.flags.v8m_stackcheck {
            let dead = ir.new_temp(Type::I32);
            ir.gen_call(dead, Helper::V8mStackcheck.id(), &[var]);
        }
        self.store_reg(ir, 13, var);
    }

    /// Variant of store_reg with branch&exchange semantics for r15
    /// on v7 and above (ALUWritePC).
    pub fn store_reg_bx(&mut self, ir: &mut Context, reg: usize, var: TempIdx) {
        if reg == 15 && self.feature(ArmFeatures::V7) {
            self.gen_bx(ir, var);
        } else {
            self.store_reg(ir, reg, var);
        }
    }

    /// Variant of store_reg for load results, with interworking on
    /// v5T and above and exception-return detection (LoadWritePC).
    pub fn store_reg_from_load(
        &mut self,
        ir: &mut Context,
        reg: usize,
        var: TempIdx,
    ) {
        if reg == 15 && self.feature(ArmFeatures::V5) {
            self.gen_bx_excret(ir, var);
        } else {
            self.store_reg(ir, reg, var);
        }
    }

    // ------------------------------------------------------------
    // Flag computation
    // ------------------------------------------------------------

    /// Set N and Z from var.
    pub fn gen_logic_cc(&mut self, ir: &mut Context, var: TempIdx) {
        ir.gen_mov(Type::I32, self.nf, var);
        ir.gen_mov(Type::I32, self.zf, var);
    }

    /// dest = t0 + t1 + CF (no flags).
    pub fn gen_add_carry(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        ir.gen_add(Type::I32, dest, t0, t1);
        ir.gen_add(Type::I32, dest, dest, self.cf);
    }

    /// dest = t0 - t1 + CF - 1 (no flags).
    pub fn gen_sub_carry(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        ir.gen_sub(Type::I32, dest, t0, t1);
        ir.gen_add(Type::I32, dest, dest, self.cf);
        let one = ir.new_const(Type::I32, 1);
        ir.gen_sub(Type::I32, dest, dest, one);
    }

    /// dest = t0 + t1, computing NZCV. The carry comes out of a
    /// widened (paired) addition, not a flag-dependent shortcut.
    pub fn gen_add_cc(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let zero = ir.new_const(Type::I32, 0);
        ir.gen_add2(Type::I32, self.nf, self.cf, t0, zero, t1, zero);
        ir.gen_mov(Type::I32, self.zf, self.nf);
        // V = (result ^ t0) & ~(t0 ^ t1): overflow iff the operands
        // agree in sign and the result does not.
        let tmp = ir.new_temp(Type::I32);
        ir.gen_xor(Type::I32, self.vf, self.nf, t0);
        ir.gen_xor(Type::I32, tmp, t0, t1);
        ir.gen_andc(Type::I32, self.vf, self.vf, tmp);
        ir.gen_mov(Type::I32, dest, self.nf);
    }

    /// dest = t0 + t1 + CF, computing NZCV.
    pub fn gen_adc_cc(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let zero = ir.new_const(Type::I32, 0);
        ir.gen_add2(Type::I32, self.nf, self.cf, t0, zero, self.cf, zero);
        ir.gen_add2(Type::I32, self.nf, self.cf, self.nf, self.cf, t1, zero);
        ir.gen_mov(Type::I32, self.zf, self.nf);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_xor(Type::I32, self.vf, self.nf, t0);
        ir.gen_xor(Type::I32, tmp, t0, t1);
        ir.gen_andc(Type::I32, self.vf, self.vf, tmp);
        ir.gen_mov(Type::I32, dest, self.nf);
    }

    /// dest = t0 - t1, computing NZCV (C is NOT borrow).
    pub fn gen_sub_cc(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        ir.gen_sub(Type::I32, self.nf, t0, t1);
        ir.gen_mov(Type::I32, self.zf, self.nf);
        ir.gen_setcond(Type::I32, self.cf, t0, t1, Cond::Geu);
        ir.gen_xor(Type::I32, self.vf, self.nf, t0);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_xor(Type::I32, tmp, t0, t1);
        ir.gen_and(Type::I32, self.vf, self.vf, tmp);
        ir.gen_mov(Type::I32, dest, self.nf);
    }

    /// dest = t0 + ~t1 + CF, computing NZCV.
    pub fn gen_sbc_cc(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let tmp = ir.new_temp(Type::I32);
        ir.gen_not(Type::I32, tmp, t1);
        self.gen_adc_cc(ir, dest, t0, tmp);
    }

    // ------------------------------------------------------------
    // Shift engine
    // ------------------------------------------------------------

    /// CF = bit `shift` of var.
    fn shifter_out_im(&mut self, ir: &mut Context, var: TempIdx, shift: u32) {
        ir.gen_extract(Type::I32, self.cf, var, shift, 1);
    }

    /// Shift `var` in place by an immediate, with the architectural
    /// shift-zero special cases: LSL#0 is a no-op (carry untouched),
    /// LSR#0 and ASR#0 mean shift by 32, ROR#0 is RRX.
    pub fn gen_arm_shift_im(
        &mut self,
        ir: &mut Context,
        var: TempIdx,
        shiftop: u32,
        shift: u32,
        flags: bool,
    ) {
        match shiftop {
            0 => {
                // LSL
                if shift != 0 {
                    if flags {
                        self.shifter_out_im(ir, var, 32 - shift);
                    }
                    let c = ir.new_const(Type::I32, shift as u64);
                    ir.gen_shl(Type::I32, var, var, c);
                }
            }
            1 => {
                // LSR
                if shift == 0 {
                    if flags {
                        let c31 = ir.new_const(Type::I32, 31);
                        ir.gen_shr(Type::I32, self.cf, var, c31);
                    }
                    let zero = ir.new_const(Type::I32, 0);
                    ir.gen_mov(Type::I32, var, zero);
                } else {
                    if flags {
                        self.shifter_out_im(ir, var, shift - 1);
                    }
                    let c = ir.new_const(Type::I32, shift as u64);
                    ir.gen_shr(Type::I32, var, var, c);
                }
            }
            2 => {
                // ASR
                let shift = if shift == 0 { 32 } else { shift };
                if flags {
                    self.shifter_out_im(ir, var, shift - 1);
                }
                let eff = if shift == 32 { 31 } else { shift };
                let c = ir.new_const(Type::I32, eff as u64);
                ir.gen_sar(Type::I32, var, var, c);
            }
            3 => {
                // ROR / RRX
                if shift != 0 {
                    if flags {
                        self.shifter_out_im(ir, var, shift - 1);
                    }
                    let c = ir.new_const(Type::I32, shift as u64);
                    ir.gen_rotr(Type::I32, var, var, c);
                } else {
                    // RRX: rotate right through carry.
                    let tmp = ir.new_temp(Type::I32);
                    let c31 = ir.new_const(Type::I32, 31);
                    ir.gen_shl(Type::I32, tmp, self.cf, c31);
                    if flags {
                        self.shifter_out_im(ir, var, 0);
                    }
                    let one = ir.new_const(Type::I32, 1);
                    ir.gen_shr(Type::I32, var, var, one);
                    ir.gen_or(Type::I32, var, var, tmp);
                }
            }
            _ => unreachable!("bad shiftop {shiftop}"),
        }
    }

    /// dest = t0 << t1 with the register-shift semantics: only the
    /// bottom byte of the amount matters, amounts of 32..255 yield
    /// zero.
    fn gen_shl_var(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let tmpd = ir.new_temp(Type::I32);
        let tmp1 = ir.new_temp(Type::I32);
        let zero = ir.new_const(Type::I32, 0);
        let m1f = ir.new_const(Type::I32, 0x1f);
        let me0 = ir.new_const(Type::I32, 0xe0);
        ir.gen_and(Type::I32, tmp1, t1, m1f);
        ir.gen_shl(Type::I32, tmpd, t0, tmp1);
        ir.gen_and(Type::I32, tmp1, t1, me0);
        ir.gen_movcond(Type::I32, dest, tmp1, zero, zero, tmpd, Cond::Ne);
    }

    fn gen_shr_var(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let tmpd = ir.new_temp(Type::I32);
        let tmp1 = ir.new_temp(Type::I32);
        let zero = ir.new_const(Type::I32, 0);
        let m1f = ir.new_const(Type::I32, 0x1f);
        let me0 = ir.new_const(Type::I32, 0xe0);
        ir.gen_and(Type::I32, tmp1, t1, m1f);
        ir.gen_shr(Type::I32, tmpd, t0, tmp1);
        ir.gen_and(Type::I32, tmp1, t1, me0);
        ir.gen_movcond(Type::I32, dest, tmp1, zero, zero, tmpd, Cond::Ne);
    }

    /// Arithmetic shift right: amounts ≥ 32 clamp to 31.
    fn gen_sar_var(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        t0: TempIdx,
        t1: TempIdx,
    ) {
        let tmp1 = ir.new_temp(Type::I32);
        let mff = ir.new_const(Type::I32, 0xff);
        let c31 = ir.new_const(Type::I32, 31);
        ir.gen_and(Type::I32, tmp1, t1, mff);
        ir.gen_umin(Type::I32, tmp1, tmp1, c31);
        ir.gen_sar(Type::I32, dest, t0, tmp1);
    }

    /// Shift `var` in place by a register amount. Flag-setting
    /// forms go through helpers because the carry-out depends on a
    /// runtime amount.
    pub fn gen_arm_shift_reg(
        &mut self,
        ir: &mut Context,
        var: TempIdx,
        shiftop: u32,
        shift: TempIdx,
        flags: bool,
    ) {
        if flags {
            let h = match shiftop {
                0 => Helper::ShlCc,
                1 => Helper::ShrCc,
                2 => Helper::SarCc,
                _ => Helper::RorCc,
            };
            ir.gen_call(var, h.id(), &[var, shift]);
        } else {
            match shiftop {
                0 => self.gen_shl_var(ir, var, var, shift),
                1 => self.gen_shr_var(ir, var, var, shift),
                2 => self.gen_sar_var(ir, var, var, shift),
                _ => {
                    let m1f = ir.new_const(Type::I32, 0x1f);
                    let t = ir.new_temp(Type::I32);
                    ir.gen_and(Type::I32, t, shift, m1f);
                    ir.gen_rotr(Type::I32, var, var, t);
                }
            }
        }
    }

    // ------------------------------------------------------------
    // Condition engine
    // ------------------------------------------------------------

    /// Lower a guest condition code into an IR compare against zero.
    pub fn arm_test_cc(&mut self, ir: &mut Context, cc: u32) -> DisasCompare {
        let (mut cond, value) = match cc {
            // eq / ne: Z
            0 | 1 => (Cond::Eq, self.zf),
            // cs / cc: C
            2 | 3 => (Cond::Ne, self.cf),
            // mi / pl: N
            4 | 5 => (Cond::Lt, self.nf),
            // vs / vc: V
            6 | 7 => (Cond::Lt, self.vf),
            // hi / ls: C && !Z.  -CF is an all-ones mask when C is
            // set; AND with ZF leaves non-zero exactly for hi.
            8 | 9 => {
                let value = ir.new_temp(Type::I32);
                ir.gen_neg(Type::I32, value, self.cf);
                ir.gen_and(Type::I32, value, value, self.zf);
                (Cond::Ne, value)
            }
            // ge / lt: N == V, i.e. sign of N ^ V.
            10 | 11 => {
                let value = ir.new_temp(Type::I32);
                ir.gen_xor(Type::I32, value, self.vf, self.nf);
                (Cond::Ge, value)
            }
            // gt / le: !Z && N == V. Propagate the sign of
            // ~(N ^ V) and AND with ZF.
            12 | 13 => {
                let value = ir.new_temp(Type::I32);
                let c31 = ir.new_const(Type::I32, 31);
                ir.gen_xor(Type::I32, value, self.vf, self.nf);
                ir.gen_sar(Type::I32, value, value, c31);
                ir.gen_andc(Type::I32, value, self.zf, value);
                (Cond::Ne, value)
            }
            // 0b1110 and 0b1111 both execute always here.
            14 | 15 => {
                return DisasCompare {
                    cond: Cond::Always,
                    value: self.zf,
                }
            }
            _ => unreachable!("bad condition code {cc:#x}"),
        };
        if cc & 1 != 0 {
            cond = cond.invert();
        }
        DisasCompare { cond, value }
    }

    /// Branch to `label` when the compare holds.
    pub fn arm_jump_cc(
        &mut self,
        ir: &mut Context,
        cmp: &DisasCompare,
        label: u32,
    ) {
        ir.gen_brcondi(Type::I32, cmp.value, 0, cmp.cond, label);
    }

    pub fn arm_gen_test_cc(&mut self, ir: &mut Context, cc: u32, label: u32) {
        let cmp = self.arm_test_cc(ir, cc);
        self.arm_jump_cc(ir, &cmp, label);
    }

    /// Ensure the pending conditional-skip label exists.
    pub fn arm_gen_condlabel(&mut self, ir: &mut Context) -> u32 {
        match self.condjmp {
            Some(cl) => cl.label,
            None => {
                let label = ir.new_label();
                self.condjmp = Some(CondLabel {
                    label,
                    pc_save: self.pc_save,
                });
                label
            }
        }
    }

    /// Skip this instruction if condition `cond` is false. The skip
    /// branch is positioned before any IR that writes architectural
    /// state, so a false condition suppresses every side effect.
    pub fn arm_skip_unless(&mut self, ir: &mut Context, cond: u32) {
        let label = self.arm_gen_condlabel(ir);
        self.arm_gen_test_cc(ir, cond ^ 1, label);
    }

    /// Write the live IT bits back to the stored CONDEXEC field.
    /// The stored copy was zeroed at block start, so this is needed
    /// exactly where the block can be left with IT state pending.
    pub fn gen_set_condexec(&mut self, ir: &mut Context) {
        if self.condexec_mask != 0 {
            let val =
                (self.condexec_cond << 4) | (self.condexec_mask >> 1);
            self.store_cpu_field_constant(ir, val, cpu::CONDEXEC_OFFSET);
        }
    }

    /// Clear ECI/ICI continuation state; used by instructions that
    /// restart rather than resume (load/store multiple).
    pub fn clear_eci_state(&mut self, ir: &mut Context) {
        self.eci_handled = true;
        if self.eci != 0 {
            self.store_cpu_field_constant(ir, 0, cpu::CONDEXEC_OFFSET);
            self.eci = 0;
        }
    }

    // ------------------------------------------------------------
    // Beatwise (MVE) continuation protocol
    // ------------------------------------------------------------

    /// Validate ECI for a beatwise instruction and note that it is
    /// being handled. Reserved values are the INVSTATE UsageFault.
    pub fn mve_eci_check(&mut self) -> Result<(), Fault> {
        self.eci_handled = true;
        match self.eci {
            super::eci::NONE
            | super::eci::A0
            | super::eci::A0A1
            | super::eci::A0A1A2
            | super::eci::A0A1A2B0 => Ok(()),
            _ => Err(Fault::Invstate),
        }
    }

    /// Advance ECI past a completed beatwise instruction. Helpers
    /// keep the stored field current themselves; only the
    /// translation-time view needs updating here.
    pub fn mve_update_eci(&mut self) {
        if self.eci != 0 {
            self.eci = if self.eci == super::eci::A0A1A2B0 {
                super::eci::A0
            } else {
                super::eci::NONE
            };
        }
    }

    /// As mve_update_eci, for instructions with no helper call to
    /// keep the stored field current: also store the new value.
    pub fn mve_update_and_store_eci(&mut self, ir: &mut Context) {
        if self.eci != 0 {
            self.mve_update_eci();
            let val = self.eci << 4;
            self.store_cpu_field_constant(ir, val, cpu::CONDEXEC_OFFSET);
        }
    }

    // ------------------------------------------------------------
    // FP/vector access gate
    // ------------------------------------------------------------

    /// Check that FP/vector access is permitted, performing the
    /// M-profile lazy FP-context bookkeeping on success. On failure
    /// the caller propagates the fault and must not emit any of the
    /// instruction's effects.
    pub fn vfp_access_check(&mut self, ir: &mut Context) -> Result<(), Fault> {
        if self.feature(ArmFeatures::M) {
            if !self.flags.vfp_enabled {
                return Err(Fault::Nocp {
                    secure: self.flags.v8m_secure,
                });
            }
            if self.flags.v7m_lspact {
                // Lazy state preservation is active; the helper
                // takes care of writing out the old FP context.
                let dead = ir.new_temp(Type::I32);
                ir.gen_call(dead, Helper::V7mPreserveFpState.id(), &[]);
            }
            if self.flags.v8m_fpccr_s_wrong || self.flags.v7m_new_fp_ctxt_needed
            {
                // FPCCR.S needs correcting and/or a fresh FP context
                // must be created for this security state.
                let dead = ir.new_temp(Type::I32);
                ir.gen_call(dead, Helper::V7mUpdateFpCtxt.id(), &[]);
            }
            Ok(())
        } else {
            if !self.flags.vfp_enabled {
                return Err(Fault::FpAccess);
            }
            Ok(())
        }
    }

    // ------------------------------------------------------------
    // Guest memory access
    // ------------------------------------------------------------

    /// MemOp for a data access of the given size, honouring the
    /// configured data endianness.
    pub fn memop(&self, base: MemOp) -> MemOp {
        if self.flags.be_data {
            base.swapped()
        } else {
            base
        }
    }

    pub fn gen_aa32_ld_i32(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        addr: TempIdx,
        mop: MemOp,
    ) {
        ir.gen_guest_ld(Type::I32, dest, addr, self.memop(mop));
    }

    pub fn gen_aa32_st_i32(
        &mut self,
        ir: &mut Context,
        val: TempIdx,
        addr: TempIdx,
        mop: MemOp,
    ) {
        ir.gen_guest_st(Type::I32, val, addr, self.memop(mop));
    }

    pub fn gen_aa32_ld_i64(
        &mut self,
        ir: &mut Context,
        dest: TempIdx,
        addr: TempIdx,
        mop: MemOp,
    ) {
        ir.gen_guest_ld(Type::I64, dest, addr, self.memop(mop));
    }

    pub fn gen_aa32_st_i64(
        &mut self,
        ir: &mut Context,
        val: TempIdx,
        addr: TempIdx,
        mop: MemOp,
    ) {
        ir.gen_guest_st(Type::I64, val, addr, self.memop(mop));
    }

    // ------------------------------------------------------------
    // Branch & exchange
    // ------------------------------------------------------------

    /// Set PC and Thumb state from var (BXWritePC).
    pub fn gen_bx(&mut self, ir: &mut Context, var: TempIdx) {
        self.base.is_jmp = DisasJumpType::Jump;
        let c = ir.new_const(Type::I32, !1u32 as u64);
        let t = ir.new_temp(Type::I32);
        ir.gen_and(Type::I32, t, var, c);
        ir.gen_mov(Type::I32, self.regs[15], t);
        let one = ir.new_const(Type::I32, 1);
        let tbit = ir.new_temp(Type::I32);
        ir.gen_and(Type::I32, tbit, var, one);
        self.store_cpu_field(ir, tbit, cpu::THUMB_OFFSET);
        self.pc_save = None;
    }

    /// As gen_bx, but on cores where the written value might be an
    /// exception-return magic number (M-profile Handler mode or the
    /// Security Extension), defer the magic-range test to block
    /// close.
    pub fn gen_bx_excret(&mut self, ir: &mut Context, var: TempIdx) {
        self.gen_bx(ir, var);
        if self.feature(ArmFeatures::M_SECURITY)
            || (self.flags.v7m_handler_mode && self.feature(ArmFeatures::M))
        {
            self.base.is_jmp = DisasJumpType::BxExcret;
        }
    }

    /// The deferred exception-return resolution emitted at block
    /// close for DisasJumpType::BxExcret.
    pub fn gen_bx_excret_final_code(&mut self, ir: &mut Context) {
        // FNC_RETURN covers both magic ranges when the Security
        // Extension is present.
        let min_magic = if self.feature(ArmFeatures::M_SECURITY) {
            FNC_RETURN_MIN_MAGIC
        } else {
            EXC_RETURN_MIN_MAGIC
        };
        let excret_label = ir.new_label();
        ir.gen_brcondi(
            Type::I32,
            self.regs[15],
            min_magic as u64,
            Cond::Geu,
            excret_label,
        );
        // No: leave the block as a plain indirect jump would.
        if self.flags.ss_active {
            self.gen_swstep_exception(ir, true, self.is_ldex);
        } else {
            ir.gen_exit_tb(0);
        }
        ir.gen_set_label(excret_label);
        // Yes: the register file holds the magic value; the
        // exception-exit helper reads it from there.
        self.gen_exception_internal(ir, excp::EXCEPTION_EXIT);
    }

    // ------------------------------------------------------------
    // Block-chaining jumps
    // ------------------------------------------------------------

    /// Emit a chainable jump to pc_curr + diff via exit slot `tbno`.
    fn gen_goto_tb(&mut self, ir: &mut Context, tbno: u32, diff: i32) {
        ir.gen_goto_tb(tbno);
        self.gen_update_pc(ir, diff);
        ir.gen_exit_tb(tbno as u64);
    }

    /// Jump to pc_curr + diff, ending the block via exit slot
    /// `tbno`. `diff` is relative to the current instruction, so
    /// callers branching relative to the architectural PC go through
    /// `jmp_diff` first. Valid only in states where the jump target
    /// is the sole remaining control flow.
    pub fn gen_jmp_tb(&mut self, ir: &mut Context, diff: i32, tbno: u32) {
        if self.flags.ss_active {
            // Single-stepped branches become a PC update; the step
            // exception is emitted by the terminator.
            self.gen_update_pc(ir, diff);
            self.base.is_jmp = DisasJumpType::Jump;
            return;
        }
        match self.base.is_jmp {
            DisasJumpType::Next
            | DisasJumpType::TooMany
            | DisasJumpType::NoReturn => {
                // NoReturn happens for the second of the two jumps
                // of a conditional branch: the condition-failed path
                // was already closed out.
                self.gen_goto_tb(ir, tbno, diff);
                self.base.is_jmp = DisasJumpType::NoReturn;
            }
            state => {
                panic!(
                    "direct jump emitted in unexpected state {state:?} \
                     at {:#010x}",
                    self.pc_curr
                );
            }
        }
    }

    pub fn gen_jmp(&mut self, ir: &mut Context, diff: i32) {
        self.gen_jmp_tb(ir, diff, 0);
    }

    // ------------------------------------------------------------
    // Exceptions
    // ------------------------------------------------------------

    pub fn gen_exception_internal(&mut self, ir: &mut Context, excp: u32) {
        let c = ir.new_const(Type::I32, excp as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::ExceptionInternal.id(), &[c]);
    }

    fn gen_exception(&mut self, ir: &mut Context, excp: u32, syndrome: u32) {
        let e = ir.new_const(Type::I32, excp as u64);
        let s = ir.new_const(Type::I32, syndrome as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::Exception.id(), &[e, s]);
    }

    fn gen_exception_el(
        &mut self,
        ir: &mut Context,
        excp: u32,
        syndrome: u32,
        target_el: u32,
    ) {
        let e = ir.new_const(Type::I32, excp as u64);
        let s = ir.new_const(Type::I32, syndrome as u64);
        let el = ir.new_const(Type::I32, target_el as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::ExceptionEl.id(), &[e, s, el]);
    }

    /// Raise an exception at the current instruction, flushing any
    /// pending predication state first so the handler observes a
    /// consistent PC/IT snapshot. Ends the block.
    pub fn gen_exception_insn(
        &mut self,
        ir: &mut Context,
        pc_diff: i32,
        excp: u32,
        syndrome: u32,
    ) {
        self.gen_set_condexec(ir);
        self.gen_update_pc(ir, pc_diff);
        self.gen_exception(ir, excp, syndrome);
        self.base.is_jmp = DisasJumpType::NoReturn;
    }

    pub fn gen_exception_insn_el(
        &mut self,
        ir: &mut Context,
        pc_diff: i32,
        excp: u32,
        syndrome: u32,
        target_el: u32,
    ) {
        self.gen_set_condexec(ir);
        self.gen_update_pc(ir, pc_diff);
        self.gen_exception_el(ir, excp, syndrome, target_el);
        self.base.is_jmp = DisasJumpType::NoReturn;
    }

    /// Undefined-instruction exception for the current encoding.
    pub fn unallocated_encoding(&mut self, ir: &mut Context) {
        self.gen_exception_insn(ir, 0, excp::UDEF, syn::uncategorized());
    }

    /// Software-step exception after (or instead of) an insn.
    pub fn gen_swstep_exception(
        &mut self,
        ir: &mut Context,
        isv: bool,
        ex: bool,
    ) {
        let s = ir.new_const(Type::I32, syn::swstep(isv, ex) as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::ExceptionSwstep.id(), &[s]);
        self.base.is_jmp = DisasJumpType::NoReturn;
    }

    /// Lower a guest-visible fault into exception-raising IR.
    pub fn gen_fault(&mut self, ir: &mut Context, fault: Fault) {
        match fault {
            Fault::Undefined
            | Fault::UnpredictableUndef
            | Fault::UnallocatedEncoding => self.unallocated_encoding(ir),
            Fault::IllegalState => {
                self.gen_exception_insn(
                    ir,
                    0,
                    excp::UDEF,
                    syn::illegalstate(),
                );
            }
            Fault::Invstate => {
                self.gen_exception_insn(
                    ir,
                    0,
                    excp::INVSTATE,
                    syn::uncategorized(),
                );
            }
            Fault::Nocp { secure } => {
                self.gen_exception_insn_el(
                    ir,
                    0,
                    excp::NOCP,
                    syn::uncategorized(),
                    secure as u32,
                );
            }
            Fault::FpAccess => {
                let is_16bit = self.flags.thumb && self.curr_insn_len() == 2;
                self.gen_exception_insn(
                    ir,
                    0,
                    excp::UDEF,
                    syn::fp_access_trap(false, 0xe, is_16bit),
                );
            }
            Fault::PcAlignment => {
                self.gen_set_condexec(ir);
                self.gen_update_pc(ir, 0);
                let pc = ir.new_const(Type::I32, self.pc_curr as u64);
                let dead = ir.new_temp(Type::I32);
                ir.gen_call(dead, Helper::ExceptionPcAlignment.id(), &[pc]);
                self.base.is_jmp = DisasJumpType::NoReturn;
            }
            Fault::PrefetchAbort => {
                self.gen_exception_insn(
                    ir,
                    0,
                    excp::PREFETCH_ABORT,
                    syn::uncategorized(),
                );
            }
        }
    }

    // ------------------------------------------------------------
    // Control-flow terminator
    // ------------------------------------------------------------

    /// Close out the block: resolve the pending predication state
    /// and emit the terminator matching `is_jmp`.
    pub fn tb_stop(&mut self, ir: &mut Context) {
        // When condjmp is still set here, the skipped instruction
        // was a branch or trap and the taken path already wrote the
        // PC.
        self.gen_set_condexec(ir);

        let insn_len = self.curr_insn_len() as i32;

        if self.base.is_jmp == DisasJumpType::BxExcret {
            // Needs its own epilogue that handles single-step and
            // the magic-value test together.
            self.gen_bx_excret_final_code(ir);
        } else if self.flags.ss_active {
            match self.base.is_jmp {
                DisasJumpType::NoReturn => {}
                DisasJumpType::Swi => {
                    self.gen_exception(
                        ir,
                        excp::SWI,
                        syn::aa32_svc(self.svc_imm, self.flags.thumb),
                    );
                }
                DisasJumpType::Hvc => {
                    self.gen_exception_el(
                        ir,
                        excp::HVC,
                        syn::aa32_hvc(self.svc_imm),
                        2,
                    );
                }
                DisasJumpType::Smc => {
                    self.gen_exception_el(ir, excp::SMC, syn::aa32_smc(), 3);
                }
                DisasJumpType::Next
                | DisasJumpType::TooMany
                | DisasJumpType::UpdateExit
                | DisasJumpType::UpdateNochain => {
                    self.gen_update_pc(ir, insn_len);
                    self.gen_swstep_exception(ir, true, self.is_ldex);
                }
                _ => {
                    self.gen_swstep_exception(ir, true, self.is_ldex);
                }
            }
        } else {
            match self.base.is_jmp {
                DisasJumpType::Next | DisasJumpType::TooMany => {
                    self.gen_goto_tb(ir, 1, insn_len);
                }
                DisasJumpType::UpdateNochain => {
                    self.gen_update_pc(ir, insn_len);
                    ir.gen_goto_ptr();
                }
                DisasJumpType::Jump => {
                    ir.gen_goto_ptr();
                }
                DisasJumpType::UpdateExit => {
                    self.gen_update_pc(ir, insn_len);
                    ir.gen_exit_tb(0);
                }
                DisasJumpType::Exit => {
                    ir.gen_exit_tb(0);
                }
                DisasJumpType::NoReturn => {}
                DisasJumpType::Wfi => {
                    let len = ir.new_const(Type::I32, insn_len as u64);
                    let dead = ir.new_temp(Type::I32);
                    ir.gen_call(dead, Helper::Wfi.id(), &[len]);
                    // The helper does not necessarily raise; return
                    // to the loop to check for interrupts anyway.
                    ir.gen_exit_tb(0);
                }
                DisasJumpType::Wfe => {
                    let dead = ir.new_temp(Type::I32);
                    ir.gen_call(dead, Helper::Wfe.id(), &[]);
                }
                DisasJumpType::Yield => {
                    let dead = ir.new_temp(Type::I32);
                    ir.gen_call(dead, Helper::Yield.id(), &[]);
                }
                DisasJumpType::Swi => {
                    self.gen_exception(
                        ir,
                        excp::SWI,
                        syn::aa32_svc(self.svc_imm, self.flags.thumb),
                    );
                }
                DisasJumpType::Hvc => {
                    self.gen_exception_el(
                        ir,
                        excp::HVC,
                        syn::aa32_hvc(self.svc_imm),
                        2,
                    );
                }
                DisasJumpType::Smc => {
                    self.gen_exception_el(ir, excp::SMC, syn::aa32_smc(), 3);
                }
                DisasJumpType::BxExcret => unreachable!(),
            }
        }

        if let Some(cl) = self.condjmp.take() {
            // "Condition failed" path for a skipped branch/trap.
            ir.gen_set_label(cl.label);
            self.pc_save = cl.pc_save;
            self.gen_set_condexec(ir);
            if self.flags.ss_active {
                self.gen_update_pc(ir, insn_len);
                self.gen_swstep_exception(ir, true, self.is_ldex);
            } else {
                self.gen_goto_tb(ir, 1, insn_len);
            }
        }
    }
}
