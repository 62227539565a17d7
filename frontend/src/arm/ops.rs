//! Operation bodies shared between the A32 and T32 handler sets.
//! The decode traits differ per encoding family but the semantics
//! funnel through these helpers, which take plain field values.

use a32t_core::{Context, Cond, MemOp, TempIdx, Type};

use super::cpu::ArmFeatures;
use super::helper::Helper;
use super::A32DisasContext;
use crate::{DisasJumpType, Fault, Outcome};

/// Destination-write policy for a data-processing result
/// (ALUWritePC / ALUExceptionReturn / v8M stack-limit variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StoreRegKind {
    /// Comparison ops: result discarded.
    None,
    Normal,
    SpCheck,
    ExcRet,
}

/// Three-operand generator: dest = op(a, b).
pub(super) type DpGen =
    fn(&mut A32DisasContext<'_>, &mut Context, TempIdx, TempIdx, TempIdx);

/// Two-operand generator: dest = op(b).
pub(super) type Dp2Gen =
    fn(&mut A32DisasContext<'_>, &mut Context, TempIdx, TempIdx);

pub(super) fn dp_and(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_and(Type::I32, d, a, b);
}

pub(super) fn dp_eor(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_xor(Type::I32, d, a, b);
}

pub(super) fn dp_orr(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_or(Type::I32, d, a, b);
}

pub(super) fn dp_orn(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_orc(Type::I32, d, a, b);
}

pub(super) fn dp_bic(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_andc(Type::I32, d, a, b);
}

pub(super) fn dp_add(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_add(Type::I32, d, a, b);
}

pub(super) fn dp_sub(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_sub(Type::I32, d, a, b);
}

pub(super) fn dp_rsb(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    ir.gen_sub(Type::I32, d, b, a);
}

pub(super) fn dp_adc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_add_carry(ir, d, a, b);
}

pub(super) fn dp_sbc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sub_carry(ir, d, a, b);
}

pub(super) fn dp_rsc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sub_carry(ir, d, b, a);
}

pub(super) fn dp_add_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_add_cc(ir, d, a, b);
}

pub(super) fn dp_sub_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sub_cc(ir, d, a, b);
}

pub(super) fn dp_rsb_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sub_cc(ir, d, b, a);
}

pub(super) fn dp_adc_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_adc_cc(ir, d, a, b);
}

pub(super) fn dp_sbc_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sbc_cc(ir, d, a, b);
}

pub(super) fn dp_rsc_cc(
    s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    s.gen_sbc_cc(ir, d, b, a);
}

pub(super) fn dp_mov(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    b: TempIdx,
) {
    ir.gen_mov(Type::I32, d, b);
}

pub(super) fn dp_mvn(
    _s: &mut A32DisasContext<'_>,
    ir: &mut Context,
    d: TempIdx,
    b: TempIdx,
) {
    ir.gen_not(Type::I32, d, b);
}

impl<'a> A32DisasContext<'a> {
    pub(super) fn store_reg_kind(
        &mut self,
        ir: &mut Context,
        rd: i64,
        val: TempIdx,
        kind: StoreRegKind,
    ) -> Outcome {
        match kind {
            StoreRegKind::None => {}
            StoreRegKind::Normal => {
                // ALUWritePC: interworking only from ARM state.
                if self.flags.thumb {
                    self.store_reg(ir, rd as usize, val);
                } else {
                    self.store_reg_bx(ir, rd as usize, val);
                }
            }
            StoreRegKind::SpCheck => self.store_sp_checked(ir, val),
            StoreRegKind::ExcRet => self.gen_exception_return(ir, val),
        }
        Outcome::Handled
    }

    /// ALUExceptionReturn: restore CPSR from SPSR and branch to the
    /// written value.
    pub(super) fn gen_exception_return(
        &mut self,
        ir: &mut Context,
        pc: TempIdx,
    ) {
        self.store_reg(ir, 15, pc);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::CpsrWriteEret.id(), &[]);
        self.base.is_jmp = DisasJumpType::Exit;
    }

    // ------------------------------------------------------------
    // Data processing
    // ------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rrr_shi(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        rm: i64,
        shim: i64,
        shty: i64,
        gen: DpGen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let tmp2 = self.load_reg(ir, rm as usize);
        self.gen_arm_shift_im(ir, tmp2, shty as u32, shim as u32, logic_cc);
        let tmp1 = self.load_reg(ir, rn as usize);
        gen(self, ir, tmp1, tmp1, tmp2);
        if logic_cc {
            self.gen_logic_cc(ir, tmp1);
        }
        self.store_reg_kind(ir, rd, tmp1, kind)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rxr_shi(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
        shim: i64,
        shty: i64,
        gen: Dp2Gen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let tmp = self.load_reg(ir, rm as usize);
        self.gen_arm_shift_im(ir, tmp, shty as u32, shim as u32, logic_cc);
        gen(self, ir, tmp, tmp);
        if logic_cc {
            self.gen_logic_cc(ir, tmp);
        }
        self.store_reg_kind(ir, rd, tmp, kind)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rrr_shr(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        rm: i64,
        rs: i64,
        shty: i64,
        gen: DpGen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let tmp1 = self.load_reg(ir, rs as usize);
        let tmp2 = self.load_reg(ir, rm as usize);
        self.gen_arm_shift_reg(ir, tmp2, shty as u32, tmp1, logic_cc);
        let tmp1 = self.load_reg(ir, rn as usize);
        gen(self, ir, tmp1, tmp1, tmp2);
        if logic_cc {
            self.gen_logic_cc(ir, tmp1);
        }
        self.store_reg_kind(ir, rd, tmp1, kind)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rxr_shr(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
        rs: i64,
        shty: i64,
        gen: Dp2Gen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let tmp1 = self.load_reg(ir, rs as usize);
        let tmp2 = self.load_reg(ir, rm as usize);
        self.gen_arm_shift_reg(ir, tmp2, shty as u32, tmp1, logic_cc);
        gen(self, ir, tmp2, tmp2);
        if logic_cc {
            self.gen_logic_cc(ir, tmp2);
        }
        self.store_reg_kind(ir, rd, tmp2, kind)
    }

    /// Note that `imm` arrives unrotated: for logical flag-setting
    /// ops with a non-zero rotation the carry comes from the MSB of
    /// the rotated immediate.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rri_rot(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        imm: i64,
        rot: i64,
        gen: DpGen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let imm = (imm as u32).rotate_right(rot as u32);
        if logic_cc && rot != 0 {
            let c = ir.new_const(Type::I32, (imm >> 31) as u64);
            ir.gen_mov(Type::I32, self.cf, c);
        }
        let tmp1 = self.load_reg(ir, rn as usize);
        let c = ir.new_const(Type::I32, imm as u64);
        gen(self, ir, tmp1, tmp1, c);
        if logic_cc {
            self.gen_logic_cc(ir, tmp1);
        }
        self.store_reg_kind(ir, rd, tmp1, kind)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_s_rxi_rot(
        &mut self,
        ir: &mut Context,
        rd: i64,
        imm: i64,
        rot: i64,
        gen: Dp2Gen,
        logic_cc: bool,
        kind: StoreRegKind,
    ) -> Outcome {
        let imm = (imm as u32).rotate_right(rot as u32);
        if logic_cc && rot != 0 {
            let c = ir.new_const(Type::I32, (imm >> 31) as u64);
            ir.gen_mov(Type::I32, self.cf, c);
        }
        let tmp = ir.new_temp(Type::I32);
        let c = ir.new_const(Type::I32, imm as u64);
        gen(self, ir, tmp, c);
        if logic_cc {
            self.gen_logic_cc(ir, tmp);
        }
        self.store_reg_kind(ir, rd, tmp, kind)
    }

    /// Write policy for ADD/SUB-class destinations: SP adjustments
    /// via SP get the stack check, SUBS PC, LR is the exception
    /// return.
    pub(super) fn addsub_kind(
        &mut self,
        rd: i64,
        rn: i64,
        s: bool,
    ) -> Result<StoreRegKind, Fault> {
        if rd == 15 && s {
            // ALUExceptionReturn: UNPREDICTABLE in User mode and
            // UNDEFINED in Hyp; we UNDEF both.
            if self.is_user() || self.flags.current_el == 2 {
                return Err(Fault::UnpredictableUndef);
            }
            return Ok(StoreRegKind::ExcRet);
        }
        if rd == 13 && rn == 13 {
            return Ok(StoreRegKind::SpCheck);
        }
        Ok(StoreRegKind::Normal)
    }

    // ------------------------------------------------------------
    // Multiply
    // ------------------------------------------------------------

    pub(super) fn op_mla(
        &mut self,
        ir: &mut Context,
        s: bool,
        rd: i64,
        ra: Option<i64>,
        rm: i64,
        rn: i64,
        subtract: bool,
    ) -> Outcome {
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_reg(ir, rm as usize);
        ir.gen_mul(Type::I32, t1, t1, t2);
        if let Some(ra) = ra {
            let acc = self.load_reg(ir, ra as usize);
            if subtract {
                ir.gen_sub(Type::I32, t1, acc, t1);
            } else {
                ir.gen_add(Type::I32, t1, t1, acc);
            }
        }
        if s {
            self.gen_logic_cc(ir, t1);
        }
        self.store_reg(ir, rd as usize, t1);
        Outcome::Handled
    }

    /// N and Z from a 64-bit result held in two temps.
    fn gen_logicq_cc(&mut self, ir: &mut Context, lo: TempIdx, hi: TempIdx) {
        ir.gen_mov(Type::I32, self.nf, hi);
        ir.gen_or(Type::I32, self.zf, lo, hi);
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_mull(
        &mut self,
        ir: &mut Context,
        s: bool,
        rdlo: i64,
        rdhi: i64,
        rm: i64,
        rn: i64,
        signed: bool,
        accumulate: bool,
    ) -> Outcome {
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_reg(ir, rm as usize);
        let lo = ir.new_temp(Type::I32);
        let hi = ir.new_temp(Type::I32);
        if signed {
            ir.gen_muls2(Type::I32, lo, hi, t1, t2);
        } else {
            ir.gen_mulu2(Type::I32, lo, hi, t1, t2);
        }
        if accumulate {
            let alo = self.load_reg(ir, rdlo as usize);
            let ahi = self.load_reg(ir, rdhi as usize);
            ir.gen_add2(Type::I32, lo, hi, lo, hi, alo, ahi);
        }
        if s {
            self.gen_logicq_cc(ir, lo, hi);
        }
        self.store_reg(ir, rdlo as usize, lo);
        self.store_reg(ir, rdhi as usize, hi);
        Outcome::Handled
    }

    // ------------------------------------------------------------
    // Saturating arithmetic
    // ------------------------------------------------------------

    pub(super) fn op_qaddsub(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
        rn: i64,
        doubling: bool,
        add: bool,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let t0 = self.load_reg(ir, rm as usize);
        let mut t1 = self.load_reg(ir, rn as usize);
        if doubling {
            let d = ir.new_temp(Type::I32);
            ir.gen_call(d, Helper::DoubleSaturate.id(), &[t1]);
            t1 = d;
        }
        let h = if add {
            Helper::AddSaturate
        } else {
            Helper::SubSaturate
        };
        ir.gen_call(t0, h.id(), &[t0, t1]);
        self.store_reg(ir, rd as usize, t0);
        Outcome::Handled
    }

    // ------------------------------------------------------------
    // Addressing modes
    // ------------------------------------------------------------

    /// Base + signed immediate offset, applied before the access
    /// for pre-indexed forms.
    pub(super) fn op_addr_ri_pre(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        rn: i64,
        imm: i64,
    ) -> TempIdx {
        let ofs = if u != 0 { imm as i32 } else { -(imm as i32) };
        self.add_reg_for_lit(ir, rn as usize, if p != 0 { ofs } else { 0 })
    }

    /// Post-increment and writeback. Post-indexed forms always
    /// write back; `p && w` is the pre-indexed writeback form.
    pub(super) fn op_addr_ri_post(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        rn: i64,
        imm: i64,
        addr: TempIdx,
    ) {
        if p == 0 {
            let ofs = if u != 0 { imm as i32 } else { -(imm as i32) };
            let c = ir.new_const(Type::I32, ofs as u32 as u64);
            ir.gen_add(Type::I32, addr, addr, c);
        }
        if self.flags.v8m_stackcheck && rn == 13 {
            let dead = ir.new_temp(Type::I32);
            ir.gen_call(dead, Helper::V8mStackcheck.id(), &[addr]);
        }
        self.store_reg(ir, rn as usize, addr);
    }

    /// Base + (possibly shifted) register offset.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_addr_rr_pre(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        rn: i64,
        rm: i64,
        shim: i64,
        shty: i64,
    ) -> TempIdx {
        let addr = self.load_reg(ir, rn as usize);
        let ofs = self.load_reg(ir, rm as usize);
        self.gen_arm_shift_im(ir, ofs, shty as u32, shim as u32, false);
        if p != 0 {
            if u != 0 {
                ir.gen_add(Type::I32, addr, addr, ofs);
            } else {
                ir.gen_sub(Type::I32, addr, addr, ofs);
            }
        }
        addr
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_addr_rr_post(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        rn: i64,
        rm: i64,
        addr: TempIdx,
    ) {
        if p == 0 {
            let ofs = self.load_reg(ir, rm as usize);
            if u != 0 {
                ir.gen_add(Type::I32, addr, addr, ofs);
            } else {
                ir.gen_sub(Type::I32, addr, addr, ofs);
            }
        }
        self.store_reg(ir, rn as usize, addr);
    }

    // ------------------------------------------------------------
    // Single loads/stores
    // ------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_load_ri(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        imm: i64,
        mop: MemOp,
    ) -> Outcome {
        if p == 0 && w != 0 {
            // Unprivileged (LDRT-class) forms: not modelled.
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_ri_pre(ir, p, u, rn, imm);
        let val = ir.new_temp(Type::I32);
        self.gen_aa32_ld_i32(ir, val, addr, mop);
        if p == 0 || w != 0 {
            self.op_addr_ri_post(ir, p, u, rn, imm, addr);
        }
        // LoadWritePC for destination r15.
        self.store_reg_from_load(ir, rt as usize, val);
        Outcome::Handled
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_store_ri(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        imm: i64,
        mop: MemOp,
    ) -> Outcome {
        if p == 0 && w != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_ri_pre(ir, p, u, rn, imm);
        let val = self.load_reg(ir, rt as usize);
        self.gen_aa32_st_i32(ir, val, addr, mop);
        if p == 0 || w != 0 {
            self.op_addr_ri_post(ir, p, u, rn, imm, addr);
        }
        Outcome::Handled
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_load_rr(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        rm: i64,
        shim: i64,
        shty: i64,
        mop: MemOp,
    ) -> Outcome {
        if p == 0 && w != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_rr_pre(ir, p, u, rn, rm, shim, shty);
        let val = ir.new_temp(Type::I32);
        self.gen_aa32_ld_i32(ir, val, addr, mop);
        if p == 0 || w != 0 {
            self.op_addr_rr_post(ir, p, u, rn, rm, addr);
        }
        self.store_reg_from_load(ir, rt as usize, val);
        Outcome::Handled
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_store_rr(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        rm: i64,
        shim: i64,
        shty: i64,
        mop: MemOp,
    ) -> Outcome {
        if p == 0 && w != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_rr_pre(ir, p, u, rn, rm, shim, shty);
        let val = self.load_reg(ir, rt as usize);
        self.gen_aa32_st_i32(ir, val, addr, mop);
        if p == 0 || w != 0 {
            self.op_addr_rr_post(ir, p, u, rn, rm, addr);
        }
        Outcome::Handled
    }

    /// Doubleword load: one 64-bit access, split across rt/rt2.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_ldrd(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        rt2: i64,
        imm: i64,
    ) -> Outcome {
        if rt == 15 || rt2 == 15 || rt == rt2 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_ri_pre(ir, p, u, rn, imm);
        let val = ir.new_temp(Type::I64);
        self.gen_aa32_ld_i64(ir, val, addr, MemOp::uq().aligned());
        let lo = ir.new_temp(Type::I32);
        let hi = ir.new_temp(Type::I32);
        ir.gen_extrl_i64_i32(lo, val);
        ir.gen_extrh_i64_i32(hi, val);
        if p == 0 || w != 0 {
            self.op_addr_ri_post(ir, p, u, rn, imm, addr);
        }
        self.store_reg(ir, rt as usize, lo);
        self.store_reg(ir, rt2 as usize, hi);
        Outcome::Handled
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_strd(
        &mut self,
        ir: &mut Context,
        p: i64,
        u: i64,
        w: i64,
        rn: i64,
        rt: i64,
        rt2: i64,
        imm: i64,
    ) -> Outcome {
        if rt == 15 || rt2 == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_ri_pre(ir, p, u, rn, imm);
        let lo = self.load_reg(ir, rt as usize);
        let hi = self.load_reg(ir, rt2 as usize);
        let val = ir.new_temp(Type::I64);
        ir.gen_concat_i32_i64(val, lo, hi);
        self.gen_aa32_st_i64(ir, val, addr, MemOp::uq().aligned());
        if p == 0 || w != 0 {
            self.op_addr_ri_post(ir, p, u, rn, imm, addr);
        }
        Outcome::Handled
    }

    // ------------------------------------------------------------
    // Exclusives
    // ------------------------------------------------------------

    pub(super) fn op_ldrex(
        &mut self,
        ir: &mut Context,
        rn: i64,
        rt: i64,
        imm: i64,
    ) -> Outcome {
        if rn == 15 || rt == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_ri_pre(ir, 1, 1, rn, imm);
        ir.gen_mov(Type::I32, self.exclusive_addr, addr);
        let val = ir.new_temp(Type::I32);
        self.gen_aa32_ld_i32(ir, val, addr, MemOp::ul().aligned());
        ir.gen_mov(Type::I32, self.exclusive_val, val);
        self.store_reg(ir, rt as usize, val);
        self.is_ldex = true;
        Outcome::Handled
    }

    /// Store-exclusive: succeeds (writing 0 to rd) only when the
    /// monitor still covers the address and the memory still holds
    /// the loaded value; the reservation is consumed either way.
    pub(super) fn op_strex(
        &mut self,
        ir: &mut Context,
        rn: i64,
        rd: i64,
        rt: i64,
        imm: i64,
    ) -> Outcome {
        if rn == 15 || rd == 15 || rt == 15 || rd == rn || rd == rt {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let fail = ir.new_label();
        let done = ir.new_label();
        let addr = self.op_addr_ri_pre(ir, 1, 1, rn, imm);
        ir.gen_brcond(Type::I32, addr, self.exclusive_addr, Cond::Ne, fail);
        let cur = ir.new_temp(Type::I32);
        self.gen_aa32_ld_i32(ir, cur, addr, MemOp::ul().aligned());
        ir.gen_brcond(Type::I32, cur, self.exclusive_val, Cond::Ne, fail);
        let val = self.load_reg(ir, rt as usize);
        self.gen_aa32_st_i32(ir, val, addr, MemOp::ul().aligned());
        let zero = ir.new_const(Type::I32, 0);
        ir.gen_mov(Type::I32, self.regs[rd as usize], zero);
        ir.gen_br(done);
        ir.gen_set_label(fail);
        let one = ir.new_const(Type::I32, 1);
        ir.gen_mov(Type::I32, self.regs[rd as usize], one);
        ir.gen_set_label(done);
        let minus1 = ir.new_const(Type::I32, u32::MAX as u64);
        ir.gen_mov(Type::I32, self.exclusive_addr, minus1);
        Outcome::Handled
    }

    // ------------------------------------------------------------
    // Load/store multiple
    // ------------------------------------------------------------

    /// Start address for a block transfer: `b` = before, `i` =
    /// increment.
    fn op_addr_block(
        &mut self,
        ir: &mut Context,
        rn: i64,
        b: i64,
        i: i64,
        n: u32,
    ) -> TempIdx {
        let ofs: i32 = match (i != 0, b != 0) {
            (true, false) => 0,             // IA
            (true, true) => 4,              // IB
            (false, false) => 4 - 4 * n as i32, // DA
            (false, true) => -4 * (n as i32),   // DB
        };
        self.add_reg_for_lit(ir, rn as usize, ofs)
    }

    fn op_block_writeback(
        &mut self,
        ir: &mut Context,
        rn: i64,
        i: i64,
        n: u32,
    ) {
        let ofs: i32 = if i != 0 { 4 * n as i32 } else { -4 * (n as i32) };
        let base = self.load_reg(ir, rn as usize);
        let c = ir.new_const(Type::I32, ofs as u32 as u64);
        ir.gen_add(Type::I32, base, base, c);
        if self.flags.v8m_stackcheck && rn == 13 {
            let dead = ir.new_temp(Type::I32);
            ir.gen_call(dead, Helper::V8mStackcheck.id(), &[base]);
        }
        self.store_reg(ir, rn as usize, base);
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_stm(
        &mut self,
        ir: &mut Context,
        rn: i64,
        list: i64,
        b: i64,
        i: i64,
        u: i64,
        w: i64,
    ) -> Outcome {
        if u != 0 {
            // User-bank transfer: system-level form, not modelled.
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let list = list as u32 & 0xffff;
        let n = list.count_ones();
        if n == 0 || rn == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        // Store/load multiple restart rather than resume.
        self.clear_eci_state(ir);

        let addr = self.op_addr_block(ir, rn, b, i, n);
        let four = ir.new_const(Type::I32, 4);
        let mut first = true;
        for reg in 0..16 {
            if list & (1 << reg) == 0 {
                continue;
            }
            if !first {
                ir.gen_add(Type::I32, addr, addr, four);
            }
            first = false;
            let val = self.load_reg(ir, reg);
            self.gen_aa32_st_i32(ir, val, addr, MemOp::ul().aligned());
        }
        if w != 0 {
            self.op_block_writeback(ir, rn, i, n);
        }
        Outcome::Handled
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn op_ldm(
        &mut self,
        ir: &mut Context,
        rn: i64,
        list: i64,
        b: i64,
        i: i64,
        u: i64,
        w: i64,
    ) -> Outcome {
        if u != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let list = list as u32 & 0xffff;
        let n = list.count_ones();
        if n == 0 || rn == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        self.clear_eci_state(ir);

        let addr = self.op_addr_block(ir, rn, b, i, n);
        let four = ir.new_const(Type::I32, 4);
        let mut first = true;
        let mut pc_val: Option<TempIdx> = None;
        for reg in 0..16 {
            if list & (1 << reg) == 0 {
                continue;
            }
            if !first {
                ir.gen_add(Type::I32, addr, addr, four);
            }
            first = false;
            let val = ir.new_temp(Type::I32);
            self.gen_aa32_ld_i32(ir, val, addr, MemOp::ul().aligned());
            if reg == 15 {
                // Defer the PC write until after the writeback so
                // the jump is the last architectural effect.
                pc_val = Some(val);
            } else {
                self.store_reg(ir, reg, val);
            }
        }
        if w != 0 && list & (1 << rn) == 0 {
            // Base in the list: the loaded value wins and the
            // writeback is dropped.
            self.op_block_writeback(ir, rn, i, n);
        }
        if let Some(val) = pc_val {
            self.store_reg_from_load(ir, 15, val);
        }
        Outcome::Handled
    }
}
