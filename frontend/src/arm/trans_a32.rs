//! A32 semantic handlers.

use a32t_core::{Context, MemOp, TempIdx, Type};

use super::cpu::{self, ArmFeatures};
use super::helper::Helper;
use super::insn_decode::a32::{self, *};
use super::insn_decode::a32_uncond;
use super::ops::{
    dp_adc, dp_adc_cc, dp_add, dp_add_cc, dp_and, dp_bic, dp_eor, dp_mov,
    dp_mvn, dp_orr, dp_rsb, dp_rsb_cc, dp_rsc, dp_rsc_cc, dp_sbc, dp_sbc_cc,
    dp_sub, dp_sub_cc, StoreRegKind,
};
use super::A32DisasContext;
use crate::{DisasJumpType, Fault, Outcome};

/// Application-level CPSR bits writable by MSR: NZCVQ, GE.
const CPSR_USER_MASK: u32 = 0xf80f_0000;

fn msr_mask(mask: i64, user: bool) -> u32 {
    let mut m = 0u32;
    for i in 0..4 {
        if mask & (1 << i) != 0 {
            m |= 0xff << (8 * i);
        }
    }
    if user {
        m &= CPSR_USER_MASK;
    }
    m
}

impl<'a> A32DisasContext<'a> {
    /// rd = rotate-then-extend(rm) [+ rn]; the SXTA*/UXTA* family.
    pub(super) fn op_xta(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        rm: i64,
        rot: i64,
        len: u32,
        signed: bool,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, rm as usize);
        if rot != 0 {
            let c = ir.new_const(Type::I32, (rot as u64) * 8);
            ir.gen_rotr(Type::I32, tmp, tmp, c);
        }
        if signed {
            ir.gen_sextract(Type::I32, tmp, tmp, 0, len);
        } else {
            ir.gen_extract(Type::I32, tmp, tmp, 0, len);
        }
        if rn != 15 {
            let base = self.load_reg(ir, rn as usize);
            ir.gen_add(Type::I32, tmp, base, tmp);
        }
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    /// REV16: byte-swap each halfword.
    pub(super) fn op_rev16(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
    ) -> Outcome {
        let var = self.load_reg(ir, rm as usize);
        let tmp = ir.new_temp(Type::I32);
        let mask = ir.new_const(Type::I32, 0x00ff_00ff);
        let eight = ir.new_const(Type::I32, 8);
        ir.gen_shr(Type::I32, tmp, var, eight);
        ir.gen_and(Type::I32, tmp, tmp, mask);
        ir.gen_and(Type::I32, var, var, mask);
        ir.gen_shl(Type::I32, var, var, eight);
        ir.gen_or(Type::I32, var, var, tmp);
        self.store_reg(ir, rd as usize, var);
        Outcome::Handled
    }

    /// REVSH: byte-swap the low halfword, sign-extend.
    pub(super) fn op_revsh(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
    ) -> Outcome {
        let var = self.load_reg(ir, rm as usize);
        ir.gen_bswap16(Type::I32, var, var, a32t_core::types::bswap::OS);
        self.store_reg(ir, rd as usize, var);
        Outcome::Handled
    }

    pub(super) fn op_rev(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
    ) -> Outcome {
        let var = self.load_reg(ir, rm as usize);
        ir.gen_bswap32(Type::I32, var, var, 0);
        self.store_reg(ir, rd as usize, var);
        Outcome::Handled
    }

    pub(super) fn op_rbit(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
    ) -> Outcome {
        let var = self.load_reg(ir, rm as usize);
        ir.gen_call(var, Helper::Rbit.id(), &[var]);
        self.store_reg(ir, rd as usize, var);
        Outcome::Handled
    }

    pub(super) fn op_clz(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rm: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, rm as usize);
        let c32 = ir.new_const(Type::I32, 32);
        ir.gen_clz(Type::I32, tmp, tmp, c32);
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    pub(super) fn op_sel(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        rm: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        let ge = self.load_cpu_field(ir, cpu::GE_OFFSET);
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_reg(ir, rm as usize);
        ir.gen_call(t1, Helper::SelFlags.id(), &[ge, t1, t2]);
        self.store_reg(ir, rd as usize, t1);
        Outcome::Handled
    }

    pub(super) fn op_usada8(
        &mut self,
        ir: &mut Context,
        rd: i64,
        ra: i64,
        rm: i64,
        rn: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_reg(ir, rm as usize);
        ir.gen_call(t1, Helper::Usad8.id(), &[t1, t2]);
        if ra != 15 {
            let acc = self.load_reg(ir, ra as usize);
            ir.gen_add(Type::I32, t1, t1, acc);
        }
        self.store_reg(ir, rd as usize, t1);
        Outcome::Handled
    }

    pub(super) fn op_sat(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        shift: i64,
        sh: i64,
        width: u32,
        signed: bool,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, rn as usize);
        let shty = if sh != 0 { 2 } else { 0 };
        self.gen_arm_shift_im(ir, tmp, shty, shift as u32, false);
        let w = ir.new_const(Type::I32, width as u64);
        let h = if signed { Helper::Ssat } else { Helper::Usat };
        ir.gen_call(tmp, h.id(), &[tmp, w]);
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    pub(super) fn op_bfci(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        lsb: i64,
        msb: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        if msb < lsb || rd == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let width = (msb - lsb + 1) as u32;
        let dst = self.load_reg(ir, rd as usize);
        if rn == 15 {
            // BFC
            let zero = ir.new_const(Type::I32, 0);
            ir.gen_deposit(Type::I32, dst, dst, zero, lsb as u32, width);
        } else {
            let src = self.load_reg(ir, rn as usize);
            ir.gen_deposit(Type::I32, dst, dst, src, lsb as u32, width);
        }
        self.store_reg(ir, rd as usize, dst);
        Outcome::Handled
    }

    pub(super) fn op_bfx(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        lsb: i64,
        widthm1: i64,
        signed: bool,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        let width = (widthm1 + 1) as u32;
        if lsb as u32 + width > 32 || rd == 15 || rn == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let tmp = self.load_reg(ir, rn as usize);
        if signed {
            ir.gen_sextract(Type::I32, tmp, tmp, lsb as u32, width);
        } else {
            ir.gen_extract(Type::I32, tmp, tmp, lsb as u32, width);
        }
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    pub(super) fn op_div(
        &mut self,
        ir: &mut Context,
        rd: i64,
        rn: i64,
        rm: i64,
        signed: bool,
    ) -> Outcome {
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_reg(ir, rm as usize);
        let h = if signed { Helper::Sdiv } else { Helper::Udiv };
        ir.gen_call(t1, h.id(), &[t1, t2]);
        self.store_reg(ir, rd as usize, t1);
        Outcome::Handled
    }

    /// 16x16 signed multiply operand: top or bottom half of `reg`.
    fn load_smul_half(
        &mut self,
        ir: &mut Context,
        reg: i64,
        top: bool,
    ) -> TempIdx {
        let t = self.load_reg(ir, reg as usize);
        if top {
            ir.gen_sextract(Type::I32, t, t, 16, 16);
        } else {
            ir.gen_sextract(Type::I32, t, t, 0, 16);
        }
        t
    }

    pub(super) fn op_smulxy(
        &mut self,
        ir: &mut Context,
        rd: i64,
        ra: Option<i64>,
        rm: i64,
        rn: i64,
        x: i64,
        y: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let t1 = self.load_smul_half(ir, rn, x != 0);
        let t2 = self.load_smul_half(ir, rm, y != 0);
        ir.gen_mul(Type::I32, t1, t1, t2);
        if let Some(ra) = ra {
            // SMLA<x><y> accumulates with the sticky Q flag on
            // overflow, without saturating the result.
            let acc = self.load_reg(ir, ra as usize);
            ir.gen_call(t1, Helper::AddSetq.id(), &[t1, acc]);
        }
        self.store_reg(ir, rd as usize, t1);
        Outcome::Handled
    }

    pub(super) fn op_smulwy(
        &mut self,
        ir: &mut Context,
        rd: i64,
        ra: Option<i64>,
        rm: i64,
        rn: i64,
        y: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        // (rn * rm[y]) >> 16, computed at double width.
        let t1 = self.load_reg(ir, rn as usize);
        let t2 = self.load_smul_half(ir, rm, y != 0);
        let w1 = ir.new_temp(Type::I64);
        let w2 = ir.new_temp(Type::I64);
        ir.gen_ext_i32_i64(w1, t1);
        ir.gen_ext_i32_i64(w2, t2);
        ir.gen_mul(Type::I64, w1, w1, w2);
        let c16 = ir.new_const(Type::I64, 16);
        ir.gen_sar(Type::I64, w1, w1, c16);
        let res = ir.new_temp(Type::I32);
        ir.gen_extrl_i64_i32(res, w1);
        let res = if let Some(ra) = ra {
            let acc = self.load_reg(ir, ra as usize);
            ir.gen_call(res, Helper::AddSetq.id(), &[res, acc]);
            res
        } else {
            res
        };
        self.store_reg(ir, rd as usize, res);
        Outcome::Handled
    }

    pub(super) fn op_movt(
        &mut self,
        ir: &mut Context,
        rd: i64,
        imm: i64,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, rd as usize);
        let c = ir.new_const(Type::I32, imm as u64 & 0xffff);
        ir.gen_deposit(Type::I32, tmp, tmp, c, 16, 16);
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    pub(super) fn op_bkpt(&mut self, ir: &mut Context, imm: i64) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        // BKPT executes regardless of IT state and leaves ECI
        // untouched.
        self.eci_handled = true;
        self.gen_set_condexec(ir);
        self.gen_update_pc(ir, 0);
        let is_16bit = self.flags.thumb && self.curr_insn_len() == 2;
        let syn = ir.new_const(
            Type::I32,
            cpu::syn::aa32_bkpt(imm as u32, is_16bit) as u64,
        );
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::ExceptionBkpt.id(), &[syn]);
        self.base.is_jmp = DisasJumpType::NoReturn;
        Outcome::Handled
    }

    pub(super) fn op_svc(&mut self, ir: &mut Context, imm: i64) -> Outcome {
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.svc_imm = imm as u32 & 0xffff;
        self.base.is_jmp = DisasJumpType::Swi;
        Outcome::Handled
    }

    pub(super) fn op_yield(&mut self, ir: &mut Context) -> Outcome {
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.base.is_jmp = DisasJumpType::Yield;
        Outcome::Handled
    }

    pub(super) fn op_wfe(&mut self, ir: &mut Context) -> Outcome {
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.base.is_jmp = DisasJumpType::Wfe;
        Outcome::Handled
    }

    pub(super) fn op_wfi(&mut self, ir: &mut Context) -> Outcome {
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.base.is_jmp = DisasJumpType::Wfi;
        Outcome::Handled
    }

    pub(super) fn op_mrs(
        &mut self,
        ir: &mut Context,
        r: i64,
        rd: i64,
    ) -> Outcome {
        if r != 0 {
            // SPSR forms need the banked-register model.
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let tmp = ir.new_temp(Type::I32);
        ir.gen_call(tmp, Helper::CpsrRead.id(), &[]);
        self.store_reg(ir, rd as usize, tmp);
        Outcome::Handled
    }

    pub(super) fn op_msr_reg(
        &mut self,
        ir: &mut Context,
        r: i64,
        mask: i64,
        rm: i64,
    ) -> Outcome {
        if r != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let m = msr_mask(mask, self.is_user());
        let val = self.load_reg(ir, rm as usize);
        let mc = ir.new_const(Type::I32, m as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::CpsrWrite.id(), &[val, mc]);
        // CPSR writes can change modes and enables: stop chaining.
        self.base.is_jmp = DisasJumpType::UpdateExit;
        Outcome::Handled
    }

    pub(super) fn op_msr_imm(
        &mut self,
        ir: &mut Context,
        r: i64,
        mask: i64,
        imm: i64,
        rot: i64,
    ) -> Outcome {
        if r != 0 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let m = msr_mask(mask, self.is_user());
        let val = (imm as u32).rotate_right(rot as u32);
        let vc = ir.new_const(Type::I32, val as u64);
        let mc = ir.new_const(Type::I32, m as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::CpsrWrite.id(), &[vc, mc]);
        self.base.is_jmp = DisasJumpType::UpdateExit;
        Outcome::Handled
    }
}

#[allow(non_snake_case)]
impl<'a> a32::Decode<Context> for A32DisasContext<'a> {
    // ---- Miscellaneous ----

    fn trans_BX(&mut self, ir: &mut Context, a: &ArgsR) -> Outcome {
        if !self.feature(ArmFeatures::V4T) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, a.rm as usize);
        self.gen_bx_excret(ir, tmp);
        Outcome::Handled
    }

    fn trans_BXJ(&mut self, ir: &mut Context, a: &ArgsR) -> Outcome {
        if !self.feature(ArmFeatures::V5) || self.feature(ArmFeatures::M) {
            return Outcome::Declined;
        }
        // Jazelle never entered; equivalent to BX.
        let tmp = self.load_reg(ir, a.rm as usize);
        self.gen_bx(ir, tmp);
        Outcome::Handled
    }

    fn trans_BLX_r(&mut self, ir: &mut Context, a: &ArgsR) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, a.rm as usize);
        let ret = self.curr_insn_len() | self.flags.thumb as u32;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        self.gen_bx(ir, tmp);
        Outcome::Handled
    }

    fn trans_CLZ(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_clz(ir, a.rd, a.rm)
    }

    fn trans_MRS(&mut self, ir: &mut Context, a: &ArgsMrs) -> Outcome {
        self.op_mrs(ir, a.r, a.rd)
    }

    fn trans_MSR_reg(&mut self, ir: &mut Context, a: &ArgsMsrReg) -> Outcome {
        self.op_msr_reg(ir, a.r, a.mask, a.rm)
    }

    fn trans_MSR_imm(&mut self, ir: &mut Context, a: &ArgsMsrImm) -> Outcome {
        self.op_msr_imm(ir, a.r, a.mask, a.imm, a.rot)
    }

    fn trans_BKPT(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        self.op_bkpt(ir, a.imm)
    }

    fn trans_HVC(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        if !self.feature(ArmFeatures::V7)
            || !self.feature(ArmFeatures::EL2)
            || self.feature(ArmFeatures::M)
        {
            return Outcome::Declined;
        }
        if self.is_user() {
            return Outcome::Faulted(Fault::Undefined);
        }
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.svc_imm = a.imm as u32 & 0xffff;
        self.base.is_jmp = DisasJumpType::Hvc;
        Outcome::Handled
    }

    fn trans_SMC(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        if !self.feature(ArmFeatures::V6K)
            || !self.feature(ArmFeatures::EL3)
            || self.feature(ArmFeatures::M)
        {
            return Outcome::Declined;
        }
        let _ = a.imm;
        if self.is_user() {
            return Outcome::Faulted(Fault::Undefined);
        }
        self.gen_update_pc(ir, self.curr_insn_len() as i32);
        self.base.is_jmp = DisasJumpType::Smc;
        Outcome::Handled
    }

    fn trans_QADD(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, false, true)
    }

    fn trans_QSUB(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, false, false)
    }

    fn trans_QDADD(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, true, true)
    }

    fn trans_QDSUB(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, true, false)
    }

    fn trans_SMLAxy(&mut self, ir: &mut Context, a: &ArgsSmlaxy) -> Outcome {
        self.op_smulxy(ir, a.rd, Some(a.ra), a.rm, a.rn, a.x, a.y)
    }

    fn trans_SMULxy(&mut self, ir: &mut Context, a: &ArgsSmulxy) -> Outcome {
        self.op_smulxy(ir, a.rd, None, a.rm, a.rn, a.x, a.y)
    }

    fn trans_SMLAWy(&mut self, ir: &mut Context, a: &ArgsSmlawy) -> Outcome {
        self.op_smulwy(ir, a.rd, Some(a.ra), a.rm, a.rn, a.y)
    }

    fn trans_SMULWy(&mut self, ir: &mut Context, a: &ArgsSmulwy) -> Outcome {
        self.op_smulwy(ir, a.rd, None, a.rm, a.rn, a.y)
    }

    // ---- Synchronisation ----

    fn trans_LDREX(&mut self, ir: &mut Context, a: &ArgsLdrex) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_ldrex(ir, a.rn, a.rt, 0)
    }

    fn trans_STREX(&mut self, ir: &mut Context, a: &ArgsStrex) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_strex(ir, a.rn, a.rd, a.rt, 0)
    }

    // ---- Multiply ----

    fn trans_MUL(&mut self, ir: &mut Context, a: &ArgsMul) -> Outcome {
        self.op_mla(ir, a.s != 0, a.rd, None, a.rm, a.rn, false)
    }

    fn trans_MLA(&mut self, ir: &mut Context, a: &ArgsMla) -> Outcome {
        self.op_mla(ir, a.s != 0, a.rd, Some(a.ra), a.rm, a.rn, false)
    }

    fn trans_MLS(&mut self, ir: &mut Context, a: &ArgsMls) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        self.op_mla(ir, false, a.rd, Some(a.ra), a.rm, a.rn, true)
    }

    fn trans_UMULL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, false, false)
    }

    fn trans_UMLAL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, false, true)
    }

    fn trans_SMULL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, true, false)
    }

    fn trans_SMLAL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, true, true)
    }

    // ---- Halfword / doubleword transfers ----

    fn trans_STRH_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::uw())
    }

    fn trans_LDRH_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::uw())
    }

    fn trans_LDRSB_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::sb())
    }

    fn trans_LDRSH_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::sw())
    }

    fn trans_LDRD_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        if !self.feature(ArmFeatures::V5) || a.rt & 1 != 0 {
            return Outcome::Declined;
        }
        self.op_ldrd(ir, a.p, a.u, a.w, a.rn, a.rt, a.rt + 1, a.imm)
    }

    fn trans_STRD_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        if !self.feature(ArmFeatures::V5) || a.rt & 1 != 0 {
            return Outcome::Declined;
        }
        self.op_strd(ir, a.p, a.u, a.w, a.rn, a.rt, a.rt + 1, a.imm)
    }

    fn trans_STRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::uw(),
        )
    }

    fn trans_LDRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::uw(),
        )
    }

    fn trans_LDRSB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::sb(),
        )
    }

    fn trans_LDRSH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::sw(),
        )
    }

    fn trans_LDRD_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        if !self.feature(ArmFeatures::V5) || a.rt & 1 != 0 {
            return Outcome::Declined;
        }
        if a.rt == 14 {
            // rt2 would be the PC.
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_rr_pre(ir, a.p, a.u, a.rn, a.rm, 0, 0);
        let val = ir.new_temp(Type::I64);
        self.gen_aa32_ld_i64(ir, val, addr, MemOp::uq().aligned());
        let lo = ir.new_temp(Type::I32);
        let hi = ir.new_temp(Type::I32);
        ir.gen_extrl_i64_i32(lo, val);
        ir.gen_extrh_i64_i32(hi, val);
        if a.p == 0 || a.w != 0 {
            self.op_addr_rr_post(ir, a.p, a.u, a.rn, a.rm, addr);
        }
        self.store_reg(ir, a.rt as usize, lo);
        self.store_reg(ir, a.rt as usize + 1, hi);
        Outcome::Handled
    }

    fn trans_STRD_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        if !self.feature(ArmFeatures::V5) || a.rt & 1 != 0 {
            return Outcome::Declined;
        }
        if a.rt == 14 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.op_addr_rr_pre(ir, a.p, a.u, a.rn, a.rm, 0, 0);
        let lo = self.load_reg(ir, a.rt as usize);
        let hi = self.load_reg(ir, a.rt as usize + 1);
        let val = ir.new_temp(Type::I64);
        ir.gen_concat_i32_i64(val, lo, hi);
        self.gen_aa32_st_i64(ir, val, addr, MemOp::uq().aligned());
        if a.p == 0 || a.w != 0 {
            self.op_addr_rr_post(ir, a.p, a.u, a.rn, a.rm, addr);
        }
        Outcome::Handled
    }

    // ---- Data processing (register, immediate shift) ----

    fn trans_AND_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_and,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_EOR_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_eor,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_SUB_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let s = a.s != 0;
        let kind = match self.addsub_kind(a.rd, a.rn, s) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        let s = s && kind != StoreRegKind::ExcRet;
        let gen = if s { dp_sub_cc } else { dp_sub };
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, gen, false, kind)
    }

    fn trans_RSB_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let gen = if a.s != 0 { dp_rsb_cc } else { dp_rsb };
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_ADD_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let s = a.s != 0;
        let kind = match self.addsub_kind(a.rd, a.rn, s) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        let s = s && kind != StoreRegKind::ExcRet;
        let gen = if s { dp_add_cc } else { dp_add };
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, gen, false, kind)
    }

    fn trans_ADC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let gen = if a.s != 0 { dp_adc_cc } else { dp_adc };
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_SBC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let gen = if a.s != 0 { dp_sbc_cc } else { dp_sbc };
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_RSC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let gen = if a.s != 0 { dp_rsc_cc } else { dp_rsc };
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_TST_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_and,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_TEQ_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_eor,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_CMP_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_sub_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_CMN_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_add_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_ORR_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_orr,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MOV_rxri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let s = a.s != 0;
        if a.rd == 15 && s {
            if self.is_user() || self.flags.current_el == 2 {
                return Outcome::Faulted(Fault::UnpredictableUndef);
            }
            return self.op_s_rxr_shi(
                ir,
                a.rd,
                a.rm,
                a.shim,
                a.shty,
                dp_mov,
                false,
                StoreRegKind::ExcRet,
            );
        }
        let kind = if a.rd == 13 {
            StoreRegKind::SpCheck
        } else {
            StoreRegKind::Normal
        };
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, a.shty, dp_mov, s, kind)
    }

    fn trans_BIC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.shim,
            a.shty,
            dp_bic,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MVN_rxri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rxr_shi(
            ir,
            a.rd,
            a.rm,
            a.shim,
            a.shty,
            dp_mvn,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    // ---- Data processing (register, register shift) ----

    fn trans_AND_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_and,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_EOR_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_eor,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_SUB_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_sub_cc } else { dp_sub };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_RSB_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_rsb_cc } else { dp_rsb };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_ADD_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_add_cc } else { dp_add };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_ADC_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_adc_cc } else { dp_adc };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_SBC_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_sbc_cc } else { dp_sbc };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_RSC_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        let gen = if a.s != 0 { dp_rsc_cc } else { dp_rsc };
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_TST_xrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_and,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_TEQ_xrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_eor,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_CMP_xrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_sub_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_CMN_xrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_add_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_ORR_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_orr,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MOV_rxrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rxr_shr(
            ir,
            a.rd,
            a.rm,
            a.rs,
            a.shty,
            dp_mov,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_BIC_rrrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rrr_shr(
            ir,
            a.rd,
            a.rn,
            a.rm,
            a.rs,
            a.shty,
            dp_bic,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MVN_rxrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rxr_shr(
            ir,
            a.rd,
            a.rm,
            a.rs,
            a.shty,
            dp_mvn,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    // ---- Data processing (immediate) ----

    fn trans_AND_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_and,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_EOR_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_eor,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_SUB_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let s = a.s != 0;
        let kind = match self.addsub_kind(a.rd, a.rn, s) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        let s = s && kind != StoreRegKind::ExcRet;
        let gen = if s { dp_sub_cc } else { dp_sub };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, gen, false, kind)
    }

    fn trans_RSB_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let gen = if a.s != 0 { dp_rsb_cc } else { dp_rsb };
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_ADD_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let s = a.s != 0;
        let kind = match self.addsub_kind(a.rd, a.rn, s) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        let s = s && kind != StoreRegKind::ExcRet;
        let gen = if s { dp_add_cc } else { dp_add };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, gen, false, kind)
    }

    fn trans_ADC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let gen = if a.s != 0 { dp_adc_cc } else { dp_adc };
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_SBC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let gen = if a.s != 0 { dp_sbc_cc } else { dp_sbc };
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_RSC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let gen = if a.s != 0 { dp_rsc_cc } else { dp_rsc };
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            gen,
            false,
            StoreRegKind::Normal,
        )
    }

    fn trans_TST_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_and,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_TEQ_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_eor,
            true,
            StoreRegKind::None,
        )
    }

    fn trans_CMP_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_sub_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_CMN_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_add_cc,
            false,
            StoreRegKind::None,
        )
    }

    fn trans_ORR_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_orr,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MOV_rxi(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let s = a.s != 0;
        if a.rd == 15 && s {
            if self.is_user() || self.flags.current_el == 2 {
                return Outcome::Faulted(Fault::UnpredictableUndef);
            }
            return self.op_s_rxi_rot(
                ir,
                a.rd,
                a.imm,
                a.rot,
                dp_mov,
                false,
                StoreRegKind::ExcRet,
            );
        }
        let kind = if a.rd == 13 {
            StoreRegKind::SpCheck
        } else {
            StoreRegKind::Normal
        };
        self.op_s_rxi_rot(ir, a.rd, a.imm, a.rot, dp_mov, s, kind)
    }

    fn trans_BIC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(
            ir,
            a.rd,
            a.rn,
            a.imm,
            a.rot,
            dp_bic,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    fn trans_MVN_rxi(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rxi_rot(
            ir,
            a.rd,
            a.imm,
            a.rot,
            dp_mvn,
            a.s != 0,
            StoreRegKind::Normal,
        )
    }

    // ---- Hints ----

    fn trans_NOP(&mut self, _ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        Outcome::Handled
    }

    fn trans_YIELD(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        self.op_yield(ir)
    }

    fn trans_WFE(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        self.op_wfe(ir)
    }

    fn trans_WFI(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        self.op_wfi(ir)
    }

    fn trans_SEV(&mut self, _ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        Outcome::Handled
    }

    fn trans_SEVL(&mut self, _ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        Outcome::Handled
    }

    // ---- MOVW/MOVT ----

    fn trans_MOVW(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        let c = ir.new_const(Type::I32, a.imm as u64 & 0xffff);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_mov(Type::I32, tmp, c);
        self.store_reg(ir, a.rd as usize, tmp);
        Outcome::Handled
    }

    fn trans_MOVT(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        self.op_movt(ir, a.rd, a.imm)
    }

    // ---- Load/store word and byte ----

    fn trans_STR_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.imm,
            MemOp::ul(),
        )
    }

    fn trans_STRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.imm,
            MemOp::ub(),
        )
    }

    fn trans_LDR_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_LDRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ub())
    }

    fn trans_STR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::ul(),
        )
    }

    fn trans_STRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::ub(),
        )
    }

    fn trans_LDR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::ul(),
        )
    }

    fn trans_LDRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(
            ir,
            a.p,
            a.u,
            a.w,
            a.rn,
            a.rt,
            a.rm,
            a.shim,
            a.shty,
            MemOp::ub(),
        )
    }

    // ---- Media / extension ----

    fn trans_SXTAB(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 8, true)
    }

    fn trans_SXTAH(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 16, true)
    }

    fn trans_UXTAB(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 8, false)
    }

    fn trans_UXTAH(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 16, false)
    }

    fn trans_REV(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_rev(ir, a.rd, a.rm)
    }

    fn trans_REV16(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_rev16(ir, a.rd, a.rm)
    }

    fn trans_REVSH(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_revsh(ir, a.rd, a.rm)
    }

    fn trans_RBIT(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        self.op_rbit(ir, a.rd, a.rm)
    }

    fn trans_SEL(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_sel(ir, a.rd, a.rn, a.rm)
    }

    fn trans_USADA8(&mut self, ir: &mut Context, a: &ArgsMls) -> Outcome {
        self.op_usada8(ir, a.rd, a.ra, a.rm, a.rn)
    }

    fn trans_SSAT(&mut self, ir: &mut Context, a: &ArgsSat) -> Outcome {
        self.op_sat(ir, a.rd, a.rn, a.imm, a.sh, a.sat_imm as u32 + 1, true)
    }

    fn trans_USAT(&mut self, ir: &mut Context, a: &ArgsSat) -> Outcome {
        self.op_sat(ir, a.rd, a.rn, a.imm, a.sh, a.sat_imm as u32, false)
    }

    fn trans_BFCI(&mut self, ir: &mut Context, a: &ArgsBfi) -> Outcome {
        self.op_bfci(ir, a.rd, a.rn, a.lsb, a.msb)
    }

    fn trans_SBFX(&mut self, ir: &mut Context, a: &ArgsBfx) -> Outcome {
        self.op_bfx(ir, a.rd, a.rn, a.lsb, a.widthm1, true)
    }

    fn trans_UBFX(&mut self, ir: &mut Context, a: &ArgsBfx) -> Outcome {
        self.op_bfx(ir, a.rd, a.rn, a.lsb, a.widthm1, false)
    }

    fn trans_SDIV(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        if !self.feature(ArmFeatures::DIV_ARM) {
            return Outcome::Declined;
        }
        self.op_div(ir, a.rd, a.rn, a.rm, true)
    }

    fn trans_UDIV(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        if !self.feature(ArmFeatures::DIV_ARM) {
            return Outcome::Declined;
        }
        self.op_div(ir, a.rd, a.rn, a.rm, false)
    }

    // ---- Block transfers ----

    fn trans_STM(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_stm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    fn trans_LDM_a32(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_ldm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    // ---- Branch and supervisor call ----

    fn trans_B(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_BL(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        let ret = self.curr_insn_len() | self.flags.thumb as u32;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_SVC(&mut self, ir: &mut Context, a: &ArgsSvc) -> Outcome {
        self.op_svc(ir, a.imm)
    }
}

#[allow(non_snake_case)]
impl<'a> a32_uncond::Decode<Context> for A32DisasContext<'a> {
    fn trans_BLX_i(
        &mut self,
        ir: &mut Context,
        a: &a32_uncond::ArgsI,
    ) -> Outcome {
        if self.feature(ArmFeatures::M) {
            return Outcome::Declined;
        }
        let ret = self.curr_insn_len() | self.flags.thumb as u32;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        // Exchanging branch: the target executes in the other state.
        self.store_cpu_field_constant(
            ir,
            !self.flags.thumb as u32,
            cpu::THUMB_OFFSET,
        );
        let diff = self.jmp_diff(a.imm as i32 - (self.pc_curr & 3) as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_CLREX(
        &mut self,
        ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V6K) {
            return Outcome::Declined;
        }
        let minus1 = ir.new_const(Type::I32, u32::MAX as u64);
        ir.gen_mov(Type::I32, self.exclusive_addr, minus1);
        Outcome::Handled
    }

    fn trans_DSB(
        &mut self,
        ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V7) {
            return Outcome::Declined;
        }
        ir.gen_mb(0);
        Outcome::Handled
    }

    fn trans_DMB(
        &mut self,
        ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V7) {
            return Outcome::Declined;
        }
        ir.gen_mb(0);
        Outcome::Handled
    }

    fn trans_ISB(
        &mut self,
        ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        if !self.feature(ArmFeatures::V7) {
            return Outcome::Declined;
        }
        // Self-modifying code sync point: end the block so the next
        // instructions are retranslated.
        self.base.is_jmp = DisasJumpType::TooMany;
        Outcome::Handled
    }

    fn trans_PLD(
        &mut self,
        _ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        Outcome::Handled
    }

    fn trans_PLI(
        &mut self,
        _ir: &mut Context,
        _a: &a32_uncond::ArgsEmpty,
    ) -> Outcome {
        Outcome::Handled
    }
}
