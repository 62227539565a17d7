//! Thumb 32-bit semantic handlers.

use a32t_core::{Context, Cond, MemOp, Type};

use super::cpu::{self, ArmFeatures};
use super::helper::Helper;
use super::insn_decode::t32::{self, *};
use super::ops::{
    dp_adc, dp_adc_cc, dp_add, dp_add_cc, dp_and, dp_bic, dp_eor, dp_mov,
    dp_mvn, dp_orn, dp_orr, dp_rsb, dp_rsb_cc, dp_sbc, dp_sbc_cc, dp_sub,
    dp_sub_cc, StoreRegKind,
};
use super::A32DisasContext;
use crate::{DisasJumpType, Fault, Outcome};

#[allow(non_snake_case)]
impl<'a> t32::Decode<Context> for A32DisasContext<'a> {
    // ---- System / misc control ----

    fn trans_MSR_t32(&mut self, ir: &mut Context, a: &ArgsMsrT32) -> Outcome {
        if self.feature(ArmFeatures::M) {
            let reg = ir.new_const(Type::I32, a.sysm as u64);
            let val = self.load_reg(ir, a.rn as usize);
            let dead = ir.new_temp(Type::I32);
            ir.gen_call(dead, Helper::V7mMsr.id(), &[reg, val]);
            self.base.is_jmp = DisasJumpType::UpdateExit;
            Outcome::Handled
        } else {
            self.op_msr_reg(ir, a.r, a.mask, a.rn)
        }
    }

    fn trans_MRS_t32(&mut self, ir: &mut Context, a: &ArgsMrsT32) -> Outcome {
        if self.feature(ArmFeatures::M) {
            let reg = ir.new_const(Type::I32, a.sysm as u64);
            let tmp = ir.new_temp(Type::I32);
            ir.gen_call(tmp, Helper::V7mMrs.id(), &[reg]);
            self.store_reg(ir, a.rd as usize, tmp);
            Outcome::Handled
        } else {
            self.op_mrs(ir, a.r, a.rd)
        }
    }

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

    fn trans_CLREX(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        let minus1 = ir.new_const(Type::I32, u32::MAX as u64);
        ir.gen_mov(Type::I32, self.exclusive_addr, minus1);
        Outcome::Handled
    }

    fn trans_DSB(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        ir.gen_mb(0);
        Outcome::Handled
    }

    fn trans_DMB(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        ir.gen_mb(0);
        Outcome::Handled
    }

    fn trans_ISB(&mut self, _ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        self.base.is_jmp = DisasJumpType::TooMany;
        Outcome::Handled
    }

    fn trans_HVC(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        if !self.feature(ArmFeatures::EL2) || self.feature(ArmFeatures::M) {
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
        if !self.feature(ArmFeatures::EL3) || self.feature(ArmFeatures::M) {
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

    fn trans_UDF(&mut self, _ir: &mut Context, _a: &ArgsI) -> Outcome {
        Outcome::Faulted(Fault::Undefined)
    }

    // ---- Low-overhead branches ----

    fn trans_DLS(&mut self, ir: &mut Context, a: &ArgsDls) -> Outcome {
        if !self.feature(ArmFeatures::LOB) || a.rn == 13 || a.rn == 15 {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, a.rn as usize);
        self.store_reg(ir, 14, tmp);
        Outcome::Handled
    }

    fn trans_WLS(&mut self, ir: &mut Context, a: &ArgsWls) -> Outcome {
        if !self.feature(ArmFeatures::LOB) || a.rn == 13 || a.rn == 15 {
            return Outcome::Declined;
        }
        if self.in_it_block() {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        // Zero count: skip the loop body entirely.
        let nextlabel = ir.new_label();
        ir.gen_brcondi(Type::I32, self.regs[a.rn as usize], 0, Cond::Eq, nextlabel);
        let tmp = self.load_reg(ir, a.rn as usize);
        self.store_reg(ir, 14, tmp);
        self.gen_jmp_tb(ir, self.curr_insn_len() as i32, 1);
        ir.gen_set_label(nextlabel);
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_LE(&mut self, ir: &mut Context, a: &ArgsLe) -> Outcome {
        if !self.feature(ArmFeatures::LOB) {
            return Outcome::Declined;
        }
        // LE leaves ECI/IT state untouched.
        self.eci_handled = true;
        if a.f != 0 {
            // LE without loop count: unconditional backwards branch.
            let diff = self.jmp_diff(-(a.imm as i32));
            self.gen_jmp(ir, diff);
            return Outcome::Handled;
        }
        // Loop end: decrement LR, branch back while not done.
        let label = self.arm_gen_condlabel(ir);
        ir.gen_brcondi(Type::I32, self.regs[14], 1, Cond::Leu, label);
        let tmp = self.load_reg(ir, 14);
        let one = ir.new_const(Type::I32, 1);
        ir.gen_sub(Type::I32, tmp, tmp, one);
        self.store_reg(ir, 14, tmp);
        let diff = self.jmp_diff(-(a.imm as i32));
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_LCTP(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        if !self.feature(ArmFeatures::MVE) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        self.store_cpu_field_constant(ir, 0, cpu::VPR_OFFSET);
        Outcome::Handled
    }

    fn trans_VCTP(&mut self, ir: &mut Context, a: &ArgsVctp) -> Outcome {
        if !self.feature(ArmFeatures::MVE) || a.rn == 13 || a.rn == 15 {
            return Outcome::Declined;
        }
        if let Err(f) = self.mve_eci_check() {
            return Outcome::Faulted(f);
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let rn = self.load_reg(ir, a.rn as usize);
        let size = ir.new_const(Type::I32, a.size as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::MveVctp.id(), &[rn, size]);
        self.mve_update_and_store_eci(ir);
        Outcome::Handled
    }

    // ---- Branches ----

    fn trans_B_cond_thumb(&mut self, ir: &mut Context, a: &ArgsCi) -> Outcome {
        // Encoded condition, required to be outside an IT block.
        if a.cond >= 0xe {
            return Outcome::Declined;
        }
        if self.in_it_block() {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        self.arm_skip_unless(ir, a.cond as u32);
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_B(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_BL(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        let ret = self.curr_insn_len() | 1;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_BLX_i(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        // The encoding space is reused from v8.1M onward and UNDEFs
        // on earlier M-profile cores.
        if self.feature(ArmFeatures::M) {
            return Outcome::Declined;
        }
        if a.imm & 2 != 0 {
            return Outcome::Declined;
        }
        let ret = self.curr_insn_len() | 1;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        self.store_cpu_field_constant(ir, 0, cpu::THUMB_OFFSET);
        // Computed from the word-aligned PC.
        let diff = self.jmp_diff(a.imm as i32 - (self.pc_curr & 3) as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    // ---- Data processing (modified immediate) ----

    fn trans_TST_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_and, true, StoreRegKind::None)
    }

    fn trans_AND_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_and, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_BIC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_bic, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_MOV_rxi(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let kind = if a.rd == 13 {
            StoreRegKind::SpCheck
        } else {
            StoreRegKind::Normal
        };
        self.op_s_rxi_rot(ir, a.rd, a.imm, a.rot, dp_mov, a.s != 0, kind)
    }

    fn trans_ORR_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_orr, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_MVN_rxi(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rxi_rot(ir, a.rd, a.imm, a.rot, dp_mvn, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_ORN_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_orn, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_TEQ_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_eor, true, StoreRegKind::None)
    }

    fn trans_EOR_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_eor, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_CMN_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_add_cc, false, StoreRegKind::None)
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
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, gen, false, StoreRegKind::Normal)
    }

    fn trans_SBC_rri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        let gen = if a.s != 0 { dp_sbc_cc } else { dp_sbc };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, gen, false, StoreRegKind::Normal)
    }

    fn trans_CMP_xri(&mut self, ir: &mut Context, a: &ArgsSRriRot) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, dp_sub_cc, false, StoreRegKind::None)
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
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, a.rot, gen, false, StoreRegKind::Normal)
    }

    // ---- Plain binary immediate ----

    fn trans_ADDW(&mut self, ir: &mut Context, a: &ArgsRni) -> Outcome {
        if a.rn == 15 {
            // ADR (add form).
            let tmp = self.add_reg_for_lit(ir, 15, a.imm as i32);
            self.store_reg(ir, a.rd as usize, tmp);
            return Outcome::Handled;
        }
        let kind = match self.addsub_kind(a.rd, a.rn, false) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, 0, dp_add, false, kind)
    }

    fn trans_SUBW(&mut self, ir: &mut Context, a: &ArgsRni) -> Outcome {
        if a.rn == 15 {
            // ADR (subtract form).
            let tmp = self.add_reg_for_lit(ir, 15, -(a.imm as i32));
            self.store_reg(ir, a.rd as usize, tmp);
            return Outcome::Handled;
        }
        let kind = match self.addsub_kind(a.rd, a.rn, false) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, 0, dp_sub, false, kind)
    }

    fn trans_MOVW(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        let c = ir.new_const(Type::I32, a.imm as u64 & 0xffff);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_mov(Type::I32, tmp, c);
        self.store_reg(ir, a.rd as usize, tmp);
        Outcome::Handled
    }

    fn trans_MOVT(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        self.op_movt(ir, a.rd, a.imm)
    }

    fn trans_SBFX(&mut self, ir: &mut Context, a: &ArgsBfx) -> Outcome {
        self.op_bfx(ir, a.rd, a.rn, a.lsb, a.widthm1, true)
    }

    fn trans_BFCI(&mut self, ir: &mut Context, a: &ArgsBfi) -> Outcome {
        self.op_bfci(ir, a.rd, a.rn, a.lsb, a.msb)
    }

    fn trans_UBFX(&mut self, ir: &mut Context, a: &ArgsBfx) -> Outcome {
        self.op_bfx(ir, a.rd, a.rn, a.lsb, a.widthm1, false)
    }

    // ---- Data processing (shifted register) ----

    fn trans_TST_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_and, true, StoreRegKind::None)
    }

    fn trans_AND_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_and, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_BIC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_bic, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_MOV_rxri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let kind = if a.rd == 13 {
            StoreRegKind::SpCheck
        } else {
            StoreRegKind::Normal
        };
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, a.shty, dp_mov, a.s != 0, kind)
    }

    fn trans_ORR_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_orr, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_MVN_rxri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, a.shty, dp_mvn, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_ORN_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_orn, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_TEQ_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_eor, true, StoreRegKind::None)
    }

    fn trans_EOR_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_eor, a.s != 0, StoreRegKind::Normal)
    }

    fn trans_CMN_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_add_cc, false, StoreRegKind::None)
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
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, gen, false, StoreRegKind::Normal)
    }

    fn trans_SBC_rrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        let gen = if a.s != 0 { dp_sbc_cc } else { dp_sbc };
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, gen, false, StoreRegKind::Normal)
    }

    fn trans_CMP_xrri(&mut self, ir: &mut Context, a: &ArgsSRrrShi) -> Outcome {
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, dp_sub_cc, false, StoreRegKind::None)
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
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, a.shim, a.shty, gen, false, StoreRegKind::Normal)
    }

    fn trans_MOV_rxrr(&mut self, ir: &mut Context, a: &ArgsSRrrShr) -> Outcome {
        self.op_s_rxr_shr(ir, a.rd, a.rm, a.rs, a.shty, dp_mov, a.s != 0, StoreRegKind::Normal)
    }

    // ---- Extension / misc register ops ----

    fn trans_SXTAH(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 16, true)
    }

    fn trans_UXTAH(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 16, false)
    }

    fn trans_SXTAB(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 8, true)
    }

    fn trans_UXTAB(&mut self, ir: &mut Context, a: &ArgsXtab) -> Outcome {
        self.op_xta(ir, a.rd, a.rn, a.rm, a.rot, 8, false)
    }

    fn trans_QADD(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, false, true)
    }

    fn trans_QDADD(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, true, true)
    }

    fn trans_QSUB(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, false, false)
    }

    fn trans_QDSUB(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_qaddsub(ir, a.rd, a.rm, a.rn, true, false)
    }

    fn trans_REV(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_rev(ir, a.rd, a.rm)
    }

    fn trans_REV16(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_rev16(ir, a.rd, a.rm)
    }

    fn trans_RBIT(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_rbit(ir, a.rd, a.rm)
    }

    fn trans_REVSH(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_revsh(ir, a.rd, a.rm)
    }

    fn trans_SEL(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        self.op_sel(ir, a.rd, a.rn, a.rm)
    }

    fn trans_CLZ(&mut self, ir: &mut Context, a: &ArgsRr) -> Outcome {
        self.op_clz(ir, a.rd, a.rm)
    }

    // ---- Multiply, divide ----

    fn trans_MUL(&mut self, ir: &mut Context, a: &ArgsMul) -> Outcome {
        self.op_mla(ir, a.s != 0, a.rd, None, a.rm, a.rn, false)
    }

    fn trans_MLA(&mut self, ir: &mut Context, a: &ArgsMla) -> Outcome {
        self.op_mla(ir, a.s != 0, a.rd, Some(a.ra), a.rm, a.rn, false)
    }

    fn trans_MLS(&mut self, ir: &mut Context, a: &ArgsMls) -> Outcome {
        self.op_mla(ir, false, a.rd, Some(a.ra), a.rm, a.rn, true)
    }

    fn trans_USADA8(&mut self, ir: &mut Context, a: &ArgsMls) -> Outcome {
        self.op_usada8(ir, a.rd, a.ra, a.rm, a.rn)
    }

    fn trans_SMULL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, true, false)
    }

    fn trans_SDIV(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        if !self.feature(ArmFeatures::DIV_THUMB) {
            return Outcome::Declined;
        }
        self.op_div(ir, a.rd, a.rn, a.rm, true)
    }

    fn trans_UMULL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, false, false)
    }

    fn trans_UDIV(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        if !self.feature(ArmFeatures::DIV_THUMB) {
            return Outcome::Declined;
        }
        self.op_div(ir, a.rd, a.rn, a.rm, false)
    }

    fn trans_SMLAL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, true, true)
    }

    fn trans_UMLAL(&mut self, ir: &mut Context, a: &ArgsMull) -> Outcome {
        self.op_mull(ir, a.s != 0, a.rdlo, a.rdhi, a.rm, a.rn, false, true)
    }

    // ---- Exclusives, table branch, dual transfers ----

    fn trans_STREX(&mut self, ir: &mut Context, a: &ArgsStrex) -> Outcome {
        self.op_strex(ir, a.rn, a.rd, a.rt, a.imm)
    }

    fn trans_LDREX(&mut self, ir: &mut Context, a: &ArgsLdrex) -> Outcome {
        self.op_ldrex(ir, a.rn, a.rt, a.imm)
    }

    fn trans_TBB(&mut self, ir: &mut Context, a: &ArgsTbranch) -> Outcome {
        if a.rn == 13 || a.rm == 13 || a.rm == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        if self.in_it_block() && !self.condexec_mask.is_power_of_two() {
            // Only permitted as the last instruction of an IT block.
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        let addr = self.load_reg(ir, a.rn as usize);
        let idx = self.load_reg(ir, a.rm as usize);
        let mop = if a.h != 0 {
            let one = ir.new_const(Type::I32, 1);
            ir.gen_shl(Type::I32, idx, idx, one);
            MemOp::uw()
        } else {
            MemOp::ub()
        };
        ir.gen_add(Type::I32, addr, addr, idx);
        let val = ir.new_temp(Type::I32);
        self.gen_aa32_ld_i32(ir, val, addr, mop);
        // Branch to PC + 2*entry.
        let one = ir.new_const(Type::I32, 1);
        ir.gen_shl(Type::I32, val, val, one);
        let pc = ir.new_const(Type::I32, self.read_pc_val() as u64);
        ir.gen_add(Type::I32, val, val, pc);
        self.store_reg(ir, 15, val);
        Outcome::Handled
    }

    fn trans_STRD_t32(&mut self, ir: &mut Context, a: &ArgsLdstD) -> Outcome {
        if a.p == 0 && a.w == 0 {
            return Outcome::Declined;
        }
        self.op_strd(ir, a.p, a.u, a.w, a.rn, a.rt, a.rt2, a.imm)
    }

    fn trans_LDRD_t32(&mut self, ir: &mut Context, a: &ArgsLdstD) -> Outcome {
        if a.p == 0 && a.w == 0 {
            return Outcome::Declined;
        }
        self.op_ldrd(ir, a.p, a.u, a.w, a.rn, a.rt, a.rt2, a.imm)
    }

    // ---- Block transfers ----

    fn trans_STM(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_stm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    fn trans_LDM_t32(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_ldm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    fn trans_STMDB(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_stm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    fn trans_LDMDB(&mut self, ir: &mut Context, a: &ArgsLdstBlock) -> Outcome {
        self.op_ldm(ir, a.rn, a.list, a.b, a.i, a.u, a.w)
    }

    // ---- Load/store single ----

    fn trans_STR_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_STRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ub())
    }

    fn trans_STRH_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_store_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::uw())
    }

    fn trans_LDR_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_LDRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstRi) -> Outcome {
        self.op_load_ri(ir, a.p, a.u, a.w, a.rn, a.rt, a.imm, MemOp::ub())
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

    fn trans_STR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::ul())
    }

    fn trans_STRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::ub())
    }

    fn trans_STRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_store_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::uw())
    }

    fn trans_LDR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::ul())
    }

    fn trans_LDRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::ub())
    }

    fn trans_LDRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::uw())
    }

    fn trans_LDRSB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::sb())
    }

    fn trans_LDRSH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRr) -> Outcome {
        self.op_load_rr(ir, a.p, a.u, a.w, a.rn, a.rt, a.rm, a.shim, a.shty, MemOp::sw())
    }
}
