//! Thumb 16-bit semantic handlers. Most bodies funnel into the
//! shared op helpers; the wrinkle specific to this encoding set is
//! that flag setting depends on IT state rather than an S bit.

use a32t_core::{Context, Cond, MemOp, Type};

use super::cpu::ArmFeatures;
use super::insn_decode::t16::{self, *};
use super::ops::{
    dp_adc, dp_adc_cc, dp_add, dp_add_cc, dp_and, dp_bic, dp_eor, dp_mov,
    dp_mvn, dp_orr, dp_rsb, dp_rsb_cc, dp_sbc, dp_sbc_cc, dp_sub, dp_sub_cc,
    StoreRegKind,
};
use super::A32DisasContext;
use crate::{Fault, Outcome};

#[allow(non_snake_case)]
impl<'a> t16::Decode16<Context> for A32DisasContext<'a> {
    // ---- Shift (immediate) ----

    fn trans_LSL_imm(&mut self, ir: &mut Context, a: &ArgsShImm) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, 0, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_LSR_imm(&mut self, ir: &mut Context, a: &ArgsShImm) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, 1, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_ASR_imm(&mut self, ir: &mut Context, a: &ArgsShImm) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shi(ir, a.rd, a.rm, a.shim, 2, dp_mov, s, StoreRegKind::Normal)
    }

    // ---- Add/subtract (three-register and small immediate) ----

    fn trans_ADD_reg(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        let gen = if self.in_it_block() { dp_add } else { dp_add_cc };
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, 0, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_SUB_reg(&mut self, ir: &mut Context, a: &ArgsRrr) -> Outcome {
        let gen = if self.in_it_block() { dp_sub } else { dp_sub_cc };
        self.op_s_rrr_shi(ir, a.rd, a.rn, a.rm, 0, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_ADD_imm3(&mut self, ir: &mut Context, a: &ArgsRni) -> Outcome {
        let gen = if self.in_it_block() { dp_add } else { dp_add_cc };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_SUB_imm3(&mut self, ir: &mut Context, a: &ArgsRni) -> Outcome {
        let gen = if self.in_it_block() { dp_sub } else { dp_sub_cc };
        self.op_s_rri_rot(ir, a.rd, a.rn, a.imm, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_MOV_imm(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxi_rot(ir, a.rd, a.imm, 0, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_CMP_imm(&mut self, ir: &mut Context, a: &ArgsNi) -> Outcome {
        self.op_s_rri_rot(ir, 0, a.rn, a.imm, 0, dp_sub_cc, false, StoreRegKind::None)
    }

    fn trans_ADD_imm8(&mut self, ir: &mut Context, a: &ArgsRdnI) -> Outcome {
        let gen = if self.in_it_block() { dp_add } else { dp_add_cc };
        self.op_s_rri_rot(ir, a.rdn, a.rdn, a.imm, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_SUB_imm8(&mut self, ir: &mut Context, a: &ArgsRdnI) -> Outcome {
        let gen = if self.in_it_block() { dp_sub } else { dp_sub_cc };
        self.op_s_rri_rot(ir, a.rdn, a.rdn, a.imm, 0, gen, false, StoreRegKind::Normal)
    }

    // ---- Data processing (register) ----

    fn trans_AND_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, dp_and, s, StoreRegKind::Normal)
    }

    fn trans_EOR_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, dp_eor, s, StoreRegKind::Normal)
    }

    fn trans_LSL_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shr(ir, a.rdn, a.rdn, a.rm, 0, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_LSR_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shr(ir, a.rdn, a.rdn, a.rm, 1, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_ASR_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shr(ir, a.rdn, a.rdn, a.rm, 2, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_ROR_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shr(ir, a.rdn, a.rdn, a.rm, 3, dp_mov, s, StoreRegKind::Normal)
    }

    fn trans_ADC_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let gen = if self.in_it_block() { dp_adc } else { dp_adc_cc };
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_SBC_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let gen = if self.in_it_block() { dp_sbc } else { dp_sbc_cc };
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_TST_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        self.op_s_rrr_shi(ir, 0, a.rdn, a.rm, 0, 0, dp_and, true, StoreRegKind::None)
    }

    fn trans_RSB_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        // NEG: rdn = 0 - rm.
        let gen = if self.in_it_block() { dp_rsb } else { dp_rsb_cc };
        self.op_s_rri_rot(ir, a.rdn, a.rm, 0, 0, gen, false, StoreRegKind::Normal)
    }

    fn trans_CMP_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        self.op_s_rrr_shi(ir, 0, a.rdn, a.rm, 0, 0, dp_sub_cc, false, StoreRegKind::None)
    }

    fn trans_CMN_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        self.op_s_rrr_shi(ir, 0, a.rdn, a.rm, 0, 0, dp_add_cc, false, StoreRegKind::None)
    }

    fn trans_ORR_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, dp_orr, s, StoreRegKind::Normal)
    }

    fn trans_MUL_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_mla(ir, s, a.rdn, None, a.rm, a.rdn, false)
    }

    fn trans_BIC_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rrr_shi(ir, a.rdn, a.rdn, a.rm, 0, 0, dp_bic, s, StoreRegKind::Normal)
    }

    fn trans_MVN_dp(&mut self, ir: &mut Context, a: &ArgsDpRr) -> Outcome {
        let s = !self.in_it_block();
        self.op_s_rxr_shi(ir, a.rdn, a.rm, 0, 0, dp_mvn, s, StoreRegKind::Normal)
    }

    // ---- High-register forms ----

    fn trans_ADD_hireg(&mut self, ir: &mut Context, a: &ArgsHireg) -> Outcome {
        let kind = match self.addsub_kind(a.rd, a.rd, false) {
            Ok(k) => k,
            Err(f) => return Outcome::Faulted(f),
        };
        self.op_s_rrr_shi(ir, a.rd, a.rd, a.rm, 0, 0, dp_add, false, kind)
    }

    fn trans_CMP_hireg(&mut self, ir: &mut Context, a: &ArgsHireg) -> Outcome {
        self.op_s_rrr_shi(ir, 0, a.rd, a.rm, 0, 0, dp_sub_cc, false, StoreRegKind::None)
    }

    fn trans_MOV_hireg(&mut self, ir: &mut Context, a: &ArgsHireg) -> Outcome {
        let kind = if a.rd == 13 {
            StoreRegKind::SpCheck
        } else {
            StoreRegKind::Normal
        };
        self.op_s_rxr_shi(ir, a.rd, a.rm, 0, 0, dp_mov, false, kind)
    }

    fn trans_BX(&mut self, ir: &mut Context, a: &ArgsR) -> Outcome {
        let tmp = self.load_reg(ir, a.rm as usize);
        self.gen_bx_excret(ir, tmp);
        Outcome::Handled
    }

    fn trans_BLX_r(&mut self, ir: &mut Context, a: &ArgsR) -> Outcome {
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let tmp = self.load_reg(ir, a.rm as usize);
        let ret = self.curr_insn_len() | 1;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        self.gen_bx(ir, tmp);
        Outcome::Handled
    }

    // ---- Load/store ----

    fn trans_LDR_lit(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_load_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_STR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_store_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::ul())
    }

    fn trans_STRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_store_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::uw())
    }

    fn trans_STRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_store_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::ub())
    }

    fn trans_LDRSB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_load_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::sb())
    }

    fn trans_LDR_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_load_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::ul())
    }

    fn trans_LDRH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_load_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::uw())
    }

    fn trans_LDRB_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_load_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::ub())
    }

    fn trans_LDRSH_rr(&mut self, ir: &mut Context, a: &ArgsLdstRrr) -> Outcome {
        self.op_load_rr(ir, 1, 1, 0, a.rn, a.rt, a.rm, 0, 0, MemOp::sw())
    }

    fn trans_STR_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_store_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_LDR_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_load_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_STRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_store_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ub())
    }

    fn trans_LDRB_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_load_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ub())
    }

    fn trans_STRH_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_store_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::uw())
    }

    fn trans_LDRH_ri(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_load_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::uw())
    }

    fn trans_STR_sp(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_store_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ul())
    }

    fn trans_LDR_sp(&mut self, ir: &mut Context, a: &ArgsLdstIs) -> Outcome {
        self.op_load_ri(ir, 1, 1, 0, a.rn, a.rt, a.imm, MemOp::ul())
    }

    // ---- PC/SP-relative add ----

    fn trans_ADR(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        let tmp = self.add_reg_for_lit(ir, 15, a.imm as i32);
        self.store_reg(ir, a.rd as usize, tmp);
        Outcome::Handled
    }

    fn trans_ADD_sp_i8(&mut self, ir: &mut Context, a: &ArgsRi) -> Outcome {
        self.op_s_rri_rot(ir, a.rd, 13, a.imm, 0, dp_add, false, StoreRegKind::Normal)
    }

    fn trans_ADD_sp7(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        self.op_s_rri_rot(ir, 13, 13, a.imm, 0, dp_add, false, StoreRegKind::SpCheck)
    }

    fn trans_SUB_sp7(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        self.op_s_rri_rot(ir, 13, 13, a.imm, 0, dp_sub, false, StoreRegKind::SpCheck)
    }

    // ---- Extend, reverse ----

    fn trans_SXTH(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        self.op_xta(ir, a.rd, 15, a.rm, 0, 16, true)
    }

    fn trans_SXTB(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        self.op_xta(ir, a.rd, 15, a.rm, 0, 8, true)
    }

    fn trans_UXTH(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        self.op_xta(ir, a.rd, 15, a.rm, 0, 16, false)
    }

    fn trans_UXTB(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        self.op_xta(ir, a.rd, 15, a.rm, 0, 8, false)
    }

    fn trans_REV(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_rev(ir, a.rd, a.rm)
    }

    fn trans_REV16(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_rev16(ir, a.rd, a.rm)
    }

    fn trans_REVSH(&mut self, ir: &mut Context, a: &ArgsXt) -> Outcome {
        if !self.feature(ArmFeatures::V6) {
            return Outcome::Declined;
        }
        self.op_revsh(ir, a.rd, a.rm)
    }

    // ---- Push/pop, compare-and-branch ----

    fn trans_PUSH(&mut self, ir: &mut Context, a: &ArgsPush) -> Outcome {
        self.op_stm(ir, 13, a.list, 1, 0, 0, 1)
    }

    fn trans_POP(&mut self, ir: &mut Context, a: &ArgsPush) -> Outcome {
        self.op_ldm(ir, 13, a.list, 0, 1, 0, 1)
    }

    fn trans_CBZ(&mut self, ir: &mut Context, a: &ArgsCbz) -> Outcome {
        if !self.feature(ArmFeatures::V6T2) {
            return Outcome::Declined;
        }
        let label = self.arm_gen_condlabel(ir);
        let tmp = self.load_reg(ir, a.rn as usize);
        // Skip over the branch when the register fails the test.
        let cond = if a.nz != 0 { Cond::Eq } else { Cond::Ne };
        ir.gen_brcondi(Type::I32, tmp, 0, cond, label);
        let diff = self.jmp_diff(a.imm as i32);
        self.gen_jmp(ir, diff);
        Outcome::Handled
    }

    fn trans_BKPT(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        self.op_bkpt(ir, a.imm)
    }

    // ---- Hints and IT ----

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

    fn trans_IT(&mut self, _ir: &mut Context, a: &ArgsIt) -> Outcome {
        // No code generated: the instruction only seeds the
        // predication state machine. firstcond/mask combinations
        // yielding 0b1111 are UNPREDICTABLE; treating 0b1111 as
        // "always" is the permitted choice.
        self.condexec_cond = ((a.cond_mask >> 4) & 0xe) as u32;
        self.condexec_mask = (a.cond_mask & 0x1f) as u32;
        Outcome::Handled
    }

    // ---- Block transfers ----

    fn trans_STM_t16(&mut self, ir: &mut Context, a: &ArgsBlock) -> Outcome {
        self.op_stm(ir, a.rn, a.list, 0, 1, 0, 1)
    }

    fn trans_LDM_t16(&mut self, ir: &mut Context, a: &ArgsBlock) -> Outcome {
        self.op_ldm(ir, a.rn, a.list, 0, 1, 0, 1)
    }

    // ---- UDF, SVC, branches ----

    fn trans_UDF(&mut self, _ir: &mut Context, _a: &ArgsI) -> Outcome {
        Outcome::Faulted(Fault::Undefined)
    }

    fn trans_SVC(&mut self, ir: &mut Context, a: &ArgsSvc) -> Outcome {
        self.op_svc(ir, a.imm)
    }

    fn trans_B_cond(&mut self, ir: &mut Context, a: &ArgsCi) -> Outcome {
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

    // ---- Thumb-1 BL/BLX halves ----

    fn trans_BL_BLX_prefix(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        assert!(!self.feature(ArmFeatures::THUMB2));
        let diff = self.jmp_diff((a.imm as i32) << 12);
        self.gen_pc_plus_diff(ir, self.regs[14], diff);
        Outcome::Handled
    }

    fn trans_BL_suffix(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        assert!(!self.feature(ArmFeatures::THUMB2));
        let tmp = ir.new_temp(Type::I32);
        let c = ir.new_const(Type::I32, (((a.imm as u32) << 1) | 1) as u64);
        ir.gen_add(Type::I32, tmp, self.regs[14], c);
        let ret = self.curr_insn_len() | 1;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        self.gen_bx(ir, tmp);
        Outcome::Handled
    }

    fn trans_BLX_suffix(&mut self, ir: &mut Context, a: &ArgsI) -> Outcome {
        assert!(!self.feature(ArmFeatures::THUMB2));
        if !self.feature(ArmFeatures::V5) {
            return Outcome::Declined;
        }
        let tmp = ir.new_temp(Type::I32);
        let c = ir.new_const(Type::I32, ((a.imm as u32) << 1) as u64);
        ir.gen_add(Type::I32, tmp, self.regs[14], c);
        let mask = ir.new_const(Type::I32, 0xffff_fffc);
        ir.gen_and(Type::I32, tmp, tmp, mask);
        let ret = self.curr_insn_len() | 1;
        self.gen_pc_plus_diff(ir, self.regs[14], ret as i32);
        self.gen_bx(ir, tmp);
        Outcome::Handled
    }
}
