//! Scalar floating-point handlers. Arithmetic goes through the FP
//! helpers; this file's job is register-file plumbing and the
//! access-check protocol.

use a32t_core::{Context, TempIdx, Type};

use super::cpu::{self, ArmFeatures};
use super::helper::Helper;
use super::insn_decode::vfp::{self, *};
use super::A32DisasContext;
use crate::{DisasJumpType, Outcome};

/// VFPExpandImm for the 8-bit encoded constants.
fn vfp_expand_imm(imm8: u32, dp: bool) -> u64 {
    let sign = (imm8 >> 7) & 1;
    let exp_bit = (imm8 >> 6) & 1;
    let frac = imm8 & 0xf;
    if dp {
        let exp =
            if exp_bit != 0 { 0x3fc } else { 0x400 } | (imm8 as u64 >> 4) & 3;
        ((sign as u64) << 63) | (exp << 52) | ((frac as u64) << 48)
    } else {
        let exp = if exp_bit != 0 { 0x7c } else { 0x80 } | (imm8 >> 4) & 3;
        (((sign << 31) | (exp << 23) | (frac << 19)) as u64) & 0xffff_ffff
    }
}

impl<'a> A32DisasContext<'a> {
    fn sreg(vd: i64, d: i64) -> usize {
        ((vd << 1) | d) as usize
    }

    fn dreg(vd: i64, d: i64) -> usize {
        ((d << 4) | vd) as usize
    }

    fn load_vfp_sreg(&mut self, ir: &mut Context, reg: usize) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        ir.gen_ld(Type::I32, t, self.env, cpu::vfp_sreg_offset(reg));
        t
    }

    fn store_vfp_sreg(&mut self, ir: &mut Context, val: TempIdx, reg: usize) {
        ir.gen_st(Type::I32, val, self.env, cpu::vfp_sreg_offset(reg));
    }

    fn load_vfp_dreg(&mut self, ir: &mut Context, reg: usize) -> TempIdx {
        let t = ir.new_temp(Type::I64);
        ir.gen_ld(Type::I64, t, self.env, cpu::vfp_dreg_offset(reg));
        t
    }

    fn store_vfp_dreg(&mut self, ir: &mut Context, val: TempIdx, reg: usize) {
        ir.gen_st(Type::I64, val, self.env, cpu::vfp_dreg_offset(reg));
    }

    fn vfp_present(&self, sz: i64) -> bool {
        self.feature(ArmFeatures::VFP)
            && (sz == 0 || self.feature(ArmFeatures::FP64))
    }

    /// Three-operand FP arithmetic through a helper pair.
    #[allow(clippy::too_many_arguments)]
    fn op_vfp_3op(
        &mut self,
        ir: &mut Context,
        a: &ArgsVfpDnm,
        hs: Helper,
        hd: Helper,
    ) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        if a.sz != 0 {
            let vn = self.load_vfp_dreg(ir, Self::dreg(a.vn, a.n));
            let vm = self.load_vfp_dreg(ir, Self::dreg(a.vm, a.m));
            let vd = ir.new_temp(Type::I64);
            ir.gen_call(vd, hd.id(), &[vn, vm]);
            self.store_vfp_dreg(ir, vd, Self::dreg(a.vd, a.d));
        } else {
            let vn = self.load_vfp_sreg(ir, Self::sreg(a.vn, a.n));
            let vm = self.load_vfp_sreg(ir, Self::sreg(a.vm, a.m));
            let vd = ir.new_temp(Type::I32);
            ir.gen_call(vd, hs.id(), &[vn, vm]);
            self.store_vfp_sreg(ir, vd, Self::sreg(a.vd, a.d));
        }
        Outcome::Handled
    }
}

#[allow(non_snake_case)]
impl<'a> vfp::Decode<Context> for A32DisasContext<'a> {
    fn trans_VADD_f(&mut self, ir: &mut Context, a: &ArgsVfpDnm) -> Outcome {
        self.op_vfp_3op(ir, a, Helper::VfpAddS, Helper::VfpAddD)
    }

    fn trans_VSUB_f(&mut self, ir: &mut Context, a: &ArgsVfpDnm) -> Outcome {
        self.op_vfp_3op(ir, a, Helper::VfpSubS, Helper::VfpSubD)
    }

    fn trans_VMUL_f(&mut self, ir: &mut Context, a: &ArgsVfpDnm) -> Outcome {
        self.op_vfp_3op(ir, a, Helper::VfpMulS, Helper::VfpMulD)
    }

    fn trans_VDIV_f(&mut self, ir: &mut Context, a: &ArgsVfpDnm) -> Outcome {
        self.op_vfp_3op(ir, a, Helper::VfpDivS, Helper::VfpDivD)
    }

    fn trans_VMOV_imm(&mut self, ir: &mut Context, a: &ArgsVfpImm) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let imm8 = ((a.imm4h << 4) | a.imm4l) as u32;
        if a.sz != 0 {
            let c = ir.new_const(Type::I64, vfp_expand_imm(imm8, true));
            let t = ir.new_temp(Type::I64);
            ir.gen_mov(Type::I64, t, c);
            self.store_vfp_dreg(ir, t, Self::dreg(a.vd, a.d));
        } else {
            let c = ir.new_const(Type::I32, vfp_expand_imm(imm8, false));
            let t = ir.new_temp(Type::I32);
            ir.gen_mov(Type::I32, t, c);
            self.store_vfp_sreg(ir, t, Self::sreg(a.vd, a.d));
        }
        Outcome::Handled
    }

    fn trans_VMOV_reg(&mut self, ir: &mut Context, a: &ArgsVfpDm) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        if a.sz != 0 {
            let t = self.load_vfp_dreg(ir, Self::dreg(a.vm, a.m));
            self.store_vfp_dreg(ir, t, Self::dreg(a.vd, a.d));
        } else {
            let t = self.load_vfp_sreg(ir, Self::sreg(a.vm, a.m));
            self.store_vfp_sreg(ir, t, Self::sreg(a.vd, a.d));
        }
        Outcome::Handled
    }

    fn trans_VABS(&mut self, ir: &mut Context, a: &ArgsVfpDm) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        // FP absolute value is a sign-bit clear on the raw bits.
        if a.sz != 0 {
            let t = self.load_vfp_dreg(ir, Self::dreg(a.vm, a.m));
            let mask = ir.new_const(Type::I64, 0x7fff_ffff_ffff_ffff);
            ir.gen_and(Type::I64, t, t, mask);
            self.store_vfp_dreg(ir, t, Self::dreg(a.vd, a.d));
        } else {
            let t = self.load_vfp_sreg(ir, Self::sreg(a.vm, a.m));
            let mask = ir.new_const(Type::I32, 0x7fff_ffff);
            ir.gen_and(Type::I32, t, t, mask);
            self.store_vfp_sreg(ir, t, Self::sreg(a.vd, a.d));
        }
        Outcome::Handled
    }

    fn trans_VNEG(&mut self, ir: &mut Context, a: &ArgsVfpDm) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        if a.sz != 0 {
            let t = self.load_vfp_dreg(ir, Self::dreg(a.vm, a.m));
            let bit = ir.new_const(Type::I64, 0x8000_0000_0000_0000);
            ir.gen_xor(Type::I64, t, t, bit);
            self.store_vfp_dreg(ir, t, Self::dreg(a.vd, a.d));
        } else {
            let t = self.load_vfp_sreg(ir, Self::sreg(a.vm, a.m));
            let bit = ir.new_const(Type::I32, 0x8000_0000);
            ir.gen_xor(Type::I32, t, t, bit);
            self.store_vfp_sreg(ir, t, Self::sreg(a.vd, a.d));
        }
        Outcome::Handled
    }

    fn trans_VLDR_VSTR(&mut self, ir: &mut Context, a: &ArgsVfpLdst) -> Outcome {
        if !self.vfp_present(a.sz) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let ofs = if a.u != 0 { a.imm as i32 } else { -(a.imm as i32) };
        let addr = self.add_reg_for_lit(ir, a.rn as usize, ofs);
        if a.sz != 0 {
            let reg = Self::dreg(a.vd, a.d);
            if a.l != 0 {
                let t = ir.new_temp(Type::I64);
                self.gen_aa32_ld_i64(
                    ir,
                    t,
                    addr,
                    a32t_core::MemOp::uq().aligned(),
                );
                self.store_vfp_dreg(ir, t, reg);
            } else {
                let t = self.load_vfp_dreg(ir, reg);
                self.gen_aa32_st_i64(
                    ir,
                    t,
                    addr,
                    a32t_core::MemOp::uq().aligned(),
                );
            }
        } else {
            let reg = Self::sreg(a.vd, a.d);
            if a.l != 0 {
                let t = ir.new_temp(Type::I32);
                self.gen_aa32_ld_i32(
                    ir,
                    t,
                    addr,
                    a32t_core::MemOp::ul().aligned(),
                );
                self.store_vfp_sreg(ir, t, reg);
            } else {
                let t = self.load_vfp_sreg(ir, reg);
                self.gen_aa32_st_i32(
                    ir,
                    t,
                    addr,
                    a32t_core::MemOp::ul().aligned(),
                );
            }
        }
        Outcome::Handled
    }

    fn trans_VMOV_single(&mut self, ir: &mut Context, a: &ArgsVfpMovs) -> Outcome {
        if !self.feature(ArmFeatures::VFP) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let reg = Self::sreg(a.vn, a.n);
        if a.l != 0 {
            let t = self.load_vfp_sreg(ir, reg);
            // VMOV r15, s<n> is the APSR_nzcv form only via VMRS.
            self.store_reg(ir, a.rt as usize, t);
        } else {
            let t = self.load_reg(ir, a.rt as usize);
            self.store_vfp_sreg(ir, t, reg);
        }
        Outcome::Handled
    }

    fn trans_VMRS(&mut self, ir: &mut Context, a: &ArgsVfpSysreg) -> Outcome {
        if !self.feature(ArmFeatures::VFP) {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let tmp = ir.new_temp(Type::I32);
        ir.gen_call(tmp, Helper::VfpGetFpscr.id(), &[]);
        if a.rt == 15 {
            // APSR_nzcv form: copy FPSCR.{N,Z,C,V} to the flags.
            ir.gen_mov(Type::I32, self.nf, tmp);
            let nz = ir.new_temp(Type::I32);
            let zbit = ir.new_const(Type::I32, 1 << 30);
            ir.gen_andc(Type::I32, nz, zbit, tmp);
            ir.gen_mov(Type::I32, self.zf, nz);
            ir.gen_extract(Type::I32, self.cf, tmp, 29, 1);
            let three = ir.new_const(Type::I32, 3);
            ir.gen_shl(Type::I32, self.vf, tmp, three);
        } else {
            self.store_reg(ir, a.rt as usize, tmp);
        }
        Outcome::Handled
    }

    fn trans_VMSR(&mut self, ir: &mut Context, a: &ArgsVfpSysreg) -> Outcome {
        if !self.feature(ArmFeatures::VFP) || a.rt == 15 {
            return Outcome::Declined;
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let val = self.load_reg(ir, a.rt as usize);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::VfpSetFpscr.id(), &[val]);
        // Rounding mode and trap enables changed: stop chaining.
        self.base.is_jmp = DisasJumpType::UpdateNochain;
        Outcome::Handled
    }
}
