//! M-profile vector extension handlers. All data movement and
//! arithmetic is beatwise and goes through helpers that honour the
//! VPR predicate mask and keep the stored ECI field current; the
//! translator's job is the continuation-state protocol around them.

use a32t_core::{Context, Type};

use super::cpu::{self, ArmFeatures};
use super::helper::Helper;
use super::insn_decode::mve::{self, *};
use super::A32DisasContext;
use crate::Outcome;

impl<'a> A32DisasContext<'a> {
    fn mve_check(&mut self, ir: &mut Context) -> Result<(), Outcome> {
        if !self.feature(ArmFeatures::MVE) {
            return Err(Outcome::Declined);
        }
        if let Err(f) = self.mve_eci_check() {
            return Err(Outcome::Faulted(f));
        }
        if let Err(f) = self.vfp_access_check(ir) {
            return Err(Outcome::Faulted(f));
        }
        Ok(())
    }
}

#[allow(non_snake_case)]
impl<'a> mve::Decode<Context> for A32DisasContext<'a> {
    fn trans_VLDR_VSTR(&mut self, ir: &mut Context, a: &ArgsVldst) -> Outcome {
        // Writeback with SP excluded, PC base never valid.
        if a.rn == 15 || (a.rn == 13 && a.w != 0) {
            return Outcome::Declined;
        }
        if let Err(out) = self.mve_check(ir) {
            return out;
        }
        let mut offset = (a.imm << a.size) as i32;
        if a.a == 0 {
            offset = -offset;
        }
        let addr = self.load_reg(ir, a.rn as usize);
        if a.p != 0 {
            let c = ir.new_const(Type::I32, offset as u32 as u64);
            ir.gen_add(Type::I32, addr, addr, c);
        }
        let h = match (a.size, a.l != 0) {
            (0, false) => Helper::MveVstrb,
            (1, false) => Helper::MveVstrh,
            (2, false) => Helper::MveVstrw,
            (0, true) => Helper::MveVldrb,
            (1, true) => Helper::MveVldrh,
            (2, true) => Helper::MveVldrw,
            _ => return Outcome::Declined,
        };
        let qd = ir.new_const(Type::I32, a.qd as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, h.id(), &[qd, addr]);
        // Writeback happens after the last beat regardless of
        // predication.
        if a.w != 0 {
            if a.p == 0 {
                let c = ir.new_const(Type::I32, offset as u32 as u64);
                ir.gen_add(Type::I32, addr, addr, c);
            }
            self.store_reg(ir, a.rn as usize, addr);
        }
        self.mve_update_eci();
        Outcome::Handled
    }

    fn trans_VADD_mve(&mut self, ir: &mut Context, a: &ArgsV3op) -> Outcome {
        self.op_mve_3op(
            ir,
            a,
            [Helper::MveVaddB, Helper::MveVaddH, Helper::MveVaddW],
        )
    }

    fn trans_VSUB_mve(&mut self, ir: &mut Context, a: &ArgsV3op) -> Outcome {
        self.op_mve_3op(
            ir,
            a,
            [Helper::MveVsubB, Helper::MveVsubH, Helper::MveVsubW],
        )
    }

    fn trans_VMUL_mve(&mut self, ir: &mut Context, a: &ArgsV3op) -> Outcome {
        self.op_mve_3op(
            ir,
            a,
            [Helper::MveVmulB, Helper::MveVmulH, Helper::MveVmulW],
        )
    }

    fn trans_VDUP_mve(&mut self, ir: &mut Context, a: &ArgsVdup) -> Outcome {
        if a.rt == 13 || a.rt == 15 {
            return Outcome::Declined;
        }
        if let Err(out) = self.mve_check(ir) {
            return out;
        }
        let h = match a.size {
            0 => Helper::MveVdupB,
            1 => Helper::MveVdupH,
            2 => Helper::MveVdupW,
            _ => return Outcome::Declined,
        };
        let qd = ir.new_const(Type::I32, a.qd as u64);
        let rt = self.load_reg(ir, a.rt as usize);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, h.id(), &[qd, rt]);
        self.mve_update_eci();
        Outcome::Handled
    }

    fn trans_VPNOT(&mut self, ir: &mut Context, _a: &ArgsEmpty) -> Outcome {
        if !self.feature(ArmFeatures::MVE) {
            return Outcome::Declined;
        }
        // VPNOT leaves ECI untouched.
        self.eci_handled = true;
        if let Err(f) = self.vfp_access_check(ir) {
            return Outcome::Faulted(f);
        }
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, Helper::MveVpnot.id(), &[]);
        Outcome::Handled
    }

    fn trans_VPST(&mut self, ir: &mut Context, a: &ArgsVpst) -> Outcome {
        if a.mask == 0 {
            return Outcome::Declined;
        }
        if let Err(out) = self.mve_check(ir) {
            return out;
        }
        // Seed VPR.MASK01/MASK23 for the following predicated
        // block. Re-seeding on a beatwise resume is idempotent: the
        // completed beats already consumed their mask bits through
        // the helpers.
        let vpr = self.load_cpu_field(ir, cpu::VPR_OFFSET);
        let mask = ir.new_const(Type::I32, a.mask as u64);
        ir.gen_deposit(Type::I32, vpr, vpr, mask, 16, 4);
        ir.gen_deposit(Type::I32, vpr, vpr, mask, 20, 4);
        self.store_cpu_field(ir, vpr, cpu::VPR_OFFSET);
        self.mve_update_and_store_eci(ir);
        Outcome::Handled
    }
}

impl<'a> A32DisasContext<'a> {
    fn op_mve_3op(
        &mut self,
        ir: &mut Context,
        a: &ArgsV3op,
        helpers: [Helper; 3],
    ) -> Outcome {
        if a.size > 2 {
            return Outcome::Declined;
        }
        if let Err(out) = self.mve_check(ir) {
            return out;
        }
        let h = helpers[a.size as usize];
        let qd = ir.new_const(Type::I32, a.qd as u64);
        let qn = ir.new_const(Type::I32, a.qn as u64);
        let qm = ir.new_const(Type::I32, a.qm as u64);
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, h.id(), &[qd, qn, qm]);
        self.mve_update_eci();
        Outcome::Handled
    }
}
