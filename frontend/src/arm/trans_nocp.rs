//! M-profile coprocessor-absent trap handlers. These run before any
//! other 32-bit Thumb decode so that a disabled FP/vector unit traps
//! in preference to whatever the encoding would otherwise mean.

use a32t_core::{Context, Type};

use super::cpu::ArmFeatures;
use super::helper::Helper;
use super::insn_decode::nocp::{self, *};
use super::A32DisasContext;
use crate::{DisasJumpType, Fault, Outcome};

#[allow(non_snake_case)]
impl<'a> nocp::Decode<Context> for A32DisasContext<'a> {
    fn trans_VLLDM_VLSTM(
        &mut self,
        ir: &mut Context,
        a: &ArgsVlldm,
    ) -> Outcome {
        if !self.feature(ArmFeatures::M) || !self.feature(ArmFeatures::V8) {
            return Outcome::Declined;
        }
        if a.rn == 15 {
            return Outcome::Faulted(Fault::UnpredictableUndef);
        }
        if !self.flags.v8m_secure {
            // From Non-secure state these execute as NOPs.
            return Outcome::Handled;
        }
        if !self.feature(ArmFeatures::VFP) {
            return Outcome::Handled;
        }
        let fptr = self.load_reg(ir, a.rn as usize);
        let h = if a.l != 0 {
            Helper::V7mVlldm
        } else {
            Helper::V7mVlstm
        };
        let dead = ir.new_temp(Type::I32);
        ir.gen_call(dead, h.id(), &[fptr]);
        // The lazy-FP state machine changed: force retranslation of
        // what follows.
        self.base.is_jmp = DisasJumpType::UpdateExit;
        Outcome::Handled
    }

    fn trans_NOCP(&mut self, _ir: &mut Context, a: &ArgsNocp) -> Outcome {
        if !self.feature(ArmFeatures::M) {
            return Outcome::Declined;
        }
        let mut cp = a.cp;
        // cp11 aliases cp10 for FP, and from v8.1M the whole 8..15
        // range decodes as the FP/vector unit.
        if cp == 11 {
            cp = 10;
        }
        if self.feature(ArmFeatures::V8_1M) && (8..=15).contains(&cp) {
            cp = 10;
        }
        if cp != 10 {
            // No such coprocessor on M profile.
            return Outcome::Faulted(Fault::Nocp {
                secure: self.flags.v8m_secure,
            });
        }
        if !self.feature(ArmFeatures::VFP) && !self.feature(ArmFeatures::MVE) {
            return Outcome::Faulted(Fault::Nocp {
                secure: self.flags.v8m_secure,
            });
        }
        if !self.flags.vfp_enabled {
            return Outcome::Faulted(Fault::Nocp {
                secure: self.flags.v8m_secure,
            });
        }
        // Unit present and enabled: let the real decoders see the
        // instruction.
        Outcome::Declined
    }
}
