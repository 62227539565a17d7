//! Generated decoders — included from build.rs output. Each decode
//! file becomes its own module so argument-struct and trait names
//! stay scoped per instruction-set family.

use a32t_core::Context;

use super::A32DisasContext;
use crate::Outcome;

pub mod a32 {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/a32_decode.rs"));
}

pub mod a32_uncond {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/a32_uncond_decode.rs"));
}

pub mod t32 {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/t32_decode.rs"));
}

pub mod t16 {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/t16_decode.rs"));
}

pub mod vfp {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/vfp_decode.rs"));
}

pub mod mve {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/mve_decode.rs"));
}

pub mod nocp {
    use crate::Outcome;
    include!(concat!(env!("OUT_DIR"), "/m_nocp_decode.rs"));
}

pub fn decode_a32(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    a32::decode(ctx, ir, insn)
}

pub fn decode_a32_uncond(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    a32_uncond::decode(ctx, ir, insn)
}

pub fn decode_t32(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    t32::decode(ctx, ir, insn)
}

pub fn decode_t16(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u16,
) -> Outcome {
    t16::decode16(ctx, ir, insn)
}

pub fn decode_vfp(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    vfp::decode(ctx, ir, insn)
}

pub fn decode_mve(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    mve::decode(ctx, ir, insn)
}

pub fn decode_nocp(
    ctx: &mut A32DisasContext<'_>,
    ir: &mut Context,
    insn: u32,
) -> Outcome {
    nocp::decode(ctx, ir, insn)
}
