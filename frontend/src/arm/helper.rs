//! External helper vocabulary.
//!
//! Operations too complex to express as primitive IR lower to a
//! `call` op carrying one of these ids. The consumer resolves ids
//! to its own implementations; the environment pointer is an
//! implicit first argument of every helper.

/// Helper ids carried in the `call` op's constant argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Helper {
    // -- PSR access --
    /// cpsr_read() -> u32
    CpsrRead = 0,
    /// cpsr_write(value, mask)
    CpsrWrite,
    /// cpsr_write_eret(): restore CPSR from SPSR for an
    /// exception-return data-processing instruction.
    CpsrWriteEret,
    /// v7m_msr(reg, value)
    V7mMsr,
    /// v7m_mrs(reg) -> u32
    V7mMrs,

    // -- Exceptions --
    /// exception_internal(excp)
    ExceptionInternal,
    /// exception_with_syndrome(excp, syndrome)
    Exception,
    /// exception_with_syndrome_el(excp, syndrome, target_el)
    ExceptionEl,
    /// exception_pc_alignment(pc)
    ExceptionPcAlignment,
    /// exception_bkpt_insn(syndrome)
    ExceptionBkpt,
    /// exception_swstep(syndrome)
    ExceptionSwstep,

    // -- Hints --
    Wfi,
    Wfe,
    Yield,

    // -- Flag-setting register shifts --
    /// shl_cc(value, amount) -> u32, updates CF
    ShlCc,
    ShrCc,
    SarCc,
    RorCc,

    // -- Saturating arithmetic (all set QF on saturation) --
    /// add_saturate(a, b) -> u32
    AddSaturate,
    SubSaturate,
    /// add_setq(a, b) -> u32: wrapping add that sets QF on overflow
    AddSetq,
    /// double_saturate(a) -> u32
    DoubleSaturate,
    /// ssat(value, width) -> u32
    Ssat,
    Usat,
    Ssat16,
    Usat16,

    // -- Integer division (div-by-zero yields 0, no trap) --
    Sdiv,
    Udiv,

    // -- Parallel add/sub and misc DSP --
    /// sel_flags(ge, a, b) -> u32
    SelFlags,
    Usad8,
    Rbit,

    // -- v8M specials --
    /// v8m_stackcheck(new_sp)
    V8mStackcheck,
    /// v7m_preserve_fp_state()
    V7mPreserveFpState,
    /// v7m_update_fp_ctxt(): fix FPCCR.S and create a new FP
    /// context on first FP use after a security-state change.
    V7mUpdateFpCtxt,
    /// v7m_vlldm(fptr)
    V7mVlldm,
    /// v7m_vlstm(fptr)
    V7mVlstm,

    // -- VFP scalar arithmetic --
    VfpAddS,
    VfpAddD,
    VfpSubS,
    VfpSubD,
    VfpMulS,
    VfpMulD,
    VfpDivS,
    VfpDivD,
    VfpGetFpscr,
    VfpSetFpscr,

    // -- MVE beatwise operations --
    MveVldrb,
    MveVldrh,
    MveVldrw,
    MveVstrb,
    MveVstrh,
    MveVstrw,
    MveVaddB,
    MveVaddH,
    MveVaddW,
    MveVsubB,
    MveVsubH,
    MveVsubW,
    MveVmulB,
    MveVmulH,
    MveVmulW,
    MveVdupB,
    MveVdupH,
    MveVdupW,
    MveVpnot,
    MveVctp,
}

impl Helper {
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Stable name for dumps and consumer-side resolution.
    pub fn name(self) -> &'static str {
        use Helper::*;
        match self {
            CpsrRead => "cpsr_read",
            CpsrWrite => "cpsr_write",
            CpsrWriteEret => "cpsr_write_eret",
            V7mMsr => "v7m_msr",
            V7mMrs => "v7m_mrs",
            ExceptionInternal => "exception_internal",
            Exception => "exception_with_syndrome",
            ExceptionEl => "exception_with_syndrome_el",
            ExceptionPcAlignment => "exception_pc_alignment",
            ExceptionBkpt => "exception_bkpt_insn",
            ExceptionSwstep => "exception_swstep",
            Wfi => "wfi",
            Wfe => "wfe",
            Yield => "yield",
            ShlCc => "shl_cc",
            ShrCc => "shr_cc",
            SarCc => "sar_cc",
            RorCc => "ror_cc",
            AddSaturate => "add_saturate",
            SubSaturate => "sub_saturate",
            AddSetq => "add_setq",
            DoubleSaturate => "double_saturate",
            Ssat => "ssat",
            Usat => "usat",
            Ssat16 => "ssat16",
            Usat16 => "usat16",
            Sdiv => "sdiv",
            Udiv => "udiv",
            SelFlags => "sel_flags",
            Usad8 => "usad8",
            Rbit => "rbit",
            V8mStackcheck => "v8m_stackcheck",
            V7mPreserveFpState => "v7m_preserve_fp_state",
            V7mUpdateFpCtxt => "v7m_update_fp_ctxt",
            V7mVlldm => "v7m_vlldm",
            V7mVlstm => "v7m_vlstm",
            VfpAddS => "vfp_adds",
            VfpAddD => "vfp_addd",
            VfpSubS => "vfp_subs",
            VfpSubD => "vfp_subd",
            VfpMulS => "vfp_muls",
            VfpMulD => "vfp_muld",
            VfpDivS => "vfp_divs",
            VfpDivD => "vfp_divd",
            VfpGetFpscr => "vfp_get_fpscr",
            VfpSetFpscr => "vfp_set_fpscr",
            MveVldrb => "mve_vldrb",
            MveVldrh => "mve_vldrh",
            MveVldrw => "mve_vldrw",
            MveVstrb => "mve_vstrb",
            MveVstrh => "mve_vstrh",
            MveVstrw => "mve_vstrw",
            MveVaddB => "mve_vaddb",
            MveVaddH => "mve_vaddh",
            MveVaddW => "mve_vaddw",
            MveVsubB => "mve_vsubb",
            MveVsubH => "mve_vsubh",
            MveVsubW => "mve_vsubw",
            MveVmulB => "mve_vmulb",
            MveVmulH => "mve_vmulh",
            MveVmulW => "mve_vmulw",
            MveVdupB => "mve_vdupb",
            MveVdupH => "mve_vduph",
            MveVdupW => "mve_vdupw",
            MveVpnot => "mve_vpnot",
            MveVctp => "mve_vctp",
        }
    }
}
