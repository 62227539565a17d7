//! AArch32 CPU state layout and configuration snapshot.

use bitflags::bitflags;

/// Number of core registers (r0-r15).
pub const NUM_REGS: usize = 16;
/// Number of double-precision FP registers (d0-d31).
pub const NUM_VFP_DREGS: usize = 32;

/// AArch32 CPU architectural state, as seen by generated code.
///
/// Layout must be `#[repr(C)]` so that IR global temps can reference
/// fields at fixed byte offsets from the env pointer. The NZCV flags
/// are kept in split form: each flag field is "interesting bit"
/// oriented (N and V in bit 31, C and Z as zero/non-zero), which
/// keeps flag-setting code short and condition tests cheap.
#[repr(C)]
pub struct CpuState {
    /// Core registers r0-r15. r15 is the PC.
    pub regs: [u32; NUM_REGS],
    /// Negative flag: bit 31 holds N.
    pub nf: u32,
    /// Zero flag: zero means Z set.
    pub zf: u32,
    /// Carry flag: 0 or 1.
    pub cf: u32,
    /// Overflow flag: bit 31 holds V.
    pub vf: u32,
    /// Sticky saturation flag (Q): non-zero means set.
    pub qf: u32,
    /// SIMD GE bits (one per byte lane).
    pub ge: u32,
    /// Thumb execution state bit.
    pub thumb: u32,
    /// IT/ECI bits in CPSR layout ([7:5] cond, [4:0] mask, or ECI).
    pub condexec_bits: u32,
    /// Exclusive-monitor address (-1 = no reservation).
    pub exclusive_addr: u32,
    /// Exclusive-monitor data value.
    pub exclusive_val: u32,
    /// MVE vector predication status register.
    pub vpr: u32,
    /// FP status and control register.
    pub fpscr: u32,
    /// FP/vector registers d0-d31 (raw bits). Single-precision s2i
    /// and s2i+1 alias the low/high halves of d_i; MVE q_i covers
    /// d2i and d2i+1.
    pub vfp_regs: [u64; NUM_VFP_DREGS],
}

impl CpuState {
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGS],
            nf: 0,
            zf: 1, // Z clear
            cf: 0,
            vf: 0,
            qf: 0,
            ge: 0,
            thumb: 0,
            condexec_bits: 0,
            exclusive_addr: u32::MAX,
            exclusive_val: 0,
            vpr: 0,
            fpscr: 0,
            vfp_regs: [0; NUM_VFP_DREGS],
        }
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

// Field offsets (bytes) from the start of CpuState.
// Used by `Context::new_global()` and `gen_ld`/`gen_st` to bind IR
// temps and field accesses.

/// Byte offset of `regs[i]`.
pub const fn reg_offset(i: usize) -> i64 {
    (i * 4) as i64
}

pub const NF_OFFSET: i64 = (NUM_REGS * 4) as i64; // 64
pub const ZF_OFFSET: i64 = NF_OFFSET + 4; // 68
pub const CF_OFFSET: i64 = ZF_OFFSET + 4; // 72
pub const VF_OFFSET: i64 = CF_OFFSET + 4; // 76
pub const QF_OFFSET: i64 = VF_OFFSET + 4; // 80
pub const GE_OFFSET: i64 = QF_OFFSET + 4; // 84
pub const THUMB_OFFSET: i64 = GE_OFFSET + 4; // 88
pub const CONDEXEC_OFFSET: i64 = THUMB_OFFSET + 4; // 92
pub const EXCLUSIVE_ADDR_OFFSET: i64 = CONDEXEC_OFFSET + 4; // 96
pub const EXCLUSIVE_VAL_OFFSET: i64 = EXCLUSIVE_ADDR_OFFSET + 4; // 100
pub const VPR_OFFSET: i64 = EXCLUSIVE_VAL_OFFSET + 4; // 104
pub const FPSCR_OFFSET: i64 = VPR_OFFSET + 4; // 108
pub const VFP_REGS_OFFSET: i64 = FPSCR_OFFSET + 4; // 112

/// Byte offset of double-precision register `d<i>`.
pub const fn vfp_dreg_offset(i: usize) -> i64 {
    VFP_REGS_OFFSET + (i * 8) as i64
}

/// Byte offset of single-precision register `s<i>` (little-endian
/// overlay of the d registers).
pub const fn vfp_sreg_offset(i: usize) -> i64 {
    VFP_REGS_OFFSET + (i * 4) as i64
}

/// Byte offset of MVE vector register `q<i>`.
pub const fn mve_qreg_offset(i: usize) -> i64 {
    vfp_dreg_offset(i * 2)
}

bitflags! {
    /// Architecture/extension feature set of the configured core.
    ///
    /// Later architecture versions imply earlier ones; the
    /// constructor helpers below fill in the implications so
    /// handlers can test single bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ArmFeatures: u32 {
        const V4T      = 1 << 0;
        const V5       = 1 << 1;
        const V6       = 1 << 2;
        const V6K      = 1 << 3;
        const V6T2     = 1 << 4;
        const V7       = 1 << 5;
        const V8       = 1 << 6;
        const THUMB2   = 1 << 7;
        /// M profile (microcontroller) — no ARM mode.
        const M        = 1 << 8;
        const M_MAIN   = 1 << 9;
        const M_SECURITY = 1 << 10;
        const V8_1M    = 1 << 11;
        /// FP present (VFPv4-class scalar FP).
        const VFP      = 1 << 12;
        /// Double-precision supported.
        const FP64     = 1 << 13;
        /// M-profile vector extension.
        const MVE      = 1 << 14;
        /// Integer divide in Thumb encodings.
        const DIV_THUMB = 1 << 15;
        /// Integer divide in ARM encodings.
        const DIV_ARM  = 1 << 16;
        /// Low-overhead branches (DLS/WLS/LE).
        const LOB      = 1 << 17;
        const EL2      = 1 << 18;
        const EL3      = 1 << 19;
    }
}

impl ArmFeatures {
    /// A-profile v7 application core with Thumb-2 and VFP.
    pub fn v7a() -> Self {
        Self::V4T
            | Self::V5
            | Self::V6
            | Self::V6K
            | Self::V6T2
            | Self::V7
            | Self::THUMB2
            | Self::VFP
            | Self::FP64
    }

    /// A-profile v8 core (AArch32 state).
    pub fn v8a() -> Self {
        Self::v7a() | Self::V8 | Self::DIV_THUMB | Self::DIV_ARM
    }

    /// v8.1-M mainline core with MVE and low-overhead branches.
    pub fn v8_1m() -> Self {
        Self::V4T
            | Self::V5
            | Self::V6
            | Self::V6T2
            | Self::V7
            | Self::V8
            | Self::THUMB2
            | Self::M
            | Self::M_MAIN
            | Self::V8_1M
            | Self::VFP
            | Self::MVE
            | Self::DIV_THUMB
            | Self::LOB
    }
}

/// Translation-relevant CPU state snapshot, sampled by the caller
/// before translation begins. Read-only for the duration of the
/// unit; hashed into `TranslationBlock::flags` so stale units are
/// distinguishable.
#[derive(Debug, Clone, Copy)]
pub struct TbFlags {
    pub features: ArmFeatures,
    /// Thumb execution state.
    pub thumb: bool,
    /// CPSR IT/ECI bits ([7:5]<<4 | [4:0] packed as cond<<4|mask>>1,
    /// i.e. the architectural CONDEXEC layout).
    pub condexec: u32,
    /// Current exception level (0 = user).
    pub current_el: u32,
    /// Byte-swap code fetches (BE32-style code endianness).
    pub bswap_code: bool,
    /// Byte-swap data accesses.
    pub be_data: bool,
    /// FP/vector unit enabled (CPACR/NSACR/FPEXC outcome).
    pub vfp_enabled: bool,
    /// M profile: executing in Handler mode.
    pub v7m_handler_mode: bool,
    /// M profile: Secure state.
    pub v8m_secure: bool,
    /// M profile: SP limit checking enabled.
    pub v8m_stackcheck: bool,
    /// M profile: lazy FP state preservation is active.
    pub v7m_lspact: bool,
    /// M profile: FPCCR.S does not match current security state.
    pub v8m_fpccr_s_wrong: bool,
    /// M profile: a new FP context must be created on first FP use.
    pub v7m_new_fp_ctxt_needed: bool,
    /// MVE: no active predication (VPR == 0 and no ECI).
    pub mve_no_pred: bool,
    /// Debug: single-step active.
    pub ss_active: bool,
    /// Debug: PSTATE.SS (active-not-pending when true).
    pub pstate_ss: bool,
    /// PSTATE.IL — illegal execution state.
    pub pstate_il: bool,
}

impl TbFlags {
    pub fn new(features: ArmFeatures) -> Self {
        Self {
            features,
            thumb: false,
            condexec: 0,
            current_el: 0,
            bswap_code: false,
            be_data: false,
            vfp_enabled: true,
            v7m_handler_mode: false,
            v8m_secure: false,
            v8m_stackcheck: false,
            v7m_lspact: false,
            v8m_fpccr_s_wrong: false,
            v7m_new_fp_ctxt_needed: false,
            mve_no_pred: false,
            ss_active: false,
            pstate_ss: false,
            pstate_il: false,
        }
    }

    /// Pack the fields that distinguish translations into a single
    /// word for `TranslationBlock::flags`.
    pub fn hash(&self) -> u32 {
        let mut h: u32 = self.features.bits();
        h = h.rotate_left(7) ^ self.condexec;
        h = h.rotate_left(7) ^ self.current_el;
        let mut bits = 0u32;
        for (i, b) in [
            self.thumb,
            self.bswap_code,
            self.be_data,
            self.vfp_enabled,
            self.v7m_handler_mode,
            self.v8m_secure,
            self.v8m_stackcheck,
            self.v7m_lspact,
            self.v8m_fpccr_s_wrong,
            self.v7m_new_fp_ctxt_needed,
            self.mve_no_pred,
            self.ss_active,
            self.pstate_ss,
            self.pstate_il,
        ]
        .into_iter()
        .enumerate()
        {
            bits |= (b as u32) << i;
        }
        h.rotate_left(11) ^ bits
    }
}

/// Exception numbers passed to the exception-raising helpers.
pub mod excp {
    pub const UDEF: u32 = 1;
    pub const SWI: u32 = 2;
    pub const PREFETCH_ABORT: u32 = 3;
    pub const BKPT: u32 = 7;
    pub const EXCEPTION_EXIT: u32 = 8;
    pub const HVC: u32 = 11;
    pub const SMC: u32 = 13;
    pub const INVSTATE: u32 = 18;
    pub const NOCP: u32 = 19;
    pub const STEP: u32 = 24;
}

/// Exception syndrome construction (ESR_ELx encoding: EC in
/// [31:26], IL in bit 25, ISS below).
pub mod syn {
    const fn esr(ec: u32, il: bool, iss: u32) -> u32 {
        (ec << 26) | ((il as u32) << 25) | iss
    }

    pub const fn uncategorized() -> u32 {
        esr(0x00, true, 0)
    }

    pub const fn illegalstate() -> u32 {
        esr(0x0e, true, 0)
    }

    pub const fn aa32_svc(imm16: u32, is_16bit: bool) -> u32 {
        esr(0x11, !is_16bit, imm16 & 0xffff)
    }

    pub const fn aa32_hvc(imm16: u32) -> u32 {
        esr(0x12, true, imm16 & 0xffff)
    }

    pub const fn aa32_smc() -> u32 {
        esr(0x13, true, 0)
    }

    pub const fn aa32_bkpt(imm16: u32, is_16bit: bool) -> u32 {
        esr(0x38, !is_16bit, imm16 & 0xffff)
    }

    /// FP/SIMD access trap (EC 0x07), coproc number in the ISS.
    pub const fn fp_access_trap(cv: bool, cond: u32, is_16bit: bool) -> u32 {
        esr(0x07, !is_16bit, ((cv as u32) << 24) | ((cond & 0xf) << 20) | 0xa)
    }

    /// Software-step exception.
    pub const fn swstep(isv: bool, ex: bool) -> u32 {
        esr(0x32, true, ((isv as u32) << 24) | ((ex as u32) << 6) | 0x22)
    }

    pub const fn pcalignment() -> u32 {
        esr(0x22, true, 0)
    }
}

/// Exception-return magic value thresholds for M-profile cores.
/// A PC written from a register compares against one of these at
/// block close to detect exception returns (FNC_RETURN covers the
/// function-return range used by the Security Extension).
pub const EXC_RETURN_MIN_MAGIC: u32 = 0xff00_0000;
pub const FNC_RETURN_MIN_MAGIC: u32 = 0xfeff_fffe;
