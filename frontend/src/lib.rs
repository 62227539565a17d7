//! AArch32 frontend — guest instruction decoding and IR generation.
//!
//! Provides the generic translation framework (`TranslatorOps` trait
//! and `translator_loop`), the guest-memory and configuration
//! interfaces, and the ARM/Thumb translators themselves under
//! [`arm`].

pub mod arm;

use a32t_core::Context;
use thiserror::Error;

// ---------------------------------------------------------------
// Handler outcome / fault taxonomy
// ---------------------------------------------------------------

/// Guest-visible faults a handler can signal instead of emitting a
/// normal result. Each lowers to exception-raising IR that ends the
/// block at the faulting instruction; none of them abort translation
/// of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// Encoding not implemented or not present on this core.
    #[error("undefined instruction")]
    Undefined,
    /// Architecturally UNPREDICTABLE; resolved to undefined by policy.
    #[error("unpredictable encoding (resolved to undefined)")]
    UnpredictableUndef,
    /// Hole in the encoding space.
    #[error("unallocated encoding")]
    UnallocatedEncoding,
    /// M-profile coprocessor-disabled trap. `secure` selects the
    /// security state the UsageFault is routed to.
    #[error("coprocessor access disabled")]
    Nocp { secure: bool },
    /// A-profile FP/SIMD access trap (unit disabled).
    #[error("fp access trap")]
    FpAccess,
    /// Reserved beatwise-continuation state, or a continuation-
    /// unaware instruction reached while continuation state is live.
    #[error("illegal continuation state")]
    Invstate,
    /// Architecturally-illegal mode/state combination.
    #[error("illegal execution state")]
    IllegalState,
    /// Instruction fetch address violates the mode's alignment.
    #[error("pc alignment fault")]
    PcAlignment,
    /// Instruction fetch failed in the backing store.
    #[error("prefetch abort")]
    PrefetchAbort,
}

/// Three-way result of a semantic handler.
///
/// `Declined` means "this handler does not apply" and lets the
/// caller fall through to the next decoder family; it is not an
/// error by itself — only the outermost driver turns an
/// all-families decline into an undefined-instruction fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Declined,
    Faulted(Fault),
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        matches!(self, Outcome::Handled)
    }
}

// ---------------------------------------------------------------
// External interfaces
// ---------------------------------------------------------------

/// Failure reading the guest-memory snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemFault {
    #[error("no mapping at guest address {addr:#010x}")]
    Unmapped { addr: u32 },
}

/// Read-only view of the guest-memory snapshot the unit is
/// translated against. The translator never writes guest memory,
/// and the caller guarantees the snapshot is not mutated while a
/// translation that reads it is in flight.
pub trait CodeMemory {
    fn read_u16(&self, addr: u32) -> Result<u16, MemFault>;
    fn read_u32(&self, addr: u32) -> Result<u32, MemFault>;
}

/// Flat little-endian code image, for tests and tools.
pub struct FlatImage {
    base: u32,
    bytes: Vec<u8>,
}

impl FlatImage {
    pub fn new(base: u32, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    fn slice(&self, addr: u32, len: usize) -> Result<&[u8], MemFault> {
        let off = addr.wrapping_sub(self.base) as usize;
        self.bytes
            .get(off..off + len)
            .ok_or(MemFault::Unmapped { addr })
    }
}

impl CodeMemory for FlatImage {
    fn read_u16(&self, addr: u32) -> Result<u16, MemFault> {
        let b = self.slice(addr, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&self, addr: u32) -> Result<u32, MemFault> {
        let b = self.slice(addr, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Error translating a unit. Only produced for conditions that
/// prevent the unit from being built at all; guest-visible faults
/// become IR inside a successfully built unit instead.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("cannot fetch first instruction: {0}")]
    EntryFetch(#[from] MemFault),
}

// ---------------------------------------------------------------
// Generic translation framework
// ---------------------------------------------------------------

/// Block termination reason, set while translating an instruction
/// and consumed by the control-flow terminator in `tb_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisasJumpType {
    /// Continue to the next sequential instruction.
    Next,
    /// Budget or page limit reached; fall through to the next unit.
    TooMany,
    /// PC was written with a computed value — indirect lookup.
    Jump,
    /// CPU state changed such that chaining is unsafe: update PC,
    /// exit to the loop.
    UpdateExit,
    /// As UpdateExit, but the PC was already written (exception
    /// return, mode-changing helpers).
    Exit,
    /// Update PC, then indirect lookup without chaining.
    UpdateNochain,
    /// Block already fully terminated (branch taken, exception
    /// raised); emit nothing further.
    NoReturn,
    /// PC write that may be an exception-return magic value;
    /// resolved by a range test at block close.
    BxExcret,
    /// Wait-for-interrupt halt.
    Wfi,
    /// Wait-for-event.
    Wfe,
    /// Yield to the scheduler.
    Yield,
    /// Software interrupt (SVC).
    Swi,
    /// Hypervisor call.
    Hvc,
    /// Secure monitor call.
    Smc,
}

/// Base context shared by all translators.
pub struct DisasContextBase {
    /// PC of the first instruction in this block.
    pub pc_first: u32,
    /// PC of the *next* instruction to decode.
    pub pc_next: u32,
    /// How the current instruction terminates.
    pub is_jmp: DisasJumpType,
    /// Number of guest instructions translated so far.
    pub num_insns: u32,
    /// Maximum instructions allowed in one block.
    pub max_insns: u32,
}

/// Per-mode translation operations.
pub trait TranslatorOps {
    /// Mode-specific disassembly context.
    type DisasContext;

    /// One-time setup before the translation loop.
    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Called once at the start of the block (after init).
    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Emit the `insn_start` marker for the current guest PC.
    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Decode and translate one guest instruction.
    ///
    /// Must advance `base().pc_next` and set `base().is_jmp` when
    /// the instruction terminates the block.
    fn translate_insn(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Emit the block epilogue (the control-flow terminator).
    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Access the base context embedded in the mode context.
    fn base(ctx: &Self::DisasContext) -> &DisasContextBase;

    /// Mutable access to the base context.
    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase;
}

/// Generic translation loop — drives the decode → translate cycle
/// until an instruction ends the block or the budget runs out.
pub fn translator_loop<T: TranslatorOps>(
    ctx: &mut T::DisasContext,
    ir: &mut Context,
) {
    T::init_disas_context(ctx, ir);
    T::tb_start(ctx, ir);

    loop {
        T::insn_start(ctx, ir);
        T::translate_insn(ctx, ir);

        let base = T::base(ctx);
        if base.is_jmp != DisasJumpType::Next {
            break;
        }
        if base.num_insns >= base.max_insns {
            T::base_mut(ctx).is_jmp = DisasJumpType::TooMany;
            break;
        }
    }

    T::tb_stop(ctx, ir);
}
