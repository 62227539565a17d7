//! Register-based IR for AArch32 binary translation.
//!
//! This crate defines the operation vocabulary, temporaries, labels
//! and the per-block emission context that the frontend fills in and
//! a code-generating consumer drains. It knows nothing about the
//! guest instruction set.

pub mod context;
pub mod dump;
pub mod ir_builder;
pub mod label;
pub mod op;
pub mod opcode;
pub mod tb;
pub mod temp;
pub mod types;

pub use context::Context;
pub use label::Label;
pub use op::{Op, OpIdx, MAX_OP_ARGS};
pub use opcode::{OpDef, OpFlags, Opcode, OPCODE_DEFS};
pub use tb::TranslationBlock;
pub use temp::{Temp, TempIdx, TempKind};
pub use types::{Cond, MemOp, Type};
