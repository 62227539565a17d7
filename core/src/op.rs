use crate::opcode::Opcode;
use crate::temp::TempIdx;
use crate::types::Type;

/// Maximum number of arguments per IR operation.
pub const MAX_OP_ARGS: usize = 8;

/// Index into the Context's op list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpIdx(pub u32);

/// A single IR operation.
///
/// Each op has an opcode, a type (for polymorphic ops) and up to
/// MAX_OP_ARGS arguments. Arguments are output temps first, then
/// input temps, then constant parameters (label ids, field offsets,
/// helper ids), with the split defined by the opcode's `OpDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub idx: OpIdx,
    pub opc: Opcode,
    /// Operand type for type-polymorphic ops (I32 or I64).
    pub op_type: Type,
    /// Arguments: temp indices, label ids, or encoded immediates.
    pub args: [TempIdx; MAX_OP_ARGS],
    pub nargs: u8,
}

impl Op {
    pub fn new(idx: OpIdx, opc: Opcode, op_type: Type) -> Self {
        Self {
            idx,
            opc,
            op_type,
            args: [TempIdx(0); MAX_OP_ARGS],
            nargs: 0,
        }
    }

    pub fn with_args(
        idx: OpIdx,
        opc: Opcode,
        op_type: Type,
        args: &[TempIdx],
    ) -> Self {
        let mut op = Self::new(idx, opc, op_type);
        let n = args.len().min(MAX_OP_ARGS);
        op.args[..n].copy_from_slice(&args[..n]);
        op.nargs = n as u8;
        op
    }

    /// Get the output arguments slice (based on opcode definition).
    pub fn oargs(&self) -> &[TempIdx] {
        let n = self.opc.def().nb_oargs as usize;
        &self.args[..n]
    }

    /// Get the input arguments slice.
    pub fn iargs(&self) -> &[TempIdx] {
        let def = self.opc.def();
        let start = def.nb_oargs as usize;
        let end = start + def.nb_iargs as usize;
        &self.args[start..end]
    }

    /// Get the constant arguments slice.
    pub fn cargs(&self) -> &[TempIdx] {
        let def = self.opc.def();
        let start = (def.nb_oargs + def.nb_iargs) as usize;
        let end = start + def.nb_cargs as usize;
        &self.args[start..end]
    }
}
