use std::collections::HashMap;

use crate::label::Label;
use crate::op::{Op, OpIdx};
use crate::temp::{Temp, TempIdx, TempKind};
use crate::types::{Type, TYPE_COUNT};

/// Maximum number of temps per translation context.
pub const MAX_TEMPS: usize = 512;
/// Maximum number of guest instructions per translation block.
pub const MAX_INSNS: usize = 512;

/// Per-unit IR emission context.
///
/// Holds all state produced while translating a single translation
/// block: temporaries, the append-only op list, and labels. The
/// whole context is handed to the consumer at block close; dropping
/// it abandons the block with no partial commit.
pub struct Context {
    temps: Vec<Temp>,
    ops: Vec<Op>,
    labels: Vec<Label>,

    /// Number of global temps (always at the front of `temps`).
    nb_globals: u32,

    /// Per-type hash map from constant value to TempIdx,
    /// avoiding duplicate const temps.
    const_table: [HashMap<u64, TempIdx>; TYPE_COUNT],
}

impl Context {
    pub fn new() -> Self {
        Self {
            temps: Vec::with_capacity(256),
            ops: Vec::with_capacity(512),
            labels: Vec::with_capacity(32),
            nb_globals: 0,
            const_table: Default::default(),
        }
    }

    /// Reset context for translating a new block. Everything is
    /// discarded, globals included — the frontend re-registers its
    /// bindings at the start of each block.
    pub fn reset(&mut self) {
        self.temps.clear();
        self.ops.clear();
        self.labels.clear();
        self.nb_globals = 0;
        for table in &mut self.const_table {
            table.clear();
        }
    }

    // -- Temp allocation --

    pub fn nb_globals(&self) -> u32 {
        self.nb_globals
    }

    pub fn nb_temps(&self) -> u32 {
        self.temps.len() as u32
    }

    /// Allocate a new EBB-scoped temporary.
    pub fn new_temp(&mut self, ty: Type) -> TempIdx {
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(Temp::new_ebb(idx, ty));
        idx
    }

    /// Allocate a new TB-scoped temporary.
    pub fn new_temp_tb(&mut self, ty: Type) -> TempIdx {
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(Temp::new_tb(idx, ty));
        idx
    }

    /// Get or create a constant temp (deduplicated per type).
    pub fn new_const(&mut self, ty: Type, val: u64) -> TempIdx {
        let type_idx = ty as usize;
        if let Some(&existing) = self.const_table[type_idx].get(&val) {
            return existing;
        }
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(Temp::new_const(idx, ty, val));
        self.const_table[type_idx].insert(val, idx);
        idx
    }

    /// Register a global temp (must be called before any
    /// non-global allocation).
    /// The `base` is the TempIdx of the env pointer (a fixed temp).
    pub fn new_global(
        &mut self,
        ty: Type,
        base: TempIdx,
        offset: i64,
        name: &'static str,
    ) -> TempIdx {
        assert_eq!(
            self.temps.len() as u32,
            self.nb_globals,
            "globals must be registered before locals"
        );
        let idx = TempIdx(self.temps.len() as u32);
        self.temps
            .push(Temp::new_global(idx, ty, base, offset, name));
        self.nb_globals += 1;
        idx
    }

    /// Register the environment base pointer (must be called before
    /// any non-global allocation).
    pub fn new_fixed(&mut self, ty: Type, name: &'static str) -> TempIdx {
        assert_eq!(
            self.temps.len() as u32,
            self.nb_globals,
            "fixed temps must be registered before locals"
        );
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(Temp::new_fixed(idx, ty, name));
        self.nb_globals += 1;
        idx
    }

    pub fn temp(&self, idx: TempIdx) -> &Temp {
        &self.temps[idx.0 as usize]
    }

    pub fn temp_mut(&mut self, idx: TempIdx) -> &mut Temp {
        &mut self.temps[idx.0 as usize]
    }

    pub fn temps(&self) -> &[Temp] {
        &self.temps
    }

    /// Iterate over global temps only.
    pub fn globals(&self) -> &[Temp] {
        &self.temps[..self.nb_globals as usize]
    }

    /// The constant value of a const temp, if it is one.
    pub fn const_val(&self, idx: TempIdx) -> Option<u64> {
        let t = self.temp(idx);
        if t.kind == TempKind::Const {
            Some(t.val)
        } else {
            None
        }
    }

    // -- Op emission --

    pub fn emit_op(&mut self, op: Op) -> OpIdx {
        let idx = op.idx;
        self.ops.push(op);
        idx
    }

    pub fn next_op_idx(&self) -> OpIdx {
        OpIdx(self.ops.len() as u32)
    }

    pub fn op(&self, idx: OpIdx) -> &Op {
        &self.ops[idx.0 as usize]
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Discard every op at or after `mark`.
    ///
    /// Used to rewind a partially translated instruction when it
    /// turns out it must fault instead (e.g. an instruction that is
    /// not continuation-aware reached with beatwise state pending).
    /// Label reference counts for branches inside the discarded
    /// region are unwound as well.
    pub fn truncate_ops(&mut self, mark: OpIdx) {
        for op in &self.ops[mark.0 as usize..] {
            match op.opc {
                crate::opcode::Opcode::Br => {
                    let id = op.cargs()[0].0;
                    self.labels[id as usize].refs -= 1;
                }
                crate::opcode::Opcode::BrCond => {
                    let id = op.cargs()[1].0;
                    self.labels[id as usize].refs -= 1;
                }
                crate::opcode::Opcode::SetLabel => {
                    let id = op.cargs()[0].0;
                    self.labels[id as usize].present = false;
                }
                _ => {}
            }
        }
        self.ops.truncate(mark.0 as usize);
    }

    // -- Labels --

    pub fn new_label(&mut self) -> u32 {
        let id = self.labels.len() as u32;
        self.labels.push(Label::new(id));
        id
    }

    pub fn label(&self, id: u32) -> &Label {
        &self.labels[id as usize]
    }

    pub fn label_mut(&mut self, id: u32) -> &mut Label {
        &mut self.labels[id as usize]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Panic if any referenced label was never placed. Called at
    /// block close; a dangling label is a translator bug, not a
    /// guest-induced condition.
    pub fn assert_labels_resolved(&self) {
        for l in &self.labels {
            assert!(!l.is_dangling(), "label L{} referenced but never placed", l.id);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
