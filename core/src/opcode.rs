/// IR opcodes — type-polymorphic where marked with `OPF_INT`.
///
/// The vocabulary is deliberately small: anything the guest can do
/// that does not map cleanly onto one of these (saturating
/// arithmetic, FP, beatwise vector ops, exception entry) goes through
/// `Call` to a named external helper instead of growing the opcode
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // -- Data movement --
    Mov = 0,
    SetCond,
    NegSetCond,
    MovCond,

    // -- Arithmetic --
    Add,
    Sub,
    Mul,
    Neg,

    // -- Paired arithmetic (carry chains, long accumulate) --
    Add2, // (lo,hi) = (al,ah) + (bl,bh)
    Sub2, // (lo,hi) = (al,ah) - (bl,bh)

    // -- Widening multiply --
    MulS2, // signed multiply -> double width
    MulU2, // unsigned multiply -> double width

    // -- Logic --
    And,
    Or,
    Xor,
    Not,
    AndC, // a & ~b
    OrC,  // a | ~b

    // -- Shift/rotate --
    Shl,
    Shr,
    Sar,
    RotR,

    // -- Min (shift-amount clamping) --
    UMin,

    // -- Bit field --
    Extract,  // unsigned bit-field extract
    SExtract, // signed bit-field extract
    Deposit,  // bit-field deposit
    Extract2, // extract from concatenation of two regs

    // -- Byte swap --
    Bswap16,
    Bswap32,

    // -- Bit counting --
    Clz, // count leading zeros (second input = result for zero)

    // -- Type conversion --
    ExtI32I64,   // sign-extend i32 -> i64
    ExtUI32I64,  // zero-extend i32 -> i64
    ExtrlI64I32, // truncate i64 -> i32 (low)
    ExtrhI64I32, // extract i64 -> i32 (high)

    // -- CPU-state field access (offset from the env pointer) --
    Ld,
    St,

    // -- Guest memory access --
    GuestLd,
    GuestSt,

    // -- Control flow --
    Br,       // unconditional branch to label
    BrCond,   // conditional branch
    SetLabel, // define label position
    GotoTb,   // direct jump to a chainable exit slot
    ExitTb,   // return from the block to the execution loop
    GotoPtr,  // indirect jump through the block-lookup path
    Mb,       // memory barrier

    // -- External helper call --
    Call,

    // -- Misc --
    Discard,
    InsnStart, // marks a guest instruction boundary

    // Sentinel — must be last
    Count,
}

/// Flags describing properties of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpFlags(u16);

impl OpFlags {
    pub const NONE: OpFlags = OpFlags(0);
    /// Exits the translation block.
    pub const BB_EXIT: OpFlags = OpFlags(0x01);
    /// Ends a basic block (next op starts a new BB).
    pub const BB_END: OpFlags = OpFlags(0x02);
    /// Clobbers caller-saved state (like a function call).
    pub const CALL_CLOBBER: OpFlags = OpFlags(0x04);
    /// Has side effects — cannot be eliminated by DCE.
    pub const SIDE_EFFECTS: OpFlags = OpFlags(0x08);
    /// Operands may be I32 or I64 (type-polymorphic).
    pub const INT: OpFlags = OpFlags(0x10);
    /// Conditional branch (may or may not be taken).
    pub const COND_BRANCH: OpFlags = OpFlags(0x80);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: OpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: OpFlags) -> Self {
        Self(self.0 | other.0)
    }
}

/// Static definition of an opcode — argument counts and flags.
#[derive(Debug, Clone, Copy)]
pub struct OpDef {
    pub name: &'static str,
    pub nb_oargs: u8,
    pub nb_iargs: u8,
    pub nb_cargs: u8,
    pub flags: OpFlags,
}

impl OpDef {
    pub const fn nb_args(&self) -> u8 {
        self.nb_oargs + self.nb_iargs + self.nb_cargs
    }
}

// Helper to combine flags in const context.
const fn f(a: OpFlags, b: OpFlags) -> OpFlags {
    OpFlags(a.bits() | b.bits())
}

const INT: OpFlags = OpFlags::INT;
const SE: OpFlags = OpFlags::SIDE_EFFECTS;
const CC: OpFlags = OpFlags::CALL_CLOBBER;
const BE: OpFlags = OpFlags::BB_END;
const BX: OpFlags = OpFlags::BB_EXIT;
const CB: OpFlags = OpFlags::COND_BRANCH;
const N: OpFlags = OpFlags::NONE;

const fn d(
    name: &'static str,
    nb_oargs: u8,
    nb_iargs: u8,
    nb_cargs: u8,
    flags: OpFlags,
) -> OpDef {
    OpDef {
        name,
        nb_oargs,
        nb_iargs,
        nb_cargs,
        flags,
    }
}

/// Static opcode definition table, indexed by `Opcode as usize`.
pub static OPCODE_DEFS: [OpDef; Opcode::Count as usize] = [
    d("mov", 1, 1, 0, INT),
    d("setcond", 1, 2, 1, INT),
    d("negsetcond", 1, 2, 1, INT),
    d("movcond", 1, 4, 1, INT),
    d("add", 1, 2, 0, INT),
    d("sub", 1, 2, 0, INT),
    d("mul", 1, 2, 0, INT),
    d("neg", 1, 1, 0, INT),
    d("add2", 2, 4, 0, INT),
    d("sub2", 2, 4, 0, INT),
    d("muls2", 2, 2, 0, INT),
    d("mulu2", 2, 2, 0, INT),
    d("and", 1, 2, 0, INT),
    d("or", 1, 2, 0, INT),
    d("xor", 1, 2, 0, INT),
    d("not", 1, 1, 0, INT),
    d("andc", 1, 2, 0, INT),
    d("orc", 1, 2, 0, INT),
    d("shl", 1, 2, 0, INT),
    d("shr", 1, 2, 0, INT),
    d("sar", 1, 2, 0, INT),
    d("rotr", 1, 2, 0, INT),
    d("umin", 1, 2, 0, INT),
    d("extract", 1, 1, 2, INT),
    d("sextract", 1, 1, 2, INT),
    d("deposit", 1, 2, 2, INT),
    d("extract2", 1, 2, 1, INT),
    d("bswap16", 1, 1, 1, INT),
    d("bswap32", 1, 1, 1, INT),
    d("clz", 1, 2, 0, INT),
    d("ext_i32_i64", 1, 1, 0, N),
    d("extu_i32_i64", 1, 1, 0, N),
    d("extrl_i64_i32", 1, 1, 0, N),
    d("extrh_i64_i32", 1, 1, 0, N),
    d("ld", 1, 1, 1, INT),
    d("st", 0, 2, 1, f(INT, SE)),
    d("guest_ld", 1, 1, 1, f(INT, SE)),
    d("guest_st", 0, 2, 1, f(INT, SE)),
    d("br", 0, 0, 1, f(BE, SE)),
    d("brcond", 0, 2, 2, f(INT, f(BE, f(SE, CB)))),
    d("set_label", 0, 0, 1, f(BE, SE)),
    d("goto_tb", 0, 0, 1, f(BX, SE)),
    d("exit_tb", 0, 0, 1, f(BX, SE)),
    d("goto_ptr", 0, 1, 0, f(BX, SE)),
    d("mb", 0, 0, 1, SE),
    d("call", 1, 4, 1, f(CC, SE)),
    d("discard", 0, 1, 0, N),
    d("insn_start", 0, 0, 2, SE),
];

impl Opcode {
    pub fn def(self) -> &'static OpDef {
        &OPCODE_DEFS[self as usize]
    }

    /// Whether the op's name takes an `_i32`/`_i64` suffix in dumps.
    pub fn is_int_polymorphic(self) -> bool {
        self.def().flags.contains(OpFlags::INT)
    }
}
