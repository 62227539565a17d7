/// IR value types.
///
/// The guest is a 32-bit architecture, so almost everything is `I32`;
/// `I64` exists for long multiplies, doubleword load/store and the
/// double-precision FP registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Type {
    I32 = 0,
    I64 = 1,
}

pub const TYPE_COUNT: usize = 2;

impl Type {
    pub const fn size_bits(self) -> u32 {
        match self {
            Type::I32 => 32,
            Type::I64 => 64,
        }
    }

    pub const fn size_bytes(self) -> u32 {
        self.size_bits() / 8
    }
}

/// Comparison conditions for branch/setcond operations.
///
/// These are IR-level conditions, not guest condition codes; the
/// frontend lowers the guest's 4-bit condition field onto these
/// (see `arm_test_cc` in the frontend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cond {
    Never = 0,
    Always = 1,
    Eq = 8,
    Ne = 9,
    // Signed
    Lt = 10,
    Ge = 11,
    Le = 12,
    Gt = 13,
    // Unsigned
    Ltu = 14,
    Geu = 15,
    Leu = 16,
    Gtu = 17,
    // Test (AND then compare vs 0)
    TstEq = 18,
    TstNe = 19,
}

impl Cond {
    /// Return the inverted condition.
    pub const fn invert(self) -> Cond {
        match self {
            Cond::Never => Cond::Always,
            Cond::Always => Cond::Never,
            Cond::Eq => Cond::Ne,
            Cond::Ne => Cond::Eq,
            Cond::Lt => Cond::Ge,
            Cond::Ge => Cond::Lt,
            Cond::Le => Cond::Gt,
            Cond::Gt => Cond::Le,
            Cond::Ltu => Cond::Geu,
            Cond::Geu => Cond::Ltu,
            Cond::Leu => Cond::Gtu,
            Cond::Gtu => Cond::Leu,
            Cond::TstEq => Cond::TstNe,
            Cond::TstNe => Cond::TstEq,
        }
    }

    /// Swap operand order (e.g. Lt becomes Gt).
    pub const fn swap(self) -> Cond {
        match self {
            Cond::Eq
            | Cond::Ne
            | Cond::Never
            | Cond::Always
            | Cond::TstEq
            | Cond::TstNe => self,
            Cond::Lt => Cond::Gt,
            Cond::Ge => Cond::Le,
            Cond::Le => Cond::Ge,
            Cond::Gt => Cond::Lt,
            Cond::Ltu => Cond::Gtu,
            Cond::Geu => Cond::Leu,
            Cond::Leu => Cond::Geu,
            Cond::Gtu => Cond::Ltu,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Cond::Lt | Cond::Ge | Cond::Le | Cond::Gt)
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(self, Cond::Ltu | Cond::Geu | Cond::Leu | Cond::Gtu)
    }

    pub const fn from_raw(raw: u32) -> Option<Cond> {
        Some(match raw {
            0 => Cond::Never,
            1 => Cond::Always,
            8 => Cond::Eq,
            9 => Cond::Ne,
            10 => Cond::Lt,
            11 => Cond::Ge,
            12 => Cond::Le,
            13 => Cond::Gt,
            14 => Cond::Ltu,
            15 => Cond::Geu,
            16 => Cond::Leu,
            17 => Cond::Gtu,
            18 => Cond::TstEq,
            19 => Cond::TstNe,
            _ => return None,
        })
    }
}

/// Flags for the byte-swap opcodes, describing what the input
/// guarantees and what the output must do with the unswapped half.
pub mod bswap {
    /// Input bits above the swapped size are zero.
    pub const IZ: u32 = 1;
    /// Zero-extend the output above the swapped size.
    pub const OZ: u32 = 2;
    /// Sign-extend the output above the swapped size.
    pub const OS: u32 = 4;
}

/// Memory operation descriptor — encodes size, signedness,
/// endianness swap and required alignment for guest accesses.
/// Bit-packed so it fits in a single constant IR argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemOp(u16);

impl MemOp {
    pub const SIZE_8: u16 = 0;
    pub const SIZE_16: u16 = 1;
    pub const SIZE_32: u16 = 2;
    pub const SIZE_64: u16 = 3;

    pub const SIGN: u16 = 1 << 2;
    pub const BSWAP: u16 = 1 << 3;
    pub const ALIGN_2: u16 = 1 << 4;
    pub const ALIGN_4: u16 = 2 << 4;
    pub const ALIGN_8: u16 = 3 << 4;

    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn ub() -> Self {
        Self(Self::SIZE_8)
    }
    pub const fn sb() -> Self {
        Self(Self::SIZE_8 | Self::SIGN)
    }
    pub const fn uw() -> Self {
        Self(Self::SIZE_16)
    }
    pub const fn sw() -> Self {
        Self(Self::SIZE_16 | Self::SIGN)
    }
    pub const fn ul() -> Self {
        Self(Self::SIZE_32)
    }
    pub const fn uq() -> Self {
        Self(Self::SIZE_64)
    }

    /// Require natural alignment for the access size.
    pub const fn aligned(self) -> Self {
        let a = match self.0 & 0x3 {
            Self::SIZE_16 => Self::ALIGN_2,
            Self::SIZE_32 => Self::ALIGN_4,
            Self::SIZE_64 => Self::ALIGN_8,
            _ => 0,
        };
        Self(self.0 | a)
    }

    /// Mark the access as byte-swapped relative to host order.
    pub const fn swapped(self) -> Self {
        Self(self.0 | Self::BSWAP)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
    pub const fn size(self) -> u16 {
        self.0 & 0x3
    }
    pub const fn is_signed(self) -> bool {
        self.0 & Self::SIGN != 0
    }
    pub const fn is_bswap(self) -> bool {
        self.0 & Self::BSWAP != 0
    }
    pub const fn size_bytes(self) -> u32 {
        1 << self.size()
    }
}
