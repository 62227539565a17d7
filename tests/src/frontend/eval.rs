//! A reference evaluator for translated blocks: executes the IR op
//! list directly against a CPU-state byte image and a sparse guest
//! memory. Helper calls are recorded, not executed — tests assert on
//! them instead.

use std::collections::HashMap;

use a32t_core::types::bswap;
use a32t_core::{Cond, Context, MemOp, Opcode, TempIdx, TempKind, Type};
use a32t_frontend::arm::cpu;

/// Size of the CPU-state image the env pointer addresses.
const ENV_SIZE: usize =
    cpu::VFP_REGS_OFFSET as usize + cpu::NUM_VFP_DREGS * 8;

pub struct Machine {
    pub env: Vec<u8>,
    pub mem: HashMap<u32, u8>,
    /// Recorded helper calls: (helper id, argument values).
    pub calls: Vec<(u32, Vec<u64>)>,
    /// Value of the final exit_tb / goto_tb, if any.
    pub exit: Option<u64>,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            env: vec![0; ENV_SIZE],
            mem: HashMap::new(),
            calls: Vec::new(),
            exit: None,
        }
    }

    pub fn env_read(&self, offset: usize, ty: Type) -> u64 {
        let n = ty.size_bytes() as usize;
        let mut v = 0u64;
        for i in (0..n).rev() {
            v = (v << 8) | self.env[offset + i] as u64;
        }
        v
    }

    pub fn env_write(&mut self, offset: usize, ty: Type, val: u64) {
        let n = ty.size_bytes() as usize;
        for i in 0..n {
            self.env[offset + i] = (val >> (8 * i)) as u8;
        }
    }

    pub fn set_reg(&mut self, r: usize, val: u32) {
        self.env_write(cpu::reg_offset(r) as usize, Type::I32, val as u64);
    }

    pub fn reg(&self, r: usize) -> u32 {
        self.env_read(cpu::reg_offset(r) as usize, Type::I32) as u32
    }

    /// Set the split NZCV flags.
    pub fn set_nzcv(&mut self, n: bool, z: bool, c: bool, v: bool) {
        self.env_write(
            cpu::NF_OFFSET as usize,
            Type::I32,
            if n { 0x8000_0000 } else { 0 },
        );
        self.env_write(cpu::ZF_OFFSET as usize, Type::I32, !z as u64);
        self.env_write(cpu::CF_OFFSET as usize, Type::I32, c as u64);
        self.env_write(
            cpu::VF_OFFSET as usize,
            Type::I32,
            if v { 0x8000_0000 } else { 0 },
        );
    }

    pub fn flag_n(&self) -> bool {
        self.env_read(cpu::NF_OFFSET as usize, Type::I32) & 0x8000_0000 != 0
    }

    pub fn flag_z(&self) -> bool {
        self.env_read(cpu::ZF_OFFSET as usize, Type::I32) as u32 == 0
    }

    pub fn flag_c(&self) -> bool {
        self.env_read(cpu::CF_OFFSET as usize, Type::I32) & 1 != 0
    }

    pub fn flag_v(&self) -> bool {
        self.env_read(cpu::VF_OFFSET as usize, Type::I32) & 0x8000_0000 != 0
    }

    pub fn called(&self, helper: u32) -> bool {
        self.calls.iter().any(|(h, _)| *h == helper)
    }

    fn mem_read(&self, addr: u32, mop: MemOp) -> u64 {
        let n = mop.size_bytes();
        let mut v = 0u64;
        for i in (0..n).rev() {
            let b = *self.mem.get(&addr.wrapping_add(i)).unwrap_or(&0);
            v = (v << 8) | b as u64;
        }
        if mop.is_bswap() {
            v = match n {
                2 => (v as u16).swap_bytes() as u64,
                4 => (v as u32).swap_bytes() as u64,
                8 => v.swap_bytes(),
                _ => v,
            };
        }
        if mop.is_signed() {
            v = match n {
                1 => v as u8 as i8 as i64 as u64,
                2 => v as u16 as i16 as i64 as u64,
                4 => v as u32 as i32 as i64 as u64,
                _ => v,
            };
        }
        v
    }

    fn mem_write(&mut self, addr: u32, mop: MemOp, val: u64) {
        let n = mop.size_bytes();
        let mut v = val;
        if mop.is_bswap() {
            v = match n {
                2 => (v as u16).swap_bytes() as u64,
                4 => (v as u32).swap_bytes() as u64,
                8 => v.swap_bytes(),
                _ => v,
            };
        }
        for i in 0..n {
            self.mem.insert(addr.wrapping_add(i), (v >> (8 * i)) as u8);
        }
    }

    /// Execute the ops of a translated block to completion.
    pub fn run(&mut self, ctx: &Context) {
        // Resolve label ids to op indices up front.
        let mut label_pos = HashMap::new();
        for (i, op) in ctx.ops().iter().enumerate() {
            if op.opc == Opcode::SetLabel {
                label_pos.insert(op.cargs()[0].0, i);
            }
        }

        let mask = |ty: Type, v: u64| -> u64 {
            match ty {
                Type::I32 => v & 0xffff_ffff,
                Type::I64 => v,
            }
        };
        let sext = |ty: Type, v: u64| -> i64 {
            match ty {
                Type::I32 => v as u32 as i32 as i64,
                Type::I64 => v as i64,
            }
        };

        let mut vals: Vec<u64> = vec![0; ctx.nb_temps() as usize];
        for t in ctx.temps() {
            match t.kind {
                TempKind::Const => vals[t.idx.0 as usize] = t.val,
                TempKind::Global => {
                    vals[t.idx.0 as usize] =
                        self.env_read(t.mem_offset as usize, t.ty);
                }
                _ => {}
            }
        }

        let get = |vals: &[u64], i: TempIdx| vals[i.0 as usize];
        macro_rules! set {
            ($vals:expr, $i:expr, $ty:expr, $v:expr) => {{
                let v = mask($ty, $v);
                $vals[$i.0 as usize] = v;
                let t = ctx.temp($i);
                if t.kind == TempKind::Global {
                    self.env_write(t.mem_offset as usize, t.ty, v);
                }
            }};
        }

        let test_cond = |cond: Cond, a: u64, b: u64, ty: Type| -> bool {
            let (sa, sb) = (sext(ty, a), sext(ty, b));
            match cond {
                Cond::Never => false,
                Cond::Always => true,
                Cond::Eq => a == b,
                Cond::Ne => a != b,
                Cond::Lt => sa < sb,
                Cond::Ge => sa >= sb,
                Cond::Le => sa <= sb,
                Cond::Gt => sa > sb,
                Cond::Ltu => a < b,
                Cond::Geu => a >= b,
                Cond::Leu => a <= b,
                Cond::Gtu => a > b,
                Cond::TstEq => a & b == 0,
                Cond::TstNe => a & b != 0,
            }
        };

        let mut pc = 0usize;
        while pc < ctx.num_ops() {
            let op = ctx.op(a32t_core::OpIdx(pc as u32));
            let ty = op.op_type;
            let w = ty.size_bits();
            let o = op.oargs();
            let i = op.iargs();
            let c = op.cargs();
            match op.opc {
                Opcode::InsnStart | Opcode::SetLabel | Opcode::Mb => {}
                Opcode::Discard => {}
                Opcode::Mov => set!(vals, o[0], ty, get(&vals, i[0])),
                Opcode::Add => set!(
                    vals,
                    o[0],
                    ty,
                    get(&vals, i[0]).wrapping_add(get(&vals, i[1]))
                ),
                Opcode::Sub => set!(
                    vals,
                    o[0],
                    ty,
                    get(&vals, i[0]).wrapping_sub(get(&vals, i[1]))
                ),
                Opcode::Mul => set!(
                    vals,
                    o[0],
                    ty,
                    get(&vals, i[0]).wrapping_mul(get(&vals, i[1]))
                ),
                Opcode::Neg => {
                    set!(vals, o[0], ty, (get(&vals, i[0])).wrapping_neg())
                }
                Opcode::And => {
                    set!(vals, o[0], ty, get(&vals, i[0]) & get(&vals, i[1]))
                }
                Opcode::Or => {
                    set!(vals, o[0], ty, get(&vals, i[0]) | get(&vals, i[1]))
                }
                Opcode::Xor => {
                    set!(vals, o[0], ty, get(&vals, i[0]) ^ get(&vals, i[1]))
                }
                Opcode::Not => set!(vals, o[0], ty, !get(&vals, i[0])),
                Opcode::AndC => {
                    set!(vals, o[0], ty, get(&vals, i[0]) & !get(&vals, i[1]))
                }
                Opcode::OrC => {
                    set!(vals, o[0], ty, get(&vals, i[0]) | !get(&vals, i[1]))
                }
                Opcode::Shl => {
                    let sh = get(&vals, i[1]) as u32 % w;
                    set!(vals, o[0], ty, get(&vals, i[0]) << sh)
                }
                Opcode::Shr => {
                    let sh = get(&vals, i[1]) as u32 % w;
                    set!(vals, o[0], ty, mask(ty, get(&vals, i[0])) >> sh)
                }
                Opcode::Sar => {
                    let sh = get(&vals, i[1]) as u32 % w;
                    set!(vals, o[0], ty, (sext(ty, get(&vals, i[0])) >> sh) as u64)
                }
                Opcode::RotR => {
                    let sh = get(&vals, i[1]) as u32 % w;
                    let v = match ty {
                        Type::I32 => {
                            (get(&vals, i[0]) as u32).rotate_right(sh) as u64
                        }
                        Type::I64 => get(&vals, i[0]).rotate_right(sh),
                    };
                    set!(vals, o[0], ty, v)
                }
                Opcode::UMin => {
                    let v = get(&vals, i[0]).min(get(&vals, i[1]));
                    set!(vals, o[0], ty, v)
                }
                Opcode::Add2 => {
                    let a = get(&vals, i[0]) | (get(&vals, i[1]) << 32);
                    let b = get(&vals, i[2]) | (get(&vals, i[3]) << 32);
                    let r = a.wrapping_add(b);
                    set!(vals, o[0], ty, r & 0xffff_ffff);
                    set!(vals, o[1], ty, r >> 32);
                }
                Opcode::Sub2 => {
                    let a = get(&vals, i[0]) | (get(&vals, i[1]) << 32);
                    let b = get(&vals, i[2]) | (get(&vals, i[3]) << 32);
                    let r = a.wrapping_sub(b);
                    set!(vals, o[0], ty, r & 0xffff_ffff);
                    set!(vals, o[1], ty, r >> 32);
                }
                Opcode::MulS2 => {
                    let r = (get(&vals, i[0]) as u32 as i32 as i64)
                        .wrapping_mul(get(&vals, i[1]) as u32 as i32 as i64)
                        as u64;
                    set!(vals, o[0], ty, r & 0xffff_ffff);
                    set!(vals, o[1], ty, r >> 32);
                }
                Opcode::MulU2 => {
                    let r = (get(&vals, i[0]) as u32 as u64)
                        .wrapping_mul(get(&vals, i[1]) as u32 as u64);
                    set!(vals, o[0], ty, r & 0xffff_ffff);
                    set!(vals, o[1], ty, r >> 32);
                }
                Opcode::SetCond => {
                    let cond = Cond::from_raw(c[0].0).unwrap();
                    let v =
                        test_cond(cond, get(&vals, i[0]), get(&vals, i[1]), ty);
                    set!(vals, o[0], ty, v as u64)
                }
                Opcode::NegSetCond => {
                    let cond = Cond::from_raw(c[0].0).unwrap();
                    let v =
                        test_cond(cond, get(&vals, i[0]), get(&vals, i[1]), ty);
                    set!(vals, o[0], ty, (v as u64).wrapping_neg())
                }
                Opcode::MovCond => {
                    let cond = Cond::from_raw(c[0].0).unwrap();
                    let v = if test_cond(
                        cond,
                        get(&vals, i[0]),
                        get(&vals, i[1]),
                        ty,
                    ) {
                        get(&vals, i[2])
                    } else {
                        get(&vals, i[3])
                    };
                    set!(vals, o[0], ty, v)
                }
                Opcode::Extract => {
                    let (ofs, len) = (c[0].0, c[1].0);
                    let v = (mask(ty, get(&vals, i[0])) >> ofs)
                        & ((1u64 << len) - 1);
                    set!(vals, o[0], ty, v)
                }
                Opcode::SExtract => {
                    let (ofs, len) = (c[0].0, c[1].0);
                    let v = (mask(ty, get(&vals, i[0])) >> ofs)
                        & ((1u64 << len) - 1);
                    let sign = 1u64 << (len - 1);
                    let v = (v ^ sign).wrapping_sub(sign);
                    set!(vals, o[0], ty, v)
                }
                Opcode::Deposit => {
                    let (ofs, len) = (c[0].0, c[1].0);
                    let m = ((1u64 << len) - 1) << ofs;
                    let v = (get(&vals, i[0]) & !m)
                        | ((get(&vals, i[1]) << ofs) & m);
                    set!(vals, o[0], ty, v)
                }
                Opcode::Extract2 => {
                    let ofs = c[0].0;
                    let lo = mask(ty, get(&vals, i[0]));
                    let hi = mask(ty, get(&vals, i[1]));
                    let v = if ofs == 0 {
                        lo
                    } else {
                        (lo >> ofs) | (hi << (w - ofs))
                    };
                    set!(vals, o[0], ty, v)
                }
                Opcode::Bswap16 => {
                    let flags = c[0].0;
                    let v = (get(&vals, i[0]) as u16).swap_bytes();
                    let v = if flags & bswap::OS != 0 {
                        v as i16 as i64 as u64
                    } else {
                        v as u64
                    };
                    set!(vals, o[0], ty, v)
                }
                Opcode::Bswap32 => {
                    let v = (get(&vals, i[0]) as u32).swap_bytes();
                    set!(vals, o[0], ty, v as u64)
                }
                Opcode::Clz => {
                    let v = mask(ty, get(&vals, i[0]));
                    let r = if v == 0 {
                        get(&vals, i[1])
                    } else {
                        match ty {
                            Type::I32 => (v as u32).leading_zeros() as u64,
                            Type::I64 => v.leading_zeros() as u64,
                        }
                    };
                    set!(vals, o[0], ty, r)
                }
                Opcode::ExtI32I64 => {
                    set!(
                        vals,
                        o[0],
                        Type::I64,
                        get(&vals, i[0]) as u32 as i32 as i64 as u64
                    )
                }
                Opcode::ExtUI32I64 => {
                    set!(vals, o[0], Type::I64, get(&vals, i[0]) as u32 as u64)
                }
                Opcode::ExtrlI64I32 => {
                    set!(vals, o[0], Type::I32, get(&vals, i[0]))
                }
                Opcode::ExtrhI64I32 => {
                    set!(vals, o[0], Type::I32, get(&vals, i[0]) >> 32)
                }
                Opcode::Ld => {
                    let base = get(&vals, i[0]) as usize;
                    let ofs = c[0].0 as usize;
                    let v = self.env_read(base + ofs, ty);
                    set!(vals, o[0], ty, v)
                }
                Opcode::St => {
                    let base = get(&vals, i[1]) as usize;
                    let ofs = c[0].0 as usize;
                    self.env_write(base + ofs, ty, get(&vals, i[0]));
                }
                Opcode::GuestLd => {
                    let mop = MemOp::new(c[0].0 as u16);
                    let v = self.mem_read(get(&vals, i[0]) as u32, mop);
                    set!(vals, o[0], ty, v)
                }
                Opcode::GuestSt => {
                    let mop = MemOp::new(c[0].0 as u16);
                    self.mem_write(
                        get(&vals, i[1]) as u32,
                        mop,
                        get(&vals, i[0]),
                    );
                }
                Opcode::Br => {
                    pc = label_pos[&c[0].0];
                    continue;
                }
                Opcode::BrCond => {
                    let cond = Cond::from_raw(c[0].0).unwrap();
                    if test_cond(cond, get(&vals, i[0]), get(&vals, i[1]), ty)
                    {
                        pc = label_pos[&c[1].0];
                        continue;
                    }
                }
                Opcode::Call => {
                    let helper = c[0].0;
                    let args = i.iter().map(|&t| get(&vals, t)).collect();
                    self.calls.push((helper, args));
                    set!(vals, o[0], ty, 0);
                }
                Opcode::GotoTb => {}
                Opcode::ExitTb => {
                    self.exit = Some(c[0].0 as u64);
                    return;
                }
                Opcode::GotoPtr => {
                    self.exit = Some(u64::MAX);
                    return;
                }
                Opcode::Count => unreachable!(),
            }
            pc += 1;
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
