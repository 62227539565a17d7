use crate::context::Context;
use crate::op::Op;
use crate::opcode::Opcode;
use crate::temp::TempIdx;
use crate::types::{Cond, MemOp, Type};

// Constant args are encoded as TempIdx(raw_value as u32).
fn carg(val: u32) -> TempIdx {
    TempIdx(val)
}

impl Context {
    // -- Internal helpers --

    fn emit_binary(
        &mut self,
        opc: Opcode,
        ty: Type,
        dst: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, opc, ty, &[dst, a, b]);
        self.emit_op(op);
        dst
    }

    fn emit_unary(
        &mut self,
        opc: Opcode,
        ty: Type,
        dst: TempIdx,
        src: TempIdx,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, opc, ty, &[dst, src]);
        self.emit_op(op);
        dst
    }

    // -- Binary ALU (1 oarg, 2 iargs) --

    pub fn gen_add(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Add, ty, d, a, b)
    }

    pub fn gen_sub(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Sub, ty, d, a, b)
    }

    pub fn gen_mul(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Mul, ty, d, a, b)
    }

    pub fn gen_and(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::And, ty, d, a, b)
    }

    pub fn gen_or(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Or, ty, d, a, b)
    }

    pub fn gen_xor(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Xor, ty, d, a, b)
    }

    pub fn gen_andc(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::AndC, ty, d, a, b)
    }

    pub fn gen_orc(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::OrC, ty, d, a, b)
    }

    pub fn gen_shl(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Shl, ty, d, a, b)
    }

    pub fn gen_shr(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Shr, ty, d, a, b)
    }

    pub fn gen_sar(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Sar, ty, d, a, b)
    }

    pub fn gen_rotr(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::RotR, ty, d, a, b)
    }

    pub fn gen_umin(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::UMin, ty, d, a, b)
    }

    // -- Paired arithmetic (2 oargs, 4 iargs) --

    #[allow(clippy::too_many_arguments)]
    pub fn gen_add2(
        &mut self,
        ty: Type,
        dl: TempIdx,
        dh: TempIdx,
        al: TempIdx,
        ah: TempIdx,
        bl: TempIdx,
        bh: TempIdx,
    ) {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Add2, ty, &[dl, dh, al, ah, bl, bh]);
        self.emit_op(op);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn gen_sub2(
        &mut self,
        ty: Type,
        dl: TempIdx,
        dh: TempIdx,
        al: TempIdx,
        ah: TempIdx,
        bl: TempIdx,
        bh: TempIdx,
    ) {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Sub2, ty, &[dl, dh, al, ah, bl, bh]);
        self.emit_op(op);
    }

    // -- Widening multiply (2 oargs, 2 iargs) --

    pub fn gen_muls2(
        &mut self,
        ty: Type,
        dl: TempIdx,
        dh: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::MulS2, ty, &[dl, dh, a, b]);
        self.emit_op(op);
    }

    pub fn gen_mulu2(
        &mut self,
        ty: Type,
        dl: TempIdx,
        dh: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::MulU2, ty, &[dl, dh, a, b]);
        self.emit_op(op);
    }

    // -- Bit field --

    pub fn gen_extract(
        &mut self,
        ty: Type,
        d: TempIdx,
        src: TempIdx,
        ofs: u32,
        len: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::Extract,
            ty,
            &[d, src, carg(ofs), carg(len)],
        );
        self.emit_op(op);
        d
    }

    pub fn gen_sextract(
        &mut self,
        ty: Type,
        d: TempIdx,
        src: TempIdx,
        ofs: u32,
        len: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::SExtract,
            ty,
            &[d, src, carg(ofs), carg(len)],
        );
        self.emit_op(op);
        d
    }

    pub fn gen_deposit(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
        ofs: u32,
        len: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::Deposit,
            ty,
            &[d, a, b, carg(ofs), carg(len)],
        );
        self.emit_op(op);
        d
    }

    pub fn gen_extract2(
        &mut self,
        ty: Type,
        d: TempIdx,
        al: TempIdx,
        ah: TempIdx,
        ofs: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Extract2, ty, &[d, al, ah, carg(ofs)]);
        self.emit_op(op);
        d
    }

    // -- Byte swap --

    pub fn gen_bswap16(
        &mut self,
        ty: Type,
        d: TempIdx,
        src: TempIdx,
        flags: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Bswap16, ty, &[d, src, carg(flags)]);
        self.emit_op(op);
        d
    }

    pub fn gen_bswap32(
        &mut self,
        ty: Type,
        d: TempIdx,
        src: TempIdx,
        flags: u32,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Bswap32, ty, &[d, src, carg(flags)]);
        self.emit_op(op);
        d
    }

    // -- Bit counting --

    pub fn gen_clz(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
    ) -> TempIdx {
        self.emit_binary(Opcode::Clz, ty, d, a, b)
    }

    // -- Unary (1 oarg, 1 iarg) --

    pub fn gen_neg(&mut self, ty: Type, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::Neg, ty, d, s)
    }

    pub fn gen_not(&mut self, ty: Type, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::Not, ty, d, s)
    }

    pub fn gen_mov(&mut self, ty: Type, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::Mov, ty, d, s)
    }

    // -- Type conversion (1 oarg, 1 iarg) --

    /// Sign-extend i32 → i64.
    pub fn gen_ext_i32_i64(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::ExtI32I64, Type::I64, d, s)
    }

    /// Zero-extend i32 → i64.
    pub fn gen_ext_u32_i64(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::ExtUI32I64, Type::I64, d, s)
    }

    /// Truncate i64 → i32 (low 32 bits).
    pub fn gen_extrl_i64_i32(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::ExtrlI64I32, Type::I32, d, s)
    }

    /// Extract i64 → i32 (high 32 bits).
    pub fn gen_extrh_i64_i32(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit_unary(Opcode::ExtrhI64I32, Type::I32, d, s)
    }

    /// d(i64) = hi:lo from two i32 temps.
    pub fn gen_concat_i32_i64(
        &mut self,
        d: TempIdx,
        lo: TempIdx,
        hi: TempIdx,
    ) -> TempIdx {
        let tl = self.new_temp(Type::I64);
        let th = self.new_temp(Type::I64);
        self.gen_ext_u32_i64(tl, lo);
        self.gen_ext_u32_i64(th, hi);
        self.gen_deposit(Type::I64, d, tl, th, 32, 32)
    }

    // -- SetCond family --

    pub fn gen_setcond(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
        cond: Cond,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::SetCond,
            ty,
            &[d, a, b, carg(cond as u32)],
        );
        self.emit_op(op);
        d
    }

    pub fn gen_negsetcond(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
        cond: Cond,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::NegSetCond,
            ty,
            &[d, a, b, carg(cond as u32)],
        );
        self.emit_op(op);
        d
    }

    #[allow(clippy::too_many_arguments)]
    pub fn gen_movcond(
        &mut self,
        ty: Type,
        d: TempIdx,
        c1: TempIdx,
        c2: TempIdx,
        v1: TempIdx,
        v2: TempIdx,
        cond: Cond,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::MovCond,
            ty,
            &[d, c1, c2, v1, v2, carg(cond as u32)],
        );
        self.emit_op(op);
        d
    }

    // -- CPU-state field access --

    /// Load: dst = *(base + offset)
    pub fn gen_ld(
        &mut self,
        ty: Type,
        dst: TempIdx,
        base: TempIdx,
        offset: i64,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::Ld, ty, &[dst, base, carg(offset as u32)]);
        self.emit_op(op);
        dst
    }

    /// Store: *(base + offset) = src
    pub fn gen_st(&mut self, ty: Type, src: TempIdx, base: TempIdx, offset: i64) {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::St, ty, &[src, base, carg(offset as u32)]);
        self.emit_op(op);
    }

    // -- Guest memory access --

    pub fn gen_guest_ld(
        &mut self,
        ty: Type,
        dst: TempIdx,
        addr: TempIdx,
        memop: MemOp,
    ) -> TempIdx {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::GuestLd,
            ty,
            &[dst, addr, carg(memop.bits() as u32)],
        );
        self.emit_op(op);
        dst
    }

    pub fn gen_guest_st(
        &mut self,
        ty: Type,
        val: TempIdx,
        addr: TempIdx,
        memop: MemOp,
    ) {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::GuestSt,
            ty,
            &[val, addr, carg(memop.bits() as u32)],
        );
        self.emit_op(op);
    }

    // -- Control flow --

    /// Unconditional branch to label.
    pub fn gen_br(&mut self, label_id: u32) {
        self.label_mut(label_id).add_use();
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::Br, Type::I32, &[carg(label_id)]);
        self.emit_op(op);
    }

    /// Conditional branch.
    pub fn gen_brcond(
        &mut self,
        ty: Type,
        a: TempIdx,
        b: TempIdx,
        cond: Cond,
        label_id: u32,
    ) {
        self.label_mut(label_id).add_use();
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::BrCond,
            ty,
            &[a, b, carg(cond as u32), carg(label_id)],
        );
        self.emit_op(op);
    }

    /// Conditional branch against an immediate.
    pub fn gen_brcondi(
        &mut self,
        ty: Type,
        a: TempIdx,
        imm: u64,
        cond: Cond,
        label_id: u32,
    ) {
        let b = self.new_const(ty, imm);
        self.gen_brcond(ty, a, b, cond, label_id);
    }

    /// Define label position.
    pub fn gen_set_label(&mut self, label_id: u32) {
        self.label_mut(label_id).set_present();
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::SetLabel, Type::I32, &[carg(label_id)]);
        self.emit_op(op);
    }

    // -- Block exit --

    /// Direct jump through chainable exit slot `tb_idx` (0 or 1).
    pub fn gen_goto_tb(&mut self, tb_idx: u32) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::GotoTb, Type::I32, &[carg(tb_idx)]);
        self.emit_op(op);
    }

    /// Return to the execution loop with exit status `val`.
    pub fn gen_exit_tb(&mut self, val: u64) {
        let idx = self.next_op_idx();
        let op =
            Op::with_args(idx, Opcode::ExitTb, Type::I32, &[carg(val as u32)]);
        self.emit_op(op);
    }

    /// Indirect jump through the block-lookup path.
    pub fn gen_goto_ptr(&mut self) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::GotoPtr, Type::I32, &[]);
        self.emit_op(op);
    }

    /// Memory barrier.
    pub fn gen_mb(&mut self, bar_type: u32) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::Mb, Type::I32, &[carg(bar_type)]);
        self.emit_op(op);
    }

    // -- Boundary --

    /// Mark a guest instruction boundary. The second parameter is
    /// the condexec/continuation state to restore to on an exception
    /// taken inside this instruction.
    pub fn gen_insn_start(&mut self, pc: u32, cond_bits: u32) {
        let idx = self.next_op_idx();
        let op = Op::with_args(
            idx,
            Opcode::InsnStart,
            Type::I32,
            &[carg(pc), carg(cond_bits)],
        );
        self.emit_op(op);
    }

    // -- Helper call --

    /// Call an external helper: dst = helper(args[0..4]).
    ///
    /// Helpers are identified by an opaque id the consumer resolves;
    /// unused argument slots are padded with a zero constant. Void
    /// helpers write to a dead temp the caller discards.
    pub fn gen_call(
        &mut self,
        dst: TempIdx,
        helper: u32,
        args: &[TempIdx],
    ) -> TempIdx {
        assert!(args.len() <= 4, "helper calls take at most 4 args");
        let zero = self.new_const(Type::I32, 0);
        let mut full_args = [dst, zero, zero, zero, zero, carg(helper)];
        for (i, &a) in args.iter().enumerate() {
            full_args[1 + i] = a;
        }
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::Call, Type::I32, &full_args);
        self.emit_op(op);
        dst
    }

    pub fn gen_discard(&mut self, ty: Type, t: TempIdx) {
        let idx = self.next_op_idx();
        let op = Op::with_args(idx, Opcode::Discard, ty, &[t]);
        self.emit_op(op);
    }
}
