use a32t_core::op::{Op, OpIdx};
use a32t_core::{Opcode, TempIdx, Type};

#[test]
fn op_new_defaults() {
    let op = Op::new(OpIdx(0), Opcode::Add, Type::I32);
    assert_eq!(op.opc, Opcode::Add);
    assert_eq!(op.op_type, Type::I32);
    assert_eq!(op.nargs, 0);
}

#[test]
fn op_with_args() {
    let args = [TempIdx(1), TempIdx(2), TempIdx(3)];
    let op = Op::with_args(OpIdx(0), Opcode::Add, Type::I32, &args);
    assert_eq!(op.nargs, 3);
    assert_eq!(op.args[0], TempIdx(1));
    assert_eq!(op.args[1], TempIdx(2));
    assert_eq!(op.args[2], TempIdx(3));
}

#[test]
fn op_arg_slices() {
    // Add: 1 oarg, 2 iargs, 0 cargs
    let args = [TempIdx(10), TempIdx(20), TempIdx(30)];
    let op = Op::with_args(OpIdx(0), Opcode::Add, Type::I32, &args);

    assert_eq!(op.oargs(), &[TempIdx(10)]);
    assert_eq!(op.iargs(), &[TempIdx(20), TempIdx(30)]);
    assert!(op.cargs().is_empty());
}

#[test]
fn op_arg_slices_with_cargs() {
    // BrCond: 0 oargs, 2 iargs, 2 cargs
    let args = [TempIdx(1), TempIdx(2), TempIdx(3), TempIdx(4)];
    let op = Op::with_args(OpIdx(0), Opcode::BrCond, Type::I32, &args);

    assert!(op.oargs().is_empty());
    assert_eq!(op.iargs(), &[TempIdx(1), TempIdx(2)]);
    assert_eq!(op.cargs(), &[TempIdx(3), TempIdx(4)]);
}

#[test]
fn opcode_defs_are_consistent() {
    // Every opcode's definition must fit in the op argument array.
    for (i, def) in a32t_core::OPCODE_DEFS.iter().enumerate() {
        assert!(
            (def.nb_args() as usize) <= a32t_core::MAX_OP_ARGS,
            "{} ({i}) exceeds MAX_OP_ARGS",
            def.name
        );
        assert!(!def.name.is_empty());
    }
}
