use a32t_core::{Context, TempIdx, TempKind, Type};

#[test]
fn temp_allocation_order() {
    let mut ctx = Context::new();
    let env = ctx.new_fixed(Type::I32, "env");
    let r0 = ctx.new_global(Type::I32, env, 0, "r0");
    let t = ctx.new_temp(Type::I32);

    assert_eq!(ctx.nb_globals(), 2);
    assert_eq!(ctx.nb_temps(), 3);
    assert_eq!(ctx.temp(env).kind, TempKind::Fixed);
    assert_eq!(ctx.temp(r0).kind, TempKind::Global);
    assert_eq!(ctx.temp(r0).mem_base, Some(env));
    assert_eq!(ctx.temp(t).kind, TempKind::Ebb);
}

#[test]
#[should_panic(expected = "globals must be registered before locals")]
fn globals_after_locals_panics() {
    let mut ctx = Context::new();
    let env = ctx.new_fixed(Type::I32, "env");
    ctx.new_temp(Type::I32);
    ctx.new_global(Type::I32, env, 0, "r0");
}

#[test]
fn const_temps_are_interned() {
    let mut ctx = Context::new();
    let a = ctx.new_const(Type::I32, 42);
    let b = ctx.new_const(Type::I32, 42);
    let c = ctx.new_const(Type::I32, 43);
    let d = ctx.new_const(Type::I64, 42);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(ctx.const_val(a), Some(42));
}

#[test]
fn reset_clears_everything() {
    let mut ctx = Context::new();
    let env = ctx.new_fixed(Type::I32, "env");
    ctx.new_global(Type::I32, env, 0, "r0");
    let t = ctx.new_temp(Type::I32);
    let c = ctx.new_const(Type::I32, 7);
    ctx.gen_mov(Type::I32, t, c);

    ctx.reset();
    assert_eq!(ctx.nb_temps(), 0);
    assert_eq!(ctx.nb_globals(), 0);
    assert_eq!(ctx.num_ops(), 0);
    assert!(ctx.labels().is_empty());
}

#[test]
fn truncate_ops_rewinds_labels() {
    let mut ctx = Context::new();
    let t = ctx.new_temp(Type::I32);
    let c = ctx.new_const(Type::I32, 0);
    ctx.gen_mov(Type::I32, t, c);

    let mark = ctx.next_op_idx();
    let label = ctx.new_label();
    ctx.gen_br(label);
    ctx.gen_set_label(label);
    assert_eq!(ctx.label(label).refs, 1);
    assert!(ctx.label(label).present);

    ctx.truncate_ops(mark);
    assert_eq!(ctx.num_ops(), 1);
    assert_eq!(ctx.label(label).refs, 0);
    assert!(!ctx.label(label).present);
    assert!(!ctx.label(label).is_dangling());
}

#[test]
#[should_panic(expected = "referenced but never placed")]
fn dangling_label_is_fatal() {
    let mut ctx = Context::new();
    let label = ctx.new_label();
    ctx.gen_br(label);
    ctx.assert_labels_resolved();
}

#[test]
fn branch_use_counts() {
    let mut ctx = Context::new();
    let a = ctx.new_temp(Type::I32);
    let b = ctx.new_temp(Type::I32);
    let label = ctx.new_label();
    ctx.gen_brcond(Type::I32, a, b, a32t_core::Cond::Eq, label);
    ctx.gen_br(label);
    assert_eq!(ctx.label(label).refs, 2);
    ctx.gen_set_label(label);
    ctx.assert_labels_resolved();
}

#[test]
fn call_pads_to_four_args() {
    let mut ctx = Context::new();
    let dst = ctx.new_temp(Type::I32);
    let a = ctx.new_temp(Type::I32);
    ctx.gen_call(dst, 9, &[a]);

    let op = ctx.op(a32t_core::OpIdx(0));
    assert_eq!(op.opc, a32t_core::Opcode::Call);
    assert_eq!(op.oargs(), &[dst]);
    assert_eq!(op.iargs().len(), 4);
    assert_eq!(op.iargs()[0], a);
    assert_eq!(op.cargs()[0], TempIdx(9));
}
