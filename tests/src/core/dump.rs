use a32t_core::dump::dump_ops;
use a32t_core::{Context, Cond, Type};

fn dump_to_string(ctx: &Context) -> String {
    let mut buf = Vec::new();
    dump_ops(ctx, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn dump_basic_ops() {
    let mut ctx = Context::new();
    let env = ctx.new_fixed(Type::I32, "env");
    let r0 = ctx.new_global(Type::I32, env, 0, "r0");
    let t = ctx.new_temp(Type::I32);
    let c = ctx.new_const(Type::I32, 0x2a);

    ctx.gen_insn_start(0x1000, 0);
    ctx.gen_add(Type::I32, t, r0, c);
    ctx.gen_mov(Type::I32, r0, t);
    ctx.gen_exit_tb(0);

    let text = dump_to_string(&ctx);
    assert!(text.contains("---- 0x00001000"), "{text}");
    assert!(text.contains("add_i32 tmp0, r0, $0x2a"), "{text}");
    assert!(text.contains("mov_i32 r0, tmp0"), "{text}");
    assert!(text.contains("exit_tb $0x0"), "{text}");
}

#[test]
fn dump_branches_and_labels() {
    let mut ctx = Context::new();
    let a = ctx.new_temp(Type::I32);
    let b = ctx.new_temp(Type::I32);
    let label = ctx.new_label();
    ctx.gen_brcond(Type::I32, a, b, Cond::Geu, label);
    ctx.gen_set_label(label);

    let text = dump_to_string(&ctx);
    assert!(text.contains("brcond_i32 tmp0, tmp1, geu, L0"), "{text}");
    assert!(text.contains(" L0:"), "{text}");
}

#[test]
fn dump_condexec_annotation() {
    let mut ctx = Context::new();
    ctx.gen_insn_start(0x100, 0x23);
    let text = dump_to_string(&ctx);
    assert!(text.contains("condexec=0x23"), "{text}");
}
