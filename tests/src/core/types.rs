use a32t_core::{Cond, MemOp, Type};

#[test]
fn cond_invert_is_involutive() {
    let conds = [
        Cond::Never,
        Cond::Always,
        Cond::Eq,
        Cond::Ne,
        Cond::Lt,
        Cond::Ge,
        Cond::Le,
        Cond::Gt,
        Cond::Ltu,
        Cond::Geu,
        Cond::Leu,
        Cond::Gtu,
        Cond::TstEq,
        Cond::TstNe,
    ];
    for c in conds {
        assert_eq!(c.invert().invert(), c);
        assert_eq!(c.swap().swap(), c);
        assert_eq!(Cond::from_raw(c as u32), Some(c));
    }
    assert_eq!(Cond::from_raw(5), None);
}

#[test]
fn cond_classes() {
    assert!(Cond::Lt.is_signed());
    assert!(!Cond::Lt.is_unsigned());
    assert!(Cond::Geu.is_unsigned());
    assert_eq!(Cond::Lt.swap(), Cond::Gt);
    assert_eq!(Cond::Eq.swap(), Cond::Eq);
}

#[test]
fn memop_fields() {
    let m = MemOp::ul().aligned();
    assert_eq!(m.size_bytes(), 4);
    assert!(!m.is_signed());
    assert!(!m.is_bswap());
    assert_eq!(m.bits() & 0x70, MemOp::ALIGN_4);

    let m = MemOp::sw().swapped();
    assert_eq!(m.size_bytes(), 2);
    assert!(m.is_signed());
    assert!(m.is_bswap());

    assert_eq!(MemOp::uq().aligned().bits() & 0x70, MemOp::ALIGN_8);
}

#[test]
fn type_sizes() {
    assert_eq!(Type::I32.size_bytes(), 4);
    assert_eq!(Type::I64.size_bytes(), 8);
}
