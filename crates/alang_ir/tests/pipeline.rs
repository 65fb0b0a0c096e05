use alang_ir::*;
use alang_lexer::Span;
use alang_parser::Parser;

fn lower(source: &str) -> IrResult<Program<UnresolvedCallee>> {
    lower_program(&Parser::parse(source).unwrap())
}

fn compile(source: &str) -> IrResult<Program<CallTarget>> {
    generate(&Parser::parse(source).unwrap())
}

fn phis<C>(func: &IrFunction<C>) -> Vec<((BranchId, Reg), (BranchId, Reg), Reg)> {
    func.instrs
        .iter()
        .filter_map(|i| match i {
            Instr::Phi { first, second, dest } => Some((*first, *second, *dest)),
            _ => None,
        })
        .collect()
}

fn returned<C>(func: &IrFunction<C>) -> Option<Reg> {
    func.instrs.iter().rev().find_map(|i| match i {
        Instr::Return { value } => *value,
        _ => None,
    })
}

#[test]
fn test_argument_plumbing() {
    let program = compile("func f(a: u16, b: u16): u16 { return a; }").unwrap();
    assert_eq!(program.functions.len(), 1);

    let f = &program.functions[0];
    let u16_ty = IrType::int(false, 16);
    assert_eq!(f.return_type, u16_ty);
    assert_eq!(f.params.iter().map(|p| p.ty).collect::<Vec<_>>(), vec![u16_ty, u16_ty]);
    assert_eq!(f.reg_types, vec![u16_ty, u16_ty]);
    assert_eq!(
        f.instrs,
        vec![
            Instr::StoreArg { index: 0, dest: Reg(0) },
            Instr::StoreArg { index: 1, dest: Reg(1) },
            Instr::Return { value: Some(Reg(0)) },
        ]
    );
}

#[test]
fn test_literal_plus_u16_variable_is_signed_16() {
    let program = compile("func f(): u16 { var x: u16 = 5; return 1 + x; }").unwrap();
    let f = &program.functions[0];

    assert_eq!(f.reg_type(Reg(0)), IrType::int(false, 16));
    assert_eq!(f.reg_type(Reg(1)), IrType::default_int());
    assert!(matches!(f.instrs[2], Instr::Add { lhs: Reg(1), rhs: Reg(0), dest: Reg(2) }));
    assert_eq!(f.reg_type(Reg(2)), IrType::int(true, 16));
    assert!(program.ensure_fully_typed().is_ok());
}

#[test]
fn test_phi_when_both_arms_reassign() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 0;
            if (c == 0) { x = 1; } else { x = 2; }
            return x;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    assert_eq!(phis(f), vec![((BranchId(0), Reg(4)), (BranchId(1), Reg(5)), Reg(6))]);
    assert_eq!(returned(f), Some(Reg(6)));
    // phi takes the type of the variable before the branch
    assert_eq!(f.reg_type(Reg(6)), IrType::int(false, 16));
    assert_eq!(
        f.branch_markers,
        vec![(BranchId(0), 5), (BranchId(1), 7), (BranchId(2), 9)]
    );
}

#[test]
fn test_phi_when_only_then_arm_reassigns() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 7;
            if (c) { x = 1; }
            return x;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    // reg0 = c, reg1 = x, reg2 = 1
    assert_eq!(phis(f), vec![((BranchId(0), Reg(2)), (BranchId(1), Reg(1)), Reg(3))]);
    assert_eq!(returned(f), Some(Reg(3)));
}

#[test]
fn test_phi_when_only_else_arm_reassigns() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 7;
            if (c) { } else { x = 1; }
            return x;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    assert_eq!(phis(f), vec![((BranchId(0), Reg(1)), (BranchId(1), Reg(2)), Reg(3))]);
}

#[test]
fn test_last_reassignment_in_arm_wins() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 7;
            if (c) { x = 1; x = 2; }
            return x;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    assert_eq!(phis(f), vec![((BranchId(0), Reg(3)), (BranchId(1), Reg(1)), Reg(4))]);
}

#[test]
fn test_one_phi_per_variable_in_log_order() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 1;
            var y: u16 = 2;
            if (c) { y = 3; x = 4; } else { x = 5; }
            return x + y;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    // reg0 = c, reg1 = x, reg2 = y, reg3 = 3, reg4 = 4, reg5 = 5
    assert_eq!(
        phis(f),
        vec![
            ((BranchId(0), Reg(3)), (BranchId(1), Reg(2)), Reg(6)),
            ((BranchId(0), Reg(4)), (BranchId(1), Reg(5)), Reg(7)),
        ]
    );
    assert!(matches!(f.instrs.last(), Some(Instr::Return { value: Some(Reg(8)) })));
    assert!(f.instrs.contains(&Instr::Add { lhs: Reg(7), rhs: Reg(6), dest: Reg(8) }));
}

#[test]
fn test_variables_declared_in_arm_get_no_phi() {
    let source = "
        func f(c: u16) {
            if (c) { var y: u16 = 1; y = 2; }
        }";
    let program = compile(source).unwrap();
    assert!(phis(&program.functions[0]).is_empty());
}

#[test]
fn test_nested_if_merges_into_outer_arm() {
    let source = "
        func f(c: u16): u16 {
            var x: u16 = 0;
            if (c) { if (c) { x = 1; } }
            return x;
        }";
    let program = compile(source).unwrap();
    let f = &program.functions[0];

    assert_eq!(
        phis(f),
        vec![
            ((BranchId(3), Reg(2)), (BranchId(4), Reg(1)), Reg(3)),
            ((BranchId(0), Reg(3)), (BranchId(1), Reg(1)), Reg(4)),
        ]
    );
    assert_eq!(returned(f), Some(Reg(4)));
}

#[test]
fn test_block_declarations_do_not_leak() {
    let err = compile("func f() { { var y: u16 = 1; } y; }").unwrap_err();
    assert!(matches!(err, IrError::UndeclaredVariable { ref name, .. } if name == "y"));
}

#[test]
fn test_return_without_value_uses_nothing_register() {
    let program = compile("func f() { return; }").unwrap();
    let f = &program.functions[0];
    assert_eq!(f.return_type, IrType::Nothing);
    assert_eq!(f.reg_types, vec![IrType::Nothing]);
    assert_eq!(f.instrs, vec![Instr::Return { value: Some(Reg(0)) }]);
}

#[test]
fn test_large_literal_keeps_full_precision() {
    let program = compile("func f() { 340282366920938463463374607431768211456; }").unwrap();
    let Instr::StoreConst { value, .. } = &program.functions[0].instrs[0] else {
        panic!("expected const");
    };
    assert_eq!(value.to_string(), "340282366920938463463374607431768211456");
}

#[test]
fn test_unresolved_function() {
    let err = compile("func main() { nope(); }").unwrap_err();
    assert_eq!(err, IrError::UnresolvedFunction { name: "nope".into(), span: Span::new(14, 20) });
}

#[test]
fn test_print_resolves_to_intrinsic() {
    let program = compile("func main() { print(1); }").unwrap();
    let main = &program.functions[0];
    assert!(matches!(
        main.instrs[1],
        Instr::Call { callee: CallTarget::Intrinsic(Intrinsic::Print), .. }
    ));
    assert_eq!(main.reg_type(Reg(1)), IrType::Nothing);
}

#[test]
fn test_forward_calls_resolve() {
    let program = compile("func main() { later(); } func later(): u16 { return 1; }").unwrap();
    let main = &program.functions[0];
    assert!(matches!(
        main.instrs[0],
        Instr::Call { callee: CallTarget::Function { index: 1, .. }, dest: Reg(0), .. }
    ));
    assert_eq!(main.reg_type(Reg(0)), IrType::int(false, 16));
}

#[test]
fn test_lowered_calls_are_by_name() {
    let program = lower("func main() { g(1); }").unwrap();
    let Instr::Call { callee, args, .. } = &program.functions[0].instrs[1] else {
        panic!("expected call");
    };
    assert_eq!(callee.name, "g");
    assert_eq!(args, &vec![Reg(0)]);
}

#[test]
fn test_generation_errors() {
    assert!(matches!(
        compile("func f() { x = 1; }"),
        Err(IrError::UndeclaredVariable { ref name, .. }) if name == "x"
    ));
    assert!(matches!(
        compile("func f(a: u16, a: u16) { }"),
        Err(IrError::DuplicateDeclaration { ref name, .. }) if name == "a"
    ));
    assert!(matches!(
        compile("func f(a: i32) { }"),
        Err(IrError::UnknownType { ref name, .. }) if name == "i32"
    ));
    assert!(matches!(
        compile("func f(): bool { return 1; }"),
        Err(IrError::UnknownType { ref name, .. }) if name == "bool"
    ));
    assert!(matches!(
        compile("func f(a: u16) { a != 1; }"),
        Err(IrError::UnsupportedConstruct { .. })
    ));
    assert!(matches!(
        compile("func f() { (1)(2); }"),
        Err(IrError::UnsupportedConstruct { .. })
    ));
    assert!(matches!(
        compile("var x: u16 = 1;"),
        Err(IrError::UnsupportedConstruct { span, .. }) if span == Span::new(0, 15)
    ));
}

#[test]
fn test_untyped_register_surfaces_after_inference() {
    let program = compile("func f(a: u16) { (a == 1) + 1; }").unwrap();
    assert_eq!(program.functions[0].reg_type(Reg(4)), IrType::Unknown);
    assert_eq!(
        program.ensure_fully_typed(),
        Err(UntypedRegister { function: "f".into(), reg: Reg(4) })
    );
}

#[test]
fn test_inference_reaches_fixpoint() {
    let source = "
        func main() { var x: u16 = 1; print(add(x, 2) - 3); }
        func add(a: u16, b: u16): u16 { return a + b; }";
    let mut program = resolve_program(lower(source).unwrap()).unwrap();
    let report = infer_types(&mut program);
    assert_eq!(report.sweeps, 2);

    let again = infer_types(&mut program);
    assert_eq!(again, InferenceReport { sweeps: 1, inferred: 0 });
    assert!(program.ensure_fully_typed().is_ok());
}

#[test]
fn test_disassembly() {
    let source = "
        func main() {
            var x: u16 = 1;
            if (x == 2) { x = add(x, 3); }
            print(x);
            return;
        }

        func add(a: u16, b: u16): u16 {
            return a + b;
        }";
    let program = compile(source).unwrap();

    let expected = "\
0: nothing main()
.regs 0:u16, 1:i16, 2:bool, 3:i16, 4:u16, 5:u16, 6:nothing, 7:nothing
  0x0000  reg0 <- const 1
  0x0001  reg1 <- const 2
  0x0002  reg2 <- cmpeq reg0, reg1
  0x0003  condbr reg2, br0, br1
br0:
  0x0004  reg3 <- const 3
  0x0005  reg4 <- call #1 add(reg0, reg3)
  0x0006  br br2
br1:
  0x0007  br br2
br2:
  0x0008  reg5 <- phi [br0: reg4], [br1: reg0]
  0x0009  reg6 <- call #-1 print(reg5)
  0x000a  ret reg7

1: u16 add(u16, u16)
.regs 0:u16, 1:u16, 2:u16
  0x0000  reg0 <- arg 0
  0x0001  reg1 <- arg 1
  0x0002  reg2 <- add reg0, reg1
  0x0003  ret reg2
";
    assert_eq!(program.to_string(), expected);
}

#[test]
fn test_lowered_disassembly_shows_names() {
    let program = lower("func main() { print(1); }").unwrap();
    assert_eq!(
        program.to_string(),
        "0: nothing main()\n.regs 0:i16, 1:unknown\n  0x0000  reg0 <- const 1\n  0x0001  reg1 <- call print(reg0)\n"
    );
}
