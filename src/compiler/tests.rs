//! Unit tests for the code generator.
//!
//! This module contains tests for:
//! - Target selection and register tables
//! - Instruction rendering
//! - Register allocation, spills and callee-saved registers
//! - Lowering of functions, statements and expressions

use std::rc::Rc;

use super::{
    allocator::{RegisterAllocator, Value, ValuePosition},
    compiler::Compiler,
    instructions::{Instruction, InstructionGenerator, Operand, OperandSize, Register},
    target::{Target, TargetAbi, TargetArchitecture},
};
use crate::{
    ast::{
        ast::{CompilationUnit, Expr, Function, Stmt},
        expressions::{BinaryExpr, BinaryOperator, SymbolExpr},
        statements::ReturnStmt,
        types::{PrimitiveType, Type},
    },
    errors::errors::CodegenError,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
    Position, Span,
};

fn checked_unit(source: &str) -> CompilationUnit {
    let file = Rc::new(String::from("test.zp"));
    let tokens = tokenize(source, Rc::clone(&file)).unwrap();
    let mut unit = parse(tokens, file).unwrap();
    let mut diagnostics = vec![];
    type_check(&mut unit, &mut diagnostics).unwrap();
    unit
}

fn generate(source: &str, target: Target) -> Result<String, CodegenError> {
    Compiler::new(target).generate(&checked_unit(source))
}

/// Instruction lines of the generated text, without the leading tab.
fn instruction_lines(assembly: &str) -> Vec<&str> {
    assembly
        .lines()
        .filter_map(|line| line.strip_prefix('\t'))
        .collect()
}

/// `a + a + ...` as a balanced tree of the given depth.
fn balanced_sum(depth: usize) -> String {
    if depth == 0 {
        String::from("a")
    } else {
        let half = balanced_sum(depth - 1);
        format!("({} + {})", half, half)
    }
}

fn span() -> Span {
    let position = Position::new(1, 1, Rc::new(String::from("manual.zp")));
    Span::new(position.clone(), position)
}

#[test]
fn test_target_new_supported_pairs() {
    let sysv = Target::new(TargetArchitecture::X86_64, TargetAbi::SystemV).unwrap();
    let ms = Target::new(TargetArchitecture::X86_64, TargetAbi::MsX64).unwrap();

    assert_eq!(sysv, Target::default());
    assert_eq!(ms.architecture(), TargetArchitecture::X86_64);
    assert_eq!(ms.abi(), TargetAbi::MsX64);
    assert_eq!(sysv.registers().parameters[0], Register::Rdi);
    assert_eq!(ms.registers().parameters, &[Register::Rcx, Register::Rdx, Register::R8, Register::R9]);
    assert_eq!(ms.registers().caller_saved.len(), 7);
    assert_eq!(sysv.registers().return_value, Register::Rax);
    assert_eq!(sysv.registers().stack_alignment_on_call, 16);
}

#[test]
fn test_target_new_unsupported_pairs() {
    let error = Target::new(TargetArchitecture::Aarch64, TargetAbi::Aarch64Eabi).unwrap_err();
    assert_eq!(
        error,
        CodegenError::UnsupportedTarget {
            architecture: String::from("aarch64"),
            abi: String::from("aarch64-eabi"),
        }
    );

    assert!(Target::new(TargetArchitecture::X86_64, TargetAbi::Aarch64Eabi).is_err());
    assert!(Target::new(TargetArchitecture::Aarch64, TargetAbi::SystemV).is_err());
}

#[test]
fn test_target_names_parse() {
    assert_eq!("x86_64".parse::<TargetArchitecture>(), Ok(TargetArchitecture::X86_64));
    assert_eq!("aarch64".parse::<TargetArchitecture>(), Ok(TargetArchitecture::Aarch64));
    assert_eq!("ms-x64".parse::<TargetAbi>(), Ok(TargetAbi::MsX64));
    assert_eq!("sysv".parse::<TargetAbi>(), Ok(TargetAbi::SystemV));
    assert!("riscv".parse::<TargetArchitecture>().is_err());
}

#[test]
fn test_operand_size_from_bits() {
    assert_eq!(OperandSize::from_bits(1).unwrap(), OperandSize::I8);
    assert_eq!(OperandSize::from_bits(8).unwrap(), OperandSize::I8);
    assert_eq!(OperandSize::from_bits(9).unwrap(), OperandSize::I16);
    assert_eq!(OperandSize::from_bits(32).unwrap(), OperandSize::I32);
    assert_eq!(OperandSize::from_bits(64).unwrap(), OperandSize::I64);
    assert_eq!(
        OperandSize::from_bits(65).unwrap_err(),
        CodegenError::OperandTooWide { bits: 65 }
    );
    assert_eq!(OperandSize::I16.bytes(), 2);
    assert_eq!(OperandSize::I64.suffix(), "q");
}

#[test]
fn test_register_names() {
    assert_eq!(Register::Rax.name(OperandSize::I8), "al");
    assert_eq!(Register::Rsi.name(OperandSize::I8), "sil");
    assert_eq!(Register::R9.name(OperandSize::I16), "r9w");
    assert_eq!(Register::Rdi.name(OperandSize::I32), "edi");
    assert_eq!(Register::R15.name(OperandSize::I64), "r15");
}

#[test]
fn test_instruction_rendering() {
    let mov = Instruction::new(
        "mov",
        OperandSize::I16,
        vec![Operand::Register(Register::Rcx), Operand::Register(Register::R10)],
    );
    assert_eq!(mov.to_string(), "movw %cx, %r10w");

    let sub = Instruction::new(
        "sub",
        OperandSize::I64,
        vec![Operand::Immediate(16), Operand::Register(Register::Rsp)],
    );
    assert_eq!(sub.to_string(), "subq $16, %rsp");

    let store = Instruction::new(
        "mov",
        OperandSize::I8,
        vec![
            Operand::Register(Register::Rdx),
            Operand::Memory {
                base: Register::Rbp,
                offset: -3,
            },
        ],
    );
    assert_eq!(store.to_string(), "movb %dl, -3(%rbp)");

    let ret = Instruction::new("ret", OperandSize::I64, vec![]);
    assert_eq!(ret.to_string(), "retq");

    let jump = Instruction::without_suffix("jmp", vec![Operand::Label(String::from("l3_end"))]);
    assert_eq!(jump.to_string(), "jmp l3_end");

    // Rendering twice gives the same text.
    assert_eq!(store.to_string(), store.to_string());
}

#[test]
fn test_generator_helpers() {
    let generator = InstructionGenerator::new(Target::default());

    let prologue = generator
        .prologue(0)
        .iter()
        .map(|instruction| instruction.to_string())
        .collect::<Vec<_>>();
    assert_eq!(prologue, vec!["pushq %rbp", "movq %rsp, %rbp"]);

    let prologue = generator.prologue(24);
    assert_eq!(prologue[2].to_string(), "subq $24, %rsp");

    let epilogue = generator
        .epilogue(24)
        .iter()
        .map(|instruction| instruction.to_string())
        .collect::<Vec<_>>();
    assert_eq!(epilogue, vec!["addq $24, %rsp", "popq %rbp", "retq"]);

    assert_eq!(generator.label("l0_end").to_string(), "l0_end:");
    assert_eq!(generator.save_register(Register::Rbx).to_string(), "pushq %rbx");
    assert_eq!(generator.restore_register(Register::R12).to_string(), "popq %r12");
    assert_eq!(generator.move_register(OperandSize::I32, Register::Rax, Register::Rax), None);
    assert_eq!(
        generator.stack_store(OperandSize::I32, Register::Rax, 4).to_string(),
        "movl %eax, -8(%rbp)"
    );
}

#[test]
fn test_add_sequence() {
    let generator = InstructionGenerator::new(Target::default());
    let render = |instructions: Vec<Instruction>| {
        instructions
            .iter()
            .map(|instruction| instruction.to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(
        render(generator.add(OperandSize::I32, Register::Rdi, Register::Rsi, Register::R11)),
        vec!["movl %edi, %r11d", "addl %esi, %r11d"]
    );
    assert_eq!(
        render(generator.add(OperandSize::I64, Register::R11, Register::Rsi, Register::R11)),
        vec!["addq %rsi, %r11"]
    );
    // The right operand already sits in the destination.
    assert_eq!(
        render(generator.add(OperandSize::I64, Register::Rdi, Register::R11, Register::R11)),
        vec!["addq %rdi, %r11"]
    );
}

#[test]
fn test_text_framing() {
    let generator = InstructionGenerator::new(Target::default());

    assert_eq!(generator.file_header("a.zp"), ".file \"a.zp\"\n.text");
    assert_eq!(generator.function_header("f"), ".globl f\n.type f, @function\nf:");
    assert_eq!(generator.function_footer("f"), ".size f, .-f");
    assert!(generator
        .file_footer()
        .ends_with(".section .note.GNU-stack,\"\",@progbits"));
}

#[test]
fn test_allocator_caller_saved_first() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    let first = allocator.create_value(OperandSize::I32, false);
    let second = allocator.create_value(OperandSize::I32, false);

    assert_eq!(first.position, ValuePosition::Register(Register::R11));
    assert_eq!(second.position, ValuePosition::Register(Register::R10));
    assert!(allocator.saved_registers().is_empty());

    allocator.destroy_value(&first);
    let third = allocator.create_value(OperandSize::I64, false);
    assert_eq!(third.position, ValuePosition::Register(Register::R11));
}

#[test]
fn test_allocator_callee_saved_then_stack() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    for _ in 0..9 {
        allocator.create_value(OperandSize::I64, false);
    }
    let callee = allocator.create_value(OperandSize::I64, false);
    assert_eq!(callee.position, ValuePosition::Register(Register::R15));
    assert_eq!(allocator.saved_registers(), &[Register::R15]);

    for _ in 0..4 {
        allocator.create_value(OperandSize::I64, false);
    }
    assert_eq!(
        allocator.saved_registers(),
        &[Register::R15, Register::R14, Register::R13, Register::R12, Register::Rbx]
    );

    let byte = allocator.create_value(OperandSize::I8, false);
    assert_eq!(byte.position, ValuePosition::Stack(0));
    assert_eq!(allocator.stack_size(), 1);

    // Aligned up to 4 before the slot is taken.
    let word = allocator.create_value(OperandSize::I32, false);
    assert_eq!(word.position, ValuePosition::Stack(4));
    assert_eq!(allocator.stack_size(), 8);

    let quad = allocator.create_value(OperandSize::I64, false);
    assert_eq!(quad.position, ValuePosition::Stack(8));
    assert_eq!(allocator.stack_size(), 16);

    // Stack slots are never reclaimed.
    allocator.destroy_value(&quad);
    assert_eq!(allocator.stack_size(), 16);
}

#[test]
fn test_allocator_fixed_values() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    let parameter = allocator.create_fixed_value(OperandSize::I32, true, Register::R11);
    assert!(!allocator.is_available(Register::R11));

    let temporary = allocator.create_value(OperandSize::I32, false);
    assert_eq!(temporary.position, ValuePosition::Register(Register::R10));

    // Variables survive destroy_value.
    allocator.destroy_value(&parameter);
    assert!(!allocator.is_available(Register::R11));

    allocator.destroy_variable(&parameter);
    assert!(allocator.is_available(Register::R11));

    // Releasing twice does not hand the register out twice.
    allocator.destroy_variable(&parameter);
    let a = allocator.create_value(OperandSize::I32, false);
    let b = allocator.create_value(OperandSize::I32, false);
    assert_ne!(a.position, b.position);
}

#[test]
fn test_allocator_stale_value_keeps_reassigned_register() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    let operand = allocator.create_value(OperandSize::I64, false);
    allocator.destroy_value(&operand);
    let result = allocator.create_value(OperandSize::I64, false);
    assert_eq!(result.position, operand.position);

    // The operand no longer owns R11, so releasing it again is a no-op.
    allocator.destroy_value(&operand);
    assert!(!allocator.is_available(Register::R11));

    let next = allocator.create_value(OperandSize::I64, false);
    assert_ne!(next.position, result.position);

    allocator.destroy_value(&result);
    assert!(allocator.is_available(Register::R11));
}

#[test]
fn test_allocator_fixed_callee_saved_is_preserved() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    allocator.create_fixed_value(OperandSize::I64, true, Register::Rbx);

    assert_eq!(allocator.saved_registers(), &[Register::Rbx]);
}

#[test]
fn test_allocator_temporaries_ignore_destroy_variable() {
    let mut allocator = RegisterAllocator::new(&Target::default());

    let temporary = allocator.create_value(OperandSize::I32, false);
    allocator.destroy_variable(&temporary);

    assert!(!allocator.is_available(Register::R11));
}

#[test]
fn test_generate_add_sysv() {
    let assembly = generate("fn f(x: i32, y: i32) { return x + y; }", Target::default()).unwrap();

    let expected = [
        ".file \"test.zp\"",
        ".text",
        ".globl f",
        ".type f, @function",
        "f:",
        "\tpushq %rbp",
        "\tmovq %rsp, %rbp",
        "\tmovl %edi, %r11d",
        "\taddl %esi, %r11d",
        "\tmovl %r11d, %eax",
        "\tjmp l0_end",
        "\tl0_end:",
        "\tpopq %rbp",
        "\tretq",
        ".size f, .-f",
        ".ident \"Compiled by zipc\"",
        ".section .note.GNU-stack,\"\",@progbits",
    ]
    .join("\n");
    assert_eq!(assembly, expected);
}

#[test]
fn test_generate_add_ms_x64() {
    let target = Target::new(TargetArchitecture::X86_64, TargetAbi::MsX64).unwrap();
    let assembly = generate("fn f(x: i64, y: i64) { return x + y; }", target).unwrap();

    assert_eq!(
        instruction_lines(&assembly),
        vec![
            "pushq %rbp",
            "movq %rsp, %rbp",
            "movq %rcx, %r11",
            "addq %rdx, %r11",
            "movq %r11, %rax",
            "jmp l0_end",
            "l0_end:",
            "popq %rbp",
            "retq",
        ]
    );
}

#[test]
fn test_generate_return_parameter() {
    let assembly = generate("fn id(x: u8) { return x; }", Target::default()).unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..4],
        ["movb %dil, %al", "jmp l0_end"]
    );
}

#[test]
fn test_generate_result_size_follows_type() {
    let assembly = generate("fn f(a: i8, b: i64) { return a + b; }", Target::default()).unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..5],
        ["movq %rdi, %r11", "addq %rsi, %r11", "movq %r11, %rax"]
    );
}

#[test]
fn test_generate_chained_add_reuses_register() {
    let assembly = generate(
        "fn f(a: i32, b: i32, c: i32) { return a + b + c; }",
        Target::default(),
    )
    .unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..6],
        ["movl %edi, %r11d", "addl %esi, %r11d", "addl %edx, %r11d", "movl %r11d, %eax"]
    );
}

#[test]
fn test_generate_right_nested_add() {
    let assembly = generate(
        "fn f(a: i32, b: i32, c: i32) { return a + (b + c); }",
        Target::default(),
    )
    .unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..6],
        ["movl %esi, %r11d", "addl %edx, %r11d", "addl %edi, %r11d", "movl %r11d, %eax"]
    );
}

#[test]
fn test_generate_nested_adds_keep_live_result() {
    let assembly = generate(
        "fn f(a: i64, b: i64, c: i64, d: i64) { return ((a + b) + (c + d)) + (a + b); }",
        Target::default(),
    )
    .unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..12],
        [
            "movq %rdi, %r11",
            "addq %rsi, %r11",
            "movq %rdx, %r10",
            "addq %rcx, %r10",
            "addq %r11, %r10",
            "movq %rdi, %r11",
            "addq %rsi, %r11",
            "addq %r10, %r11",
            "movq %r11, %rax",
            "jmp l0_end",
        ]
    );
}

#[test]
fn test_generate_multiple_functions() {
    let assembly = generate(
        "fn f(a: i32) { return a; }\nfn g(a: i64, b: i64) { a + b; return b; }",
        Target::default(),
    )
    .unwrap();

    assert!(assembly.contains(".globl g\n.type g, @function\ng:\n"));
    assert!(assembly.contains("\tjmp l0_end\n"));
    assert!(assembly.contains("\tjmp l1_end\n"));
    assert!(assembly.contains("\tl1_end:\n"));
    assert!(assembly.contains("\tmovq %rsi, %rax\n"));
}

#[test]
fn test_generate_early_return() {
    let assembly = generate("fn f(a: i32, b: i32) { return a; return b; }", Target::default()).unwrap();

    assert_eq!(
        instruction_lines(&assembly)[2..6],
        ["movl %edi, %eax", "jmp l0_end", "movl %esi, %eax", "jmp l0_end"]
    );
}

#[test]
fn test_generate_callee_saved_frame() {
    // Nine live temporaries with eight free caller-saved registers.
    let source = format!("fn f(a: i64) {{ return {}; }}", balanced_sum(9));
    let assembly = generate(&source, Target::default()).unwrap();
    let lines = instruction_lines(&assembly);

    assert_eq!(lines[0..3], ["pushq %rbp", "movq %rsp, %rbp", "pushq %r15"]);
    let end = lines.iter().position(|line| *line == "l0_end:").unwrap();
    assert_eq!(lines[end + 1..], ["popq %r15", "popq %rbp", "retq"]);
}

#[test]
fn test_generate_out_of_registers() {
    // Fourteen live temporaries exhaust both register pools.
    let source = format!("fn f(a: i64) {{ return {}; }}", balanced_sum(14));
    let error = generate(&source, Target::default()).unwrap_err();

    assert_eq!(error, CodegenError::OutOfRegisters);
}

#[test]
fn test_generate_unsupported_operator() {
    let error = generate("fn f(a: i32, b: i32) { return a * b; }", Target::default()).unwrap_err();

    assert_eq!(
        error,
        CodegenError::NotImplemented {
            feature: String::from("binary operator `*`")
        }
    );
}

#[test]
fn test_generate_function_parameter() {
    let error = generate("fn f(g: fn() -> i32, a: i32) { return a; }", Target::default()).unwrap_err();

    assert_eq!(error.to_string(), "not implemented: non-primitive parameters");
}

#[test]
fn test_generate_too_many_parameters() {
    let target = Target::new(TargetArchitecture::X86_64, TargetAbi::MsX64).unwrap();
    let error = generate(
        "fn f(a: i32, b: i32, c: i32, d: i32, e: i32) { return a; }",
        target,
    )
    .unwrap_err();

    assert!(matches!(error, CodegenError::NotImplemented { .. }));
    assert!(generate(
        "fn f(a: i32, b: i32, c: i32, d: i32, e: i32) { return a; }",
        Target::default()
    )
    .is_ok());
}

#[test]
fn test_generate_requires_types() {
    let left = Expr::Symbol(SymbolExpr::new(String::from("a"), span()));
    let right = Expr::Symbol(SymbolExpr::new(String::from("a"), span()));
    let unit = CompilationUnit {
        functions: vec![Function::new(
            String::from("f"),
            vec![(String::from("a"), Type::Primitive(PrimitiveType::I32))],
            vec![Stmt::Return(ReturnStmt {
                value: Expr::Binary(BinaryExpr::new(BinaryOperator::Add, left, right, span())),
                span: span(),
            })],
            span(),
        )],
        span: span(),
    };

    let error = Compiler::new(Target::default()).generate(&unit).unwrap_err();
    assert_eq!(error, CodegenError::MissingType);
}

#[test]
fn test_generate_unresolved_variable() {
    let unit = CompilationUnit {
        functions: vec![Function::new(
            String::from("f"),
            vec![],
            vec![Stmt::Return(ReturnStmt {
                value: Expr::Symbol(SymbolExpr::new(String::from("ghost"), span())),
                span: span(),
            })],
            span(),
        )],
        span: span(),
    };

    let error = Compiler::new(Target::default()).generate(&unit).unwrap_err();
    assert_eq!(
        error,
        CodegenError::UnresolvedVariable {
            name: String::from("ghost")
        }
    );
}

#[test]
fn test_value_register_accessor() {
    let value = Value {
        id: 0,
        size: OperandSize::I32,
        position: ValuePosition::Stack(4),
        is_variable: false,
    };

    assert_eq!(value.register(), None);
}
