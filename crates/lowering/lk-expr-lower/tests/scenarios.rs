//! End-to-end lowering of small expressions

#![allow(
    clippy::unwrap_used,
    clippy::tests_outside_test_module,
    clippy::min_ident_chars,
    clippy::needless_raw_string_hashes,
    clippy::shadow_unrelated,
    clippy::unreachable,
    reason = "integration tests unwrap fixtures and name locals after the source identifiers they build"
)]

mod common;

use common::{int_const, Env, Source, I32, I64};
use expect_test::expect;
use lk_expr_lower::{LowerError, LoweredValue};
use lk_ir::{FunctionBuilder, FunctionType, IrEmitter as _, IrError, Module, Type};
use lk_syntax::{BinaryOp, BindingKind, UnaryOp};

fn signature(params: Vec<Type>) -> FunctionType {
    FunctionType::new(params, Type::Void)
}

#[test]
fn test_constant_times_runtime_int32() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I32)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let x = builder.param(0).unwrap();
    env.scope.define(
        src.sym("x"),
        BindingKind::Var,
        LoweredValue::runtime(x, Type::Int(I32)),
    );

    let five = src.int(5);
    let x_ref = src.ident("x");
    let product = src.binary(BinaryOp::Mul, five, x_ref);

    let value = env.lower(&src, &mut builder, product).unwrap();
    assert!(!value.is_constant());
    assert_eq!(value.ty(), &Type::Int(I32));

    expect![[r#"
        fn @f(%0: i32) -> void {
            %1 = mul i32 5, %0
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_constant_addition_folds() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let three = src.int(3);
    let four = src.int(4);
    let sum = src.binary(BinaryOp::Add, three, four);

    let value = env.lower(&src, &mut builder, sum).unwrap();
    assert_eq!(value, LoweredValue::constant(int_const(I64, 7)));
    assert!(builder.instructions().is_empty());
}

#[test]
fn test_index_into_local_array() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let array = Type::array(Type::Int(I64), 5);
    let slot = builder.alloca(array.clone()).unwrap();
    env.scope.define(
        src.sym("a"),
        BindingKind::Var,
        LoweredValue::runtime(slot, array).mark_indirect(),
    );

    let a = src.ident("a");
    let two = src.int(2);
    let element = src.index(a, two);

    let value = env.lower(&src, &mut builder, element).unwrap();
    assert_eq!(value.ty(), &Type::Int(I64));

    expect![[r#"
        fn @f() -> void {
            %0 = alloca [5 x i64]
            %1 = elementptr %0, [0, 2]
            %2 = load i64, %1
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_type_name_call_is_a_conversion() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let three = src.float(3.0);
    let call = src.call("int32", vec![three]);

    let value = env.lower(&src, &mut builder, call).unwrap();
    assert_eq!(value, LoweredValue::constant(int_const(I32, 3)));
    assert!(builder.instructions().is_empty());
    assert!(env.external.calls().is_empty());
}

#[test]
fn test_undefined_function() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let one = src.int(1);
    let two = src.int(2);
    let call = src.call("foo", vec![one, two]);

    let err = env.lower(&src, &mut builder, call).unwrap_err();
    assert!(
        matches!(&err, LowerError::UnresolvedSymbol { name, .. } if name == "foo"),
        "{err}"
    );
    assert!(builder.instructions().is_empty());
}

#[test]
fn test_runtime_slot_is_loaded_before_use() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let slot = builder.alloca(Type::Int(I32)).unwrap();
    env.scope.define(
        src.sym("x"),
        BindingKind::Var,
        LoweredValue::runtime(slot, Type::Int(I32)).mark_indirect(),
    );

    let x = src.ident("x");
    let limit = src.int(100);
    let less = src.binary(BinaryOp::Lt, x, limit);

    let value = env.lower(&src, &mut builder, less).unwrap();
    assert_eq!(value.ty(), &Type::bool());

    expect![[r#"
        fn @f() -> void {
            %0 = alloca i32
            %1 = load i32, %0
            %2 = icmp ult %1, 100
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_both_runtime_operands_are_loaded() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I64)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let slot = builder.alloca(Type::Int(I64)).unwrap();
    let param = builder.param(0).unwrap();
    env.scope.define(
        src.sym("total"),
        BindingKind::Var,
        LoweredValue::runtime(slot, Type::Int(I64)).mark_indirect(),
    );
    env.scope.define(
        src.sym("n"),
        BindingKind::Var,
        LoweredValue::runtime(param, Type::Int(I64)),
    );

    let total = src.ident("total");
    let n = src.ident("n");
    let diff = src.binary(BinaryOp::Sub, total, n);

    env.lower(&src, &mut builder, diff).unwrap();
    expect![[r#"
        fn @f(%0: i64) -> void {
            %1 = alloca i64
            %2 = load i64, %1
            %3 = sub i64 %2, %0
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_runtime_operands_of_different_types() {
    let module = Module::new("test");
    let params = vec![Type::Int(I32), Type::Int(I64)];
    let mut builder = FunctionBuilder::new(&module, "f", signature(params));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let (narrow, wide) = (builder.param(0).unwrap(), builder.param(1).unwrap());
    env.scope.define(src.sym("a"), BindingKind::Var, LoweredValue::runtime(narrow, Type::Int(I32)));
    env.scope.define(src.sym("b"), BindingKind::Var, LoweredValue::runtime(wide, Type::Int(I64)));

    let a = src.ident("a");
    let b = src.ident("b");
    let sum = src.binary(BinaryOp::Add, a, b);

    let err = env.lower(&src, &mut builder, sum).unwrap_err();
    assert!(matches!(err, LowerError::TypeMismatch { .. }), "{err}");
    assert!(builder.instructions().is_empty());
}

#[test]
fn test_constant_out_of_range_for_runtime_type() {
    let module = Module::new("test");
    let u8_ty = Type::int(8, false);
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![u8_ty.clone()]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let param = builder.param(0).unwrap();
    env.scope.define(src.sym("b"), BindingKind::Var, LoweredValue::runtime(param, u8_ty));

    let big = src.int(300);
    let b = src.ident("b");
    let sum = src.binary(BinaryOp::Add, big, b);

    let err = env.lower(&src, &mut builder, sum).unwrap_err();
    assert!(
        matches!(&err, LowerError::TypeMismatch { expected, .. } if expected == "u8"),
        "{err}"
    );
    assert!(builder.instructions().is_empty());
}

#[test]
fn test_global_constant_uses_initializer() {
    let mut module = Module::new("test");
    let limit = module
        .add_global("limit", Type::Int(I64), Some(int_const(I64, 10)), true)
        .unwrap();
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I64)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let param = builder.param(0).unwrap();
    env.scope.define(
        src.sym("limit"),
        BindingKind::Const,
        LoweredValue::global_constant(limit, Type::Int(I64)),
    );
    env.scope.define(src.sym("x"), BindingKind::Var, LoweredValue::runtime(param, Type::Int(I64)));

    let limit_ref = src.ident("limit");
    let x = src.ident("x");
    let product = src.binary(BinaryOp::Mul, limit_ref, x);

    env.lower(&src, &mut builder, product).unwrap();
    expect![[r#"
        fn @f(%0: i64) -> void {
            %1 = mul i64 10, %0
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_global_variable_is_loaded() {
    let mut module = Module::new("test");
    let counter = module
        .add_global("counter", Type::Int(I64), Some(int_const(I64, 0)), false)
        .unwrap();
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    env.scope.define(
        src.sym("counter"),
        BindingKind::Var,
        LoweredValue::global_variable(counter, Type::Int(I64)),
    );

    let counter_ref = src.ident("counter");
    let one = src.int(1);
    let next = src.binary(BinaryOp::Add, counter_ref, one);

    env.lower(&src, &mut builder, next).unwrap();
    expect![[r#"
        fn @f() -> void {
            %0 = load i64, @g0
            %1 = add i64 %0, 1
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_global_constant_without_initializer() {
    let mut module = Module::new("test");
    let extern_const = module.add_global("k", Type::Int(I64), None, true).unwrap();
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    env.scope.define(
        src.sym("k"),
        BindingKind::Const,
        LoweredValue::global_constant(extern_const, Type::Int(I64)),
    );

    let k = src.ident("k");
    let one = src.int(1);
    let sum = src.binary(BinaryOp::Add, k, one);

    let err = env.lower(&src, &mut builder, sum).unwrap_err();
    assert!(matches!(err, LowerError::MissingInitializer { .. }), "{err}");
}

#[test]
fn test_unsupported_operators() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let seven = src.int(7);
    let two = src.int(2);
    let rem = src.binary(BinaryOp::Rem, seven, two);
    let rem_span = src.body.span(rem);
    let err = env.lower(&src, &mut builder, rem).unwrap_err();
    assert_eq!(err, LowerError::UnsupportedOperator { op: "%", span: rem_span });

    let one = src.int(1);
    let not = src.unary(UnaryOp::Not, one);
    let err = env.lower(&src, &mut builder, not).unwrap_err();
    assert!(matches!(err, LowerError::UnsupportedOperator { op: "!", .. }));
}

#[test]
fn test_division_by_constant_zero() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let one = src.int(1);
    let zero = src.int(0);
    let quotient = src.binary(BinaryOp::Quo, one, zero);

    let err = env.lower(&src, &mut builder, quotient).unwrap_err();
    assert!(matches!(
        err,
        LowerError::Backend {
            source: IrError::DivisionByZero,
            ..
        }
    ));
}

#[test]
fn test_unary_operators() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I32)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let param = builder.param(0).unwrap();
    env.scope.define(src.sym("x"), BindingKind::Var, LoweredValue::runtime(param, Type::Int(I32)));

    let five = src.int(5);
    let minus_five = src.unary(UnaryOp::Neg, five);
    let value = env.lower(&src, &mut builder, minus_five).unwrap();
    assert_eq!(value, LoweredValue::constant(int_const(I64, -5)));

    let x = src.ident("x");
    let plus_x = src.unary(UnaryOp::Plus, x);
    let value = env.lower(&src, &mut builder, plus_x).unwrap();
    assert_eq!(value, LoweredValue::runtime(param, Type::Int(I32)));
    assert!(builder.instructions().is_empty());

    let x = src.ident("x");
    let minus_x = src.unary(UnaryOp::Neg, x);
    env.lower(&src, &mut builder, minus_x).unwrap();
    expect![[r#"
        fn @f(%0: i32) -> void {
            %1 = neg i32 %0
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_direct_function_call() {
    let mut module = Module::new("test");
    let add = module.declare_function(
        "add",
        FunctionType::new(vec![Type::Int(I32), Type::Int(I32)], Type::Int(I32)),
    );
    let add_ref = module.function_ref(add).unwrap();
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I32)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let param = builder.param(0).unwrap();
    env.scope.define(src.sym("add"), BindingKind::Func, LoweredValue::constant(add_ref));
    env.scope.define(src.sym("x"), BindingKind::Var, LoweredValue::runtime(param, Type::Int(I32)));

    let one = src.int(1);
    let x = src.ident("x");
    let call = src.call("add", vec![one, x]);

    let value = env.lower(&src, &mut builder, call).unwrap();
    assert_eq!(value.ty(), &Type::Int(I32));
    expect![[r#"
        fn @f(%0: i32) -> void {
            %1 = call i32 @fn0(1, %0)
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_call_through_function_variable() {
    let module = Module::new("test");
    let fn_ptr = Type::Function(FunctionType::new(vec![Type::Int(I32)], Type::Int(I32))).pointer_to();
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let slot = builder.alloca(fn_ptr.clone()).unwrap();
    env.scope.define(
        src.sym("op"),
        BindingKind::Var,
        LoweredValue::runtime(slot, fn_ptr).mark_indirect(),
    );

    let four = src.int(4);
    let call = src.call("op", vec![four]);

    env.lower(&src, &mut builder, call).unwrap();
    expect![[r#"
        fn @f() -> void {
            %0 = alloca *fn(i32) -> i32
            %1 = load *fn(i32) -> i32, %0
            %2 = call i32 %1(4)
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_unsupported_call_forms() {
    let mut module = Module::new("test");
    let sum = module.declare_function(
        "sum",
        FunctionType {
            params: vec![Type::Int(I64)],
            ret: Box::new(Type::Int(I64)),
            variadic: true,
        },
    );
    let sum_ref = module.function_ref(sum).unwrap();
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    env.scope.define(src.sym("sum"), BindingKind::Func, LoweredValue::constant(sum_ref));

    let xs = src.int(1);
    let callee = src.ident("sum");
    let spread = src.call_expr(callee, vec![xs], true);
    let err = env.lower(&src, &mut builder, spread).unwrap_err();
    assert!(matches!(err, LowerError::UnsupportedCallForm { .. }), "{err}");

    let args = vec![src.int(1), src.int(2), src.int(3)];
    let plain = src.call("sum", args);
    let err = env.lower(&src, &mut builder, plain).unwrap_err();
    assert!(
        matches!(
            err,
            LowerError::UnsupportedCallForm {
                reason: "variadic calls are not supported",
                ..
            }
        ),
        "{err}"
    );

    let inner = src.ident("sum");
    let paren = src.paren(inner);
    let indirect = src.call_expr(paren, Vec::new(), false);
    let err = env.lower(&src, &mut builder, indirect).unwrap_err();
    assert!(matches!(err, LowerError::UnsupportedCallForm { .. }), "{err}");
    assert!(builder.instructions().is_empty());
}

#[test]
fn test_builtins_are_dispatched() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let hello = src.string("hello");
    let print = src.call("println", vec![hello]);
    env.lower(&src, &mut builder, print).unwrap();

    let ty = src.array_of(4, "int32");
    let array = src.composite(ty, Vec::new());
    let len = src.call("len", vec![array]);
    let value = env.lower(&src, &mut builder, len).unwrap();

    assert_eq!(value, LoweredValue::constant(int_const(I64, 4)));
    assert_eq!(env.external.calls(), vec!["Print".to_string(), "Len".to_string()]);
}

#[test]
fn test_runtime_conversions() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(vec![Type::Int(I64)]));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    let param = builder.param(0).unwrap();
    env.scope.define(src.sym("n"), BindingKind::Var, LoweredValue::runtime(param, Type::Int(I64)));

    let n = src.ident("n");
    let narrow = src.call("int32", vec![n]);
    let value = env.lower(&src, &mut builder, narrow).unwrap();
    assert_eq!(value.ty(), &Type::Int(I32));

    let n = src.ident("n");
    let same = src.call("int64", vec![n]);
    env.lower(&src, &mut builder, same).unwrap();

    let n = src.ident("n");
    let float = src.call("float64", vec![n]);
    env.lower(&src, &mut builder, float).unwrap();

    let n = src.ident("n");
    let text = src.call("string", vec![n]);
    let err = env.lower(&src, &mut builder, text).unwrap_err();
    assert!(matches!(err, LowerError::TypeMismatch { .. }), "{err}");

    expect![[r#"
        fn @f(%0: i64) -> void {
            %1 = trunc %0 to i32
            %2 = sitofp %0 to f64
        }"#]]
    .assert_eq(&builder.finish().to_string());
}

#[test]
fn test_constant_conversion_must_fit() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let big = src.int(300);
    let call = src.call("uint8", vec![big]);
    let err = env.lower(&src, &mut builder, call).unwrap_err();
    assert!(matches!(err, LowerError::TypeMismatch { .. }), "{err}");

    let fraction = src.float(2.5);
    let call = src.call("int32", vec![fraction]);
    let err = env.lower(&src, &mut builder, call).unwrap_err();
    assert!(matches!(err, LowerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_external_literals_and_unsupported_kinds() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let env = Env::new(&src);

    let closure = src.func_lit();
    env.lower(&src, &mut builder, closure).unwrap();

    let map_ty = lk_syntax::TypeExpr::Map {
        key: Box::new(src.named("string")),
        value: Box::new(src.named("int")),
    };
    let map = src.composite(map_ty, Vec::new());
    env.lower(&src, &mut builder, map).unwrap();

    assert_eq!(
        env.external.calls(),
        vec!["FuncLit".to_string(), "CompositeLit map[string]i64".to_string()]
    );

    let one = src.int(1);
    let paren = src.paren(one);
    let paren_span = src.body.span(paren);
    let err = env.lower(&src, &mut builder, paren).unwrap_err();
    assert_eq!(
        err,
        LowerError::UnsupportedExpressionKind {
            kind: "parenthesized expression",
            span: paren_span,
        }
    );
}

#[test]
fn test_configured_literal_width() {
    let module = Module::new("test");
    let mut builder = FunctionBuilder::new(&module, "f", signature(Vec::new()));
    let mut src = Source::new();
    let mut env = Env::new(&src);
    env.config = lk_expr_lower::LowerConfig::from_toml_str("[literals]\nint_bits = 32\n").unwrap();

    let three = src.int(3);
    let four = src.int(4);
    let sum = src.binary(BinaryOp::Add, three, four);

    let value = env.lower(&src, &mut builder, sum).unwrap();
    assert_eq!(value, LoweredValue::constant(int_const(I32, 7)));
}
