//! Function builder

use crate::constant::Const;
use crate::emit::IrEmitter;
use crate::error::{IrError, IrResult};
use crate::inst::{BinaryOp, CastOp, InstKind, Instruction, IntPredicate, Operand, ValueId};
use crate::module::{GlobalId, Module};
use crate::types::{FloatType, FunctionType, Type};
use std::fmt;

/// A finished function body
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Symbol name
    pub name: String,
    /// Signature
    pub signature: FunctionType,
    /// Parameter values, in order
    pub params: Vec<ValueId>,
    /// Instructions in emission order
    pub instructions: Vec<Instruction>,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn @{}(", self.name)?;
        for (idx, (param, ty)) in self.params.iter().zip(&self.signature.params).enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}: {ty}")?;
        }
        writeln!(f, ") -> {} {{", self.signature.ret)?;
        for inst in &self.instructions {
            writeln!(f, "    {inst}")?;
        }
        write!(f, "}}")
    }
}

/// Builder for one function, validating every instruction it records
pub struct FunctionBuilder<'module> {
    module: &'module Module,
    name: String,
    signature: FunctionType,
    params: Vec<ValueId>,
    value_types: Vec<Type>,
    instructions: Vec<Instruction>,
}

impl<'module> FunctionBuilder<'module> {
    /// Creates a builder; parameters become values `%0..%n`
    pub fn new(module: &'module Module, name: impl Into<String>, signature: FunctionType) -> Self {
        let value_types = signature.params.clone();
        let params = (0..value_types.len() as u32).map(ValueId).collect();
        Self {
            module,
            name: name.into(),
            signature,
            params,
            value_types,
            instructions: Vec::new(),
        }
    }

    /// Module the function belongs to
    pub fn module(&self) -> &'module Module {
        self.module
    }

    /// Value of the parameter at `index`
    pub fn param(&self, index: usize) -> Option<ValueId> {
        self.params.get(index).copied()
    }

    /// Type of a value produced so far
    pub fn value_type(&self, value: ValueId) -> Option<&Type> {
        self.value_types.get(value.0 as usize)
    }

    /// Instructions emitted so far
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Finishes building and returns the function
    #[must_use]
    pub fn finish(self) -> Function {
        Function {
            name: self.name,
            signature: self.signature,
            params: self.params,
            instructions: self.instructions,
        }
    }

    fn push(&mut self, kind: InstKind, ty: Type) -> ValueId {
        let id = ValueId(self.value_types.len() as u32);
        self.value_types.push(ty.clone());
        self.instructions.push(Instruction {
            result: Some(id),
            ty,
            kind,
        });
        id
    }

    fn int_operands(&self, op: &'static str, lhs: &Operand, rhs: &Operand) -> IrResult<Type> {
        let lhs_ty = self.operand_type(lhs)?;
        let rhs_ty = self.operand_type(rhs)?;
        if !lhs_ty.is_integer() {
            return Err(IrError::OperandType { op, found: lhs_ty });
        }
        if lhs_ty != rhs_ty {
            return Err(IrError::TypeMismatch {
                op,
                lhs: lhs_ty,
                rhs: rhs_ty,
            });
        }
        Ok(lhs_ty)
    }
}

fn cast_is_valid(op: CastOp, from: &Type, to: &Type) -> bool {
    match (op, from, to) {
        (CastOp::Trunc, Type::Int(src), Type::Int(dst)) => dst.bits < src.bits,
        (CastOp::ZExt | CastOp::SExt, Type::Int(src), Type::Int(dst)) => dst.bits > src.bits,
        (CastOp::Bitcast, Type::Int(src), Type::Int(dst)) => dst.bits == src.bits,
        (CastOp::FpToSi | CastOp::FpToUi, Type::Float(_), Type::Int(_))
        | (CastOp::SiToFp | CastOp::UiToFp, Type::Int(_), Type::Float(_))
        | (CastOp::FpTrunc, Type::Float(FloatType::F64), Type::Float(FloatType::F32))
        | (CastOp::FpExt, Type::Float(FloatType::F32), Type::Float(FloatType::F64)) => true,
        _ => false,
    }
}

impl IrEmitter for FunctionBuilder<'_> {
    fn binary(&mut self, op: BinaryOp, lhs: Operand, rhs: Operand) -> IrResult<ValueId> {
        let ty = self.int_operands(op.mnemonic(), &lhs, &rhs)?;
        Ok(self.push(InstKind::Binary { op, lhs, rhs }, ty))
    }

    fn icmp(&mut self, pred: IntPredicate, lhs: Operand, rhs: Operand) -> IrResult<ValueId> {
        self.int_operands("icmp", &lhs, &rhs)?;
        Ok(self.push(InstKind::ICmp { pred, lhs, rhs }, Type::bool()))
    }

    fn neg(&mut self, operand: Operand) -> IrResult<ValueId> {
        let ty = self.operand_type(&operand)?;
        if !matches!(ty, Type::Int(_) | Type::Float(_)) {
            return Err(IrError::OperandType { op: "neg", found: ty });
        }
        Ok(self.push(InstKind::Neg(operand), ty))
    }

    fn load(&mut self, ptr: Operand) -> IrResult<ValueId> {
        let ty = match self.operand_type(&ptr)? {
            Type::Pointer(inner) => *inner,
            found => return Err(IrError::NotAPointer { found }),
        };
        Ok(self.push(InstKind::Load(ptr), ty))
    }

    fn element_ptr(&mut self, base: Operand, indices: Vec<Operand>) -> IrResult<ValueId> {
        let mut current = match self.operand_type(&base)? {
            Type::Pointer(inner) => *inner,
            found => return Err(IrError::NotAPointer { found }),
        };
        if indices.is_empty() {
            return Err(IrError::InvalidElementPath { ty: current });
        }
        for (position, index) in indices.iter().enumerate() {
            let index_ty = self.operand_type(index)?;
            if !index_ty.is_integer() {
                return Err(IrError::OperandType {
                    op: "elementptr",
                    found: index_ty,
                });
            }
            if position == 0 {
                continue;
            }
            current = match current {
                Type::Array { element, .. } => *element,
                other => return Err(IrError::InvalidElementPath { ty: other }),
            };
        }
        Ok(self.push(InstKind::ElementPtr { base, indices }, current.pointer_to()))
    }

    fn call(&mut self, callee: Operand, args: Vec<Operand>) -> IrResult<ValueId> {
        let signature = match self.operand_type(&callee)? {
            Type::Pointer(inner) => match *inner {
                Type::Function(signature) => signature,
                other => return Err(IrError::NotCallable { found: other.pointer_to() }),
            },
            found => return Err(IrError::NotCallable { found }),
        };

        let expected = signature.params.len();
        let arity_ok = if signature.variadic {
            args.len() >= expected
        } else {
            args.len() == expected
        };
        if !arity_ok {
            return Err(IrError::Arity {
                expected,
                found: args.len(),
            });
        }
        for (index, (arg, param)) in args.iter().zip(&signature.params).enumerate() {
            let found = self.operand_type(arg)?;
            if &found != param {
                return Err(IrError::ArgumentType {
                    index,
                    expected: param.clone(),
                    found,
                });
            }
        }

        Ok(self.push(InstKind::Call { callee, args }, *signature.ret))
    }

    fn cast(&mut self, op: CastOp, value: Operand, to: Type) -> IrResult<ValueId> {
        let from = self.operand_type(&value)?;
        if !cast_is_valid(op, &from, &to) {
            return Err(IrError::InvalidCast { op, from, to });
        }
        Ok(self.push(InstKind::Cast { op, value }, to))
    }

    fn alloca(&mut self, ty: Type) -> IrResult<ValueId> {
        if ty == Type::Void {
            return Err(IrError::OperandType {
                op: "alloca",
                found: ty,
            });
        }
        Ok(self.push(InstKind::Alloca(ty.clone()), ty.pointer_to()))
    }

    fn store(&mut self, ptr: Operand, value: Operand) -> IrResult<()> {
        let expected = match self.operand_type(&ptr)? {
            Type::Pointer(inner) => *inner,
            found => return Err(IrError::NotAPointer { found }),
        };
        let found = self.operand_type(&value)?;
        if found != expected {
            return Err(IrError::StoreType { expected, found });
        }
        self.instructions.push(Instruction {
            result: None,
            ty: Type::Void,
            kind: InstKind::Store { ptr, value },
        });
        Ok(())
    }

    fn global_initializer(&self, global: GlobalId) -> Option<Const> {
        self.module
            .global(global)
            .and_then(|global| global.initializer.clone())
    }

    fn operand_type(&self, operand: &Operand) -> IrResult<Type> {
        match operand {
            Operand::Const(constant) => Ok(constant.ty()),
            Operand::Value(value) => self
                .value_type(*value)
                .cloned()
                .ok_or(IrError::UnknownValue(*value)),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::needless_raw_string_hashes,
    reason = "a failed unwrap is a failed test; snapshots use expect-test's raw string form"
)]
mod tests {
    use super::*;
    use crate::types::IntType;
    use expect_test::expect;

    const I32: IntType = IntType::new(32, true);

    fn int(value: i128) -> Operand {
        Operand::Const(Const::int(I32, value).unwrap())
    }

    #[test]
    fn test_emit_and_print() {
        let module = Module::new("test");
        let signature = FunctionType::new(vec![Type::Int(I32)], Type::Int(I32));
        let mut builder = FunctionBuilder::new(&module, "scale", signature);
        let param = builder.param(0).unwrap();

        let product = builder.binary(BinaryOp::Mul, int(5), param.into()).unwrap();
        let flag = builder.icmp(IntPredicate::Ult, product.into(), int(100)).unwrap();
        assert_eq!(builder.value_type(flag), Some(&Type::bool()));

        let function = builder.finish();
        expect![[r#"
            fn @scale(%0: i32) -> i32 {
                %1 = mul i32 5, %0
                %2 = icmp ult %1, 100
            }"#]]
        .assert_eq(&function.to_string());
    }

    #[test]
    fn test_binary_rejects_mismatched_types() {
        let module = Module::new("test");
        let signature = FunctionType::new(vec![Type::int(64, true)], Type::Void);
        let mut builder = FunctionBuilder::new(&module, "f", signature);
        let param = builder.param(0).unwrap();

        let err = builder.binary(BinaryOp::Add, int(1), param.into()).unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { op: "add", .. }));
        assert!(builder.instructions().is_empty());
    }

    #[test]
    fn test_element_ptr_walks_array() {
        let module = Module::new("test");
        let mut builder = FunctionBuilder::new(&module, "f", FunctionType::new(Vec::new(), Type::Void));
        let slot = builder.alloca(Type::array(Type::Int(I32), 5)).unwrap();

        let element = builder.element_ptr(slot.into(), vec![int(0), int(2)]).unwrap();
        assert_eq!(builder.value_type(element), Some(&Type::Int(I32).pointer_to()));

        let err = builder
            .element_ptr(slot.into(), vec![int(0), int(1), int(0)])
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidElementPath { .. }));
    }

    #[test]
    fn test_call_checks_signature() {
        let mut module = Module::new("test");
        let callee = module.declare_function("add", FunctionType::new(vec![Type::Int(I32), Type::Int(I32)], Type::Int(I32)));
        let callee = Operand::Const(module.function_ref(callee).unwrap());
        let mut builder = FunctionBuilder::new(&module, "f", FunctionType::new(Vec::new(), Type::Void));

        let err = builder.call(callee.clone(), vec![int(1)]).unwrap_err();
        assert_eq!(err, IrError::Arity { expected: 2, found: 1 });

        let result = builder.call(callee, vec![int(1), int(2)]).unwrap();
        assert_eq!(builder.value_type(result), Some(&Type::Int(I32)));
    }

    #[test]
    fn test_cast_validation() {
        let module = Module::new("test");
        let mut builder = FunctionBuilder::new(&module, "f", FunctionType::new(vec![Type::int(64, true)], Type::Void));
        let param = builder.param(0).unwrap();

        builder.cast(CastOp::Trunc, param.into(), Type::Int(I32)).unwrap();
        let err = builder.cast(CastOp::ZExt, param.into(), Type::Int(I32)).unwrap_err();
        assert!(matches!(err, IrError::InvalidCast { op: CastOp::ZExt, .. }));
    }

    #[test]
    fn test_store_checks_slot_type() {
        let module = Module::new("test");
        let mut builder = FunctionBuilder::new(&module, "f", FunctionType::new(Vec::new(), Type::Void));
        let slot = builder.alloca(Type::Int(I32)).unwrap();

        builder.store(slot.into(), int(4)).unwrap();
        let err = builder
            .store(slot.into(), Operand::Const(Const::bool(true)))
            .unwrap_err();
        assert!(matches!(err, IrError::StoreType { .. }));
    }
}
