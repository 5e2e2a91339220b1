//! Lowered values

use lk_ir::{Const, GlobalId, Operand, Type, ValueId};

/// How a lowered value is represented
#[derive(Debug, Clone, PartialEq)]
pub enum Repr {
    /// Known at compile time
    Constant(Const),
    /// Produced at run time, or an address only known at link time
    Runtime(Operand),
}

/// Result of lowering one expression
///
/// `ty` is always the type the expression denotes. When the value is
/// indirect, the underlying operand is a pointer to a slot holding a `ty`
/// and must be loaded before use as an operand.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredValue {
    repr: Repr,
    ty: Type,
    indirect: bool,
    global: bool,
    array_address: Option<Operand>,
}

impl LoweredValue {
    /// Compile-time constant
    pub fn constant(value: Const) -> Self {
        Self {
            ty: value.ty(),
            repr: Repr::Constant(value),
            indirect: false,
            global: false,
            array_address: None,
        }
    }

    /// Result of an instruction
    pub fn runtime(value: ValueId, ty: Type) -> Self {
        Self {
            repr: Repr::Runtime(Operand::Value(value)),
            ty,
            indirect: false,
            global: false,
            array_address: None,
        }
    }

    /// Global constant whose value is its initializer
    ///
    /// Reading it as an operand yields the initializer rather than a load.
    pub fn global_constant(id: GlobalId, ty: Type) -> Self {
        Self {
            repr: Repr::Constant(Const::Global { id, ty: ty.clone() }),
            ty,
            indirect: true,
            global: true,
            array_address: None,
        }
    }

    /// Mutable global variable, read through a load
    pub fn global_variable(id: GlobalId, ty: Type) -> Self {
        Self {
            repr: Repr::Runtime(Operand::Const(Const::Global { id, ty: ty.clone() })),
            ty,
            indirect: true,
            global: true,
            array_address: None,
        }
    }

    /// Marks the value as denoting a storage slot of its type
    #[must_use]
    pub fn mark_indirect(mut self) -> Self {
        self.indirect = true;
        self
    }

    /// Records the address an aggregate value was loaded from
    #[must_use]
    pub fn with_array_address(mut self, address: Operand) -> Self {
        self.array_address = Some(address);
        self
    }

    /// Whether the value is known at compile time
    pub fn is_constant(&self) -> bool {
        matches!(self.repr, Repr::Constant(_))
    }

    /// Whether the value names a global
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Whether the operand is a pointer to the value
    pub fn is_indirect(&self) -> bool {
        self.indirect
    }

    /// Representation
    pub fn repr(&self) -> &Repr {
        &self.repr
    }

    /// Denoted type
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Constant payload, if compile-time known
    pub fn as_const(&self) -> Option<&Const> {
        match &self.repr {
            Repr::Constant(value) => Some(value),
            Repr::Runtime(_) => None,
        }
    }

    /// Address an aggregate was loaded from
    pub fn array_address(&self) -> Option<&Operand> {
        self.array_address.as_ref()
    }

    /// Global this value names
    pub fn global_id(&self) -> Option<GlobalId> {
        if !self.global {
            return None;
        }
        match &self.repr {
            Repr::Constant(Const::Global { id, .. })
            | Repr::Runtime(Operand::Const(Const::Global { id, .. })) => Some(*id),
            _ => None,
        }
    }

    /// Operand for the underlying IR value
    pub fn operand(&self) -> Operand {
        match &self.repr {
            Repr::Constant(value) => Operand::Const(value.clone()),
            Repr::Runtime(operand) => operand.clone(),
        }
    }
}
