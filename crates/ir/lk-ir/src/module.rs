//! Module-level globals and function declarations

use crate::constant::Const;
use crate::error::{IrError, IrResult};
use crate::types::{FunctionType, Type};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Global variable ID
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

/// Declared function ID
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

/// A process-wide global variable
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    /// Symbol name
    pub name: String,
    /// Type of the stored value
    pub ty: Type,
    /// Compile-time initializer, `None` for external globals
    pub initializer: Option<Const>,
    /// Whether the storage is immutable
    pub constant: bool,
}

/// A function declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Symbol name
    pub name: String,
    /// Signature
    pub ty: FunctionType,
}

/// Globals and function declarations visible to every function builder
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Module name
    pub name: String,
    globals: IndexMap<String, Global>,
    functions: IndexMap<String, FunctionDecl>,
}

impl Module {
    /// Creates an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    /// Adds a global, checking the initializer against the declared type
    ///
    /// # Errors
    ///
    /// Returns [`IrError::InitializerType`] when the initializer's type
    /// differs from `ty`.
    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        initializer: Option<Const>,
        constant: bool,
    ) -> IrResult<GlobalId> {
        if let Some(init) = &initializer {
            let found = init.ty();
            if found != ty {
                return Err(IrError::InitializerType { expected: ty, found });
            }
        }

        let name = name.into();
        let (index, _) = self.globals.insert_full(
            name.clone(),
            Global {
                name,
                ty,
                initializer,
                constant,
            },
        );
        Ok(GlobalId(index as u32))
    }

    /// Declares a function
    pub fn declare_function(&mut self, name: impl Into<String>, ty: FunctionType) -> FunctionId {
        let name = name.into();
        let (index, _) = self
            .functions
            .insert_full(name.clone(), FunctionDecl { name, ty });
        FunctionId(index as u32)
    }

    /// Looks up a global
    pub fn global(&self, id: GlobalId) -> Option<&Global> {
        self.globals.get_index(id.0 as usize).map(|(_, global)| global)
    }

    /// Looks up a global by name
    pub fn global_by_name(&self, name: &str) -> Option<GlobalId> {
        self.globals.get_index_of(name).map(|index| GlobalId(index as u32))
    }

    /// Looks up a function declaration
    pub fn function(&self, id: FunctionId) -> Option<&FunctionDecl> {
        self.functions.get_index(id.0 as usize).map(|(_, decl)| decl)
    }

    /// Looks up a function by name
    pub fn function_by_name(&self, name: &str) -> Option<FunctionId> {
        self.functions.get_index_of(name).map(|index| FunctionId(index as u32))
    }

    /// Address constant of a global
    pub fn global_ref(&self, id: GlobalId) -> Option<Const> {
        self.global(id).map(|global| Const::Global {
            id,
            ty: global.ty.clone(),
        })
    }

    /// Address constant of a function
    pub fn function_ref(&self, id: FunctionId) -> Option<Const> {
        self.function(id).map(|decl| Const::Function {
            id,
            ty: decl.ty.clone(),
        })
    }
}
