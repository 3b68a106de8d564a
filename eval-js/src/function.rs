use crate::builtins::NativeFunction;
use crate::{GcEnv, Value};

/// Identifies one [`Script`](crate::Script) node tree. Closures remember the script that created
/// them so a call never resolves a [`FunctionId`] against the wrong tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(pub(crate) u64);

/// Index of a function body within its script's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub(crate) u32);

/// ECMAScript `[[ThisMode]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThisMode {
  /// Arrow functions: `this` is the value captured when the closure was created.
  Lexical(Value),
  /// Ordinary functions: `this` comes from the call site.
  Dynamic,
}

/// An ECMAScript function object's code and captured state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcmaFunction {
  pub script: ScriptId,
  pub function: FunctionId,
  pub environment: GcEnv,
  pub this_mode: ThisMode,
}

/// How a function object is invoked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallHandler {
  Native(NativeFunction),
  Ecma(EcmaFunction),
}

impl CallHandler {
  /// Whether the function has a `[[Construct]]` internal method.
  pub fn is_constructor(&self) -> bool {
    match self {
      CallHandler::Native(native) => native.is_constructor(),
      CallHandler::Ecma(func) => matches!(func.this_mode, ThisMode::Dynamic),
    }
  }
}
