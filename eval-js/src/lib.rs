//! Tree-walking ECMAScript statement evaluator for `ecma-rs`.
//!
//! This crate evaluates sloppy-mode scripts parsed by `oxc_parser`. It provides:
//! - Evaluatable statement wrappers with cached static semantics ([`Script`], [`Stmt`])
//! - Completion records and label sets ([`Completion`], [`LabelSet`])
//! - A realm with the full table of well-known intrinsics ([`Realm`], [`Intrinsics`])
//! - Execution limits: call depth and a fuel budget ([`Vm`], [`VmOptions`])
//!
//! # Evaluation model
//!
//! A [`Script`] is built once from a parsed program. Building computes the static semantics of
//! every node (VarDeclaredNames, LexicallyScopedDeclarations, ...) and rejects syntax this engine
//! does not evaluate, labels that are not in scope and nesting deeper than
//! [`VmOptions::max_syntax_depth`], so evaluation never meets those cases.
//!
//! [`Script::evaluate`] runs the statements in a [`Realm`]. Statements yield [`Completion`]s: an
//! uncaught `throw` is `Completion::Throw`, not a Rust error. [`VmError`] is reserved for the
//! engine itself (exhausted fuel, stack overflow, a disposed realm, unimplemented features). Inside
//! expression evaluation and native functions a thrown value travels as [`VmError::Throw`] and is
//! turned back into a completion at the statement boundary.
//!
//! # Heap and handles
//!
//! Objects, strings, symbols and environment records live in the realm's [`Heap`] and are
//! referenced by `Copy` handles ([`GcObject`], [`GcString`], [`GcSymbol`], [`GcEnv`]). The
//! constructor/prototype graph is cyclic; [`Realm::dispose`] frees the whole arena at once, after
//! which every handle reports [`VmError::InvalidHandle`].
//!
//! ```
//! use eval_js::{Realm, Value};
//!
//! let mut realm = Realm::new().unwrap();
//! let value = realm.exec_script("var s = 0; for (let i = 0; i < 4; i++) s += i; s").unwrap();
//! assert_eq!(value, Value::Number(6.0));
//! ```

mod builtins;
mod completion;
mod env;
mod error;
mod error_object;
mod exec;
mod execution_context;
mod function;
mod handle;
mod heap;
mod intrinsics;
mod iterator;
mod node;
mod object;
mod ops;
mod property;
mod realm;
mod source;
mod stack;
mod string;
mod symbol;
mod value;
mod vm;

pub use crate::builtins::NativeFunction;
pub use crate::completion::Completion;
pub use crate::completion::LabelSet;
pub use crate::env::BindingRead;
pub use crate::env::BindingWrite;
pub use crate::env::EnvBinding;
pub use crate::error::Termination;
pub use crate::error::TerminationReason;
pub use crate::error::VmError;
pub use crate::execution_context::ExecutionContext;
pub use crate::function::CallHandler;
pub use crate::function::EcmaFunction;
pub use crate::function::FunctionId;
pub use crate::function::ScriptId;
pub use crate::function::ThisMode;
pub use crate::handle::GcEnv;
pub use crate::handle::GcObject;
pub use crate::handle::GcString;
pub use crate::handle::GcSymbol;
pub use crate::handle::HeapId;
pub use crate::heap::Heap;
pub use crate::heap::HeapLimits;
pub use crate::intrinsics::Intrinsic;
pub use crate::intrinsics::Intrinsics;
pub use crate::intrinsics::ObjectIntrinsic;
pub use crate::intrinsics::PrimitiveIntrinsic;
pub use crate::intrinsics::StringIntrinsic;
pub use crate::intrinsics::SymbolIntrinsic;
pub use crate::iterator::IteratorRecord;
pub use crate::node::pattern_bound_names;
pub use crate::node::Declaration;
pub use crate::node::DeclarationKind;
pub use crate::node::FunctionNode;
pub use crate::node::NodeData;
pub use crate::node::NodeId;
pub use crate::node::NodeKind;
pub use crate::node::Script;
pub use crate::node::StaticSemantics;
pub use crate::node::Stmt;
pub use crate::object::IterationKind;
pub use crate::object::ObjectKind;
pub use crate::ops::number_to_string;
pub use crate::ops::PreferredType;
pub use crate::property::PropertyDescriptor;
pub use crate::property::PropertyKey;
pub use crate::property::PropertyKind;
pub use crate::realm::Realm;
pub use crate::source::parse_script;
pub use crate::string::JsString;
pub use crate::symbol::JsSymbol;
pub use crate::value::Value;
pub use crate::vm::Vm;
pub use crate::vm::VmOptions;
