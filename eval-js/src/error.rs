use crate::value::Value;
use std::fmt::Display;

/// Errors produced by the engine itself, as opposed to abrupt completions of the evaluated program.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VmError {
  /// A handle whose allocation was freed, or that belongs to another heap's slot layout.
  #[error("invalid handle")]
  InvalidHandle,

  /// Setting a prototype would make an object its own ancestor.
  #[error("prototype cycle")]
  PrototypeCycle,

  /// A `[[Prototype]]` walk went deeper than any chain the engine builds.
  #[error("prototype chain too deep")]
  PrototypeChainTooDeep,

  /// An intrinsic was read before the construction phase that creates it ran.
  #[error("intrinsic {0} read before it was initialized")]
  IntrinsicNotInitialized(&'static str),

  /// An intrinsic slot was written twice during realm construction.
  #[error("intrinsic {0} assigned more than once")]
  IntrinsicReassigned(&'static str),

  /// The name does not denote any intrinsic.
  #[error("unknown intrinsic {0:?}")]
  UnknownIntrinsic(String),

  /// The realm (and its intrinsics) has been disposed.
  #[error("realm has been disposed")]
  RealmDisposed,

  /// The node tree builder met syntax this engine does not evaluate.
  #[error("unsupported syntax: {kind} at offset {start}")]
  UnsupportedSyntax { kind: &'static str, start: u32 },

  /// `break label` or `continue label` names a label that is not in scope.
  #[error("undefined label {0:?}")]
  UndefinedLabel(String),

  /// A labelled statement reuses a label that is already in scope.
  #[error("label {0:?} has already been declared")]
  DuplicateLabel(String),

  /// An unlabelled `break` outside of any loop or switch.
  #[error("illegal break statement")]
  IllegalBreak,

  /// A `continue` outside of any loop, or targeting a label that does not denote a loop.
  #[error("illegal continue statement")]
  IllegalContinue,

  /// Syntactic nesting exceeded [`VmOptions::max_syntax_depth`](crate::VmOptions).
  #[error("syntax nesting deeper than {0} levels")]
  NestingTooDeep(usize),

  /// A construct the evaluator has no rule for.
  #[error("unimplemented: {0}")]
  Unimplemented(&'static str),

  /// An allocation would take the heap past [`HeapLimits::max_bytes`](crate::HeapLimits).
  #[error("out of memory")]
  OutOfMemory,

  /// A JavaScript `throw` value that reached the host without being caught.
  #[error("uncaught exception")]
  Throw(Value),

  /// A non-catchable termination condition (fuel exhausted, stack overflow).
  #[error("{0}")]
  Termination(Termination),

  /// Parser diagnostics reported while reading the source text.
  #[error("syntax error: {}", .0.join("; "))]
  Syntax(Vec<String>),
}

/// Why and how deep in the call stack evaluation was cut off. Script code cannot catch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
  pub reason: TerminationReason,
  /// Function call depth at the point of termination.
  pub depth: usize,
}

impl Termination {
  pub fn new(reason: TerminationReason, depth: usize) -> Self {
    Self { reason, depth }
  }
}

impl Display for Termination {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{reason}", reason = self.reason)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
  OutOfFuel,
  StackOverflow,
}

impl Display for TerminationReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TerminationReason::OutOfFuel => f.write_str("execution terminated: out of fuel"),
      TerminationReason::StackOverflow => f.write_str("execution terminated: stack overflow"),
    }
  }
}
