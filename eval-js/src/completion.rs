use crate::Value;

/// An ECMAScript completion record (ECMA-262).
///
/// The "empty" completion value is modelled as [`Value::Empty`] so statement lists can implement
/// `UpdateEmpty` (e.g. `1; if (true) {}` evaluates to `1`).
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
  Normal(Value),
  Throw(Value),
  Return(Value),
  Break(Option<String>, Value),
  Continue(Option<String>, Value),
}

impl Completion {
  pub fn empty() -> Self {
    Completion::Normal(Value::Empty)
  }

  pub fn normal(value: Value) -> Self {
    Completion::Normal(value)
  }

  pub fn value(&self) -> Value {
    match self {
      Completion::Normal(v)
      | Completion::Throw(v)
      | Completion::Return(v)
      | Completion::Break(_, v)
      | Completion::Continue(_, v) => *v,
    }
  }

  pub fn is_abrupt(&self) -> bool {
    !matches!(self, Completion::Normal(_))
  }

  /// Implements `UpdateEmpty(completion, value)` from ECMA-262.
  pub fn update_empty(self, value: Value) -> Self {
    match self {
      Completion::Normal(Value::Empty) => Completion::Normal(value),
      Completion::Break(target, Value::Empty) => Completion::Break(target, value),
      Completion::Continue(target, Value::Empty) => Completion::Continue(target, value),
      other => other,
    }
  }

  /// `LoopContinues(completion, labelSet)`.
  pub fn loop_continues(&self, labels: &LabelSet<'_>) -> bool {
    match self {
      Completion::Normal(_) => true,
      Completion::Continue(None, _) => true,
      Completion::Continue(Some(label), _) => labels.contains(label),
      _ => false,
    }
  }
}

/// Early-returns from the enclosing function with any abrupt completion, yielding the carried
/// value of a normal one.
macro_rules! normal_or_return {
  ($completion:expr) => {
    match $completion {
      $crate::Completion::Normal(value) => value,
      abrupt => return Ok(abrupt),
    }
  };
}
pub(crate) use normal_or_return;

/// Unwraps an expression result inside statement evaluation. A thrown JS value becomes a throw
/// completion; engine errors keep propagating.
macro_rules! value_or_throw {
  ($result:expr) => {
    match $result {
      Ok(value) => value,
      Err($crate::VmError::Throw(thrown)) => return Ok($crate::Completion::Throw(thrown)),
      Err(err) => return Err(err),
    }
  };
}
pub(crate) use value_or_throw;

/// The set of labels applying to the statement being evaluated.
///
/// Immutable: a labelled statement extends it by creating a new set that borrows its parent, so
/// the caller's view never changes.
#[derive(Debug, Clone, Copy)]
pub enum LabelSet<'l> {
  Empty,
  Cons(&'l str, &'l LabelSet<'l>),
}

impl<'l> LabelSet<'l> {
  pub const EMPTY: LabelSet<'static> = LabelSet::Empty;

  pub fn with<'n>(&'n self, label: &'n str) -> LabelSet<'n> {
    LabelSet::Cons(label, self)
  }

  pub fn contains(&self, label: &str) -> bool {
    let mut current = self;
    loop {
      match current {
        LabelSet::Empty => return false,
        LabelSet::Cons(l, rest) => {
          if *l == label {
            return true;
          }
          current = rest;
        }
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, LabelSet::Empty)
  }
}

#[cfg(test)]
mod tests {
  use super::{Completion, LabelSet};
  use crate::Value;

  #[test]
  fn update_empty_only_fills_empty_values() {
    assert_eq!(
      Completion::empty().update_empty(Value::Number(1.0)),
      Completion::Normal(Value::Number(1.0))
    );
    assert_eq!(
      Completion::Normal(Value::Null).update_empty(Value::Number(1.0)),
      Completion::Normal(Value::Null)
    );
    assert_eq!(
      Completion::Break(Some("a".to_string()), Value::Empty).update_empty(Value::Bool(true)),
      Completion::Break(Some("a".to_string()), Value::Bool(true))
    );
    assert_eq!(
      Completion::Return(Value::Empty).update_empty(Value::Bool(true)),
      Completion::Return(Value::Empty)
    );
  }

  #[test]
  fn label_sets_extend_without_mutating_parent() {
    let root = LabelSet::EMPTY;
    let outer = root.with("outer");
    let inner = outer.with("inner");
    assert!(inner.contains("outer"));
    assert!(inner.contains("inner"));
    assert!(outer.contains("outer"));
    assert!(!outer.contains("inner"));
    assert!(root.is_empty());

    assert!(Completion::Continue(Some("outer".to_string()), Value::Empty).loop_continues(&inner));
    assert!(!Completion::Continue(Some("other".to_string()), Value::Empty).loop_continues(&inner));
    assert!(Completion::Continue(None, Value::Empty).loop_continues(&root));
    assert!(!Completion::Break(None, Value::Empty).loop_continues(&root));
  }
}
