use crate::{GcObject, GcString, GcSymbol};

/// A JavaScript value.
///
/// Heap-allocated values are represented using handles into the realm's [`Heap`](crate::Heap).
/// `Empty` is the internal "no value" marker carried by statement completions; it is never
/// observable from the evaluated program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
  /// The completion value of a statement that produced none (e.g. `;` or `{}`).
  Empty,
  /// The JavaScript `undefined` value.
  Undefined,
  /// The JavaScript `null` value.
  Null,
  /// A JavaScript boolean.
  Bool(bool),
  /// A JavaScript number (IEEE-754 double).
  Number(f64),
  /// An interned JavaScript string.
  String(GcString),
  /// A JavaScript symbol.
  Symbol(GcSymbol),
  /// A JavaScript object.
  Object(GcObject),
}

impl Value {
  /// ECMAScript `SameValue(x, y)`.
  ///
  /// This differs from `==`/`===` for Numbers:
  /// - `NaN` is the same as `NaN`
  /// - `+0` and `-0` are distinct
  ///
  /// Strings are interned, so handle equality is content equality.
  pub fn same_value(self, other: Self) -> bool {
    match (self, other) {
      (Value::Number(a), Value::Number(b)) => {
        if a.is_nan() && b.is_nan() {
          return true;
        }
        a.to_bits() == b.to_bits() || (a == b && a != 0.0)
      }
      _ => self.same_non_number(other),
    }
  }

  /// ECMAScript `SameValueZero(x, y)`: like [`Value::same_value`] but `+0` equals `-0`.
  pub fn same_value_zero(self, other: Self) -> bool {
    match (self, other) {
      (Value::Number(a), Value::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
      _ => self.same_non_number(other),
    }
  }

  /// ECMAScript `IsStrictlyEqual(x, y)` (`===`).
  pub fn strictly_equals(self, other: Self) -> bool {
    match (self, other) {
      (Value::Number(a), Value::Number(b)) => a == b,
      _ => self.same_non_number(other),
    }
  }

  fn same_non_number(self, other: Self) -> bool {
    match (self, other) {
      (Value::Empty, Value::Empty) => true,
      (Value::Undefined, Value::Undefined) => true,
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Symbol(a), Value::Symbol(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a == b,
      _ => false,
    }
  }

  pub fn is_empty(self) -> bool {
    matches!(self, Value::Empty)
  }

  pub fn is_nullish(self) -> bool {
    matches!(self, Value::Undefined | Value::Null)
  }

  /// Maps `Empty` to `undefined`, the value a host observes for a completion that carried none.
  pub fn or_undefined(self) -> Value {
    match self {
      Value::Empty => Value::Undefined,
      other => other,
    }
  }

  pub fn as_object(self) -> Option<GcObject> {
    match self {
      Value::Object(obj) => Some(obj),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}

impl From<GcString> for Value {
  fn from(value: GcString) -> Self {
    Self::String(value)
  }
}

impl From<GcSymbol> for Value {
  fn from(value: GcSymbol) -> Self {
    Self::Symbol(value)
  }
}

impl From<GcObject> for Value {
  fn from(value: GcObject) -> Self {
    Self::Object(value)
  }
}

#[cfg(test)]
mod tests {
  use super::Value;

  #[test]
  fn same_value_distinguishes_signed_zero_and_equates_nan() {
    assert!(Value::Number(f64::NAN).same_value(Value::Number(f64::NAN)));
    assert!(!Value::Number(0.0).same_value(Value::Number(-0.0)));
    assert!(Value::Number(0.0).same_value_zero(Value::Number(-0.0)));
    assert!(Value::Number(0.0).strictly_equals(Value::Number(-0.0)));
    assert!(!Value::Number(f64::NAN).strictly_equals(Value::Number(f64::NAN)));
    assert!(Value::Number(1.5).same_value(Value::Number(1.5)));
    assert!(!Value::Undefined.same_value(Value::Null));
  }
}
