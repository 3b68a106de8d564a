use crate::{GcString, GcSymbol, Value};

/// A JavaScript property key (ECMAScript `PropertyKey`).
///
/// Strings are interned, so the derived equality is ECMA-262 key equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
  String(GcString),
  Symbol(GcSymbol),
}

impl PropertyKey {
  pub fn from_string(value: GcString) -> Self {
    Self::String(value)
  }

  pub fn from_symbol(value: GcSymbol) -> Self {
    Self::Symbol(value)
  }

  pub fn to_value(self) -> Value {
    match self {
      PropertyKey::String(s) => Value::String(s),
      PropertyKey::Symbol(s) => Value::Symbol(s),
    }
  }
}

impl From<GcString> for PropertyKey {
  fn from(value: GcString) -> Self {
    Self::String(value)
  }
}

impl From<GcSymbol> for PropertyKey {
  fn from(value: GcSymbol) -> Self {
    Self::Symbol(value)
  }
}

/// A concrete property descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDescriptor {
  pub enumerable: bool,
  pub configurable: bool,
  pub kind: PropertyKind,
}

impl PropertyDescriptor {
  pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
    Self {
      enumerable,
      configurable,
      kind: PropertyKind::Data { value, writable },
    }
  }

  /// The attributes of a property created by plain assignment or an object literal.
  pub fn plain(value: Value) -> Self {
    Self::data(value, true, true, true)
  }

  /// Attributes used for built-in methods: writable, non-enumerable, configurable.
  pub fn method(value: Value) -> Self {
    Self::data(value, true, false, true)
  }

  /// Attributes used for fixed built-in values such as `F.prototype`.
  pub fn frozen(value: Value) -> Self {
    Self::data(value, false, false, false)
  }

  pub fn accessor(get: Value, set: Value, enumerable: bool, configurable: bool) -> Self {
    Self {
      enumerable,
      configurable,
      kind: PropertyKind::Accessor { get, set },
    }
  }

  /// The value of a data property, or `None` for accessors.
  pub fn data_value(&self) -> Option<Value> {
    match self.kind {
      PropertyKind::Data { value, .. } => Some(value),
      PropertyKind::Accessor { .. } => None,
    }
  }

  pub fn is_writable(&self) -> bool {
    matches!(self.kind, PropertyKind::Data { writable: true, .. })
  }
}

/// The kind of property described by a [`PropertyDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKind {
  Data { value: Value, writable: bool },
  /// `get`/`set` are function objects or `undefined`.
  Accessor { get: Value, set: Value },
}
