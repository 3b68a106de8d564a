use crate::function::CallHandler;
use crate::property::{PropertyDescriptor, PropertyKey};
use crate::{GcObject, GcString, GcSymbol};

/// Which values an array iterator yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationKind {
  Keys,
  Values,
  Entries,
}

/// Internal slots that give an object exotic or built-in behaviour.
#[derive(Debug, Clone, Copy)]
pub enum ObjectKind {
  Ordinary,
  /// Array exotic object: writes to array indices keep `length` in sync.
  Array,
  /// Any callable object, built-in or closure.
  Function(CallHandler),
  /// Carries `[[ErrorData]]`.
  Error,
  Boolean(bool),
  Number(f64),
  String(GcString),
  Symbol(GcSymbol),
  ArrayIterator {
    /// `None` once the iterator is exhausted.
    target: Option<GcObject>,
    next_index: u32,
    kind: IterationKind,
  },
  StringIterator {
    target: Option<GcString>,
    position: usize,
  },
}

impl ObjectKind {
  /// The builtin tag used by `Object.prototype.toString` when no `@@toStringTag` is present.
  pub fn builtin_tag(&self) -> &'static str {
    match self {
      ObjectKind::Array => "Array",
      ObjectKind::Function(_) => "Function",
      ObjectKind::Error => "Error",
      ObjectKind::Boolean(_) => "Boolean",
      ObjectKind::Number(_) => "Number",
      ObjectKind::String(_) => "String",
      _ => "Object",
    }
  }
}

/// A JavaScript object stored in the heap.
#[derive(Debug, Clone)]
pub(crate) struct JsObject {
  pub(crate) prototype: Option<GcObject>,
  pub(crate) extensible: bool,
  /// Own properties in insertion order.
  pub(crate) properties: Vec<(PropertyKey, PropertyDescriptor)>,
  pub(crate) kind: ObjectKind,
}

impl JsObject {
  pub(crate) fn new(prototype: Option<GcObject>, kind: ObjectKind) -> Self {
    Self {
      prototype,
      extensible: true,
      properties: Vec::new(),
      kind,
    }
  }

  pub(crate) fn find(&self, key: &PropertyKey) -> Option<usize> {
    self.properties.iter().position(|(k, _)| k == key)
  }
}
