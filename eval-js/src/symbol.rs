use crate::handle::GcString;

/// A JavaScript Symbol value.
#[derive(Debug, Clone)]
pub struct JsSymbol {
  id: u64,
  description: Option<GcString>,
}

impl JsSymbol {
  pub(crate) fn new(id: u64, description: Option<GcString>) -> Self {
    Self { id, description }
  }

  /// Heap-unique identity of the symbol, stable for its lifetime.
  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn description(&self) -> Option<GcString> {
    self.description
  }
}
