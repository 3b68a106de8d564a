use core::fmt;

/// Slot address of a [`Heap`](crate::Heap) allocation: a slot index plus the generation the slot
/// had when the allocation was made.
///
/// Freeing a slot bumps its generation, so an id outliving its allocation no longer matches and
/// every heap accessor reports [`VmError::InvalidHandle`](crate::VmError::InvalidHandle) for it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId {
  index: u32,
  generation: u32,
}

impl HeapId {
  pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
    Self { index, generation }
  }

  #[inline]
  pub fn index(self) -> u32 {
    self.index
  }

  #[inline]
  pub fn generation(self) -> u32 {
    self.generation
  }
}

impl fmt::Debug for HeapId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}@{}", self.index, self.generation)
  }
}

macro_rules! typed_handles {
  ($($(#[$meta:meta])* $name:ident;)*) => {
    $(
      $(#[$meta])*
      #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
      #[repr(transparent)]
      pub struct $name(pub(crate) HeapId);

      impl $name {
        #[inline]
        pub fn id(self) -> HeapId {
          self.0
        }
      }
    )*
  };
}

typed_handles! {
  /// An object: ordinary, array, function, error, wrapper or iterator.
  GcObject;
  /// An interned string. Two live `GcString`s of one heap are equal exactly when their code units
  /// are.
  GcString;
  GcSymbol;
  /// A declarative or global environment record.
  GcEnv;
}
