use crate::env::EnvRecord;
use crate::object::{JsObject, ObjectKind};
use crate::property::{PropertyDescriptor, PropertyKey, PropertyKind};
use crate::{GcEnv, GcObject, GcString, GcSymbol, HeapId, JsString, JsSymbol, Value, VmError};
use ahash::AHashMap;
use core::mem;

/// Upper bound on prototype chain walks; chains are acyclic, so this only guards against runaway
/// host-constructed chains.
pub const MAX_PROTOTYPE_CHAIN: usize = 10_000;

/// Memory limit of a [`Heap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapLimits {
  /// Hard limit for live allocations, in bytes. Allocations and property or binding additions
  /// that would pass it fail with [`VmError::OutOfMemory`].
  pub max_bytes: usize,
}

impl HeapLimits {
  pub fn new(max_bytes: usize) -> Self {
    Self { max_bytes }
  }
}

impl Default for HeapLimits {
  fn default() -> Self {
    Self::new(256 * 1024 * 1024)
  }
}

#[derive(Debug)]
pub(crate) enum HeapObject {
  String(JsString),
  Symbol(JsSymbol),
  Object(JsObject),
  Env(EnvRecord),
}

impl HeapObject {
  /// Bytes charged for the slot holding this allocation, including out-of-line payload.
  fn charged_bytes(&self) -> usize {
    let payload = match self {
      HeapObject::String(s) => s.len_code_units() * mem::size_of::<u16>(),
      HeapObject::Symbol(_) => 0,
      HeapObject::Object(obj) => obj.properties.len() * PROPERTY_BYTES,
      HeapObject::Env(env) => env.bindings.len() * BINDING_BYTES,
    };
    mem::size_of::<Slot>() + payload
  }
}

const PROPERTY_BYTES: usize = mem::size_of::<(PropertyKey, PropertyDescriptor)>();
pub(crate) const BINDING_BYTES: usize = mem::size_of::<crate::EnvBinding>();

#[derive(Debug)]
struct Slot {
  generation: u32,
  value: Option<HeapObject>,
}

/// Arena owning every string, symbol, object and environment record of a realm.
///
/// All cross references (prototype links, property values, captured environments) are `Copy`
/// handles into this arena, so the cyclic object graph has a single owner. Nothing is reclaimed
/// individually; [`Heap::clear`] releases everything at once and invalidates every handle handed
/// out so far. Growth is bounded by [`HeapLimits::max_bytes`].
#[derive(Debug, Default)]
pub struct Heap {
  limits: HeapLimits,
  used_bytes: usize,
  slots: Vec<Slot>,
  free_list: Vec<u32>,
  interned: AHashMap<Box<[u16]>, GcString>,
  next_symbol_id: u64,
}

impl Heap {
  pub fn new(limits: HeapLimits) -> Self {
    Self {
      limits,
      ..Self::default()
    }
  }

  pub fn limits(&self) -> HeapLimits {
    self.limits
  }

  /// Bytes charged for live allocations.
  pub fn used_bytes(&self) -> usize {
    self.used_bytes
  }

  /// Reserves `new_bytes` against the limit.
  pub(crate) fn charge(&mut self, new_bytes: usize) -> Result<(), VmError> {
    let after = self.used_bytes.saturating_add(new_bytes);
    if after > self.limits.max_bytes {
      tracing::debug!(used = self.used_bytes, requested = new_bytes, "heap limit reached");
      return Err(VmError::OutOfMemory);
    }
    self.used_bytes = after;
    Ok(())
  }

  /// Number of live allocations.
  pub fn len(&self) -> usize {
    self.slots.len() - self.free_list.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Frees every allocation. Handles created before the call report
  /// [`VmError::InvalidHandle`] afterwards.
  pub fn clear(&mut self) {
    self.free_list.clear();
    for (idx, slot) in self.slots.iter_mut().enumerate() {
      if slot.value.take().is_some() {
        slot.generation = slot.generation.wrapping_add(1);
      }
      self.free_list.push(idx as u32);
    }
    self.interned.clear();
    self.used_bytes = 0;
  }

  pub(crate) fn alloc(&mut self, obj: HeapObject) -> Result<HeapId, VmError> {
    self.charge(obj.charged_bytes())?;
    Ok(self.insert(obj))
  }

  fn insert(&mut self, obj: HeapObject) -> HeapId {
    match self.free_list.pop() {
      Some(idx) => {
        let slot = &mut self.slots[idx as usize];
        debug_assert!(slot.value.is_none());
        slot.value = Some(obj);
        HeapId::from_parts(idx, slot.generation)
      }
      None => {
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
          generation: 0,
          value: Some(obj),
        });
        HeapId::from_parts(idx, 0)
      }
    }
  }

  fn validate(&self, id: HeapId) -> Option<usize> {
    let idx = id.index() as usize;
    let slot = self.slots.get(idx)?;
    (slot.generation == id.generation() && slot.value.is_some()).then_some(idx)
  }

  fn get_heap_object(&self, id: HeapId) -> Result<&HeapObject, VmError> {
    let idx = self.validate(id).ok_or(VmError::InvalidHandle)?;
    self.slots[idx].value.as_ref().ok_or(VmError::InvalidHandle)
  }

  fn get_heap_object_mut(&mut self, id: HeapId) -> Result<&mut HeapObject, VmError> {
    let idx = self.validate(id).ok_or(VmError::InvalidHandle)?;
    self.slots[idx].value.as_mut().ok_or(VmError::InvalidHandle)
  }

  pub fn is_valid_object(&self, obj: GcObject) -> bool {
    matches!(self.get_heap_object(obj.0), Ok(HeapObject::Object(_)))
  }

  // Strings.

  /// Interns a UTF-8 string as UTF-16 code units.
  pub fn alloc_string(&mut self, s: &str) -> Result<GcString, VmError> {
    self.alloc_string_units(s.encode_utf16().collect())
  }

  pub fn alloc_string_units(&mut self, units: Vec<u16>) -> Result<GcString, VmError> {
    if let Some(existing) = self.interned.get(units.as_slice()) {
      return Ok(*existing);
    }
    let key: Box<[u16]> = units.into_boxed_slice();
    let obj = HeapObject::String(JsString::from_code_units(&key));
    // The intern table keeps its own copy of the code units.
    self.charge(obj.charged_bytes() + key.len() * mem::size_of::<u16>())?;
    let id = self.insert(obj);
    let handle = GcString(id);
    self.interned.insert(key, handle);
    Ok(handle)
  }

  pub fn get_string(&self, s: GcString) -> Result<&JsString, VmError> {
    match self.get_heap_object(s.0)? {
      HeapObject::String(s) => Ok(s),
      _ => Err(VmError::InvalidHandle),
    }
  }

  /// Concatenates two strings, interning the result.
  pub fn concat_strings(&mut self, a: GcString, b: GcString) -> Result<GcString, VmError> {
    let mut units = self.get_string(a)?.as_code_units().to_vec();
    units.extend_from_slice(self.get_string(b)?.as_code_units());
    self.alloc_string_units(units)
  }

  // Symbols.

  pub fn alloc_symbol(&mut self, description: Option<GcString>) -> Result<GcSymbol, VmError> {
    if let Some(description) = description {
      self.get_string(description)?;
    }
    let id = self.next_symbol_id;
    self.next_symbol_id += 1;
    Ok(GcSymbol(self.alloc(HeapObject::Symbol(JsSymbol::new(id, description)))?))
  }

  pub fn get_symbol(&self, sym: GcSymbol) -> Result<&JsSymbol, VmError> {
    match self.get_heap_object(sym.0)? {
      HeapObject::Symbol(s) => Ok(s),
      _ => Err(VmError::InvalidHandle),
    }
  }

  // Environments.

  pub(crate) fn get_env(&self, env: GcEnv) -> Result<&EnvRecord, VmError> {
    match self.get_heap_object(env.0)? {
      HeapObject::Env(env) => Ok(env),
      _ => Err(VmError::InvalidHandle),
    }
  }

  pub(crate) fn get_env_mut(&mut self, env: GcEnv) -> Result<&mut EnvRecord, VmError> {
    match self.get_heap_object_mut(env.0)? {
      HeapObject::Env(env) => Ok(env),
      _ => Err(VmError::InvalidHandle),
    }
  }

  // Objects.

  pub fn alloc_object(
    &mut self,
    prototype: Option<GcObject>,
    kind: ObjectKind,
  ) -> Result<GcObject, VmError> {
    if let Some(proto) = prototype {
      self.get_object(proto)?;
    }
    Ok(GcObject(self.alloc(HeapObject::Object(JsObject::new(prototype, kind)))?))
  }

  pub(crate) fn get_object(&self, obj: GcObject) -> Result<&JsObject, VmError> {
    match self.get_heap_object(obj.0)? {
      HeapObject::Object(obj) => Ok(obj),
      _ => Err(VmError::InvalidHandle),
    }
  }

  fn get_object_mut(&mut self, obj: GcObject) -> Result<&mut JsObject, VmError> {
    match self.get_heap_object_mut(obj.0)? {
      HeapObject::Object(obj) => Ok(obj),
      _ => Err(VmError::InvalidHandle),
    }
  }

  pub fn object_kind(&self, obj: GcObject) -> Result<ObjectKind, VmError> {
    Ok(self.get_object(obj)?.kind)
  }

  pub fn set_object_kind(&mut self, obj: GcObject, kind: ObjectKind) -> Result<(), VmError> {
    self.get_object_mut(obj)?.kind = kind;
    Ok(())
  }

  pub fn is_callable(&self, value: Value) -> Result<bool, VmError> {
    match value {
      Value::Object(obj) => Ok(matches!(self.object_kind(obj)?, ObjectKind::Function(_))),
      _ => Ok(false),
    }
  }

  pub fn object_prototype(&self, obj: GcObject) -> Result<Option<GcObject>, VmError> {
    Ok(self.get_object(obj)?.prototype)
  }

  /// Sets `[[Prototype]]`, rejecting changes that would create a cycle.
  pub fn object_set_prototype(
    &mut self,
    obj: GcObject,
    prototype: Option<GcObject>,
  ) -> Result<(), VmError> {
    let mut current = prototype;
    let mut steps = 0usize;
    while let Some(p) = current {
      if p == obj {
        return Err(VmError::PrototypeCycle);
      }
      steps += 1;
      if steps > MAX_PROTOTYPE_CHAIN {
        return Err(VmError::PrototypeChainTooDeep);
      }
      current = self.get_object(p)?.prototype;
    }
    self.get_object_mut(obj)?.prototype = prototype;
    Ok(())
  }

  pub fn object_is_extensible(&self, obj: GcObject) -> Result<bool, VmError> {
    Ok(self.get_object(obj)?.extensible)
  }

  pub fn object_prevent_extensions(&mut self, obj: GcObject) -> Result<(), VmError> {
    self.get_object_mut(obj)?.extensible = false;
    Ok(())
  }

  pub fn get_own_property(
    &self,
    obj: GcObject,
    key: &PropertyKey,
  ) -> Result<Option<PropertyDescriptor>, VmError> {
    let obj = self.get_object(obj)?;
    Ok(obj.find(key).map(|idx| obj.properties[idx].1))
  }

  /// Creates or replaces an own property. Replacing keeps the key's position in the property
  /// order. Does not validate attribute transitions.
  pub fn define_property(
    &mut self,
    obj: GcObject,
    key: PropertyKey,
    desc: PropertyDescriptor,
  ) -> Result<(), VmError> {
    if let Some(idx) = self.get_object(obj)?.find(&key) {
      self.get_object_mut(obj)?.properties[idx].1 = desc;
      return Ok(());
    }
    self.charge(PROPERTY_BYTES)?;
    self.get_object_mut(obj)?.properties.push((key, desc));
    Ok(())
  }

  /// Removes a configurable own property. Returns `false` if the property exists but is not
  /// configurable.
  pub fn delete_own_property(&mut self, obj: GcObject, key: &PropertyKey) -> Result<bool, VmError> {
    let target = self.get_object_mut(obj)?;
    let Some(idx) = target.find(key) else {
      return Ok(true);
    };
    if !target.properties[idx].1.configurable {
      return Ok(false);
    }
    target.properties.remove(idx);
    self.used_bytes = self.used_bytes.saturating_sub(PROPERTY_BYTES);
    Ok(true)
  }

  /// OrdinaryOwnPropertyKeys: array indices ascending, then other strings in insertion order, then
  /// symbols in insertion order.
  pub fn own_property_keys(&self, obj: GcObject) -> Result<Vec<PropertyKey>, VmError> {
    let obj = self.get_object(obj)?;
    let mut indices = Vec::new();
    let mut strings = Vec::new();
    let mut symbols = Vec::new();
    for (key, _) in &obj.properties {
      match key {
        PropertyKey::String(s) => match self.get_string(*s)?.to_array_index() {
          Some(idx) => indices.push((idx, *key)),
          None => strings.push(*key),
        },
        PropertyKey::Symbol(_) => symbols.push(*key),
      }
    }
    indices.sort_by_key(|(idx, _)| *idx);
    let mut keys: Vec<PropertyKey> = indices.into_iter().map(|(_, key)| key).collect();
    keys.extend(strings);
    keys.extend(symbols);
    Ok(keys)
  }

  /// Finds a property on `obj` or its prototype chain.
  pub fn get_property(
    &self,
    obj: GcObject,
    key: &PropertyKey,
  ) -> Result<Option<PropertyDescriptor>, VmError> {
    let mut current = Some(obj);
    let mut steps = 0usize;
    while let Some(o) = current {
      steps += 1;
      if steps > MAX_PROTOTYPE_CHAIN {
        return Err(VmError::PrototypeChainTooDeep);
      }
      let object = self.get_object(o)?;
      if let Some(idx) = object.find(key) {
        return Ok(Some(object.properties[idx].1));
      }
      current = object.prototype;
    }
    Ok(None)
  }

  pub fn has_property(&self, obj: GcObject, key: &PropertyKey) -> Result<bool, VmError> {
    Ok(self.get_property(obj, key)?.is_some())
  }

  /// Reads a data property along the prototype chain. Missing properties read as `undefined`.
  ///
  /// Accessor properties need an execution context to call their getter and are rejected here.
  pub fn get(&self, obj: GcObject, key: &PropertyKey) -> Result<Value, VmError> {
    match self.get_property(obj, key)? {
      None => Ok(Value::Undefined),
      Some(PropertyDescriptor {
        kind: PropertyKind::Data { value, .. },
        ..
      }) => Ok(value),
      Some(_) => Err(VmError::Unimplemented("accessor read outside of evaluation")),
    }
  }

  /// Convenience for reading a data property by a UTF-8 name.
  pub fn get_by_name(&mut self, obj: GcObject, name: &str) -> Result<Value, VmError> {
    let key = PropertyKey::String(self.alloc_string(name)?);
    self.get(obj, &key)
  }

  /// The value of `length` on an array object.
  pub fn array_length(&self, array: GcObject, length_key: &PropertyKey) -> Result<u32, VmError> {
    match self.get_own_property(array, length_key)? {
      Some(desc) => match desc.data_value() {
        Some(Value::Number(n)) => Ok(n as u32),
        _ => Ok(0),
      },
      None => Ok(0),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{Heap, HeapLimits};
  use crate::object::ObjectKind;
  use crate::property::{PropertyDescriptor, PropertyKey};
  use crate::{Value, VmError};

  #[test]
  fn strings_are_interned() {
    let mut heap = Heap::new(HeapLimits::default());
    let a = heap.alloc_string("length").unwrap();
    let b = heap.alloc_string("length").unwrap();
    let c = heap.alloc_string("name").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn clear_invalidates_handles() {
    let mut heap = Heap::new(HeapLimits::default());
    let s = heap.alloc_string("x").unwrap();
    let obj = heap.alloc_object(None, ObjectKind::Ordinary).unwrap();
    heap.clear();
    assert!(matches!(heap.get_string(s), Err(VmError::InvalidHandle)));
    assert!(matches!(heap.object_prototype(obj), Err(VmError::InvalidHandle)));
    assert!(heap.is_empty());

    // Slots are reused with a newer generation.
    let obj2 = heap.alloc_object(None, ObjectKind::Ordinary).unwrap();
    assert_ne!(obj, obj2);
    assert!(heap.is_valid_object(obj2));
  }

  #[test]
  fn prototype_cycles_are_rejected() {
    let mut heap = Heap::new(HeapLimits::default());
    let a = heap.alloc_object(None, ObjectKind::Ordinary).unwrap();
    let b = heap.alloc_object(Some(a), ObjectKind::Ordinary).unwrap();
    assert!(matches!(
      heap.object_set_prototype(a, Some(b)),
      Err(VmError::PrototypeCycle)
    ));
    assert!(matches!(
      heap.object_set_prototype(a, Some(a)),
      Err(VmError::PrototypeCycle)
    ));
  }

  #[test]
  fn own_keys_put_indices_first() {
    let mut heap = Heap::new(HeapLimits::default());
    let obj = heap.alloc_object(None, ObjectKind::Ordinary).unwrap();
    for name in ["b", "2", "a", "0"] {
      let key = PropertyKey::String(heap.alloc_string(name).unwrap());
      heap
        .define_property(obj, key, PropertyDescriptor::plain(Value::Null))
        .unwrap();
    }
    let sym = heap.alloc_symbol(None).unwrap();
    heap
      .define_property(obj, PropertyKey::Symbol(sym), PropertyDescriptor::plain(Value::Null))
      .unwrap();

    let names: Vec<String> = heap
      .own_property_keys(obj)
      .unwrap()
      .into_iter()
      .map(|key| match key {
        PropertyKey::String(s) => heap.get_string(s).unwrap().to_utf8_lossy(),
        PropertyKey::Symbol(_) => "@@sym".to_string(),
      })
      .collect();
    assert_eq!(names, ["0", "2", "b", "a", "@@sym"]);
  }

  #[test]
  fn allocations_past_the_limit_fail() {
    let mut heap = Heap::new(HeapLimits::new(1024));
    let obj = heap.alloc_object(None, ObjectKind::Ordinary).unwrap();
    let mut defined = 0;
    let err = loop {
      let key = match heap.alloc_string(&defined.to_string()) {
        Ok(s) => PropertyKey::String(s),
        Err(err) => break err,
      };
      if let Err(err) = heap.define_property(obj, key, PropertyDescriptor::plain(Value::Null)) {
        break err;
      }
      defined += 1;
    };
    assert!(matches!(err, VmError::OutOfMemory));
    assert!(defined > 0);
    assert!(heap.used_bytes() <= 1024);

    // Interned strings are not charged twice.
    let before = heap.used_bytes();
    assert!(heap.alloc_string("0").is_ok());
    assert_eq!(heap.used_bytes(), before);

    heap.clear();
    assert_eq!(heap.used_bytes(), 0);
    assert!(heap.alloc_object(None, ObjectKind::Ordinary).is_ok());
  }
}
