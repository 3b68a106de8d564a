//! Abstract operations (ECMA-262 §7) over the running execution context.
//!
//! Anything that may call back into script code (getters, setters, `valueOf`, `@@toPrimitive`)
//! needs the context, so these live on [`ExecutionContext`] rather than on the heap.

use crate::intrinsics::{ObjectIntrinsic, StringIntrinsic, SymbolIntrinsic};
use crate::object::ObjectKind;
use crate::property::{PropertyDescriptor, PropertyKey, PropertyKind};
use crate::{ExecutionContext, GcObject, GcString, GcSymbol, Value, VmError};
use ahash::AHashSet;

/// The `hint` of ToPrimitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
  Default,
  Number,
  String,
}

/// Largest integer a Number represents exactly (`2^53 - 1`), the upper bound of ToLength.
const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

impl ExecutionContext<'_, '_> {
  pub fn to_boolean(&self, value: Value) -> Result<bool, VmError> {
    Ok(match value {
      Value::Empty | Value::Undefined | Value::Null => false,
      Value::Bool(b) => b,
      Value::Number(n) => n != 0.0 && !n.is_nan(),
      Value::String(s) => !self.heap().get_string(s)?.is_empty(),
      Value::Symbol(_) | Value::Object(_) => true,
    })
  }

  pub fn to_primitive(&mut self, value: Value, hint: PreferredType) -> Result<Value, VmError> {
    let Value::Object(obj) = value else {
      return Ok(value);
    };

    let to_primitive_key = self.intrinsics().symbol_key(SymbolIntrinsic::ToPrimitive)?;
    if let Some(exotic) = self.get_method(value, &to_primitive_key)? {
      let hint = match hint {
        PreferredType::Default => "default",
        PreferredType::Number => "number",
        PreferredType::String => "string",
      };
      let hint = Value::String(self.intern(hint)?);
      let result = self.call(exotic, value, &[hint])?;
      if matches!(result, Value::Object(_)) {
        return Err(self.throw_type_error("Cannot convert object to primitive value"));
      }
      return Ok(result);
    }

    // OrdinaryToPrimitive.
    let order = match hint {
      PreferredType::String => [StringIntrinsic::ToString, StringIntrinsic::ValueOf],
      PreferredType::Default | PreferredType::Number => {
        [StringIntrinsic::ValueOf, StringIntrinsic::ToString]
      }
    };
    for name in order {
      let key = self.key(name)?;
      let method = self.get(obj, &key)?;
      if self.heap().is_callable(method)? {
        let result = self.call(method, value, &[])?;
        if !matches!(result, Value::Object(_)) {
          return Ok(result);
        }
      }
    }
    Err(self.throw_type_error("Cannot convert object to primitive value"))
  }

  pub fn to_number(&mut self, value: Value) -> Result<f64, VmError> {
    match value {
      Value::Empty | Value::Undefined => Ok(f64::NAN),
      Value::Null => Ok(0.0),
      Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
      Value::Number(n) => Ok(n),
      Value::String(s) => Ok(string_to_number(&self.heap().get_string(s)?.to_utf8_lossy())),
      Value::Symbol(_) => Err(self.throw_type_error("Cannot convert a Symbol value to a number")),
      Value::Object(_) => {
        let primitive = self.to_primitive(value, PreferredType::Number)?;
        self.to_number(primitive)
      }
    }
  }

  /// ToIntegerOrInfinity.
  pub fn to_integer_or_infinity(&mut self, value: Value) -> Result<f64, VmError> {
    let n = self.to_number(value)?;
    if n.is_nan() || n == 0.0 {
      return Ok(0.0);
    }
    Ok(n.trunc())
  }

  pub fn to_int32(&mut self, value: Value) -> Result<i32, VmError> {
    Ok(to_int32(self.to_number(value)?))
  }

  pub fn to_uint32(&mut self, value: Value) -> Result<u32, VmError> {
    Ok(to_uint32(self.to_number(value)?))
  }

  /// ToLength: an integer in `0..=2^53 - 1`.
  pub fn to_length(&mut self, value: Value) -> Result<u64, VmError> {
    let len = self.to_integer_or_infinity(value)?;
    if len <= 0.0 {
      return Ok(0);
    }
    Ok(len.min(MAX_SAFE_INTEGER) as u64)
  }

  pub fn to_string(&mut self, value: Value) -> Result<GcString, VmError> {
    match value {
      Value::String(s) => Ok(s),
      Value::Empty | Value::Undefined => self.intern("undefined"),
      Value::Null => self.intern("null"),
      Value::Bool(true) => self.intern("true"),
      Value::Bool(false) => self.intern("false"),
      Value::Number(n) => {
        let s = number_to_string(n);
        self.intern(&s)
      }
      Value::Symbol(_) => Err(self.throw_type_error("Cannot convert a Symbol value to a string")),
      Value::Object(_) => {
        let primitive = self.to_primitive(value, PreferredType::String)?;
        self.to_string(primitive)
      }
    }
  }

  /// ToString followed by a lossy conversion to UTF-8, for messages and host inspection.
  pub fn to_rust_string(&mut self, value: Value) -> Result<String, VmError> {
    let s = self.to_string(value)?;
    Ok(self.heap().get_string(s)?.to_utf8_lossy())
  }

  pub fn to_property_key(&mut self, value: Value) -> Result<PropertyKey, VmError> {
    match self.to_primitive(value, PreferredType::String)? {
      Value::Symbol(sym) => Ok(PropertyKey::Symbol(sym)),
      other => Ok(PropertyKey::String(self.to_string(other)?)),
    }
  }

  pub fn to_object(&mut self, value: Value) -> Result<GcObject, VmError> {
    let (prototype, kind) = match value {
      Value::Object(obj) => return Ok(obj),
      Value::Empty | Value::Undefined | Value::Null => {
        return Err(self.throw_type_error("Cannot convert undefined or null to object"));
      }
      Value::Bool(b) => (ObjectIntrinsic::BooleanPrototype, ObjectKind::Boolean(b)),
      Value::Number(n) => (ObjectIntrinsic::NumberPrototype, ObjectKind::Number(n)),
      Value::String(s) => (ObjectIntrinsic::StringPrototype, ObjectKind::String(s)),
      Value::Symbol(s) => (ObjectIntrinsic::SymbolPrototype, ObjectKind::Symbol(s)),
    };
    let prototype = self.intrinsic(prototype)?;
    let obj = self.heap_mut().alloc_object(Some(prototype), kind)?;
    if let ObjectKind::String(s) = kind {
      let len = self.heap().get_string(s)?.len_code_units();
      let length_key = self.key(StringIntrinsic::Length)?;
      self.heap_mut().define_property(
        obj,
        length_key,
        PropertyDescriptor::frozen(Value::Number(len as f64)),
      )?;
    }
    Ok(obj)
  }

  /// The `typeof` operator.
  pub fn type_of(&self, value: Value) -> Result<&'static str, VmError> {
    Ok(match value {
      Value::Empty | Value::Undefined => "undefined",
      Value::Null => "object",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Symbol(_) => "symbol",
      Value::Object(_) => {
        if self.heap().is_callable(value)? {
          "function"
        } else {
          "object"
        }
      }
    })
  }

  /// IsLooselyEqual (`==`).
  pub fn loose_equals(&mut self, a: Value, b: Value) -> Result<bool, VmError> {
    if std::mem::discriminant(&a) == std::mem::discriminant(&b) {
      return Ok(a.strictly_equals(b));
    }
    match (a, b) {
      (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
      (Value::Number(x), Value::String(_)) => Ok(x == self.to_number(b)?),
      (Value::String(_), Value::Number(y)) => Ok(self.to_number(a)? == y),
      (Value::Bool(_), _) => {
        let a = Value::Number(self.to_number(a)?);
        self.loose_equals(a, b)
      }
      (_, Value::Bool(_)) => {
        let b = Value::Number(self.to_number(b)?);
        self.loose_equals(a, b)
      }
      (Value::Object(_), Value::String(_) | Value::Number(_) | Value::Symbol(_)) => {
        let a = self.to_primitive(a, PreferredType::Default)?;
        self.loose_equals(a, b)
      }
      (Value::String(_) | Value::Number(_) | Value::Symbol(_), Value::Object(_)) => {
        let b = self.to_primitive(b, PreferredType::Default)?;
        self.loose_equals(a, b)
      }
      _ => Ok(false),
    }
  }

  /// IsLessThan. `None` is the `undefined` result of a comparison involving NaN.
  pub fn less_than(&mut self, a: Value, b: Value, left_first: bool) -> Result<Option<bool>, VmError> {
    let (px, py) = if left_first {
      let px = self.to_primitive(a, PreferredType::Number)?;
      let py = self.to_primitive(b, PreferredType::Number)?;
      (px, py)
    } else {
      let py = self.to_primitive(b, PreferredType::Number)?;
      let px = self.to_primitive(a, PreferredType::Number)?;
      (px, py)
    };
    if let (Value::String(x), Value::String(y)) = (px, py) {
      let x = self.heap().get_string(x)?.as_code_units();
      let y = self.heap().get_string(y)?.as_code_units();
      return Ok(Some(x < y));
    }
    let nx = self.to_number(px)?;
    let ny = self.to_number(py)?;
    if nx.is_nan() || ny.is_nan() {
      return Ok(None);
    }
    Ok(Some(nx < ny))
  }

  /// GetMethod: `None` for `undefined`/`null`, a TypeError for other non-callables.
  pub fn get_method(&mut self, value: Value, key: &PropertyKey) -> Result<Option<Value>, VmError> {
    let func = self.get_v(value, key)?;
    if func.is_nullish() {
      return Ok(None);
    }
    if !self.heap().is_callable(func)? {
      let name = self.describe_key(key)?;
      return Err(self.throw_type_error(&format!("{name} is not a function")));
    }
    Ok(Some(func))
  }

  /// `[[Get]]` with the object itself as receiver.
  pub fn get(&mut self, obj: GcObject, key: &PropertyKey) -> Result<Value, VmError> {
    self.get_with_receiver(obj, key, Value::Object(obj))
  }

  pub fn get_with_receiver(
    &mut self,
    obj: GcObject,
    key: &PropertyKey,
    receiver: Value,
  ) -> Result<Value, VmError> {
    if let ObjectKind::String(s) = self.heap().object_kind(obj)? {
      if let Some(unit) = self.string_index(s, key)? {
        return Ok(unit);
      }
    }
    match self.heap().get_property(obj, key)? {
      None => Ok(Value::Undefined),
      Some(desc) => match desc.kind {
        PropertyKind::Data { value, .. } => Ok(value),
        PropertyKind::Accessor { get, .. } => {
          if matches!(get, Value::Undefined) {
            Ok(Value::Undefined)
          } else {
            self.call(get, receiver, &[])
          }
        }
      },
    }
  }

  /// GetV: property access on any value, boxing primitives through their prototype.
  pub fn get_v(&mut self, value: Value, key: &PropertyKey) -> Result<Value, VmError> {
    let prototype = match value {
      Value::Object(obj) => return self.get(obj, key),
      Value::String(s) => {
        if let Some(v) = self.string_own_property(s, key)? {
          return Ok(v);
        }
        ObjectIntrinsic::StringPrototype
      }
      Value::Number(_) => ObjectIntrinsic::NumberPrototype,
      Value::Bool(_) => ObjectIntrinsic::BooleanPrototype,
      Value::Symbol(_) => ObjectIntrinsic::SymbolPrototype,
      Value::Empty | Value::Undefined | Value::Null => {
        let base = if matches!(value, Value::Null) { "null" } else { "undefined" };
        let name = self.describe_key(key)?;
        return Err(self.throw_type_error(&format!(
          "Cannot read properties of {base} (reading '{name}')"
        )));
      }
    };
    let prototype = self.intrinsic(prototype)?;
    self.get_with_receiver(prototype, key, value)
  }

  /// `length` and index properties of a primitive string.
  fn string_own_property(&mut self, s: GcString, key: &PropertyKey) -> Result<Option<Value>, VmError> {
    if *key == self.key(StringIntrinsic::Length)? {
      let len = self.heap().get_string(s)?.len_code_units();
      return Ok(Some(Value::Number(len as f64)));
    }
    self.string_index(s, key)
  }

  fn string_index(&mut self, s: GcString, key: &PropertyKey) -> Result<Option<Value>, VmError> {
    let PropertyKey::String(name) = key else {
      return Ok(None);
    };
    let Some(index) = self.heap().get_string(*name)?.to_array_index() else {
      return Ok(None);
    };
    let unit = self.heap().get_string(s)?.as_code_units().get(index as usize).copied();
    unit
      .map(|unit| Ok(Value::String(self.heap_mut().alloc_string_units(vec![unit])?)))
      .transpose()
  }

  /// OrdinarySet with the object as receiver. Returns `false` where strict code would throw.
  pub fn set(&mut self, obj: GcObject, key: PropertyKey, value: Value) -> Result<bool, VmError> {
    match self.heap().get_property(obj, &key)? {
      Some(PropertyDescriptor {
        kind: PropertyKind::Accessor { set, .. },
        ..
      }) => {
        if matches!(set, Value::Undefined) {
          return Ok(false);
        }
        self.call(set, Value::Object(obj), &[value])?;
        Ok(true)
      }
      Some(desc) if !desc.is_writable() => Ok(false),
      _ => match self.heap().get_own_property(obj, &key)? {
        Some(existing) => self.define_own_data(
          obj,
          key,
          PropertyDescriptor {
            kind: PropertyKind::Data { value, writable: true },
            ..existing
          },
        ),
        None => {
          if !self.heap().object_is_extensible(obj)? {
            return Ok(false);
          }
          self.define_own_data(obj, key, PropertyDescriptor::plain(value))
        }
      },
    }
  }

  /// Defines an own data property, keeping an array's `length` in step with its indices.
  fn define_own_data(
    &mut self,
    obj: GcObject,
    key: PropertyKey,
    desc: PropertyDescriptor,
  ) -> Result<bool, VmError> {
    if matches!(self.heap().object_kind(obj)?, ObjectKind::Array) {
      let length_key = self.key(StringIntrinsic::Length)?;
      if key == length_key {
        let new_len = self.to_array_length(desc.data_value().unwrap_or(Value::Undefined))?;
        return self.set_array_length(obj, new_len);
      }
      if let PropertyKey::String(name) = key {
        if let Some(index) = self.heap().get_string(name)?.to_array_index() {
          let length = self.heap().get_own_property(obj, &length_key)?;
          let old_len = self.heap().array_length(obj, &length_key)?;
          if index >= old_len {
            if !length.map_or(true, |desc| desc.is_writable()) {
              return Ok(false);
            }
            self.heap_mut().define_property(obj, key, desc)?;
            self.heap_mut().define_property(
              obj,
              length_key,
              PropertyDescriptor::data(Value::Number(f64::from(index) + 1.0), true, false, false),
            )?;
            return Ok(true);
          }
        }
      }
    }
    self.heap_mut().define_property(obj, key, desc)?;
    Ok(true)
  }

  fn to_array_length(&mut self, value: Value) -> Result<u32, VmError> {
    let number = self.to_number(value)?;
    let len = to_uint32(number);
    if f64::from(len) != number {
      return Err(self.throw_range_error("Invalid array length"));
    }
    Ok(len)
  }

  /// ArraySetLength: shrinking deletes the index properties at or above the new length.
  fn set_array_length(&mut self, array: GcObject, new_len: u32) -> Result<bool, VmError> {
    let length_key = self.key(StringIntrinsic::Length)?;
    if let Some(desc) = self.heap().get_own_property(array, &length_key)? {
      if !desc.is_writable() {
        return Ok(false);
      }
    }
    let old_len = self.heap().array_length(array, &length_key)?;
    if new_len < old_len {
      for key in self.heap().own_property_keys(array)?.into_iter().rev() {
        let PropertyKey::String(name) = key else {
          continue;
        };
        match self.heap().get_string(name)?.to_array_index() {
          Some(index) if index >= new_len => {
            self.heap_mut().delete_own_property(array, &key)?;
          }
          _ => {}
        }
      }
    }
    self.heap_mut().define_property(
      array,
      length_key,
      PropertyDescriptor::data(Value::Number(f64::from(new_len)), true, false, false),
    )?;
    Ok(true)
  }

  /// CreateDataProperty; failures (non-extensible targets) are ignored.
  pub fn create_data_property(
    &mut self,
    obj: GcObject,
    key: PropertyKey,
    value: Value,
  ) -> Result<(), VmError> {
    self.define_own_data(obj, key, PropertyDescriptor::plain(value))?;
    Ok(())
  }

  /// `[[Delete]]`: `false` if the property is non-configurable.
  pub fn delete_property(&mut self, obj: GcObject, key: &PropertyKey) -> Result<bool, VmError> {
    self.heap_mut().delete_own_property(obj, key)
  }

  pub fn has_property(&self, obj: GcObject, key: &PropertyKey) -> Result<bool, VmError> {
    self.heap().has_property(obj, key)
  }

  /// The property key for an array index.
  pub fn index_key(&mut self, index: u64) -> Result<PropertyKey, VmError> {
    self.string_key(&index.to_string())
  }

  /// CreateArrayFromList.
  pub fn create_array(&mut self, values: &[Value]) -> Result<GcObject, VmError> {
    let prototype = self.intrinsic(ObjectIntrinsic::ArrayPrototype)?;
    let array = self.heap_mut().alloc_object(Some(prototype), ObjectKind::Array)?;
    let length_key = self.key(StringIntrinsic::Length)?;
    self.heap_mut().define_property(
      array,
      length_key,
      PropertyDescriptor::data(Value::Number(0.0), true, false, false),
    )?;
    for (idx, value) in values.iter().enumerate() {
      let key = self.index_key(idx as u64)?;
      self.create_data_property(array, key, *value)?;
    }
    Ok(array)
  }

  /// LengthOfArrayLike.
  pub fn length_of_array_like(&mut self, obj: GcObject) -> Result<u64, VmError> {
    let length_key = self.key(StringIntrinsic::Length)?;
    let len = self.get(obj, &length_key)?;
    self.to_length(len)
  }

  /// Sets `length` through `[[Set]]`, as the array methods do.
  pub(crate) fn set_length(&mut self, obj: GcObject, len: u64) -> Result<(), VmError> {
    let length_key = self.key(StringIntrinsic::Length)?;
    self.set(obj, length_key, Value::Number(len as f64))?;
    Ok(())
  }

  pub fn ordinary_object(&mut self) -> Result<GcObject, VmError> {
    let prototype = self.intrinsic(ObjectIntrinsic::ObjectPrototype)?;
    self.heap_mut().alloc_object(Some(prototype), ObjectKind::Ordinary)
  }

  /// CreateIterResultObject.
  pub fn create_iter_result(&mut self, value: Value, done: bool) -> Result<Value, VmError> {
    let result = self.ordinary_object()?;
    let value_key = self.key(StringIntrinsic::Value)?;
    let done_key = self.key(StringIntrinsic::Done)?;
    self.create_data_property(result, value_key, value)?;
    self.create_data_property(result, done_key, Value::Bool(done))?;
    Ok(Value::Object(result))
  }

  /// CopyDataProperties: enumerable own properties of `source` not listed in `excluded`.
  pub fn copy_data_properties(
    &mut self,
    target: GcObject,
    source: Value,
    excluded: &[PropertyKey],
  ) -> Result<(), VmError> {
    if source.is_nullish() {
      return Ok(());
    }
    let from = self.to_object(source)?;
    for key in self.heap().own_property_keys(from)? {
      if excluded.contains(&key) {
        continue;
      }
      let enumerable = self
        .heap()
        .get_own_property(from, &key)?
        .is_some_and(|desc| desc.enumerable);
      if enumerable {
        let value = self.get(from, &key)?;
        self.create_data_property(target, key, value)?;
      }
    }
    Ok(())
  }

  /// The keys a `for-in` visits: enumerable string keys of `obj` and its prototypes, skipping keys
  /// shadowed by an earlier object in the chain. Each key is paired with the object it was found on.
  pub fn enumerate_object_properties(
    &mut self,
    obj: GcObject,
  ) -> Result<Vec<(GcObject, PropertyKey)>, VmError> {
    let mut visited = AHashSet::new();
    let mut keys = Vec::new();
    let mut current = Some(obj);
    while let Some(o) = current {
      if let ObjectKind::String(s) = self.heap().object_kind(o)? {
        for idx in 0..self.heap().get_string(s)?.len_code_units() {
          let key = self.index_key(idx as u64)?;
          if visited.insert(key) {
            keys.push((o, key));
          }
        }
      }
      for key in self.heap().own_property_keys(o)? {
        if !matches!(key, PropertyKey::String(_)) || !visited.insert(key) {
          continue;
        }
        if let Some(desc) = self.heap().get_own_property(o, &key)? {
          if desc.enumerable {
            keys.push((o, key));
          }
        }
      }
      current = self.heap().object_prototype(o)?;
    }
    Ok(keys)
  }

  /// OrdinaryHasInstance.
  pub fn ordinary_has_instance(&mut self, constructor: Value, value: Value) -> Result<bool, VmError> {
    if !self.heap().is_callable(constructor)? {
      return Ok(false);
    }
    let (Value::Object(constructor), Value::Object(mut obj)) = (constructor, value) else {
      return Ok(false);
    };
    let prototype_key = self.key(StringIntrinsic::Prototype)?;
    let Value::Object(prototype) = self.get(constructor, &prototype_key)? else {
      return Err(self.throw_type_error(
        "Function has non-object prototype in instanceof check",
      ));
    };
    loop {
      match self.heap().object_prototype(obj)? {
        None => return Ok(false),
        Some(p) if p == prototype => return Ok(true),
        Some(p) => obj = p,
      }
    }
  }

  /// InstanceofOperator.
  pub fn instance_of(&mut self, value: Value, target: Value) -> Result<bool, VmError> {
    if !matches!(target, Value::Object(_)) {
      return Err(self.throw_type_error("Right-hand side of 'instanceof' is not an object"));
    }
    let has_instance_key = self.intrinsics().symbol_key(SymbolIntrinsic::HasInstance)?;
    if let Some(handler) = self.get_method(target, &has_instance_key)? {
      let result = self.call(handler, target, &[value])?;
      return self.to_boolean(result);
    }
    if !self.heap().is_callable(target)? {
      return Err(self.throw_type_error("Right-hand side of 'instanceof' is not callable"));
    }
    self.ordinary_has_instance(target, value)
  }

  /// A property key as it appears in messages: the string itself or `Symbol(description)`.
  pub(crate) fn describe_key(&self, key: &PropertyKey) -> Result<String, VmError> {
    match key {
      PropertyKey::String(s) => Ok(self.heap().get_string(*s)?.to_utf8_lossy()),
      PropertyKey::Symbol(sym) => self.symbol_descriptive_string(*sym),
    }
  }

  /// SymbolDescriptiveString.
  pub(crate) fn symbol_descriptive_string(&self, sym: GcSymbol) -> Result<String, VmError> {
    let description = match self.heap().get_symbol(sym)?.description() {
      Some(s) => self.heap().get_string(s)?.to_utf8_lossy(),
      None => String::new(),
    };
    Ok(format!("Symbol({description})"))
  }
}

/// Number::toString(10).
pub fn number_to_string(n: f64) -> String {
  if n.is_nan() {
    return "NaN".to_string();
  }
  if n == 0.0 {
    return "0".to_string();
  }
  if n.is_infinite() {
    return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
  }
  if n < 0.0 {
    return format!("-{}", number_to_string(-n));
  }

  // `{:e}` yields the shortest round-tripping digits as `d.ddde±x`.
  let formatted = format!("{n:e}");
  let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
  let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
  let k = digits.len() as i32;
  let point = exponent.parse::<i32>().unwrap_or(0) + 1;

  if k <= point && point <= 21 {
    let mut out = digits;
    out.extend(std::iter::repeat('0').take((point - k) as usize));
    out
  } else if 0 < point && point <= 21 {
    let (int, frac) = digits.split_at(point as usize);
    format!("{int}.{frac}")
  } else if -6 < point && point <= 0 {
    format!("0.{}{digits}", "0".repeat((-point) as usize))
  } else {
    let e = point - 1;
    let sign = if e < 0 { '-' } else { '+' };
    let (first, rest) = digits.split_at(1);
    if rest.is_empty() {
      format!("{first}e{sign}{}", e.abs())
    } else {
      format!("{first}.{rest}e{sign}{}", e.abs())
    }
  }
}

/// Number::toString(radix) for radixes other than 10.
pub fn number_to_string_radix(n: f64, radix: u32) -> String {
  if radix == 10 || !n.is_finite() {
    return number_to_string(n);
  }
  if n == 0.0 {
    return "0".to_string();
  }
  let negative = n < 0.0;
  let n = n.abs();
  let mut int = n.trunc();
  let mut frac = n - int;

  let mut int_digits = Vec::new();
  while int >= 1.0 {
    let digit = (int % f64::from(radix)) as u32;
    int_digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
    int = (int / f64::from(radix)).trunc();
  }
  if int_digits.is_empty() {
    int_digits.push('0');
  }
  let mut out: String = int_digits.into_iter().rev().collect();
  if negative {
    out.insert(0, '-');
  }

  if frac > 0.0 {
    out.push('.');
    // Enough digits to cover the 52-bit mantissa in base 2.
    for _ in 0..52 {
      frac *= f64::from(radix);
      let digit = frac.trunc() as u32;
      out.push(std::char::from_digit(digit, radix).unwrap_or('0'));
      frac -= f64::from(digit);
      if frac == 0.0 {
        break;
      }
    }
  }
  out
}

/// StringToNumber.
pub fn string_to_number(s: &str) -> f64 {
  let trimmed = s.trim_matches(is_ecma_whitespace);
  if trimmed.is_empty() {
    return 0.0;
  }

  match trimmed {
    "Infinity" | "+Infinity" => return f64::INFINITY,
    "-Infinity" => return f64::NEG_INFINITY,
    _ => {}
  }

  for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
    if let Some(digits) = trimmed.strip_prefix(prefix) {
      return parse_ascii_int_radix(digits, radix).unwrap_or(f64::NAN);
    }
  }

  // Rust's float parser also accepts `inf` and `nan`.
  if !trimmed
    .bytes()
    .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
  {
    return f64::NAN;
  }
  trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_ascii_int_radix(digits: &str, radix: u32) -> Option<f64> {
  if digits.is_empty() {
    return None;
  }
  let mut value = 0.0f64;
  for c in digits.chars() {
    let digit = c.to_digit(radix)?;
    value = value * f64::from(radix) + f64::from(digit);
  }
  Some(value)
}

fn is_ecma_whitespace(c: char) -> bool {
  matches!(
    c,
    '\u{0009}'
      | '\u{000A}'
      | '\u{000B}'
      | '\u{000C}'
      | '\u{000D}'
      | '\u{0020}'
      | '\u{00A0}'
      | '\u{1680}'
      | '\u{2000}'..='\u{200A}'
      | '\u{2028}'
      | '\u{2029}'
      | '\u{202F}'
      | '\u{205F}'
      | '\u{3000}'
      | '\u{FEFF}'
  )
}

/// ToInt32 of an already-converted Number.
pub fn to_int32(n: f64) -> i32 {
  to_uint32(n) as i32
}

/// ToUint32 of an already-converted Number.
pub fn to_uint32(n: f64) -> u32 {
  if !n.is_finite() || n == 0.0 {
    return 0;
  }
  n.trunc().rem_euclid(4294967296.0) as u32
}

#[cfg(test)]
mod tests {
  use super::{number_to_string, number_to_string_radix, string_to_number, to_int32, to_uint32};

  #[test]
  fn numbers_format_like_number_prototype_to_string() {
    assert_eq!(number_to_string(0.0), "0");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(100.0), "100");
    assert_eq!(number_to_string(1.5), "1.5");
    assert_eq!(number_to_string(-2.0), "-2");
    assert_eq!(number_to_string(0.000001), "0.000001");
    assert_eq!(number_to_string(1e-7), "1e-7");
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1.25e22), "1.25e+22");
    assert_eq!(number_to_string(123456789012345680000.0), "123456789012345680000");
    assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
  }

  #[test]
  fn radix_formatting() {
    assert_eq!(number_to_string_radix(255.0, 16), "ff");
    assert_eq!(number_to_string_radix(-5.0, 2), "-101");
    assert_eq!(number_to_string_radix(0.5, 2), "0.1");
  }

  #[test]
  fn strings_parse_like_string_to_number() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("  42\n"), 42.0);
    assert_eq!(string_to_number("0x10"), 16.0);
    assert_eq!(string_to_number("0b101"), 5.0);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert_eq!(string_to_number(".5"), 0.5);
    assert_eq!(string_to_number("1e3"), 1000.0);
    assert!(string_to_number("inf").is_nan());
    assert!(string_to_number("-0x10").is_nan());
    assert!(string_to_number("12px").is_nan());
  }

  #[test]
  fn int32_wraps_modulo_two_pow_32() {
    assert_eq!(to_int32(4294967295.0), -1);
    assert_eq!(to_int32(2147483648.0), -2147483648);
    assert_eq!(to_uint32(-1.0), 4294967295);
    assert_eq!(to_int32(f64::NAN), 0);
    assert_eq!(to_int32(-1.5), -1);
  }
}
