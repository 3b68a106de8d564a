//! Native behaviour of the built-in functions.
//!
//! Every built-in function object carries a [`NativeFunction`] tag in its call slot; calling the
//! object dispatches on the tag. Intrinsic functions this engine does not implement still exist
//! with the right identity, `name` and `length`, and throw a TypeError when called.

use crate::intrinsics::{ObjectIntrinsic, StringIntrinsic, SymbolIntrinsic};
use crate::object::{IterationKind, ObjectKind};
use crate::ops::{number_to_string, number_to_string_radix};
use crate::property::{PropertyDescriptor, PropertyKey};
use crate::{ExecutionContext, GcObject, GcString, GcSymbol, Value, VmError};

/// Identifies the native code behind a built-in function object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFunction {
  /// `%FunctionPrototype%` itself: accepts any arguments and returns `undefined`.
  FunctionPrototype,
  ThrowTypeError,
  /// An intrinsic function that exists but is not implemented.
  Unsupported(&'static str),
  /// Like [`NativeFunction::Unsupported`], for intrinsics that have `[[Construct]]`.
  UnsupportedConstructor(&'static str),
  ObjectConstructor,
  ObjectCreate,
  ObjectGetPrototypeOf,
  ObjectKeys,
  ObjectSetPrototypeOf,
  ObjectProtoHasOwnProperty,
  ObjectProtoIsPrototypeOf,
  ObjectProtoPropertyIsEnumerable,
  ObjectProtoToString,
  ObjectProtoValueOf,
  FunctionConstructor,
  FunctionProtoApply,
  FunctionProtoCall,
  FunctionProtoHasInstance,
  ArrayConstructor,
  ArrayIsArray,
  ArrayProtoIterator(IterationKind),
  ArrayProtoForEach,
  ArrayProtoIndexOf,
  ArrayProtoJoin,
  ArrayProtoPop,
  ArrayProtoPush,
  ArrayIteratorNext,
  /// `%IteratorPrototype%[@@iterator]`.
  ReturnThis,
  StringConstructor,
  StringProtoValueOf,
  StringProtoIterator,
  StringIteratorNext,
  NumberConstructor,
  NumberProtoToString,
  NumberProtoValueOf,
  BooleanConstructor,
  BooleanProtoToString,
  BooleanProtoValueOf,
  SymbolConstructor,
  SymbolProtoToString,
  SymbolProtoValueOf,
  /// A native error constructor; the payload is the prototype of the errors it creates.
  ErrorConstructor(ObjectIntrinsic),
  ErrorProtoToString,
  IsNaN,
  IsFinite,
}

fn arg(args: &[Value], idx: usize) -> Value {
  args.get(idx).copied().unwrap_or(Value::Undefined)
}

impl NativeFunction {
  /// Whether function objects with this behaviour have a `[[Construct]]` internal method.
  pub fn is_constructor(self) -> bool {
    matches!(
      self,
      NativeFunction::UnsupportedConstructor(_)
        | NativeFunction::ObjectConstructor
        | NativeFunction::FunctionConstructor
        | NativeFunction::ArrayConstructor
        | NativeFunction::StringConstructor
        | NativeFunction::NumberConstructor
        | NativeFunction::BooleanConstructor
        | NativeFunction::SymbolConstructor
        | NativeFunction::ErrorConstructor(_)
    )
  }

  /// Runs the built-in. `new_target` is `Some` when invoked through `[[Construct]]`.
  pub fn call(
    self,
    cx: &mut ExecutionContext<'_, '_>,
    this: Value,
    args: &[Value],
    new_target: Option<GcObject>,
  ) -> Result<Value, VmError> {
    use NativeFunction as N;
    match self {
      N::FunctionPrototype => Ok(Value::Undefined),
      N::ThrowTypeError => Err(cx.throw_type_error(
        "'caller', 'callee', and 'arguments' properties may not be accessed",
      )),
      N::Unsupported(name) | N::UnsupportedConstructor(name) => {
        Err(cx.throw_type_error(&format!("{name} is not supported")))
      }
      N::ObjectConstructor => {
        let value = arg(args, 0);
        if value.is_nullish() {
          return Ok(Value::Object(cx.ordinary_object()?));
        }
        Ok(Value::Object(cx.to_object(value)?))
      }
      N::ObjectCreate => object_create(cx, arg(args, 0), arg(args, 1)),
      N::ObjectGetPrototypeOf => {
        let obj = cx.to_object(arg(args, 0))?;
        Ok(cx.heap().object_prototype(obj)?.map_or(Value::Null, Value::Object))
      }
      N::ObjectKeys => {
        let obj = cx.to_object(arg(args, 0))?;
        let mut keys = Vec::new();
        for key in own_property_keys(cx, obj)? {
          if let PropertyKey::String(s) = key {
            if own_property(cx, obj, &key)?.is_some_and(|desc| desc.enumerable) {
              keys.push(Value::String(s));
            }
          }
        }
        Ok(Value::Object(cx.create_array(&keys)?))
      }
      N::ObjectSetPrototypeOf => object_set_prototype_of(cx, arg(args, 0), arg(args, 1)),
      N::ObjectProtoHasOwnProperty => {
        let key = cx.to_property_key(arg(args, 0))?;
        let obj = cx.to_object(this)?;
        Ok(Value::Bool(own_property(cx, obj, &key)?.is_some()))
      }
      N::ObjectProtoIsPrototypeOf => {
        let Value::Object(mut value) = arg(args, 0) else {
          return Ok(Value::Bool(false));
        };
        let obj = cx.to_object(this)?;
        while let Some(prototype) = cx.heap().object_prototype(value)? {
          if prototype == obj {
            return Ok(Value::Bool(true));
          }
          value = prototype;
        }
        Ok(Value::Bool(false))
      }
      N::ObjectProtoPropertyIsEnumerable => {
        let key = cx.to_property_key(arg(args, 0))?;
        let obj = cx.to_object(this)?;
        Ok(Value::Bool(
          own_property(cx, obj, &key)?.is_some_and(|desc| desc.enumerable),
        ))
      }
      N::ObjectProtoToString => object_to_string(cx, this),
      N::ObjectProtoValueOf => Ok(Value::Object(cx.to_object(this)?)),
      N::FunctionConstructor => {
        Err(cx.throw_type_error("Creating functions from source text is not supported"))
      }
      N::FunctionProtoApply => {
        let list = arg(args, 1);
        let list = if list.is_nullish() {
          Vec::new()
        } else {
          create_list_from_array_like(cx, list)?
        };
        cx.call(this, arg(args, 0), &list)
      }
      N::FunctionProtoCall => {
        let rest = args.get(1..).unwrap_or_default();
        cx.call(this, arg(args, 0), rest)
      }
      N::FunctionProtoHasInstance => Ok(Value::Bool(cx.ordinary_has_instance(this, arg(args, 0))?)),
      N::ArrayConstructor => array_constructor(cx, args),
      N::ArrayIsArray => Ok(Value::Bool(match arg(args, 0) {
        Value::Object(obj) => matches!(cx.heap().object_kind(obj)?, ObjectKind::Array),
        _ => false,
      })),
      N::ArrayProtoIterator(kind) => {
        let target = cx.to_object(this)?;
        let prototype = cx.intrinsic(ObjectIntrinsic::ArrayIteratorPrototype)?;
        let iterator = cx.heap_mut().alloc_object(
          Some(prototype),
          ObjectKind::ArrayIterator {
            target: Some(target),
            next_index: 0,
            kind,
          },
        )?;
        Ok(Value::Object(iterator))
      }
      N::ArrayIteratorNext => array_iterator_next(cx, this),
      N::ArrayProtoForEach => {
        let obj = cx.to_object(this)?;
        let len = cx.length_of_array_like(obj)?;
        let callback = arg(args, 0);
        if !cx.heap().is_callable(callback)? {
          let what = cx.type_of(callback)?;
          return Err(cx.throw_type_error(&format!("{what} is not a function")));
        }
        for idx in 0..len {
          let key = cx.index_key(idx)?;
          if cx.has_property(obj, &key)? {
            let value = cx.get(obj, &key)?;
            cx.call(callback, arg(args, 1), &[value, Value::Number(idx as f64), Value::Object(obj)])?;
          }
        }
        Ok(Value::Undefined)
      }
      N::ArrayProtoIndexOf => array_index_of(cx, this, arg(args, 0), arg(args, 1)),
      N::ArrayProtoJoin => array_join(cx, this, arg(args, 0)),
      N::ArrayProtoPop => {
        let obj = cx.to_object(this)?;
        let len = cx.length_of_array_like(obj)?;
        if len == 0 {
          cx.set_length(obj, 0)?;
          return Ok(Value::Undefined);
        }
        let key = cx.index_key(len - 1)?;
        let value = cx.get(obj, &key)?;
        if !cx.delete_property(obj, &key)? {
          let name = cx.describe_key(&key)?;
          return Err(cx.throw_type_error(&format!("Cannot delete property '{name}'")));
        }
        cx.set_length(obj, len - 1)?;
        Ok(value)
      }
      N::ArrayProtoPush => {
        let obj = cx.to_object(this)?;
        let mut len = cx.length_of_array_like(obj)?;
        for &value in args {
          let key = cx.index_key(len)?;
          cx.set(obj, key, value)?;
          len += 1;
        }
        cx.set_length(obj, len)?;
        Ok(Value::Number(len as f64))
      }
      N::ReturnThis => Ok(this),
      N::StringConstructor => {
        let s = match args.first() {
          None => cx.intrinsics().string(StringIntrinsic::EmptyString)?,
          Some(&Value::Symbol(sym)) if new_target.is_none() => {
            let description = cx.symbol_descriptive_string(sym)?;
            cx.intern(&description)?
          }
          Some(&value) => cx.to_string(value)?,
        };
        wrap_if_constructing(cx, Value::String(s), new_target)
      }
      N::StringProtoValueOf => Ok(Value::String(this_string_value(cx, this)?)),
      N::StringProtoIterator => {
        if this.is_nullish() {
          return Err(cx.throw_type_error(
            "String.prototype[Symbol.iterator] called on null or undefined",
          ));
        }
        let target = cx.to_string(this)?;
        let prototype = cx.intrinsic(ObjectIntrinsic::StringIteratorPrototype)?;
        let iterator = cx.heap_mut().alloc_object(
          Some(prototype),
          ObjectKind::StringIterator {
            target: Some(target),
            position: 0,
          },
        )?;
        Ok(Value::Object(iterator))
      }
      N::StringIteratorNext => string_iterator_next(cx, this),
      N::NumberConstructor => {
        let n = match args.first() {
          None => 0.0,
          Some(&value) => cx.to_number(value)?,
        };
        wrap_if_constructing(cx, Value::Number(n), new_target)
      }
      N::NumberProtoToString => {
        let n = this_number_value(cx, this)?;
        let radix = match arg(args, 0) {
          Value::Undefined => 10.0,
          radix => cx.to_integer_or_infinity(radix)?,
        };
        if !(2.0..=36.0).contains(&radix) {
          return Err(cx.throw_range_error("toString() radix must be between 2 and 36"));
        }
        let s = if radix == 10.0 {
          number_to_string(n)
        } else {
          number_to_string_radix(n, radix as u32)
        };
        Ok(Value::String(cx.intern(&s)?))
      }
      N::NumberProtoValueOf => Ok(Value::Number(this_number_value(cx, this)?)),
      N::BooleanConstructor => {
        let b = cx.to_boolean(arg(args, 0))?;
        wrap_if_constructing(cx, Value::Bool(b), new_target)
      }
      N::BooleanProtoToString => {
        let b = this_boolean_value(cx, this)?;
        Ok(Value::String(cx.intern(if b { "true" } else { "false" })?))
      }
      N::BooleanProtoValueOf => Ok(Value::Bool(this_boolean_value(cx, this)?)),
      N::SymbolConstructor => {
        if new_target.is_some() {
          return Err(cx.throw_type_error("Symbol is not a constructor"));
        }
        let description = match arg(args, 0) {
          Value::Undefined => None,
          value => Some(cx.to_string(value)?),
        };
        Ok(Value::Symbol(cx.heap_mut().alloc_symbol(description)?))
      }
      N::SymbolProtoToString => {
        let sym = this_symbol_value(cx, this)?;
        let s = cx.symbol_descriptive_string(sym)?;
        Ok(Value::String(cx.intern(&s)?))
      }
      N::SymbolProtoValueOf => Ok(Value::Symbol(this_symbol_value(cx, this)?)),
      N::ErrorConstructor(prototype) => error_constructor(cx, prototype, args, new_target),
      N::ErrorProtoToString => error_to_string(cx, this),
      N::IsNaN => Ok(Value::Bool(cx.to_number(arg(args, 0))?.is_nan())),
      N::IsFinite => Ok(Value::Bool(cx.to_number(arg(args, 0))?.is_finite())),
    }
  }
}

/// Own property keys, including the index keys a String wrapper exposes.
fn own_property_keys(cx: &mut ExecutionContext<'_, '_>, obj: GcObject) -> Result<Vec<PropertyKey>, VmError> {
  let mut keys = Vec::new();
  if let ObjectKind::String(s) = cx.heap().object_kind(obj)? {
    for idx in 0..cx.heap().get_string(s)?.len_code_units() {
      keys.push(cx.index_key(idx as u64)?);
    }
  }
  keys.extend(cx.heap().own_property_keys(obj)?);
  Ok(keys)
}

/// `[[GetOwnProperty]]`, including the index properties of String wrappers.
fn own_property(
  cx: &mut ExecutionContext<'_, '_>,
  obj: GcObject,
  key: &PropertyKey,
) -> Result<Option<PropertyDescriptor>, VmError> {
  if let (ObjectKind::String(s), PropertyKey::String(name)) = (cx.heap().object_kind(obj)?, key) {
    if let Some(idx) = cx.heap().get_string(*name)?.to_array_index() {
      let unit = cx.heap().get_string(s)?.as_code_units().get(idx as usize).copied();
      if let Some(unit) = unit {
        let value = Value::String(cx.heap_mut().alloc_string_units(vec![unit])?);
        return Ok(Some(PropertyDescriptor::data(value, false, true, false)));
      }
    }
  }
  cx.heap().get_own_property(obj, key)
}

fn object_create(cx: &mut ExecutionContext<'_, '_>, prototype: Value, properties: Value) -> Result<Value, VmError> {
  let prototype = match prototype {
    Value::Object(obj) => Some(obj),
    Value::Null => None,
    _ => return Err(cx.throw_type_error("Object prototype may only be an Object or null")),
  };
  if !matches!(properties, Value::Undefined) {
    return Err(cx.throw_type_error("Object.create with property descriptors is not supported"));
  }
  let obj = cx.heap_mut().alloc_object(prototype, ObjectKind::Ordinary)?;
  Ok(Value::Object(obj))
}

fn object_set_prototype_of(
  cx: &mut ExecutionContext<'_, '_>,
  target: Value,
  prototype: Value,
) -> Result<Value, VmError> {
  if target.is_nullish() {
    return Err(cx.throw_type_error("Object.setPrototypeOf called on null or undefined"));
  }
  let prototype = match prototype {
    Value::Object(obj) => Some(obj),
    Value::Null => None,
    _ => return Err(cx.throw_type_error("Object prototype may only be an Object or null")),
  };
  let Value::Object(obj) = target else {
    return Ok(target);
  };
  if cx.heap().object_prototype(obj)? != prototype && !cx.heap().object_is_extensible(obj)? {
    return Err(cx.throw_type_error("Cannot set the prototype of a non-extensible object"));
  }
  match cx.heap_mut().object_set_prototype(obj, prototype) {
    Ok(()) => Ok(target),
    Err(VmError::PrototypeCycle) => Err(cx.throw_type_error("Cyclic __proto__ value")),
    Err(err) => Err(err),
  }
}

/// `Object.prototype.toString`.
fn object_to_string(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<Value, VmError> {
  let tag = match this {
    Value::Undefined => "Undefined".to_string(),
    Value::Null => "Null".to_string(),
    _ => {
      let obj = cx.to_object(this)?;
      let builtin_tag = cx.heap().object_kind(obj)?.builtin_tag();
      let tag_key = cx.intrinsics().symbol_key(SymbolIntrinsic::ToStringTag)?;
      match cx.get(obj, &tag_key)? {
        Value::String(tag) => cx.heap().get_string(tag)?.to_utf8_lossy(),
        _ => builtin_tag.to_string(),
      }
    }
  };
  Ok(Value::String(cx.intern(&format!("[object {tag}]"))?))
}

/// CreateListFromArrayLike.
fn create_list_from_array_like(cx: &mut ExecutionContext<'_, '_>, value: Value) -> Result<Vec<Value>, VmError> {
  let Value::Object(obj) = value else {
    return Err(cx.throw_type_error("CreateListFromArrayLike called on non-object"));
  };
  let len = cx.length_of_array_like(obj)?;
  let mut list = Vec::new();
  for idx in 0..len {
    let key = cx.index_key(idx)?;
    list.push(cx.get(obj, &key)?);
  }
  Ok(list)
}

fn array_constructor(cx: &mut ExecutionContext<'_, '_>, args: &[Value]) -> Result<Value, VmError> {
  match args {
    [Value::Number(len)] => {
      let len = *len;
      if len < 0.0 || len.fract() != 0.0 || len > f64::from(u32::MAX) {
        return Err(cx.throw_range_error("Invalid array length"));
      }
      let array = cx.create_array(&[])?;
      cx.set_length(array, len as u64)?;
      Ok(Value::Object(array))
    }
    values => Ok(Value::Object(cx.create_array(values)?)),
  }
}

/// `%ArrayIteratorPrototype%.next`.
fn array_iterator_next(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<Value, VmError> {
  let iterator = match this {
    Value::Object(obj) => Some(obj),
    _ => None,
  };
  let state = match iterator {
    Some(obj) => match cx.heap().object_kind(obj)? {
      ObjectKind::ArrayIterator {
        target,
        next_index,
        kind,
      } => Some((obj, target, next_index, kind)),
      _ => None,
    },
    None => None,
  };
  let Some((iterator, target, index, kind)) = state else {
    return Err(cx.throw_type_error("next method called on incompatible receiver"));
  };
  let Some(target) = target else {
    return cx.create_iter_result(Value::Undefined, true);
  };
  let len = cx.length_of_array_like(target)?;
  if u64::from(index) >= len {
    cx.heap_mut().set_object_kind(
      iterator,
      ObjectKind::ArrayIterator {
        target: None,
        next_index: index,
        kind,
      },
    )?;
    return cx.create_iter_result(Value::Undefined, true);
  }
  cx.heap_mut().set_object_kind(
    iterator,
    ObjectKind::ArrayIterator {
      target: Some(target),
      next_index: index + 1,
      kind,
    },
  )?;
  let position = Value::Number(f64::from(index));
  let value = match kind {
    IterationKind::Keys => position,
    IterationKind::Values | IterationKind::Entries => {
      let key = cx.index_key(u64::from(index))?;
      let element = cx.get(target, &key)?;
      if kind == IterationKind::Values {
        element
      } else {
        Value::Object(cx.create_array(&[position, element])?)
      }
    }
  };
  cx.create_iter_result(value, false)
}

fn array_index_of(
  cx: &mut ExecutionContext<'_, '_>,
  this: Value,
  search: Value,
  from_index: Value,
) -> Result<Value, VmError> {
  let obj = cx.to_object(this)?;
  let len = cx.length_of_array_like(obj)?;
  if len == 0 {
    return Ok(Value::Number(-1.0));
  }
  let n = cx.to_integer_or_infinity(from_index)?;
  if n >= len as f64 {
    return Ok(Value::Number(-1.0));
  }
  let start = if n >= 0.0 {
    n as u64
  } else {
    (len as f64 + n).max(0.0) as u64
  };
  for idx in start..len {
    let key = cx.index_key(idx)?;
    if cx.has_property(obj, &key)? {
      let element = cx.get(obj, &key)?;
      if element.strictly_equals(search) {
        return Ok(Value::Number(idx as f64));
      }
    }
  }
  Ok(Value::Number(-1.0))
}

fn array_join(cx: &mut ExecutionContext<'_, '_>, this: Value, separator: Value) -> Result<Value, VmError> {
  let obj = cx.to_object(this)?;
  let len = cx.length_of_array_like(obj)?;
  let separator: Vec<u16> = match separator {
    Value::Undefined => vec![u16::from(b',')],
    separator => {
      let s = cx.to_string(separator)?;
      cx.heap().get_string(s)?.as_code_units().to_vec()
    }
  };
  let mut units = Vec::new();
  for idx in 0..len {
    if idx > 0 {
      units.extend_from_slice(&separator);
    }
    let key = cx.index_key(idx)?;
    let element = cx.get(obj, &key)?;
    if !element.is_nullish() {
      let s = cx.to_string(element)?;
      units.extend_from_slice(cx.heap().get_string(s)?.as_code_units());
    }
  }
  Ok(Value::String(cx.heap_mut().alloc_string_units(units)?))
}

/// Primitive wrapper constructors return the primitive when called and a wrapper when constructed.
fn wrap_if_constructing(
  cx: &mut ExecutionContext<'_, '_>,
  value: Value,
  new_target: Option<GcObject>,
) -> Result<Value, VmError> {
  match new_target {
    Some(_) => Ok(Value::Object(cx.to_object(value)?)),
    None => Ok(value),
  }
}

fn this_string_value(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<GcString, VmError> {
  match this {
    Value::String(s) => return Ok(s),
    Value::Object(obj) => {
      if let ObjectKind::String(s) = cx.heap().object_kind(obj)? {
        return Ok(s);
      }
    }
    _ => {}
  }
  Err(cx.throw_type_error("String.prototype.valueOf requires that 'this' be a String"))
}

fn this_number_value(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<f64, VmError> {
  match this {
    Value::Number(n) => return Ok(n),
    Value::Object(obj) => {
      if let ObjectKind::Number(n) = cx.heap().object_kind(obj)? {
        return Ok(n);
      }
    }
    _ => {}
  }
  Err(cx.throw_type_error("Number.prototype.valueOf requires that 'this' be a Number"))
}

fn this_boolean_value(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<bool, VmError> {
  match this {
    Value::Bool(b) => return Ok(b),
    Value::Object(obj) => {
      if let ObjectKind::Boolean(b) = cx.heap().object_kind(obj)? {
        return Ok(b);
      }
    }
    _ => {}
  }
  Err(cx.throw_type_error("Boolean.prototype.valueOf requires that 'this' be a Boolean"))
}

fn this_symbol_value(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<GcSymbol, VmError> {
  match this {
    Value::Symbol(sym) => return Ok(sym),
    Value::Object(obj) => {
      if let ObjectKind::Symbol(sym) = cx.heap().object_kind(obj)? {
        return Ok(sym);
      }
    }
    _ => {}
  }
  Err(cx.throw_type_error("Symbol.prototype.valueOf requires that 'this' be a Symbol"))
}

/// `%StringIteratorPrototype%.next`: yields whole code points.
fn string_iterator_next(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<Value, VmError> {
  let state = match this {
    Value::Object(obj) => match cx.heap().object_kind(obj)? {
      ObjectKind::StringIterator { target, position } => Some((obj, target, position)),
      _ => None,
    },
    _ => None,
  };
  let Some((iterator, target, position)) = state else {
    return Err(cx.throw_type_error("next method called on incompatible receiver"));
  };
  let Some(target) = target else {
    return cx.create_iter_result(Value::Undefined, true);
  };
  let units = cx.heap().get_string(target)?.as_code_units();
  let Some(&first) = units.get(position) else {
    cx.heap_mut()
      .set_object_kind(iterator, ObjectKind::StringIterator { target: None, position })?;
    return cx.create_iter_result(Value::Undefined, true);
  };
  let is_pair = (0xD800..=0xDBFF).contains(&first)
    && units
      .get(position + 1)
      .is_some_and(|next| (0xDC00..=0xDFFF).contains(next));
  let code_point = units[position..position + if is_pair { 2 } else { 1 }].to_vec();
  let next = position + code_point.len();
  cx.heap_mut().set_object_kind(
    iterator,
    ObjectKind::StringIterator {
      target: Some(target),
      position: next,
    },
  )?;
  let value = Value::String(cx.heap_mut().alloc_string_units(code_point)?);
  cx.create_iter_result(value, false)
}

/// The native error constructors, called or constructed.
fn error_constructor(
  cx: &mut ExecutionContext<'_, '_>,
  prototype: ObjectIntrinsic,
  args: &[Value],
  new_target: Option<GcObject>,
) -> Result<Value, VmError> {
  let prototype_key = cx.key(StringIntrinsic::Prototype)?;
  let prototype = match new_target {
    Some(target) => match cx.get(target, &prototype_key)? {
      Value::Object(prototype) => prototype,
      _ => cx.intrinsic(prototype)?,
    },
    None => cx.intrinsic(prototype)?,
  };
  let error = cx.heap_mut().alloc_object(Some(prototype), ObjectKind::Error)?;

  let message = arg(args, 0);
  if !matches!(message, Value::Undefined) {
    let message = cx.to_string(message)?;
    let message_key = cx.key(StringIntrinsic::Message)?;
    cx.heap_mut()
      .define_property(error, message_key, PropertyDescriptor::method(Value::String(message)))?;
  }
  if let Value::Object(options) = arg(args, 1) {
    let cause_key = cx.key(StringIntrinsic::Cause)?;
    if cx.has_property(options, &cause_key)? {
      let cause = cx.get(options, &cause_key)?;
      cx.heap_mut()
        .define_property(error, cause_key, PropertyDescriptor::method(cause))?;
    }
  }
  Ok(Value::Object(error))
}

/// `Error.prototype.toString`.
fn error_to_string(cx: &mut ExecutionContext<'_, '_>, this: Value) -> Result<Value, VmError> {
  let Value::Object(obj) = this else {
    return Err(cx.throw_type_error("Error.prototype.toString requires that 'this' be an Object"));
  };
  let name_key = cx.key(StringIntrinsic::Name)?;
  let name = match cx.get(obj, &name_key)? {
    Value::Undefined => "Error".to_string(),
    name => cx.to_rust_string(name)?,
  };
  let message_key = cx.key(StringIntrinsic::Message)?;
  let message = match cx.get(obj, &message_key)? {
    Value::Undefined => String::new(),
    message => cx.to_rust_string(message)?,
  };
  let s = match (name.is_empty(), message.is_empty()) {
    (true, _) => message,
    (false, true) => name,
    (false, false) => format!("{name}: {message}"),
  };
  Ok(Value::String(cx.intern(&s)?))
}
