use crate::intrinsics::{ObjectIntrinsic, StringIntrinsic};
use crate::object::ObjectKind;
use crate::property::PropertyDescriptor;
use crate::{ExecutionContext, GcObject, Value, VmError};

impl ExecutionContext<'_, '_> {
  /// Allocates a native error instance whose `[[Prototype]]` is the given error prototype.
  ///
  /// `message` becomes an own non-enumerable data property; `name` is inherited.
  pub fn new_error(&mut self, prototype: ObjectIntrinsic, message: &str) -> Result<GcObject, VmError> {
    let prototype = self.intrinsic(prototype)?;
    let err = self.heap_mut().alloc_object(Some(prototype), ObjectKind::Error)?;
    let message_key = self.key(StringIntrinsic::Message)?;
    let message = Value::String(self.intern(message)?);
    self
      .heap_mut()
      .define_property(err, message_key, PropertyDescriptor::method(message))?;
    Ok(err)
  }

  /// An error to propagate with `?`: the thrown error object, or whatever failed creating it.
  pub fn throw_error(&mut self, prototype: ObjectIntrinsic, message: &str) -> VmError {
    match self.new_error(prototype, message) {
      Ok(err) => VmError::Throw(Value::Object(err)),
      Err(err) => err,
    }
  }

  pub fn throw_type_error(&mut self, message: &str) -> VmError {
    self.throw_error(ObjectIntrinsic::TypeErrorPrototype, message)
  }

  pub fn throw_reference_error(&mut self, message: &str) -> VmError {
    self.throw_error(ObjectIntrinsic::ReferenceErrorPrototype, message)
  }

  pub fn throw_range_error(&mut self, message: &str) -> VmError {
    self.throw_error(ObjectIntrinsic::RangeErrorPrototype, message)
  }

  pub fn throw_syntax_error(&mut self, message: &str) -> VmError {
    self.throw_error(ObjectIntrinsic::SyntaxErrorPrototype, message)
  }
}
