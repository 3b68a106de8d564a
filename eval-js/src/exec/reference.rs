use crate::env::{BindingRead, BindingWrite};
use crate::property::PropertyKey;
use crate::{ExecutionContext, GcEnv, GcString, Value, VmError};
use oxc_ast::ast;

/// A Reference Record.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reference {
  /// A binding in a declarative environment record.
  Binding(GcEnv, GcString),
  /// A property of a value; primitives are boxed when read.
  Property { base: Value, key: PropertyKey },
  /// A name that no environment defines.
  Unresolvable(GcString),
}

impl<'a> ExecutionContext<'_, 'a> {
  /// ResolveBinding against the running lexical environment.
  pub(crate) fn resolve_binding(&mut self, name: &str) -> Result<Reference, VmError> {
    let name = self.intern(name)?;
    let mut env = Some(self.lexical_environment);
    while let Some(current) = env {
      if self.heap().env_has_declarative_binding(current, name)? {
        return Ok(Reference::Binding(current, name));
      }
      if let Some(global) = self.heap().env_object(current)? {
        let key = PropertyKey::String(name);
        if self.heap().has_property(global, &key)? {
          return Ok(Reference::Property {
            base: Value::Object(global),
            key,
          });
        }
      }
      env = self.heap().env_outer(current)?;
    }
    Ok(Reference::Unresolvable(name))
  }

  pub(crate) fn get_value(&mut self, reference: Reference) -> Result<Value, VmError> {
    match reference {
      Reference::Binding(env, name) => match self.heap().env_get_binding_value(env, name)? {
        BindingRead::Value(value) => Ok(value),
        BindingRead::Uninitialized => Err(self.tdz_error(name)),
        BindingRead::Missing => Err(self.not_defined_error(name)),
      },
      Reference::Property { base, key } => self.get_v(base, &key),
      Reference::Unresolvable(name) => Err(self.not_defined_error(name)),
    }
  }

  /// PutValue with sloppy-mode semantics: failed property writes are silent and unresolvable
  /// names become global object properties.
  pub(crate) fn put_value(&mut self, reference: Reference, value: Value) -> Result<(), VmError> {
    match reference {
      Reference::Binding(env, name) => {
        match self.heap_mut().env_set_mutable_binding(env, name, value)? {
          BindingWrite::Done => Ok(()),
          BindingWrite::Uninitialized => Err(self.tdz_error(name)),
          BindingWrite::Immutable => Err(self.throw_type_error("Assignment to constant variable.")),
          BindingWrite::Missing => Err(self.not_defined_error(name)),
        }
      }
      Reference::Property {
        base: Value::Object(obj),
        key,
      } => {
        self.set(obj, key, value)?;
        Ok(())
      }
      Reference::Property { base, key } => {
        if base.is_nullish() {
          let base = if matches!(base, Value::Null) { "null" } else { "undefined" };
          let name = self.describe_key(&key)?;
          return Err(self.throw_type_error(&format!(
            "Cannot set properties of {base} (setting '{name}')"
          )));
        }
        // Writes to a primitive's temporary wrapper are lost.
        Ok(())
      }
      Reference::Unresolvable(name) => {
        let global = self.realm.global_object()?;
        self.set(global, PropertyKey::String(name), value)?;
        Ok(())
      }
    }
  }

  /// A reference to `object.name`. The base is evaluated; the property is not read.
  pub(crate) fn static_member_reference(
    &mut self,
    member: &'a ast::StaticMemberExpression<'a>,
  ) -> Result<Reference, VmError> {
    let base = self.evaluate_expression(&member.object)?;
    let key = self.string_key(member.property.name.as_str())?;
    Ok(Reference::Property { base, key })
  }

  /// A reference to `object[expression]`.
  pub(crate) fn computed_member_reference(
    &mut self,
    member: &'a ast::ComputedMemberExpression<'a>,
  ) -> Result<Reference, VmError> {
    let base = self.evaluate_expression(&member.object)?;
    let property = self.evaluate_expression(&member.expression)?;
    if base.is_nullish() {
      let base = if matches!(base, Value::Null) { "null" } else { "undefined" };
      return Err(self.throw_type_error(&format!("Cannot read properties of {base}")));
    }
    let key = self.to_property_key(property)?;
    Ok(Reference::Property { base, key })
  }

  fn tdz_error(&mut self, name: GcString) -> VmError {
    match self.heap().get_string(name) {
      Ok(name) => {
        let message = format!("Cannot access '{}' before initialization", name.to_utf8_lossy());
        self.throw_reference_error(&message)
      }
      Err(err) => err,
    }
  }

  fn not_defined_error(&mut self, name: GcString) -> VmError {
    match self.heap().get_string(name) {
      Ok(name) => {
        let message = format!("{} is not defined", name.to_utf8_lossy());
        self.throw_reference_error(&message)
      }
      Err(err) => err,
    }
  }
}
