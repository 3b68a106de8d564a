use crate::stack::ensure_sufficient_stack;
use crate::{ExecutionContext, GcEnv, IteratorRecord, Value, VmError};
use oxc_ast::ast;

/// Where BindingInitialization stores values.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BindingTarget {
  /// InitializeBinding in the given environment (`let`, `const`, parameters, catch).
  Initialize(GcEnv),
  /// PutValue through ResolveBinding (`var`, assignment-like heads).
  Assign,
}

impl<'a> ExecutionContext<'_, 'a> {
  /// BindingInitialization of a (possibly destructuring) pattern.
  pub(crate) fn bind_pattern(
    &mut self,
    pattern: &'a ast::BindingPattern<'a>,
    value: Value,
    target: BindingTarget,
  ) -> Result<(), VmError> {
    ensure_sufficient_stack(|| self.bind_pattern_contents(pattern, value, target))
  }

  fn bind_pattern_contents(
    &mut self,
    pattern: &'a ast::BindingPattern<'a>,
    value: Value,
    target: BindingTarget,
  ) -> Result<(), VmError> {
    match &pattern.kind {
      ast::BindingPatternKind::BindingIdentifier(id) => self.bind_name(id.name.as_str(), value, target),
      ast::BindingPatternKind::AssignmentPattern(assign) => {
        let value = match value {
          Value::Undefined => match &assign.left.kind {
            ast::BindingPatternKind::BindingIdentifier(id) => {
              self.evaluate_named(&assign.right, id.name.as_str())?
            }
            _ => self.evaluate_expression(&assign.right)?,
          },
          value => value,
        };
        self.bind_pattern(&assign.left, value, target)
      }
      ast::BindingPatternKind::ObjectPattern(object) => {
        if value.is_nullish() {
          let what = if matches!(value, Value::Null) { "null" } else { "undefined" };
          return Err(self.throw_type_error(&format!("Cannot destructure '{what}' as it is {what}.")));
        }
        let mut excluded = Vec::new();
        for property in object.properties.iter() {
          let key = self.evaluate_property_key(&property.key)?;
          excluded.push(key);
          let property_value = self.get_v(value, &key)?;
          self.bind_pattern(&property.value, property_value, target)?;
        }
        if let Some(rest) = &object.rest {
          let rest_object = self.ordinary_object()?;
          self.copy_data_properties(rest_object, value, &excluded)?;
          self.bind_pattern(&rest.argument, Value::Object(rest_object), target)?;
        }
        Ok(())
      }
      ast::BindingPatternKind::ArrayPattern(array) => {
        let mut record = self.get_iterator(value)?;
        let result = self.bind_array_elements(array, &mut record, target);
        if record.done {
          return result;
        }
        match result {
          Ok(()) => self.iterator_close(&record),
          Err(err @ VmError::Throw(_)) => {
            self.iterator_close_after_throw(&record)?;
            Err(err)
          }
          Err(err) => Err(err),
        }
      }
    }
  }

  fn bind_array_elements(
    &mut self,
    array: &'a ast::ArrayPattern<'a>,
    record: &mut IteratorRecord,
    target: BindingTarget,
  ) -> Result<(), VmError> {
    for element in array.elements.iter() {
      let value = if record.done {
        Value::Undefined
      } else {
        self.iterator_step_value(record)?.unwrap_or(Value::Undefined)
      };
      if let Some(element) = element {
        self.bind_pattern(element, value, target)?;
      }
    }
    if let Some(rest) = &array.rest {
      let mut values = Vec::new();
      while !record.done {
        if let Some(value) = self.iterator_step_value(record)? {
          values.push(value);
        }
      }
      let rest_array = self.create_array(&values)?;
      self.bind_pattern(&rest.argument, Value::Object(rest_array), target)?;
    }
    Ok(())
  }

  fn bind_name(&mut self, name: &str, value: Value, target: BindingTarget) -> Result<(), VmError> {
    match target {
      BindingTarget::Initialize(env) => {
        let name = self.intern(name)?;
        self.heap_mut().env_initialize_binding(env, name, value)
      }
      BindingTarget::Assign => {
        let reference = self.resolve_binding(name)?;
        self.put_value(reference, value)
      }
    }
  }
}
