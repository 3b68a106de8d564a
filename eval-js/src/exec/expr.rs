use super::{BindingTarget, Reference};
use crate::intrinsics::StringIntrinsic;
use crate::node::DeclarationKind;
use crate::ops::{to_int32, to_uint32, PreferredType};
use crate::property::{PropertyDescriptor, PropertyKey, PropertyKind};
use crate::stack::ensure_sufficient_stack;
use crate::{ExecutionContext, Value, VmError};
use oxc_ast::ast;
use oxc_syntax::operator::{
  AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};

/// `(expr)` and `((expr))` wrap the same operand.
fn without_parentheses<'e, 'a>(mut expr: &'e ast::Expression<'a>) -> &'e ast::Expression<'a> {
  while let ast::Expression::ParenthesizedExpression(paren) = expr {
    expr = &paren.expression;
  }
  expr
}

/// The binary operator a compound assignment applies, if it is not a logical assignment.
fn compound_operator(op: AssignmentOperator) -> Option<BinaryOperator> {
  Some(match op {
    AssignmentOperator::Addition => BinaryOperator::Addition,
    AssignmentOperator::Subtraction => BinaryOperator::Subtraction,
    AssignmentOperator::Multiplication => BinaryOperator::Multiplication,
    AssignmentOperator::Division => BinaryOperator::Division,
    AssignmentOperator::Remainder => BinaryOperator::Remainder,
    AssignmentOperator::Exponential => BinaryOperator::Exponential,
    AssignmentOperator::ShiftLeft => BinaryOperator::ShiftLeft,
    AssignmentOperator::ShiftRight => BinaryOperator::ShiftRight,
    AssignmentOperator::ShiftRightZeroFill => BinaryOperator::ShiftRightZeroFill,
    AssignmentOperator::BitwiseOR => BinaryOperator::BitwiseOR,
    AssignmentOperator::BitwiseXOR => BinaryOperator::BitwiseXOR,
    AssignmentOperator::BitwiseAnd => BinaryOperator::BitwiseAnd,
    AssignmentOperator::Assign
    | AssignmentOperator::LogicalAnd
    | AssignmentOperator::LogicalOr
    | AssignmentOperator::LogicalNullish => return None,
  })
}

/// Number::exponentiate; differs from `powf` for a NaN exponent and for `(±1) ** ±Infinity`.
fn exponentiate(base: f64, exponent: f64) -> f64 {
  if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
    return f64::NAN;
  }
  base.powf(exponent)
}

impl<'a> ExecutionContext<'_, 'a> {
  pub fn evaluate_expression(&mut self, expr: &'a ast::Expression<'a>) -> Result<Value, VmError> {
    ensure_sufficient_stack(|| self.expression_value(expr))
  }

  fn expression_value(&mut self, expr: &'a ast::Expression<'a>) -> Result<Value, VmError> {
    use ast::Expression as E;
    match expr {
      E::BooleanLiteral(lit) => Ok(Value::Bool(lit.value)),
      E::NullLiteral(_) => Ok(Value::Null),
      E::NumericLiteral(lit) => Ok(Value::Number(lit.value)),
      E::StringLiteral(lit) => Ok(Value::String(self.intern(lit.value.as_str())?)),
      E::TemplateLiteral(template) => self.evaluate_template(template),
      E::Identifier(ident) => {
        let reference = self.resolve_binding(ident.name.as_str())?;
        self.get_value(reference)
      }
      E::ThisExpression(_) => Ok(self.this_value),
      E::ParenthesizedExpression(paren) => self.evaluate_expression(&paren.expression),
      E::ArrayExpression(array) => self.evaluate_array(array),
      E::ObjectExpression(object) => self.evaluate_object(object),
      E::FunctionExpression(func) => self.evaluate_function_expression(func, None),
      E::ArrowFunctionExpression(arrow) => self.evaluate_arrow(arrow, None),
      E::UnaryExpression(unary) => self.evaluate_unary(unary),
      E::BinaryExpression(binary) => {
        let left = self.evaluate_expression(&binary.left)?;
        let right = self.evaluate_expression(&binary.right)?;
        self.apply_binary(binary.operator, left, right)
      }
      E::LogicalExpression(logical) => {
        let left = self.evaluate_expression(&logical.left)?;
        let short_circuit = match logical.operator {
          LogicalOperator::Or => self.to_boolean(left)?,
          LogicalOperator::And => !self.to_boolean(left)?,
          LogicalOperator::Coalesce => !left.is_nullish(),
        };
        if short_circuit {
          Ok(left)
        } else {
          self.evaluate_expression(&logical.right)
        }
      }
      E::ConditionalExpression(cond) => {
        let test = self.evaluate_expression(&cond.test)?;
        if self.to_boolean(test)? {
          self.evaluate_expression(&cond.consequent)
        } else {
          self.evaluate_expression(&cond.alternate)
        }
      }
      E::SequenceExpression(seq) => {
        let mut value = Value::Undefined;
        for expr in seq.expressions.iter() {
          value = self.evaluate_expression(expr)?;
        }
        Ok(value)
      }
      E::AssignmentExpression(assign) => self.evaluate_assignment(assign),
      E::UpdateExpression(update) => self.evaluate_update(update),
      E::CallExpression(call) => self.evaluate_call(call),
      E::NewExpression(new) => {
        let constructor = self.evaluate_expression(&new.callee)?;
        let args = self.evaluate_arguments(&new.arguments)?;
        if !self.is_constructor(constructor)? {
          let name = describe_callee(&new.callee);
          return Err(self.throw_type_error(&format!("{name} is not a constructor")));
        }
        self.construct(constructor, &args)
      }
      E::StaticMemberExpression(member) => {
        let reference = self.static_member_reference(member)?;
        self.get_value(reference)
      }
      E::ComputedMemberExpression(member) => {
        let reference = self.computed_member_reference(member)?;
        self.get_value(reference)
      }
      _ => Err(VmError::Unimplemented("expression kind")),
    }
  }

  /// NamedEvaluation: anonymous function definitions take `name` as their `name` property.
  pub(crate) fn evaluate_named(&mut self, expr: &'a ast::Expression<'a>, name: &str) -> Result<Value, VmError> {
    match without_parentheses(expr) {
      ast::Expression::FunctionExpression(func) if func.id.is_none() => {
        self.evaluate_function_expression(func, Some(name))
      }
      ast::Expression::ArrowFunctionExpression(arrow) => self.evaluate_arrow(arrow, Some(name)),
      _ => self.evaluate_expression(expr),
    }
  }

  /// Evaluates a declarator of a variable statement or lexical declaration.
  pub(crate) fn evaluate_declarator(
    &mut self,
    kind: DeclarationKind,
    declarator: &'a ast::VariableDeclarator<'a>,
  ) -> Result<(), VmError> {
    let name = match &declarator.id.kind {
      ast::BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
      _ => None,
    };
    if kind == DeclarationKind::Var {
      let Some(init) = &declarator.init else {
        return Ok(());
      };
      if let Some(name) = name {
        let reference = self.resolve_binding(name)?;
        let value = self.evaluate_named(init, name)?;
        return self.put_value(reference, value);
      }
      let value = self.evaluate_expression(init)?;
      return self.bind_pattern(&declarator.id, value, BindingTarget::Assign);
    }

    let value = match (&declarator.init, name) {
      (Some(init), Some(name)) => self.evaluate_named(init, name)?,
      (Some(init), None) => self.evaluate_expression(init)?,
      (None, _) => Value::Undefined,
    };
    let env = self.lexical_environment;
    self.bind_pattern(&declarator.id, value, BindingTarget::Initialize(env))
  }

  fn evaluate_template(&mut self, template: &'a ast::TemplateLiteral<'a>) -> Result<Value, VmError> {
    let mut units = Vec::new();
    for (idx, quasi) in template.quasis.iter().enumerate() {
      let Some(cooked) = &quasi.value.cooked else {
        return Err(self.throw_syntax_error("Invalid escape sequence in template"));
      };
      units.extend(cooked.as_str().encode_utf16());
      if let Some(expr) = template.expressions.get(idx) {
        let value = self.evaluate_expression(expr)?;
        let s = self.to_string(value)?;
        units.extend_from_slice(self.heap().get_string(s)?.as_code_units());
      }
    }
    Ok(Value::String(self.heap_mut().alloc_string_units(units)?))
  }

  fn evaluate_array(&mut self, array: &'a ast::ArrayExpression<'a>) -> Result<Value, VmError> {
    let result = self.create_array(&[])?;
    let mut index = 0u64;
    for element in array.elements.iter() {
      match element {
        ast::ArrayExpressionElement::SpreadElement(spread) => {
          let iterable = self.evaluate_expression(&spread.argument)?;
          for value in self.iterable_to_list(iterable)? {
            let key = self.index_key(index)?;
            self.create_data_property(result, key, value)?;
            index += 1;
          }
        }
        ast::ArrayExpressionElement::Elision(_) => index += 1,
        element => {
          let value = self.evaluate_expression(element.to_expression())?;
          let key = self.index_key(index)?;
          self.create_data_property(result, key, value)?;
          index += 1;
        }
      }
    }
    // Trailing holes still count towards the length.
    self.set_length(result, index)?;
    Ok(Value::Object(result))
  }

  fn evaluate_object(&mut self, object: &'a ast::ObjectExpression<'a>) -> Result<Value, VmError> {
    let result = self.ordinary_object()?;
    for property in object.properties.iter() {
      let prop = match property {
        ast::ObjectPropertyKind::SpreadProperty(spread) => {
          let source = self.evaluate_expression(&spread.argument)?;
          self.copy_data_properties(result, source, &[])?;
          continue;
        }
        ast::ObjectPropertyKind::ObjectProperty(prop) => prop,
      };

      let key = self.evaluate_property_key(&prop.key)?;
      match prop.kind {
        ast::PropertyKind::Init => {
          // `__proto__: value` sets the prototype instead of defining a property.
          let is_proto_setter = !prop.computed
            && !prop.shorthand
            && !prop.method
            && self.describe_key(&key)? == "__proto__";
          if is_proto_setter {
            let value = self.evaluate_expression(&prop.value)?;
            match value {
              Value::Object(proto) => self.heap_mut().object_set_prototype(result, Some(proto))?,
              Value::Null => self.heap_mut().object_set_prototype(result, None)?,
              _ => {}
            }
            continue;
          }
          let name = self.function_name_for_key(&key, None)?;
          let value = self.evaluate_named(&prop.value, &name)?;
          self.create_data_property(result, key, value)?;
        }
        ast::PropertyKind::Get | ast::PropertyKind::Set => {
          let is_getter = matches!(prop.kind, ast::PropertyKind::Get);
          let prefix = if is_getter { "get" } else { "set" };
          let name = self.function_name_for_key(&key, Some(prefix))?;
          let accessor = self.evaluate_named(&prop.value, &name)?;
          let (mut get, mut set) = match self.heap().get_own_property(result, &key)? {
            Some(PropertyDescriptor {
              kind: PropertyKind::Accessor { get, set },
              ..
            }) => (get, set),
            _ => (Value::Undefined, Value::Undefined),
          };
          if is_getter {
            get = accessor;
          } else {
            set = accessor;
          }
          self
            .heap_mut()
            .define_property(result, key, PropertyDescriptor::accessor(get, set, true, true))?;
        }
      }
    }
    Ok(Value::Object(result))
  }

  /// SetFunctionName's name for a property key, with an optional `get`/`set` prefix.
  fn function_name_for_key(&self, key: &PropertyKey, prefix: Option<&str>) -> Result<String, VmError> {
    let name = match key {
      PropertyKey::String(s) => self.heap().get_string(*s)?.to_utf8_lossy(),
      PropertyKey::Symbol(sym) => match self.heap().get_symbol(*sym)?.description() {
        Some(description) => format!("[{}]", self.heap().get_string(description)?.to_utf8_lossy()),
        None => String::new(),
      },
    };
    Ok(match prefix {
      Some(prefix) => format!("{prefix} {name}"),
      None => name,
    })
  }

  /// The key of an object literal property or destructuring property.
  pub(crate) fn evaluate_property_key(&mut self, key: &'a ast::PropertyKey<'a>) -> Result<PropertyKey, VmError> {
    match key {
      ast::PropertyKey::StaticIdentifier(id) => self.string_key(id.name.as_str()),
      ast::PropertyKey::PrivateIdentifier(_) => Err(VmError::Unimplemented("private names")),
      key => match key.as_expression() {
        Some(expr) => {
          let value = self.evaluate_expression(expr)?;
          self.to_property_key(value)
        }
        None => Err(VmError::Unimplemented("property key")),
      },
    }
  }

  fn evaluate_function_expression(
    &mut self,
    func: &'a ast::Function<'a>,
    name: Option<&str>,
  ) -> Result<Value, VmError> {
    let function = self
      .script
      .function_at(func.span)
      .ok_or(VmError::Unimplemented("function missing from the node tree"))?;
    let Some(id) = &func.id else {
      let env = self.lexical_environment;
      return Ok(Value::Object(self.instantiate_function(function, env, name)?));
    };
    // A named function expression sees its own name in an intermediate environment.
    let env = self.new_declarative_environment()?;
    let binding = self.intern(id.name.as_str())?;
    self.heap_mut().env_create_binding(env, binding, false)?;
    let closure = Value::Object(self.instantiate_function(function, env, None)?);
    self.heap_mut().env_initialize_binding(env, binding, closure)?;
    Ok(closure)
  }

  fn evaluate_arrow(
    &mut self,
    arrow: &'a ast::ArrowFunctionExpression<'a>,
    name: Option<&str>,
  ) -> Result<Value, VmError> {
    let function = self
      .script
      .function_at(arrow.span)
      .ok_or(VmError::Unimplemented("function missing from the node tree"))?;
    let env = self.lexical_environment;
    Ok(Value::Object(self.instantiate_function(function, env, name)?))
  }

  fn evaluate_unary(&mut self, unary: &'a ast::UnaryExpression<'a>) -> Result<Value, VmError> {
    match unary.operator {
      UnaryOperator::Typeof => {
        let value = match without_parentheses(&unary.argument) {
          ast::Expression::Identifier(ident) => match self.resolve_binding(ident.name.as_str())? {
            Reference::Unresolvable(_) => Value::Undefined,
            reference => self.get_value(reference)?,
          },
          _ => self.evaluate_expression(&unary.argument)?,
        };
        let type_name = self.type_of(value)?;
        Ok(Value::String(self.intern(type_name)?))
      }
      UnaryOperator::Delete => self.evaluate_delete(&unary.argument),
      UnaryOperator::Void => {
        self.evaluate_expression(&unary.argument)?;
        Ok(Value::Undefined)
      }
      UnaryOperator::UnaryNegation => {
        let value = self.evaluate_expression(&unary.argument)?;
        Ok(Value::Number(-self.to_number(value)?))
      }
      UnaryOperator::UnaryPlus => {
        let value = self.evaluate_expression(&unary.argument)?;
        Ok(Value::Number(self.to_number(value)?))
      }
      UnaryOperator::LogicalNot => {
        let value = self.evaluate_expression(&unary.argument)?;
        Ok(Value::Bool(!self.to_boolean(value)?))
      }
      UnaryOperator::BitwiseNot => {
        let value = self.evaluate_expression(&unary.argument)?;
        Ok(Value::Number(f64::from(!self.to_int32(value)?)))
      }
    }
  }

  fn evaluate_delete(&mut self, argument: &'a ast::Expression<'a>) -> Result<Value, VmError> {
    let reference = match without_parentheses(argument) {
      ast::Expression::StaticMemberExpression(member) => self.static_member_reference(member)?,
      ast::Expression::ComputedMemberExpression(member) => self.computed_member_reference(member)?,
      ast::Expression::Identifier(ident) => self.resolve_binding(ident.name.as_str())?,
      other => {
        self.evaluate_expression(other)?;
        return Ok(Value::Bool(true));
      }
    };
    match reference {
      Reference::Property { base, key } => {
        let obj = self.to_object(base)?;
        Ok(Value::Bool(self.delete_property(obj, &key)?))
      }
      Reference::Binding(..) => Ok(Value::Bool(false)),
      Reference::Unresolvable(_) => Ok(Value::Bool(true)),
    }
  }

  /// ApplyStringOrNumericBinaryOperator and the relational/equality operators.
  pub(crate) fn apply_binary(
    &mut self,
    op: BinaryOperator,
    left: Value,
    right: Value,
  ) -> Result<Value, VmError> {
    use BinaryOperator as B;
    let value = match op {
      B::Addition => {
        let left = self.to_primitive(left, PreferredType::Default)?;
        let right = self.to_primitive(right, PreferredType::Default)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
          let left = self.to_string(left)?;
          let right = self.to_string(right)?;
          return Ok(Value::String(self.heap_mut().concat_strings(left, right)?));
        }
        Value::Number(self.to_number(left)? + self.to_number(right)?)
      }
      B::Subtraction => Value::Number(self.to_number(left)? - self.to_number(right)?),
      B::Multiplication => Value::Number(self.to_number(left)? * self.to_number(right)?),
      B::Division => Value::Number(self.to_number(left)? / self.to_number(right)?),
      B::Remainder => Value::Number(self.to_number(left)? % self.to_number(right)?),
      B::Exponential => {
        let base = self.to_number(left)?;
        Value::Number(exponentiate(base, self.to_number(right)?))
      }
      B::ShiftLeft => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_int32(l).wrapping_shl(to_uint32(r) & 0x1f)))
      }
      B::ShiftRight => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_int32(l) >> (to_uint32(r) & 0x1f)))
      }
      B::ShiftRightZeroFill => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_uint32(l) >> (to_uint32(r) & 0x1f)))
      }
      B::BitwiseAnd => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_int32(l) & to_int32(r)))
      }
      B::BitwiseOR => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_int32(l) | to_int32(r)))
      }
      B::BitwiseXOR => {
        let (l, r) = (self.to_number(left)?, self.to_number(right)?);
        Value::Number(f64::from(to_int32(l) ^ to_int32(r)))
      }
      B::LessThan => Value::Bool(self.less_than(left, right, true)? == Some(true)),
      B::GreaterThan => Value::Bool(self.less_than(right, left, false)? == Some(true)),
      B::LessEqualThan => Value::Bool(self.less_than(right, left, false)? == Some(false)),
      B::GreaterEqualThan => Value::Bool(self.less_than(left, right, true)? == Some(false)),
      B::Equality => Value::Bool(self.loose_equals(left, right)?),
      B::Inequality => Value::Bool(!self.loose_equals(left, right)?),
      B::StrictEquality => Value::Bool(left.strictly_equals(right)),
      B::StrictInequality => Value::Bool(!left.strictly_equals(right)),
      B::Instanceof => Value::Bool(self.instance_of(left, right)?),
      B::In => {
        let Value::Object(obj) = right else {
          return Err(self.throw_type_error(
            "Cannot use 'in' operator to search for a key in a non-object",
          ));
        };
        let key = self.to_property_key(left)?;
        Value::Bool(self.has_property(obj, &key)?)
      }
    };
    Ok(value)
  }

  fn assignment_reference(&mut self, target: &'a ast::AssignmentTarget<'a>) -> Result<Reference, VmError> {
    match target {
      ast::AssignmentTarget::AssignmentTargetIdentifier(ident) => {
        self.resolve_binding(ident.name.as_str())
      }
      ast::AssignmentTarget::StaticMemberExpression(member) => self.static_member_reference(member),
      ast::AssignmentTarget::ComputedMemberExpression(member) => {
        self.computed_member_reference(member)
      }
      _ => Err(VmError::Unimplemented("assignment target")),
    }
  }

  fn evaluate_assignment(&mut self, assign: &'a ast::AssignmentExpression<'a>) -> Result<Value, VmError> {
    let reference = self.assignment_reference(&assign.left)?;
    let target_name = match &assign.left {
      ast::AssignmentTarget::AssignmentTargetIdentifier(ident) => Some(ident.name.as_str()),
      _ => None,
    };
    let evaluate_right = |cx: &mut Self| match target_name {
      Some(name) => cx.evaluate_named(&assign.right, name),
      None => cx.evaluate_expression(&assign.right),
    };

    let value = match assign.operator {
      AssignmentOperator::Assign => evaluate_right(self)?,
      AssignmentOperator::LogicalAnd
      | AssignmentOperator::LogicalOr
      | AssignmentOperator::LogicalNullish => {
        let current = self.get_value(reference)?;
        let short_circuit = match assign.operator {
          AssignmentOperator::LogicalAnd => !self.to_boolean(current)?,
          AssignmentOperator::LogicalOr => self.to_boolean(current)?,
          _ => !current.is_nullish(),
        };
        if short_circuit {
          return Ok(current);
        }
        evaluate_right(self)?
      }
      op => {
        let current = self.get_value(reference)?;
        let right = self.evaluate_expression(&assign.right)?;
        let op = compound_operator(op).ok_or(VmError::Unimplemented("assignment operator"))?;
        self.apply_binary(op, current, right)?
      }
    };
    self.put_value(reference, value)?;
    Ok(value)
  }

  fn evaluate_update(&mut self, update: &'a ast::UpdateExpression<'a>) -> Result<Value, VmError> {
    let reference = match &update.argument {
      ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) => {
        self.resolve_binding(ident.name.as_str())?
      }
      ast::SimpleAssignmentTarget::StaticMemberExpression(member) => {
        self.static_member_reference(member)?
      }
      ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
        self.computed_member_reference(member)?
      }
      _ => return Err(VmError::Unimplemented("update target")),
    };
    let current = self.get_value(reference)?;
    let old = self.to_number(current)?;
    let new = match update.operator {
      UpdateOperator::Increment => old + 1.0,
      UpdateOperator::Decrement => old - 1.0,
    };
    self.put_value(reference, Value::Number(new))?;
    Ok(Value::Number(if update.prefix { new } else { old }))
  }

  fn evaluate_call(&mut self, call: &'a ast::CallExpression<'a>) -> Result<Value, VmError> {
    let (callee, this) = match without_parentheses(&call.callee) {
      ast::Expression::StaticMemberExpression(member) => {
        let reference = self.static_member_reference(member)?;
        self.callee_and_this(reference)?
      }
      ast::Expression::ComputedMemberExpression(member) => {
        let reference = self.computed_member_reference(member)?;
        self.callee_and_this(reference)?
      }
      other => (self.evaluate_expression(other)?, Value::Undefined),
    };
    let args = self.evaluate_arguments(&call.arguments)?;
    if !self.heap().is_callable(callee)? {
      let name = describe_callee(&call.callee);
      return Err(self.throw_type_error(&format!("{name} is not a function")));
    }
    self.call(callee, this, &args)
  }

  fn callee_and_this(&mut self, reference: Reference) -> Result<(Value, Value), VmError> {
    let this = match reference {
      Reference::Property { base, .. } => base,
      _ => Value::Undefined,
    };
    Ok((self.get_value(reference)?, this))
  }

  /// ArgumentListEvaluation, spreading iterables.
  pub(crate) fn evaluate_arguments(
    &mut self,
    args: &'a oxc_allocator::Vec<'a, ast::Argument<'a>>,
  ) -> Result<Vec<Value>, VmError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args.iter() {
      match arg {
        ast::Argument::SpreadElement(spread) => {
          let iterable = self.evaluate_expression(&spread.argument)?;
          values.extend(self.iterable_to_list(iterable)?);
        }
        arg => values.push(self.evaluate_expression(arg.to_expression())?),
      }
    }
    Ok(values)
  }

  /// `arguments`-style array-like object holding the call's arguments.
  pub(crate) fn create_unmapped_arguments_object(&mut self, args: &[Value]) -> Result<Value, VmError> {
    let obj = self.ordinary_object()?;
    for (idx, value) in args.iter().enumerate() {
      let key = self.index_key(idx as u64)?;
      self.create_data_property(obj, key, *value)?;
    }
    let length_key = self.key(StringIntrinsic::Length)?;
    self.heap_mut().define_property(
      obj,
      length_key,
      PropertyDescriptor::method(Value::Number(args.len() as f64)),
    )?;
    Ok(Value::Object(obj))
  }
}

/// How a callee reads in a "... is not a function" message.
fn describe_callee(callee: &ast::Expression<'_>) -> String {
  match without_parentheses(callee) {
    ast::Expression::Identifier(ident) => ident.name.to_string(),
    ast::Expression::StaticMemberExpression(member) => {
      format!("{}.{}", describe_callee(&member.object), member.property.name)
    }
    ast::Expression::ThisExpression(_) => "this".to_string(),
    _ => "expression".to_string(),
  }
}
