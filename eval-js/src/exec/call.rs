use super::{BindingTarget, Reference};
use crate::completion::normal_or_return;
use crate::function::{CallHandler, EcmaFunction, FunctionId, ThisMode};
use crate::intrinsics::StringIntrinsic;
use crate::node::{pattern_bound_names, Declaration, FunctionBody, FunctionNode};
use crate::object::ObjectKind;
use crate::property::PropertyDescriptor;
use crate::stack::ensure_sufficient_stack;
use crate::{Completion, ExecutionContext, GcEnv, GcObject, GcString, Value, VmError};
use ahash::AHashSet;
use oxc_ast::ast;

impl<'a> ExecutionContext<'_, 'a> {
  /// Call(F, thisValue, argumentsList).
  pub fn call(&mut self, callee: Value, this: Value, args: &[Value]) -> Result<Value, VmError> {
    let Some((func, handler)) = self.callable(callee)? else {
      let what = self.type_of(callee)?;
      return Err(self.throw_type_error(&format!("{what} is not a function")));
    };
    self.vm_mut().push_frame()?;
    let result = ensure_sufficient_stack(|| match handler {
      CallHandler::Native(native) => native.call(self, this, args, None),
      CallHandler::Ecma(ecma) => self.call_ecma(func, ecma, this, args),
    });
    self.vm_mut().pop_frame();
    result
  }

  /// Construct(F, argumentsList) with `newTarget` equal to `F`.
  pub fn construct(&mut self, callee: Value, args: &[Value]) -> Result<Value, VmError> {
    let handler = match self.callable(callee)? {
      Some((func, handler)) if handler.is_constructor() => Some((func, handler)),
      _ => None,
    };
    let Some((func, handler)) = handler else {
      let what = self.type_of(callee)?;
      return Err(self.throw_type_error(&format!("{what} is not a constructor")));
    };
    self.vm_mut().push_frame()?;
    let result = ensure_sufficient_stack(|| match handler {
      CallHandler::Native(native) => native.call(self, Value::Undefined, args, Some(func)),
      CallHandler::Ecma(ecma) => self.construct_ecma(func, ecma, args),
    });
    self.vm_mut().pop_frame();
    result
  }

  /// IsConstructor.
  pub(crate) fn is_constructor(&self, value: Value) -> Result<bool, VmError> {
    Ok(self.callable(value)?.is_some_and(|(_, handler)| handler.is_constructor()))
  }

  fn callable(&self, value: Value) -> Result<Option<(GcObject, CallHandler)>, VmError> {
    let Value::Object(func) = value else {
      return Ok(None);
    };
    Ok(match self.heap().object_kind(func)? {
      ObjectKind::Function(handler) => Some((func, handler)),
      _ => None,
    })
  }

  fn construct_ecma(&mut self, func: GcObject, ecma: EcmaFunction, args: &[Value]) -> Result<Value, VmError> {
    let prototype_key = self.key(StringIntrinsic::Prototype)?;
    let prototype = match self.get(func, &prototype_key)? {
      Value::Object(prototype) => prototype,
      _ => self.intrinsics().object_prototype()?,
    };
    let this = self.heap_mut().alloc_object(Some(prototype), ObjectKind::Ordinary)?;
    match self.call_ecma(func, ecma, Value::Object(this), args)? {
      result @ Value::Object(_) => Ok(result),
      _ => Ok(Value::Object(this)),
    }
  }

  /// `[[Call]]` of an ECMAScript function object: OrdinaryCallBindThis, then
  /// FunctionDeclarationInstantiation and the body in a fresh execution context.
  fn call_ecma(
    &mut self,
    func: GcObject,
    ecma: EcmaFunction,
    this: Value,
    args: &[Value],
  ) -> Result<Value, VmError> {
    let script = self.script;
    if ecma.script != script.id() {
      return Err(VmError::Unimplemented("calling a closure created by another script"));
    }
    let node = script.function(ecma.function);
    let this_value = match ecma.this_mode {
      ThisMode::Lexical(this) => this,
      ThisMode::Dynamic if this.is_nullish() => Value::Object(self.realm.global_object()?),
      ThisMode::Dynamic => this,
    };
    let env = self.heap_mut().alloc_declarative_env(Some(ecma.environment))?;
    let mut cx = self.for_call(env, this_value, func);
    match cx.evaluate_function_body(node, args)? {
      Completion::Return(value) => Ok(value),
      Completion::Throw(thrown) => Err(VmError::Throw(thrown)),
      _ => Ok(Value::Undefined),
    }
  }

  fn evaluate_function_body(
    &mut self,
    node: &FunctionNode<'a>,
    args: &[Value],
  ) -> Result<Completion, VmError> {
    if let Err(err) = self.function_declaration_instantiation(node, args) {
      return match err {
        VmError::Throw(thrown) => Ok(Completion::Throw(thrown)),
        err => Err(err),
      };
    }
    match &node.body {
      FunctionBody::Statements(statements) => {
        normal_or_return!(self.evaluate_statements(statements)?);
        Ok(Completion::Normal(Value::Undefined))
      }
      FunctionBody::Expression(expr) => match self.evaluate_expression(*expr) {
        Ok(value) => Ok(Completion::Return(value)),
        Err(VmError::Throw(thrown)) => Ok(Completion::Throw(thrown)),
        Err(err) => Err(err),
      },
    }
  }

  /// FunctionDeclarationInstantiation (sloppy mode).
  fn function_declaration_instantiation(
    &mut self,
    node: &FunctionNode<'a>,
    args: &[Value],
  ) -> Result<(), VmError> {
    let script = self.script;
    let semantics = script.semantics(node.id);
    let env = self.lexical_environment;

    let has_parameter_expressions = node
      .params
      .items
      .iter()
      .any(|param| !matches!(param.pattern.kind, ast::BindingPatternKind::BindingIdentifier(_)))
      || node
        .params
        .rest
        .as_ref()
        .is_some_and(|rest| !matches!(rest.argument.kind, ast::BindingPatternKind::BindingIdentifier(_)));

    let mut function_names = AHashSet::new();
    let mut functions = Vec::new();
    for decl in semantics.var_scoped_declarations.iter().rev() {
      if let Declaration::Function { function, name } = *decl {
        if function_names.insert(name) {
          functions.push((function, name));
        }
      }
    }
    functions.reverse();

    let arguments_shadowed = !has_parameter_expressions
      && (function_names.contains("arguments") || semantics.lexically_declared_names.contains(&"arguments"));
    let arguments_object_needed =
      !node.is_arrow && !node.parameter_names.contains(&"arguments") && !arguments_shadowed;

    for &name in &node.parameter_names {
      let name = self.intern(name)?;
      self.heap_mut().env_create_binding(env, name, true)?;
      if !has_parameter_expressions {
        self.heap_mut().env_initialize_binding(env, name, Value::Undefined)?;
      }
    }
    if arguments_object_needed {
      let arguments = self.create_unmapped_arguments_object(args)?;
      let name = self.intrinsics().string(StringIntrinsic::Arguments)?;
      self.heap_mut().env_initialize_binding(env, name, arguments)?;
    }

    let target = BindingTarget::Initialize(env);
    for (idx, param) in node.params.items.iter().enumerate() {
      let value = args.get(idx).copied().unwrap_or(Value::Undefined);
      self.bind_pattern(&param.pattern, value, target)?;
    }
    if let Some(rest) = &node.params.rest {
      let rest_values = args.get(node.params.items.len()..).unwrap_or_default();
      let rest_array = self.create_array(rest_values)?;
      self.bind_pattern(&rest.argument, Value::Object(rest_array), target)?;
    }

    // Parameter expressions get their own environment so closures in them cannot see body vars.
    let var_env = if has_parameter_expressions {
      self.new_declarative_environment()?
    } else {
      env
    };
    let mut instantiated = AHashSet::new();
    for &name in &semantics.var_declared_names {
      if function_names.contains(name) || !instantiated.insert(name) {
        continue;
      }
      if var_env == env
        && (node.parameter_names.contains(&name) || (arguments_object_needed && name == "arguments"))
      {
        continue;
      }
      let binding = self.intern(name)?;
      let initial = if node.parameter_names.contains(&name) {
        self.get_binding_value(env, binding)?
      } else {
        Value::Undefined
      };
      self.heap_mut().env_create_binding(var_env, binding, true)?;
      self.heap_mut().env_initialize_binding(var_env, binding, initial)?;
    }
    for &(_, name) in &functions {
      let binding = self.intern(name)?;
      self.heap_mut().env_create_binding(var_env, binding, true)?;
    }

    let lex_env = self.heap_mut().alloc_declarative_env(Some(var_env))?;
    for decl in &semantics.lexically_scoped_declarations {
      let Declaration::Variable { kind, declarator } = *decl else {
        continue;
      };
      let mut names = Vec::new();
      pattern_bound_names(&declarator.id, &mut names);
      for name in names {
        let name = self.intern(name)?;
        self.heap_mut().env_create_binding(lex_env, name, !kind.is_const())?;
      }
    }

    self.variable_environment = var_env;
    self.lexical_environment = lex_env;
    for (function, name) in functions {
      let closure = self.instantiate_function(function, lex_env, Some(name))?;
      let binding = self.intern(name)?;
      self.heap_mut().env_initialize_binding(var_env, binding, Value::Object(closure))?;
    }
    Ok(())
  }

  fn get_binding_value(&mut self, env: GcEnv, name: GcString) -> Result<Value, VmError> {
    self.get_value(Reference::Binding(env, name))
  }

  /// OrdinaryFunctionCreate plus MakeConstructor and SetFunctionName. `name` overrides the
  /// function's own binding identifier.
  pub(crate) fn instantiate_function(
    &mut self,
    function: FunctionId,
    env: GcEnv,
    name: Option<&str>,
  ) -> Result<GcObject, VmError> {
    let script = self.script;
    let node = script.function(function);
    let this_mode = if node.is_arrow {
      ThisMode::Lexical(self.this_value)
    } else {
      ThisMode::Dynamic
    };
    let handler = CallHandler::Ecma(EcmaFunction {
      script: script.id(),
      function,
      environment: env,
      this_mode,
    });
    let function_prototype = self.intrinsics().function_prototype()?;
    let func = self
      .heap_mut()
      .alloc_object(Some(function_prototype), ObjectKind::Function(handler))?;

    let length_key = self.key(StringIntrinsic::Length)?;
    let name_key = self.key(StringIntrinsic::Name)?;
    let name = Value::String(self.intern(name.or(node.name).unwrap_or_default())?);
    self.heap_mut().define_property(
      func,
      length_key,
      PropertyDescriptor::data(Value::Number(f64::from(node.length)), false, false, true),
    )?;
    self
      .heap_mut()
      .define_property(func, name_key, PropertyDescriptor::data(name, false, false, true))?;

    if !node.is_arrow {
      let prototype = self.ordinary_object()?;
      let constructor_key = self.key(StringIntrinsic::Constructor)?;
      let prototype_key = self.key(StringIntrinsic::Prototype)?;
      self
        .heap_mut()
        .define_property(prototype, constructor_key, PropertyDescriptor::method(Value::Object(func)))?;
      self.heap_mut().define_property(
        func,
        prototype_key,
        PropertyDescriptor::data(Value::Object(prototype), true, false, false),
      )?;
    }
    Ok(func)
  }
}
