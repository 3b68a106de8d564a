//! Runtime semantics: statements, expressions, references, bindings and calls.

mod binding;
mod call;
mod expr;
mod reference;
mod stmt;

pub(crate) use binding::BindingTarget;
pub(crate) use reference::Reference;

use crate::completion::value_or_throw;
use crate::node::{pattern_bound_names, Declaration, DeclarationKind, Stmt};
use crate::property::{PropertyDescriptor, PropertyKey, PropertyKind};
use crate::{Completion, ExecutionContext, GcEnv, GcObject, Realm, Script, Value, VmError};
use ahash::AHashSet;

impl<'a> Script<'a> {
  /// Evaluates the script's statement list in the realm's global environment.
  ///
  /// Uncaught exceptions are returned as [`Completion::Throw`]; engine failures (exhausted fuel,
  /// stack overflow, a disposed realm) as errors.
  pub fn evaluate(&self, realm: &mut Realm) -> Result<Completion, VmError> {
    let _span = tracing::debug_span!("eval_js.script.evaluate", script = self.id().0).entered();
    realm.vm.reset_budget();
    let mut cx = ExecutionContext::for_script(realm, self)?;
    let completion = evaluate_script_body(&mut cx, self)?;
    tracing::debug!(
      abrupt = completion.is_abrupt(),
      ticks = cx.realm.vm.ticks(),
      "script evaluated"
    );
    Ok(completion)
  }
}

fn evaluate_script_body<'a>(
  cx: &mut ExecutionContext<'_, 'a>,
  script: &Script<'a>,
) -> Result<Completion, VmError> {
  value_or_throw!(cx.global_declaration_instantiation());
  cx.evaluate_statements(script.body())
}

impl<'a> ExecutionContext<'_, 'a> {
  /// Evaluates a StatementList, carrying the last non-empty value forward (UpdateEmpty).
  pub(crate) fn evaluate_statements(&mut self, statements: &[Stmt<'a>]) -> Result<Completion, VmError> {
    let mut last = Value::Empty;
    for stmt in statements {
      let completion = stmt.evaluate(self)?.update_empty(last);
      if completion.is_abrupt() {
        return Ok(completion);
      }
      last = completion.value();
    }
    Ok(Completion::Normal(last))
  }

  /// GlobalDeclarationInstantiation for the running script.
  fn global_declaration_instantiation(&mut self) -> Result<(), VmError> {
    let script = self.script;
    let semantics = script.semantics(script.root());
    let env = self.variable_environment;
    let global = self.realm.global_object()?;

    for &name in &semantics.lexically_declared_names {
      let binding = self.intern(name)?;
      if self.heap().env_has_declarative_binding(env, binding)? {
        return Err(self.redeclaration_error(name));
      }
      let restricted = self
        .heap()
        .get_own_property(global, &PropertyKey::String(binding))?
        .is_some_and(|desc| !desc.configurable);
      if restricted {
        return Err(self.redeclaration_error(name));
      }
    }
    for &name in &semantics.var_declared_names {
      let binding = self.intern(name)?;
      if self.heap().env_has_declarative_binding(env, binding)? {
        return Err(self.redeclaration_error(name));
      }
    }

    // The last declaration of a function name wins.
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

    let mut var_names = AHashSet::new();
    for decl in &semantics.var_scoped_declarations {
      let Declaration::Variable { declarator, .. } = *decl else {
        continue;
      };
      let mut names = Vec::new();
      pattern_bound_names(&declarator.id, &mut names);
      for name in names {
        if !function_names.contains(name) && var_names.insert(name) {
          self.create_global_var_binding(global, name)?;
        }
      }
    }

    self.create_lexical_bindings(&semantics.lexically_scoped_declarations, env)?;

    for (function, name) in functions {
      let closure = self.instantiate_function(function, env, Some(name))?;
      self.create_global_function_binding(global, name, Value::Object(closure))?;
    }
    Ok(())
  }

  fn redeclaration_error(&mut self, name: &str) -> VmError {
    self.throw_syntax_error(&format!("Identifier '{name}' has already been declared"))
  }

  /// CreateGlobalVarBinding: an existing property is left alone.
  fn create_global_var_binding(&mut self, global: GcObject, name: &str) -> Result<(), VmError> {
    let key = self.string_key(name)?;
    if self.heap().get_own_property(global, &key)?.is_some() || !self.heap().object_is_extensible(global)? {
      return Ok(());
    }
    self.heap_mut().define_property(
      global,
      key,
      PropertyDescriptor::data(Value::Undefined, true, true, false),
    )
  }

  /// CreateGlobalFunctionBinding: a non-configurable existing property keeps its attributes and
  /// only takes the new value.
  fn create_global_function_binding(
    &mut self,
    global: GcObject,
    name: &str,
    closure: Value,
  ) -> Result<(), VmError> {
    let key = self.string_key(name)?;
    let desc = match self.heap().get_own_property(global, &key)? {
      Some(existing) if !existing.configurable => PropertyDescriptor {
        kind: PropertyKind::Data {
          value: closure,
          writable: existing.is_writable(),
        },
        ..existing
      },
      _ => PropertyDescriptor::data(closure, true, true, false),
    };
    self.heap_mut().define_property(global, key, desc)
  }

  /// Creates the uninitialized `let`/`const` bindings of `declarations` in `env`.
  fn create_lexical_bindings(&mut self, declarations: &[Declaration<'a>], env: GcEnv) -> Result<(), VmError> {
    for decl in declarations {
      let Declaration::Variable { kind, declarator } = *decl else {
        continue;
      };
      let mut names = Vec::new();
      pattern_bound_names(&declarator.id, &mut names);
      for name in names {
        let name = self.intern(name)?;
        self
          .heap_mut()
          .env_create_binding(env, name, kind != DeclarationKind::Const)?;
      }
    }
    Ok(())
  }

  /// BlockDeclarationInstantiation: lexical bindings start uninitialized, function declarations
  /// are bound to fresh closures over `env`.
  pub(crate) fn block_declaration_instantiation(
    &mut self,
    declarations: &[Declaration<'a>],
    env: GcEnv,
  ) -> Result<(), VmError> {
    self.create_lexical_bindings(declarations, env)?;
    for decl in declarations {
      if let Declaration::Function { function, name } = *decl {
        let closure = self.instantiate_function(function, env, Some(name))?;
        let name = self.intern(name)?;
        self.heap_mut().env_initialize_binding(env, name, Value::Object(closure))?;
      }
    }
    Ok(())
  }
}
