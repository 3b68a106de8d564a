use super::BindingTarget;
use crate::completion::{normal_or_return, value_or_throw};
use crate::env::BindingRead;
use crate::node::{
  pattern_bound_names, BlockNode, CatchNode, DeclarationKind, DoWhileNode, ForBinding, ForInOfNode,
  ForInit, ForNode, IfNode, LabeledNode, Stmt, SwitchNode, TryNode, VariableDeclarationNode,
  WhileNode,
};
use crate::object::ObjectKind;
use crate::property::PropertyKey;
use crate::stack::ensure_sufficient_stack;
use crate::{Completion, ExecutionContext, GcObject, GcString, IteratorRecord, LabelSet, Value, VmError};

impl<'a> Stmt<'a> {
  /// Evaluates the statement with an empty label set.
  pub fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    cx.tick()?;
    ensure_sufficient_stack(|| self.run(cx, &LabelSet::EMPTY))
  }

  /// LabelledEvaluation: `labels` are the labels directly enclosing this statement.
  pub fn evaluate_labelled(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    labels: &LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    cx.tick()?;
    ensure_sufficient_stack(|| self.run(cx, labels))
  }

  fn run(&self, cx: &mut ExecutionContext<'_, 'a>, labels: &LabelSet<'_>) -> Result<Completion, VmError> {
    match self {
      Stmt::Block(block) => block.evaluate(cx),
      Stmt::Empty(_) | Stmt::Debugger(_) | Stmt::FunctionDeclaration(_) => Ok(Completion::empty()),
      Stmt::Expression(node) => Ok(Completion::Normal(value_or_throw!(
        cx.evaluate_expression(node.expression)
      ))),
      Stmt::VariableDeclaration(node) => node.evaluate(cx),
      Stmt::If(node) => node.evaluate(cx),
      Stmt::Labeled(node) => node.evaluate(cx, labels),
      Stmt::DoWhile(node) => absorb_break(node.evaluate(cx, labels)?),
      Stmt::While(node) => absorb_break(node.evaluate(cx, labels)?),
      Stmt::For(node) => absorb_break(node.evaluate(cx, labels)?),
      Stmt::ForIn(node) => absorb_break(node.evaluate(cx, labels, IterationKind::Enumerate)?),
      Stmt::ForOf(node) => absorb_break(node.evaluate(cx, labels, IterationKind::Iterate)?),
      Stmt::Switch(node) => absorb_break(node.evaluate(cx)?),
      Stmt::Continue(node) => Ok(Completion::Continue(
        node.label.map(str::to_string),
        Value::Empty,
      )),
      Stmt::Break(node) => Ok(Completion::Break(node.label.map(str::to_string), Value::Empty)),
      Stmt::Return(node) => {
        let value = match node.argument {
          Some(argument) => value_or_throw!(cx.evaluate_expression(argument)),
          None => Value::Undefined,
        };
        Ok(Completion::Return(value))
      }
      Stmt::Throw(node) => Ok(Completion::Throw(value_or_throw!(
        cx.evaluate_expression(node.argument)
      ))),
      Stmt::Try(node) => node.evaluate(cx),
    }
  }
}

/// An unlabelled break targets the nearest breakable statement.
fn absorb_break(completion: Completion) -> Result<Completion, VmError> {
  Ok(match completion {
    Completion::Break(None, value) => Completion::Normal(value),
    other => other,
  })
}

impl<'a> LabeledNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>, labels: &LabelSet<'_>) -> Result<Completion, VmError> {
    let labels = labels.with(self.label);
    Ok(match self.body.evaluate_labelled(cx, &labels)? {
      Completion::Break(Some(target), value) if target == self.label => Completion::Normal(value),
      other => other,
    })
  }
}

impl<'a> BlockNode<'a> {
  pub(crate) fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    let script = cx.script;
    let declarations = &script.semantics(self.id).lexically_scoped_declarations;
    if declarations.is_empty() {
      return cx.evaluate_statements(&self.statements);
    }
    let env = cx.new_declarative_environment()?;
    cx.with_lexical_environment(env, |cx| {
      value_or_throw!(cx.block_declaration_instantiation(declarations, env));
      cx.evaluate_statements(&self.statements)
    })
  }
}

impl<'a> VariableDeclarationNode<'a> {
  pub(crate) fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    for declarator in self.source.declarations.iter() {
      value_or_throw!(cx.evaluate_declarator(self.kind, declarator));
    }
    Ok(Completion::empty())
  }

  fn bound_names(&self) -> Vec<&'a str> {
    let mut names = Vec::new();
    for declarator in self.source.declarations.iter() {
      pattern_bound_names(&declarator.id, &mut names);
    }
    names
  }
}

impl<'a> IfNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    let test = value_or_throw!(cx.evaluate_expression(self.test));
    if cx.to_boolean(test)? {
      self.consequent.evaluate(cx)
    } else {
      match &self.alternate {
        Some(alternate) => alternate.evaluate(cx),
        None => Ok(Completion::empty()),
      }
    }
  }
}

/// Folds a body completion into the loop's running value `V`. Returns the loop's final completion
/// once the body completion stops the loop.
fn loop_step(result: Completion, labels: &LabelSet<'_>, v: &mut Value) -> Option<Completion> {
  if !result.loop_continues(labels) {
    return Some(result.update_empty(*v));
  }
  let value = result.value();
  if !value.is_empty() {
    *v = value;
  }
  None
}

impl<'a> DoWhileNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>, labels: &LabelSet<'_>) -> Result<Completion, VmError> {
    let mut v = Value::Empty;
    loop {
      cx.tick()?;
      let result = self.body.evaluate(cx)?;
      if let Some(done) = loop_step(result, labels, &mut v) {
        return Ok(done);
      }
      let test = value_or_throw!(cx.evaluate_expression(self.test));
      if !cx.to_boolean(test)? {
        return Ok(Completion::Normal(v));
      }
    }
  }
}

impl<'a> WhileNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>, labels: &LabelSet<'_>) -> Result<Completion, VmError> {
    let mut v = Value::Empty;
    loop {
      cx.tick()?;
      let test = value_or_throw!(cx.evaluate_expression(self.test));
      if !cx.to_boolean(test)? {
        return Ok(Completion::Normal(v));
      }
      let result = self.body.evaluate(cx)?;
      if let Some(done) = loop_step(result, labels, &mut v) {
        return Ok(done);
      }
    }
  }
}

impl<'a> ForNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>, labels: &LabelSet<'_>) -> Result<Completion, VmError> {
    match &self.init {
      ForInit::None => self.body_evaluation(cx, labels, &[]),
      ForInit::Expression(init) => {
        value_or_throw!(cx.evaluate_expression(init));
        self.body_evaluation(cx, labels, &[])
      }
      ForInit::Declaration(decl) if decl.kind == DeclarationKind::Var => {
        normal_or_return!(decl.evaluate(cx)?);
        self.body_evaluation(cx, labels, &[])
      }
      ForInit::Declaration(decl) => {
        let loop_env = cx.new_declarative_environment()?;
        let mut names = Vec::new();
        for name in decl.bound_names() {
          let name = cx.intern(name)?;
          cx.heap_mut().env_create_binding(loop_env, name, !decl.kind.is_const())?;
          names.push(name);
        }
        // Const bindings cannot change between iterations, so they are never copied.
        if decl.kind.is_const() {
          names.clear();
        }
        cx.with_lexical_environment(loop_env, |cx| {
          normal_or_return!(decl.evaluate(cx)?);
          self.body_evaluation(cx, labels, &names)
        })
      }
    }
  }

  /// ForBodyEvaluation.
  fn body_evaluation(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    labels: &LabelSet<'_>,
    per_iteration: &[GcString],
  ) -> Result<Completion, VmError> {
    let mut v = Value::Empty;
    value_or_throw!(cx.create_per_iteration_environment(per_iteration));
    loop {
      cx.tick()?;
      if let Some(test) = self.test {
        let test = value_or_throw!(cx.evaluate_expression(test));
        if !cx.to_boolean(test)? {
          return Ok(Completion::Normal(v));
        }
      }
      let result = self.body.evaluate(cx)?;
      if let Some(done) = loop_step(result, labels, &mut v) {
        return Ok(done);
      }
      value_or_throw!(cx.create_per_iteration_environment(per_iteration));
      if let Some(update) = self.update {
        value_or_throw!(cx.evaluate_expression(update));
      }
    }
  }
}

/// Whether a `for-in/of` head enumerates keys or drives an iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterationKind {
  Enumerate,
  Iterate,
}

impl<'a> ForInOfNode<'a> {
  fn evaluate(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    labels: &LabelSet<'_>,
    iteration: IterationKind,
  ) -> Result<Completion, VmError> {
    let mut lexical_names = Vec::new();
    let mut mutable = true;
    if let ForBinding::Declaration { kind, pattern } = self.left {
      if kind.is_lexical() {
        let mut names = Vec::new();
        pattern_bound_names(pattern, &mut names);
        lexical_names = names
          .into_iter()
          .map(|name| cx.intern(name))
          .collect::<Result<_, _>>()?;
        mutable = !kind.is_const();
      }
    }

    // ForIn/OfHeadEvaluation: the head's own bindings are in their TDZ while `right` runs.
    let subject = if lexical_names.is_empty() {
      value_or_throw!(cx.evaluate_expression(self.right))
    } else {
      let tdz = cx.new_declarative_environment()?;
      for &name in &lexical_names {
        cx.heap_mut().env_create_binding(tdz, name, true)?;
      }
      value_or_throw!(cx.with_lexical_environment(tdz, |cx| cx.evaluate_expression(self.right)))
    };

    let bindings = IterationBindings {
      names: &lexical_names,
      mutable,
    };
    match iteration {
      IterationKind::Enumerate => {
        if subject.is_nullish() {
          return Ok(Completion::Break(None, Value::Empty));
        }
        let obj = value_or_throw!(cx.to_object(subject));
        let keys = cx.enumerate_object_properties(obj)?;
        self.enumerate(cx, labels, &bindings, keys)
      }
      IterationKind::Iterate => {
        let mut record = value_or_throw!(cx.get_iterator(subject));
        self.iterate(cx, labels, &bindings, &mut record)
      }
    }
  }

  fn enumerate(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    labels: &LabelSet<'_>,
    bindings: &IterationBindings<'_>,
    keys: Vec<(GcObject, PropertyKey)>,
  ) -> Result<Completion, VmError> {
    let mut v = Value::Empty;
    for (owner, key) in keys {
      cx.tick()?;
      // Properties deleted before being visited are not visited.
      let present = match cx.heap().object_kind(owner)? {
        ObjectKind::String(_) => true,
        _ => cx.heap().get_own_property(owner, &key)?.is_some(),
      };
      if !present {
        continue;
      }
      let result = self.iteration(cx, bindings, key.to_value())?;
      if let Some(done) = loop_step(result, labels, &mut v) {
        return Ok(done);
      }
    }
    Ok(Completion::Normal(v))
  }

  fn iterate(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    labels: &LabelSet<'_>,
    bindings: &IterationBindings<'_>,
    record: &mut IteratorRecord,
  ) -> Result<Completion, VmError> {
    let mut v = Value::Empty;
    loop {
      cx.tick()?;
      let Some(value) = value_or_throw!(cx.iterator_step_value(record)) else {
        return Ok(Completion::Normal(v));
      };
      let result = self.iteration(cx, bindings, value)?;
      if let Some(done) = loop_step(result, labels, &mut v) {
        return cx.iterator_close_completion(record, done);
      }
    }
  }

  /// Binds the next value to the loop head and evaluates the body once.
  fn iteration(
    &self,
    cx: &mut ExecutionContext<'_, 'a>,
    bindings: &IterationBindings<'_>,
    value: Value,
  ) -> Result<Completion, VmError> {
    match self.left {
      ForBinding::Declaration { pattern, .. } if !bindings.names.is_empty() => {
        let env = cx.new_declarative_environment()?;
        for &name in bindings.names {
          cx.heap_mut().env_create_binding(env, name, bindings.mutable)?;
        }
        cx.with_lexical_environment(env, |cx| {
          value_or_throw!(cx.bind_pattern(pattern, value, BindingTarget::Initialize(env)));
          self.body.evaluate(cx)
        })
      }
      ForBinding::Declaration { pattern, .. } => {
        value_or_throw!(cx.bind_pattern(pattern, value, BindingTarget::Assign));
        self.body.evaluate(cx)
      }
      ForBinding::Identifier(ident) => {
        let reference = value_or_throw!(cx.resolve_binding(ident.name.as_str()));
        value_or_throw!(cx.put_value(reference, value));
        self.body.evaluate(cx)
      }
      ForBinding::StaticMember(member) => {
        let reference = value_or_throw!(cx.static_member_reference(member));
        value_or_throw!(cx.put_value(reference, value));
        self.body.evaluate(cx)
      }
      ForBinding::ComputedMember(member) => {
        let reference = value_or_throw!(cx.computed_member_reference(member));
        value_or_throw!(cx.put_value(reference, value));
        self.body.evaluate(cx)
      }
    }
  }
}

/// The lexical names a `for (let/const ... in/of ...)` head binds afresh each iteration.
struct IterationBindings<'n> {
  names: &'n [GcString],
  mutable: bool,
}

impl<'a> SwitchNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    let input = value_or_throw!(cx.evaluate_expression(self.discriminant));
    let script = cx.script;
    let declarations = &script.semantics(self.id).lexically_scoped_declarations;
    if declarations.is_empty() {
      return self.case_block(cx, input);
    }
    let env = cx.new_declarative_environment()?;
    cx.with_lexical_environment(env, |cx| {
      value_or_throw!(cx.block_declaration_instantiation(declarations, env));
      self.case_block(cx, input)
    })
  }

  /// CaseBlockEvaluation.
  fn case_block(&self, cx: &mut ExecutionContext<'_, 'a>, input: Value) -> Result<Completion, VmError> {
    let mut start = None;
    for (idx, case) in self.cases.iter().enumerate() {
      let Some(test) = case.test else {
        continue;
      };
      let selector = value_or_throw!(cx.evaluate_expression(test));
      if input.strictly_equals(selector) {
        start = Some(idx);
        break;
      }
    }
    let Some(start) = start.or_else(|| self.cases.iter().position(|case| case.test.is_none())) else {
      return Ok(Completion::empty());
    };

    let mut v = Value::Empty;
    for case in &self.cases[start..] {
      let result = cx.evaluate_statements(&case.consequent)?;
      let value = result.value();
      if !value.is_empty() {
        v = value;
      }
      if result.is_abrupt() {
        return Ok(result.update_empty(v));
      }
    }
    Ok(Completion::Normal(v))
  }
}

impl<'a> TryNode<'a> {
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>) -> Result<Completion, VmError> {
    let result = match (self.block.evaluate(cx)?, &self.handler) {
      (Completion::Throw(thrown), Some(handler)) => handler.evaluate(cx, thrown)?,
      (result, _) => result,
    };
    let Some(finalizer) = &self.finalizer else {
      return Ok(result);
    };
    let finally = finalizer.evaluate(cx)?;
    if finally.is_abrupt() {
      return Ok(finally);
    }
    Ok(result)
  }
}

impl<'a> CatchNode<'a> {
  /// CatchClauseEvaluation.
  fn evaluate(&self, cx: &mut ExecutionContext<'_, 'a>, thrown: Value) -> Result<Completion, VmError> {
    let Some(param) = self.param else {
      return self.body.evaluate(cx);
    };
    let env = cx.new_declarative_environment()?;
    let mut names = Vec::new();
    pattern_bound_names(param, &mut names);
    for name in names {
      let name = cx.intern(name)?;
      cx.heap_mut().env_create_binding(env, name, true)?;
    }
    cx.with_lexical_environment(env, |cx| {
      value_or_throw!(cx.bind_pattern(param, thrown, BindingTarget::Initialize(env)));
      self.body.evaluate(cx)
    })
  }
}

impl ExecutionContext<'_, '_> {
  /// CreatePerIterationEnvironment: copies the current values of `names` into a fresh environment
  /// sharing the previous iteration environment's outer environment.
  pub(crate) fn create_per_iteration_environment(&mut self, names: &[GcString]) -> Result<(), VmError> {
    if names.is_empty() {
      return Ok(());
    }
    let last = self.lexical_environment;
    let outer = self.heap().env_outer(last)?;
    let this_iteration = self.heap_mut().alloc_declarative_env(outer)?;
    for &name in names {
      let value = match self.heap().env_get_binding_value(last, name)? {
        BindingRead::Value(value) => value,
        BindingRead::Uninitialized | BindingRead::Missing => {
          let name = self.heap().get_string(name)?.to_utf8_lossy();
          return Err(self.throw_reference_error(&format!(
            "Cannot access '{name}' before initialization"
          )));
        }
      };
      self.heap_mut().env_create_binding(this_iteration, name, true)?;
      self.heap_mut().env_initialize_binding(this_iteration, name, value)?;
    }
    self.lexical_environment = this_iteration;
    Ok(())
  }
}
