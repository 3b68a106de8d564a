use super::semantics::{pattern_bound_names, Declaration, DeclarationKind, StaticSemantics};
use super::*;
use crate::function::FunctionId;
use crate::stack::ensure_sufficient_stack;
use crate::VmError;
use ahash::AHashMap;
use oxc_ast::ast;
use oxc_span::{GetSpan, Span};

pub(super) struct Built<'a> {
  pub nodes: Vec<NodeData<'a>>,
  pub root: NodeId,
  pub body: Vec<Stmt<'a>>,
  pub functions: Vec<FunctionNode<'a>>,
  pub function_index: AHashMap<(u32, u32), FunctionId>,
}

/// Jump targets visible from the statement being built. Reset at function boundaries.
#[derive(Default)]
struct JumpContext<'a> {
  /// Enclosing labels and whether each labels an iteration statement.
  labels: Vec<(&'a str, bool)>,
  breakable: u32,
  iteration: u32,
}

pub(super) struct Builder<'a> {
  max_depth: usize,
  nodes: Vec<NodeData<'a>>,
  open: Vec<NodeId>,
  expression_depth: usize,
  jumps: JumpContext<'a>,
  functions: Vec<FunctionNode<'a>>,
  function_index: AHashMap<(u32, u32), FunctionId>,
}

fn unsupported(kind: &'static str, span: Span) -> VmError {
  VmError::UnsupportedSyntax {
    kind,
    start: span.start,
  }
}

fn declaration_kind(decl: &ast::VariableDeclaration<'_>) -> Result<DeclarationKind, VmError> {
  match decl.kind {
    ast::VariableDeclarationKind::Var => Ok(DeclarationKind::Var),
    ast::VariableDeclarationKind::Let => Ok(DeclarationKind::Let),
    ast::VariableDeclarationKind::Const => Ok(DeclarationKind::Const),
    ast::VariableDeclarationKind::Using | ast::VariableDeclarationKind::AwaitUsing => {
      Err(unsupported("using declaration", decl.span))
    }
  }
}

fn statement_kind_name(stmt: &ast::Statement<'_>) -> &'static str {
  match stmt {
    ast::Statement::ClassDeclaration(_) => "class declaration",
    ast::Statement::WithStatement(_) => "with statement",
    ast::Statement::ImportDeclaration(_)
    | ast::Statement::ExportAllDeclaration(_)
    | ast::Statement::ExportDefaultDeclaration(_)
    | ast::Statement::ExportNamedDeclaration(_) => "module declaration",
    _ => "typescript statement",
  }
}

fn expression_kind_name(expr: &ast::Expression<'_>) -> &'static str {
  match expr {
    ast::Expression::ClassExpression(_) => "class expression",
    ast::Expression::AwaitExpression(_) => "await expression",
    ast::Expression::YieldExpression(_) => "yield expression",
    ast::Expression::TaggedTemplateExpression(_) => "tagged template",
    ast::Expression::RegExpLiteral(_) => "regular expression literal",
    ast::Expression::BigIntLiteral(_) => "bigint literal",
    ast::Expression::ChainExpression(_) => "optional chaining",
    ast::Expression::MetaProperty(_) => "meta property",
    ast::Expression::Super(_) => "super",
    ast::Expression::ImportExpression(_) => "dynamic import",
    ast::Expression::PrivateFieldExpression(_) | ast::Expression::PrivateInExpression(_) => {
      "private field"
    }
    ast::Expression::JSXElement(_) | ast::Expression::JSXFragment(_) => "jsx",
    _ => "typescript expression",
  }
}

/// ExpectedArgumentCount of a parameter list.
fn expected_argument_count(params: &ast::FormalParameters<'_>) -> u32 {
  params
    .items
    .iter()
    .take_while(|param| !matches!(param.pattern.kind, ast::BindingPatternKind::AssignmentPattern(_)))
    .count() as u32
}

impl<'a> Builder<'a> {
  pub fn new(max_depth: usize) -> Self {
    Builder {
      max_depth,
      nodes: Vec::new(),
      open: Vec::new(),
      expression_depth: 0,
      jumps: JumpContext::default(),
      functions: Vec::new(),
      function_index: AHashMap::new(),
    }
  }

  pub fn build(mut self, program: &'a ast::Program<'a>) -> Result<Built<'a>, VmError> {
    let root = self.enter(NodeKind::Script, program.span)?;
    let (body, semantics) = self.statement_list(&program.body, true)?;
    self.exit(root, semantics);
    Ok(Built {
      nodes: self.nodes,
      root,
      body,
      functions: self.functions,
      function_index: self.function_index,
    })
  }

  fn check_depth(&self) -> Result<(), VmError> {
    if self.open.len() + self.expression_depth > self.max_depth {
      return Err(VmError::NestingTooDeep(self.max_depth));
    }
    Ok(())
  }

  fn enter(&mut self, kind: NodeKind, span: Span) -> Result<NodeId, VmError> {
    let parent = self.open.last().copied();
    let index = match parent {
      Some(parent) => {
        let data = &mut self.nodes[parent.0 as usize];
        data.child_count += 1;
        data.child_count - 1
      }
      None => 0,
    };
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(NodeData {
      kind,
      span,
      parent,
      index,
      depth: self.open.len() as u32,
      child_count: 0,
      semantics: StaticSemantics::default(),
    });
    self.open.push(id);
    self.check_depth()?;
    Ok(id)
  }

  fn exit(&mut self, id: NodeId, semantics: StaticSemantics<'a>) {
    let popped = self.open.pop();
    debug_assert_eq!(popped, Some(id));
    self.nodes[id.0 as usize].semantics = semantics;
  }

  fn leaf(&mut self, kind: NodeKind, span: Span) -> Result<LeafNode, VmError> {
    let id = self.enter(kind, span)?;
    self.exit(id, StaticSemantics::default());
    Ok(LeafNode { id })
  }

  fn var_declarations_of(&self, stmt: &Stmt<'a>) -> Vec<Declaration<'a>> {
    self.nodes[stmt.id().0 as usize]
      .semantics
      .var_scoped_declarations
      .clone()
  }

  /// Builds a StatementList and composes its declarations. At the top level of a script or
  /// function body, function declarations are var-scoped; elsewhere they are lexical.
  fn statement_list(
    &mut self,
    stmts: &'a oxc_allocator::Vec<'a, ast::Statement<'a>>,
    top_level: bool,
  ) -> Result<(Vec<Stmt<'a>>, StaticSemantics<'a>), VmError> {
    let mut semantics = StaticSemantics::default();
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts.iter() {
      let child = self.statement(stmt)?;
      match &child {
        Stmt::VariableDeclaration(decl) if decl.kind.is_lexical() => {
          let decls = self.nodes[decl.id.0 as usize]
            .semantics
            .lexically_scoped_declarations
            .clone();
          for decl in decls {
            semantics.add_lexical_declaration(decl);
          }
        }
        Stmt::FunctionDeclaration(decl) => {
          let function = decl.function;
          let name = self.functions[function.0 as usize].name.unwrap_or_default();
          let decl = Declaration::Function { function, name };
          if top_level {
            semantics.add_var_declarations(&[decl]);
          } else {
            semantics.add_lexical_declaration(decl);
          }
        }
        other => {
          let decls = self.var_declarations_of(other);
          semantics.add_var_declarations(&decls);
        }
      }
      out.push(child);
    }
    Ok((out, semantics))
  }

  fn block(
    &mut self,
    block: &'a ast::BlockStatement<'a>,
    kind: NodeKind,
  ) -> Result<BlockNode<'a>, VmError> {
    let id = self.enter(kind, block.span)?;
    let (statements, semantics) = self.statement_list(&block.body, false)?;
    self.exit(id, semantics);
    Ok(BlockNode { id, statements })
  }

  /// Builds a statement in a position where no label applies.
  fn statement(&mut self, stmt: &'a ast::Statement<'a>) -> Result<Stmt<'a>, VmError> {
    self.labelled_statement(stmt, 0)
  }

  /// Builds a statement; `own_labels` is how many of the innermost labels label this statement.
  fn labelled_statement(
    &mut self,
    stmt: &'a ast::Statement<'a>,
    own_labels: usize,
  ) -> Result<Stmt<'a>, VmError> {
    ensure_sufficient_stack(|| self.statement_contents(stmt, own_labels))
  }

  fn statement_contents(
    &mut self,
    stmt: &'a ast::Statement<'a>,
    own_labels: usize,
  ) -> Result<Stmt<'a>, VmError> {
    match stmt {
      ast::Statement::BlockStatement(block) => Ok(Stmt::Block(self.block(block, NodeKind::Block)?)),
      ast::Statement::EmptyStatement(s) => Ok(Stmt::Empty(self.leaf(NodeKind::Empty, s.span)?)),
      ast::Statement::DebuggerStatement(s) => {
        Ok(Stmt::Debugger(self.leaf(NodeKind::Debugger, s.span)?))
      }
      ast::Statement::ExpressionStatement(s) => {
        let id = self.enter(NodeKind::Expression, s.span)?;
        self.expression(&s.expression)?;
        self.exit(id, StaticSemantics::default());
        Ok(Stmt::Expression(ExpressionNode {
          id,
          expression: &s.expression,
        }))
      }
      ast::Statement::VariableDeclaration(decl) => Ok(Stmt::VariableDeclaration(
        self.variable_declaration(decl, NodeKind::VariableDeclaration)?,
      )),
      ast::Statement::FunctionDeclaration(func) => {
        let id = self.enter(NodeKind::FunctionDeclaration, func.span)?;
        let function = self.function(func)?;
        let mut semantics = StaticSemantics::default();
        if let Some(name) = self.functions[function.0 as usize].name {
          semantics.bound_names.push(name);
        }
        self.exit(id, semantics);
        Ok(Stmt::FunctionDeclaration(FunctionDeclarationNode { id, function }))
      }
      ast::Statement::IfStatement(s) => {
        let id = self.enter(NodeKind::If, s.span)?;
        self.expression(&s.test)?;
        let consequent = Box::new(self.statement(&s.consequent)?);
        let alternate = match &s.alternate {
          Some(alternate) => Some(Box::new(self.statement(alternate)?)),
          None => None,
        };
        let mut semantics = StaticSemantics::default();
        semantics.add_var_declarations(&self.var_declarations_of(&consequent));
        if let Some(alternate) = &alternate {
          semantics.add_var_declarations(&self.var_declarations_of(alternate));
        }
        self.exit(id, semantics);
        Ok(Stmt::If(IfNode {
          id,
          test: &s.test,
          consequent,
          alternate,
        }))
      }
      ast::Statement::DoWhileStatement(s) => {
        let id = self.enter(NodeKind::DoWhile, s.span)?;
        let body = Box::new(self.loop_body(&s.body, own_labels)?);
        self.expression(&s.test)?;
        let mut semantics = StaticSemantics::default();
        semantics.add_var_declarations(&self.var_declarations_of(&body));
        self.exit(id, semantics);
        Ok(Stmt::DoWhile(DoWhileNode {
          id,
          body,
          test: &s.test,
        }))
      }
      ast::Statement::WhileStatement(s) => {
        let id = self.enter(NodeKind::While, s.span)?;
        self.expression(&s.test)?;
        let body = Box::new(self.loop_body(&s.body, own_labels)?);
        let mut semantics = StaticSemantics::default();
        semantics.add_var_declarations(&self.var_declarations_of(&body));
        self.exit(id, semantics);
        Ok(Stmt::While(WhileNode {
          id,
          test: &s.test,
          body,
        }))
      }
      ast::Statement::ForStatement(s) => self.for_statement(s, own_labels),
      ast::Statement::ForInStatement(s) => {
        let node = self.for_in_of(NodeKind::ForIn, s.span, &s.left, &s.right, &s.body, own_labels)?;
        Ok(Stmt::ForIn(node))
      }
      ast::Statement::ForOfStatement(s) => {
        if s.r#await {
          return Err(unsupported("for await", s.span));
        }
        let node = self.for_in_of(NodeKind::ForOf, s.span, &s.left, &s.right, &s.body, own_labels)?;
        Ok(Stmt::ForOf(node))
      }
      ast::Statement::ContinueStatement(s) => {
        let label = s.label.as_ref().map(|label| label.name.as_str());
        self.check_continue(label)?;
        let LeafNode { id } = self.leaf(NodeKind::Continue, s.span)?;
        Ok(Stmt::Continue(JumpNode { id, label }))
      }
      ast::Statement::BreakStatement(s) => {
        let label = s.label.as_ref().map(|label| label.name.as_str());
        self.check_break(label)?;
        let LeafNode { id } = self.leaf(NodeKind::Break, s.span)?;
        Ok(Stmt::Break(JumpNode { id, label }))
      }
      ast::Statement::ReturnStatement(s) => {
        let id = self.enter(NodeKind::Return, s.span)?;
        if let Some(argument) = &s.argument {
          self.expression(argument)?;
        }
        self.exit(id, StaticSemantics::default());
        Ok(Stmt::Return(ReturnNode {
          id,
          argument: s.argument.as_ref(),
        }))
      }
      ast::Statement::LabeledStatement(s) => self.labeled_statement(s, own_labels),
      ast::Statement::SwitchStatement(s) => self.switch_statement(s),
      ast::Statement::ThrowStatement(s) => {
        let id = self.enter(NodeKind::Throw, s.span)?;
        self.expression(&s.argument)?;
        self.exit(id, StaticSemantics::default());
        Ok(Stmt::Throw(ThrowNode {
          id,
          argument: &s.argument,
        }))
      }
      ast::Statement::TryStatement(s) => self.try_statement(s),
      other => Err(unsupported(statement_kind_name(other), other.span())),
    }
  }

  fn loop_body(
    &mut self,
    body: &'a ast::Statement<'a>,
    own_labels: usize,
  ) -> Result<Stmt<'a>, VmError> {
    // Labels directly on this statement become continue targets.
    let total = self.jumps.labels.len();
    for entry in &mut self.jumps.labels[total - own_labels..] {
      entry.1 = true;
    }
    self.jumps.breakable += 1;
    self.jumps.iteration += 1;
    let result = self.statement(body);
    self.jumps.breakable -= 1;
    self.jumps.iteration -= 1;
    result
  }

  fn check_break(&self, label: Option<&str>) -> Result<(), VmError> {
    match label {
      None if self.jumps.breakable == 0 => Err(VmError::IllegalBreak),
      None => Ok(()),
      Some(label) if self.jumps.labels.iter().any(|(l, _)| *l == label) => Ok(()),
      Some(label) => Err(VmError::UndefinedLabel(label.to_string())),
    }
  }

  fn check_continue(&self, label: Option<&str>) -> Result<(), VmError> {
    if self.jumps.iteration == 0 {
      return Err(VmError::IllegalContinue);
    }
    let Some(label) = label else {
      return Ok(());
    };
    match self.jumps.labels.iter().rev().find(|(l, _)| *l == label) {
      Some((_, true)) => Ok(()),
      Some((_, false)) => Err(VmError::IllegalContinue),
      None => Err(VmError::UndefinedLabel(label.to_string())),
    }
  }

  fn labeled_statement(
    &mut self,
    s: &'a ast::LabeledStatement<'a>,
    own_labels: usize,
  ) -> Result<Stmt<'a>, VmError> {
    let label = s.label.name.as_str();
    if self.jumps.labels.iter().any(|(l, _)| *l == label) {
      return Err(VmError::DuplicateLabel(label.to_string()));
    }
    if matches!(s.body, ast::Statement::FunctionDeclaration(_)) {
      return Err(unsupported("labelled function declaration", s.body.span()));
    }
    let id = self.enter(NodeKind::Labeled, s.span)?;
    self.jumps.labels.push((label, false));
    let body = self.labelled_statement(&s.body, own_labels + 1);
    self.jumps.labels.pop();
    let body = Box::new(body?);
    let mut semantics = StaticSemantics::default();
    semantics.add_var_declarations(&self.var_declarations_of(&body));
    self.exit(id, semantics);
    Ok(Stmt::Labeled(LabeledNode { id, label, body }))
  }

  fn variable_declaration(
    &mut self,
    decl: &'a ast::VariableDeclaration<'a>,
    kind: NodeKind,
  ) -> Result<VariableDeclarationNode<'a>, VmError> {
    let declaration_kind = declaration_kind(decl)?;
    let id = self.enter(kind, decl.span)?;
    let mut semantics = StaticSemantics::default();
    for declarator in decl.declarations.iter() {
      self.pattern(&declarator.id)?;
      if let Some(init) = &declarator.init {
        self.expression(init)?;
      }
      pattern_bound_names(&declarator.id, &mut semantics.bound_names);
      let entry = Declaration::Variable {
        kind: declaration_kind,
        declarator,
      };
      if declaration_kind.is_lexical() {
        semantics.add_lexical_declaration(entry);
      } else {
        semantics.add_var_declarations(&[entry]);
      }
    }
    self.exit(id, semantics);
    Ok(VariableDeclarationNode {
      id,
      kind: declaration_kind,
      source: decl,
    })
  }

  fn for_statement(
    &mut self,
    s: &'a ast::ForStatement<'a>,
    own_labels: usize,
  ) -> Result<Stmt<'a>, VmError> {
    let id = self.enter(NodeKind::For, s.span)?;
    let mut semantics = StaticSemantics::default();
    let init = match &s.init {
      None => ForInit::None,
      Some(ast::ForStatementInit::VariableDeclaration(decl)) => {
        let node = self.variable_declaration(decl, NodeKind::VariableDeclaration)?;
        let own = &self.nodes[node.id.0 as usize].semantics;
        semantics.bound_names.extend(own.bound_names.iter().copied());
        if node.kind.is_lexical() {
          for decl in own.lexically_scoped_declarations.clone() {
            semantics.add_lexical_declaration(decl);
          }
        } else {
          let decls = own.var_scoped_declarations.clone();
          semantics.add_var_declarations(&decls);
        }
        ForInit::Declaration(node)
      }
      Some(init) => match init.as_expression() {
        Some(expr) => {
          self.expression(expr)?;
          ForInit::Expression(expr)
        }
        None => return Err(unsupported("for initializer", s.span)),
      },
    };
    if let Some(test) = &s.test {
      self.expression(test)?;
    }
    if let Some(update) = &s.update {
      self.expression(update)?;
    }
    let body = Box::new(self.loop_body(&s.body, own_labels)?);
    semantics.add_var_declarations(&self.var_declarations_of(&body));
    self.exit(id, semantics);
    Ok(Stmt::For(ForNode {
      id,
      init,
      test: s.test.as_ref(),
      update: s.update.as_ref(),
      body,
    }))
  }

  fn for_in_of(
    &mut self,
    kind: NodeKind,
    span: Span,
    left: &'a ast::ForStatementLeft<'a>,
    right: &'a ast::Expression<'a>,
    body: &'a ast::Statement<'a>,
    own_labels: usize,
  ) -> Result<ForInOfNode<'a>, VmError> {
    let id = self.enter(kind, span)?;
    let mut semantics = StaticSemantics::default();
    let left = match left {
      ast::ForStatementLeft::VariableDeclaration(decl) => {
        let declaration_kind = declaration_kind(decl)?;
        let [declarator] = decl.declarations.as_slice() else {
          return Err(unsupported("multiple for-in/of bindings", decl.span));
        };
        if declarator.init.is_some() {
          return Err(unsupported("for-in/of initializer", declarator.span));
        }
        self.pattern(&declarator.id)?;
        pattern_bound_names(&declarator.id, &mut semantics.bound_names);
        let entry = Declaration::Variable {
          kind: declaration_kind,
          declarator,
        };
        if declaration_kind.is_lexical() {
          semantics.add_lexical_declaration(entry);
        } else {
          semantics.add_var_declarations(&[entry]);
        }
        ForBinding::Declaration {
          kind: declaration_kind,
          pattern: &declarator.id,
        }
      }
      ast::ForStatementLeft::AssignmentTargetIdentifier(ident) => ForBinding::Identifier(ident),
      ast::ForStatementLeft::StaticMemberExpression(member) => {
        self.expression(&member.object)?;
        ForBinding::StaticMember(member)
      }
      ast::ForStatementLeft::ComputedMemberExpression(member) => {
        self.expression(&member.object)?;
        self.expression(&member.expression)?;
        ForBinding::ComputedMember(member)
      }
      other => return Err(unsupported("destructuring assignment", other.span())),
    };
    self.expression(right)?;
    let body = Box::new(self.loop_body(body, own_labels)?);
    semantics.add_var_declarations(&self.var_declarations_of(&body));
    self.exit(id, semantics);
    Ok(ForInOfNode {
      id,
      left,
      right,
      body,
    })
  }

  fn switch_statement(&mut self, s: &'a ast::SwitchStatement<'a>) -> Result<Stmt<'a>, VmError> {
    let id = self.enter(NodeKind::Switch, s.span)?;
    self.expression(&s.discriminant)?;
    self.jumps.breakable += 1;
    let cases = self.case_clauses(&s.cases);
    self.jumps.breakable -= 1;
    let cases = cases?;
    let mut semantics = StaticSemantics::default();
    for case in &cases {
      let own = &self.nodes[case.id.0 as usize].semantics;
      let vars = own.var_scoped_declarations.clone();
      let lexical = own.lexically_scoped_declarations.clone();
      semantics.add_var_declarations(&vars);
      for decl in lexical {
        semantics.add_lexical_declaration(decl);
      }
    }
    self.exit(id, semantics);
    Ok(Stmt::Switch(SwitchNode {
      id,
      discriminant: &s.discriminant,
      cases,
    }))
  }

  fn case_clauses(
    &mut self,
    cases: &'a oxc_allocator::Vec<'a, ast::SwitchCase<'a>>,
  ) -> Result<Vec<CaseClauseNode<'a>>, VmError> {
    let mut out = Vec::with_capacity(cases.len());
    for case in cases.iter() {
      let id = self.enter(NodeKind::CaseClause, case.span)?;
      if let Some(test) = &case.test {
        self.expression(test)?;
      }
      let (consequent, semantics) = self.statement_list(&case.consequent, false)?;
      self.exit(id, semantics);
      out.push(CaseClauseNode {
        id,
        test: case.test.as_ref(),
        consequent,
      });
    }
    Ok(out)
  }

  fn try_statement(&mut self, s: &'a ast::TryStatement<'a>) -> Result<Stmt<'a>, VmError> {
    let id = self.enter(NodeKind::Try, s.span)?;
    let block = self.block(&s.block, NodeKind::Block)?;
    let mut semantics = StaticSemantics::default();
    semantics.add_var_declarations(&self.nodes[block.id.0 as usize].semantics.var_scoped_declarations.clone());
    let handler = match &s.handler {
      Some(handler) => {
        let catch_id = self.enter(NodeKind::Catch, handler.span)?;
        let mut catch_semantics = StaticSemantics::default();
        if let Some(param) = &handler.param {
          self.pattern(&param.pattern)?;
          pattern_bound_names(&param.pattern, &mut catch_semantics.bound_names);
        }
        let body = self.block(&handler.body, NodeKind::Block)?;
        let vars = self.nodes[body.id.0 as usize].semantics.var_scoped_declarations.clone();
        catch_semantics.add_var_declarations(&vars);
        semantics.add_var_declarations(&vars);
        self.exit(catch_id, catch_semantics);
        Some(CatchNode {
          id: catch_id,
          param: handler.param.as_ref().map(|param| &param.pattern),
          body,
        })
      }
      None => None,
    };
    let finalizer = match &s.finalizer {
      Some(finalizer) => {
        let block = self.block(finalizer, NodeKind::Finally)?;
        semantics.add_var_declarations(&self.nodes[block.id.0 as usize].semantics.var_scoped_declarations.clone());
        Some(block)
      }
      None => None,
    };
    self.exit(id, semantics);
    Ok(Stmt::Try(TryNode {
      id,
      block,
      handler,
      finalizer,
    }))
  }

  fn function(&mut self, func: &'a ast::Function<'a>) -> Result<FunctionId, VmError> {
    if func.generator {
      return Err(unsupported("generator function", func.span));
    }
    if func.r#async {
      return Err(unsupported("async function", func.span));
    }
    let Some(body) = &func.body else {
      return Err(unsupported("function without body", func.span));
    };
    let name = func.id.as_ref().map(|id| id.name.as_str());
    self.function_node(func.span, name, &func.params, body, false, false)
  }

  fn arrow(&mut self, arrow: &'a ast::ArrowFunctionExpression<'a>) -> Result<FunctionId, VmError> {
    if arrow.r#async {
      return Err(unsupported("async function", arrow.span));
    }
    self.function_node(arrow.span, None, &arrow.params, &arrow.body, true, arrow.expression)
  }

  fn function_node(
    &mut self,
    span: Span,
    name: Option<&'a str>,
    params: &'a ast::FormalParameters<'a>,
    body: &'a ast::FunctionBody<'a>,
    is_arrow: bool,
    concise: bool,
  ) -> Result<FunctionId, VmError> {
    let saved_jumps = std::mem::take(&mut self.jumps);
    let saved_expression_depth = self.expression_depth;
    let result = self.function_contents(span, name, params, body, is_arrow, concise);
    self.jumps = saved_jumps;
    self.expression_depth = saved_expression_depth;
    let function = result?;
    let function_id = FunctionId(self.functions.len() as u32);
    self.functions.push(function);
    self.function_index.insert((span.start, span.end), function_id);
    Ok(function_id)
  }

  fn function_contents(
    &mut self,
    span: Span,
    name: Option<&'a str>,
    params: &'a ast::FormalParameters<'a>,
    body: &'a ast::FunctionBody<'a>,
    is_arrow: bool,
    concise: bool,
  ) -> Result<FunctionNode<'a>, VmError> {
    let id = self.enter(NodeKind::Function, span)?;
    let mut parameter_names = Vec::new();
    for param in params.items.iter() {
      self.pattern(&param.pattern)?;
      pattern_bound_names(&param.pattern, &mut parameter_names);
    }
    if let Some(rest) = &params.rest {
      self.pattern(&rest.argument)?;
      pattern_bound_names(&rest.argument, &mut parameter_names);
    }
    let (body, mut semantics) = match (concise, body.statements.first()) {
      (true, Some(ast::Statement::ExpressionStatement(stmt))) => {
        self.expression(&stmt.expression)?;
        (
          FunctionBody::Expression(&stmt.expression),
          StaticSemantics::default(),
        )
      }
      _ => {
        let (statements, semantics) = self.statement_list(&body.statements, true)?;
        (FunctionBody::Statements(statements), semantics)
      }
    };
    semantics.bound_names = parameter_names.clone();
    self.exit(id, semantics);
    Ok(FunctionNode {
      id,
      name,
      params,
      parameter_names,
      length: expected_argument_count(params),
      is_arrow,
      body,
    })
  }

  fn pattern(&mut self, pattern: &'a ast::BindingPattern<'a>) -> Result<(), VmError> {
    ensure_sufficient_stack(|| self.pattern_contents(pattern))
  }

  fn pattern_contents(&mut self, pattern: &'a ast::BindingPattern<'a>) -> Result<(), VmError> {
    match &pattern.kind {
      ast::BindingPatternKind::BindingIdentifier(_) => Ok(()),
      ast::BindingPatternKind::ObjectPattern(object) => {
        for property in object.properties.iter() {
          self.property_key(&property.key, property.computed)?;
          self.pattern(&property.value)?;
        }
        if let Some(rest) = &object.rest {
          self.pattern(&rest.argument)?;
        }
        Ok(())
      }
      ast::BindingPatternKind::ArrayPattern(array) => {
        for element in array.elements.iter().flatten() {
          self.pattern(element)?;
        }
        if let Some(rest) = &array.rest {
          self.pattern(&rest.argument)?;
        }
        Ok(())
      }
      ast::BindingPatternKind::AssignmentPattern(assign) => {
        self.pattern(&assign.left)?;
        self.expression(&assign.right)
      }
    }
  }

  fn property_key(&mut self, key: &'a ast::PropertyKey<'a>, computed: bool) -> Result<(), VmError> {
    match key {
      ast::PropertyKey::StaticIdentifier(_) => Ok(()),
      ast::PropertyKey::PrivateIdentifier(id) => Err(unsupported("private field", id.span)),
      key => match key.as_expression() {
        Some(expr) if computed => self.expression(expr),
        Some(_) => Ok(()),
        None => Err(unsupported("property key", key.span())),
      },
    }
  }

  fn expression(&mut self, expr: &'a ast::Expression<'a>) -> Result<(), VmError> {
    self.expression_depth += 1;
    let result = self
      .check_depth()
      .and_then(|()| ensure_sufficient_stack(|| self.expression_contents(expr)));
    self.expression_depth -= 1;
    result
  }

  fn expression_contents(&mut self, expr: &'a ast::Expression<'a>) -> Result<(), VmError> {
    use ast::Expression as E;
    match expr {
      E::BooleanLiteral(_)
      | E::NullLiteral(_)
      | E::NumericLiteral(_)
      | E::StringLiteral(_)
      | E::Identifier(_)
      | E::ThisExpression(_) => Ok(()),
      E::TemplateLiteral(template) => {
        for expr in template.expressions.iter() {
          self.expression(expr)?;
        }
        Ok(())
      }
      E::ArrayExpression(array) => {
        for element in array.elements.iter() {
          match element {
            ast::ArrayExpressionElement::SpreadElement(spread) => self.expression(&spread.argument)?,
            ast::ArrayExpressionElement::Elision(_) => {}
            element => self.expression(element.to_expression())?,
          }
        }
        Ok(())
      }
      E::ObjectExpression(object) => {
        for property in object.properties.iter() {
          match property {
            ast::ObjectPropertyKind::ObjectProperty(prop) => {
              self.property_key(&prop.key, prop.computed)?;
              self.expression(&prop.value)?;
            }
            ast::ObjectPropertyKind::SpreadProperty(spread) => self.expression(&spread.argument)?,
          }
        }
        Ok(())
      }
      E::FunctionExpression(func) => self.function(func).map(drop),
      E::ArrowFunctionExpression(arrow) => self.arrow(arrow).map(drop),
      E::UnaryExpression(unary) => self.expression(&unary.argument),
      E::BinaryExpression(binary) => {
        self.expression(&binary.left)?;
        self.expression(&binary.right)
      }
      E::LogicalExpression(logical) => {
        self.expression(&logical.left)?;
        self.expression(&logical.right)
      }
      E::ConditionalExpression(cond) => {
        self.expression(&cond.test)?;
        self.expression(&cond.consequent)?;
        self.expression(&cond.alternate)
      }
      E::SequenceExpression(seq) => {
        for expr in seq.expressions.iter() {
          self.expression(expr)?;
        }
        Ok(())
      }
      E::ParenthesizedExpression(paren) => self.expression(&paren.expression),
      E::AssignmentExpression(assign) => {
        self.assignment_target(&assign.left)?;
        self.expression(&assign.right)
      }
      E::UpdateExpression(update) => self.simple_target(&update.argument),
      E::CallExpression(call) => {
        if call.optional {
          return Err(unsupported("optional chaining", call.span));
        }
        self.expression(&call.callee)?;
        self.arguments(&call.arguments)
      }
      E::NewExpression(new) => {
        self.expression(&new.callee)?;
        self.arguments(&new.arguments)
      }
      E::StaticMemberExpression(member) => {
        if member.optional {
          return Err(unsupported("optional chaining", member.span));
        }
        self.expression(&member.object)
      }
      E::ComputedMemberExpression(member) => {
        if member.optional {
          return Err(unsupported("optional chaining", member.span));
        }
        self.expression(&member.object)?;
        self.expression(&member.expression)
      }
      other => Err(unsupported(expression_kind_name(other), other.span())),
    }
  }

  fn arguments(&mut self, args: &'a oxc_allocator::Vec<'a, ast::Argument<'a>>) -> Result<(), VmError> {
    for arg in args.iter() {
      match arg {
        ast::Argument::SpreadElement(spread) => self.expression(&spread.argument)?,
        arg => self.expression(arg.to_expression())?,
      }
    }
    Ok(())
  }

  fn assignment_target(&mut self, target: &'a ast::AssignmentTarget<'a>) -> Result<(), VmError> {
    match target {
      ast::AssignmentTarget::AssignmentTargetIdentifier(_) => Ok(()),
      ast::AssignmentTarget::StaticMemberExpression(member) => self.expression(&member.object),
      ast::AssignmentTarget::ComputedMemberExpression(member) => {
        self.expression(&member.object)?;
        self.expression(&member.expression)
      }
      other => Err(unsupported("destructuring assignment", other.span())),
    }
  }

  fn simple_target(&mut self, target: &'a ast::SimpleAssignmentTarget<'a>) -> Result<(), VmError> {
    match target {
      ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(_) => Ok(()),
      ast::SimpleAssignmentTarget::StaticMemberExpression(member) => self.expression(&member.object),
      ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
        self.expression(&member.object)?;
        self.expression(&member.expression)
      }
      other => Err(unsupported("assignment target", other.span())),
    }
  }
}
