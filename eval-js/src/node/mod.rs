//! Evaluatable wrappers over an `oxc_ast` program.
//!
//! A [`Script`] mirrors every statement of the parsed program with a [`Stmt`] node that owns its
//! children. Per-node metadata (kind, span, parent, sibling index, depth and the cached static
//! semantics) lives in a flat arena indexed by [`NodeId`], so parent links are plain indices.
//! Expressions stay in the external tree; only the functions they contain are wrapped, as
//! [`FunctionNode`]s found by span.

mod build;
mod semantics;

pub use semantics::pattern_bound_names;
pub use semantics::Declaration;
pub use semantics::DeclarationKind;
pub use semantics::StaticSemantics;

use crate::function::{FunctionId, ScriptId};
use crate::{VmError, VmOptions};
use ahash::AHashMap;
use oxc_ast::ast;
use oxc_span::Span;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCRIPT_ID: AtomicU64 = AtomicU64::new(1);

/// Index of a node in its script's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// The grammar production a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
  Script,
  Function,
  Block,
  Empty,
  Expression,
  VariableDeclaration,
  FunctionDeclaration,
  If,
  DoWhile,
  While,
  For,
  ForIn,
  ForOf,
  Continue,
  Break,
  Return,
  Labeled,
  Switch,
  CaseClause,
  Throw,
  Try,
  Catch,
  Finally,
  Debugger,
}

/// Per-node metadata.
#[derive(Debug, Clone)]
pub struct NodeData<'a> {
  pub kind: NodeKind,
  pub span: Span,
  /// `None` only for the script root.
  pub parent: Option<NodeId>,
  /// Position among the parent's children.
  pub index: u32,
  pub depth: u32,
  pub child_count: u32,
  pub semantics: StaticSemantics<'a>,
}

/// A statement node.
#[derive(Debug)]
pub enum Stmt<'a> {
  Block(BlockNode<'a>),
  Empty(LeafNode),
  Expression(ExpressionNode<'a>),
  VariableDeclaration(VariableDeclarationNode<'a>),
  FunctionDeclaration(FunctionDeclarationNode),
  If(IfNode<'a>),
  DoWhile(DoWhileNode<'a>),
  While(WhileNode<'a>),
  For(ForNode<'a>),
  ForIn(ForInOfNode<'a>),
  ForOf(ForInOfNode<'a>),
  Continue(JumpNode<'a>),
  Break(JumpNode<'a>),
  Return(ReturnNode<'a>),
  Labeled(LabeledNode<'a>),
  Switch(SwitchNode<'a>),
  Throw(ThrowNode<'a>),
  Try(TryNode<'a>),
  Debugger(LeafNode),
}

impl Stmt<'_> {
  pub fn id(&self) -> NodeId {
    match self {
      Stmt::Block(n) => n.id,
      Stmt::Empty(n) | Stmt::Debugger(n) => n.id,
      Stmt::Expression(n) => n.id,
      Stmt::VariableDeclaration(n) => n.id,
      Stmt::FunctionDeclaration(n) => n.id,
      Stmt::If(n) => n.id,
      Stmt::DoWhile(n) => n.id,
      Stmt::While(n) => n.id,
      Stmt::For(n) => n.id,
      Stmt::ForIn(n) | Stmt::ForOf(n) => n.id,
      Stmt::Continue(n) | Stmt::Break(n) => n.id,
      Stmt::Return(n) => n.id,
      Stmt::Labeled(n) => n.id,
      Stmt::Switch(n) => n.id,
      Stmt::Throw(n) => n.id,
      Stmt::Try(n) => n.id,
    }
  }

  /// Whether this is an IterationStatement or a SwitchStatement (a BreakableStatement).
  pub fn is_breakable(&self) -> bool {
    matches!(
      self,
      Stmt::DoWhile(_) | Stmt::While(_) | Stmt::For(_) | Stmt::ForIn(_) | Stmt::ForOf(_) | Stmt::Switch(_)
    )
  }
}

#[derive(Debug)]
pub struct LeafNode {
  pub id: NodeId,
}

#[derive(Debug)]
pub struct BlockNode<'a> {
  pub id: NodeId,
  pub statements: Vec<Stmt<'a>>,
}

#[derive(Debug)]
pub struct ExpressionNode<'a> {
  pub id: NodeId,
  pub expression: &'a ast::Expression<'a>,
}

#[derive(Debug)]
pub struct VariableDeclarationNode<'a> {
  pub id: NodeId,
  pub kind: DeclarationKind,
  pub source: &'a ast::VariableDeclaration<'a>,
}

#[derive(Debug)]
pub struct FunctionDeclarationNode {
  pub id: NodeId,
  pub function: FunctionId,
}

#[derive(Debug)]
pub struct IfNode<'a> {
  pub id: NodeId,
  pub test: &'a ast::Expression<'a>,
  pub consequent: Box<Stmt<'a>>,
  pub alternate: Option<Box<Stmt<'a>>>,
}

#[derive(Debug)]
pub struct DoWhileNode<'a> {
  pub id: NodeId,
  pub body: Box<Stmt<'a>>,
  pub test: &'a ast::Expression<'a>,
}

#[derive(Debug)]
pub struct WhileNode<'a> {
  pub id: NodeId,
  pub test: &'a ast::Expression<'a>,
  pub body: Box<Stmt<'a>>,
}

#[derive(Debug)]
pub enum ForInit<'a> {
  None,
  Expression(&'a ast::Expression<'a>),
  Declaration(VariableDeclarationNode<'a>),
}

#[derive(Debug)]
pub struct ForNode<'a> {
  pub id: NodeId,
  pub init: ForInit<'a>,
  pub test: Option<&'a ast::Expression<'a>>,
  pub update: Option<&'a ast::Expression<'a>>,
  pub body: Box<Stmt<'a>>,
}

/// The left-hand side of `for (... in/of ...)`.
#[derive(Debug, Clone, Copy)]
pub enum ForBinding<'a> {
  Declaration {
    kind: DeclarationKind,
    pattern: &'a ast::BindingPattern<'a>,
  },
  Identifier(&'a ast::IdentifierReference<'a>),
  StaticMember(&'a ast::StaticMemberExpression<'a>),
  ComputedMember(&'a ast::ComputedMemberExpression<'a>),
}

#[derive(Debug)]
pub struct ForInOfNode<'a> {
  pub id: NodeId,
  pub left: ForBinding<'a>,
  pub right: &'a ast::Expression<'a>,
  pub body: Box<Stmt<'a>>,
}

/// `break` or `continue`.
#[derive(Debug)]
pub struct JumpNode<'a> {
  pub id: NodeId,
  pub label: Option<&'a str>,
}

#[derive(Debug)]
pub struct ReturnNode<'a> {
  pub id: NodeId,
  pub argument: Option<&'a ast::Expression<'a>>,
}

#[derive(Debug)]
pub struct LabeledNode<'a> {
  pub id: NodeId,
  pub label: &'a str,
  pub body: Box<Stmt<'a>>,
}

#[derive(Debug)]
pub struct SwitchNode<'a> {
  pub id: NodeId,
  pub discriminant: &'a ast::Expression<'a>,
  pub cases: Vec<CaseClauseNode<'a>>,
}

#[derive(Debug)]
pub struct CaseClauseNode<'a> {
  pub id: NodeId,
  /// `None` for `default:`.
  pub test: Option<&'a ast::Expression<'a>>,
  pub consequent: Vec<Stmt<'a>>,
}

#[derive(Debug)]
pub struct ThrowNode<'a> {
  pub id: NodeId,
  pub argument: &'a ast::Expression<'a>,
}

#[derive(Debug)]
pub struct TryNode<'a> {
  pub id: NodeId,
  pub block: BlockNode<'a>,
  pub handler: Option<CatchNode<'a>>,
  pub finalizer: Option<BlockNode<'a>>,
}

#[derive(Debug)]
pub struct CatchNode<'a> {
  pub id: NodeId,
  pub param: Option<&'a ast::BindingPattern<'a>>,
  pub body: BlockNode<'a>,
}

/// Body of a function: statements, or the single expression of a concise arrow.
#[derive(Debug)]
pub enum FunctionBody<'a> {
  Statements(Vec<Stmt<'a>>),
  Expression(&'a ast::Expression<'a>),
}

/// A function declaration, function expression or arrow function.
///
/// The node's static semantics are the function body's top-level ones: function declarations are
/// var-scoped, `let`/`const` lexically scoped.
#[derive(Debug)]
pub struct FunctionNode<'a> {
  pub id: NodeId,
  pub name: Option<&'a str>,
  pub params: &'a ast::FormalParameters<'a>,
  pub parameter_names: Vec<&'a str>,
  /// ExpectedArgumentCount: parameters before the first default or rest parameter.
  pub length: u32,
  pub is_arrow: bool,
  pub body: FunctionBody<'a>,
}

/// An evaluatable script: the wrapper tree of one parsed program.
#[derive(Debug)]
pub struct Script<'a> {
  id: ScriptId,
  nodes: Vec<NodeData<'a>>,
  root: NodeId,
  body: Vec<Stmt<'a>>,
  functions: Vec<FunctionNode<'a>>,
  function_index: AHashMap<(u32, u32), FunctionId>,
}

impl<'a> Script<'a> {
  /// Builds the node tree with default limits.
  pub fn new(program: &'a ast::Program<'a>) -> Result<Self, VmError> {
    Self::with_options(program, &VmOptions::default())
  }

  /// Builds the node tree, computing static semantics and rejecting unsupported syntax, undefined
  /// labels and nesting deeper than `options.max_syntax_depth`.
  pub fn with_options(program: &'a ast::Program<'a>, options: &VmOptions) -> Result<Self, VmError> {
    let built = build::Builder::new(options.max_syntax_depth).build(program)?;
    Ok(Script {
      id: ScriptId(NEXT_SCRIPT_ID.fetch_add(1, Ordering::Relaxed)),
      nodes: built.nodes,
      root: built.root,
      body: built.body,
      functions: built.functions,
      function_index: built.function_index,
    })
  }

  pub fn id(&self) -> ScriptId {
    self.id
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn body(&self) -> &[Stmt<'a>] {
    &self.body
  }

  pub fn node(&self, id: NodeId) -> &NodeData<'a> {
    &self.nodes[id.0 as usize]
  }

  pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData<'a>)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(idx, node)| (NodeId(idx as u32), node))
  }

  pub fn semantics(&self, id: NodeId) -> &StaticSemantics<'a> {
    &self.node(id).semantics
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).parent
  }

  pub fn function(&self, id: FunctionId) -> &FunctionNode<'a> {
    &self.functions[id.0 as usize]
  }

  /// The wrapped function whose source span is `span`.
  pub fn function_at(&self, span: Span) -> Option<FunctionId> {
    self.function_index.get(&(span.start, span.end)).copied()
  }
}
