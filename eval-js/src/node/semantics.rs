use crate::function::FunctionId;
use oxc_ast::ast;

/// The declaration form of a variable statement or lexical declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
  Var,
  Let,
  Const,
}

impl DeclarationKind {
  pub fn is_lexical(self) -> bool {
    !matches!(self, DeclarationKind::Var)
  }

  pub fn is_const(self) -> bool {
    matches!(self, DeclarationKind::Const)
  }
}

/// One entry of a VarScopedDeclarations or LexicallyScopedDeclarations list.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
  Variable {
    kind: DeclarationKind,
    declarator: &'a ast::VariableDeclarator<'a>,
  },
  Function {
    function: FunctionId,
    name: &'a str,
  },
}

impl<'a> Declaration<'a> {
  pub fn bound_names(&self, out: &mut Vec<&'a str>) {
    match *self {
      Declaration::Variable { declarator, .. } => pattern_bound_names(&declarator.id, out),
      Declaration::Function { name, .. } => out.push(name),
    }
  }

  pub fn is_const(&self) -> bool {
    matches!(
      self,
      Declaration::Variable {
        kind: DeclarationKind::Const,
        ..
      }
    )
  }
}

/// Static-semantics attributes cached on a node when its tree is built.
#[derive(Debug, Default, Clone)]
pub struct StaticSemantics<'a> {
  pub bound_names: Vec<&'a str>,
  pub var_declared_names: Vec<&'a str>,
  pub var_scoped_declarations: Vec<Declaration<'a>>,
  pub lexically_declared_names: Vec<&'a str>,
  pub lexically_scoped_declarations: Vec<Declaration<'a>>,
}

impl<'a> StaticSemantics<'a> {
  pub(crate) fn add_var_declarations(&mut self, decls: &[Declaration<'a>]) {
    for decl in decls {
      decl.bound_names(&mut self.var_declared_names);
      self.var_scoped_declarations.push(*decl);
    }
  }

  pub(crate) fn add_lexical_declaration(&mut self, decl: Declaration<'a>) {
    decl.bound_names(&mut self.lexically_declared_names);
    self.lexically_scoped_declarations.push(decl);
  }
}

/// BoundNames of a binding pattern, in source order.
pub fn pattern_bound_names<'a>(pattern: &'a ast::BindingPattern<'a>, out: &mut Vec<&'a str>) {
  match &pattern.kind {
    ast::BindingPatternKind::BindingIdentifier(id) => out.push(id.name.as_str()),
    ast::BindingPatternKind::ObjectPattern(object) => {
      for property in object.properties.iter() {
        pattern_bound_names(&property.value, out);
      }
      if let Some(rest) = &object.rest {
        pattern_bound_names(&rest.argument, out);
      }
    }
    ast::BindingPatternKind::ArrayPattern(array) => {
      for element in array.elements.iter().flatten() {
        pattern_bound_names(element, out);
      }
      if let Some(rest) = &array.rest {
        pattern_bound_names(&rest.argument, out);
      }
    }
    ast::BindingPatternKind::AssignmentPattern(assign) => pattern_bound_names(&assign.left, out),
  }
}
