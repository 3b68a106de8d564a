use eval_js::{Declaration, NodeKind, Script, Stmt, VmError};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

fn sorted<'a>(names: &[&'a str]) -> Vec<&'a str> {
  let mut names = names.to_vec();
  names.sort_unstable();
  names
}

#[test]
fn declarations_are_scoped_to_their_containers() -> Result<(), VmError> {
  let source = "var a; let b; function f() { var c; } { let d; function g() {} }";
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
  assert!(ret.errors.is_empty());
  let script = Script::new(&ret.program)?;

  let root = script.semantics(script.root());
  assert_eq!(sorted(&root.var_declared_names), ["a", "f"]);
  assert_eq!(root.lexically_declared_names, ["b"]);

  let function = root
    .var_scoped_declarations
    .iter()
    .find_map(|decl| match *decl {
      Declaration::Function { function, name: "f" } => Some(function),
      _ => None,
    })
    .expect("f is var-scoped at the top level");
  let body = script.function(function);
  assert_eq!(body.name, Some("f"));
  assert_eq!(script.semantics(body.id).var_declared_names, ["c"]);

  let Stmt::Block(block) = &script.body()[3] else {
    panic!("expected a block statement");
  };
  let block = script.semantics(block.id);
  assert_eq!(sorted(&block.lexically_declared_names), ["d", "g"]);
  assert!(block.var_declared_names.is_empty());
  Ok(())
}

#[test]
fn var_declarations_hoist_through_nested_statements() -> Result<(), VmError> {
  let source = r#"
    if (x) { var a; } else var b;
    for (var i = 0;;) { let hidden; var c; }
    for (var k in o) try { var d; } catch (e) { var e2; } finally { var f; }
    label: while (0) { var [g, { h }] = [] }
    switch (0) { case 1: var s; let t; }
  "#;
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
  assert!(ret.errors.is_empty());
  let script = Script::new(&ret.program)?;

  let root = script.semantics(script.root());
  assert_eq!(
    sorted(&root.var_declared_names),
    ["a", "b", "c", "d", "e2", "f", "g", "h", "i", "k", "s"]
  );
  assert!(root.lexically_declared_names.is_empty());

  let switch = script.body().last().expect("switch statement");
  assert_eq!(script.node(switch.id()).kind, NodeKind::Switch);
  assert_eq!(script.semantics(switch.id()).lexically_declared_names, ["t"]);
  Ok(())
}

#[test]
fn nodes_record_their_position_in_the_tree() -> Result<(), VmError> {
  let source = "1; { 2; while (0) { 3; } }";
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
  let script = Script::new(&ret.program)?;

  let root = script.node(script.root());
  assert_eq!(root.kind, NodeKind::Script);
  assert_eq!(root.parent, None);
  assert_eq!(root.child_count, 2);

  let block = script.body()[1].id();
  assert_eq!(script.node(block).kind, NodeKind::Block);
  assert_eq!(script.parent(block), Some(script.root()));
  assert_eq!(script.node(block).index, 1);
  assert_eq!(script.node(block).depth, 1);

  let (loop_id, loop_node) = script
    .nodes()
    .find(|(_, node)| node.kind == NodeKind::While)
    .expect("while node");
  assert_eq!(script.parent(loop_id), Some(block));
  assert_eq!(loop_node.depth, 2);
  assert!(!script.body()[1].is_breakable());
  Ok(())
}
