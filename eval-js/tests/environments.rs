use eval_js::{Realm, Value, VmError};

fn exec_to_string(realm: &mut Realm, source: &str) -> Result<String, VmError> {
  let value = realm.exec_script(source)?;
  realm.value_to_string(value)
}

/// The message of the error an uncaught throw carries.
fn thrown_message(realm: &mut Realm, source: &str) -> String {
  match realm.exec_script(source) {
    Err(VmError::Throw(value)) => realm.value_to_string(value).unwrap(),
    other => panic!("expected {source:?} to throw, got {other:?}"),
  }
}

const COLLECT: &str = r#"
  var out = [];
  for (var n = 0; n < fns.length; n++) out.push(fns[n]());
  out.join(",")
"#;

#[test]
fn let_loop_closures_capture_each_iteration() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    "var fns = []; for (let i = 0; i < 3; i++) {{ fns.push(function () {{ return i; }}); }} {COLLECT}"
  );
  assert_eq!(exec_to_string(&mut realm, &source)?, "0,1,2");
  Ok(())
}

#[test]
fn var_loop_closures_share_one_binding() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    "var fns = []; for (var i = 0; i < 3; i++) {{ fns.push(function () {{ return i; }}); }} {COLLECT}"
  );
  assert_eq!(exec_to_string(&mut realm, &source)?, "3,3,3");
  Ok(())
}

#[test]
fn per_iteration_copies_see_updates_made_in_the_body() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    "var fns = []; for (let i = 0; i < 6; i++) {{ fns.push(() => i); i++; }} {COLLECT}"
  );
  assert_eq!(exec_to_string(&mut realm, &source)?, "1,3,5");
  Ok(())
}

#[test]
fn for_of_declarations_are_fresh_per_iteration() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!("var fns = []; for (const x of [1, 2, 3]) fns.push(() => x); {COLLECT}");
  assert_eq!(exec_to_string(&mut realm, &source)?, "1,2,3");

  let source = format!(
    "var fns = []; for (let k in {{ a: 1, b: 2 }}) fns.push(function () {{ return k; }}); {COLLECT}"
  );
  assert_eq!(exec_to_string(&mut realm, &source)?, "a,b");
  Ok(())
}

#[test]
fn block_scoping_shadows_and_restores() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    let x = "outer";
    var seen;
    { let x = "inner"; seen = x; }
    seen + "/" + x
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "inner/outer");
  Ok(())
}

#[test]
fn lexical_bindings_are_in_tdz_before_initialization() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "{ x; let x = 1; }"),
    "ReferenceError: Cannot access 'x' before initialization"
  );
  assert_eq!(
    thrown_message(&mut realm, "function f() { return y; } f(); let y = 1;"),
    "ReferenceError: Cannot access 'y' before initialization"
  );
  assert_eq!(
    thrown_message(&mut realm, "let z = 1; { for (let z of [z]) {} }"),
    "ReferenceError: Cannot access 'z' before initialization"
  );
  assert_eq!(
    exec_to_string(&mut realm, "typeof notDeclaredAnywhere")?,
    "undefined"
  );
  Ok(())
}

#[test]
fn const_bindings_reject_assignment() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "const c = 1; c = 2;"),
    "TypeError: Assignment to constant variable."
  );
  assert_eq!(
    thrown_message(&mut realm, "for (const i = 0; i < 2; i++) {}"),
    "TypeError: Assignment to constant variable."
  );
  Ok(())
}

#[test]
fn undeclared_names_throw_on_read_and_create_globals_on_write() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "missing + 1"),
    "ReferenceError: missing is not defined"
  );
  assert_eq!(realm.exec_script("implicit = 4; globalThis.implicit")?, Value::Number(4.0));
  Ok(())
}

#[test]
fn global_declarations_persist_across_scripts() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  realm.exec_script("let k = 5; var v = 6; function f() { return k + v; }")?;
  assert_eq!(realm.exec_script("k + v")?, Value::Number(11.0));
  assert_eq!(exec_to_string(&mut realm, "typeof f")?, "function");
  assert_eq!(realm.exec_script("globalThis.v")?, Value::Number(6.0));
  assert_eq!(realm.exec_script("globalThis.k")?, Value::Undefined);
  Ok(())
}

#[test]
fn global_redeclaration_is_a_syntax_error() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  realm.exec_script("let a = 1;")?;
  assert_eq!(
    thrown_message(&mut realm, "var a;"),
    "SyntaxError: Identifier 'a' has already been declared"
  );
  assert_eq!(
    thrown_message(&mut realm, "let undefined;"),
    "SyntaxError: Identifier 'undefined' has already been declared"
  );
  Ok(())
}

#[test]
fn hoisting_makes_functions_and_vars_visible_early() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    exec_to_string(&mut realm, "var r = typeof early + typeof later; function early() {} var later = 1; r")?,
    "functionundefined"
  );
  assert_eq!(
    exec_to_string(&mut realm, "function g() { return h(); function h() { return 'h'; } } g()")?,
    "h"
  );
  Ok(())
}

#[test]
fn named_function_expressions_see_their_own_name() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    exec_to_string(&mut realm, "var f = function g() { return typeof g; }; f() + typeof g")?,
    "functionundefined"
  );
  Ok(())
}

#[test]
fn closures_keep_their_defining_environment() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    function counter() {
      let n = 0;
      return { inc: function () { return ++n; }, get: () => n };
    }
    var a = counter(), b = counter();
    a.inc(); a.inc(); b.inc();
    a.get() * 10 + b.get()
  "#;
  assert_eq!(realm.exec_script(source)?, Value::Number(21.0));
  Ok(())
}
