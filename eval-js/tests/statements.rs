use eval_js::{Completion, Realm, Script, Value, VmError};
use oxc_allocator::Allocator;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::SourceType;

/// Evaluates `source` as a script body, allowing top-level `return` so the raw completion record
/// is observable.
fn evaluate(realm: &mut Realm, source: &str) -> Result<Completion, VmError> {
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, SourceType::default().with_script(true))
    .with_options(ParseOptions {
      allow_return_outside_function: true,
      ..ParseOptions::default()
    })
    .parse();
  assert!(ret.errors.is_empty(), "parse errors: {:?}", ret.errors);
  let script = Script::new(&ret.program)?;
  script.evaluate(realm)
}

fn exec_to_string(realm: &mut Realm, source: &str) -> Result<String, VmError> {
  let value = realm.exec_script(source)?;
  realm.value_to_string(value)
}

#[test]
fn switch_falls_through_from_the_matching_case() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = |discriminant: u32| {
    format!(
      r#"var out = "";
      switch ({discriminant}) {{
        case 1: out += "A";
        case 2: out += "B";
        case 3: out += "C";
        default: out += "D";
      }}
      out"#
    )
  };
  assert_eq!(exec_to_string(&mut realm, &source(2))?, "BCD");
  assert_eq!(exec_to_string(&mut realm, &source(3))?, "CD");
  assert_eq!(exec_to_string(&mut realm, &source(9))?, "D");
  Ok(())
}

#[test]
fn switch_default_in_the_middle_is_tried_last() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var out = "";
    switch (5) {
      case 1: out += "A";
      default: out += "D";
      case 2: out += "B"; break;
      case 3: out += "C";
    }
    out
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "DB");

  let source = r#"
    var out = "";
    switch (3) {
      case 1: out += "A";
      default: out += "D";
      case 3: out += "C";
    }
    out
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "C");
  Ok(())
}

#[test]
fn switch_falls_through_default_into_later_cases() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = |discriminant: u32| {
    format!(
      r#"var out = "";
      switch ({discriminant}) {{
        case 1: out += "A";
        case 2: out += "B";
        default: out += "C";
        case 3: out += "D";
      }}
      out"#
    )
  };
  assert_eq!(exec_to_string(&mut realm, &source(2))?, "BCD");
  assert_eq!(exec_to_string(&mut realm, &source(5))?, "CD");
  assert_eq!(exec_to_string(&mut realm, &source(3))?, "D");
  Ok(())
}

#[test]
fn switch_cases_are_compared_strictly_and_evaluated_lazily() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var tested = 0;
    function t(v) { tested++; return v; }
    var out = "none";
    switch ("1") {
      case t(1): out = "number"; break;
      case t("1"): out = "string"; break;
      case t(2): out = "late"; break;
    }
    out + tested
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "string2");
  Ok(())
}

#[test]
fn labelled_break_out_of_block_completes_normally_with_empty() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(evaluate(&mut realm, "outer: { break outer; }")?, Completion::empty());
  assert_eq!(
    evaluate(&mut realm, "outer: { 1; break outer; 2; }")?,
    Completion::Normal(Value::Number(1.0))
  );
  Ok(())
}

#[test]
fn labelled_break_out_of_infinite_loops_is_absorbed_by_the_label() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "outer: for (;;) { for (;;) { break outer; } unreachable; }")?,
    Completion::empty()
  );
  Ok(())
}

#[test]
fn labelled_continue_targets_the_outer_loop() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var trace = "";
    outer: for (var i = 0; i < 3; i++) {
      for (var j = 0; j < 3; j++) {
        if (j === 1) continue outer;
        trace += i + "" + j + ",";
      }
      trace += "unreachable";
    }
    trace
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "00,10,20,");
  Ok(())
}

#[test]
fn labelled_break_leaves_nested_loops() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var count = 0;
    a: b: while (true) {
      while (true) {
        count++;
        if (count > 2) break a;
      }
    }
    count
  "#;
  assert_eq!(realm.exec_script(source)?, Value::Number(3.0));
  Ok(())
}

#[test]
fn finally_abrupt_completion_overrides_try() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "try { return 1; } finally { return 2; }")?,
    Completion::Return(Value::Number(2.0))
  );
  assert_eq!(
    evaluate(&mut realm, "try { return 1; } finally { 3; }")?,
    Completion::Return(Value::Number(1.0))
  );
  assert_eq!(
    evaluate(&mut realm, "try { throw 1; } finally { return 2; }")?,
    Completion::Return(Value::Number(2.0))
  );
  Ok(())
}

#[test]
fn catch_binds_the_thrown_value() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "try { throw 1; } catch (e) { e + 1; }")?,
    Completion::Normal(Value::Number(2.0))
  );
  assert_eq!(
    evaluate(&mut realm, "try { throw { a: [5] }; } catch ({ a: [x] }) { x; }")?,
    Completion::Normal(Value::Number(5.0))
  );
  assert_eq!(
    evaluate(&mut realm, "var e = 1; try { throw 2; } catch (e) {} e")?,
    Completion::Normal(Value::Number(1.0))
  );
  Ok(())
}

#[test]
fn runtime_errors_are_catchable() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var caught;
    try { null.x; } catch (e) { caught = e instanceof TypeError; }
    caught
  "#;
  assert_eq!(realm.exec_script(source)?, Value::Bool(true));
  Ok(())
}

#[test]
fn statement_lists_keep_the_last_non_empty_value() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "1; if (true) {}")?,
    Completion::Normal(Value::Number(1.0))
  );
  assert_eq!(
    evaluate(&mut realm, "2; var x = 5;")?,
    Completion::Normal(Value::Number(2.0))
  );
  assert_eq!(
    evaluate(&mut realm, "3; do { 5; break; } while (false)")?,
    Completion::Normal(Value::Number(5.0))
  );
  assert_eq!(
    evaluate(&mut realm, "4; while (false) {}")?,
    Completion::Normal(Value::Number(4.0))
  );
  assert_eq!(evaluate(&mut realm, "if (false) 1;")?, Completion::empty());
  Ok(())
}

#[test]
fn loops_carry_the_last_body_value() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "for (var i = 0; i < 3; i++) i * 2;")?,
    Completion::Normal(Value::Number(4.0))
  );
  assert_eq!(
    evaluate(&mut realm, "var k = 0; while (k < 3) { k++; if (k === 2) continue; k; }")?,
    Completion::Normal(Value::Number(3.0))
  );
  Ok(())
}

#[test]
fn uncaught_throw_is_a_throw_completion() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let completion = evaluate(&mut realm, "1; throw new TypeError('boom'); 2;")?;
  let Completion::Throw(thrown) = completion else {
    panic!("expected a throw completion, got {completion:?}");
  };
  assert_eq!(realm.value_to_string(thrown)?, "TypeError: boom");

  match realm.exec_script("throw 'plain'") {
    Err(VmError::Throw(value)) => assert_eq!(realm.value_to_string(value)?, "plain"),
    other => panic!("expected an uncaught throw, got {other:?}"),
  }
  Ok(())
}

#[test]
fn for_in_skips_nullish_subjects() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    evaluate(&mut realm, "7; for (var k in null) { 1; }")?,
    Completion::Normal(Value::Number(7.0))
  );
  Ok(())
}
