use eval_js::{HeapLimits, Realm, Script, TerminationReason, Value, VmError, VmOptions};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Builds the node tree for `source`, whatever the parser thought of it.
fn build(source: &str, options: &VmOptions) -> Result<(), VmError> {
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
  Script::with_options(&ret.program, options).map(|_| ())
}

fn termination_reason(result: Result<Value, VmError>) -> TerminationReason {
  match result {
    Err(VmError::Termination(termination)) => termination.reason,
    other => panic!("expected termination, got {other:?}"),
  }
}

#[test]
fn fuel_bounds_each_evaluation() -> Result<(), VmError> {
  let mut realm = Realm::with_options(VmOptions {
    default_fuel: Some(1000),
    ..VmOptions::default()
  })?;
  assert_eq!(
    termination_reason(realm.exec_script("while (true) {}")),
    TerminationReason::OutOfFuel
  );
  // The budget is refilled for the next evaluation.
  assert_eq!(
    realm.exec_script("var n = 0; for (var i = 0; i < 10; i++) n += i; n")?,
    Value::Number(45.0)
  );
  Ok(())
}

#[test]
fn termination_is_not_catchable() -> Result<(), VmError> {
  let mut realm = Realm::with_options(VmOptions {
    default_fuel: Some(500),
    ..VmOptions::default()
  })?;
  let result = realm.exec_script("try { for (;;) {} } catch (e) {} finally { 'unreached'; }");
  assert_eq!(termination_reason(result), TerminationReason::OutOfFuel);
  Ok(())
}

#[test]
fn call_depth_is_bounded() -> Result<(), VmError> {
  let mut realm = Realm::with_options(VmOptions {
    max_stack_depth: 20,
    ..VmOptions::default()
  })?;
  assert_eq!(
    termination_reason(realm.exec_script("function f() { return f(); } f()")),
    TerminationReason::StackOverflow
  );
  assert_eq!(realm.vm().depth(), 0);
  let value = realm.exec_script("function g(n) { return n ? g(n - 1) : 'ok'; } g(10)")?;
  assert_eq!(realm.value_to_string(value)?, "ok");
  Ok(())
}

#[test]
fn default_limits_fit_a_small_thread_stack() {
  let worker = std::thread::Builder::new()
    .stack_size(2 * 1024 * 1024)
    .spawn(|| -> Result<(), VmError> {
      let options = VmOptions::default();
      let mut realm = Realm::with_options(options.clone())?;
      let value = realm.exec_script("function f(n) { return n == 0 ? 0 : f(n - 1) + 1; } f(200)")?;
      assert_eq!(value, Value::Number(200.0));
      match realm.exec_script("function g(n) { return n == 0 ? 0 : g(n - 1) + 1; } g(100000)") {
        Err(VmError::Termination(termination)) => {
          assert_eq!(termination.reason, TerminationReason::StackOverflow);
          assert_eq!(termination.depth, options.max_stack_depth);
        }
        other => panic!("expected a stack overflow termination, got {other:?}"),
      }

      let depth = 500;
      assert!(depth < options.max_syntax_depth);
      let nested = format!("{}{}.length", "[".repeat(depth), "]".repeat(depth));
      assert_eq!(realm.exec_script(&nested)?, Value::Number(1.0));
      let blocks = format!("{}1;{}", "{".repeat(200), "}".repeat(200));
      assert_eq!(realm.exec_script(&blocks)?, Value::Number(1.0));
      Ok(())
    })
    .unwrap();
  worker.join().unwrap().unwrap();
}

#[test]
fn heap_growth_is_bounded() -> Result<(), VmError> {
  let limits = HeapLimits::new(2 * 1024 * 1024);
  let options = VmOptions {
    heap_limits: limits,
    ..VmOptions::default()
  };

  let mut realm = Realm::with_options(options.clone())?;
  assert!(realm.heap().used_bytes() < limits.max_bytes);
  // Every iteration copies the loop environment.
  let result = realm.exec_script("for (let i = 0; i < 1000000; i++) {}");
  assert!(matches!(result, Err(VmError::OutOfMemory)));
  assert!(realm.heap().used_bytes() <= limits.max_bytes);

  let mut realm = Realm::with_options(options)?;
  let result = realm.exec_script(
    "var s = ''; try { for (let i = 0; i < 200000; i++) { s += i; } } catch (e) { 'caught' }",
  );
  assert!(matches!(result, Err(VmError::OutOfMemory)));

  assert!(matches!(
    Realm::with_options(VmOptions {
      heap_limits: HeapLimits::new(1024),
      ..VmOptions::default()
    }),
    Err(VmError::OutOfMemory)
  ));
  Ok(())
}

#[test]
fn syntactic_nesting_is_bounded() {
  let options = VmOptions {
    max_syntax_depth: 8,
    ..VmOptions::default()
  };
  let deep_blocks = format!("{}{}", "{".repeat(20), "}".repeat(20));
  assert!(matches!(build(&deep_blocks, &options), Err(VmError::NestingTooDeep(8))));

  let deep_parens = format!("{}1{}", "(".repeat(40), ")".repeat(40));
  assert!(matches!(build(&deep_parens, &options), Err(VmError::NestingTooDeep(8))));

  assert!(build("{ { 1; } }", &options).is_ok());
}

#[test]
fn labels_are_checked_when_the_tree_is_built() {
  let options = VmOptions::default();
  assert!(matches!(
    build("while (true) { break missing; }", &options),
    Err(VmError::UndefinedLabel(label)) if label == "missing"
  ));
  assert!(matches!(build("break;", &options), Err(VmError::IllegalBreak)));
  assert!(matches!(build("{ continue; }", &options), Err(VmError::IllegalContinue)));
  assert!(matches!(
    build("block: { while (true) { continue block; } }", &options),
    Err(VmError::IllegalContinue)
  ));
  assert!(matches!(
    build("a: { a: ; }", &options),
    Err(VmError::DuplicateLabel(label)) if label == "a"
  ));
  // Labels do not cross function boundaries.
  assert!(matches!(
    build("outer: while (true) { (function () { break outer; }); }", &options),
    Err(VmError::UndefinedLabel(_))
  ));
  assert!(build("a: { break a; } a: while (false) continue a;", &options).is_ok());
}

#[test]
fn unsupported_syntax_is_rejected_up_front() {
  let options = VmOptions::default();
  assert!(matches!(
    build("function* gen() {}", &options),
    Err(VmError::UnsupportedSyntax { kind: "generator function", .. })
  ));
  assert!(matches!(
    build("class A {}", &options),
    Err(VmError::UnsupportedSyntax { kind: "class declaration", .. })
  ));
  assert!(matches!(
    build("var x; ({ x } = { x: 1 });", &options),
    Err(VmError::UnsupportedSyntax { kind: "destructuring assignment", .. })
  ));
}

#[test]
fn parse_errors_surface_as_syntax_errors() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  match realm.exec_script("var = ;") {
    Err(VmError::Syntax(messages)) => assert!(!messages.is_empty()),
    other => panic!("expected a syntax error, got {other:?}"),
  }
  Ok(())
}

#[test]
fn closures_do_not_outlive_their_script() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  realm.exec_script("function f() { return 1; }")?;
  assert!(matches!(realm.exec_script("f()"), Err(VmError::Unimplemented(_))));
  assert_eq!(realm.exec_script("function g() { return 2; } g()")?, Value::Number(2.0));
  Ok(())
}
