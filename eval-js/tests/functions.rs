use eval_js::{Realm, Value, VmError};

fn exec_to_string(realm: &mut Realm, source: &str) -> Result<String, VmError> {
  let value = realm.exec_script(source)?;
  realm.value_to_string(value)
}

fn thrown_message(realm: &mut Realm, source: &str) -> String {
  match realm.exec_script(source) {
    Err(VmError::Throw(value)) => realm.value_to_string(value).unwrap(),
    other => panic!("expected {source:?} to throw, got {other:?}"),
  }
}

#[test]
fn arguments_object_reflects_the_call() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    realm.exec_script("function f() { return arguments.length + arguments[0]; } f(1, 2, 3)")?,
    Value::Number(4.0)
  );
  assert_eq!(
    realm.exec_script("function g(a) { a = 9; return arguments[0]; } g(1)")?,
    Value::Number(1.0)
  );
  Ok(())
}

#[test]
fn method_calls_bind_this_to_the_receiver() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var o = { n: 2, get: function () { return this.n; }, arrow: function () { return (() => this.n)(); } };
    o.get() + o.arrow()
  "#;
  assert_eq!(realm.exec_script(source)?, Value::Number(4.0));
  assert_eq!(
    realm.exec_script("function self() { return this; } self() === globalThis")?,
    Value::Bool(true)
  );
  Ok(())
}

#[test]
fn constructors_link_instances_to_their_prototype() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    function Point(x, y) { this.x = x; this.y = y; }
    Point.prototype.sum = function () { return this.x + this.y; };
    var p = new Point(3, 4);
    [p.sum(), p instanceof Point, p instanceof Object, Object.getPrototypeOf(p) === Point.prototype].join(",")
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "7,true,true,true");

  let source = r#"
    function Boxed() { this.a = 1; return { b: 2 }; }
    var b = new Boxed();
    typeof b.a + b.b
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "undefined2");
  Ok(())
}

#[test]
fn arrow_functions_are_not_constructors() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "var A = () => {}; new A();"),
    "TypeError: A is not a constructor"
  );
  Ok(())
}

#[test]
fn call_and_apply_forward_this_and_arguments() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    function add(a, b) { return this.base + a + b; }
    var ctx = { base: 1 };
    add.call(ctx, 2, 3) + add.apply({ base: 0 }, [1, 3])
  "#;
  assert_eq!(realm.exec_script(source)?, Value::Number(10.0));
  Ok(())
}

#[test]
fn default_and_rest_parameters() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    realm.exec_script("function f(a, b = a + 1, ...rest) { return a + b + rest.length; } f(1) + f(0, 0, 9)")?,
    Value::Number(4.0)
  );
  assert_eq!(
    realm.exec_script("function g({ x, y = 3 }, [z]) { return x + y + z; } g({ x: 1 }, [1])")?,
    Value::Number(5.0)
  );
  assert_eq!(realm.exec_script("(function (a, b, ...c) {}).length")?, Value::Number(2.0));
  Ok(())
}

#[test]
fn calling_a_non_function_names_the_callee() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "var o = {}; o.missing();"),
    "TypeError: o.missing is not a function"
  );
  assert_eq!(
    thrown_message(&mut realm, "var n = 1; n();"),
    "TypeError: n is not a function"
  );
  Ok(())
}

#[test]
fn recursion() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    realm.exec_script("function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15)")?,
    Value::Number(610.0)
  );
  Ok(())
}

#[test]
fn error_objects_carry_message_and_cause() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var e = new Error("outer", { cause: "inner" });
    [e.message, e.cause, e instanceof Error, "cause" in new Error("x")].join(",")
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "outer,inner,true,false");
  assert_eq!(exec_to_string(&mut realm, "String(new RangeError('r'))")?, "RangeError: r");
  assert_eq!(
    exec_to_string(&mut realm, "TypeError('called') instanceof TypeError")?,
    "true"
  );
  assert_eq!(exec_to_string(&mut realm, "new TypeError() instanceof Error")?, "true");
  Ok(())
}

#[test]
fn builtin_tags_and_conversions() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    exec_to_string(&mut realm, "Object.prototype.toString.call([])")?,
    "[object Array]"
  );
  assert_eq!(
    exec_to_string(&mut realm, "Object.prototype.toString.call(null)")?,
    "[object Null]"
  );
  assert_eq!(exec_to_string(&mut realm, "(255).toString(16)")?, "ff");
  assert_eq!(exec_to_string(&mut realm, "String(Symbol('s'))")?, "Symbol(s)");
  assert_eq!(
    thrown_message(&mut realm, "(1).toString(1)"),
    "RangeError: toString() radix must be between 2 and 36"
  );
  Ok(())
}

#[test]
fn typeof_covers_every_kind_of_value() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    [typeof undeclared, typeof null, typeof 1, typeof "", typeof true,
     typeof Symbol(), typeof {}, typeof function () {}, typeof Object].join(",")
  "#;
  assert_eq!(
    exec_to_string(&mut realm, source)?,
    "undefined,object,number,string,boolean,symbol,object,function,function"
  );
  Ok(())
}

#[test]
fn prototype_chains_are_guarded_against_cycles() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    thrown_message(&mut realm, "var a = {}; var b = Object.create(a); Object.setPrototypeOf(a, b);"),
    "TypeError: Cyclic __proto__ value"
  );
  Ok(())
}
