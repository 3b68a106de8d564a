use eval_js::{Realm, Value, VmError};

fn exec_to_string(realm: &mut Realm, source: &str) -> Result<String, VmError> {
  let value = realm.exec_script(source)?;
  realm.value_to_string(value)
}

const COUNTING_ITERABLE: &str = r#"
  var log = [];
  var iterable = {};
  iterable[Symbol.iterator] = function () {
    var i = 0;
    return {
      next: function () { i++; return { value: i * 10, done: i > 5 }; },
      return: function () { log.push("return"); return {}; },
    };
  };
"#;

#[test]
fn breaking_out_of_for_of_closes_the_iterator() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    r#"{COUNTING_ITERABLE}
    var sum = 0;
    for (var x of iterable) {{ sum += x; if (x === 20) break; }}
    sum + log.length"#
  );
  assert_eq!(realm.exec_script(&source)?, Value::Number(31.0));
  Ok(())
}

#[test]
fn exhausted_iterators_are_not_closed() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    r#"{COUNTING_ITERABLE}
    var sum = 0;
    for (var x of iterable) sum += x;
    sum + log.length"#
  );
  assert_eq!(realm.exec_script(&source)?, Value::Number(150.0));
  Ok(())
}

#[test]
fn throwing_out_of_for_of_closes_and_keeps_the_original_error() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = format!(
    r#"{COUNTING_ITERABLE}
    var caught;
    try {{ for (var x of iterable) throw "body"; }} catch (e) {{ caught = e; }}
    caught + ":" + log.join()"#
  );
  assert_eq!(exec_to_string(&mut realm, &source)?, "body:return");
  Ok(())
}

#[test]
fn for_of_over_a_non_iterable_throws() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  match realm.exec_script("for (var x of {}) {}") {
    Err(VmError::Throw(value)) => {
      let message = realm.value_to_string(value)?;
      assert!(message.starts_with("TypeError:"), "{message}");
    }
    other => panic!("expected a TypeError, got {other:?}"),
  }
  Ok(())
}

#[test]
fn destructuring_declarations() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(
    realm.exec_script("var [a, , b = 5, ...c] = [1, 2, undefined, 7, 8]; a + b + c.length")?,
    Value::Number(8.0)
  );
  assert_eq!(
    realm.exec_script("var { p, q: { r }, ...others } = { p: 1, q: { r: 2 }, s: 1, t: 1 }; p + r + Object.keys(others).length")?,
    Value::Number(5.0)
  );
  assert_eq!(
    exec_to_string(&mut realm, "let [first, second] = 'hi'; second + first")?,
    "ih"
  );
  Ok(())
}

#[test]
fn for_in_visits_indices_then_insertion_order_then_inherited() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var proto = { inherited: 1, b: 0 };
    var o = Object.create(proto);
    o.b = 1; o[2] = 1; o.a = 1; o[0] = 1;
    var keys = [];
    for (var k in o) keys.push(k);
    keys.join(",")
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "0,2,b,a,inherited");
  Ok(())
}

#[test]
fn for_in_skips_properties_deleted_during_iteration() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var o = { a: 1, b: 2, c: 3 };
    var seen = "";
    for (var k in o) { seen += k; delete o.b; }
    seen
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "ac");
  Ok(())
}

#[test]
fn strings_iterate_by_code_point() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var count = 0;
    for (var ch of "a😀b") count++;
    count + "/" + "a😀b".length
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "3/4");
  Ok(())
}

#[test]
fn array_iterators_yield_keys_values_and_entries() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var out = [];
    for (var k of ["x", "y"].keys()) out.push(k);
    for (var [i, v] of ["x", "y"].entries()) out.push(i + v);
    out.join(",")
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "0,1,0x,1y");
  Ok(())
}

#[test]
fn spread_and_holes_in_array_literals() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert_eq!(realm.exec_script("[0, ...[1, 2], ...'ab'].length")?, Value::Number(5.0));
  assert_eq!(realm.exec_script("1 in [1, , 3]")?, Value::Bool(false));
  assert_eq!(realm.exec_script("[1, , 3].length")?, Value::Number(3.0));
  assert_eq!(realm.exec_script("[, ].length")?, Value::Number(1.0));
  assert_eq!(
    realm.exec_script("function sum(a, b, c) { return a + b + c; } sum(...[1, 2], 3)")?,
    Value::Number(6.0)
  );
  Ok(())
}

#[test]
fn array_builtins_follow_length() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    var a = [];
    a.push(1, 2, 3);
    var popped = a.pop();
    var total = 0;
    a.forEach(function (x, i) { total += x * 10 + i; });
    [popped, a.length, total, a.indexOf(2), a.indexOf(9), Array.isArray(a)].join(",")
  "#;
  assert_eq!(exec_to_string(&mut realm, source)?, "3,2,31,1,-1,true");
  assert_eq!(exec_to_string(&mut realm, "new Array(3).length + ':' + Array(1, 2).join('-')")?, "3:1-2");
  Ok(())
}
