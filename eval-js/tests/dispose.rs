use eval_js::{ObjectIntrinsic, Realm, Value, VmError};

#[test]
fn dispose_is_idempotent() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  assert!(!realm.is_disposed());
  realm.dispose();
  assert!(realm.is_disposed());
  assert!(realm.intrinsics().is_disposed());
  realm.dispose();
  assert!(realm.is_disposed());
  assert!(realm.heap().is_empty());
  Ok(())
}

#[test]
fn intrinsics_are_unavailable_after_dispose() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  realm.dispose();
  assert!(matches!(realm.intrinsics().get("%Array%"), Err(VmError::RealmDisposed)));
  assert!(matches!(
    realm.intrinsics().object(ObjectIntrinsic::ObjectPrototype),
    Err(VmError::RealmDisposed)
  ));
  assert!(matches!(realm.global_env(), Err(VmError::RealmDisposed)));
  assert!(matches!(realm.exec_script("1 + 1"), Err(VmError::RealmDisposed)));
  Ok(())
}

#[test]
fn handles_from_a_disposed_realm_are_invalid() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let Value::Object(array) = realm.exec_script("[1, 2, 3]")? else {
    panic!("expected an array object");
  };
  let Value::String(text) = realm.exec_script("'kept'")? else {
    panic!("expected a string");
  };
  let array_prototype = realm.intrinsics().array_prototype()?;
  assert_eq!(realm.heap().object_prototype(array)?, Some(array_prototype));

  realm.dispose();
  assert!(!realm.heap().is_valid_object(array));
  assert!(matches!(realm.heap().object_prototype(array), Err(VmError::InvalidHandle)));
  assert!(matches!(realm.heap().get_string(text), Err(VmError::InvalidHandle)));
  assert!(matches!(realm.value_to_string(Value::String(text)), Err(VmError::InvalidHandle)));
  Ok(())
}

#[test]
fn realms_are_independent() -> Result<(), VmError> {
  let mut first = Realm::new()?;
  let mut second = Realm::new()?;
  first.exec_script("var x = 1; let y = 2;")?;
  assert_eq!(first.exec_script("x + y")?, Value::Number(3.0));

  let kind = second.exec_script("typeof x + typeof y")?;
  assert_eq!(second.value_to_string(kind)?, "undefinedundefined");
  first.dispose();
  assert_eq!(second.exec_script("var z = 4; z")?, Value::Number(4.0));
  Ok(())
}
