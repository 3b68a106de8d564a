use eval_js::{Intrinsic, ObjectIntrinsic, Realm, StringIntrinsic, SymbolIntrinsic, Value, VmError};

#[test]
fn every_intrinsic_resolves_after_construction() -> Result<(), VmError> {
  let realm = Realm::new()?;
  for key in Intrinsic::all() {
    let by_key = realm.intrinsics().get_intrinsic(key)?;
    let by_name = realm.intrinsics().get(key.name())?;
    assert_eq!(by_key, by_name, "{} resolves inconsistently", key.name());
  }
  assert!(matches!(
    realm.intrinsics().get("%NotAnIntrinsic%"),
    Err(VmError::UnknownIntrinsic(name)) if name == "%NotAnIntrinsic%"
  ));
  Ok(())
}

#[test]
fn intrinsic_identity_is_stable() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let first = realm.intrinsics().get("%Array%")?;
  realm.exec_script("var a = [1, 2]; a.push(3);")?;
  assert_eq!(realm.intrinsics().get("%Array%")?, first);
  assert_eq!(realm.exec_script("Array")?, first);
  Ok(())
}

#[test]
fn aliases_are_the_installed_methods() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let to_string = realm.intrinsics().get("%ObjProto_toString%")?;
  let object_prototype = realm.intrinsics().object_prototype()?;
  let key = realm.intrinsics().key(StringIntrinsic::ToString)?;
  assert_eq!(realm.heap().get(object_prototype, &key)?, to_string);
  assert_eq!(realm.exec_script("Object.prototype.toString")?, to_string);

  let values = realm.intrinsics().get("%ArrayProto_values%")?;
  let array_prototype = realm.intrinsics().array_prototype()?;
  let iterator_key = realm.intrinsics().symbol_key(SymbolIntrinsic::Iterator)?;
  assert_eq!(realm.heap().get(array_prototype, &iterator_key)?, values);
  assert_eq!(
    realm.exec_script("Array.prototype[Symbol.iterator] === Array.prototype.values")?,
    Value::Bool(true)
  );
  assert_eq!(
    realm.exec_script("Symbol.iterator")?,
    Value::Symbol(realm.intrinsics().symbol(SymbolIntrinsic::Iterator)?)
  );
  Ok(())
}

#[test]
fn every_prototype_chain_reaches_null() -> Result<(), VmError> {
  let realm = Realm::new()?;
  let object_prototype = realm.intrinsics().object_prototype()?;
  assert_eq!(realm.heap().object_prototype(object_prototype)?, None);

  for key in Intrinsic::all() {
    let Value::Object(mut current) = realm.intrinsics().get_intrinsic(key)? else {
      continue;
    };
    let mut steps = 0;
    while let Some(parent) = realm.heap().object_prototype(current)? {
      current = parent;
      steps += 1;
      assert!(steps < 16, "{} has a runaway prototype chain", key.name());
    }
    assert_eq!(current, object_prototype, "{} does not reach %ObjectPrototype%", key.name());
  }
  Ok(())
}

#[test]
fn constructors_and_prototypes_are_linked() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let source = r#"
    [Function.prototype.constructor === Function,
     Object.getPrototypeOf(Function) === Function.prototype,
     Object.getPrototypeOf(TypeError) === Error,
     Object.getPrototypeOf(TypeError.prototype) === Error.prototype,
     Object.getPrototypeOf(Int8Array.prototype) === Object.getPrototypeOf(Uint8Array.prototype),
     Array.prototype.push.name, Array.prototype.push.length].join()
  "#;
  let value = realm.exec_script(source)?;
  assert_eq!(
    realm.value_to_string(value)?,
    "true,true,true,true,true,push,1"
  );
  Ok(())
}

#[test]
fn throw_type_error_is_non_extensible() -> Result<(), VmError> {
  let realm = Realm::new()?;
  let thrower = realm.intrinsics().object(ObjectIntrinsic::ThrowTypeError)?;
  assert!(!realm.heap().object_is_extensible(thrower)?);
  assert!(realm.heap().is_callable(Value::Object(thrower))?);
  let length = realm.intrinsics().key(StringIntrinsic::Length)?;
  let desc = realm
    .heap()
    .get_own_property(thrower, &length)?
    .expect("length property");
  assert!(!desc.configurable);
  Ok(())
}

#[test]
fn unimplemented_builtins_exist_but_throw() -> Result<(), VmError> {
  let mut realm = Realm::new()?;
  let kind = realm.exec_script("typeof JSON.stringify")?;
  assert_eq!(realm.value_to_string(kind)?, "function");
  match realm.exec_script("JSON.stringify({})") {
    Err(VmError::Throw(value)) => {
      let message = realm.value_to_string(value)?;
      assert!(message.starts_with("TypeError:"), "{message}");
    }
    other => panic!("expected a TypeError, got {other:?}"),
  }
  Ok(())
}

#[test]
fn separate_realms_have_separate_intrinsics() -> Result<(), VmError> {
  let mut a = Realm::new()?;
  let mut b = Realm::new()?;
  a.exec_script("Array.prototype.extra = 1;")?;
  assert_eq!(a.exec_script("[].extra")?, Value::Number(1.0));
  assert_eq!(b.exec_script("[].extra")?, Value::Undefined);
  Ok(())
}
