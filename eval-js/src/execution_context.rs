//! The running execution context.
//!
//! One [`ExecutionContext`] exists per active script evaluation or function call. It borrows the
//! realm mutably for its lifetime, so the realm is driven by exactly one evaluation at a time, and
//! records the environments and `this` value the running code resolves against.

use crate::intrinsics::{Intrinsics, ObjectIntrinsic, StringIntrinsic};
use crate::property::PropertyKey;
use crate::{GcEnv, GcObject, GcString, Heap, Realm, Script, Value, Vm, VmError};

pub struct ExecutionContext<'r, 'a> {
  pub(crate) realm: &'r mut Realm,
  pub(crate) script: &'r Script<'a>,
  pub(crate) lexical_environment: GcEnv,
  pub(crate) variable_environment: GcEnv,
  pub(crate) this_value: Value,
  /// The function object being evaluated; `None` for script code.
  pub(crate) function: Option<GcObject>,
}

impl<'r, 'a> ExecutionContext<'r, 'a> {
  /// The context top-level script code runs in: global environment, `this` is the global object.
  pub(crate) fn for_script(realm: &'r mut Realm, script: &'r Script<'a>) -> Result<Self, VmError> {
    let global_env = realm.global_env()?;
    let global_object = realm.global_object()?;
    Ok(ExecutionContext {
      realm,
      script,
      lexical_environment: global_env,
      variable_environment: global_env,
      this_value: Value::Object(global_object),
      function: None,
    })
  }

  /// A child context for a function call, sharing this context's realm and script.
  pub(crate) fn for_call<'c>(
    &'c mut self,
    environment: GcEnv,
    this_value: Value,
    function: GcObject,
  ) -> ExecutionContext<'c, 'a> {
    ExecutionContext {
      realm: &mut *self.realm,
      script: self.script,
      lexical_environment: environment,
      variable_environment: environment,
      this_value,
      function: Some(function),
    }
  }

  pub fn realm(&self) -> &Realm {
    self.realm
  }

  pub fn realm_mut(&mut self) -> &mut Realm {
    self.realm
  }

  pub fn script(&self) -> &Script<'a> {
    self.script
  }

  pub fn lexical_environment(&self) -> GcEnv {
    self.lexical_environment
  }

  pub fn variable_environment(&self) -> GcEnv {
    self.variable_environment
  }

  pub fn this_value(&self) -> Value {
    self.this_value
  }

  pub fn function(&self) -> Option<GcObject> {
    self.function
  }

  pub fn heap(&self) -> &Heap {
    &self.realm.heap
  }

  pub fn heap_mut(&mut self) -> &mut Heap {
    &mut self.realm.heap
  }

  pub fn intrinsics(&self) -> &Intrinsics {
    &self.realm.intrinsics
  }

  pub(crate) fn vm_mut(&mut self) -> &mut Vm {
    &mut self.realm.vm
  }

  pub(crate) fn tick(&mut self) -> Result<(), VmError> {
    self.realm.vm.tick()
  }

  pub(crate) fn intrinsic(&self, key: ObjectIntrinsic) -> Result<GcObject, VmError> {
    self.realm.intrinsics.object(key)
  }

  pub(crate) fn key(&self, key: StringIntrinsic) -> Result<PropertyKey, VmError> {
    self.realm.intrinsics.key(key)
  }

  pub(crate) fn intern(&mut self, s: &str) -> Result<GcString, VmError> {
    self.realm.heap.alloc_string(s)
  }

  pub(crate) fn string_key(&mut self, s: &str) -> Result<PropertyKey, VmError> {
    Ok(PropertyKey::String(self.intern(s)?))
  }

  /// A new declarative environment whose outer environment is the running one.
  pub(crate) fn new_declarative_environment(&mut self) -> Result<GcEnv, VmError> {
    let outer = self.lexical_environment;
    self.realm.heap.alloc_declarative_env(Some(outer))
  }

  /// Runs `f` with `env` as the lexical environment, restoring the previous one afterwards on
  /// every exit path.
  pub(crate) fn with_lexical_environment<T>(
    &mut self,
    env: GcEnv,
    f: impl FnOnce(&mut Self) -> T,
  ) -> T {
    let old = std::mem::replace(&mut self.lexical_environment, env);
    let result = f(self);
    self.lexical_environment = old;
    result
  }
}
