use crate::heap::{HeapObject, BINDING_BYTES};
use crate::{GcEnv, GcObject, GcString, Heap, Value, VmError};

/// One binding of a declarative environment record.
#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
  pub name: GcString,
  pub value: Value,
  pub mutable: bool,
  /// `false` while the binding is in its temporal dead zone.
  pub initialized: bool,
}

/// An environment record.
///
/// Declarative records only hold `bindings`. The global record additionally has an object part
/// (`object`), the global object, which backs `var` and function declarations at script level.
#[derive(Debug, Clone)]
pub(crate) struct EnvRecord {
  pub(crate) outer: Option<GcEnv>,
  pub(crate) bindings: Vec<EnvBinding>,
  pub(crate) object: Option<GcObject>,
}

impl EnvRecord {
  fn find(&self, name: GcString) -> Option<usize> {
    self.bindings.iter().position(|b| b.name == name)
  }
}

/// The outcome of reading a binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingRead {
  Value(Value),
  /// The binding exists but has not been initialized yet (TDZ).
  Uninitialized,
  Missing,
}

/// The outcome of writing a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingWrite {
  Done,
  Uninitialized,
  Immutable,
  Missing,
}

impl Heap {
  pub fn alloc_declarative_env(&mut self, outer: Option<GcEnv>) -> Result<GcEnv, VmError> {
    if let Some(outer) = outer {
      self.get_env(outer)?;
    }
    Ok(GcEnv(self.alloc(HeapObject::Env(EnvRecord {
      outer,
      bindings: Vec::new(),
      object: None,
    }))?))
  }

  pub fn alloc_global_env(&mut self, global_object: GcObject) -> Result<GcEnv, VmError> {
    self.get_object(global_object)?;
    Ok(GcEnv(self.alloc(HeapObject::Env(EnvRecord {
      outer: None,
      bindings: Vec::new(),
      object: Some(global_object),
    }))?))
  }

  pub fn env_outer(&self, env: GcEnv) -> Result<Option<GcEnv>, VmError> {
    Ok(self.get_env(env)?.outer)
  }

  /// The global object if `env` is a global environment record.
  pub fn env_object(&self, env: GcEnv) -> Result<Option<GcObject>, VmError> {
    Ok(self.get_env(env)?.object)
  }

  /// Whether the declarative part of `env` has a binding for `name`.
  pub fn env_has_declarative_binding(&self, env: GcEnv, name: GcString) -> Result<bool, VmError> {
    Ok(self.get_env(env)?.find(name).is_some())
  }

  pub fn env_binding(&self, env: GcEnv, name: GcString) -> Result<Option<EnvBinding>, VmError> {
    let record = self.get_env(env)?;
    Ok(record.find(name).map(|idx| record.bindings[idx]))
  }

  /// Names of the declarative bindings of `env`, in creation order.
  pub fn env_binding_names(&self, env: GcEnv) -> Result<Vec<GcString>, VmError> {
    Ok(self.get_env(env)?.bindings.iter().map(|b| b.name).collect())
  }

  /// CreateMutableBinding / CreateImmutableBinding. The binding starts uninitialized; creating an
  /// existing name is a no-op.
  pub fn env_create_binding(
    &mut self,
    env: GcEnv,
    name: GcString,
    mutable: bool,
  ) -> Result<(), VmError> {
    if self.get_env(env)?.find(name).is_some() {
      return Ok(());
    }
    self.charge(BINDING_BYTES)?;
    self.get_env_mut(env)?.bindings.push(EnvBinding {
      name,
      value: Value::Undefined,
      mutable,
      initialized: false,
    });
    Ok(())
  }

  /// InitializeBinding. Missing bindings are created mutable.
  pub fn env_initialize_binding(
    &mut self,
    env: GcEnv,
    name: GcString,
    value: Value,
  ) -> Result<(), VmError> {
    if let Some(idx) = self.get_env(env)?.find(name) {
      let binding = &mut self.get_env_mut(env)?.bindings[idx];
      binding.value = value;
      binding.initialized = true;
      return Ok(());
    }
    self.charge(BINDING_BYTES)?;
    self.get_env_mut(env)?.bindings.push(EnvBinding {
      name,
      value,
      mutable: true,
      initialized: true,
    });
    Ok(())
  }

  pub fn env_get_binding_value(&self, env: GcEnv, name: GcString) -> Result<BindingRead, VmError> {
    Ok(match self.env_binding(env, name)? {
      Some(binding) if binding.initialized => BindingRead::Value(binding.value),
      Some(_) => BindingRead::Uninitialized,
      None => BindingRead::Missing,
    })
  }

  pub fn env_set_mutable_binding(
    &mut self,
    env: GcEnv,
    name: GcString,
    value: Value,
  ) -> Result<BindingWrite, VmError> {
    let record = self.get_env_mut(env)?;
    let Some(idx) = record.find(name) else {
      return Ok(BindingWrite::Missing);
    };
    let binding = &mut record.bindings[idx];
    if !binding.initialized {
      return Ok(BindingWrite::Uninitialized);
    }
    if !binding.mutable {
      return Ok(BindingWrite::Immutable);
    }
    binding.value = value;
    Ok(BindingWrite::Done)
  }
}
