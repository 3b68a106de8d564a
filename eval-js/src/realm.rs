use crate::intrinsics::{global_bindings, Intrinsics, StringIntrinsic};
use crate::object::ObjectKind;
use crate::ops::number_to_string;
use crate::property::{PropertyDescriptor, PropertyKey};
use crate::source::parse_script;
use crate::{Completion, GcEnv, GcObject, Heap, Script, Value, Vm, VmError, VmOptions};
use oxc_allocator::Allocator;

/// An ECMAScript realm: the heap, the intrinsics, the global object and its environment.
///
/// A realm is driven by one evaluation at a time. [`Realm::dispose`] frees everything it
/// allocated; it also runs on drop.
#[derive(Debug)]
pub struct Realm {
  pub(crate) heap: Heap,
  pub(crate) intrinsics: Intrinsics,
  pub(crate) vm: Vm,
  global_object: GcObject,
  global_env: GcEnv,
  disposed: bool,
}

impl Realm {
  pub fn new() -> Result<Self, VmError> {
    Self::with_options(VmOptions::default())
  }

  pub fn with_options(options: VmOptions) -> Result<Self, VmError> {
    let _span = tracing::debug_span!("eval_js.realm.new").entered();
    let mut heap = Heap::new(options.heap_limits);
    let intrinsics = Intrinsics::build(&mut heap)?;
    let global_object = heap.alloc_object(Some(intrinsics.object_prototype()?), ObjectKind::Ordinary)?;
    let global_env = heap.alloc_global_env(global_object)?;
    let mut realm = Realm {
      heap,
      intrinsics,
      vm: Vm::new(options),
      global_object,
      global_env,
      disposed: false,
    };
    realm.install_globals()?;
    tracing::debug!(
      allocations = realm.heap.len(),
      bytes = realm.heap.used_bytes(),
      "realm ready"
    );
    Ok(realm)
  }

  /// Global value properties (`undefined`, `NaN`, `Infinity`), `globalThis` and every global
  /// constructor, namespace object and function.
  fn install_globals(&mut self) -> Result<(), VmError> {
    let global = self.global_object;
    for (name, value) in [
      ("undefined", Value::Undefined),
      ("NaN", Value::Number(f64::NAN)),
      ("Infinity", Value::Number(f64::INFINITY)),
    ] {
      let key = PropertyKey::String(self.heap.alloc_string(name)?);
      self.heap.define_property(global, key, PropertyDescriptor::frozen(value))?;
    }

    let global_this = self.intrinsics.key(StringIntrinsic::GlobalThis)?;
    self
      .heap
      .define_property(global, global_this, PropertyDescriptor::method(Value::Object(global)))?;

    for (intrinsic, name) in global_bindings() {
      let value = Value::Object(self.intrinsics.object(intrinsic)?);
      let key = PropertyKey::String(self.heap.alloc_string(name)?);
      self.heap.define_property(global, key, PropertyDescriptor::method(value))?;
    }
    Ok(())
  }

  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  pub fn heap_mut(&mut self) -> &mut Heap {
    &mut self.heap
  }

  pub fn intrinsics(&self) -> &Intrinsics {
    &self.intrinsics
  }

  pub fn vm(&self) -> &Vm {
    &self.vm
  }

  pub fn vm_mut(&mut self) -> &mut Vm {
    &mut self.vm
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed
  }

  fn check_live(&self) -> Result<(), VmError> {
    if self.disposed {
      Err(VmError::RealmDisposed)
    } else {
      Ok(())
    }
  }

  pub fn global_object(&self) -> Result<GcObject, VmError> {
    self.check_live()?;
    Ok(self.global_object)
  }

  pub fn global_env(&self) -> Result<GcEnv, VmError> {
    self.check_live()?;
    Ok(self.global_env)
  }

  /// Clears the intrinsic registry and frees every heap allocation. Every handle obtained from
  /// this realm is invalid afterwards. Idempotent.
  pub fn dispose(&mut self) {
    if self.disposed {
      return;
    }
    let allocations = self.heap.len();
    self.intrinsics.dispose();
    self.heap.clear();
    self.disposed = true;
    tracing::debug!(allocations, "realm disposed");
  }

  /// Parses, builds and evaluates `source` as a script. An uncaught exception is returned as
  /// [`VmError::Throw`]; an empty completion value reads as `undefined`.
  pub fn exec_script(&mut self, source: &str) -> Result<Value, VmError> {
    self.check_live()?;
    let allocator = Allocator::default();
    let program = parse_script(&allocator, source)?;
    let script = Script::with_options(program, self.vm.options())?;
    match script.evaluate(self)? {
      Completion::Throw(thrown) => Err(VmError::Throw(thrown)),
      completion => Ok(completion.value().or_undefined()),
    }
  }

  /// Renders `value` for the host without running any script code. Errors show as
  /// `name: message`, other objects by their builtin tag.
  pub fn value_to_string(&mut self, value: Value) -> Result<String, VmError> {
    Ok(match value {
      Value::Empty => String::new(),
      Value::Undefined => "undefined".to_string(),
      Value::Null => "null".to_string(),
      Value::Bool(b) => b.to_string(),
      Value::Number(n) => number_to_string(n),
      Value::String(s) => self.heap.get_string(s)?.to_utf8_lossy(),
      Value::Symbol(sym) => {
        let description = match self.heap.get_symbol(sym)?.description() {
          Some(s) => self.heap.get_string(s)?.to_utf8_lossy(),
          None => String::new(),
        };
        format!("Symbol({description})")
      }
      Value::Object(obj) => match self.heap.object_kind(obj)? {
        ObjectKind::Error => {
          let name = self.heap.get_by_name(obj, "name")?;
          let message = self.heap.get_by_name(obj, "message")?;
          let name = self.value_to_string(name)?;
          let message = self.value_to_string(message)?;
          if message.is_empty() {
            name
          } else {
            format!("{name}: {message}")
          }
        }
        kind => format!("[object {}]", kind.builtin_tag()),
      },
    })
  }
}

impl Drop for Realm {
  fn drop(&mut self) {
    self.dispose();
  }
}

#[cfg(test)]
mod tests {
  use super::Realm;
  use crate::{Value, VmError};

  #[test]
  fn global_object_inherits_from_object_prototype() {
    let realm = Realm::new().unwrap();
    let global = realm.global_object().unwrap();
    assert_eq!(
      realm.heap().object_prototype(global).unwrap(),
      Some(realm.intrinsics().object_prototype().unwrap())
    );
  }

  #[test]
  fn disposed_realm_rejects_use() {
    let mut realm = Realm::new().unwrap();
    realm.dispose();
    realm.dispose();
    assert!(realm.heap().is_empty());
    assert!(matches!(realm.global_object(), Err(VmError::RealmDisposed)));
    assert!(matches!(realm.exec_script("1"), Err(VmError::RealmDisposed)));
  }

  #[test]
  fn value_to_string_renders_primitives() {
    let mut realm = Realm::new().unwrap();
    assert_eq!(realm.value_to_string(Value::Number(1.5)).unwrap(), "1.5");
    assert_eq!(realm.value_to_string(Value::Bool(false)).unwrap(), "false");
    let value = realm.exec_script("'a' + 1").unwrap();
    assert_eq!(realm.value_to_string(value).unwrap(), "a1");
  }
}
