//! The realm's intrinsic registry.
//!
//! Every well-known object, function, symbol, primitive singleton and pre-interned property-key
//! string is addressed by a closed name enum and resolves to one stable handle for the realm's
//! lifetime. Aliases such as `%ObjProto_toString%` are the very objects installed on their
//! owners, never copies.

use crate::builtins::NativeFunction;
use crate::function::CallHandler;
use crate::object::{IterationKind, ObjectKind};
use crate::property::{PropertyDescriptor, PropertyKey};
use crate::{GcObject, GcString, GcSymbol, Heap, Value, VmError};

macro_rules! intrinsic_names {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $($variant:ident => $key:literal,)*
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name {
      $($variant,)*
    }

    impl $name {
      pub const ALL: &'static [$name] = &[$($name::$variant,)*];
      pub const COUNT: usize = Self::ALL.len();

      /// The name this intrinsic is known by, e.g. `%ObjectPrototype%`.
      pub fn name(self) -> &'static str {
        match self {
          $($name::$variant => $key,)*
        }
      }

      pub fn from_name(name: &str) -> Option<Self> {
        match name {
          $($key => Some($name::$variant),)*
          _ => None,
        }
      }

      fn slot(self) -> usize {
        self as usize
      }
    }
  };
}

intrinsic_names! {
  /// Well-known intrinsic objects (functions included).
  pub enum ObjectIntrinsic {
    Array => "%Array%",
    ArrayBuffer => "%ArrayBuffer%",
    ArrayBufferPrototype => "%ArrayBufferPrototype%",
    ArrayIteratorPrototype => "%ArrayIteratorPrototype%",
    ArrayPrototype => "%ArrayPrototype%",
    ArrayProtoEntries => "%ArrayProto_entries%",
    ArrayProtoForEach => "%ArrayProto_forEach%",
    ArrayProtoKeys => "%ArrayProto_keys%",
    ArrayProtoValues => "%ArrayProto_values%",
    AsyncFromSyncIteratorPrototype => "%AsyncFromSyncIteratorPrototype%",
    AsyncFunction => "%AsyncFunction%",
    AsyncFunctionPrototype => "%AsyncFunctionPrototype%",
    AsyncGenerator => "%AsyncGenerator%",
    AsyncGeneratorFunction => "%AsyncGeneratorFunction%",
    AsyncGeneratorPrototype => "%AsyncGeneratorPrototype%",
    AsyncIteratorPrototype => "%AsyncIteratorPrototype%",
    Atomics => "%Atomics%",
    BigInt => "%BigInt%",
    BigIntPrototype => "%BigIntPrototype%",
    BigInt64Array => "%BigInt64Array%",
    BigInt64ArrayPrototype => "%BigInt64ArrayPrototype%",
    BigUint64Array => "%BigUint64Array%",
    BigUint64ArrayPrototype => "%BigUint64ArrayPrototype%",
    Boolean => "%Boolean%",
    BooleanPrototype => "%BooleanPrototype%",
    DataView => "%DataView%",
    DataViewPrototype => "%DataViewPrototype%",
    Date => "%Date%",
    DatePrototype => "%DatePrototype%",
    DecodeUri => "%decodeURI%",
    DecodeUriComponent => "%decodeURIComponent%",
    EncodeUri => "%encodeURI%",
    EncodeUriComponent => "%encodeURIComponent%",
    Error => "%Error%",
    ErrorPrototype => "%ErrorPrototype%",
    Eval => "%eval%",
    EvalError => "%EvalError%",
    EvalErrorPrototype => "%EvalErrorPrototype%",
    Float32Array => "%Float32Array%",
    Float32ArrayPrototype => "%Float32ArrayPrototype%",
    Float64Array => "%Float64Array%",
    Float64ArrayPrototype => "%Float64ArrayPrototype%",
    Function => "%Function%",
    FunctionPrototype => "%FunctionPrototype%",
    Generator => "%Generator%",
    GeneratorFunction => "%GeneratorFunction%",
    GeneratorPrototype => "%GeneratorPrototype%",
    Int8Array => "%Int8Array%",
    Int8ArrayPrototype => "%Int8ArrayPrototype%",
    Int16Array => "%Int16Array%",
    Int16ArrayPrototype => "%Int16ArrayPrototype%",
    Int32Array => "%Int32Array%",
    Int32ArrayPrototype => "%Int32ArrayPrototype%",
    IsFinite => "%isFinite%",
    IsNaN => "%isNaN%",
    IteratorPrototype => "%IteratorPrototype%",
    Json => "%JSON%",
    JsonParse => "%JSONParse%",
    JsonStringify => "%JSONStringify%",
    Map => "%Map%",
    MapIteratorPrototype => "%MapIteratorPrototype%",
    MapPrototype => "%MapPrototype%",
    Math => "%Math%",
    Number => "%Number%",
    NumberPrototype => "%NumberPrototype%",
    Object => "%Object%",
    ObjectPrototype => "%ObjectPrototype%",
    ObjProtoToString => "%ObjProto_toString%",
    ObjProtoValueOf => "%ObjProto_valueOf%",
    ParseFloat => "%parseFloat%",
    ParseInt => "%parseInt%",
    Promise => "%Promise%",
    PromisePrototype => "%PromisePrototype%",
    PromiseProtoThen => "%PromiseProto_then%",
    PromiseAll => "%Promise_all%",
    PromiseReject => "%Promise_reject%",
    PromiseResolve => "%Promise_resolve%",
    Proxy => "%Proxy%",
    RangeError => "%RangeError%",
    RangeErrorPrototype => "%RangeErrorPrototype%",
    ReferenceError => "%ReferenceError%",
    ReferenceErrorPrototype => "%ReferenceErrorPrototype%",
    Reflect => "%Reflect%",
    RegExp => "%RegExp%",
    RegExpPrototype => "%RegExpPrototype%",
    RegExpStringIteratorPrototype => "%RegExpStringIteratorPrototype%",
    Set => "%Set%",
    SetIteratorPrototype => "%SetIteratorPrototype%",
    SetPrototype => "%SetPrototype%",
    SharedArrayBuffer => "%SharedArrayBuffer%",
    SharedArrayBufferPrototype => "%SharedArrayBufferPrototype%",
    String => "%String%",
    StringIteratorPrototype => "%StringIteratorPrototype%",
    StringPrototype => "%StringPrototype%",
    Symbol => "%Symbol%",
    SymbolPrototype => "%SymbolPrototype%",
    SyntaxError => "%SyntaxError%",
    SyntaxErrorPrototype => "%SyntaxErrorPrototype%",
    ThrowTypeError => "%ThrowTypeError%",
    TypedArray => "%TypedArray%",
    TypedArrayPrototype => "%TypedArrayPrototype%",
    TypeError => "%TypeError%",
    TypeErrorPrototype => "%TypeErrorPrototype%",
    Uint8Array => "%Uint8Array%",
    Uint8ArrayPrototype => "%Uint8ArrayPrototype%",
    Uint8ClampedArray => "%Uint8ClampedArray%",
    Uint8ClampedArrayPrototype => "%Uint8ClampedArrayPrototype%",
    Uint16Array => "%Uint16Array%",
    Uint16ArrayPrototype => "%Uint16ArrayPrototype%",
    Uint32Array => "%Uint32Array%",
    Uint32ArrayPrototype => "%Uint32ArrayPrototype%",
    UriError => "%URIError%",
    UriErrorPrototype => "%URIErrorPrototype%",
    WeakMap => "%WeakMap%",
    WeakMapPrototype => "%WeakMapPrototype%",
    WeakSet => "%WeakSet%",
    WeakSetPrototype => "%WeakSetPrototype%",
  }
}

intrinsic_names! {
  /// The well-known symbols.
  pub enum SymbolIntrinsic {
    AsyncIterator => "@@asyncIterator",
    HasInstance => "@@hasInstance",
    IsConcatSpreadable => "@@isConcatSpreadable",
    Iterator => "@@iterator",
    Match => "@@match",
    MatchAll => "@@matchAll",
    Replace => "@@replace",
    Search => "@@search",
    Species => "@@species",
    Split => "@@split",
    ToPrimitive => "@@toPrimitive",
    ToStringTag => "@@toStringTag",
    Unscopables => "@@unscopables",
  }
}

intrinsic_names! {
  /// Primitive singletons.
  pub enum PrimitiveIntrinsic {
    Empty => "empty",
    Undefined => "undefined",
    Null => "null",
    True => "true",
    False => "false",
    NaN => "NaN",
    Infinity => "Infinity",
    NegativeInfinity => "-Infinity",
    Zero => "0",
    NegativeZero => "-0",
  }
}

intrinsic_names! {
  /// Pre-interned strings used as property keys by the engine and the built-ins.
  pub enum StringIntrinsic {
    EmptyString => "",
    Apply => "apply",
    Arguments => "arguments",
    Call => "call",
    Callee => "callee",
    Caller => "caller",
    Cause => "cause",
    Configurable => "configurable",
    Constructor => "constructor",
    Default => "default",
    Description => "description",
    Done => "done",
    Entries => "entries",
    Enumerable => "enumerable",
    Flags => "flags",
    ForEach => "forEach",
    Get => "get",
    Global => "global",
    GlobalThis => "globalThis",
    HasOwnProperty => "hasOwnProperty",
    Index => "index",
    Input => "input",
    Join => "join",
    Keys => "keys",
    LastIndex => "lastIndex",
    Length => "length",
    Message => "message",
    Name => "name",
    Next => "next",
    Prototype => "prototype",
    Push => "push",
    Raw => "raw",
    Return => "return",
    Set => "set",
    Source => "source",
    Then => "then",
    Throw => "throw",
    ToString => "toString",
    Value => "value",
    ValueOf => "valueOf",
    Values => "values",
    Writable => "writable",
  }
}

/// Any intrinsic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
  Object(ObjectIntrinsic),
  Symbol(SymbolIntrinsic),
  Primitive(PrimitiveIntrinsic),
  String(StringIntrinsic),
}

impl Intrinsic {
  pub fn from_name(name: &str) -> Option<Self> {
    if let Some(key) = ObjectIntrinsic::from_name(name) {
      return Some(Intrinsic::Object(key));
    }
    if let Some(key) = SymbolIntrinsic::from_name(name) {
      return Some(Intrinsic::Symbol(key));
    }
    if let Some(key) = PrimitiveIntrinsic::from_name(name) {
      return Some(Intrinsic::Primitive(key));
    }
    StringIntrinsic::from_name(name).map(Intrinsic::String)
  }

  pub fn name(self) -> &'static str {
    match self {
      Intrinsic::Object(key) => key.name(),
      Intrinsic::Symbol(key) => key.name(),
      Intrinsic::Primitive(key) => key.name(),
      Intrinsic::String(key) => key.name(),
    }
  }

  /// Every intrinsic, objects first.
  pub fn all() -> impl Iterator<Item = Intrinsic> {
    let objects = ObjectIntrinsic::ALL.iter().copied().map(Intrinsic::Object);
    let symbols = SymbolIntrinsic::ALL.iter().copied().map(Intrinsic::Symbol);
    let primitives = PrimitiveIntrinsic::ALL.iter().copied().map(Intrinsic::Primitive);
    let strings = StringIntrinsic::ALL.iter().copied().map(Intrinsic::String);
    objects.chain(symbols).chain(primitives).chain(strings)
  }
}

/// The intrinsic registry of one realm.
#[derive(Debug)]
pub struct Intrinsics {
  objects: Vec<Option<GcObject>>,
  symbols: Vec<Option<GcSymbol>>,
  primitives: Vec<Option<Value>>,
  strings: Vec<Option<GcString>>,
  disposed: bool,
}

impl Intrinsics {
  fn empty() -> Self {
    Self {
      objects: vec![None; ObjectIntrinsic::COUNT],
      symbols: vec![None; SymbolIntrinsic::COUNT],
      primitives: vec![None; PrimitiveIntrinsic::COUNT],
      strings: vec![None; StringIntrinsic::COUNT],
      disposed: false,
    }
  }

  /// Builds every intrinsic on `heap`.
  pub(crate) fn build(heap: &mut Heap) -> Result<Self, VmError> {
    let _span = tracing::debug_span!("eval_js.intrinsics.build").entered();
    let mut builder = Builder {
      heap,
      intrinsics: Intrinsics::empty(),
    };
    builder.init_primitives_strings_and_symbols()?;
    tracing::trace!(phase = 1, "primitives, strings and well-known symbols ready");
    builder.init_fundamental_prototypes()?;
    tracing::trace!(phase = 2, "fundamental prototypes ready");
    builder.init_objects()?;
    tracing::trace!(phase = 3, "constructors and prototypes wired");
    builder.init_aliases()?;
    tracing::trace!(phase = 4, "aliases resolved");
    Ok(builder.intrinsics)
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed
  }

  /// Clears every slot. Subsequent lookups fail with [`VmError::RealmDisposed`]. Idempotent.
  pub fn dispose(&mut self) {
    if self.disposed {
      return;
    }
    self.objects.iter_mut().for_each(|slot| *slot = None);
    self.symbols.iter_mut().for_each(|slot| *slot = None);
    self.primitives.iter_mut().for_each(|slot| *slot = None);
    self.strings.iter_mut().for_each(|slot| *slot = None);
    self.disposed = true;
  }

  fn check_live(&self) -> Result<(), VmError> {
    if self.disposed {
      Err(VmError::RealmDisposed)
    } else {
      Ok(())
    }
  }

  /// Looks an intrinsic up by name (`"%Array%"`, `"@@iterator"`, `"NaN"`, `"length"`, ...).
  pub fn get(&self, name: &str) -> Result<Value, VmError> {
    let key = Intrinsic::from_name(name).ok_or_else(|| VmError::UnknownIntrinsic(name.to_string()))?;
    self.get_intrinsic(key)
  }

  pub fn get_intrinsic(&self, key: Intrinsic) -> Result<Value, VmError> {
    Ok(match key {
      Intrinsic::Object(key) => Value::Object(self.object(key)?),
      Intrinsic::Symbol(key) => Value::Symbol(self.symbol(key)?),
      Intrinsic::Primitive(key) => self.primitive(key)?,
      Intrinsic::String(key) => Value::String(self.string(key)?),
    })
  }

  pub fn object(&self, key: ObjectIntrinsic) -> Result<GcObject, VmError> {
    self.check_live()?;
    self.objects[key.slot()].ok_or(VmError::IntrinsicNotInitialized(key.name()))
  }

  pub fn symbol(&self, key: SymbolIntrinsic) -> Result<GcSymbol, VmError> {
    self.check_live()?;
    self.symbols[key.slot()].ok_or(VmError::IntrinsicNotInitialized(key.name()))
  }

  pub fn primitive(&self, key: PrimitiveIntrinsic) -> Result<Value, VmError> {
    self.check_live()?;
    self.primitives[key.slot()].ok_or(VmError::IntrinsicNotInitialized(key.name()))
  }

  pub fn string(&self, key: StringIntrinsic) -> Result<GcString, VmError> {
    self.check_live()?;
    self.strings[key.slot()].ok_or(VmError::IntrinsicNotInitialized(key.name()))
  }

  /// A pre-interned string as a property key.
  pub fn key(&self, key: StringIntrinsic) -> Result<PropertyKey, VmError> {
    Ok(PropertyKey::String(self.string(key)?))
  }

  /// A well-known symbol as a property key.
  pub fn symbol_key(&self, key: SymbolIntrinsic) -> Result<PropertyKey, VmError> {
    Ok(PropertyKey::Symbol(self.symbol(key)?))
  }

  pub fn object_prototype(&self) -> Result<GcObject, VmError> {
    self.object(ObjectIntrinsic::ObjectPrototype)
  }

  pub fn function_prototype(&self) -> Result<GcObject, VmError> {
    self.object(ObjectIntrinsic::FunctionPrototype)
  }

  pub fn array_prototype(&self) -> Result<GcObject, VmError> {
    self.object(ObjectIntrinsic::ArrayPrototype)
  }

  fn set_object(&mut self, key: ObjectIntrinsic, obj: GcObject) -> Result<(), VmError> {
    let slot = &mut self.objects[key.slot()];
    if slot.is_some() {
      return Err(VmError::IntrinsicReassigned(key.name()));
    }
    *slot = Some(obj);
    Ok(())
  }
}

use NativeFunction as N;
use ObjectIntrinsic as O;

/// A constructor/prototype pair created in phase 3.
struct ClassSpec {
  constructor: ObjectIntrinsic,
  prototype: Option<ObjectIntrinsic>,
  name: &'static str,
  length: u32,
  native: NativeFunction,
  /// `[[Prototype]]` of the constructor and of the prototype object.
  parents: (ObjectIntrinsic, ObjectIntrinsic),
}

impl ClassSpec {
  const fn new(
    constructor: ObjectIntrinsic,
    prototype: ObjectIntrinsic,
    name: &'static str,
    length: u32,
    native: NativeFunction,
  ) -> Self {
    Self {
      constructor,
      prototype: Some(prototype),
      name,
      length,
      native,
      parents: (O::FunctionPrototype, O::ObjectPrototype),
    }
  }

  const fn inherits(self, constructor_parent: ObjectIntrinsic, prototype_parent: ObjectIntrinsic) -> Self {
    Self {
      parents: (constructor_parent, prototype_parent),
      ..self
    }
  }
}

const fn unsupported_class(
  constructor: ObjectIntrinsic,
  prototype: ObjectIntrinsic,
  name: &'static str,
  length: u32,
) -> ClassSpec {
  ClassSpec::new(constructor, prototype, name, length, N::UnsupportedConstructor(name))
}

const fn native_error(constructor: ObjectIntrinsic, prototype: ObjectIntrinsic, name: &'static str) -> ClassSpec {
  ClassSpec::new(constructor, prototype, name, 1, N::ErrorConstructor(prototype)).inherits(O::Error, O::ErrorPrototype)
}

const fn typed_array(constructor: ObjectIntrinsic, prototype: ObjectIntrinsic, name: &'static str) -> ClassSpec {
  unsupported_class(constructor, prototype, name, 3).inherits(O::TypedArray, O::TypedArrayPrototype)
}

/// Ordered so every parent precedes its children.
const CLASSES: &[ClassSpec] = &[
  ClassSpec::new(O::Object, O::ObjectPrototype, "Object", 1, N::ObjectConstructor),
  ClassSpec::new(O::Function, O::FunctionPrototype, "Function", 1, N::FunctionConstructor),
  ClassSpec::new(O::Array, O::ArrayPrototype, "Array", 1, N::ArrayConstructor),
  ClassSpec::new(O::Boolean, O::BooleanPrototype, "Boolean", 1, N::BooleanConstructor),
  ClassSpec::new(O::Number, O::NumberPrototype, "Number", 1, N::NumberConstructor),
  ClassSpec::new(O::String, O::StringPrototype, "String", 1, N::StringConstructor),
  ClassSpec::new(O::Symbol, O::SymbolPrototype, "Symbol", 0, N::SymbolConstructor),
  ClassSpec::new(O::BigInt, O::BigIntPrototype, "BigInt", 1, N::Unsupported("BigInt")),
  ClassSpec::new(O::Error, O::ErrorPrototype, "Error", 1, N::ErrorConstructor(O::ErrorPrototype)),
  native_error(O::EvalError, O::EvalErrorPrototype, "EvalError"),
  native_error(O::RangeError, O::RangeErrorPrototype, "RangeError"),
  native_error(O::ReferenceError, O::ReferenceErrorPrototype, "ReferenceError"),
  native_error(O::SyntaxError, O::SyntaxErrorPrototype, "SyntaxError"),
  native_error(O::TypeError, O::TypeErrorPrototype, "TypeError"),
  native_error(O::UriError, O::UriErrorPrototype, "URIError"),
  unsupported_class(O::Date, O::DatePrototype, "Date", 7),
  unsupported_class(O::RegExp, O::RegExpPrototype, "RegExp", 2),
  unsupported_class(O::Map, O::MapPrototype, "Map", 0),
  unsupported_class(O::Set, O::SetPrototype, "Set", 0),
  unsupported_class(O::WeakMap, O::WeakMapPrototype, "WeakMap", 0),
  unsupported_class(O::WeakSet, O::WeakSetPrototype, "WeakSet", 0),
  unsupported_class(O::Promise, O::PromisePrototype, "Promise", 1),
  unsupported_class(O::ArrayBuffer, O::ArrayBufferPrototype, "ArrayBuffer", 1),
  unsupported_class(O::SharedArrayBuffer, O::SharedArrayBufferPrototype, "SharedArrayBuffer", 1),
  unsupported_class(O::DataView, O::DataViewPrototype, "DataView", 1),
  ClassSpec::new(O::TypedArray, O::TypedArrayPrototype, "TypedArray", 0, N::Unsupported("TypedArray")),
  typed_array(O::Int8Array, O::Int8ArrayPrototype, "Int8Array"),
  typed_array(O::Uint8Array, O::Uint8ArrayPrototype, "Uint8Array"),
  typed_array(O::Uint8ClampedArray, O::Uint8ClampedArrayPrototype, "Uint8ClampedArray"),
  typed_array(O::Int16Array, O::Int16ArrayPrototype, "Int16Array"),
  typed_array(O::Uint16Array, O::Uint16ArrayPrototype, "Uint16Array"),
  typed_array(O::Int32Array, O::Int32ArrayPrototype, "Int32Array"),
  typed_array(O::Uint32Array, O::Uint32ArrayPrototype, "Uint32Array"),
  typed_array(O::Float32Array, O::Float32ArrayPrototype, "Float32Array"),
  typed_array(O::Float64Array, O::Float64ArrayPrototype, "Float64Array"),
  typed_array(O::BigInt64Array, O::BigInt64ArrayPrototype, "BigInt64Array"),
  typed_array(O::BigUint64Array, O::BigUint64ArrayPrototype, "BigUint64Array"),
];

/// Prototype objects without a constructor of their own, with their `[[Prototype]]`.
const ITERATOR_PROTOTYPES: &[(ObjectIntrinsic, ObjectIntrinsic)] = &[
  (O::IteratorPrototype, O::ObjectPrototype),
  (O::AsyncIteratorPrototype, O::ObjectPrototype),
  (O::ArrayIteratorPrototype, O::IteratorPrototype),
  (O::MapIteratorPrototype, O::IteratorPrototype),
  (O::SetIteratorPrototype, O::IteratorPrototype),
  (O::StringIteratorPrototype, O::IteratorPrototype),
  (O::RegExpStringIteratorPrototype, O::IteratorPrototype),
  (O::AsyncFromSyncIteratorPrototype, O::AsyncIteratorPrototype),
];

const NAMESPACES: &[(ObjectIntrinsic, &str)] = &[
  (O::Math, "Math"),
  (O::Json, "JSON"),
  (O::Reflect, "Reflect"),
  (O::Atomics, "Atomics"),
];

const GLOBAL_FUNCTIONS: &[(ObjectIntrinsic, &str, u32, NativeFunction)] = &[
  (O::Eval, "eval", 1, N::Unsupported("eval")),
  (O::IsFinite, "isFinite", 1, N::IsFinite),
  (O::IsNaN, "isNaN", 1, N::IsNaN),
  (O::ParseFloat, "parseFloat", 1, N::Unsupported("parseFloat")),
  (O::ParseInt, "parseInt", 2, N::Unsupported("parseInt")),
  (O::DecodeUri, "decodeURI", 1, N::Unsupported("decodeURI")),
  (O::DecodeUriComponent, "decodeURIComponent", 1, N::Unsupported("decodeURIComponent")),
  (O::EncodeUri, "encodeURI", 1, N::Unsupported("encodeURI")),
  (O::EncodeUriComponent, "encodeURIComponent", 1, N::Unsupported("encodeURIComponent")),
  (O::Proxy, "Proxy", 2, N::UnsupportedConstructor("Proxy")),
];

/// The intrinsics installed as properties of the global object, with their property names.
/// `%TypedArray%` is reachable only through its subclasses.
pub(crate) fn global_bindings() -> impl Iterator<Item = (ObjectIntrinsic, &'static str)> {
  let classes = CLASSES
    .iter()
    .filter(|class| class.constructor != O::TypedArray)
    .map(|class| (class.constructor, class.name));
  let functions = GLOBAL_FUNCTIONS.iter().map(|&(key, name, _, _)| (key, name));
  classes.chain(NAMESPACES.iter().copied()).chain(functions)
}

#[derive(Clone, Copy)]
enum MethodKey {
  Name(&'static str),
  Symbol(SymbolIntrinsic, &'static str),
}

use MethodKey::Name;

const METHODS: &[(ObjectIntrinsic, MethodKey, u32, NativeFunction)] = &[
  (O::Object, Name("create"), 2, N::ObjectCreate),
  (O::Object, Name("getPrototypeOf"), 1, N::ObjectGetPrototypeOf),
  (O::Object, Name("keys"), 1, N::ObjectKeys),
  (O::Object, Name("setPrototypeOf"), 2, N::ObjectSetPrototypeOf),
  (O::ObjectPrototype, Name("hasOwnProperty"), 1, N::ObjectProtoHasOwnProperty),
  (O::ObjectPrototype, Name("isPrototypeOf"), 1, N::ObjectProtoIsPrototypeOf),
  (O::ObjectPrototype, Name("propertyIsEnumerable"), 1, N::ObjectProtoPropertyIsEnumerable),
  (O::ObjectPrototype, Name("toString"), 0, N::ObjectProtoToString),
  (O::ObjectPrototype, Name("valueOf"), 0, N::ObjectProtoValueOf),
  (O::FunctionPrototype, Name("apply"), 2, N::FunctionProtoApply),
  (O::FunctionPrototype, Name("bind"), 1, N::Unsupported("Function.prototype.bind")),
  (O::FunctionPrototype, Name("call"), 1, N::FunctionProtoCall),
  (O::FunctionPrototype, MethodKey::Symbol(SymbolIntrinsic::HasInstance, "[Symbol.hasInstance]"), 1, N::FunctionProtoHasInstance),
  (O::Array, Name("isArray"), 1, N::ArrayIsArray),
  (O::ArrayPrototype, Name("entries"), 0, N::ArrayProtoIterator(IterationKind::Entries)),
  (O::ArrayPrototype, Name("forEach"), 1, N::ArrayProtoForEach),
  (O::ArrayPrototype, Name("indexOf"), 1, N::ArrayProtoIndexOf),
  (O::ArrayPrototype, Name("join"), 1, N::ArrayProtoJoin),
  (O::ArrayPrototype, Name("keys"), 0, N::ArrayProtoIterator(IterationKind::Keys)),
  (O::ArrayPrototype, Name("pop"), 0, N::ArrayProtoPop),
  (O::ArrayPrototype, Name("push"), 1, N::ArrayProtoPush),
  (O::ArrayPrototype, Name("values"), 0, N::ArrayProtoIterator(IterationKind::Values)),
  (O::ArrayIteratorPrototype, Name("next"), 0, N::ArrayIteratorNext),
  (O::IteratorPrototype, MethodKey::Symbol(SymbolIntrinsic::Iterator, "[Symbol.iterator]"), 0, N::ReturnThis),
  (O::StringPrototype, Name("toString"), 0, N::StringProtoValueOf),
  (O::StringPrototype, Name("valueOf"), 0, N::StringProtoValueOf),
  (O::StringPrototype, MethodKey::Symbol(SymbolIntrinsic::Iterator, "[Symbol.iterator]"), 0, N::StringProtoIterator),
  (O::StringIteratorPrototype, Name("next"), 0, N::StringIteratorNext),
  (O::NumberPrototype, Name("toString"), 1, N::NumberProtoToString),
  (O::NumberPrototype, Name("valueOf"), 0, N::NumberProtoValueOf),
  (O::BooleanPrototype, Name("toString"), 0, N::BooleanProtoToString),
  (O::BooleanPrototype, Name("valueOf"), 0, N::BooleanProtoValueOf),
  (O::SymbolPrototype, Name("toString"), 0, N::SymbolProtoToString),
  (O::SymbolPrototype, Name("valueOf"), 0, N::SymbolProtoValueOf),
  (O::ErrorPrototype, Name("toString"), 0, N::ErrorProtoToString),
  (O::Json, Name("parse"), 2, N::Unsupported("JSON.parse")),
  (O::Json, Name("stringify"), 3, N::Unsupported("JSON.stringify")),
  (O::Promise, Name("all"), 1, N::Unsupported("Promise.all")),
  (O::Promise, Name("reject"), 1, N::Unsupported("Promise.reject")),
  (O::Promise, Name("resolve"), 1, N::Unsupported("Promise.resolve")),
  (O::PromisePrototype, Name("then"), 2, N::Unsupported("Promise.prototype.then")),
  (O::GeneratorPrototype, Name("next"), 1, N::Unsupported("Generator.prototype.next")),
  (O::GeneratorPrototype, Name("return"), 1, N::Unsupported("Generator.prototype.return")),
  (O::GeneratorPrototype, Name("throw"), 1, N::Unsupported("Generator.prototype.throw")),
];

/// Intrinsics that are plain reads of an already-installed method.
const ALIASES: &[(ObjectIntrinsic, ObjectIntrinsic, StringIntrinsic)] = &[
  (O::ObjProtoToString, O::ObjectPrototype, StringIntrinsic::ToString),
  (O::ObjProtoValueOf, O::ObjectPrototype, StringIntrinsic::ValueOf),
  (O::ArrayProtoEntries, O::ArrayPrototype, StringIntrinsic::Entries),
  (O::ArrayProtoForEach, O::ArrayPrototype, StringIntrinsic::ForEach),
  (O::ArrayProtoKeys, O::ArrayPrototype, StringIntrinsic::Keys),
  (O::ArrayProtoValues, O::ArrayPrototype, StringIntrinsic::Values),
  (O::PromiseProtoThen, O::PromisePrototype, StringIntrinsic::Then),
];

/// Aliases whose property name has no pre-interned string.
const NAMED_ALIASES: &[(ObjectIntrinsic, ObjectIntrinsic, &str)] = &[
  (O::JsonParse, O::Json, "parse"),
  (O::JsonStringify, O::Json, "stringify"),
  (O::PromiseAll, O::Promise, "all"),
  (O::PromiseReject, O::Promise, "reject"),
  (O::PromiseResolve, O::Promise, "resolve"),
];

const TO_STRING_TAGS: &[(ObjectIntrinsic, &str)] = &[
  (O::Math, "Math"),
  (O::Json, "JSON"),
  (O::Atomics, "Atomics"),
  (O::SymbolPrototype, "Symbol"),
  (O::BigIntPrototype, "BigInt"),
  (O::MapPrototype, "Map"),
  (O::SetPrototype, "Set"),
  (O::WeakMapPrototype, "WeakMap"),
  (O::WeakSetPrototype, "WeakSet"),
  (O::PromisePrototype, "Promise"),
  (O::ArrayBufferPrototype, "ArrayBuffer"),
  (O::SharedArrayBufferPrototype, "SharedArrayBuffer"),
  (O::DataViewPrototype, "DataView"),
  (O::ArrayIteratorPrototype, "Array Iterator"),
  (O::MapIteratorPrototype, "Map Iterator"),
  (O::SetIteratorPrototype, "Set Iterator"),
  (O::StringIteratorPrototype, "String Iterator"),
  (O::RegExpStringIteratorPrototype, "RegExp String Iterator"),
  (O::Generator, "GeneratorFunction"),
  (O::GeneratorPrototype, "Generator"),
  (O::AsyncGenerator, "AsyncGeneratorFunction"),
  (O::AsyncGeneratorPrototype, "AsyncGenerator"),
  (O::AsyncFunctionPrototype, "AsyncFunction"),
];

struct Builder<'h> {
  heap: &'h mut Heap,
  intrinsics: Intrinsics,
}

impl Builder<'_> {
  fn object(&self, key: ObjectIntrinsic) -> Result<GcObject, VmError> {
    self.intrinsics.object(key)
  }

  fn key(&mut self, name: &str) -> Result<PropertyKey, VmError> {
    Ok(PropertyKey::String(self.heap.alloc_string(name)?))
  }

  fn define(&mut self, obj: GcObject, key: PropertyKey, desc: PropertyDescriptor) -> Result<(), VmError> {
    self.heap.define_property(obj, key, desc)
  }

  fn alloc_ordinary(&mut self, key: ObjectIntrinsic, parent: Option<ObjectIntrinsic>) -> Result<GcObject, VmError> {
    let proto = parent.map(|parent| self.object(parent)).transpose()?;
    let obj = self.heap.alloc_object(proto, ObjectKind::Ordinary)?;
    self.intrinsics.set_object(key, obj)?;
    Ok(obj)
  }

  /// A built-in function object with `length` and `name`.
  fn alloc_function(&mut self, native: NativeFunction, name: &str, length: u32) -> Result<GcObject, VmError> {
    let proto = self.object(O::FunctionPrototype)?;
    let func = self
      .heap
      .alloc_object(Some(proto), ObjectKind::Function(CallHandler::Native(native)))?;
    self.define_length_and_name(func, name, length, true)?;
    Ok(func)
  }

  fn define_length_and_name(
    &mut self,
    func: GcObject,
    name: &str,
    length: u32,
    configurable: bool,
  ) -> Result<(), VmError> {
    let length_key = self.intrinsics.key(StringIntrinsic::Length)?;
    let name_key = self.intrinsics.key(StringIntrinsic::Name)?;
    let name = Value::String(self.heap.alloc_string(name)?);
    self.define(
      func,
      length_key,
      PropertyDescriptor::data(Value::Number(length as f64), false, false, configurable),
    )?;
    self.define(func, name_key, PropertyDescriptor::data(name, false, false, configurable))
  }

  /// Wires `C.prototype` and `P.constructor` with explicit writability/configurability.
  fn link(
    &mut self,
    constructor: GcObject,
    prototype: GcObject,
    prototype_attrs: (bool, bool),
    constructor_attrs: (bool, bool),
  ) -> Result<(), VmError> {
    let prototype_key = self.intrinsics.key(StringIntrinsic::Prototype)?;
    let constructor_key = self.intrinsics.key(StringIntrinsic::Constructor)?;
    let (writable, configurable) = prototype_attrs;
    self.define(
      constructor,
      prototype_key,
      PropertyDescriptor::data(Value::Object(prototype), writable, false, configurable),
    )?;
    let (writable, configurable) = constructor_attrs;
    self.define(
      prototype,
      constructor_key,
      PropertyDescriptor::data(Value::Object(constructor), writable, false, configurable),
    )
  }

  fn init_primitives_strings_and_symbols(&mut self) -> Result<(), VmError> {
    use PrimitiveIntrinsic as P;
    for &key in PrimitiveIntrinsic::ALL {
      let value = match key {
        P::Empty => Value::Empty,
        P::Undefined => Value::Undefined,
        P::Null => Value::Null,
        P::True => Value::Bool(true),
        P::False => Value::Bool(false),
        P::NaN => Value::Number(f64::NAN),
        P::Infinity => Value::Number(f64::INFINITY),
        P::NegativeInfinity => Value::Number(f64::NEG_INFINITY),
        P::Zero => Value::Number(0.0),
        P::NegativeZero => Value::Number(-0.0),
      };
      self.intrinsics.primitives[key.slot()] = Some(value);
    }

    for &key in StringIntrinsic::ALL {
      let s = self.heap.alloc_string(key.name())?;
      self.intrinsics.strings[key.slot()] = Some(s);
    }

    for &key in SymbolIntrinsic::ALL {
      let description = format!("Symbol.{}", &key.name()[2..]);
      let description = self.heap.alloc_string(&description)?;
      let sym = self.heap.alloc_symbol(Some(description))?;
      self.intrinsics.symbols[key.slot()] = Some(sym);
    }
    Ok(())
  }

  fn init_fundamental_prototypes(&mut self) -> Result<(), VmError> {
    let object_prototype = self.alloc_ordinary(O::ObjectPrototype, None)?;
    let function_prototype = self.heap.alloc_object(
      Some(object_prototype),
      ObjectKind::Function(CallHandler::Native(N::FunctionPrototype)),
    )?;
    self.intrinsics.set_object(O::FunctionPrototype, function_prototype)?;
    self.define_length_and_name(function_prototype, "", 0, true)
  }

  fn init_objects(&mut self) -> Result<(), VmError> {
    for &(key, parent) in ITERATOR_PROTOTYPES {
      self.alloc_ordinary(key, Some(parent))?;
    }

    for class in CLASSES {
      self.init_class(class)?;
    }
    let array_prototype = self.object(O::ArrayPrototype)?;
    self.heap.set_object_kind(array_prototype, ObjectKind::Array)?;
    let length_key = self.intrinsics.key(StringIntrinsic::Length)?;
    self.define(
      array_prototype,
      length_key,
      PropertyDescriptor::data(Value::Number(0.0), true, false, false),
    )?;
    self.init_error_prototypes()?;
    self.init_symbol_statics()?;

    self.init_function_family(
      O::GeneratorFunction,
      "GeneratorFunction",
      O::Generator,
      Some((O::GeneratorPrototype, O::IteratorPrototype)),
    )?;
    self.init_function_family(
      O::AsyncGeneratorFunction,
      "AsyncGeneratorFunction",
      O::AsyncGenerator,
      Some((O::AsyncGeneratorPrototype, O::AsyncIteratorPrototype)),
    )?;
    self.init_function_family(O::AsyncFunction, "AsyncFunction", O::AsyncFunctionPrototype, None)?;

    for &(key, _) in NAMESPACES {
      self.alloc_ordinary(key, Some(O::ObjectPrototype))?;
    }
    for &(key, name, length, native) in GLOBAL_FUNCTIONS {
      let func = self.alloc_function(native, name, length)?;
      self.intrinsics.set_object(key, func)?;
    }
    self.init_throw_type_error()?;

    for &(owner, key, length, native) in METHODS {
      let owner = self.object(owner)?;
      let (key, name) = match key {
        MethodKey::Name(name) => (self.key(name)?, name),
        MethodKey::Symbol(sym, name) => (self.intrinsics.symbol_key(sym)?, name),
      };
      let func = self.alloc_function(native, name, length)?;
      self.define(owner, key, PropertyDescriptor::method(Value::Object(func)))?;
    }

    let tag_key = self.intrinsics.symbol_key(SymbolIntrinsic::ToStringTag)?;
    for &(owner, tag) in TO_STRING_TAGS {
      let owner = self.object(owner)?;
      let tag = Value::String(self.heap.alloc_string(tag)?);
      self.define(owner, tag_key, PropertyDescriptor::data(tag, false, false, true))?;
    }
    Ok(())
  }

  fn init_class(&mut self, class: &ClassSpec) -> Result<(), VmError> {
    let (constructor_parent, prototype_parent) = class.parents;
    let constructor_proto = self.object(constructor_parent)?;
    let constructor = self.heap.alloc_object(
      Some(constructor_proto),
      ObjectKind::Function(CallHandler::Native(class.native)),
    )?;
    self.define_length_and_name(constructor, class.name, class.length, true)?;
    self.intrinsics.set_object(class.constructor, constructor)?;

    let Some(prototype_key) = class.prototype else {
      return Ok(());
    };
    // Object.prototype and Function.prototype exist since phase 2.
    let prototype = match self.intrinsics.objects[prototype_key.slot()] {
      Some(existing) => existing,
      None => self.alloc_ordinary(prototype_key, Some(prototype_parent))?,
    };
    self.link(constructor, prototype, (false, false), (true, true))
  }

  fn init_error_prototypes(&mut self) -> Result<(), VmError> {
    let name_key = self.intrinsics.key(StringIntrinsic::Name)?;
    let message_key = self.intrinsics.key(StringIntrinsic::Message)?;
    let empty = Value::String(self.intrinsics.string(StringIntrinsic::EmptyString)?);
    for class in CLASSES {
      let N::ErrorConstructor(prototype) = class.native else {
        continue;
      };
      let prototype = self.object(prototype)?;
      let name = Value::String(self.heap.alloc_string(class.name)?);
      self.define(prototype, name_key, PropertyDescriptor::method(name))?;
      self.define(prototype, message_key, PropertyDescriptor::method(empty))?;
    }
    Ok(())
  }

  fn init_symbol_statics(&mut self) -> Result<(), VmError> {
    let symbol_ctor = self.object(O::Symbol)?;
    for &key in SymbolIntrinsic::ALL {
      let sym = self.intrinsics.symbol(key)?;
      let name = self.key(&key.name()[2..])?;
      self.define(symbol_ctor, name, PropertyDescriptor::frozen(Value::Symbol(sym)))?;
    }
    Ok(())
  }

  /// `%GeneratorFunction%`-style families: a constructor inheriting from `%Function%`, its
  /// prototype (`%Generator%`) and optionally the prototype of the instances' prototypes.
  fn init_function_family(
    &mut self,
    constructor_key: ObjectIntrinsic,
    name: &'static str,
    prototype_key: ObjectIntrinsic,
    instance_prototype: Option<(ObjectIntrinsic, ObjectIntrinsic)>,
  ) -> Result<(), VmError> {
    let function_ctor = self.object(O::Function)?;
    let constructor = self.heap.alloc_object(
      Some(function_ctor),
      ObjectKind::Function(CallHandler::Native(N::UnsupportedConstructor(name))),
    )?;
    self.define_length_and_name(constructor, name, 1, true)?;
    self.intrinsics.set_object(constructor_key, constructor)?;

    let prototype = self.alloc_ordinary(prototype_key, Some(O::FunctionPrototype))?;
    self.link(constructor, prototype, (false, false), (false, true))?;

    if let Some((instance_key, instance_parent)) = instance_prototype {
      let instance_prototype = self.alloc_ordinary(instance_key, Some(instance_parent))?;
      // %Generator%.prototype and %GeneratorPrototype%.constructor are both configurable.
      self.link(prototype, instance_prototype, (false, true), (false, true))?;
    }
    Ok(())
  }

  fn init_throw_type_error(&mut self) -> Result<(), VmError> {
    let proto = self.object(O::FunctionPrototype)?;
    let func = self
      .heap
      .alloc_object(Some(proto), ObjectKind::Function(CallHandler::Native(N::ThrowTypeError)))?;
    self.define_length_and_name(func, "", 0, false)?;
    self.heap.object_prevent_extensions(func)?;
    self.intrinsics.set_object(O::ThrowTypeError, func)
  }

  fn init_aliases(&mut self) -> Result<(), VmError> {
    for &(alias, owner, name) in ALIASES {
      let key = self.intrinsics.key(name)?;
      self.init_alias(alias, owner, key)?;
    }
    for &(alias, owner, name) in NAMED_ALIASES {
      let key = self.key(name)?;
      self.init_alias(alias, owner, key)?;
    }

    // Array.prototype[@@iterator] is the same function object as Array.prototype.values.
    let values = self.object(O::ArrayProtoValues)?;
    let array_prototype = self.object(O::ArrayPrototype)?;
    let iterator_key = self.intrinsics.symbol_key(SymbolIntrinsic::Iterator)?;
    self.define(array_prototype, iterator_key, PropertyDescriptor::method(Value::Object(values)))
  }

  fn init_alias(&mut self, alias: ObjectIntrinsic, owner: ObjectIntrinsic, key: PropertyKey) -> Result<(), VmError> {
    let owner = self.object(owner)?;
    let target = self
      .heap
      .get_own_property(owner, &key)?
      .and_then(|desc| desc.data_value())
      .and_then(Value::as_object)
      .ok_or(VmError::IntrinsicNotInitialized(alias.name()))?;
    self.intrinsics.set_object(alias, target)
  }
}

#[cfg(test)]
mod tests {
  use super::{Intrinsic, ObjectIntrinsic, StringIntrinsic};

  #[test]
  fn names_round_trip_and_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for key in Intrinsic::all() {
      assert!(seen.insert(key.name()), "duplicate intrinsic name {}", key.name());
      assert_eq!(Intrinsic::from_name(key.name()), Some(key));
    }
    assert!(seen.len() >= 170, "expected the full intrinsic table, got {}", seen.len());
  }

  #[test]
  fn well_known_names_parse() {
    assert_eq!(
      Intrinsic::from_name("%ObjProto_toString%"),
      Some(Intrinsic::Object(ObjectIntrinsic::ObjProtoToString))
    );
    assert_eq!(Intrinsic::from_name(""), Some(Intrinsic::String(StringIntrinsic::EmptyString)));
    assert_eq!(Intrinsic::from_name("%NotAThing%"), None);
  }
}
