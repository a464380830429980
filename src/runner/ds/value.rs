use std::cell::RefCell;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use uuid::Uuid;

use crate::runner::ds::error::{BuiltinError, DataflowError, PanicSentinel};
use crate::runner::ds::function_object::Function;
use crate::runner::interop::InteropObject;
use crate::runner::polyglot::proxy::BoundaryProxy;

/// Identity of an atom constructor. Atoms of the same type share it.
pub type ConstructorId = Uuid;

/// Every value the interpreter can hold. Exactly one representational kind
/// is active at a time; dispatch and conversion match over this exhaustively.
pub enum Value {
    Integer(i64),
    BigInteger(Rc<BigInt>),
    Decimal(f64),
    Boolean(bool),
    Text(Rc<str>),
    Function(Function),
    Atom(Rc<Atom>),
    Constructor(Rc<AtomConstructor>),
    Array(Rc<Array>),
    /// A recoverable error flowing through data paths.
    Error(Rc<DataflowError>),
    /// An already-fatal panic. Never a normal value.
    PanicSentinel(Rc<PanicSentinel>),
    /// A foreign value provided by the embedding host.
    Host(Rc<dyn InteropObject>),
    /// A value owned by another execution context.
    Proxy(Rc<BoundaryProxy>),
}

/// The discriminant of [`Value`], used as the dispatch classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    BigInteger,
    Decimal,
    Boolean,
    Text,
    Function,
    Atom,
    Constructor,
    Array,
    Error,
    PanicSentinel,
    Host,
    Proxy,
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Integer | ValueKind::BigInteger => "Integer",
            ValueKind::Decimal => "Decimal",
            ValueKind::Boolean => "Boolean",
            ValueKind::Text => "Text",
            ValueKind::Function => "Function",
            ValueKind::Atom => "Atom",
            ValueKind::Constructor => "Constructor",
            ValueKind::Array => "Array",
            ValueKind::Error => "Error",
            ValueKind::PanicSentinel => "Panic",
            ValueKind::Host => "Host_Object",
            ValueKind::Proxy => "Foreign_Object",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::BigInteger(_) => ValueKind::BigInteger,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Text(_) => ValueKind::Text,
            Value::Function(_) => ValueKind::Function,
            Value::Atom(_) => ValueKind::Atom,
            Value::Constructor(_) => ValueKind::Constructor,
            Value::Array(_) => ValueKind::Array,
            Value::Error(_) => ValueKind::Error,
            Value::PanicSentinel(_) => ValueKind::PanicSentinel,
            Value::Host(_) => ValueKind::Host,
            Value::Proxy(_) => ValueKind::Proxy,
        }
    }

    pub fn text(s: &str) -> Value {
        Value::Text(Rc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(Array::new(items)))
    }

    pub fn host(object: impl InteropObject + 'static) -> Value {
        Value::Host(Rc::new(object))
    }

    /// Builds an integer value, demoting to `Integer` when it fits in 64 bits.
    pub fn from_bigint(value: BigInt) -> Value {
        match value.to_i64() {
            Some(small) => Value::Integer(small),
            None => Value::BigInteger(Rc::new(value)),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        match self {
            Value::Atom(atom) => atom.constructor().tag() == Some(BuiltinTag::Nothing),
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Name of the value's type as shown to users in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Atom(atom) => atom.constructor().name().to_string(),
            Value::Constructor(cons) => cons.name().to_string(),
            other => other.kind().type_name().to_string(),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Integer(i) => Value::Integer(*i),
            Value::BigInteger(b) => Value::BigInteger(b.clone()),
            Value::Decimal(d) => Value::Decimal(*d),
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Text(s) => Value::Text(s.clone()),
            Value::Function(f) => Value::Function(f.clone()),
            Value::Atom(a) => Value::Atom(a.clone()),
            Value::Constructor(c) => Value::Constructor(c.clone()),
            Value::Array(a) => Value::Array(a.clone()),
            Value::Error(e) => Value::Error(e.clone()),
            Value::PanicSentinel(p) => Value::PanicSentinel(p.clone()),
            Value::Host(h) => Value::Host(h.clone()),
            Value::Proxy(p) => Value::Proxy(p.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInteger(b) => write!(f, "{}", b),
            Value::Decimal(d) => {
                if d.fract() == 0.0 && d.is_finite() {
                    write!(f, "{:.1}", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Atom(atom) => write!(f, "{}", atom),
            Value::Constructor(cons) => write!(f, "{}", cons.name()),
            Value::Array(arr) => write!(f, "{}", arr),
            Value::Error(err) => write!(f, "{}", err),
            Value::PanicSentinel(p) => write!(f, "{}", p),
            Value::Host(h) => write!(f, "{:?}", h),
            Value::Proxy(p) => write!(f, "{}", p),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "Value::Integer({})", i),
            Value::BigInteger(b) => write!(f, "Value::BigInteger({})", b),
            Value::Decimal(d) => write!(f, "Value::Decimal({:?})", d),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::Text(s) => write!(f, "Value::Text({:?})", s),
            Value::Function(func) => write!(f, "Value::Function({})", func.name()),
            Value::Atom(atom) => write!(f, "Value::Atom({})", atom),
            Value::Constructor(cons) => write!(f, "Value::Constructor({})", cons.name()),
            Value::Array(arr) => write!(f, "Value::Array({})", arr),
            Value::Error(err) => write!(f, "Value::Error({})", err.payload()),
            Value::PanicSentinel(p) => write!(f, "Value::PanicSentinel({})", p.cause()),
            Value::Host(h) => write!(f, "Value::Host({:?})", h),
            Value::Proxy(p) => write!(f, "Value::Proxy({:?})", p),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInteger(a), Value::BigInteger(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same(b),
            (Value::Atom(a), Value::Atom(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.constructor().id() == b.constructor().id() && a.fields() == b.fields())
            }
            (Value::Constructor(a), Value::Constructor(b)) => a.id() == b.id(),
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.items.borrow() == *b.items.borrow()
            }
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            (Value::PanicSentinel(a), Value::PanicSentinel(b)) => Rc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (Value::Proxy(a), Value::Proxy(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Builtin constructors the runtime needs to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTag {
    Nothing,
    Less,
    Equal,
    Greater,
    State,
}

pub struct AtomConstructor {
    id: ConstructorId,
    name: Rc<str>,
    fields: Vec<Rc<str>>,
    tag: Option<BuiltinTag>,
}

impl AtomConstructor {
    pub fn new(name: &str, fields: &[&str]) -> Rc<Self> {
        Rc::new(AtomConstructor {
            id: Uuid::new_v4(),
            name: Rc::from(name),
            fields: fields.iter().map(|f| Rc::from(*f)).collect(),
            tag: None,
        })
    }

    pub(crate) fn builtin(name: &str, fields: &[&str], tag: BuiltinTag) -> Rc<Self> {
        Rc::new(AtomConstructor {
            id: Uuid::new_v4(),
            name: Rc::from(name),
            fields: fields.iter().map(|f| Rc::from(*f)).collect(),
            tag: Some(tag),
        })
    }

    pub fn id(&self) -> ConstructorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Rc<str>] {
        &self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn tag(&self) -> Option<BuiltinTag> {
        self.tag
    }

    /// The single instance of a constructor without fields.
    pub(crate) fn singleton(self: &Rc<Self>) -> Value {
        debug_assert!(self.fields.is_empty());
        Value::Atom(Rc::new(Atom {
            constructor: self.clone(),
            fields: Vec::new(),
        }))
    }

    /// Creates an instance. The number of values must match the declared fields.
    pub fn new_instance(self: &Rc<Self>, values: Vec<Value>) -> Result<Value, BuiltinError> {
        if values.len() != self.fields.len() {
            return Err(BuiltinError::ArityError {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        Ok(Value::Atom(Rc::new(Atom {
            constructor: self.clone(),
            fields: values,
        })))
    }
}

impl fmt::Debug for AtomConstructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AtomConstructor({} {:?})", self.name, self.fields)
    }
}

pub struct Atom {
    constructor: Rc<AtomConstructor>,
    fields: Vec<Value>,
}

impl Atom {
    pub fn constructor(&self) -> &Rc<AtomConstructor> {
        &self.constructor
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.constructor
            .fields
            .iter()
            .position(|f| &**f == name)
            .and_then(|idx| self.fields.get(idx))
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constructor.name)?;
        for field in &self.fields {
            match field {
                Value::Atom(inner) if !inner.fields.is_empty() => write!(f, " ({})", field)?,
                _ => write!(f, " {}", field)?,
            }
        }
        Ok(())
    }
}

/// A mutable, shared sequence of values.
pub struct Array {
    items: RefCell<Vec<Value>>,
}

impl Array {
    pub fn new(items: Vec<Value>) -> Self {
        Array {
            items: RefCell::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: i64) -> Option<Value> {
        if index < 0 {
            return None;
        }
        self.items.borrow().get(index as usize).cloned()
    }

    /// Returns `false` when the index is out of range.
    pub fn set(&self, index: i64, value: Value) -> bool {
        if index < 0 {
            return false;
        }
        match self.items.borrow_mut().get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }
}

impl Display for Array {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let items = self.items.borrow();
        write!(f, "[")?;
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}
