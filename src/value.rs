//! The attribute bag: a generic tree of scalars, lists, maps and hashed sets, as a declarative
//! state schema stores a resource.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A string-keyed block of attributes.
pub type Map = BTreeMap<String, Value>;

/// Hash function deciding the identity of set elements.
pub type SetHashFn = fn(&Value) -> u32;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean attribute.
    Bool(bool),
    /// Integer attribute.
    Int(i64),
    /// String attribute.
    String(String),
    /// Ordered list, also used for single nested blocks (`[{...}]`).
    List(Vec<Value>),
    /// Nested block or string map.
    Map(Map),
    /// Unordered collection, deduplicated by hash code.
    Set(Set),
}

impl Value {
    /// Returns the string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the block if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the set if this is a [`Value::Set`].
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Vec<String>> for Value {
    fn from(l: Vec<String>) -> Self {
        Value::List(l.into_iter().map(Value::String).collect())
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<HashMap<String, String>> for Value {
    fn from(m: HashMap<String, String>) -> Self {
        Value::Map(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl From<Set> for Value {
    fn from(s: Set) -> Self {
        Value::Set(s)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Set(s) => s.serialize(serializer),
        }
    }
}

/// An unordered collection of values, keyed by the code of a hash function.
///
/// Two elements with the same code are the same element: the first one added is kept.
/// Iteration yields elements in ascending code order, which makes the rendering of a set
/// independent of the order its elements were read in.
///
/// ## Examples
///
/// ```rust
/// use bollard_flatten::value::{hash_string, Set, Value};
///
/// let set = Set::new(hash_string, vec![Value::from("b"), Value::from("a"), Value::from("b")]);
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(&Value::from("a")));
/// ```
#[derive(Clone)]
pub struct Set {
    hash: SetHashFn,
    items: BTreeMap<u32, Value>,
}

impl Set {
    /// Builds a set from `items`, keyed by `hash`.
    pub fn new<I>(hash: SetHashFn, items: I) -> Set
    where
        I: IntoIterator<Item = Value>,
    {
        let mut set = Set::empty(hash);
        for item in items {
            set.add(item);
        }
        set
    }

    /// An empty set keyed by `hash`.
    pub fn empty(hash: SetHashFn) -> Set {
        Set {
            hash,
            items: BTreeMap::new(),
        }
    }

    /// Adds `item` unless an element with the same code is already present. Returns whether
    /// the set changed.
    pub fn add(&mut self, item: Value) -> bool {
        let code = (self.hash)(&item);
        if self.items.contains_key(&code) {
            return false;
        }
        self.items.insert(code, item);
        true
    }

    /// Whether an element with the code of `item` is present.
    pub fn contains(&self, item: &Value) -> bool {
        self.items.contains_key(&(self.hash)(item))
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set holds no element.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.values()
    }

    /// Hash codes of the elements, ascending.
    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.keys().copied()
    }

    /// Elements in ascending code order.
    pub fn into_list(self) -> Vec<Value> {
        self.items.into_values().collect()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Set) -> bool {
        self.items == other.items
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.values()).finish()
    }
}

impl Serialize for Set {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for v in self.items.values() {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}

/// CRC-32 (IEEE) of a string element. Other values hash like [`hash_resource`].
pub fn hash_string(v: &Value) -> u32 {
    match v {
        Value::String(s) => crc32fast::hash(s.as_bytes()),
        _ => hash_resource(v),
    }
}

/// CRC-32 (IEEE) of the canonical JSON rendering of a value. Map keys are sorted, so two
/// blocks with the same attributes share a code.
pub fn hash_resource(v: &Value) -> u32 {
    match serde_json::to_vec(v) {
        Ok(buf) => crc32fast::hash(&buf),
        Err(e) => {
            error!("unable to encode set element for hashing: {}", e);
            debug_assert!(false, "set element does not encode as JSON: {}", e);
            crc32fast::hash(format!("{:?}", v).as_bytes())
        }
    }
}

/// Builds a string set from `items`.
pub fn new_string_set<I, S>(hash: SetHashFn, items: I) -> Set
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Set::new(hash, items.into_iter().map(|s| Value::String(s.into())))
}
