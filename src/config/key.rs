//! Typed configuration keys.
//!
//! A key is a const-constructible descriptor: name, default, and validation
//! rule. Current values live in the owning store's slots, so a single `const`
//! key can serve any number of stores, including the frozen defaults
//! instance.

use serde_json::Value;
use thiserror::Error;

/// Outcome of a rejected mutation.
///
/// These are expected runtime conditions, not faults: a rejected `set` leaves
/// the stored value unchanged and callers that care inspect the result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejected {
    #[error("key `{key}` is immutable")]
    Immutable { key: String },
    #[error("value for key `{key}` failed validation")]
    InvalidValue { key: String },
    #[error("list key `{key}` is at capacity ({cap})")]
    CapacityExceeded { key: String, cap: usize },
}

/// A named, validated, (de)serializable value slot descriptor.
pub trait ConfigKey {
    type Value: Clone;

    /// The document field this key claims. Unique within a store.
    fn name(&self) -> &'static str;

    fn default_value(&self) -> Self::Value;

    /// Parse a raw document value. Malformed input yields the default rather
    /// than failing the surrounding document load.
    fn read(&self, raw: &Value) -> Self::Value;

    /// Serialize a value into its document representation.
    fn write(&self, value: &Self::Value) -> Value;

    /// Check a candidate value before it is stored.
    fn check(&self, _value: &Self::Value) -> Result<(), Rejected> {
        Ok(())
    }
}

/// Enums storable in documents by legacy ordinal or by variant name.
///
/// Reads accept either form regardless of the declared wire format, so a
/// document written by an older build stays loadable.
pub trait ConfigEnum: Copy + Eq + 'static {
    /// All variants, in ordinal order. Ordinals are wire format; never
    /// reorder.
    const VARIANTS: &'static [Self];

    fn name(&self) -> &'static str;

    fn ordinal(&self) -> usize {
        Self::VARIANTS
            .iter()
            .position(|v| v == self)
            .unwrap_or_default()
    }

    fn from_ordinal(raw: u64) -> Option<Self> {
        Self::VARIANTS.get(usize::try_from(raw).ok()?).copied()
    }

    fn from_name(raw: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == raw)
    }
}

/// Boolean key.
#[derive(Debug, Clone, Copy)]
pub struct BoolKey {
    name: &'static str,
    default: bool,
}

impl BoolKey {
    pub const fn new(name: &'static str, default: bool) -> Self {
        Self { name, default }
    }
}

impl ConfigKey for BoolKey {
    type Value = bool;

    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self) -> bool {
        self.default
    }

    fn read(&self, raw: &Value) -> bool {
        raw.as_bool().unwrap_or(self.default)
    }

    fn write(&self, value: &bool) -> Value {
        Value::Bool(*value)
    }
}

/// Float key with an inclusive `[min, max]` bound.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey {
    name: &'static str,
    default: f32,
    min: f32,
    max: f32,
}

impl FloatKey {
    pub const fn bounded(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }

    pub const fn min(&self) -> f32 {
        self.min
    }

    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Clamp a foreign value into this key's bound.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

impl ConfigKey for FloatKey {
    type Value = f32;

    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self) -> f32 {
        self.default
    }

    fn read(&self, raw: &Value) -> f32 {
        raw.as_f64().map(|v| v as f32).unwrap_or(self.default)
    }

    fn write(&self, value: &f32) -> Value {
        Value::from(*value)
    }

    fn check(&self, value: &f32) -> Result<(), Rejected> {
        // NaN fails both comparisons and is rejected with the rest.
        if *value >= self.min && *value <= self.max {
            Ok(())
        } else {
            Err(Rejected::InvalidValue {
                key: self.name.into(),
            })
        }
    }
}

/// Free-form string key.
#[derive(Debug, Clone, Copy)]
pub struct StringKey {
    name: &'static str,
    default: &'static str,
}

impl StringKey {
    pub const fn new(name: &'static str, default: &'static str) -> Self {
        Self { name, default }
    }
}

impl ConfigKey for StringKey {
    type Value = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self) -> String {
        self.default.to_string()
    }

    fn read(&self, raw: &Value) -> String {
        raw.as_str().unwrap_or(self.default).to_string()
    }

    fn write(&self, value: &String) -> Value {
        Value::from(value.clone())
    }
}

/// Declared wire format for enum keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFormat {
    /// Legacy numeric ordinal.
    Ordinal,
    /// Variant name string.
    Name,
}

/// Enum key storing either the variant ordinal or its name.
#[derive(Debug, Clone, Copy)]
pub struct EnumKey<E: ConfigEnum> {
    name: &'static str,
    default: E,
    format: EnumFormat,
}

impl<E: ConfigEnum> EnumKey<E> {
    pub const fn by_ordinal(name: &'static str, default: E) -> Self {
        Self {
            name,
            default,
            format: EnumFormat::Ordinal,
        }
    }

    pub const fn by_name(name: &'static str, default: E) -> Self {
        Self {
            name,
            default,
            format: EnumFormat::Name,
        }
    }
}

impl<E: ConfigEnum> ConfigKey for EnumKey<E> {
    type Value = E;

    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self) -> E {
        self.default
    }

    fn read(&self, raw: &Value) -> E {
        match raw {
            Value::Number(n) => n.as_u64().and_then(E::from_ordinal).unwrap_or(self.default),
            Value::String(s) => E::from_name(s).unwrap_or(self.default),
            _ => self.default,
        }
    }

    fn write(&self, value: &E) -> Value {
        match self.format {
            EnumFormat::Ordinal => Value::from(value.ordinal() as u64),
            EnumFormat::Name => Value::from(value.name()),
        }
    }
}

/// Size-bounded list of another key's element type.
///
/// Bounds untrusted growth: reads truncate at the cap, and appends past the
/// cap fail with [`Rejected::CapacityExceeded`].
#[derive(Debug, Clone, Copy)]
pub struct ListKey<K> {
    name: &'static str,
    cap: usize,
    element: K,
}

impl<K: ConfigKey> ListKey<K> {
    pub const fn bounded(name: &'static str, cap: usize, element: K) -> Self {
        Self { name, cap, element }
    }

    pub const fn cap(&self) -> usize {
        self.cap
    }
}

impl<K: ConfigKey> ConfigKey for ListKey<K> {
    type Value = Vec<K::Value>;

    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self) -> Vec<K::Value> {
        Vec::new()
    }

    fn read(&self, raw: &Value) -> Vec<K::Value> {
        let Some(items) = raw.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .take(self.cap)
            .map(|item| self.element.read(item))
            .collect()
    }

    fn write(&self, value: &Vec<K::Value>) -> Value {
        Value::Array(
            value
                .iter()
                .take(self.cap)
                .map(|item| self.element.write(item))
                .collect(),
        )
    }

    fn check(&self, value: &Vec<K::Value>) -> Result<(), Rejected> {
        if value.len() > self.cap {
            return Err(Rejected::CapacityExceeded {
                key: self.name.into(),
                cap: self.cap,
            });
        }
        for item in value {
            self.element.check(item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Flavor {
        Plain,
        Sweet,
        Sour,
    }

    impl ConfigEnum for Flavor {
        const VARIANTS: &'static [Self] = &[Flavor::Plain, Flavor::Sweet, Flavor::Sour];

        fn name(&self) -> &'static str {
            match self {
                Flavor::Plain => "PLAIN",
                Flavor::Sweet => "SWEET",
                Flavor::Sour => "SOUR",
            }
        }
    }

    #[test]
    fn bool_read_falls_back_to_default() {
        let key = BoolKey::new("flag", true);
        assert!(key.read(&Value::Null));
        assert!(key.read(&Value::from("yes")));
        assert!(!key.read(&Value::Bool(false)));
    }

    #[test]
    fn float_check_enforces_inclusive_bound() {
        let key = FloatKey::bounded("size", 0.5, 0.0, 0.8);
        assert!(key.check(&0.0).is_ok());
        assert!(key.check(&0.8).is_ok());
        assert!(key.check(&-0.01).is_err());
        assert!(key.check(&0.81).is_err());
        assert!(key.check(&f32::NAN).is_err());
    }

    #[test]
    fn float_read_falls_back_on_malformed() {
        let key = FloatKey::bounded("size", 0.5, 0.0, 0.8);
        assert_eq!(key.read(&Value::from("oops")), 0.5);
        assert_eq!(key.read(&Value::from(0.25)), 0.25);
    }

    #[test]
    fn enum_reads_ordinal_and_name() {
        let key = EnumKey::by_ordinal("flavor", Flavor::Plain);
        assert_eq!(key.read(&Value::from(1u64)), Flavor::Sweet);
        assert_eq!(key.read(&Value::from("SOUR")), Flavor::Sour);
        assert_eq!(key.read(&Value::from(99u64)), Flavor::Plain);
        assert_eq!(key.read(&Value::from("BITTER")), Flavor::Plain);
    }

    #[test]
    fn enum_writes_declared_format() {
        let ordinal = EnumKey::by_ordinal("flavor", Flavor::Plain);
        let named = EnumKey::by_name("flavor", Flavor::Plain);
        assert_eq!(ordinal.write(&Flavor::Sour), Value::from(2u64));
        assert_eq!(named.write(&Flavor::Sour), Value::from("SOUR"));
    }

    #[test]
    fn list_read_truncates_at_cap() {
        let key = ListKey::bounded("flavors", 2, EnumKey::by_name("flavor", Flavor::Plain));
        let raw = Value::Array(vec![
            Value::from("SOUR"),
            Value::from("SWEET"),
            Value::from("PLAIN"),
        ]);
        assert_eq!(key.read(&raw), vec![Flavor::Sour, Flavor::Sweet]);
    }

    #[test]
    fn list_check_rejects_past_cap() {
        let key = ListKey::bounded("flavors", 2, EnumKey::by_name("flavor", Flavor::Plain));
        assert!(key.check(&vec![Flavor::Plain, Flavor::Sweet]).is_ok());
        assert_eq!(
            key.check(&vec![Flavor::Plain, Flavor::Sweet, Flavor::Sour]),
            Err(Rejected::CapacityExceeded {
                key: "flavors".into(),
                cap: 2,
            })
        );
    }
}
