//! Data Bindings
//!
//! [`DataBindings`] is the per-node property store read and written by
//! controllers and by the renderer. Properties are addressed by string key
//! and hold a [`Value`]; the container owns key existence and type checks,
//! the scene graph never looks inside.
//!
//! Every mutation bumps [`DataBindings::version`], so consumers can cache
//! derived data and re-sync only when the container actually changed.
//!
//! ```rust,ignore
//! let mut data = DataBindings::new();
//! data.set("material.diffuseColor", Vec4::ONE);
//! data.set("transform.visible", true);
//!
//! let color: Option<Vec4> = data.get("material.diffuseColor");
//! let missing = data.try_get::<f32>("material.shininess"); // Err(MissingProperty)
//! ```

use std::fmt;

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Text(String),
}

impl Value {
    /// Human-readable name of the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "i32",
            Value::Uint(_) => "u32",
            Value::Float(_) => "f32",
            Value::Vec2(_) => "Vec2",
            Value::Vec3(_) => "Vec3",
            Value::Vec4(_) => "Vec4",
            Value::Mat4(_) => "Mat4",
            Value::Text(_) => "String",
        }
    }
}

/// Errors raised by typed property access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// No property is stored under the key.
    #[error("Missing property: {0}")]
    MissingProperty(String),

    /// The stored value has a different type than the one requested.
    #[error("Property '{key}' holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Implements `From<T> for Value` and `TryFrom<&Value> for T`.
macro_rules! impl_value_conversions {
    ($( $variant:ident => $ty:ty ),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<&Value> for $ty {
                type Error = &'static str;

                #[inline]
                fn try_from(value: &Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(other.type_name()),
                    }
                }
            }
        )*
    };
}

impl_value_conversions! {
    Bool => bool,
    Int => i32,
    Uint => u32,
    Float => f32,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Text => String,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

/// Keyed property store owned by each scene node.
#[derive(Clone, Default)]
pub struct DataBindings {
    properties: FxHashMap<String, Value>,
    version: u64,
}

impl DataBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        let new_type = value.type_name();
        self.version = self.version.wrapping_add(1);

        let previous = self.properties.insert(key, value);
        if let Some(old) = &previous
            && old.type_name() != new_type
        {
            log::debug!(
                "Data binding changed type from {} to {new_type}",
                old.type_name()
            );
        }
        previous
    }

    /// Typed read. `None` when the key is missing or holds another type.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'a> TryFrom<&'a Value>,
    {
        self.properties
            .get(key)
            .and_then(|v| T::try_from(v).ok())
    }

    /// Typed read that reports why the lookup failed.
    pub fn try_get<T>(&self, key: &str) -> Result<T, DataError>
    where
        T: for<'a> TryFrom<&'a Value, Error = &'static str>,
    {
        let value = self
            .properties
            .get(key)
            .ok_or_else(|| DataError::MissingProperty(key.to_owned()))?;

        T::try_from(value).map_err(|found| DataError::TypeMismatch {
            key: key.to_owned(),
            expected: std::any::type_name::<T>(),
            found,
        })
    }

    /// Untyped read.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    #[must_use]
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Removes the property under `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.properties.remove(key);
        if removed.is_some() {
            self.version = self.version.wrapping_add(1);
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.properties.is_empty() {
            self.properties.clear();
            self.version = self.version.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Monotonic change counter, bumped by every mutation.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl fmt::Debug for DataBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBindings")
            .field("properties", &self.properties.len())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_typed() {
        let mut data = DataBindings::new();
        data.set("intensity", 0.5_f32);
        data.set("count", 3_u32);
        data.set("color", Vec3::new(1.0, 0.0, 0.0));
        data.set("label", "sun");

        assert_eq!(data.get::<f32>("intensity"), Some(0.5));
        assert_eq!(data.get::<u32>("count"), Some(3));
        assert_eq!(data.get::<Vec3>("color"), Some(Vec3::X));
        assert_eq!(data.get::<String>("label").as_deref(), Some("sun"));
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn test_get_wrong_type_is_none() {
        let mut data = DataBindings::new();
        data.set("count", 3_u32);

        assert_eq!(data.get::<i32>("count"), None);
        assert_eq!(data.get::<f32>("missing"), None);
    }

    #[test]
    fn test_try_get_errors() {
        let mut data = DataBindings::new();
        data.set("flag", true);

        assert_eq!(
            data.try_get::<f32>("nope"),
            Err(DataError::MissingProperty("nope".into()))
        );
        assert!(matches!(
            data.try_get::<f32>("flag"),
            Err(DataError::TypeMismatch { found: "bool", .. })
        ));
        assert_eq!(data.try_get::<bool>("flag"), Ok(true));
    }

    #[test]
    fn test_version_tracks_mutations() {
        let mut data = DataBindings::new();
        let v0 = data.version();

        data.set("a", 1_i32);
        let v1 = data.version();
        assert!(v1 > v0);

        assert!(data.remove("missing").is_none());
        assert_eq!(data.version(), v1);

        assert_eq!(data.remove("a"), Some(Value::Int(1)));
        assert!(data.version() > v1);
        assert!(!data.has_property("a"));
    }

    #[test]
    fn test_overwrite_returns_previous() {
        let mut data = DataBindings::new();
        assert!(data.set("x", 1.0_f32).is_none());
        assert_eq!(data.set("x", 2.0_f32), Some(Value::Float(1.0)));
        assert_eq!(data.get::<f32>("x"), Some(2.0));
    }
}
