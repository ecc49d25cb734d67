//! Raw resource maps to typed resource lists.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{ParseError, QuantityError};
use crate::list::ResourceList;
use crate::name::ResourceName;
use crate::quantity::Quantity;

/// Build a [`ResourceList`] from raw `name -> quantity string` pairs.
///
/// The result has exactly the input's names (a repeated name keeps its
/// last value). Values are checked in name order, whatever order the input
/// iterates in, and the first one that is not a valid, non-negative
/// quantity fails the whole build with a [`ParseError`] naming that entry.
///
/// ```
/// use std::collections::HashMap;
/// use kubesim_resource::{build, Quantity};
///
/// let raw = HashMap::from([("cpu", "1"), ("memory", "2Gi")]);
/// let list = build(raw).unwrap();
/// assert_eq!(list.get("memory"), Some(&"2Gi".parse::<Quantity>().unwrap()));
///
/// let raw = HashMap::from([("zone", "x"), ("foo", "bar"), ("cpu", "1")]);
/// assert_eq!(build(raw).unwrap_err().name.as_str(), "foo");
/// ```
pub fn build<I, K, V>(raw: I) -> Result<ResourceList, ParseError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<ResourceName>,
    V: AsRef<str>,
{
    let raw: BTreeMap<ResourceName, V> = raw
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();

    let list = raw
        .into_iter()
        .map(|(name, value)| {
            parse_entry(&name, value.as_ref()).map(|quantity| (name, quantity))
        })
        .collect::<Result<ResourceList, ParseError>>()?;

    debug!(entries = list.len(), "built resource list");
    Ok(list)
}

fn parse_entry(name: &ResourceName, value: &str) -> Result<Quantity, ParseError> {
    let reject = |reason: QuantityError| {
        debug!(resource = %name, value, %reason, "rejected resource quantity");
        ParseError {
            name: name.clone(),
            value: value.to_string(),
            reason,
        }
    };

    let quantity = Quantity::parse(value).map_err(reject)?;
    if quantity.is_negative() {
        return Err(reject(QuantityError::Negative(value.to_string())));
    }
    Ok(quantity)
}

/// A raw quantity value as written in a manifest: a string such as
/// `"500m"`, or a bare integer such as `4`.
///
/// Integers are kept in their decimal text form, so every raw value goes
/// through the same [`build`] validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawQuantity(String);

impl RawQuantity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RawQuantity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RawQuantity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RawQuantity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&Quantity> for RawQuantity {
    fn from(quantity: &Quantity) -> Self {
        Self(quantity.to_string())
    }
}

impl Serialize for RawQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawQuantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawVisitor;

        impl Visitor<'_> for RawVisitor {
            type Value = RawQuantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a quantity string such as \"500m\" or \"2Gi\", or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawQuantity, E> {
                Ok(RawQuantity::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<RawQuantity, E> {
                Ok(RawQuantity(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawQuantity, E> {
                Ok(RawQuantity(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawQuantity, E> {
                Ok(RawQuantity(v.to_string()))
            }
        }

        deserializer.deserialize_any(RawVisitor)
    }
}
