//! Sparse resource lists.
//!
//! A [`ResourceList`] maps resource names to quantities. A name that is not
//! present means zero of that resource, never "unlimited". Lists are value
//! objects: arithmetic returns new lists and there is no in-place mutation.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::arith::quantity_or_zero;
use crate::builder::{self, RawQuantity};
use crate::name::ResourceName;
use crate::quantity::Quantity;

#[derive(Clone, Default)]
pub struct ResourceList {
    entries: BTreeMap<ResourceName, Quantity>,
}

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this list with `name` set to `quantity`.
    pub fn with(mut self, name: impl Into<ResourceName>, quantity: Quantity) -> Self {
        self.entries.insert(name.into(), quantity);
        self
    }

    /// The stored quantity for `name`, if any. Use the arithmetic
    /// functions when absent should count as zero.
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, quantity)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceName, &Quantity)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &ResourceName> {
        self.entries.keys()
    }
}

impl PartialEq for ResourceList {
    /// Absent entries compare as zero, so `{cpu: 1, gpu: 0} == {cpu: 1}`.
    fn eq(&self, other: &Self) -> bool {
        self.names()
            .chain(other.names())
            .all(|name| quantity_or_zero(self, name) == quantity_or_zero(other, name))
    }
}

impl Eq for ResourceList {}

impl FromIterator<(ResourceName, Quantity)> for ResourceList {
    fn from_iter<I: IntoIterator<Item = (ResourceName, Quantity)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResourceList {
    type Item = (ResourceName, Quantity);
    type IntoIter = std::collections::btree_map::IntoIter<ResourceName, Quantity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceList {
    type Item = (&'a ResourceName, &'a Quantity);
    type IntoIter = std::collections::btree_map::Iter<'a, ResourceName, Quantity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, quantity)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {quantity}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceList{self}")
    }
}

impl Serialize for ResourceList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, quantity) in &self.entries {
            map.serialize_entry(name, quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResourceList {
    /// Goes through the list builder, so malformed or negative values are
    /// rejected the same way as raw input. Values may be quantity strings
    /// or bare integers.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ResourceName, RawQuantity>::deserialize(deserializer)?;
        builder::build(raw).map_err(serde::de::Error::custom)
    }
}
