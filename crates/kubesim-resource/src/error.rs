//! Error types for the resource algebra.

use thiserror::Error;

use crate::name::ResourceName;

/// Why a string is not a valid quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    #[error("unknown suffix: {0:?}")]
    UnknownSuffix(String),

    #[error("quantity out of range: {0:?}")]
    OutOfRange(String),

    #[error("negative quantity: {0:?}")]
    Negative(String),
}

/// A raw resource value could not be turned into a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quantity {value:?} for resource {name}: {reason}")]
pub struct ParseError {
    pub name: ResourceName,
    pub value: String,
    #[source]
    pub reason: QuantityError,
}

/// The minuend of a guarded difference does not cover the subtrahend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resource list is not greater than or equal to the subtracted list (insufficient: {})", join_names(.insufficient))]
pub struct NotGreaterOrEqualError {
    /// Resources of the subtrahend exceeding the minuend, in name order.
    pub insufficient: Vec<ResourceName>,
}

fn join_names(names: &[ResourceName]) -> String {
    names
        .iter()
        .map(ResourceName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
