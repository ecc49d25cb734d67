//! kubesim-resource — resource quantity algebra for the cluster simulator.
//!
//! Turns textual resource specifications (`"500m"`, `"2Gi"`) into exact
//! quantities and provides the arithmetic the simulator needs to account
//! for CPU, memory and extended resources such as `nvidia.com/gpu`.
//!
//! # Components
//!
//! - **`quantity`** — Exact fixed-point amounts with SI / binary suffixes
//! - **`list`** — Sparse `name -> quantity` maps where absent means zero
//! - **`builder`** — Validating conversion from raw string maps
//! - **`arith`** — `sum`, `ge` (dominance) and guarded `diff`
//!
//! All operations are pure functions over value types.

pub mod arith;
pub mod builder;
pub mod error;
pub mod list;
pub mod name;
pub mod quantity;

pub use arith::{diff, ge, insufficient, quantity_or_zero, sum};
pub use builder::{RawQuantity, build};
pub use error::{NotGreaterOrEqualError, ParseError, QuantityError};
pub use list::ResourceList;
pub use name::ResourceName;
pub use quantity::{Format, Quantity};
