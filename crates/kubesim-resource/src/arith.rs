//! Resource list arithmetic — sum, dominance, guarded difference.
//!
//! Every operation treats a name missing from a list as zero of that
//! resource. That rule lives in [`quantity_or_zero`] and nowhere else.

use tracing::debug;

use crate::error::NotGreaterOrEqualError;
use crate::list::ResourceList;
use crate::name::ResourceName;
use crate::quantity::Quantity;

/// The quantity of `name` in `list`, or zero when the list has no entry.
pub fn quantity_or_zero(list: &ResourceList, name: &ResourceName) -> Quantity {
    list.get(name.as_str()).copied().unwrap_or_else(Quantity::zero)
}

/// Entry-wise sum over the union of both lists' names.
pub fn sum(a: &ResourceList, b: &ResourceList) -> ResourceList {
    a.names()
        .chain(b.names())
        .map(|name| {
            let total = quantity_or_zero(a, name) + quantity_or_zero(b, name);
            (name.clone(), total)
        })
        .collect()
}

/// Whether `a` covers `b`: for every name in `b`, `a`'s quantity (zero if
/// absent) is at least `b`'s. Names only in `a` do not matter.
pub fn ge(a: &ResourceList, b: &ResourceList) -> bool {
    b.iter().all(|(name, needed)| quantity_or_zero(a, name) >= *needed)
}

/// Names of `b` whose quantity exceeds `a`'s, in name order. Empty exactly
/// when `ge(a, b)` holds.
pub fn insufficient(a: &ResourceList, b: &ResourceList) -> Vec<ResourceName> {
    b.iter()
        .filter(|(name, needed)| quantity_or_zero(a, name) < **needed)
        .map(|(name, _)| name.clone())
        .collect()
}

/// `a - b`, defined only when `ge(a, b)` holds.
///
/// The result has `a`'s names. When `a` does not cover `b` the whole
/// operation fails and no partial list is produced; a negative remainder
/// is never returned.
pub fn diff(a: &ResourceList, b: &ResourceList) -> Result<ResourceList, NotGreaterOrEqualError> {
    let missing = insufficient(a, b);
    if !missing.is_empty() {
        debug!(
            minuend = %a,
            subtrahend = %b,
            insufficient = ?missing,
            "resource difference would be negative"
        );
        return Err(NotGreaterOrEqualError {
            insufficient: missing,
        });
    }

    Ok(a
        .iter()
        .map(|(name, have)| (name.clone(), *have - quantity_or_zero(b, name)))
        .collect())
}
