//! Debug-only sanity checks for geometric invariants.
//!
//! These assert rather than return `Result`, because a violated invariant here
//! is always an implementation bug, not a caller error (caller errors are
//! rejected earlier, by `mesh::ingest` or a `*Params::validate()`). They
//! compile to nothing in release builds.

use crate::core::types::{Number, Point3, Vector3};
use std::borrow::Borrow;

macro_rules! debug_assert_only {
    () => {
        if cfg!(not(debug_assertions)) {
            return;
        }
    };
}

/// Check is not [`Number::NAN`] and not [`Number::INFINITY`]
#[inline(always)]
#[track_caller]
pub fn number(val: impl Borrow<Number>) {
    debug_assert_only!();
    let val = val.borrow();
    assert!(!val.is_nan(), "should not be nan; val: {val}");
    assert!(!val.is_infinite(), "should not be inf; val: {val}");
}

/// Check all components are valid (finite) numbers
#[inline(always)]
#[track_caller]
pub fn point3(v: impl Borrow<Point3>) {
    debug_assert_only!();
    let p = v.borrow();
    for c in p.as_array() {
        number(c);
    }
}

/// Check all components are valid (finite) numbers
#[inline(always)]
#[track_caller]
pub fn vector3(v: impl Borrow<Vector3>) {
    debug_assert_only!();
    let v = v.borrow();
    for c in v.as_array() {
        number(c);
    }
}

/// Check is a valid, normalised vector
#[inline(always)]
#[track_caller]
pub fn normal3(n: impl Borrow<Vector3>) {
    debug_assert_only!();
    let n = n.borrow();
    vector3(n);
    assert!(
        n.is_normalized(),
        "should be normalised; vec: {n:?}, len: {:?}",
        n.length()
    );
}

/// Check a clearance value is finite and non-negative.
#[inline(always)]
#[track_caller]
pub fn clearance(d: impl Borrow<Number>) {
    debug_assert_only!();
    let d = d.borrow();
    number(d);
    assert!(*d >= 0.0, "clearance must be non-negative; val: {d}");
}
