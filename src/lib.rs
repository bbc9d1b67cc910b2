//! # Full-Sweep SAH BVH Builder
//!
//! A single-threaded, deterministic builder for binary bounding volume
//! hierarchies, aimed at path tracers that traverse the result on the GPU.
//! The split at every node is chosen with a full [Surface Area Heuristic](https://graphics.stanford.edu/~boulos/papers/togbvh.pdf)
//! sweep over all three axes, using three centroid-sorted index permutations
//! that are repartitioned in O(n) per split instead of re-sorted.
//!
//! The output is a flat [`bvh::Bvh`]: a packed 32-byte-per-node array with the
//! split axis encoded in the two high bits of the count field, plus the
//! primitive-index permutation the leaves point into. Both can be uploaded to
//! device memory verbatim.
//!
//! ## Example
//!
//! ```
//! use glam::*;
//! use std::time::Duration;
//! use sweep_bvh::{bvh::builder::build_bvh_from_tris, triangle::Triangle};
//!
//! let tris = vec![
//!     Triangle::from_positions(vec3a(0.0, 0.0, 0.0), vec3a(1.0, 0.0, 0.0), vec3a(0.0, 1.0, 0.0)),
//!     Triangle::from_positions(vec3a(4.0, 0.0, 0.0), vec3a(5.0, 0.0, 0.0), vec3a(4.0, 1.0, 0.0)),
//! ];
//!
//! let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();
//!
//! // The root bounds everything; leaves index into primitive_indices.
//! assert!(bvh.nodes[0].aabb().contains_point(vec3a(4.5, 0.5, 0.0)));
//! assert_eq!(bvh.index_count(), 2);
//! ```

use std::time::Duration;

use aabb::Aabb;
use glam::Vec3A;

pub mod aabb;
pub mod bvh;
pub mod test_util;
pub mod triangle;

/// The geometric contract the builder requires of an input primitive.
///
/// Both operations must be pure and total: `center` is the sort key for the
/// SAH sweeps and must lie inside `aabb`, and `aabb` is treated as the
/// authoritative bound for the primitive.
pub trait Primitive {
    /// A canonical representative point of the primitive.
    fn center(&self) -> Vec3A;
    /// A tight bound around the primitive.
    fn aabb(&self) -> Aabb;
}

/// A macro to measure and print the execution time of a block of code.
///
/// # Arguments
/// * `$label` - A string label to identify the code block being timed.
/// * `$($code:tt)*` - The code block whose execution time is to be measured.
///
/// # Note
/// The macro purposefully doesn't include a scope so variables don't need to
/// be passed out of it. This allows it to be trivially added to existing code.
///
/// This macro only measures time when the `timeit` feature is enabled.
#[macro_export]
#[doc(hidden)]
macro_rules! timeit {
    [$label:expr, $($code:tt)*] => {
        #[cfg(feature = "timeit")]
        let timeit_start = std::time::Instant::now();
        $($code)*
        #[cfg(feature = "timeit")]
        println!("{:>8} {}", format!("{}", $crate::PrettyDuration(timeit_start.elapsed())), $label);
    };
}

/// Add profile scope. Nesting the macro allows us to make the profiling crate optional.
#[doc(hidden)]
#[macro_export]
macro_rules! scope {
    [$label:expr] => {
        #[cfg(feature = "profile")]
        profiling::scope!($label);
    };
}

/// A wrapper struct for `std::time::Duration` to provide pretty-printing of durations.
#[doc(hidden)]
pub struct PrettyDuration(pub Duration);

impl std::fmt::Display for PrettyDuration {
    /// Durations are formatted as follows:
    /// - If the duration is greater than or equal to 1 second, it is formatted in seconds (s).
    /// - If the duration is greater than or equal to 1 millisecond but less than 1 second, it is formatted in milliseconds (ms).
    /// - If the duration is less than 1 millisecond, it is formatted in microseconds (µs).
    ///   In the case of seconds & milliseconds, the duration is always printed with a precision of two decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.0;
        if duration.as_secs() > 0 {
            let seconds =
                duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) / 1_000_000_000.0;
            write!(f, "{seconds:.2}s ")
        } else if duration.subsec_millis() > 0 {
            let milliseconds =
                duration.as_millis() as f64 + f64::from(duration.subsec_micros() % 1_000) / 1_000.0;
            write!(f, "{milliseconds:.2}ms")
        } else {
            let microseconds = duration.as_micros();
            write!(f, "{microseconds}µs")
        }
    }
}
