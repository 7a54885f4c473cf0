#![warn(clippy::pedantic)]

//! The double-buffered cell grid and its diffing renderer.
//!
//! The host draws into the back buffer with [`Grid::set_cell`];
//! [`Grid::compute_diff`] then emits the shortest escape stream that makes
//! the terminal match, copies the back buffer into the front buffer, and
//! clears the dirty flags. Two diffs in a row with no writes in between
//! produce an empty string.
//!
//! All operations are total: out-of-range writes and reads are no-ops and
//! empty cells respectively, never errors.

mod cache;
pub mod grid;

pub use cache::DeltaCache;
pub use grid::Grid;
