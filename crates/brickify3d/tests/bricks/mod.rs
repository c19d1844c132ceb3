#[macro_use]
extern crate approx;

mod cache_fallback;
mod classify_cube;
mod delete_reexpose;
mod determinism;
mod flat_bounds;
mod legal_sizes;
mod merge_cube;
mod serialization;
mod supports_columns;
