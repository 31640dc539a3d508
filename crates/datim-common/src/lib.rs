//! Shared utilities for the DATIM analytics crates.
//!
//! - [`polars`]: conversions between Polars values and the plain strings
//!   the analytics API speaks.

pub mod polars;

pub use polars::{
    any_to_string, format_numeric, frame_to_rows, optional_string_column, parse_f64,
};
