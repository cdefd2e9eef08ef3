//! Core compute primitives.
//!
//! A single row-major `Matrix` backs feature tables, target tables and
//! multi-output predictions.

mod matrix;

pub use matrix::Matrix;
