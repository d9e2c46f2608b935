//! Unit tests module

mod output_test;
mod status_types_test;
