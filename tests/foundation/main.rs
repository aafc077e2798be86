//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Token, Error, and persistent collections.

mod collections;
mod errors;
mod values;
