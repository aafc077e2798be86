//! Integration tests for Layer 1: Script
//!
//! Tests for the tokenizer, the stack machine, the shipped word set, and
//! the attribute registry.

mod attributes;
mod machine;
