//! Integration tests for Layer 2: Runtime
//!
//! Tests for the request executor, bootstrap management, and stack
//! serialization.

mod bootstrap;
