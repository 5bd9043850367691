//! Cross-crate integration tests for the essif wallet live in `tests/`.
