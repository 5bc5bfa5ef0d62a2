// src/tests/mod.rs
//! Cross-module fixtures that exercise `layout()` end to end rather than one
//! phase at a time. Grounded in the teacher's split between inline
//! `#[cfg(test)]` unit tests and a dedicated cross-module test area: unit
//! tests live beside the code they check, this directory holds the
//! assertions that only make sense once every phase has run.
