//! Core library for Foldsmith: template-driven project directory creation
//! backed by small JSON registries.
//!
//! The library has two halves:
//!
//! *   [`storage`] — the structure template document, the project and group
//!     registries, and the stores that persist them.
//! *   [`scaffold`] — the instantiation engine that turns a template plus a
//!     destination path into a real directory tree, including split
//!     placement between a parent and a sync directory.
//!
//! Frontends (CLI, a windowed UI) are expected to live in separate crates
//! and drive the core exclusively through the store and scaffold APIs.

pub mod scaffold;
pub mod storage;
