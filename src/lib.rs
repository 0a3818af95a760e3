//! Build and formatting glue for a CMake-based C++ checkout.
//!
//! Two binaries sit on top of this crate: `build_driver` configures, builds, tests and measures
//! coverage through external tools; `format_driver` runs `clang-format` across the source tree.

#![allow(rustdoc::private_intra_doc_links)]

pub mod build;
pub mod common;
pub mod format;
