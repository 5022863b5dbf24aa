/// State management module
///
/// This module owns everything mutable in the application:
/// - Staged file lists per tool (selection.rs)
/// - Section routing and transient result state (section.rs)
/// - Before/after comparison slider state (compare.rs)
/// - Per-tool option values and their persistence (options.rs)

pub mod compare;
pub mod options;
pub mod section;
pub mod selection;
