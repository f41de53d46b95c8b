//! Cross-module tests.
//!
//! These drive whole detection files through a session and the renderer,
//! checking the behaviour a viewer relies on end to end.

mod scenario_tests;
