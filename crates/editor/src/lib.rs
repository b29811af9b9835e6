// Library crate: the editor core plus the headless harness and command
// protocol used by integration tests and the scripted binary.

pub mod build;
pub mod command;
pub mod editor;
pub mod error;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod state;
pub mod validation;
pub mod viewport;
