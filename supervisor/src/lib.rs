//! Landing supervisor for an optionally piloted aircraft, built as a tree of
//! P-DEVS models on top of the `devs` kernel.

pub mod coupled;
pub mod geo;
pub mod io;
pub mod messages;
pub mod models;
pub mod parameters;
pub mod runner;
