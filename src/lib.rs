// Library target shared by the binary, the integration tests under tests/
// and the criterion benchmarks. main.rs only wires the terminal to it.

pub mod config;
pub mod dictionary;
pub mod event;
pub mod logging;
pub mod quiz;
pub mod store;
pub mod ui;
