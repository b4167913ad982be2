uniffi::setup_scaffolding!();

pub mod api;
pub mod service;
pub mod session;
pub mod settings;
pub mod trace_init;

mod worker;
