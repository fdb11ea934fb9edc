pub mod config;
pub mod run;
pub mod session;
pub mod settings;
pub mod status;
pub mod steps;
