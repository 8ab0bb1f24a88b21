//! Front desk binary support: CLI definition and process wiring

pub mod cli;
pub mod desk;

pub use cli::{Args, Command};
pub use desk::FrontDesk;
