//! Settings loading and display strings

mod loader;
mod messages;

pub use loader::{HostSettings, Settings};
pub use messages::{Messages, NAME_PLACEHOLDER};
