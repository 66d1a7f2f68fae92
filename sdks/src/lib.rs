/// Quarterdeck Console SDK
///
/// Drive the console's app-lifecycle API from Rust.

pub mod client;
pub mod types;

pub use client::ConsoleClient;
pub use quarterdeck_core::domain::app::{AppListing, MergedApp};
pub use types::*;
