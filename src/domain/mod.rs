//! Domain types for rune
//!
//! Plain values with no I/O concerns.

mod extension;

pub use extension::Extension;
