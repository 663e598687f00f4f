//! Core type definitions for Mirrorbot.

mod element;
mod event;
mod identifiers;
mod platform;

pub use element::*;
pub use event::*;
pub use identifiers::*;
pub use platform::*;
