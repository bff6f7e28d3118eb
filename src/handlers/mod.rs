//! Input event handlers.

pub mod keyboard;
