//! Adapter utilities for the `rowgrid` crate.
//!
//! The `rowgrid` engine is UI-agnostic and focuses on the core windowing,
//! recycling and rendering state. This crate provides small,
//! framework-neutral helpers commonly needed by adapters:
//!
//! - [`SimSurface`]: an in-memory retained-mode render surface for tests,
//!   examples and headless use
//! - [`GridDriver`]: attach/detach flow, a frame pump, and keyboard scroll
//!   shortcuts (Home/End/PageUp/PageDown)
//!
//! This crate is intentionally framework-agnostic (no DOM/TUI bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod driver;
mod keys;
mod sim;


pub use driver::GridDriver;
pub use keys::ScrollKey;
pub use sim::SimSurface;
