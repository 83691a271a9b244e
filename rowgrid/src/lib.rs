//! A headless windowing/recycling engine for virtualized row grids.
//!
//! `rowgrid` renders large ordered collections inside a fixed-height
//! scrollable viewport without materializing more than a small constant
//! number of row elements: scroll position maps to a contiguous index
//! window, row handles falling out of the window are recycled onto indexes
//! entering it, repaints coalesce into one unit of work per animation frame,
//! and fixed/percentage column layout keeps cell content in sync.
//!
//! It is UI-agnostic. An adapter implements [`RenderSurface`] over its
//! retained-mode UI and provides:
//! - viewport geometry and scroll offsets
//! - one [`RowGrid::on_frame`] call per granted animation frame
//! - event forwarding (`on_scroll`, `on_viewport_resize`)
//!
//! For a simulated surface and a frame driver, see the `rowgrid-adapter`
//! crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod columns;
mod data;
mod error;
mod grid;
mod options;
mod pool;
mod scheduler;
mod surface;
mod types;

#[cfg(test)]
mod tests;

pub use columns::{CellRenderCallback, Column, ColumnSpec, ColumnWidth};
pub use data::RowData;
pub use error::GridError;
pub use grid::RowGrid;
pub use options::{DEFAULT_BUFFER, GridOptions, RowPrepareCallback, RowRenderCallback};
pub use surface::{NodeId, RenderSurface};
pub use types::{RefreshLevel, RowMarker, RowWindow};
