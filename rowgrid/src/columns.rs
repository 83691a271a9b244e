use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::NodeId;

/// Authored width of a column.
///
/// Percentage weights are scaled to exactly fill the container width left
/// over after the fixed columns.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnWidth {
    /// Absolute width in pixels.
    Px(f32),
    /// Percentage weight relative to the other percentage columns.
    Pct(f32),
}

/// A custom cell renderer.
///
/// When set on a column, the paint pass hands the materialized cell to this
/// callback instead of writing the stringified field value.
pub type CellRenderCallback<D, S> = Arc<dyn Fn(&mut S, NodeId, &D, usize) + Send + Sync>;

/// A declarative column, before layout resolution.
pub struct ColumnSpec<D, S> {
    /// Human-readable header label.
    pub name: String,
    /// Field key looked up in the prepared display data.
    pub key: String,
    pub width: ColumnWidth,
    pub cell_render: Option<CellRenderCallback<D, S>>,
}

impl<D, S> ColumnSpec<D, S> {
    pub fn new(name: impl Into<String>, key: impl Into<String>, width: ColumnWidth) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            width,
            cell_render: None,
        }
    }

    pub fn with_cell_render(
        mut self,
        f: impl Fn(&mut S, NodeId, &D, usize) + Send + Sync + 'static,
    ) -> Self {
        self.cell_render = Some(Arc::new(f));
        self
    }
}

impl<D, S> Clone for ColumnSpec<D, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key: self.key.clone(),
            width: self.width,
            cell_render: self.cell_render.clone(),
        }
    }
}

impl<D, S> core::fmt::Debug for ColumnSpec<D, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

/// A column after layout resolution.
///
/// `width_px` holds the absolute pixel width; `offset_px` the cumulative
/// pixel offset of all preceding columns. Offsets form a strictly increasing
/// prefix sum starting at 0.
pub struct Column<D, S> {
    pub name: String,
    pub key: String,
    /// The authored width, kept so the column can be re-resolved against a
    /// new container width.
    pub width: ColumnWidth,
    pub cell_render: Option<CellRenderCallback<D, S>>,
    pub width_px: f32,
    pub offset_px: f32,
}

impl<D, S> Clone for Column<D, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key: self.key.clone(),
            width: self.width,
            cell_render: self.cell_render.clone(),
            width_px: self.width_px,
            offset_px: self.offset_px,
        }
    }
}

impl<D, S> core::fmt::Debug for Column<D, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("width", &self.width)
            .field("width_px", &self.width_px)
            .field("offset_px", &self.offset_px)
            .finish_non_exhaustive()
    }
}

/// Resolves the declarative column list into absolute widths and prefix-sum
/// offsets.
///
/// `container_width = None` falls back to the sum of the fixed widths (the
/// container has not been measured yet, e.g. before mount). Percentage
/// columns split the width remaining after fixed columns proportionally to
/// their weights; a zero total weight alongside percentage columns is a
/// caller contract violation.
pub(crate) fn resolve_columns<D, S>(
    specs: Vec<ColumnSpec<D, S>>,
    container_width: Option<f32>,
) -> Vec<Column<D, S>> {
    let mut fixed_total = 0.0f32;
    let mut pct_total = 0.0f32;
    for spec in &specs {
        match spec.width {
            ColumnWidth::Px(px) => fixed_total += px,
            ColumnWidth::Pct(weight) => pct_total += weight,
        }
    }

    let has_pct = specs
        .iter()
        .any(|spec| matches!(spec.width, ColumnWidth::Pct(_)));
    if has_pct && pct_total <= 0.0 {
        gwarn!("percentage columns with zero total weight");
        debug_assert!(
            pct_total > 0.0,
            "percentage columns require a non-zero total weight"
        );
    }

    let container = container_width.unwrap_or(fixed_total);
    let remaining = (container - fixed_total).max(0.0);

    let mut offset = 0.0f32;
    specs
        .into_iter()
        .map(|spec| {
            let width_px = match spec.width {
                ColumnWidth::Px(px) => px,
                ColumnWidth::Pct(weight) if pct_total > 0.0 => weight / pct_total * remaining,
                ColumnWidth::Pct(_) => 0.0,
            };
            let column = Column {
                name: spec.name,
                key: spec.key,
                width: spec.width,
                cell_render: spec.cell_render,
                width_px,
                offset_px: offset,
            };
            offset += width_px;
            column
        })
        .collect()
}

/// `true` when `next` keeps the current key sequence, making the update
/// resize-only (widths/offsets change in place, no rebuild).
pub(crate) fn same_key_sequence<D, S>(current: &[Column<D, S>], next: &[ColumnSpec<D, S>]) -> bool {
    current.len() == next.len()
        && current
            .iter()
            .zip(next)
            .all(|(column, spec)| column.key == spec.key)
}
