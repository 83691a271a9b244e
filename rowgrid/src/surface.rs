use crate::RowMarker;

/// An opaque handle to a node owned by the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

/// The retained-mode UI tree the engine mutates.
///
/// The engine is intentionally UI-agnostic: it never holds platform objects,
/// only [`NodeId`]s handed out by this trait. An adapter implements it over
/// its real UI (DOM, TUI buffer, scene graph) or over an in-memory
/// simulation.
///
/// Contract: nodes created through this trait are owned exclusively by the
/// engine instance. Mutating a materialized row behind the engine's back
/// breaks the handle/cell bookkeeping the paint pass relies on.
pub trait RenderSurface {
    /// Pixel height of the scroll viewport.
    fn viewport_height(&self) -> u32;

    /// Measured width of the scroll container, if it has one yet.
    ///
    /// `None` (e.g. before mount) makes column layout fall back to the sum
    /// of the fixed column widths.
    fn container_width(&self) -> Option<f32>;

    /// Current scroll offset of the viewport, in pixels.
    fn scroll_offset(&self) -> u64;

    /// Programmatically scrolls the viewport.
    fn set_scroll_offset(&mut self, offset: u64);

    /// Applies the logical content height to the scrollable spacer.
    fn set_content_height(&mut self, height: u64);

    /// Schedules one animation-frame callback that will invoke
    /// [`RowGrid::on_frame`](crate::RowGrid::on_frame).
    ///
    /// The engine never has more than one logical frame outstanding; extra
    /// platform callbacks resolve to no-ops.
    fn request_frame(&mut self);

    /// Creates a row container appended to the render surface.
    fn create_row(&mut self) -> NodeId;

    /// Creates a cell inside `row`, tagged with its column key.
    fn create_cell(&mut self, row: NodeId, column_key: &str) -> NodeId;

    /// Detaches a row (and its cells) from the surface.
    fn remove_row(&mut self, row: NodeId);

    /// Positions a row at an absolute vertical offset.
    fn set_row_offset(&mut self, row: NodeId, offset: u64);

    /// Writes the 1-based row marker external collaborators read back.
    fn set_row_marker(&mut self, row: NodeId, marker: RowMarker);

    /// Positions a cell on the column axis.
    fn set_cell_bounds(&mut self, cell: NodeId, offset: f32, width: f32);

    /// Replaces a cell's plain-text content.
    fn set_cell_text(&mut self, cell: NodeId, text: &str);

    /// Brings a zero-content anchor at `offset` into view along the nearest
    /// edge, without smooth animation, honoring a bottom margin.
    fn scroll_anchor_into_view(&mut self, offset: u64, margin_bottom: u32);

    /// Parent of `node`, for event-target ancestor walks.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// The row marker carried by `node`, if it is a marked row.
    fn row_marker_of(&self, node: NodeId) -> Option<RowMarker>;
}
