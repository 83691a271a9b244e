use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use rowgrid::{NodeId, RenderSurface, RowMarker};

#[derive(Clone, Debug, Default)]
struct SimNode {
    parent: Option<NodeId>,
    column_key: Option<String>,
    text: String,
    row_offset: u64,
    marker: Option<RowMarker>,
    bounds: Option<(f32, f32)>,
}

/// An in-memory retained-mode render surface.
///
/// Mirrors the contract a real UI adapter implements: retained nodes
/// addressed by [`NodeId`], a frame-request flag the driver polls, and
/// nearest-edge anchor scrolling. Useful for tests, examples and headless
/// adapters.
#[derive(Clone, Debug)]
pub struct SimSurface {
    nodes: BTreeMap<NodeId, SimNode>,
    next_id: u64,
    viewport_height: u32,
    container_width: Option<f32>,
    scroll_offset: u64,
    content_height: u64,
    frame_requested: bool,
    anchor_log: Vec<(u64, u32)>,
}

impl SimSurface {
    pub fn new(viewport_height: u32, container_width: f32) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            viewport_height,
            container_width: Some(container_width),
            scroll_offset: 0,
            content_height: 0,
            frame_requested: false,
            anchor_log: Vec::new(),
        }
    }

    /// A surface whose container has not been measured yet (pre-mount);
    /// column layout falls back to the sum of fixed widths.
    pub fn with_unmeasured_width(viewport_height: u32) -> Self {
        Self {
            container_width: None,
            ..Self::new(viewport_height, 0.0)
        }
    }

    /// Simulates a user scroll, clamped to the scrollable range.
    pub fn user_scroll(&mut self, offset: u64) {
        let max = self
            .content_height
            .saturating_sub(self.viewport_height as u64);
        self.scroll_offset = offset.min(max);
    }

    /// Simulates a container resize observation.
    pub fn resize(&mut self, viewport_height: u32, container_width: f32) {
        self.viewport_height = viewport_height;
        self.container_width = Some(container_width);
    }

    /// Consumes the outstanding frame request, if any. Drivers call this in
    /// their pump loop.
    pub fn take_frame_request(&mut self) -> bool {
        core::mem::replace(&mut self.frame_requested, false)
    }

    pub fn content_height(&self) -> u64 {
        self.content_height
    }

    /// Materialized row count.
    pub fn row_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.parent.is_none())
            .count()
    }

    /// Painted row markers, ascending.
    pub fn markers(&self) -> Vec<RowMarker> {
        let mut markers: Vec<RowMarker> = self
            .nodes
            .values()
            .filter_map(|node| node.marker)
            .collect();
        markers.sort_unstable();
        markers
    }

    pub fn row_with_marker(&self, marker: RowMarker) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.marker == Some(marker))
            .map(|(id, _)| *id)
    }

    /// The cell of `row` tagged with `column_key`.
    pub fn cell(&self, row: NodeId, column_key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| {
                node.parent == Some(row) && node.column_key.as_deref() == Some(column_key)
            })
            .map(|(id, _)| *id)
    }

    pub fn cell_text(&self, row: NodeId, column_key: &str) -> Option<&str> {
        let cell = self.cell(row, column_key)?;
        self.nodes.get(&cell).map(|node| node.text.as_str())
    }

    pub fn cell_bounds(&self, cell: NodeId) -> Option<(f32, f32)> {
        self.nodes.get(&cell).and_then(|node| node.bounds)
    }

    pub fn row_offset(&self, row: NodeId) -> Option<u64> {
        self.nodes.get(&row).map(|node| node.row_offset)
    }

    /// Every `scroll_anchor_into_view` call observed, in order.
    pub fn anchor_log(&self) -> &[(u64, u32)] {
        &self.anchor_log
    }

    fn alloc(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

impl RenderSurface for SimSurface {
    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn container_width(&self) -> Option<f32> {
        self.container_width
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    fn set_content_height(&mut self, height: u64) {
        self.content_height = height;
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn create_row(&mut self) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(id, SimNode::default());
        id
    }

    fn create_cell(&mut self, row: NodeId, column_key: &str) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(
            id,
            SimNode {
                parent: Some(row),
                column_key: Some(column_key.to_string()),
                ..SimNode::default()
            },
        );
        id
    }

    fn remove_row(&mut self, row: NodeId) {
        self.nodes.retain(|_, node| node.parent != Some(row));
        self.nodes.remove(&row);
    }

    fn set_row_offset(&mut self, row: NodeId, offset: u64) {
        if let Some(node) = self.nodes.get_mut(&row) {
            node.row_offset = offset;
        }
    }

    fn set_row_marker(&mut self, row: NodeId, marker: RowMarker) {
        if let Some(node) = self.nodes.get_mut(&row) {
            node.marker = Some(marker);
        }
    }

    fn set_cell_bounds(&mut self, cell: NodeId, offset: f32, width: f32) {
        if let Some(node) = self.nodes.get_mut(&cell) {
            node.bounds = Some((offset, width));
        }
    }

    fn set_cell_text(&mut self, cell: NodeId, text: &str) {
        if let Some(node) = self.nodes.get_mut(&cell) {
            node.text = text.to_string();
        }
    }

    fn scroll_anchor_into_view(&mut self, offset: u64, margin_bottom: u32) {
        self.anchor_log.push((offset, margin_bottom));
        // Nearest-edge, no smooth animation: scroll up to the anchor, or down
        // until anchor + margin reaches the bottom edge.
        let view = self.viewport_height as u64;
        let target_end = offset + margin_bottom as u64;
        if offset < self.scroll_offset {
            self.scroll_offset = offset;
        } else if target_end > self.scroll_offset + view {
            self.scroll_offset = target_end - view;
        }
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn row_marker_of(&self, node: NodeId) -> Option<RowMarker> {
        self.nodes.get(&node).and_then(|n| n.marker)
    }
}
