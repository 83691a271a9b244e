use std::collections::BTreeMap;

use rowgrid::{
    ColumnSpec, ColumnWidth, GridOptions, NodeId, RenderSurface, RowGrid, RowMarker,
};

/// A bare-bones surface that logs mutations instead of drawing them.
struct ConsoleSurface {
    next_id: u64,
    viewport_height: u32,
    scroll_offset: u64,
}

impl ConsoleSurface {
    fn alloc(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

impl RenderSurface for ConsoleSurface {
    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn container_width(&self) -> Option<f32> {
        Some(640.0)
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    fn set_content_height(&mut self, height: u64) {
        println!("content height = {height}px");
    }

    fn request_frame(&mut self) {
        println!("frame requested");
    }

    fn create_row(&mut self) -> NodeId {
        self.alloc()
    }

    fn create_cell(&mut self, row: NodeId, column_key: &str) -> NodeId {
        let cell = self.alloc();
        println!("  cell {cell:?} [{column_key}] in row {row:?}");
        cell
    }

    fn remove_row(&mut self, row: NodeId) {
        println!("removed row {row:?}");
    }

    fn set_row_offset(&mut self, row: NodeId, offset: u64) {
        println!("row {row:?} at y={offset}");
    }

    fn set_row_marker(&mut self, _row: NodeId, _marker: RowMarker) {}

    fn set_cell_bounds(&mut self, _cell: NodeId, _offset: f32, _width: f32) {}

    fn set_cell_text(&mut self, cell: NodeId, text: &str) {
        println!("  cell {cell:?} = {text:?}");
    }

    fn scroll_anchor_into_view(&mut self, offset: u64, _margin_bottom: u32) {
        self.scroll_offset = offset;
    }

    fn parent_of(&self, _node: NodeId) -> Option<NodeId> {
        None
    }

    fn row_marker_of(&self, _node: NodeId) -> Option<RowMarker> {
        None
    }
}

fn main() {
    let items: Vec<u64> = (0..1_000_000).collect();
    let mut grid = RowGrid::new(
        items,
        GridOptions::new(20, |item: &u64, index| {
            BTreeMap::from([
                ("label".to_string(), format!("item {index}")),
                ("value".to_string(), item.to_string()),
            ])
        }),
    );

    grid.set_columns(vec![
        ColumnSpec::new("Label", "label", ColumnWidth::Px(160.0)),
        ColumnSpec::new("Value", "value", ColumnWidth::Pct(1.0)),
    ])
    .unwrap();

    grid.setup(ConsoleSurface {
        next_id: 0,
        viewport_height: 120,
        scroll_offset: 0,
    });
    grid.on_frame().unwrap();
    println!("window after initial frame: {:?}", grid.window());

    grid.scroll_to_index(123_456, None).unwrap();
    grid.on_scroll();
    grid.on_frame().unwrap();
    println!("window after scroll_to_index: {:?}", grid.window());
}
