use crate::*;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::pool::RowPool;
use crate::scheduler::FrameScheduler;

static ROW_RENDER_CALLS: AtomicUsize = AtomicUsize::new(0);
static PREPARE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }
}

#[derive(Clone, Debug, Default)]
struct TestNode {
    parent: Option<NodeId>,
    column_key: Option<String>,
    text: String,
    row_offset: u64,
    marker: Option<RowMarker>,
    bounds: Option<(f32, f32)>,
}

/// Minimal in-memory render surface for engine tests.
#[derive(Clone, Debug)]
struct TestSurface {
    nodes: BTreeMap<NodeId, TestNode>,
    next_id: u64,
    viewport_height: u32,
    container_width: Option<f32>,
    scroll_offset: u64,
    content_height: u64,
    frame_requests: usize,
    created_rows: usize,
    removed_rows: usize,
    anchors: Vec<(u64, u32)>,
}

impl TestSurface {
    fn new(viewport_height: u32, container_width: f32) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            viewport_height,
            container_width: Some(container_width),
            scroll_offset: 0,
            content_height: 0,
            frame_requests: 0,
            created_rows: 0,
            removed_rows: 0,
            anchors: Vec::new(),
        }
    }

    fn alloc(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn rows(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    fn markers(&self) -> Vec<RowMarker> {
        let mut markers: Vec<RowMarker> = self
            .nodes
            .values()
            .filter_map(|node| node.marker)
            .collect();
        markers.sort_unstable();
        markers
    }

    fn row_with_marker(&self, marker: RowMarker) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.marker == Some(marker))
            .map(|(id, _)| *id)
    }

    fn cell_of(&self, row: NodeId, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.parent == Some(row) && node.column_key.as_deref() == Some(key))
            .map(|(id, _)| *id)
    }

    fn cell_text(&self, row: NodeId, key: &str) -> Option<String> {
        let cell = self.cell_of(row, key)?;
        Some(self.nodes[&cell].text.clone())
    }

    fn cell_bounds_of(&self, row: NodeId, key: &str) -> Option<(f32, f32)> {
        let cell = self.cell_of(row, key)?;
        self.nodes[&cell].bounds
    }
}

impl RenderSurface for TestSurface {
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
        self.frame_requests += 1;
    }

    fn create_row(&mut self) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(id, TestNode::default());
        self.created_rows += 1;
        id
    }

    fn create_cell(&mut self, row: NodeId, column_key: &str) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(
            id,
            TestNode {
                parent: Some(row),
                column_key: Some(column_key.to_string()),
                ..TestNode::default()
            },
        );
        id
    }

    fn remove_row(&mut self, row: NodeId) {
        self.nodes.retain(|_, node| node.parent != Some(row));
        self.nodes.remove(&row);
        self.removed_rows += 1;
    }

    fn set_row_offset(&mut self, row: NodeId, offset: u64) {
        self.nodes.get_mut(&row).unwrap().row_offset = offset;
    }

    fn set_row_marker(&mut self, row: NodeId, marker: RowMarker) {
        self.nodes.get_mut(&row).unwrap().marker = Some(marker);
    }

    fn set_cell_bounds(&mut self, cell: NodeId, offset: f32, width: f32) {
        self.nodes.get_mut(&cell).unwrap().bounds = Some((offset, width));
    }

    fn set_cell_text(&mut self, cell: NodeId, text: &str) {
        self.nodes.get_mut(&cell).unwrap().text = text.to_string();
    }

    fn scroll_anchor_into_view(&mut self, offset: u64, margin_bottom: u32) {
        self.anchors.push((offset, margin_bottom));
        // Nearest-edge semantics of the platform scroll-into-view call.
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

type Display = BTreeMap<String, String>;

fn prepare(item: &u64, index: usize) -> Display {
    let mut data = Display::new();
    data.insert("name".to_string(), format!("row {index}"));
    data.insert("value".to_string(), item.to_string());
    data
}

fn columns() -> Vec<ColumnSpec<Display, TestSurface>> {
    vec![
        ColumnSpec::new("Name", "name", ColumnWidth::Px(120.0)),
        ColumnSpec::new("Value", "value", ColumnWidth::Pct(1.0)),
    ]
}

/// 20px rows over `0..count`, bound to a 400px-wide surface, first frame run.
fn grid_with(count: u64, viewport_height: u32) -> RowGrid<u64, Display, TestSurface> {
    let items: Vec<u64> = (0..count).collect();
    let mut grid = RowGrid::new(items, GridOptions::new(20, prepare));
    grid.set_columns(columns()).unwrap();
    grid.setup(TestSurface::new(viewport_height, 400.0));
    grid.on_frame().unwrap();
    grid
}

fn scroll_to(grid: &mut RowGrid<u64, Display, TestSurface>, offset: u64) {
    grid.surface_mut().unwrap().scroll_offset = offset;
    grid.on_scroll();
    grid.on_frame().unwrap();
}

#[test]
fn window_matches_worked_example() {
    // 10_000 rows, 20px rows, 400px viewport, buffer 5:
    // rows_per_viewport = 20, rendered = 30.
    let mut grid = grid_with(10_000, 400);
    assert_eq!(grid.rows_per_viewport(), 20);

    scroll_to(&mut grid, 2_000);
    assert_eq!(
        grid.window(),
        RowWindow {
            start_index: 95,
            end_index: 125
        }
    );

    // Near the end the window backfills upward instead of shrinking.
    scroll_to(&mut grid, 199_990);
    assert_eq!(
        grid.window(),
        RowWindow {
            start_index: 9_970,
            end_index: 10_000
        }
    );
}

#[test]
fn small_collections_clamp_the_window() {
    let grid = grid_with(10, 400);
    assert_eq!(
        grid.window(),
        RowWindow {
            start_index: 0,
            end_index: 10
        }
    );
    assert_eq!(grid.surface().unwrap().rows().len(), 10);
}

#[test]
fn held_indexes_always_match_the_window() {
    let mut grid = grid_with(5_000, 400);
    let mut lcg = Lcg::new(7);
    let mut held = Vec::new();
    for _ in 0..50 {
        let offset = lcg.gen_range_u64(0, grid.content_height());
        scroll_to(&mut grid, offset);
        let window = grid.window();
        grid.collect_held_indexes(&mut held);
        held.sort_unstable();
        let expected: Vec<usize> = (window.start_index..window.end_index).collect();
        assert_eq!(held, expected);

        // Painted markers mirror the window, 1-based.
        let markers: Vec<RowMarker> = (window.start_index..window.end_index)
            .map(|i| i as RowMarker + 1)
            .collect();
        assert_eq!(grid.surface().unwrap().markers(), markers);
    }
}

#[test]
fn randomized_window_properties() {
    let mut lcg = Lcg::new(42);
    for _ in 0..40 {
        let count = lcg.gen_range_usize(1, 3_000);
        let viewport_height = lcg.gen_range_u64(1, 600) as u32;
        let buffer = lcg.gen_range_usize(0, 9);
        let items: Vec<u64> = (0..count as u64).collect();
        let mut grid = RowGrid::new(items, GridOptions::new(20, prepare).with_buffer(buffer));
        grid.set_columns(columns()).unwrap();
        grid.setup(TestSurface::new(viewport_height, 400.0));
        grid.on_frame().unwrap();

        let rendered = grid.rows_per_viewport() + 2 * buffer;
        for _ in 0..8 {
            let offset = lcg.gen_range_u64(0, grid.content_height() * 2);
            scroll_to(&mut grid, offset);
            let window = grid.window();
            assert_eq!(window.len(), cmp::min(count, rendered));
            assert!(window.end_index <= count);
            let first_visible = cmp::min((offset / 20) as usize, count - 1);
            assert!(window.contains(first_visible));
        }
    }
}

#[test]
fn overlapping_scroll_recycles_handles() {
    let mut grid = grid_with(10_000, 400);
    let surface = grid.surface().unwrap();
    assert_eq!(surface.created_rows, 30);
    let before = surface.rows();

    scroll_to(&mut grid, 2_000);
    let surface = grid.surface().unwrap();
    // Same elements, reassigned in place.
    assert_eq!(surface.created_rows, 30);
    assert_eq!(surface.removed_rows, 0);
    assert_eq!(surface.rows(), before);
}

#[test]
fn viewport_shrink_removes_surplus_handles() {
    let mut grid = grid_with(10_000, 400);
    assert_eq!(grid.surface().unwrap().rows().len(), 30);

    grid.surface_mut().unwrap().viewport_height = 200;
    grid.on_viewport_resize();
    grid.on_frame().unwrap();

    assert_eq!(grid.rows_per_viewport(), 10);
    let surface = grid.surface().unwrap();
    assert_eq!(surface.rows().len(), 20);
    assert_eq!(surface.removed_rows, 10);
}

#[test]
fn column_layout_resolves_prefix_sums_and_percentages() {
    let mut grid: RowGrid<u64, Display, TestSurface> =
        RowGrid::new(Vec::new(), GridOptions::new(20, prepare));
    grid.setup(TestSurface::new(400, 550.0));

    let resolved = grid
        .set_columns(vec![
            ColumnSpec::new("A", "a", ColumnWidth::Px(100.0)),
            ColumnSpec::new("B", "b", ColumnWidth::Pct(3.0)),
            ColumnSpec::new("C", "c", ColumnWidth::Px(50.0)),
            ColumnSpec::new("D", "d", ColumnWidth::Pct(1.0)),
        ])
        .unwrap();

    let widths: Vec<f32> = resolved.iter().map(|c| c.width_px).collect();
    let offsets: Vec<f32> = resolved.iter().map(|c| c.offset_px).collect();
    assert_eq!(widths, vec![100.0, 300.0, 50.0, 100.0]);
    assert_eq!(offsets, vec![0.0, 100.0, 400.0, 450.0]);

    // Percentage columns fill exactly the space left by fixed columns.
    let pct_sum: f32 = resolved
        .iter()
        .filter(|c| matches!(c.width, ColumnWidth::Pct(_)))
        .map(|c| c.width_px)
        .sum();
    assert!((pct_sum - 400.0).abs() < 1e-3);

    // Offsets form a strictly increasing prefix sum starting at 0.
    assert_eq!(offsets[0], 0.0);
    for pair in offsets.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn column_layout_falls_back_to_fixed_sum_without_container() {
    let mut grid: RowGrid<u64, Display, TestSurface> =
        RowGrid::new(Vec::new(), GridOptions::new(20, prepare));
    let resolved = grid.set_columns(columns()).unwrap();
    // No measured container: percentage columns get none of the width.
    assert_eq!(resolved[0].width_px, 120.0);
    assert_eq!(resolved[1].width_px, 0.0);
    assert_eq!(resolved[1].offset_px, 120.0);
}

#[test]
fn resize_only_column_update_keeps_rows() {
    let mut grid = grid_with(100, 400);
    let created = grid.surface().unwrap().created_rows;

    grid.set_columns(vec![
        ColumnSpec::new("Name", "name", ColumnWidth::Px(200.0)),
        ColumnSpec::new("Value", "value", ColumnWidth::Pct(1.0)),
    ])
    .unwrap();

    let surface = grid.surface().unwrap();
    assert_eq!(surface.created_rows, created);
    assert_eq!(surface.removed_rows, 0);

    // Bounds rewritten in place: 400px container, 200px fixed → pct gets 200.
    let row = surface.row_with_marker(1).unwrap();
    assert_eq!(surface.cell_bounds_of(row, "name"), Some((0.0, 200.0)));
    assert_eq!(surface.cell_bounds_of(row, "value"), Some((200.0, 200.0)));
}

#[test]
fn structural_column_change_rebuilds_all_rows() {
    let mut grid = grid_with(100, 400);
    assert_eq!(grid.surface().unwrap().created_rows, 30);

    grid.set_columns(vec![ColumnSpec::new("Name", "name", ColumnWidth::Px(100.0))])
        .unwrap();
    let surface = grid.surface().unwrap();
    assert_eq!(surface.removed_rows, 30);
    assert!(surface.rows().is_empty());

    grid.on_frame().unwrap();
    let surface = grid.surface().unwrap();
    assert_eq!(surface.created_rows, 60);
    assert_eq!(surface.rows().len(), 30);
}

#[test]
fn resize_only_update_before_setup_is_an_error() {
    let mut grid: RowGrid<u64, Display, TestSurface> =
        RowGrid::new(Vec::new(), GridOptions::new(20, prepare));
    grid.set_columns(columns()).unwrap();
    assert_eq!(
        grid.set_columns(columns()).unwrap_err(),
        GridError::ViewportUnbound("set_columns")
    );
}

#[test]
fn refresh_requests_coalesce_to_the_maximum_level() {
    let mut grid = grid_with(1_000, 400);
    let frames_before = grid.surface().unwrap().frame_requests;

    grid.request_refresh(RefreshLevel::NewRows);
    grid.request_refresh(RefreshLevel::Nothing);
    grid.request_refresh(RefreshLevel::AllRows);
    grid.request_refresh(RefreshLevel::NewRows);

    assert_eq!(grid.surface().unwrap().frame_requests, frames_before + 1);
    assert_eq!(grid.pending_refresh(), RefreshLevel::AllRows);

    grid.on_frame().unwrap();
    assert_eq!(grid.pending_refresh(), RefreshLevel::Nothing);
}

#[test]
fn all_rows_refresh_repaints_prepared_content() {
    PREPARE_CALLS.store(0, Ordering::Relaxed);
    let items: Vec<u64> = (0..100).collect();
    let mut grid = RowGrid::new(
        items,
        GridOptions::new(20, |item: &u64, index| {
            PREPARE_CALLS.fetch_add(1, Ordering::Relaxed);
            prepare(item, index)
        }),
    );
    grid.set_columns(columns()).unwrap();
    grid.setup(TestSurface::new(400, 400.0));
    grid.on_frame().unwrap();
    assert_eq!(PREPARE_CALLS.load(Ordering::Relaxed), 30);

    let row = grid.surface().unwrap().row_with_marker(1).unwrap();
    assert_eq!(
        grid.surface().unwrap().cell_text(row, "value").as_deref(),
        Some("0")
    );

    grid.set_source_items((500..550).collect::<Vec<u64>>());
    grid.on_frame().unwrap();

    // Every visible row was re-prepared and repainted.
    assert_eq!(PREPARE_CALLS.load(Ordering::Relaxed), 60);
    assert_eq!(grid.surface().unwrap().content_height, 1_000);
    let row = grid.surface().unwrap().row_with_marker(1).unwrap();
    assert_eq!(
        grid.surface().unwrap().cell_text(row, "value").as_deref(),
        Some("500")
    );

    // A frame with no pending request does nothing.
    grid.on_frame().unwrap();
    assert_eq!(PREPARE_CALLS.load(Ordering::Relaxed), 60);
}

#[test]
fn absent_fields_paint_as_empty_strings() {
    let mut grid = grid_with(10, 400);
    grid.set_columns(vec![
        ColumnSpec::new("Name", "name", ColumnWidth::Px(100.0)),
        ColumnSpec::new("Ghost", "ghost", ColumnWidth::Pct(1.0)),
    ])
    .unwrap();
    grid.on_frame().unwrap();

    let surface = grid.surface().unwrap();
    let row = surface.row_with_marker(1).unwrap();
    assert_eq!(surface.cell_text(row, "name").as_deref(), Some("row 0"));
    assert_eq!(surface.cell_text(row, "ghost").as_deref(), Some(""));
}

#[test]
fn custom_cell_and_row_renderers_run() {
    ROW_RENDER_CALLS.store(0, Ordering::Relaxed);
    let items: Vec<u64> = (0..100).collect();
    let mut grid = RowGrid::new(
        items,
        GridOptions::new(20, prepare).with_row_render(|_surface, _row, _display, _index| {
            ROW_RENDER_CALLS.fetch_add(1, Ordering::Relaxed);
        }),
    );
    grid.set_columns(vec![
        ColumnSpec::new("Name", "name", ColumnWidth::Px(100.0)).with_cell_render(
            |surface: &mut TestSurface, cell, _display, index| {
                surface.set_cell_text(cell, &format!("#{index}"));
            },
        ),
        ColumnSpec::new("Value", "value", ColumnWidth::Pct(1.0)),
    ])
    .unwrap();
    grid.setup(TestSurface::new(400, 400.0));
    grid.on_frame().unwrap();

    assert_eq!(ROW_RENDER_CALLS.load(Ordering::Relaxed), 30);
    let surface = grid.surface().unwrap();
    let row = surface.row_with_marker(5).unwrap();
    assert_eq!(surface.cell_text(row, "name").as_deref(), Some("#4"));
    assert_eq!(surface.cell_text(row, "value").as_deref(), Some("4"));
}

#[test]
fn rows_are_positioned_and_marked_one_based() {
    let mut grid = grid_with(10_000, 400);
    scroll_to(&mut grid, 2_000);
    let surface = grid.surface().unwrap();
    let row = surface.row_with_marker(96).unwrap();
    // Marker 96 is collection index 95, positioned at 95 × 20px.
    assert_eq!(surface.nodes[&row].row_offset, 1_900);
}

#[test]
fn event_targets_resolve_through_row_ancestry() {
    let grid = grid_with(100, 400);
    let surface = grid.surface().unwrap();
    let row = surface.row_with_marker(5).unwrap();
    let cell = surface.cell_of(row, "name").unwrap();

    assert_eq!(grid.row_index_from_event(cell), Some(4));
    assert_eq!(grid.row_index_from_event(row), Some(4));
    assert_eq!(grid.row_index_from_event(NodeId(999_999)), None);
}

#[test]
fn scroll_to_index_uses_a_nearest_edge_anchor() {
    let mut grid = grid_with(10_000, 400);
    let offset = grid.scroll_to_index(500, Some(40)).unwrap();
    assert_eq!(offset, 10_000);

    let surface = grid.surface().unwrap();
    assert_eq!(surface.anchors.last(), Some(&(10_000, 40)));
    // Target below the viewport: scrolled so anchor + margin sit at the
    // bottom edge.
    assert_eq!(surface.scroll_offset, 9_640);

    // Target above the viewport: scrolled so the anchor sits at the top.
    grid.scroll_to_index(100, None).unwrap();
    assert_eq!(grid.surface().unwrap().scroll_offset, 2_000);
}

#[test]
fn scroll_to_index_requires_setup() {
    let mut grid: RowGrid<u64, Display, TestSurface> =
        RowGrid::new((0..10u64).collect::<Vec<u64>>(), GridOptions::new(20, prepare));
    assert_eq!(
        grid.scroll_to_index(3, None).unwrap_err(),
        GridError::ViewportUnbound("scroll_to_index")
    );
}

#[test]
fn teardown_detaches_everything_and_returns_the_surface() {
    let mut grid = grid_with(100, 400);
    let surface = grid.teardown().unwrap();
    assert!(surface.rows().is_empty());
    assert!(!grid.is_bound());

    // A frame scheduled after teardown fails fast.
    grid.request_refresh(RefreshLevel::NewRows);
    assert_eq!(
        grid.on_frame().unwrap_err(),
        GridError::ViewportUnbound("on_frame")
    );
}

#[test]
fn empty_collections_render_nothing() {
    let grid = grid_with(0, 400);
    assert!(grid.window().is_empty());
    assert_eq!(grid.content_height(), 0);
    assert!(grid.surface().unwrap().rows().is_empty());
}

#[test]
fn set_row_height_recomputes_geometry() {
    let mut grid = grid_with(100, 400);
    grid.set_row_height(40);
    grid.on_frame().unwrap();

    assert_eq!(grid.rows_per_viewport(), 10);
    assert_eq!(grid.surface().unwrap().content_height, 4_000);
    assert_eq!(grid.window().len(), 20);
}

#[test]
fn pool_reconcile_reuses_spares_and_reports_the_exact_set() {
    let mut pool = RowPool::default();
    pool.reconcile(RowWindow {
        start_index: 0,
        end_index: 5,
    });
    for (nth, handle) in pool.handles_mut().iter_mut().enumerate() {
        handle.element = Some(NodeId(nth as u64 + 1));
        handle.rendered = true;
    }

    pool.reconcile(RowWindow {
        start_index: 3,
        end_index: 8,
    });

    let mut held: Vec<usize> = pool.handles().iter().filter_map(|h| h.index).collect();
    held.sort_unstable();
    assert_eq!(held, vec![3, 4, 5, 6, 7]);
    // Spares covered every new index: nothing appended, elements kept.
    assert_eq!(pool.len(), 5);
    assert!(pool.handles().iter().all(|h| h.element.is_some()));
    // Surviving indexes stay painted; reassigned ones went stale.
    for handle in pool.handles() {
        match handle.index {
            Some(3 | 4) => assert!(handle.rendered),
            Some(_) => assert!(!handle.rendered),
            None => unreachable!("no handle should be queued for removal"),
        }
    }
}

#[test]
fn scheduler_runs_one_frame_at_the_upgraded_level() {
    let mut scheduler = FrameScheduler::default();
    assert!(scheduler.request(RefreshLevel::NewRows));
    assert!(!scheduler.request(RefreshLevel::AllRows));
    assert!(!scheduler.request(RefreshLevel::NewRows));
    assert_eq!(scheduler.begin_frame(), RefreshLevel::AllRows);
    assert_eq!(scheduler.begin_frame(), RefreshLevel::Nothing);
}
