use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp;

use crate::columns::{resolve_columns, same_key_sequence};
use crate::pool::RowPool;
use crate::scheduler::FrameScheduler;
use crate::{
    Column, ColumnSpec, GridError, GridOptions, NodeId, RefreshLevel, RenderSurface, RowData,
    RowWindow,
};

/// A headless virtualized row-grid engine.
///
/// This type is intentionally UI-agnostic:
/// - It holds no platform objects beyond opaque [`NodeId`]s.
/// - Your adapter drives it by forwarding scroll/resize events and invoking
///   [`Self::on_frame`] once per granted animation frame.
/// - All surface mutation flows through the [`RenderSurface`] bound via
///   [`Self::setup`].
///
/// Generic over the source item type `I`, the prepared display-data type
/// `D` (looked up by column key, see [`RowData`]) and the surface `S`.
pub struct RowGrid<I, D, S> {
    options: GridOptions<I, D, S>,
    items: Arc<[I]>,
    columns: Vec<Column<D, S>>,
    pool: RowPool,
    scheduler: FrameScheduler,
    surface: Option<S>,
    rows_per_viewport: usize,
    window: RowWindow,
}

impl<I, D: RowData, S: RenderSurface> RowGrid<I, D, S> {
    pub fn new(items: impl Into<Arc<[I]>>, options: GridOptions<I, D, S>) -> Self {
        let items = items.into();
        gdebug!(
            count = items.len(),
            row_height = options.row_height,
            buffer = options.buffer,
            "RowGrid::new"
        );
        Self {
            options,
            items,
            columns: Vec::new(),
            pool: RowPool::default(),
            scheduler: FrameScheduler::default(),
            surface: None,
            rows_per_viewport: 0,
            window: RowWindow::EMPTY,
        }
    }

    pub fn options(&self) -> &GridOptions<I, D, S> {
        &self.options
    }

    pub fn items(&self) -> &Arc<[I]> {
        &self.items
    }

    pub fn row_count(&self) -> usize {
        self.items.len()
    }

    /// The latest resolved column list (absolute widths and offsets).
    pub fn columns(&self) -> &[Column<D, S>] {
        &self.columns
    }

    /// The window computed by the most recent frame.
    pub fn window(&self) -> RowWindow {
        self.window
    }

    pub fn rows_per_viewport(&self) -> usize {
        self.rows_per_viewport
    }

    pub fn buffer(&self) -> usize {
        self.options.buffer
    }

    pub fn row_height(&self) -> u32 {
        self.options.row_height
    }

    /// Logical height of the scrollable content.
    pub fn content_height(&self) -> u64 {
        self.items.len() as u64 * self.options.row_height as u64
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// The refresh severity the next frame will execute at.
    pub fn pending_refresh(&self) -> RefreshLevel {
        self.scheduler.pending()
    }

    /// Largest meaningful scroll offset for the current geometry.
    pub fn max_scroll_offset(&self) -> u64 {
        let viewport = self
            .surface
            .as_ref()
            .map(|surface| surface.viewport_height())
            .unwrap_or(0);
        self.content_height().saturating_sub(viewport as u64)
    }

    /// Collects the indexes currently held by the row pool into `out`
    /// (clears `out` first).
    pub fn collect_held_indexes(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(self.pool.handles().iter().filter_map(|handle| handle.index));
    }

    /// Replaces the backing collection wholesale.
    ///
    /// Recomputes the scrollable content height and forces a full repaint of
    /// every materialized row on the next frame.
    pub fn set_source_items(&mut self, items: impl Into<Arc<[I]>>) {
        self.items = items.into();
        gdebug!(count = self.items.len(), "set_source_items");
        let height = self.content_height();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_content_height(height);
        }
        self.request_refresh(RefreshLevel::AllRows);
    }

    /// Replaces the column list and resolves the layout.
    ///
    /// An update that keeps the previous key sequence is resize-only: the
    /// bounds of existing materialized cells are rewritten in place, no row
    /// is destroyed or recreated. Any other change destroys all materialized
    /// rows, clears the pool and schedules a rebuild.
    ///
    /// Returns the resolved column list.
    pub fn set_columns(
        &mut self,
        specs: Vec<ColumnSpec<D, S>>,
    ) -> Result<&[Column<D, S>], GridError> {
        let resize_only = !self.columns.is_empty() && same_key_sequence(&self.columns, &specs);
        let container_width = self
            .surface
            .as_ref()
            .and_then(|surface| surface.container_width());
        let next = resolve_columns(specs, container_width);
        gdebug!(columns = next.len(), resize_only, "set_columns");

        if resize_only {
            let surface = self
                .surface
                .as_mut()
                .ok_or(GridError::ViewportUnbound("set_columns"))?;
            for handle in self.pool.handles() {
                if handle.element.is_none() {
                    continue;
                }
                for (cell, column) in handle.cells.iter().zip(&next) {
                    surface.set_cell_bounds(*cell, column.offset_px, column.width_px);
                }
            }
            self.columns = next;
        } else {
            if let Some(surface) = self.surface.as_mut() {
                self.pool.clear(|row| surface.remove_row(row));
            } else {
                self.pool.clear(|_| {});
            }
            self.columns = next;
            self.request_refresh(RefreshLevel::NewRows);
        }
        Ok(&self.columns)
    }

    /// Binds the engine to a mounted render surface.
    ///
    /// Measures the viewport, applies the content height, re-resolves the
    /// column layout against the now-measured container width, and schedules
    /// the initial build frame. [`Self::teardown`] releases the surface
    /// again.
    pub fn setup(&mut self, surface: S) {
        self.surface = Some(surface);
        self.sync_viewport();
        self.relayout_columns();
        self.scheduler.request(RefreshLevel::NewRows);
        if let Some(surface) = self.surface.as_mut() {
            surface.request_frame();
        }
        gdebug!(rows_per_viewport = self.rows_per_viewport, "setup");
    }

    /// Unbinds the engine, removing every materialized row.
    ///
    /// Returns the surface so the caller can release platform listeners and
    /// observers.
    pub fn teardown(&mut self) -> Option<S> {
        let mut surface = self.surface.take()?;
        self.pool.clear(|row| surface.remove_row(row));
        self.scheduler.reset();
        self.rows_per_viewport = 0;
        self.window = RowWindow::EMPTY;
        gdebug!("teardown");
        Some(surface)
    }

    /// Scroll event entry point; schedules a window recomputation.
    pub fn on_scroll(&mut self) {
        self.request_refresh(RefreshLevel::NewRows);
    }

    /// Container resize entry point.
    ///
    /// Re-reads viewport geometry first so the next window computation sees
    /// the new rows-per-viewport, then schedules a refresh.
    pub fn on_viewport_resize(&mut self) {
        self.sync_viewport();
        self.request_refresh(RefreshLevel::NewRows);
    }

    /// Upgrades the pending refresh severity, scheduling a platform frame
    /// callback if none is outstanding.
    pub fn request_refresh(&mut self, level: RefreshLevel) {
        if self.scheduler.request(level) {
            if let Some(surface) = self.surface.as_mut() {
                surface.request_frame();
            }
        }
    }

    /// The coalesced frame callback.
    ///
    /// Recomputes the window, reconciles the pool, applies `AllRows`
    /// invalidation, then runs the renderer. A pending level of `Nothing`
    /// is a no-op.
    pub fn on_frame(&mut self) -> Result<(), GridError> {
        let level = self.scheduler.begin_frame();
        if level == RefreshLevel::Nothing {
            return Ok(());
        }
        let surface = self
            .surface
            .as_ref()
            .ok_or(GridError::ViewportUnbound("on_frame"))?;
        let window = self.compute_window(surface.scroll_offset());
        gtrace!(
            start = window.start_index,
            end = window.end_index,
            all_rows = (level == RefreshLevel::AllRows),
            "on_frame"
        );
        self.window = window;
        self.pool.reconcile(window);
        if level == RefreshLevel::AllRows {
            self.pool.invalidate_visible();
        }
        self.render_frame()
    }

    /// Scrolls the viewport so `index` becomes visible.
    ///
    /// Positions a zero-content anchor at the row's offset and asks the
    /// surface to bring it into view along the nearest edge, honoring an
    /// optional bottom margin. The row does not need to be materialized.
    /// Returns the anchor offset.
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        scroll_margin_bottom: Option<u32>,
    ) -> Result<u64, GridError> {
        let surface = self
            .surface
            .as_mut()
            .ok_or(GridError::ViewportUnbound("scroll_to_index"))?;
        let index = cmp::min(index, self.items.len().saturating_sub(1));
        let offset = index as u64 * self.options.row_height as u64;
        surface.scroll_anchor_into_view(offset, scroll_margin_bottom.unwrap_or(0));
        gdebug!(index, offset, "scroll_to_index");
        Ok(offset)
    }

    /// Resolves the nearest ancestor row marker of an event target and
    /// returns its 0-based collection index.
    ///
    /// `None` when no marked row encloses the target, or when no surface is
    /// bound (nothing is materialized then).
    pub fn row_index_from_event(&self, target: NodeId) -> Option<usize> {
        let surface = self.surface.as_ref()?;
        let mut node = Some(target);
        while let Some(current) = node {
            if let Some(marker) = surface.row_marker_of(current) {
                return (marker > 0).then(|| (marker - 1) as usize);
            }
            node = surface.parent_of(current);
        }
        None
    }

    /// Changes the fixed row height, recomputing geometry and forcing a
    /// full repaint.
    pub fn set_row_height(&mut self, row_height: u32) {
        debug_assert!(row_height > 0, "row height must be positive");
        if self.options.row_height == row_height {
            return;
        }
        self.options.row_height = row_height;
        self.sync_viewport();
        self.request_refresh(RefreshLevel::AllRows);
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        if self.options.buffer == buffer {
            return;
        }
        self.options.buffer = buffer;
        self.request_refresh(RefreshLevel::NewRows);
    }

    /// Re-reads viewport geometry from the surface: rows-per-viewport from
    /// the viewport height, content height onto the scrollable spacer.
    fn sync_viewport(&mut self) {
        let height = self.content_height();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let viewport_height = surface.viewport_height();
        self.rows_per_viewport = viewport_height.div_ceil(self.options.row_height) as usize;
        surface.set_content_height(height);
        gtrace!(
            viewport_height,
            rows_per_viewport = self.rows_per_viewport,
            "sync_viewport"
        );
    }

    /// Re-resolves column widths/offsets against the current container
    /// width, keeping the authored widths.
    fn relayout_columns(&mut self) {
        if self.columns.is_empty() {
            return;
        }
        let container_width = self
            .surface
            .as_ref()
            .and_then(|surface| surface.container_width());
        let specs: Vec<ColumnSpec<D, S>> = self
            .columns
            .drain(..)
            .map(|column| ColumnSpec {
                name: column.name,
                key: column.key,
                width: column.width,
                cell_render: column.cell_render,
            })
            .collect();
        self.columns = resolve_columns(specs, container_width);
    }

    /// Maps a scroll offset to the contiguous index window that must be
    /// materialized.
    fn compute_window(&self, scroll_offset: u64) -> RowWindow {
        let count = self.items.len();
        if count == 0 || self.rows_per_viewport == 0 {
            return RowWindow::EMPTY;
        }
        let rendered = self.rows_per_viewport + 2 * self.options.buffer;
        let first = (scroll_offset / self.options.row_height as u64) as usize;
        let start = first.saturating_sub(self.options.buffer);
        let end = cmp::min(count, start.saturating_add(rendered));
        // Near the end of the collection the clipped window backfills upward
        // instead of shrinking.
        let start = if end.saturating_sub(start) < rendered {
            end.saturating_sub(rendered)
        } else {
            start
        };
        RowWindow {
            start_index: start,
            end_index: end,
        }
    }

    /// The renderer: three passes in strict order, then a sweep.
    fn render_frame(&mut self) -> Result<(), GridError> {
        let RowGrid {
            options,
            items,
            columns,
            pool,
            surface,
            ..
        } = self;
        let Some(surface) = surface.as_mut() else {
            return Err(GridError::ViewportUnbound("render"));
        };

        // Prepare: produce display data before any surface mutation so
        // preparation side effects cannot observe a half-updated tree.
        let handles = pool.handles_mut();
        let mut prepared: Vec<Option<D>> = Vec::with_capacity(handles.len());
        for handle in handles.iter() {
            prepared.push(match handle.index {
                Some(index) if !handle.rendered => {
                    Some((options.row_prepare)(&items[index], index))
                }
                _ => None,
            });
        }

        // Materialize: a row container plus one tagged cell per column.
        // Pool order, not index order; positioning is absolute.
        for handle in handles.iter_mut() {
            if handle.element.is_some() || handle.index.is_none() {
                continue;
            }
            let row = surface.create_row();
            handle.cells.clear();
            handle.cells.reserve_exact(columns.len());
            for column in columns.iter() {
                let cell = surface.create_cell(row, &column.key);
                surface.set_cell_bounds(cell, column.offset_px, column.width_px);
                handle.cells.push(cell);
            }
            handle.element = Some(row);
        }

        // Paint.
        for (slot, handle) in handles.iter_mut().enumerate() {
            let Some(index) = handle.index else { continue };
            if handle.rendered {
                continue;
            }
            let row = handle.element.ok_or(GridError::MissingRowElement { index })?;
            let Some(display) = prepared[slot].take() else {
                gwarn!(index, "paint reached a stale handle with no prepared data");
                debug_assert!(false, "stale handle without prepared data (index={index})");
                continue;
            };
            surface.set_row_offset(row, index as u64 * options.row_height as u64);
            surface.set_row_marker(row, index as u64 + 1);
            for (nth, column) in columns.iter().enumerate() {
                let cell = handle
                    .cells
                    .get(nth)
                    .copied()
                    .ok_or(GridError::MissingRowElement { index })?;
                match &column.cell_render {
                    Some(render) => render(surface, cell, &display, index),
                    None => {
                        let text = display.field(&column.key).unwrap_or(Cow::Borrowed(""));
                        surface.set_cell_text(cell, &text);
                    }
                }
            }
            if let Some(render) = &options.row_render {
                render(surface, row, &display, index);
            }
            handle.rendered = true;
        }

        // Sweep handles queued for removal.
        pool.sweep(|row| surface.remove_row(row));
        Ok(())
    }
}

impl<I, D, S> core::fmt::Debug for RowGrid<I, D, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RowGrid")
            .field("rows", &self.items.len())
            .field("columns", &self.columns.len())
            .field("window", &self.window)
            .field("rows_per_viewport", &self.rows_per_viewport)
            .field("handles", &self.pool.len())
            .field("bound", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}
