use alloc::sync::Arc;

use crate::NodeId;

/// Default number of buffered rows materialized beyond each viewport edge.
pub const DEFAULT_BUFFER: usize = 5;

/// Produces a row's display data from a source item.
///
/// Runs in the prepare pass, strictly before any surface mutation in the
/// same frame, so it must not touch the render surface.
pub type RowPrepareCallback<I, D> = Arc<dyn Fn(&I, usize) -> D + Send + Sync>;

/// Optional row-level hook invoked after a row's cells are painted.
pub type RowRenderCallback<D, S> = Arc<dyn Fn(&mut S, NodeId, &D, usize) + Send + Sync>;

/// Configuration for [`crate::RowGrid`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
pub struct GridOptions<I, D, S> {
    /// Fixed pixel height of every row. Must be positive.
    pub row_height: u32,
    /// Rows materialized beyond each edge of the viewport.
    pub buffer: usize,
    pub row_prepare: RowPrepareCallback<I, D>,
    pub row_render: Option<RowRenderCallback<D, S>>,
}

impl<I, D, S> GridOptions<I, D, S> {
    pub fn new(row_height: u32, row_prepare: impl Fn(&I, usize) -> D + Send + Sync + 'static) -> Self {
        debug_assert!(row_height > 0, "row height must be positive");
        Self {
            row_height,
            buffer: DEFAULT_BUFFER,
            row_prepare: Arc::new(row_prepare),
            row_render: None,
        }
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_row_render(
        mut self,
        f: impl Fn(&mut S, NodeId, &D, usize) + Send + Sync + 'static,
    ) -> Self {
        self.row_render = Some(Arc::new(f));
        self
    }
}

impl<I, D, S> Clone for GridOptions<I, D, S> {
    fn clone(&self) -> Self {
        Self {
            row_height: self.row_height,
            buffer: self.buffer,
            row_prepare: Arc::clone(&self.row_prepare),
            row_render: self.row_render.clone(),
        }
    }
}

impl<I, D, S> core::fmt::Debug for GridOptions<I, D, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridOptions")
            .field("row_height", &self.row_height)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
