use core::cmp;

use rowgrid::{GridError, RenderSurface, RowData, RowGrid};

use crate::{ScrollKey, SimSurface};

/// A framework-neutral driver that wraps a [`RowGrid`] and provides common
/// adapter workflows: attaching/detaching a surface, keyboard scroll
/// shortcuts, and (for [`SimSurface`]) a frame pump.
///
/// This type holds no UI objects. A platform adapter forwards its events:
/// - scroll events → [`RowGrid::on_scroll`] via [`Self::grid_mut`]
/// - resize observations → [`RowGrid::on_viewport_resize`]
/// - keyboard shortcuts → [`Self::on_key`]
/// - granted animation frames → [`RowGrid::on_frame`]
pub struct GridDriver<I, D, S> {
    grid: RowGrid<I, D, S>,
}

impl<I, D: RowData, S: RenderSurface> GridDriver<I, D, S> {
    pub fn new(grid: RowGrid<I, D, S>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &RowGrid<I, D, S> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut RowGrid<I, D, S> {
        &mut self.grid
    }

    pub fn into_grid(self) -> RowGrid<I, D, S> {
        self.grid
    }

    /// Binds the engine to a mounted surface; mirrors [`RowGrid::setup`].
    pub fn attach(&mut self, surface: S) {
        self.grid.setup(surface);
    }

    /// Unbinds the engine and hands the surface back so the caller can
    /// release platform listeners.
    pub fn detach(&mut self) -> Option<S> {
        self.grid.teardown()
    }

    /// Routes a keyboard scroll shortcut.
    ///
    /// Returns `true` when handled (a surface is bound). Page steps move by
    /// one viewport height; End lands on the largest meaningful offset.
    pub fn on_key(&mut self, key: ScrollKey) -> bool {
        let max = self.grid.max_scroll_offset();
        let Some(surface) = self.grid.surface_mut() else {
            return false;
        };
        let view = surface.viewport_height() as u64;
        let current = surface.scroll_offset();
        let next = match key {
            ScrollKey::Home => 0,
            ScrollKey::End => max,
            ScrollKey::PageUp => current.saturating_sub(view),
            ScrollKey::PageDown => cmp::min(max, current.saturating_add(view)),
        };
        surface.set_scroll_offset(next);
        self.grid.on_scroll();
        true
    }
}

impl<I, D: RowData> GridDriver<I, D, SimSurface> {
    /// Runs engine frames while the simulated surface has one requested.
    ///
    /// Returns the number of frames executed. With the engine's coalescing
    /// this is 0 or 1 per burst of requests.
    pub fn pump(&mut self) -> Result<usize, GridError> {
        let mut frames = 0;
        loop {
            let requested = match self.grid.surface_mut() {
                Some(surface) => surface.take_frame_request(),
                None => false,
            };
            if !requested {
                break;
            }
            self.grid.on_frame()?;
            frames += 1;
        }
        Ok(frames)
    }
}
