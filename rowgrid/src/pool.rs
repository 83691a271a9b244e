use alloc::vec::Vec;

use crate::{NodeId, RowWindow};

/// The pooled record tracking one materialized row.
#[derive(Clone, Debug, Default)]
pub(crate) struct RowHandle {
    /// `None` until the materialize pass creates the row container.
    pub element: Option<NodeId>,
    /// One cell per column, in column order. Filled by materialization.
    pub cells: Vec<NodeId>,
    /// `None` marks the handle for removal in the next sweep.
    pub index: Option<usize>,
    /// Cleared whenever content must be rewritten before the next paint.
    pub rendered: bool,
}

/// The recycling pool.
///
/// Handles whose index falls out of the window are reassigned to indexes
/// entering it instead of being destroyed and recreated.
#[derive(Clone, Debug, Default)]
pub(crate) struct RowPool {
    handles: Vec<RowHandle>,
}

impl RowPool {
    pub(crate) fn handles(&self) -> &[RowHandle] {
        &self.handles
    }

    pub(crate) fn handles_mut(&mut self) -> &mut [RowHandle] {
        &mut self.handles
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Diffs the pool against a freshly computed window.
    ///
    /// Still-visible handles keep their index. Out-of-range handles are
    /// reassigned to indexes newly entering the window with stale content;
    /// leftovers are queued for removal, and unmet indexes get fresh handles
    /// awaiting materialization. Which spare handle pairs with which new
    /// index is unspecified (currently last-in-first-out); only the
    /// resulting index set is contractual.
    pub(crate) fn reconcile(&mut self, window: RowWindow) {
        let mut held = alloc::vec![false; window.len()];
        let mut spare: Vec<usize> = Vec::new();

        for (slot, handle) in self.handles.iter().enumerate() {
            match handle.index {
                Some(index) if window.contains(index) => {
                    held[index - window.start_index] = true;
                }
                Some(_) => spare.push(slot),
                None => {}
            }
        }

        for (nth, taken) in held.iter().enumerate() {
            if *taken {
                continue;
            }
            let index = window.start_index + nth;
            if let Some(slot) = spare.pop() {
                let handle = &mut self.handles[slot];
                handle.index = Some(index);
                handle.rendered = false;
            } else {
                self.handles.push(RowHandle {
                    element: None,
                    cells: Vec::new(),
                    index: Some(index),
                    rendered: false,
                });
            }
        }

        for slot in spare {
            let handle = &mut self.handles[slot];
            handle.index = None;
            handle.rendered = false;
        }
    }

    /// Marks every handle that still maps to an index as stale.
    pub(crate) fn invalidate_visible(&mut self) {
        for handle in &mut self.handles {
            if handle.index.is_some() {
                handle.rendered = false;
            }
        }
    }

    /// Drops every handle whose index is `None`, handing materialized
    /// elements to `detach` first.
    pub(crate) fn sweep(&mut self, mut detach: impl FnMut(NodeId)) {
        self.handles.retain(|handle| {
            if handle.index.is_some() {
                return true;
            }
            if let Some(element) = handle.element {
                detach(element);
            }
            false
        });
    }

    /// Empties the pool entirely, handing each materialized element to
    /// `detach`. Used by structural column changes and teardown.
    pub(crate) fn clear(&mut self, mut detach: impl FnMut(NodeId)) {
        for handle in self.handles.drain(..) {
            if let Some(element) = handle.element {
                detach(element);
            }
        }
    }
}
