/// Severity of the work the next scheduled frame must perform.
///
/// Multiple refresh requests arriving before the frame fires coalesce to the
/// maximum requested level; the derived `Ord` follows declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefreshLevel {
    /// No pending work.
    #[default]
    Nothing,
    /// Only rows entering the window need their content written.
    NewRows,
    /// Every materialized row must be repainted.
    AllRows,
}

/// The contiguous range of collection indexes that must be materialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl RowWindow {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// The 1-based marker painted onto every materialized row.
///
/// External collaborators (selection, keyboard helpers) read this back to
/// correlate surface events with collection indexes; `0` never appears on a
/// painted row.
pub type RowMarker = u64;
