//! Orderings the playlist can be put into.

use std::cmp::Ordering;

use crate::library::Track;

/// Column a user can sort the playlist by.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortColumn {
    Track,
    Title,
    Filename,
    Path,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Library order: track number, then filename.
pub(super) fn default_order(a: &Track, b: &Track) -> Ordering {
    a.track_number
        .cmp(&b.track_number)
        .then_with(|| a.filename.cmp(&b.filename))
}

pub(super) fn compare(column: SortColumn, order: SortOrder, a: &Track, b: &Track) -> Ordering {
    let ord = match column {
        SortColumn::Track => default_order(a, b),
        SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortColumn::Filename => a.filename.to_lowercase().cmp(&b.filename.to_lowercase()),
        SortColumn::Path => a.path.cmp(&b.path),
    };
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}
