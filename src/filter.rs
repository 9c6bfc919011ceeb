//! Live table filter: case-insensitive substring matching over the
//! concatenated cell text of each row. Pure data, no UI dependency.

/// One table line as the filter sees it: a fixed lowercase text projection
/// plus the flags the rest of the application toggles on it.
pub struct Row {
    /// Index of this row in the column-major data store.
    pub data_idx: usize,
    projection: String,
    pub visible: bool,
    pub marked: bool,
}

impl Row {
    /// Builds the row from its displayed cell contents. The projection is the
    /// cells joined by a single space, lowercased once up front.
    pub fn new<'a>(data_idx: usize, cells: impl Iterator<Item = &'a str>) -> Self {
        let projection = cells.collect::<Vec<&str>>().join(" ").to_lowercase();
        Row {
            data_idx,
            projection,
            visible: true,
            marked: false,
        }
    }

    /// `needle` must already be lowercase. The empty needle matches any row.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.projection.contains(needle)
    }
}

/// Recomputes the visibility of every row from scratch: a row stays visible
/// iff its projection contains the lowercased `query` as a literal substring.
/// Idempotent, order preserving, and a no-op on an empty slice.
pub fn apply_filter(query: &str, rows: &mut [Row]) {
    let needle = query.to_lowercase();
    for row in rows.iter_mut() {
        row.visible = row.matches(&needle);
    }
}
