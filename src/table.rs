use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::data::filter::filtered_indices;
use crate::data::model::{Cell, Dataset, Row, display_cell};
use crate::state::{SortDirection, SortSpec, TableViewState};

// ---------------------------------------------------------------------------
// Typed comparison
// ---------------------------------------------------------------------------

/// Case-insensitive ordering; strings equal up to case put lowercase first.
///
/// An approximation of locale collation: code points of the lowercased
/// strings are compared, so accented letters sort after `z`.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Ascending order of two non-null cells: numerically when both are
/// numbers, by their text when neither is. A number sorts before text so the
/// ordering stays total on mixed columns.
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let x = a.as_text().unwrap_or_default();
            let y = b.as_text().unwrap_or_default();
            locale_cmp(&x, &y)
        }
    }
}

fn present<'a>(row: &'a Row, column: &str) -> Option<&'a Cell> {
    row.get(column).filter(|c| !c.is_null())
}

/// Stable sort of row indices by `spec`. Null or absent cells go last in
/// both directions. A column that is not a header leaves the order alone.
pub fn sort_indices(dataset: &Dataset, indices: &mut [usize], spec: &SortSpec) {
    if !dataset.has_column(&spec.column) {
        log::debug!("sort column '{}' is not a header, keeping row order", spec.column);
        return;
    }
    let column = spec.column.as_str();
    indices.sort_by(|&i, &j| {
        match (present(&dataset.rows[i], column), present(&dataset.rows[j], column)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let ord = compare_cells(a, b);
                match spec.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page metadata for the grid footer. Ranges are 1-based and inclusive;
/// both are 0 when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: usize,
    /// At least 1, even with no matching rows.
    pub total_pages: usize,
    pub range_start: usize,
    pub range_end: usize,
    pub total_filtered: usize,
}

/// `ceil(filtered / page_size)`, never below 1.
pub fn total_pages(filtered: usize, page_size: usize) -> usize {
    filtered.div_ceil(page_size.max(1)).max(1)
}

impl PageInfo {
    /// Metadata for `requested` page, clamped into `[1, total_pages]`.
    pub fn new(requested: usize, page_size: usize, total_filtered: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_filtered, page_size);
        let current_page = requested.clamp(1, total_pages);
        let (range_start, range_end) = if total_filtered == 0 {
            (0, 0)
        } else {
            (
                (current_page - 1) * page_size + 1,
                (current_page * page_size).min(total_filtered),
            )
        };
        PageInfo {
            current_page,
            total_pages,
            range_start,
            range_end,
            total_filtered,
        }
    }
}

/// One page of the interactive grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePage {
    /// Indices into `Dataset::rows`, in display order.
    pub rows: Vec<usize>,
    pub info: PageInfo,
}

impl TablePage {
    pub fn rows<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter_map(move |&i| dataset.rows.get(i))
    }

    /// Grid text, one `Vec` per row in header order, with `"-"` for null
    /// or absent cells.
    pub fn render(&self, dataset: &Dataset) -> Vec<Vec<String>> {
        self.rows(dataset)
            .map(|row| {
                dataset
                    .headers
                    .iter()
                    .map(|h| display_cell(row.get(h)))
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// View computation
// ---------------------------------------------------------------------------

/// Rows passing the current search, sorted when a sort is active.
pub fn view_indices(dataset: &Dataset, state: &TableViewState) -> Vec<usize> {
    let mut indices = filtered_indices(
        dataset,
        &state.search_term,
        state.selected_column.as_deref(),
    );
    if let Some(spec) = &state.sort {
        sort_indices(dataset, &mut indices, spec);
    }
    indices
}

/// The page of rows the grid should show for `state`. Out-of-range pages
/// are clamped.
pub fn table_page(dataset: &Dataset, state: &TableViewState) -> TablePage {
    let indices = view_indices(dataset, state);
    let info = PageInfo::new(state.page, state.page_size, indices.len());
    let rows = if info.total_filtered == 0 {
        Vec::new()
    } else {
        indices[info.range_start - 1..info.range_end].to_vec()
    };
    TablePage { rows, info }
}
