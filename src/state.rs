use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::charts::{ChartData, ChartKind, ChartSelection, DatasetSummary, build_chart};
use crate::analysis::inference::{DatasetProfile, infer_profiles_with};
use crate::config::AnalysisConfig;
use crate::data::filter::filtered_indices;
use crate::data::model::Dataset;
use crate::export::{CsvExport, export_rows};
use crate::table::{PageInfo, TablePage, table_page, total_pages, view_indices};

// ---------------------------------------------------------------------------
// Table view state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Ephemeral grid state owned by the UI. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableViewState {
    pub search_term: String,
    /// Restrict the search to one column; `None` searches every column.
    pub selected_column: Option<String>,
    pub sort: Option<SortSpec>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self::with_page_size(10)
    }
}

impl TableViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            selected_column: None,
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the search term and go back to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn select_column(&mut self, column: Option<String>) {
        self.selected_column = column;
    }

    /// Header click: the sorted column flips direction, any other column
    /// starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = Some(match self.sort.take() {
            Some(spec) if spec.column == column => SortSpec {
                direction: spec.direction.flipped(),
                ..spec
            },
            _ => SortSpec {
                column: column.to_string(),
                direction: SortDirection::Asc,
            },
        });
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Move to `page`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.go_to_page(self.page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The loaded dataset with everything derived from it, independent of
/// rendering.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    dataset: Option<Dataset>,
    /// Column profile of `dataset`; replaced together with it.
    profile: Option<DatasetProfile>,
    pub config: AnalysisConfig,
    pub table: TableViewState,
    pub selection: ChartSelection,
    /// Status / error message for the UI.
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            table: TableViewState::with_page_size(config.page_size),
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset: profile it, reset the grid and pick
    /// the default chart columns.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let profile = infer_profiles_with(&dataset, &self.config);
        self.selection = ChartSelection::defaults(&profile);
        self.table = TableViewState::with_page_size(self.config.page_size);
        log::info!(
            "dataset ready: {} rows, {} columns, selection {:?}",
            dataset.len(),
            dataset.headers.len(),
            self.selection
        );
        self.profile = Some(profile);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn profile(&self) -> Option<&DatasetProfile> {
        self.profile.as_ref()
    }

    pub fn summary(&self) -> Option<DatasetSummary> {
        Some(DatasetSummary::new(self.dataset.as_ref()?, self.profile.as_ref()?))
    }

    pub fn chart(&self, kind: ChartKind) -> Option<ChartData> {
        let dataset = self.dataset.as_ref()?;
        let profile = self.profile.as_ref()?;
        Some(build_chart(dataset, profile, kind, &self.selection, &self.config))
    }

    /// Current grid page. Clamps the stored page if a filter change left it
    /// out of range.
    pub fn table_page(&mut self) -> Option<TablePage> {
        let dataset = self.dataset.as_ref()?;
        let page = table_page(dataset, &self.table);
        self.table.page = page.info.current_page;
        Some(page)
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        let dataset = self.dataset.as_ref()?;
        let filtered = view_indices(dataset, &self.table).len();
        Some(PageInfo::new(self.table.page, self.table.page_size, filtered))
    }

    pub fn next_page(&mut self) {
        if let Some(info) = self.page_info() {
            self.table.next_page(info.total_pages);
        }
    }

    pub fn prev_page(&mut self) {
        self.table.prev_page();
    }

    pub fn go_to_page(&mut self, page: usize) {
        if let Some(dataset) = &self.dataset {
            let filtered = view_indices(dataset, &self.table).len();
            self.table
                .go_to_page(page, total_pages(filtered, self.table.page_size));
        }
    }

    /// CSV of the rows passing the current search, in dataset order.
    /// `None` when nothing is loaded or nothing matches.
    pub fn export(&self, date: NaiveDate) -> Option<CsvExport> {
        let dataset = self.dataset.as_ref()?;
        let indices = filtered_indices(
            dataset,
            &self.table.search_term,
            self.table.selected_column.as_deref(),
        );
        export_rows(dataset, &indices, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, Row};

    fn numbered(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| {
                Row::from([
                    ("id".to_string(), Cell::Number(i as f64)),
                    (
                        "tag".to_string(),
                        Cell::raw(if i % 2 == 0 { "even" } else { "odd" }),
                    ),
                ])
            })
            .collect();
        Dataset::new(vec!["id".into(), "tag".into()], rows)
    }

    #[test]
    fn test_toggle_sort() {
        let mut t = TableViewState::default();
        t.toggle_sort("a");
        assert_eq!(t.sort.as_ref().unwrap().direction, SortDirection::Asc);
        t.toggle_sort("a");
        assert_eq!(t.sort.as_ref().unwrap().direction, SortDirection::Desc);
        t.toggle_sort("a");
        assert_eq!(t.sort.as_ref().unwrap().direction, SortDirection::Asc);
        t.toggle_sort("a");
        t.toggle_sort("b");
        let spec = t.sort.as_ref().unwrap();
        assert_eq!((spec.column.as_str(), spec.direction), ("b", SortDirection::Asc));
    }

    #[test]
    fn test_search_resets_page() {
        let mut t = TableViewState::default();
        t.go_to_page(3, 5);
        assert_eq!(t.page, 3);
        t.set_search("x");
        assert_eq!(t.page, 1);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut t = TableViewState::default();
        t.prev_page();
        assert_eq!(t.page, 1);
        t.go_to_page(10, 3);
        assert_eq!(t.page, 3);
        t.next_page(3);
        assert_eq!(t.page, 3);
        t.go_to_page(2, 0);
        assert_eq!(t.page, 1);
    }

    #[test]
    fn test_dashboard_clamps_after_filter_change() {
        let mut state = DashboardState::new(AnalysisConfig::default());
        state.set_dataset(numbered(45));
        state.go_to_page(5);
        assert_eq!(state.table.page, 5);

        // Searching resets to page 1; an explicit stale page is clamped.
        state.table.search_term = "odd".into();
        let page = state.table_page().unwrap();
        assert_eq!(page.info.total_filtered, 22);
        assert_eq!(page.info.current_page, 3);
        assert_eq!(state.table.page, 3);
    }

    #[test]
    fn test_dashboard_profile_follows_dataset() {
        let mut state = DashboardState::default();
        assert!(state.summary().is_none());
        assert!(state.chart(ChartKind::Distribution).is_none());

        state.set_dataset(numbered(4));
        assert_eq!(state.selection.numeric.as_deref(), Some("id"));
        assert_eq!(state.selection.categorical.as_deref(), Some("tag"));

        let other = Dataset::new(
            vec!["city".into()],
            vec![Row::from([("city".to_string(), Cell::raw("NYC"))])],
        );
        state.set_dataset(other);
        let summary = state.summary().unwrap();
        assert!(summary.numeric_columns.is_empty());
        assert_eq!(summary.categorical_columns, vec!["city"]);
        assert!(state.selection.numeric.is_none());
    }

    #[test]
    fn test_dashboard_export_respects_search() {
        let mut state = DashboardState::default();
        state.set_dataset(numbered(4));
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();

        state.table.set_search("odd");
        let export = state.export(date).unwrap();
        assert_eq!(export.content, "id,tag\n1,odd\n3,odd");

        state.table.set_search("nothing matches");
        assert!(state.export(date).is_none());
    }
}
