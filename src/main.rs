use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rusty_dash::data::loader::load_file;
use rusty_dash::{
    AnalysisConfig, ChartData, ChartKind, DashboardState, DatasetProfile, DatasetSummary, PageInfo,
    SortDirection,
};

#[derive(Parser, Debug)]
#[command(
    name = "rusty-dash",
    about = "Profile a CSV/JSON dataset and print the data behind its dashboard",
    after_help = "Examples:\n  \
      rusty-dash sales.csv                              # Summary, charts and first page\n  \
      rusty-dash sales.csv --search \"north widget\"      # Rows containing both terms\n  \
      rusty-dash sales.csv --sort units --desc --page 2 # Sorted, second page\n  \
      rusty-dash sales.csv --search east --export out.csv\n  \
      rusty-dash sales.csv --json > report.json"
)]
struct Cli {
    /// Input file (.csv or .json)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// JSON file overriding analysis settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Whitespace-separated search terms; every term must match
    #[arg(long, default_value = "")]
    search: String,

    /// Restrict the search to one column
    #[arg(long)]
    column: Option<String>,

    /// Sort the table by this column
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Table page to show (1-based, clamped)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Write the filtered rows to this CSV file
    #[arg(short = 'o', long)]
    export: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct TableReport {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    info: PageInfo,
}

#[derive(Serialize)]
struct Report {
    summary: DatasetSummary,
    profile: DatasetProfile,
    charts: Vec<ChartData>,
    table: TableReport,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let dataset = load_file(&cli.file)
        .with_context(|| format!("loading {}", cli.file.display()))?;

    let mut state = DashboardState::new(config);
    state.set_dataset(dataset);
    state.table.set_search(cli.search.as_str());
    state.table.select_column(cli.column.clone());
    if let Some(column) = &cli.sort {
        state.table.toggle_sort(column);
        if cli.desc {
            state.table.toggle_sort(column);
        }
    }
    state.go_to_page(cli.page);

    let report = build_report(&mut state).context("no dataset loaded")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, state.table.sort.as_ref().map(|s| s.direction));
    }

    if let Some(path) = &cli.export {
        let today = chrono::Local::now().date_naive();
        match state.export(today) {
            Some(export) => {
                std::fs::write(path, &export.content)
                    .with_context(|| format!("writing {}", path.display()))?;
                log::info!(
                    "wrote {} ({}), suggested name {}",
                    path.display(),
                    export.mime,
                    export.filename
                );
            }
            None => log::warn!("nothing to export for the current search"),
        }
    }

    Ok(())
}

fn build_report(state: &mut DashboardState) -> Option<Report> {
    let summary = state.summary()?;
    let profile = state.profile()?.clone();
    let charts = ChartKind::ALL
        .iter()
        .filter_map(|&kind| state.chart(kind))
        .collect();
    let page = state.table_page()?;
    let dataset = state.dataset()?;
    Some(Report {
        summary,
        profile,
        charts,
        table: TableReport {
            headers: dataset.headers.clone(),
            rows: page.render(dataset),
            info: page.info,
        },
    })
}

fn print_report(report: &Report, direction: Option<SortDirection>) {
    let s = &report.summary;
    println!("{} rows x {} columns", s.row_count, s.column_count);
    println!("  numeric:     {}", s.numeric_columns.join(", "));
    println!("  categorical: {}", s.categorical_columns.join(", "));
    println!(
        "  temporal:    {}",
        s.temporal_column.as_deref().unwrap_or("-")
    );
    println!();

    for chart in &report.charts {
        match chart {
            ChartData::Distribution { column, summary } => println!(
                "[distribution] {column}: n={} mean={:.3} median={:.3} q1={:.3} q3={:.3} sd={:.3} bins={}",
                summary.count,
                summary.mean,
                summary.median,
                summary.q1,
                summary.q3,
                summary.std_dev,
                summary.histogram.len()
            ),
            ChartData::Box { column, summary } => println!(
                "[box] {column}: fences [{:.3}, {:.3}], {} outliers",
                summary.lower_fence,
                summary.upper_fence,
                summary.outliers.len()
            ),
            ChartData::TimeSeries {
                time_column,
                value_column,
                points,
            } => println!(
                "[time series] {} x {value_column}: {} points",
                time_column.as_deref().unwrap_or("-"),
                points.len()
            ),
            ChartData::Category { column, view, .. } => {
                let parts: Vec<String> = view
                    .categories
                    .iter()
                    .zip(&view.counts)
                    .map(|(label, count)| format!("{label}={count}"))
                    .collect();
                println!("[category] {column}: {}", parts.join(" "));
            }
            ChartData::Correlation(pairs) => println!(
                "[correlation] {} x {}: {} pairs",
                pairs.x_column,
                pairs.y_column,
                pairs.points.len()
            ),
            ChartData::Unavailable { kind, reason } => {
                println!("[{}] omitted: {reason}", kind.title())
            }
        }
    }
    println!();

    let t = &report.table;
    println!("{}", t.headers.join(" | "));
    for row in &t.rows {
        println!("{}", row.join(" | "));
    }
    let order = match direction {
        Some(SortDirection::Asc) => " (ascending)",
        Some(SortDirection::Desc) => " (descending)",
        None => "",
    };
    println!(
        "Showing {} to {} of {} entries{order} - page {} of {}",
        t.info.range_start,
        t.info.range_end,
        t.info.total_filtered,
        t.info.current_page,
        t.info.total_pages
    );
}
