use super::model::{Cell, Dataset, Row};

// ---------------------------------------------------------------------------
// Search predicate: AND across tokens, OR across columns
// ---------------------------------------------------------------------------

/// Lower-cased, whitespace-separated search tokens. Empty tokens are dropped.
pub fn search_tokens(term: &str) -> Vec<String> {
    term.split_whitespace().map(str::to_lowercase).collect()
}

fn cell_contains(cell: &Cell, token: &str) -> bool {
    match cell.as_text() {
        Some(text) => text.to_lowercase().contains(token),
        None => false,
    }
}

/// Whether `row` passes the search.
///
/// A row passes when every token is found:
/// * in the `column` cell, when a column is given
/// * in any cell of the row otherwise
///
/// Null or absent cells never contain a token. No tokens → passes.
pub fn row_matches(row: &Row, tokens: &[String], column: Option<&str>) -> bool {
    tokens.iter().all(|token| match column {
        Some(col) => row.get(col).is_some_and(|cell| cell_contains(cell, token)),
        None => row.values().any(|cell| cell_contains(cell, token)),
    })
}

/// Return indices of rows that pass the search, in dataset order.
///
/// A `column` that is not one of the dataset headers is ignored and the
/// search runs over all columns.
pub fn filtered_indices(dataset: &Dataset, search: &str, column: Option<&str>) -> Vec<usize> {
    let tokens = search_tokens(search);
    if tokens.is_empty() {
        return (0..dataset.len()).collect();
    }
    let column = column.filter(|c| {
        let known = dataset.has_column(c);
        if !known {
            log::debug!("search column '{c}' is not a header, searching all columns");
        }
        known
    });

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &tokens, column))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        let row = |name: &str, city: Option<&str>| {
            Row::from([
                ("name".to_string(), Cell::from(name)),
                ("city".to_string(), Cell::from(city)),
            ])
        };
        Dataset::new(
            vec!["name".into(), "city".into()],
            vec![
                row("Alice", Some("NYC")),
                row("Alice", Some("LA")),
                row("Bob", Some("NYC")),
                row("Carol", None),
            ],
        )
    }

    #[test]
    fn test_tokens() {
        assert_eq!(search_tokens("  Alice   NYC "), vec!["alice", "nyc"]);
        assert!(search_tokens("   ").is_empty());
    }

    #[test]
    fn test_all_tokens_any_column() {
        let ds = people();
        assert_eq!(filtered_indices(&ds, "alice nyc", None), vec![0]);
        assert_eq!(filtered_indices(&ds, "nyc", None), vec![0, 2]);
    }

    #[test]
    fn test_selected_column_only() {
        let ds = people();
        assert_eq!(filtered_indices(&ds, "a", Some("city")), vec![1]);
        // "alice" never appears in the city column.
        assert!(filtered_indices(&ds, "alice", Some("city")).is_empty());
    }

    #[test]
    fn test_empty_search_passes_everything() {
        let ds = people();
        assert_eq!(filtered_indices(&ds, "", None), vec![0, 1, 2, 3]);
        assert_eq!(filtered_indices(&ds, "  ", Some("city")), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_null_never_matches() {
        let ds = people();
        assert!(filtered_indices(&ds, "-", Some("city")).is_empty());
        assert!(filtered_indices(&ds, "null", None).is_empty());
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let ds = people();
        assert_eq!(filtered_indices(&ds, "bob", Some("nope")), vec![2]);
    }

    #[test]
    fn test_numbers_match_their_text() {
        let ds = Dataset::new(
            vec!["v".into()],
            vec![
                Row::from([("v".to_string(), Cell::Number(3.5))]),
                Row::from([("v".to_string(), Cell::Number(12.0))]),
            ],
        );
        assert_eq!(filtered_indices(&ds, "3.5", None), vec![0]);
        assert_eq!(filtered_indices(&ds, "12", None), vec![1]);
    }
}
