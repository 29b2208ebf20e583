use crate::model::{ClassificationRow, DisplayRow};
use crate::progress::ResultSink;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Path,
    Digest,
    Action,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [SortColumn::Path, SortColumn::Digest, SortColumn::Action];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::Path => "Path",
            SortColumn::Digest => "SHA256",
            SortColumn::Action => "Action",
        }
    }

    fn key(&self, row: &DisplayRow) -> String {
        match self {
            // Paths sort by file name so siblings in different folders group together
            SortColumn::Path => Path::new(&row.path)
                .file_name()
                .map(|name| name.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| row.path.to_lowercase()),
            SortColumn::Digest => row.digest.to_lowercase(),
            SortColumn::Action => row.action.to_lowercase(),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(SortColumn::Path),
            "digest" | "sha256" | "hash" => Ok(SortColumn::Digest),
            "action" => Ok(SortColumn::Action),
            other => Err(format!(
                "unknown column '{}', expected one of: path, digest, action",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// The displayed result list.
///
/// Sorting is tri-state per column: the first request on a column sorts
/// ascending, a repeat on the same column flips the direction, and a
/// different column starts ascending again. Sorts are stable, so earlier
/// orderings break ties.
#[derive(Debug, Default)]
pub struct ResultView {
    rows: Vec<DisplayRow>,
    sort: Option<(SortColumn, SortDirection)>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn current_sort(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    pub fn sort_by(&mut self, column: SortColumn) -> SortDirection {
        let direction = match self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };

        self.rows.sort_by(|a, b| {
            let ordering = column.key(a).cmp(&column.key(b));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        self.sort = Some((column, direction));
        direction
    }

    /// Column title, with the direction indicator on the sorted column.
    pub fn heading(&self, column: SortColumn) -> String {
        match self.sort {
            Some((current, direction)) if current == column => {
                format!("{} {}", column.title(), direction.indicator())
            }
            _ => column.title().to_string(),
        }
    }
}

impl ResultSink for ResultView {
    fn clear(&mut self) {
        self.rows.clear();
        self.sort = None;
    }

    fn push(&mut self, row: &ClassificationRow) {
        self.rows.push(row.display_fields());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(path: &str, digest: &str, action: &str) -> DisplayRow {
        DisplayRow {
            path: path.to_string(),
            digest: digest.to_string(),
            action: action.to_string(),
        }
    }

    fn view_with(rows: Vec<DisplayRow>) -> ResultView {
        ResultView { rows, sort: None }
    }

    fn paths(view: &ResultView) -> Vec<&str> {
        view.rows().iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_same_column_toggles_direction() {
        let mut view = view_with(vec![
            row("b.txt", "02", "Reference copy"),
            row("A.txt", "01", "Reference copy"),
            row("c.txt", "03", "Reference copy"),
        ]);

        assert_eq!(view.sort_by(SortColumn::Path), SortDirection::Ascending);
        assert_eq!(paths(&view), vec!["A.txt", "b.txt", "c.txt"]);

        assert_eq!(view.sort_by(SortColumn::Path), SortDirection::Descending);
        assert_eq!(paths(&view), vec!["c.txt", "b.txt", "A.txt"]);

        assert_eq!(view.sort_by(SortColumn::Path), SortDirection::Ascending);
        assert_eq!(paths(&view), vec!["A.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_other_column_starts_ascending() {
        let mut view = view_with(vec![
            row("x/1.txt", "bb", "Reference copy"),
            row("x/2.txt", "aa", "Move (new file to preserve folder)"),
        ]);
        view.sort_by(SortColumn::Path);
        view.sort_by(SortColumn::Path);
        assert_eq!(view.sort_by(SortColumn::Digest), SortDirection::Ascending);
        assert_eq!(paths(&view), vec!["x/2.txt", "x/1.txt"]);
    }

    #[test]
    fn test_path_sorts_by_file_name() {
        let mut view = view_with(vec![
            row("a/zeta.txt", "", ""),
            row("z/alpha.txt", "", ""),
        ]);
        view.sort_by(SortColumn::Path);
        assert_eq!(paths(&view), vec!["z/alpha.txt", "a/zeta.txt"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut view = view_with(vec![
            row("one/same.txt", "", "Delete"),
            row("two/same.txt", "", "Delete"),
            row("three/same.txt", "", "Delete"),
        ]);
        view.sort_by(SortColumn::Action);
        assert_eq!(paths(&view), vec!["one/same.txt", "two/same.txt", "three/same.txt"]);
        view.sort_by(SortColumn::Path);
        assert_eq!(paths(&view), vec!["one/same.txt", "two/same.txt", "three/same.txt"]);
    }

    #[test]
    fn test_heading_indicator() {
        let mut view = ResultView::new();
        assert_eq!(view.heading(SortColumn::Digest), "SHA256");
        view.sort_by(SortColumn::Digest);
        assert_eq!(view.heading(SortColumn::Digest), "SHA256 ▲");
        assert_eq!(view.heading(SortColumn::Path), "Path");
        view.sort_by(SortColumn::Digest);
        assert_eq!(view.heading(SortColumn::Digest), "SHA256 ▼");
    }

    #[test]
    fn test_clear_resets_sort() {
        let mut view = view_with(vec![row("a", "", "")]);
        view.sort_by(SortColumn::Action);
        view.clear();
        assert!(view.is_empty());
        assert_eq!(view.current_sort(), None);
    }

    #[test]
    fn test_parse_column() {
        assert_eq!("path".parse::<SortColumn>(), Ok(SortColumn::Path));
        assert_eq!("SHA256".parse::<SortColumn>(), Ok(SortColumn::Digest));
        assert_eq!("Action".parse::<SortColumn>(), Ok(SortColumn::Action));
        assert!("size".parse::<SortColumn>().is_err());
    }
}
