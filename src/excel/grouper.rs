//! Row grouping for sheets whose logical records span several rows.

use super::extractor::SheetTable;

/// Contiguous, ordered row indices belonging to one logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub rows: Vec<usize>,
}

impl RowGroup {
    pub fn first(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Partitions the table's rows into groups. A non-empty cell in `key_col`
/// opens a new group once one is already open; every other row joins the
/// open group. A table without key values yields a single group.
pub fn group_rows(table: &SheetTable, key_col: usize) -> Vec<RowGroup> {
    let mut groups: Vec<RowGroup> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for row in 0..table.height() {
        if table.cell(row, key_col).is_some() && !current.is_empty() {
            groups.push(RowGroup {
                rows: std::mem::take(&mut current),
            });
        }
        current.push(row);
    }
    if !current.is_empty() {
        groups.push(RowGroup { rows: current });
    }
    groups
}

/// Rebuilds a table from its groups, group by group, then drops rows and
/// columns that are empty across the result.
pub fn regroup(table: &SheetTable, groups: &[RowGroup]) -> SheetTable {
    let rows = groups
        .iter()
        .flat_map(|group| group.rows.iter())
        .filter_map(|&r| table.row(r))
        .filter(|row| row.iter().any(Option::is_some))
        .map(<[Option<String>]>::to_vec)
        .collect();
    SheetTable::from_rows(rows).drop_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(keys: &[Option<&str>]) -> SheetTable {
        SheetTable::from_rows(
            keys.iter()
                .enumerate()
                .map(|(i, k)| vec![k.map(str::to_string), Some(format!("v{}", i))])
                .collect(),
        )
    }

    #[test]
    fn test_groups_open_on_key_values() {
        let t = table(&[Some("header"), Some("a"), None, None, Some("b"), None]);
        let groups = group_rows(&t, 0);
        let rows: Vec<Vec<usize>> = groups.into_iter().map(|g| g.rows).collect();
        assert_eq!(rows, vec![vec![0], vec![1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_no_key_values_single_group() {
        let t = table(&[None, None, None]);
        let groups = group_rows(&t, 0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_leading_rows_without_key_join_first_group() {
        let t = table(&[None, Some("a"), None]);
        let groups = group_rows(&t, 0);
        assert_eq!(groups[0].rows, vec![0]);
        assert_eq!(groups[1].rows, vec![1, 2]);
    }

    #[test]
    fn test_groups_cover_range_contiguously() {
        let t = table(&[Some("h"), None, Some("x"), Some("y"), None, None, Some("z")]);
        let groups = group_rows(&t, 0);
        let flat: Vec<usize> = groups.iter().flat_map(|g| g.rows.clone()).collect();
        assert_eq!(flat, (0..t.height()).collect::<Vec<_>>());
        for group in &groups {
            assert!(!group.is_empty());
            let first = group.first().unwrap();
            assert_eq!(group.rows, (first..first + group.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_empty_table() {
        assert!(group_rows(&SheetTable::default(), 0).is_empty());
    }

    #[test]
    fn test_regroup_preserves_rows() {
        let t = table(&[Some("h"), Some("a"), None]);
        let groups = group_rows(&t, 0);
        assert_eq!(regroup(&t, &groups), t);
    }
}
