//! Main-table selection
//!
//! A wiki page usually carries one per-level progression table among
//! several smaller ones. Each table gets a heuristic score and the best
//! one becomes the page's main table, sorted by level.

use serde_json::Value;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::extraction::level::{find_level_column, is_levelish, LevelKey};
use crate::extraction::table::ParsedTable;

/// Score a table's likelihood of being the main progression table
pub fn score_table(table: &ParsedTable, config: &ExtractorConfig) -> u32 {
    let mut score = 0u32;

    if table.columns.iter().any(|c| config.is_level_header(c)) {
        score += config.level_header_bonus;
    }

    let row_score = table.row_count().min(config.max_row_score as usize) as u32;
    score += row_score;

    let levelish = table
        .rows
        .iter()
        .filter_map(|row| row.first())
        .take(config.levelish_sample)
        .filter(|cell| is_levelish(&cell.to_string(), &config.tier_prefix))
        .count() as u32;
    score += levelish * config.levelish_row_bonus;

    score
}

/// Index of the highest-scoring table; ties go to the earliest
pub fn select_main_table(tables: &[ParsedTable], config: &ExtractorConfig) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, table) in tables.iter().enumerate() {
        let score = score_table(table, config);
        debug!(index = i, score, "Scored table");
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Sort a main table by level
///
/// `rows_as_objects` is sorted by the detected level column, while `rows`
/// is sorted by its first cell. The two passes are independent and agree
/// only when the level column is the first column.
pub fn sort_main_table(table: &mut ParsedTable, config: &ExtractorConfig) {
    let prefix = config.tier_prefix.as_str();

    let Some(idx) = find_level_column(&table.columns, config) else {
        return;
    };
    let key_name = table.columns[idx].clone();

    table.rows_as_objects.sort_by_cached_key(|obj| {
        let label = obj.get(&key_name).map(value_label).unwrap_or_default();
        LevelKey::new(&label, prefix)
    });

    table.rows.sort_by_cached_key(|row| match row.first() {
        Some(cell) => LevelKey::for_cell(cell, prefix),
        None => LevelKey::new("", prefix),
    });
}

// Renders numbers the way `CellValue`'s `Display` does, so both passes
// see the same label for a cell.
fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::value::CellValue;

    fn table(columns: &[&str], rows: &[&[&str]]) -> ParsedTable {
        ParsedTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| crate::extraction::value::smart_value(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_score_components() {
        let config = ExtractorConfig::default();
        let t = table(&["Level", "Power"], &[&["1", "10"], &["2", "20"], &["x", "30"]]);
        // 100 for the header, 3 rows, 2 level-looking first cells
        assert_eq!(score_table(&t, &config), 100 + 3 + 2 * 5);
    }

    #[test]
    fn test_row_score_is_capped() {
        let config = ExtractorConfig::default();
        let rows: Vec<Vec<CellValue>> = (0..250).map(|_| vec![CellValue::from("a")]).collect();
        let t = ParsedTable::new(vec!["Name".to_string()], rows);
        assert_eq!(score_table(&t, &config), 200);
    }

    #[test]
    fn test_levelish_sample_limited_to_twenty_rows() {
        let config = ExtractorConfig::default();
        let rows: Vec<Vec<CellValue>> = (1..=30).map(|n| vec![CellValue::Int(n)]).collect();
        let t = ParsedTable::new(Vec::new(), rows);
        assert_eq!(score_table(&t, &config), 30 + 20 * 5);
    }

    #[test]
    fn test_select_main_table_ties_go_first() {
        let config = ExtractorConfig::default();
        let a = table(&["Name"], &[&["a"]]);
        let b = table(&["Name"], &[&["b"]]);
        assert_eq!(select_main_table(&[a.clone(), b], &config), Some(0));

        let level = table(&["Lv"], &[&["1"]]);
        assert_eq!(select_main_table(&[a, level], &config), Some(1));
        assert_eq!(select_main_table(&[], &config), None);
    }

    #[test]
    fn test_sort_main_table_by_level() {
        let config = ExtractorConfig::default();
        let mut t = table(&["Level", "Cost"], &[&["2", "b"], &["fc1", "c"], &["1", "a"]]);
        sort_main_table(&mut t, &config);

        let firsts: Vec<String> = t.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(firsts, vec!["1", "2", "fc1"]);
        assert_eq!(t.rows_as_objects[0]["Cost"], Value::from("a"));
        assert_eq!(t.rows_as_objects[2]["Level"], Value::from("fc1"));
    }

    #[test]
    fn test_sort_passes_diverge_when_level_not_first() {
        let config = ExtractorConfig::default();
        let mut t = table(&["Name", "Level"], &[&["b", "1"], &["a", "2"]]);
        sort_main_table(&mut t, &config);

        assert_eq!(t.rows[0][0], CellValue::from("a"));
        assert_eq!(t.rows_as_objects[0]["Name"], Value::from("b"));
    }

    #[test]
    fn test_integral_float_level_sorts_the_same_in_both_passes() {
        let config = ExtractorConfig::default();
        let mut t = table(&["Level", "Tag"], &[&["2.0", "b"], &["fc1", "a"]]);
        assert_eq!(t.rows[0][0], CellValue::Float(2.0));
        sort_main_table(&mut t, &config);

        let from_rows: Vec<String> = t.rows.iter().map(|r| r[1].to_string()).collect();
        let from_objects: Vec<String> = t
            .rows_as_objects
            .iter()
            .map(|o| value_label(&o["Tag"]))
            .collect();
        assert_eq!(from_rows, vec!["a", "b"]);
        assert_eq!(from_objects, from_rows);
    }

    #[test]
    fn test_integral_float_is_not_levelish() {
        let config = ExtractorConfig::default();
        let t = table(&["Name"], &[&["2.0"], &["3"]]);
        // 2 rows, only "3" looks like a level
        assert_eq!(score_table(&t, &config), 2 + 5);
    }

    #[test]
    fn test_no_level_column_leaves_order() {
        let config = ExtractorConfig::default();
        let mut t = table(&["Name"], &[&["b"], &["a"]]);
        sort_main_table(&mut t, &config);
        assert_eq!(t.rows[0][0], CellValue::from("b"));
    }
}
