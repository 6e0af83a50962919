//! Extraction module tests
//!
//! These tests run whole pages through the document extractor and check
//! the JSON the data site receives.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiki_extract::extraction::{CellValue, DocumentExtractor, LevelKey, PageDocument};
use wiki_extract::ExtractorConfig;

const BUILDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Embassy | Wiki</title>
  <meta name="description" content="Embassy upgrade costs and build times.">
</head>
<body>
  <h1>Embassy</h1>
  <p>Lets alliance members speed up your builds.</p>

  <table class="infobox">
    <tr><th>Type</th><td>Support</td></tr>
  </table>

  <h2>Upgrade Requirements</h2>
  <div class="table-wrap">
    <table>
      <thead>
        <tr><th>Level</th><th>Meat</th><th>Wood</th><th>Build Time</th><th>Power</th></tr>
      </thead>
      <tbody>
        <tr><td>30-1</td><td>12,500,000</td><td>12,500,000</td><td>5d 12h</td><td>1,250,000</td></tr>
        <tr><td>2</td><td>1,500</td><td>1,500</td><td>00:01:30</td><td>300</td></tr>
        <tr><td>FC1</td><td>25,000,000</td><td>25,000,000</td><td>7d</td><td>1,800,000</td></tr>
        <tr><td>1</td><td>-</td><td>-</td><td>-</td><td>150</td></tr>
        <tr><td> </td><td></td><td></td><td></td><td></td></tr>
        <tr><td>30</td><td>10,000,000</td><td>10,000,000</td><td>4d</td><td>1,000,000</td></tr>
      </tbody>
    </table>
  </div>

  <h3>Speed Up Tips</h3>
  <ul>
    <li>Use construction speed-ups.</li>
    <li>Ask your alliance for help.</li>
  </ul>

  <h3>Gallery</h3>

  <h4>Bonus</h4>
  <p>Reinforcement capacity +5%.</p>
</body>
</html>"#;

fn extract(html: &str) -> PageDocument {
    DocumentExtractor::new().unwrap().extract(html)
}

#[test]
fn test_building_page_metadata() {
    let doc = extract(BUILDING_PAGE);
    assert_eq!(doc.title, "Embassy");
    assert_eq!(doc.description, "Embassy upgrade costs and build times.");
    assert_eq!(doc.tables_total, 2);
}

#[test]
fn test_main_table_selected_and_sorted() {
    let doc = extract(BUILDING_PAGE);
    assert_eq!(doc.main_table_index, Some(1));

    let main = doc.main_table.unwrap();
    let levels: Vec<String> = main.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(levels, vec!["1", "2", "30", "30-1", "FC1"]);

    let object_levels: Vec<String> = main
        .rows_as_objects
        .iter()
        .map(|o| match &o["Level"] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    assert_eq!(object_levels, levels);
}

#[test]
fn test_cells_are_typed() {
    let doc = extract(BUILDING_PAGE);
    let main = doc.main_table.unwrap();
    let level_two = &main.rows[1];
    assert_eq!(level_two[0], CellValue::Int(2));
    assert_eq!(level_two[1], CellValue::Int(1500));
    assert_eq!(level_two[3], CellValue::from("00:01:30"));

    let top = &main.rows[3];
    assert_eq!(top[0], CellValue::from("30-1"));
    assert_eq!(top[3], CellValue::from("5d 12h"));
    assert_eq!(top[4], CellValue::Int(1_250_000));
}

#[test]
fn test_blank_row_excluded() {
    let doc = extract(BUILDING_PAGE);
    assert_eq!(doc.main_table.unwrap().rows.len(), 5);
}

#[test]
fn test_sections() {
    let doc = extract(BUILDING_PAGE);
    let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
    // "Gallery" has no content before the next heading
    assert_eq!(titles, vec!["Upgrade Requirements", "Speed Up Tips", "Bonus"]);

    let tips = &doc.sections[1];
    assert!(tips.is_time_related);
    assert_eq!(
        tips.lists,
        vec![vec![
            "Use construction speed-ups.".to_string(),
            "Ask your alliance for help.".to_string()
        ]]
    );

    assert_eq!(doc.sections[0].tables.len(), 1);
    assert!(!doc.sections[0].is_time_related);
    assert_eq!(doc.sections[2].paragraphs, vec!["Reinforcement capacity +5%."]);
}

#[test]
fn test_section_tables_are_not_sorted() {
    let doc = extract(BUILDING_PAGE);
    let section_table = &doc.sections[0].tables[0];
    assert_eq!(section_table.rows[0][0], CellValue::from("30-1"));
}

#[test]
fn test_level_header_table_resorted() {
    let html = "<table><tr><th>Level</th><th>Cost</th></tr>\
                <tr><td>2</td><td>b</td></tr><tr><td>1</td><td>a</td></tr></table>";
    let doc = extract(html);
    let main = doc.main_table.unwrap();
    assert_eq!(main.rows[0], vec![CellValue::Int(1), CellValue::from("a")]);
    let expected = json!({"Level": 1, "Cost": "a"});
    assert_eq!(&main.rows_as_objects[0], expected.as_object().unwrap());
}

#[test]
fn test_json_shape() {
    let doc = extract(BUILDING_PAGE);
    let value = serde_json::to_value(&doc).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "title",
            "description",
            "tables_total",
            "main_table_index",
            "main_table",
            "sections"
        ]
    );
    assert_eq!(value["main_table"]["columns"][3], json!("Build Time"));
    assert_eq!(value["main_table"]["rows"][0], json!([1, "-", "-", "-", 150]));
    assert_eq!(value["sections"][1]["is_time_related"], json!(true));
}

#[test]
fn test_main_rows_roundtrip_stay_sorted() {
    let doc = extract(BUILDING_PAGE);
    let json = serde_json::to_string(&doc).unwrap();
    let parsed: PageDocument = serde_json::from_str(&json).unwrap();

    let rows = parsed.main_table.unwrap().rows;
    let mut resorted = rows.clone();
    resorted.sort_by_cached_key(|r| LevelKey::for_cell(&r[0], "fc"));
    assert_eq!(resorted, rows);
}

#[test]
fn test_custom_vocabulary() {
    let config = ExtractorConfig {
        level_hints: vec!["stufe".to_string()],
        time_keywords: vec!["bauzeit".to_string()],
        ..Default::default()
    };
    let extractor = DocumentExtractor::with_config(config).unwrap();
    let doc = extractor.extract(
        "<h2>Bauzeit</h2><table><tr><th>Name</th></tr><tr><td>x</td></tr></table>\
         <table><tr><th>Stufe</th></tr><tr><td>3</td></tr><tr><td>1</td></tr></table>",
    );
    assert_eq!(doc.main_table_index, Some(1));
    assert_eq!(doc.main_table.unwrap().rows[0][0], CellValue::Int(1));
    assert!(doc.sections[0].is_time_related);
    assert_eq!(doc.sections[0].tables.len(), 2);
}

#[test]
fn test_degenerate_html_does_not_fail() {
    let doc = extract("<table><tr></tr></table><h2></h2><ul></ul><<>>");
    assert_eq!(doc.tables_total, 1);
    assert_eq!(doc.main_table_index, Some(0));
    let main = doc.main_table.unwrap();
    assert!(main.columns.is_empty());
    assert!(main.rows.is_empty());
    assert!(doc.sections.is_empty());
}

#[test]
fn test_integral_float_level_keeps_passes_in_step() {
    let doc = extract(
        "<table><tr><th>Level</th><th>Tag</th></tr>\
         <tr><td>fc1</td><td>a</td></tr><tr><td>2.0</td><td>b</td></tr></table>",
    );
    let main = doc.main_table.unwrap();
    assert_eq!(main.rows[1][0], CellValue::Float(2.0));

    let from_rows: Vec<String> = main.rows.iter().map(|r| r[1].to_string()).collect();
    let from_objects: Vec<String> = main
        .rows_as_objects
        .iter()
        .map(|o| o["Tag"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(from_rows, from_objects);
    assert_eq!(from_rows, vec!["a", "b"]);
}
