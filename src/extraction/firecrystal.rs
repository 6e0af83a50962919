//! Fire-crystal upgrade rows
//!
//! Fire-crystal pages lay their upgrade costs out in a fixed six-column
//! table: level, required building, fire crystals, other costs, build time
//! and power.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::extraction::selectors::{element_text, PageSelectors};

/// One fire-crystal upgrade step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireCrystalLevel {
    /// Level label, e.g. `FC1-2`
    pub level: String,
    /// Buildings that must be upgraded first
    pub required_building: String,
    /// Fire crystals needed
    pub fire_crystal: String,
    /// Remaining resource costs
    pub other_cost: String,
    /// Construction time as written
    pub build_time: String,
    /// Power gained
    pub power: String,
}

/// Rows with at least six `<td>` cells from every `<tbody>` on the page
pub fn extract_firecrystal_levels(html: &str, selectors: &PageSelectors) -> Vec<FireCrystalLevel> {
    let document = Html::parse_document(html);
    let mut levels = Vec::new();

    for table in document.select(&selectors.tables) {
        let Some(tbody) = table.select(&selectors.tbody).next() else {
            continue;
        };
        for tr in tbody.select(&selectors.rows) {
            let cells: Vec<String> = tr.select(&selectors.data_cells).map(element_text).collect();
            if cells.len() < 6 {
                continue;
            }
            let mut cells = cells.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            levels.push(FireCrystalLevel {
                level: next(),
                required_building: next(),
                fire_crystal: next(),
                other_cost: next(),
                build_time: next(),
                power: next(),
            });
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_column_rows() {
        let selectors = PageSelectors::new().unwrap();
        let html = "<table><tbody>\
            <tr><th>Lv</th><th>Req</th></tr>\
            <tr><td>FC1</td><td>Furnace FC1</td><td>132</td>\
                <td>Meat 1.2M</td><td>6d</td><td>+1,000</td></tr>\
            <tr><td>short</td><td>row</td></tr>\
            </tbody></table>";
        let levels = extract_firecrystal_levels(html, &selectors);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].level, "FC1");
        assert_eq!(levels[0].build_time, "6d");
        assert_eq!(levels[0].power, "+1,000");
    }
}
