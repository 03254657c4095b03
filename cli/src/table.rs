//! Plain-text tables for catalog listings.

use closetly_core::{
    ClothingItem, CollabClosetEntry, OutfitRow, PersonalClosetEntry, StoreClosetEntry,
};

const EMPTY_CELL: &str = "-";

/// Column-aligned text table.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Renders the table with every column padded to its widest cell.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)\n".to_string();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, self.headers.iter().copied(), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &self.rows {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn flag(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

const ITEM_HEADERS: [&str; 7] = ["ID", "TYPE", "SIZE", "GENDER", "COLOR", "BRAND", "AESTHETIC"];

fn item_cells(item: &ClothingItem) -> Vec<String> {
    vec![
        item.clothing_id.to_string(),
        item.clothing_type.clone(),
        cell(&item.size),
        cell(&item.gender),
        cell(&item.color),
        cell(&item.brand),
        cell(&item.aesthetic),
    ]
}

fn with_headers(extra: &[&'static str]) -> Table {
    let headers: Vec<&'static str> = ITEM_HEADERS.iter().chain(extra).copied().collect();
    Table::new(&headers)
}

pub fn clothes_table(items: &[ClothingItem]) -> Table {
    let mut table = with_headers(&["STORE"]);
    for item in items {
        let mut row = item_cells(item);
        row.push(cell(&item.store_name));
        table.push(row);
    }
    table
}

pub fn personal_table(entries: &[PersonalClosetEntry]) -> Table {
    let mut table = with_headers(&["CLEAN", "SHARED", "WEARS"]);
    for entry in entries {
        let mut row = item_cells(&entry.item);
        row.push(flag(entry.is_clean));
        row.push(flag(entry.shared));
        row.push(entry.num_wears.to_string());
        table.push(row);
    }
    table
}

pub fn collab_table(entries: &[CollabClosetEntry]) -> Table {
    let mut table = with_headers(&["LENDER", "CONDITION", "AVAILABLE", "BORROWER"]);
    for entry in entries {
        let mut row = item_cells(&entry.item);
        row.push(entry.user_id.to_string());
        row.push(cell(&entry.curr_condition));
        row.push(flag(entry.is_available));
        row.push(
            entry
                .current_borrower
                .map_or_else(|| EMPTY_CELL.to_string(), |id| id.to_string()),
        );
        table.push(row);
    }
    table
}

pub fn store_table(entries: &[StoreClosetEntry]) -> Table {
    let mut table = with_headers(&["STORE", "PRICE", "DISCOUNT"]);
    for entry in entries {
        let mut row = item_cells(&entry.item);
        row.push(entry.store_name.clone());
        row.push(entry.price.to_string());
        row.push(entry.discount.to_string());
        table.push(row);
    }
    table
}

pub fn outfit_table(rows: &[OutfitRow]) -> Table {
    let mut table = Table::new(&["OUTFIT", "ITEM", "DESCRIPTION", "VIBE"]);
    for row in rows {
        table.push(vec![
            row.outfit_id.to_string(),
            row.clothing_id.to_string(),
            cell(&row.outfit_desc),
            cell(&row.vibe),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use closetly_core::{Discount, Price};

    #[test]
    fn test_empty_table() {
        assert_eq!(Table::new(&["A"]).render(), "(no rows)\n");
    }

    #[test]
    fn test_columns_are_aligned() {
        let mut table = Table::new(&["ID", "NAME"]);
        table.push(vec!["1".into(), "coat".into()]);
        table.push(vec!["100".into(), "t".into()]);
        assert_eq!(
            table.render(),
            "ID   NAME\n---  ----\n1    coat\n100  t\n"
        );
    }

    #[test]
    fn test_store_table_formats_money() {
        let mut item = ClothingItem::new(3, "jeans");
        item.brand = Some("Levi's".into());
        let entry = StoreClosetEntry {
            store_name: "thrift".into(),
            item,
            price: Price::from_cents(1999),
            discount: Discount::new(25).unwrap(),
        };
        let out = store_table(&[entry]).render();
        assert!(out.contains("$19.99"));
        assert!(out.contains("25%"));
        assert!(out.contains("Levi's"));
        assert!(out.lines().next().unwrap().ends_with("DISCOUNT"));
    }

    #[test]
    fn test_missing_values_render_as_dash() {
        let out = outfit_table(&[OutfitRow {
            outfit_id: 77,
            clothing_id: 1,
            outfit_desc: None,
            vibe: Some("cozy".into()),
        }])
        .render();
        assert!(out.contains("77      1     -            cozy"));
    }
}
