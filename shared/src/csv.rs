use serde::{Deserialize, Serialize};

use crate::record::{
    LocalizedText, RawRecord, cat_ids_from_json, finite_coords, parse_coord, parse_updated_at,
};

/// Split one CSV line. Double quotes toggle quoting; inside quotes a doubled
/// quote is a literal quote and commas do not split.
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Column positions of one revision of the feed's schema. The feed carries
/// no version marker, so the page picks the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvLayout {
    /// Rows with fewer columns are skipped.
    pub min_columns: usize,
    pub x: usize,
    pub y: usize,
    pub name_ja: usize,
    pub name_en: usize,
    #[serde(default)]
    pub object_id: Option<usize>,
    /// Free-text category name, used when the JSON column yields nothing.
    #[serde(default)]
    pub category_name: Option<usize>,
    /// JSON array of `{cat_id}` slots.
    #[serde(default)]
    pub categories_json: Option<usize>,
    pub memo_ja: usize,
    pub memo_en: usize,
    #[serde(default)]
    pub updated_at: Option<usize>,
}

impl CsvLayout {
    /// `uid,x,y,name_jp,name_en,category,importance,memo_jp,memo_en`
    pub fn legacy() -> Self {
        Self {
            min_columns: 6,
            x: 1,
            y: 2,
            name_ja: 3,
            name_en: 4,
            object_id: None,
            category_name: Some(5),
            categories_json: None,
            memo_ja: 7,
            memo_en: 8,
            updated_at: None,
        }
    }

    /// `uid,x,y,name_jp,name_en,category_pin,contents,memo_jp,memo_en`
    pub fn contents() -> Self {
        Self {
            min_columns: 6,
            x: 1,
            y: 2,
            name_ja: 3,
            name_en: 4,
            object_id: Some(5),
            category_name: None,
            categories_json: Some(6),
            memo_ja: 7,
            memo_en: 8,
            updated_at: None,
        }
    }

    /// `uid,x,y,name_jp,name_en,attribute,obj_attributes,category,categories,
    /// importance,category_pin,contents,memo_jp,memo_en,updated_at`
    pub fn current() -> Self {
        Self {
            min_columns: 6,
            x: 1,
            y: 2,
            name_ja: 3,
            name_en: 4,
            object_id: Some(5),
            category_name: Some(7),
            categories_json: Some(8),
            memo_ja: 12,
            memo_en: 13,
            updated_at: Some(14),
        }
    }

    /// Parse one data line. `None` when the row is too short or the
    /// coordinates are not numbers.
    pub fn parse_row(&self, line: &str) -> Option<RawRecord> {
        let cols = parse_csv_row(line);
        if cols.len() < self.min_columns {
            return None;
        }
        let col = |idx: usize| cols.get(idx).map(|s| s.trim()).unwrap_or("");
        let opt_col = |idx: Option<usize>| idx.map(col).unwrap_or("");

        let coords = finite_coords(parse_coord(col(self.x))?, parse_coord(col(self.y))?)?;

        let object_id = Some(opt_col(self.object_id))
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let mut category_signals = cat_ids_from_json(opt_col(self.categories_json));
        let category_name = opt_col(self.category_name);
        if category_signals.is_empty() && !category_name.is_empty() {
            category_signals.push(category_name.to_string());
        }

        Some(RawRecord {
            coords,
            object_id,
            category_signals,
            name: LocalizedText::new(col(self.name_ja), col(self.name_en)),
            memo: LocalizedText::new(col(self.memo_ja), col(self.memo_en)),
            rank_text: line.to_string(),
            updated_at: self.updated_at.map(col).and_then(parse_updated_at),
            debug_only: false,
        })
    }
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self::current()
    }
}

/// Data lines of a feed: header dropped, `\r` stripped, blank lines skipped.
pub fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.trim()
        .split('\n')
        .skip(1)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;

    #[test]
    fn quoted_commas_do_not_split() {
        assert_eq!(
            parse_csv_row(r#"a,"b,c",d"#),
            vec!["a".to_string(), "b,c".to_string(), "d".to_string()]
        );
    }

    #[test]
    fn doubled_quotes_inside_quotes_are_literal() {
        let row = r#"p1,1,2,"[{""cat_id"": ""lem""}]""#;
        let cols = parse_csv_row(row);
        assert_eq!(cols[3], r#"[{"cat_id": "lem"}]"#);
    }

    #[test]
    fn trailing_comma_yields_empty_field() {
        assert_eq!(parse_csv_row("a,").len(), 2);
        assert_eq!(parse_csv_row("").len(), 1);
    }

    #[test]
    fn current_layout_reads_object_id_and_position() {
        let record = CsvLayout::current()
            .parse_row(",100,200,NameJP,NameEN,ITEM_WEAPON,,,,")
            .expect("valid row");
        assert_eq!(record.coords, (100.0, 200.0));
        assert_eq!(record.object_id.as_deref(), Some("ITEM_WEAPON"));
        assert!(record.category_signals.is_empty());
        assert_eq!(record.name.get(Locale::Ja), "NameJP");
        assert_eq!(record.name.get(Locale::En), "NameEN");
    }

    #[test]
    fn categories_json_wins_over_category_name() {
        let row = r#"p1,1,2,箱,Box,,{},設計図,"[{""cat_id"": ""lem""}]",1,,,メモ,memo,2026-01-11 09:30:00"#;
        let record = CsvLayout::current().parse_row(row).expect("valid row");
        assert_eq!(record.category_signals, vec!["lem"]);
        assert_eq!(record.memo.get(Locale::Ja), "メモ");
        assert_eq!(record.memo.get(Locale::En), "memo");
        assert!(record.updated_at.is_some());
        assert_eq!(record.rank_text, row);
    }

    #[test]
    fn broken_categories_json_falls_back_to_name() {
        let row = r#"p1,1,2,箱,Box,,,設計図,[{oops,,,,,"#;
        let record = CsvLayout::current().parse_row(row).expect("valid row");
        assert_eq!(record.category_signals, vec!["設計図"]);
    }

    #[test]
    fn rows_with_bad_coords_or_too_few_columns_are_skipped() {
        let layout = CsvLayout::current();
        assert!(layout.parse_row(",abc,200,Name,Name,X").is_none());
        assert!(layout.parse_row(",1,,Name,Name,X").is_none());
        assert!(layout.parse_row(",1,2,Name").is_none());
    }

    #[test]
    fn legacy_layout_uses_category_name_column() {
        let record = CsvLayout::legacy()
            .parse_row("p1,3,4,戦時債権,War bond,戦時債権,1,メモ,memo")
            .expect("valid row");
        assert_eq!(record.object_id, None);
        assert_eq!(record.category_signals, vec!["戦時債権"]);
        assert_eq!(record.memo.get(Locale::En), "memo");
    }

    #[test]
    fn contents_layout_reads_json_column() {
        let row = r#"p1,3,4,箱,Box,SPACESHIP,"[{""cat_id"": ""blueprint""}]",メモ,"#;
        let record = CsvLayout::contents().parse_row(row).expect("valid row");
        assert_eq!(record.object_id.as_deref(), Some("SPACESHIP"));
        assert_eq!(record.category_signals, vec!["blueprint"]);
        assert_eq!(record.memo.get(Locale::En), "メモ");
    }

    #[test]
    fn data_lines_skip_header_blank_lines_and_carriage_returns() {
        let text = "uid,x,y\r\na,1,2\r\n\r\nb,3,4\n";
        let lines: Vec<_> = data_lines(text).collect();
        assert_eq!(lines, vec!["a,1,2", "b,3,4"]);
        assert_eq!(data_lines("uid,x,y").count(), 0);
        assert_eq!(data_lines("").count(), 0);
    }

    #[test]
    fn layouts_deserialize_from_config() {
        let layout: CsvLayout = serde_json::from_str(
            r#"{"min_columns": 4, "x": 0, "y": 1, "name_ja": 2, "name_en": 3, "memo_ja": 4, "memo_en": 5}"#,
        )
        .expect("valid layout");
        let record = layout.parse_row("7,8,名前,Name").expect("valid row");
        assert_eq!(record.coords, (7.0, 8.0));
        assert_eq!(record.memo.get(Locale::Ja), "");
    }
}
