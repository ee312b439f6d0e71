//! CSV 序列化
//!
//! 表头为所有记录字段名的并集（按首次出现顺序），每个单元格都加双引号

use indexmap::IndexSet;

use crate::models::ExtractionRecord;

/// 把记录序列化为 CSV 文本，没有记录时返回空字符串
pub fn to_csv(records: &[ExtractionRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut headers: IndexSet<&str> = IndexSet::new();
    for record in records {
        headers.extend(record.fields());
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(join_row(headers.iter().copied()));
    for record in records {
        lines.push(join_row(headers.iter().map(|h| record.get(h).unwrap_or(""))));
    }
    lines.join("\n")
}

fn join_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(quote_cell).collect::<Vec<_>>().join(",")
}

fn quote_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn test_header_union_in_first_seen_order() {
        let records = vec![
            ExtractionRecord::from_iter([("name", "A"), ("price", "$1")]),
            ExtractionRecord::from_iter([("rating", "5"), ("name", "B")]),
        ];
        let csv = to_csv(&records);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], r#""name","price","rating""#);
        assert_eq!(lines[1], r#""A","$1","""#);
        assert_eq!(lines[2], r#""B","","5""#);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_quotes_are_doubled() {
        let records = vec![ExtractionRecord::from_iter([("title", r#"The "Best", ever"#)])];
        assert_eq!(to_csv(&records), "\"title\"\n\"The \"\"Best\"\", ever\"");
    }
}
