use std::collections::HashMap;

pub type CsvRow = HashMap<String, String>;

/// Parse a CSV blob into header-keyed rows.
///
/// Character scan with an in-quotes flag: commas inside quotes are literal
/// and a quote character toggles the flag. The first non-empty row is the
/// header and provides the keys for every following row. Rows whose field
/// count differs from the header's are dropped, not treated as errors.
pub fn parse_csv(input: &str) -> Vec<CsvRow> {
    let mut lines = input.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header = split_fields(header_line);

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for line in lines {
        let fields = split_fields(line);

        if fields.len() != header.len() {
            dropped += 1;
            continue;
        }

        rows.push(header.iter().cloned().zip(fields).collect());
    }

    if dropped > 0 {
        log::debug!("Dropped {} row(s) not matching the header width", dropped);
    }

    rows
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(finish_field(&mut current)),
            _ => current.push(ch),
        }
    }

    fields.push(finish_field(&mut current));
    fields
}

fn finish_field(current: &mut String) -> String {
    let field = current.trim().to_string();
    current.clear();
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_header_names_to_values() {
        let rows = parse_csv("id,name\nsme-1,Thandi\nsme-2,Pieter\n");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "sme-1");
        assert_eq!(rows[0]["name"], "Thandi");
        assert_eq!(rows[1]["name"], "Pieter");
    }

    #[test]
    fn commas_inside_quotes_are_literal() {
        let rows = parse_csv("id,comment\nr-1,\"thorough, well prepared\"\n");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["comment"], "thorough, well prepared");
    }

    #[test]
    fn rows_with_mismatched_width_are_dropped() {
        let rows = parse_csv("id,name,email\nsme-1,Thandi\nsme-2,Pieter,pieter@example.org\n");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "sme-2");
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("id,name\n").is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_csv("id,name\n\nsme-1,Thandi\n\n");

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn quote_characters_are_not_part_of_the_value() {
        let rows = parse_csv("id,name\nsme-1,\"Thandi\"\n");

        assert_eq!(rows[0]["name"], "Thandi");
    }
}
