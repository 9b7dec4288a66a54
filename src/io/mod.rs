use anyhow::{Result, bail};

pub mod json_writer;
pub mod panels;
pub mod pdf_report;
pub mod summary;
pub mod tsv_writer;

/// Splits one CSV record. Surrounding double quotes are stripped; quoted
/// commas are kept inside the field.
pub(crate) fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

pub(crate) fn column_index(header: &[String], name: &str, source: &str) -> Result<usize> {
    let matches: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, h)| h.eq_ignore_ascii_case(name))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [idx] => Ok(*idx),
        [] => bail!("{}: missing column '{}'", source, name),
        _ => bail!("{}: duplicate column '{}'", source, name),
    }
}
