//! Text and JSON rendering of schema documents.

use crate::help::schema::{SchemaDocument, SchemaOption};
use std::fmt::Write as _;

/// Total width text help is laid out in.
pub const LINE_WIDTH: usize = 90;

/// Name column width: the longest display name plus two.
pub fn column_width(doc: &SchemaDocument) -> usize {
    doc.properties
        .options()
        .map(|o| o.display_name().chars().count())
        .max()
        .unwrap_or(0)
        + 2
}

/// Splits `text` into lines of at most `budget` characters.
///
/// Lines break at the last space within the budget; the run of spaces at
/// the break is dropped. A token longer than the budget is cut at exactly
/// `budget`.
pub fn wrap(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        if chars.len() - start <= budget {
            lines.push(chars[start..].iter().collect());
            break;
        }

        let cut = start + budget;
        match (start + 1..=cut).rev().find(|&i| chars[i] == ' ') {
            Some(space) => {
                let mut end = space;
                while end > start && chars[end - 1] == ' ' {
                    end -= 1;
                }
                lines.push(chars[start..end].iter().collect());
                start = space + 1;
                while chars.get(start) == Some(&' ') {
                    start += 1;
                }
            }
            None => {
                lines.push(chars[start..cut].iter().collect());
                start = cut;
            }
        }
    }
    lines
}

pub fn render_text(doc: &SchemaDocument) -> String {
    render_text_with_width(doc, LINE_WIDTH)
}

/// Column aligned help text for a terminal `line_width` columns wide.
pub fn render_text_with_width(doc: &SchemaDocument, line_width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "HELP\n{} {} plugin", doc.name, doc.kind);
    if !doc.description.is_empty() {
        let _ = writeln!(out, "\nDESCRIPTION\n{}", doc.description);
    }

    let width = column_width(doc);
    for (category, options) in doc.properties.iter() {
        let _ = writeln!(out, "\n{}", category.to_uppercase());
        for option in options {
            render_option(&mut out, option, width, line_width);
        }
    }
    out
}

fn render_option(out: &mut String, option: &SchemaOption, width: usize, line_width: usize) {
    let _ = write!(out, "{:<width$}", option.display_name());

    match &option.description {
        Some(description) => {
            let budget = line_width.saturating_sub(width);
            for (i, line) in wrap(description, budget).iter().enumerate() {
                if i == 0 {
                    let _ = writeln!(out, "{line}");
                } else {
                    let _ = writeln!(out, "{:width$}{line}", "");
                }
            }
        }
        None => out.push_str("no description available\n"),
    }

    match &option.default {
        Some(default) => {
            let _ = write!(out, "{:width$}> default: {default}, type: ", "");
        }
        None => {
            let _ = write!(out, "{:width$}> type: ", "");
        }
    }
    let _ = writeln!(out, "{}\n", option.option_type);
}

pub fn render_json(doc: &SchemaDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string(doc)
}

pub fn parse_json(json: &str) -> Result<SchemaDocument, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::schema::Categories;
    use crate::plugin::PluginKind;

    fn doc(options: Vec<SchemaOption>) -> SchemaDocument {
        let mut properties = Categories::new();
        for option in options {
            properties.push("options", option);
        }
        SchemaDocument {
            name: "sample".into(),
            kind: PluginKind::Input,
            description: "Sample input".into(),
            properties,
        }
    }

    fn option(name: &str, description: Option<&str>, default: Option<&str>) -> SchemaOption {
        SchemaOption {
            name: name.into(),
            option_type: "string".into(),
            description: description.map(str::to_string),
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn test_short_description_stays_on_one_line() {
        assert_eq!(wrap("short text", 20), vec!["short text"]);
    }

    #[test]
    fn test_wrap_breaks_at_last_space() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("aaa bbb ccc", 6), vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_collapses_space_runs_at_breaks() {
        assert_eq!(wrap("aaaa  bbbb", 4), vec!["aaaa", "bbbb"]);
        assert_eq!(wrap("one   two three", 5), vec!["one", "two", "three"]);
        assert_eq!(wrap("in  the  middle", 8), vec!["in  the", "middle"]);
    }

    #[test]
    fn test_long_token_is_hard_cut() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_text_layout() {
        let text = render_text(&doc(vec![
            option("tag", Some("Set a tag"), Some("none")),
            option("path", None, None),
        ]));

        let expected = "HELP\nsample input plugin\n\nDESCRIPTION\nSample input\n\nOPTIONS\n\
                        tag   Set a tag\n      > default: none, type: string\n\n\
                        path  no description available\n      > type: string\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_continuation_lines_are_indented() {
        let long = "word ".repeat(30);
        let text = render_text(&doc(vec![option("key", Some(long.trim_end()), None)]));
        let lines: Vec<_> = text.lines().skip_while(|l| *l != "OPTIONS").skip(1).collect();

        assert!(lines[0].starts_with("key  word"));
        assert!(lines[1].starts_with("     word"));
        for line in &lines[..lines.len() - 2] {
            assert!(line.chars().count() <= LINE_WIDTH);
        }
    }
}
