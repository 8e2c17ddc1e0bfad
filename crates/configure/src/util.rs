use crate::flags::Flag;
use crate::types::Kind;

/// Format a block of documentation for CLI help.
pub fn format_doc(doc: Option<&str>) -> Option<String> {
    doc.map(|d| {
        d.split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    })
    .filter(|d| !d.is_empty())
}

/// Render a flag with its value placeholder, e.g. `-district_id <string>`.
pub fn format_flag(name: &str, kind: Kind) -> String {
    match kind.placeholder() {
        Some(placeholder) => format!("-{name} <{placeholder}>"),
        None => format!("-{name}"),
    }
}

/// Render usage text for a set of flags.
///
/// `required` lists the flag names to mark `(required)`.
pub fn render_help(program: &str, doc: Option<&str>, flags: &[Flag], required: &[&str]) -> String {
    let mut lines = Vec::new();

    if let Some(doc) = format_doc(doc) {
        lines.push(doc);
        lines.push(String::new());
    }

    lines.push("Usage:".to_string());
    lines.push(format!("  {program} [FLAGS] [JSON]"));

    if !flags.is_empty() {
        lines.push(String::new());
        lines.push("Flags:".to_string());
        for flag in flags {
            let rendered = format_flag(&flag.name, flag.default.kind());
            let mut detail = format_doc(Some(&flag.usage)).unwrap_or_default();
            if !flag.default.is_zero() {
                if !detail.is_empty() {
                    detail.push(' ');
                }
                detail.push_str(&format!("[default: {}]", flag.default));
            }
            if required.contains(&flag.name.as_str()) {
                if !detail.is_empty() {
                    detail.push(' ');
                }
                detail.push_str("(required)");
            }
            if detail.is_empty() {
                lines.push(format!("  {rendered}"));
            } else {
                lines.push(format!("  {:<24} {}", rendered, detail));
            }
        }
    }

    lines.join("\n").trim_end().to_string()
}
