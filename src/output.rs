//! CLI output formatting.
//!
//! `iiif-records manifest <identifier>` prints the built document as JSON.
//! With `--summary` it prints a readable outline instead:
//!
//! ```text
//! Manifest http://localhost:5000/iiif/resource/abc/record/5
//!     Label: Cat
//!     Rights: http://www.opendefinition.org/licenses/cc-by
//!     Metadata
//!         _id: 5
//!         title: Cat
//!         images: http://x/img1.jpg
//! Canvases
//!     001 http://localhost:5000/iiif/resource/abc/record/5/canvas/0
//!         Image: http://x/img1.jpg
//! ```
//!
//! The `format_*` function returns `Vec<String>` and does no I/O; the
//! `print_*` wrapper writes it to stdout.

use serde_json::Value;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Shorten text to `max` chars, adding "..." when truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// All strings of a language map, joined.
fn language_text(map: &Value) -> String {
    match map {
        Value::Object(languages) => languages
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}

/// Format an outline of a built IIIF document.
pub fn format_manifest_summary(doc: &Value) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("{} {}", str_at(doc, "/type"), str_at(doc, "/id")));
    if let Some(label) = doc.get("label") {
        lines.push(format!("{}Label: {}", indent(1), truncate(&language_text(label), 60)));
    }
    if let Some(rights) = doc.get("rights").and_then(Value::as_str) {
        lines.push(format!("{}Rights: {}", indent(1), rights));
    }

    if let Some(metadata) = doc.get("metadata").and_then(Value::as_array) {
        if !metadata.is_empty() {
            lines.push(format!("{}Metadata", indent(1)));
        }
        for entry in metadata {
            lines.push(format!(
                "{}{}: {}",
                indent(2),
                language_text(&entry["label"]),
                truncate(&language_text(&entry["value"]), 60)
            ));
        }
    }

    if let Some(canvases) = doc.get("items").and_then(Value::as_array) {
        lines.push("Canvases".to_string());
        for (i, canvas) in canvases.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(i + 1),
                str_at(canvas, "/id")
            ));
            let image = str_at(canvas, "/items/0/items/0/body/id");
            if !image.is_empty() {
                lines.push(format!("{}Image: {}", indent(2), image));
            }
        }
    }

    lines
}

/// Print a document outline to stdout.
pub fn print_manifest_summary(doc: &Value) {
    for line in format_manifest_summary(doc) {
        println!("{}", line);
    }
}
