//! Terminal presentation of a [`DirectoryView`].
//!
//! Cards show title, display tags, link, description and image reference.
//! Hidden tags are never printed. A failed load still renders: the summary
//! line, the error message, and zero cards.

use std::io::{self, Write};

use crate::directory::DirectoryView;
use crate::models::CanonicalRow;
use crate::slug::slug_eq;

pub fn render_cards<W: Write>(view: &DirectoryView<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", summary(view))?;

    if let Some(error) = view.error {
        writeln!(out, "error: {}", error)?;
    }

    for row in &view.rows {
        writeln!(out)?;
        render_card(row, out)?;
    }

    Ok(())
}

fn summary(view: &DirectoryView<'_>) -> String {
    let mut line = format!("Showing {} of {} entries", view.rows.len(), view.total);
    if !view.selected.is_empty() {
        line.push_str(&format!(" | tags: {}", view.selected.join(", ")));
    }
    if !view.query.trim().is_empty() {
        line.push_str(&format!(" | search: \"{}\"", view.query.trim()));
    }
    if view.loading {
        line.push_str(" | loading");
    }
    line
}

fn render_card<W: Write>(row: &CanonicalRow, out: &mut W) -> io::Result<()> {
    let tags = row.display_tags();
    if tags.is_empty() {
        writeln!(out, "{}", row.title)?;
    } else {
        writeln!(out, "{}  [{}]", row.title, tags.join(" · "))?;
    }
    if !row.link.is_empty() {
        writeln!(out, "  {}", row.link)?;
    }
    if !row.description.is_empty() {
        for line in row.description.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(out, "  {}", line.trim())?;
        }
    }
    writeln!(out, "  logo: {}", row.image)
}

/// Prints the filter chips, marking selected ones with `*`.
pub fn render_vocabulary<W: Write>(view: &DirectoryView<'_>, out: &mut W) -> io::Result<()> {
    if let Some(error) = view.error {
        writeln!(out, "error: {}", error)?;
        return Ok(());
    }
    writeln!(out, "Filter by {}:", view.axis.label())?;
    for tag in view.vocabulary {
        let selected = view.selected.iter().any(|s| slug_eq(s, tag));
        writeln!(out, "  {} {}", if selected { "*" } else { "-" }, tag)?;
    }
    Ok(())
}
