//! HTML table scraping.
//!
//! Published spreadsheet pages wrap the data in a `<table>` alongside
//! navigation tables, a column-letter row (`A B C ...`) and a row-number
//! gutter. The scraper picks the row that looks most like a header, by
//! counting cells that match a known candidate column name, and reads
//! the rows below it.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Node, Selector};

use crate::columns::ColumnCandidates;
use crate::models::RawTable;

/// How many leading rows of each table are considered as header candidates.
const HEADER_SCAN_ROWS: usize = 8;

/// Elements that separate words inside a cell. Inline runs (`span`, `b`,
/// `a`, ...) do not.
const BREAKING_ELEMENTS: [&str; 5] = ["br", "div", "p", "li", "tr"];

struct Cell {
    text: String,
    /// `true` for `th` cells.
    heading: bool,
}

struct ScrapedTable {
    rows: Vec<Vec<Cell>>,
}

impl ScrapedTable {
    fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Extracts a header row and data rows from the best table in `html`.
///
/// Returns an empty table (no headers) when the document has no table.
pub fn scrape_table(html: &str, candidates: &ColumnCandidates) -> Result<RawTable> {
    let tables = parse_tables(html)?;

    let Some((table_idx, header_idx)) = find_header(&tables, candidates) else {
        return Ok(RawTable::default());
    };

    let table = &tables[table_idx];
    let header_row = &table.rows[header_idx];

    // A `th` in a row of `td`s is a row-number gutter; blank cells are spacers.
    let mixed = header_row.iter().any(|c| !c.heading);
    let kept: Vec<usize> = header_row
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.text.is_empty() && !(mixed && c.heading))
        .map(|(i, _)| i)
        .collect();

    let headers: Vec<String> = kept.iter().map(|&i| header_row[i].text.clone()).collect();
    let rows: Vec<Vec<String>> = table.rows[header_idx + 1..]
        .iter()
        .map(|row| {
            kept.iter()
                .map(|&i| row.get(i).map(|c| c.text.clone()).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::from_rows(headers, rows))
}

fn parse_tables(html: &str) -> Result<Vec<ScrapedTable>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;

    let tables = document
        .select(&table_sel)
        .map(|table| ScrapedTable {
            rows: table
                .select(&row_sel)
                .map(row_cells)
                .filter(|cells| !cells.is_empty())
                .collect(),
        })
        .filter(|t| !t.rows.is_empty())
        .collect();

    Ok(tables)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{}': {:?}", css, e))
}

/// Direct `th`/`td` children of a row, text with whitespace collapsed.
fn row_cells(row: ElementRef<'_>) -> Vec<Cell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|cell| Cell {
            text: cell_text(cell),
            heading: cell.value().name() == "th",
        })
        .collect()
}

/// Concatenates the cell's text nodes, so a word split across inline
/// elements stays one word.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if BREAKING_ELEMENTS.contains(&el.name()) => text.push(' '),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Picks `(table index, row index)` of the header row.
///
/// The row with the most candidate-name matches wins, ties going to the
/// larger table. With no matches anywhere, the first non-blank row of the
/// largest table is used.
fn find_header(tables: &[ScrapedTable], candidates: &ColumnCandidates) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, usize, usize)> = None; // (score, cells, table, row)

    for (t, table) in tables.iter().enumerate() {
        let cells = table.cell_count();
        for (r, row) in table.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
            let score = row
                .iter()
                .filter(|c| candidates.matches_any(&c.text))
                .count();
            if score == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((s, c, _, _)) => score > s || (score == s && cells > c),
            };
            if better {
                best = Some((score, cells, t, r));
            }
        }
    }

    if let Some((_, _, t, r)) = best {
        return Some((t, r));
    }

    let (t, table) = tables
        .iter()
        .enumerate()
        .max_by_key(|(i, t)| (t.cell_count(), std::cmp::Reverse(*i)))?;
    let r = table
        .rows
        .iter()
        .position(|row| row.iter().any(|c| !c.text.is_empty()))?;
    Some((t, r))
}
