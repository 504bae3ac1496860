//! HTML table reader
//!
//! Turns every `<table>` of a page into a header grid (with `colspan` and
//! `rowspan` expanded, so a two-row header becomes a two-level column key)
//! and a list of data rows.

use scraper::{ElementRef, Html, Selector};

/// One parsed `<table>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    /// Header levels, each expanded to one label per column
    pub header: Vec<Vec<String>>,
    /// Body rows as cell text
    pub rows: Vec<Vec<String>>,
}

struct HeaderCell {
    text: String,
    colspan: usize,
    rowspan: usize,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Largest `colspan` and `rowspan` honoured, as in HTML table processing
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

fn span(cell: ElementRef<'_>, attr: &str, max: usize) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}

/// Parse all tables of an HTML document
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    let tables = selector("table");
    let rows = selector("tr");
    let cells = selector("th, td");

    document
        .select(&tables)
        .map(|table| {
            let mut header_rows: Vec<Vec<HeaderCell>> = Vec::new();
            let mut body: Vec<Vec<String>> = Vec::new();

            for row in table.select(&rows) {
                let row_cells: Vec<ElementRef<'_>> = row.select(&cells).collect();
                if row_cells.is_empty() {
                    continue;
                }
                let is_header = row_cells.iter().all(|c| c.value().name() == "th");
                if is_header {
                    // th-only rows after the body started are repeated captions
                    if body.is_empty() {
                        header_rows.push(
                            row_cells
                                .iter()
                                .map(|c| HeaderCell {
                                    text: cell_text(*c),
                                    colspan: span(*c, "colspan", MAX_COLSPAN),
                                    rowspan: span(*c, "rowspan", MAX_ROWSPAN),
                                })
                                .collect(),
                        );
                    }
                } else {
                    body.push(row_cells.into_iter().map(cell_text).collect());
                }
            }

            HtmlTable {
                header: expand_header(&header_rows),
                rows: body,
            }
        })
        .collect()
}

fn expand_header(rows: &[Vec<HeaderCell>]) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<Option<String>>> = vec![Vec::new(); rows.len()];

    for (r, row) in rows.iter().enumerate() {
        let mut col = 0;
        for cell in row {
            while grid[r].get(col).is_some_and(|slot| slot.is_some()) {
                col += 1;
            }
            for level in grid.iter_mut().skip(r).take(cell.rowspan) {
                if level.len() < col + cell.colspan {
                    level.resize(col + cell.colspan, None);
                }
                for slot in &mut level[col..col + cell.colspan] {
                    *slot = Some(cell.text.clone());
                }
            }
            col += cell.colspan;
        }
    }

    grid.into_iter()
        .map(|level| level.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}

fn label_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl HtmlTable {
    /// Whether the header has at least two levels (column groups)
    pub fn is_multi_level(&self) -> bool {
        self.header.len() >= 2
    }

    /// Index of the column under `group` whose bottom-level label is `label`
    pub fn column(&self, group: &str, label: &str) -> Option<usize> {
        let top = self.header.first()?;
        let bottom = self.header.last()?;
        (0..top.len().min(bottom.len()))
            .find(|&i| label_eq(&top[i], group) && label_eq(&bottom[i], label))
    }

    /// Cell text in the first body row under the given column key
    pub fn first_row_cell(&self, group: &str, label: &str) -> Option<&str> {
        let index = self.column(group, label)?;
        self.rows.first()?.get(index).map(String::as_str)
    }
}
