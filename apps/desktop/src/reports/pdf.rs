//! # PDF Layout
//!
//! A small flowing layout on top of `lopdf`: text lines, key/value pairs
//! and tables with a repeated header, paginated on A4.
//!
//! ## Page Anatomy
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               Business Name                  │  header, every page
//! │               Report Title                   │
//! │         Period: 2025-01-01 to 2025-01-31     │
//! │ ──────────────────────────────────────────── │
//! │                                              │
//! │  body (cursor moves down, new page when the  │
//! │  next block would cross the footer line)     │
//! │                                              │
//! │ Generated: ...    Page 1 of 3    Business    │  footer, drawn last
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Only the base-14 Helvetica fonts are used, so text is limited to
//! Latin-1. Anything else prints as `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::ReportError;

const MARGIN: f32 = 40.0;
const FOOTER_Y: f32 = 22.0;
const BODY_BOTTOM: f32 = 48.0;
const LINE_GAP: f32 = 4.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Page orientation on A4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    fn size(self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (595.28, 841.89),
            Orientation::Landscape => (841.89, 595.28),
        }
    }
}

/// Horizontal alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A table column. `weight` is relative to the other columns.
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub weight: f32,
    pub align: Align,
}

impl Column {
    pub fn left(header: &str, weight: f32) -> Self {
        Column {
            header: header.to_string(),
            weight,
            align: Align::Left,
        }
    }

    pub fn right(header: &str, weight: f32) -> Self {
        Column {
            header: header.to_string(),
            weight,
            align: Align::Right,
        }
    }
}

/// Rows plus an optional bold totals row.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub totals: Option<Vec<String>>,
    pub font_size: f32,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
            totals: None,
            font_size: 9.0,
        }
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// A report being laid out.
#[derive(Debug)]
pub struct ReportDocument {
    business_name: String,
    title: String,
    period: Option<String>,
    width: f32,
    height: f32,
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl ReportDocument {
    /// Starts a document with its first page.
    pub fn new(
        business_name: &str,
        title: &str,
        period: Option<String>,
        orientation: Orientation,
    ) -> Self {
        let (width, height) = orientation.size();
        let mut doc = ReportDocument {
            business_name: business_name.to_string(),
            title: title.to_string(),
            period,
            width,
            height,
            pages: Vec::new(),
            y: 0.0,
        };
        doc.new_page();
        doc
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());

        let top = self.height - MARGIN;
        let business = self.business_name.clone();
        let title = self.title.clone();
        self.text_aligned(MARGIN, self.content_width(), top, 16.0, true, Align::Center, &business);
        self.text_aligned(MARGIN, self.content_width(), top - 18.0, 12.0, false, Align::Center, &title);

        let mut rule_y = top - 26.0;
        if let Some(period) = self.period.clone() {
            self.text_aligned(
                MARGIN,
                self.content_width(),
                top - 32.0,
                9.0,
                false,
                Align::Center,
                &format!("Period: {period}"),
            );
            rule_y = top - 40.0;
        }

        self.rule(MARGIN, self.width - MARGIN, rule_y, 0.8);
        self.y = rule_y - 18.0;
    }

    /// Starts a new page when `height` more points would not fit.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height < BODY_BOTTOM {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: &str) {
        let font = if bold { BOLD } else { REGULAR };
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(encode_text(text))]));
        ops.push(Operation::new("ET", vec![]));
    }

    #[allow(clippy::too_many_arguments)]
    fn text_aligned(
        &mut self,
        x: f32,
        width: f32,
        y: f32,
        size: f32,
        bold: bool,
        align: Align,
        text: &str,
    ) {
        let text = fit_text(text, width, size, bold);
        let text_width = text_width(&text, size, bold);
        let x = match align {
            Align::Left => x,
            Align::Center => x + (width - text_width) / 2.0,
            Align::Right => x + width - text_width,
        };
        self.text(x, y, size, bold, &text);
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, line_width: f32) {
        let ops = self.ops();
        ops.push(Operation::new("w", vec![line_width.into()]));
        ops.push(Operation::new("m", vec![x1.into(), y.into()]));
        ops.push(Operation::new("l", vec![x2.into(), y.into()]));
        ops.push(Operation::new("S", vec![]));
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Bold section heading.
    pub fn heading(&mut self, text: &str) {
        self.ensure_space(28.0);
        self.y -= 6.0;
        self.text(MARGIN, self.y, 11.0, true, text);
        self.y -= 11.0 + LINE_GAP + 2.0;
    }

    /// `Label: value` on one line.
    pub fn key_value(&mut self, label: &str, value: &str) {
        let size = 10.0;
        self.ensure_space(size + LINE_GAP);
        self.text(MARGIN, self.y, size, true, &format!("{label}:"));
        let value_width = self.content_width() - 130.0;
        self.text_aligned(MARGIN + 130.0, value_width, self.y, size, false, Align::Left, value);
        self.y -= size + LINE_GAP;
    }

    /// Word-wrapped text.
    pub fn paragraph(&mut self, text: &str) {
        let size = 10.0;
        for line in wrap_text(text, self.content_width(), size) {
            self.ensure_space(size + LINE_GAP);
            self.text(MARGIN, self.y, size, false, &line);
            self.y -= size + LINE_GAP;
        }
    }

    pub fn spacer(&mut self, height: f32) {
        self.y -= height;
    }

    /// Draws a table, repeating its header on every page it spans.
    pub fn table(&mut self, table: &Table) {
        let total_weight: f32 = table.columns.iter().map(|c| c.weight).sum();
        let scale = if total_weight > 0.0 {
            self.content_width() / total_weight
        } else {
            0.0
        };
        let widths: Vec<f32> = table.columns.iter().map(|c| c.weight * scale).collect();
        let row_height = table.font_size + LINE_GAP + 1.0;

        self.ensure_space(row_height * 2.0);
        self.table_header(table, &widths, row_height);

        for row in &table.rows {
            if self.ensure_space(row_height) {
                self.table_header(table, &widths, row_height);
            }
            self.table_row(table, &widths, row, false);
            self.y -= row_height;
        }

        if let Some(totals) = &table.totals {
            if self.ensure_space(row_height + 4.0) {
                self.table_header(table, &widths, row_height);
            }
            self.rule(MARGIN, self.width - MARGIN, self.y + table.font_size, 0.5);
            self.y -= 2.0;
            self.table_row(table, &widths, totals, true);
            self.y -= row_height;
        }

        self.y -= 6.0;
    }

    fn table_header(&mut self, table: &Table, widths: &[f32], row_height: f32) {
        let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
        self.table_row(table, widths, &headers, true);
        self.rule(MARGIN, self.width - MARGIN, self.y - 3.0, 0.5);
        self.y -= row_height + 2.0;
    }

    fn table_row(&mut self, table: &Table, widths: &[f32], cells: &[String], bold: bool) {
        let mut x = MARGIN;
        for ((column, width), cell) in table.columns.iter().zip(widths).zip(cells) {
            let padded = (width - 4.0).max(0.0);
            self.text_aligned(x + 2.0, padded, self.y, table.font_size, bold, column.align, cell);
            x += width;
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Adds footers and serializes the document.
    pub fn render(mut self, generated_at: &str) -> Result<Vec<u8>, ReportError> {
        let page_count = self.pages.len();
        let width = self.width;
        let business = self.business_name.clone();

        for index in 0..page_count {
            let mut footer = ReportDocument::footer_ops(
                width,
                &format!("Page {} of {}", index + 1, page_count),
                &format!("Generated: {generated_at}"),
                &business,
            );
            self.pages[index].append(&mut footer);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular_id,
                BOLD => bold_id,
            },
        });

        let mut page_ids = Vec::with_capacity(page_count);
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| ReportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        Ok(buffer)
    }

    fn footer_ops(width: f32, page: &str, generated: &str, business: &str) -> Vec<Operation> {
        let mut footer = ReportDocument {
            business_name: String::new(),
            title: String::new(),
            period: None,
            width,
            height: 0.0,
            pages: vec![vec![Operation::new("g", vec![0.5f32.into()])]],
            y: 0.0,
        };
        let inner = width - 2.0 * MARGIN;
        footer.text_aligned(MARGIN, inner, FOOTER_Y, 8.0, false, Align::Left, generated);
        footer.text_aligned(MARGIN, inner, FOOTER_Y, 8.0, false, Align::Center, page);
        footer.text_aligned(MARGIN, inner, FOOTER_Y, 8.0, false, Align::Right, business);
        footer.ops().push(Operation::new("g", vec![0f32.into()]));
        footer.pages.pop().unwrap_or_default()
    }
}

// =============================================================================
// Text helpers
// =============================================================================

/// Latin-1 bytes for a base-14 font string.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Approximate Helvetica advance width of one character, in 1/1000 em.
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 222.0,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' => 278.0,
        'r' | '-' => 333.0,
        'm' | 'M' => 833.0,
        'w' | 'W' => 722.0,
        '0'..='9' | 'a'..='z' | '#' | '$' | '?' | '_' => 556.0,
        'A'..='Z' | '&' | '%' => 667.0,
        _ => 556.0,
    }
}

/// Approximate rendered width of `text` in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let raw: f32 = text.chars().map(char_width).sum();
    let width = raw * size / 1000.0;
    if bold {
        width * 1.06
    } else {
        width
    }
}

/// Shortens `text` with `..` until it fits `width`.
pub fn fit_text(text: &str, width: f32, size: f32, bold: bool) -> String {
    if text_width(text, size, bold) <= width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "..";
        if text_width(&candidate, size, bold) <= width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap to `width`.
pub fn wrap_text(text: &str, width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, size, false) <= width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> Table {
        let mut table = Table::new(vec![Column::left("Name", 3.0), Column::right("Amount", 1.0)]);
        for i in 0..rows {
            table.push(vec![format!("Row {i}"), format!("{i}.00")]);
        }
        table.totals = Some(vec!["TOTAL".to_string(), "0.00".to_string()]);
        table
    }

    #[test]
    fn test_fit_text_truncates() {
        assert_eq!(fit_text("Short", 100.0, 10.0, false), "Short");
        let fitted = fit_text("A very long customer name indeed", 60.0, 10.0, false);
        assert!(fitted.ends_with(".."));
        assert!(text_width(&fitted, 10.0, false) <= 60.0);
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five six seven", 60.0, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "one two three four five six seven");
    }

    #[test]
    fn test_encode_text_replaces_non_latin() {
        assert_eq!(encode_text("Rs. 5"), b"Rs. 5".to_vec());
        assert_eq!(encode_text("₹5"), b"?5".to_vec());
    }

    #[test]
    fn test_long_table_paginates() {
        let mut doc = ReportDocument::new("JobCost Pro", "Test", None, Orientation::Portrait);
        doc.table(&table(200));
        assert!(doc.page_count() > 1);

        let bytes = doc.render("01/01/2025, 10:00:00").unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert!(parsed.get_pages().len() > 1);
    }

    #[test]
    fn test_render_single_page() {
        let mut doc = ReportDocument::new(
            "JobCost Pro",
            "Job Detail",
            Some("2025-01-01 to 2025-01-31".to_string()),
            Orientation::Landscape,
        );
        doc.heading("Cost Breakdown");
        doc.key_value("Amount", "Rs. 5,000.00");
        doc.paragraph("Cutting job - card sheets");
        doc.table(&table(3));

        let bytes = doc.render("now").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }
}
