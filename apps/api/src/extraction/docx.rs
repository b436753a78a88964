use async_trait::async_trait;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use crate::extraction::{ExtractedText, ExtractionError, ExtractionMethod, TextExtractor};

/// Raw text of a WordprocessingML document. Formatting, headers, footers and
/// footnotes are skipped; non-empty body paragraphs (including those in tables) are
/// kept in reading order, separated by a blank line.
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx-raw-text"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        Ok(ExtractedText {
            content: extract_raw_text(bytes)?,
            method: ExtractionMethod::Docx,
        })
    }
}

pub fn extract_raw_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in &document.document.children {
        match child {
            DocumentChild::Paragraph(p) => push_paragraph(p, &mut paragraphs),
            DocumentChild::Table(t) => collect_table(t, &mut paragraphs),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n\n").trim().to_string())
}

#[allow(irrefutable_let_patterns)]
fn collect_table(table: &Table, paragraphs: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => push_paragraph(p, paragraphs),
                    TableCellContent::Table(nested) => collect_table(nested, paragraphs),
                    _ => {}
                }
            }
        }
    }
}

fn push_paragraph(paragraph: &Paragraph, paragraphs: &mut Vec<String>) {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    if !text.trim().is_empty() {
        paragraphs.push(text);
    }
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for node in &run.children {
                    match node {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}
