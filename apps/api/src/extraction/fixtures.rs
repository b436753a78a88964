//! Document fixtures shared by extraction, pipeline and router tests.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

pub const SUMMARY_LINES: &[&str] = &[
    "Jane Doe - Senior Backend Engineer - jane.doe@example.com",
    "Eight years building distributed payment systems in Rust and Go.",
    "Led the migration of a 40-node cluster to Kubernetes with zero downtime.",
    "Reduced p99 checkout latency by 35 percent through query batching.",
    "Mentored six engineers and ran the on-call rotation for two teams.",
];

/// Minimal uncompressed single-page PDF whose page content shows each line with `Tj`.
pub fn text_layer_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 11 Tf\n72 720 Td\n");
    for line in lines {
        content.push_str(&format!("({line}) Tj\n0 -14 Td\n"));
    }
    content.push_str("ET\n");

    let mut pdf = String::from("%PDF-1.4\n");
    pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    pdf.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    pdf.push_str("3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>\nendobj\n");
    pdf.push_str(&format!(
        "4 0 obj\n<< /Length {} >>\nstream\n{content}endstream\nendobj\n",
        content.len()
    ));
    pdf.push_str("xref\n0 5\ntrailer\n<< /Size 5 /Root 1 0 R >>\nstartxref\n9\n%%EOF\n");
    pdf.into_bytes()
}

/// A PDF whose only page content is an embedded image.
pub fn image_only_pdf() -> Vec<u8> {
    let mut pdf = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /XObject /Subtype /Image >>\nstream\n");
    for _ in 0..2_000 {
        pdf.extend_from_slice(&[0x89, 0xA3, b'x', 0xF0, 0x00, b'Q', 0xC8, 0x17]);
    }
    pdf.extend_from_slice(b"\nendstream\nendobj\n%%EOF\n");
    pdf
}

/// A packed .docx with one paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}
