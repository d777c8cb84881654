use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{FormError, Result};
use crate::payload::Payload;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 7.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;

/// Renders a submitted payload as an A4 PDF, one `name: value` line per
/// field, and returns the file bytes.
pub fn submission_pdf(title: &str, payload: &Payload) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| FormError::Pdf(format!("{:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| FormError::Pdf(format!("{:?}", e)))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;
    current.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(y), &bold);
    y -= LINE_HEIGHT * 2.0;

    for (name, value) in payload.entries() {
        if y < MARGIN {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT - MARGIN;
        }
        current.use_text(format!("{}: {}", name, value), BODY_SIZE, Mm(MARGIN), Mm(y), &font);
        y -= LINE_HEIGHT;
    }

    doc.save_to_bytes()
        .map_err(|e| FormError::Pdf(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_pdf_file() {
        let mut payload = Payload::default();
        payload.insert("email", "a@b.com");
        let bytes = submission_pdf("Form submission", &payload).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_payloads_spill_onto_new_pages() {
        let mut payload = Payload::default();
        for i in 0..120 {
            payload.insert(&format!("field{}", i), "value");
        }
        assert!(submission_pdf("Form submission", &payload).is_ok());
    }
}
