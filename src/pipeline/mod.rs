pub mod roster;
pub mod extraction;
pub mod matching;
pub mod import;
pub mod cancel;
pub mod splitter;
pub mod archive;
pub mod batch;
pub mod processor; // Roster → batch → archive orchestrator

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! PDFs and readers shared by pipeline tests.

    use lopdf::dictionary;
    use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

    use super::extraction::types::check_page;
    use super::extraction::{DocumentReader, ExtractionError, PagedDocument};

    fn escape_pdf_text(text: &str) -> String {
        text.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    fn build_document(pages: &[&str]) -> Document {
        build_document_with_font(
            pages,
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
        )
    }

    fn build_document_with_font(pages: &[&str], font: Dictionary) -> Document {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(font);

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            // One text line per source line, 14pt apart.
            let mut content = String::from("BT /F1 12 Tf 14 TL 72 720 Td");
            for line in text.lines() {
                content.push_str(&format!(" ({}) Tj T*", escape_pdf_text(line)));
            }
            content.push_str(" ET");

            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    /// A real PDF with one Helvetica text page per entry.
    pub fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = build_document(pages);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// Structurally valid PDF whose font names an encoding pdf-extract
    /// does not know; its text extractor panics on it.
    pub fn make_unknown_encoding_pdf() -> Vec<u8> {
        let mut doc = build_document_with_font(
            &["Certifica-se que Maria Silva"],
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "FooEncoding",
            },
        );
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// A PDF whose trailer declares standard-security encryption with a
    /// password we never supply.
    pub fn make_encrypted_pdf() -> Vec<u8> {
        let mut doc = build_document(&["Certifica-se que Maria Silva"]);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(vec![0x5a; 32], StringFormat::Hexadecimal),
            "U" => Object::String(vec![0xa5; 32], StringFormat::Hexadecimal),
            "P" => -44,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            vec![
                Object::String(vec![0x01; 16], StringFormat::Hexadecimal),
                Object::String(vec![0x01; 16], StringFormat::Hexadecimal),
            ],
        );
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    const MOCK_HEADER: &str = "%PDF-mock\n";
    const MOCK_ENCRYPTED: &str = "%PDF-encrypted";
    const PAGE_BREAK: char = '\u{c}';

    /// Bytes `MockReader` opens as a document with these page texts.
    pub fn mock_pdf(pages: &[&str]) -> Vec<u8> {
        let joined = pages.join(&PAGE_BREAK.to_string());
        format!("{MOCK_HEADER}{joined}").into_bytes()
    }

    /// Bytes `MockReader` reports as encrypted.
    pub fn mock_encrypted_pdf(tag: &str) -> Vec<u8> {
        format!("{MOCK_ENCRYPTED} {tag}").into_bytes()
    }

    /// Text-level reader: pages are form-feed separated UTF-8 text, so
    /// tests can use accents and line breaks freely.
    pub struct MockReader;

    struct MockDocument {
        pages: Vec<String>,
    }

    impl DocumentReader for MockReader {
        fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError> {
            let text = std::str::from_utf8(pdf_bytes)
                .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
            if text.starts_with(MOCK_ENCRYPTED) {
                return Err(ExtractionError::Encrypted);
            }
            let body = text
                .strip_prefix(MOCK_HEADER)
                .ok_or_else(|| ExtractionError::PdfParsing("not a mock document".into()))?;
            Ok(Box::new(MockDocument {
                pages: body.split(PAGE_BREAK).map(String::from).collect(),
            }))
        }
    }

    impl PagedDocument for MockDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, page: usize) -> Result<&str, ExtractionError> {
            let index = check_page(page, self.pages.len())?;
            Ok(&self.pages[index])
        }

        fn page_bytes(&self, page: usize) -> Result<Vec<u8>, ExtractionError> {
            let index = check_page(page, self.pages.len())?;
            Ok(format!("%PDF-page {page}\n{}", self.pages[index]).into_bytes())
        }
    }
}
