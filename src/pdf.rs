//! Minimal single-font-family PDF writer.
//!
//! Produces PDF 1.4 documents with text-only pages using the standard
//! Helvetica and Helvetica-Bold fonts in WinAnsi encoding, which is all the
//! monthly report needs. Coordinates are in points with the origin at the
//! bottom-left corner of the page.

use std::fmt::Write as _;
use std::io::Write as _;

/// US Letter, in points
pub const LETTER: (f64, f64) = (612.0, 792.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }
}

#[derive(Debug, Clone)]
struct Page {
    width: f64,
    height: f64,
    content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PdfDocument {
    title: String,
    created: Option<String>,
    pages: Vec<Page>,
    font: Font,
    gray: f64,
}

impl PdfDocument {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            created: None,
            pages: Vec::new(),
            font: Font::Helvetica,
            gray: 0.0,
        }
    }

    /// Start a new page; subsequent drawing goes to it
    pub fn add_page(&mut self, width: f64, height: f64) {
        self.pages.push(Page {
            width,
            height,
            content: Vec::new(),
        });
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    /// Text color as a gray level, 0.0 black to 1.0 white
    pub fn set_fill_gray(&mut self, gray: f64) {
        self.gray = gray.clamp(0.0, 1.0);
    }

    /// Draw a single line of text with its baseline at `(x, y)`
    pub fn draw_text(&mut self, text: &str, x: f64, y: f64, size: f64) {
        let font = self.font.resource_name();
        let gray = self.gray;
        if self.pages.is_empty() {
            self.add_page(LETTER.0, LETTER.1);
        }
        let Some(page) = self.pages.last_mut() else {
            return;
        };

        let _ = write!(
            page.content,
            "BT /{font} {size:.2} Tf {gray:.3} g {x:.2} {y:.2} Td ("
        );
        page.content.extend(escape_literal(text));
        page.content.extend(b") Tj ET\n");
    }

    pub fn add_metadata(&mut self, title: &str, created: &str) {
        self.title = title.to_string();
        self.created = Some(created.to_string());
    }

    /// Serialize with a correct cross-reference table
    pub fn to_bytes(&self) -> Vec<u8> {
        let pages = if self.pages.is_empty() {
            vec![Page {
                width: LETTER.0,
                height: LETTER.1,
                content: Vec::new(),
            }]
        } else {
            self.pages.clone()
        };

        // 1 catalog, 2 page tree, 3 regular font, 4 bold font, 5 info,
        // then a (page, content) pair per page.
        let first_page_obj = 6;
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
            .collect();

        let mut objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            )
            .into_bytes(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        ];

        let mut info = b"<< /Producer (Servyre IT) /Title (".to_vec();
        info.extend(escape_literal(&self.title));
        info.extend(b")");
        if let Some(created) = &self.created {
            info.extend(b" /CreationDate (");
            info.extend(escape_literal(created));
            info.extend(b")");
        }
        info.extend(b" >>");
        objects.push(info);

        for (i, page) in pages.iter().enumerate() {
            let content_obj = first_page_obj + 2 * i + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    page.width, page.height, content_obj
                )
                .into_bytes(),
            );

            let mut body =
                format!("<< /Length {} >>\nstream\n", page.content.len()).into_bytes();
            body.extend(&page.content);
            body.extend(b"\nendstream");
            objects.push(body);
        }

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend(format!("{} 0 obj\n", i + 1).into_bytes());
            out.extend(object);
            out.extend(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend(xref.into_bytes());
        out
    }
}

/// Map a character to its WinAnsi byte; unmapped characters become `?`
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '€' => 0x80,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}

/// Encode text as the body of a PDF literal string
fn escape_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            _ => out.push(win_ansi(c)),
        }
    }
    out
}
