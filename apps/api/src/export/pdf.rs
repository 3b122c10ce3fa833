//! PDF assembly with `lopdf`.
//!
//! Each staged page becomes one A4 page. Runs that WinAnsi can encode are drawn with
//! the base-14 Helvetica faces the layout was measured with. Any other run is drawn
//! with an embedded DejaVu Sans face, horizontally scaled to the measured width so
//! link boxes still line up. Link regions become `/Link` annotations with `/URI`
//! actions.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::warn;

use crate::export::fonts::{glyph_string, EmbeddedFont};
use crate::export::rasterizer::{PageRaster, StagingArea};
use crate::export::ExportError;
use crate::preview::font_metrics::FontFace;
use crate::preview::layout::TextRun;

/// A4 in PostScript points.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

const MUTED_GRAY: f32 = 0.4;
const RULE_WIDTH_PT: f32 = 0.75;

/// Maps logical page pixels onto PDF points, flipping y.
#[derive(Debug, Clone, Copy)]
pub struct PointMapper {
    scale: f32,
}

impl PointMapper {
    pub fn for_page(raster: &PageRaster) -> Self {
        Self {
            scale: A4_WIDTH_PT / raster.width_px,
        }
    }

    pub fn len(&self, px: f32) -> f32 {
        px * self.scale
    }

    pub fn x(&self, px: f32) -> f32 {
        px * self.scale
    }

    pub fn y(&self, px: f32) -> f32 {
        A4_HEIGHT_PT - px * self.scale
    }

    /// `[llx, lly, urx, ury]` for a top-left-anchored box.
    pub fn rect(&self, x: f32, y: f32, width: f32, height: f32) -> [f32; 4] {
        [self.x(x), self.y(y + height), self.x(x + width), self.y(y)]
    }
}

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    /// Loaded on first use, at most one per face.
    embedded: Vec<EmbeddedFont>,
    missing_glyphs: usize,
    page_ids: Vec<ObjectId>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in [FontFace::Regular, FontFace::Bold, FontFace::Italic] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font_resource(face), font_id);
        }

        Self {
            doc,
            pages_id,
            fonts,
            embedded: Vec::new(),
            missing_glyphs: 0,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Appends one page built from the staged layout.
    pub fn add_page(
        &mut self,
        raster: &PageRaster,
        staging: &StagingArea,
    ) -> Result<(), ExportError> {
        let map = PointMapper::for_page(raster);
        let layout = staging.layout();
        let mut ops = Vec::with_capacity(layout.runs.len() * 5 + layout.rules.len() * 4 + 2);

        if !layout.rules.is_empty() {
            ops.push(Operation::new("w", vec![real(RULE_WIDTH_PT)]));
            for rule in &layout.rules {
                ops.push(Operation::new("m", vec![real(map.x(rule.x)), real(map.y(rule.y))]));
                ops.push(Operation::new(
                    "l",
                    vec![real(map.x(rule.x + rule.width)), real(map.y(rule.y))],
                ));
                ops.push(Operation::new("S", vec![]));
            }
        }

        for run in &layout.runs {
            let gray = if run.muted { MUTED_GRAY } else { 0.0 };
            let (resource, horizontal_scale, text) = self.encode_run(run)?;
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("g", vec![real(gray)]));
            ops.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(resource.into_bytes()),
                    real(map.len(run.size_px)),
                ],
            ));
            ops.push(Operation::new("Tz", vec![real(horizontal_scale)]));
            ops.push(Operation::new("Td", vec![real(map.x(run.x)), real(map.y(run.y))]));
            ops.push(Operation::new("Tj", vec![text]));
            ops.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations: ops }.encode()?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let annots: Vec<Object> = layout
            .links
            .iter()
            .map(|link| {
                let rect = map.rect(link.x, link.y, link.width, link.height);
                let annot_id = self.doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => rect.iter().map(|v| real(*v)).collect::<Vec<_>>(),
                    "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
                    "A" => dictionary! {
                        "S" => "URI",
                        "URI" => Object::String(
                            link.url.as_bytes().to_vec(),
                            StringFormat::Literal,
                        ),
                    },
                });
                Object::Reference(annot_id)
            })
            .collect();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        let page_id = self.doc.add_object(page);
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Picks the font for a run and encodes its text. Returns the font resource
    /// name, the `Tz` percentage and the string operand.
    fn encode_run(&mut self, run: &TextRun) -> Result<(String, f32, Object), ExportError> {
        if let Some(bytes) = encode_win_ansi(&run.text) {
            return Ok((
                font_resource(run.face).to_string(),
                100.0,
                Object::String(bytes, StringFormat::Literal),
            ));
        }

        let index = match self.embedded.iter().position(|f| f.face() == run.face) {
            Some(index) => index,
            None => {
                self.embedded.push(EmbeddedFont::load(run.face)?);
                self.embedded.len() - 1
            }
        };
        let encoded = self.embedded[index].encode(&run.text);
        self.missing_glyphs += encoded.missing;

        let natural_width = encoded.width_em * run.size_px;
        let horizontal_scale = if natural_width > 0.0 && run.width > 0.0 {
            100.0 * run.width / natural_width
        } else {
            100.0
        };
        Ok((
            embedded_resource(run.face).to_string(),
            horizontal_scale,
            glyph_string(&encoded),
        ))
    }

    /// Writes the page tree and catalog and serializes the document.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        if self.page_ids.is_empty() {
            return Err(ExportError::NoPages);
        }
        if self.missing_glyphs > 0 {
            warn!(
                "{} character(s) have no glyph in the embedded font and will not display",
                self.missing_glyphs
            );
        }

        let mut fonts = std::mem::take(&mut self.fonts);
        for font in &self.embedded {
            let font_id = font.write(&mut self.doc);
            fonts.set(embedded_resource(font.face()), font_id);
        }
        let resources_id = self.doc.add_object(dictionary! { "Font" => fonts });

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(A4_WIDTH_PT), real(A4_HEIGHT_PT)],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
    }
}

fn embedded_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "E1",
        FontFace::Bold => "E2",
        FontFace::Italic => "E3",
    }
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

/// Encodes `text` as WinAnsi (cp1252), or `None` when any character falls outside it.
pub fn encode_win_ansi(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => Some(c as u8),
            '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
            '€' => Some(0x80),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            _ => None,
        })
        .collect()
}
