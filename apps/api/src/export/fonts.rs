//! Embedded DejaVu Sans faces for text that WinAnsi cannot encode.
//!
//! Each face is written as a Type0 font with an Identity-H encoding, so content
//! strings are glyph ids. A ToUnicode map keeps the text searchable and copyable.

use std::collections::BTreeMap;

use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use ttf_parser::{Face, GlyphId};

use crate::export::ExportError;
use crate::preview::font_metrics::FontFace;

const DEJAVU_SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const DEJAVU_SANS_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
const DEJAVU_SANS_OBLIQUE: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Oblique.ttf");

/// PDF glyph space is 1000 units per em.
const PDF_UNITS_PER_EM: f32 = 1000.0;
/// A ToUnicode `bfchar` block holds at most 100 entries.
const BFCHAR_CHUNK: usize = 100;

fn font_source(face: FontFace) -> (&'static [u8], &'static str, f32) {
    match face {
        FontFace::Regular => (DEJAVU_SANS, "DejaVuSans", 0.0),
        FontFace::Bold => (DEJAVU_SANS_BOLD, "DejaVuSans-Bold", 0.0),
        FontFace::Italic => (DEJAVU_SANS_OBLIQUE, "DejaVuSans-Oblique", -11.0),
    }
}

/// Glyph-id encoded text and its advance width in ems.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    pub width_em: f32,
    /// Characters the face has no glyph for.
    pub missing: usize,
}

/// One embedded face plus the glyphs used so far.
pub struct EmbeddedFont {
    face: FontFace,
    parsed: Face<'static>,
    /// glyph id -> (advance in font units, text it stands for)
    used: BTreeMap<u16, (u16, String)>,
}

impl EmbeddedFont {
    pub fn load(face: FontFace) -> Result<Self, ExportError> {
        let (data, name, _) = font_source(face);
        let parsed = Face::parse(data, 0)
            .map_err(|e| ExportError::Font(format!("{name}: {e}")))?;
        Ok(Self {
            face,
            parsed,
            used: BTreeMap::new(),
        })
    }

    pub fn face(&self) -> FontFace {
        self.face
    }

    /// Encodes `text` as big-endian glyph ids and records the glyphs for the
    /// width and ToUnicode tables.
    pub fn encode(&mut self, text: &str) -> EncodedText {
        let units_per_em = f32::from(self.parsed.units_per_em());
        let mut bytes = Vec::with_capacity(text.len() * 2);
        let mut advance_total = 0u32;
        let mut missing = 0;

        for c in text.chars() {
            let gid = match self.parsed.glyph_index(c) {
                Some(gid) => gid,
                None => {
                    missing += 1;
                    GlyphId(0)
                }
            };
            let advance = self.parsed.glyph_hor_advance(gid).unwrap_or(0);
            advance_total += u32::from(advance);
            bytes.extend_from_slice(&gid.0.to_be_bytes());
            if gid.0 != 0 {
                self.used
                    .entry(gid.0)
                    .or_insert_with(|| (advance, c.to_string()));
            }
        }

        EncodedText {
            bytes,
            width_em: advance_total as f32 / units_per_em,
            missing,
        }
    }

    /// Writes the font program, descriptor, descendant CID font and ToUnicode map.
    /// Returns the Type0 font object to reference from the page resources.
    pub fn write(&self, doc: &mut Document) -> ObjectId {
        let (data, name, italic_angle) = font_source(self.face);
        let scale = PDF_UNITS_PER_EM / f32::from(self.parsed.units_per_em());
        let to_pdf = |v: i16| Object::Integer((f32::from(v) * scale).round() as i64);

        let font_file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => data.len() as i64 },
            data.to_vec(),
        ));

        let bbox = self.parsed.global_bounding_box();
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => name,
            // Nonsymbolic
            "Flags" => 32,
            "FontBBox" => vec![
                to_pdf(bbox.x_min),
                to_pdf(bbox.y_min),
                to_pdf(bbox.x_max),
                to_pdf(bbox.y_max),
            ],
            "ItalicAngle" => Object::Real(italic_angle),
            "Ascent" => to_pdf(self.parsed.ascender()),
            "Descent" => to_pdf(self.parsed.descender()),
            "CapHeight" => to_pdf(self.parsed.capital_height().unwrap_or(self.parsed.ascender())),
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });

        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for (gid, (advance, _)) in &self.used {
            widths.push(Object::Integer(i64::from(*gid)));
            widths.push(Object::Array(vec![Object::Integer(
                (f32::from(*advance) * scale).round() as i64,
            )]));
        }

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => name,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = doc.add_object(Stream::new(
            dictionary! {},
            self.to_unicode_cmap().into_bytes(),
        ));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => name,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }

    fn to_unicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let entries: Vec<(&u16, &String)> =
            self.used.iter().map(|(gid, (_, s))| (gid, s)).collect();
        for chunk in entries.chunks(BFCHAR_CHUNK) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, text) in chunk {
                let utf16: String = text.encode_utf16().map(|u| format!("{u:04X}")).collect();
                cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap
    }
}

/// Wraps encoded glyph ids as a hex string operand.
pub fn glyph_string(encoded: &EncodedText) -> Object {
    Object::String(encoded.bytes.clone(), StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polish_name_has_every_glyph() {
        let mut font = EmbeddedFont::load(FontFace::Regular).unwrap();
        let encoded = font.encode("Łukasz Żółć");
        assert_eq!(encoded.missing, 0);
        assert_eq!(encoded.bytes.len(), "Łukasz Żółć".chars().count() * 2);
        assert!(encoded.width_em > 0.0);
    }

    #[test]
    fn test_cmap_maps_glyphs_back_to_text() {
        let mut font = EmbeddedFont::load(FontFace::Bold).unwrap();
        let encoded = font.encode("Ψ Ж");
        let cmap = font.to_unicode_cmap();

        let first = u16::from_be_bytes([encoded.bytes[0], encoded.bytes[1]]);
        assert!(cmap.contains(&format!("<{first:04X}> <03A8>")));
        let last = u16::from_be_bytes([encoded.bytes[4], encoded.bytes[5]]);
        assert!(cmap.contains(&format!("<{last:04X}> <0416>")));
        assert!(cmap.contains("3 beginbfchar"));
    }

    #[test]
    fn test_unsupported_characters_are_counted() {
        let mut font = EmbeddedFont::load(FontFace::Regular).unwrap();
        let encoded = font.encode("日本");
        assert_eq!(encoded.missing, 2);
        assert_eq!(encoded.bytes, vec![0, 0, 0, 0]);
    }
}
