//! Font handling for PDF documents

use crate::{deflate, PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Standard Type1 fonts every PDF reader provides without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinFont {
    #[default]
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// PostScript base font name
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Encode text as a PDF literal string in WinAnsiEncoding
    ///
    /// Characters outside the encoding render as `?`.
    pub fn encode_text_literal(&self, text: &str) -> String {
        let mut result = String::from("(");
        for c in text.chars() {
            match winansi_byte(c) {
                Some(b'(') => result.push_str("\\("),
                Some(b')') => result.push_str("\\)"),
                Some(b'\\') => result.push_str("\\\\"),
                Some(b) if (0x20..0x7F).contains(&b) => result.push(b as char),
                Some(b) => result.push_str(&format!("\\{b:03o}")),
                None => result.push('?'),
            }
        }
        result.push(')');
        result
    }

    /// Font dictionary for a non-embedded Type1 font
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Object::Name(self.base_name().as_bytes().to_vec())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Map a character to its WinAnsiEncoding byte
fn winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E => Some(c as u8),
        0xA0..=0xFF => Some(c as u32 as u8),
        0x2026 => Some(0x85), // …
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x20AC => Some(0x80),
        _ => None,
    }
}

/// A glyph kept in the embedded subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsetGlyph {
    /// Glyph ID in the source font
    original: u16,
    /// First character drawn with this glyph, for ToUnicode
    ch: char,
}

/// Font data structure for embedded fonts
///
/// Only glyphs that were actually drawn are embedded. Each one gets a
/// subset glyph ID the first time it is drawn; ID 0 stays `.notdef`.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Source glyph ID to subset glyph ID
    glyph_map: HashMap<u16, u16>,
    /// Subset glyphs in ID order; subset ID is index + 1
    subset_glyphs: Vec<SubsetGlyph>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (compressed subset TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
    /// CID to source glyph map, present when the whole font is embedded
    pub cid_to_gid_stream: Option<Stream>,
}

/// A font registered with a document
#[derive(Debug, Clone)]
pub enum LoadedFont {
    /// TrueType font embedded as a CID-keyed Type0 font
    TrueType(FontData),
    /// Standard font referenced by name only
    Builtin(BuiltinFont),
}

impl LoadedFont {
    /// Encode text as a string operand for the `Tj` operator
    ///
    /// Glyphs of an embedded font join the subset as a side effect.
    pub fn encode_operand(&mut self, text: &str) -> String {
        match self {
            LoadedFont::TrueType(data) => {
                data.add_chars(text);
                data.encode_text_hex(text)
            }
            LoadedFont::Builtin(builtin) => builtin.encode_text_literal(text),
        }
    }
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            glyph_map: HashMap::new(),
            subset_glyphs: Vec::new(),
        })
    }

    /// Parse the face from the owned bytes
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Add the glyphs of `text` to the subset
    ///
    /// Characters the font cannot draw map to `.notdef` and add nothing.
    pub fn add_chars(&mut self, text: &str) {
        let found: Vec<(char, u16)> = match self.face() {
            Some(face) => text
                .chars()
                .filter_map(|c| face.glyph_index(c).map(|id| (c, id.0)))
                .filter(|&(_, gid)| gid != 0)
                .collect(),
            None => return,
        };

        for (ch, original) in found {
            if self.glyph_map.contains_key(&original) {
                continue;
            }
            let subset_id = self.subset_glyphs.len() as u16 + 1;
            self.glyph_map.insert(original, subset_id);
            self.subset_glyphs.push(SubsetGlyph { original, ch });
        }
    }

    /// Number of glyphs in the subset, excluding `.notdef`
    pub fn subset_len(&self) -> usize {
        self.subset_glyphs.len()
    }

    /// Subset glyph ID for a source glyph, `.notdef` when not in the subset
    fn subset_id(&self, original: Option<u16>) -> u16 {
        original
            .and_then(|gid| self.glyph_map.get(&gid).copied())
            .unwrap_or(0)
    }

    /// Cut the font program down to the subset glyphs
    ///
    /// The subsetter assigns new IDs in the order glyphs are remapped, so
    /// replaying `subset_glyphs` in order must reproduce the IDs already
    /// written into content streams.
    fn subset_program(&self) -> Result<Vec<u8>> {
        let mut remapper = subsetter::GlyphRemapper::new();
        remapper.remap(0); // .notdef keeps ID 0
        for (index, glyph) in self.subset_glyphs.iter().enumerate() {
            let assigned = remapper.remap(glyph.original);
            if assigned as usize != index + 1 {
                return Err(PdfError::FontSubsetError(format!(
                    "glyph {} remapped to {assigned}, expected {}",
                    glyph.original,
                    index + 1
                )));
            }
        }

        subsetter::subset(&self.ttf_data, 0, &remapper)
            .map_err(|e| PdfError::FontSubsetError(format!("{e:?}")))
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let face = self
            .face()
            .ok_or_else(|| PdfError::FontParseError(self.name.clone()))?;
        let units_per_em = face.units_per_em().max(1) as i64;
        let scale = |v: i64| v * 1000 / units_per_em;

        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        // Content streams already use subset IDs; a whole-font fallback maps
        // them back to source glyphs
        let (program, cid_to_gid_stream) = match self.subset_program() {
            Ok(program) => {
                debug!(
                    font = %self.name,
                    glyphs = self.subset_glyphs.len(),
                    original = self.ttf_data.len(),
                    subset = program.len(),
                    "subset embedded font"
                );
                (program, None)
            }
            Err(err) => {
                warn!(font = %self.name, error = %err, "subsetting failed, embedding whole font");
                let map = Stream::new(Dictionary::new(), self.cid_to_gid_map());
                (self.ttf_data.clone(), Some(map))
            }
        };
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![
                ("Length1", (program.len() as i64).into()),
                ("Filter", "FlateDecode".into()),
            ]),
            deflate(&program)?,
        );

        let ascender = scale(face.ascender() as i64);
        let descender = scale(face.descender() as i64);

        let font_bbox = vec![0.into(), descender.into(), 1000.into(), ascender.into()];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))), // Set when embedding
        ]);

        let widths_array = self.generate_widths_array(&face);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))), // Set when embedding
            ("CIDToGIDMap", "Identity".into()), // Map stream on whole-font fallback
            ("W", widths_array.into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()), // Set when embedding
            ("ToUnicode", Object::Reference((0, 0))),                     // Set when embedding
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
            cid_to_gid_stream,
        })
    }

    /// Big-endian source glyph ID for every subset ID, `.notdef` first
    fn cid_to_gid_map(&self) -> Vec<u8> {
        std::iter::once(0u16)
            .chain(self.subset_glyphs.iter().map(|glyph| glyph.original))
            .flat_map(u16::to_be_bytes)
            .collect()
    }

    /// Encode text as a hex string of subset glyph IDs for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut result = String::new();
        for c in text.chars() {
            let original = face
                .as_ref()
                .and_then(|face| face.glyph_index(c))
                .map(|id| id.0);
            let gid = self.subset_id(original);
            result.push_str(&format!("{gid:04X}"));
        }
        format!("<{result}>")
    }

    /// Generate /W array keyed by subset glyph ID
    fn generate_widths_array(&self, face: &ttf_parser::Face<'_>) -> Vec<Object> {
        let units_per_em = face.units_per_em().max(1) as i64;
        let mut widths = Vec::with_capacity(self.subset_glyphs.len() * 2);

        // Individual mapping format: [gid1 [width1] gid2 [width2] ...]
        for (index, glyph) in self.subset_glyphs.iter().enumerate() {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(glyph.original))
                .map(|a| a as i64 * 1000 / units_per_em)
                .unwrap_or(1000);
            widths.push((index as i64 + 1).into());
            widths.push(vec![advance.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");

        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let entries: Vec<(usize, char)> = self
            .subset_glyphs
            .iter()
            .enumerate()
            .map(|(index, glyph)| (index + 1, glyph.ch))
            .collect();

        // bfchar sections are limited to 100 entries each
        for chunk in entries.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut utf16 = [0u16; 2];
                let units: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{units}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}
