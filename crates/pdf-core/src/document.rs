//! PDF Document wrapper

use crate::graphics::{fill_rect_operators, line_operators, stroke_rect_operators, Rect};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{deflate, BuiltinFont, FontData, LoadedFont, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A4 page width in points
pub const A4_WIDTH: f64 = 595.0;
/// A4 page height in points
pub const A4_HEIGHT: f64 = 842.0;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Red color
    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    /// Gray color
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper providing high-level operations
///
/// Drawing calls are buffered per page in call order and written to the
/// page content streams on save, so later calls paint over earlier ones.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered fonts (name -> font)
    fonts: HashMap<String, LoadedFont>,
    /// Current font name
    current_font: Option<String>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Embedded fonts (font name -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Page font resources (page number -> font name -> resource name)
    page_font_resources: HashMap<usize, HashMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_count())
            .field("fonts", &self.fonts.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    fn from_inner(inner: Document) -> Self {
        Self {
            inner,
            fonts: HashMap::new(),
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Create an empty document with no pages
    ///
    /// # Example
    /// ```ignore
    /// let mut doc = PdfDocument::new();
    /// let page = doc.add_blank_page(595.0, 842.0)?;
    /// assert_eq!(page, 1);
    /// ```
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");

        let pages_id = inner.add_object(Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Kids", Object::Array(Vec::new())),
            ("Count", 0.into()),
        ]));

        let catalog_id = inner.add_object(Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("Pages", Object::Reference(pages_id)),
        ]));

        inner.trailer.set("Root", Object::Reference(catalog_id));

        Self::from_inner(inner)
    }

    /// Open a PDF document from a file path
    ///
    /// # Arguments
    /// * `path` - Path to the PDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        debug!(path = %path.display(), pages = inner.get_pages().len(), "opened PDF");
        Ok(Self::from_inner(inner))
    }

    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_inner(inner))
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Whether the document trailer declares an encryption dictionary
    pub fn is_encrypted(&self) -> bool {
        self.inner.trailer.get(b"Encrypt").is_ok()
    }

    /// Add a TrueType font to the document
    ///
    /// # Arguments
    /// * `name` - Font identifier (used in set_font)
    /// * `ttf_data` - TrueType font file bytes
    pub fn add_font(&mut self, name: &str, ttf_data: &[u8]) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let font_data = FontData::from_ttf(name, ttf_data)?;
        self.fonts
            .insert(name.to_string(), LoadedFont::TrueType(font_data));

        Ok(())
    }

    /// Register one of the standard base fonts under a name
    ///
    /// Built-in fonts need no font file; they only cover WinAnsi characters.
    pub fn add_builtin_font(&mut self, name: &str, font: BuiltinFont) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        self.fonts.insert(name.to_string(), LoadedFont::Builtin(font));
        Ok(())
    }

    /// Check whether a font name is registered
    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// Set the current font and size
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `size` - Font size in points
    pub fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(PdfError::FontNotFound(name.to_string()));
        }

        self.current_font = Some(name.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set the text color
    ///
    /// # Example
    /// ```ignore
    /// doc.set_text_color(Color::red());
    /// doc.set_text_color(Color::from_rgb(255, 128, 0)); // Orange
    /// ```
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn current_font_name(&self) -> Result<String> {
        self.current_font
            .clone()
            .ok_or_else(|| PdfError::FontNotFound("No font set".to_string()))
    }

    fn get_font(&self, name: &str) -> Result<&LoadedFont> {
        self.fonts
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    fn validate_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from bottom)
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64) -> Result<()> {
        self.validate_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let font_name = self.current_font_name()?;
        let font_size = self.current_font_size;

        let operand = self
            .fonts
            .get_mut(&font_name)
            .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?
            .encode_operand(text);

        let font_resource_name = self.get_or_create_font_ref(&font_name, page)?;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size,
            color: self.current_text_color,
        };

        let operators = generate_text_operators(&operand, x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Paint an opaque filled rectangle
    pub fn fill_rect(&mut self, page: usize, rect: Rect, color: Color) -> Result<()> {
        self.validate_page(page)?;
        self.buffer_content(page, &fill_rect_operators(rect, color));
        Ok(())
    }

    /// Stroke the outline of a rectangle
    pub fn stroke_rect(
        &mut self,
        page: usize,
        rect: Rect,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        self.validate_page(page)?;
        self.buffer_content(page, &stroke_rect_operators(rect, color, line_width));
        Ok(())
    }

    /// Draw a straight line
    pub fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        self.validate_page(page)?;
        let operators = line_operators(from.0, from.1, to.0, to.1, color, line_width);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.prepare_for_save()?;

        let path = path.as_ref();
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        debug!(path = %path.display(), "saved PDF");
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.prepare_for_save()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        debug!(bytes = buffer.len(), pages = self.page_count(), "serialized PDF");

        Ok(buffer)
    }

    fn prepare_for_save(&mut self) -> Result<()> {
        // 1. Flush buffered content streams to pages
        self.flush_content_buffers()?;

        // 2. Embed fonts now that every used character is known
        self.embed_fonts()
    }

    /// Embed all used fonts into the PDF
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();

        let mut font_names: Vec<String> = self
            .page_font_resources
            .values()
            .flat_map(|fonts| fonts.keys().cloned())
            .collect();
        font_names.sort();
        font_names.dedup();

        for font_name in font_names {
            let font_id = self.embed_font_object(&font_name)?;
            debug!(font = %font_name, object = ?font_id, "embedded font");
        }

        self.finalize_page_font_resources()
    }

    /// Embed a single font object into the PDF
    fn embed_font_object(&mut self, font_name: &str) -> Result<ObjectId> {
        let font_id = match self.get_font(font_name)? {
            LoadedFont::Builtin(builtin) => {
                let dict = builtin.to_pdf_dictionary();
                self.inner.add_object(dict)
            }
            LoadedFont::TrueType(font_data) => {
                let font_objects = font_data.to_pdf_objects()?;

                let font_file_id = self.inner.add_object(font_objects.font_file_stream);

                let mut font_descriptor = font_objects.font_descriptor;
                font_descriptor.set("FontFile2", Object::Reference(font_file_id));
                let font_descriptor_id = self.inner.add_object(font_descriptor);

                let mut cid_font = font_objects.cid_font;
                cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
                if let Some(map) = font_objects.cid_to_gid_stream {
                    let map_id = self.inner.add_object(map);
                    cid_font.set("CIDToGIDMap", Object::Reference(map_id));
                }
                let cid_font_id = self.inner.add_object(cid_font);

                let mut type0_font = font_objects.type0_font;
                type0_font.set(
                    "DescendantFonts",
                    Object::Array(vec![Object::Reference(cid_font_id)]),
                );

                let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);
                type0_font.set("ToUnicode", Object::Reference(tounicode_id));

                self.inner.add_object(type0_font)
            }
        };

        self.embedded_fonts.insert(font_name.to_string(), font_id);

        Ok(font_id)
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "F1", "F2") for use in content streams
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> Result<String> {
        // The font object itself is only embedded at save time
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some(resource_name) = page_resources.get(font_name) {
            return Ok(resource_name.clone());
        }

        // Resource names must not collide with names the template already uses
        let resource_name = format!("FR{}", self.next_font_resource);
        self.next_font_resource += 1;

        page_resources.insert(font_name.to_string(), resource_name.clone());

        Ok(resource_name)
    }

    /// Add font references to page resources after all fonts are embedded
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let page_resources: Vec<(usize, Vec<(String, String)>)> = self
            .page_font_resources
            .iter()
            .map(|(&page, fonts)| {
                let font_list: Vec<_> = fonts
                    .iter()
                    .map(|(font_name, resource_name)| (font_name.clone(), resource_name.clone()))
                    .collect();
                (page, font_list)
            })
            .collect();

        for (page, fonts) in page_resources {
            if !fonts.is_empty() {
                self.add_fonts_to_page_resources(page, &fonts)?;
            }
        }

        Ok(())
    }

    /// Add multiple fonts to a page's Resources dictionary in a single operation
    fn add_fonts_to_page_resources(
        &mut self,
        page: usize,
        fonts: &[(String, String)],
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?
            .clone();

        // Resources may be indirect or inherited; copy them onto the page
        let mut resources_dict = self.inherited_resources(page_id)?;

        let mut font_dict = match resources_dict.get(b"Font") {
            Ok(font) => self.resolve_dict(font).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        for (font_name, resource_name) in fonts {
            let font_ref = self
                .embedded_fonts
                .get(font_name)
                .ok_or_else(|| PdfError::FontNotFound(font_name.to_string()))?;
            font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
        }

        resources_dict.set("Font", Object::Dictionary(font_dict));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Resources", Object::Dictionary(resources_dict));

        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Follow a reference (if any) and clone the dictionary it points to
    fn resolve_dict(&self, object: &Object) -> Option<Dictionary> {
        match object {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|obj| obj.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Find the Resources dictionary for a page, following the parent chain
    fn inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self.resolve_dict(resources).unwrap_or_default());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Get a mutable reference to the underlying lopdf document
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get page width and height in points
    ///
    /// Reads the MediaBox (or CropBox), following the parent chain when the
    /// box is inherited.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let coord = |index: usize| -> Result<f64> {
            let value = &media_box[index];
            value
                .as_f32()
                .map(|v| v as f64)
                .ok()
                .or_else(|| value.as_i64().ok().map(|v| v as f64))
                .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {index}")))
        };

        let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);
        Ok(((x2 - x1).abs(), (y2 - y1).abs()))
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        for _ in 0..10 {
            let obj = self.inner.get_object(current_id)?;
            let dict = obj
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let media_box_array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
                return Ok(media_box_array);
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }

            break;
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(A4_WIDTH as f32),
            Object::Real(A4_HEIGHT as f32),
        ])
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// References to a page's existing content streams, in paint order
    ///
    /// Streams stored inline in the page dictionary are moved into their own
    /// objects so they can sit in a `/Contents` array.
    fn existing_content_refs(&mut self, page_dict: &Dictionary) -> Vec<Object> {
        let items = match page_dict.get(b"Contents") {
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        };

        items
            .into_iter()
            .filter_map(|item| match item {
                Object::Reference(_) => Some(item),
                Object::Stream(stream) => Some(Object::Reference(self.inner.add_object(stream))),
                _ => None,
            })
            .collect()
    }

    /// Append content to a page's content stream
    ///
    /// Existing streams are kept byte for byte and bracketed by `q` and `Q`
    /// so any graphics state they leave behind does not affect the appended
    /// operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();

        let existing = self.existing_content_refs(&page_dict);

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let mut appended = Vec::with_capacity(content.len() + 3);
        if !existing.is_empty() {
            let open_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(open_id));
            contents.extend(existing);
            appended.extend_from_slice(b"\nQ\n");
        }
        appended.extend_from_slice(content);

        let stream_dict = Dictionary::from_iter(vec![("Filter", "FlateDecode".into())]);
        let stream_id = self
            .inner
            .add_object(Stream::new(stream_dict, deflate(&appended)?));
        contents.push(Object::Reference(stream_id));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Contents", Object::Array(contents));

        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Locate the root Pages node through the trailer and catalog
    fn pages_root_id(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Root is not a reference".to_string()))?;

        self.inner
            .get_object(catalog_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?
            .get(b"Pages")
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Pages is not a reference".to_string()))
    }

    /// Add a blank page with the given size to the end of the document
    ///
    /// # Returns
    /// New page number (1-indexed)
    ///
    /// # Example
    /// ```ignore
    /// let mut doc = PdfDocument::new();
    /// let page = doc.add_blank_page(A4_WIDTH, A4_HEIGHT)?;
    /// assert_eq!(page, 1);
    /// ```
    pub fn add_blank_page(&mut self, width: f64, height: f64) -> Result<usize> {
        let pages_id = self.pages_root_id()?;
        let page_count = self.page_count();

        let contents_id = self
            .inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), vec![])));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", "Page".into()),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width as f32),
                    Object::Real(height as f32),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(contents_id)),
        ]);
        let new_page_id = self.inner.add_object(Object::Dictionary(page_dict));

        let pages_dict = self
            .inner
            .get_object(pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;

        let mut kids_array = pages_dict
            .get(b"Kids")
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .as_array()
            .map_err(|_| PdfError::ParseError("Kids is not an array".to_string()))?
            .clone();
        kids_array.push(Object::Reference(new_page_id));

        let current_count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;

        let mut new_pages_dict = pages_dict.clone();
        new_pages_dict.set("Kids", Object::Array(kids_array));
        new_pages_dict.set("Count", Object::Integer(current_count + 1));

        self.inner.objects.insert(pages_id, new_pages_dict.into());

        Ok(page_count + 1)
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_no_pages() {
        let doc = PdfDocument::new();
        assert_eq!(doc.page_count(), 0);
        assert!(!doc.is_encrypted());
    }

    #[test]
    fn test_add_blank_page_size() {
        let mut doc = PdfDocument::new();
        let page = doc.add_blank_page(A4_WIDTH, A4_HEIGHT).unwrap();
        assert_eq!(page, 1);
        assert_eq!(doc.page_size(1).unwrap(), (595.0, 842.0));
    }

    #[test]
    fn test_invalid_page_rejected() {
        let mut doc = PdfDocument::new();
        let result = doc.fill_rect(1, Rect::new(0.0, 0.0, 10.0, 10.0), Color::white());
        assert!(matches!(result, Err(PdfError::InvalidPage(1, 0))));
    }

    #[test]
    fn test_insert_text_requires_font() {
        let mut doc = PdfDocument::new();
        doc.add_blank_page(A4_WIDTH, A4_HEIGHT).unwrap();
        let result = doc.insert_text("x", 1, 10.0, 10.0);
        assert!(matches!(result, Err(PdfError::FontNotFound(_))));
    }

    #[test]
    fn test_duplicate_font_name() {
        let mut doc = PdfDocument::new();
        doc.add_builtin_font("base", BuiltinFont::Helvetica).unwrap();
        let result = doc.add_builtin_font("base", BuiltinFont::HelveticaBold);
        assert!(matches!(result, Err(PdfError::FontAlreadyExists(_))));
    }

    #[test]
    fn test_font_ref_reused_per_page() {
        let mut doc = PdfDocument::new();
        doc.add_blank_page(A4_WIDTH, A4_HEIGHT).unwrap();
        doc.add_blank_page(A4_WIDTH, A4_HEIGHT).unwrap();
        doc.add_builtin_font("base", BuiltinFont::Helvetica).unwrap();

        let first = doc.get_or_create_font_ref("base", 1).unwrap();
        let again = doc.get_or_create_font_ref("base", 1).unwrap();
        let other_page = doc.get_or_create_font_ref("base", 2).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other_page);
    }

    #[test]
    fn test_overlay_keeps_existing_streams_undecoded() {
        let mut doc = PdfDocument::new();
        doc.add_blank_page(A4_WIDTH, A4_HEIGHT).unwrap();

        // A filter lopdf cannot decode must survive untouched
        let opaque = Stream::new(
            Dictionary::from_iter(vec![("Filter", "JBIG2Decode".into())]),
            b"\x00\x01opaque".to_vec(),
        );
        let opaque_id = doc.inner.add_object(opaque);
        let page_id = doc.page_id(1).unwrap();
        doc.inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Contents", Object::Reference(opaque_id));

        doc.fill_rect(1, Rect::new(0.0, 0.0, 10.0, 10.0), Color::white())
            .unwrap();
        let bytes = doc.to_bytes().unwrap();

        let saved = Document::load_mem(&bytes).unwrap();
        let page_id = saved.get_pages()[&1];
        let contents = saved
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(contents.len(), 3);

        let original = saved
            .get_object(contents[1].as_reference().unwrap())
            .and_then(Object::as_stream)
            .unwrap();
        assert_eq!(original.content, b"\x00\x01opaque");
        assert_eq!(
            original.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"JBIG2Decode"
        );
    }
}
