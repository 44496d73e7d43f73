//! PDF page source using lopdf.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{PageLayout, TocEntry};

use super::layout::{decode_text_simple, extract_spans, group_blocks, PageFrame};
use super::source::PageSource;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// A PDF document opened for extraction.
pub struct PdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    name: String,
    version: String,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::load(&data, path.display().to_string())
    }

    /// Open a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::load(data, "<memory>".to_string())
    }

    /// Open a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load(&data, "<reader>".to_string())
    }

    /// Replace the label used in errors and metadata.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn load(data: &[u8], name: String) -> Result<Self> {
        let version = check_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        let pages = doc.get_pages();
        log::debug!("Opened {} (PDF {}, {} pages)", name, version, pages.len());

        Ok(Self {
            doc,
            pages,
            name,
            version,
        })
    }

    fn page_id(&self, number: u32) -> Result<ObjectId> {
        self.pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))
    }

    /// Page rectangle, inheriting the MediaBox from parent nodes.
    fn page_frame(&self, page_id: ObjectId) -> PageFrame {
        let mut current = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;

        while let Some(dict) = current {
            if let Some(frame) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| self.resolve(o).as_array().ok())
                .and_then(|a| media_box(a))
            {
                return frame;
            }

            depth += 1;
            if depth > 32 {
                break;
            }
            current = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|r| self.doc.get_dictionary(r))
                .ok();
        }

        PageFrame::letter()
    }

    /// Concatenated, decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        let streams: Vec<&Object> = match self.resolve(contents) {
            Object::Array(arr) => arr.iter().map(|o| self.resolve(o)).collect(),
            other => vec![other],
        };

        let mut content = Vec::new();
        for obj in streams {
            match obj {
                Object::Stream(s) => {
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
                _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        }
        Ok(content)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).unwrap_or(obj),
            _ => obj,
        }
    }

    fn info(&self) -> Option<&Dictionary> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        self.resolve(info).as_dict().ok()
    }

    fn walk_outline(
        &self,
        first: ObjectId,
        level: u8,
        visited: &mut HashSet<ObjectId>,
        entries: &mut Vec<TocEntry>,
    ) {
        let mut next = Some(first);

        while let Some(item_ref) = next.take() {
            if !visited.insert(item_ref) {
                log::warn!("Outline cycle at object {:?}", item_ref);
                return;
            }
            let item = match self.doc.get_dictionary(item_ref) {
                Ok(dict) => dict,
                Err(_) => return,
            };

            let title = string_from_dict(item, b"Title").unwrap_or_default();
            entries.push(TocEntry::new(
                level,
                title.trim().to_string(),
                self.outline_destination(item),
            ));

            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                self.walk_outline(child, level.saturating_add(1), visited, entries);
            }

            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Destination page of an outline item (`Dest` or a GoTo action).
    fn outline_destination(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve_destination(dest);
        }

        let action = self.resolve(item.get(b"A").ok()?).as_dict().ok()?;
        self.resolve_destination(action.get(b"D").ok()?)
    }

    fn resolve_destination(&self, dest: &Object) -> Option<u32> {
        match self.resolve(dest) {
            Object::Array(dest) => self.destination_page(dest),
            Object::String(name, _) => self.named_destination(name),
            Object::Name(name) => self.named_destination(name),
            _ => None,
        }
    }

    /// Page of an explicit destination array `[page /Fit ...]`.
    fn destination_page(&self, dest: &[Object]) -> Option<u32> {
        match dest.first()? {
            Object::Reference(page_ref) => self
                .pages
                .iter()
                .find(|(_, id)| *id == page_ref)
                .map(|(num, _)| *num),
            // Remote-style destinations carry a 0-based page index
            Object::Integer(i) => u32::try_from(*i).ok()?.checked_add(1),
            _ => None,
        }
    }

    /// Look up a named destination in the `/Names` tree, then the catalog `/Dests`.
    fn named_destination(&self, name: &[u8]) -> Option<u32> {
        let catalog = self.doc.catalog().ok()?;

        let from_tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|names| self.resolve(names).as_dict().ok())
            .and_then(|names| names.get(b"Dests").ok())
            .and_then(|tree| self.resolve(tree).as_dict().ok())
            .and_then(|tree| self.lookup_name_tree(tree, name, &mut HashSet::new()));
        if from_tree.is_some() {
            return from_tree;
        }

        let dests = self.resolve(catalog.get(b"Dests").ok()?).as_dict().ok()?;
        let target = dests.get(name).ok()?;
        self.named_target(target)
    }

    /// Search a name tree node: `Names` pairs at leaves, `Kids` below.
    fn lookup_name_tree(
        &self,
        node: &Dictionary,
        name: &[u8],
        visited: &mut HashSet<ObjectId>,
    ) -> Option<u32> {
        if let Some(pairs) = node
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve(n).as_array().ok())
        {
            for pair in pairs.chunks_exact(2) {
                let key = match self.resolve(&pair[0]) {
                    Object::String(key, _) => key,
                    _ => continue,
                };
                if key.as_slice() == name {
                    return self.named_target(&pair[1]);
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|k| self.resolve(k).as_array().ok())?;
        kids.iter().find_map(|kid| {
            if let Object::Reference(id) = kid {
                if !visited.insert(*id) {
                    log::warn!("Name tree cycle at object {:?}", id);
                    return None;
                }
            }
            let kid = self.resolve(kid).as_dict().ok()?;
            self.lookup_name_tree(kid, name, visited)
        })
    }

    /// Value of a named destination: an array, or a dictionary with `/D`.
    fn named_target(&self, target: &Object) -> Option<u32> {
        match self.resolve(target) {
            Object::Array(dest) => self.destination_page(dest),
            Object::Dictionary(dict) => {
                self.destination_page(self.resolve(dict.get(b"D").ok()?).as_array().ok()?)
            }
            _ => None,
        }
    }
}

impl PageSource for PdfSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<PageLayout> {
        let page_id = self.page_id(number)?;
        let frame = self.page_frame(page_id);

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self.page_content(page_id)?;
        let spans = extract_spans(&self.doc, &content, &fonts)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", number, e)))?;

        let mut page = PageLayout::new(number, frame.width, frame.height);
        for block in group_blocks(spans, &frame) {
            page.add_block(block);
        }
        Ok(page)
    }

    fn outline(&self) -> Result<Vec<TocEntry>> {
        let mut entries = Vec::new();

        let catalog = self.doc.catalog()?;
        let outlines = match catalog.get(b"Outlines") {
            Ok(obj) => self.resolve(obj),
            Err(_) => return Ok(entries),
        };
        let first = outlines
            .as_dict()
            .ok()
            .and_then(|d| d.get(b"First").and_then(Object::as_reference).ok());

        if let Some(first) = first {
            let mut visited = HashSet::new();
            self.walk_outline(first, 1, &mut visited, &mut entries);
        }
        Ok(entries)
    }

    fn title(&self) -> Option<String> {
        self.info()
            .and_then(|d| string_from_dict(d, b"Title"))
            .filter(|t| !t.trim().is_empty())
    }

    fn author(&self) -> Option<String> {
        self.info()
            .and_then(|d| string_from_dict(d, b"Author"))
            .filter(|a| !a.trim().is_empty())
    }

    fn version(&self) -> Option<String> {
        Some(self.version.clone())
    }
}

/// Validate the `%PDF-x.y` header and return the version.
pub fn check_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    match version.as_bytes() {
        [b'1', b'.', b'0'..=b'7'] | [b'2', b'.', b'0'] => Ok(version),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

fn media_box(values: &[Object]) -> Option<PageFrame> {
    if values.len() < 4 {
        return None;
    }
    let n: Vec<f32> = values
        .iter()
        .take(4)
        .map(|o| o.as_float().ok())
        .collect::<Option<_>>()?;
    Some(PageFrame::from_media_box(n[0], n[1], n[2], n[3]))
}

fn string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}
