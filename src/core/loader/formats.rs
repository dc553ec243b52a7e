//! Built-in text extractors, one per format family.
//!
//! Each extractor reads its file and nothing else. Office formats
//! (docx, odt, pptx, epub) are zip archives of XML parts; legacy
//! binary Office files are refused as unsupported.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use pulldown_cmark::{Event as MdEvent, Parser as MdParser, TagEnd};
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use zip::ZipArchive;

use crate::core::error::{IngestError, Result};
use crate::core::loader::registry::{Loader, LoaderOptions};
use crate::core::loader::source_string;
use crate::core::types::Document;

/// Compound File Binary header used by pre-2007 Office documents
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Plain text, decoded with the `encoding` option
pub struct TextLoader;

impl Loader for TextLoader {
    fn load(&self, path: &Path, options: &LoaderOptions) -> Result<Vec<Document>> {
        let bytes = fs::read(path).map_err(|e| IngestError::load(path, e.to_string()))?;
        let encoding = options.get("encoding").map(String::as_str).unwrap_or("utf8");
        let text = decode(path, bytes, encoding)?;

        Ok(vec![Document::new(text, source_string(path))])
    }
}

/// Markdown rendered down to its text content
pub struct MarkdownLoader;

impl Loader for MarkdownLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let raw = read_utf8(path)?;
        Ok(vec![Document::new(markdown_to_text(&raw), source_string(path))])
    }
}

/// One document per CSV row, as `header: value` lines
pub struct CsvLoader;

impl Loader for CsvLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| IngestError::load(path, e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| IngestError::load(path, e.to_string()))?
            .clone();

        let source = source_string(path);
        let mut documents = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| IngestError::load(path, e.to_string()))?;
            let text = headers
                .iter()
                .zip(record.iter())
                .map(|(key, value)| format!("{}: {}", key.trim(), value.trim()))
                .collect::<Vec<_>>()
                .join("\n");

            documents.push(Document::new(text, source.clone()).with_meta("row", row));
        }

        Ok(documents)
    }
}

/// Visible text of an HTML page
pub struct HtmlLoader;

impl Loader for HtmlLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let bytes = fs::read(path).map_err(|e| IngestError::load(path, e.to_string()))?;
        let html = String::from_utf8_lossy(&bytes);

        Ok(vec![Document::new(html_to_text(&html), source_string(path))])
    }
}

/// One document per PDF page
pub struct PdfLoader;

impl Loader for PdfLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let pdf = lopdf::Document::load(path).map_err(|e| IngestError::load(path, e.to_string()))?;

        let source = source_string(path);
        let mut documents = Vec::new();

        for (index, page_number) in pdf.get_pages().keys().enumerate() {
            let text = pdf
                .extract_text(&[*page_number])
                .map_err(|e| IngestError::load(path, format!("page {page_number}: {e}")))?;
            documents.push(Document::new(text, source.clone()).with_meta("page", index));
        }

        Ok(documents)
    }
}

/// Word documents (Office Open XML)
pub struct WordLoader;

impl Loader for WordLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        reject_legacy_binary(path, "Word")?;

        let mut archive = open_archive(path)?;
        let xml = read_entry(&mut archive, "word/document.xml", path)?;
        let text = xml_text(&xml, &[b"t"], &[b"p"]).map_err(|e| IngestError::load(path, e.to_string()))?;

        Ok(vec![Document::new(text, source_string(path))])
    }
}

/// OpenDocument text
pub struct OdtLoader;

impl Loader for OdtLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let mut archive = open_archive(path)?;
        let xml = read_entry(&mut archive, "content.xml", path)?;
        let text = xml_text(&xml, &[b"p", b"h"], &[b"p", b"h"])
            .map_err(|e| IngestError::load(path, e.to_string()))?;

        Ok(vec![Document::new(text, source_string(path))])
    }
}

/// PowerPoint presentations, slides in numeric order
pub struct PowerPointLoader;

impl Loader for PowerPointLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        reject_legacy_binary(path, "PowerPoint")?;

        let mut archive = open_archive(path)?;
        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let number = name
                    .strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        slides.sort();

        let mut parts = Vec::with_capacity(slides.len());
        for (_, name) in slides {
            let xml = read_entry(&mut archive, &name, path)?;
            let text = xml_text(&xml, &[b"t"], &[b"p"]).map_err(|e| IngestError::load(path, e.to_string()))?;
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }

        Ok(vec![Document::new(parts.join("\n\n"), source_string(path))])
    }
}

/// EPUB books, content documents in spine order
pub struct EpubLoader;

impl Loader for EpubLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let mut archive = open_archive(path)?;

        let mut items = spine_items(&mut archive, path)?.unwrap_or_default();
        if items.is_empty() {
            // No usable package document, fall back to archive order
            items = archive
                .file_names()
                .filter(|name| is_html_name(name))
                .map(str::to_string)
                .collect();
        }

        let mut parts = Vec::with_capacity(items.len());
        for name in items {
            let html = read_entry(&mut archive, &name, path)?;
            let text = html_to_text(&html);
            if !text.is_empty() {
                parts.push(text);
            }
        }

        Ok(vec![Document::new(parts.join("\n\n"), source_string(path))])
    }
}

/// Evernote exports, all notes in one document
pub struct EverNoteLoader;

impl Loader for EverNoteLoader {
    fn load(&self, path: &Path, _options: &LoaderOptions) -> Result<Vec<Document>> {
        let xml = read_utf8(path)?;
        let notes = enex_notes(&xml).map_err(|e| IngestError::load(path, e.to_string()))?;

        let text = notes
            .into_iter()
            .map(|(title, body)| match (title.is_empty(), body.is_empty()) {
                (true, _) => body,
                (false, true) => title,
                (false, false) => format!("{title}\n\n{body}"),
            })
            .filter(|note| !note.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(vec![Document::new(text, source_string(path))])
    }
}

fn decode(path: &Path, bytes: Vec<u8>, encoding: &str) -> Result<String> {
    let text = match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => String::from_utf8(bytes)
            .map_err(|e| IngestError::load(path, format!("invalid UTF-8: {e}")))?,
        "utf8-lossy" | "lossy" => String::from_utf8_lossy(&bytes).into_owned(),
        other => {
            return Err(IngestError::UnsupportedFormat(format!(
                "Encoding '{other}' is not supported for {}",
                path.display()
            )))
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| IngestError::load(path, e.to_string()))?;
    decode(path, bytes, "utf8")
}

fn reject_legacy_binary(path: &Path, family: &str) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::load(path, e.to_string()))?;
    let mut header = [0u8; 8];
    let read = file
        .read(&mut header)
        .map_err(|e| IngestError::load(path, e.to_string()))?;

    if read == header.len() && header == OLE_MAGIC {
        return Err(IngestError::UnsupportedFormat(format!(
            "{} is a legacy binary {family} file; convert it to Office Open XML",
            path.display()
        )));
    }
    Ok(())
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| IngestError::load(path, e.to_string()))?;
    ZipArchive::new(file).map_err(|e| IngestError::load(path, format!("not a valid archive: {e}")))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str, path: &Path) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| IngestError::load(path, format!("missing {name}: {e}")))?;

    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .map_err(|e| IngestError::load(path, format!("{name}: {e}")))?;
    Ok(contents)
}

fn is_html_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
}

fn has_tag(tags: &[&[u8]], name: &[u8]) -> bool {
    tags.iter().any(|tag| *tag == name)
}

/// Collect the text inside `text_tags`, breaking lines after `block_tags`
///
/// Tags match on local name, so namespace prefixes (`w:`, `a:`,
/// `text:`) are ignored.
fn xml_text(xml: &str, text_tags: &[&[u8]], block_tags: &[&[u8]]) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if has_tag(text_tags, e.local_name().as_ref()) {
                    depth += 1;
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if has_tag(text_tags, name.as_ref()) {
                    depth = depth.saturating_sub(1);
                }
                if has_tag(block_tags, name.as_ref()) && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"br" | b"line-break" => out.push('\n'),
                b"tab" => out.push('\t'),
                b"s" if depth > 0 => out.push(' '),
                _ => {}
            },
            Event::Text(t) if depth > 0 => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}

/// Content documents listed in the EPUB spine
///
/// Returns `None` when the archive has no container or package
/// document.
fn spine_items(archive: &mut ZipArchive<File>, path: &Path) -> Result<Option<Vec<String>>> {
    let container = match read_entry(archive, "META-INF/container.xml", path) {
        Ok(xml) => xml,
        Err(_) => return Ok(None),
    };

    let to_load = |e: quick_xml::Error| IngestError::load(path, e.to_string());

    let mut rootfile = None;
    let mut reader = Reader::from_str(&container);
    loop {
        match reader.read_event().map_err(to_load)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(attr) = e.try_get_attribute("full-path").map_err(|e| to_load(e.into()))? {
                    rootfile = Some(attr.unescape_value().map_err(to_load)?.into_owned());
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(rootfile) = rootfile else {
        return Ok(None);
    };
    let opf = match read_entry(archive, &rootfile, path) {
        Ok(xml) => xml,
        Err(_) => return Ok(None),
    };
    let base = match rootfile.rfind('/') {
        Some(idx) => &rootfile[..=idx],
        None => "",
    };

    let mut manifest = std::collections::HashMap::new();
    let mut spine = Vec::new();
    let mut reader = Reader::from_str(&opf);
    loop {
        match reader.read_event().map_err(to_load)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"item" => {
                    let id = e.try_get_attribute("id").map_err(|e| to_load(e.into()))?;
                    let href = e.try_get_attribute("href").map_err(|e| to_load(e.into()))?;
                    if let (Some(id), Some(href)) = (id, href) {
                        manifest.insert(
                            id.unescape_value().map_err(to_load)?.into_owned(),
                            href.unescape_value().map_err(to_load)?.into_owned(),
                        );
                    }
                }
                b"itemref" => {
                    if let Some(idref) = e.try_get_attribute("idref").map_err(|e| to_load(e.into()))? {
                        spine.push(idref.unescape_value().map_err(to_load)?.into_owned());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let items = spine
        .iter()
        .filter_map(|idref| manifest.get(idref))
        .map(|href| format!("{base}{href}"))
        .collect();
    Ok(Some(items))
}

/// Notes of an `.enex` export as `(title, body text)` pairs
fn enex_notes(xml: &str) -> std::result::Result<Vec<(String, String)>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut notes = Vec::new();
    let mut title = String::new();
    let mut content = String::new();
    let mut field: Option<&'static str> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"note" => {
                    title.clear();
                    content.clear();
                }
                b"title" => field = Some("title"),
                b"content" => field = Some("content"),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"note" => notes.push((title.trim().to_string(), html_to_text(&content))),
                b"title" | b"content" => field = None,
                _ => {}
            },
            Event::Text(t) => match field {
                Some("title") => title.push_str(&t.unescape()?),
                Some("content") => content.push_str(&t.unescape()?),
                _ => {}
            },
            Event::CData(c) if field == Some("content") => {
                content.push_str(&String::from_utf8_lossy(&c));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(notes)
}

/// Render Markdown to plain text, one block per paragraph
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();

    for event in MdParser::new(markdown) {
        match event {
            MdEvent::Text(text) | MdEvent::Code(text) => out.push_str(&text),
            MdEvent::SoftBreak | MdEvent::HardBreak => out.push('\n'),
            MdEvent::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                out.push_str("\n\n")
            }
            MdEvent::End(TagEnd::Item) => out.push('\n'),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

/// Visible text of an HTML document, one line per text node
///
/// Script and style contents are dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = body.unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| matches!(element.name(), "script" | "style" | "noscript"))
            .unwrap_or(false);

        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}
