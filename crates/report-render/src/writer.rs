//! Multi-page PDF output.
//!
//! Every page is rendered to SVG, converted into a PDF form object and placed
//! on its own 18 × 27 cm sheet. The document is assembled in memory and
//! written to a temporary file next to the destination, which
//! [`DocumentWriter::finish`] moves into place. A writer that is dropped
//! early, or a render error part-way through, leaves no output.

use std::io::Write;
use std::path::{Path, PathBuf};

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, TextStr};
use report_core::error::{ReportError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use usvg::{fontdb, PostProcessingSteps, TreeParsing, TreePostProc};

use crate::document::{Page, ReportDocument};
use crate::pages::{render_page, PAGE_HEIGHT_PX, PAGE_WIDTH_PX};

/// Sheet size in PDF points (18 × 27 cm).
const PAGE_WIDTH_PT: f32 = PAGE_WIDTH_PX as f32 * 0.75;
const PAGE_HEIGHT_PT: f32 = PAGE_HEIGHT_PX as f32 * 0.75;

const PAGE_GRAPHIC: Name<'static> = Name(b"Page");

/// Families tried, in order, for the generic `sans-serif` family.
const SANS_SERIF_CANDIDATES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
];

/// Incremental writer of one report document.
pub struct DocumentWriter {
    path: PathBuf,
    tmp: NamedTempFile,
    title: String,
    pdf: Pdf,
    fonts: fontdb::Database,
    catalog_id: Ref,
    page_tree_id: Ref,
    info_id: Ref,
    next_id: Ref,
    page_ids: Vec<Ref>,
}

impl DocumentWriter {
    /// Open a temporary file beside `path` and start an empty document.
    pub fn create(path: &Path, title: &str) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|e| output_error(path, e))?;

        let mut next_id = Ref::new(1);
        Ok(Self {
            path: path.to_path_buf(),
            tmp,
            title: title.to_string(),
            pdf: Pdf::new(),
            fonts: load_fonts(),
            catalog_id: next_id.bump(),
            page_tree_id: next_id.bump(),
            info_id: next_id.bump(),
            next_id,
            page_ids: Vec::new(),
        })
    }

    /// Render `page` and append it as the next sheet.
    pub fn add_page(&mut self, page: &Page) -> Result<()> {
        let svg = render_page(page)?;
        let mut tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
            .map_err(|e| ReportError::Render(format!("page {}: {e}", self.page_ids.len() + 1)))?;
        tree.postprocess(PostProcessingSteps::default(), &self.fonts);

        let page_id = self.next_id.bump();
        let content_id = self.next_id.bump();
        let graphic_id = self.next_id.bump();
        self.next_id = svg2pdf::convert_tree_into(
            &tree,
            svg2pdf::Options::default(),
            &mut self.pdf,
            graphic_id,
        );

        let mut sheet = self.pdf.page(page_id);
        sheet
            .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH_PT, PAGE_HEIGHT_PT))
            .parent(self.page_tree_id)
            .contents(content_id);
        sheet.resources().x_objects().pair(PAGE_GRAPHIC, graphic_id);
        sheet.finish();

        let mut content = Content::new();
        content
            .transform([PAGE_WIDTH_PT, 0.0, 0.0, PAGE_HEIGHT_PT, 0.0, 0.0])
            .x_object(PAGE_GRAPHIC);
        self.pdf.stream(content_id, &content.finish());

        self.page_ids.push(page_id);
        debug!("Rendered page {}", self.page_ids.len());
        Ok(())
    }

    pub fn pages_written(&self) -> usize {
        self.page_ids.len()
    }

    /// Close the document and move it to its destination.
    pub fn finish(self) -> Result<PathBuf> {
        let Self {
            path,
            mut tmp,
            title,
            mut pdf,
            catalog_id,
            page_tree_id,
            info_id,
            page_ids,
            ..
        } = self;

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.document_info(info_id).title(TextStr(&title));
        let bytes = pdf.finish();

        tmp.write_all(&bytes).map_err(|e| output_error(&path, e))?;
        tmp.as_file().sync_all().map_err(|e| output_error(&path, e))?;
        tmp.persist(&path).map_err(|e| output_error(&path, e.error))?;

        info!("Wrote {} pages to {}", page_ids.len(), path.display());
        Ok(path)
    }
}

/// System fonts with `sans-serif` pointed at the first installed candidate.
fn load_fonts() -> fontdb::Database {
    let mut fonts = fontdb::Database::new();
    fonts.load_system_fonts();

    let installed = |family: &str| {
        fonts
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name == family))
    };
    let sans = SANS_SERIF_CANDIDATES.into_iter().find(|family| installed(*family));
    match sans {
        Some(family) => fonts.set_sans_serif_family(family),
        None if fonts.is_empty() => warn!("No system fonts found; page text will be missing"),
        None => {}
    }
    debug!("Loaded {} font faces", fonts.len());
    fonts
}

fn output_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Render every page of `doc` into `path`, returning the number of pages.
pub fn write_document(doc: &ReportDocument, path: &Path, title: &str) -> Result<usize> {
    let mut writer = DocumentWriter::create(path, title)?;
    for page in doc.pages() {
        writer.add_page(page)?;
    }
    let pages = writer.pages_written();
    writer.finish()?;
    Ok(pages)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
