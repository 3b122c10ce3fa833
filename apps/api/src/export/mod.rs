//! Export — renders the selected preview page(s) into a downloadable A4 PDF.
//!
//! Pages are rasterized one at a time into a single reused `StagingArea` and then
//! appended to the PDF in selection order. Export runs on the blocking pool; the
//! busy flag in `AppState` keeps it to one export at a time.

pub mod fonts;
pub mod handlers;
pub mod pdf;
pub mod rasterizer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::export::pdf::PdfBuilder;
use crate::export::rasterizer::{PageRasterizer, StagingArea};
use crate::preview::{PageSelection, RenderedDocument};

pub const DEFAULT_FILE_NAME: &str = "CV.pdf";

/// Which pages an export covers.
pub type ExportMode = PageSelection;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No pages selected for export")]
    NoPages,

    #[error("An export is already in progress")]
    Busy,

    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Embedded font could not be loaded: {0}")]
    Font(String),

    #[error("PDF serialization failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds the export busy flag for its lifetime and clears it on drop,
/// including on error and panic paths.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl ExportGuard {
    pub fn acquire(flag: Arc<AtomicBool>) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Builds a PDF from the selected pages. CPU-bound; call from `spawn_blocking`.
pub fn export_pdf(
    rendered: &RenderedDocument,
    mode: ExportMode,
    rasterizer: &dyn PageRasterizer,
) -> Result<Vec<u8>, ExportError> {
    let mut staging = StagingArea::default();
    let mut builder = PdfBuilder::new();

    for index in mode.page_indices() {
        let Some(page) = rendered.pages.get(*index) else {
            warn!("Export requested page {} but it was not rendered", index + 1);
            continue;
        };

        staging.clear();
        let raster = rasterizer.rasterize(page, &mut staging)?;
        if raster.overflows {
            warn!("Page {} content overflows; the exported page will be clipped", raster.number);
        }
        builder.add_page(&raster, &staging)?;
        debug!(
            "Exported page {} ({} runs, {} links)",
            raster.number,
            staging.layout().runs.len(),
            staging.layout().links.len()
        );
    }

    if builder.page_count() == 0 {
        return Err(ExportError::NoPages);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lopdf::content::Content;
    use lopdf::{Dictionary, Document, Object};

    use super::*;
    use crate::document::models::CvDocument;
    use crate::export::rasterizer::{MetricsRasterizer, PageRaster};
    use crate::preview::{build_preview, default_page_config, RenderedPage};

    struct FailingRasterizer;

    impl PageRasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _page: &RenderedPage,
            _staging: &mut StagingArea,
        ) -> Result<PageRaster, ExportError> {
            Err(ExportError::Rasterize("boom".to_string()))
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    fn rendered() -> RenderedDocument {
        build_preview(&CvDocument::default(), &default_page_config())
    }

    /// glyph id -> text, read from a Type0 font's ToUnicode stream.
    fn to_unicode(doc: &Document, font: &Dictionary) -> Option<HashMap<u16, String>> {
        let id = font.get(b"ToUnicode").and_then(Object::as_reference).ok()?;
        let stream = doc.get_object(id).and_then(Object::as_stream).ok()?;
        let raw = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let hex = |s: &str| {
            s.strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .map(str::to_string)
        };

        let mut map = HashMap::new();
        for line in String::from_utf8(raw).ok()?.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [code, text] = parts.as_slice() else { continue };
            let (Some(code), Some(text)) = (hex(*code), hex(*text)) else { continue };
            let units: Vec<u16> = text
                .as_bytes()
                .chunks(4)
                .map(|c| u16::from_str_radix(std::str::from_utf8(c).unwrap(), 16).unwrap())
                .collect();
            map.insert(
                u16::from_str_radix(&code, 16).unwrap(),
                String::from_utf16(&units).unwrap(),
            );
        }
        Some(map)
    }

    /// Text drawn on a page, one run per space-separated chunk.
    fn page_text(bytes: &[u8], number: u32) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.get_pages()[&number];
        let fonts = doc.get_page_fonts(page_id);
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();

        let mut font: Option<Vec<u8>> = None;
        let mut text = String::new();
        for op in content.operations {
            match op.operator.as_str() {
                "Tf" => font = op.operands[0].as_name().ok().map(<[u8]>::to_vec),
                "Tj" => {
                    let raw = op.operands[0].as_str().unwrap();
                    let dict = fonts[font.as_ref().unwrap()];
                    match to_unicode(&doc, dict) {
                        Some(map) => {
                            for pair in raw.chunks(2) {
                                let gid = u16::from_be_bytes([pair[0], pair[1]]);
                                text.push_str(map.get(&gid).map_or("\u{FFFD}", String::as_str));
                            }
                        }
                        None => text.extend(raw.iter().map(|b| char::from(*b))),
                    }
                    text.push(' ');
                }
                _ => {}
            }
        }
        text
    }

    #[test]
    fn test_export_all_has_two_pages() {
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let bytes = export_pdf(&rendered(), ExportMode::All, &rasterizer).unwrap();
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn test_export_all_keeps_page_order() {
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let bytes = export_pdf(&rendered(), ExportMode::All, &rasterizer).unwrap();

        let first = page_text(&bytes, 1);
        let second = page_text(&bytes, 2);
        assert!(first.contains("Jordan Avery"));
        assert!(first.contains("Professional Summary"));
        assert!(!first.contains("Extracurricular Activities"));
        assert!(second.contains("Extracurricular Activities"));
        assert!(second.contains("Languages"));
        assert!(!second.contains("Jordan Avery"));
    }

    #[test]
    fn test_export_page2_only_has_page2_content() {
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let bytes = export_pdf(&rendered(), ExportMode::Page2, &rasterizer).unwrap();
        let text = page_text(&bytes, 1);
        assert!(text.contains("Extracurricular Activities"));
        assert!(!text.contains("Jordan Avery"));
    }

    #[test]
    fn test_name_outside_win_ansi_survives_export() {
        let mut doc = CvDocument::default();
        doc.personal.name = "Łukasz Żółć (Dev)".to_string();
        let rendered = build_preview(&doc, &default_page_config());
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let bytes = export_pdf(&rendered, ExportMode::Page1, &rasterizer).unwrap();

        let text = page_text(&bytes, 1);
        assert!(text.contains("Łukasz Żółć (Dev)"), "got {text:?}");
        assert!(!text.contains('?'));
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_export_single_page() {
        let rasterizer = MetricsRasterizer::new(default_page_config());
        for mode in [ExportMode::Page1, ExportMode::Page2] {
            let bytes = export_pdf(&rendered(), mode, &rasterizer).unwrap();
            assert_eq!(page_count(&bytes), 1);
        }
    }

    #[test]
    fn test_missing_pages_is_no_pages_error() {
        let mut doc = rendered();
        doc.pages.clear();
        let rasterizer = MetricsRasterizer::new(default_page_config());
        assert!(matches!(
            export_pdf(&doc, ExportMode::All, &rasterizer),
            Err(ExportError::NoPages)
        ));
    }

    #[test]
    fn test_rasterize_failure_propagates() {
        let result = export_pdf(&rendered(), ExportMode::All, &FailingRasterizer);
        assert!(matches!(result, Err(ExportError::Rasterize(_))));
    }

    #[test]
    fn test_guard_rejects_second_export_and_releases_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = ExportGuard::acquire(Arc::clone(&flag)).unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert!(matches!(
            ExportGuard::acquire(Arc::clone(&flag)),
            Err(ExportError::Busy)
        ));
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_busy_flag_restored_after_failed_export() {
        let flag = Arc::new(AtomicBool::new(false));
        let result = (|| -> Result<Vec<u8>, ExportError> {
            let _guard = ExportGuard::acquire(Arc::clone(&flag))?;
            export_pdf(&rendered(), ExportMode::All, &FailingRasterizer)
        })();
        assert!(result.is_err());
        assert!(!flag.load(Ordering::Acquire));
    }
}
