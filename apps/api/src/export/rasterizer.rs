//! Turns a rendered page into positioned drawing primitives.
//!
//! `PageRasterizer` is the seam: the default `MetricsRasterizer` lays text out with
//! the static Helvetica metrics at the fixed 794px page width. Output goes into a
//! caller-owned `StagingArea` so one set of buffers serves every page of an export.

use crate::export::ExportError;
use crate::preview::font_metrics::PageConfig;
use crate::preview::layout::{layout_page_into, PageLayout};
use crate::preview::RenderedPage;

/// Scratch buffers a page is rasterized into before it is written to the PDF.
#[derive(Debug, Default)]
pub struct StagingArea {
    layout: PageLayout,
}

impl StagingArea {
    pub fn clear(&mut self) {
        self.layout.clear();
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut PageLayout {
        &mut self.layout
    }
}

/// Page geometry reported alongside the staged content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRaster {
    pub number: u8,
    pub width_px: f32,
    pub height_px: f32,
    pub overflows: bool,
}

pub trait PageRasterizer: Send + Sync {
    /// Rasterizes `page` into `staging`. `staging` is empty on entry.
    fn rasterize(
        &self,
        page: &RenderedPage,
        staging: &mut StagingArea,
    ) -> Result<PageRaster, ExportError>;
}

/// Default rasterizer: vector text laid out with static font metrics.
pub struct MetricsRasterizer {
    config: PageConfig,
}

impl MetricsRasterizer {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }
}

impl PageRasterizer for MetricsRasterizer {
    fn rasterize(
        &self,
        page: &RenderedPage,
        staging: &mut StagingArea,
    ) -> Result<PageRaster, ExportError> {
        if self.config.content_width() <= 0.0 || self.config.height_px <= 0.0 {
            return Err(ExportError::Rasterize(format!(
                "page {} has no drawable area ({}x{} px, {} px padding)",
                page.number, self.config.width_px, self.config.height_px, self.config.padding_px
            )));
        }

        layout_page_into(page, &self.config, staging.layout_mut());
        Ok(PageRaster {
            number: page.number,
            width_px: self.config.width_px,
            height_px: self.config.height_px,
            overflows: staging.layout().overflows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::CvDocument;
    use crate::preview::default_page_config;
    use crate::preview::render::render_document;

    #[test]
    fn test_rasterize_fills_staging() {
        let rendered = render_document(&CvDocument::default());
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let mut staging = StagingArea::default();

        let raster = rasterizer.rasterize(&rendered.pages[0], &mut staging).unwrap();
        assert_eq!(raster.number, 1);
        assert_eq!(raster.width_px, 794.0);
        assert!(!staging.layout().runs.is_empty());
        assert!(!staging.layout().links.is_empty());
    }

    #[test]
    fn test_staging_reuse_does_not_leak_between_pages() {
        let rendered = render_document(&CvDocument::default());
        let rasterizer = MetricsRasterizer::new(default_page_config());
        let mut staging = StagingArea::default();

        rasterizer.rasterize(&rendered.pages[0], &mut staging).unwrap();
        let page1_runs = staging.layout().runs.len();
        staging.clear();
        rasterizer.rasterize(&rendered.pages[1], &mut staging).unwrap();

        let fresh = crate::preview::layout::layout_page(&rendered.pages[1], &default_page_config());
        assert_eq!(staging.layout().runs.len(), fresh.runs.len());
        assert_ne!(staging.layout().runs.len(), page1_runs);
    }

    #[test]
    fn test_zero_width_page_is_an_error() {
        let rendered = render_document(&CvDocument::default());
        let mut config = default_page_config();
        config.width_px = 10.0;
        let rasterizer = MetricsRasterizer::new(config);
        let result = rasterizer.rasterize(&rendered.pages[0], &mut StagingArea::default());
        assert!(matches!(result, Err(ExportError::Rasterize(_))));
    }
}
