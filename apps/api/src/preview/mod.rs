//! Preview — projects the document into two A4 pages for display, print and export.

pub mod demo;
pub mod font_metrics;
pub mod handlers;
pub mod html;
pub mod layout;
pub mod render;
pub mod scale;

use serde::{Deserialize, Serialize};

use crate::document::models::CvDocument;
use crate::preview::font_metrics::PageConfig;

pub use font_metrics::default_page_config;
pub use render::{RenderedDocument, RenderedPage};

/// Which page(s) a print or export covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelection {
    #[default]
    All,
    Page1,
    Page2,
}

impl PageSelection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "page1" => Some(Self::Page1),
            "page2" => Some(Self::Page2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Page1 => "page1",
            Self::Page2 => "page2",
        }
    }

    /// Zero-based page indices, in output order.
    pub fn page_indices(&self) -> &'static [usize] {
        match self {
            Self::All => &[0, 1],
            Self::Page1 => &[0],
            Self::Page2 => &[1],
        }
    }
}

/// Renders the document and flags pages whose content overflows.
pub fn build_preview(doc: &CvDocument, config: &PageConfig) -> RenderedDocument {
    let mut rendered = render::render_document(doc);
    layout::mark_overflow(&mut rendered, config);
    rendered
}
