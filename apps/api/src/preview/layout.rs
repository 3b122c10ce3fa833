//! Page layout — positions a `RenderedPage` on the fixed A4 canvas.
//!
//! Greedy word wrap over styled spans, the same approach line-fill checks use:
//! words are measured with the static Helvetica tables and pushed onto the current
//! line until the next one no longer fits. Consecutive words sharing a face and link
//! target on one line collapse into a single `TextRun`.
//!
//! All coordinates are CSS pixels with the origin at the top-left of the page.
//! The export path scales them to PDF points.

use serde::Serialize;

use crate::preview::font_metrics::{get_metrics, FontFace, PageConfig};
use crate::preview::render::{Block, RenderedDocument, RenderedPage, Span};

/// Helvetica ascender as a fraction of the font size.
const ASCENT: f32 = 0.718;
const BULLET_GLYPH: &str = "•";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    /// Baseline position.
    pub y: f32,
    pub width: f32,
    pub size_px: f32,
    pub face: FontFace,
    pub text: String,
    /// Light grey instead of black (placeholder, references note).
    pub muted: bool,
}

/// A clickable rectangle carried over to the exported PDF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub url: String,
}

/// Horizontal rule drawn under section headings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageLayout {
    pub runs: Vec<TextRun>,
    pub links: Vec<LinkRegion>,
    pub rules: Vec<Rule>,
    /// Lowest y reached by content.
    pub content_bottom: f32,
    pub overflows: bool,
}

impl PageLayout {
    /// Empties the buffers but keeps their capacity for the next page.
    pub fn clear(&mut self) {
        self.runs.clear();
        self.links.clear();
        self.rules.clear();
        self.content_bottom = 0.0;
        self.overflows = false;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

pub fn layout_page(page: &RenderedPage, config: &PageConfig) -> PageLayout {
    let mut out = PageLayout::default();
    layout_page_into(page, config, &mut out);
    out
}

/// Lays `page` out into `out`, which is cleared first.
pub fn layout_page_into(page: &RenderedPage, config: &PageConfig, out: &mut PageLayout) {
    out.clear();
    let mut cursor = Cursor {
        config,
        out: &mut *out,
        y: config.padding_px,
    };

    if let Some(header) = &page.header {
        cursor.paragraph(
            &[Span::plain(&header.name, FontFace::Bold)],
            config.name_size_px,
            0.0,
            true,
            false,
        );
        if !header.title.is_empty() {
            cursor.paragraph(
                &[Span::plain(&header.title, FontFace::Regular)],
                config.title_size_px,
                0.0,
                true,
                false,
            );
        }
        if !header.contact.is_empty() {
            cursor.paragraph(
                &[Span::plain(&header.contact, FontFace::Regular)],
                config.body_size_px,
                0.0,
                true,
                false,
            );
        }
        if !header.links.is_empty() {
            let mut spans = Vec::with_capacity(header.links.len() * 2);
            for (i, link) in header.links.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::plain(" • ", FontFace::Regular));
                }
                spans.push(Span::linked(&link.label, FontFace::Regular, &link.url));
            }
            cursor.paragraph(&spans, config.body_size_px, 0.0, true, false);
        }
    }

    for (index, section) in page.sections.iter().enumerate() {
        if index > 0 || page.header.is_some() {
            cursor.y += config.section_gap_px;
        }
        let centered = section.controls.is_none();
        cursor.heading(&section.title, centered);

        for block in &section.blocks {
            match block {
                Block::Paragraph { spans, centered } => {
                    let muted = section.controls.is_none();
                    cursor.paragraph(spans, config.body_size_px, 0.0, *centered, muted);
                }
                Block::Bullet { spans } => cursor.bullet(spans),
            }
        }
    }

    let bottom = cursor.y;
    if let Some(text) = page.placeholder {
        let size = config.body_size_px;
        let metrics = get_metrics(&FontFace::Italic);
        let width = metrics.measure_px(text, size);
        out.runs.push(TextRun {
            x: (config.width_px - width) / 2.0,
            y: config.height_px / 2.0,
            width,
            size_px: size,
            face: FontFace::Italic,
            text: text.to_string(),
            muted: true,
        });
    }

    out.content_bottom = bottom;
    out.overflows = bottom > config.content_bottom();
}

/// Lays out every page and records whether its content runs past the bottom margin.
pub fn mark_overflow(doc: &mut RenderedDocument, config: &PageConfig) {
    let mut scratch = PageLayout::default();
    for page in &mut doc.pages {
        layout_page_into(page, config, &mut scratch);
        page.overflows = scratch.overflows;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    config: &'a PageConfig,
    out: &'a mut PageLayout,
    y: f32,
}

impl Cursor<'_> {
    fn heading(&mut self, title: &str, centered: bool) {
        let size = self.config.heading_size_px;
        self.paragraph(
            &[Span::plain(title, FontFace::Bold)],
            size,
            0.0,
            centered,
            false,
        );
        self.out.rules.push(Rule {
            x: self.config.padding_px,
            y: self.y - self.config.block_gap_px / 2.0,
            width: self.config.content_width(),
        });
        self.y += self.config.block_gap_px / 2.0;
    }

    fn bullet(&mut self, spans: &[Span]) {
        let size = self.config.body_size_px;
        let indent = self.config.bullet_indent_px;
        let line_height = size * self.config.line_height;
        let x = self.config.padding_px + indent / 3.0;
        self.out.runs.push(TextRun {
            x,
            y: self.y + baseline_offset(size, line_height),
            width: get_metrics(&FontFace::Regular).measure_px(BULLET_GLYPH, size),
            size_px: size,
            face: FontFace::Regular,
            text: BULLET_GLYPH.to_string(),
            muted: false,
        });
        self.paragraph(spans, size, indent, false, false);
    }

    /// Wraps `spans` into lines starting `indent` px right of the left margin.
    fn paragraph(&mut self, spans: &[Span], size: f32, indent: f32, centered: bool, muted: bool) {
        let left = self.config.padding_px + indent;
        let max_width = self.config.content_width() - indent;
        let line_height = size * self.config.line_height;

        for line in break_lines(&split_words(spans), size, max_width) {
            let offset = if centered {
                ((max_width - line.width) / 2.0).max(0.0)
            } else {
                0.0
            };
            let baseline = self.y + baseline_offset(size, line_height);

            for run in line.runs {
                if let Some(url) = run.href {
                    self.out.links.push(LinkRegion {
                        x: left + offset + run.x,
                        y: self.y,
                        width: run.width,
                        height: line_height,
                        url: url.to_string(),
                    });
                }
                self.out.runs.push(TextRun {
                    x: left + offset + run.x,
                    y: baseline,
                    width: run.width,
                    size_px: size,
                    face: run.face,
                    text: run.text,
                    muted,
                });
            }
            self.y += line_height;
        }
        self.y += self.config.block_gap_px;
    }
}

fn baseline_offset(size: f32, line_height: f32) -> f32 {
    (line_height - size) / 2.0 + size * ASCENT
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrap
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Word<'a> {
    text: &'a str,
    face: FontFace,
    href: Option<&'a str>,
    /// Whitespace separated this word from the previous one.
    space_before: bool,
}

/// Splits styled spans into words, remembering whether whitespace preceded each one.
/// Whitespace at a span boundary counts, so `"Skills: "` followed by `"Go"` keeps its gap.
fn split_words(spans: &[Span]) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut pending_space = false;
    for span in spans {
        let mut rest = span.text.as_str();
        loop {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                pending_space = true;
            }
            if trimmed.is_empty() {
                break;
            }
            let end = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            words.push(Word {
                text: &trimmed[..end],
                face: span.face,
                href: span.href.as_deref(),
                space_before: pending_space && !words.is_empty(),
            });
            pending_space = false;
            rest = &trimmed[end..];
        }
    }
    words
}

#[derive(Debug)]
struct LineRun<'a> {
    x: f32,
    width: f32,
    face: FontFace,
    href: Option<&'a str>,
    text: String,
}

#[derive(Debug, Default)]
struct Line<'a> {
    runs: Vec<LineRun<'a>>,
    width: f32,
}

impl<'a> Line<'a> {
    fn push(&mut self, word: &Word<'a>, gap: f32, word_width: f32) {
        let x = self.width + gap;
        match self.runs.last_mut() {
            Some(run) if run.face == word.face && run.href == word.href => {
                if gap > 0.0 {
                    run.text.push(' ');
                }
                run.text.push_str(word.text);
                run.width = x + word_width - run.x;
            }
            _ => self.runs.push(LineRun {
                x,
                width: word_width,
                face: word.face,
                href: word.href,
                text: word.text.to_string(),
            }),
        }
        self.width = x + word_width;
    }
}

/// Greedy line breaking. A word wider than the line sits alone on its own line.
fn break_lines<'a>(words: &[Word<'a>], size: f32, max_width: f32) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for word in words {
        let metrics = get_metrics(&word.face);
        let word_width = metrics.measure_px(word.text, size);
        let gap = if word.space_before && !current.runs.is_empty() {
            metrics.space_width * size
        } else {
            0.0
        };

        if !current.runs.is_empty() && current.width + gap + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            current.push(word, 0.0, word_width);
        } else {
            current.push(word, gap, word_width);
        }
    }
    if !current.runs.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
