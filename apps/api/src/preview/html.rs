//! Static HTML rendering of the preview, for screen and for the print fallback.
//!
//! Pages keep the `cv-content` / `cv-page-2` element ids so print CSS can hide the
//! page that was not selected.

use crate::preview::font_metrics::FontFace;
use crate::preview::render::{Block, Header, RenderedDocument, RenderedSection, Span};
use crate::preview::PageSelection;

const BASE_CSS: &str = "\
body{margin:0;background:#f3f4f6;font-family:Helvetica,Arial,sans-serif;color:#111}\
.a4-pages-wrapper{display:flex;flex-direction:column;align-items:center;gap:24px;padding:16px 0}\
.a4-page{width:210mm;height:297mm;padding:5mm;box-sizing:border-box;background:#fff;\
box-shadow:0 2px 8px rgba(0,0,0,.15);overflow:hidden;position:relative}\
.cv-header{text-align:center;margin-bottom:12px}\
.cv-name{font-size:26px;margin:0}\
.cv-title{font-size:15px;margin:2px 0}\
.cv-contact,.cv-links{font-size:12.5px}\
.section-title{font-size:15px;border-bottom:1px solid #111;margin:12px 0 4px}\
.cv-section p{font-size:12.5px;margin:0 0 4px}\
.cv-section ul{font-size:12.5px;margin:0 0 4px;padding-left:14px}\
.cv-section.centered{text-align:center}\
.cv-section.centered p{color:#666}\
.cv-link{color:inherit}\
.section-controls{position:absolute;right:4px}\
.page-placeholder{display:flex;align-items:center;justify-content:center;height:100%;\
color:#9ca3af;font-style:italic;font-size:14px}\
.page-warning{background:#fef3c7;padding:8px;text-align:center}";

const PRINT_CSS: &str = "\
@page{size:A4;margin:0}\
@media print{body{background:#fff}.no-print{display:none!important}\
.a4-pages-wrapper{padding:0;gap:0}\
.a4-page{box-shadow:none;page-break-after:always}\
.a4-page:last-child{page-break-after:auto}\
body[data-print=\"page1\"] #cv-page-2{display:none}\
body[data-print=\"page2\"] #cv-content{display:none}}";

/// On-screen preview, including move controls and the overflow warning.
pub fn render_html(doc: &RenderedDocument) -> String {
    page_shell(doc, None)
}

/// Printable document. Controls are hidden by print CSS; `selection` picks which
/// page(s) the browser's print dialog will include.
pub fn render_print_html(doc: &RenderedDocument, selection: PageSelection) -> String {
    page_shell(doc, Some(selection))
}

fn page_shell(doc: &RenderedDocument, print: Option<PageSelection>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>CV</title>\n<style>");
    html.push_str(BASE_CSS);
    html.push_str(PRINT_CSS);
    html.push_str("</style>\n</head>\n");

    match print {
        Some(selection) => html.push_str(&format!(
            "<body data-print=\"{}\">\n",
            selection.as_str()
        )),
        None => html.push_str("<body>\n"),
    }

    if doc.pages.iter().any(|p| p.overflows) {
        html.push_str(
            "<div class=\"page-warning no-print\">Content exceeds recommended limits. \
             Consider reducing content.</div>\n",
        );
    }

    html.push_str("<div class=\"a4-pages-wrapper\">\n");
    for page in &doc.pages {
        html.push_str(&format!(
            "<div class=\"a4-page\" id=\"{}\">\n",
            page.element_id
        ));
        if let Some(header) = &page.header {
            push_header(&mut html, header);
        }
        for section in &page.sections {
            push_section(&mut html, section);
        }
        if let Some(text) = page.placeholder {
            html.push_str(&format!(
                "<div class=\"page-placeholder\">{}</div>\n",
                html_escape(text)
            ));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    if print.is_some() {
        html.push_str(
            "<script>window.addEventListener('load',function(){window.print();});</script>\n",
        );
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn push_header(html: &mut String, header: &Header) {
    html.push_str("<header class=\"cv-header\">\n");
    html.push_str(&format!(
        "<h1 class=\"cv-name\">{}</h1>\n",
        html_escape(&header.name)
    ));
    if !header.title.is_empty() {
        html.push_str(&format!(
            "<div class=\"cv-title\">{}</div>\n",
            html_escape(&header.title)
        ));
    }
    if !header.contact.is_empty() {
        html.push_str(&format!(
            "<div class=\"cv-contact\">{}</div>\n",
            html_escape(&header.contact)
        ));
    }
    if !header.links.is_empty() {
        let links: Vec<String> = header
            .links
            .iter()
            .map(|l| anchor(&l.url, &html_escape(&l.label)))
            .collect();
        html.push_str(&format!(
            "<div class=\"cv-links\">{}</div>\n",
            links.join(" • ")
        ));
    }
    html.push_str("</header>\n");
}

fn push_section(html: &mut String, section: &RenderedSection) {
    let class = if section.controls.is_none() {
        "cv-section centered"
    } else {
        "cv-section"
    };
    html.push_str(&format!(
        "<section class=\"{class}\" data-section=\"{}\">\n",
        section.key
    ));

    if let Some(controls) = section.controls {
        html.push_str("<div class=\"section-controls no-print\">");
        let buttons = [("up", controls.up, "↑"), ("down", controls.down, "↓")];
        for (direction, enabled, label) in buttons {
            let disabled = if enabled { "" } else { " disabled" };
            html.push_str(&format!(
                "<button type=\"button\" data-move=\"{direction}\"{disabled}>{label}</button>"
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str(&format!(
        "<h2 class=\"section-title\">{}</h2>\n",
        html_escape(&section.title)
    ));

    let mut in_list = false;
    for block in &section.blocks {
        match block {
            Block::Bullet { spans } => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>\n", spans_html(spans)));
            }
            Block::Paragraph { spans, centered } => {
                if in_list {
                    html.push_str("</ul>\n");
                    in_list = false;
                }
                let style = if *centered { " style=\"text-align:center\"" } else { "" };
                html.push_str(&format!("<p{style}>{}</p>\n", spans_html(spans)));
            }
        }
    }
    if in_list {
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");
}

fn spans_html(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| {
            let text = html_escape(&span.text);
            let styled = match span.face {
                FontFace::Regular => text,
                FontFace::Bold => format!("<strong>{text}</strong>"),
                FontFace::Italic => format!("<em>{text}</em>"),
            };
            match &span.href {
                Some(url) => anchor(url, &styled),
                None => styled,
            }
        })
        .collect()
}

fn anchor(url: &str, inner: &str) -> String {
    format!(
        "<a class=\"cv-link\" href=\"{}\" target=\"_blank\" \
         rel=\"noopener noreferrer\">{inner}</a>",
        html_escape(url)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::CvDocument;
    use crate::preview::render::render_document;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<b>\"R&D\"</b>"),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_ids_present() {
        let html = render_html(&render_document(&CvDocument::default()));
        assert!(html.contains("id=\"cv-content\""));
        assert!(html.contains("id=\"cv-page-2\""));
        assert!(html.contains("<body>\n"));
        assert!(!html.contains("window.print"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut doc = CvDocument::default();
        doc.personal.name = "<script>alert(1)</script>".to_string();
        let html = render_html(&render_document(&doc));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_print_sets_selection() {
        let rendered = render_document(&CvDocument::default());
        let html = render_print_html(&rendered, PageSelection::Page2);
        assert!(html.contains("<body data-print=\"page2\">"));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn test_boundary_buttons_disabled() {
        let html = render_html(&render_document(&CvDocument::default()));
        let first = html.find("data-section=\"summary\"").unwrap();
        let tail = &html[first..];
        assert!(tail.contains("data-move=\"up\" disabled"));
    }

    #[test]
    fn test_bullets_grouped_in_list() {
        let html = render_html(&render_document(&CvDocument::default()));
        assert!(html.contains("<ul>\n<li>"));
    }
}
