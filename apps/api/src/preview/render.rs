//! Preview projection — (document, layout, preferences) → two rendered pages.
//!
//! Pure: nothing here touches the store. Empty fields fall back to the sample
//! document one field at a time (per-field demo mode); `demo_fields` reports which
//! ones were substituted so clients can badge them.

use serde::Serialize;

use crate::document::layout::{Direction, Page, SectionId};
use crate::document::models::{
    Activity, Course, CvDocument, Education, Experience, Language, Personal, Project,
    ReferencesPlacement, Skills,
};
use crate::preview::demo::demo_document;
use crate::preview::font_metrics::FontFace;

pub const PAGE1_ELEMENT_ID: &str = "cv-content";
pub const PAGE2_ELEMENT_ID: &str = "cv-page-2";
pub const EMPTY_PAGE_PLACEHOLDER: &str = "Content can be moved here";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Fields that may be replaced by sample content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoField {
    Personal,
    Education,
    Experience,
    Skills,
    Courses,
    Projects,
    Activities,
    Languages,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    /// Always exactly two pages, page 1 first.
    pub pages: Vec<RenderedPage>,
    pub demo_fields: Vec<DemoField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub number: u8,
    pub element_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    pub sections: Vec<RenderedSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    /// Set once the page has been laid out and its content runs past the bottom margin.
    pub overflows: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub name: String,
    pub title: String,
    /// Phone, email and location joined with their separators; empty when none is set.
    pub contact: String,
    pub links: Vec<HeaderLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    /// Section identifier, or `"references"` for the references block.
    pub key: &'static str,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Move-button availability. `None` for blocks that are not part of the layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<MoveControls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveControls {
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph { spans: Vec<Span>, centered: bool },
    Bullet { spans: Vec<Span> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub face: FontFace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>, face: FontFace) -> Self {
        Self {
            text: text.into(),
            face,
            href: None,
        }
    }

    pub fn linked(text: impl Into<String>, face: FontFace, href: impl Into<String>) -> Self {
        Self::plain(text, face).link(href)
    }

    fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            face: FontFace::Regular,
            href: None,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            face: FontFace::Bold,
            href: None,
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            face: FontFace::Italic,
            href: None,
        }
    }

    fn link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

impl Block {
    fn line(spans: Vec<Span>) -> Self {
        Block::Paragraph {
            spans,
            centered: false,
        }
    }

    pub fn spans(&self) -> &[Span] {
        match self {
            Block::Paragraph { spans, .. } | Block::Bullet { spans } => spans,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Display data (per-field demo fallback)
// ────────────────────────────────────────────────────────────────────────────

struct DisplayData<'a> {
    personal: &'a Personal,
    education: &'a [Education],
    experience: &'a [Experience],
    skills: &'a Skills,
    courses: &'a [Course],
    projects: &'a [Project],
    activities: &'a [Activity],
    languages: &'a [Language],
}

fn pick<'a, T>(
    real: &'a [T],
    demo: &'a [T],
    field: DemoField,
    used: &mut Vec<DemoField>,
) -> &'a [T] {
    if real.is_empty() {
        used.push(field);
        demo
    } else {
        real
    }
}

fn display_data(doc: &CvDocument) -> (DisplayData<'_>, Vec<DemoField>) {
    let demo = demo_document();
    let mut used = Vec::new();

    let personal = if doc.personal.has_content() {
        &doc.personal
    } else {
        used.push(DemoField::Personal);
        &demo.personal
    };
    let education = pick(&doc.education, &demo.education, DemoField::Education, &mut used);
    let experience = pick(&doc.experience, &demo.experience, DemoField::Experience, &mut used);
    let skills = if doc.skills.is_empty() {
        used.push(DemoField::Skills);
        &demo.skills
    } else {
        &doc.skills
    };
    let courses = pick(&doc.courses, &demo.courses, DemoField::Courses, &mut used);
    let projects = pick(&doc.projects, &demo.projects, DemoField::Projects, &mut used);
    let activities = pick(&doc.activities, &demo.activities, DemoField::Activities, &mut used);
    let languages = pick(&doc.languages, &demo.languages, DemoField::Languages, &mut used);

    (
        DisplayData {
            personal,
            education,
            experience,
            skills,
            courses,
            projects,
            activities,
            languages,
        },
        used,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Projection
// ────────────────────────────────────────────────────────────────────────────

/// Projects the document into two pages. `overflows` is left `false`; see
/// `preview::layout::mark_overflow`.
pub fn render_document(doc: &CvDocument) -> RenderedDocument {
    let (data, demo_fields) = display_data(doc);
    let references = doc.preferences.references_placement();
    let references_text = doc.preferences.references_text();

    let mut pages = Vec::with_capacity(2);
    for page in [Page::Page1, Page::Page2] {
        let mut sections: Vec<RenderedSection> = doc
            .sections
            .page(page)
            .iter()
            .filter_map(|id| {
                let (title, blocks) = section_content(*id, &data)?;
                Some(RenderedSection {
                    key: id.as_str(),
                    title: title.to_string(),
                    blocks,
                    controls: Some(MoveControls {
                        up: doc.sections.can_move(*id, Direction::Up),
                        down: doc.sections.can_move(*id, Direction::Down),
                    }),
                })
            })
            .collect();

        let wants_references = matches!(
            (page, references),
            (Page::Page1, ReferencesPlacement::Page1) | (Page::Page2, ReferencesPlacement::Page2)
        );
        if wants_references {
            sections.push(references_section(references_text));
        }

        let (number, element_id, header) = match page {
            Page::Page1 => (1, PAGE1_ELEMENT_ID, Some(header(data.personal))),
            Page::Page2 => (2, PAGE2_ELEMENT_ID, None),
        };
        let placeholder =
            (page == Page::Page2 && sections.is_empty()).then_some(EMPTY_PAGE_PLACEHOLDER);

        pages.push(RenderedPage {
            number,
            element_id,
            header,
            sections,
            placeholder,
            overflows: false,
        });
    }

    RenderedDocument { pages, demo_fields }
}

fn header(personal: &Personal) -> Header {
    let mut contact = personal.phone.clone();
    if !personal.email.is_empty() {
        if !contact.is_empty() {
            contact.push_str(" – ");
        }
        contact.push_str(&personal.email);
    }
    if !personal.location.is_empty() {
        if !contact.is_empty() {
            contact.push_str(" - ");
        }
        contact.push_str(&personal.location);
    }
    Header {
        name: personal.name.clone(),
        title: personal.title.clone(),
        contact,
        links: personal
            .links
            .iter()
            .filter(|l| !l.url.is_empty())
            .map(|l| HeaderLink {
                label: if l.label.is_empty() {
                    l.url.clone()
                } else {
                    l.label.clone()
                },
                url: l.url.clone(),
            })
            .collect(),
    }
}

fn date_range(start: &str, end: &str) -> Option<String> {
    match (start.is_empty(), end.is_empty()) {
        (true, true) => None,
        (false, false) => Some(format!("({start} – {end})")),
        _ => Some(format!("({start}{end})")),
    }
}

fn references_section(text: &str) -> RenderedSection {
    RenderedSection {
        key: "references",
        title: "References".to_string(),
        blocks: vec![Block::Paragraph {
            spans: vec![Span::italic(text)],
            centered: true,
        }],
        controls: None,
    }
}

/// Title and blocks for one section, or `None` when it has nothing to show.
fn section_content(id: SectionId, data: &DisplayData<'_>) -> Option<(&'static str, Vec<Block>)> {
    let blocks = match id {
        SectionId::Summary => {
            if data.personal.summary.is_empty() {
                return None;
            }
            vec![Block::line(vec![Span::regular(&data.personal.summary)])]
        }
        SectionId::Education => data.education.iter().flat_map(education_blocks).collect(),
        SectionId::Experience => data.experience.iter().flat_map(experience_blocks).collect(),
        SectionId::Courses => data.courses.iter().map(course_block).collect(),
        SectionId::Skills => skills_blocks(data.skills),
        SectionId::Projects => data.projects.iter().flat_map(project_blocks).collect(),
        SectionId::Activities => data.activities.iter().flat_map(activity_blocks).collect(),
        SectionId::Languages => data
            .languages
            .iter()
            .map(|l| {
                Block::line(vec![
                    Span::bold(&l.name),
                    Span::regular(format!(": {}", l.level)),
                ])
            })
            .collect(),
    };

    if blocks.is_empty() {
        return None;
    }
    Some((section_title(id), blocks))
}

pub fn section_title(id: SectionId) -> &'static str {
    match id {
        SectionId::Summary => "Professional Summary",
        SectionId::Education => "Education",
        SectionId::Experience => "Experience",
        SectionId::Projects => "Projects",
        SectionId::Activities => "Extracurricular Activities",
        SectionId::Courses => "Certifications & Courses",
        SectionId::Skills => "Key Skills",
        SectionId::Languages => "Languages",
    }
}

fn education_blocks(edu: &Education) -> Vec<Block> {
    let mut heading = vec![Span::bold(&edu.degree)];
    if !edu.institution.is_empty() {
        heading.push(Span::regular(", "));
        heading.push(Span::regular(&edu.institution));
    }
    if let Some(range) = date_range(&edu.start_date, &edu.end_date) {
        heading.push(Span::regular(format!(" {range}")));
    }

    let mut blocks = vec![Block::line(heading)];
    if !edu.location.is_empty() {
        blocks.push(Block::line(vec![Span::italic(&edu.location)]));
    }
    if !edu.description.is_empty() {
        blocks.push(Block::line(vec![Span::regular(&edu.description)]));
    }
    blocks
}

fn experience_blocks(exp: &Experience) -> Vec<Block> {
    let mut heading = vec![Span::bold(&exp.position)];
    if !exp.company.is_empty() {
        heading.push(Span::regular(" at "));
        heading.push(Span::bold(&exp.company));
    }
    if let Some(range) = date_range(&exp.start_date, &exp.end_date) {
        heading.push(Span::regular(format!(" {range}")));
    }

    let mut blocks = vec![Block::line(heading)];
    if !exp.location.is_empty() {
        blocks.push(Block::line(vec![Span::italic(&exp.location)]));
    }
    blocks.extend(
        exp.responsibilities
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| Block::Bullet {
                spans: vec![Span::regular(r)],
            }),
    );
    blocks
}

fn course_block(course: &Course) -> Block {
    let mut name = Span::bold(&course.name);
    if !course.link.is_empty() {
        name = name.link(&course.link);
    }
    let mut spans = vec![name];
    if !course.provider.is_empty() {
        spans.push(Span::regular(format!(" - {}", course.provider)));
    }
    if !course.hours.is_empty() {
        spans.push(Span::regular(format!(" | {}", course.hours)));
    }
    if !course.year.is_empty() {
        spans.push(Span::regular(format!(" ({})", course.year)));
    }
    Block::Bullet { spans }
}

fn skills_blocks(skills: &Skills) -> Vec<Block> {
    let mut blocks = Vec::new();
    if !skills.technical.is_empty() {
        blocks.push(Block::line(vec![
            Span::bold("Technical skills: "),
            Span::regular(skills.technical.join(", ")),
        ]));
    }
    if !skills.soft.is_empty() {
        blocks.push(Block::line(vec![
            Span::bold("Soft skills: "),
            Span::regular(skills.soft.join(", ")),
        ]));
    }
    blocks
}

fn project_blocks(project: &Project) -> Vec<Block> {
    let mut heading = vec![Span::bold(&project.name)];
    if !project.link.is_empty() {
        heading.push(Span::regular(" - "));
        heading.push(Span::regular(&project.link).link(&project.link));
    }
    let mut blocks = vec![Block::line(heading)];
    if !project.description.is_empty() {
        blocks.push(Block::line(vec![Span::regular(&project.description)]));
    }
    blocks
}

fn activity_blocks(activity: &Activity) -> Vec<Block> {
    let mut blocks = vec![Block::line(vec![Span::bold(&activity.name)])];
    if !activity.role.is_empty() {
        blocks.push(Block::line(vec![Span::italic(&activity.role)]));
    }
    if !activity.description.is_empty() {
        blocks.push(Block::line(vec![Span::regular(&activity.description)]));
    }
    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
