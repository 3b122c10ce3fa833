//! Built-in sample document shown in place of empty fields.

use std::sync::OnceLock;

use crate::document::models::{
    Activity, Course, CvDocument, Education, Experience, Language, Link, Personal, Project,
    Skills,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The sample document. Built once and shared.
pub fn demo_document() -> &'static CvDocument {
    static DEMO: OnceLock<CvDocument> = OnceLock::new();
    DEMO.get_or_init(build_demo)
}

fn build_demo() -> CvDocument {
    CvDocument {
        personal: Personal {
            name: "Jordan Avery".to_string(),
            title: "Senior Backend Engineer".to_string(),
            email: "jordan.avery@example.com".to_string(),
            phone: "+1 (555) 010-2030".to_string(),
            location: "Lisbon".to_string(),
            summary: "Backend engineer with nine years of experience designing \
                      distributed services, data pipelines and developer tooling. \
                      Comfortable owning systems end to end, from schema design to \
                      on-call, and mentoring engineers along the way."
                .to_string(),
            links: vec![
                Link {
                    id: 1,
                    label: "LinkedIn".to_string(),
                    url: "https://linkedin.com/in/jordan-avery".to_string(),
                },
                Link {
                    id: 2,
                    label: "GitHub".to_string(),
                    url: "https://github.com/jordan-avery".to_string(),
                },
            ],
        },
        education: vec![Education {
            id: 1,
            degree: "MSc in Computer Engineering".to_string(),
            institution: "Instituto Superior Tecnico".to_string(),
            location: "Lisbon, Portugal".to_string(),
            start_date: "2013".to_string(),
            end_date: "2015".to_string(),
            description: "Thesis on consistent hashing for elastic caches.".to_string(),
        }],
        experience: vec![
            Experience {
                id: 1,
                position: "Senior Backend Engineer".to_string(),
                company: "Harbor Logistics".to_string(),
                location: "Remote".to_string(),
                start_date: "Mar 2021".to_string(),
                end_date: "Present".to_string(),
                responsibilities: strings(&[
                    "Led the migration of the shipment tracker to an event-sourced design",
                    "Cut p99 latency of the pricing API from 480ms to 90ms",
                    "Introduced contract tests that halved integration incidents",
                ]),
            },
            Experience {
                id: 2,
                position: "Software Engineer".to_string(),
                company: "Northwind Payments".to_string(),
                location: "Porto, Portugal".to_string(),
                start_date: "Sep 2015".to_string(),
                end_date: "Feb 2021".to_string(),
                responsibilities: strings(&[
                    "Built the reconciliation service processing 2M transactions a day",
                    "Maintained the internal CLI used by every product team",
                ]),
            },
        ],
        skills: Skills {
            technical: strings(&["Rust", "Go", "PostgreSQL", "Kafka", "Kubernetes", "gRPC"]),
            soft: strings(&["Mentoring", "Technical writing", "Incident leadership"]),
        },
        courses: vec![Course {
            id: 1,
            name: "Certified Kubernetes Administrator".to_string(),
            provider: "CNCF".to_string(),
            year: "2023".to_string(),
            hours: "30h".to_string(),
            link: "https://www.cncf.io/certification/cka/".to_string(),
        }],
        projects: vec![Project {
            id: 1,
            name: "tidewatch".to_string(),
            description: "Open-source tide and weather aggregator with offline sync.".to_string(),
            link: "https://github.com/jordan-avery/tidewatch".to_string(),
        }],
        activities: vec![Activity {
            id: 1,
            name: "Lisbon Rust Meetup".to_string(),
            role: "Co-organizer".to_string(),
            description: "Runs the monthly talks and the beginner workshop track.".to_string(),
        }],
        languages: vec![
            Language {
                id: 1,
                name: "Portuguese".to_string(),
                level: "Native".to_string(),
            },
            Language {
                id: 2,
                name: "English".to_string(),
                level: "Fluent".to_string(),
            },
        ],
        ..Default::default()
    }
}
