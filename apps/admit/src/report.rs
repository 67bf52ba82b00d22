use std::fmt::Write as _;

use client_core::PageState;
use serde::Serialize;
use shared::domain::{AdmissionOutcome, Section};

/// What the page looks like once admission settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionReport {
    pub callsign: Option<String>,
    pub outcome: Option<AdmissionOutcome>,
    pub link_href: Option<String>,
    pub visible_sections: Vec<Section>,
}

impl AdmissionReport {
    pub fn new(
        callsign: Option<String>,
        outcome: Option<AdmissionOutcome>,
        page: &PageState,
    ) -> Self {
        Self {
            callsign,
            outcome,
            link_href: page.link_href().map(str::to_string),
            visible_sections: page.visible_sections(),
        }
    }

    pub fn render_text(&self) -> String {
        let Some(callsign) = &self.callsign else {
            return "no callsign admitted: input needs three consecutive letters A-Z\n".into();
        };

        let mut out = String::new();
        let _ = writeln!(out, "callsign: {callsign}");
        match self.outcome {
            Some(outcome) => {
                let _ = writeln!(out, "outcome: {outcome}");
            }
            None => {
                let _ = writeln!(out, "outcome: superseded");
            }
        }
        if let Some(href) = &self.link_href {
            let _ = writeln!(out, "link: {href}");
        }
        let sections = self
            .visible_sections
            .iter()
            .map(|section| section.id())
            .collect::<Vec<_>>();
        let _ = writeln!(out, "visible: {}", sections.join(", "));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{SharedPage, UiPort};

    #[test]
    fn renders_ready_page() {
        let page = SharedPage::default();
        page.set_link_href("/morse?name=DL1ABC");
        page.show(Section::Ready, true);
        page.show(Section::Join, true);

        let report = AdmissionReport::new(
            Some("DL1ABC".into()),
            Some(AdmissionOutcome::Ready),
            &page.snapshot(),
        );

        assert_eq!(
            report.render_text(),
            "callsign: DL1ABC\noutcome: ready\nlink: /morse?name=DL1ABC\nvisible: ready, join\n"
        );
    }

    #[test]
    fn renders_rejected_input() {
        let report = AdmissionReport::new(None, None, &PageState::new());
        assert!(report.render_text().starts_with("no callsign admitted"));
    }

    #[test]
    fn serializes_sections_by_id() {
        let page = SharedPage::default();
        page.show(Section::Error, true);
        let report = AdmissionReport::new(
            Some("ABC".into()),
            Some(AdmissionOutcome::Error),
            &page.snapshot(),
        );

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["outcome"], "error");
        assert_eq!(json["visible_sections"], serde_json::json!(["error"]));
        assert_eq!(json["link_href"], serde_json::Value::Null);
    }
}
