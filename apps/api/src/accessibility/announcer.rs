//! Announcement Region: passive live regions for assistive technology.
//!
//! The page owns the regions; this module only writes their text.

use crate::dom::Document;

pub const SECTION_REGION_ID: &str = "a11y-announcer";
pub const STATUS_REGION_ID: &str = "a11y-status";

/// Writes `"Title. Description"` (or just the title) to the section region.
/// Returns false when the region is missing.
pub fn announce_section(doc: &mut Document, title: &str, description: Option<&str>) -> bool {
    let message = match description {
        Some(d) if !d.is_empty() => format!("{title}. {d}"),
        _ => title.to_string(),
    };
    write_region(doc, SECTION_REGION_ID, &message)
}

pub fn announce_status(doc: &mut Document, message: &str) -> bool {
    write_region(doc, STATUS_REGION_ID, message)
}

fn write_region(doc: &mut Document, id: &str, message: &str) -> bool {
    let Some(region) = doc.get_element_by_id(id) else {
        return false;
    };
    doc.set_text_content(region, message);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_regions() -> Document {
        let mut doc = Document::default();
        let body = doc.body();
        for id in [SECTION_REGION_ID, STATUS_REGION_ID] {
            let region = doc.create_element("div");
            doc.set_attribute(region, "id", id);
            doc.set_attribute(region, "aria-live", "polite");
            doc.append_child(body, region).unwrap();
        }
        doc
    }

    #[test]
    fn test_section_with_description() {
        let mut doc = with_regions();
        assert!(announce_section(
            &mut doc,
            "Browse Jobs",
            Some("Search and filter jobs")
        ));
        let region = doc.get_element_by_id(SECTION_REGION_ID).unwrap();
        assert_eq!(doc.inner_text(region).trim(), "Browse Jobs. Search and filter jobs");
    }

    #[test]
    fn test_section_title_only_replaces_previous_text() {
        let mut doc = with_regions();
        announce_section(&mut doc, "Browse Jobs", Some("first"));
        announce_section(&mut doc, "Job Details", None);
        let region = doc.get_element_by_id(SECTION_REGION_ID).unwrap();
        assert_eq!(doc.inner_text(region).trim(), "Job Details");
    }

    #[test]
    fn test_missing_region_is_skipped() {
        let mut doc = Document::default();
        assert!(!announce_status(&mut doc, "Reading page content"));
    }
}
