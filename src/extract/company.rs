//! Company entry extraction

use scraper::ElementRef;

use super::{FieldExtractor, SkipReason};
use crate::dom;
use crate::records::CompanyRecord;

const MIN_NAME_CHARS: usize = 2;

const NAVIGATION_LABELS: &[&str] = &[
    "next",
    "prev",
    "previous",
    "back",
    "home",
    "contact",
    "next page",
    "previous page",
    "back to top",
    "view all",
    "see all",
    "load more",
    "read more",
];

impl FieldExtractor {
    /// Infer one company from a candidate node found by `found_by`
    pub fn company(&self, node: &ElementRef, found_by: &str) -> Result<CompanyRecord, SkipReason> {
        let element = node.value();
        let (name, url, logo) = if element.name() == "img" {
            let name = element.attr("alt").unwrap_or_default().trim().to_string();
            let url = dom::enclosing_anchor(node)
                .and_then(|anchor| anchor.value().attr("href"))
                .map(|href| self.resolve(href));
            (name, url, element.attr("src").map(str::to_string))
        } else {
            let heading = dom::descendants_named(node, dom::HEADING_TAGS)
                .next()
                .map(|heading| dom::trimmed_text(&heading))
                .unwrap_or_default();
            let name = if heading.is_empty() {
                collapse_whitespace(&dom::text_of(node))
            } else {
                heading
            };
            let url = dom::first_link_href(node).map(|href| self.resolve(href));
            let logo = dom::descendants_named(node, &["img"])
                .find_map(|img| img.value().attr("src"))
                .map(str::to_string);
            (name, url, logo)
        };

        check_company_name(&name)?;

        Ok(CompanyRecord {
            name,
            url,
            found_by: found_by.to_string(),
            logo,
            job_count: None,
        })
    }
}

/// Reject names that cannot be a company
pub(crate) fn check_company_name(name: &str) -> Result<(), SkipReason> {
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(SkipReason::NameTooShort(name.to_string()));
    }
    if is_navigation_text(name) {
        return Err(SkipReason::NavigationText(name.to_string()));
    }
    Ok(())
}

/// Whether `text` is a pagination or menu label rather than a name
pub fn is_navigation_text(text: &str) -> bool {
    let label = text
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    NAVIGATION_LABELS.contains(&label.as_str())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect_companies;
    use crate::records::Source;
    use scraper::Html;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new("https://board.example", Source::JobsFromSpace)
    }

    #[test]
    fn test_logo_image_entry() {
        let document = Html::parse_document(
            r#"<p><a href="/companies/acme"><img class="logo" alt=" Acme Corp " src="/acme.png"></a></p>"#,
        );
        let companies = extractor().companies(&detect_companies(&document));

        assert_eq!(companies.len(), 1);
        let company = &companies[0];
        assert_eq!(company.name, "Acme Corp");
        assert_eq!(company.url.as_deref(), Some("https://board.example/companies/acme"));
        assert_eq!(company.logo.as_deref(), Some("/acme.png"));
        assert_eq!(company.found_by, "logo image");
    }

    #[test]
    fn test_heading_then_own_text() {
        let document = Html::parse_document(
            r#"
            <section id="companies">
              <article><h3>Planet Labs</h3><a href="https://planet.com">Site</a></article>
              <article>  Relativity
                 Space </article>
            </section>
            "#,
        );
        let companies = extractor().companies(&detect_companies(&document));
        let names: Vec<&str> = companies.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Planet Labs", "Relativity Space"]);
        assert_eq!(companies[0].url.as_deref(), Some("https://planet.com"));
        assert_eq!(companies[1].url, None);
        assert!(companies.iter().all(|c| c.found_by == "directory section"));
    }

    #[test]
    fn test_name_filtering() {
        assert_eq!(check_company_name(""), Err(SkipReason::EmptyName));
        assert_eq!(check_company_name("X"), Err(SkipReason::NameTooShort("X".into())));
        assert_eq!(
            check_company_name("Next »"),
            Err(SkipReason::NavigationText("Next »".into()))
        );
        assert_eq!(check_company_name("Nextera"), Ok(()));
        assert!(is_navigation_text("Back to top"));
    }

    #[test]
    fn test_navigation_entries_are_skipped() {
        let document = Html::parse_document(
            r#"<ul><li class="company">SpaceX</li><li class="company">Next</li><li class="company">?</li></ul>"#,
        );
        let companies = extractor().companies(&detect_companies(&document));
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "SpaceX");
        assert_eq!(companies[0].found_by, "class match");
    }
}
