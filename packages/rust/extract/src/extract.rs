//! Best-effort field extraction from fetched page content.
//!
//! Each category has its own extraction pass. The only hard contract here
//! is: extraction never fails and always yields a (possibly empty) set of
//! fields. Precision and recall are explicitly not guaranteed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use forager_shared::{Category, Record};

/// Maximum excerpt length in characters for general-content pages.
const EXCERPT_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Fields derived from one page's content. Empty fields stay `None`/empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Unique email addresses, in first-seen order.
    pub emails: Vec<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// Source URL of the posting; always set for job extractions.
    pub job_url: Option<String>,
    /// Leading content excerpt for general pages.
    pub excerpt: Option<String>,
}

impl Extraction {
    /// Whether the pass found anything at all.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.job_title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.excerpt.is_none()
    }

    /// Merge extracted fields into a result record.
    pub fn merge_into(self, record: &mut Record) {
        if !self.emails.is_empty() {
            record.contact_info = self.emails.clone();
            record.emails = self.emails;
        }
        if self.job_title.is_some() {
            record.job_title = self.job_title;
        }
        if self.company.is_some() {
            record.company = self.company;
        }
        if self.location.is_some() {
            record.location = self.location;
        }
        if self.job_url.is_some() {
            record.job_url = self.job_url;
        }
        if self.excerpt.is_some() {
            record.excerpt = self.excerpt;
        }
    }
}

/// Extract category-specific fields from page content.
pub fn extract(content: &str, url: &str, category: Category) -> Extraction {
    let extraction = match category {
        Category::Email => Extraction {
            emails: extract_emails(content),
            ..Default::default()
        },
        Category::Job => extract_job_info(content, url),
        Category::Website | Category::General => Extraction {
            excerpt: excerpt(content),
            ..Default::default()
        },
    };

    debug!(
        url,
        category = %category,
        emails = extraction.emails.len(),
        has_job_title = extraction.job_title.is_some(),
        has_excerpt = extraction.excerpt.is_some(),
        "content extraction complete"
    );

    extraction
}

// ---------------------------------------------------------------------------
// Email extraction
// ---------------------------------------------------------------------------

/// Scan content for email addresses, deduplicated in first-seen order.
fn extract_emails(content: &str) -> Vec<String> {
    static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
    });

    let mut seen = HashSet::new();
    let mut emails = Vec::new();

    for m in EMAIL_RE.find_iter(content) {
        let addr = m.as_str().to_string();
        if seen.insert(addr.clone()) {
            emails.push(addr);
        }
    }

    emails
}

// ---------------------------------------------------------------------------
// Job extraction
// ---------------------------------------------------------------------------

/// Extract job title/company/location via ordered label patterns.
///
/// For each field group the first matching pattern wins; unmatched fields
/// stay absent. The source URL is always attached as `job_url`.
fn extract_job_info(content: &str, url: &str) -> Extraction {
    static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?is)<title>\s*(.+?)\s*[-|]\s*.+?</title>").expect("valid regex"),
            Regex::new(r"(?i)job title:\s*([^\r\n]+)").expect("valid regex"),
            Regex::new(r"(?i)position:\s*([^\r\n]+)").expect("valid regex"),
        ]
    });
    static COMPANY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?i)company:\s*([^\r\n]+)").expect("valid regex"),
            Regex::new(r"(?i)employer:\s*([^\r\n]+)").expect("valid regex"),
        ]
    });
    static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?i)location:\s*([^\r\n]+)").expect("valid regex"),
            Regex::new(r"(?i)based in:\s*([^\r\n]+)").expect("valid regex"),
        ]
    });

    Extraction {
        job_title: first_capture(&TITLE_PATTERNS, content),
        company: first_capture(&COMPANY_PATTERNS, content),
        location: first_capture(&LOCATION_PATTERNS, content),
        job_url: Some(url.to_string()),
        ..Default::default()
    }
}

/// First capture group of the first pattern that matches, trimmed.
fn first_capture(patterns: &[Regex], content: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

// ---------------------------------------------------------------------------
// Generic excerpt
// ---------------------------------------------------------------------------

/// First `EXCERPT_CHARS` characters of the content, char-boundary safe.
fn excerpt(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(EXCERPT_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forager_shared::SearchHit;

    #[test]
    fn emails_are_deduplicated() {
        let content = "Contact: a@b.com and a@b.com";
        let result = extract(content, "https://x.example", Category::Email);
        assert_eq!(result.emails, vec!["a@b.com"]);
    }

    #[test]
    fn emails_preserve_first_seen_order() {
        let content = "Reach out to zoe@corp.io, then alan@corp.io, then zoe@corp.io again.";
        let result = extract(content, "https://x.example", Category::Email);
        assert_eq!(result.emails, vec!["zoe@corp.io", "alan@corp.io"]);
    }

    #[test]
    fn email_pattern_requires_real_tld() {
        let emails = extract_emails("ping admin@localhost and real.person@site.co");
        assert_eq!(emails, vec!["real.person@site.co"]);
    }

    #[test]
    fn no_emails_yields_empty_extraction() {
        let result = extract("nothing to see here", "https://x.example", Category::Email);
        assert!(result.emails.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn job_extraction_from_html_title() {
        let content =
            "<html><title>Staff Engineer - Acme Corp</title><body>\nCompany: Acme Corp\n\
             Location: Berlin\nApply today.\n</body></html>";
        let result = extract(content, "https://jobs.acme.example/1", Category::Job);
        assert_eq!(result.job_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(result.company.as_deref(), Some("Acme Corp"));
        assert_eq!(result.location.as_deref(), Some("Berlin"));
        assert_eq!(result.job_url.as_deref(), Some("https://jobs.acme.example/1"));
    }

    #[test]
    fn job_extraction_falls_back_to_labeled_lines() {
        let content = "Job Title: Data Scientist\nEmployer: DataCorp\nBased in: New York";
        let result = extract(content, "https://jobs.example/2", Category::Job);
        assert_eq!(result.job_title.as_deref(), Some("Data Scientist"));
        assert_eq!(result.company.as_deref(), Some("DataCorp"));
        assert_eq!(result.location.as_deref(), Some("New York"));
    }

    #[test]
    fn job_url_set_even_when_nothing_matches() {
        let result = extract("no labels here", "https://jobs.example/3", Category::Job);
        assert!(result.job_title.is_none());
        assert!(result.company.is_none());
        assert_eq!(result.job_url.as_deref(), Some("https://jobs.example/3"));
    }

    #[test]
    fn general_excerpt_is_capped_at_500_chars() {
        let content = "x".repeat(1200);
        let result = extract(&content, "https://x.example", Category::General);
        assert_eq!(result.excerpt.as_ref().map(String::len), Some(500));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        // Multibyte content must not be sliced mid-character.
        let content = "日本語のテキスト".repeat(100);
        let result = extract(&content, "https://x.example", Category::General);
        let excerpt = result.excerpt.expect("excerpt present");
        assert_eq!(excerpt.chars().count(), 500);
    }

    #[test]
    fn empty_content_yields_no_excerpt() {
        let result = extract("   \n  ", "https://x.example", Category::General);
        assert!(result.excerpt.is_none());
    }

    #[test]
    fn merge_into_record_fills_email_fields() {
        let mut record = Record::from_hit(&SearchHit {
            title: "t".into(),
            url: "https://a.example".into(),
            snippet: "s".into(),
        });
        let extraction = Extraction {
            emails: vec!["a@b.com".into()],
            ..Default::default()
        };
        extraction.merge_into(&mut record);
        assert_eq!(record.emails, vec!["a@b.com"]);
        assert_eq!(record.contact_info, vec!["a@b.com"]);
    }

    #[test]
    fn merge_into_record_leaves_base_fields_alone() {
        let mut record = Record::from_hit(&SearchHit {
            title: "original title".into(),
            url: "https://a.example".into(),
            snippet: "original snippet".into(),
        });
        Extraction::default().merge_into(&mut record);
        assert_eq!(record.title, "original title");
        assert_eq!(record.description, "original snippet");
        assert!(record.emails.is_empty());
    }
}
