use serde::Serialize;

use crate::analyzer::crawler::LinkCheck;
use crate::analyzer::parser::{Form, Link, PageStructure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Pass,
    Fail,
    Warning,
    Info,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "Pass"),
            Status::Fail => write!(f, "Fail"),
            Status::Warning => write!(f, "Warning"),
            Status::Info => write!(f, "Info"),
        }
    }
}

/// One row of the generated manual-test table.
#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    pub id: String,
    pub description: String,
    pub step: String,
    pub expected: String,
    pub actual: String,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Rule-based mapping from parsed page data to test-case rows. Call the
/// `*_cases` methods in any order; ids are assigned in insertion order.
pub struct TestCaseGenerator {
    cases: Vec<TestCase>,
    counter: usize,
}

impl TestCaseGenerator {
    pub fn new() -> Self {
        Self {
            cases: Vec::new(),
            counter: 1,
        }
    }

    fn add(&mut self, description: &str, step: &str, expected: &str, actual: &str, status: Status) {
        self.cases.push(TestCase {
            id: format!("TC_{:03}", self.counter),
            description: description.to_string(),
            step: step.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            status,
        });
        self.counter += 1;
    }

    pub fn link_cases(&mut self, links: &[Link], checks: &[LinkCheck]) {
        for (link, check) in links.iter().zip(checks) {
            self.add(
                &format!("Verify presence of link: {}", link.text),
                &format!("Check if link with text '{}' exists", link.text),
                "Link should be present in the page",
                "Link is present",
                Status::Pass,
            );

            let (actual, status) = match (check.accessible, check.status, &check.error) {
                (true, Some(code), _) => (
                    format!("Link is accessible with status code {code}"),
                    Status::Pass,
                ),
                (_, Some(code), _) => (
                    format!("Link is not accessible: status code {code}"),
                    Status::Fail,
                ),
                (_, None, Some(error)) => {
                    (format!("Link is not accessible: {error}"), Status::Fail)
                }
                _ => ("Link is not accessible".to_string(), Status::Fail),
            };

            self.add(
                &format!("Verify accessibility of link: {}", link.text),
                &format!("Try to access URL: {}", link.url),
                "Link should be accessible with 2xx/3xx status code",
                &actual,
                status,
            );
        }
    }

    pub fn form_cases(&mut self, forms: &[Form]) {
        for (i, form) in forms.iter().enumerate() {
            let n = i + 1;
            self.add(
                &format!("Verify presence of form #{n}"),
                &format!("Check if form with action '{}' exists", form.action),
                "Form should be present in the page",
                "Form is present",
                Status::Pass,
            );

            let required: Vec<&str> = form
                .fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.as_str())
                .collect();
            if !required.is_empty() {
                self.add(
                    &format!("Verify required fields in form #{n}"),
                    "Check if required fields are properly marked",
                    &format!("Fields {} should be required", required.join(", ")),
                    "All required fields are properly marked",
                    Status::Pass,
                );
            }

            let has_action = !form.action.is_empty();
            self.add(
                &format!("Verify form #{n} submission endpoint"),
                &format!("Check if form action URL '{}' is valid", form.action),
                "Form action URL should be valid",
                &format!(
                    "Form action URL is {}",
                    if has_action { "valid" } else { "missing" }
                ),
                if has_action { Status::Pass } else { Status::Fail },
            );
        }
    }

    pub fn structure_cases(&mut self, structure: &PageStructure) {
        self.add(
            "Verify page title",
            "Check if page has a title",
            "Page should have a title",
            &match &structure.title {
                Some(title) => format!("Page title is '{title}'"),
                None => "Page has no title".to_string(),
            },
            if structure.title.is_some() {
                Status::Pass
            } else {
                Status::Fail
            },
        );

        let meta = &structure.meta;
        for (name, content) in [
            ("description", &meta.description),
            ("keywords", &meta.keywords),
            ("viewport", &meta.viewport),
            ("charset", &meta.charset),
            ("robots", &meta.robots),
        ] {
            self.add(
                &format!("Verify meta {name}"),
                &format!("Check if page has meta {name}"),
                &format!("Page should have meta {name}"),
                &format!(
                    "Meta {name} is {}",
                    if content.is_some() { "present" } else { "missing" }
                ),
                if content.is_some() {
                    Status::Pass
                } else {
                    Status::Fail
                },
            );
        }

        if let Some(viewport) = &meta.viewport {
            self.add(
                "Verify responsive design meta tag",
                "Check if page has viewport meta tag",
                "Page should have viewport meta tag for responsiveness",
                &format!("Viewport meta tag is present: {viewport}"),
                if viewport.contains("width=device-width") {
                    Status::Pass
                } else {
                    Status::Fail
                },
            );
        }

        let scripts = &structure.scripts;
        self.add(
            "Verify script loading",
            "Check script inclusion",
            "Page should load all required scripts",
            &format!(
                "Found {} scripts ({} external, {} inline)",
                scripts.total, scripts.external, scripts.inline
            ),
            if scripts.total > 0 {
                Status::Pass
            } else {
                Status::Fail
            },
        );

        let stylesheets = &structure.stylesheets;
        self.add(
            "Verify stylesheet loading",
            "Check stylesheet inclusion",
            "Page should load all required stylesheets",
            &format!(
                "Found {} stylesheets ({} external, {} inline)",
                stylesheets.total, stylesheets.external, stylesheets.inline
            ),
            if stylesheets.total > 0 {
                Status::Pass
            } else {
                Status::Fail
            },
        );

        for (i, table) in structure.tables.iter().enumerate() {
            self.add(
                &format!("Verify table #{} accessibility", i + 1),
                "Check table structure and accessibility features",
                "Table should have proper headers and structure",
                &format!(
                    "Table has {} rows, {} columns, {} headers, {} caption",
                    table.rows,
                    table.cols,
                    if table.has_headers { "has" } else { "lacks" },
                    if table.has_caption { "has" } else { "lacks" }
                ),
                if table.has_headers && table.has_caption {
                    Status::Pass
                } else {
                    Status::Warning
                },
            );
        }

        let interactive = &structure.interactive;
        let total_inputs = interactive.inputs.total();
        self.add(
            "Verify form elements presence",
            "Check presence of interactive elements",
            "Page should have necessary interactive elements",
            &format!(
                "Found {} buttons, {} input fields, {} select dropdowns, {} text areas",
                interactive.buttons, total_inputs, interactive.selects, interactive.textareas
            ),
            if total_inputs > 0 {
                Status::Pass
            } else {
                Status::Info
            },
        );

        let seo = &structure.seo;
        self.add(
            "Verify SEO basics",
            "Check basic SEO elements",
            "Page should have basic SEO elements",
            &format!(
                "{} canonical link, {} meta description, Image alt text ratio: {:.0}%",
                if seo.canonical { "Has" } else { "Missing" },
                if seo.meta_description { "Has" } else { "Missing" },
                seo.img_alt_ratio * 100.0
            ),
            if seo.canonical && seo.meta_description && seo.img_alt_ratio > 0.8 {
                Status::Pass
            } else {
                Status::Warning
            },
        );

        let security = &structure.security;
        self.add(
            "Verify security measures",
            "Check security features",
            "Page should implement basic security measures",
            &format!(
                "CSRF protection: {}, External links: {}, Password fields: {}",
                if security.csrf_token { "Present" } else { "Missing" },
                security.external_links,
                security.password_inputs
            ),
            if security.csrf_token || security.password_inputs == 0 {
                Status::Pass
            } else {
                Status::Warning
            },
        );

        let social = &structure.social;
        self.add(
            "Verify social media metadata",
            "Check social media meta tags",
            "Page should have social media meta tags",
            &format!(
                "OpenGraph tags: {}, Twitter cards: {}",
                social.og_tags, social.twitter_tags
            ),
            if social.og_tags + social.twitter_tags > 0 {
                Status::Pass
            } else {
                Status::Info
            },
        );
    }

    pub fn accessibility_cases(&mut self, structure: &PageStructure) {
        let missing_alt = structure
            .images
            .iter()
            .filter(|img| img.alt.is_empty())
            .count();
        self.add(
            "Verify image alt texts",
            "Check if all images have alt text",
            "All images should have alt text",
            &if missing_alt == 0 {
                "All images have alt text".to_string()
            } else {
                format!("{missing_alt} images missing alt text")
            },
            if missing_alt == 0 {
                Status::Pass
            } else {
                Status::Fail
            },
        );

        let h1_count = structure.headings[0].len();
        self.add(
            "Verify heading hierarchy",
            "Check if page has proper heading structure starting with H1",
            "Page should have at least one H1 heading",
            if h1_count > 0 {
                "Found H1 heading"
            } else {
                "No H1 heading found"
            },
            if h1_count > 0 { Status::Pass } else { Status::Fail },
        );

        self.add(
            "Check for multiple H1 headings",
            "Verify page has only one main H1 heading",
            "Page should have only one H1 heading",
            &format!("Found {h1_count} H1 heading(s)"),
            if h1_count <= 1 { Status::Pass } else { Status::Fail },
        );

        self.add(
            "Verify ARIA landmarks",
            "Check for presence of ARIA landmarks",
            "Page should have proper ARIA landmarks",
            &format!("Found {} ARIA landmarks", structure.landmarks.len()),
            if structure.landmarks.is_empty() {
                Status::Fail
            } else {
                Status::Pass
            },
        );
    }

    pub fn language_cases(&mut self, structure: &PageStructure) {
        self.add(
            "Verify HTML language declaration",
            "Check if page has proper language declaration",
            "Page should have valid language declaration",
            &match &structure.lang {
                Some(lang) => format!("Declared language: {lang}"),
                None => "No language declaration found".to_string(),
            },
            if structure.lang.is_some() {
                Status::Pass
            } else {
                Status::Fail
            },
        );

        let charset = structure
            .meta
            .charset
            .clone()
            .unwrap_or_else(|| "utf-8".to_string());
        self.add(
            "Verify character encoding",
            "Check character encoding declaration",
            "Page should use UTF-8 or appropriate encoding",
            &format!("Character encoding: {charset}"),
            if matches!(charset.to_lowercase().as_str(), "utf-8" | "utf8") {
                Status::Pass
            } else {
                Status::Warning
            },
        );
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.cases.len(),
            ..Summary::default()
        };
        for case in &self.cases {
            match case.status {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::Warning => summary.warnings += 1,
                Status::Info => summary.info += 1,
            }
        }
        summary
    }

    /// Render the table as CSV with the column layout of the exported report.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(
            "TC_ID,Test Case Description,Test Step,Expected Result,Actual Result,Status\n",
        );
        for case in &self.cases {
            let row = [
                case.id.as_str(),
                case.description.as_str(),
                case.step.as_str(),
                case.expected.as_str(),
                case.actual.as_str(),
            ];
            for field in row {
                out.push_str(&csv_escape(field));
                out.push(',');
            }
            out.push_str(&case.status.to_string());
            out.push('\n');
        }
        out
    }

    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }
}

impl Default for TestCaseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
