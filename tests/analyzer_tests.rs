use url::Url;

use pagecheck::analyzer::crawler::LinkCheck;
use pagecheck::analyzer::generator::{Status, TestCaseGenerator};
use pagecheck::analyzer::parser;

const FIXTURE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Fixture page">
    <meta property="og:title" content="Fixture">
    <meta name="twitter:card" content="summary">
    <title>Fixture Page</title>
    <link rel="stylesheet" href="/app.css">
    <link rel="canonical" href="https://site.test/">
    <style>body { margin: 0; }</style>
    <script src="/app.js"></script>
    <script>console.log("hi");</script>
</head>
<body>
    <header aria-label="Site header"><h1>Welcome</h1></header>
    <nav><a href="/docs">Docs, guides</a></nav>
    <main role="main">
        <h2>Section</h2>
        <a href="https://elsewhere.test/page">External link</a>
        <form action="/signup" method="POST">
            <input type="hidden" name="csrf_token" value="abc">
            <input type="email" name="email" id="email" required>
            <input type="password" name="password" required>
            <input type="submit" value="Go">
        </form>
        <img src="/a.png" alt="Logo">
        <img src="/b.png">
        <table>
            <caption>Data</caption>
            <tr><th scope="col">Name</th><th scope="col">Value</th></tr>
            <tr><td>x</td><td>1</td></tr>
        </table>
    </main>
    <footer></footer>
</body>
</html>"#;

fn fixture_data() -> parser::PageData {
    let base = Url::parse("https://site.test/").unwrap();
    parser::parse(FIXTURE, &base)
}

// ── Parser ──────────────────────────────────────────────────────

#[test]
fn parser_extracts_links_with_resolution() {
    let data = fixture_data();

    assert_eq!(data.links.len(), 2);
    assert_eq!(data.links[0].url, "https://site.test/docs");
    assert_eq!(data.links[0].text, "Docs, guides");
    assert!(!data.links[0].external);
    assert!(data.links[1].external);
}

#[test]
fn parser_extracts_forms_and_fields() {
    let data = fixture_data();

    assert_eq!(data.forms.len(), 1);
    let form = &data.forms[0];
    assert_eq!(form.action, "https://site.test/signup");
    assert_eq!(form.method, "POST");
    assert_eq!(form.fields.len(), 4);

    let email = form.fields.iter().find(|f| f.name == "email").unwrap();
    assert_eq!(email.field_type, "email");
    assert_eq!(email.id, "email");
    assert!(email.required);

    let csrf = form.fields.iter().find(|f| f.name == "csrf_token").unwrap();
    assert!(!csrf.required);
}

#[test]
fn parser_extracts_page_structure() {
    let structure = fixture_data().structure;

    assert_eq!(structure.title.as_deref(), Some("Fixture Page"));
    assert_eq!(structure.lang.as_deref(), Some("en"));
    assert_eq!(structure.headings[0], vec!["Welcome"]);
    assert_eq!(structure.headings[1], vec!["Section"]);

    assert_eq!(structure.meta.charset.as_deref(), Some("utf-8"));
    assert!(structure
        .meta
        .viewport
        .as_deref()
        .unwrap()
        .contains("width=device-width"));
    assert!(structure.meta.robots.is_none());

    assert_eq!(structure.scripts.total, 2);
    assert_eq!(structure.scripts.external, 1);
    assert_eq!(structure.scripts.inline, 1);
    assert_eq!(structure.stylesheets.total, 1);
    assert_eq!(structure.stylesheets.inline, 1);

    assert_eq!(structure.images.len(), 2);
    assert!((structure.seo.img_alt_ratio - 0.5).abs() < f64::EPSILON);
    assert!(structure.seo.canonical);

    assert_eq!(structure.tables.len(), 1);
    let table = &structure.tables[0];
    assert!(table.has_caption);
    assert!(table.has_headers);
    assert!(table.has_scope);
    assert_eq!(table.rows, 2);

    assert!(structure.security.csrf_token);
    assert_eq!(structure.security.forms_with_csrf, 1);
    assert_eq!(structure.security.password_inputs, 1);
    assert_eq!(structure.security.external_links, 1);

    assert_eq!(structure.social.og_tags, 1);
    assert_eq!(structure.social.twitter_tags, 1);

    assert_eq!(structure.interactive.inputs.email, 1);
    assert_eq!(structure.interactive.inputs.submit, 1);

    assert_eq!(structure.lists.ul, 0);
    assert_eq!(structure.lists.ol, 0);

    // header, nav, main (x2: semantic + skipped role dup), footer
    assert!(structure.landmarks.len() >= 4);
}

#[test]
fn parser_handles_bare_minimum_page() {
    let base = Url::parse("http://example.com/").unwrap();
    let data = parser::parse("<html><body>hello</body></html>", &base);

    assert!(data.links.is_empty());
    assert!(data.forms.is_empty());
    assert!(data.structure.title.is_none());
    assert!(data.structure.lang.is_none());
    assert!((data.structure.seo.img_alt_ratio - 1.0).abs() < f64::EPSILON);
}

// ── Generator ───────────────────────────────────────────────────

fn passing_checks(data: &parser::PageData) -> Vec<LinkCheck> {
    data.links
        .iter()
        .map(|link| LinkCheck {
            url: link.url.clone(),
            status: Some(200),
            accessible: true,
            error: None,
        })
        .collect()
}

#[test]
fn generator_assigns_sequential_ids() {
    let data = fixture_data();
    let mut generator = TestCaseGenerator::new();
    generator.link_cases(&data.links, &passing_checks(&data));
    generator.form_cases(&data.forms);

    let cases = generator.into_cases();
    assert!(!cases.is_empty());
    assert_eq!(cases[0].id, "TC_001");
    assert_eq!(cases[1].id, "TC_002");
    let last = &cases[cases.len() - 1];
    assert_eq!(last.id, format!("TC_{:03}", cases.len()));
}

#[test]
fn generator_flags_missing_alt_text() {
    let data = fixture_data();
    let mut generator = TestCaseGenerator::new();
    generator.accessibility_cases(&data.structure);

    let cases = generator.into_cases();
    let alt_case = cases
        .iter()
        .find(|c| c.description == "Verify image alt texts")
        .unwrap();
    assert_eq!(alt_case.status, Status::Fail);
    assert!(alt_case.actual.contains("1 images missing alt text"));

    let h1_case = cases
        .iter()
        .find(|c| c.description == "Check for multiple H1 headings")
        .unwrap();
    assert_eq!(h1_case.status, Status::Pass);
}

#[test]
fn generator_reports_inaccessible_links() {
    let data = fixture_data();
    let checks: Vec<LinkCheck> = data
        .links
        .iter()
        .map(|link| LinkCheck {
            url: link.url.clone(),
            status: Some(404),
            accessible: false,
            error: None,
        })
        .collect();

    let mut generator = TestCaseGenerator::new();
    generator.link_cases(&data.links, &checks);

    let failed = generator
        .cases()
        .iter()
        .filter(|c| c.status == Status::Fail)
        .count();
    assert_eq!(failed, data.links.len());
}

#[test]
fn generator_summary_counts_by_status() {
    let data = fixture_data();
    let mut generator = TestCaseGenerator::new();
    generator.link_cases(&data.links, &passing_checks(&data));
    generator.form_cases(&data.forms);
    generator.structure_cases(&data.structure);
    generator.accessibility_cases(&data.structure);
    generator.language_cases(&data.structure);

    let summary = generator.summary();
    assert_eq!(summary.total, generator.cases().len());
    assert_eq!(
        summary.total,
        summary.passed + summary.failed + summary.warnings + summary.info
    );
    assert!(summary.passed > 0);
    // Meta robots and keywords are absent from the fixture
    assert!(summary.failed > 0);
}

#[test]
fn csv_export_escapes_fields() {
    let data = fixture_data();
    let mut generator = TestCaseGenerator::new();
    generator.link_cases(&data.links, &passing_checks(&data));

    let csv = generator.to_csv();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "TC_ID,Test Case Description,Test Step,Expected Result,Actual Result,Status"
    );
    // The first link text contains a comma, so its cell must be quoted
    assert!(csv.contains(r#""Verify presence of link: Docs, guides""#));
    assert!(csv.lines().count() > 1);
}
