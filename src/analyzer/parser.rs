use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything the generator needs from one parsed page.
#[derive(Debug, Clone)]
pub struct PageData {
    pub links: Vec<Link>,
    pub forms: Vec<Form>,
    pub structure: PageStructure,
}

#[derive(Debug, Clone)]
pub struct Link {
    pub url: String,
    pub text: String,
    pub external: bool,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub action: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub field_type: String,
    pub name: String,
    pub id: String,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct PageStructure {
    pub title: Option<String>,
    /// Heading texts indexed by level: `headings[0]` holds the h1s.
    pub headings: [Vec<String>; 6],
    pub meta: MetaTags,
    pub images: Vec<Image>,
    pub scripts: ResourceCounts,
    pub stylesheets: ResourceCounts,
    pub lang: Option<String>,
    pub landmarks: Vec<Landmark>,
    pub lists: ListCounts,
    pub tables: Vec<TableInfo>,
    pub interactive: InteractiveElements,
    pub seo: SeoSignals,
    pub security: SecuritySignals,
    pub social: SocialMeta,
}

#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub viewport: Option<String>,
    pub charset: Option<String>,
    pub robots: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Image {
    pub src: Option<String>,
    pub alt: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceCounts {
    pub total: usize,
    pub external: usize,
    pub inline: usize,
}

#[derive(Debug, Clone)]
pub struct Landmark {
    pub element: String,
    pub role: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListCounts {
    pub ul: usize,
    pub ol: usize,
    pub dl: usize,
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub has_caption: bool,
    pub has_headers: bool,
    pub has_scope: bool,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InteractiveElements {
    pub buttons: usize,
    pub selects: usize,
    pub textareas: usize,
    pub inputs: InputCounts,
}

#[derive(Debug, Clone, Default)]
pub struct InputCounts {
    pub text: usize,
    pub password: usize,
    pub email: usize,
    pub checkbox: usize,
    pub radio: usize,
    pub submit: usize,
}

impl InputCounts {
    pub fn total(&self) -> usize {
        self.text + self.password + self.email + self.checkbox + self.radio + self.submit
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeoSignals {
    pub canonical: bool,
    pub h1_count: usize,
    pub meta_description: bool,
    pub meta_keywords: bool,
    /// Share of images carrying alt text; 1.0 when there are no images.
    pub img_alt_ratio: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SecuritySignals {
    pub csrf_token: bool,
    pub external_links: usize,
    pub password_inputs: usize,
    pub forms_with_csrf: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SocialMeta {
    pub og_tags: usize,
    pub twitter_tags: usize,
}

const SEMANTIC_ELEMENTS: [&str; 7] = [
    "header", "nav", "main", "article", "aside", "footer", "section",
];
const ARIA_ROLES: [&str; 5] = [
    "banner",
    "navigation",
    "main",
    "complementary",
    "contentinfo",
];
const CSRF_INPUTS: &str =
    r#"input[name="csrf_token"], input[name="_token"], input[name="_csrf"]"#;

/// Parse a page into the shallow structure the heuristics operate on.
/// Parsing never fails: scraper produces a document for any input, so the
/// caller is responsible for rejecting empty bodies first.
pub fn parse(html: &str, base: &Url) -> PageData {
    let doc = Html::parse_document(html);

    PageData {
        links: extract_links(&doc, base),
        forms: extract_forms(&doc, base),
        structure: extract_structure(&doc, base),
    }
}

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

fn count(doc: &Html, selector: &str) -> usize {
    doc.select(&sel(selector)).count()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn attr_of_first(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    doc.select(&sel(selector))
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string())
}

fn extract_links(doc: &Html, base: &Url) -> Vec<Link> {
    let mut links = Vec::new();
    for a in doc.select(&sel("a[href]")) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        // Malformed hrefs are skipped rather than failing the whole page
        let Ok(absolute) = base.join(href) else {
            continue;
        };

        let external = absolute.host_str() != base.host_str();
        links.push(Link {
            url: absolute.to_string(),
            text: element_text(a),
            external,
        });
    }
    links
}

fn extract_forms(doc: &Html, base: &Url) -> Vec<Form> {
    let field_sel = sel("input, textarea, select");

    let mut forms = Vec::new();
    for form in doc.select(&sel("form")) {
        let action = form.value().attr("action").unwrap_or("");
        let action = base
            .join(action)
            .map(|u| u.to_string())
            .unwrap_or_default();
        let method = form
            .value()
            .attr("method")
            .unwrap_or("get")
            .to_uppercase();

        let fields = form
            .select(&field_sel)
            .map(|field| FormField {
                field_type: field.value().attr("type").unwrap_or("text").to_string(),
                name: field.value().attr("name").unwrap_or("").to_string(),
                id: field.value().attr("id").unwrap_or("").to_string(),
                required: field.value().attr("required").is_some(),
            })
            .collect();

        forms.push(Form {
            action,
            method,
            fields,
        });
    }
    forms
}

fn extract_structure(doc: &Html, base: &Url) -> PageStructure {
    let title = doc
        .select(&sel("title"))
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let headings: [Vec<String>; 6] = std::array::from_fn(|i| {
        doc.select(&sel(&format!("h{}", i + 1)))
            .map(element_text)
            .collect()
    });

    let meta = MetaTags {
        description: meta_content(doc, "description"),
        keywords: meta_content(doc, "keywords"),
        viewport: meta_content(doc, "viewport"),
        charset: attr_of_first(doc, "meta[charset]", "charset"),
        robots: meta_content(doc, "robots"),
    };

    let images: Vec<Image> = doc
        .select(&sel("img"))
        .map(|img| Image {
            src: img.value().attr("src").map(|s| s.to_string()),
            alt: img.value().attr("alt").unwrap_or("").to_string(),
        })
        .collect();

    let script_total = count(doc, "script");
    let script_external = count(doc, "script[src]");
    let scripts = ResourceCounts {
        total: script_total,
        external: script_external,
        inline: script_total - script_external,
    };

    let stylesheets = ResourceCounts {
        total: count(doc, r#"link[rel="stylesheet"]"#),
        external: count(doc, r#"link[rel="stylesheet"][href]"#),
        inline: count(doc, "style"),
    };

    let lang = attr_of_first(doc, "html", "lang");

    let with_alt = images.iter().filter(|img| !img.alt.is_empty()).count();
    let img_alt_ratio = if images.is_empty() {
        1.0
    } else {
        with_alt as f64 / images.len() as f64
    };

    let seo = SeoSignals {
        canonical: count(doc, r#"link[rel="canonical"]"#) > 0,
        h1_count: headings[0].len(),
        meta_description: meta.description.is_some(),
        meta_keywords: meta.keywords.is_some(),
        img_alt_ratio,
    };

    let external_links = doc
        .select(&sel("a[href]"))
        .filter(|a| {
            a.value()
                .attr("href")
                .and_then(|href| base.join(href).ok())
                .is_some_and(|u| {
                    matches!(u.scheme(), "http" | "https") && u.host_str() != base.host_str()
                })
        })
        .count();

    let forms_with_csrf = doc
        .select(&sel("form"))
        .filter(|form| form.select(&sel(CSRF_INPUTS)).next().is_some())
        .count();

    let security = SecuritySignals {
        csrf_token: count(doc, CSRF_INPUTS) > 0,
        external_links,
        password_inputs: count(doc, r#"input[type="password"]"#),
        forms_with_csrf,
    };

    let social = SocialMeta {
        og_tags: count(doc, r#"meta[property^="og:"]"#),
        twitter_tags: count(doc, r#"meta[name^="twitter:"]"#),
    };

    PageStructure {
        title,
        headings,
        meta,
        images,
        scripts,
        stylesheets,
        lang,
        landmarks: extract_landmarks(doc),
        lists: ListCounts {
            ul: count(doc, "ul"),
            ol: count(doc, "ol"),
            dl: count(doc, "dl"),
        },
        tables: extract_tables(doc),
        interactive: InteractiveElements {
            buttons: count(doc, "button"),
            selects: count(doc, "select"),
            textareas: count(doc, "textarea"),
            inputs: InputCounts {
                text: count(doc, r#"input[type="text"]"#),
                password: count(doc, r#"input[type="password"]"#),
                email: count(doc, r#"input[type="email"]"#),
                checkbox: count(doc, r#"input[type="checkbox"]"#),
                radio: count(doc, r#"input[type="radio"]"#),
                submit: count(doc, r#"input[type="submit"]"#),
            },
        },
        seo,
        security,
        social,
    }
}

fn meta_content(doc: &Html, name: &str) -> Option<String> {
    attr_of_first(doc, &format!(r#"meta[name="{name}"]"#), "content")
}

fn extract_landmarks(doc: &Html) -> Vec<Landmark> {
    let mut landmarks = Vec::new();

    for element in SEMANTIC_ELEMENTS {
        for el in doc.select(&sel(element)) {
            landmarks.push(Landmark {
                element: element.to_string(),
                role: el.value().attr("role").unwrap_or("").to_string(),
                label: el.value().attr("aria-label").unwrap_or("").to_string(),
            });
        }
    }

    for role in ARIA_ROLES {
        for el in doc.select(&sel(&format!(r#"[role="{role}"]"#))) {
            // Semantic elements with an explicit role are already recorded
            if SEMANTIC_ELEMENTS.contains(&el.value().name()) {
                continue;
            }
            landmarks.push(Landmark {
                element: el.value().name().to_string(),
                role: role.to_string(),
                label: el.value().attr("aria-label").unwrap_or("").to_string(),
            });
        }
    }

    landmarks
}

fn extract_tables(doc: &Html) -> Vec<TableInfo> {
    let caption = sel("caption");
    let th = sel("th");
    let th_scoped = sel("th[scope]");
    let tr = sel("tr");
    let td = sel("td");

    doc.select(&sel("table"))
        .map(|table| {
            let rows = table.select(&tr).count();
            let cells = table.select(&td).count();
            TableInfo {
                has_caption: table.select(&caption).next().is_some(),
                has_headers: table.select(&th).next().is_some(),
                has_scope: table.select(&th_scoped).next().is_some(),
                rows,
                cols: if rows > 0 { cells / rows } else { 0 },
            }
        })
        .collect()
}
