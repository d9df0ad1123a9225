//! HTML site generation.
//!
//! Stage 3 of the chiaki-site build pipeline. Takes the asset index (with
//! dimensions from the thumbs stage) and writes the final static site.
//!
//! ## Generated Pages
//!
//! | Route | Content |
//! |---|---|
//! | `/` | Cover image, site logo and `landing.md` |
//! | `/character/` | `character.md`, concept art, the avatar viewer |
//! | `/character/art/` | Project cards with the R18 toggle, age dialog and lightbox |
//! | `/fonts/` | Font showcase cards |
//! | `/fonts/{id}/` | One font: description and embedded specimen page |
//! | `/links/` | Profile picture and link buttons |
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── character/
//! │   ├── index.html
//! │   └── art/index.html
//! ├── fonts/
//! │   ├── index.html
//! │   └── akitra/index.html
//! ├── links/index.html
//! └── assets/                  # content/assets + generated thumbnails
//! ```
//!
//! ## Cards
//!
//! Project cards are laid out with [`select_layout`] under the default
//! visibility (toggle off, age not confirmed), so adult tiles start blurred.
//! Every tile carries its image index and both slide positions from
//! [`slide_positions`]; `static/gallery.js` flips classes and opens the
//! lightbox from those attributes without recomputing anything.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: base styles (theme variables injected from config)
//! - `static/gallery.js`: R18 toggle, age dialog and lightbox
//! - `static/avatar.js`: avatar viewer glue for the character page

use crate::avatar;
use crate::config::{self, FontEntry, SiteConfig};
use crate::gallery::{CardLayout, SlidePositions, Tile, Visibility, select_layout, slide_positions};
use crate::index::{Project, ProjectFile, ProjectIndex};
use crate::thumbnail::{self, Variant};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const GALLERY_JS: &str = include_str!("../static/gallery.js");
const AVATAR_JS: &str = include_str!("../static/avatar.js");

/// Top-level content directory copied into the site as-is.
const ASSETS_DIR: &str = "assets";

/// A written HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub title: String,
    /// Site route, e.g. `/fonts/akitra/`.
    pub route: String,
    /// Nesting level in the CLI listing.
    pub depth: usize,
}

impl GeneratedPage {
    fn new(title: &str, route: &str, depth: usize) -> Self {
        Self {
            title: title.to_string(),
            route: route.to_string(),
            depth,
        }
    }

    /// Output file relative to the site root.
    pub fn file(&self) -> String {
        route_file(&self.route)
    }
}

/// What the generate stage wrote.
#[derive(Debug, Default)]
pub struct GenerateResult {
    pub pages: Vec<GeneratedPage>,
    /// `(title, image count)` per project card, in page order.
    pub cards: Vec<(String, usize)>,
    /// Files copied from the content assets and thumbnails.
    pub copied_files: usize,
}

/// `/` → `index.html`, `/fonts/akitra/` → `fonts/akitra/index.html`.
pub fn route_file(route: &str) -> String {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}

/// Read `index.json` and generate the site.
pub fn generate(
    index_path: &Path,
    content_root: &Path,
    thumbs_dir: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<GenerateResult, GenerateError> {
    let index: ProjectIndex = serde_json::from_str(&fs::read_to_string(index_path)?)?;
    generate_site(&index, content_root, thumbs_dir, output_dir, config)
}

/// Generate the site from an in-memory index.
pub fn generate_site(
    index: &ProjectIndex,
    content_root: &Path,
    thumbs_dir: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<GenerateResult, GenerateError> {
    let css = format!(
        "{}\n\n{}",
        config::generate_theme_css(&config.theme),
        CSS_STATIC
    );
    let page = PageContext { config, css: &css };

    fs::create_dir_all(output_dir)?;
    let mut result = GenerateResult::default();

    for dir in asset_roots(config) {
        result.copied_files += copy_tree(&content_root.join(&dir), &output_dir.join(&dir))?;
    }
    // Thumbnails mirror asset URLs, so they land beside the originals.
    // The cache manifest is a dot-file and stays behind.
    result.copied_files += copy_tree(thumbs_dir, output_dir)?;

    let landing = read_markdown(&content_root.join("landing.md"))?;
    let character = read_markdown(&content_root.join("character.md"))?;

    let mut write = |meta: GeneratedPage, markup: Markup| -> Result<(), GenerateError> {
        let path = output_dir.join(meta.file());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, markup.into_string())?;
        tracing::debug!(route = %meta.route, "wrote page");
        result.pages.push(meta);
        Ok(())
    };

    write(
        GeneratedPage::new("Home", "/", 0),
        render_landing(&page, landing.as_deref()),
    )?;
    write(
        GeneratedPage::new("Character", "/character/", 0),
        render_character(&page, character.as_deref())?,
    )?;
    write(
        GeneratedPage::new("Art", "/character/art/", 1),
        render_art(&page, index, thumbs_dir)?,
    )?;
    write(GeneratedPage::new("Fonts", "/fonts/", 0), render_fonts_index(&page))?;
    for font in &config.fonts {
        write(
            GeneratedPage::new(&font.title, &font_route(font), 1),
            render_font_page(&page, font),
        )?;
    }
    write(GeneratedPage::new("Links", "/links/", 0), render_links(&page))?;

    result.cards = index
        .all_projects()
        .iter()
        .map(|p| (p.title.clone(), p.images.len()))
        .collect();

    tracing::debug!(
        pages = result.pages.len(),
        files = result.copied_files,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(result)
}

/// Content directories copied verbatim: `assets/` plus the first component
/// of `gallery.assets_dir` when it lives elsewhere.
fn asset_roots(config: &SiteConfig) -> Vec<String> {
    let mut roots = vec![ASSETS_DIR.to_string()];
    if let Some(first) = Path::new(&config.gallery.assets_dir).components().next() {
        let first = first.as_os_str().to_string_lossy().to_string();
        if !roots.contains(&first) {
            roots.push(first);
        }
    }
    roots
}

/// Copy every regular file under `src` to `dst`, keeping relative paths.
///
/// Dot-files and per-project `project.toml` files are skipped. A missing
/// `src` copies nothing.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| GenerateError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name == "project.toml" {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

fn read_markdown(path: &Path) -> Result<Option<String>, GenerateError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(render_markdown(&fs::read_to_string(path)?)))
}

/// Markdown to HTML.
pub fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    out
}

fn font_route(font: &FontEntry) -> String {
    format!("/fonts/{}/", font.id)
}

/// JSON for a `<script type="application/json">` block. `</` is escaped so
/// a string value can never close the element.
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

// ============================================================================
// HTML Components
// ============================================================================

struct PageContext<'a> {
    config: &'a SiteConfig,
    css: &'a str,
}

/// Renders the base HTML document structure with the site's meta tags.
fn base_document(
    page: &PageContext,
    title: &str,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    let site = &page.config.site;
    let keywords = site.keywords.join(",");
    let og_image = absolute_url(&site.url, &site.og_image);
    html! {
        (DOCTYPE)
        html lang=(site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(site.description);
                meta name="keywords" content=(keywords);
                meta name="author" content=(page.config.gallery.default_author);
                meta name="robots" content="index, follow";
                meta property="og:type" content="website";
                meta property="og:url" content=(site.url);
                meta property="og:title" content=(site.title);
                meta property="og:description" content=(site.description);
                meta property="og:image" content=(og_image);
                meta property="og:locale" content=(site.language.replace('-', "_"));
                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(site.title);
                meta name="twitter:image" content=(og_image);
                link rel="icon" href="/favicon.ico";
                style { (PreEscaped(page.css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// `base` + `path` without a doubled slash; absolute URLs pass through.
fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

const TOP_NAV: &[(&str, &str)] = &[("Home", "/"), ("Character", "/character/"), ("Fonts", "/fonts/")];

/// Fixed top bar. The mobile drawer is a checkbox + label pair, no script.
fn top_bar(current: &str) -> Markup {
    let is_current = |route: &str| {
        if route == "/" {
            current == "/"
        } else {
            current.starts_with(route)
        }
    };
    html! {
        nav.top-bar {
            div.top-bar-inner {
                input.nav-toggle type="checkbox" id="nav-toggle";
                label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                    span.hamburger-line {}
                    span.hamburger-line {}
                    span.hamburger-line {}
                }
                a.logo href="/" {
                    img src="/assets/icon/logo_white.svg" alt="Logo";
                }
                ul.top-links {
                    @for (label, route) in TOP_NAV {
                        li class=[is_current(route).then_some("current")] {
                            a href=(route) { (label) }
                        }
                    }
                }
                div.nav-panel {
                    label.nav-close for="nav-toggle" { "×" }
                    ul {
                        @for (label, route) in TOP_NAV {
                            li { a href=(route) { (label) } }
                        }
                    }
                }
            }
        }
    }
}

/// Second bar under the top bar: section title and section links.
fn sub_nav(title: &str, items: &[(String, String)], current: &str) -> Markup {
    html! {
        nav.sub-nav {
            div.sub-nav-inner {
                span.sub-nav-title { (title) }
                ul {
                    @for (label, route) in items {
                        li class=[(route == current).then_some("current")] {
                            a href=(route) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn character_sub_nav(current: &str) -> Markup {
    let items = vec![
        ("介紹".to_string(), "/character/".to_string()),
        ("作品集".to_string(), "/character/art/".to_string()),
    ];
    sub_nav("角色介紹", &items, current)
}

fn fonts_sub_nav(fonts: &[FontEntry], current: &str) -> Markup {
    let items: Vec<(String, String)> = fonts
        .iter()
        .map(|f| (f.title.clone(), font_route(f)))
        .collect();
    sub_nav("字體作品", &items, current)
}

/// Full-screen cover with the shrine background and dot overlay.
fn cover(image: &str, inner: Markup) -> Markup {
    html! {
        section.cover {
            div.cover-bg style={ "background-image: url('" (image) "')" } {}
            div.dot-overlay {}
            div.cover-content { (inner) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_landing(page: &PageContext, body: Option<&str>) -> Markup {
    let site = &page.config.site;
    let content = html! {
        (cover(&site.cover_image, html! {
            img.main-logo src="/assets/icon/logo_white.svg" alt=(site.title);
        }))
        @if let Some(body) = body {
            section.detail {
                article.detail-content { (PreEscaped(body)) }
            }
        }
    };
    base_document(page, &site.title, Some("landing"), content)
}

fn render_character(page: &PageContext, intro: Option<&str>) -> Result<Markup, GenerateError> {
    let config = page.config;
    let bootstrap = avatar::bootstrap_json(&config.avatar)?;
    let concept = &config.concept_art;

    let content = html! {
        (top_bar("/character/"))
        (character_sub_nav("/character/"))
        main.character-page {
            section.intro {
                h1 { "Character Portfolio" }
                @if let Some(intro) = intro {
                    div.intro-box { (PreEscaped(intro)) }
                }
            }
            @if !concept.is_empty() {
                section.concept-art {
                    h2 { "設定圖集" }
                    div.concept-grid {
                        @for art in concept {
                            figure.concept {
                                a href=(art.src) target="_blank" rel="noopener" {
                                    img src=(art.src) alt=(art.caption) loading="lazy";
                                }
                                figcaption { (art.caption) }
                            }
                        }
                    }
                }
            }
            section.live2d {
                h2 { "Live2D" }
                div #avatar-viewer .avatar-viewer data-config=(bootstrap) {
                    div.avatar-loading {
                        span.spinner {}
                        p { "載入中..." }
                    }
                }
            }
            div.more-works {
                a.outline-button href="/character/art/" { "更多作品" }
            }
        }
        script { (PreEscaped(AVATAR_JS)) }
    };
    Ok(base_document(
        page,
        &format!("角色介紹 - {}", config.site.title),
        Some("character"),
        content,
    ))
}

/// Lightbox slide data consumed by `gallery.js`.
#[derive(Serialize)]
struct SlideData<'a> {
    src: &'a str,
    alt: String,
    r18: bool,
}

#[derive(Serialize)]
struct ProjectData<'a> {
    id: &'a str,
    slides: Vec<SlideData<'a>>,
}

fn render_art(
    page: &PageContext,
    index: &ProjectIndex,
    thumbs_dir: &Path,
) -> Result<Markup, GenerateError> {
    let projects = index.all_projects();
    let data: Vec<ProjectData> = projects
        .iter()
        .map(|p| ProjectData {
            id: &p.id,
            slides: p
                .images
                .iter()
                .map(|img| SlideData {
                    src: &img.path,
                    alt: image_alt(p, img),
                    r18: img.r18,
                })
                .collect(),
        })
        .collect();
    let data = script_json(&data)?;

    let content = html! {
        (top_bar("/character/art/"))
        (character_sub_nav("/character/art/"))
        main.art-page #gallery {
            div.r18-control {
                // A button, not a checkbox: the browser never restores a
                // native checked state behind the glue's back.
                button.switch #r18-toggle type="button" role="switch" aria-checked="false" {
                    span { "顯示 R18 內容" }
                    span.slider {}
                }
                p.r18-warning hidden { "⚠️ 已開啟成人內容顯示" }
            }
            div.project-list {
                @for project in &projects {
                    (project_card(project, thumbs_dir))
                }
            }
        }
        (age_dialog())
        div #lightbox .lightbox hidden {
            button.lightbox-close type="button" aria-label="Close" { "×" }
            button.lightbox-prev type="button" aria-label="Previous" { "‹" }
            img.lightbox-image alt="";
            button.lightbox-next type="button" aria-label="Next" { "›" }
            a.lightbox-download download { "下載" }
        }
        script #gallery-data type="application/json" { (PreEscaped(data)) }
        script { (PreEscaped(GALLERY_JS)) }
    };
    Ok(base_document(
        page,
        &format!("作品集 - {}", page.config.site.title),
        Some("art"),
        content,
    ))
}

fn image_alt(project: &Project, file: &ProjectFile) -> String {
    format!("{} - {}", project.title, file.name)
}

/// The styled age confirmation dialog, hidden until an adult image or the
/// toggle asks for it.
fn age_dialog() -> Markup {
    html! {
        div #age-dialog .dialog-overlay hidden {
            div.dialog role="alertdialog" aria-labelledby="age-dialog-title" {
                h2 #age-dialog-title { "成人內容確認" }
                p {
                    "此內容包含成人內容，僅限18歲以上觀看。"
                    br;
                    "您是否已滿18歲？"
                }
                div.dialog-actions {
                    button.dialog-cancel type="button" { "取消" }
                    button.dialog-confirm type="button" { "確認已滿18歲" }
                }
            }
        }
    }
}

/// One project card: header, title, tiles, downloads and counters.
pub fn project_card(project: &Project, thumbs_dir: &Path) -> Markup {
    let layout = select_layout(&project.images, project.layout(), Visibility::default());
    let positions = slide_positions(&project.images);
    let r18_count = project.r18_count();
    let initial: String = project.author.chars().take(1).collect();

    html! {
        article.project-card data-project-id=(project.id) {
            header.card-header {
                span.author-avatar { (initial) }
                div.author {
                    div {
                        span.author-name { (project.author) }
                        " "
                        span.author-handle { "@" (project.author_handle()) }
                    }
                    @if !project.date.is_empty() {
                        time.card-date { (project.date) }
                    }
                }
            }
            h3.card-title { (project.title) }
            @if !matches!(layout, CardLayout::Empty) {
                div.card-images { (card_tiles(project, &layout, &positions, thumbs_dir)) }
            }
            @if !project.download_files.is_empty() {
                div.downloads {
                    p { "下載檔案：" }
                    @for file in &project.download_files {
                        a.download-button href=(file.path) download=(file.name) { (file.name) }
                    }
                }
            }
            footer.card-footer {
                span title="圖片數量" {
                    (project.images.len()) " 張圖片"
                    @if r18_count > 0 {
                        " "
                        span.r18-count { "(" (r18_count) " 張 R18)" }
                    }
                }
                span title="下載檔案" { (project.download_files.len()) " 個檔案" }
            }
        }
    }
}

fn card_tiles(
    project: &Project,
    layout: &CardLayout,
    positions: &[SlidePositions],
    thumbs_dir: &Path,
) -> Markup {
    let tile = |t: &Tile, variant: Variant| tile_markup(project, t, &positions[t.image_index], variant, thumbs_dir);
    html! {
        @match layout {
            CardLayout::Empty => {}
            CardLayout::Single(t) => {
                div.layout-single { (tile(t, Variant::Large)) }
            }
            CardLayout::Vertical { hero, stack } => {
                div.layout-vertical {
                    div.hero { (tile(hero, Variant::Large)) }
                    div.stack {
                        @for t in stack { (tile(t, Variant::Small)) }
                    }
                }
            }
            CardLayout::Horizontal { hero, row } => {
                div.layout-horizontal {
                    div.hero { (tile(hero, Variant::Large)) }
                    div.row data-count=(row.len()) {
                        @for t in row { (tile(t, Variant::Small)) }
                    }
                }
            }
            CardLayout::Grid { rows } => {
                div.layout-grid {
                    @for row in rows {
                        @for t in row { (tile(t, Variant::Small)) }
                    }
                }
            }
        }
    }
}

fn tile_markup(
    project: &Project,
    tile: &Tile,
    positions: &SlidePositions,
    variant: Variant,
    thumbs_dir: &Path,
) -> Markup {
    let file = &project.images[tile.image_index];
    let src = thumbnail::resolve_url(file, variant, thumbs_dir);
    let style = format!("object-position: {}", tile.crop.as_css());
    let mut class = String::from("tile");
    if tile.badge {
        class.push_str(" r18");
    }
    if tile.blurred {
        class.push_str(" blurred");
    }
    html! {
        button class=(class) type="button"
            data-image-index=(tile.image_index)
            data-slide-restricted=[positions.restricted]
            data-slide-inclusive=(positions.inclusive)
        {
            img src=(src) alt=(image_alt(project, file)) loading="lazy" style=(style)
                width=[file.width] height=[file.height]
                data-original=(file.path)
                onerror="if(this.src!==this.dataset.original)this.src=this.dataset.original";
            @if tile.badge {
                span.badge { "R18" }
            }
            @if let Some(n) = tile.overflow {
                span.overflow { "+" (n) }
            }
        }
    }
}

fn render_fonts_index(page: &PageContext) -> Markup {
    let fonts = &page.config.fonts;
    let content = html! {
        (top_bar("/fonts/"))
        (fonts_sub_nav(fonts, "/fonts/"))
        main.fonts-page {
            header.fonts-header {
                h1 { "字體作品集" }
                p { "這裡收錄了我設計與參與開發的字體作品，每個作品都承載著不同的故事與理念。" }
            }
            div.font-grid {
                @for font in fonts {
                    a.font-card href=(font_route(font)) {
                        h2 { (font.title) }
                        p { (font.summary) }
                    }
                }
            }
        }
    };
    base_document(
        page,
        &format!("字體作品集 - {}", page.config.site.title),
        Some("fonts"),
        content,
    )
}

fn render_font_page(page: &PageContext, font: &FontEntry) -> Markup {
    let route = font_route(font);
    let content = html! {
        (top_bar(&route))
        (fonts_sub_nav(&page.config.fonts, &route))
        main.font-page {
            a.back-link href="/fonts/" { "‹ 返回字體作品集" }
            h1 { (font.title) }
            p.font-description { (font.description) }
            div.specimen {
                iframe src=(font.url) title=(font.title)
                    allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                    allowfullscreen {}
            }
        }
    };
    base_document(
        page,
        &format!("{} - 千秋的字體作品", font.title),
        Some("fonts"),
        content,
    )
}

fn render_links(page: &PageContext) -> Markup {
    let site = &page.config.site;
    let content = html! {
        (cover(&site.cover_image, html! {
            div.profile {
                img.profile-image src=(site.profile_image) alt="Icon" width="100" height="100";
                div.profile-name { (page.config.gallery.default_author) }
            }
            div.link-buttons {
                @for link in &page.config.links {
                    @let external = link.url.starts_with("http");
                    a.link-button href=(link.url)
                        style=[link.background.as_ref().map(|b| format!("background: {b}"))]
                        target=[external.then_some("_blank")]
                        rel=[external.then_some("noopener")]
                    { (link.label) }
                }
            }
        }))
    };
    base_document(page, &site.title, Some("links"), content)
}

// ============================================================================
// Tests
// ============================================================================
