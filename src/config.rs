//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` file at the
//! content root. Stock defaults describe the live site; the user file only
//! needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "千秋稻荷社 - Chiaki Inari Shrine"
//! url = "https://chiaki.ch/"
//! language = "zh-TW"
//!
//! [gallery]
//! default_author = "涼風千秋"   # Used when a folder has no AUTHOR part
//! r18_suffix = "_r18"           # Stem suffix that marks adult content
//! assets_dir = "assets/character"
//!
//! [thumbnails]
//! large = 1200                  # Long edge of the large thumbnail
//! small = 400                   # Edge of the square small thumbnail
//! quality = 80                  # JPEG quality (1-100)
//!
//! [avatar]
//! model = "/assets/about/chiakiL2Dv2/chiaki.model3.json"
//! expressions = ["wtm.exp3.json", "shy.exp3.json", "scare.exp3.json"]
//!
//! [theme.light]
//! background = "#1a1a2e"
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//!
//! [[fonts]]
//! id = "akitra"
//! title = "台鐵客貨車字體"
//! url = "https://chiaki.uk/akitra"
//! ```
//!
//! Array tables (`[[fonts]]`, `[[links]]`, `[[concept_art]]`) replace the
//! stock list as a whole. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults matching the live site. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page metadata (title, description, canonical URL).
    pub site: SiteMeta,
    /// Asset index conventions.
    pub gallery: GalleryConfig,
    /// Thumbnail sizes and encoding quality.
    pub thumbnails: ThumbnailsConfig,
    /// Avatar viewer tuning, serialized into the page for the browser glue.
    pub avatar: AvatarConfig,
    /// Colors and layout widths.
    pub theme: ThemeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Font showcase pages, one route per entry.
    pub fonts: Vec<FontEntry>,
    /// Buttons on the links page.
    pub links: Vec<LinkEntry>,
    /// Concept art shown on the character page.
    pub concept_art: Vec<ConceptArt>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteMeta::default(),
            gallery: GalleryConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            avatar: AvatarConfig::default(),
            theme: ThemeConfig::default(),
            processing: ProcessingConfig::default(),
            fonts: default_fonts(),
            links: default_links(),
            concept_art: default_concept_art(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.quality == 0 || self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.large == 0 || self.thumbnails.small == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.large and thumbnails.small must be non-zero".into(),
            ));
        }
        if self.thumbnails.small > self.thumbnails.large {
            return Err(ConfigError::Validation(
                "thumbnails.small must not exceed thumbnails.large".into(),
            ));
        }
        if self.gallery.r18_suffix.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.r18_suffix must not be empty".into(),
            ));
        }
        if self.avatar.expressions.is_empty() {
            return Err(ConfigError::Validation(
                "avatar.expressions must not be empty".into(),
            ));
        }
        for (name, factor) in [
            ("avatar.mouth_lerp", self.avatar.mouth_lerp),
            ("avatar.head_lerp", self.avatar.head_lerp),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(ConfigError::Validation(format!("{name} must be in (0, 1]")));
            }
        }
        let mut ids = std::collections::HashSet::new();
        for font in &self.fonts {
            if font.id.is_empty() || font.id.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "font id '{}' must be a non-empty path segment",
                    font.id
                )));
            }
            if !ids.insert(font.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate font id '{}'",
                    font.id
                )));
            }
        }
        Ok(())
    }
}

/// Page metadata shared by every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    /// Canonical base URL, used for `og:url`.
    pub url: String,
    /// `<html lang>` value.
    pub language: String,
    /// Social preview image path.
    pub og_image: String,
    /// Cover image on the landing and links pages.
    pub cover_image: String,
    /// Round profile picture on the links page.
    pub profile_image: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "千秋稻荷社 - Chiaki Inari Shrine".to_string(),
            description: "涼風千秋的個人網站：角色介紹、作品集與字體作品。".to_string(),
            keywords: vec![
                "涼風千秋".to_string(),
                "千秋稻荷社".to_string(),
                "Chiaki".to_string(),
                "字體設計".to_string(),
            ],
            url: "https://chiaki.ch/".to_string(),
            language: "zh-TW".to_string(),
            og_image: "/assets/img/takuzosu-inari-shrine.jpg".to_string(),
            cover_image: "/assets/img/takuzosu-inari-shrine.jpg".to_string(),
            profile_image: "/assets/img/profile.jpg".to_string(),
        }
    }
}

/// Asset index conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Author used when a folder name has no `AUTHOR` part.
    pub default_author: String,
    /// Stem suffix (case-insensitive) that marks an image as adult content.
    pub r18_suffix: String,
    /// Project folders live here, relative to the content root.
    pub assets_dir: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            default_author: "涼風千秋".to_string(),
            r18_suffix: "_r18".to_string(),
            assets_dir: "assets/character".to_string(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Long edge of the large variant; images are never upscaled.
    pub large: u32,
    /// Edge of the square small variant (cover crop).
    pub small: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            large: 1200,
            small: 400,
            quality: 80,
        }
    }
}

/// Avatar viewer tuning.
///
/// Timings are in milliseconds. The whole struct is embedded as JSON on the
/// character page, so the browser glue and [`AvatarController`] read the
/// same numbers.
///
/// [`AvatarController`]: crate::avatar::AvatarController
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    /// URL of the model manifest.
    pub model: String,
    /// Expression files picked at random by the expression cycle.
    pub expressions: Vec<String>,
    /// How often the mouth-drift timer checks for a new target.
    pub mouth_check_ms: u64,
    /// Minimum time between mouth target changes.
    pub mouth_change_after_ms: u64,
    /// How often the expression timer checks for a new expression.
    pub expression_check_ms: u64,
    /// Minimum time between expressions.
    pub expression_change_after_ms: u64,
    /// Per-frame interpolation factor for the mouth.
    pub mouth_lerp: f32,
    /// Per-frame interpolation factor for the head angle.
    pub head_lerp: f32,
    /// Quiet period before a resize re-places the model.
    pub resize_debounce_ms: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            model: "/assets/about/chiakiL2Dv2/chiaki.model3.json".to_string(),
            expressions: vec![
                "wtm.exp3.json".to_string(),
                "shy.exp3.json".to_string(),
                "scare.exp3.json".to_string(),
            ],
            mouth_check_ms: 500,
            mouth_change_after_ms: 4000,
            expression_check_ms: 1000,
            expression_change_after_ms: 8000,
            mouth_lerp: 0.05,
            head_lerp: 0.02,
            resize_debounce_ms: 150,
        }
    }
}

/// Theme/layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Maximum content width (CSS value).
    pub max_width: String,
    /// Gap between gallery tiles (CSS value).
    pub tile_gap: String,
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            max_width: "1200px".to_string(),
            tile_gap: "8px".to_string(),
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background behind the cards.
    pub background: String,
    /// Card and top bar background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (dates, handles, counts).
    pub text_muted: String,
    /// Links and buttons.
    pub accent: String,
    /// Background of the R18 badge.
    pub badge: String,
    pub border: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#2d2a3e".to_string(),
            surface: "#ffffff".to_string(),
            text: "#1a202c".to_string(),
            text_muted: "#718096".to_string(),
            accent: "#dd6b20".to_string(),
            badge: "#e53e3e".to_string(),
            border: "#e2e8f0".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#171923".to_string(),
            surface: "#2d3748".to_string(),
            text: "#f7fafc".to_string(),
            text_muted: "#a0aec0".to_string(),
            accent: "#f6ad55".to_string(),
            badge: "#fc8181".to_string(),
            border: "#4a5568".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel thumbnail workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// A font showcase page at `/fonts/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontEntry {
    pub id: String,
    pub title: String,
    /// One-line blurb on the fonts index card.
    pub summary: String,
    /// Full description on the font page.
    pub description: String,
    /// Embedded specimen page.
    pub url: String,
}

/// A button on the links page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    pub label: String,
    pub url: String,
    /// CSS background for the button.
    #[serde(default)]
    pub background: Option<String>,
}

/// A concept art image with caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptArt {
    pub src: String,
    pub caption: String,
}

fn default_fonts() -> Vec<FontEntry> {
    vec![
        FontEntry {
            id: "akitra".to_string(),
            title: "台鐵客貨車字體".to_string(),
            summary: "基於台鐵客貨車表記文字設計的字體，重現台灣鐵道文化之美。".to_string(),
            description: "基於台鐵客貨車表記文字設計的字體，重現台灣鐵道文化之美。這個字體收錄了台鐵客貨車上常見的表記文字，包括車種代號、車號、載重等資訊，讓使用者能夠重現台灣鐵道文化的視覺特色。".to_string(),
            url: "https://chiaki.uk/akitra".to_string(),
        },
        FontEntry {
            id: "nixie".to_string(),
            title: "Nixie 字體".to_string(),
            summary: "靈感來自輝光管顯示器的數位字體，包含數字與特殊符號。".to_string(),
            description: "靈感來自輝光管顯示器的數位字體，包含數字與特殊符號。這個字體重現了輝光管獨特的視覺效果，適合用於數位時鐘、計數器等需要復古科技感的設計。".to_string(),
            url: "https://chiaki.uk/nixie".to_string(),
        },
        FontEntry {
            id: "huninn".to_string(),
            title: "粉圓字體".to_string(),
            summary: "在 justfont 期間製作的開源圓體字型，為台灣使用者優化設計。".to_string(),
            description: "在 justfont 期間製作的開源圓體字型，為台灣使用者優化設計。粉圓字體是一款基於 Kosugi Maru 改作的字型，針對台灣使用者的需求進行優化，包含完整的繁體中文字符集，以及優化過的排版設定。".to_string(),
            url: "https://justfont.com/huninn/".to_string(),
        },
    ]
}

fn default_links() -> Vec<LinkEntry> {
    vec![
        LinkEntry {
            label: "Plurk".to_string(),
            url: "https://www.plurk.com/akira02".to_string(),
            background: Some("#FF574D".to_string()),
        },
        LinkEntry {
            label: "Instagram".to_string(),
            url: "https://instagram.com/akisakuya".to_string(),
            background: Some(
                "linear-gradient(45deg, #f09433 0%, #e6683c 25%, #dc2743 50%, #cc2366 75%, #bc1888 100%)"
                    .to_string(),
            ),
        },
        LinkEntry {
            label: "Website".to_string(),
            url: "/".to_string(),
            background: None,
        },
    ]
}

fn default_concept_art() -> Vec<ConceptArt> {
    vec![
        ConceptArt {
            src: "/assets/about/concept1.jpg".to_string(),
            caption: "設定圖".to_string(),
        },
        ConceptArt {
            src: "/assets/about/concept2.jpg".to_string(),
            caption: "新衣裝設定圖".to_string(),
        },
        ConceptArt {
            src: "/assets/about/concept3.png".to_string(),
            caption: "生日衣裝".to_string(),
        },
    ]
}

// =============================================================================
// Loading
// =============================================================================

const CONFIG_FILE: &str = "config.toml";

/// The stock defaults as a TOML table, the base layer under user values.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` into `base` in place.
///
/// Tables merge key by key. Any other value, arrays of tables included,
/// replaces what was there.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Parse user TOML, layer it over the stock defaults and validate.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    merge_toml(&mut merged, toml::from_str(content)?);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the content root, or the stock defaults when
/// there is none.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(SiteConfig::default());
    }
    let config = parse_config(&fs::read_to_string(&path)?)?;
    tracing::debug!(path = %path.display(), "loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# chiaki-site configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the content root (content/config.toml).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site metadata
# ---------------------------------------------------------------------------
[site]
title = "千秋稻荷社 - Chiaki Inari Shrine"
description = "涼風千秋的個人網站：角色介紹、作品集與字體作品。"
keywords = ["涼風千秋", "千秋稻荷社", "Chiaki", "字體設計"]
url = "https://chiaki.ch/"
language = "zh-TW"
og_image = "/assets/img/takuzosu-inari-shrine.jpg"
cover_image = "/assets/img/takuzosu-inari-shrine.jpg"
profile_image = "/assets/img/profile.jpg"

# ---------------------------------------------------------------------------
# Gallery / asset index
# ---------------------------------------------------------------------------
[gallery]
# Author used when a project folder is named DATE_TITLE.
default_author = "涼風千秋"

# Images whose filename stem ends with this suffix (any case) are adult
# content: blurred, badged and gated behind the age confirmation.
r18_suffix = "_r18"

# Project folders, relative to the content root.
assets_dir = "assets/character"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Long edge of the large thumbnail (name_thumb_large.jpg). Never upscaled.
large = 1200

# Edge of the square small thumbnail (name_thumb_small.jpg).
small = 400

# JPEG quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Avatar viewer (character page)
# ---------------------------------------------------------------------------
[avatar]
model = "/assets/about/chiakiL2Dv2/chiaki.model3.json"
expressions = ["wtm.exp3.json", "shy.exp3.json", "scare.exp3.json"]

# Timings in milliseconds.
mouth_check_ms = 500
mouth_change_after_ms = 4000
expression_check_ms = 1000
expression_change_after_ms = 8000
resize_debounce_ms = 150

# Per-frame interpolation factors, in (0, 1].
mouth_lerp = 0.05
head_lerp = 0.02

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
max_width = "1200px"
tile_gap = "8px"

[theme.light]
background = "#2d2a3e"
surface = "#ffffff"
text = "#1a202c"
text_muted = "#718096"
accent = "#dd6b20"
badge = "#e53e3e"
border = "#e2e8f0"

[theme.dark]
background = "#171923"
surface = "#2d3748"
text = "#f7fafc"
text_muted = "#a0aec0"
accent = "#f6ad55"
badge = "#fc8181"
border = "#4a5568"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel thumbnail workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Font pages (/fonts/{id}/). Listing any [[fonts]] replaces the whole list.
# ---------------------------------------------------------------------------
[[fonts]]
id = "akitra"
title = "台鐵客貨車字體"
summary = "基於台鐵客貨車表記文字設計的字體，重現台灣鐵道文化之美。"
description = "基於台鐵客貨車表記文字設計的字體，重現台灣鐵道文化之美。這個字體收錄了台鐵客貨車上常見的表記文字，包括車種代號、車號、載重等資訊，讓使用者能夠重現台灣鐵道文化的視覺特色。"
url = "https://chiaki.uk/akitra"

[[fonts]]
id = "nixie"
title = "Nixie 字體"
summary = "靈感來自輝光管顯示器的數位字體，包含數字與特殊符號。"
description = "靈感來自輝光管顯示器的數位字體，包含數字與特殊符號。這個字體重現了輝光管獨特的視覺效果，適合用於數位時鐘、計數器等需要復古科技感的設計。"
url = "https://chiaki.uk/nixie"

[[fonts]]
id = "huninn"
title = "粉圓字體"
summary = "在 justfont 期間製作的開源圓體字型，為台灣使用者優化設計。"
description = "在 justfont 期間製作的開源圓體字型，為台灣使用者優化設計。粉圓字體是一款基於 Kosugi Maru 改作的字型，針對台灣使用者的需求進行優化，包含完整的繁體中文字符集，以及優化過的排版設定。"
url = "https://justfont.com/huninn/"

# ---------------------------------------------------------------------------
# Links page buttons
# ---------------------------------------------------------------------------
[[links]]
label = "Plurk"
url = "https://www.plurk.com/akira02"
background = "#FF574D"

[[links]]
label = "Instagram"
url = "https://instagram.com/akisakuya"
background = "linear-gradient(45deg, #f09433 0%, #e6683c 25%, #dc2743 50%, #cc2366 75%, #bc1888 100%)"

[[links]]
label = "Website"
url = "/"

# ---------------------------------------------------------------------------
# Concept art on the character page
# ---------------------------------------------------------------------------
[[concept_art]]
src = "/assets/about/concept1.jpg"
caption = "設定圖"

[[concept_art]]
src = "/assets/about/concept2.jpg"
caption = "新衣裝設定圖"

[[concept_art]]
src = "/assets/about/concept3.png"
caption = "生日衣裝"
"##
}

/// Generate CSS custom properties from the theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    let vars = |c: &ColorScheme, indent: &str| {
        format!(
            "{indent}--color-bg: {};\n{indent}--color-surface: {};\n{indent}--color-text: {};\n\
             {indent}--color-text-muted: {};\n{indent}--color-accent: {};\n\
             {indent}--color-badge: {};\n{indent}--color-border: {};\n",
            c.background, c.surface, c.text, c.text_muted, c.accent, c.badge, c.border,
        )
    };
    format!(
        ":root {{\n{light}    --max-width: {max_width};\n    --tile-gap: {tile_gap};\n}}\n\n\
         @media (prefers-color-scheme: dark) {{\n    :root {{\n{dark}    }}\n}}",
        light = vars(&theme.light, "    "),
        dark = vars(&theme.dark, "        "),
        max_width = theme.max_width,
        tile_gap = theme.tile_gap,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_live_site() {
        let config = SiteConfig::default();
        assert_eq!(config.site.url, "https://chiaki.ch/");
        assert_eq!(config.site.language, "zh-TW");
        assert_eq!(config.gallery.default_author, "涼風千秋");
        assert_eq!(config.gallery.r18_suffix, "_r18");
        assert_eq!(config.gallery.assets_dir, "assets/character");
    }

    #[test]
    fn default_avatar_timings() {
        let avatar = AvatarConfig::default();
        assert_eq!(avatar.mouth_check_ms, 500);
        assert_eq!(avatar.mouth_change_after_ms, 4000);
        assert_eq!(avatar.expression_check_ms, 1000);
        assert_eq!(avatar.expression_change_after_ms, 8000);
        assert_eq!(avatar.mouth_lerp, 0.05);
        assert_eq!(avatar.head_lerp, 0.02);
        assert_eq!(avatar.expressions.len(), 3);
    }

    #[test]
    fn default_fonts_have_three_pages() {
        let ids: Vec<String> = SiteConfig::default()
            .fonts
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["akitra", "nixie", "huninn"]);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[theme.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.theme.light.background, "#fafafa");
        // Defaults preserved
        assert_eq!(config.theme.light.text, "#1a202c");
        assert_eq!(config.theme.dark.background, "#171923");
        assert_eq!(config.thumbnails.large, 1200);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.thumbnails.quality, 80);
        assert_eq!(config.fonts.len(), 3);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[gallery]
default_author = "Someone"

[thumbnails]
small = 300
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.gallery.default_author, "Someone");
        assert_eq!(config.thumbnails.small, 300);
        // Sibling keys survive the merge
        assert_eq!(config.gallery.r18_suffix, "_r18");
        assert_eq!(config.thumbnails.large, 1200);
    }

    #[test]
    fn array_tables_replace_stock_list() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[[fonts]]
id = "only"
title = "Only"
summary = "s"
description = "d"
url = "https://example.com/only"
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.fonts.len(), 1);
        assert_eq!(config.fonts[0].id, "only");
        // Other lists keep their defaults
        assert_eq!(config.links.len(), 3);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Merge tests
    // =========================================================================

    fn merged(base: &str, overlay: &str) -> toml::Value {
        let mut base: toml::Value = toml::from_str(base).unwrap();
        merge_toml(&mut base, toml::from_str(overlay).unwrap());
        base
    }

    #[test]
    fn merge_overrides_scalars_and_keeps_siblings() {
        let m = merged("a = 1\nb = 2", "a = 10\nc = 3");
        assert_eq!(m["a"].as_integer(), Some(10));
        assert_eq!(m["b"].as_integer(), Some(2));
        assert_eq!(m["c"].as_integer(), Some(3));
    }

    #[test]
    fn merge_descends_into_nested_tables() {
        let m = merged(
            "[theme.light]\nbackground = \"#000\"\ntext = \"#111\"",
            "[theme.light]\ntext = \"#222\"",
        );
        assert_eq!(m["theme"]["light"]["background"].as_str(), Some("#000"));
        assert_eq!(m["theme"]["light"]["text"].as_str(), Some("#222"));
    }

    #[test]
    fn merge_replaces_arrays() {
        let m = merged("xs = [1, 2, 3]", "xs = [9]");
        assert_eq!(m["xs"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn parse_config_applies_defaults_and_validation() {
        let config = parse_config("[site]\ntitle = \"Shrine\"").unwrap();
        assert_eq!(config.site.title, "Shrine");
        assert_eq!(config.thumbnails.large, 1200);
        assert!(matches!(
            parse_config("[thumbnails]\nsmall = 0"),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("bogus = 1");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[thumbnails]\nbogus = 1");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[avatar]\nmodle = \"x\"").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_out_of_range() {
        let mut config = SiteConfig::default();
        config.thumbnails.quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.thumbnails.quality = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_small_larger_than_large() {
        let mut config = SiteConfig::default();
        config.thumbnails.small = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_lerp_bounds() {
        let mut config = SiteConfig::default();
        config.avatar.head_lerp = 0.0;
        assert!(config.validate().is_err());
        config.avatar.head_lerp = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_duplicate_font_id() {
        let mut config = SiteConfig::default();
        let first = config.fonts[0].clone();
        config.fonts.push(first);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate font id"));
    }

    #[test]
    fn validate_empty_suffix() {
        let mut config = SiteConfig::default();
        config.gallery.r18_suffix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[thumbnails]\nquality = 200").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.site.title, defaults.site.title);
        assert_eq!(parsed.thumbnails.large, defaults.thumbnails.large);
        assert_eq!(parsed.avatar, defaults.avatar);
        assert_eq!(parsed.fonts, defaults.fonts);
        assert_eq!(parsed.links, defaults.links);
        assert_eq!(parsed.concept_art, defaults.concept_art);
        assert_eq!(parsed.theme.dark.accent, defaults.theme.dark.accent);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        for key in [
            "site",
            "gallery",
            "thumbnails",
            "avatar",
            "theme",
            "processing",
            "fonts",
            "links",
            "concept_art",
        ] {
            assert!(value.get(key).is_some(), "missing section {key}");
        }
    }

    #[test]
    fn theme_css_has_both_schemes() {
        let css = generate_theme_css(&ThemeConfig::default());
        assert!(css.contains("--color-bg: #2d2a3e"));
        assert!(css.contains("--color-bg: #171923"));
        assert!(css.contains("--max-width: 1200px"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 64),
        };
        assert_eq!(effective_threads(&config), cores);
    }
}
