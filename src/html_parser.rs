use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Hosting domains the site builder serves page assets from.
pub const PLATFORM_HOSTS: [&str; 3] = [
    "framerusercontent.com",
    "fonts.gstatic.com",
    "app.framerstatic.com",
];

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "svg", "gif", "webp", "avif", "ico"];
const FONT_EXTENSIONS: [&str; 5] = ["woff", "woff2", "ttf", "eot", "otf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Stylesheet,
    Script,
    Image,
    Font,
}

impl ResourceType {
    /// Subdirectory of the output root the category is stored in.
    pub fn subdirectory(&self) -> &'static str {
        match self {
            ResourceType::Stylesheet => "assets/css",
            ResourceType::Script => "assets/js",
            ResourceType::Image => "assets/images",
            ResourceType::Font => "assets/fonts",
        }
    }

    pub fn all() -> [ResourceType; 4] {
        [
            ResourceType::Stylesheet,
            ResourceType::Script,
            ResourceType::Image,
            ResourceType::Font,
        ]
    }
}

/// A reference found in the markup.
///
/// `original_url` is the text exactly as it appears in the HTML; `absolute_url`
/// is what gets fetched and what the download cache is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLink {
    pub original_url: String,
    pub absolute_url: String,
    pub resource_type: ResourceType,
}

/// Result of pulling the `<style>` blocks out of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineStyles {
    pub html: String,
    pub blocks: Vec<String>,
}

impl InlineStyles {
    pub fn combined(&self) -> String {
        self.blocks.join("\n")
    }
}

#[derive(Clone)]
pub struct HtmlParser {
    base_url: Url,
    style_block: Regex,
    module_href: Regex,
    script_src: Regex,
    img_src: Regex,
    icon_href: Regex,
    css_url: Regex,
    font_url: Regex,
    platform_urls: Vec<Regex>,
}

impl HtmlParser {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Failed to parse base URL: {}", base_url))?;

        let platform_urls = PLATFORM_HOSTS
            .iter()
            .map(|host| Regex::new(&format!(r#"https://{}/[^"'\s<>)]+"#, regex::escape(host))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url,
            style_block: Regex::new(r"<style[^>]*>([^<]+)</style>")?,
            module_href: Regex::new(r#"href="([^"]+\.mjs[^"]*)""#)?,
            script_src: Regex::new(r#"<script[^>]+src="([^"]+)""#)?,
            img_src: Regex::new(r#"<img[^>]+src="([^"]+)""#)?,
            icon_href: Regex::new(r#"<link[^>]+rel="icon"[^>]+href="([^"]+)""#)?,
            css_url: Regex::new(r#"url\(["']?([^"')\s]+)["']?\)"#)?,
            font_url: Regex::new(r"url\(([^)]+\.woff2?[^)]*)\)")?,
            platform_urls,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Removes every non-empty `<style>` block and returns their contents in order.
    pub fn extract_inline_styles(&self, html_content: &str) -> InlineStyles {
        let blocks: Vec<String> = self
            .style_block
            .captures_iter(html_content)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect();

        let html = if blocks.is_empty() {
            html_content.to_string()
        } else {
            self.style_block.replace_all(html_content, "").into_owned()
        };

        InlineStyles { html, blocks }
    }

    /// `href` values pointing at module scripts.
    pub fn extract_module_scripts(&self, html_content: &str) -> Vec<ResourceLink> {
        self.collect(&self.module_href, html_content, ResourceType::Script)
    }

    pub fn extract_script_sources(&self, html_content: &str) -> Vec<ResourceLink> {
        self.collect(&self.script_src, html_content, ResourceType::Script)
    }

    pub fn extract_images(&self, html_content: &str) -> Vec<ResourceLink> {
        self.collect(&self.img_src, html_content, ResourceType::Image)
    }

    pub fn extract_icons(&self, html_content: &str) -> Vec<ResourceLink> {
        self.collect(&self.icon_href, html_content, ResourceType::Image)
    }

    /// `url(...)` references that are already absolute. Relative ones are left alone.
    pub fn extract_background_images(&self, html_content: &str) -> Vec<ResourceLink> {
        self.collect(&self.css_url, html_content, ResourceType::Image)
            .into_iter()
            .filter(|r| r.original_url.starts_with("http"))
            .collect()
    }

    pub fn extract_fonts(&self, html_content: &str) -> Vec<ResourceLink> {
        let mut seen = HashSet::new();
        self.font_url
            .captures_iter(html_content)
            .filter_map(|cap| cap.get(1))
            .map(|m| strip_quotes(m.as_str()))
            .filter(|raw| seen.insert(raw.to_string()))
            .filter_map(|raw| self.create_resource_link(raw, ResourceType::Font))
            .collect()
    }

    /// Absolute URLs on the platform's hosting domains, wherever they appear.
    pub fn extract_platform_resources(&self, html_content: &str) -> Vec<ResourceLink> {
        let mut seen = HashSet::new();
        let mut resources = Vec::new();

        for pattern in &self.platform_urls {
            for m in pattern.find_iter(html_content) {
                let raw = match m.as_str().find("&quot;") {
                    Some(idx) => &m.as_str()[..idx],
                    None => m.as_str(),
                };
                if !seen.insert(raw.to_string()) {
                    continue;
                }
                let resource_type = classify_by_extension(raw);
                if let Some(resource) = self.create_resource_link(raw, resource_type) {
                    resources.push(resource);
                }
            }
        }

        resources
    }

    fn collect(&self, pattern: &Regex, html_content: &str, resource_type: ResourceType) -> Vec<ResourceLink> {
        let mut seen = HashSet::new();
        pattern
            .captures_iter(html_content)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|raw| seen.insert(raw.to_string()))
            .filter_map(|raw| self.create_resource_link(raw, resource_type))
            .collect()
    }

    fn create_resource_link(&self, url: &str, resource_type: ResourceType) -> Option<ResourceLink> {
        if url.is_empty() || url.starts_with("data:") {
            return None;
        }

        let absolute_url = self.resolve_url(url).ok()?;

        Some(ResourceLink {
            original_url: url.to_string(),
            absolute_url,
            resource_type,
        })
    }

    /// Resolves a reference against the mirror root. Absolute references are
    /// kept verbatim apart from `&amp;` decoding so the cache sees one spelling.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        let decoded = url.replace("&amp;", "&");
        if decoded.starts_with("http") {
            Ok(decoded)
        } else {
            let joined = self
                .base_url
                .join(&decoded)
                .with_context(|| format!("Failed to resolve {} against {}", url, self.base_url))?;
            Ok(joined.to_string())
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw.trim_matches(|c: char| c == '"' || c == '\'');
    let raw = raw.strip_prefix("&quot;").unwrap_or(raw);
    raw.strip_suffix("&quot;").unwrap_or(raw)
}

/// Category of a platform-hosted URL, judged by its path's extension.
pub fn classify_by_extension(url: &str) -> ResourceType {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    let extension = match path.rsplit('/').next().and_then(|name| name.rsplit_once('.')) {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return ResourceType::Image,
    };

    match extension.as_str() {
        "css" => ResourceType::Stylesheet,
        "js" | "mjs" => ResourceType::Script,
        ext if IMAGE_EXTENSIONS.contains(&ext) => ResourceType::Image,
        ext if FONT_EXTENSIONS.contains(&ext) => ResourceType::Font,
        _ => ResourceType::Image,
    }
}
