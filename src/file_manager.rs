use anyhow::{Context, Result};
use mime::Mime;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

use crate::html_parser::ResourceType;

pub const INLINE_STYLES_FILE: &str = "inline-styles.css";
pub const INDEX_FILE: &str = "index.html";

#[derive(Clone)]
pub struct FileManager {
    base_dir: PathBuf,
}

impl FileManager {
    /// Creates the output root and its four asset subdirectories.
    pub fn new(base_dir: &Path) -> Result<Self> {
        let base_dir = base_dir.to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create base directory: {:?}", base_dir))?;

        for resource_type in ResourceType::all() {
            let dir = base_dir.join(resource_type.subdirectory());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        }

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes an asset into its category directory, replacing any file of the
    /// same name, and returns the path relative to the output root.
    pub fn save_asset(&self, resource_type: ResourceType, filename: &str, content: &[u8]) -> Result<String> {
        let relative_path = format!("{}/{}", resource_type.subdirectory(), filename);
        self.write_file(&self.base_dir.join(&relative_path), content)?;
        Ok(relative_path)
    }

    pub fn save_index(&self, html_content: &str) -> Result<PathBuf> {
        let path = self.base_dir.join(INDEX_FILE);
        self.write_file(&path, html_content.as_bytes())?;
        Ok(path)
    }

    fn write_file(&self, file_path: &Path, content: &[u8]) -> Result<()> {
        let mut file = fs::File::create(file_path)
            .with_context(|| format!("Failed to create file: {:?}", file_path))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }
}

/// Local filename for a downloaded resource.
///
/// Uses the URL's last path segment, or the first 8 hex digits of the URL's
/// SHA-256 when that segment is empty. An extension is appended only when the
/// name has none.
pub fn derive_filename(url: &str, resource_type: ResourceType, content_type: Option<&str>) -> String {
    let mut filename = last_path_segment(url)
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| url_hash(url));

    if !filename.contains('.') {
        if let Some(extension) = infer_extension(resource_type, content_type) {
            filename.push('.');
            filename.push_str(extension);
        }
    }

    filename
}

pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..8].to_string()
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    Some(segment.to_string())
}

fn infer_extension(resource_type: ResourceType, content_type: Option<&str>) -> Option<&'static str> {
    match resource_type {
        ResourceType::Stylesheet => Some("css"),
        ResourceType::Script => Some("js"),
        ResourceType::Image => {
            let essence = content_essence(content_type);
            if essence.contains("png") {
                Some("png")
            } else if essence.contains("jpg") || essence.contains("jpeg") {
                Some("jpg")
            } else if essence.contains("svg") {
                Some("svg")
            } else {
                Some("bin")
            }
        }
        ResourceType::Font => {
            let essence = content_essence(content_type);
            if essence.contains("woff2") {
                Some("woff2")
            } else if essence.contains("woff") {
                Some("woff")
            } else {
                None
            }
        }
    }
}

/// Lowercased `type/subtype` of a Content-Type header, or the raw header if it doesn't parse.
fn content_essence(content_type: Option<&str>) -> String {
    let Some(raw) = content_type else {
        return String::new();
    };
    match raw.parse::<Mime>() {
        Ok(mime) => mime.essence_str().to_ascii_lowercase(),
        Err(_) => raw.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_asset_dirs() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("public");
        FileManager::new(&root).unwrap();

        for dir in ["assets/css", "assets/js", "assets/images", "assets/fonts"] {
            assert!(root.join(dir).is_dir(), "{} was not created", dir);
        }
    }

    #[test]
    fn test_save_asset_overwrites() {
        let temp_dir = tempdir().unwrap();
        let file_manager = FileManager::new(temp_dir.path()).unwrap();

        let first = file_manager.save_asset(ResourceType::Font, "a.woff2", b"one").unwrap();
        let second = file_manager.save_asset(ResourceType::Font, "a.woff2", b"two").unwrap();

        assert_eq!(first, "assets/fonts/a.woff2");
        assert_eq!(first, second);
        assert_eq!(fs::read(temp_dir.path().join(&second)).unwrap(), b"two");
    }

    #[test]
    fn test_save_index() {
        let temp_dir = tempdir().unwrap();
        let file_manager = FileManager::new(temp_dir.path()).unwrap();

        let path = file_manager.save_index("<html></html>").unwrap();
        assert_eq!(path, temp_dir.path().join("index.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_derive_filename_from_path() {
        let cases = vec![
            ("https://a.com/img/photo.png", ResourceType::Image, None, "photo.png"),
            ("https://a.com/img/photo.png?w=100", ResourceType::Image, None, "photo.png"),
            ("https://a.com/js/app", ResourceType::Script, None, "app.js"),
            ("https://a.com/css/site", ResourceType::Stylesheet, Some("text/css"), "site.css"),
            ("https://a.com/i/logo", ResourceType::Image, Some("image/png"), "logo.png"),
            ("https://a.com/i/logo", ResourceType::Image, Some("image/jpeg; charset=binary"), "logo.jpg"),
            ("https://a.com/i/logo", ResourceType::Image, Some("image/svg+xml"), "logo.svg"),
            ("https://a.com/i/logo", ResourceType::Image, Some("application/octet-stream"), "logo.bin"),
            ("https://a.com/i/logo", ResourceType::Image, None, "logo.bin"),
            ("https://a.com/f/inter", ResourceType::Font, Some("font/woff2"), "inter.woff2"),
            ("https://a.com/f/inter", ResourceType::Font, Some("application/font-woff"), "inter.woff"),
            ("https://a.com/f/inter", ResourceType::Font, None, "inter"),
        ];

        for (url, resource_type, content_type, expected) in cases {
            assert_eq!(derive_filename(url, resource_type, content_type), expected, "Failed for {}", url);
        }
    }

    #[test]
    fn test_derive_filename_hash_fallback() {
        let url = "https://a.com/";
        let name = derive_filename(url, ResourceType::Stylesheet, None);
        let again = derive_filename(url, ResourceType::Stylesheet, None);

        assert_eq!(name, again);
        assert_eq!(name, format!("{}.css", url_hash(url)));
        assert_eq!(url_hash(url).len(), 8);
        assert!(url_hash(url).chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(url_hash(url), url_hash("https://b.com/"));
    }
}
