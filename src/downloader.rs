use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::fetcher::{Fetcher, HttpFetcher};
use crate::file_manager::{derive_filename, FileManager, INLINE_STYLES_FILE};
use crate::html_parser::{HtmlParser, ResourceLink, ResourceType};
use crate::rewriter;

pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(10);
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Outcome of a completed mirror run.
#[derive(Debug, Clone)]
pub struct MirrorReport {
    pub html: String,
    pub downloaded: usize,
    pub failed: Vec<String>,
}

pub struct WebsiteMirror<F: Fetcher = HttpFetcher> {
    base_url: String,
    fetcher: F,
    file_manager: FileManager,
    html_parser: HtmlParser,
    resource_timeout: Duration,
    downloaded: HashMap<String, String>,
    failed: Vec<String>,
    progress_bar: ProgressBar,
}

impl WebsiteMirror<HttpFetcher> {
    pub fn with_http(base_url: &str, output_dir: &Path, user_agent: &str, resource_timeout: Duration) -> Result<Self> {
        let fetcher = HttpFetcher::new(user_agent)?;
        Ok(Self::new(base_url, output_dir, fetcher)?.resource_timeout(resource_timeout))
    }
}

impl<F: Fetcher> WebsiteMirror<F> {
    pub fn new(base_url: &str, output_dir: &Path, fetcher: F) -> Result<Self> {
        let html_parser = HtmlParser::new(base_url)?;
        let file_manager = FileManager::new(output_dir)?;

        let progress_bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            progress_bar.set_style(style);
        }

        Ok(Self {
            base_url: base_url.to_string(),
            fetcher,
            file_manager,
            html_parser,
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT,
            downloaded: HashMap::new(),
            failed: Vec::new(),
            progress_bar,
        })
    }

    pub fn resource_timeout(mut self, timeout: Duration) -> Self {
        self.resource_timeout = timeout;
        self
    }

    pub fn downloaded(&self) -> &HashMap<String, String> {
        &self.downloaded
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub async fn mirror_website(&mut self) -> Result<MirrorReport> {
        self.say(format!("🚀 Starting mirror of: {}", self.base_url.blue()));
        self.say(format!("📁 Output directory: {:?}", self.file_manager.base_dir()));
        self.progress_bar.enable_steady_tick(SPINNER_TICK);

        self.say("📥 Downloading main HTML...".to_string());
        self.progress_bar.set_message(format!("Downloading: {}", self.base_url));
        let page = self
            .fetcher
            .fetch_page(&self.base_url)
            .await
            .with_context(|| format!("Failed to download main page {}", self.base_url))?;
        if !page.status.is_success() {
            self.warn(format!("⚠️  HTTP {} for {}, mirroring the returned page anyway", page.status, self.base_url));
        }
        let mut html_content = String::from_utf8_lossy(&page.body).into_owned();

        self.say("\n🎨 Extracting CSS...".to_string());
        self.extract_inline_styles(&mut html_content)?;

        self.say("\n📜 Extracting JavaScript modules...".to_string());
        let modules = self.html_parser.extract_module_scripts(&html_content);
        self.process_resources(&mut html_content, modules).await?;
        let scripts = self.html_parser.extract_script_sources(&html_content);
        self.process_resources(&mut html_content, scripts).await?;

        self.say("\n🖼️  Extracting images...".to_string());
        let images = self.html_parser.extract_images(&html_content);
        self.process_resources(&mut html_content, images).await?;
        let icons = self.html_parser.extract_icons(&html_content);
        self.process_resources(&mut html_content, icons).await?;
        let backgrounds = self.html_parser.extract_background_images(&html_content);
        self.process_resources(&mut html_content, backgrounds).await?;

        self.say("\n🔤 Extracting fonts...".to_string());
        let fonts = self.html_parser.extract_fonts(&html_content);
        self.process_resources(&mut html_content, fonts).await?;

        self.say("\n🧩 Checking for platform resources...".to_string());
        let platform = self.html_parser.extract_platform_resources(&html_content);
        self.process_resources(&mut html_content, platform).await?;

        self.say("\n💾 Saving modified HTML...".to_string());
        let index_path = self.file_manager.save_index(&html_content)?;
        self.progress_bar.finish_and_clear();

        println!("\n✅ Download complete! Files saved to {:?}", self.file_manager.base_dir());
        println!("📊 Total resources downloaded: {}", self.downloaded.len());
        if !self.failed.is_empty() {
            println!(
                "{}",
                format!("⚠️  {} resource(s) kept their remote URL", self.failed.len()).yellow()
            );
        }
        println!("📄 Index: {:?}", index_path);

        Ok(MirrorReport {
            html: html_content,
            downloaded: self.downloaded.len(),
            failed: self.failed.clone(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.progress_bar.is_finished()
    }

    /// Prints above the spinner so the two don't overwrite each other.
    fn say(&self, line: String) {
        self.progress_bar.suspend(|| println!("{}", line));
    }

    fn warn(&self, line: String) {
        self.progress_bar.suspend(|| eprintln!("{}", line.yellow()));
    }

    /// Moves all `<style>` blocks into one stylesheet and links it from the head.
    fn extract_inline_styles(&self, html_content: &mut String) -> Result<()> {
        let styles = self.html_parser.extract_inline_styles(html_content);
        if styles.blocks.is_empty() {
            return Ok(());
        }

        let href = self.file_manager.save_asset(
            ResourceType::Stylesheet,
            INLINE_STYLES_FILE,
            styles.combined().as_bytes(),
        )?;
        self.say(format!("✅ Moved {} inline style block(s) to {}", styles.blocks.len(), href));

        *html_content = styles.html;
        rewriter::inject_stylesheet_link(html_content, &href);
        Ok(())
    }

    async fn process_resources(&mut self, html_content: &mut String, resources: Vec<ResourceLink>) -> Result<()> {
        for resource in resources {
            let local_path = self
                .download_resource(&resource.absolute_url, resource.resource_type)
                .await?;
            if local_path != resource.absolute_url {
                rewriter::substitute(html_content, &resource.original_url, &local_path);
            }
        }
        Ok(())
    }

    /// Downloads `url` into its category directory and returns the local path.
    ///
    /// Cached URLs return their earlier path without a request. A failed fetch
    /// returns `url` itself; only filesystem errors are propagated.
    pub async fn download_resource(&mut self, url: &str, resource_type: ResourceType) -> Result<String> {
        if let Some(local_path) = self.downloaded.get(url) {
            return Ok(local_path.clone());
        }

        self.say(format!("⬇️  Downloading: {}", url));
        self.progress_bar.set_message(format!("Downloading: {}", url));

        let fetched = match self.fetcher.fetch(url, Some(self.resource_timeout)).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.warn(format!("❌ Error downloading {}: {:#}", url, e));
                self.failed.push(url.to_string());
                return Ok(url.to_string());
            }
        };

        let filename = derive_filename(url, resource_type, fetched.content_type.as_deref());
        let local_path = self.file_manager.save_asset(resource_type, &filename, &fetched.body)?;

        self.downloaded.insert(url.to_string(), local_path.clone());
        Ok(local_path)
    }
}
