pub mod cli;
pub mod downloader;
pub mod fetcher;
pub mod file_manager;
pub mod html_parser;
pub mod rewriter;
pub mod worker;

// Re-export main types for convenience
pub use cli::MirrorCommand;
pub use downloader::{MirrorReport, WebsiteMirror};
pub use fetcher::{FetchedResource, Fetcher, HttpFetcher};
pub use file_manager::{derive_filename, FileManager};
pub use html_parser::{HtmlParser, ResourceLink, ResourceType};
