use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_URL: &str = "https://kind-fact-308747.framer.app/";

#[derive(Parser, Debug)]
#[command(
    name = "framer-mirror",
    about = "A CLI utility to mirror a single site-builder page into a static local copy",
    version,
    long_about = "Downloads one page's HTML together with the stylesheets, scripts, images, and fonts it references, stores them under assets/, and rewrites the HTML to point at the local copies."
)]
pub struct MirrorCommand {
    /// The URL of the page to mirror
    #[arg(default_value = DEFAULT_URL)]
    pub url: String,

    /// Output directory for the mirrored page
    #[arg(short, long, default_value = "./public")]
    pub output_dir: PathBuf,

    /// Timeout for each resource download in seconds
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// User agent string to use for requests
    #[arg(long, default_value = "FramerMirror/1.0")]
    pub user_agent: String,

    /// Also generate an edge worker module that serves the mirrored HTML
    #[arg(long, value_name = "PATH")]
    pub worker: Option<PathBuf>,

    /// Also generate an edge worker module that proxies requests to the mirrored site
    #[arg(long, value_name = "PATH")]
    pub proxy_worker: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = MirrorCommand::try_parse_from(["framer-mirror"]).unwrap();

        assert_eq!(args.url, DEFAULT_URL);
        assert_eq!(args.output_dir, PathBuf::from("./public"));
        assert_eq!(args.timeout, 10);
        assert_eq!(args.user_agent, "FramerMirror/1.0");
        assert!(args.worker.is_none());
        assert!(args.proxy_worker.is_none());
    }

    #[test]
    fn test_parse_all_args() {
        let args = MirrorCommand::try_parse_from([
            "framer-mirror",
            "https://example.com/",
            "-o", "./output",
            "-t", "30",
            "--user-agent", "Test/2.0",
            "--worker", "src/worker-generated.js",
            "--proxy-worker", "src/worker.js",
        ])
        .unwrap();

        assert_eq!(args.url, "https://example.com/");
        assert_eq!(args.output_dir, PathBuf::from("./output"));
        assert_eq!(args.timeout, 30);
        assert_eq!(args.user_agent, "Test/2.0");
        assert_eq!(args.worker, Some(PathBuf::from("src/worker-generated.js")));
        assert_eq!(args.proxy_worker, Some(PathBuf::from("src/worker.js")));
    }

    #[test]
    fn test_parse_zero_timeout() {
        let result = MirrorCommand::try_parse_from(["framer-mirror", "-t", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_timeout() {
        let result = MirrorCommand::try_parse_from(["framer-mirror", "--timeout", "soon"]);
        assert!(result.is_err());
    }
}
