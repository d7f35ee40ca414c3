use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use framer_mirror::{worker, MirrorCommand, WebsiteMirror};

#[tokio::main]
async fn main() -> Result<()> {
    let args = MirrorCommand::parse();

    let mut mirror = WebsiteMirror::with_http(
        &args.url,
        &args.output_dir,
        &args.user_agent,
        Duration::from_secs(args.timeout),
    )?;

    let report = mirror.mirror_website().await?;

    if let Some(path) = &args.worker {
        let size_kb = worker::write_worker(path, &report.html)?;
        println!("✅ Worker generated successfully: {:?}", path);
        println!("📦 HTML size: {:.2} KB", size_kb);
    }

    if let Some(path) = &args.proxy_worker {
        worker::write_proxy_worker(path, &args.url)?;
        println!("✅ Proxy worker generated successfully: {:?}", path);
    }

    Ok(())
}
