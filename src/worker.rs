use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Renders an edge worker module that serves `html_content` at `/` and `/index.html`.
pub fn render_worker(html_content: &str) -> Result<String> {
    let embedded = serde_json::to_string(html_content).context("Failed to encode HTML as a JSON string")?;

    Ok(format!(
        r#"
// Auto-generated Worker with embedded HTML
const HTML_CONTENT = {embedded};

export default {{
  async fetch(request, env, ctx) {{
    const url = new URL(request.url);
    const pathname = url.pathname;

    if (pathname === '/' || pathname === '/index.html') {{
      return new Response(HTML_CONTENT, {{
        headers: {{
          'Content-Type': 'text/html;charset=UTF-8',
          'Cache-Control': 'public, max-age=3600',
        }},
      }});
    }}

    // Assets are not bundled into the worker.
    if (pathname.startsWith('/assets/')) {{
      return new Response('Asset not found', {{ status: 404 }});
    }}

    return new Response('Not Found', {{ status: 404 }});
  }},
}};
"#
    ))
}

/// Renders an edge worker module that forwards every request to `origin`,
/// allows any origin via CORS, and adds a default `Cache-Control` when the
/// upstream response has none.
pub fn render_proxy_worker(origin: &str) -> Result<String> {
    let origin = serde_json::to_string(origin.trim_end_matches('/'))
        .context("Failed to encode origin as a JSON string")?;

    Ok(format!(
        r#"// Edge Worker - proxy to the original site
const ORIGIN = {origin};

export default {{
  async fetch(request, env, ctx) {{
    const url = new URL(request.url);
    const targetUrl = new URL(url.pathname + url.search, ORIGIN);

    const upstream = await fetch(new Request(targetUrl, {{
      method: request.method,
      headers: request.headers,
      body: request.body,
      redirect: 'follow',
    }}));

    const response = new Response(upstream.body, {{
      status: upstream.status,
      statusText: upstream.statusText,
      headers: upstream.headers,
    }});

    response.headers.set('Access-Control-Allow-Origin', '*');
    if (!upstream.headers.get('Cache-Control')) {{
      response.headers.set('Cache-Control', 'public, max-age=3600');
    }}

    return response;
  }},
}};
"#
    ))
}

/// Writes the worker module and returns the embedded HTML size in KB.
pub fn write_worker(path: &Path, html_content: &str) -> Result<f64> {
    write_module(path, &render_worker(html_content)?)?;
    Ok(html_content.len() as f64 / 1024.0)
}

pub fn write_proxy_worker(path: &Path, origin: &str) -> Result<()> {
    write_module(path, &render_proxy_worker(origin)?)
}

fn write_module(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write worker: {:?}", path))
}
