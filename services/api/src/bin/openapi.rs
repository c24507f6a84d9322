//! services/api/src/bin/openapi.rs
//!
//! Writes the Campify OpenAPI document to disk. Usage: `openapi [OUT_PATH]`
//! (defaults to `openapi.json` in the working directory).

use api_lib::web::rest::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

fn write_document(doc: &utoipa::openapi::OpenApi, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(out, doc.to_pretty_json()?)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let doc = ApiDoc::openapi();
    write_document(&doc, &out)?;
    println!(
        "Wrote {} paths for {} {} to {}",
        doc.paths.paths.len(),
        doc.info.title,
        doc.info.version,
        out.display()
    );
    Ok(())
}
