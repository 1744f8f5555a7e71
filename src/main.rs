mod advisor;
mod catalog;
mod config;
mod matcher;
mod normalize;
mod ocr;
mod report;
mod sdg;

use catalog::Catalog;
use ocr::TextExtractor;
use std::io::Read;
use tracing::info;

const CONFIG_PATH: &str = ".config/receipt_carbon.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let cfg = config::Config::load_or_default(CONFIG_PATH)?;
    let catalog = match &cfg.catalog_path {
        Some(path) => {
            info!(path = %path, "Loading custom emissions catalog");
            Catalog::from_toml_file(path)?
        }
        None => Catalog::default(),
    };
    info!(entries = catalog.entries.len(), "Emissions catalog ready");

    let args: Vec<String> = std::env::args().collect();
    let lines = match args.get(1).map(String::as_str) {
        Some("scan") => {
            let image_path = args
                .get(2)
                .ok_or("Usage: receipt_carbon scan <image-file>")?;
            scan_image(&cfg, image_path).await?
        }
        Some("lines") => {
            let file = args
                .get(2)
                .ok_or("Usage: receipt_carbon lines <text-file>")?;
            info!(file = %file, "Reading receipt lines from file");
            ocr::parse_receipt_lines(&std::fs::read_to_string(file)?)
        }
        Some(other) => {
            return Err(format!(
                "Unknown command {other:?}. Usage: receipt_carbon [scan <image> | lines <file>] (default: read lines from stdin)"
            )
            .into());
        }
        None => {
            info!("Reading receipt lines from stdin");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            ocr::parse_receipt_lines(&text)
        }
    };

    let report = report::build_report(&catalog, &lines)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(
        total_carbon = report.total_carbon,
        comparison = %report.comparison,
        "{}", report.carbon_level.message()
    );

    Ok(())
}

/// Run the external vision OCR over a receipt photo and return its
/// product lines.
async fn scan_image(
    cfg: &config::Config,
    image_path: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let path = std::path::Path::new(image_path);
    let bytes = std::fs::read(path)?;
    info!(path = %image_path, bytes = bytes.len(), "Scanning receipt image");

    let client = ocr::VisionOcrClient::new(&cfg.ocr)?;
    let lines = client.extract_lines(&bytes, ocr::mime_type_for(path)).await?;

    for line in &lines {
        info!(line = %line, "Extracted");
    }
    Ok(lines)
}
