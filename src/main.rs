use clap::{ArgAction, Parser, ValueEnum};
use doseocr::{
    parse_dose_report, BitDepth, ConsoleTrainer, DoseOcr, GlyphDictionary, OcrConfig, SourceInfo,
    Vendor,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doseocr")]
#[command(about = "doseocr - read CT dose screens into structured dose reports", long_about = None)]
struct Cli {
    /// Glyph catalog (JSON) to load
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Dose screen vendor; otherwise identified from --manufacturer and friends
    #[arg(long, value_enum)]
    vendor: Option<VendorArg>,

    /// Manufacturer of the source image, for vendor identification
    #[arg(long)]
    manufacturer: Option<String>,

    /// Series description of the source image
    #[arg(long, default_value = "")]
    series_description: String,

    /// Image type value of the source image (repeatable)
    #[arg(long = "image-type")]
    image_types: Vec<String>,

    /// Identifier of the report scope, such as the study instance UID
    #[arg(long, default_value = "")]
    scope: String,

    /// Input is a 1-bit overlay rather than an 8-bit rendering
    #[arg(long)]
    overlay: bool,

    /// Horizontal gap tolerance override, in pixels
    #[arg(long)]
    hgap: Option<u32>,

    /// Vertical gap tolerance override, in pixels
    #[arg(long)]
    vgap: Option<u32>,

    /// Ask on the console for every unknown glyph
    #[arg(long)]
    train: bool,

    /// Write the glyph catalog here after the run
    #[arg(long)]
    save_catalog: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Dose screen pages, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum VendorArg {
    Ge,
    Siemens,
    Toshiba,
}

impl From<VendorArg> for Vendor {
    fn from(arg: VendorArg) -> Self {
        match arg {
            VendorArg::Ge => Vendor::Ge,
            VendorArg::Siemens => Vendor::Siemens,
            VendorArg::Toshiba => Vendor::Toshiba,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    /// JSON dose report
    Json,
    /// Human-readable dose report
    Text,
    /// Recognized lines only, words separated by tabs
    Lines,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let vendor = match (cli.vendor, &cli.manufacturer) {
        (Some(v), _) => Some(Vendor::from(v)),
        (None, Some(manufacturer)) => Some(Vendor::identify(&SourceInfo {
            manufacturer: manufacturer.clone(),
            series_description: cli.series_description.clone(),
            image_types: cli.image_types.clone(),
        })?),
        (None, None) => None,
    };
    if vendor.is_none() && cli.format != OutputFormat::Lines {
        return Err("a vendor is required: pass --vendor or --manufacturer".into());
    }

    // Configure recognition
    let mut cfg = vendor.map(OcrConfig::for_vendor).unwrap_or_default();
    if let Some(h) = cli.hgap {
        cfg.segment.horizontal_gap_tolerance = h;
    }
    if let Some(v) = cli.vgap {
        cfg.segment.vertical_gap_tolerance = v;
    }
    if cli.overlay {
        cfg.bit_depth = BitDepth::One;
    }

    let dictionary = match &cli.catalog {
        Some(path) => GlyphDictionary::load(path)?,
        None => {
            if !cli.train {
                warn!("No glyph catalog given; nothing will be recognized");
            }
            GlyphDictionary::new()
        }
    };
    let mut ocr = DoseOcr::new(cfg, dictionary);

    // Run OCR
    let masks = ocr.load_pages(&cli.images)?;
    let result = if cli.train {
        ocr.train_pages(&masks, ConsoleTrainer::stdio())
            .map(|(output, _)| output)
    } else {
        ocr.read_pages(&masks)
    };

    // Glyphs learned before a failure are kept.
    if let Some(path) = &cli.save_catalog {
        if ocr.dictionary.is_modified() || cli.catalog.as_ref() != Some(path) {
            ocr.dictionary.save(path)?;
        } else {
            info!("Catalog unchanged, not saving {}", path.display());
        }
    }
    let output = result?;

    // Output results
    let vendor = match vendor {
        Some(v) if cli.format != OutputFormat::Lines => v,
        _ => {
            for line in &output.lines {
                println!("{}", line);
            }
            return Ok(());
        }
    };

    let report = parse_dose_report(vendor, &cli.scope, &output.lines);
    let discrepancy = report.check_total();
    if let Some(d) = &discrepancy {
        warn!("{}", d);
    }

    if cli.format == OutputFormat::Json {
        let json_output = serde_json::json!({
            "scope": report.scope,
            "vendor": vendor,
            "total_dlp": report.total_dlp,
            "acquisitions": report.acquisitions,
            "dlp_discrepancy": discrepancy,
            "skipped_pages": output.skipped_pages,
        });
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else {
        print!("{}", report);
        if let Some(d) = discrepancy {
            println!("Warning: {}", d);
        }
    }

    Ok(())
}
