use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use barcode_card_generator::barcode::Ean13Encoder;
use barcode_card_generator::document::DocumentSink;
use barcode_card_generator::error::Result;
use barcode_card_generator::records::load_records;
use barcode_card_generator::{CardAssembler, CardConfig, FilesystemSink, FontSource};

/// CSV to Barcode Card PDF Generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delimited input file with name, number and extra info columns
    #[arg(short, long, default_value = "data/name and numbers.csv")]
    input: String,

    /// Output PDF file path
    #[arg(short, long, default_value = "cards.pdf")]
    output: String,

    /// TrueType font used for the card labels
    #[arg(short, long, default_value = "data/font.ttf")]
    font: String,

    /// Use the built-in Helvetica font instead of an external TTF
    #[arg(long, default_value_t = false)]
    builtin_font: bool,

    /// Directory for the transient barcode images
    #[arg(short, long, default_value = ".")]
    scratch_dir: String,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = CardConfig {
        input_path: args.input.clone().into(),
        output_path: args.output.clone().into(),
        font: if args.builtin_font {
            FontSource::Builtin
        } else {
            FontSource::File(args.font.clone().into())
        },
        scratch_dir: args.scratch_dir.clone().into(),
    };

    println!("Barcode Card Generator");
    println!("======================");
    println!("Input file:      {}", args.input);
    println!("Output PDF:      {}", args.output);
    println!(
        "Font:            {}",
        if args.builtin_font {
            "built-in Helvetica"
        } else {
            args.font.as_str()
        }
    );
    println!();

    let records = load_records(&config.input_path)?;

    println!("Generating cards for:");
    for record in &records {
        println!("- {}: {}", record.name, record.number);
    }
    println!();

    let assembler = CardAssembler::new(config.clone())?;
    let assembled = assembler.assemble(&records, &Ean13Encoder::default())?;
    FilesystemSink::new(config.output_path.clone()).persist(&assembled.bytes)?;

    println!("✓ Cards generated successfully!");
    println!("  PDF:    {}", args.output);
    println!("  Pages:  {}", assembled.page_count);

    Ok(())
}
