//! Generates printable barcode cards from a delimited record file.
//!
//! Each input record (name, number, extra info) becomes one card in the
//! output PDF: the name as a label, an EAN-13 barcode encoding the
//! check-digit-augmented number, and the encoded number as a caption.
//! Processing is strictly sequential; the transient barcode image of a
//! record is deleted before the next record starts.

pub mod barcode;
pub mod checksum;
pub mod config;
pub mod document;
pub mod error;
pub mod records;

pub use config::{CardConfig, FontSource};
pub use document::{AssembledDocument, CardAssembler, DocumentSink, FilesystemSink};
pub use error::{CardError, Result};
pub use records::Record;

/// Outcome of a full pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    pub record_count: usize,
    pub page_count: usize,
}

/// Convenience wrapper running the whole pipeline with the default
/// EAN-13 encoder: load records, assemble the document, persist it to
/// the configured output path.
pub fn run_pipeline(config: &CardConfig) -> Result<PipelineReport> {
    let records = records::load_records(&config.input_path)?;
    let assembler = CardAssembler::new(config.clone())?;
    let assembled = assembler.assemble(&records, &barcode::Ean13Encoder::default())?;
    FilesystemSink::new(config.output_path.clone()).persist(&assembled.bytes)?;
    Ok(PipelineReport {
        record_count: records.len(),
        page_count: assembled.page_count,
    })
}
