use std::path::PathBuf;

// A4 dimensions in mm
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

// Business card dimensions in mm
pub const CARD_WIDTH_MM: f32 = 90.0;
pub const CARD_HEIGHT_MM: f32 = 50.0;

// Card slots per page, stacked top to bottom
pub const CARDS_PER_PAGE: usize = 4;

// Barcode placement within a card, in mm
pub const BARCODE_WIDTH_MM: f32 = 70.0;
pub const BARCODE_HEIGHT_MM: f32 = 20.0;
pub const BARCODE_BOTTOM_OFFSET_MM: f32 = 10.0;

// Text placement within a card
pub const NAME_FONT_SIZE_PT: f32 = 24.0;
pub const NAME_TOP_OFFSET_MM: f32 = 12.0;
pub const CAPTION_FONT_SIZE_PT: f32 = 8.0;
pub const CAPTION_BOTTOM_OFFSET_MM: f32 = 4.0;

/// Where the label font comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// TrueType font file, embedded into the output document.
    File(PathBuf),
    /// Built-in Helvetica, no font file required.
    Builtin,
}

/// Run configuration. The defaults reproduce the fixed paths of the
/// original program; the CLI overrides them per invocation.
#[derive(Debug, Clone)]
pub struct CardConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub font: FontSource,
    /// Directory that holds the transient per-record barcode images.
    pub scratch_dir: PathBuf,
}

impl Default for CardConfig {
    fn default() -> Self {
        CardConfig {
            input_path: PathBuf::from("data/name and numbers.csv"),
            output_path: PathBuf::from("cards.pdf"),
            font: FontSource::File(PathBuf::from("data/font.ttf")),
            scratch_dir: PathBuf::from("."),
        }
    }
}
