use std::fs;
use std::path::PathBuf;

use printpdf::{
    BuiltinFont, FontId, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg,
    Point, Pt, RawImage, RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info};

use crate::barcode::{BarcodeEncoder, TempBarcodeImage};
use crate::checksum;
use crate::config::{
    self, CardConfig, FontSource, BARCODE_BOTTOM_OFFSET_MM, BARCODE_HEIGHT_MM, BARCODE_WIDTH_MM,
    CAPTION_BOTTOM_OFFSET_MM, CAPTION_FONT_SIZE_PT, CARDS_PER_PAGE, CARD_HEIGHT_MM, CARD_WIDTH_MM,
    NAME_FONT_SIZE_PT, NAME_TOP_OFFSET_MM,
};
use crate::error::{CardError, Result};
use crate::records::Record;

// Nominal resolution used to relate barcode image pixels to page points.
const IMAGE_DPI: f32 = 150.0;

/// A fully assembled, serialized document.
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Receives the assembled document bytes. Implementations decide where
/// they end up; the pipeline only runs one after assembly has fully
/// succeeded, so a failed run never disturbs an existing output file.
pub trait DocumentSink {
    fn persist(&self, bytes: &[u8]) -> Result<()>;
}

/// Writes the document to a filesystem path.
pub struct FilesystemSink {
    path: PathBuf,
}

impl FilesystemSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FilesystemSink { path: path.into() }
    }
}

impl DocumentSink for FilesystemSink {
    fn persist(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.path, bytes)
            .map_err(|err| CardError::DocumentWrite(format!("{}: {err}", self.path.display())))?;
        info!(path = %self.path.display(), bytes = bytes.len(), "wrote output document");
        Ok(())
    }
}

// Font as resolved at assembler construction time.
enum LoadedFont {
    Builtin,
    Parsed(ParsedFont),
}

// Font as registered in one document.
enum DocFont {
    Builtin,
    External(FontId),
}

/// Lays the records out as cards on A4 pages and serializes the document.
///
/// Cards advance down the page in fixed slots, a new page starting
/// whenever the current one is full. Each card carries the record's name,
/// the rendered barcode, and the encoded number as a caption.
pub struct CardAssembler {
    config: CardConfig,
    font: LoadedFont,
}

impl CardAssembler {
    /// Resolves the configured font. A missing or unparsable font file
    /// fails here, before any page content exists.
    pub fn new(config: CardConfig) -> Result<Self> {
        let font = match &config.font {
            FontSource::Builtin => LoadedFont::Builtin,
            FontSource::File(path) => {
                let bytes = fs::read(path)
                    .map_err(|err| CardError::FontLoad(format!("{}: {err}", path.display())))?;
                let mut warnings: Vec<PdfWarnMsg> = Vec::new();
                let parsed = ParsedFont::from_bytes(&bytes, 0, &mut warnings).ok_or_else(|| {
                    CardError::FontLoad(format!("{} is not a usable font file", path.display()))
                })?;
                LoadedFont::Parsed(parsed)
            }
        };
        Ok(CardAssembler { config, font })
    }

    /// Builds the in-memory document for the given records, in order.
    ///
    /// Per record: compute the encoded number, render its barcode to a
    /// transient image, draw the name label, draw the barcode, draw the
    /// caption, delete the image. The transient image never outlives its
    /// record's iteration.
    pub fn assemble(
        &self,
        records: &[Record],
        encoder: &dyn BarcodeEncoder,
    ) -> Result<AssembledDocument> {
        let mut doc = PdfDocument::new("Barcode Cards");
        let font = match &self.font {
            LoadedFont::Builtin => DocFont::Builtin,
            LoadedFont::Parsed(parsed) => DocFont::External(doc.add_font(parsed)),
        };

        let page_width = Mm(config::A4_WIDTH_MM);
        let page_height = Mm(config::A4_HEIGHT_MM);

        let mut pages = Vec::new();
        for chunk in records.chunks(CARDS_PER_PAGE) {
            let mut ops = Vec::new();
            for (slot, record) in chunk.iter().enumerate() {
                self.draw_card(&mut doc, &mut ops, &font, slot, record, encoder)?;
            }
            pages.push(PdfPage::new(page_width, page_height, ops));
        }
        // An empty record set still produces a (blank) document.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_width, page_height, Vec::new()));
        }

        let page_count = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        info!(
            records = records.len(),
            pages = page_count,
            "assembled document"
        );
        Ok(AssembledDocument { bytes, page_count })
    }

    fn draw_card(
        &self,
        doc: &mut PdfDocument,
        ops: &mut Vec<Op>,
        font: &DocFont,
        slot: usize,
        record: &Record,
        encoder: &dyn BarcodeEncoder,
    ) -> Result<()> {
        let payload = checksum::encoded_number(&record.number)?;

        let image_path = self
            .config
            .scratch_dir
            .join(format!("barcode_{}.png", record.number));
        let temp = TempBarcodeImage::render(encoder, &payload, image_path)?;

        let (card_x, card_y) = card_slot_origin(slot);
        let center_x = card_x + CARD_WIDTH_MM / 2.0;

        // Name label near the top edge of the card.
        ops.extend(text_ops(
            font,
            &record.name,
            NAME_FONT_SIZE_PT,
            centered_text_x(&record.name, NAME_FONT_SIZE_PT, center_x),
            Mm(card_y + CARD_HEIGHT_MM - NAME_TOP_OFFSET_MM).into_pt(),
        ));

        // Barcode image, scaled into its fixed box.
        let dynamic = image::open(temp.path())
            .map_err(|err| CardError::BarcodeEncode(format!("failed to read barcode image: {err}")))?;
        let rgb = dynamic.to_rgb8();
        let (img_width, img_height) = rgb.dimensions();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: img_width as usize,
            height: img_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        let native_width_pt = img_width as f32 / IMAGE_DPI * 72.0;
        let native_height_pt = img_height as f32 / IMAGE_DPI * 72.0;
        let scale_x = Mm(BARCODE_WIDTH_MM).into_pt().0 / native_width_pt;
        let scale_y = Mm(BARCODE_HEIGHT_MM).into_pt().0 / native_height_pt;

        ops.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Mm(center_x - BARCODE_WIDTH_MM / 2.0).into_pt()),
                translate_y: Some(Mm(card_y + BARCODE_BOTTOM_OFFSET_MM).into_pt()),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        });

        // Encoded number as a caption beneath the barcode.
        ops.extend(text_ops(
            font,
            &payload,
            CAPTION_FONT_SIZE_PT,
            centered_text_x(&payload, CAPTION_FONT_SIZE_PT, center_x),
            Mm(card_y + CAPTION_BOTTOM_OFFSET_MM).into_pt(),
        ));

        debug!(name = %record.name, slot, "drew card");
        // `temp` drops here, removing the transient image before the next
        // record (which may reuse the same filename) is processed.
        Ok(())
    }
}

/// Bottom-left corner of a card slot, in mm from the page origin. Cards
/// are centered horizontally and stacked top to bottom with even spacing.
fn card_slot_origin(slot: usize) -> (f32, f32) {
    let margin_left = (config::A4_WIDTH_MM - CARD_WIDTH_MM) / 2.0;
    let spacing = (config::A4_HEIGHT_MM - CARD_HEIGHT_MM * CARDS_PER_PAGE as f32)
        / (CARDS_PER_PAGE as f32 + 1.0);
    let y = config::A4_HEIGHT_MM - (slot as f32 + 1.0) * (spacing + CARD_HEIGHT_MM);
    (margin_left, y)
}

// Approximate horizontal centering: average glyph width is roughly
// 0.50 * font_size in pt for the fonts in use.
fn centered_text_x(text: &str, font_size_pt: f32, center_x_mm: f32) -> Pt {
    let estimated_width_pt = 0.5 * font_size_pt * text.chars().count() as f32;
    Pt(Mm(center_x_mm).into_pt().0 - estimated_width_pt / 2.0)
}

fn text_ops(font: &DocFont, text: &str, font_size_pt: f32, x: Pt, y: Pt) -> Vec<Op> {
    let mut ops = vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point { x, y },
        },
    ];
    match font {
        DocFont::Builtin => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(font_size_pt),
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font: BuiltinFont::Helvetica,
            });
        }
        DocFont::External(font_id) => {
            ops.push(Op::SetFontSize {
                size: Pt(font_size_pt),
                font: font_id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: font_id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
    ops
}
