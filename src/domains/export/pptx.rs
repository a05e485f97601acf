// src/domains/export/pptx.rs
//
// Renders a `SlideDeck` into an OOXML presentation (16:9). The deck model is
// the source of truth for ordering and placeholder layout; this module only
// turns it into parts inside the zip container. Placeholder geometry is
// fixed: occupied slots draw the image contained within the placeholder
// bounds, empty slots draw the pending-evidence marker at the same position.

use crate::domains::export::slides::{
    CoverSlide, OverviewSlide, Slide, SlideDeck, StageSlide, DECK_HEADER, PENDING_EVIDENCE,
};
use crate::domains::export::types::{ExportError, ExportResult};
use crate::domains::record::types::ImageData;
use chrono::NaiveDate;
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::{Seek, Write};
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const EMU_PER_INCH: f64 = 914_400.0;

// 16:9 layout in the 10in × 5.625in coordinate space.
const SLIDE_W: f64 = 10.0;
const SLIDE_H: f64 = 5.625;

const BAND_COLOR: &str = "0F172A";
const ACCENT_COLOR: &str = "EA580C";
const TEXT_COLOR: &str = "1E293B";
const MUTED_COLOR: &str = "64748B";
const PANEL_FILL: &str = "F1F5F9";
const PANEL_LINE: &str = "CBD5E1";
const SLOT_LINE: &str = "94A3B8";
const BACKGROUND: &str = "F8FAFC";

// Evidence placeholder geometry: three fixed columns right of the stage
// description, labels beneath.
const SLOT_XS: [f64; 3] = [4.8, 6.55, 8.3];
const SLOT_Y: f64 = 1.3;
const SLOT_W: f64 = 1.65;
const SLOT_H: f64 = 2.9;
const SLOT_LABEL_Y: f64 = 4.25;

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Date-stamped artifact name.
pub fn pptx_file_name(today: NaiveDate) -> String {
    format!("Relatorio_HV_{}.pptx", today.format("%Y-%m-%d"))
}

struct MediaPart {
    file_name: String,
    bytes: Vec<u8>,
}

struct RenderedSlide {
    record_id: Option<Uuid>,
    xml: String,
    rels: String,
    media: Vec<MediaPart>,
}

/// Builds one slide's shape tree, relationship part and media parts.
struct SlideBuilder {
    shapes: String,
    rels: Vec<String>,
    media: Vec<MediaPart>,
    next_shape_id: u32,
    next_rel_id: u32,
    image_counter: u32,
}

impl SlideBuilder {
    fn new(image_counter: u32) -> Self {
        Self {
            shapes: String::new(),
            rels: Vec::new(),
            media: Vec::new(),
            next_shape_id: 2,
            next_rel_id: 2, // rId1 is the slide layout
            image_counter,
        }
    }

    fn shape_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    fn xfrm(rect: Rect) -> String {
        format!(
            "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
            emu(rect.x),
            emu(rect.y),
            emu(rect.w),
            emu(rect.h)
        )
    }

    /// Plain text box. Newlines in `text` become separate paragraphs.
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        rect: Rect,
        text: &str,
        size_pt: u32,
        bold: bool,
        italic: bool,
        color: &str,
        centered: bool,
    ) {
        let id = self.shape_id();
        let body_pr = if centered {
            "<a:bodyPr wrap=\"square\" anchor=\"ctr\"/>"
        } else {
            "<a:bodyPr wrap=\"square\" anchor=\"t\"/>"
        };
        let align = if centered { " algn=\"ctr\"" } else { "" };
        let b = if bold { " b=\"1\"" } else { "" };
        let i = if italic { " i=\"1\"" } else { "" };

        let mut paragraphs = String::new();
        for line in text.split('\n') {
            paragraphs.push_str(&format!(
                "<a:p><a:pPr{align}/><a:r><a:rPr lang=\"pt-BR\" sz=\"{sz}\"{b}{i}>\
                 <a:solidFill><a:srgbClr val=\"{color}\"/></a:solidFill></a:rPr>\
                 <a:t>{text}</a:t></a:r></a:p>",
                align = align,
                sz = size_pt * 100,
                b = b,
                i = i,
                color = color,
                text = xml_escape(line),
            ));
        }

        self.shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Text {id}\"/><p:cNvSpPr/><p:nvPr/>\
             </p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
             </p:spPr><p:txBody>{body_pr}<a:lstStyle/>{paragraphs}</p:txBody></p:sp>",
            id = id,
            xfrm = Self::xfrm(rect),
            body_pr = body_pr,
            paragraphs = paragraphs,
        ));
    }

    /// Filled rectangle with an optional outline.
    fn panel(&mut self, rect: Rect, fill: &str, line: Option<(&str, bool)>) {
        let id = self.shape_id();
        let ln = match line {
            Some((color, dashed)) => {
                let dash = if dashed { "<a:prstDash val=\"dash\"/>" } else { "" };
                format!(
                    "<a:ln w=\"12700\"><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>{}</a:ln>",
                    color, dash
                )
            }
            None => String::new(),
        };
        self.shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Panel {id}\"/><p:cNvSpPr/><p:nvPr/>\
             </p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
             <a:solidFill><a:srgbClr val=\"{fill}\"/></a:solidFill>{ln}</p:spPr>\
             <p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>",
            id = id,
            xfrm = Self::xfrm(rect),
            fill = fill,
            ln = ln,
        ));
    }

    /// Embeds the image contained within the placeholder bounds, preserving
    /// its aspect ratio. Undecodable dimensions fall back to filling the
    /// bounds; an empty payload is structural corruption.
    fn picture(&mut self, bounds: Rect, image: &ImageData) -> ExportResult<()> {
        if image.bytes.is_empty() {
            return Err(ExportError::Image("empty evidence payload".to_string()));
        }
        let rect = contain(bounds, image.dimensions());

        self.image_counter += 1;
        let file_name = format!("image{}.{}", self.image_counter, image.extension());
        let rel_id = self.next_rel_id;
        self.next_rel_id += 1;
        self.rels.push(format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/{}\"/>",
            rel_id, file_name
        ));
        self.media.push(MediaPart {
            file_name,
            bytes: image.bytes.clone(),
        });

        let id = self.shape_id();
        self.shapes.push_str(&format!(
            "<p:pic><p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Evidence {id}\"/><p:cNvPicPr/>\
             <p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed=\"rId{rel}\"/>\
             <a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
            id = id,
            rel = rel_id,
            xfrm = Self::xfrm(rect),
        ));
        Ok(())
    }

    /// Dark header band shared by record and stage slides.
    fn master_band(&mut self) {
        self.panel(Rect::new(0.0, 0.0, SLIDE_W, 0.6), BAND_COLOR, None);
        self.text(
            Rect::new(0.4, 0.15, 9.2, 0.35),
            DECK_HEADER,
            14,
            true,
            false,
            "FFFFFF",
            false,
        );
    }

    fn finish(self, record_id: Option<Uuid>) -> (RenderedSlide, u32) {
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"{bg}\"/></a:solidFill>\
             <a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr>\
             <p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
             <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
             <a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
             {shapes}</p:spTree></p:cSld></p:sld>",
            bg = BACKGROUND,
            shapes = self.shapes,
        );
        let mut rels = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>",
        );
        for rel in &self.rels {
            rels.push_str(rel);
        }
        rels.push_str("</Relationships>");
        let counter = self.image_counter;
        (
            RenderedSlide {
                record_id,
                xml,
                rels,
                media: self.media,
            },
            counter,
        )
    }
}

/// Scales the image into the bounds (contain), centering the result. Unknown
/// dimensions fill the bounds.
fn contain(bounds: Rect, dimensions: Option<(u32, u32)>) -> Rect {
    match dimensions {
        Some((w, h)) if w > 0 && h > 0 => {
            let scale = (bounds.w / w as f64).min(bounds.h / h as f64);
            let fitted_w = w as f64 * scale;
            let fitted_h = h as f64 * scale;
            Rect::new(
                bounds.x + (bounds.w - fitted_w) / 2.0,
                bounds.y + (bounds.h - fitted_h) / 2.0,
                fitted_w,
                fitted_h,
            )
        }
        _ => bounds,
    }
}

fn render_cover(cover: &CoverSlide, image_counter: u32) -> (RenderedSlide, u32) {
    let mut builder = SlideBuilder::new(image_counter);
    builder.text(
        Rect::new(1.0, 2.0, 8.0, 0.7),
        &cover.title,
        36,
        true,
        false,
        BAND_COLOR,
        false,
    );
    builder.text(
        Rect::new(1.0, 3.0, 8.0, 0.4),
        &cover.subtitle,
        18,
        false,
        false,
        ACCENT_COLOR,
        false,
    );
    builder.text(
        Rect::new(1.0, 3.5, 8.0, 0.4),
        &format!("{} Registros Consolidados", cover.record_count),
        14,
        false,
        true,
        TEXT_COLOR,
        false,
    );
    builder.finish(None)
}

fn render_overview(overview: &OverviewSlide, image_counter: u32) -> (RenderedSlide, u32) {
    let mut builder = SlideBuilder::new(image_counter);
    builder.master_band();
    builder.text(
        Rect::new(0.5, 0.8, 9.0, 0.5),
        &overview.title,
        24,
        true,
        false,
        ACCENT_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.5, 1.4, 9.0, 0.3),
        &format!("LOCAL: {}", overview.location),
        12,
        true,
        false,
        TEXT_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.5, 1.7, 9.0, 0.3),
        &format!("TÉCNICO: {}", overview.technician),
        12,
        false,
        false,
        TEXT_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.5, 2.0, 9.0, 0.3),
        &format!("DATA: {}", overview.date.format("%Y-%m-%d")),
        12,
        false,
        false,
        TEXT_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.5, 2.3, 9.0, 0.3),
        &format!("NATUREZA: {}", overview.nature),
        12,
        false,
        false,
        TEXT_COLOR,
        false,
    );
    builder.panel(
        Rect::new(0.5, 2.7, 9.0, 2.0),
        PANEL_FILL,
        Some((PANEL_LINE, false)),
    );
    builder.text(
        Rect::new(0.6, 2.8, 8.8, 0.3),
        "DESCRIÇÃO GERAL:",
        10,
        true,
        false,
        MUTED_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.6, 3.1, 8.8, 1.5),
        &overview.description,
        11,
        false,
        false,
        TEXT_COLOR,
        false,
    );
    builder.finish(Some(overview.record_id))
}

fn render_stage(stage: &StageSlide, image_counter: u32) -> ExportResult<(RenderedSlide, u32)> {
    let mut builder = SlideBuilder::new(image_counter);
    builder.master_band();
    builder.text(
        Rect::new(0.5, 0.8, 9.0, 0.45),
        &format!("ETAPA: {}", stage.name),
        20,
        true,
        false,
        ACCENT_COLOR,
        false,
    );
    builder.text(
        Rect::new(0.5, 1.3, 4.0, 3.5),
        &stage.description,
        12,
        false,
        false,
        TEXT_COLOR,
        false,
    );

    // Three fixed placeholders in Before/During/After order. Occupancy never
    // shifts or resizes a neighbour.
    for (index, placeholder) in stage.placeholders.iter().enumerate() {
        let bounds = Rect::new(SLOT_XS[index], SLOT_Y, SLOT_W, SLOT_H);
        match &placeholder.image {
            Some(evidence) => builder.picture(bounds, &evidence.data)?,
            None => {
                builder.panel(bounds, PANEL_FILL, Some((SLOT_LINE, true)));
                builder.text(bounds, PENDING_EVIDENCE, 9, false, true, MUTED_COLOR, true);
            }
        }
        builder.text(
            Rect::new(SLOT_XS[index], SLOT_LABEL_Y, SLOT_W, 0.3),
            placeholder.slot.label(),
            10,
            true,
            false,
            MUTED_COLOR,
            true,
        );
    }
    Ok(builder.finish(Some(stage.record_id)))
}

/// Writes the deck as a `.pptx` container. A record whose slides cannot be
/// rendered (corrupt evidence payload) is skipped whole, with a log line;
/// the export itself still succeeds with the remaining records.
pub fn write_pptx<W: Write + Seek>(deck: &SlideDeck, writer: W) -> ExportResult<()> {
    let mut rendered: Vec<RenderedSlide> = Vec::with_capacity(deck.slides.len());
    let mut failed_records: HashSet<Uuid> = HashSet::new();
    let mut image_counter = 0;

    for slide in &deck.slides {
        match slide {
            Slide::Cover(cover) => {
                let (slide, counter) = render_cover(cover, image_counter);
                image_counter = counter;
                rendered.push(slide);
            }
            Slide::Overview(overview) => {
                let (slide, counter) = render_overview(overview, image_counter);
                image_counter = counter;
                rendered.push(slide);
            }
            Slide::Stage(stage) => match render_stage(stage, image_counter) {
                Ok((slide, counter)) => {
                    image_counter = counter;
                    rendered.push(slide);
                }
                Err(err) => {
                    warn!(
                        "skipping slides of record {}: {}",
                        stage.record_id, err
                    );
                    failed_records.insert(stage.record_id);
                }
            },
        }
    }
    rendered.retain(|slide| {
        slide
            .record_id
            .map_or(true, |id| !failed_records.contains(&id))
    });

    write_container(&rendered, writer)
}

fn write_container<W: Write + Seek>(slides: &[RenderedSlide], writer: W) -> ExportResult<()> {
    let mut zip = ZipWriter::new(writer);
    // Fixed timestamp keeps the artifact byte-identical for identical decks.
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut put = |name: &str, content: &[u8]| -> ExportResult<()> {
        zip.start_file(name, options)
            .map_err(|e| ExportError::Io(e.to_string()))?;
        zip.write_all(content)
            .map_err(|e| ExportError::Io(e.to_string()))?;
        Ok(())
    };

    put("[Content_Types].xml", content_types(slides.len()).as_bytes())?;
    put("_rels/.rels", ROOT_RELS.as_bytes())?;
    put("ppt/presentation.xml", presentation(slides.len()).as_bytes())?;
    put(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(slides.len()).as_bytes(),
    )?;
    put("ppt/theme/theme1.xml", THEME.as_bytes())?;
    put("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes())?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        MASTER_RELS.as_bytes(),
    )?;
    put("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes())?;
    put(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        LAYOUT_RELS.as_bytes(),
    )?;

    for (index, slide) in slides.iter().enumerate() {
        put(
            &format!("ppt/slides/slide{}.xml", index + 1),
            slide.xml.as_bytes(),
        )?;
        put(
            &format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
            slide.rels.as_bytes(),
        )?;
        for media in &slide.media {
            put(&format!("ppt/media/{}", media.file_name), &media.bytes)?;
        }
    }

    zip.finish().map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(())
}

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    for index in 1..=slide_count {
        overrides.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
            index
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         <Default Extension=\"jpeg\" ContentType=\"image/jpeg\"/>\
         <Default Extension=\"gif\" ContentType=\"image/gif\"/>\
         <Default Extension=\"webp\" ContentType=\"image/webp\"/>\
         <Default Extension=\"bmp\" ContentType=\"image/bmp\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
         {}</Types>",
        overrides
    )
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for index in 0..slide_count {
        slide_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            256 + index,
            index + 2
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:presentation xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{}</p:sldIdLst>\
         <p:sldSz cx=\"{}\" cy=\"{}\"/>\
         <p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>",
        slide_ids,
        emu(SLIDE_W),
        emu(SLIDE_H)
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut rels = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
    );
    for index in 0..slide_count {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{}.xml\"/>",
            index + 2,
            index + 1
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"ppt/presentation.xml\"/>\
</Relationships>";

const EMPTY_SP_TREE: &str = "<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/>\
<p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/>\
<a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm>\
</p:grpSpPr></p:spTree></p:cSld>";

const CLR_MAP: &str = "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" \
accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" \
accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>";

static SLIDE_MASTER: Lazy<String> = Lazy::new(|| {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sldMaster xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         {}{}<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/>\
         </p:sldLayoutIdLst></p:sldMaster>",
        EMPTY_SP_TREE, CLR_MAP
    )
});

static SLIDE_LAYOUT: Lazy<String> = Lazy::new(|| {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sldLayout xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" type=\"blank\">\
         {}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        EMPTY_SP_TREE
    )
});

const MASTER_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme\" Target=\"../theme/theme1.xml\"/>\
</Relationships>";

const LAYOUT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"../slideMasters/slideMaster1.xml\"/>\
</Relationships>";

const THEME: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"HV\">\
<a:themeElements><a:clrScheme name=\"HV\">\
<a:dk1><a:srgbClr val=\"0F172A\"/></a:dk1><a:lt1><a:srgbClr val=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"1E293B\"/></a:dk2><a:lt2><a:srgbClr val=\"F8FAFC\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"EA580C\"/></a:accent1><a:accent2><a:srgbClr val=\"F59E0B\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"10B981\"/></a:accent3><a:accent4><a:srgbClr val=\"0EA5E9\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"8B5CF6\"/></a:accent5><a:accent6><a:srgbClr val=\"EF4444\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"EA580C\"/></a:hlink><a:folHlink><a:srgbClr val=\"9A3412\"/></a:folHlink>\
</a:clrScheme><a:fontScheme name=\"HV\">\
<a:majorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme><a:fmtScheme name=\"HV\">\
<a:fillStyleLst><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:fillStyleLst>\
<a:lnStyleLst><a:ln w=\"6350\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"12700\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"19050\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln></a:lnStyleLst>\
<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>\
<a:bgFillStyleLst><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:bgFillStyleLst>\
</a:fmtScheme></a:themeElements></a:theme>";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::export::slides::to_slides;
    use crate::domains::municipality::MunicipalityDirectory;
    use crate::domains::record::repository::RecordRepository;
    use crate::domains::record::types::{
        EvidenceSlot, ImageData, MaintenanceImage, MaintenanceNature, MaintenanceStage, Nature,
        NewMaintenanceRecord, ServiceTitle, ServiceType,
    };
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use std::io::{Cursor, Read};

    fn png_pixel() -> Vec<u8> {
        BASE64
            .decode("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==")
            .unwrap()
    }

    fn new_record(stages: Vec<MaintenanceStage>) -> NewMaintenanceRecord {
        NewMaintenanceRecord {
            municipality_id: "m1".to_string(),
            title: ServiceTitle::Standard(ServiceType::Type50A),
            nature: Nature::Standard(MaintenanceNature::PreventiveProgrammed),
            description: "Manutenção preventiva.".to_string(),
            date: None,
            status: None,
            technician: Some("João Silva".to_string()),
            stages: Some(stages),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    fn archive_entry(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        Some(content)
    }

    #[test]
    fn test_container_parts_and_cover() {
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![])).unwrap();
        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());

        let mut out = Cursor::new(Vec::new());
        write_pptx(&deck, &mut out).unwrap();
        let bytes = out.into_inner();

        let presentation = archive_entry(&bytes, "ppt/presentation.xml").unwrap();
        // 16:9 slide size.
        assert!(presentation.contains("cx=\"9144000\" cy=\"5143500\""));

        let cover = archive_entry(&bytes, "ppt/slides/slide1.xml").unwrap();
        assert!(cover.contains("Relatório Operacional de Manutenções"));
        assert!(cover.contains("1 Registros Consolidados"));

        let overview = archive_entry(&bytes, "ppt/slides/slide2.xml").unwrap();
        assert!(overview.contains(DECK_HEADER));
        assert!(overview.contains("LOCAL: Tabatinga (Rio Solimões)"));
        // No third slide for a zero-stage record.
        assert!(archive_entry(&bytes, "ppt/slides/slide3.xml").is_none());
    }

    #[test]
    fn test_stage_slide_placeholders() {
        let mut stage = MaintenanceStage::new("Inspeção Inicial", "Verificação do TX-01.");
        stage.set_slot(
            EvidenceSlot::Before,
            MaintenanceImage::new(ImageData::from_bytes(png_pixel())),
        );
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![stage])).unwrap();
        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());

        let mut out = Cursor::new(Vec::new());
        write_pptx(&deck, &mut out).unwrap();
        let bytes = out.into_inner();

        let stage_xml = archive_entry(&bytes, "ppt/slides/slide3.xml").unwrap();
        // One embedded picture and two pending markers, all three labels.
        assert_eq!(stage_xml.matches("<p:pic>").count(), 1);
        assert_eq!(stage_xml.matches(PENDING_EVIDENCE).count(), 2);
        for label in ["Antes", "Durante", "Depois"] {
            assert!(stage_xml.contains(&format!("<a:t>{}</a:t>", label)));
        }
        // The occupied slot's media part landed in the container.
        assert!(archive_entry(&bytes, "ppt/slides/_rels/slide3.xml.rels")
            .unwrap()
            .contains("../media/image1.png"));
    }

    #[test]
    fn test_corrupt_record_is_skipped_not_fatal() {
        let mut broken_stage = MaintenanceStage::new("Execução Técnica", "Reaperto.");
        broken_stage.set_slot(
            EvidenceSlot::During,
            MaintenanceImage::new(ImageData::new("image/jpeg", vec![])),
        );
        let mut repo = RecordRepository::new();
        // Oldest: intact record; newest: record with the corrupt payload.
        let intact = repo.create(new_record(vec![])).unwrap();
        repo.create(new_record(vec![broken_stage])).unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        let mut out = Cursor::new(Vec::new());
        write_pptx(&deck, &mut out).unwrap();
        let bytes = out.into_inner();

        // Cover plus the intact record's overview survive; the corrupt
        // record's overview and stage slides are gone.
        let cover = archive_entry(&bytes, "ppt/slides/slide1.xml").unwrap();
        assert!(cover.contains("2 Registros Consolidados"));
        let second = archive_entry(&bytes, "ppt/slides/slide2.xml").unwrap();
        assert!(second.contains(&intact.display_title().to_uppercase()));
        assert!(archive_entry(&bytes, "ppt/slides/slide3.xml").is_none());
    }

    #[test]
    fn test_output_is_byte_identical_across_calls() {
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![MaintenanceStage::new("Finalização", "")]))
            .unwrap();
        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());

        let mut first = Cursor::new(Vec::new());
        write_pptx(&deck, &mut first).unwrap();
        let mut second = Cursor::new(Vec::new());
        write_pptx(&deck, &mut second).unwrap();
        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_contain_scaling() {
        let bounds = Rect::new(1.0, 1.0, 2.0, 4.0);
        // Wide image: width-limited, vertically centred.
        let fitted = contain(bounds, Some((200, 100)));
        assert!((fitted.w - 2.0).abs() < 1e-9);
        assert!((fitted.h - 1.0).abs() < 1e-9);
        assert!((fitted.y - 2.5).abs() < 1e-9);
        // Unknown dimensions fill the bounds.
        let filled = contain(bounds, None);
        assert!((filled.w - bounds.w).abs() < 1e-9);
        assert!((filled.h - bounds.h).abs() < 1e-9);
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(xml_escape("A & B <C>"), "A &amp; B &lt;C&gt;");
    }

    #[test]
    fn test_file_name_is_date_stamped() {
        assert_eq!(pptx_file_name(today()), "Relatorio_HV_2024-09-30.pptx");
    }
}
