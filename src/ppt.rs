//! PPT Report Generator Module
//! Builds the benchmark deck: a title slide, a comparison table slide and a
//! chart slide.
//!
//! Uses direct ZIP/XML generation. The chart is embedded as a PNG; its
//! labels, axis ticks and legend are slide text positioned over the image.

use crate::charts::{ChartRenderer, ChartSpec, PlotArea, RenderError, Rgb, Series};
use crate::stats::ComparisonRow;
use chrono::{Local, NaiveDate};
use log::info;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: select at least one metric")]
    NothingToExport,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to write report archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// EMU (English Metric Units) conversion: 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914400;
/// Standard 4:3 slide dimensions (in EMU)
const SLIDE_WIDTH: i64 = 9144000; // 10 inches
const SLIDE_HEIGHT: i64 = 6858000; // 7.5 inches

/// Chart image size in pixels
const CHART_PX_WIDTH: u32 = 1200;
const CHART_PX_HEIGHT: u32 = 600;

const TABLE_HEADERS: [&str; 4] = ["Metric", "Hospital", "State Avg", "National Avg"];
const HEADER_FILL: Rgb = Rgb(68, 114, 196);
const SLIDE_COUNT: usize = 3;

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// `&`, `<`, `>`, quotes: hospital names come straight from the CSV.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Table cell text: one decimal, or the literal "N/A".
fn table_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Text run style.
#[derive(Clone, Copy)]
struct TextStyle {
    /// Hundredths of a point
    size: u32,
    bold: bool,
    align: &'static str,
    wrap: bool,
    color: Option<Rgb>,
}

impl TextStyle {
    fn new(size_pt: u32) -> Self {
        Self {
            size: size_pt * 100,
            bold: false,
            align: "l",
            wrap: true,
            color: None,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn centered(mut self) -> Self {
        self.align = "ctr";
        self
    }

    fn right(mut self) -> Self {
        self.align = "r";
        self
    }

    fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    fn run(&self, text: &str) -> String {
        let fill = self
            .color
            .map(|c| format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, c.hex()))
            .unwrap_or_default();
        format!(
            r#"<a:p><a:pPr algn="{}"/><a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0">{}</a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            self.align,
            self.size,
            u8::from(self.bold),
            fill,
            escape_xml(text)
        )
    }
}

/// Accumulates the shapes of one slide.
struct SlideBuilder {
    shapes: String,
    next_id: usize,
}

impl SlideBuilder {
    fn new() -> Self {
        // id 1 is the group shape
        Self {
            shapes: String::new(),
            next_id: 2,
        }
    }

    fn take_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn text(&mut self, (x, y, cx, cy): (i64, i64, i64, i64), text: &str, style: TextStyle) {
        let id = self.take_id();
        let wrap = if style.wrap { "square" } else { "none" };
        self.shapes.push_str(&format!(
            r#"
<p:sp>
<p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>
<p:txBody><a:bodyPr wrap="{wrap}" lIns="0" tIns="0" rIns="0" bIns="0" rtlCol="0"/><a:lstStyle/>{}</p:txBody>
</p:sp>"#,
            style.run(text)
        ));
    }

    fn rect(&mut self, (x, y, cx, cy): (i64, i64, i64, i64), color: Rgb) {
        let id = self.take_id();
        self.shapes.push_str(&format!(
            r#"
<p:sp>
<p:nvSpPr><p:cNvPr id="{id}" name="Swatch {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr>
</p:sp>"#,
            color.hex()
        ));
    }

    fn picture(&mut self, (x, y, cx, cy): (i64, i64, i64, i64), r_id: &str) {
        let id = self.take_id();
        self.shapes.push_str(&format!(
            r#"
<p:pic>
<p:nvPicPr>
<p:cNvPr id="{id}" name="Picture {id}"/>
<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
<p:nvPr/>
</p:nvPicPr>
<p:blipFill>
<a:blip r:embed="{r_id}"/>
<a:stretch><a:fillRect/></a:stretch>
</p:blipFill>
<p:spPr>
<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
</p:spPr>
</p:pic>"#
        ));
    }

    /// A table whose first row is the header.
    fn table(&mut self, (x, y): (i64, i64), col_widths: &[i64], row_height: i64, rows: &[Vec<String>]) {
        let id = self.take_id();
        let cx: i64 = col_widths.iter().sum();
        let cy = row_height * rows.len() as i64;

        let grid: String = col_widths
            .iter()
            .map(|w| format!(r#"<a:gridCol w="{}"/>"#, w))
            .collect();

        let mut body = String::new();
        for (row_idx, cells) in rows.iter().enumerate() {
            let is_header = row_idx == 0;
            body.push_str(&format!(r#"<a:tr h="{}">"#, row_height));
            for (col_idx, cell) in cells.iter().enumerate() {
                let mut style = TextStyle::new(12);
                if col_idx > 0 {
                    style = style.right();
                }
                let fill = if is_header {
                    style = style.bold().color(Rgb(255, 255, 255));
                    format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, HEADER_FILL.hex())
                } else {
                    String::new()
                };
                body.push_str(&format!(
                    r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr anchor="ctr">{}</a:tcPr></a:tc>"#,
                    style.run(cell),
                    fill
                ));
            }
            body.push_str("</a:tr>");
        }

        self.shapes.push_str(&format!(
            r#"
<p:graphicFrame>
<p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>
<p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm>
<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>{grid}</a:tblGrid>{body}</a:tbl></a:graphicData></a:graphic>
</p:graphicFrame>"#
        ));
    }

    fn finish(self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld>
<p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>
{}
</p:spTree>
</p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
            self.shapes
        )
    }
}

/// Report generator for hospital benchmark decks.
pub struct ReportExporter;

impl ReportExporter {
    /// Export with today's date.
    pub fn export(
        rows: &[ComparisonRow],
        chart: &ChartSpec,
        hospital_name: &str,
    ) -> Result<Vec<u8>, ExportError> {
        Self::export_dated(rows, chart, hospital_name, Local::now().date_naive())
    }

    /// Build the `.pptx` bytes. Refuses only when there are no rows.
    pub fn export_dated(
        rows: &[ComparisonRow],
        chart: &ChartSpec,
        hospital_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<u8>, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let title = format!("HCAHPS Benchmark Report: {}", hospital_name);
        let chart_png = ChartRenderer::render_png(chart, CHART_PX_WIDTH, CHART_PX_HEIGHT)?;

        let slides = [
            Self::title_slide(&title, date),
            Self::table_slide(rows),
            Self::chart_slide(chart),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        // 1. [Content_Types].xml
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml(SLIDE_COUNT).as_bytes())?;

        // 2. _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        // 3. ppt/_rels/presentation.xml.rels
        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        zip.write_all(Self::presentation_rels_xml(SLIDE_COUNT).as_bytes())?;

        // 4. ppt/presentation.xml
        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(Self::presentation_xml(SLIDE_COUNT).as_bytes())?;

        // 5. Slides and their relationships; only the chart slide has an image
        for (idx, slide) in slides.iter().enumerate() {
            let slide_num = idx + 1;
            let image = (slide_num == SLIDE_COUNT).then_some("image1.png");

            zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", slide_num), options)?;
            zip.write_all(Self::slide_rels_xml(image).as_bytes())?;

            zip.start_file(format!("ppt/slides/slide{}.xml", slide_num), options)?;
            zip.write_all(slide.as_bytes())?;
        }

        // 6. Slide layout
        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        zip.write_all(Self::slide_layout_xml().as_bytes())?;
        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        zip.write_all(Self::layout_rels_xml().as_bytes())?;

        // 7. Slide master
        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        zip.write_all(Self::slide_master_xml().as_bytes())?;
        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;
        zip.write_all(Self::master_rels_xml().as_bytes())?;

        // 8. Theme
        zip.start_file("ppt/theme/theme1.xml", options)?;
        zip.write_all(Self::theme_xml().as_bytes())?;

        // 9. docProps
        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml(&title, date).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml(SLIDE_COUNT).as_bytes())?;

        // 10. Chart image
        zip.start_file("ppt/media/image1.png", options)?;
        zip.write_all(&chart_png)?;

        let bytes = zip.finish()?.into_inner();
        info!(
            "report built for {}: {} rows, {} bytes",
            hospital_name,
            rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// `{hospital}_HCAHPS_Benchmark_{YYYYMMDD}.pptx`, with characters that
    /// are unsafe in file names replaced by `_`.
    pub fn report_file_name(hospital_name: &str, date: NaiveDate) -> String {
        let safe_name: String = hospital_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_HCAHPS_Benchmark_{}.pptx", safe_name, date.format("%Y%m%d"))
    }

    fn title_slide(title: &str, date: NaiveDate) -> String {
        let mut slide = SlideBuilder::new();
        slide.text(
            (inches(0.75), inches(2.4), inches(8.5), inches(1.4)),
            title,
            TextStyle::new(32).bold().centered(),
        );
        slide.text(
            (inches(0.75), inches(4.0), inches(8.5), inches(0.5)),
            &format!("Analysis Date: {}", date.format("%Y-%m-%d")),
            TextStyle::new(16).centered(),
        );
        slide.finish()
    }

    fn table_slide(rows: &[ComparisonRow]) -> String {
        let mut slide = SlideBuilder::new();
        slide.text(
            (inches(0.5), inches(0.4), inches(9.0), inches(0.6)),
            "Comparison Table",
            TextStyle::new(24).bold(),
        );

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
        cells.push(TABLE_HEADERS.iter().map(|h| h.to_string()).collect());
        for row in rows {
            cells.push(vec![
                row.metric_label.clone(),
                table_value(row.hospital_value),
                table_value(row.state_value),
                table_value(row.national_value),
            ]);
        }

        let col_widths = [inches(3.6), inches(1.8), inches(1.8), inches(1.8)];
        slide.table((inches(0.5), inches(1.3)), &col_widths, inches(0.4), &cells);
        slide.finish()
    }

    fn chart_slide(chart: &ChartSpec) -> String {
        let mut slide = SlideBuilder::new();
        slide.text(
            (inches(0.5), inches(0.4), inches(9.0), inches(0.6)),
            "Benchmark Chart",
            TextStyle::new(24).bold(),
        );

        let (pic_x, pic_y, pic_cx, pic_cy) = (inches(0.6), inches(1.3), inches(8.8), inches(4.4));
        slide.picture((pic_x, pic_y, pic_cx, pic_cy), "rId2");

        let area = PlotArea::for_size(CHART_PX_WIDTH, CHART_PX_HEIGHT);
        let scale = pic_cx as f64 / CHART_PX_WIDTH as f64;
        let px = |v: f64| (v * scale).round() as i64;

        // Y axis title and ticks
        slide.text(
            (inches(0.1), pic_y - inches(0.35), inches(1.5), inches(0.3)),
            &chart.y_axis_title,
            TextStyle::new(10).bold(),
        );
        for tick in (0..=100).step_by(20) {
            let y = pic_y + px(area.map_y(tick as f64) as f64) - inches(0.08);
            slide.text(
                (inches(0.05), y, inches(0.45), inches(0.16)),
                &tick.to_string(),
                TextStyle::new(8).right(),
            );
        }

        // Value labels above bars, category labels below
        let count = chart.categories.len();
        let slot = px(area.slot_width(count));
        for (idx, category) in chart.categories.iter().enumerate() {
            for bar in &category.bars {
                let (x0, x1) = area.bar_span(idx, count, bar.series.index());
                let center = pic_x + px((x0 + x1) as f64 / 2.0);
                let top = pic_y + px(area.map_y(bar.value) as f64);
                slide.text(
                    (center - inches(0.3), top - inches(0.18), inches(0.6), inches(0.16)),
                    &bar.text,
                    TextStyle::new(7).centered().no_wrap(),
                );
            }

            let center = pic_x + px(area.category_center(idx, count));
            slide.text(
                (center - slot / 2, pic_y + pic_cy + inches(0.05), slot, inches(0.45)),
                &category.label,
                TextStyle::new(9).centered(),
            );
        }

        slide.text(
            (pic_x, pic_y + pic_cy + inches(0.55), pic_cx, inches(0.25)),
            &chart.x_axis_title,
            TextStyle::new(10).bold().centered(),
        );

        // Legend
        let entry_width = inches(1.65);
        let legend = chart.legend();
        let mut x = (SLIDE_WIDTH - entry_width * legend.len() as i64) / 2;
        let y = pic_y + pic_cy + inches(0.9);
        for (name, color) in legend {
            slide.rect((x, y + inches(0.03), inches(0.18), inches(0.18)), color);
            slide.text(
                (x + inches(0.25), y, inches(1.35), inches(0.25)),
                name,
                TextStyle::new(11),
            );
            x += entry_width;
        }

        slide.finish()
    }

    fn content_types_xml(slide_count: usize) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#.to_string();

        for i in 1..=slide_count {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                i
            ));
            xml.push('\n');
        }
        xml.push_str("</Types>");
        xml
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    fn presentation_rels_xml(slide_count: usize) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
"#.to_string();

        for i in 1..=slide_count {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i + 2, i
            ));
            xml.push('\n');
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn presentation_xml(slide_count: usize) -> String {
        let slide_ids: String = (1..=slide_count)
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 2))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{}</p:sldIdLst>
<p:sldSz cx="{}" cy="{}" type="screen4x3"/>
<p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
            slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
        )
    }

    fn slide_rels_xml(image: Option<&str>) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#.to_string();

        if let Some(image) = image {
            xml.push_str(&format!(
                r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
                image
            ));
            xml.push('\n');
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn slide_layout_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#
    }

    fn layout_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#
    }

    fn slide_master_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#
    }

    fn master_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#
    }

    /// Office-style theme; accents 1-3 carry the chart series colors.
    fn theme_xml() -> String {
        let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
        let line = |w: u32| {
            format!(
                r#"<a:ln w="{}" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
                w
            )
        };
        let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
        let accents = [
            Series::Hospital.color(),
            Series::StateAverage.color(),
            Series::NationalAverage.color(),
        ];

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Benchmark Theme">
<a:themeElements>
<a:clrScheme name="Benchmark"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="{a1}"/></a:accent1><a:accent2><a:srgbClr val="{a2}"/></a:accent2><a:accent3><a:srgbClr val="{a3}"/></a:accent3><a:accent4><a:srgbClr val="{h}"/></a:accent4><a:accent5><a:srgbClr val="A5A5A5"/></a:accent5><a:accent6><a:srgbClr val="FFC000"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>
<a:fontScheme name="Benchmark"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="Benchmark"><a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst><a:lnStyleLst>{l1}{l2}{l3}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst></a:fmtScheme>
</a:themeElements>
<a:objectDefaults/>
<a:extraClrSchemeLst/>
</a:theme>"#,
            a1 = accents[0].hex(),
            a2 = accents[1].hex(),
            a3 = accents[2].hex(),
            h = HEADER_FILL.hex(),
            l1 = line(6350),
            l2 = line(12700),
            l3 = line(19050),
        )
    }

    fn core_props_xml(title: &str, date: NaiveDate) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{}</dc:title>
<dc:creator>HCAHPS Benchmark</dc:creator>
<cp:lastModifiedBy>HCAHPS Benchmark</cp:lastModifiedBy>
<cp:revision>1</cp:revision>
<dcterms:created xsi:type="dcterms:W3CDTF">{}T00:00:00Z</dcterms:created>
</cp:coreProperties>"#,
            escape_xml(title),
            date.format("%Y-%m-%d")
        )
    }

    fn app_props_xml(slide_count: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<TotalTime>0</TotalTime>
<Words>0</Words>
<Application>HCAHPS Benchmark</Application>
<PresentationFormat>On-screen Show (4:3)</PresentationFormat>
<Paragraphs>0</Paragraphs>
<Slides>{}</Slides>
<Notes>0</Notes>
<HiddenSlides>0</HiddenSlides>
<MMClips>0</MMClips>
<ScaleCrop>false</ScaleCrop>
<LinksUpToDate>false</LinksUpToDate>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
<AppVersion>16.0000</AppVersion>
</Properties>"#,
            slide_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::build_chart;
    use std::io::Read;
    use zip::ZipArchive;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn rows() -> Vec<ComparisonRow> {
        vec![
            ComparisonRow {
                metric_key: "H_CLEAN_HSP_A_P".to_string(),
                metric_label: "Care Cleanliness".to_string(),
                hospital_value: Some(85.0),
                state_value: Some(80.0),
                national_value: Some(78.0),
                delta_vs_state: Some(5.0),
                delta_vs_national: Some(7.0),
            },
            ComparisonRow {
                metric_key: "H_COMP_1_A_P".to_string(),
                metric_label: "Nurse Communication".to_string(),
                hospital_value: None,
                state_value: Some(79.5),
                national_value: None,
                delta_vs_state: None,
                delta_vs_national: None,
            },
        ]
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_empty_rows_refused() {
        let err = ReportExporter::export(&[], &build_chart(&[]), "Any Hospital").unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
    }

    #[test]
    fn test_deck_has_three_slides_and_chart_image() {
        let rows = rows();
        let bytes =
            ReportExporter::export_dated(&rows, &build_chart(&rows), "General Hospital", date())
                .unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for slide in 1..=3 {
            assert!(names.contains(&format!("ppt/slides/slide{}.xml", slide).as_str()));
        }
        assert!(!names.contains(&"ppt/slides/slide4.xml"));
        assert!(names.contains(&"ppt/media/image1.png"));

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);
    }

    #[test]
    fn test_title_slide_names_hospital_and_date() {
        let rows = rows();
        let bytes =
            ReportExporter::export_dated(&rows, &build_chart(&rows), "General Hospital", date())
                .unwrap();
        let title = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(title.contains("HCAHPS Benchmark Report: General Hospital"));
        assert!(title.contains("Analysis Date: 2024-03-09"));
    }

    #[test]
    fn test_table_has_header_plus_one_row_per_comparison() {
        let rows = rows();
        let bytes =
            ReportExporter::export_dated(&rows, &build_chart(&rows), "General Hospital", date())
                .unwrap();
        let table = read_part(&bytes, "ppt/slides/slide2.xml");

        assert_eq!(table.matches("<a:tr ").count(), rows.len() + 1);
        for header in TABLE_HEADERS {
            assert!(table.contains(&format!("<a:t>{}</a:t>", header)));
        }
        assert!(table.contains("<a:t>85.0</a:t>"));
        assert!(table.contains("<a:t>79.5</a:t>"));
        assert_eq!(table.matches("<a:t>N/A</a:t>").count(), 2);
    }

    #[test]
    fn test_chart_slide_embeds_image_and_labels() {
        let rows = rows();
        let bytes =
            ReportExporter::export_dated(&rows, &build_chart(&rows), "General Hospital", date())
                .unwrap();
        let chart = read_part(&bytes, "ppt/slides/slide3.xml");
        assert!(chart.contains(r#"r:embed="rId2""#));
        assert!(chart.contains("<a:t>Care Cleanliness</a:t>"));
        assert!(chart.contains("<a:t>85.0%</a:t>"));
        assert!(chart.contains("<a:t>National Avg</a:t>"));

        let rels = read_part(&bytes, "ppt/slides/_rels/slide3.xml.rels");
        assert!(rels.contains("../media/image1.png"));
    }

    #[test]
    fn test_hospital_name_is_escaped() {
        let rows = rows();
        let bytes =
            ReportExporter::export_dated(&rows, &build_chart(&rows), "St. Mary's <Main> & Co", date())
                .unwrap();
        let title = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(title.contains("St. Mary&apos;s &lt;Main&gt; &amp; Co"));
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("&amp; Co"));
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            ReportExporter::report_file_name("General Hospital", date()),
            "General_Hospital_HCAHPS_Benchmark_20240309.pptx"
        );
        assert_eq!(
            ReportExporter::report_file_name("St. Mary's/Main", date()),
            "St__Mary_s_Main_HCAHPS_Benchmark_20240309.pptx"
        );
    }
}
