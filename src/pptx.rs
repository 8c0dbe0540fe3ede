//! Minimal PresentationML writer.
//!
//! Produces a valid `.pptx` package with one master, one blank layout, one
//! theme and any number of slides that each hold stretched pictures. Nothing
//! else of the format is modelled.

use crate::slides::{ImagePlacement, Layout, SlideDocument, SlideId};
use crate::{Error, Result};
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per inch
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Name and size of the layout a new document starts with (16:9, 10 x 5.625 in)
pub const DEFAULT_LAYOUT_NAME: &str = "LAYOUT_16x9";
pub const DEFAULT_WIDTH: f64 = 10.0;
pub const DEFAULT_HEIGHT: f64 = 5.625;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CORE: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const NS_APP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

#[derive(Debug, Default)]
struct Slide {
    images: Vec<ImagePlacement>,
}

/// In-memory presentation written out by [`SlideDocument::write_file`]
#[derive(Debug)]
pub struct PptxDocument {
    pub title: String,
    layouts: Vec<Layout>,
    active: usize,
    slides: Vec<Slide>,
}

impl Default for PptxDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PptxDocument {
    pub fn new() -> Self {
        Self {
            title: "html2slide".to_string(),
            layouts: vec![Layout {
                name: DEFAULT_LAYOUT_NAME.to_string(),
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            }],
            active: 0,
            slides: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layouts[self.active]
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Every package entry, media bytes included, in archive order
    fn parts(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let slides = self.slides.len();
        let mut parts = vec![
            ("[Content_Types].xml".to_string(), content_types_xml(slides)?),
            ("_rels/.rels".to_string(), ROOT_RELS.as_bytes().to_vec()),
            ("docProps/core.xml".to_string(), core_xml(&self.title)?),
            ("docProps/app.xml".to_string(), app_xml(slides)?),
            ("ppt/presentation.xml".to_string(), presentation_xml(self.layout(), slides)?),
            ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels_xml(slides)?),
        ];
        for (name, body) in [
            ("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER),
            ("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS),
            ("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT),
            ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", SLIDE_LAYOUT_RELS),
            ("ppt/theme/theme1.xml", THEME),
        ] {
            parts.push((name.to_string(), body.as_bytes().to_vec()));
        }

        let mut media = Vec::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let mut embeds = Vec::with_capacity(slide.images.len());
            for image in &slide.images {
                let name = format!("image{}.{}", media.len() + 1, extension(&image.path));
                let bytes = std::fs::read(&image.path).map_err(|e| {
                    Error::Packaging(format!("cannot read image {}: {}", image.path.display(), e))
                })?;
                embeds.push(name.clone());
                media.push((format!("ppt/media/{}", name), bytes));
            }
            parts.push((format!("ppt/slides/slide{}.xml", i + 1), slide_xml(slide)?));
            parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), slide_rels_xml(&embeds)?));
        }
        parts.extend(media);
        Ok(parts)
    }

    /// The complete `.pptx` archive, built in memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let parts = self.parts()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, body) in &parts {
            zip.start_file(name.as_str(), opts)?;
            zip.write_all(body)
                .map_err(|e| Error::Packaging(format!("{}: {}", name, e)))?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

impl SlideDocument for PptxDocument {
    fn define_layout(&mut self, layout: Layout) {
        match self.layouts.iter_mut().find(|l| l.name == layout.name) {
            Some(existing) => *existing = layout,
            None => self.layouts.push(layout),
        }
    }

    fn set_layout(&mut self, name: &str) -> Result<()> {
        self.active = self
            .layouts
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| Error::Packaging(format!("unknown layout '{}'", name)))?;
        Ok(())
    }

    fn canvas_size(&self) -> (f64, f64) {
        let l = self.layout();
        (l.width, l.height)
    }

    fn add_slide(&mut self) -> SlideId {
        self.slides.push(Slide::default());
        SlideId(self.slides.len() - 1)
    }

    fn add_image(&mut self, slide: SlideId, image: ImagePlacement) -> Result<()> {
        let target = self
            .slides
            .get_mut(slide.0)
            .ok_or_else(|| Error::Packaging(format!("no slide with index {}", slide.0)))?;
        target.images.push(image);
        Ok(())
    }

    fn write_file(&mut self, path: &Path) -> Result<()> {
        // The output path is only touched once the whole archive exists
        let bytes = self.to_bytes()?;
        debug!("writing {} bytes to {}", bytes.len(), path.display());
        std::fs::write(path, bytes).map_err(|e| Error::write(path, e))
    }
}

fn extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "jpg" => "jpeg".to_string(),
        Some(ext) if ext == "jpeg" || ext == "gif" || ext == "png" => ext,
        _ => "png".to_string(),
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// New part with the standalone XML declaration already written
fn part() -> Result<XmlWriter> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn open(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name).with_attributes(attrs.iter().copied())))?;
    Ok(())
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Empty(BytesStart::new(name).with_attributes(attrs.iter().copied())))?;
    Ok(())
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    open(writer, name, &[])?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn into_bytes(writer: XmlWriter) -> Vec<u8> {
    writer.into_inner().into_inner()
}

fn content_types_xml(slides: usize) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(&mut w, "Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    for (ext, content_type) in [
        ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
        ("xml", "application/xml"),
        ("png", "image/png"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
    ] {
        empty(&mut w, "Default", &[("Extension", ext), ("ContentType", content_type)])?;
    }
    for (part_name, content_type) in [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_APP),
    ] {
        empty(&mut w, "Override", &[("PartName", part_name), ("ContentType", content_type)])?;
    }
    for i in 1..=slides {
        let part_name = format!("/ppt/slides/slide{}.xml", i);
        empty(&mut w, "Override", &[("PartName", part_name.as_str()), ("ContentType", CT_SLIDE)])?;
    }
    close(&mut w, "Types")?;
    Ok(into_bytes(w))
}

fn core_xml(title: &str) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(
        &mut w,
        "cp:coreProperties",
        &[
            ("xmlns:cp", NS_CORE),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    text_element(&mut w, "dc:title", title)?;
    text_element(&mut w, "dc:creator", "html2slide")?;
    close(&mut w, "cp:coreProperties")?;
    Ok(into_bytes(w))
}

fn app_xml(slides: usize) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(&mut w, "Properties", &[("xmlns", NS_APP)])?;
    text_element(&mut w, "Application", "html2slide")?;
    text_element(&mut w, "Slides", &slides.to_string())?;
    close(&mut w, "Properties")?;
    Ok(into_bytes(w))
}

fn presentation_xml(layout: &Layout, slides: usize) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(
        &mut w,
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    open(&mut w, "p:sldMasterIdLst", &[])?;
    empty(&mut w, "p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    close(&mut w, "p:sldMasterIdLst")?;

    // Slide ids start at 256; rId1 is the master
    open(&mut w, "p:sldIdLst", &[])?;
    for i in 0..slides {
        let id = (256 + i).to_string();
        let rid = format!("rId{}", i + 2);
        empty(&mut w, "p:sldId", &[("id", id.as_str()), ("r:id", rid.as_str())])?;
    }
    close(&mut w, "p:sldIdLst")?;

    let cx = emu(layout.width).to_string();
    let cy = emu(layout.height).to_string();
    empty(&mut w, "p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    empty(&mut w, "p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;

    close(&mut w, "p:presentation")?;
    Ok(into_bytes(w))
}

fn presentation_rels_xml(slides: usize) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(&mut w, "Relationships", &[("xmlns", NS_PACKAGE_RELS)])?;
    relationship(&mut w, "rId1", "slideMaster", "slideMasters/slideMaster1.xml")?;
    for i in 1..=slides {
        relationship(
            &mut w,
            &format!("rId{}", i + 1),
            "slide",
            &format!("slides/slide{}.xml", i),
        )?;
    }
    relationship(&mut w, &format!("rId{}", slides + 2), "theme", "theme/theme1.xml")?;
    close(&mut w, "Relationships")?;
    Ok(into_bytes(w))
}

fn slide_xml(slide: &Slide) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(&mut w, "p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
    open(&mut w, "p:cSld", &[])?;
    open(&mut w, "p:spTree", &[])?;

    open(&mut w, "p:nvGrpSpPr", &[])?;
    empty(&mut w, "p:cNvPr", &[("id", "1"), ("name", "")])?;
    empty(&mut w, "p:cNvGrpSpPr", &[])?;
    empty(&mut w, "p:nvPr", &[])?;
    close(&mut w, "p:nvGrpSpPr")?;
    empty(&mut w, "p:grpSpPr", &[])?;

    for (i, image) in slide.images.iter().enumerate() {
        picture(&mut w, i, image)?;
    }

    close(&mut w, "p:spTree")?;
    close(&mut w, "p:cSld")?;
    open(&mut w, "p:clrMapOvr", &[])?;
    empty(&mut w, "a:masterClrMapping", &[])?;
    close(&mut w, "p:clrMapOvr")?;
    close(&mut w, "p:sld")?;
    Ok(into_bytes(w))
}

/// One stretched `p:pic`; shape id and relationship id are both `index + 2`
fn picture(w: &mut XmlWriter, index: usize, image: &ImagePlacement) -> Result<()> {
    let id = (index + 2).to_string();
    let name = format!("Image {}", index + 1);
    let rid = format!("rId{}", index + 2);

    open(w, "p:pic", &[])?;
    open(w, "p:nvPicPr", &[])?;
    empty(w, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
    open(w, "p:cNvPicPr", &[])?;
    empty(w, "a:picLocks", &[("noChangeAspect", "1")])?;
    close(w, "p:cNvPicPr")?;
    empty(w, "p:nvPr", &[])?;
    close(w, "p:nvPicPr")?;

    open(w, "p:blipFill", &[])?;
    empty(w, "a:blip", &[("r:embed", rid.as_str())])?;
    open(w, "a:stretch", &[])?;
    empty(w, "a:fillRect", &[])?;
    close(w, "a:stretch")?;
    close(w, "p:blipFill")?;

    open(w, "p:spPr", &[])?;
    open(w, "a:xfrm", &[])?;
    let (x, y) = (emu(image.x).to_string(), emu(image.y).to_string());
    let (cx, cy) = (emu(image.w).to_string(), emu(image.h).to_string());
    empty(w, "a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    empty(w, "a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    close(w, "a:xfrm")?;
    open(w, "a:prstGeom", &[("prst", "rect")])?;
    empty(w, "a:avLst", &[])?;
    close(w, "a:prstGeom")?;
    close(w, "p:spPr")?;
    close(w, "p:pic")
}

fn slide_rels_xml(embeds: &[String]) -> Result<Vec<u8>> {
    let mut w = part()?;
    open(&mut w, "Relationships", &[("xmlns", NS_PACKAGE_RELS)])?;
    relationship(&mut w, "rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")?;
    for (i, name) in embeds.iter().enumerate() {
        relationship(
            &mut w,
            &format!("rId{}", i + 2),
            "image",
            &format!("../media/{}", name),
        )?;
    }
    close(&mut w, "Relationships")?;
    Ok(into_bytes(w))
}

fn relationship(w: &mut XmlWriter, id: &str, kind: &str, target: &str) -> Result<()> {
    let rel_type = format!("{}/{}", REL, kind);
    empty(
        w,
        "Relationship",
        &[("Id", id), ("Type", rel_type.as_str()), ("Target", target)],
    )
}

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#
);

const SLIDE_MASTER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
    r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"</p:sldMaster>"#
);

const SLIDE_MASTER_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>"#,
    r#"</Relationships>"#
);

const SLIDE_LAYOUT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank"><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
    r#"</p:sldLayout>"#
);

const SLIDE_LAYOUT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#,
    r#"</Relationships>"#
);

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements>"#,
    r#"</a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut s = String::new();
        entry.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn emu_conversion_rounds() {
        assert_eq!(emu(1.0), 914_400);
        assert_eq!(emu(7.5), 6_858_000);
        assert_eq!(emu(13.333), 12_191_695);
        assert_eq!(emu(5.625), 5_143_500);
    }

    #[test]
    fn new_document_uses_default_canvas() {
        let doc = PptxDocument::new();
        assert_eq!(doc.canvas_size(), (10.0, 5.625));
        assert_eq!(doc.layout().name, DEFAULT_LAYOUT_NAME);
        assert_eq!(doc.slide_count(), 0);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let mut doc = PptxDocument::new();
        assert!(doc.set_layout("NOPE").is_err());
        doc.define_layout(Layout::widescreen());
        doc.set_layout("WIDESCREEN").unwrap();
        assert_eq!(doc.canvas_size(), (13.333, 7.5));
    }

    #[test]
    fn add_image_requires_existing_slide() {
        let mut doc = PptxDocument::new();
        let placement = ImagePlacement {
            path: "a.png".into(),
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
        };
        assert!(doc.add_image(SlideId(0), placement).is_err());
    }

    #[test]
    fn written_package_embeds_image_on_widescreen_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("shot.png");
        std::fs::write(&png, b"\x89PNG\r\n\x1a\nfake").unwrap();
        let out = dir.path().join("deck.pptx");

        let mut doc = PptxDocument::new();
        doc.define_layout(Layout::widescreen());
        doc.set_layout("WIDESCREEN").unwrap();
        let slide = doc.add_slide();
        doc.add_image(
            slide,
            ImagePlacement {
                path: png.clone(),
                x: 0.0,
                y: 0.0,
                w: 13.333,
                h: 7.5,
            },
        )
        .unwrap();
        doc.write_file(&out).unwrap();

        let presentation = read_entry(&out, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldSz cx="12191695" cy="6858000"/>"#));

        let slide_xml = read_entry(&out, "ppt/slides/slide1.xml");
        assert!(slide_xml.contains(r#"<a:off x="0" y="0"/>"#));
        assert!(slide_xml.contains(r#"<a:ext cx="12191695" cy="6858000"/>"#));

        let rels = read_entry(&out, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("../media/image1.png"));

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut media = Vec::new();
        archive.by_name("ppt/media/image1.png").unwrap().read_to_end(&mut media).unwrap();
        assert_eq!(media, b"\x89PNG\r\n\x1a\nfake");
    }

    #[test]
    fn missing_image_fails_packaging() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = PptxDocument::new();
        let slide = doc.add_slide();
        doc.add_image(
            slide,
            ImagePlacement {
                path: dir.path().join("absent.png"),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 5.625,
            },
        )
        .unwrap();
        let out = dir.path().join("deck.pptx");
        let err = doc.write_file(&out).unwrap_err();
        assert!(matches!(err, Error::Packaging(_)));
        assert!(!out.exists(), "no partial package may be left behind");
    }

    #[test]
    fn failed_packaging_keeps_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.pptx");
        std::fs::write(&out, b"previous").unwrap();

        let mut doc = PptxDocument::new();
        let slide = doc.add_slide();
        doc.add_image(
            slide,
            ImagePlacement {
                path: dir.path().join("absent.png"),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 5.625,
            },
        )
        .unwrap();
        assert!(doc.write_file(&out).is_err());
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
    }

    #[test]
    fn title_text_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.pptx");
        let mut doc = PptxDocument::new();
        doc.title = "Q&A <draft>".to_string();
        doc.write_file(&out).unwrap();

        let core = read_entry(&out, "docProps/core.xml");
        assert!(core.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(core.contains("<dc:title>Q&amp;A &lt;draft&gt;</dc:title>"));
    }

    #[test]
    fn content_types_list_every_slide() {
        let xml = String::from_utf8(content_types_xml(2).unwrap()).unwrap();
        assert!(xml.contains(r#"<Override PartName="/ppt/slides/slide1.xml""#));
        assert!(xml.contains(r#"<Override PartName="/ppt/slides/slide2.xml""#));
        assert!(xml.ends_with("</Types>"));

        let rels = String::from_utf8(presentation_rels_xml(2).unwrap()).unwrap();
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml""#));
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    }

    #[test]
    fn missing_output_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = PptxDocument::new();
        let err = doc.write_file(&dir.path().join("nope").join("deck.pptx")).unwrap_err();
        assert!(matches!(err, Error::FilesystemWrite { .. }));
    }

    #[test]
    fn extension_maps_to_known_media_types() {
        assert_eq!(extension(Path::new("a.PNG")), "png");
        assert_eq!(extension(Path::new("a.jpg")), "jpeg");
        assert_eq!(extension(Path::new("a.gif")), "gif");
        assert_eq!(extension(Path::new("a.bmp")), "png");
    }
}
