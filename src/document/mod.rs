//! 将生成的文本与示意图排版为 PDF
//!
//! 版式固定：标题、生成日期、正文、"Visual Representation:" 标签、示意图。
//! 正文按单词边界折行，超出页底时自动续页。
//! 正文只能包含 WinAnsi 字符，否则直接报错而不是丢字。

mod encoding;
mod wrap;

pub use encoding::ensure_encodable;
pub use wrap::wrap_line;

use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb, image_crate,
};
use tracing::debug;

use crate::{errors::RenderError, util::RunContext};

const TITLE: &str = ".NET Interview Mastery";
const IMAGE_LABEL: &str = "Visual Representation:";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const BODY_FONT_SIZE: f32 = 11.0;
const BODY_LINE_HEIGHT: f32 = 8.0;

const IMAGE_X: f32 = 15.0;
const IMAGE_WIDTH: f32 = 180.0;

const PT_TO_MM: f32 = 0.3528;
/// Helvetica 的平均字宽 (相对字号)
const AVG_CHAR_WIDTH: f32 = 0.55;

const TITLE_COLOR: (u8, u8, u8) = (0, 100, 255);
const SUBTITLE_COLOR: (u8, u8, u8) = (100, 100, 100);
const BODY_COLOR: (u8, u8, u8) = (0, 0, 0);

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

pub struct DocumentAssembler {
    output_dir: PathBuf,
}

impl DocumentAssembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn pdf_path(&self, run: &RunContext) -> PathBuf {
        self.output_dir.join(run.pdf_file_name())
    }

    /// 生成 PDF 并返回路径，同一天重复运行会覆盖旧文件
    pub fn assemble(
        &self,
        text: &str,
        image_path: &Path,
        run: &RunContext,
    ) -> Result<PathBuf, RenderError> {
        ensure_encodable(text)?;
        let image = load_image(image_path)?;

        let (doc, page, layer) = PdfDocument::new(
            format!("Interview Prep {}", run.date_stamp()),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let fonts = Fonts::load(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);
        let mut cursor = PageCursor::new(&doc, layer);

        cursor.set_color(TITLE_COLOR);
        cursor.text_row(TITLE, &fonts.bold, 20.0, 15.0, Align::Center);

        cursor.set_color(SUBTITLE_COLOR);
        cursor.text_row(
            &format!("Generated on {}", run.date_stamp()),
            &fonts.italic,
            10.0,
            10.0,
            Align::Center,
        );
        cursor.advance(5.0);

        cursor.set_color(BODY_COLOR);
        for row in body_rows(text) {
            cursor.text_row(&row, &fonts.regular, BODY_FONT_SIZE, BODY_LINE_HEIGHT, Align::Left);
        }

        cursor.advance(10.0);
        cursor.text_row(IMAGE_LABEL, &fonts.bold, 12.0, 10.0, Align::Left);
        cursor.image(image);

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        std::fs::create_dir_all(&self.output_dir)?;
        let pdf_path = self.pdf_path(run);
        std::fs::write(&pdf_path, &bytes)?;

        debug!(path = %pdf_path.display(), bytes = bytes.len(), "PDF 已生成");

        Ok(pdf_path)
    }
}

/// 正文折行结果；原文中的每个换行都对应新的一行
pub fn body_rows(text: &str) -> Vec<String> {
    let max_chars = chars_per_line(BODY_FONT_SIZE, CONTENT_WIDTH);
    text.split('\n')
        .flat_map(|line| wrap_line(line.strip_suffix('\r').unwrap_or(line), max_chars))
        .collect()
}

fn chars_per_line(font_size: f32, width: f32) -> usize {
    (width / (font_size * PT_TO_MM * AVG_CHAR_WIDTH)).floor() as usize
}

fn estimated_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * PT_TO_MM * AVG_CHAR_WIDTH
}

struct LoadedImage {
    image: image_crate::DynamicImage,
    width_px: u32,
    height_px: u32,
}

fn load_image(path: &Path) -> Result<LoadedImage, RenderError> {
    let image_error = |message: String| RenderError::Image {
        path: path.to_path_buf(),
        message,
    };

    let bytes = std::fs::read(path).map_err(|e| image_error(e.to_string()))?;
    let decoded = image_crate::load_from_memory(&bytes).map_err(|e| image_error(e.to_string()))?;

    // 去掉 alpha 通道，PDF 内嵌时只保留 RGB
    let rgb = decoded.to_rgb8();
    let (width_px, height_px) = rgb.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(image_error("图像尺寸为 0".to_string()));
    }

    Ok(LoadedImage {
        image: image_crate::DynamicImage::ImageRgb8(rgb),
        width_px,
        height_px,
    })
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        let font = |builtin| {
            doc.add_builtin_font(builtin)
                .map_err(|e| RenderError::Pdf(e.to_string()))
        };

        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        })
    }
}

/// 自上而下的排版游标，`y` 为距页顶的毫米数
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    color: (u8, u8, u8),
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: MARGIN,
            color: BODY_COLOR,
        }
    }

    fn set_color(&mut self, color: (u8, u8, u8)) {
        self.color = color;
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        )));
    }

    fn advance(&mut self, height: f32) {
        self.y += height;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height <= PAGE_HEIGHT - BOTTOM_MARGIN || self.y <= MARGIN {
            return;
        }

        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN;
        self.set_color(self.color);
    }

    fn text_row(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        font_size: f32,
        height: f32,
        align: Align,
    ) {
        self.ensure_room(height);

        let x = match align {
            Align::Left => MARGIN,
            Align::Center => {
                (MARGIN + (CONTENT_WIDTH - estimated_width(text, font_size)) / 2.0).max(MARGIN)
            }
        };
        // 基线落在行高中部偏下
        let baseline = self.y + height / 2.0 + font_size * PT_TO_MM * 0.35;

        if !text.is_empty() {
            self.layer
                .use_text(text, font_size, Mm(x), Mm(PAGE_HEIGHT - baseline), font);
        }
        self.y += height;
    }

    fn image(&mut self, loaded: LoadedImage) {
        let height = IMAGE_WIDTH * loaded.height_px as f32 / loaded.width_px as f32;
        self.ensure_room(height);

        let dpi = loaded.width_px as f32 * 25.4 / IMAGE_WIDTH;
        Image::from_dynamic_image(&loaded.image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(IMAGE_X)),
                translate_y: Some(Mm(PAGE_HEIGHT - self.y - height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    const SAMPLE: &str = "Question: What is the difference between AddScoped and AddTransient?\n\
Answer: Scoped services live for one request; transient ones are created every time they are resolved.\n\
Deep Dive: Resolving a scoped service from a singleton captures it for the lifetime of the application.\n\
Code:\nservices.AddScoped<IRepo, Repo>();";

    fn run() -> RunContext {
        RunContext::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    fn write_pixel(dir: &Path) -> PathBuf {
        let path = dir.join("diagram_2024-01-15.png");
        std::fs::write(&path, general_purpose::STANDARD.decode(PIXEL_PNG).unwrap()).unwrap();
        path
    }

    #[test]
    fn assemble_writes_pdf_named_by_date() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_pixel(temp_dir.path());
        let assembler = DocumentAssembler::new(temp_dir.path());

        let path = assembler.assemble(SAMPLE, &image, &run()).unwrap();

        assert_eq!(path, temp_dir.path().join("Interview_Prep_2024-01-15.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn rerun_overwrites_same_path() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_pixel(temp_dir.path());
        let assembler = DocumentAssembler::new(temp_dir.path());

        let first = assembler.assemble("short", &image, &run()).unwrap();
        let second = assembler.assemble(&SAMPLE.repeat(3), &image, &run()).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn long_text_flows_onto_more_pages() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_pixel(temp_dir.path());
        let assembler = DocumentAssembler::new(temp_dir.path());

        let text = (0..120)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let path = assembler.assemble(&text, &image, &run()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_image_is_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let assembler = DocumentAssembler::new(temp_dir.path());

        let err = assembler
            .assemble(SAMPLE, &temp_dir.path().join("nope.png"), &run())
            .unwrap_err();

        assert!(matches!(err, RenderError::Image { .. }));
        assert!(!assembler.pdf_path(&run()).exists());
    }

    #[test]
    fn corrupt_image_is_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let image = temp_dir.path().join("diagram.png");
        std::fs::write(&image, b"not a png").unwrap();

        let err = DocumentAssembler::new(temp_dir.path())
            .assemble(SAMPLE, &image, &run())
            .unwrap_err();
        assert!(matches!(err, RenderError::Image { .. }));
    }

    /// 按页序拼接内容流中所有 `Tj` 的字符串操作数
    fn shown_text(path: &Path) -> String {
        let doc = lopdf::Document::load(path).unwrap();
        let mut text = String::new();
        for page_id in doc.get_pages().into_values() {
            let content =
                lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for op in content.operations.iter().filter(|op| op.operator == "Tj") {
                for operand in &op.operands {
                    if let lopdf::Object::String(bytes, _) = operand {
                        text.extend(bytes.iter().map(|&b| char::from(b)));
                    }
                }
            }
        }
        text
    }

    #[test]
    fn content_stream_holds_full_body_text() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_pixel(temp_dir.path());
        let assembler = DocumentAssembler::new(temp_dir.path());

        let short = "Question: What is...\nAnswer: ...\nDeep Dive: ...\nCode: ...";
        let path = assembler.assemble(short, &image, &run()).unwrap();
        let shown = shown_text(&path);
        assert!(shown.contains(".NET Interview Mastery"));
        assert!(shown.contains("Generated on 2024-01-15"));
        assert!(shown.contains("Question: What is...Answer: ...Deep Dive: ...Code: ..."));
        assert!(shown.contains("Visual Representation:"));

        let path = assembler.assemble(SAMPLE, &image, &run()).unwrap();
        assert!(shown_text(&path).contains(&SAMPLE.replace('\n', "")));
    }

    #[test]
    fn unencodable_text_fails_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_pixel(temp_dir.path());
        let assembler = DocumentAssembler::new(temp_dir.path());

        let err = assembler
            .assemble("Question: a → b ≤ c 任务 done", &image, &run())
            .unwrap_err();

        assert!(matches!(err, RenderError::UnsupportedChar { ch: '→', .. }));
        assert!(err.to_string().contains('→'));
        assert!(!assembler.pdf_path(&run()).exists());
    }

    #[test]
    fn body_rows_keep_text_verbatim() {
        let rows = body_rows(SAMPLE);
        let max = chars_per_line(BODY_FONT_SIZE, CONTENT_WIDTH);

        assert_eq!(rows.concat(), SAMPLE.replace('\n', ""));
        assert!(rows.iter().all(|row| row.trim_end().chars().count() <= max));
        assert!(rows.len() > SAMPLE.lines().count());
    }
}
