//! Tesseract 识别器 - 基础设施层
//!
//! 每次调用都新建一个 `LepTess` 实例（它不能跨线程共享），
//! 以 hOCR 形式取回词级结果，再解析出块号、行号和置信度。

use crate::error::RecognitionError;
use crate::infrastructure::Recognizer;
use crate::models::{Token, WordBox};
use image::{GrayImage, ImageFormat};
use leptess::{LepTess, Variable};
use regex::Regex;
use std::io::Cursor;
use std::sync::OnceLock;
use tracing::debug;

/// 单一均匀文本块
pub const PSM_SINGLE_BLOCK: u32 = 6;

/// Tesseract 识别器
///
/// 引擎模式使用 Tesseract 默认值（传统引擎 + LSTM）。
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    data_path: Option<String>,
    page_segmentation_mode: u32,
}

impl TesseractRecognizer {
    pub fn new(data_path: Option<String>) -> Self {
        Self {
            data_path,
            page_segmentation_mode: PSM_SINGLE_BLOCK,
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<Vec<Token>, RecognitionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RecognitionError::engine_failed(
                language,
                format!("图片尺寸必须大于零 (当前 {}x{})", width, height),
            ));
        }

        let mut lt = LepTess::new(self.data_path.as_deref(), language).map_err(|e| {
            RecognitionError::InitFailed {
                language: language.to_string(),
                message: e.to_string(),
            }
        })?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.page_segmentation_mode.to_string(),
        )
        .map_err(|e| engine_failed(language, "设置 PSM 失败", e))?;

        // leptess 需要编码后的图片数据
        let mut png_buf = Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, ImageFormat::Png)
            .map_err(|e| engine_failed(language, "PNG 编码失败", e))?;

        lt.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| engine_failed(language, "载入图片失败", e))?;

        let hocr = lt
            .get_hocr_text(0)
            .map_err(|e| engine_failed(language, "读取 hOCR 失败", e))?;

        let tokens = parse_hocr(&hocr);
        debug!("Tesseract ({}) 返回 {} 个词", language, tokens.len());
        Ok(tokens)
    }
}

fn element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"<(?:div|p|span)\s+class=['"](ocr_carea|ocr_line|ocr_caption|ocr_header|ocr_textfloat|ocrx_word)['"]\s+id=['"][A-Za-z]+_\d+_(\d+)['"]\s+title=['"]([^'"]*)['"][^>]*>"#,
        )
        .expect("hOCR 元素正则无效")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("标签正则无效"))
}

/// 解析 Tesseract hOCR 输出
///
/// 块号取自 `ocr_carea` 的 id，行号取自行元素的 id（页内递增）。
/// 没有 `x_wconf` 的词置信度记为 0。
pub fn parse_hocr(hocr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut block = 0u32;
    let mut line = 0u32;

    for caps in element_regex().captures_iter(hocr) {
        let class = &caps[1];
        let index: u32 = caps[2].parse().unwrap_or(0);
        match class {
            "ocr_carea" => block = index,
            "ocrx_word" => {
                let Some(whole) = caps.get(0) else { continue };
                let rest = &hocr[whole.end()..];
                let inner = rest.find("</span>").map(|end| &rest[..end]).unwrap_or("");
                let text = unescape_html(&tag_regex().replace_all(inner, ""));
                let title = &caps[3];
                tokens.push(Token {
                    text,
                    confidence: title_field(title, "x_wconf")
                        .and_then(|v| v.first().copied())
                        .unwrap_or(0),
                    block,
                    line,
                    bbox: title_field(title, "bbox").and_then(|v| match v.as_slice() {
                        [x0, y0, x1, y1] => Some(WordBox {
                            left: *x0,
                            top: *y0,
                            width: x1 - x0,
                            height: y1 - y0,
                        }),
                        _ => None,
                    }),
                });
            }
            _ => line = index,
        }
    }

    tokens
}

/// 取 title 属性中某一项的整数值，如 `bbox 1 2 3 4; x_wconf 96`
fn title_field(title: &str, key: &str) -> Option<Vec<i32>> {
    title.split(';').map(str::trim).find_map(|part| {
        let mut words = part.split_whitespace();
        if words.next()? != key {
            return None;
        }
        words
            .map(|w| w.parse::<f32>().ok().map(|v| v.round() as i32))
            .collect()
    })
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn engine_failed(language: &str, what: &str, err: impl std::fmt::Display) -> RecognitionError {
    RecognitionError::engine_failed(language, format!("{}: {}", what, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
  <div class='ocr_page' id='page_1' title='image ""; bbox 0 0 800 600; ppageno 0'>
   <div class='ocr_carea' id='block_1_1' title="bbox 36 92 580 160">
    <p class='ocr_par' id='par_1_1' lang='eng' title="bbox 36 92 580 160">
     <span class='ocr_line' id='line_1_1' title="bbox 36 92 580 122; baseline 0 -6; x_size 30">
      <span class='ocrx_word' id='word_1_1' title='bbox 36 92 60 122; x_wconf 96'>1.</span>
      <span class='ocrx_word' id='word_1_2' title='bbox 70 92 160 122; x_wconf 91'><strong>Explain</strong></span>
     </span>
     <span class='ocr_line' id='line_1_2' title="bbox 36 130 580 160; baseline 0 -6; x_size 30">
      <span class='ocrx_word' id='word_1_3' title='bbox 36 130 140 160; x_wconf 12'>Q&amp;A</span>
     </span>
    </p>
   </div>
   <div class='ocr_carea' id='block_1_2' title="bbox 36 200 580 230">
    <p class='ocr_par' id='par_1_2' lang='eng' title="bbox 36 200 580 230">
     <span class='ocr_header' id='line_1_3' title="bbox 36 200 580 230">
      <span class='ocrx_word' id='word_1_4' title='bbox 36 200 90 230; x_wconf 88'>2.</span>
     </span>
    </p>
   </div>
  </div>"#;

    #[test]
    fn test_parse_hocr_words_with_block_and_line() {
        let tokens = parse_hocr(SAMPLE);
        let summary: Vec<(&str, i32, u32, u32)> = tokens
            .iter()
            .map(|t| (t.text.as_str(), t.confidence, t.block, t.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1.", 96, 1, 1),
                ("Explain", 91, 1, 1),
                ("Q&A", 12, 1, 2),
                ("2.", 88, 2, 3),
            ]
        );
    }

    #[test]
    fn test_parse_hocr_bbox() {
        let tokens = parse_hocr(SAMPLE);
        assert_eq!(
            tokens[1].bbox,
            Some(WordBox {
                left: 70,
                top: 92,
                width: 90,
                height: 30
            })
        );
    }

    #[test]
    fn test_parse_hocr_empty_page() {
        assert!(parse_hocr("<div class='ocr_page' id='page_1' title='bbox 0 0 10 10'></div>").is_empty());
    }

    #[test]
    #[ignore] // 需要本机安装 Tesseract 及英文语言包
    fn test_blank_image_yields_few_tokens() {
        let recognizer = TesseractRecognizer::default();
        let image = GrayImage::from_pixel(200, 100, image::Luma([255]));
        let tokens = recognizer.recognize(&image, "eng").expect("Tesseract 不可用");
        assert!(tokens.len() < 5);
    }

    #[test]
    #[ignore]
    fn test_missing_language_pack_fails_init() {
        let recognizer = TesseractRecognizer::default();
        let image = GrayImage::from_pixel(20, 20, image::Luma([255]));
        let err = recognizer.recognize(&image, "invalid_lang_xyz").unwrap_err();
        assert!(matches!(err, RecognitionError::InitFailed { .. }));
    }
}
