//! 文件解码 - 基础设施层
//!
//! 把上传的原始字节和文件名变成 RGB 像素，流水线之后只认识像素。

use crate::error::DecodeError;
use crate::models::file_kind::{extension_of, ALLOWED_EXTENSIONS};
use crate::models::{FileKind, RawImage};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::Document;
use std::cmp::Reverse;
use tracing::{debug, warn};

/// 解码扫描件
///
/// # 参数
/// - `bytes`: 文件原始字节
/// - `filename`: 原始文件名（用于判断类型）
///
/// # 返回
/// 返回 RGB 像素及其来源格式
pub fn decode(bytes: &[u8], filename: &str) -> Result<RawImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty {
            filename: filename.to_string(),
        });
    }

    let extension = extension_of(filename);
    let kind = FileKind::from_extension(&extension).ok_or_else(|| DecodeError::UnsupportedFormat {
        extension: extension.clone(),
        allowed: ALLOWED_EXTENSIONS.join(", "),
    })?;

    let pixels = match kind {
        FileKind::Pdf => decode_pdf_first_page(bytes, filename)?,
        _ => decode_image(bytes, filename, kind)?,
    };

    debug!(
        "解码完成: {} ({}x{}, {})",
        filename,
        pixels.width(),
        pixels.height(),
        kind
    );
    Ok(RawImage::new(pixels, kind))
}

/// 按内容嗅探格式解码，嗅探失败时再按扩展名指定格式
fn decode_image(bytes: &[u8], filename: &str, kind: FileKind) -> Result<RgbImage, DecodeError> {
    let decoded = image::load_from_memory(bytes).or_else(|sniff_err| match kind.image_format() {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => Err(sniff_err),
    });

    decoded
        .map(|img| img.to_rgb8())
        .map_err(|source| DecodeError::CorruptImage {
            filename: filename.to_string(),
            source,
        })
}

/// 只处理 PDF 第一页，取该页面积最大的可解码图片
fn decode_pdf_first_page(bytes: &[u8], filename: &str) -> Result<RgbImage, DecodeError> {
    let corrupt = |source| DecodeError::CorruptPdf {
        filename: filename.to_string(),
        source,
    };

    let doc = Document::load_mem(bytes).map_err(corrupt)?;
    let pages = doc.get_pages();
    if pages.len() > 1 {
        warn!("⚠️ {} 共 {} 页，只处理第一页", filename, pages.len());
    }

    let Some(&page_id) = pages.values().next() else {
        return Err(DecodeError::NoPdfImage {
            filename: filename.to_string(),
        });
    };

    // 没有 XObject 资源的页面按无图片处理
    let mut images = doc.get_page_images(page_id).unwrap_or_else(|e| {
        debug!("读取 {} 第一页图片资源失败: {}", filename, e);
        Vec::new()
    });
    images.sort_by_key(|img| Reverse(img.width.saturating_mul(img.height)));

    for img in &images {
        let filters = img.filters.clone().unwrap_or_default();
        match decode_pdf_image(&doc, img, &filters) {
            Some(pixels) => return Ok(pixels),
            None => debug!(
                "跳过无法解码的 PDF 图片 {:?} (filters: {:?}, color space: {:?})",
                img.id, filters, img.color_space
            ),
        }
    }

    Err(DecodeError::NoPdfImage {
        filename: filename.to_string(),
    })
}

/// 解码一张 PDF 内嵌图片：JPEG 直接解码，其余只支持 8 位灰度/RGB 原始像素
fn decode_pdf_image(
    doc: &Document,
    img: &lopdf::xobject::PdfImage,
    filters: &[String],
) -> Option<RgbImage> {
    if filters.iter().any(|f| f == "DCTDecode") {
        return image::load_from_memory_with_format(img.content, ImageFormat::Jpeg)
            .ok()
            .map(|decoded| decoded.to_rgb8());
    }

    if img.bits_per_component.unwrap_or(8) != 8 {
        return None;
    }

    let data = if filters.is_empty() {
        img.content.to_vec()
    } else if filters.iter().all(|f| f == "FlateDecode") {
        doc.get_object(img.id)
            .ok()?
            .as_stream()
            .ok()?
            .decompressed_content()
            .ok()?
    } else {
        return None;
    };

    let width = u32::try_from(img.width).ok()?;
    let height = u32::try_from(img.height).ok()?;
    match img.color_space.as_deref() {
        Some("DeviceRGB") => RgbImage::from_raw(width, height, data),
        Some("DeviceGray") => GrayImage::from_raw(width, height, data)
            .map(|gray| DynamicImage::ImageLuma8(gray).to_rgb8()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use lopdf::{dictionary, Object, Stream};
    use std::io::Cursor;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let source = RgbImage::from_pixel(12, 7, Rgb([200, 10, 10]));
        let raw = decode(&png_bytes(&source), "scan.PNG").unwrap();
        assert_eq!((raw.width(), raw.height()), (12, 7));
        assert_eq!(raw.source_format, FileKind::Png);
        assert_eq!(raw.pixels.get_pixel(3, 3), &Rgb([200, 10, 10]));
    }

    #[test]
    fn test_misnamed_file_is_sniffed_by_content() {
        let source = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let raw = decode(&png_bytes(&source), "scan.jpg").unwrap();
        assert_eq!(raw.width(), 4);
    }

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(decode(&[], "a.png"), Err(DecodeError::Empty { .. })));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = decode(b"hello", "notes.docx").unwrap_err();
        match err {
            DecodeError::UnsupportedFormat { extension, allowed } => {
                assert_eq!(extension, "docx");
                assert!(allowed.contains("pdf"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_image_rejected() {
        let err = decode(b"definitely not an image", "scan.png").unwrap_err();
        assert!(matches!(err, DecodeError::CorruptImage { .. }));
    }

    fn jpeg_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn jpeg_xobject(width: u32, height: u32, color: Rgb<u8>) -> Stream {
        let jpeg = jpeg_bytes(&RgbImage::from_pixel(width, height, color));
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
    }

    fn flate_gray_xobject(width: u32, height: u32, level: u8) -> Stream {
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![level; (width * height) as usize],
        );
        stream.compress().unwrap();
        assert!(stream.dict.has(b"Filter"));
        stream
    }

    /// 每个元素是一页，页内是该页的图片 XObject
    fn pdf_bytes(pages: Vec<Vec<Stream>>) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for images in pages {
            let mut xobjects = lopdf::Dictionary::new();
            for (idx, image) in images.into_iter().enumerate() {
                let image_id = doc.add_object(image);
                xobjects.set(format!("Im{}", idx + 1), image_id);
            }
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => dictionary! { "XObject" => xobjects },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_jpeg_image() {
        let bytes = pdf_bytes(vec![vec![jpeg_xobject(24, 16, Rgb([200, 40, 40]))]]);
        let raw = decode(&bytes, "exam.pdf").unwrap();

        assert_eq!(raw.source_format, FileKind::Pdf);
        assert_eq!((raw.width(), raw.height()), (24, 16));
        let pixel = raw.pixels.get_pixel(12, 8);
        assert!(pixel[0] > 170 && pixel[1] < 80 && pixel[2] < 80, "{pixel:?}");
    }

    #[test]
    fn test_pdf_flate_gray_image() {
        let bytes = pdf_bytes(vec![vec![flate_gray_xobject(30, 20, 77)]]);
        let raw = decode(&bytes, "exam.pdf").unwrap();

        assert_eq!((raw.width(), raw.height()), (30, 20));
        assert_eq!(raw.pixels.get_pixel(0, 0), &Rgb([77, 77, 77]));
        assert_eq!(raw.pixels.get_pixel(29, 19), &Rgb([77, 77, 77]));
    }

    #[test]
    fn test_pdf_largest_image_wins() {
        let bytes = pdf_bytes(vec![vec![
            jpeg_xobject(16, 8, Rgb([10, 10, 10])),
            flate_gray_xobject(40, 30, 120),
        ]]);
        let raw = decode(&bytes, "exam.pdf").unwrap();

        assert_eq!((raw.width(), raw.height()), (40, 30));
        assert_eq!(raw.pixels.get_pixel(5, 5), &Rgb([120, 120, 120]));
    }

    #[test]
    fn test_pdf_only_first_page_is_used() {
        let bytes = pdf_bytes(vec![
            vec![flate_gray_xobject(20, 10, 50)],
            vec![flate_gray_xobject(80, 60, 200)],
        ]);
        let raw = decode(&bytes, "exam.pdf").unwrap();

        assert_eq!((raw.width(), raw.height()), (20, 10));
        assert_eq!(raw.pixels.get_pixel(3, 3), &Rgb([50, 50, 50]));
    }

    #[test]
    fn test_pdf_without_images_rejected() {
        let bytes = pdf_bytes(vec![vec![]]);
        let err = decode(&bytes, "exam.pdf").unwrap_err();
        assert!(matches!(err, DecodeError::NoPdfImage { .. }));
    }

    #[test]
    fn test_corrupt_pdf_rejected() {
        let err = decode(b"%PDF-garbage", "scan.pdf").unwrap_err();
        assert!(matches!(err, DecodeError::CorruptPdf { .. }));
    }
}
