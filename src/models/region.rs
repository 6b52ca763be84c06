use image::RgbImage;

use crate::models::FileKind;

/// 解码后的原始图片
///
/// 只在一次流水线调用内存在，像素统一转换为 RGB8。
#[derive(Debug, Clone)]
pub struct RawImage {
    pub pixels: RgbImage,
    pub source_format: FileKind,
}

impl RawImage {
    pub fn new(pixels: RgbImage, source_format: FileKind) -> Self {
        Self {
            pixels,
            source_format,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 覆盖整张图片的矩形
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// 向四周扩展 `margin` 像素，并裁剪到图片范围内
    pub fn expand_clamped(self, margin: u32, image_width: u32, image_height: u32) -> Self {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        let width = (self.width + 2 * margin).min(image_width.saturating_sub(x));
        let height = (self.height + 2 * margin).min(image_height.saturating_sub(y));
        Self::new(x, y, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 试卷区域：矩形及其裁剪出的像素
#[derive(Debug, Clone)]
pub struct Region {
    pub rect: Rect,
    pub pixels: RgbImage,
}

impl Region {
    /// 从图片中裁剪出矩形区域
    pub fn crop(image: &RgbImage, rect: Rect) -> Self {
        let pixels =
            image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
        Self { rect, pixels }
    }

    /// 整张图片作为区域
    pub fn whole(image: &RgbImage) -> Self {
        Self {
            rect: Rect::full(image.width(), image.height()),
            pixels: image.clone(),
        }
    }
}
