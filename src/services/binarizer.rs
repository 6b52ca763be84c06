/// 二值化服务
///
/// 灰度化后使用 Otsu 全局阈值，高于阈值的像素为 255，其余为 0
use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use tracing::debug;

/// 将彩色区域二值化
pub fn binarize(image: &RgbImage) -> GrayImage {
    binarize_gray(&image::imageops::grayscale(image))
}

/// 对已经是灰度的图片做二值化
pub fn binarize_gray(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!("Otsu 阈值: {}", level);
    threshold(gray, level, ThresholdType::Binary)
}
