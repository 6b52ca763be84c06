//! 试卷定位服务
//!
//! 从任意照片中找出试卷所在的矩形区域。按顺序尝试多种策略，
//! 第一个成功的结果生效；全部失败时返回整张图片，本服务从不报错。

use crate::models::{Rect, Region};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};
use imageproc::point::Point;
use tracing::{debug, info};

/// 检测区域的宽、高都必须超过原图的这个比例
const MIN_REGION_RATIO: f64 = 0.3;

/// 定位策略
pub trait LocatorStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// 尝试定位试卷，找不到或不可信时返回 `None`
    fn try_locate(&self, image: &RgbImage) -> Option<Region>;
}

/// 白纸颜色掩码
///
/// 在 HSV 空间（OpenCV 8 位刻度）中取低饱和度、高亮度的像素，
/// 经过闭运算和开运算去噪后，取面积最大的外轮廓。
pub struct ColorMaskStrategy {
    pub max_saturation: u8,
    pub min_value: u8,
    /// 形态学方形核边长
    pub kernel_size: u8,
    /// 外接矩形向外扩展的像素数
    pub margin: u32,
}

impl Default for ColorMaskStrategy {
    fn default() -> Self {
        Self {
            max_saturation: 30,
            min_value: 180,
            kernel_size: 10,
            margin: 10,
        }
    }
}

impl ColorMaskStrategy {
    fn white_paper_mask(&self, image: &RgbImage) -> GrayImage {
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let Rgb([r, g, b]) = *image.get_pixel(x, y);
            let value = r.max(g).max(b);
            let min = r.min(g).min(b);
            let saturation = if value == 0 {
                0
            } else {
                ((255 * u32::from(value - min) + u32::from(value) / 2) / u32::from(value)) as u8
            };
            if value >= self.min_value && saturation <= self.max_saturation {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

impl LocatorStrategy for ColorMaskStrategy {
    fn name(&self) -> &'static str {
        "颜色掩码"
    }

    fn try_locate(&self, image: &RgbImage) -> Option<Region> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let kernel = SquareKernel::new(self.kernel_size);
        let mask = self.white_paper_mask(image);
        let mask = kernel.open(&kernel.close(&mask));

        let contours = find_contours::<i32>(&mask);
        let largest = outer_contours(&contours).max_by(|a, b| {
            polygon_area(&a.points).total_cmp(&polygon_area(&b.points))
        });
        let Some(largest) = largest else {
            debug!("颜色掩码中没有找到轮廓");
            return None;
        };

        let rect = bounding_rect(&largest.points)?.expand_clamped(self.margin, width, height);
        if !is_confident(rect, width, height) {
            debug!("颜色掩码区域过小: {:?}", rect);
            return None;
        }
        Some(Region::crop(image, rect))
    }
}

/// 边缘四边形检测
///
/// 灰度化、高斯模糊后做 Canny 边缘检测，在面积最大的几个外轮廓中
/// 寻找可以近似为四边形的轮廓。
pub struct EdgeContourStrategy {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// 只检查面积最大的前 N 个轮廓
    pub candidates: usize,
    /// 多边形近似精度（占周长的比例）
    pub epsilon_ratio: f64,
}

impl Default for EdgeContourStrategy {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 30.0,
            canny_high: 100.0,
            candidates: 5,
            epsilon_ratio: 0.02,
        }
    }
}

impl LocatorStrategy for EdgeContourStrategy {
    fn name(&self) -> &'static str {
        "边缘轮廓"
    }

    fn try_locate(&self, image: &RgbImage) -> Option<Region> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let gray = image::imageops::grayscale(image);
        let blurred = gaussian_blur_f32(&gray, self.blur_sigma);
        let edges = canny(&blurred, self.canny_low, self.canny_high);

        let contours = find_contours::<i32>(&edges);
        let mut candidates: Vec<&Contour<i32>> = outer_contours(&contours).collect();
        if candidates.is_empty() {
            debug!("边缘图中没有找到轮廓");
            return None;
        }
        candidates.sort_by(|a, b| polygon_area(&b.points).total_cmp(&polygon_area(&a.points)));

        let quad = candidates.into_iter().take(self.candidates).find(|contour| {
            let perimeter = arc_length(&contour.points, true);
            approximate_polygon_dp(&contour.points, self.epsilon_ratio * perimeter, true).len() == 4
        });
        let Some(quad) = quad else {
            debug!("没有找到四边形轮廓");
            return None;
        };

        // 近似多边形总是保留轮廓的起点，顶点不一定落在角上，外接矩形取自轮廓本身
        let rect = bounding_rect(&quad.points)?;
        if !is_confident(rect, width, height) {
            debug!("四边形区域过小: {:?}", rect);
            return None;
        }
        Some(Region::crop(image, rect))
    }
}

/// 白边自动裁剪
///
/// 固定阈值二值化后，保留白色像素占比超过 70% 的行和列之间的区域。
/// 不做最小尺寸检查。
pub struct MarginCropStrategy {
    pub threshold: u8,
    pub fill_ratio: f64,
}

impl Default for MarginCropStrategy {
    fn default() -> Self {
        Self {
            threshold: 127,
            fill_ratio: 0.7,
        }
    }
}

impl LocatorStrategy for MarginCropStrategy {
    fn name(&self) -> &'static str {
        "白边裁剪"
    }

    fn try_locate(&self, image: &RgbImage) -> Option<Region> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let gray = image::imageops::grayscale(image);
        let mut row_sums = vec![0u64; height as usize];
        let mut col_sums = vec![0u64; width as usize];
        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel[0] > self.threshold {
                row_sums[y as usize] += 255;
                col_sums[x as usize] += 255;
            }
        }

        let row_limit = self.fill_ratio * 255.0 * f64::from(width);
        let col_limit = self.fill_ratio * 255.0 * f64::from(height);
        let (top, bottom) = first_and_last(&row_sums, row_limit)?;
        let (left, right) = first_and_last(&col_sums, col_limit)?;

        let rect = Rect::new(left, top, right - left + 1, bottom - top + 1);
        Some(Region::crop(image, rect))
    }
}

/// 试卷定位器
pub struct PaperLocator {
    strategies: Vec<Box<dyn LocatorStrategy>>,
}

impl Default for PaperLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperLocator {
    /// 默认策略顺序：颜色掩码 → 边缘轮廓 → 白边裁剪
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(ColorMaskStrategy::default()),
            Box::new(EdgeContourStrategy::default()),
            Box::new(MarginCropStrategy::default()),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn LocatorStrategy>>) -> Self {
        Self { strategies }
    }

    /// 定位试卷区域，所有策略都失败时返回整张图片
    pub fn locate(&self, image: &RgbImage) -> Region {
        debug!("定位试卷区域，图片尺寸 {}x{}", image.width(), image.height());

        for strategy in &self.strategies {
            if let Some(region) = strategy.try_locate(image) {
                info!(
                    "✓ {} 定位成功: ({}, {}) {}x{}",
                    strategy.name(),
                    region.rect.x,
                    region.rect.y,
                    region.rect.width,
                    region.rect.height
                );
                return region;
            }
            debug!("{} 未找到试卷", strategy.name());
        }

        info!("未检测到试卷边界，使用整张图片");
        Region::whole(image)
    }
}

/// 方形结构元素，拆成一行和一列分别做
///
/// 锚点在 `size / 2`，偶数边长时与 OpenCV 的默认锚点一致
struct SquareKernel {
    row: Mask,
    column: Mask,
}

impl SquareKernel {
    fn new(size: u8) -> Self {
        let size = size.max(1);
        let anchor = size / 2;
        let line = |w: u32, h: u32| GrayImage::from_pixel(w, h, Luma([255]));
        Self {
            row: Mask::from_image(&line(u32::from(size), 1), anchor, 0),
            column: Mask::from_image(&line(1, u32::from(size)), 0, anchor),
        }
    }

    fn dilate(&self, image: &GrayImage) -> GrayImage {
        grayscale_dilate(&grayscale_dilate(image, &self.row), &self.column)
    }

    fn erode(&self, image: &GrayImage) -> GrayImage {
        grayscale_erode(&grayscale_erode(image, &self.row), &self.column)
    }

    fn close(&self, image: &GrayImage) -> GrayImage {
        self.erode(&self.dilate(image))
    }

    fn open(&self, image: &GrayImage) -> GrayImage {
        self.dilate(&self.erode(image))
    }
}

fn outer_contours(contours: &[Contour<i32>]) -> impl Iterator<Item = &Contour<i32>> {
    contours
        .iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
}

fn is_confident(rect: Rect, image_width: u32, image_height: u32) -> bool {
    f64::from(rect.height) > f64::from(image_height) * MIN_REGION_RATIO
        && f64::from(rect.width) > f64::from(image_width) * MIN_REGION_RATIO
}

/// 多边形面积（鞋带公式）
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y))
        .sum();
    twice.abs() as f64 / 2.0
}

/// 点集的外接矩形（包含边界像素）
fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let min_x = points.iter().map(|p| p.x).min()?.max(0);
    let min_y = points.iter().map(|p| p.y).min()?.max(0);
    let max_x = points.iter().map(|p| p.x).max()?;
    let max_y = points.iter().map(|p| p.y).max()?;
    if max_x < min_x || max_y < min_y {
        return None;
    }
    Some(Rect::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

fn first_and_last(sums: &[u64], limit: f64) -> Option<(u32, u32)> {
    let first = sums.iter().position(|&s| s as f64 > limit)?;
    let last = sums.iter().rposition(|&s| s as f64 > limit)?;
    Some((first as u32, last as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK: Rgb<u8> = Rgb([40, 40, 40]);
    const WHITE: Rgb<u8> = Rgb([245, 245, 245]);

    fn canvas_with_patch(size: u32, from: u32, to: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (from..to).contains(&x) && (from..to).contains(&y) {
                WHITE
            } else {
                DARK
            }
        })
    }

    #[test]
    fn test_large_white_paper_is_cropped() {
        let image = canvas_with_patch(200, 20, 180);
        let region = PaperLocator::new().locate(&image);
        // 10x10 核的锚点偏向左上，闭开运算后掩码为 22..=181
        assert_eq!(region.rect, Rect::new(12, 12, 180, 180));
        assert_eq!(region.pixels.dimensions(), (180, 180));
    }

    #[test]
    fn test_small_patch_returns_original() {
        let image = canvas_with_patch(200, 50, 60);
        let region = PaperLocator::new().locate(&image);
        assert_eq!(region.rect, Rect::full(200, 200));
        assert_eq!(region.pixels, image);
    }

    #[test]
    fn test_edge_strategy_rejects_small_quad() {
        let image = canvas_with_patch(200, 50, 60);
        assert!(EdgeContourStrategy::default().try_locate(&image).is_none());
    }

    #[test]
    fn test_edge_strategy_keeps_whole_gray_sheet() {
        // 灰色纸张亮度不足，颜色掩码找不到，由边缘轮廓定位
        let image = RgbImage::from_fn(200, 160, |x, y| {
            if (30..170).contains(&x) && (20..140).contains(&y) {
                Rgb([150, 150, 150])
            } else {
                DARK
            }
        });
        assert!(ColorMaskStrategy::default().try_locate(&image).is_none());

        let region = EdgeContourStrategy::default().try_locate(&image).unwrap();
        let rect = region.rect;
        assert!((27..=30).contains(&rect.x), "{rect:?}");
        assert!((17..=20).contains(&rect.y), "{rect:?}");
        assert!((170..=173).contains(&(rect.x + rect.width)), "{rect:?}");
        assert!((140..=143).contains(&(rect.y + rect.height)), "{rect:?}");

        assert_eq!(PaperLocator::new().locate(&image).rect, rect);
    }

    #[test]
    fn test_square_kernel_closes_small_gaps() {
        let kernel = SquareKernel::new(10);
        let mut mask = GrayImage::from_pixel(40, 40, Luma([255]));
        mask.put_pixel(20, 20, Luma([0]));
        assert_eq!(kernel.close(&mask), GrayImage::from_pixel(40, 40, Luma([255])));

        let mut speck = GrayImage::new(40, 40);
        speck.put_pixel(20, 20, Luma([255]));
        assert_eq!(kernel.open(&speck), GrayImage::new(40, 40));
    }

    #[test]
    fn test_edge_strategy_on_blank_image() {
        let image = RgbImage::from_pixel(64, 64, WHITE);
        assert!(EdgeContourStrategy::default().try_locate(&image).is_none());
    }

    #[test]
    fn test_margin_crop_is_inclusive() {
        let image = RgbImage::from_fn(100, 80, |x, y| {
            if (10..=89).contains(&x) && (5..=74).contains(&y) {
                WHITE
            } else {
                Rgb([0, 0, 0])
            }
        });
        let region = MarginCropStrategy::default().try_locate(&image).unwrap();
        assert_eq!(region.rect, Rect::new(10, 5, 80, 70));
    }

    #[test]
    fn test_saturated_colours_are_not_paper() {
        let image = RgbImage::from_pixel(50, 50, Rgb([250, 40, 40]));
        assert!(ColorMaskStrategy::default().try_locate(&image).is_none());
    }

    #[test]
    fn test_empty_image_falls_back_to_whole() {
        let image = RgbImage::new(0, 0);
        let region = PaperLocator::new().locate(&image);
        assert!(region.rect.is_empty());
    }

    #[test]
    fn test_polygon_area_of_square() {
        let square = [Point::new(0, 0), Point::new(10, 0), Point::new(10, 10), Point::new(0, 10)];
        assert_eq!(polygon_area(&square), 100.0);
    }
}
