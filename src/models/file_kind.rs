use phf::phf_map;

/// 允许导入的扫描件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    Pdf,
}

/// 小写扩展名 → 文件类型
static EXTENSIONS: phf::Map<&'static str, FileKind> = phf_map! {
    "jpg" => FileKind::Jpeg,
    "jpeg" => FileKind::Jpeg,
    "png" => FileKind::Png,
    "tiff" => FileKind::Tiff,
    "bmp" => FileKind::Bmp,
    "pdf" => FileKind::Pdf,
};

/// 允许的扩展名（按展示顺序）
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "pdf", "tiff", "bmp"];

impl FileKind {
    /// 从扩展名解析（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS.get(ext.to_lowercase().as_str()).copied()
    }

    /// 从文件名解析，取最后一个 `.` 之后的部分
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_extension(&extension_of(filename))
    }

    /// 对应的 MIME 类型
    pub fn mime_type(self) -> &'static str {
        match self {
            FileKind::Jpeg => "image/jpeg",
            FileKind::Png => "image/png",
            FileKind::Tiff => "image/tiff",
            FileKind::Bmp => "image/bmp",
            FileKind::Pdf => "application/pdf",
        }
    }

    /// 对应的 `image` 解码格式，PDF 没有
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            FileKind::Jpeg => Some(image::ImageFormat::Jpeg),
            FileKind::Png => Some(image::ImageFormat::Png),
            FileKind::Tiff => Some(image::ImageFormat::Tiff),
            FileKind::Bmp => Some(image::ImageFormat::Bmp),
            FileKind::Pdf => None,
        }
    }
}

/// 取文件名的小写扩展名，没有扩展名时返回空字符串
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// 根据扩展名查找 MIME 类型，未知类型返回 `application/octet-stream`
pub fn mime_type_for_extension(ext: &str) -> &'static str {
    FileKind::from_extension(ext)
        .map(FileKind::mime_type)
        .unwrap_or("application/octet-stream")
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileKind::Jpeg => "jpeg",
            FileKind::Png => "png",
            FileKind::Tiff => "tiff",
            FileKind::Bmp => "bmp",
            FileKind::Pdf => "pdf",
        };
        write!(f, "{}", name)
    }
}
