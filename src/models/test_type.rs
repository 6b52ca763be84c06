/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// 常规考试
    #[default]
    Regular,
    /// 补考
    Makeup,
    /// 期中
    Midterm,
    /// 期末
    Final,
    /// 实践/上机
    Practical,
}

impl TestType {
    /// 获取存储用的小写名称
    pub fn name(self) -> &'static str {
        match self {
            TestType::Regular => "regular",
            TestType::Makeup => "makeup",
            TestType::Midterm => "midterm",
            TestType::Final => "final",
            TestType::Practical => "practical",
        }
    }

    /// 尝试从字符串解析（不区分大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Some(TestType::Regular),
            "makeup" => Some(TestType::Makeup),
            "midterm" => Some(TestType::Midterm),
            "final" => Some(TestType::Final),
            "practical" => Some(TestType::Practical),
            _ => None,
        }
    }

    /// 解析失败时回退为常规考试
    pub fn parse_or_regular(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            tracing::warn!("⚠️ 未知的考试类型 '{}'，按 regular 处理", s);
            TestType::Regular
        })
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
