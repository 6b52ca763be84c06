use serde::{Deserialize, Serialize};

/// 一道带编号的题目及其换行续写内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    /// 题号（保留原始数字串，如 "12"）
    pub number: String,
    /// 题目各行，第一行为 "<题号>. <内容>"
    pub lines: Vec<String>,
}

impl QuestionBlock {
    pub fn new(number: impl Into<String>, first_line: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            lines: vec![first_line.into()],
        }
    }

    /// 以换行拼接的完整题目文本
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// 分析时从试卷全文中重新切分出的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInstance {
    pub text: String,
    pub test_id: String,
    pub exam_period: String,
}

/// 一组相似题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionGroup {
    /// 代表文本（组内第一道题）
    pub question: String,
    pub count: usize,
    /// 每个成员对应一个试卷ID，同一试卷可出现多次
    pub test_ids: Vec<String>,
    /// 去重后的考试期次，按首次出现顺序
    pub exam_periods: Vec<String>,
}

impl QuestionGroup {
    /// 以一道题为种子创建新组
    pub fn seeded_by(instance: &QuestionInstance) -> Self {
        Self {
            question: instance.text.clone(),
            count: 1,
            test_ids: vec![instance.test_id.clone()],
            exam_periods: vec![instance.exam_period.clone()],
        }
    }

    /// 加入一道相似题
    pub fn push(&mut self, instance: &QuestionInstance) {
        self.count += 1;
        self.test_ids.push(instance.test_id.clone());
        if !self.exam_periods.contains(&instance.exam_period) {
            self.exam_periods.push(instance.exam_period.clone());
        }
    }
}

/// 科目题目频次分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub subject_code: String,
    pub total_tests: usize,
    pub total_questions: usize,
    pub unique_questions: usize,
    pub groups: Vec<QuestionGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(text: &str, test_id: &str, period: &str) -> QuestionInstance {
        QuestionInstance {
            text: text.to_string(),
            test_id: test_id.to_string(),
            exam_period: period.to_string(),
        }
    }

    #[test]
    fn test_group_dedups_periods_but_not_test_ids() {
        let mut group = QuestionGroup::seeded_by(&instance("q", "t1", "Januar 2024"));
        group.push(&instance("q", "t1", "Januar 2024"));
        group.push(&instance("q", "t2", "Jun 2024"));

        assert_eq!(group.count, 3);
        assert_eq!(group.test_ids, vec!["t1", "t1", "t2"]);
        assert_eq!(group.exam_periods, vec!["Januar 2024", "Jun 2024"]);
    }

    #[test]
    fn test_report_serializes_expected_keys() {
        let report = AnalysisReport {
            subject_code: "CS302".to_string(),
            total_tests: 1,
            total_questions: 0,
            unique_questions: 0,
            groups: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        for key in ["subject_code", "total_tests", "total_questions", "unique_questions", "groups"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }
}
