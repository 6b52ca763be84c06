/// 重复题目聚类服务
///
/// 单遍贪心：每道尚未归组的题作为种子，把之后所有与种子足够相似、且尚未归组的题并入。
/// 只和种子比较，因此结果不具有传递性。
use crate::models::{QuestionGroup, QuestionInstance};
use crate::services::similarity::{normalize, ratio};
use tracing::debug;

/// 默认相似度阈值
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

pub struct DuplicateClusterer {
    threshold: f64,
}

impl Default for DuplicateClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl DuplicateClusterer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 聚类题目实例
    ///
    /// # 参数
    /// - `instances`: 按试卷顺序、题目顺序排列的实例
    ///
    /// # 返回
    /// 按组大小降序排列的题目组，大小相同时保持发现顺序
    pub fn cluster(&self, instances: &[QuestionInstance]) -> Vec<QuestionGroup> {
        let normalized: Vec<Vec<char>> = instances
            .iter()
            .map(|instance| normalize(&instance.text).chars().collect())
            .collect();

        let mut processed = vec![false; instances.len()];
        let mut groups = Vec::new();

        for i in 0..instances.len() {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let mut group = QuestionGroup::seeded_by(&instances[i]);

            for j in (i + 1)..instances.len() {
                if processed[j] {
                    continue;
                }
                if ratio(&normalized[i], &normalized[j]) >= self.threshold {
                    group.push(&instances[j]);
                    processed[j] = true;
                }
            }

            groups.push(group);
        }

        // sort_by 是稳定排序
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        debug!(
            "{} 道题聚为 {} 组 (阈值 {:.2})",
            instances.len(),
            groups.len(),
            self.threshold
        );
        groups
    }
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

    fn corpus() -> Vec<QuestionInstance> {
        vec![
            instance("Explain recursion", "t1", "Januar 2024"),
            instance("Define a binary tree", "t1", "Januar 2024"),
            instance("explain   recursion", "t2", "Jun 2024"),
            instance("What is a deadlock?", "t2", "Jun 2024"),
            instance("Explain recursion.", "t3", "Januar 2024"),
            instance("Define a binary heap", "t3", "Januar 2024"),
        ]
    }

    #[test]
    fn test_groups_near_duplicates() {
        let groups = DuplicateClusterer::default().cluster(&corpus());
        assert_eq!(groups[0].question, "Explain recursion");
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].test_ids, vec!["t1", "t2", "t3"]);
        assert_eq!(groups[0].exam_periods, vec!["Januar 2024", "Jun 2024"]);
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), 6);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let groups = DuplicateClusterer::new(0.99).cluster(&[
            instance("alpha question", "t1", "p"),
            instance("beta question", "t1", "p"),
            instance("gamma question", "t1", "p"),
        ]);
        let order: Vec<&str> = groups.iter().map(|g| g.question.as_str()).collect();
        assert_eq!(order, vec!["alpha question", "beta question", "gamma question"]);
    }

    #[test]
    fn test_not_transitive() {
        // b 与 a、c 都相似，但 a 与 c 不够相似：c 不会因为 b 而并入 a 的组
        let a = "aaaaaaaaaa";
        let b = "aaaaaaaaaabbb";
        let c = "aaaaaaaaaabbbbbbb";
        let clusterer = DuplicateClusterer::new(0.8);
        assert!(crate::services::similarity::similarity_ratio(a, b) >= 0.8);
        assert!(crate::services::similarity::similarity_ratio(b, c) >= 0.8);
        assert!(crate::services::similarity::similarity_ratio(a, c) < 0.8);

        let groups = clusterer.cluster(&[instance(a, "t1", "p"), instance(b, "t2", "p"), instance(c, "t3", "p")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].test_ids, vec!["t1", "t2"]);
        assert_eq!(groups[1].test_ids, vec!["t3"]);
    }

    #[test]
    fn test_group_count_monotonic_in_threshold() {
        let instances = corpus();
        let mut previous = usize::MAX;
        for step in (0..=20).rev() {
            let threshold = step as f64 / 20.0;
            let count = DuplicateClusterer::new(threshold).cluster(&instances).len();
            assert!(count <= previous, "threshold {} produced {} groups", threshold, count);
            previous = count;
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(DuplicateClusterer::default().cluster(&[]).is_empty());
    }
}
