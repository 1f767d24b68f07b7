use serde::{Deserialize, Serialize};

/// 扫描策略。每次调用按值传入，引擎本身不保存任何策略状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPolicy {
    /// 最大递归深度，根目录深度为 0。
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// 是否跳过以 `.` 开头的条目及其子树。
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,
}

impl ScanPolicy {
    pub const DEFAULT_MAX_DEPTH: usize = 10;

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub fn with_skip_hidden(self, skip_hidden: bool) -> Self {
        Self {
            skip_hidden,
            ..self
        }
    }

    /// 该名称是否应被隐藏策略排除。
    pub fn excludes(&self, name: &str) -> bool {
        self.skip_hidden && is_hidden(name)
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            skip_hidden: default_skip_hidden(),
        }
    }
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn default_max_depth() -> usize {
    ScanPolicy::DEFAULT_MAX_DEPTH
}

fn default_skip_hidden() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.max_depth, 10);
        assert!(policy.skip_hidden);
    }

    #[test]
    fn builders_leave_other_knob_untouched() {
        let policy = ScanPolicy::default().with_max_depth(2);
        assert_eq!(policy.max_depth, 2);
        assert!(policy.skip_hidden);

        let policy = policy.with_skip_hidden(false);
        assert_eq!(policy.max_depth, 2);
        assert!(!policy.excludes(".git"));
    }

    #[test]
    fn hidden_names_start_with_a_dot() {
        let policy = ScanPolicy::default();
        assert!(policy.excludes(".env"));
        assert!(policy.excludes(".."));
        assert!(!policy.excludes("readme.md"));
        assert!(!policy.excludes("a.b"));
    }
}
