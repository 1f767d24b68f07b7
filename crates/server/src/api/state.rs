//! 统一的应用状态。

use cubert_fs_engine::{Explorer, ScanPolicy, Scanner};

/// 所有 handler 共享的只读状态。
#[derive(Debug, Clone)]
pub struct AppState {
    /// 文件系统查询接口。
    pub explorer: Explorer,
    /// 默认扫描策略；请求只在自己的副本上覆盖，不会修改这里。
    pub default_policy: ScanPolicy,
}

impl AppState {
    /// 创建新的应用状态。
    pub fn new(default_policy: ScanPolicy) -> Self {
        Self {
            explorer: Explorer::new(Scanner::new()),
            default_policy,
        }
    }
}
