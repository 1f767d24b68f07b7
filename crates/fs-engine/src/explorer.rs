//! 查询接口：单条目信息、列表、搜索、根目录发现与路径校验。

use std::fs::{self, File};
use std::path::Path;

use tracing::{debug, info};

use crate::entry::{Entry, EntryInfo, parent_of};
use crate::error::{Result, ScanError};
use crate::policy::ScanPolicy;
use crate::scanner::{Scanner, ensure_walkable, walk};

/// 主根目录。
pub const PRIMARY_ROOT: &str = "/";

/// 存在时一并返回的常见目录。
pub const ROOT_CANDIDATES: &[&str] = &["/home", "/usr", "/var", "/tmp"];

/// 建立在 [`Scanner`] 之上的非递归查询操作（搜索除外）。
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    scanner: Scanner,
}

impl Explorer {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// 获取单个路径的详细信息（跟随符号链接）。
    pub fn entry_info(&self, path: impl AsRef<Path>) -> Result<EntryInfo> {
        let path = path.as_ref();
        let metadata =
            fs::metadata(path).map_err(|_| ScanError::NotFound(path.display().to_string()))?;
        Ok(EntryInfo::from_metadata(path, &metadata))
    }

    pub fn list_directory(
        &self,
        path: impl AsRef<Path>,
        policy: &ScanPolicy,
    ) -> Result<Vec<Entry>> {
        self.scanner.list_directory(path, policy)
    }

    /// 按名称搜索：大小写不敏感的子串匹配，结果保持遍历顺序。
    ///
    /// 隐藏条目及其子树总是被排除；遍历中的错误被忽略，不受最大深度限制。
    pub fn search_files(&self, root: impl AsRef<Path>, query: &str) -> Result<Vec<Entry>> {
        let root = root.as_ref();
        ensure_walkable(root)?;

        info!(root = %root.display(), query, "searching files");

        let needle = query.to_lowercase();
        let results: Vec<Entry> = walk(root, true)
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.to_lowercase().contains(&needle) {
                    return None;
                }
                let metadata = entry.metadata().ok()?;
                Some(Entry::from_metadata(entry.path(), &name, &metadata))
            })
            .collect();

        debug!(root = %root.display(), query, matches = results.len(), "search finished");
        Ok(results)
    }

    /// 返回 `/` 以及本机上存在的常见目录。
    pub fn system_roots(&self) -> Vec<String> {
        collect_roots(ROOT_CANDIDATES)
    }

    /// 校验路径存在且可以打开读取。
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::metadata(path).map_err(|_| ScanError::NotFound(path.display().to_string()))?;
        File::open(path).map_err(|_| ScanError::NotAccessible(path.display().to_string()))?;
        Ok(())
    }

    pub fn parent_directory(&self, path: impl AsRef<Path>) -> String {
        parent_of(path.as_ref())
    }
}

fn collect_roots(candidates: &[&str]) -> Vec<String> {
    let mut roots = vec![PRIMARY_ROOT.to_string()];
    roots.extend(
        candidates
            .iter()
            .filter(|dir| fs::metadata(dir).is_ok())
            .map(|dir| dir.to_string()),
    );
    roots
}
