//! 扫描引擎。
//!
//! 递归扫描目录树并记录逐条目错误，统计子树的聚合数据，以及单层目录列表。

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::entry::{Entry, modified_time};
use crate::error::{Result, ScanError};
use crate::policy::{ScanPolicy, is_hidden};

/// 一次完整递归扫描的结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// 扫描根路径。
    pub path: String,
    /// 文件列表（按目录读取顺序）。
    pub files: Vec<Entry>,
    /// 目录列表（按目录读取顺序）。
    pub directories: Vec<Entry>,
    /// 文件总数，等于 `files.len()`。
    pub total_files: usize,
    /// 文件总大小，仅统计文件。
    pub total_size: u64,
    /// 扫描开始时间。
    pub scan_time: DateTime<Utc>,
    /// 错误数量，等于 `errors.len()`。
    pub error_count: usize,
    /// 扫描过程中记录的错误。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ScanResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            files: Vec::new(),
            directories: Vec::new(),
            total_files: 0,
            total_size: 0,
            scan_time: Utc::now(),
            error_count: 0,
            errors: Vec::new(),
        }
    }

    fn record_error(&mut self, message: String) {
        warn!(root = %self.path, error = %message, "scan error recorded");
        self.errors.push(message);
        self.error_count += 1;
    }

    /// 遍历结束后从文件列表折叠出汇总数据。
    fn finalize(&mut self) {
        self.total_files = self.files.len();
        self.total_size = self.files.iter().map(|file| file.size).sum();
    }
}

/// 子树聚合统计，不保留逐条目信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub path: String,
    pub total_files: u64,
    pub total_directories: u64,
    pub total_size: u64,
    /// 所有访问过的条目中最新的修改时间。
    pub last_modified: Option<DateTime<Utc>>,
}

impl DirectoryStats {
    fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            total_files: 0,
            total_directories: 0,
            total_size: 0,
            last_modified: None,
        }
    }

    fn record(&mut self, metadata: &fs::Metadata) {
        if metadata.is_dir() {
            self.total_directories += 1;
        } else {
            self.total_files += 1;
            self.total_size += metadata.len();
        }

        let modified = modified_time(metadata);
        if self.last_modified.is_none_or(|latest| modified > latest) {
            self.last_modified = Some(modified);
        }
    }
}

/// 目录扫描引擎。无内部状态，策略由每次调用传入。
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    /// 递归扫描目录。
    ///
    /// 根路径不存在或不是目录时直接返回错误；遍历过程中的错误（元数据读取失败、
    /// 超出最大深度、子目录无法读取）记录在结果中，扫描继续。
    pub fn scan(&self, path: impl AsRef<Path>, policy: &ScanPolicy) -> Result<ScanResult> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|err| ScanError::from_stat(path, err))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(path.display().to_string()));
        }

        info!(
            path = %path.display(),
            max_depth = policy.max_depth,
            skip_hidden = policy.skip_hidden,
            "scanning directory"
        );

        let mut result = ScanResult::new(path);
        if let Err(err) = self.scan_recursive(path, policy, &mut result, 0) {
            result.record_error(err.to_string());
        }
        result.finalize();

        debug!(
            path = %path.display(),
            files = result.total_files,
            directories = result.directories.len(),
            total_size = result.total_size,
            errors = result.error_count,
            "scan finished"
        );
        Ok(result)
    }

    fn scan_recursive(
        &self,
        dir: &Path,
        policy: &ScanPolicy,
        result: &mut ScanResult,
        depth: usize,
    ) -> Result<()> {
        if depth > policy.max_depth {
            return Err(ScanError::DepthExceeded {
                path: dir.display().to_string(),
                max_depth: policy.max_depth,
            });
        }

        let entries = fs::read_dir(dir).map_err(|source| ScanError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    result.record_error(format!(
                        "failed to read entry in {}: {err}",
                        dir.display()
                    ));
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if policy.excludes(&name) {
                continue;
            }

            let entry_path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    result.record_error(format!(
                        "failed to get info for {}: {err}",
                        entry_path.display()
                    ));
                    continue;
                }
            };

            let local = Entry::from_metadata(&entry_path, &name, &metadata);
            if metadata.is_dir() {
                result.directories.push(local);
                if let Err(err) = self.scan_recursive(&entry_path, policy, result, depth + 1) {
                    result.record_error(err.to_string());
                }
            } else {
                result.files.push(local);
            }
        }

        Ok(())
    }

    /// 单层列出目录内容，无法读取元数据的条目被静默跳过。
    pub fn list_directory(
        &self,
        path: impl AsRef<Path>,
        policy: &ScanPolicy,
    ) -> Result<Vec<Entry>> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|err| ScanError::from_stat(path, err))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(path.display().to_string()));
        }
        let entries = fs::read_dir(path).map_err(|err| ScanError::from_stat(path, err))?;

        info!(path = %path.display(), "listing directory");

        let files = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if policy.excludes(&name) {
                    return None;
                }
                let metadata = entry.metadata().ok()?;
                Some(Entry::from_metadata(&entry.path(), &name, &metadata))
            })
            .collect();

        Ok(files)
    }

    /// 统计整个子树的文件数、目录数、总大小和最新修改时间。
    ///
    /// 根路径本身计入统计。遍历中的错误被忽略，`max_depth` 不生效。
    pub fn directory_stats(
        &self,
        path: impl AsRef<Path>,
        policy: &ScanPolicy,
    ) -> Result<DirectoryStats> {
        let path = path.as_ref();
        ensure_walkable(path)?;

        info!(
            path = %path.display(),
            skip_hidden = policy.skip_hidden,
            "collecting directory stats"
        );

        let mut stats = DirectoryStats::new(path);
        for entry in walk(path, policy.skip_hidden).filter_map(|entry| entry.ok()) {
            if let Ok(metadata) = entry.metadata() {
                stats.record(&metadata);
            }
        }

        debug!(
            path = %path.display(),
            files = stats.total_files,
            directories = stats.total_directories,
            total_size = stats.total_size,
            "directory stats collected"
        );
        Ok(stats)
    }
}

/// 确认遍历可以开始：根路径可 stat，若为目录则可打开。
pub(crate) fn ensure_walkable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|err| ScanError::walk_failed(path, err))?;
    if metadata.is_dir() {
        fs::read_dir(path).map_err(|err| ScanError::walk_failed(path, err))?;
    }
    Ok(())
}

/// 深度优先遍历 `root`。`skip_hidden` 时隐藏条目连同子树一起剪除，根路径本身不受影响。
pub(crate) fn walk(
    root: &Path,
    skip_hidden: bool,
) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| {
            !(skip_hidden && entry.depth() > 0 && is_hidden(&entry.file_name().to_string_lossy()))
        })
}
