//! 文件系统扫描错误类型。

use std::io;
use std::path::Path;

use thiserror::Error;

/// 扫描引擎与查询接口共用的错误类型。
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {0}")]
    NotFound(String),

    #[error("path is not a directory: {0}")]
    NotADirectory(String),

    #[error("path is not accessible: {0}")]
    NotAccessible(String),

    #[error("maximum depth exceeded: {max_depth} (at {path})")]
    DepthExceeded { path: String, max_depth: usize },

    #[error("failed to walk directory {path}: {source}")]
    WalkFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// 将 stat 失败映射为 `NotFound` / `NotAccessible`。
    ///
    /// `ENOTDIR` 表示路径中间某段是普通文件（如 `file.txt/sub`），目标不存在。
    pub(crate) fn from_stat(path: &Path, err: io::Error) -> Self {
        let display = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound(display),
            io::ErrorKind::PermissionDenied => Self::NotAccessible(display),
            _ => Self::Io {
                path: display,
                source: err,
            },
        }
    }

    pub(crate) fn walk_failed(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.display().to_string()),
            _ => Self::WalkFailed {
                path: path.display().to_string(),
                source: err,
            },
        }
    }
}
