//! 文件系统条目快照。

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content_type::content_type_for;

/// 单个文件或目录的元数据快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// 完整路径。
    pub path: String,
    /// 名称。
    pub name: String,
    /// 大小（字节）。
    pub size: u64,
    /// 修改时间。
    pub mod_time: DateTime<Utc>,
    /// 是否为目录。
    pub is_directory: bool,
    /// 基于扩展名的 MIME 类型。
    pub content_type: String,
    /// 权限字符串，例如 `drwxr-xr-x`。
    pub permissions: String,
}

impl Entry {
    pub fn from_metadata(path: &Path, name: &str, metadata: &Metadata) -> Self {
        Self {
            path: path.display().to_string(),
            name: name.to_string(),
            size: metadata.len(),
            mod_time: modified_time(metadata),
            is_directory: metadata.is_dir(),
            content_type: content_type_for(name).to_string(),
            permissions: permission_string(metadata),
        }
    }
}

/// 单个路径的详细信息：在 [`Entry`] 基础上附加扩展名、父目录和权限标记。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    #[serde(flatten)]
    pub entry: Entry,
    /// 扩展名（含前导 `.`），无扩展名时为空字符串。
    pub extension: String,
    /// 父目录路径。
    pub parent: String,
    /// `readable` / `writable` / `executable`，取值为 `"true"` 或 `"false"`。
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl EntryInfo {
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let name = base_name(path);
        let (readable, writable, executable) = owner_access(metadata);

        let mut flags = BTreeMap::new();
        flags.insert("readable".to_string(), readable.to_string());
        flags.insert("writable".to_string(), writable.to_string());
        flags.insert("executable".to_string(), executable.to_string());

        Self {
            entry: Entry::from_metadata(path, &name, metadata),
            extension: extension_of(path),
            parent: parent_of(path),
            metadata: flags,
        }
    }
}

pub(crate) fn modified_time(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_default()
}

/// 路径的最后一个组成部分；根路径返回自身。
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 词法意义上的父目录：`/` 的父目录是 `/`，单个名称的父目录是 `.`。
pub fn parent_of(path: &Path) -> String {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => ".".to_string(),
        Some(parent) => parent.display().to_string(),
        None => path.display().to_string(),
    }
}

/// 最后一个 `.` 起的后缀（含 `.`），点文件整体视为扩展名：`.bashrc` → `.bashrc`。
fn extension_of(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return String::new(),
    };
    name.rfind('.')
        .map(|dot| name[dot..].to_string())
        .unwrap_or_default()
}

#[cfg(unix)]
fn owner_access(metadata: &Metadata) -> (bool, bool, bool) {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    (mode & 0o400 != 0, mode & 0o200 != 0, mode & 0o100 != 0)
}

#[cfg(not(unix))]
fn owner_access(metadata: &Metadata) -> (bool, bool, bool) {
    (true, !metadata.permissions().readonly(), false)
}

/// 渲染 `ls -l` 风格的权限字符串。
#[cfg(unix)]
pub fn permission_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'l'
    } else if file_type.is_fifo() {
        'p'
    } else if file_type.is_socket() {
        's'
    } else if file_type.is_block_device() {
        'b'
    } else if file_type.is_char_device() {
        'c'
    } else {
        '-'
    };

    let mode = metadata.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
pub fn permission_string(metadata: &Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let rw = if metadata.permissions().readonly() {
        "r--"
    } else {
        "rw-"
    };
    format!("{kind}{rw}{rw}{rw}")
}
