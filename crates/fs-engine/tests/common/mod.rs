use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// 临时目录树构建器。
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str, bytes: usize) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, vec![b'x'; bytes]).expect("write fixture file");
        path
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }
}

/// 以 root 身份运行时权限位不生效，相关用例需要跳过。
#[cfg(unix)]
pub fn permissions_enforced(locked: &Path) -> bool {
    fs::read_dir(locked).is_err()
}
