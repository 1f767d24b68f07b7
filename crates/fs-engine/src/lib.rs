//! 本地文件系统扫描引擎。
//!
//! 提供递归扫描、目录统计、名称搜索以及单条目查询，供 server 集成为 HTTP API。

pub mod content_type;
pub mod entry;
pub mod error;
pub mod explorer;
pub mod policy;
pub mod scanner;

pub use entry::{Entry, EntryInfo};
pub use error::{Result, ScanError};
pub use explorer::Explorer;
pub use policy::ScanPolicy;
pub use scanner::{DirectoryStats, ScanResult, Scanner};
