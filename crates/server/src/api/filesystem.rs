//! 文件系统 API 路由。
//!
//! 提供扫描、列表、统计、搜索等能力给前端组件使用。所有文件系统操作都在
//! 阻塞线程池中同步执行。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cubert_api_types::{
    ErrorResponse, ListingResponse, RootsResponse, SearchResponse, SuccessResponse,
    ValidatePathRequest, ValidatePathResponse,
};
use cubert_fs_engine::{DirectoryStats, Entry, EntryInfo, ScanError, ScanPolicy, ScanResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::state::AppState;

/// 文件系统 API 路径前缀。
pub const FILESYSTEM_PREFIX: &str = "/api/v1/filesystem";

/// 创建文件系统 API 路由。
pub fn create_filesystem_router() -> Router<Arc<AppState>> {
    let routes = Router::new()
        // 递归扫描
        .route("/scan", get(scan_directory))
        // 单层列表
        .route("/list", get(list_directory))
        // 单条目信息
        .route("/info", get(get_entry_info))
        // 子树统计
        .route("/stats", get(get_directory_stats))
        // 名称搜索
        .route("/search", get(search_files))
        // 系统根目录
        .route("/roots", get(get_system_roots))
        // 路径校验
        .route("/validate", post(validate_path));

    Router::new().nest(FILESYSTEM_PREFIX, routes)
}

type ApiResult<T> = Result<Json<SuccessResponse<T>>, ApiError>;

fn ok<T: Serialize>(data: T) -> Json<SuccessResponse<T>> {
    Json(SuccessResponse::new(StatusCode::OK.as_u16(), data))
}

/// 路径类查询参数。策略参数无法解析时被忽略。
#[derive(Debug, Default, Deserialize)]
struct PathQuery {
    path: Option<String>,
    max_depth: Option<String>,
    skip_hidden: Option<String>,
}

impl PathQuery {
    fn required_path(&self) -> Result<String, ApiError> {
        non_empty(self.path.as_deref())
            .ok_or_else(|| ApiError::bad_request("Path parameter is required"))
    }

    /// 在默认策略的副本上应用本次请求的覆盖值。
    fn policy(&self, defaults: ScanPolicy) -> ScanPolicy {
        let mut policy = defaults;
        if let Some(depth) = self
            .max_depth
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|depth| *depth > 0)
        {
            policy = policy.with_max_depth(depth as usize);
        }
        if let Some(skip) = self.skip_hidden.as_deref().and_then(parse_bool) {
            policy = policy.with_skip_hidden(skip);
        }
        policy
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    path: Option<String>,
    q: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// 布尔参数解析，接受 `1 t T TRUE true True` 与 `0 f F FALSE false False`。
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Filesystem task failed".to_string(),
        error: err.to_string(),
    })
}

/// 递归扫描目录。
async fn scan_directory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> ApiResult<ScanResult> {
    let path = query.required_path()?;
    let policy = query.policy(state.default_policy);
    let explorer = state.explorer.clone();

    let result = run_blocking(move || explorer.scanner().scan(&path, &policy))
        .await?
        .map_err(|err| ApiError::from_scan("Failed to scan directory", err))?;
    Ok(ok(result))
}

/// 列出目录内容。
async fn list_directory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> ApiResult<ListingResponse<Entry>> {
    let path = query.required_path()?;
    let policy = query.policy(state.default_policy);
    let explorer = state.explorer.clone();

    let target = path.clone();
    let files = run_blocking(move || explorer.list_directory(&target, &policy))
        .await?
        .map_err(|err| ApiError::from_scan("Failed to list directory", err))?;
    Ok(ok(ListingResponse::new(path, files)))
}

/// 获取单个路径信息。
async fn get_entry_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> ApiResult<EntryInfo> {
    let path = query.required_path()?;
    let explorer = state.explorer.clone();

    let info = run_blocking(move || explorer.entry_info(&path))
        .await?
        .map_err(|err| ApiError::from_scan("File not found", err))?;
    Ok(ok(info))
}

/// 获取目录统计。
async fn get_directory_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> ApiResult<DirectoryStats> {
    let path = query.required_path()?;
    let policy = query.policy(state.default_policy);
    let explorer = state.explorer.clone();

    let stats = run_blocking(move || explorer.scanner().directory_stats(&path, &policy))
        .await?
        .map_err(|err| ApiError::from_scan("Failed to get directory stats", err))?;
    Ok(ok(stats))
}

/// 搜索文件。
async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResponse<Entry>> {
    let path = non_empty(query.path.as_deref())
        .ok_or_else(|| ApiError::bad_request("Path parameter is required"))?;
    let needle = non_empty(query.q.as_deref())
        .ok_or_else(|| ApiError::bad_request("Query parameter is required"))?;
    let explorer = state.explorer.clone();

    let (root, q) = (path.clone(), needle.clone());
    let results = run_blocking(move || explorer.search_files(&root, &q))
        .await?
        .map_err(|err| ApiError::from_scan("Search failed", err))?;
    Ok(ok(SearchResponse::new(path, needle, results)))
}

/// 获取系统根目录。
async fn get_system_roots(State(state): State<Arc<AppState>>) -> ApiResult<RootsResponse> {
    let explorer = state.explorer.clone();
    let roots = run_blocking(move || explorer.system_roots()).await?;
    Ok(ok(RootsResponse::new(roots)))
}

/// 校验路径存在且可读。
async fn validate_path(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValidatePathRequest>, JsonRejection>,
) -> ApiResult<ValidatePathResponse> {
    let Json(request) = body.map_err(|rejection| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: "Invalid request body".to_string(),
        error: rejection.body_text(),
    })?;
    let explorer = state.explorer.clone();

    let path = request.path.clone();
    run_blocking(move || explorer.validate_path(&path))
        .await?
        .map_err(|err| ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid path".to_string(),
            error: err.to_string(),
        })?;

    Ok(ok(ValidatePathResponse {
        path: request.path,
        valid: true,
    }))
}

/// API 错误类型。
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    error: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            error: String::new(),
        }
    }

    fn from_scan(message: &str, err: ScanError) -> Self {
        let status = match &err {
            ScanError::NotFound(_) => StatusCode::NOT_FOUND,
            ScanError::NotADirectory(_) => StatusCode::BAD_REQUEST,
            ScanError::NotAccessible(_) => StatusCode::FORBIDDEN,
            ScanError::DepthExceeded { .. }
            | ScanError::WalkFailed { .. }
            | ScanError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: message.to_string(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(
                status = %self.status,
                message = %self.message,
                error = %self.error,
                "request failed"
            );
        }
        let body = Json(ErrorResponse {
            error: self.error,
            message: self.message,
            code: self.status.as_u16(),
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        create_filesystem_router().with_state(Arc::new(AppState::new(ScanPolicy::default())))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, value)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        send(Request::get(uri).body(Body::empty()).expect("build request")).await
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, Value) {
        send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), vec![b'x'; 10]).expect("write a.txt");
        fs::write(dir.path().join(".hidden"), vec![b'x'; 5]).expect("write .hidden");
        fs::create_dir_all(dir.path().join("one/two")).expect("create dirs");
        fs::write(dir.path().join("one/two/Report.txt"), b"r").expect("write report");
        dir
    }

    #[test]
    fn test_parse_bool_accepts_go_style_literals() {
        assert_eq!(parse_bool("T"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_policy_overrides_are_per_request() {
        let defaults = ScanPolicy::default();
        let query = PathQuery {
            path: Some("/".to_string()),
            max_depth: Some("3".to_string()),
            skip_hidden: Some("false".to_string()),
        };
        let policy = query.policy(defaults);
        assert_eq!(policy.max_depth, 3);
        assert!(!policy.skip_hidden);
        assert_eq!(defaults, ScanPolicy::default());

        let ignored = PathQuery {
            path: None,
            max_depth: Some("0".to_string()),
            skip_hidden: Some("maybe".to_string()),
        };
        assert_eq!(ignored.policy(defaults), defaults);

        let negative = PathQuery {
            max_depth: Some("-2".to_string()),
            ..PathQuery::default()
        };
        assert_eq!(negative.policy(defaults), defaults);
    }

    #[tokio::test]
    async fn test_scan_endpoint_wraps_result() {
        let dir = fixture();
        let uri = format!("{FILESYSTEM_PREFIX}/scan?path={}", dir.path().display());

        let (status, body) = get_json(&uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["total_files"], 2);
        assert_eq!(body["data"]["total_size"], 11);
        assert_eq!(body["data"]["error_count"], 0);
    }

    #[tokio::test]
    async fn test_scan_endpoint_applies_query_policy() {
        let dir = fixture();
        let uri = format!(
            "{FILESYSTEM_PREFIX}/scan?path={}&max_depth=1&skip_hidden=false",
            dir.path().display()
        );

        let (status, body) = get_json(&uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_files"], 2);
        assert_eq!(body["data"]["total_size"], 15);
        assert_eq!(body["data"]["error_count"], 1);
    }

    #[tokio::test]
    async fn test_missing_path_is_bad_request() {
        let (status, body) = get_json(&format!("{FILESYSTEM_PREFIX}/scan")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Path parameter is required");
    }

    #[tokio::test]
    async fn test_scan_missing_directory_is_not_found() {
        let dir = fixture();
        let uri = format!("{FILESYSTEM_PREFIX}/scan?path={}/nope", dir.path().display());

        let (status, body) = get_json(&uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Failed to scan directory");
        assert!(body["error"].as_str().unwrap_or_default().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_scan_through_a_file_is_not_found() {
        let dir = fixture();
        let uri = format!("{FILESYSTEM_PREFIX}/scan?path={}/a.txt/sub", dir.path().display());

        let (status, _) = get_json(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("{FILESYSTEM_PREFIX}/list?path={}/a.txt", dir.path().display());
        let (status, body) = get_json(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("not a directory"));
    }

    #[tokio::test]
    async fn test_list_and_stats_endpoints() {
        let dir = fixture();

        let (status, body) =
            get_json(&format!("{FILESYSTEM_PREFIX}/list?path={}", dir.path().display())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);

        let (status, body) =
            get_json(&format!("{FILESYSTEM_PREFIX}/stats?path={}", dir.path().display())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_files"], 2);
        assert_eq!(body["data"]["total_directories"], 3);
        assert_eq!(body["data"]["total_size"], 11);
    }

    #[tokio::test]
    async fn test_info_endpoint() {
        let dir = fixture();
        let file = dir.path().join("a.txt");

        let (status, body) =
            get_json(&format!("{FILESYSTEM_PREFIX}/info?path={}", file.display())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "a.txt");
        assert_eq!(body["data"]["extension"], ".txt");
        assert_eq!(body["data"]["parent"], dir.path().display().to_string());

        let (status, body) = get_json(&format!(
            "{FILESYSTEM_PREFIX}/info?path={}/ghost.txt",
            dir.path().display()
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "File not found");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let dir = fixture();

        let (status, body) = get_json(&format!(
            "{FILESYSTEM_PREFIX}/search?path={}&q=report",
            dir.path().display()
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["query"], "report");
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["results"][0]["name"], "Report.txt");

        let (status, body) = get_json(&format!(
            "{FILESYSTEM_PREFIX}/search?path={}",
            dir.path().display()
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Query parameter is required");
    }

    #[tokio::test]
    async fn test_roots_endpoint() {
        let (status, body) = get_json(&format!("{FILESYSTEM_PREFIX}/roots")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["roots"][0], "/");
        assert!(body["data"]["count"].as_u64().unwrap_or_default() >= 1);
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let dir = fixture();
        let path = dir.path().display().to_string();

        let (status, body) = post_json(
            &format!("{FILESYSTEM_PREFIX}/validate"),
            &serde_json::json!({ "path": path }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["valid"], true);

        let (status, body) = post_json(
            &format!("{FILESYSTEM_PREFIX}/validate"),
            &serde_json::json!({ "path": format!("{path}/ghost") }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid path");
        assert!(body["error"].as_str().unwrap_or_default().contains("does not exist"));

        let (status, body) = post_json(&format!("{FILESYSTEM_PREFIX}/validate"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request body");
    }
}
