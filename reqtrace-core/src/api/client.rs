//! API Client Module
//!
//! Wraps the REST backend: builds project-scoped or global URLs, sends the
//! request through a [`Transport`], and normalizes every failure into
//! [`ApiError`]. Calls are fire-once; nothing is retried.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::api::error::ApiError;
use crate::api::transport::{HttpTransport, Method, RawResponse, Transport};
use crate::models::{
    HistoryEntry, Link, LinkId, MatrixResponse, NewLink, Project, ProjectDraft, ProjectId,
    Requirement, RequirementDraft, RequirementId,
};

/// Which base path a request is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `{base}/api/projects/{project_id}`
    Project,
    /// `{base}/api`
    Global,
}

/// Spreadsheet exports produced by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Requirements and links workbook
    Requirements,
    /// Cross-reference matrix workbook
    Matrix,
}

impl ExportKind {
    fn path(&self) -> &'static str {
        match self {
            ExportKind::Requirements => "/export",
            ExportKind::Matrix => "/export/matrix",
        }
    }

    /// File name the backend suggests for the download
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportKind::Requirements => "requirements_trace.xlsx",
            ExportKind::Matrix => "requirements_matrix.xlsx",
        }
    }
}

/// Operations the front-ends need from the backend.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory backend.
pub trait Api {
    /// Project that scopes requirement calls
    fn project_id(&self) -> Option<ProjectId>;

    fn list_requirements(&self) -> Result<Vec<Requirement>, ApiError>;
    fn get_requirement(&self, id: RequirementId) -> Result<Requirement, ApiError>;
    fn create_requirement(&self, draft: &RequirementDraft) -> Result<Requirement, ApiError>;
    fn update_requirement(
        &self,
        id: RequirementId,
        draft: &RequirementDraft,
    ) -> Result<Requirement, ApiError>;
    fn delete_requirement(&self, id: RequirementId) -> Result<(), ApiError>;
    fn requirement_history(&self, id: RequirementId) -> Result<Vec<HistoryEntry>, ApiError>;

    fn create_link(&self, link: &NewLink) -> Result<Link, ApiError>;
    fn delete_link(&self, id: LinkId) -> Result<(), ApiError>;

    fn matrix(&self) -> Result<MatrixResponse, ApiError>;

    fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError>;
    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> Result<Project, ApiError>;
    fn delete_project(&self, id: ProjectId) -> Result<(), ApiError>;
}

/// Client for the requirements-traceability REST backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    project_id: Option<ProjectId>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ApiClient {
    /// Create a client using the blocking HTTP transport
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Self::with_transport(base_url, Arc::new(HttpTransport::new(timeout)))
    }

    /// Create a client over a specific transport
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            project_id: None,
            transport,
        })
    }

    /// Return a client scoped to `project_id`, sharing the transport
    pub fn for_project(&self, project_id: Option<ProjectId>) -> Self {
        Self {
            project_id,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the scope's base path
    pub fn url_for(&self, scope: Scope, path: &str) -> Result<Url, ApiError> {
        let root = self.base_url.as_str().trim_end_matches('/');
        let full = match scope {
            Scope::Global => format!("{}/api{}", root, path),
            Scope::Project => {
                let project_id = self.project_id.ok_or(ApiError::NoProject)?;
                format!("{}/api/projects/{}{}", root, project_id, path)
            }
        };
        Url::parse(&full).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", full, e)))
    }

    /// URL the browser navigates to for a spreadsheet export
    pub fn export_url(&self, kind: ExportKind) -> Result<Url, ApiError> {
        self.url_for(Scope::Project, kind.path())
    }

    /// Download an export as raw bytes
    pub fn download_export(&self, kind: ExportKind) -> Result<Vec<u8>, ApiError> {
        let url = self.export_url(kind)?;
        let raw = self.execute(Method::Get, &url, None)?;
        if raw.is_success() {
            Ok(raw.body)
        } else {
            Err(error_for(&raw))
        }
    }

    /// Send one request and parse the JSON body
    pub fn request(
        &self,
        scope: Scope,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url_for(scope, path)?;
        let raw = self.execute(method, &url, body)?;
        let result = normalize(&raw);
        if let Err(e) = &result {
            warn!("{} {} failed: {}", method, url, e);
        }
        result
    }

    fn execute(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<RawResponse, ApiError> {
        debug!("{} {}", method, url);
        self.transport
            .execute(method, url.as_str(), body)
            .map_err(|e| {
                warn!("{} {} failed: {}", method, url, e);
                ApiError::Network(e.to_string())
            })
    }

    fn get<T: DeserializeOwned>(&self, scope: Scope, path: &str) -> Result<T, ApiError> {
        decode(self.request(scope, Method::Get, path, None)?)
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        scope: Scope,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        decode(self.request(scope, method, path, Some(&body))?)
    }

    fn delete(&self, scope: Scope, path: &str) -> Result<(), ApiError> {
        self.request(scope, Method::Delete, path, None).map(|_| ())
    }
}

impl Api for ApiClient {
    fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    fn list_requirements(&self) -> Result<Vec<Requirement>, ApiError> {
        self.get(Scope::Project, "/requirements")
    }

    fn get_requirement(&self, id: RequirementId) -> Result<Requirement, ApiError> {
        self.get(Scope::Project, &format!("/requirements/{}", id))
    }

    fn create_requirement(&self, draft: &RequirementDraft) -> Result<Requirement, ApiError> {
        self.send(Scope::Project, Method::Post, "/requirements", draft)
    }

    fn update_requirement(
        &self,
        id: RequirementId,
        draft: &RequirementDraft,
    ) -> Result<Requirement, ApiError> {
        self.send(
            Scope::Project,
            Method::Put,
            &format!("/requirements/{}", id),
            draft,
        )
    }

    fn delete_requirement(&self, id: RequirementId) -> Result<(), ApiError> {
        self.delete(Scope::Project, &format!("/requirements/{}", id))
    }

    fn requirement_history(&self, id: RequirementId) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get(Scope::Project, &format!("/requirements/{}/history", id))
    }

    fn create_link(&self, link: &NewLink) -> Result<Link, ApiError> {
        self.send(Scope::Project, Method::Post, "/links", link)
    }

    fn delete_link(&self, id: LinkId) -> Result<(), ApiError> {
        self.delete(Scope::Global, &format!("/links/{}", id))
    }

    fn matrix(&self) -> Result<MatrixResponse, ApiError> {
        self.get(Scope::Project, "/matrix")
    }

    fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get(Scope::Global, "/projects")
    }

    fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.send(Scope::Global, Method::Post, "/projects", draft)
    }

    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.send(Scope::Global, Method::Put, &format!("/projects/{}", id), draft)
    }

    fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.delete(Scope::Global, &format!("/projects/{}", id))
    }
}

/// Parse a body as JSON; an empty body is `null`
fn parse_body(raw: &RawResponse) -> Result<Value, serde_json::Error> {
    let text = String::from_utf8_lossy(&raw.body);
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(&text)
    }
}

fn error_for(raw: &RawResponse) -> ApiError {
    ApiError::from_status(raw.status, parse_body(raw).ok())
}

/// Turn a completed exchange into the parsed payload or the normalized error
pub fn normalize(raw: &RawResponse) -> Result<Value, ApiError> {
    if !raw.is_success() {
        return Err(error_for(raw));
    }
    parse_body(raw).map_err(|e| ApiError::Parse(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::TransportError;
    use crate::models::{LinkType, RequirementPriority, RequirementStatus, RequirementType};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records what was sent
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
        sent: Mutex<Vec<(Method, String, Option<Value>)>>,
    }

    impl ScriptedTransport {
        fn replying(responses: Vec<Result<RawResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<(Method, String, Option<Value>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(
            &self,
            method: Method,
            url: &str,
            body: Option<&Value>,
        ) -> Result<RawResponse, TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((method, url.to_string(), body.cloned()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(RawResponse::new(200, "")))
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::with_transport("http://localhost:5000/", transport)
            .unwrap()
            .for_project(Some(3))
    }

    #[test]
    fn test_project_scoped_url() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(200, "[]"))]);
        let api = client(transport.clone());

        let reqs = api.list_requirements().unwrap();

        assert!(reqs.is_empty());
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Method::Get);
        assert_eq!(sent[0].1, "http://localhost:5000/api/projects/3/requirements");
    }

    #[test]
    fn test_global_scope_ignores_project() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            200,
            r#"[{"id": 1, "name": "Alpha", "description": ""}]"#,
        ))]);
        let api = client(transport.clone());

        let projects = api.list_projects().unwrap();

        assert_eq!(projects[0].name, "Alpha");
        assert_eq!(transport.sent()[0].1, "http://localhost:5000/api/projects");
    }

    #[test]
    fn test_project_scope_requires_project() {
        let transport = ScriptedTransport::replying(vec![]);
        let api = client(transport.clone()).for_project(None);

        assert_eq!(api.list_requirements().unwrap_err(), ApiError::NoProject);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_create_sends_wire_body() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            201,
            r#"{"id": 9, "title": "T"}"#,
        ))]);
        let api = client(transport.clone());
        let draft = RequirementDraft {
            title: "T".into(),
            description: "D".into(),
            requirement_type: RequirementType::Business,
            status: RequirementStatus::Review,
            priority: RequirementPriority::High,
            source: "S".into(),
            author: "A".into(),
        };

        let created = api.create_requirement(&draft).unwrap();

        assert_eq!(created.id, 9);
        let (method, url, body) = transport.sent().remove(0);
        assert_eq!(method, Method::Post);
        assert!(url.ends_with("/api/projects/3/requirements"));
        assert_eq!(
            body.unwrap(),
            json!({
                "title": "T",
                "description": "D",
                "requirement_type": "Бизнес-требование",
                "status": "На проверке",
                "priority": "Высокий",
                "source": "S",
                "author": "A"
            })
        );
    }

    #[test]
    fn test_http_error_normalized() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            400,
            r#"{"error": "Invalid link data"}"#,
        ))]);
        let api = client(transport);

        let err = api
            .create_link(&NewLink {
                source_id: 1,
                target_id: 1,
                link_type: LinkType::Implements,
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid link data");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.payload(), Some(&json!({"error": "Invalid link data"})));
    }

    #[test]
    fn test_http_error_with_html_body() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            500,
            "<html>Internal Server Error</html>",
        ))]);
        let api = client(transport);

        let err = api.list_requirements().unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.payload(), None);
    }

    #[test]
    fn test_network_error_normalized() {
        let transport = ScriptedTransport::replying(vec![Err(TransportError(
            "connection refused".into(),
        ))]);
        let api = client(transport);

        let err = api.list_requirements().unwrap_err();

        assert_eq!(err, ApiError::Network("connection refused".into()));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_parse_error_on_success_status() {
        let transport =
            ScriptedTransport::replying(vec![Ok(RawResponse::new(200, "not json at all"))]);
        let api = client(transport);

        assert!(matches!(
            api.list_requirements().unwrap_err(),
            ApiError::Parse(_)
        ));
    }

    #[test]
    fn test_empty_body_tolerated_on_delete() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(204, ""))]);
        let api = client(transport.clone());

        api.delete_requirement(4).unwrap();

        let (method, url, body) = transport.sent().remove(0);
        assert_eq!(method, Method::Delete);
        assert!(url.ends_with("/api/projects/3/requirements/4"));
        assert!(body.is_none());
    }

    #[test]
    fn test_delete_link_is_global() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            200,
            r#"{"message": "Link deleted successfully"}"#,
        ))]);
        let api = client(transport.clone());

        api.delete_link(12).unwrap();

        assert_eq!(transport.sent()[0].1, "http://localhost:5000/api/links/12");
    }

    #[test]
    fn test_export_url() {
        let api = client(ScriptedTransport::replying(vec![]));
        assert_eq!(
            api.export_url(ExportKind::Matrix).unwrap().as_str(),
            "http://localhost:5000/api/projects/3/export/matrix"
        );
    }

    #[test]
    fn test_download_export_error() {
        let transport = ScriptedTransport::replying(vec![Ok(RawResponse::new(
            404,
            r#"{"error": "Project not found"}"#,
        ))]);
        let api = client(transport);

        let err = api.download_export(ExportKind::Requirements).unwrap_err();
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new("not a url", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
