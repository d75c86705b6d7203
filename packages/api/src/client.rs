//! Endpoint methods for `/api/d2d/*`.

use async_trait::async_trait;
use roofing_api_models::{
    CreateMemberRequest, CreatePinRequest, CreateTurfRequest, PinListResponse, TeamListResponse,
    TurfListResponse, UpdateMemberRequest, UpdatePinRequest, UpdateTurfRequest,
};
use roofing_d2d::{BackendError, D2dBackend};
use roofing_d2d_models::{D2dStats, MemberId, Pin, PinId, TeamMember, Turf, TurfId};
use serde::Serialize;

use crate::config::ApiConfig;
use crate::session::Session;
use crate::transport::{self, RetryPolicy};
use crate::ApiError;

const TURFS: &str = "/api/d2d/turfs";
const PINS: &str = "/api/d2d/pins";
const TEAM: &str = "/api/d2d/team";
const STATS: &str = "/api/d2d/stats";

/// HTTP client for the D2D REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    reads: RetryPolicy,
}

impl ApiClient {
    /// Builds a client and its session from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built or
    /// [`ApiError::Io`] if the seed token cannot be stored.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let session = config.session()?;
        Self::with_session(config, session)
    }

    /// Builds a client around an existing session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn with_session(config: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            reads: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_base(),
            },
        })
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let body = transport::send(&self.session, || self.http.get(&url), self.reads).await?;
        transport::parse_json(&body)
    }

    async fn mutate<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<Option<i64>, ApiError> {
        let url = self.url(path);
        log::debug!("{method} {url}");
        let body = transport::send(
            &self.session,
            || {
                let request = self.http.request(method.clone(), &url);
                match payload {
                    Some(payload) => request.json(payload),
                    None => request,
                }
            },
            RetryPolicy::NONE,
        )
        .await?;
        transport::parse_mutation(&body)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.mutate::<()>(reqwest::Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// `GET /api/d2d/turfs`
    ///
    /// # Errors
    ///
    /// See [`transport::send`].
    pub async fn turfs(&self) -> Result<Vec<Turf>, ApiError> {
        Ok(self.get::<TurfListResponse>(TURFS).await?.turfs)
    }

    /// `GET /api/d2d/pins`
    ///
    /// # Errors
    ///
    /// See [`transport::send`].
    pub async fn pins(&self) -> Result<Vec<Pin>, ApiError> {
        Ok(self.get::<PinListResponse>(PINS).await?.pins)
    }

    /// `GET /api/d2d/team`
    ///
    /// # Errors
    ///
    /// See [`transport::send`].
    pub async fn team(&self) -> Result<Vec<TeamMember>, ApiError> {
        Ok(self.get::<TeamListResponse>(TEAM).await?.members)
    }

    /// `GET /api/d2d/stats`
    ///
    /// # Errors
    ///
    /// See [`transport::send`].
    pub async fn d2d_stats(&self) -> Result<D2dStats, ApiError> {
        self.get(STATS).await
    }
}

#[async_trait]
impl D2dBackend for ApiClient {
    async fn list_turfs(&self) -> Result<Vec<Turf>, BackendError> {
        Ok(self.turfs().await?)
    }

    async fn list_pins(&self) -> Result<Vec<Pin>, BackendError> {
        Ok(self.pins().await?)
    }

    async fn list_team(&self) -> Result<Vec<TeamMember>, BackendError> {
        Ok(self.team().await?)
    }

    async fn stats(&self) -> Result<D2dStats, BackendError> {
        Ok(self.d2d_stats().await?)
    }

    async fn create_turf(&self, turf: &CreateTurfRequest) -> Result<Option<TurfId>, BackendError> {
        Ok(self.mutate(reqwest::Method::POST, TURFS, Some(turf)).await?)
    }

    async fn update_turf(
        &self,
        id: TurfId,
        changes: &UpdateTurfRequest,
    ) -> Result<(), BackendError> {
        self.mutate(reqwest::Method::PUT, &format!("{TURFS}/{id}"), Some(changes))
            .await?;
        Ok(())
    }

    async fn delete_turf(&self, id: TurfId) -> Result<(), BackendError> {
        Ok(self.delete(&format!("{TURFS}/{id}")).await?)
    }

    async fn create_pin(&self, pin: &CreatePinRequest) -> Result<Option<PinId>, BackendError> {
        Ok(self.mutate(reqwest::Method::POST, PINS, Some(pin)).await?)
    }

    async fn update_pin(&self, id: PinId, changes: &UpdatePinRequest) -> Result<(), BackendError> {
        self.mutate(reqwest::Method::PUT, &format!("{PINS}/{id}"), Some(changes))
            .await?;
        Ok(())
    }

    async fn delete_pin(&self, id: PinId) -> Result<(), BackendError> {
        Ok(self.delete(&format!("{PINS}/{id}")).await?)
    }

    async fn create_member(
        &self,
        member: &CreateMemberRequest,
    ) -> Result<Option<MemberId>, BackendError> {
        Ok(self.mutate(reqwest::Method::POST, TEAM, Some(member)).await?)
    }

    async fn update_member(
        &self,
        id: MemberId,
        changes: &UpdateMemberRequest,
    ) -> Result<(), BackendError> {
        self.mutate(reqwest::Method::PUT, &format!("{TEAM}/{id}"), Some(changes))
            .await?;
        Ok(())
    }

    async fn delete_member(&self, id: MemberId) -> Result<(), BackendError> {
        Ok(self.delete(&format!("{TEAM}/{id}")).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::session::MemoryTokenStore;

    /// Serves canned responses in order, recording each request head.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = vec![0u8; 16 * 1024];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                log.lock().unwrap().push(head);

                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen)
    }

    fn client(base_url: String, max_retries: u32) -> ApiClient {
        let config = ApiConfig {
            base_url,
            max_retries,
            retry_base_ms: 1,
            ..ApiConfig::default()
        };
        let session = Session::new(MemoryTokenStore::default());
        session.login("secret").unwrap();
        ApiClient::with_session(&config, session).unwrap()
    }

    #[tokio::test]
    async fn lists_turfs_with_bearer_token() {
        let (url, seen) = serve(vec![(
            200,
            r##"{"turfs":[{"id":1,"name":"A","polygon":"[{\"lat\":0,\"lng\":0},{\"lat\":0,\"lng\":1},{\"lat\":1,\"lng\":1}]","color":"#3b82f6"}]}"##,
        )])
        .await;

        let turfs = client(url, 0).turfs().await.unwrap();
        assert_eq!(turfs.len(), 1);
        assert_eq!(turfs[0].polygon.len(), 3);

        let head = seen.lock().unwrap()[0].to_lowercase();
        assert!(head.starts_with("get /api/d2d/turfs "));
        assert!(head.contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn unauthorized_tears_down_session() {
        let (url, _) = serve(vec![(401, r#"{"error":"expired"}"#)]).await;
        let client = client(url, 2);

        let err = client.pins().await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(!client.session().is_authenticated());
        assert_eq!(BackendError::from(err), BackendError::SessionExpired);
    }

    #[tokio::test]
    async fn reads_retry_server_errors() {
        let (url, seen) = serve(vec![(503, ""), (200, r#"{"members":[]}"#)]).await;

        assert!(client(url, 2).team().await.unwrap().is_empty());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mutations_are_not_retried() {
        let (url, seen) = serve(vec![(503, ""), (200, r#"{"success":true,"id":1}"#)]).await;
        let request = CreateMemberRequest {
            name: "Sam".to_string(),
            email: None,
            phone: None,
            role: roofing_d2d_models::TeamRole::Salesperson,
            color: roofing_d2d_models::PaletteColor::default(),
        };

        let err = client(url, 2).create_member(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_mutation_surfaces_message() {
        let (url, seen) = serve(vec![(200, r#"{"success":false,"error":"Pin is locked"}"#)]).await;

        let err = client(url, 0).delete_pin(5).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                message: "Pin is locked".to_string()
            }
        );
        assert!(seen.lock().unwrap()[0].starts_with("DELETE /api/d2d/pins/5 "));
    }

    #[tokio::test]
    async fn not_found_is_a_status_error() {
        let (url, _) = serve(vec![(404, r#"{"error":"Turf not found"}"#)]).await;

        let err = client(url, 2)
            .update_turf(3, &UpdateTurfRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Transport {
                message: "HTTP 404: Turf not found".to_string()
            }
        );
    }
}
