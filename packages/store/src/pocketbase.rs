//! # PocketBase-backed user store
//!
//! [`PocketBaseStore`] talks to a PocketBase-style REST backend over `reqwest`.
//! The same client compiles for native targets and for `wasm32` (where `reqwest`
//! delegates to the browser's `fetch`).
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list | `GET {url}/api/collections/{collection}/records?page=N&perPage=B&sort=S&skipTotal=1`, repeated until a page comes back short |
//! | create | `POST {url}/api/collections/{collection}/records` as `multipart/form-data` |
//! | file URL | `{url}/api/files/{collection}/{record id}/{file name}?thumb=WxH` |
//!
//! Error responses look like `{"code": 400, "message": "...", "data": {"email": {"code": "...", "message": "..."}}}`
//! and become [`StoreError::Response`].

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{CreateUserPayload, UserRecord};
use crate::repo::{FileOptions, ListQuery, UserStore};

/// Message used when the store's error body carries none.
const GENERIC_ERROR: &str = "Something went wrong while processing your request.";

/// One page of a record listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordPage<T> {
    #[serde(default)]
    per_page: Option<u32>,
    items: Vec<T>,
}

/// Error body returned by the store.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: BTreeMap<String, FieldError>,
}

#[derive(Debug, Default, Deserialize)]
struct FieldError {
    #[serde(default)]
    message: String,
}

/// HTTP client for a PocketBase user collection.
#[derive(Clone, Debug)]
pub struct PocketBaseStore {
    client: Client,
    base_url: String,
    collection: String,
    token: Option<String>,
}

impl PocketBaseStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn records_url(&self) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.base_url,
            urlencoding::encode(&self.collection)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }

    async fn fetch_page(
        &self,
        query: &ListQuery,
        page: u32,
        per_page: u32,
    ) -> Result<RecordPage<UserRecord>, StoreError> {
        let request = self.client.get(self.records_url()).query(&[
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
            ("sort", query.sort.clone()),
            ("skipTotal", "1".to_string()),
        ]);
        let response = self.authorize(request).send().await?;
        decode(response).await
    }
}

/// Turn a response into `T`, or into a [`StoreError`] when the status is not a success.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()));
    }
    Err(error_from_body(status.as_u16(), &body))
}

fn error_from_body(status: u16, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        GENERIC_ERROR.to_string()
    } else {
        parsed.message
    };
    let fields = parsed
        .data
        .into_iter()
        .filter(|(_, f)| !f.message.is_empty())
        .map(|(name, f)| (name, f.message))
        .collect();
    StoreError::Response {
        status,
        message,
        fields,
    }
}

/// Build the multipart body for a create request.
fn create_form(payload: CreateUserPayload) -> Result<Form, StoreError> {
    let mut form = Form::new();
    for (name, value) in payload.text_fields() {
        form = form.text(name, value);
    }
    if let Some(avatar) = payload.avatar {
        let part = Part::bytes(avatar.bytes)
            .file_name(avatar.file_name)
            .mime_str(&avatar.media_type)?;
        form = form.part("avatar", part);
    }
    Ok(form)
}

impl UserStore for PocketBaseStore {
    async fn list_users(&self, query: &ListQuery) -> Result<Vec<UserRecord>, StoreError> {
        let per_page = query.batch_size.max(1);
        let mut users = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.fetch_page(query, page, per_page).await?;
            let received = batch.items.len();
            users.extend(batch.items);
            debug!(page, received, "fetched user page");
            if received == 0 || received < batch.per_page.unwrap_or(per_page) as usize {
                break;
            }
            page += 1;
        }
        Ok(users)
    }

    async fn create_user(&self, payload: CreateUserPayload) -> Result<UserRecord, StoreError> {
        debug!(?payload, "creating user");
        let form = create_form(payload)?;
        let request = self.client.post(self.records_url()).multipart(form);
        let response = self.authorize(request).send().await?;
        decode(response).await.inspect_err(|e| {
            warn!("store rejected user creation: {e}");
        })
    }

    fn file_url(&self, record: &UserRecord, file: &str, options: &FileOptions) -> String {
        if file.is_empty() || record.id.is_empty() {
            return String::new();
        }
        let collection = record
            .collection_id
            .as_deref()
            .or(record.collection_name.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(self.collection.as_str());
        let mut url = format!(
            "{}/api/files/{}/{}/{}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(&record.id),
            urlencoding::encode(file),
        );
        if let Some(thumb) = options.thumb.as_deref().filter(|t| !t.is_empty()) {
            url.push_str("?thumb=");
            url.push_str(&urlencoding::encode(thumb));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn store() -> PocketBaseStore {
        PocketBaseStore::new(&StoreConfig {
            url: "https://pb.example.com/".to_string(),
            ..StoreConfig::default()
        })
    }

    fn record(id: &str) -> UserRecord {
        serde_json::from_value(serde_json::json!({ "id": id, "email": "a@b.com" })).unwrap()
    }

    #[test]
    fn test_records_url_trims_slash() {
        assert_eq!(
            store().records_url(),
            "https://pb.example.com/api/collections/users/records"
        );
    }

    #[test]
    fn test_file_url_with_thumb() {
        let mut user = record("abc123");
        user.collection_id = Some("_pb_users_auth_".to_string());
        let url = store().file_url(&user, "face one.png", &FileOptions::thumb("100x100"));
        assert_eq!(
            url,
            "https://pb.example.com/api/files/_pb_users_auth_/abc123/face%20one.png?thumb=100x100"
        );
    }

    #[test]
    fn test_file_url_falls_back_to_configured_collection() {
        let url = store().file_url(&record("abc123"), "a.png", &FileOptions::default());
        assert_eq!(url, "https://pb.example.com/api/files/users/abc123/a.png");
    }

    #[test]
    fn test_file_url_unusable_input() {
        let s = store();
        assert_eq!(s.file_url(&record("abc"), "", &FileOptions::default()), "");
        assert_eq!(s.file_url(&record(""), "a.png", &FileOptions::default()), "");
    }

    #[test]
    fn test_error_body_is_parsed() {
        let err = error_from_body(
            400,
            r#"{"code":400,"message":"Failed to create record.","data":{"email":{"code":"validation_not_unique","message":"Value must be unique."}}}"#,
        );
        assert_eq!(err.to_string(), "Failed to create record.");
        assert_eq!(
            err.field_errors().collect::<Vec<_>>(),
            vec![("email", "Value must be unique.")]
        );
    }

    #[test]
    fn test_error_body_not_json() {
        let err = error_from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), GENERIC_ERROR);
        assert!(matches!(err, StoreError::Response { status: 502, .. }));
    }

    #[test]
    fn test_page_decoding() {
        let page: RecordPage<UserRecord> = serde_json::from_str(
            r#"{"page":1,"perPage":2,"items":[{"id":"a","email":"a@x.io","role":"admin"},{"id":"b","email":"b@x.io"}]}"#,
        )
        .unwrap();
        assert_eq!(page.per_page, Some(2));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].role, Role::Admin);
    }

    mod http {
        use super::*;
        use std::sync::{Arc, Mutex};

        use serde_json::json;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};

        use crate::models::AvatarFile;

        type Requests = Arc<Mutex<Vec<String>>>;

        /// Answer every request on a local port with `respond(request)` and keep
        /// the raw requests for inspection.
        async fn serve(respond: fn(&str) -> (u16, String)) -> (PocketBaseStore, Requests) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Requests::default();
            let seen = requests.clone();
            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut stream).await;
                        let (status, body) = respond(&request);
                        seen.lock().unwrap().push(request);
                        let response = format!(
                            "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        stream.write_all(response.as_bytes()).await.unwrap();
                        let _ = stream.shutdown().await;
                    });
                }
            });
            let store = PocketBaseStore::new(&StoreConfig {
                url,
                ..StoreConfig::default()
            });
            (store, requests)
        }

        async fn read_request(stream: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                if head.contains("transfer-encoding: chunked") {
                    if buf.ends_with(b"\r\n0\r\n\r\n") {
                        break;
                    }
                    continue;
                }
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        }

        fn query_param(request: &str, name: &str) -> Option<u32> {
            let target = request.split_whitespace().nth(1)?;
            let (_, query) = target.split_once('?')?;
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
                .and_then(|v| v.parse().ok())
        }

        fn users(start: u32, count: u32) -> Vec<serde_json::Value> {
            (start..start + count)
                .map(|n| json!({ "id": format!("u{n}"), "email": format!("u{n}@x.io") }))
                .collect()
        }

        fn capped_pages(request: &str) -> (u16, String) {
            // Caps perPage at 500 whatever the client asks for.
            let page = query_param(request, "page").unwrap_or(1);
            let items = match page {
                1 => users(0, 500),
                2 => users(500, 200),
                _ => Vec::new(),
            };
            (200, json!({ "page": page, "perPage": 500, "items": items }).to_string())
        }

        fn full_then_empty(request: &str) -> (u16, String) {
            let page = query_param(request, "page").unwrap_or(1);
            let items = if page == 1 { users(0, 2) } else { Vec::new() };
            (200, json!({ "page": page, "perPage": 2, "items": items }).to_string())
        }

        fn duplicate_email(_: &str) -> (u16, String) {
            let body = json!({
                "code": 400,
                "message": "email already exists",
                "data": { "email": { "code": "validation_not_unique", "message": "Value must be unique." } }
            });
            (400, body.to_string())
        }

        #[tokio::test]
        async fn test_list_follows_pages_until_short_page() {
            let (store, requests) = serve(capped_pages).await;
            let listed = store.list_users(&ListQuery::default()).await.unwrap();

            assert_eq!(listed.len(), 700);
            assert_eq!(listed[699].id, "u699");
            let requests = requests.lock().unwrap();
            assert_eq!(requests.len(), 2);
            assert_eq!(query_param(&requests[0], "perPage"), Some(1000));
            assert!(requests[0].starts_with("GET /api/collections/users/records?"));
            assert!(requests[0].contains("sort=-created"));
            assert!(requests[0].contains("skipTotal=1"));
            assert_eq!(query_param(&requests[1], "page"), Some(2));
        }

        #[tokio::test]
        async fn test_list_stops_on_empty_page() {
            let (store, requests) = serve(full_then_empty).await;
            let query = ListQuery {
                batch_size: 2,
                ..ListQuery::default()
            };
            let listed = store.list_users(&query).await.unwrap();

            assert_eq!(listed.len(), 2);
            assert_eq!(requests.lock().unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_create_sends_multipart_and_maps_rejection() {
            let (store, requests) = serve(duplicate_email).await;
            let payload = CreateUserPayload {
                email: "taken@example.com".to_string(),
                password: "password123".to_string(),
                password_confirm: "password123".to_string(),
                name: "Ada".to_string(),
                role: Role::Admin,
                email_visibility: true,
                experience: None,
                avatar: Some(AvatarFile::new("me.png", "image/png", vec![1, 2, 3])),
            };

            let err = store.create_user(payload).await.unwrap_err();
            assert_eq!(err.to_string(), "email already exists");
            assert_eq!(
                err.field_errors().collect::<Vec<_>>(),
                vec![("email", "Value must be unique.")]
            );

            let requests = requests.lock().unwrap();
            let request = &requests[0];
            assert!(request.starts_with("POST /api/collections/users/records"));
            assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
            assert!(request.contains("name=\"passwordConfirm\""));
            assert!(request.contains("name=\"role\""));
            assert!(!request.contains("name=\"experience\""));
            assert!(request.contains("name=\"avatar\"; filename=\"me.png\""));
        }
    }
}
