//! In-memory store service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use store_submit::error::{Error, Result};
use store_submit::transport::RestTransport;
use store_submit::types::{SubmissionStatus, SubmissionTarget};

/// One recorded REST call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Error injected for calls whose method matches and whose path contains `fragment`
#[derive(Debug, Clone)]
struct InjectedError {
    method: Method,
    fragment: String,
    status: u16,
}

/// Simple in-memory store service for testing
///
/// Models one product (or flight) with:
/// - A published submission that `POST .../submissions` clones
/// - A pending-submission pointer on the product resource
/// - Versioned documents that enforce revision tokens
/// - A scripted status sequence for monitoring
/// - Call tracking and error injection
pub struct MockStoreService {
    target: SubmissionTarget,
    next_id: AtomicU64,
    next_revision: AtomicU64,
    product: Mutex<Value>,
    published: Mutex<Value>,
    submissions: Mutex<BTreeMap<String, Value>>,
    documents: Mutex<BTreeMap<String, Value>>,
    statuses: Mutex<VecDeque<SubmissionStatus>>,
    token_age: Mutex<Option<Duration>>,
    reauthenticate_calls: AtomicU32,
    // Call tracking
    calls: Mutex<Vec<Call>>,
    // Error injection
    errors: Mutex<Vec<InjectedError>>,
}

impl MockStoreService {
    /// Create a mock for `target` whose published submission is `published`
    pub fn new(target: SubmissionTarget, published: Value) -> Self {
        Self {
            product: Mutex::new(json!({ "id": target.product_id() })),
            target,
            next_id: AtomicU64::new(1_152_921_504_600_000_001),
            next_revision: AtomicU64::new(1),
            published: Mutex::new(published),
            submissions: Mutex::new(BTreeMap::new()),
            documents: Mutex::new(BTreeMap::new()),
            statuses: Mutex::new(VecDeque::new()),
            token_age: Mutex::new(None),
            reauthenticate_calls: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Store a submission and point the product at it when it is pending
    pub fn add_submission(&self, submission: Value) {
        let id = submission["id"].as_str().unwrap_or_default().to_string();
        if submission["status"] == "PendingCommit" {
            self.set_pending_pointer(Some(&id));
        }
        self.submissions
            .lock()
            .unwrap()
            .insert(self.target.submission_path(&id), submission);
    }

    /// Seed a versioned document at `path` (including any `submissionId` query)
    pub fn add_document(&self, path: &str, document: Value) {
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), document);
    }

    /// Statuses returned by successive status polls; the last one repeats
    pub fn set_status_sequence(&self, statuses: &[SubmissionStatus]) {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
    }

    /// Age reported for the cached access token
    pub fn set_token_age(&self, age: Option<Duration>) {
        *self.token_age.lock().unwrap() = age;
    }

    /// Fail calls with `method` whose path contains `fragment`
    pub fn fail_on(&self, method: Method, fragment: &str, status: u16) {
        self.errors.lock().unwrap().push(InjectedError {
            method,
            fragment: fragment.to_string(),
            status,
        });
    }

    pub fn get_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls with `method` whose path ends with `suffix`
    pub fn get_calls_matching(&self, method: &Method, suffix: &str) -> Vec<Call> {
        self.get_calls()
            .into_iter()
            .filter(|c| c.method == *method && c.path.ends_with(suffix))
            .collect()
    }

    /// Clone calls (`POST .../submissions`)
    pub fn get_clone_calls(&self) -> Vec<Call> {
        self.get_calls_matching(&Method::POST, "/submissions")
    }

    /// Submission replace calls
    pub fn get_put_calls(&self) -> Vec<Call> {
        let prefix = format!("{}/", self.target.submissions_path());
        self.get_calls()
            .into_iter()
            .filter(|c| c.method == Method::PUT && c.path.starts_with(&prefix))
            .collect()
    }

    pub fn get_commit_calls(&self) -> Vec<Call> {
        self.get_calls_matching(&Method::POST, "/commit")
    }

    pub fn get_delete_calls(&self) -> Vec<Call> {
        self.get_calls()
            .into_iter()
            .filter(|c| c.method == Method::DELETE)
            .collect()
    }

    pub fn get_status_calls(&self) -> Vec<Call> {
        self.get_calls_matching(&Method::GET, "/status")
    }

    pub fn get_reauthenticate_calls(&self) -> u32 {
        self.reauthenticate_calls.load(Ordering::SeqCst)
    }

    /// Position of the first call with `method` ending in `suffix`
    pub fn position_of(&self, method: &Method, suffix: &str) -> Option<usize> {
        self.get_calls()
            .iter()
            .position(|c| c.method == *method && c.path.ends_with(suffix))
    }

    /// Stored state of a submission
    pub fn submission(&self, id: &str) -> Option<Value> {
        self.submissions
            .lock()
            .unwrap()
            .get(&self.target.submission_path(id))
            .cloned()
    }

    /// Stored state of a document
    pub fn document(&self, path: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(path).cloned()
    }

    /// Id the product's pending pointer currently holds
    pub fn pending_submission_id(&self) -> Option<String> {
        self.product.lock().unwrap()[self.target.pending_field()]["id"]
            .as_str()
            .map(ToString::to_string)
    }

    fn set_pending_pointer(&self, id: Option<&str>) {
        let mut product = self.product.lock().unwrap();
        let value = id.map_or(Value::Null, |id| json!({ "id": id }));
        product[self.target.pending_field()] = value;
    }

    fn next_revision_token(&self) -> String {
        format!("rev-{}", self.next_revision.fetch_add(1, Ordering::SeqCst))
    }

    fn injected_error(&self, method: &Method, path: &str) -> Option<Error> {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.method == *method && path.contains(&e.fragment))
            .map(|e| api_error(method, path, e.status, "Injected", "injected failure"))
    }

    fn clone_published(&self) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut clone = self.published.lock().unwrap().clone();
        clone["id"] = json!(id);
        clone["status"] = json!("PendingCommit");
        clone["fileUploadUrl"] = json!(format!(
            "https://store.blob.core.windows.net/uploads/{id}?sv=2017&sr=b&sig=secret"
        ));
        self.add_submission(clone.clone());
        clone
    }

    fn handle_submission(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Value> {
        if let Some(base) = path.strip_suffix("/commit") {
            let mut submissions = self.submissions.lock().unwrap();
            let Some(submission) = submissions.get_mut(base) else {
                return Err(not_found(method, path));
            };
            if submission["status"] != "PendingCommit" {
                return Err(api_error(method, path, 409, "InvalidState", "not pending"));
            }
            submission["status"] = json!("CommitStarted");
            return Ok(json!({ "status": "CommitStarted" }));
        }

        if let Some(base) = path.strip_suffix("/status") {
            let stored = self.submissions.lock().unwrap().get(base).cloned();
            let Some(stored) = stored else {
                return Err(not_found(method, path));
            };
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().copied()
            };
            let status = status.map_or_else(|| stored["status"].clone(), |s| json!(s.as_str()));
            return Ok(json!({
                "status": status,
                "statusDetails": stored.get("statusDetails").cloned().unwrap_or_else(|| json!({})),
            }));
        }

        let mut submissions = self.submissions.lock().unwrap();
        match *method {
            Method::GET => submissions
                .get(path)
                .cloned()
                .ok_or_else(|| not_found(method, path)),
            Method::PUT => {
                let Some(stored) = submissions.get(path) else {
                    return Err(not_found(method, path));
                };
                if stored["status"] != "PendingCommit" {
                    return Err(api_error(method, path, 409, "InvalidState", "not pending"));
                }
                let upload_url = stored["fileUploadUrl"].clone();
                let mut updated = body.cloned().unwrap_or(Value::Null);
                updated["fileUploadUrl"] = upload_url;
                submissions.insert(path.to_string(), updated.clone());
                Ok(updated)
            }
            Method::DELETE => {
                if submissions.remove(path).is_none() {
                    return Err(not_found(method, path));
                }
                drop(submissions);
                self.set_pending_pointer(None);
                Ok(Value::Null)
            }
            _ => Err(api_error(method, path, 405, "MethodNotAllowed", "unsupported")),
        }
    }

    fn handle_document(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut documents = self.documents.lock().unwrap();
        match *method {
            Method::GET => {
                if let Some(document) = documents.get(path) {
                    return Ok(document.clone());
                }
                let children: Vec<Value> = documents
                    .iter()
                    .filter(|(key, _)| is_child(path, key))
                    .map(|(_, v)| v.clone())
                    .collect();
                if children.is_empty() {
                    Err(not_found(method, path))
                } else {
                    Ok(json!({ "value": children }))
                }
            }
            Method::PUT => {
                let Some(stored) = documents.get(path) else {
                    return Err(not_found(method, path));
                };
                let mut updated = body.cloned().unwrap_or(Value::Null);
                if updated["revisionToken"] != stored["revisionToken"] {
                    return Err(api_error(
                        method,
                        path,
                        409,
                        "InvalidRevisionToken",
                        "the resource was modified since it was read",
                    ));
                }
                updated["revisionToken"] = json!(self.next_revision_token());
                documents.insert(path.to_string(), updated.clone());
                Ok(updated)
            }
            Method::POST => {
                let mut created = body.cloned().unwrap_or_else(|| json!({}));
                let key = match created.get("languageCode").and_then(Value::as_str) {
                    Some(code) => code.to_string(),
                    None => {
                        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
                        created["id"] = json!(id);
                        id
                    }
                };
                created["revisionToken"] = json!(self.next_revision_token());
                let (base, query) = split_query(path);
                let item = match query {
                    Some(query) => format!("{base}/{key}?{query}"),
                    None => format!("{base}/{key}"),
                };
                documents.insert(item, created.clone());
                Ok(created)
            }
            Method::DELETE => documents
                .remove(path)
                .map(|_| Value::Null)
                .ok_or_else(|| not_found(method, path)),
            _ => Err(api_error(method, path, 405, "MethodNotAllowed", "unsupported")),
        }
    }
}

#[async_trait]
impl RestTransport for MockStoreService {
    async fn invoke(&self, method: Method, uri_fragment: &str, body: Option<&Value>) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: uri_fragment.to_string(),
            body: body.cloned(),
        });

        // Check for injected error
        if let Some(err) = self.injected_error(&method, uri_fragment) {
            return Err(err);
        }

        let path = strip_paging(uri_fragment);
        if path == self.target.resource_path() && method == Method::GET {
            return Ok(self.product.lock().unwrap().clone());
        }
        if path == self.target.submissions_path() && method == Method::POST {
            return Ok(self.clone_published());
        }
        if path.starts_with(&format!("{}/", self.target.submissions_path())) {
            return self.handle_submission(&method, &path, body);
        }
        self.handle_document(&method, &path, body)
    }

    async fn token_age(&self) -> Option<Duration> {
        *self.token_age.lock().unwrap()
    }

    async fn reauthenticate(&self) -> Result<()> {
        self.reauthenticate_calls.fetch_add(1, Ordering::SeqCst);
        *self.token_age.lock().unwrap() = Some(Duration::ZERO);
        Ok(())
    }
}

fn api_error(method: &Method, path: &str, status: u16, code: &str, message: &str) -> Error {
    Error::Api {
        method: method.to_string(),
        path: path.to_string(),
        status,
        code: Some(code.to_string()),
        message: message.to_string(),
    }
}

fn not_found(method: &Method, path: &str) -> Error {
    api_error(method, path, 404, "NotFound", "resource not found")
}

fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (path, None),
    }
}

/// Drop the `top`/`skip` paging parameters added by list calls
fn strip_paging(path: &str) -> String {
    let (base, query) = split_query(path);
    let kept: Vec<&str> = query
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("top=") && !p.starts_with("skip="))
        .collect();
    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", kept.join("&"))
    }
}

/// Whether `key` names a direct child of the collection at `collection`
fn is_child(collection: &str, key: &str) -> bool {
    let (collection_base, collection_query) = split_query(collection);
    let (key_base, key_query) = split_query(key);
    collection_query == key_query
        && key_base
            .strip_prefix(collection_base)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}
