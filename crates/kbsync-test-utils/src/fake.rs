//! In-memory helpdesk that records every call

use kbsync_api::{ApiError, ApiRequest, ApiResponse, HelpdeskTransport, Method, ResourceKind};
use kbsync_model::Language;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// ID assigned to the first created resource
pub const FIRST_ID: u64 = 1001;

#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    pattern: String,
    status: u16,
    body: String,
}

impl Failure {
    fn matches(&self, request: &ApiRequest) -> bool {
        self.method == request.method
            && match self.pattern.strip_suffix('*') {
                Some(prefix) => request.endpoint.starts_with(prefix),
                None => request.endpoint == self.pattern,
            }
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    calls: Vec<ApiRequest>,
    failures: Vec<Failure>,
    unreachable: bool,
    settings: Option<Value>,
    categories: Vec<Value>,
    folders: BTreeMap<u64, Vec<Value>>,
    articles: BTreeMap<u64, Vec<Value>>,
    translations: HashMap<(ResourceKind, u64, Language), Value>,
}

impl State {
    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn exists(&self, kind: ResourceKind, id: u64) -> bool {
        self.find(kind, id).is_some()
    }

    fn find(&self, kind: ResourceKind, id: u64) -> Option<&Value> {
        let has_id = |v: &&Value| v.get("id").and_then(Value::as_u64) == Some(id);
        match kind {
            ResourceKind::Category => self.categories.iter().find(has_id),
            ResourceKind::Folder => self.folders.values().flatten().find(has_id),
            ResourceKind::Article => self.articles.values().flatten().find(has_id),
        }
    }

    fn remove(&mut self, kind: ResourceKind, id: u64) -> bool {
        let keep = |v: &Value| v.get("id").and_then(Value::as_u64) != Some(id);
        let before = self.count(kind);
        match kind {
            ResourceKind::Category => {
                self.categories.retain(keep);
                self.folders.remove(&id);
            }
            ResourceKind::Folder => {
                self.folders.values_mut().for_each(|list| list.retain(keep));
                self.articles.remove(&id);
            }
            ResourceKind::Article => {
                self.articles.values_mut().for_each(|list| list.retain(keep));
            }
        }
        self.translations.retain(|(k, i, _), _| !(*k == kind && *i == id));
        self.count(kind) < before
    }

    fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Category => self.categories.len(),
            ResourceKind::Folder => self.folders.values().map(Vec::len).sum(),
            ResourceKind::Article => self.articles.values().map(Vec::len).sum(),
        }
    }
}

/// In-memory helpdesk implementing [`HelpdeskTransport`]
///
/// - Created resources get sequential IDs starting at [`FIRST_ID`]
/// - Creating a category, or a folder within one category, with an existing
///   name answers 409 `duplicate_value`
/// - Scripted failures match by method and endpoint; a pattern ending in `*`
///   matches by prefix
/// - Lists honor `page` / `per_page`
#[derive(Debug)]
pub struct FakeHelpdesk {
    state: Mutex<State>,
}

impl Default for FakeHelpdesk {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHelpdesk {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: FIRST_ID,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    /// Answer the settings endpoint
    pub fn with_settings(self, primary: &str, supported: &[&str]) -> Self {
        self.state().settings = Some(json!({
            "primary_language": primary,
            "supported_languages": supported,
        }));
        self
    }

    /// Answer matching calls with a fixed status and body
    pub fn fail(&self, method: Method, pattern: &str, status: u16, body: &str) {
        self.state().failures.push(Failure {
            method,
            pattern: pattern.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// Fail every call with a connection failure
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    pub fn seed_category(&self, name: &str) -> u64 {
        let mut state = self.state();
        let id = state.assign_id();
        state.categories.push(json!({ "id": id, "name": name }));
        state.folders.entry(id).or_default();
        id
    }

    pub fn seed_folder(&self, category: u64, name: &str) -> u64 {
        let mut state = self.state();
        let id = state.assign_id();
        state
            .folders
            .entry(category)
            .or_default()
            .push(json!({ "id": id, "name": name, "visibility": 1 }));
        state.articles.entry(id).or_default();
        id
    }

    pub fn seed_article(&self, folder: u64, title: &str, body: &str) -> u64 {
        let mut state = self.state();
        let id = state.assign_id();
        state.articles.entry(folder).or_default().push(json!({
            "id": id,
            "title": title,
            "description": body,
            "type": 1,
            "status": 2,
        }));
        id
    }

    pub fn seed_translation(&self, kind: ResourceKind, id: u64, lang: Language, mut value: Value) {
        if let Value::Object(map) = &mut value {
            map.insert("id".into(), json!(id));
        }
        self.state().translations.insert((kind, id, lang), value);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Calls of one method whose endpoint starts with `prefix`
    pub fn calls_to(&self, method: Method, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.method == method && c.endpoint.starts_with(prefix))
            .count()
    }

    pub fn writes(&self) -> usize {
        self.state().calls.iter().filter(|c| c.method.is_write()).count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn resource(&self, kind: ResourceKind, id: u64) -> Option<Value> {
        self.state().find(kind, id).cloned()
    }

    pub fn resources(&self, kind: ResourceKind) -> Vec<Value> {
        let state = self.state();
        match kind {
            ResourceKind::Category => state.categories.clone(),
            ResourceKind::Folder => state.folders.values().flatten().cloned().collect(),
            ResourceKind::Article => state.articles.values().flatten().cloned().collect(),
        }
    }

    pub fn translation(&self, kind: ResourceKind, id: u64, lang: Language) -> Option<Value> {
        self.state().translations.get(&(kind, id, lang)).cloned()
    }

    pub fn translation_count(&self) -> usize {
        self.state().translations.len()
    }
}

fn respond(status: u16, body: &Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

fn not_found() -> ApiResponse {
    respond(404, &json!({ "message": "not found" }))
}

fn duplicate(field: &str) -> ApiResponse {
    respond(
        409,
        &json!({
            "description": "Validation failed",
            "errors": [{ "field": field, "message": "It should be a unique value", "code": "duplicate_value" }],
        }),
    )
}

fn kind_of(segment: &str) -> Option<ResourceKind> {
    match segment {
        "categories" => Some(ResourceKind::Category),
        "folders" => Some(ResourceKind::Folder),
        "articles" => Some(ResourceKind::Article),
        _ => None,
    }
}

fn page(request: &ApiRequest, items: &[Value]) -> ApiResponse {
    let number = request
        .query_value("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let size = request
        .query_value("per_page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(30)
        .max(1);
    let slice: Vec<Value> = items.iter().skip((number - 1) * size).take(size).cloned().collect();
    respond(200, &Value::Array(slice))
}

fn with_id(body: Option<&Value>, id: u64) -> Value {
    let mut map = match body {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    map.insert("id".into(), json!(id));
    Value::Object(map)
}

fn same_name(values: &[Value], name: Option<&Value>) -> bool {
    name.is_some() && values.iter().any(|v| v.get("name") == name)
}

impl FakeHelpdesk {
    fn route(state: &mut State, request: &ApiRequest) -> ApiResponse {
        let path = request.endpoint.trim_matches('/');
        if path == "v2/settings/helpdesk" {
            return match (&request.method, &state.settings) {
                (Method::Get, Some(settings)) => respond(200, settings),
                _ => not_found(),
            };
        }
        let Some(rest) = path.strip_prefix("v2/solutions/") else {
            return not_found();
        };
        let parts: Vec<&str> = rest.split('/').collect();
        let body = request.body.as_ref();
        let name = body.and_then(|b| b.get("name"));

        match (request.method, parts.as_slice()) {
            (Method::Get, ["categories"]) => page(request, &state.categories),
            (Method::Post, ["categories"]) => {
                if same_name(&state.categories, name) {
                    return duplicate("name");
                }
                let id = state.assign_id();
                let value = with_id(body, id);
                state.categories.push(value.clone());
                state.folders.entry(id).or_default();
                respond(201, &value)
            }
            (method, ["categories", id, "folders"]) => {
                let Ok(id) = id.parse::<u64>() else {
                    return not_found();
                };
                if !state.exists(ResourceKind::Category, id) {
                    return not_found();
                }
                match method {
                    Method::Get => {
                        let items = state.folders.get(&id).cloned().unwrap_or_default();
                        page(request, &items)
                    }
                    Method::Post => {
                        if same_name(state.folders.get(&id).map_or(&[][..], Vec::as_slice), name) {
                            return duplicate("name");
                        }
                        let folder = state.assign_id();
                        let value = with_id(body, folder);
                        state.folders.entry(id).or_default().push(value.clone());
                        state.articles.entry(folder).or_default();
                        respond(201, &value)
                    }
                    Method::Delete => respond(405, &json!({})),
                }
            }
            (method, ["folders", id, "articles"]) => {
                let Ok(id) = id.parse::<u64>() else {
                    return not_found();
                };
                if !state.exists(ResourceKind::Folder, id) {
                    return not_found();
                }
                match method {
                    Method::Get => {
                        let items = state.articles.get(&id).cloned().unwrap_or_default();
                        page(request, &items)
                    }
                    Method::Post => {
                        let article = state.assign_id();
                        let value = with_id(body, article);
                        state.articles.entry(id).or_default().push(value.clone());
                        respond(201, &value)
                    }
                    Method::Delete => respond(405, &json!({})),
                }
            }
            (method, [segment, id, lang]) => {
                let (Some(kind), Ok(id), Some(lang)) =
                    (kind_of(segment), id.parse::<u64>(), Language::from_code(lang))
                else {
                    return not_found();
                };
                if !state.exists(kind, id) {
                    return not_found();
                }
                let key = (kind, id, lang);
                match method {
                    Method::Get => match state.translations.get(&key) {
                        Some(value) => respond(200, value),
                        None => not_found(),
                    },
                    Method::Post => {
                        if state.translations.contains_key(&key) {
                            return duplicate("language");
                        }
                        let value = with_id(body, id);
                        state.translations.insert(key, value.clone());
                        respond(201, &value)
                    }
                    Method::Delete => respond(405, &json!({})),
                }
            }
            (method, [segment, id]) => {
                let (Some(kind), Ok(id)) = (kind_of(segment), id.parse::<u64>()) else {
                    return not_found();
                };
                match method {
                    Method::Get => match state.find(kind, id) {
                        Some(value) => respond(200, value),
                        None => not_found(),
                    },
                    Method::Delete if state.remove(kind, id) => ApiResponse::new(204, ""),
                    Method::Delete => not_found(),
                    Method::Post => respond(405, &json!({})),
                }
            }
            _ => not_found(),
        }
    }
}

impl HelpdeskTransport for FakeHelpdesk {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut state = self.state();
        state.calls.push(request.clone());
        if state.unreachable {
            return Err(ApiError::ConnectionFailure("connection refused".into()));
        }
        if let Some(failure) = state.failures.iter().find(|f| f.matches(request)) {
            return Ok(ApiResponse::new(failure.status, failure.body.clone()));
        }
        Ok(Self::route(&mut state, request))
    }
}
