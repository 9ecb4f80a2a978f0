//! In-process stand-in for the booking API, bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use axum::Router;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const USER_EMAIL: &str = "ana@clinic.test";
pub const ADMIN_EMAIL: &str = "davi@clinic.test";
pub const PASSWORD: &str = "secret";

pub fn make_token(payload: &Value) -> String {
    let enc = |s: &str| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s);
    format!("{}.{}.signature", enc(r#"{"alg":"HS256","typ":"JWT"}"#), enc(&payload.to_string()))
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct MockState {
    pub users: Vec<Value>,
    pub appointments: Vec<Value>,
    pub groups: Value,
    pub treatments: Vec<Value>,
    pub equipment: Vec<Value>,
    pub feedback: Vec<Value>,
    pub requests: Vec<Recorded>,
    /// Serve payloads that do not match the schemas.
    pub malformed: bool,
    next_id: i64,
}

fn appointment(id: i64, status: &str, price: &str) -> Value {
    json!({
        "id": id,
        "date": "2024-05-02T13:30:00.000Z",
        "status": status,
        "client": { "name": "Ana", "phone": "+55 11 99999-0000", "email": USER_EMAIL },
        "treatment": {
            "name": "Limpeza de pele", "description": "Facial", "price": price, "duration": 60,
            "categories": [{ "id": 1, "name": "Facial" }, { "id": 2, "name": "Estética" }]
        }
    })
}

impl Default for MockState {
    fn default() -> Self {
        let treatment = |id: i64, name: &str, price: &str| json!({ "id": id, "name": name, "description": "Procedimento estético", "duration": 45, "price": price, "isActive": true });
        Self {
            users: vec![
                json!({ "id": 1, "name": "Ana", "email": USER_EMAIL, "role": "user" }),
                json!({ "id": 2, "name": "Davi", "email": ADMIN_EMAIL, "role": "admin" }),
            ],
            appointments: vec![appointment(10, "pending", "150.00"), appointment(11, "confirmed", "1234.5"), appointment(12, "canceled", "80")],
            groups: json!([{ "id": 1, "name": "Facial", "categories": [{ "id": 10, "name": "Limpeza", "treatments": [treatment(100, "Limpeza profunda", "150.00")] }] }]),
            treatments: vec![treatment(100, "Limpeza profunda", "150.00"), treatment(101, "Peeling químico", "220.00")],
            equipment: vec![
                json!({ "id": 5, "name": "Laser Alexandrita", "description": "", "status": "available", "isActive": true }),
                json!({ "id": 6, "name": "Autoclave", "description": "", "status": "maintenance", "isActive": false }),
            ],
            feedback: vec![
                json!({ "id": 30, "rating": 5, "comment": "Ótimo", "readed": false,
                        "client": { "id": 1, "name": "Ana", "email": USER_EMAIL }, "treatment": { "id": 100, "name": "Limpeza profunda" } }),
                json!({ "id": 31, "rating": 3, "comment": "Ok", "readed": true,
                        "client": { "id": 1, "name": "Ana", "email": USER_EMAIL }, "treatment": { "id": 101, "name": "Peeling químico" } }),
            ],
            requests: Vec::new(),
            malformed: false,
            next_id: 100,
        }
    }
}

impl MockState {
    fn token_for(&self, user_id: i64) -> Option<String> {
        let u = self.users.iter().find(|u| u["id"] == user_id)?;
        Some(make_token(&json!({ "id": user_id, "name": u["name"], "email": u["email"], "role": u["role"], "exp": 1_900_000_000 })))
    }

    fn auth_response(&self, user_id: i64) -> (StatusCode, Value) {
        match (self.token_for(user_id), self.users.iter().find(|u| u["id"] == user_id)) {
            (Some(token), Some(user)) => (StatusCode::CREATED, json!({ "access_token": token, "user": user })),
            _ => (StatusCode::NOT_FOUND, json!({ "message": "user not found" })),
        }
    }
}

#[derive(Clone)]
pub struct MockApi {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve mock api") });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String { format!("http://{}", self.addr) }

    pub fn requests(&self) -> Vec<Recorded> { self.state.lock().requests.clone() }

    pub fn request_count(&self) -> usize { self.state.lock().requests.len() }

    pub fn last_request(&self) -> Recorded {
        self.state.lock().requests.last().cloned().expect("at least one request")
    }

    pub fn set_malformed(&self, on: bool) { self.state.lock().malformed = on; }

    pub fn user_token(&self) -> String { self.state.lock().token_for(1).expect("user token") }

    pub fn admin_token(&self) -> String { self.state.lock().token_for(2).expect("admin token") }
}

fn find_mut<'a>(items: &'a mut [Value], id: i64) -> Option<&'a mut Value> {
    items.iter_mut().find(|v| v["id"] == id)
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(t), Some(p)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in p {
            t.insert(k.clone(), v.clone());
        }
    }
}

async fn handle(State(state): State<Arc<Mutex<MockState>>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
    let mut s = state.lock();
    s.requests.push(Recorded { method: method.to_string(), path: uri.path().to_string(), authorization: authorization.clone(), body: body.clone() });

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    let id = segments.get(1).and_then(|v| v.parse::<i64>().ok());
    let not_found = (StatusCode::NOT_FOUND, json!({ "message": "Not Found", "statusCode": 404 }));

    // login is the only open route
    if segments[0] == "auth" && segments.get(1) == Some(&"login") {
        let user_id = match (body["email"].as_str(), body["password"].as_str()) {
            (Some(USER_EMAIL), Some(PASSWORD)) => 1,
            (Some(ADMIN_EMAIL), Some(PASSWORD)) => 2,
            _ => return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials", "statusCode": 401 }))),
        };
        let (status, v) = s.auth_response(user_id);
        return (status, Json(v));
    }
    if authorization.as_deref().map(|a| a.starts_with("Bearer ")) != Some(true) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized", "statusCode": 401 })));
    }

    let (status, v) = match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "renew-token"]) => {
            let old = body["token"].as_str().unwrap_or_default();
            let payload = old.split('.').nth(1).unwrap_or_default();
            let claims: Value = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(payload)
                .ok()
                .and_then(|b| serde_json::from_slice(&b).ok())
                .unwrap_or(Value::Null);
            match claims["id"].as_i64() {
                Some(uid) => s.auth_response(uid),
                None => (StatusCode::UNAUTHORIZED, json!({ "message": "invalid token" })),
            }
        }
        ("PATCH", ["user", _]) => match id.and_then(|i| find_mut(&mut s.users, i)) {
            Some(u) => { merge(u, &body); (StatusCode::OK, u.clone()) }
            None => not_found,
        },
        ("GET", ["appointment"]) if s.malformed => (StatusCode::OK, json!([{ "id": 1, "status": "pending" }])),
        ("GET", ["appointment"]) => (StatusCode::OK, Value::Array(s.appointments.clone())),
        ("POST", ["appointment"]) => {
            s.next_id += 1;
            let new_id = s.next_id;
            let mut created = appointment(new_id, "pending", "150.00");
            merge(&mut created, &body);
            s.appointments.push(created.clone());
            (StatusCode::CREATED, created)
        }
        ("PATCH", ["appointment", _]) => {
            if body.get("status").and_then(Value::as_str).is_some_and(|st| !["pending", "confirmed", "canceled"].contains(&st)) {
                (StatusCode::BAD_REQUEST, json!({ "message": ["status must be one of pending, confirmed, canceled"], "statusCode": 400 }))
            } else {
                match id.and_then(|i| find_mut(&mut s.appointments, i)) {
                    Some(a) => { merge(a, &body); (StatusCode::OK, a.clone()) }
                    None => not_found,
                }
            }
        }
        ("DELETE", ["appointment", _]) => {
            let before = s.appointments.len();
            s.appointments.retain(|a| Some(a["id"].as_i64().unwrap_or_default()) != id);
            if s.appointments.len() < before { (StatusCode::OK, Value::Null) } else { not_found }
        }
        ("GET", ["treatment-group"]) => (StatusCode::OK, s.groups.clone()),
        ("GET", ["treatment"]) => (StatusCode::OK, Value::Array(s.treatments.clone())),
        ("PATCH", ["treatment", _]) => {
            if body["name"].as_str().map(str::trim).unwrap_or_default().len() < 3 {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "message": "name must be at least 3 characters", "statusCode": 422 }))
            } else {
                match id.and_then(|i| find_mut(&mut s.treatments, i)) {
                    Some(t) => { merge(t, &body); (StatusCode::OK, t.clone()) }
                    None => not_found,
                }
            }
        }
        ("GET", ["equipment"]) => (StatusCode::OK, Value::Array(s.equipment.clone())),
        ("PATCH", ["equipment", _]) => match id.and_then(|i| find_mut(&mut s.equipment, i)) {
            Some(e) => { merge(e, &body); (StatusCode::OK, e.clone()) }
            None => not_found,
        },
        ("GET", ["feedback", which]) if *which == "unreaded" || *which == "readed" => {
            let want_read = *which == "readed";
            let mut items: Vec<Value> = s.feedback.iter().filter(|f| f["readed"] == want_read).cloned().collect();
            if s.malformed {
                for f in &mut items { f["rating"] = json!(9); }
            }
            (StatusCode::OK, Value::Array(items))
        }
        ("PATCH", ["feedback", _]) => match id.and_then(|i| find_mut(&mut s.feedback, i)) {
            Some(f) => { merge(f, &body); (StatusCode::OK, f.clone()) }
            None => not_found,
        },
        ("DELETE", ["feedback", _]) => {
            let before = s.feedback.len();
            s.feedback.retain(|f| Some(f["id"].as_i64().unwrap_or_default()) != id);
            if s.feedback.len() < before { (StatusCode::OK, Value::Null) } else { not_found }
        }
        _ => not_found,
    };
    (status, Json(v))
}
