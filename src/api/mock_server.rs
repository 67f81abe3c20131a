//! In-process stand-in for the Fin-Track API, used by tests.
//!
//! Speaks just enough HTTP/1.1 for the blocking client: one request per
//! connection, JSON bodies, `Connection: close`. Routes live under `/api`.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// email -> (name, password)
    users: HashMap<String, (String, String)>,
    /// token -> email
    tokens: HashMap<String, String>,
    /// (owner email, expense json), newest first
    expenses: Vec<(String, Value)>,
    next_id: u64,
    fail_all: bool,
    requests: Vec<RecordedRequest>,
}

pub(crate) struct MockApiServer {
    port: u16,
    state: Arc<Mutex<MockState>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    pub(crate) fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        listener.set_nonblocking(true).unwrap();

        let state = Arc::new(Mutex::new(MockState::default()));
        let running = Arc::new(AtomicBool::new(true));
        let (state_clone, running_clone) = (state.clone(), running.clone());

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            port,
            state,
            running,
            thread_handle: Some(thread_handle),
        }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Register a user directly and return a valid token for them.
    pub(crate) fn seed_user(&self, name: &str, email: &str, password: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state
            .users
            .insert(email.to_string(), (name.to_string(), password.to_string()));
        issue_token(&mut state, email)
    }

    pub(crate) fn seed_expense(
        &self,
        token: &str,
        amount: f64,
        category: &str,
        description: &str,
        date: &str,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        let owner = state.tokens.get(token).cloned().unwrap();
        let expense = make_expense(&mut state, amount, category, description, date);
        let id = expense["_id"].as_str().unwrap().to_string();
        state.expenses.insert(0, (owner, expense));
        id
    }

    pub(crate) fn set_fail_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    pub(crate) fn expense_count(&self) -> usize {
        self.state.lock().unwrap().expenses.len()
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn issue_token(state: &mut MockState, email: &str) -> String {
    state.next_id += 1;
    let token = format!("tok-{}", state.next_id);
    state.tokens.insert(token.clone(), email.to_string());
    token
}

fn make_expense(
    state: &mut MockState,
    amount: f64,
    category: &str,
    description: &str,
    date: &str,
) -> Value {
    state.next_id += 1;
    json!({
        "_id": format!("exp-{}", state.next_id),
        "amount": amount,
        "category": category,
        "description": description,
        "date": format!("{date}T00:00:00.000Z"),
    })
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    stream.set_nonblocking(false).ok()?;
    let mut raw = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while raw.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buffer[..n]);
    }
    let body_end = raw.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&raw[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn bearer(request: &RecordedRequest) -> Option<String> {
    if let Some(auth) = request.headers.get("authorization") {
        return auth.strip_prefix("Bearer ").map(str::to_string);
    }
    request.headers.get("x-auth-token").cloned()
}

fn handle_connection(mut stream: TcpStream, state: &Arc<Mutex<MockState>>) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (status, body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(request.clone());
        route(&mut state, &request)
    };
    send_response(&mut stream, status, &body);
}

fn route(state: &mut MockState, request: &RecordedRequest) -> (u16, String) {
    if state.fail_all {
        return (500, "Server Error".to_string());
    }

    let body: Value = serde_json::from_str(&request.body).unwrap_or(Value::Null);
    let field = |name: &str| body[name].as_str().unwrap_or("").to_string();
    let user_email = bearer(request).and_then(|t| state.tokens.get(&t).cloned());

    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/auth/register") => {
            let (name, email, password) = (field("name"), field("email"), field("password"));
            if !email.contains('@') {
                return (400, json!({"errors": [{"msg": "Please include a valid email"}]}).to_string());
            }
            if password.len() < 6 {
                return (
                    400,
                    json!({"errors": [{"msg": "Please enter a password with 6 or more characters"}]})
                        .to_string(),
                );
            }
            if state.users.contains_key(&email) {
                return (400, json!({"msg": "User already exists"}).to_string());
            }
            state.users.insert(email.clone(), (name, password));
            let token = issue_token(state, &email);
            (200, json!({ "token": token }).to_string())
        }
        ("POST", "/api/auth/login") => {
            let (email, password) = (field("email"), field("password"));
            match state.users.get(&email) {
                Some((_, stored)) if *stored == password => {
                    let token = issue_token(state, &email);
                    (200, json!({ "token": token }).to_string())
                }
                _ => (400, json!({"msg": "Invalid Credentials"}).to_string()),
            }
        }
        ("GET", "/api/auth/user") => match user_email {
            Some(email) => {
                let (name, _) = state.users.get(&email).cloned().unwrap_or_default();
                (200, json!({"_id": "u-1", "name": name, "email": email}).to_string())
            }
            None => (401, json!({"msg": "Token is not valid"}).to_string()),
        },
        ("GET", "/api/expenses") => match user_email {
            Some(email) => {
                let mine: Vec<&Value> = state
                    .expenses
                    .iter()
                    .filter(|(owner, _)| *owner == email)
                    .map(|(_, e)| e)
                    .collect();
                (200, json!(mine).to_string())
            }
            None => (401, json!({"msg": "No token, authorization denied"}).to_string()),
        },
        ("POST", "/api/expenses") => match user_email {
            Some(email) => {
                let amount = body["amount"].as_f64().unwrap_or(0.0);
                let expense = make_expense(
                    state,
                    amount,
                    &field("category"),
                    &field("description"),
                    &field("date"),
                );
                state.expenses.insert(0, (email, expense.clone()));
                (200, expense.to_string())
            }
            None => (401, json!({"msg": "No token, authorization denied"}).to_string()),
        },
        ("DELETE", path) if path.starts_with("/api/expenses/") => {
            let Some(email) = user_email else {
                return (401, json!({"msg": "No token, authorization denied"}).to_string());
            };
            let id = &path["/api/expenses/".len()..];
            let before = state.expenses.len();
            state
                .expenses
                .retain(|(owner, e)| !(*owner == email && e["_id"] == id));
            if state.expenses.len() < before {
                (200, json!({"msg": "Expense removed"}).to_string())
            } else {
                (404, json!({"msg": "Expense not found"}).to_string())
            }
        }
        _ => (404, json!({"msg": "Not found"}).to_string()),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let content_type = if body.starts_with('{') || body.starts_with('[') {
        "application/json"
    } else {
        "text/plain"
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
