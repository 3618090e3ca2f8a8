//! In-process stand-in for the Pocket API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use pocket_core::PocketConfig;
use tiny_http::{Header, Response, Server};

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl Canned {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            headers: vec![],
        }
    }

    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self {
            status,
            body: String::new(),
            headers: vec![
                ("X-Error-Code".to_string(), code.to_string()),
                ("X-Error".to_string(), message.to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

pub struct MockPocket {
    server: Arc<Server>,
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    worker: Option<JoinHandle<()>>,
}

impl MockPocket {
    pub fn start(routes: Vec<(&str, Canned)>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let routes: HashMap<String, Canned> = routes
            .into_iter()
            .map(|(path, canned)| (path.to_string(), canned))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            std::thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let path = request.url().to_string();
                    let headers = request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().as_str().to_ascii_lowercase(), h.value.to_string()))
                        .collect();
                    let mut raw = String::new();
                    request.as_reader().read_to_string(&mut raw).unwrap();
                    let body = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
                    requests.lock().unwrap().push(Recorded {
                        path: path.clone(),
                        headers,
                        body,
                    });

                    let canned = routes.get(&path).cloned().unwrap_or(Canned {
                        status: 404,
                        body: String::new(),
                        headers: vec![],
                    });
                    let mut response =
                        Response::from_string(canned.body).with_status_code(canned.status);
                    for (name, value) in &canned.headers {
                        response = response.with_header(
                            Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap(),
                        );
                    }
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            addr,
            requests,
            worker: Some(worker),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Drop for MockPocket {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// A loopback port nothing is listening on right now.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn config_for(mock: &MockPocket, dir: &Path) -> PocketConfig {
    PocketConfig {
        consumer_key: "1234-abcd1234abcd1234abcd1234".to_string(),
        api_base_url: mock.url(),
        authorize_url: format!("{}/auth/authorize", mock.url()),
        callback_host: "127.0.0.1".to_string(),
        callback_port: free_port(),
        callback_timeout: Duration::from_secs(20),
        request_timeout: Duration::from_secs(5),
        credentials_path: dir.join("pocket_access_token.json"),
        articles_path: dir.join("articles.json"),
        page_size: 20,
    }
}

/// Plays the browser: keeps trying the stop route until the callback
/// server answers it.
pub fn approve_in_browser(port: u16) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let url = format!("http://127.0.0.1:{}/stop", port);
        for _ in 0..400 {
            if let Ok(resp) = reqwest::get(&url).await {
                if resp.status().as_u16() == 204 {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("callback server never answered {}", url);
    })
}
