use anyhow::Result;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use sentrycam::api::{ApiConfig, ApiHandle, ApiServer};
use sentrycam::WatchState;

fn read_response(stream: &mut TcpStream) -> Result<(String, String)> {
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    let mut parts = response.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("").to_string();
    let body = parts.next().unwrap_or("").to_string();
    Ok((headers, body))
}

fn get(handle: &ApiHandle, path: &str) -> Result<(String, String)> {
    let mut stream = TcpStream::connect(handle.addr)?;
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path);
    stream.write_all(request.as_bytes())?;
    read_response(&mut stream)
}

struct TestApi {
    state: Arc<WatchState>,
    handle: Option<ApiHandle>,
}

impl TestApi {
    fn new() -> Result<Self> {
        let state = Arc::new(WatchState::new());
        let api_config = ApiConfig {
            addr: "127.0.0.1:0".to_string(),
        };
        let handle = ApiServer::new(api_config, state.clone()).spawn()?;
        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    fn handle(&self) -> &ApiHandle {
        self.handle
            .as_ref()
            .expect("test API handle should be initialized")
    }
}

impl Drop for TestApi {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop().expect("failed to stop API server");
        }
    }
}

#[test]
fn intrusion_status_tracks_the_alert_flag() -> Result<()> {
    let api = TestApi::new()?;

    let (headers, body) = get(api.handle(), "/intrusion_status")?;
    assert!(headers.contains("200 OK"));
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["intrusion"], Value::Bool(false));

    api.state.record_intrusion();
    let (_, body) = get(api.handle(), "/intrusion_status")?;
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["intrusion"], Value::Bool(true));

    Ok(())
}

#[test]
fn get_logs_returns_entries_in_insertion_order() -> Result<()> {
    let api = TestApi::new()?;
    for _ in 0..3 {
        api.state.record_intrusion();
    }

    let (headers, body) = get(api.handle(), "/get_logs")?;
    assert!(headers.contains("200 OK"));
    let value: Value = serde_json::from_str(&body)?;
    let logs = value["logs"].as_array().expect("logs array");
    assert_eq!(logs.len(), 3);
    for log in logs {
        assert!(log
            .as_str()
            .expect("log entry is a string")
            .starts_with("Intrusion detected: "));
    }
    assert_eq!(logs.to_vec(), api.state.log_messages().iter().map(|m| Value::String(m.clone())).collect::<Vec<_>>());

    Ok(())
}

#[test]
fn get_logs_is_idempotent() -> Result<()> {
    let api = TestApi::new()?;
    api.state.record_intrusion();
    api.state.record_intrusion();

    let (_, first) = get(api.handle(), "/get_logs")?;
    let (_, second) = get(api.handle(), "/get_logs")?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn status_page_renders_state_and_log() -> Result<()> {
    let api = TestApi::new()?;
    api.state.record_intrusion();

    let (headers, body) = get(api.handle(), "/")?;
    assert!(headers.contains("200 OK"));
    assert!(headers.contains("text/html"));
    assert!(body.contains("Real-time Intrusion Detection Log"));
    assert!(body.contains("<li>Intrusion detected: "));
    assert!(body.contains("background-color: #c0392b"));

    Ok(())
}

#[test]
fn health_endpoint_answers_ok() -> Result<()> {
    let api = TestApi::new()?;

    let (headers, body) = get(api.handle(), "/health")?;
    assert!(headers.contains("200 OK"));
    assert_eq!(body, r#"{"status":"ok"}"#);

    Ok(())
}

#[test]
fn unknown_path_is_404() -> Result<()> {
    let api = TestApi::new()?;

    let (headers, _body) = get(api.handle(), "/no_such_route")?;
    assert!(headers.contains("404 Not Found"));

    Ok(())
}

#[test]
fn non_get_methods_are_rejected() -> Result<()> {
    let api = TestApi::new()?;

    let mut stream = TcpStream::connect(api.handle().addr)?;
    let request = "POST /get_logs HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n";
    stream.write_all(request.as_bytes())?;
    let (headers, _body) = read_response(&mut stream)?;
    assert!(headers.contains("405 Method Not Allowed"));

    Ok(())
}
