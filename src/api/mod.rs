//! Status server.
//!
//! A minimal HTTP/1.1 server on a background thread exposing read-only views
//! of the shared [`WatchState`]:
//!
//! - `GET /` — status page (polling HTML view)
//! - `GET /intrusion_status` — `{"intrusion": <bool>}`
//! - `GET /get_logs` — `{"logs": [<string>, ...]}` in insertion order
//! - `GET /health` — liveness probe
//!
//! All reads are idempotent and side-effect free; the server never writes to
//! the shared state.

use anyhow::{anyhow, Result};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::state::WatchState;

const MAX_REQUEST_BYTES: usize = 8192;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8780".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ApiHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ApiHandle {
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("api server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct ApiServer {
    cfg: ApiConfig,
    state: Arc<WatchState>,
}

impl ApiServer {
    pub fn new(cfg: ApiConfig, state: Arc<WatchState>) -> Self {
        Self { cfg, state }
    }

    pub fn spawn(self) -> Result<ApiHandle> {
        let configured_addr: SocketAddr = self.cfg.addr.parse()?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        if configured_addr.ip().is_loopback() && !addr.ip().is_loopback() {
            return Err(anyhow!(
                "api configured for loopback address '{}', but bound to non-loopback address '{}'",
                configured_addr,
                addr
            ));
        }
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let state = self.state.clone();
        let join = std::thread::spawn(move || {
            if let Err(err) = run_api(listener, state, shutdown_thread) {
                log::error!("status api stopped: {}", err);
            }
        });

        Ok(ApiHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn run_api(listener: TcpListener, state: Arc<WatchState>, shutdown: Arc<AtomicBool>) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, &state) {
                    log::warn!("status api request rejected: {}", err);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, state: &WatchState) -> Result<()> {
    let peer = stream.peer_addr()?;
    let local = stream.local_addr()?;
    if local.ip().is_loopback() && !peer.ip().is_loopback() {
        write_json_response(&mut stream, 403, r#"{"error":"forbidden"}"#)?;
        return Ok(());
    }

    let request = read_request(&mut stream)?;
    if request.method != "GET" {
        write_json_response(&mut stream, 405, r#"{"error":"method_not_allowed"}"#)?;
        return Ok(());
    }

    match request.path.as_str() {
        "/" => {
            let page = render_status_page(state);
            write_response(&mut stream, 200, "text/html; charset=utf-8", page.as_bytes())?;
        }
        "/intrusion_status" => {
            let payload = serde_json::json!({ "intrusion": state.intrusion() });
            write_json_response(&mut stream, 200, &payload.to_string())?;
        }
        "/get_logs" => {
            let payload = serde_json::json!({ "logs": state.log_messages() });
            write_json_response(&mut stream, 200, &payload.to_string())?;
        }
        "/health" => {
            write_json_response(&mut stream, 200, r#"{"status":"ok"}"#)?;
        }
        _ => {
            write_json_response(&mut stream, 404, r#"{"error":"not_found"}"#)?;
        }
    }
    Ok(())
}

fn read_request(stream: &mut TcpStream) -> Result<HttpRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    let mut buf = [0u8; 1024];
    let mut data = Vec::new();
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            return Err(anyhow!("request too large"));
        }
        if data.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let text = String::from_utf8_lossy(&data);
    let request_line = text
        .split("\r\n")
        .next()
        .ok_or_else(|| anyhow!("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or_else(|| anyhow!("missing method"))?;
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;
    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();
    Ok(HttpRequest {
        method: method.to_string(),
        path,
    })
}

fn write_json_response(stream: &mut TcpStream, status: u16, body: &str) -> Result<()> {
    write_response(stream, status, "application/json", body.as_bytes())
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let status_line = match status {
        200 => "HTTP/1.1 200 OK",
        403 => "HTTP/1.1 403 Forbidden",
        404 => "HTTP/1.1 404 Not Found",
        405 => "HTTP/1.1 405 Method Not Allowed",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let header = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nCache-Control: no-store\r\n\r\n",
        status_line = status_line,
        content_type = content_type,
        len = body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(body)?;
    Ok(())
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
}

/// Render the status page: background color tracks the alert flag, the log
/// renders as a list, and a 1-second polling script keeps both fresh.
fn render_status_page(state: &WatchState) -> String {
    let intrusion = state.intrusion();
    let background = if intrusion { "#c0392b" } else { "#ffffff" };
    let mut items = String::new();
    for message in state.log_messages() {
        items.push_str("      <li>");
        items.push_str(&escape_html(&message));
        items.push_str("</li>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Intrusion Detection Log</title>
  <style>
    body {{ background-color: {background}; transition: background-color 0.5s; font-family: sans-serif; }}
  </style>
</head>
<body>
  <h1>Real-time Intrusion Detection Log</h1>
  <ul id="log-list">
{items}  </ul>
  <script>
    function updateLogs() {{
      fetch('/get_logs')
        .then(response => response.json())
        .then(data => {{
          const logList = document.getElementById('log-list');
          logList.innerHTML = '';
          data.logs.forEach(log => {{
            const li = document.createElement('li');
            li.textContent = log;
            logList.appendChild(li);
          }});
        }});
    }}

    function checkIntrusionStatus() {{
      fetch('/intrusion_status')
        .then(response => response.json())
        .then(data => {{
          document.body.style.backgroundColor = data.intrusion ? '#c0392b' : '#ffffff';
        }});
    }}

    setInterval(() => {{
      checkIntrusionStatus();
      updateLogs();
    }}, 1000);
  </script>
</body>
</html>
"#
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_page_reflects_state() {
        let state = WatchState::new();
        let page = render_status_page(&state);
        assert!(page.contains("body { background-color: #ffffff;"));
        assert!(!page.contains("<li>"));

        state.record_intrusion();
        let page = render_status_page(&state);
        assert!(page.contains("body { background-color: #c0392b;"));
        assert!(page.contains("<li>Intrusion detected: "));
    }

    #[test]
    fn html_escaping_covers_markup_characters() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
