//! HTTP control and preview surface.
//!
//! A small hand-rolled server on a background thread: trigger a scan, read
//! the inventory and scan status, watch the live MJPEG preview. It carries
//! no engine logic; everything it serves is a snapshot of shared state.
//!
//! Bound to loopback by default. There is no auth: this is an on-device
//! operator surface, keep it off public interfaces.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::frame::Frame;
use crate::state::ScannerState;

const MAX_REQUEST_BYTES: usize = 8192;
/// Pace of the MJPEG preview stream (~10 fps).
const STREAM_FRAME_INTERVAL: Duration = Duration::from_millis(100);
const JPEG_QUALITY: u8 = 80;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8787".to_string(),
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
    state: Arc<ScannerState>,
}

impl ApiServer {
    pub fn new(cfg: ApiConfig, state: Arc<ScannerState>) -> Self {
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
        let state = self.state;
        let join = std::thread::spawn(move || {
            if let Err(err) = run_api(listener, state, shutdown_thread) {
                log::error!("scanner api stopped: {}", err);
            }
        });

        Ok(ApiHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn run_api(
    listener: TcpListener,
    state: Arc<ScannerState>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, &state, &shutdown) {
                    log::warn!("scanner api request rejected: {}", err);
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

#[derive(Serialize)]
struct StatusPayload {
    phase: &'static str,
    remaining_secs: Option<f64>,
}

fn handle_connection(
    mut stream: TcpStream,
    state: &Arc<ScannerState>,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let peer = stream.peer_addr()?;
    let local = stream.local_addr()?;
    if local.ip().is_loopback() && !peer.ip().is_loopback() {
        write_json_response(&mut stream, 403, r#"{"error":"forbidden"}"#)?;
        return Ok(());
    }

    let request = read_request(&mut stream)?;
    match request.path.as_str() {
        "/health" => {
            require_method(&mut stream, &request, "GET")?;
            write_json_response(&mut stream, 200, r#"{"status":"ok"}"#)
        }
        "/inventory" => {
            require_method(&mut stream, &request, "GET")?;
            let payload = serde_json::to_vec(&state.inventory_snapshot())?;
            write_response(&mut stream, 200, "application/json", &payload)
        }
        "/status" => {
            require_method(&mut stream, &request, "GET")?;
            let status = state.scan_status();
            let payload = serde_json::to_vec(&StatusPayload {
                phase: status.phase.as_str(),
                remaining_secs: status.remaining.map(|d| d.as_secs_f64()),
            })?;
            write_response(&mut stream, 200, "application/json", &payload)
        }
        "/scan/start" => {
            require_method(&mut stream, &request, "POST")?;
            if state.request_scan() {
                log::info!("scan requested via api");
                write_json_response(&mut stream, 202, r#"{"status":"scan_requested"}"#)
            } else {
                write_json_response(&mut stream, 409, r#"{"error":"scan_in_progress"}"#)
            }
        }
        "/stream" => {
            require_method(&mut stream, &request, "GET")?;
            stream_preview(stream, state, shutdown)
        }
        _ => write_json_response(&mut stream, 404, r#"{"error":"not_found"}"#),
    }
}

/// MJPEG preview: multipart/x-mixed-replace of the latest-frame cell.
///
/// Runs until the client hangs up or the server shuts down. Reading
/// slower than the camera writes just skips frames; that is the point of
/// the single-slot cell.
fn stream_preview(
    mut stream: TcpStream,
    state: &Arc<ScannerState>,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let header = "HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary=FRAME\r\nCache-Control: no-store\r\n\r\n";
    if stream.write_all(header.as_bytes()).is_err() {
        return Ok(());
    }

    while !shutdown.load(Ordering::SeqCst) {
        let Some(frame) = state.latest.snapshot() else {
            std::thread::sleep(STREAM_FRAME_INTERVAL);
            continue;
        };
        let jpeg = match encode_jpeg(&frame) {
            Ok(jpeg) => jpeg,
            Err(err) => {
                log::warn!("preview frame encode failed: {}", err);
                break;
            }
        };

        let part = format!(
            "--FRAME\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            jpeg.len()
        );
        if stream.write_all(part.as_bytes()).is_err()
            || stream.write_all(&jpeg).is_err()
            || stream.write_all(b"\r\n").is_err()
        {
            // client disconnected
            break;
        }
        std::thread::sleep(STREAM_FRAME_INTERVAL);
    }
    Ok(())
}

fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder.encode(
        &frame.pixels,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg)
}

fn require_method(stream: &mut TcpStream, request: &HttpRequest, method: &str) -> Result<()> {
    if request.method != method {
        write_json_response(stream, 405, r#"{"error":"method_not_allowed"}"#)?;
        return Err(anyhow!(
            "{} {} requires method {}",
            request.method,
            request.path,
            method
        ));
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
        202 => "HTTP/1.1 202 Accepted",
        403 => "HTTP/1.1 403 Forbidden",
        404 => "HTTP/1.1 404 Not Found",
        405 => "HTTP/1.1 405 Method Not Allowed",
        409 => "HTTP/1.1 409 Conflict",
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
