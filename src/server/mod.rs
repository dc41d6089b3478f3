//! MJPEG streaming server.
//!
//! A minimal HTTP/1.1 server over raw TCP sockets. One accept loop, one
//! thread per accepted client, unbounded clients. Only the request line is
//! parsed; there is no header handling, no chunked bodies, no HTTP/1.0
//! fallback. Routes:
//!
//! - `GET /stream`: multipart/x-mixed-replace feed of the latest frame,
//!   paced at ~10 fps, until the client disconnects
//! - `GET /test`: fixed plaintext liveness body
//! - `GET /discover`: the host's private-range LAN IPv4, or `Unknown`
//! - anything else: 404 with an empty body

use crate::frame::FrameStore;
use anyhow::{anyhow, Result};
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const MAX_REQUEST_BYTES: usize = 8192;
const BOUNDARY: &str = "frame";
/// Pacing between stream parts; the sole scheduling throttle (~10 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(100);
const ACCEPT_POLL: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Handle to a running server. Dropping it does not stop the server;
/// call [`stop`](ServerHandle::stop).
#[derive(Debug)]
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Stop accepting connections and join the accept loop. In-flight
    /// stream handlers notice the shutdown flag on their next cycle;
    /// they are not drained.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("stream server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct StreamServer {
    cfg: ServerConfig,
    frames: Arc<FrameStore>,
}

impl StreamServer {
    pub fn new(cfg: ServerConfig, frames: Arc<FrameStore>) -> Self {
        Self { cfg, frames }
    }

    /// Bind and start the accept loop. Bind/listen failures are fatal to
    /// startup: logged here, returned to the caller, never retried.
    pub fn spawn(self) -> Result<ServerHandle> {
        let listener = match TcpListener::bind(&self.cfg.addr) {
            Ok(listener) => listener,
            Err(err) => {
                log::error!("stream server failed to bind {}: {}", self.cfg.addr, err);
                return Err(err.into());
            }
        };
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let frames = self.frames;
        let join = std::thread::spawn(move || {
            if let Err(err) = run_accept_loop(listener, frames, shutdown_thread) {
                log::error!("stream server stopped: {}", err);
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn run_accept_loop(
    listener: TcpListener,
    frames: Arc<FrameStore>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let frames = frames.clone();
                let shutdown = shutdown.clone();
                std::thread::spawn(move || {
                    // Per-connection errors are isolated: a disconnect or a
                    // malformed request closes this socket and nothing else.
                    if let Err(err) = handle_connection(stream, frames, shutdown) {
                        log::debug!("connection {} closed: {}", peer, err);
                    }
                });
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(
    mut stream: TcpStream,
    frames: Arc<FrameStore>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    // Accepted sockets can inherit the listener's nonblocking mode.
    stream.set_nonblocking(false)?;

    let (method, path) = read_request_line(&mut stream)?;
    if method != "GET" {
        return write_response(&mut stream, 404, "text/plain", b"");
    }
    match path.as_str() {
        "/stream" => serve_stream(stream, frames, shutdown),
        "/test" => write_response(&mut stream, 200, "text/plain", b"Camera server is working!"),
        "/discover" => {
            let body = match lan_ipv4() {
                Some(ip) => ip.to_string(),
                None => "Unknown".to_string(),
            };
            write_response(&mut stream, 200, "text/plain", body.as_bytes())
        }
        _ => write_response(&mut stream, 404, "text/plain", b""),
    }
}

/// Emit the latest frame as multipart parts until the client goes away.
/// A failed send is the only termination signal besides server shutdown;
/// Rust masks SIGPIPE, so a dead peer surfaces as an `Err` from `write`.
fn serve_stream(
    mut stream: TcpStream,
    frames: Arc<FrameStore>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let header = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: multipart/x-mixed-replace; boundary={BOUNDARY}\r\n\
         Connection: keep-alive\r\n\
         Cache-Control: no-cache\r\n\r\n"
    );
    send_all(&mut stream, header.as_bytes())?;

    while !shutdown.load(Ordering::SeqCst) {
        if let Some(frame) = frames.current() {
            let part = format!(
                "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                frame.len()
            );
            send_all(&mut stream, part.as_bytes())?;
            send_all(&mut stream, frame.as_jpeg())?;
            send_all(&mut stream, b"\r\n")?;
        }
        std::thread::sleep(FRAME_INTERVAL);
    }
    Ok(())
}

/// Write the whole buffer, resuming partial sends from the correct offset.
fn send_all(stream: &mut TcpStream, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        match stream.write(buf) {
            Ok(0) => return Err(anyhow!("socket closed mid-write")),
            Ok(n) => buf = &buf[n..],
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Read until the end of the request head and return `(method, path)` from
/// the first line. Headers beyond the request line are ignored.
fn read_request_line(stream: &mut TcpStream) -> Result<(String, String)> {
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
    let request_line = text.split("\r\n").next().unwrap_or("");
    parse_request_line(request_line)
}

fn parse_request_line(line: &str) -> Result<(String, String)> {
    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or_else(|| anyhow!("empty request"))?;
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;
    let path = raw_path.split('?').next().unwrap_or(raw_path);
    Ok((method.to_string(), path.to_string()))
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let status_line = match status {
        200 => "HTTP/1.1 200 OK",
        404 => "HTTP/1.1 404 Not Found",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let header = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\n\r\n",
        len = body.len()
    );
    send_all(stream, header.as_bytes())?;
    send_all(stream, body)?;
    Ok(())
}

/// The host's LAN IPv4, learned by routing a UDP socket toward a public
/// address (no packet is sent) and reading the chosen local address. Only
/// private-range, non-loopback addresses count; anything else (cellular,
/// some corporate subnets) reports as unknown.
fn lan_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if is_private_lan(ip) => Some(ip),
        _ => None,
    }
}

fn is_private_lan(ip: Ipv4Addr) -> bool {
    if ip.is_loopback() {
        return false;
    }
    let octets = ip.octets();
    octets[0] == 10 || octets[0] == 172 || (octets[0] == 192 && octets[1] == 168)
}
