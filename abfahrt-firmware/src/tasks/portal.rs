//! Configuration portal
//!
//! While the state machine is in `ConfigPortal`, a TCP listener on port 80
//! serves the current configuration document on GET and accepts a
//! replacement on POST. Accepted documents go to the controller, which
//! persists and applies them. No captive-portal UI, just the document.

use core::fmt::Write as _;

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;
use heapless::String;

use abfahrt_core::config::{encode_config, AppConfig, ConfigDecoder};

use crate::channels::{PortalCommand, PORTAL_CMD, PORTAL_SAVED};

const PORT: u16 = 80;
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);
const REQ_BUF_SIZE: usize = 1024;

#[embassy_executor::task]
pub async fn portal_task(stack: Stack<'static>) {
    info!("portal task started");

    loop {
        // Parked until the controller starts the portal
        let mut current = loop {
            match PORTAL_CMD.wait().await {
                PortalCommand::Start(cfg) => break cfg,
                PortalCommand::Stop => continue,
            }
        };
        info!("portal serving on port {}", PORT);

        'serving: loop {
            let mut rx_buf = [0u8; REQ_BUF_SIZE];
            let mut tx_buf = [0u8; REQ_BUF_SIZE];
            let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
            socket.set_timeout(Some(SOCKET_TIMEOUT));

            match select(PORTAL_CMD.wait(), socket.accept(PORT)).await {
                Either::First(PortalCommand::Stop) => break 'serving,
                Either::First(PortalCommand::Start(cfg)) => current = cfg,
                Either::Second(Err(_)) => continue,
                Either::Second(Ok(())) => handle_client(&mut socket, &mut current).await,
            }
        }
        info!("portal stopped");
    }
}

async fn handle_client(socket: &mut TcpSocket<'_>, current: &mut AppConfig) {
    let mut req = [0u8; REQ_BUF_SIZE];
    let mut len = 0;
    while len < req.len() {
        match socket.read(&mut req[len..]).await {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(_) => return,
        }
        if request_complete(&req[..len]) {
            break;
        }
    }
    let request = &req[..len];

    if request.starts_with(b"GET ") {
        let doc = encode_config(current);
        respond(socket, "200 OK", "application/json", doc.as_bytes()).await;
    } else if request.starts_with(b"POST ") {
        match body_of(request) {
            Some(body) => {
                let mut decoder = ConfigDecoder::with_base(current.clone());
                let mut ok = true;
                for &b in body {
                    if decoder.feed(b).is_err() {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    let cfg = decoder.finish();
                    *current = cfg.clone();
                    if PORTAL_SAVED.try_send(cfg).is_err() {
                        warn!("portal: previous save still pending");
                    }
                    respond(socket, "200 OK", "text/plain", b"saved\n").await;
                } else {
                    respond(socket, "400 Bad Request", "text/plain", b"bad json\n").await;
                }
            }
            None => respond(socket, "400 Bad Request", "text/plain", b"no body\n").await,
        }
    } else {
        respond(socket, "405 Method Not Allowed", "text/plain", b"\n").await;
    }

    socket.close();
}

/// Headers complete, and for POST the announced body length arrived
fn request_complete(req: &[u8]) -> bool {
    let Some(header_end) = find(req, b"\r\n\r\n") else {
        return false;
    };
    if !req.starts_with(b"POST ") {
        return true;
    }
    let body_len = req.len() - (header_end + 4);
    body_len >= content_length(&req[..header_end]).unwrap_or(0)
}

fn body_of(req: &[u8]) -> Option<&[u8]> {
    let header_end = find(req, b"\r\n\r\n")?;
    let body = &req[header_end + 4..];
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

fn content_length(headers: &[u8]) -> Option<usize> {
    for line in headers.split(|&b| b == b'\n') {
        let Ok(line) = core::str::from_utf8(line) else {
            continue;
        };
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        if name.eq_ignore_ascii_case("content-length") {
            return value.trim().parse().ok();
        }
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn respond(socket: &mut TcpSocket<'_>, status: &str, content_type: &str, body: &[u8]) {
    let mut head: String<128> = String::new();
    let _ = write!(
        head,
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    let _ = socket.write_all(body).await;
    let _ = socket.flush().await;
}
