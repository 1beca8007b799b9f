use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::dispatcher::{Dispatcher, JsonResponse};
use super::request::{parse_http_request, Request, RequestError};

/// Largest request line plus headers accepted before answering 431.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;
/// Largest declared body accepted before answering 413.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

enum Head {
    Closed,
    TooLarge,
    Complete { head: Vec<u8>, body_read: usize },
}

async fn read_head<S>(stream: &mut S) -> io::Result<Head>
where
    S: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];

    // Read until we find the header terminator.
    loop {
        if let Some(pos) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            let body_read = data.len() - (pos + 4);
            data.truncate(pos + 4);
            return Ok(Head::Complete {
                head: data,
                body_read,
            });
        }
        if data.len() > MAX_HEADER_BYTES {
            return Ok(Head::TooLarge);
        }
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(if data.is_empty() {
                Head::Closed
            } else {
                Head::Complete {
                    head: data,
                    body_read: 0,
                }
            });
        }
        data.extend_from_slice(&buf[..n]);
    }
}

/// Reads and discards `remaining` body bytes; their content is unused.
async fn drain_body<S>(stream: &mut S, remaining: u64) -> io::Result<()>
where
    S: AsyncRead + Unpin,
{
    if remaining > 0 {
        io::copy(&mut (&mut *stream).take(remaining), &mut io::sink()).await?;
    }
    Ok(())
}

fn accept_request(head: &[u8]) -> Result<(Request, u64), RequestError> {
    let req = parse_http_request(head)?;
    let length = req.content_length()?;
    Ok((req, length))
}

pub fn encode_response(response: &JsonResponse) -> Vec<u8> {
    let body = response.body.to_string();
    let mut out = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        reason_phrase(response.status)
    );
    out.push_str("Content-Type: application/json\r\n");
    out.push_str(&format!("Content-Length: {}\r\n", body.len()));
    out.push_str("Connection: close\r\n\r\n");
    out.push_str(&body);
    out.into_bytes()
}

/// Serves a single request on `stream` and closes it.
pub async fn handle_client<S>(mut stream: S, dispatcher: Dispatcher) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match read_head(&mut stream).await? {
        Head::Closed => {
            debug!("Client closed connection before sending a request");
            return Ok(());
        }
        Head::TooLarge => {
            warn!(limit = MAX_HEADER_BYTES, "Rejecting oversized request head");
            JsonResponse::error(431, "request header section too large")
        }
        Head::Complete { head, body_read } => match accept_request(&head) {
            Ok((_, length)) if length > MAX_BODY_BYTES => {
                warn!(length, limit = MAX_BODY_BYTES, "Rejecting oversized request body");
                JsonResponse::error(413, format!("request body of {length} bytes is too large"))
            }
            Ok((req, length)) => {
                drain_body(&mut stream, length.saturating_sub(body_read as u64)).await?;
                dispatcher.handle(&req)
            }
            Err(err) => {
                warn!(error = %err, "Rejecting request");
                JsonResponse::error(400, err.to_string())
            }
        },
    };

    stream.write_all(&encode_response(&response)).await?;
    stream.shutdown().await
}
