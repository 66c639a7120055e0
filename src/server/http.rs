//! Minimal HTTP/1.1 framing for the glyph endpoints.
//!
//! Only what a tile client needs: `GET`/`HEAD` request heads (bodies are
//! never read) and `Connection: close` responses with a known length.

use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Time a client gets to send its request head.
pub const HEAD_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Connection closed before a request was received")]
    Closed,
    #[error("Malformed request: {0}")]
    Malformed(&'static str),
    #[error("Request head exceeds {MAX_HEAD_BYTES} bytes")]
    TooLarge,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased method.
    pub method: String,
    /// Raw (still percent-encoded) path, query string removed.
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_head(&self) -> bool {
        self.method == "HEAD"
    }
}

/// Read a request head from `reader`.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Request, HttpError> {
    let mut consumed = 0usize;
    let mut line = String::new();

    read_head_line(reader, &mut line, &mut consumed).await?;
    if line.is_empty() {
        return Err(HttpError::Closed);
    }
    let mut parts = line.trim_end().split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::Malformed("request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed("HTTP version"));
    }
    if !target.starts_with('/') {
        return Err(HttpError::Malformed("request target"));
    }
    let path = target.split_once('?').map_or(target, |(path, _)| path);
    let mut request = Request {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
        headers: Vec::new(),
    };

    loop {
        line.clear();
        read_head_line(reader, &mut line, &mut consumed).await?;
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or(HttpError::Malformed("header line"))?;
        request
            .headers
            .push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(request)
}

async fn read_head_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    line: &mut String,
    consumed: &mut usize,
) -> Result<(), HttpError> {
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    *consumed += n;
    if *consumed > MAX_HEAD_BYTES {
        return Err(HttpError::TooLarge);
    }
    let text = std::str::from_utf8(&buf).map_err(|_| HttpError::Malformed("request encoding"))?;
    line.push_str(text);
    Ok(())
}

/// A response ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.into().into_bytes())
    }

    pub fn json(body: Vec<u8>) -> Self {
        Self::new(200, "application/json", body)
    }

    /// Glyph PBF response.
    pub fn protobuf(body: Vec<u8>) -> Self {
        Self::new(200, "application/x-protobuf", body)
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Serialize the status line and headers.
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status)).as_bytes(),
        );
        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        buf.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        buf.extend_from_slice(b"Connection: close\r\n\r\n");
        buf
    }

    /// Write the response; `HEAD` responses carry the headers only.
    pub async fn write_to<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut W,
        head_only: bool,
    ) -> std::io::Result<()> {
        writer.write_all(&self.head_bytes()).await?;
        if !head_only {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        304 => "Not Modified",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// Decode `%XX` escapes in a path segment. `+` is kept literally.
pub fn percent_decode(input: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input.as_bytes();

    while let Some((&b, tail)) = rest.split_first() {
        if b == b'%' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }

    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> Result<Request, HttpError> {
        let mut reader = BufReader::new(raw.as_bytes());
        read_request(&mut reader).await
    }

    #[tokio::test]
    async fn test_read_request() {
        let request = parse(
            "get /fonts/Open%20Sans%20Regular/0-255.pbf?key=abc HTTP/1.1\r\nHost: localhost\r\nX-Test:  yes \r\n\r\n",
        )
        .await
        .expect("request should parse");

        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/fonts/Open%20Sans%20Regular/0-255.pbf");
        assert_eq!(request.header("host"), Some("localhost"));
        assert_eq!(request.header("x-test"), Some("yes"));
    }

    #[tokio::test]
    async fn test_read_request_errors() {
        assert!(matches!(parse("").await, Err(HttpError::Closed)));
        assert!(matches!(
            parse("GET /\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));
        assert!(matches!(
            parse("GET / SPDY/3\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));
        assert!(matches!(
            parse("GET http://example.com/ HTTP/1.1\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));
        assert!(matches!(
            parse("GET / HTTP/1.1\r\nno colon here\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));

        let huge = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(MAX_HEAD_BYTES));
        assert!(matches!(parse(&huge).await, Err(HttpError::TooLarge)));
    }

    #[tokio::test]
    async fn test_non_utf8_head_is_malformed() {
        for raw in [
            &b"GET /fonts/\xff\xfe/0-255.pbf HTTP/1.1\r\n\r\n"[..],
            &b"GET / HTTP/1.1\r\nX-Name: \xc3\x28\r\n\r\n"[..],
        ] {
            let mut reader = BufReader::new(raw);
            assert!(matches!(
                read_request(&mut reader).await,
                Err(HttpError::Malformed("request encoding"))
            ));
        }
    }

    #[tokio::test]
    async fn test_write_response() {
        let response = Response::protobuf(vec![1, 2, 3]).header("Access-Control-Allow-Origin", "*");
        let mut out = Vec::new();
        response.write_to(&mut out, false).await.unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: application/x-protobuf\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Content-Length: 3\r\n"));
        assert!(out.ends_with(&[b'\n', 1, 2, 3]));

        let mut head = Vec::new();
        response.write_to(&mut head, true).await.unwrap();
        assert!(head.ends_with(b"\r\n\r\n"));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(
            percent_decode("Open%20Sans%20Regular,Noto+Sans").as_deref(),
            Some("Open Sans Regular,Noto+Sans")
        );
        assert_eq!(percent_decode("S%C3%BCd").as_deref(), Some("Süd"));
        assert_eq!(percent_decode("%2"), None);
        assert_eq!(percent_decode("%zz"), None);
        assert_eq!(percent_decode("%FF"), None);
    }
}
