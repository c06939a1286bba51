//! Plain HTTP Tests
//!
//! Requests without an upgrade, sent over a raw socket.

use pretty_assertions::assert_eq;
use room_gateway::config::DEFAULT_REDIRECT_URL;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::common::TestApp;

/// Send a bare HTTP/1.1 request and return the raw response.
async fn send(app: &TestApp, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(app.addr).await.unwrap();
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        method, path, app.addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or_default()
}

fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    response
        .lines()
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or_default()
}

#[tokio::test]
async fn test_root_redirects() {
    let app = TestApp::spawn().await;

    let response = send(&app, "GET", "/").await;

    assert_eq!(status_line(&response), "HTTP/1.1 301 Moved Permanently");
    assert_eq!(header(&response, "location"), Some(DEFAULT_REDIRECT_URL));
    assert_eq!(body(&response), "");
}

#[tokio::test]
async fn test_room_path_without_upgrade_requires_upgrade() {
    let app = TestApp::spawn().await;

    for method in ["GET", "POST", "DELETE"] {
        let response = send(&app, method, "/abc").await;

        assert_eq!(status_line(&response), "HTTP/1.1 426 Upgrade Required");
        assert_eq!(header(&response, "upgrade"), Some("websocket"));
        assert_eq!(body(&response), "");
    }
}
