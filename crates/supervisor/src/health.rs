//! Boolean liveness probe against the job server's `/health` route.

use std::time::Duration;

/// Budget for background liveness checks; keep short to avoid blocking UI.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_millis(1000);
/// Budget for user-triggered checks, where correctness beats latency.
pub const INTERACTIVE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Health URL on the loopback interface. 127.0.0.1 on purpose, `localhost`
/// can resolve to IPv6 on some installs and miss the listener.
pub fn health_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/health")
}

/// True only on HTTP 200. Connection refused, timeouts and non-200 statuses
/// all come back as `false`; this function has no error path.
pub fn check_health(url: &str, timeout: Duration) -> bool {
    match ureq::get(url).timeout(timeout).call() {
        Ok(resp) => resp.status() == 200,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let body = "ok";
                let _ = write!(
                    stream,
                    "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
            }
        });
        format!("http://{addr}/health")
    }

    #[test]
    fn ok_on_http_200() {
        let url = serve_once("HTTP/1.1 200 OK");
        assert!(check_health(&url, LIVENESS_TIMEOUT));
    }

    #[test]
    fn false_on_server_error() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error");
        assert!(!check_health(&url, LIVENESS_TIMEOUT));
    }

    #[test]
    fn false_on_connection_refused() {
        // Bind and drop to get a port nothing listens on.
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        assert!(!check_health(&health_url(port), LIVENESS_TIMEOUT));
    }

    #[test]
    fn false_on_timeout() {
        // Listener that accepts but never responds.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(Duration::from_millis(500));
                drop(stream);
            }
        });
        assert!(!check_health(
            &format!("http://{addr}/health"),
            Duration::from_millis(100)
        ));
    }
}
