use serde_json::Value;
use std::time::Duration;

/// Raw HTTP result: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two calls the Delivery Client needs from an HTTP stack.
///
/// `Err` means no complete response came back (DNS, connect, TLS,
/// timeout, a body cut short); any status code, including 4xx/5xx, is `Ok`.
pub trait HttpTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, String>;

    fn get(&self, url: &str, api_key: &str, timeout: Duration) -> Result<HttpResponse, String>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, String> {
        (**self).post_json(url, api_key, body, timeout)
    }

    fn get(&self, url: &str, api_key: &str, timeout: Duration) -> Result<HttpResponse, String> {
        (**self).get(url, api_key, timeout)
    }
}

/// Blocking reqwest client, built per call with the requested timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    fn client(timeout: Duration) -> Result<reqwest::blocking::Client, String> {
        reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, String> {
        let resp = Self::client(timeout)?
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body)
            .send()
            .map_err(|e| format!("Resend request failed: {}", e))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|e| format!("Resend response read failed: {}", e))?;
        Ok(HttpResponse::new(status, text))
    }

    fn get(&self, url: &str, api_key: &str, timeout: Duration) -> Result<HttpResponse, String> {
        let resp = Self::client(timeout)?
            .get(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .map_err(|e| format!("Resend request failed: {}", e))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|e| format!("Resend response read failed: {}", e))?;
        Ok(HttpResponse::new(status, text))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// One request as the fake saw it.
    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: &'static str,
        pub url: String,
        pub api_key: String,
        pub body: Option<Value>,
        pub timeout: Duration,
    }

    /// Scripted transport: replays queued responses in order and records
    /// every request it receives.
    #[derive(Default)]
    pub struct FakeTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
        pub requests: RefCell<Vec<Recorded>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn fail(self, err: &str) -> Self {
            self.responses.borrow_mut().push_back(Err(err.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last(&self) -> Recorded {
            self.requests
                .borrow()
                .last()
                .cloned()
                .expect("no request recorded")
        }

        fn next(&self) -> Result<HttpResponse, String> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, r#"{"id":"fake"}"#)))
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_json(
            &self,
            url: &str,
            api_key: &str,
            body: &Value,
            timeout: Duration,
        ) -> Result<HttpResponse, String> {
            self.requests.borrow_mut().push(Recorded {
                method: "POST",
                url: url.to_string(),
                api_key: api_key.to_string(),
                body: Some(body.clone()),
                timeout,
            });
            self.next()
        }

        fn get(&self, url: &str, api_key: &str, timeout: Duration) -> Result<HttpResponse, String> {
            self.requests.borrow_mut().push(Recorded {
                method: "GET",
                url: url.to_string(),
                api_key: api_key.to_string(),
                body: None,
                timeout,
            });
            self.next()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}";

    /// Accept one connection on loopback, answer with `response`, and hand
    /// back the request head (request line plus headers), lowercased.
    fn serve_once(path: &str, response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}{}", listener.local_addr().unwrap(), path);
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.is_empty() || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let head = head.to_ascii_lowercase();
            let len = header_values(&head, "content-length")
                .first()
                .map(|v| v.parse::<usize>().unwrap())
                .unwrap_or(0);
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            head
        });
        (url, handle)
    }

    fn header_values<'a>(head: &'a str, name: &str) -> Vec<&'a str> {
        head.lines()
            .filter_map(|l| l.split_once(':'))
            .filter(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim())
            .collect()
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(202, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(422, "").is_success());
    }

    #[test]
    fn test_post_sends_bearer_and_json_headers() {
        let (url, server) = serve_once("/emails", OK_RESPONSE);
        let resp = ReqwestTransport
            .post_json(&url, "re_k", &json!({"subject": "hi"}), Duration::from_secs(5))
            .unwrap();
        assert_eq!(resp, HttpResponse::new(200, "{}"));

        let head = server.join().unwrap();
        assert!(head.starts_with("post /emails http/1.1"));
        assert_eq!(header_values(&head, "authorization"), vec!["bearer re_k"]);
        assert_eq!(header_values(&head, "content-type"), vec!["application/json"]);
        assert_eq!(header_values(&head, "accept"), vec!["application/json"]);
    }

    #[test]
    fn test_get_sends_only_bearer() {
        let (url, server) = serve_once("/domains", OK_RESPONSE);
        let resp = ReqwestTransport
            .get(&url, "re_k", Duration::from_secs(5))
            .unwrap();
        assert_eq!(resp.status, 200);

        let head = server.join().unwrap();
        assert!(head.starts_with("get /domains http/1.1"));
        assert_eq!(header_values(&head, "authorization"), vec!["bearer re_k"]);
        assert!(header_values(&head, "content-type").is_empty());
        assert!(!header_values(&head, "accept").contains(&"application/json"));
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let (url, server) = serve_once(
            "/emails",
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"mess",
        );
        let err = ReqwestTransport
            .post_json(&url, "re_k", &json!({}), Duration::from_secs(5))
            .unwrap_err();
        assert!(err.starts_with("Resend response read failed"), "{}", err);
        server.join().unwrap();
    }
}
