//! Minimal HTTP/1.1 voting site for integration tests.
//!
//! Serves `/id` (a link carrying the current vote token), `/count` (the
//! counter markup) and `/vote/<token>` (counts the vote when the token
//! matches). Every request is recorded for assertions.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const TOKEN: &str = "tok42";

#[derive(Debug, Clone, Copy, Default)]
pub struct VoteServerOptions {
    /// `/id` shows no token for this many requests before opening.
    pub closed_for: usize,
    /// `/vote/...` answers 200 with an empty body (vote still counted).
    pub empty_vote_response: bool,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct State {
    count: i64,
    id_hits: usize,
    requests: Vec<Recorded>,
}

pub struct VoteServer {
    pub base: String,
    state: Arc<Mutex<State>>,
}

impl VoteServer {
    pub fn count(&self) -> i64 {
        self.state.lock().unwrap().count
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Config file text pointing at this server.
    pub fn config_toml(&self, extra: &str) -> String {
        format!(
            r#"
[DEFAULT]
vote_interval = 0.05
already_voted_backoff = 0.05
fetch_tries = 2

[local]
base_url = "{base}vote/{{number}}"
count_url = "{base}count"
id_url = "{base}id"
vote_count_regex = 'class="number-of-votes".*?class="number"> (\d+?)</div>'
id_regex = 'href="/vote/(\w+)"'
{extra}
"#,
            base = self.base
        )
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start(initial_count: i64, opts: VoteServerOptions) -> VoteServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        count: initial_count,
        ..State::default()
    }));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state, opts));
        }
    });
    VoteServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>, opts: VoteServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let (status, body) = {
        let mut st = state.lock().unwrap();
        st.requests.push(request.clone());
        match request.path.as_str() {
            "/id" => {
                st.id_hits += 1;
                if st.id_hits <= opts.closed_for {
                    ("200 OK", "<p>Voting closed for today.</p>".to_string())
                } else {
                    ("200 OK", format!("<a href=\"/vote/{TOKEN}\">Vote</a>"))
                }
            }
            "/count" => (
                "200 OK",
                format!(
                    "<div class=\"number-of-votes\">Votes:\n    <div class=\"number\"> {}</div>\n</div>",
                    st.count
                ),
            ),
            path if path.starts_with("/vote/") => {
                if path == format!("/vote/{TOKEN}") {
                    st.count += 1;
                }
                let body = if opts.empty_vote_response { "" } else { "thanks" };
                ("200 OK", body.to_string())
            }
            _ => ("404 Not Found", String::new()),
        }
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Reads the head, then `Content-Length` bytes of body.
fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..head_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(Recorded {
        method,
        path,
        headers,
        body,
    })
}
