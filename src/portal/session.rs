//! Portal login and the cookie-carrying transport.
//!
//! Authentication is a single form-encoded POST. Every `Set-Cookie` header on
//! a successful response is captured verbatim into a [`Session`]; no cookie is
//! interpreted by name. The session is read-only afterwards; an invalidated
//! session only shows up as a non-success status on a later call.

use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the one-shot portal login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Anything other than HTTP 200, redirects included.
    #[error("login rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("login request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One cookie captured from a `Set-Cookie` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    /// Attribute tail of the original header (`Path=/; HttpOnly; ...`).
    pub attributes: String,
}

/// The cookies proving an authenticated identity to the portal.
#[derive(Debug, Clone, Default)]
pub struct Session {
    cookies: Vec<SessionCookie>,
}

impl Session {
    /// Capture every `Set-Cookie` header, in response order.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();
        Self { cookies }
    }

    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for the `Cookie` request header: `name=value` pairs joined with
    /// `; `, attributes dropped.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn parse_set_cookie(raw: &str) -> Option<SessionCookie> {
    let (pair, attributes) = match raw.split_once(';') {
        Some((pair, rest)) => (pair, rest.trim().to_string()),
        None => (raw, String::new()),
    };
    let (name, value) = pair.split_once('=')?;
    Some(SessionCookie {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        attributes,
    })
}

/// POST the credential form and capture the session cookies.
///
/// Success is exactly HTTP 200. The caller supplies a client that does not
/// follow redirects, so a 3xx lands here as a rejection with its status and
/// body kept for diagnostics.
pub(crate) async fn login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let form = [("username", username), ("password", password)];
    let response = client
        .post(format!("{base_url}/api/auth/login"))
        .form(&form)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(Session::from_headers(response.headers()))
}

/// Decorator over the shared HTTP client that attaches the session cookies to
/// every outgoing request and delegates. No retry, no refresh, no rotation.
#[derive(Debug, Clone)]
pub(crate) struct AuthedTransport {
    client: reqwest::Client,
    session: Session,
}

impl AuthedTransport {
    pub(crate) fn new(client: reqwest::Client, session: Session) -> Self {
        Self { client, session }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self.client.get(url);
        if !self.session.is_empty() {
            request = request.header(header::COOKIE, self.session.cookie_header());
        }
        request.send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::response::{AppendHeaders, IntoResponse};
    use axum::routing::{get, post};
    use axum::Router;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn no_redirect_client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_set_cookie() {
        let cookie = parse_set_cookie("connect.sid=s%3Aabc123; Path=/; HttpOnly").unwrap();
        assert_eq!(cookie.name, "connect.sid");
        assert_eq!(cookie.value, "s%3Aabc123");
        assert_eq!(cookie.attributes, "Path=/; HttpOnly");

        let bare = parse_set_cookie("token=xyz").unwrap();
        assert_eq!(bare.value, "xyz");
        assert_eq!(bare.attributes, "");

        assert!(parse_set_cookie("not-a-cookie").is_none());
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let session = Session {
            cookies: vec![
                SessionCookie {
                    name: "a".into(),
                    value: "1".into(),
                    attributes: "Path=/".into(),
                },
                SessionCookie {
                    name: "b".into(),
                    value: "2".into(),
                    attributes: String::new(),
                },
            ],
        };
        assert_eq!(session.cookie_header(), "a=1; b=2");
    }

    #[tokio::test]
    async fn test_login_captures_all_cookies() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    AppendHeaders([
                        (SET_COOKIE, "sessionid=abc123; Path=/; HttpOnly"),
                        (SET_COOKIE, "csrftoken=tok456; Path=/"),
                    ]),
                    "ok",
                )
            }),
        );
        let base_url = spawn(app).await;

        let session = login(&no_redirect_client(), &base_url, "jane", "secret")
            .await
            .unwrap();

        assert_eq!(session.cookies().len(), 2);
        assert_eq!(session.cookies()[0].name, "sessionid");
        assert_eq!(session.cookies()[0].value, "abc123");
        assert_eq!(session.cookies()[0].attributes, "Path=/; HttpOnly");
        assert_eq!(session.cookies()[1].name, "csrftoken");
        assert_eq!(session.cookie_header(), "sessionid=abc123; csrftoken=tok456");
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_status_and_body() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad credentials") }),
        );
        let base_url = spawn(app).await;

        let error = login(&no_redirect_client(), &base_url, "jane", "wrong")
            .await
            .unwrap_err();

        match error {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_redirect_is_rejected() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    axum::http::StatusCode::FOUND,
                    AppendHeaders([(LOCATION, "/login-page")]),
                )
                    .into_response()
            }),
        );
        let base_url = spawn(app).await;

        let error = login(&no_redirect_client(), &base_url, "jane", "secret")
            .await
            .unwrap_err();

        assert!(matches!(error, AuthError::Rejected { status: 302, .. }));
    }

    #[tokio::test]
    async fn test_transport_carries_exactly_the_session_cookies() {
        // Echo the Cookie request header back so the test can inspect it.
        let app = Router::new().route(
            "/echo",
            get(|headers: axum::http::HeaderMap| async move {
                headers
                    .get(axum::http::header::COOKIE)
                    .map(|value| value.to_str().unwrap_or("").to_string())
                    .unwrap_or_else(|| "<none>".to_string())
            }),
        );
        let base_url = spawn(app).await;

        let session = Session {
            cookies: vec![
                SessionCookie {
                    name: "sessionid".into(),
                    value: "abc123".into(),
                    attributes: String::new(),
                },
                SessionCookie {
                    name: "csrftoken".into(),
                    value: "tok456".into(),
                    attributes: String::new(),
                },
            ],
        };
        let transport = AuthedTransport::new(reqwest::Client::new(), session);

        let echoed = transport
            .get(&format!("{base_url}/echo"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(echoed, "sessionid=abc123; csrftoken=tok456");

        let empty = AuthedTransport::new(reqwest::Client::new(), Session::default());
        let echoed = empty
            .get(&format!("{base_url}/echo"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(echoed, "<none>");
    }
}
