use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AuthError, Profile};
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Sign-up answers with a full session, or with just the user when email
/// confirmation is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired(AuthUser),
}

#[derive(Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<AuthUser>,
    id: Option<String>,
    email: Option<String>,
}

impl SignUpResponse {
    fn into_outcome(self) -> Option<SignUpOutcome> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) => Some(SignUpOutcome::SignedIn(AuthSession {
                access_token,
                refresh_token: self.refresh_token,
                user,
            })),
            (None, Some(user)) => Some(SignUpOutcome::ConfirmationRequired(user)),
            (_, None) => self.id.map(|id| {
                SignUpOutcome::ConfirmationRequired(AuthUser {
                    id,
                    email: self.email,
                })
            }),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: String,
}

/// The account operations the app needs from the hosted backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, AuthError>;
    /// Whether a profile other than `user_id` already uses `username`.
    async fn username_taken(
        &self,
        access_token: &str,
        username: &str,
        user_id: &str,
    ) -> Result<bool, AuthError>;
    async fn upsert_profile(&self, access_token: &str, profile: &Profile) -> Result<(), AuthError>;
}

/// Pulls a human-readable message out of a GoTrue or PostgREST error body.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str().map(str::to_string))
}

async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(AuthError::Api { status, message })
}

pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Every request carries the anon key; user calls also carry the
    /// session's bearer token in place of it.
    fn authorized(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(self.anon_key.as_str()))
    }
}

#[async_trait]
impl AuthBackend for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .http
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });
        let response = self.authorized(request, None).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let request = self
            .http
            .post(self.url("/auth/v1/signup"))
            .json(&Credentials { email, password });
        let response = self.authorized(request, None).send().await?;
        let status = response.status();
        let parsed: SignUpResponse = check_status(response).await?.json().await?;
        parsed.into_outcome().ok_or_else(|| AuthError::Api {
            status,
            message: "Sign-up response did not include a user.".into(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self.http.post(self.url("/auth/v1/logout"));
        let response = self.authorized(request, Some(access_token)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, AuthError> {
        let request = self
            .http
            .get(self.url("/rest/v1/profiles"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))]);
        let response = self.authorized(request, Some(access_token)).send().await?;
        let rows: Vec<Profile> = check_status(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn username_taken(
        &self,
        access_token: &str,
        username: &str,
        user_id: &str,
    ) -> Result<bool, AuthError> {
        let request = self.http.get(self.url("/rest/v1/profiles")).query(&[
            ("select", "id".to_string()),
            ("username", format!("eq.{username}")),
            ("id", format!("neq.{user_id}")),
        ]);
        let response = self.authorized(request, Some(access_token)).send().await?;
        let rows: Vec<IdRow> = check_status(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn upsert_profile(&self, access_token: &str, profile: &Profile) -> Result<(), AuthError> {
        let request = self
            .http
            .post(self.url("/rest/v1/profiles"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(profile);
        let response = self.authorized(request, Some(access_token)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves exactly one HTTP response and hands back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn client(url: String) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url,
            anon_key: "anon-key".into(),
        })
    }

    #[test]
    fn picks_the_most_specific_error_message() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            error_message(r#"{"code":400,"msg":"User already registered"}"#).as_deref(),
            Some("User already registered")
        );
        assert_eq!(error_message("<html>").as_deref(), None);
    }

    #[test]
    fn sign_up_without_session_needs_confirmation() {
        let raw = r#"{"id":"u1","email":"a@b.c","confirmation_sent_at":"2024-01-01T00:00:00Z"}"#;
        let parsed: SignUpResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.into_outcome(),
            Some(SignUpOutcome::ConfirmationRequired(AuthUser {
                id: "u1".into(),
                email: Some("a@b.c".into()),
            }))
        );
    }

    #[tokio::test]
    async fn sign_in_posts_password_grant() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"access_token":"tok","refresh_token":"ref","token_type":"bearer","user":{"id":"u1","email":"a@b.c"}}"#,
        )
        .await;

        let session = client(url).sign_in("a@b.c", "secret").await.unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user.id, "u1");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /auth/v1/token?grant_type=password"));
        assert!(request.contains("apikey: anon-key"));
        assert!(request.contains("\"password\":\"secret\""));
    }

    #[tokio::test]
    async fn api_errors_carry_the_service_message() {
        let (url, server) = serve_once(
            "400 Bad Request",
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .await;

        let err = client(url).sign_in("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn username_check_excludes_the_current_user() {
        let (url, server) = serve_once("200 OK", r#"[{"id":"someone-else"}]"#).await;

        assert!(client(url).username_taken("tok", "ada", "u1").await.unwrap());

        let request = server.await.unwrap();
        assert!(request.contains("username=eq.ada"));
        assert!(request.contains("id=neq.u1"));
        assert!(request.contains("authorization: Bearer tok"));
    }
}
