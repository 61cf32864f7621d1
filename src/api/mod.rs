//! HTTP client for the appointments API.

mod error;

use std::time::Duration;

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Appointment, Client, Dni, NewAppointment};

pub use error::ApiError;

/// Thin wrapper around a `reqwest::Client` bound to one API base URL
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url(), config.request_timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// Resolve path segments against the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /api/appointments`
    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "appointments"]);
        info!(%url, dni = %appointment.dni, date = %appointment.date, "creating appointment");

        let response = self.send(self.http.post(url).json(appointment)).await?;
        read_success_body(response).await?;

        debug!("appointment created");
        Ok(())
    }

    /// `GET /api/appointments?dni=<dni>`
    pub async fn search_appointments(&self, dni: &Dni) -> Result<Vec<Appointment>, ApiError> {
        let mut url = self.endpoint(&["api", "appointments"]);
        url.query_pairs_mut().append_pair("dni", dni.as_str());
        info!(%url, "searching appointments");

        let response = self.send(self.http.get(url)).await?;
        let appointments: Vec<Appointment> = decode(response).await?;

        debug!(count = appointments.len(), "appointment search returned");
        Ok(appointments)
    }

    /// `GET /api/clients/:id`
    pub async fn get_client(&self, id: &str) -> Result<Client, ApiError> {
        let url = self.endpoint(&["api", "clients", id]);
        info!(%url, "fetching client");

        let response = self.send(self.http.get(url)).await?;
        let client: Client = decode(response).await?;

        debug!(name = %client.name, "client fetched");
        Ok(client)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|err| {
            warn!(error = %err, "API request did not complete");
            ApiError::Transport(err)
        })
    }
}

async fn read_success_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        let err = ApiError::from_response_body(status, &body);
        warn!(%status, message = ?err.server_message(), "API reported a failure");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = read_success_body(response).await?;
    serde_json::from_str(&body).map_err(|err| {
        warn!(error = %err, "API response did not match the expected shape");
        ApiError::Decode(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Accept one connection, answer it with the given status and body, and
    /// hand back the raw request that was received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn request_body(raw: &str) -> &str {
        raw.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    fn sample_payload() -> NewAppointment {
        NewAppointment {
            title: "Baño".into(),
            appointment_type: "Spa".into(),
            description: Some("Perro grande".into()),
            date: "2025-03-04T19:30:00.000Z".into(),
            time: "14:30".into(),
            client_id: None,
            dni: "12345678".into(),
            address: "Av. Costanera 120".into(),
            zone: "Zona Puerto".into(),
        }
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let api = ApiClient::with_base_url("http://localhost:3000/", TIMEOUT).unwrap();

        assert_eq!(
            api.endpoint(&["api", "appointments"]).as_str(),
            "http://localhost:3000/api/appointments"
        );
        assert_eq!(
            api.endpoint(&["api", "clients", "a b/c"]).as_str(),
            "http://localhost:3000/api/clients/a%20b%2Fc"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let api = ApiClient::with_base_url("https://example.com/citas", TIMEOUT).unwrap();

        assert_eq!(
            api.endpoint(&["api", "clients", "7"]).as_str(),
            "https://example.com/citas/api/clients/7"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ApiClient::with_base_url("not a url", TIMEOUT),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiClient::with_base_url("mailto:someone@example.com", TIMEOUT),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn search_sends_dni_verbatim_and_keeps_server_order() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":2,"title":"B","type":"Spa","date":"2025-03-05T10:00:00Z","time":"05:00"},
                {"id":1,"title":"A","type":"Otro","date":"2025-03-04T10:00:00Z","time":"05:00"}]"#,
        )
        .await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        let dni = Dni::parse("12345678").unwrap();
        let results = api.search_appointments(&dni).await.unwrap();

        let request = server.await.unwrap();
        assert!(
            request.starts_with("GET /api/appointments?dni=12345678 HTTP/1.1"),
            "unexpected request: {request}"
        );
        let ids: Vec<RecordId> = results.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![RecordId::Number(2), RecordId::Number(1)]);
    }

    #[tokio::test]
    async fn search_surfaces_server_error_message() {
        let (base, server) = serve_once("404 Not Found", r#"{"error":"No hay citas"}"#).await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        let err = api
            .search_appointments(&Dni::parse("87654321").unwrap())
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message.as_deref(), Some("No hay citas"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_posts_json_payload() {
        let (base, server) = serve_once("201 Created", r#"{"id":99}"#).await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        api.create_appointment(&sample_payload()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/appointments HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));

        let body: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(body["date"], "2025-03-04T19:30:00.000Z");
        assert_eq!(body["type"], "Spa");
        assert_eq!(body["dni"], "12345678");
        assert!(body.get("clientId").is_none());
    }

    #[tokio::test]
    async fn create_reports_server_rejection() {
        let (base, server) = serve_once("400 Bad Request", r#"{"error":"Zona inválida"}"#).await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        let err = api.create_appointment(&sample_payload()).await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.server_message(), Some("Zona inválida"));
    }

    #[tokio::test]
    async fn get_client_decodes_body() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id":"c1","name":"Ana","dni":"45678912","phone":"987654321",
                "createdAt":"2025-01-10T15:00:00Z","updatedAt":"2025-01-11T15:00:00Z"}"#,
        )
        .await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        let client = api.get_client("c1").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/clients/c1 HTTP/1.1"));
        assert_eq!(client.name, "Ana");
        assert_eq!(client.phone.as_deref(), Some("987654321"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", "not json").await;
        let api = ApiClient::with_base_url(&base, TIMEOUT).unwrap();

        let err = api.get_client("1").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::with_base_url(&format!("http://{addr}"), TIMEOUT).unwrap();
        let err = api.get_client("1").await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }
}
