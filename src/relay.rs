use std::io;

use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use futures::stream;
use reqwest::Client;
use tracing::warn;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::require_absolute_http_url;

/// Streams a resolved direct media URL back to the caller. Bytes are piped
/// chunk by chunk, never buffered whole; the transfer aborts once it crosses
/// the configured byte cap, and dropping the response body (client
/// disconnect) drops the upstream request with it.
pub struct RelayDownloader {
    client: Client,
    max_file_size: u64,
}

impl RelayDownloader {
    pub fn new(client: Client, max_file_size: u64) -> Self {
        Self {
            client,
            max_file_size,
        }
    }

    pub async fn relay(
        &self,
        url: &str,
        filename_hint: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let target = require_absolute_http_url(url)?;

        let response = self.client.get(target).send().await.map_err(|error| {
            GatewayError::DownloadFailed(format!("could not reach the media origin: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::DownloadFailed(format!(
                "media origin responded with status {status}"
            )));
        }

        let content_length = response.content_length();
        if let Some(length) = content_length
            && length > self.max_file_size
        {
            return Err(GatewayError::FileTooLarge {
                limit: self.max_file_size,
            });
        }

        let filename = build_filename(filename_hint);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&build_content_disposition(&filename)).map_err(|_| {
                GatewayError::DownloadFailed("could not build the attachment header".to_string())
            })?,
        );
        if let Some(length) = content_length {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }

        // The stream owns the reqwest response; hyper dropping the body on
        // client disconnect aborts the in-flight upstream fetch.
        let cap = self.max_file_size;
        let body = Body::from_stream(stream::try_unfold(
            (response, 0u64),
            move |(mut response, transferred)| async move {
                match response.chunk().await {
                    Ok(Some(chunk)) => match advance_transfer(transferred, chunk.len(), cap) {
                        Some(transferred) => Ok(Some((chunk, (response, transferred)))),
                        None => {
                            warn!(cap, "relay aborted: transfer exceeded the configured cap");
                            Err(io::Error::other(format!(
                                "transfer exceeds the configured limit of {cap} bytes"
                            )))
                        }
                    },
                    Ok(None) => Ok(None),
                    Err(error) => {
                        warn!(%error, "relay aborted: upstream stream failed");
                        Err(io::Error::other(format!("upstream stream failed: {error}")))
                    }
                }
            },
        ));

        Ok((headers, body).into_response())
    }
}

/// Running byte counter for the cap check; `None` means the cap was crossed.
fn advance_transfer(transferred: u64, chunk_len: usize, cap: u64) -> Option<u64> {
    let transferred = transferred + chunk_len as u64;
    (transferred <= cap).then_some(transferred)
}

fn build_filename(hint: Option<&str>) -> String {
    let base = hint
        .map(sanitize_ascii_filename)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("reelspot-{}", Uuid::new_v4()));
    let base = base
        .strip_suffix(".mp4")
        .map(ToString::to_string)
        .unwrap_or(base);
    format!("{base}.mp4")
}

fn build_content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{filename}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

fn sanitize_ascii_filename(value: &str) -> String {
    let mut sanitized = String::with_capacity(value.len());

    for character in value.chars() {
        if character.is_ascii_alphanumeric()
            || matches!(character, '.' | '-' | '_' | ' ' | '(' | ')')
        {
            sanitized.push(character);
        } else {
            sanitized.push('_');
        }
    }

    sanitized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_with_cap(cap: u64) -> RelayDownloader {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        RelayDownloader::new(client, cap)
    }

    #[tokio::test]
    async fn relays_every_byte_of_a_multi_chunk_body() {
        let server = MockServer::start().await;
        let payload = vec![0xAB_u8; 4 * 1024 * 1024];
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let response = relay_with_cap(8 * 1024 * 1024)
            .relay(&format!("{}/v.mp4", server.uri()), Some("My Clip"))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"My Clip.mp4\""));

        let collected = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(collected.len(), payload.len());
        assert_eq!(&collected[..], &payload[..]);
    }

    #[tokio::test]
    async fn oversized_declared_length_is_rejected_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 2048]))
            .mount(&server)
            .await;

        let error = relay_with_cap(1024)
            .relay(&format!("{}/v.mp4", server.uri()), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "FileTooLarge");
        assert_eq!(error.status(), axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    /// Minimal chunked-transfer upstream that never sends a Content-Length,
    /// so nothing short of the streamed body path can enforce the cap.
    async fn spawn_chunked_upstream(chunks: usize, chunk_size: usize, stall_after: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request_head(&mut socket).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")
                .await;
            for _ in 0..chunks {
                let _ = socket
                    .write_all(format!("{chunk_size:x}\r\n").as_bytes())
                    .await;
                let _ = socket.write_all(&vec![0x7F_u8; chunk_size]).await;
                let _ = socket.write_all(b"\r\n").await;
            }
            if stall_after {
                // Hold the connection open without terminating the body.
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });

        format!("http://{addr}/v.mp4")
    }

    async fn read_request_head(socket: &mut TcpStream) {
        let mut head = Vec::new();
        let mut buffer = [0_u8; 256];
        loop {
            let read = socket.read(&mut buffer).await.unwrap();
            head.extend_from_slice(&buffer[..read]);
            if read == 0 || head.windows(4).any(|window| window == b"\r\n\r\n") {
                break;
            }
        }
    }

    #[tokio::test]
    async fn midstream_cap_crossing_aborts_a_chunked_body() {
        // Four 4 KiB chunks against a 4 KiB cap. Without a declared length
        // the pre-stream check cannot fire, so the abort must come from the
        // body stream itself.
        let url = spawn_chunked_upstream(4, 4096, false).await;

        let response = relay_with_cap(4096).relay(&url, None).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let error = response.into_body().collect().await.unwrap_err();
        assert!(error.to_string().contains("configured limit"), "{error}");
    }

    #[tokio::test]
    async fn first_bytes_arrive_while_the_upstream_is_still_open() {
        // One chunk, then the upstream stalls without finishing the body.
        // The relayed stream must hand that chunk over anyway, which it
        // could not do if the relay buffered the whole response first.
        let url = spawn_chunked_upstream(1, 8192, true).await;

        let response = relay_with_cap(1024 * 1024).relay(&url, None).await.unwrap();
        let mut body = response.into_body().into_data_stream();

        let first = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .expect("first chunk should arrive before the upstream completes")
            .expect("body ended before any data arrived")
            .unwrap();
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_status_is_a_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let error = relay_with_cap(1024)
            .relay(&format!("{}/v.mp4", server.uri()), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "DownloadFailed");
    }

    #[tokio::test]
    async fn unreachable_origin_is_a_download_failure() {
        // Nothing listens on this port.
        let error = relay_with_cap(1024)
            .relay("http://127.0.0.1:1/v.mp4", None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "DownloadFailed");
    }

    #[tokio::test]
    async fn non_absolute_url_is_invalid() {
        let error = relay_with_cap(1024).relay("v.mp4", None).await.unwrap_err();
        assert_eq!(error.kind(), "InvalidUrl");
    }

    #[test]
    fn cap_counter_aborts_once_crossed() {
        assert_eq!(advance_transfer(0, 512, 1024), Some(512));
        assert_eq!(advance_transfer(512, 512, 1024), Some(1024));
        assert_eq!(advance_transfer(1024, 1, 1024), None);
    }

    #[test]
    fn filenames_are_sanitized_and_suffixed() {
        assert_eq!(build_filename(Some("My Clip")), "My Clip.mp4");
        assert_eq!(build_filename(Some("clip.mp4")), "clip.mp4");
        assert_eq!(build_filename(Some("a/b:c")), "a_b_c.mp4");
        assert!(build_filename(None).starts_with("reelspot-"));
        assert!(build_filename(Some("???")).ends_with(".mp4"));
    }
}
