use std::time::Duration;

use crate::acquisition::domain::image_fetcher::ImageFetcher;
use crate::shared::error::FaceDetectionError;

/// Blocking HTTP(S) fetcher with a whole-request timeout.
///
/// Non-success statuses are failures. No retries.
pub struct HttpImageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FaceDetectionError> {
        log::debug!("Fetching image from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FaceDetectionError::acquisition(url, e))?;

        let bytes = response.bytes().map_err(|e| {
            FaceDetectionError::acquisition(url, format!("unable to read response body: {e}"))
        })?;
        log::debug!("Fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one canned HTTP response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let header = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://{addr}/face.jpg")
    }

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_fetch_returns_body() {
        let url = serve_once("200 OK", b"\xFF\xD8\xFFimage-bytes");
        let bytes = fetcher().fetch(&url).unwrap();
        assert_eq!(bytes, b"\xFF\xD8\xFFimage-bytes");
    }

    #[test]
    fn test_non_success_status_is_acquisition_error() {
        let url = serve_once("404 Not Found", b"missing");
        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, FaceDetectionError::Acquisition { .. }));
        assert!(err.to_string().contains(&url));
    }

    #[test]
    fn test_refused_connection_names_url() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/face.jpg", listener.local_addr().unwrap());
        drop(listener);

        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, FaceDetectionError::Acquisition { .. }));
        assert!(err.to_string().contains(&url));
    }

    #[test]
    fn test_malformed_url_is_acquisition_error() {
        let err = fetcher().fetch("not a url").unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
