use crate::{ExplatError, http::RequestOptions};
use core::future::Future;

#[cfg(feature = "reqwest")]
use reqwest;

/// The transport used to issue assignment requests.
///
/// Implementations return the raw response body; status codes are not
/// interpreted. Any failure to send or read must surface as an error.
pub trait ExplatHttpClient: Clone + Send + 'static {
    fn new() -> Self;

    fn get(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> impl Future<Output = Result<Vec<u8>, ExplatError>> + Send;
}

#[cfg(feature = "reqwest")]
impl ExplatHttpClient for reqwest::Client {
    fn new() -> Self {
        match reqwest::Client::builder().gzip(true).referer(false).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build http client, using reqwest defaults");
                reqwest::Client::default()
            }
        }
    }

    fn get(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> impl Future<Output = Result<Vec<u8>, ExplatError>> {
        use crate::{ErrorKind, error, this_errors};

        let url = url.to_string();

        async move {
            use reqwest::header::HeaderMap;

            let url = this_errors!(
                ErrorKind::TransportFailure,
                "failed to parse url",
                reqwest::Url::parse(url.as_str())
            );

            let options = options.unwrap_or_default();

            let headers = this_errors!(
                ErrorKind::Configuration,
                "failed to convert headers",
                options
                    .headers
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            reqwest::header::HeaderName::from_bytes(k.as_bytes())
                                .map_err(|e| error!(ErrorKind::Configuration, "bad header name", e))?,
                            reqwest::header::HeaderValue::from_str(v.as_str())
                                .map_err(|e| error!(ErrorKind::Configuration, "bad header value", e))?,
                        ))
                    })
                    .collect::<Result<
                        Vec<(reqwest::header::HeaderName, reqwest::header::HeaderValue)>,
                        ExplatError,
                    >>()
            );

            let mut request = self.get(url).headers(HeaderMap::from_iter(headers));

            if let Some(body) = options.body {
                request = request.body(body);
            }

            let resp = this_errors!(
                ErrorKind::TransportFailure,
                "failed to send get request",
                request.send().await
            );

            tracing::debug!(status = %resp.status(), "received assignment response");

            let bytes = this_errors!(
                ErrorKind::TransportFailure,
                "failed to get response bytes",
                resp.bytes().await
            );

            Ok(bytes.to_vec())
        }
    }
}

#[cfg(all(test, feature = "reqwest"))]
#[path = "./client_test.rs"]
mod client_test;
