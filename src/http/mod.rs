use std::collections::BTreeMap;

use crate::{
    ErrorKind, ExplatError, args::RequestArgs, error, http::client::ExplatHttpClient, this_errors,
};
use derive_builder::Builder;
use serde::de::DeserializeOwned;

pub mod client;
mod macros;
mod url;

pub(crate) use macros::params;
pub use url::construct_url;

pub(crate) static ACCEPT_JSON: &'static str = "application/json, */*;q=0.1";

/// Whether cookies travel with the request, mirroring the fetch `credentials` mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    SameOrigin,
    Include,
    Omit,
}

/// Options handed to the transport alongside the url.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub credentials: Credentials,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

#[derive(Builder)]
pub(crate) struct Request<C: ExplatHttpClient> {
    client: C,

    #[builder(setter(into), default = RequestArgs::new())]
    params: RequestArgs,

    /// Appended after `params`, for keys a filter must not reorder or drop.
    #[builder(setter(into), default = Vec::new())]
    trailing_params: Vec<(String, String)>,

    #[builder(default = None, setter(into, strip_option))]
    host: Option<String>,

    #[builder(default = None, setter(into, strip_option))]
    path: Option<String>,

    #[builder(default = None, setter(into, strip_option))]
    full_url: Option<String>,

    /// `None` sends the request without any explicit options.
    #[builder(default = None, setter(strip_option))]
    options: Option<RequestOptions>,

    #[builder(setter(into, strip_option), default = None)]
    cookie: Option<String>,
}

impl<C: ExplatHttpClient> Request<C> {
    pub(crate) fn build_url(&self) -> Result<String, ExplatError> {
        let base = if let Some(url) = self.full_url.as_deref() {
            url.to_string()
        } else if let Some(path) = self.path.as_deref() {
            match self.host.as_deref() {
                Some(host) => format!("{}{}", host.trim_end_matches('/'), path),
                None => path.to_string(),
            }
        } else {
            return Err(error!(
                ErrorKind::Configuration,
                "either path or full_url needs to be set on Request"
            ));
        };

        let mut params = self.params.as_pairs().to_vec();
        for (key, value) in &self.trailing_params {
            params.retain(|(k, _)| k != key);
            params.push((key.clone(), value.clone()));
        }

        let url = this_errors!(
            ErrorKind::Configuration,
            "failed to construct url",
            url::construct_url(base.as_str(), &params)
        );

        Ok(url)
    }

    fn build_options(&self) -> Option<RequestOptions> {
        let mut options = self.options.clone()?;

        if options.credentials == Credentials::Include {
            if let Some(cookie) = self.cookie.as_deref() {
                options.headers.insert("Cookie".into(), cookie.to_string());
            }
        }

        Some(options)
    }

    pub async fn get_as_bytes(self) -> Result<Vec<u8>, ExplatError> {
        let url = self.build_url()?;
        let options = self.build_options();

        tracing::debug!(url = %url, with_options = options.is_some(), "dispatching GET");

        let resp = self.client.get(url.as_str(), options).await?;

        Ok(resp)
    }

    pub async fn get<T: DeserializeOwned>(self) -> Result<T, ExplatError> {
        let resp = self.get_as_bytes().await?;

        let resp_as_json = this_errors!(
            ErrorKind::InvalidResponse,
            "failed to parse response as json",
            serde_json::from_slice::<T>(&resp)
        );

        Ok(resp_as_json)
    }
}
