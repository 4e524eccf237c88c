use std::{collections::BTreeMap, sync::Arc};

use derive_builder::Builder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    ErrorKind, ExplatError,
    args::{FilterPipeline, RequestArgs},
    error,
    http::{self, Credentials, RequestOptions, client::ExplatHttpClient},
    this_errors,
};

pub static ASSIGNMENT_URL: &'static str =
    "https://public-api.wordpress.com/wpcom/v2/experiments/0.1.0/assignments/woocommerce";
pub static AUTH_ASSIGNMENT_PATH: &'static str = "/wc-admin/experiments/assignment";

pub const DEFAULT_TRACKING_ENABLED: bool = true;
pub static DEFAULT_LOCALE: &'static str = "user";

/// Parameters of a single assignment lookup.
///
/// Both fields are optional so that absent and empty values can be told
/// apart by callers, but both are rejected the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub experiment_name: Option<String>,
    pub anon_id: Option<String>,
}

impl AssignmentRequest {
    pub fn new(experiment_name: impl Into<String>, anon_id: impl Into<String>) -> Self {
        Self {
            experiment_name: Some(experiment_name.into()),
            anon_id: Some(anon_id.into()),
        }
    }

    /// A request without an anonymous id. Only accepted when tracking is disabled.
    pub fn anonymous(experiment_name: impl Into<String>) -> Self {
        Self {
            experiment_name: Some(experiment_name.into()),
            anon_id: None,
        }
    }
}

#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct ExplatClientOpts {
    /// When set, every request must carry a non-empty anonymous id.
    #[builder(default = DEFAULT_TRACKING_ENABLED)]
    pub(crate) tracking_enabled: bool,

    /// Override the public assignments endpoint.
    #[builder(setter(into), default = ASSIGNMENT_URL.to_string())]
    pub(crate) assignment_url: String,

    /// Origin (or REST root) the authenticated path is resolved against.
    ///
    /// If unset, the authenticated url stays relative, e.g.
    /// `/wc-admin/experiments/assignment?...`
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) admin_root: Option<String>,

    /// Sent as the `Cookie` header on authenticated requests.
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) admin_cookie: Option<String>,

    #[builder(setter(into), default = DEFAULT_LOCALE.to_string())]
    pub(crate) locale: String,
}

impl Default for ExplatClientOpts {
    fn default() -> Self {
        Self {
            tracking_enabled: DEFAULT_TRACKING_ENABLED,
            assignment_url: ASSIGNMENT_URL.to_string(),
            admin_root: None,
            admin_cookie: None,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ExplatClientOpts {
    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    pub fn connect_with_client<C: ExplatHttpClient>(self) -> ExplatClient<C> {
        self.with_client(C::new())
    }

    pub fn with_client<C: ExplatHttpClient>(self, client: C) -> ExplatClient<C> {
        ExplatClient {
            client,
            opts: Arc::new(self),
            filters: FilterPipeline::default(),
        }
    }

    #[cfg(feature = "reqwest")]
    pub fn connect(self) -> ExplatClient<reqwest::Client> {
        self.connect_with_client::<reqwest::Client>()
    }
}

/// Rejects requests with an empty experiment name, or with an empty anonymous
/// id while tracking is enabled.
pub fn validate_assignment_request(
    request: &AssignmentRequest,
    tracking_enabled: bool,
) -> Result<(), ExplatError> {
    if is_blank(request.experiment_name.as_deref()) {
        return Err(error!(ErrorKind::InvalidArgument, "experiment_name is required"));
    }

    if tracking_enabled && is_blank(request.anon_id.as_deref()) {
        return Err(error!(
            ErrorKind::InvalidArgument,
            "anon_id is required while tracking is enabled"
        ));
    }

    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

fn request_args(
    request: &AssignmentRequest,
    opts: &ExplatClientOpts,
    filters: &FilterPipeline,
) -> Result<RequestArgs, ExplatError> {
    if let Err(err) = validate_assignment_request(request, opts.tracking_enabled) {
        tracing::warn!(error = %err, "rejected experiment assignment request");
        return Err(err);
    }

    let args = http::params!(
        ("experiment_name", request.experiment_name.clone()),
        (
            "anon_id",
            request.anon_id.clone().filter(|id| !id.is_empty())
        ),
    );

    Ok(filters.apply(args))
}

fn unauthenticated_request<C: ExplatHttpClient>(
    client: &C,
    opts: &ExplatClientOpts,
    filters: &FilterPipeline,
    request: &AssignmentRequest,
) -> Result<http::Request<C>, ExplatError> {
    let args = request_args(request, opts, filters)?;

    let request = this_errors!(
        ErrorKind::Configuration,
        "failed to build assignment request",
        http::RequestBuilder::default()
            .client(client.clone())
            .full_url(opts.assignment_url.as_str())
            .params(args)
            .build()
    );

    Ok(request)
}

fn authenticated_request<C: ExplatHttpClient>(
    client: &C,
    opts: &ExplatClientOpts,
    filters: &FilterPipeline,
    request: &AssignmentRequest,
) -> Result<http::Request<C>, ExplatError> {
    let args = request_args(request, opts, filters)?;

    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_string(), http::ACCEPT_JSON.to_string());

    let options = RequestOptions {
        credentials: Credentials::Include,
        headers,
        body: None,
    };

    let mut builder = http::RequestBuilder::default();
    builder
        .client(client.clone())
        .path(AUTH_ASSIGNMENT_PATH)
        .params(args)
        .trailing_params(vec![("_locale".to_string(), opts.locale.clone())])
        .options(options);

    if let Some(root) = opts.admin_root.as_deref() {
        builder.host(root);
    }

    if let Some(cookie) = opts.admin_cookie.as_deref() {
        builder.cookie(cookie);
    }

    let request = this_errors!(
        ErrorKind::Configuration,
        "failed to build authenticated assignment request",
        builder.build()
    );

    Ok(request)
}

/// Fetches an assignment from the public ExPlat endpoint.
pub async fn fetch_experiment_assignment<C: ExplatHttpClient>(
    client: &C,
    opts: &ExplatClientOpts,
    filters: &FilterPipeline,
    request: &AssignmentRequest,
) -> Result<Value, ExplatError> {
    unauthenticated_request(client, opts, filters, request)?
        .get::<Value>()
        .await
}

/// Fetches an assignment through the store's authenticated admin API.
pub async fn fetch_experiment_assignment_with_auth<C: ExplatHttpClient>(
    client: &C,
    opts: &ExplatClientOpts,
    filters: &FilterPipeline,
    request: &AssignmentRequest,
) -> Result<Value, ExplatError> {
    authenticated_request(client, opts, filters, request)?
        .get::<Value>()
        .await
}

pub struct ExplatClient<C: ExplatHttpClient> {
    client: C,
    opts: Arc<ExplatClientOpts>,
    filters: FilterPipeline,
}

impl<C: ExplatHttpClient> ExplatClient<C> {
    pub fn opts(&self) -> &ExplatClientOpts {
        &self.opts
    }

    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterPipeline {
        &mut self.filters
    }

    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    /// The url the unauthenticated fetch would request, without sending anything.
    pub fn build_assignment_url(&self, request: &AssignmentRequest) -> Result<String, ExplatError> {
        unauthenticated_request(&self.client, &self.opts, &self.filters, request)?.build_url()
    }

    pub fn build_assignment_url_with_auth(
        &self,
        request: &AssignmentRequest,
    ) -> Result<String, ExplatError> {
        authenticated_request(&self.client, &self.opts, &self.filters, request)?.build_url()
    }

    pub async fn fetch_experiment_assignment(
        &self,
        request: &AssignmentRequest,
    ) -> Result<Value, ExplatError> {
        self.fetch_experiment_assignment_as::<Value>(request).await
    }

    pub async fn fetch_experiment_assignment_as<T: DeserializeOwned>(
        &self,
        request: &AssignmentRequest,
    ) -> Result<T, ExplatError> {
        unauthenticated_request(&self.client, &self.opts, &self.filters, request)?
            .get::<T>()
            .await
    }

    pub async fn fetch_experiment_assignment_with_auth(
        &self,
        request: &AssignmentRequest,
    ) -> Result<Value, ExplatError> {
        self.fetch_experiment_assignment_with_auth_as::<Value>(request)
            .await
    }

    pub async fn fetch_experiment_assignment_with_auth_as<T: DeserializeOwned>(
        &self,
        request: &AssignmentRequest,
    ) -> Result<T, ExplatError> {
        authenticated_request(&self.client, &self.opts, &self.filters, request)?
            .get::<T>()
            .await
    }
}

#[cfg(test)]
#[path = "./assignment_test.rs"]
mod assignment_test;
