pub mod anon;
pub mod args;
pub(crate) mod assignment;
pub(crate) mod errors;
pub(crate) mod http;
pub mod response;

pub(crate) use errors::{error, this_errors};
pub use errors::{ErrorKind, ExplatError};

pub use args::{FilterPipeline, REQUEST_ARGS_HOOK, RequestArgs, RequestArgsFilter};
pub use assignment::{
    ASSIGNMENT_URL, AUTH_ASSIGNMENT_PATH, AssignmentRequest, ExplatClient, ExplatClientOpts,
    ExplatClientOptsBuilder, ExplatClientOptsBuilderError, fetch_experiment_assignment,
    fetch_experiment_assignment_with_auth, validate_assignment_request,
};
pub use http::{Credentials, RequestOptions, client::ExplatHttpClient, construct_url};
pub use response::ExperimentAssignment;
