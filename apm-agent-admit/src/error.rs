use thiserror::Error;

/// Failures that abort a single admission request.
///
/// None of these are retried. The server turns every variant into a failed
/// HTTP response carrying the error text, so the API server sees a webhook
/// failure rather than a denial.
#[derive(Error, Debug)]
pub enum AdmitError {
    /// The request body could not be read off the wire
    #[error("unable to read request body: {0}")]
    TransportRead(String),

    /// The body is not a JSON AdmissionReview
    #[error("malformed admission review: {0}")]
    MalformedEnvelope(String),

    /// The review carries no object, or the object is not a usable Pod
    #[error("unable to unmarshal pod json object: {0}")]
    MalformedPod(String),

    /// The response or its patch could not be serialized
    #[error("unable to encode admission response: {0}")]
    Encode(String),
}

pub type Result<T, E = AdmitError> = std::result::Result<T, E>;
