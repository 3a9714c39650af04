//! Turns one AdmissionReview into its answer.

use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse},
    DynamicObject, Status,
};
use tracing::{debug, info, trace};

use crate::{
    config::ConfigTable,
    error::{AdmitError, Result},
    patch::build_patch,
    resolver::resolve,
    review::{self, Review},
};

/// Mutate the Pod carried by the review.
///
/// The answer is always `allowed`: a Pod that did not ask for an agent, or asked for one we
/// don't know, passes through unmodified with the reason in the status message. A review
/// without a request is handed back as is.
pub fn mutate(review: Review, table: &ConfigTable) -> Result<Review> {
    if review.request.is_none() {
        debug!("Admission review carries no request, nothing to do");
        return Ok(review);
    }

    // The conversion carries the review's apiVersion and kind over to the response.
    let req = TryInto::<AdmissionRequest<DynamicObject>>::try_into(review)
        .map_err(|err| AdmitError::MalformedEnvelope(err.to_string()))?;

    Ok(respond(&req, table)?.into_review())
}

fn respond(req: &AdmissionRequest<DynamicObject>, table: &ConfigTable) -> Result<AdmissionResponse> {
    let pod = review::pod_from_request(req)?;

    debug!(
        "Pod: {:?} namespace={:?} uid={}",
        pod.metadata.name, pod.metadata.namespace, req.uid
    );

    let mut response = AdmissionResponse::from(req);

    let outcome = resolve(&pod, table);
    let Some(agent) = outcome.agent() else {
        info!(
            "Skipping pod {:?} in namespace={:?}: {}",
            pod.metadata.name, pod.metadata.namespace, outcome
        );
        response.result.message = outcome.to_string();
        return Ok(response);
    };

    let spec = pod
        .spec
        .as_ref()
        .ok_or_else(|| AdmitError::MalformedPod("pod spec is missing".to_string()))?;

    let patch = build_patch(agent, spec);
    trace!("Patch for pod {:?}: {:?}", pod.metadata.name, patch);

    let mut response = response
        .with_patch(patch)
        .map_err(|err| AdmitError::Encode(err.to_string()))?;
    response.result = Status::success();

    info!(
        "Mutating pod {:?} in namespace={:?}: {}",
        pod.metadata.name, pod.metadata.namespace, outcome
    );

    Ok(response)
}

/// Decode the request body, mutate it and encode the answer.
pub fn admit(body: &[u8], table: &ConfigTable) -> Result<Vec<u8>> {
    let review = review::decode(body)?;
    trace!("Admission Handler request {:?}", review);

    let review = mutate(review, table)?;
    trace!("Admission Handler response {:?}", review.response);

    review::encode(&review)
}
