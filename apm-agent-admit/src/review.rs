//! Conversion between wire bytes and kube's AdmissionReview types.

use k8s_openapi::api::core::v1::Pod;
use kube::core::{
    admission::{AdmissionRequest, AdmissionReview},
    DynamicObject,
};

use crate::error::{AdmitError, Result};

pub type Review = AdmissionReview<DynamicObject>;

pub fn decode(body: &[u8]) -> Result<Review> {
    serde_json::from_slice(body).map_err(|err| AdmitError::MalformedEnvelope(err.to_string()))
}

pub fn encode(review: &Review) -> Result<Vec<u8>> {
    serde_json::to_vec(review).map_err(|err| AdmitError::Encode(err.to_string()))
}

/// Extract the Pod carried by the request.
pub fn pod_from_request(req: &AdmissionRequest<DynamicObject>) -> Result<Pod> {
    req.object
        .clone()
        .ok_or_else(|| AdmitError::MalformedPod("no object in request".to_string()))?
        .try_parse()
        .map_err(|err| AdmitError::MalformedPod(err.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::{json, Value};

    use super::*;

    pub(crate) fn review_json(uid: &str, pod: Value) -> Value {
        json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": uid,
                "kind": {"group": "", "version": "v1", "kind": "Pod"},
                "resource": {"group": "", "version": "v1", "resource": "pods"},
                "namespace": "default",
                "operation": "CREATE",
                "userInfo": {},
                "object": pod
            }
        })
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, AdmitError::MalformedEnvelope(_)));

        let err = decode(br#"{"apiVersion": 3}"#).unwrap_err();
        assert!(matches!(err, AdmitError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_round_trip_without_request() {
        let body = json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview"
        });

        let review = decode(body.to_string().as_bytes()).unwrap();
        assert!(review.request.is_none());

        let encoded: Value = serde_json::from_slice(&encode(&review).unwrap()).unwrap();
        assert_eq!(encoded["apiVersion"], "admission.k8s.io/v1");
        assert_eq!(encoded["kind"], "AdmissionReview");
        assert!(encoded.get("request").is_none());
        assert!(encoded.get("response").is_none());
    }

    #[test]
    fn test_pod_from_request() {
        let body = review_json(
            "705ab4f5-6393-11e8-b7cc-42010a800002",
            json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {
                    "name": "petclinic",
                    "annotations": {"elastic-apm-agent": "java"}
                },
                "spec": {
                    "containers": [{"name": "app", "image": "petclinic:latest"}]
                }
            }),
        );

        let review = decode(body.to_string().as_bytes()).unwrap();
        let req: AdmissionRequest<DynamicObject> = review.try_into().unwrap();
        let pod = pod_from_request(&req).unwrap();

        assert_eq!(pod.metadata.name.as_deref(), Some("petclinic"));
        assert_eq!(pod.spec.unwrap().containers[0].name, "app");
    }

    #[test]
    fn test_pod_from_request_without_object() {
        let mut body = review_json("uid", Value::Null);
        body["request"].as_object_mut().unwrap().remove("object");

        let review = decode(body.to_string().as_bytes()).unwrap();
        let req: AdmissionRequest<DynamicObject> = review.try_into().unwrap();

        let err = pod_from_request(&req).unwrap_err();
        assert!(matches!(err, AdmitError::MalformedPod(_)));
    }
}
