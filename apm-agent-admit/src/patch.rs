//! Builds the JSON patch that injects the agent init container into a Pod spec.
//!
//! The agent image runs before the application and leaves its files in a shared
//! `emptyDir`, which every application container mounts.
//!
//! Array positions are taken from the spec the API server sent, so the patch
//! only applies cleanly to that exact spec.

use json_patch::{AddOperation, Patch, PatchOperation};
use jsonptr::Pointer;
use k8s_openapi::api::core::v1::PodSpec;
use serde_json::{json, Value};

use crate::config::AgentConfig;

/// Name shared by the injected init container and its volume.
pub const AGENT_CONTAINER_NAME: &str = "elastic-apm-agent";

/// Where the shared agent volume is mounted in every container of the Pod.
pub const AGENT_MOUNT_PATH: &str = "/elastic/apm/agent";

fn add(path: Pointer, value: Value) -> PatchOperation {
    PatchOperation::Add(AddOperation { path, value })
}

fn agent_volume_mount() -> Value {
    json!({
        "name": AGENT_CONTAINER_NAME,
        "mountPath": AGENT_MOUNT_PATH,
    })
}

/// Add PatchOperations that add the shared emptyDir volume to the pod spec
fn patch_agent_volume(patches: &mut Vec<PatchOperation>, spec: &PodSpec) {
    let volume = json!({
        "name": AGENT_CONTAINER_NAME,
        "emptyDir": {}
    });

    match &spec.volumes {
        Some(volumes) => {
            let index = volumes.len().to_string();
            patches.push(add(
                Pointer::new(["spec", "volumes", index.as_str()]),
                volume,
            ));
        }
        None => patches.push(add(Pointer::new(["spec", "volumes"]), json!([volume]))),
    }
}

/// Add PatchOperations that mount the agent volume into each existing container
fn patch_volume_mounts(patches: &mut Vec<PatchOperation>, spec: &PodSpec) {
    for (i, container) in spec.containers.iter().enumerate() {
        let container_index = i.to_string();

        match &container.volume_mounts {
            Some(mounts) => {
                let index = mounts.len().to_string();
                patches.push(add(
                    Pointer::new([
                        "spec",
                        "containers",
                        container_index.as_str(),
                        "volumeMounts",
                        index.as_str(),
                    ]),
                    agent_volume_mount(),
                ));
            }
            None => patches.push(add(
                Pointer::new([
                    "spec",
                    "containers",
                    container_index.as_str(),
                    "volumeMounts",
                ]),
                json!([agent_volume_mount()]),
            )),
        }
    }
}

/// Add the PatchOperation that appends the agent init container
fn patch_agent_init_container(
    patches: &mut Vec<PatchOperation>,
    agent: &AgentConfig,
    spec: &PodSpec,
) {
    let env = agent
        .environment
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect::<Vec<_>>();

    let init_container = json!({
        "name": AGENT_CONTAINER_NAME,
        "image": agent.image,
        "env": env,
        "volumeMounts": [agent_volume_mount()],
    });

    match &spec.init_containers {
        Some(init_containers) => {
            let index = init_containers.len().to_string();
            patches.push(add(
                Pointer::new(["spec", "initContainers", index.as_str()]),
                init_container,
            ));
        }
        None => patches.push(add(
            Pointer::new(["spec", "initContainers"]),
            json!([init_container]),
        )),
    }
}

/// Build the patch that injects `agent` into `spec`. Calling it twice with the same input yields the same patch.
pub fn build_patch(agent: &AgentConfig, spec: &PodSpec) -> Patch {
    let mut patches = Vec::new();

    patch_agent_volume(&mut patches, spec);
    patch_volume_mounts(&mut patches, spec);
    patch_agent_init_container(&mut patches, agent, spec);

    Patch(patches)
}
