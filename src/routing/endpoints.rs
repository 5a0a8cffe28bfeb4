//! RPC endpoint bindings.
//!
//! Each endpoint pairs a path with the payload type its requests carry. The
//! router does not own the instance schema, so payloads are opaque JSON
//! objects: any object with at least one member counts as present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routing::envelope::Payload;

/// An RPC exposed by every instance.
pub trait Endpoint: Send + Sync + 'static {
    /// Short name used in logs and metric labels.
    const NAME: &'static str;
    /// Request path, identical on the router and the instance.
    const PATH: &'static str;
    /// Inner payload type.
    type Payload: Payload;
}

/// Payload of `POST /getnodebootstrapdata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeBootstrapDataRequest(pub Map<String, Value>);

/// Payload of the signature image config endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigImageConfigRequest(pub Map<String, Value>);

pub struct NodeBootstrapData;

impl Endpoint for NodeBootstrapData {
    const NAME: &'static str = "node_bootstrap_data";
    const PATH: &'static str = "/getnodebootstrapdata";
    type Payload = NodeBootstrapDataRequest;
}

pub struct LatestSigImageConfig;

impl Endpoint for LatestSigImageConfig {
    const NAME: &'static str = "latest_sig_image_config";
    const PATH: &'static str = "/getlatestsigimageconfig";
    type Payload = SigImageConfigRequest;
}

pub struct DistroSigImageConfig;

impl Endpoint for DistroSigImageConfig {
    const NAME: &'static str = "distro_sig_image_config";
    const PATH: &'static str = "/getdistrosigimageconfig";
    type Payload = SigImageConfigRequest;
}
