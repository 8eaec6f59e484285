use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity of the deployment. Missing values are reported as empty strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// The id of the federated graph served by the router.
    ///
    /// Can also be set via the `FEDERATED_GRAPH_ID` environment variable.
    #[serde(default)]
    pub id: String,

    /// The name of the cluster the router runs in.
    ///
    /// Can also be set via the `CLUSTER_NAME` environment variable.
    #[serde(default)]
    pub cluster_name: String,

    /// The version of the router execution config currently loaded.
    #[serde(default)]
    pub config_version: String,
}
