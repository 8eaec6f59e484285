#[cfg(debug_assertions)]
use opentelemetry::KeyValue;

use crate::telemetry::attributes::keys;

pub mod scope {
    pub const NAME: &str = "cosmo.router";
    pub const VERSION: &str = "0.0.1";
}

pub mod names {
    pub const REQUESTS: &str = "router.http.requests";
    pub const REQUEST_DURATION: &str = "router.http.request.duration_milliseconds";
    pub const REQUEST_CONTENT_LENGTH: &str = "router.http.request.content_length";
    pub const RESPONSE_CONTENT_LENGTH: &str = "router.http.response.content_length";
    pub const REQUESTS_IN_FLIGHT: &str = "router.http.requests.in_flight.count";
}

pub mod descriptions {
    pub const REQUESTS: &str = "Total number of requests";
    pub const REQUEST_DURATION: &str = "Server latency in milliseconds";
    pub const REQUEST_CONTENT_LENGTH: &str = "Total number of request bytes";
    pub const RESPONSE_CONTENT_LENGTH: &str = "Total number of response bytes";
    pub const REQUESTS_IN_FLIGHT: &str = "Number of requests in flight";
}

pub mod units {
    pub const NONE: &str = "";
    pub const MILLISECONDS: &str = "ms";
    pub const BYTES: &str = "bytes";
}

const ROUTER_LABELS: &[&str] = &[
    keys::WG_FEDERATED_GRAPH_ID,
    keys::WG_ROUTER_CLUSTER_NAME,
    keys::WG_ROUTER_CONFIG_VERSION,
    keys::WG_ROUTER_VERSION,
];

const IN_FLIGHT_LABELS: &[&str] = &[
    keys::WG_FEDERATED_GRAPH_ID,
    keys::WG_ROUTER_CLUSTER_NAME,
    keys::WG_ROUTER_CONFIG_VERSION,
    keys::WG_ROUTER_VERSION,
    keys::WG_CLIENT_NAME,
    keys::WG_CLIENT_VERSION,
    keys::WG_OPERATION_HASH,
    keys::WG_OPERATION_NAME,
    keys::WG_OPERATION_PROTOCOL,
    keys::WG_OPERATION_TYPE,
];

const REQUEST_LABELS: &[&str] = &[
    keys::WG_FEDERATED_GRAPH_ID,
    keys::WG_ROUTER_CLUSTER_NAME,
    keys::WG_ROUTER_CONFIG_VERSION,
    keys::WG_ROUTER_VERSION,
    keys::WG_CLIENT_NAME,
    keys::WG_CLIENT_VERSION,
    keys::WG_OPERATION_HASH,
    keys::WG_OPERATION_NAME,
    keys::WG_OPERATION_PROTOCOL,
    keys::WG_OPERATION_TYPE,
    keys::WG_SUBGRAPH_ID,
    keys::WG_SUBGRAPH_NAME,
    keys::HTTP_STATUS_CODE,
];

pub(crate) const METRIC_SPECS: &[(&str, &[&str])] = &[
    (names::REQUESTS, REQUEST_LABELS),
    (names::REQUEST_DURATION, REQUEST_LABELS),
    (names::REQUEST_CONTENT_LENGTH, REQUEST_LABELS),
    (names::RESPONSE_CONTENT_LENGTH, REQUEST_LABELS),
    (names::REQUESTS_IN_FLIGHT, IN_FLIGHT_LABELS),
];

pub fn labels_for(metric_name: &str) -> Option<&'static [&'static str]> {
    METRIC_SPECS
        .iter()
        .find(|(name, _)| *name == metric_name)
        .map(|(_, labels)| *labels)
}

pub fn router_labels() -> &'static [&'static str] {
    ROUTER_LABELS
}

#[cfg(debug_assertions)]
pub(crate) fn debug_assert_attrs(metric_name: &'static str, attrs: &[KeyValue]) {
    let labels = labels_for(metric_name)
        .unwrap_or_else(|| panic!("missing metric catalog entry for {metric_name}"));

    for attr in attrs {
        debug_assert!(
            labels.contains(&attr.key.as_str()),
            "attribute '{}' is not declared for metric '{}'",
            attr.key.as_str(),
            metric_name
        );
    }
}
