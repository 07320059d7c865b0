// ABOUTME: Client-side view of a stats response with friendlier types.
// ABOUTME: Decodes the timestamp into chrono and the data Struct into JSON.

use analytics_grpc::value::struct_to_json;
use analytics_proto::prost_types::Timestamp;
use analytics_proto::{BuildFlavour, ReceiveStatsResponse};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// A decoded stats snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub product: String,
    pub version: String,
    pub vendor: String,
    pub commit_sha: String,
    pub build_date: String,
    #[serde(serialize_with = "serialize_flavour")]
    pub build_flavour: BuildFlavour,
    /// When the server took the snapshot. `None` if absent or out of range.
    pub snapshot_date: Option<DateTime<Utc>>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl StatsSnapshot {
    pub fn from_response(response: &ReceiveStatsResponse) -> Self {
        Self {
            product: response.product.clone(),
            version: response.version.clone(),
            vendor: response.vendor.clone(),
            commit_sha: response.commit_sha.clone(),
            build_date: response.build_date.clone(),
            // Unknown flavours fall back to NONE
            build_flavour: response.build_flavour(),
            snapshot_date: response.snapshot_date.as_ref().and_then(timestamp_to_utc),
            data: response
                .data
                .as_ref()
                .map(struct_to_json)
                .unwrap_or_default(),
        }
    }
}

impl From<ReceiveStatsResponse> for StatsSnapshot {
    fn from(response: ReceiveStatsResponse) -> Self {
        Self::from_response(&response)
    }
}

fn timestamp_to_utc(ts: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}

fn serialize_flavour<S: Serializer>(
    flavour: &BuildFlavour,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(flavour.as_str_name())
}
