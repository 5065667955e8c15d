//! HTTP API handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::fanout::FanoutStats;
use crate::network::OscStatsSnapshot;
use crate::protocol::TransportState;
use crate::timecode::Timecode;
use crate::ui::server::AppState;

/// API response wrapper
#[derive(serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Relay status
#[derive(serde::Serialize)]
pub struct RelayStatus {
    pub state: TransportState,
    pub time: Timecode,
    pub viewers: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub osc: OscStatsSnapshot,
    pub fanout: FanoutStats,
}

/// Get current show state and counters
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<RelayStatus>> {
    let relay = &state.relay;
    let show = relay.snapshot();

    let status = RelayStatus {
        state: show.transport,
        time: show.timecode,
        viewers: relay.viewers().len(),
        started_at: relay.started_at(),
        uptime_seconds: relay.uptime_seconds(),
        osc: state.osc_stats.snapshot(),
        fanout: relay.viewers().stats(),
    };

    Json(ApiResponse::ok(status))
}
