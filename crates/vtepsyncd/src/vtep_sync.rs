//! One reconciliation cycle against a switch.
//!
//! Each cycle fetches both snapshots, parses them, plans the flood-list
//! changes and dispatches them one at a time. Nothing is carried over between
//! cycles: the device output is the only source of truth.

use serde_json::Value;

use crate::bgp_routes::parse_advertised_vteps;
use crate::commands::{
    build_flood_action, build_show_community_routes, build_show_running_config, SHOW_RESULT_INDEX,
};
use crate::error::{GatewayError, Result, VtepsyncError};
use crate::gateway::DeviceGateway;
use crate::reconcile;
use crate::running_config::{interface_config_lines, parse_configured_vteps, FloodLinePolicy};
use crate::types::{CommunityTag, FloodAction, FloodListChange, VtepSet, DEFAULT_VXLAN_INTERFACE};

/// Audit log target for applied and failed flood-list changes.
pub const AUDIT_TARGET: &str = "vtepsyncd::audit";

/// What to synchronize on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Community marking VTEP loopback routes.
    pub community: CommunityTag,
    /// VXLAN interface holding the flood list.
    pub interface: String,
    pub flood_line_policy: FloodLinePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            community: CommunityTag::default(),
            interface: DEFAULT_VXLAN_INTERFACE.to_string(),
            flood_line_policy: FloodLinePolicy::default(),
        }
    }
}

/// A dispatched action the device rejected.
#[derive(Debug, Clone)]
pub struct FailedChange {
    pub change: FloodListChange,
    pub error: GatewayError,
}

/// Outcome of a completed cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// VTEPs advertised in BGP.
    pub desired: VtepSet,
    /// VTEPs configured on the interface when the cycle started.
    pub actual: VtepSet,
    /// Actions in dispatch order.
    pub planned: Vec<FloodAction>,
    pub applied: Vec<FloodListChange>,
    pub failed: Vec<FailedChange>,
}

impl CycleReport {
    /// True when every planned action was applied.
    pub fn is_converged(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Flood-list synchronizer bound to one device.
pub struct VtepSync<G> {
    gateway: G,
    settings: SyncSettings,
}

impl<G: DeviceGateway> VtepSync<G> {
    pub fn new(gateway: G, settings: SyncSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetches the VTEPs advertised under the configured community.
    pub async fn fetch_desired(&self) -> Result<VtepSet> {
        tracing::info!(community = %self.settings.community, "Parsing BGP routes for community");

        let request = build_show_community_routes(&self.settings.community);
        let results = self.gateway.run_commands(&request).await?;
        let route_text = show_result(&results, "bgp routes")?
            .get("output")
            .and_then(Value::as_str)
            .ok_or_else(|| VtepsyncError::parse("bgp routes", "result has no 'output' text"))?;

        let desired = parse_advertised_vteps(route_text);
        tracing::info!(vteps = %desired, "Current advertised VTEPs");
        Ok(desired)
    }

    /// Fetches the VTEPs currently in the interface flood list.
    pub async fn fetch_actual(&self) -> Result<VtepSet> {
        tracing::info!(interface = %self.settings.interface, "Looking up configured VTEP flood list");

        let results = self.gateway.run_commands(&build_show_running_config()).await?;
        let running_config = show_result(&results, "running-config")?;
        let lines = interface_config_lines(running_config, &self.settings.interface)?;

        let actual = parse_configured_vteps(&lines, self.settings.flood_line_policy);
        tracing::info!(vteps = %actual, "Currently configured VTEPs to flood to");
        Ok(actual)
    }

    /// Runs one full cycle.
    ///
    /// Snapshot and parse failures abort the cycle before any change is made.
    /// A rejected action is recorded in the report and the remaining actions
    /// are still dispatched.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let desired = self.fetch_desired().await?;
        let actual = self.fetch_actual().await?;

        let planned = reconcile::plan(&desired, &actual);
        if planned.is_empty() {
            tracing::info!(count = desired.len(), "Flood list already in sync");
        }

        let mut report = CycleReport {
            desired,
            actual,
            planned: planned.clone(),
            ..Default::default()
        };

        for action in &planned {
            match self.dispatch(action).await {
                Ok(change) => report.applied.push(change),
                Err(failed) => report.failed.push(failed),
            }
        }

        if report.has_failures() {
            tracing::warn!(
                applied = report.applied.len(),
                failed = report.failed.len(),
                "Flood list partially converged"
            );
        }

        Ok(report)
    }

    async fn dispatch(
        &self,
        action: &FloodAction,
    ) -> std::result::Result<FloodListChange, FailedChange> {
        let change = action.to_change();
        let request = build_flood_action(&self.settings.interface, action);

        match self.gateway.run_commands(&request).await {
            Ok(_) => {
                tracing::info!(
                    target: AUDIT_TARGET,
                    action = %change.action,
                    address = %change.address,
                    interface = %self.settings.interface,
                    outcome = "applied",
                    "Flood list updated"
                );
                Ok(change)
            }
            Err(error) => {
                tracing::error!(
                    target: AUDIT_TARGET,
                    action = %change.action,
                    address = %change.address,
                    interface = %self.settings.interface,
                    outcome = "failed",
                    error = %error,
                    "Flood list update failed"
                );
                Err(FailedChange { change, error })
            }
        }
    }
}

fn show_result<'a>(results: &'a [Value], source_name: &str) -> Result<&'a Value> {
    results.get(SHOW_RESULT_INDEX).ok_or_else(|| {
        VtepsyncError::parse(
            source_name,
            format!("expected at least {} results, got {}", SHOW_RESULT_INDEX + 1, results.len()),
        )
    })
}
