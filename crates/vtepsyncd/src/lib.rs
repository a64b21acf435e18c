//! VTEP Flood-List Synchronization Daemon
//!
//! vtepsyncd keeps a VXLAN interface's head-end replication flood list in
//! step with the remote VTEP loopbacks advertised in BGP under a community:
//! - BGP host routes tagged with the community become the desired VTEP set
//! - `vxlan flood vtep` lines on the interface form the configured VTEP set
//! - stale VTEPs are removed first, then new ones are added
//!
//! Every cycle is stateless and recomputed from fresh device snapshots, so a
//! partially applied cycle converges on the next poll.

pub mod bgp_routes;
pub mod commands;
pub mod config_file;
pub mod error;
pub mod gateway;
pub mod reconcile;
pub mod running_config;
pub mod types;
pub mod vtep_sync;

pub use config_file::{RuntimeConfig, VtepsyncConfig};
pub use error::{GatewayError, Result, VtepsyncError};
pub use gateway::{CommandRequest, DeviceGateway, EapiClient, EapiConfig, ResponseFormat};
pub use running_config::FloodLinePolicy;
pub use types::{CommunityTag, FloodAction, FloodListChange, FloodOp, VtepAddress, VtepSet};
pub use vtep_sync::{CycleReport, FailedChange, SyncSettings, VtepSync};
