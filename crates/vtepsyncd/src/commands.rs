//! Device command builders for snapshots and flood-list changes

use crate::gateway::{CommandRequest, ResponseFormat};
use crate::running_config::FLOOD_LIST_MARKER;
use crate::types::{CommunityTag, FloodAction};

/// Enters privileged EXEC mode
pub const ENABLE_CMD: &str = "enable";

/// Enters global configuration mode
pub const CONFIGURE_CMD: &str = "configure";

/// Index of the show command's result after the `enable` preamble
pub const SHOW_RESULT_INDEX: usize = 1;

/// Build the BGP route snapshot request
///
/// Routes tagged with the community are returned as plain text
pub fn build_show_community_routes(community: &CommunityTag) -> CommandRequest {
    CommandRequest::new(
        vec![
            ENABLE_CMD.to_string(),
            format!("show ip bgp community {}", community),
        ],
        ResponseFormat::Text,
    )
}

/// Build the running-config snapshot request
pub fn build_show_running_config() -> CommandRequest {
    CommandRequest::new(
        vec![ENABLE_CMD.to_string(), "show running-config".to_string()],
        ResponseFormat::Json,
    )
}

/// Build the flood-list statement for a single action
pub fn build_flood_vtep_cmd(action: &FloodAction) -> String {
    format!("{} {} {}", FLOOD_LIST_MARKER, action.op(), action.address())
}

/// Build the full request applying one action to an interface
pub fn build_flood_action(interface: &str, action: &FloodAction) -> CommandRequest {
    CommandRequest::new(
        vec![
            ENABLE_CMD.to_string(),
            CONFIGURE_CMD.to_string(),
            format!("interface {}", interface),
            build_flood_vtep_cmd(action),
        ],
        ResponseFormat::Json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VtepAddress;

    #[test]
    fn test_build_show_community_routes() {
        let tag: CommunityTag = "5555:5555".parse().unwrap();
        let req = build_show_community_routes(&tag);
        assert_eq!(req.cmds, vec!["enable", "show ip bgp community 5555:5555"]);
        assert_eq!(req.format, ResponseFormat::Text);
    }

    #[test]
    fn test_build_show_running_config() {
        let req = build_show_running_config();
        assert_eq!(req.cmds, vec!["enable", "show running-config"]);
        assert_eq!(req.format, ResponseFormat::Json);
    }

    #[test]
    fn test_build_flood_vtep_cmd() {
        let addr = VtepAddress::new(10, 0, 0, 1);
        assert_eq!(
            build_flood_vtep_cmd(&FloodAction::Add(addr)),
            "vxlan flood vtep add 10.0.0.1"
        );
        assert_eq!(
            build_flood_vtep_cmd(&FloodAction::Remove(addr)),
            "vxlan flood vtep remove 10.0.0.1"
        );
    }

    #[test]
    fn test_build_flood_action_preamble() {
        let req = build_flood_action("Vxlan1", &FloodAction::Remove(VtepAddress::new(10, 0, 0, 5)));
        assert_eq!(
            req.cmds,
            vec![
                "enable",
                "configure",
                "interface Vxlan1",
                "vxlan flood vtep remove 10.0.0.5"
            ]
        );
    }
}
