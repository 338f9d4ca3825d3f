use crate::{CoreResult, InstanceId, PermissionRequest, RenderCommand};

use std::collections::BTreeSet;

use async_trait::async_trait;

/// The external shell that owns and draws the surfaces.
#[async_trait]
pub trait SurfaceHost: Send + Sync {
    /// Instances currently placed on screen.
    fn registered_instance_ids(&self) -> BTreeSet<InstanceId>;

    /// Replace the whole surface of `command.instance`.
    async fn issue_render_command(&self, command: RenderCommand) -> CoreResult<()>;

    /// Ask the user, in the foreground, to grant a permission. Best effort;
    /// the host reports its own failures.
    fn request_permission(&self, request: PermissionRequest);
}
