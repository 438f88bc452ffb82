use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to one embedded content surface owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurfaceHost: Send + Sync {
    // Creates a hidden surface and starts loading `url` into it
    async fn create(&self, url: &str) -> Result<SurfaceHandle>;

    async fn set_visible(&self, surface: SurfaceHandle, visible: bool) -> Result<()>;

    async fn reload(&self, surface: SurfaceHandle) -> Result<()>;

    // Stops the surface and releases everything it holds
    async fn destroy(&self, surface: SurfaceHandle) -> Result<()>;

    // The window housing every surface
    async fn set_container_visible(&self, visible: bool) -> Result<()>;

    async fn open_external(&self, url: &str) -> Result<()>;
}
