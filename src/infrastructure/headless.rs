use crate::domain::surface::{SurfaceHandle, SurfaceHost};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
struct HeadlessSurface {
    url: String,
    visible: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_handle: AtomicU64,
    surfaces: Mutex<HashMap<SurfaceHandle, HeadlessSurface>>,
    container_visible: AtomicBool,
    launch_external: bool,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            launch_external: true,
            ..Self::default()
        }
    }

    /// Records external opens without handing them to the system.
    pub fn without_external_launch() -> Self {
        Self::default()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn container_visible(&self) -> bool {
        self.container_visible.load(Ordering::SeqCst)
    }

    fn with_surface<T>(
        &self,
        surface: SurfaceHandle,
        f: impl FnOnce(&mut HeadlessSurface) -> T,
    ) -> Result<T> {
        let mut surfaces = self
            .surfaces
            .lock()
            .map_err(|_| anyhow!("surface table poisoned"))?;
        let entry = surfaces
            .get_mut(&surface)
            .ok_or_else(|| anyhow!("unknown {surface}"))?;
        Ok(f(entry))
    }
}

#[async_trait]
impl SurfaceHost for HeadlessHost {
    async fn create(&self, url: &str) -> Result<SurfaceHandle> {
        let handle = SurfaceHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.surfaces
            .lock()
            .map_err(|_| anyhow!("surface table poisoned"))?
            .insert(
                handle,
                HeadlessSurface {
                    url: url.to_string(),
                    visible: false,
                },
            );
        log::debug!("{handle}: loading {url}");
        Ok(handle)
    }

    async fn set_visible(&self, surface: SurfaceHandle, visible: bool) -> Result<()> {
        let url = self.with_surface(surface, |s| {
            s.visible = visible;
            s.url.clone()
        })?;
        log::debug!("{surface}: {} {url}", if visible { "showing" } else { "hiding" });
        Ok(())
    }

    async fn reload(&self, surface: SurfaceHandle) -> Result<()> {
        let url = self.with_surface(surface, |s| s.url.clone())?;
        log::debug!("{surface}: reloading {url}");
        Ok(())
    }

    async fn destroy(&self, surface: SurfaceHandle) -> Result<()> {
        let removed = self
            .surfaces
            .lock()
            .map_err(|_| anyhow!("surface table poisoned"))?
            .remove(&surface)
            .ok_or_else(|| anyhow!("unknown {surface}"))?;
        log::debug!("{surface}: destroyed ({})", removed.url);
        Ok(())
    }

    async fn set_container_visible(&self, visible: bool) -> Result<()> {
        self.container_visible.store(visible, Ordering::SeqCst);
        log::debug!("container visible: {visible}");
        Ok(())
    }

    async fn open_external(&self, url: &str) -> Result<()> {
        log::info!("opening {url} externally");
        if !self.launch_external {
            return Ok(());
        }
        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(target)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracks_surfaces() {
        let host = HeadlessHost::without_external_launch();
        let a = host.create("https://a.example").await.unwrap();
        let b = host.create("https://b.example").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(host.surface_count(), 2);

        host.set_visible(a, true).await.unwrap();
        host.set_container_visible(true).await.unwrap();
        assert!(host.container_visible());

        host.destroy(a).await.unwrap();
        assert_eq!(host.surface_count(), 1);
        assert!(host.reload(a).await.is_err());
        assert!(host.destroy(a).await.is_err());
        host.reload(b).await.unwrap();
    }

    #[tokio::test]
    async fn test_external_open_can_be_suppressed() {
        let host = HeadlessHost::without_external_launch();
        host.open_external("https://a.example").await.unwrap();
    }
}
