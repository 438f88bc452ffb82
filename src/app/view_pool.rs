use crate::domain::surface::{SurfaceHandle, SurfaceHost};
use crate::error::{LaunchbarError, Result};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub url: String,
    pub surface: SurfaceHandle,
    /// Creation slot inside the container.
    pub index: usize,
    pub visible: bool,
}

pub struct ViewPool {
    host: Arc<dyn SurfaceHost>,
    views: HashMap<String, ViewState>,
    visible: Option<String>,
    next_index: usize,
}

impl ViewPool {
    pub fn new(host: Arc<dyn SurfaceHost>) -> Self {
        Self {
            host,
            views: HashMap::new(),
            visible: None,
            next_index: 1,
        }
    }

    pub fn get(&self, url: &str) -> Option<&ViewState> {
        self.views.get(url)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn visible_url(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    /// Shows the surface for `url`, creating and loading it on first use, and
    /// hides whichever surface was showing before.
    pub async fn open(&mut self, url: &str) -> Result<()> {
        if !self.views.contains_key(url) {
            let surface = self
                .host
                .create(url)
                .await
                .map_err(|source| surface_error(url, source))?;
            log::info!("created {surface} for {url}");
            self.views.insert(
                url.to_string(),
                ViewState {
                    url: url.to_string(),
                    surface,
                    index: self.next_index,
                    visible: false,
                },
            );
            self.next_index += 1;
        }

        if let Some(previous) = self.visible.clone().filter(|prev| prev != url) {
            self.set_visible(&previous, false).await?;
        }
        self.set_visible(url, true).await?;
        self.host
            .set_container_visible(true)
            .await
            .map_err(|source| surface_error(url, source))
    }

    /// Hides the surface for `url`. Returns `true` when no surface is left
    /// showing, in which case the container is hidden too.
    pub async fn close(&mut self, url: &str) -> Result<bool> {
        if self.views.contains_key(url) {
            self.set_visible(url, false).await?;
        } else {
            log::debug!("close for {url} without a surface");
        }

        if self.visible.is_some() {
            return Ok(false);
        }
        self.host
            .set_container_visible(false)
            .await
            .map_err(|source| surface_error(url, source))?;
        Ok(true)
    }

    /// Hides every surface and the container.
    pub async fn close_all(&mut self) -> Result<()> {
        if let Some(url) = self.visible.clone() {
            self.set_visible(&url, false).await?;
        }
        self.host
            .set_container_visible(false)
            .await
            .map_err(|source| surface_error("container", source))
    }

    /// Destroys the surface for `url` and forgets it. Returns whether a
    /// surface existed. A later `open` starts from scratch.
    ///
    /// The state is only dropped once the host has destroyed the surface, so
    /// a failed destroy can be retried with another `kill`.
    pub async fn kill(&mut self, url: &str, reopen_externally: bool) -> Result<bool> {
        let existed = match self.views.get_mut(url) {
            Some(view) => {
                let surface = view.surface;
                view.visible = false;
                let hidden = if self.visible.as_deref() == Some(url) {
                    self.visible = None;
                    self.host.set_container_visible(false).await
                } else {
                    Ok(())
                };

                self.host
                    .destroy(surface)
                    .await
                    .map_err(|source| surface_error(url, source))?;
                self.views.remove(url);
                log::info!("destroyed {surface} for {url}");
                hidden.map_err(|source| surface_error(url, source))?;
                true
            }
            None => false,
        };

        if reopen_externally {
            self.host
                .open_external(url)
                .await
                .map_err(|source| surface_error(url, source))?;
        }
        Ok(existed)
    }

    pub async fn refresh(&mut self, url: &str) -> Result<()> {
        let view = self
            .views
            .get(url)
            .ok_or_else(|| LaunchbarError::NotFound(url.to_string()))?;
        self.host
            .reload(view.surface)
            .await
            .map_err(|source| surface_error(url, source))
    }

    async fn set_visible(&mut self, url: &str, visible: bool) -> Result<()> {
        let Some(view) = self.views.get_mut(url) else {
            return Err(LaunchbarError::NotFound(url.to_string()));
        };
        self.host
            .set_visible(view.surface, visible)
            .await
            .map_err(|source| surface_error(url, source))?;
        view.visible = visible;

        if visible {
            self.visible = Some(url.to_string());
        } else if self.visible.as_deref() == Some(url) {
            self.visible = None;
        }
        Ok(())
    }
}

fn surface_error(url: &str, source: anyhow::Error) -> LaunchbarError {
    LaunchbarError::Surface {
        url: url.to_string(),
        source,
    }
}
