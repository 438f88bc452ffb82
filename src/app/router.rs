use crate::app::command::{Command, Reply};
use crate::app::context_menu;
use crate::app::hub::PresentationHub;
use crate::app::notification::Notification;
use crate::app::store::{Commit, ListStore};
use crate::app::view_pool::ViewPool;
use crate::app::warning::Warning;
use crate::domain::models::Item;
use crate::error::{LaunchbarError, Result};
use tokio::sync::mpsc;

pub struct CommandRouter {
    store: ListStore,
    views: ViewPool,
    hub: PresentationHub,
    open_externally_on_kill: bool,
    startup_warning: Option<Warning>,
}

impl CommandRouter {
    pub fn new(mut store: ListStore, views: ViewPool) -> Self {
        let startup_warning = store
            .take_load_error()
            .map(|err| Warning::from_error(&err));
        Self {
            store,
            views,
            hub: PresentationHub::default(),
            open_externally_on_kill: false,
            startup_warning,
        }
    }

    #[must_use]
    pub fn open_externally_on_kill(mut self, enabled: bool) -> Self {
        self.open_externally_on_kill = enabled;
        self
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub fn views(&self) -> &ViewPool {
        &self.views
    }

    /// Every new surface gets a snapshot, followed by a warning when the
    /// stored list could not be read at startup.
    pub fn attach(&mut self, capacity: usize) -> mpsc::Receiver<Notification> {
        let (id, rx) = self.hub.attach(self.store.list(), capacity);
        if let Some(warning) = &self.startup_warning {
            self.hub.send_to(
                id,
                &Notification::Warning {
                    warning: warning.clone(),
                },
            );
        }
        rx
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Reply> {
        validate(&command)?;
        log::debug!("dispatching {command:?}");

        match command {
            Command::List => Ok(Reply::Entries(self.store.list())),
            Command::AddItem { item } => {
                let commit = self.store.add_item(item)?;
                Ok(Reply::Index(self.publish(commit)))
            }
            Command::InsertItemAfter { after_url, item } => {
                let commit = self.store.insert_item_after(&after_url, item)?;
                Ok(Reply::Index(self.publish(commit)))
            }
            Command::AddSeparatorAfter { url } => {
                let commit = self.store.insert_separator_after(&url)?;
                self.publish(commit);
                Ok(Reply::Done)
            }
            Command::UpdateItem { url, patch } => {
                let commit = self.store.update_item(&url, patch)?;
                let item = self.publish(commit);
                if item.url != url {
                    // The surface was loaded from the old address.
                    self.discard_view(&url).await;
                }
                Ok(Reply::Item(item))
            }
            Command::RemoveItem { url } => {
                let commit = self.store.remove_item(&url)?;
                self.publish(commit);
                self.discard_view(&url).await;
                Ok(Reply::Done)
            }
            Command::Move { url, direction } => {
                let commit = self.store.move_item(&url, direction)?;
                Ok(Reply::Index(self.publish(commit)))
            }
            Command::Edit { url } => self
                .store
                .item(&url)
                .map(Reply::Item)
                .ok_or(LaunchbarError::NotFound(url)),
            Command::ContextMenu { url, edit_mode } => {
                context_menu::verbs_for(&self.store.list(), &url, edit_mode).map(Reply::Menu)
            }
            Command::OpenView { url } => {
                if !self.store.contains(&url) {
                    return Err(LaunchbarError::NotFound(url));
                }
                self.views.open(&url).await?;
                self.hub.broadcast(&Notification::ViewShown { url });
                Ok(Reply::Done)
            }
            Command::CloseView { url } => {
                if self.views.close(&url).await? {
                    self.hub.broadcast(&Notification::ViewsClosed);
                }
                Ok(Reply::Done)
            }
            Command::KillView {
                url,
                reopen_externally,
            } => {
                let reopen = reopen_externally.unwrap_or(self.open_externally_on_kill);
                let killed = self.views.kill(&url, reopen).await;
                if self.views.visible_url().is_none() {
                    self.hub.broadcast(&Notification::ViewsClosed);
                }
                killed.map(|_| Reply::Done)
            }
            Command::RefreshView { url } => {
                self.views.refresh(&url).await?;
                Ok(Reply::Done)
            }
            Command::CloseAllViews => {
                self.views.close_all().await?;
                self.hub.broadcast(&Notification::ViewsClosed);
                Ok(Reply::Done)
            }
        }
    }

    fn publish<T>(&mut self, commit: Commit<T>) -> T {
        for notification in &commit.notifications {
            self.hub.broadcast(notification);
        }
        if let Some(err) = &commit.write_error {
            self.warn(err);
        }
        commit.value
    }

    /// Tears down the surface of an address that left the list. The list
    /// change already happened, so a failure here is only a warning.
    async fn discard_view(&mut self, url: &str) {
        if self.views.get(url).is_none() {
            return;
        }
        let was_visible = self.views.visible_url() == Some(url);
        let killed = self.views.kill(url, false).await;
        if was_visible && self.views.visible_url().is_none() {
            self.hub.broadcast(&Notification::ViewsClosed);
        }
        if let Err(err) = killed {
            log::warn!("could not release surface: {err}");
            self.warn(&err);
        }
    }

    fn warn(&mut self, err: &LaunchbarError) {
        self.hub.broadcast(&Notification::Warning {
            warning: Warning::from_error(err),
        });
    }
}

fn validate(command: &Command) -> Result<()> {
    if let Some(url) = command.url() {
        require("url", url)?;
    }
    match command {
        Command::AddItem { item } | Command::InsertItemAfter { item, .. } => validate_item(item),
        Command::UpdateItem { patch, .. } => {
            if let Some(url) = &patch.url {
                require("url", url)?;
            }
            if let Some(name) = &patch.name {
                require("name", name)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_item(item: &Item) -> Result<()> {
    require("url", &item.url)?;
    require("name", &item.name)
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LaunchbarError::InvalidCommand(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Direction, Entry, ItemPatch};
    use crate::domain::repository::MockEntryRepository;
    use crate::app::mirror::ToolbarMirror;
    use crate::app::warning::Severity;
    use crate::domain::surface::{MockSurfaceHost, SurfaceHandle};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn memory_store() -> ListStore {
        let mut repo = MockEntryRepository::new();
        repo.expect_load().returning(|| Ok(Vec::new()));
        repo.expect_location().returning(|| "memory".to_string());
        repo.expect_save().returning(|_| Ok(()));
        ListStore::open(Box::new(repo))
    }

    fn permissive_host() -> MockSurfaceHost {
        let mut next = 0;
        let mut mock = MockSurfaceHost::new();
        mock.expect_create().returning(move |_| {
            next += 1;
            Ok(SurfaceHandle(next))
        });
        mock.expect_set_visible().returning(|_, _| Ok(()));
        mock.expect_set_container_visible().returning(|_| Ok(()));
        mock.expect_reload().returning(|_| Ok(()));
        mock.expect_destroy().returning(|_| Ok(()));
        mock.expect_open_external().returning(|_| Ok(()));
        mock
    }

    fn router_with(host: MockSurfaceHost) -> CommandRouter {
        CommandRouter::new(memory_store(), ViewPool::new(Arc::new(host)))
    }

    fn add(url: &str) -> Command {
        Command::AddItem {
            item: Item::new(url, url.to_uppercase()),
        }
    }

    fn drain(rx: &mut mpsc::Receiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let mut router = router_with(permissive_host());
        let mut rx = router.attach(32);

        router.dispatch(add("a")).await.unwrap();
        router.dispatch(add("b")).await.unwrap();
        router
            .dispatch(Command::AddSeparatorAfter {
                url: "a".to_string(),
            })
            .await
            .unwrap();
        router
            .dispatch(Command::RemoveItem {
                url: "a".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            router.dispatch(Command::List).await.unwrap(),
            Reply::Entries(vec![Entry::Item(Item::new("b", "B"))])
        );

        router.dispatch(add("c")).await.unwrap();
        router
            .dispatch(Command::OpenView {
                url: "b".to_string(),
            })
            .await
            .unwrap();
        router
            .dispatch(Command::OpenView {
                url: "c".to_string(),
            })
            .await
            .unwrap();
        assert!(!router.views().get("b").unwrap().visible);
        assert!(router.views().get("c").unwrap().visible);

        let pushed = drain(&mut rx);
        assert_eq!(pushed[0], Notification::Snapshot { entries: vec![] });
        assert_eq!(
            pushed.last(),
            Some(&Notification::ViewShown {
                url: "c".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_structural_errors_reach_the_caller() {
        let mut router = router_with(permissive_host());
        router.dispatch(add("a")).await.unwrap();

        let err = router.dispatch(add("a")).await.unwrap_err();
        assert_eq!(err.code(), "duplicate_url");

        let err = router
            .dispatch(Command::Move {
                url: "x".to_string(),
                direction: Direction::Up,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_blank_fields_are_invalid() {
        let mut router = router_with(MockSurfaceHost::new());
        let err = router
            .dispatch(Command::AddItem {
                item: Item::new("  ", "name"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_command");

        let err = router
            .dispatch(Command::AddItem {
                item: Item::new("u", ""),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_command");
        assert!(router.store().is_empty());
    }

    #[tokio::test]
    async fn test_open_requires_known_url() {
        let mut router = router_with(MockSurfaceHost::new());
        let err = router
            .dispatch(Command::OpenView {
                url: "nowhere".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(router.views().is_empty());
    }

    #[tokio::test]
    async fn test_remove_destroys_surface() {
        let mut host = MockSurfaceHost::new();
        host.expect_create().returning(|_| Ok(SurfaceHandle(1)));
        host.expect_set_visible().returning(|_, _| Ok(()));
        host.expect_set_container_visible().returning(|_| Ok(()));
        host.expect_destroy()
            .with(eq(SurfaceHandle(1)))
            .times(1)
            .returning(|_| Ok(()));
        let mut router = router_with(host);
        let mut rx = router.attach(32);

        router.dispatch(add("a")).await.unwrap();
        router
            .dispatch(Command::OpenView {
                url: "a".to_string(),
            })
            .await
            .unwrap();
        router
            .dispatch(Command::RemoveItem {
                url: "a".to_string(),
            })
            .await
            .unwrap();

        assert!(router.views().get("a").is_none());
        assert_eq!(drain(&mut rx).last(), Some(&Notification::ViewsClosed));
    }

    #[tokio::test]
    async fn test_rename_releases_old_surface() {
        let mut router = router_with(permissive_host());
        router.dispatch(add("a")).await.unwrap();
        router
            .dispatch(Command::OpenView {
                url: "a".to_string(),
            })
            .await
            .unwrap();

        let reply = router
            .dispatch(Command::UpdateItem {
                url: "a".to_string(),
                patch: ItemPatch {
                    url: Some("a2".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(reply, Reply::Item(Item::new("a2", "A")));
        assert!(router.views().get("a").is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_a_warning() {
        let mut repo = MockEntryRepository::new();
        repo.expect_load().returning(|| Ok(Vec::new()));
        repo.expect_location().returning(|| "memory".to_string());
        repo.expect_save().returning(|_| {
            Err(LaunchbarError::Persistence {
                path: "/ro/entries.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied"),
            })
        });
        let mut router = CommandRouter::new(
            ListStore::open(Box::new(repo)),
            ViewPool::new(Arc::new(MockSurfaceHost::new())),
        );
        let mut rx = router.attach(8);

        assert_eq!(router.dispatch(add("a")).await.unwrap(), Reply::Index(0));

        let pushed = drain(&mut rx);
        assert!(matches!(pushed[1], Notification::EntryAppended { .. }));
        let Notification::Warning { warning } = &pushed[2] else {
            panic!("expected a warning, got {:?}", pushed[2]);
        };
        assert!(warning.message.contains("/ro/entries.json"));
        assert!(!warning.suggestions.is_empty());
    }

    fn failing_destroy_host() -> MockSurfaceHost {
        let mut host = MockSurfaceHost::new();
        host.expect_create().returning(|_| Ok(SurfaceHandle(1)));
        host.expect_set_visible().returning(|_, _| Ok(()));
        host.expect_set_container_visible().returning(|_| Ok(()));
        host.expect_destroy()
            .with(eq(SurfaceHandle(1)))
            .returning(|_| Err(anyhow::anyhow!("renderer hung")));
        host
    }

    #[tokio::test]
    async fn test_failed_release_still_closes_view() {
        let mut router = router_with(failing_destroy_host());
        let mut rx = router.attach(32);
        let mut mirror = ToolbarMirror::default();

        router.dispatch(add("a")).await.unwrap();
        router
            .dispatch(Command::OpenView {
                url: "a".to_string(),
            })
            .await
            .unwrap();
        router
            .dispatch(Command::RemoveItem {
                url: "a".to_string(),
            })
            .await
            .unwrap();

        let pushed = drain(&mut rx);
        for notification in &pushed {
            mirror.apply(notification).unwrap();
        }
        assert!(pushed.contains(&Notification::ViewsClosed));
        assert!(matches!(pushed.last(), Some(Notification::Warning { .. })));
        assert_eq!(mirror.open_view(), None);
        assert_eq!(router.views().visible_url(), None);
        // the handle is kept so the surface can still be released later
        assert_eq!(router.views().get("a").unwrap().surface, SurfaceHandle(1));
    }

    #[tokio::test]
    async fn test_failed_kill_reports_and_closes_view() {
        let mut router = router_with(failing_destroy_host());
        router.dispatch(add("a")).await.unwrap();
        router
            .dispatch(Command::OpenView {
                url: "a".to_string(),
            })
            .await
            .unwrap();
        let mut rx = router.attach(8);

        let err = router
            .dispatch(Command::KillView {
                url: "a".to_string(),
                reopen_externally: Some(false),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "surface");
        assert_eq!(drain(&mut rx).last(), Some(&Notification::ViewsClosed));
        assert!(router.views().get("a").is_some());
    }

    #[tokio::test]
    async fn test_unreadable_store_warns_each_surface() {
        let mut repo = MockEntryRepository::new();
        repo.expect_load()
            .returning(|| Err(LaunchbarError::MalformedState("line 1: eof".to_string())));
        repo.expect_location().returning(|| "memory".to_string());
        let mut router = CommandRouter::new(
            ListStore::open(Box::new(repo)),
            ViewPool::new(Arc::new(MockSurfaceHost::new())),
        );

        for _ in 0..2 {
            let mut rx = router.attach(4);
            let pushed = drain(&mut rx);
            assert_eq!(pushed[0], Notification::Snapshot { entries: vec![] });
            let Notification::Warning { warning } = &pushed[1] else {
                panic!("expected a warning, got {:?}", pushed[1]);
            };
            assert_eq!(warning.severity, Severity::Info);
            assert!(warning.message.contains("unreadable"));
            assert!(!warning.suggestions.is_empty());
        }

        let mut healthy = router_with(MockSurfaceHost::new());
        assert_eq!(drain(&mut healthy.attach(4)).len(), 1);
    }

    #[tokio::test]
    async fn test_kill_uses_configured_default() {
        let mut host = MockSurfaceHost::new();
        host.expect_set_container_visible().returning(|_| Ok(()));
        host.expect_open_external()
            .with(eq("a"))
            .times(1)
            .returning(|_| Ok(()));
        let mut router = router_with(host).open_externally_on_kill(true);

        router
            .dispatch(Command::KillView {
                url: "a".to_string(),
                reopen_externally: None,
            })
            .await
            .unwrap();
        router
            .dispatch(Command::KillView {
                url: "a".to_string(),
                reopen_externally: Some(false),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_context_menu_and_edit() {
        let mut router = router_with(MockSurfaceHost::new());
        router.dispatch(add("a")).await.unwrap();

        let Reply::Menu(verbs) = router
            .dispatch(Command::ContextMenu {
                url: "a".to_string(),
                edit_mode: true,
            })
            .await
            .unwrap()
        else {
            panic!("expected a menu");
        };
        assert_eq!(verbs.len(), 4);

        assert_eq!(
            router
                .dispatch(Command::Edit {
                    url: "a".to_string()
                })
                .await
                .unwrap(),
            Reply::Item(Item::new("a", "A"))
        );
    }
}
