//! PageAdapter - per-page state machine driving the trigger, the menu and
//! insertion.

use tokio::sync::broadcast;
use tokio::task::JoinSet;

use super::cache::ContextCache;
use super::dom::HostPage;
use super::insert::{insert_text, InsertOutcome};
use super::menu::MenuView;
use super::site::SiteMatcher;
use crate::config::Config;
use crate::protocol::{Channel, ProtocolClient};
use crate::store::{KeyValueStore, StorageChange};

/// Where the adapter is in its lifecycle on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    NoButton,
    ButtonVisible,
    MenuOpen,
    MenuClosed,
}

/// Drives one supported page.
///
/// Never touches the store for writes: listings go through the protocol
/// client and usage is reported with `TOUCH_CONTEXT`.
pub struct PageAdapter<P, C, S> {
    page: P,
    client: ProtocolClient<C, S>,
    config: Config,
    state: AdapterState,
    cache: ContextCache,
    view: Option<MenuView>,
    term: String,
    touches: JoinSet<()>,
}

impl<P, C, S> PageAdapter<P, C, S>
where
    P: HostPage,
    C: Channel + Clone + 'static,
    S: KeyValueStore + Clone + 'static,
{
    /// Start on `page` if its host is supported, mounting the trigger when
    /// the page is ready for it.
    pub fn activate(page: P, client: ProtocolClient<C, S>, config: Config) -> Option<Self> {
        let host = page.host();
        if !SiteMatcher::new(&config.supported_sites).matches(&host) {
            tracing::debug!(%host, "unsupported host");
            return None;
        }

        let mut adapter = Self {
            page,
            client,
            config,
            state: AdapterState::NoButton,
            cache: ContextCache::new(),
            view: None,
            term: String::new(),
            touches: JoinSet::new(),
        };
        tracing::info!(%host, "page adapter active");
        adapter.ensure_button();
        Some(adapter)
    }

    /// Mount the trigger unless it is already there. Returns whether a
    /// trigger is present afterwards.
    pub fn ensure_button(&mut self) -> bool {
        if self.page.has_trigger() {
            if self.state == AdapterState::NoButton {
                self.state = AdapterState::ButtonVisible;
            }
            return true;
        }
        if self.page.mount_trigger() {
            tracing::info!("injected context button");
            self.state = AdapterState::ButtonVisible;
            true
        } else {
            false
        }
    }

    /// React to the host page mutating its DOM. Re-mounts the trigger if
    /// the page removed it; otherwise does nothing.
    pub fn on_mutation(&mut self) -> bool {
        if !self.page.has_trigger() && self.state != AdapterState::NoButton {
            tracing::debug!("context button removed by page");
            if self.state == AdapterState::MenuOpen {
                self.page.close_menu();
            }
            self.state = AdapterState::NoButton;
            self.view = None;
        }
        self.ensure_button()
    }

    pub async fn toggle_menu(&mut self) {
        match self.state {
            AdapterState::MenuOpen => self.close_menu(),
            AdapterState::ButtonVisible | AdapterState::MenuClosed => self.open_menu().await,
            AdapterState::NoButton => {}
        }
    }

    /// Open the menu and fetch a fresh listing.
    pub async fn open_menu(&mut self) {
        if self.state == AdapterState::NoButton {
            return;
        }
        self.state = AdapterState::MenuOpen;
        self.term.clear();
        self.refresh().await;
    }

    /// Refetch after the menu showed an error.
    pub async fn retry(&mut self) {
        if self.state == AdapterState::MenuOpen && self.view.as_ref().is_some_and(MenuView::can_retry) {
            self.refresh().await;
        }
    }

    /// Filter the open menu by title or body.
    pub fn search(&mut self, term: &str) {
        self.term = term.to_string();
        if self.state == AdapterState::MenuOpen && self.cache.is_loaded() {
            self.render_cached();
        }
    }

    /// Feed a storage change notification into the cache.
    pub fn on_storage_change(&mut self, change: &StorageChange) {
        let now = self.client.fallback().now_millis();
        if self.cache.apply_change(change, now)
            && self.state == AdapterState::MenuOpen
            && matches!(self.view, Some(MenuView::Populated(_) | MenuView::Empty))
        {
            self.render_cached();
        }
    }

    /// Storage change notifications for this environment.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.client.fallback().subscribe()
    }

    pub fn close_menu(&mut self) {
        if self.state == AdapterState::MenuOpen {
            self.page.close_menu();
            self.state = AdapterState::MenuClosed;
        }
    }

    /// Insert the chosen context and report its use in the background.
    ///
    /// The usage report is fire-and-forget; await `flush_touches` to observe
    /// it. Must be called from within a tokio runtime.
    pub fn choose(&mut self, id: &str) -> InsertOutcome {
        let Some(body) = self.cache.get(id).map(|c| c.body.clone()) else {
            tracing::warn!(%id, "chosen context is not cached");
            self.close_menu();
            return InsertOutcome::Failed(format!("context not found: {id}"));
        };

        let outcome = insert_text(&mut self.page, &body);
        self.close_menu();

        if outcome.succeeded() {
            tracing::debug!(%id, ?outcome, "inserted context");
            let client = self.client.clone();
            let id = id.to_string();
            while self.touches.try_join_next().is_some() {}
            self.touches.spawn(async move {
                if let Err(err) = client.touch(&id).await {
                    tracing::warn!(%id, error = %err, "usage report failed");
                }
            });
        }
        outcome
    }

    /// Insert arbitrary text on request from the popup. No usage report.
    pub fn inject(&mut self, text: &str) -> InsertOutcome {
        insert_text(&mut self.page, text)
    }

    /// Wait for outstanding usage reports.
    pub async fn flush_touches(&mut self) {
        while self.touches.join_next().await.is_some() {}
    }

    /// Usage reports not yet reaped. Finished ones are reaped on the next
    /// `choose`.
    pub fn pending_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// The view last rendered into the menu.
    pub fn view(&self) -> Option<&MenuView> {
        self.view.as_ref()
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    async fn refresh(&mut self) {
        self.render(MenuView::Loading);
        match self.client.request_contexts().await {
            Ok(listing) => {
                tracing::debug!(count = listing.items.len(), source = ?listing.source, "menu loaded");
                self.cache.replace(listing.items);
                self.render_cached();
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load contexts");
                self.cache.invalidate();
                self.render(MenuView::Error {
                    message: "Could not load contexts.".into(),
                });
            }
        }
    }

    fn render_cached(&mut self) {
        let view = MenuView::from_contexts(self.cache.search(&self.term), &self.config);
        self.render(view);
    }

    fn render(&mut self, view: MenuView) {
        self.page.render_menu(&view);
        self.view = Some(view);
    }
}
