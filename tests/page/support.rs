//! A scripted host page and a running background to drive the adapter.

use std::sync::Arc;

use context_manager::page::{
    splice, Focused, HostPage, MenuView, Notice, PageAdapter, PageError, PlainField, RichEditable,
};
use context_manager::protocol::{spawn_background, BackgroundHandle, Coordinator, RuntimeChannel};
use context_manager::{Config, InMemoryStore, ProtocolClient, StoreAdapter};

#[derive(Debug, Default)]
pub struct FakeField {
    pub value: String,
    pub selection: (usize, usize),
    pub focused: bool,
    pub inputs: usize,
}

impl PlainField for FakeField {
    fn value(&self) -> String {
        self.value.clone()
    }
    fn selection(&self) -> (usize, usize) {
        self.selection
    }
    fn set_value(&mut self, value: String) {
        self.value = value;
    }
    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection = (start, end);
    }
    fn focus(&mut self) {
        self.focused = true;
    }
    fn dispatch_input(&mut self) {
        self.inputs += 1;
    }
}

/// Flat-text model of a contenteditable region.
#[derive(Debug, Default)]
pub struct FakeEditor {
    pub text: String,
    pub range: Option<(usize, usize)>,
    pub last_insert_end: usize,
    pub inputs: usize,
}

impl RichEditable for FakeEditor {
    fn focus(&mut self) {}
    fn has_range(&self) -> bool {
        self.range.is_some()
    }
    fn delete_selection(&mut self) {
        if let Some((start, end)) = self.range {
            self.text = splice(&self.text, start, end, "").0;
            self.range = Some((start, start));
        }
    }
    fn insert_text_node(&mut self, text: &str) {
        let (start, _) = self.range.unwrap_or((0, 0));
        let (text, end) = splice(&self.text, start, start, text);
        self.text = text;
        self.last_insert_end = end;
    }
    fn append_text_node(&mut self, text: &str) {
        self.text.push_str(text);
        self.last_insert_end = self.text.chars().count();
    }
    fn collapse_after_last_insert(&mut self) {
        self.range = Some((self.last_insert_end, self.last_insert_end));
    }
    fn dispatch_input(&mut self) {
        self.inputs += 1;
    }
}

#[derive(Debug, Default)]
pub enum Target {
    #[default]
    Nothing,
    Plain(FakeField),
    Rich(FakeEditor),
}

#[derive(Debug)]
pub struct FakePage {
    pub host: String,
    pub trigger: bool,
    pub ready: bool,
    pub mounts: usize,
    pub target: Target,
    pub clipboard: Option<String>,
    pub clipboard_broken: bool,
    pub notices: Vec<Notice>,
    pub rendered: Vec<MenuView>,
    pub closes: usize,
}

impl FakePage {
    pub fn on(host: &str) -> Self {
        Self {
            host: host.to_string(),
            trigger: false,
            ready: true,
            mounts: 0,
            target: Target::Nothing,
            clipboard: None,
            clipboard_broken: false,
            notices: Vec::new(),
            rendered: Vec::new(),
            closes: 0,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn field(&self) -> &FakeField {
        match &self.target {
            Target::Plain(field) => field,
            other => panic!("no plain field focused: {other:?}"),
        }
    }

    pub fn editor(&self) -> &FakeEditor {
        match &self.target {
            Target::Rich(editor) => editor,
            other => panic!("no editor focused: {other:?}"),
        }
    }
}

impl HostPage for FakePage {
    fn host(&self) -> String {
        self.host.clone()
    }
    fn has_trigger(&self) -> bool {
        self.trigger
    }
    fn mount_trigger(&mut self) -> bool {
        if !self.ready {
            return false;
        }
        self.trigger = true;
        self.mounts += 1;
        true
    }
    fn focused(&mut self) -> Option<Focused<'_>> {
        match &mut self.target {
            Target::Nothing => None,
            Target::Plain(field) => Some(Focused::PlainField(field)),
            Target::Rich(editor) => Some(Focused::RichEditable(editor)),
        }
    }
    fn write_clipboard(&mut self, text: &str) -> Result<(), PageError> {
        if self.clipboard_broken {
            return Err(PageError::Clipboard("permission denied".into()));
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
    fn render_menu(&mut self, view: &MenuView) {
        self.rendered.push(view.clone());
    }
    fn close_menu(&mut self) {
        self.closes += 1;
    }
}

pub type Adapter = PageAdapter<FakePage, RuntimeChannel, InMemoryStore>;

pub struct Harness {
    pub store: InMemoryStore,
    pub background_adapter: StoreAdapter<InMemoryStore>,
    pub background: BackgroundHandle,
    pub config: Config,
}

impl Harness {
    pub fn start() -> Self {
        let store = InMemoryStore::new();
        let background_adapter = StoreAdapter::new(store.clone());
        let background =
            spawn_background(Arc::new(Coordinator::with_default_handlers(background_adapter.clone())));
        Self {
            store,
            background_adapter,
            background,
            config: Config {
                request_timeout_ms: 100,
                retry_delay_ms: 10,
                ..Config::default()
            },
        }
    }

    pub fn client(&self) -> ProtocolClient<RuntimeChannel, InMemoryStore> {
        ProtocolClient::new(
            self.background.channel(),
            StoreAdapter::new(self.store.clone()),
            &self.config,
        )
    }

    pub fn activate(&self, page: FakePage) -> Option<Adapter> {
        PageAdapter::activate(page, self.client(), self.config.clone())
    }
}
