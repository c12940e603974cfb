//! In-process stand-ins for the external collaborators.
//!
//! Used by the test suites and by embedders that want to exercise the
//! orchestrator without real query engines.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use brood_common::error::{BroodError, Result};
use brood_common::types::{Id, Language};

use crate::container::{Assembler, Container, Engine};
use crate::event::{ContainerEvent, Emitter, EventKind};

/// Engine that only reports its language.
#[derive(Debug)]
pub struct MockEngine {
    language: Language,
}

impl MockEngine {
    /// Creates a shared engine for `language`.
    #[must_use]
    pub fn new(language: Language) -> Arc<Self> {
        Arc::new(Self { language })
    }
}

impl Engine for MockEngine {
    fn language(&self) -> Language {
        self.language
    }
}

/// Container that counts activations and closes.
#[derive(Debug)]
pub struct MockContainer {
    id: Id,
    engines: Vec<Arc<dyn Engine>>,
    refuse_activation: bool,
    fail_close: bool,
    activations: AtomicUsize,
    closes: AtomicUsize,
}

impl MockContainer {
    /// Creates a container named `name` without engines.
    #[must_use]
    pub fn new(name: impl Into<Id>) -> Self {
        Self {
            id: name.into(),
            engines: Vec::new(),
            refuse_activation: false,
            fail_close: false,
            activations: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// Adds an engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engines.push(engine);
        self
    }

    /// Makes [`Container::activate`] fail.
    #[must_use]
    pub fn refusing_activation(mut self) -> Self {
        self.refuse_activation = true;
        self
    }

    /// Makes [`Container::close`] fail (after counting the call).
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Wraps the container for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of completed activations.
    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    /// Number of close calls.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Activated at least once and never closed.
    pub fn is_running(&self) -> bool {
        self.activation_count() > 0 && self.close_count() == 0
    }
}

impl Container for MockContainer {
    fn name(&self) -> &Id {
        &self.id
    }

    fn engines(&self) -> &[Arc<dyn Engine>] {
        &self.engines
    }

    fn activate(&self) -> Result<()> {
        if self.refuse_activation {
            return Err(BroodError::Activation {
                id: self.id.clone(),
                message: "datasource unavailable".into(),
            });
        }
        let _ = self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let _ = self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BroodError::Config {
                message: format!("container {} refused to close", self.id),
            });
        }
        Ok(())
    }
}

/// Assembler producing a fresh [`MockContainer`] per call.
#[derive(Debug)]
pub struct MockAssembler {
    format: String,
    languages: Vec<Language>,
    failing: HashSet<Id>,
    refusing_activation: HashSet<Id>,
    failing_close: HashSet<Id>,
    calls: AtomicUsize,
    assembled: Mutex<Vec<Arc<MockContainer>>>,
}

impl MockAssembler {
    /// Creates an assembler for configuration items tagged `format`.
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            languages: Vec::new(),
            failing: HashSet::new(),
            refusing_activation: HashSet::new(),
            failing_close: HashSet::new(),
            calls: AtomicUsize::new(0),
            assembled: Mutex::new(Vec::new()),
        }
    }

    /// Gives every assembled container an engine for `language`.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.languages.push(language);
        self
    }

    /// Fails assembly of `id`.
    #[must_use]
    pub fn failing_on(mut self, id: impl Into<Id>) -> Self {
        let _ = self.failing.insert(id.into());
        self
    }

    /// Assembles `id` into a container that refuses to activate.
    #[must_use]
    pub fn refusing_activation_of(mut self, id: impl Into<Id>) -> Self {
        let _ = self.refusing_activation.insert(id.into());
        self
    }

    /// Assembles `id` into a container whose close fails.
    #[must_use]
    pub fn failing_close_of(mut self, id: impl Into<Id>) -> Self {
        let _ = self.failing_close.insert(id.into());
        self
    }

    /// Wraps the assembler for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of `assemble` calls, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every container assembled so far, in order.
    pub fn assembled(&self) -> Vec<Arc<MockContainer>> {
        self.assembled.lock().clone()
    }

    /// The most recent container assembled for `id`.
    pub fn last_for(&self, id: &Id) -> Option<Arc<MockContainer>> {
        self.assembled
            .lock()
            .iter()
            .rev()
            .find(|c| c.name() == id)
            .cloned()
    }
}

impl Assembler for MockAssembler {
    fn format(&self) -> &str {
        &self.format
    }

    fn assemble(&self, id: &Id, raw: &[u8]) -> Result<Arc<dyn Container>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(id) {
            return Err(BroodError::assembly(
                id,
                format!("cannot read {} bytes of {} configuration", raw.len(), self.format),
            ));
        }
        let mut container = MockContainer::new(id.clone());
        for language in &self.languages {
            container = container.with_engine(MockEngine::new(*language));
        }
        if self.refusing_activation.contains(id) {
            container = container.refusing_activation();
        }
        if self.failing_close.contains(id) {
            container = container.failing_close();
        }
        let container = container.shared();
        self.assembled.lock().push(Arc::clone(&container));
        Ok(container)
    }
}

/// Emitter that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<ContainerEvent>>,
}

impl RecordingEmitter {
    /// All events emitted so far.
    pub fn events(&self) -> Vec<ContainerEvent> {
        self.events.lock().clone()
    }

    /// `(kind, container name)` of every event, in order.
    pub fn subjects(&self) -> Vec<(EventKind, Id)> {
        self.events
            .lock()
            .iter()
            .map(|e| (e.kind(), e.container().name().clone()))
            .collect()
    }

    /// Forgets recorded events.
    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, event: ContainerEvent) {
        self.events.lock().push(event);
    }
}
