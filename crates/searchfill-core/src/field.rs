//! The searchable field state machine.
//!
//! A [`SearchableField`] reacts to one [`FieldEvent`] at a time and answers
//! with a [`Directive`] telling its driver what asynchronous work to start:
//! arm or cancel the debounce timer, or issue a suggestion query. All form
//! reads and writes happen synchronously through the [`FormHost`] passed to
//! [`SearchableField::handle`].
//!
//! Each issued query carries a generation number. Short input, blur and every
//! new query advance the generation, so a response arriving for an older
//! generation can be recognised and dropped.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, FieldConfig, RequestMethod, ResolutionMode};
use crate::dependency::{QueryParameters, collect_parameters};
use crate::error::{FillError, Result};
use crate::form::{FieldRef, FormHost};
use crate::response::decode_suggestions;
use crate::store::SuggestionStore;
use crate::view::SuggestionView;

/// Something that happened to a searchable field.
#[derive(Debug)]
pub enum FieldEvent {
    /// The user edited the text.
    Input,
    /// The debounce timer armed with `ticket` elapsed.
    Settled { ticket: u64 },
    /// A query finished.
    FetchCompleted {
        generation: u64,
        outcome: Result<Value>,
    },
    /// The field's value was committed, e.g. a suggestion was picked.
    Change,
    /// The field lost focus.
    Blur,
}

/// Work the driver must start after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    None,
    /// (Re)arm the debounce timer; it reports back with `Settled { ticket }`.
    Debounce { ticket: u64 },
    CancelDebounce,
    Fetch(FetchRequest),
}

/// A suggestion query ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub field: String,
    pub generation: u64,
    pub url: String,
    pub method: RequestMethod,
    pub params: QueryParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Idle,
    Pending { ticket: u64 },
    Fetching { generation: u64 },
}

pub struct SearchableField {
    config: FieldConfig,
    field: FieldRef,
    store: SuggestionStore,
    state: FieldState,
    generation: u64,
    ticket: u64,
}

impl SearchableField {
    /// Attach searchable behaviour to `field`, validating `config` once.
    pub fn attach(config: FieldConfig, field: FieldRef) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            field,
            store: SuggestionStore::new(),
            state: FieldState::Idle,
            generation: 0,
            ticket: 0,
        })
    }

    /// Attach to the top-level field named by `config`.
    ///
    /// The field reference carries no scope, so a field living inside a
    /// scope must be attached with [`SearchableField::attach`] and a scoped
    /// [`FieldRef`] instead.
    pub fn from_config(config: FieldConfig) -> Result<Self> {
        let mut field = FieldRef::named(&config.name);
        field.id = config.id.clone();
        Self::attach(config, field)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn store(&self) -> &SuggestionStore {
        &self.store
    }

    /// Latest generation issued or invalidated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_labels(&self) -> Vec<String> {
        self.store.current_labels()
    }

    pub fn handle<H, V>(&mut self, event: FieldEvent, host: &mut H, view: &mut V) -> Result<Directive>
    where
        H: FormHost + ?Sized,
        V: SuggestionView + ?Sized,
    {
        match event {
            FieldEvent::Input => Ok(self.on_input(host, view)),
            FieldEvent::Settled { ticket } => Ok(self.on_settled(ticket, host, view)),
            FieldEvent::FetchCompleted {
                generation,
                outcome,
            } => {
                self.on_fetch_completed(generation, outcome, view);
                Ok(Directive::None)
            }
            FieldEvent::Change => {
                self.on_change(host)?;
                Ok(Directive::None)
            }
            FieldEvent::Blur => Ok(self.on_blur(host, view)),
        }
    }

    fn text<H: FormHost + ?Sized>(&self, host: &H) -> String {
        host.value(&self.field).unwrap_or_default()
    }

    /// Length is measured in UTF-16 code units, as the browser reports it.
    fn is_short(&self, text: &str) -> bool {
        text.encode_utf16().count() < self.config.min_query_len()
    }

    fn on_input<H, V>(&mut self, host: &mut H, view: &mut V) -> Directive
    where
        H: FormHost + ?Sized,
        V: SuggestionView + ?Sized,
    {
        let text = self.text(&*host);
        if self.is_short(&text) {
            return self.clear_for_short_input(view);
        }
        if self.config.debounce().is_zero() {
            return Directive::Fetch(self.begin_fetch(&*host));
        }
        self.ticket += 1;
        self.state = FieldState::Pending {
            ticket: self.ticket,
        };
        Directive::Debounce {
            ticket: self.ticket,
        }
    }

    fn on_settled<H, V>(&mut self, ticket: u64, host: &mut H, view: &mut V) -> Directive
    where
        H: FormHost + ?Sized,
        V: SuggestionView + ?Sized,
    {
        if self.state != (FieldState::Pending { ticket }) {
            debug!(field = %self.field.name, ticket, "ignoring superseded debounce");
            return Directive::None;
        }
        let text = self.text(&*host);
        if self.is_short(&text) {
            return self.clear_for_short_input(view);
        }
        Directive::Fetch(self.begin_fetch(&*host))
    }

    fn clear_for_short_input<V: SuggestionView + ?Sized>(&mut self, view: &mut V) -> Directive {
        debug!(field = %self.field.name, "input below minimum length, clearing suggestions");
        self.invalidate();
        self.store.clear();
        view.value_changed(&[]);
        Directive::CancelDebounce
    }

    fn begin_fetch<H: FormHost + ?Sized>(&mut self, host: &H) -> FetchRequest {
        let params = collect_parameters(host, &self.field, &self.config.fill_depends_on);
        self.generation += 1;
        self.state = FieldState::Fetching {
            generation: self.generation,
        };
        debug!(
            field = %self.field.name,
            generation = self.generation,
            params = params.len(),
            "issuing suggestion query"
        );
        FetchRequest {
            field: self.field.name.clone(),
            generation: self.generation,
            url: self.config.fill_url.clone(),
            method: self.config.method,
            params,
        }
    }

    /// Make every outstanding query stale and return to idle.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.state = FieldState::Idle;
    }

    fn on_fetch_completed<V: SuggestionView + ?Sized>(
        &mut self,
        generation: u64,
        outcome: Result<Value>,
        view: &mut V,
    ) {
        if generation != self.generation && self.config.discard_stale {
            debug!(
                field = %self.field.name,
                generation,
                latest = self.generation,
                "discarding stale suggestion response"
            );
            return;
        }
        if self.state == (FieldState::Fetching { generation }) {
            self.state = FieldState::Idle;
        }

        let decoded = outcome.and_then(|body| decode_suggestions(&self.config.mode, &body));
        match decoded {
            Ok(suggestions) => self.store.replace(suggestions),
            Err(e) => {
                warn!(field = %self.field.name, generation, "suggestion query failed: {e}");
                if self.config.failure_policy() == FailurePolicy::Clear {
                    self.store.clear();
                }
            }
        }
        view.value_changed(&self.store.current_labels());
    }

    fn on_change<H: FormHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let ResolutionMode::Map { value_field, .. } = &self.config.mode else {
            return Ok(());
        };
        let target = host
            .field_by_id(value_field)
            .ok_or_else(|| FillError::MissingValueField(value_field.clone()))?;

        let text = self.text(&*host);
        let value = match self.store.resolve(&text) {
            Some(value) => value.to_string(),
            None => {
                debug!(field = %self.field.name, "no suggestion for input, submitting literal text");
                text
            }
        };
        host.set_value(&target, &value);
        host.dispatch_change(&target);
        Ok(())
    }

    fn on_blur<H, V>(&mut self, host: &mut H, view: &mut V) -> Directive
    where
        H: FormHost + ?Sized,
        V: SuggestionView + ?Sized,
    {
        self.invalidate();
        // Map fields keep their suggestions: a change arriving after blur
        // (forced or native) must still resolve the label to its value.
        if !self.config.mode.is_map() {
            self.store.clear();
            view.value_changed(&[]);
        }

        if self.config.cascades_on_blur() {
            host.dispatch_change(&self.field);

            let key = self.config.dependency_key();
            let dependents: Vec<FieldRef> = host
                .fields_depending_on(&key)
                .into_iter()
                .filter(|dep| dep.name != self.field.name)
                .collect();
            for dependent in &dependents {
                host.clear_value(dependent);
                host.dispatch_change(dependent);
            }
            if !dependents.is_empty() {
                info!(field = %self.field.name, reset = dependents.len(), "reset dependent fields");
            }
        }
        Directive::CancelDebounce
    }
}
