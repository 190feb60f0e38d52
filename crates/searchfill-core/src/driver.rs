use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tracing::warn;

use crate::debounce::Debouncer;
use crate::error::Result;
use crate::field::{Directive, FetchRequest, FieldEvent, SearchableField};
use crate::form::FormHost;
use crate::source::SuggestionSource;
use crate::view::SuggestionView;

/// Runs one [`SearchableField`] against a live source.
///
/// Host events and the completions of timers and queries share one channel
/// and are handled strictly one at a time.
pub struct FieldDriver<S, H, V> {
    field: SearchableField,
    source: Arc<S>,
    host: H,
    view: V,
    tx: UnboundedSender<FieldEvent>,
    rx: UnboundedReceiver<FieldEvent>,
    debouncer: Debouncer<FieldEvent>,
}

impl<S, H, V> FieldDriver<S, H, V>
where
    S: SuggestionSource + 'static,
    H: FormHost,
    V: SuggestionView,
{
    pub fn new(field: SearchableField, source: Arc<S>, host: H, view: V) -> Self {
        let (tx, rx) = unbounded_channel();
        let timer_tx = tx.clone();
        let debouncer = Debouncer::new(field.config().debounce(), move |event: FieldEvent| {
            let _ = timer_tx.send(event);
        });
        Self {
            field,
            source,
            host,
            view,
            tx,
            rx,
            debouncer,
        }
    }

    /// Channel for delivering host events from elsewhere.
    pub fn sender(&self) -> UnboundedSender<FieldEvent> {
        self.tx.clone()
    }

    pub fn field(&self) -> &SearchableField {
        &self.field
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Handle one event now and start whatever work it calls for.
    pub fn dispatch(&mut self, event: FieldEvent) -> Result<()> {
        let directive = self.field.handle(event, &mut self.host, &mut self.view)?;
        match directive {
            Directive::None => {}
            Directive::Debounce { ticket } => self.debouncer.call(FieldEvent::Settled { ticket }),
            Directive::CancelDebounce => self.debouncer.cancel(),
            Directive::Fetch(request) => self.spawn_fetch(request),
        }
        Ok(())
    }

    /// Write `text` into the field as the user would, then report the input.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        let field = self.field.field().clone();
        self.host.set_value(&field, text);
        self.dispatch(FieldEvent::Input)
    }

    /// Wait for the next queued event and handle it.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn step(&mut self) -> Option<Result<()>> {
        let event = self.rx.recv().await?;
        Some(self.dispatch(event))
    }

    /// Handle events until `shutdown` fires, then hand the driver back.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> Self {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = self.rx.recv() => {
                    let Some(event) = event else { break };
                    if let Err(e) = self.dispatch(event) {
                        warn!(field = %self.field.field().name, "event handling failed: {e}");
                    }
                }
            }
        }
        self.debouncer.cancel();
        self
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch(&request).await;
            let _ = tx.send(FieldEvent::FetchCompleted {
                generation: request.generation,
                outcome,
            });
        });
    }
}
