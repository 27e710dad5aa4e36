use std::sync::mpsc::Sender;

use crate::app::{App, Message, Model, ToastLevel};
use crate::document::Startup;
use crate::remote::{LoadError, ReportFailure};
use crate::store::PersistedState;

/// Sends load failures back to the event loop as error toasts.
struct ChannelReporter {
    tx: Sender<Message>,
}

impl ReportFailure for ChannelReporter {
    fn report(&self, error: &LoadError) {
        let _ = self
            .tx
            .send(Message::Notify(ToastLevel::Error, failure_notice(error)));
    }
}

/// User-facing text for a failed load.
pub(super) fn failure_notice(error: &LoadError) -> String {
    match error {
        LoadError::NotFound => "Gist not found. Check the URL or ID.".to_string(),
        LoadError::NoFiles | LoadError::FileUnreadable | LoadError::Decode(_) => {
            format!("Gist content could not be read: {error}")
        }
        _ => format!("Failed to load Gist: {error}"),
    }
}

impl App {
    pub(super) fn handle_message_side_effects(&self, model: &mut Model, msg: &Message) {
        match msg {
            Message::RequestLoad => {
                if let Some(source) = model.load_request.take() {
                    self.spawn_load(source, false);
                }
            }
            Message::Print => {
                if let Some(job) = model.print_request.take() {
                    let tx = self.tx.clone();
                    tracing::info!(filename = %job.document.filename, "preparing to print");
                    self.printer.print(
                        job,
                        Box::new(move |outcome| {
                            let _ = tx.send(Message::AfterPrint(outcome));
                        }),
                    );
                }
            }
            _ => {}
        }
    }

    /// Run startup against the store, fetching the default gist if nothing was
    /// persisted, then queue any gist named on the command line.
    pub(super) fn start(&self, model: &mut Model, state: &PersistedState) {
        if model.begin_startup(state) == Startup::FetchDefault {
            if let Some(default_gist) = &self.default_gist {
                self.spawn_load(default_gist.clone(), true);
            } else {
                tracing::debug!("no default gist configured; showing placeholder");
                self.dispatch(model, Message::StartupLoaded(None));
            }
        }
        if let Some(gist) = &self.initial_gist {
            model.url_field.set_text(gist);
            self.dispatch(model, Message::RequestLoad);
        }
    }

    /// Apply a message and run its side effects.
    pub(super) fn dispatch(&self, model: &mut Model, msg: Message) {
        let side_msg = msg.clone();
        *model = crate::app::update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, &side_msg);
    }

    /// Apply every message workers have sent so far. Returns whether any arrived.
    pub(super) fn drain_worker_messages(&self, model: &mut Model) -> bool {
        let mut any = false;
        while let Ok(msg) = self.rx.try_recv() {
            tracing::debug!(?msg, "worker message");
            self.dispatch(model, msg);
            any = true;
        }
        any
    }

    fn spawn_load(&self, source: String, startup: bool) {
        let loader = self.loader.clone();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let reporter = ChannelReporter { tx: tx.clone() };
            let result = loader.load(&source, &reporter);
            let msg = if startup {
                Message::StartupLoaded(result)
            } else {
                Message::GistLoaded { source, result }
            };
            let _ = tx.send(msg);
        });
    }
}
