use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use reqwest::Client;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{
        broadcast::{self, error::RecvError},
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        oneshot,
    },
};
use url::Url;

use crate::{
    api::ClassifierClient,
    config::AppConfig,
    controller::{ControllerDeps, EmailController, Event, NotificationKind},
    domain::Upload,
    infrastructure::{
        clipboard::SystemClipboard, directories::ResolvedPaths, notifier::TerminalNotifier,
        shutdown::Shutdown,
    },
    net::{Fetch, HttpFetcher},
    storage::LocalStorage,
    terminal::{self, Input, WorkerCommand},
    worker::{
        CacheStorage, ClientMessage, OfflineWorker, VersionReply, WorkerEvent, WorkerMessage,
        WorkerState,
    },
};

pub struct AutouApp {
    paths: ResolvedPaths,
    timezone: Tz,
    cache: Arc<CacheStorage>,
    worker: Arc<OfflineWorker>,
    notices: broadcast::Receiver<ClientMessage>,
    controller: EmailController,
    events: UnboundedSender<Event>,
    inbox: UnboundedReceiver<Event>,
    shutdown: Shutdown,
}

enum Flow {
    Continue,
    Redraw,
    Quit,
}

impl AutouApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let timezone: Tz = match config.timezone.parse() {
            Ok(tz) => tz,
            Err(err) => {
                tracing::warn!(timezone = %config.timezone, error = %err, "unknown timezone; using America/Sao_Paulo");
                chrono_tz::America::Sao_Paulo
            }
        };

        let http_client = Client::builder()
            .user_agent(format!("autou-client/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.api.timeout)
            .build()?;
        let network: Arc<dyn Fetch> =
            Arc::new(HttpFetcher::new(http_client, &config.api.base_url));

        let cache = match CacheStorage::load(&paths.cache_path) {
            Ok(cache) => Arc::new(cache),
            Err(err) => {
                tracing::warn!(
                    target: "worker",
                    error = %err,
                    path = %paths.cache_path.display(),
                    "cache snapshot unreadable; starting empty"
                );
                Arc::new(CacheStorage::new())
            }
        };

        let precache = config
            .cache
            .precache
            .iter()
            .map(|entry| {
                config
                    .api
                    .base_url
                    .join(entry)
                    .with_context(|| format!("invalid precache entry {entry}"))
            })
            .collect::<Result<Vec<Url>>>()?;

        let worker = Arc::new(OfflineWorker::new(
            cache.clone(),
            network,
            config.cache.cache_name(),
            precache,
            Arc::new(TerminalNotifier),
        ));
        let notices = worker.subscribe();
        let state = worker.register(config.cache.skip_waiting).await;
        tracing::info!(target: "worker", ?state, cache = %worker.cache_name(), "worker registered");
        if state == WorkerState::Waiting {
            worker
                .dispatch(WorkerEvent::Message {
                    data: serde_json::to_value(WorkerMessage::UpdateFound)?,
                    port: None,
                })
                .await;
        }

        let transport: Arc<dyn Fetch> = worker.clone();
        let classifier = ClassifierClient::new(transport, config.api.process_url()?);
        let storage = Arc::new(LocalStorage::open(paths.storage_path.clone())?);

        let (events, inbox) = mpsc::unbounded_channel();
        let controller = EmailController::new(
            config.ui.clone(),
            ControllerDeps {
                classifier,
                storage,
                clipboard: Arc::new(SystemClipboard::spawn()?),
            },
            events.clone(),
        );

        Ok(Self {
            paths,
            timezone,
            cache,
            worker,
            notices,
            controller,
            events,
            inbox,
            shutdown,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        tracing::info!("AutoU client started");
        print_block(terminal::HELP);

        let mut shutdown_listener = self.shutdown.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut drawn = None;

        loop {
            if drawn != Some(self.controller.revision()) {
                print_block(&terminal::render_view(&self.controller));
                drawn = Some(self.controller.revision());
            }
            if !stdin_open && !self.controller.is_loading() {
                tracing::info!("input closed; leaving");
                break;
            }

            tokio::select! {
                _ = shutdown_listener.notified() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                Some(event) = self.inbox.recv() => self.controller.handle(event),
                notice = self.notices.recv() => match notice {
                    Ok(ClientMessage::UpdateAvailable { message }) => {
                        self.controller.handle(Event::Notify {
                            message,
                            kind: NotificationKind::Info,
                        });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: "worker", skipped, "missed worker notices");
                    }
                    Err(RecvError::Closed) => {
                        self.notices = self.worker.subscribe();
                    }
                },
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match self.on_line(&line).await {
                        Flow::Continue => {}
                        Flow::Redraw => drawn = None,
                        Flow::Quit => break,
                    },
                    Ok(None) => stdin_open = false,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to read stdin");
                        stdin_open = false;
                    }
                },
            }
        }

        if !shutdown_listener.is_triggered() {
            self.shutdown.trigger();
        }
        if let Err(err) = self.cache.save(&self.paths.cache_path) {
            tracing::warn!(target: "worker", error = %err, "failed to save cache snapshot");
        }
        tracing::info!("AutoU client stopped");
        Ok(())
    }

    async fn on_line(&mut self, line: &str) -> Flow {
        let input = match terminal::parse_line(line) {
            Ok(input) => input,
            Err(err) => {
                self.notify(err.to_string(), NotificationKind::Error);
                return Flow::Continue;
            }
        };

        match input {
            Input::Text(text) => self.controller.handle(Event::AppendText(text)),
            Input::Command(command) => self.controller.handle(command.into_event()),
            Input::AttachFile(path) => self.attach_file(path).await,
            Input::Worker(command) => self.on_worker_command(command).await,
            Input::History => {
                print_block(&terminal::render_history(
                    self.controller.history(),
                    &self.timezone,
                ));
            }
            Input::Show => return Flow::Redraw,
            Input::Help => print_block(terminal::HELP),
            Input::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Reads the file before the next line is taken, so a following
    /// `:submit` always sees it.
    async fn attach_file(&mut self, path: PathBuf) {
        let event = match read_upload(&path).await {
            Ok(upload) => Event::FileSelected(upload),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read file");
                Event::Notify {
                    message: format!("Could not read {}: {err}", path.display()),
                    kind: NotificationKind::Error,
                }
            }
        };
        self.controller.handle(event);
    }

    async fn on_worker_command(&mut self, command: WorkerCommand) {
        self.worker.dispatch(worker_event(command, &self.events)).await;
        tracing::debug!(target: "worker", state = ?self.worker.state(), "worker command handled");
    }

    fn notify(&mut self, message: String, kind: NotificationKind) {
        self.controller.handle(Event::Notify { message, kind });
    }
}

async fn read_upload(path: &Path) -> io::Result<Upload> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload::new(name, bytes))
}

/// Translates a `:sw` command into the event the worker receives. A version
/// request gets a reply port whose answer comes back as a notification.
fn worker_event(command: WorkerCommand, events: &UnboundedSender<Event>) -> WorkerEvent {
    match command {
        WorkerCommand::Install => WorkerEvent::Install,
        WorkerCommand::Activate => WorkerEvent::Activate,
        WorkerCommand::SkipWaiting => post(WorkerMessage::SkipWaiting, None),
        WorkerCommand::UpdateFound => post(WorkerMessage::UpdateFound, None),
        WorkerCommand::Version => {
            let (port, reply) = oneshot::channel::<VersionReply>();
            let events = events.clone();
            tokio::spawn(async move {
                if let Ok(reply) = reply.await {
                    let _ = events.send(Event::Notify {
                        message: format!("Worker version: {}", reply.version),
                        kind: NotificationKind::Info,
                    });
                }
            });
            post(WorkerMessage::GetVersion, Some(port))
        }
        WorkerCommand::Push(data) => WorkerEvent::Push { data },
        WorkerCommand::Click(action) => WorkerEvent::NotificationClick { action },
        WorkerCommand::Sync(tag) => WorkerEvent::Sync { tag },
    }
}

fn post(message: WorkerMessage, port: Option<oneshot::Sender<VersionReply>>) -> WorkerEvent {
    WorkerEvent::Message {
        data: serde_json::json!(message),
        port,
    }
}

fn print_block(text: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{text}").and_then(|_| stdout.flush()) {
        tracing::warn!(error = %err, "failed to write to stdout");
    }
}
