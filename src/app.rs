use crate::assistant::runner::AssistantRunner;
use crate::assistant::typing::TaskHandle;
use crate::chat::{Author, Message, TurnId};
use crate::event::AppEvent;
use crate::preview::server::PreviewPublisher;
use crate::preview::PreviewDocument;
use crate::project::tree::{self, TreeNode};
use crate::project::FileKind;
use crate::studio::{Notice, NoticeLevel, Studio, TurnError, GREETING};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Chat,
    Preview,
    Code,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Chat, Tab::Preview, Tab::Code];

    fn label(self) -> &'static str {
        match self {
            Self::Chat => "AI Chat",
            Self::Preview => "Preview",
            Self::Code => "Code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    Disabled,
    Starting,
    Listening(SocketAddr),
    Failed(String),
}

pub struct SiteCraftApp {
    rx: Receiver<AppEvent>,
    studio: Studio,
    runner: AssistantRunner,
    request_task: Option<TaskHandle>,
    typing_task: Option<TaskHandle>,
    publisher: Option<PreviewPublisher>,
    preview_status: PreviewStatus,
    preview_document: PreviewDocument,
    last_loaded_revision: Option<u64>,
    open_browser_on_start: bool,
    active_tab: Tab,
    input_buffer: String,
    editor_buffer: String,
    editor_path: String,
    editor_revision: u64,
    new_file_buffer: String,
    notices: Vec<(Notice, Instant)>,
    diagnostics_log: Vec<String>,
    theme: Theme,
}

impl SiteCraftApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        runner: AssistantRunner,
        publisher: Option<PreviewPublisher>,
        open_browser_on_start: bool,
    ) -> Self {
        let studio = Studio::default();
        let preview_status = if publisher.is_some() {
            PreviewStatus::Starting
        } else {
            PreviewStatus::Disabled
        };
        let mut app = Self {
            rx,
            studio,
            runner,
            request_task: None,
            typing_task: None,
            publisher,
            preview_status,
            preview_document: PreviewDocument::default(),
            last_loaded_revision: None,
            open_browser_on_start,
            active_tab: Tab::Chat,
            input_buffer: String::new(),
            editor_buffer: String::new(),
            editor_path: String::new(),
            editor_revision: 0,
            new_file_buffer: String::new(),
            notices: Vec::new(),
            diagnostics_log: Vec::new(),
            theme: Theme::default(),
        };
        app.log_diagnostic(format!("responder: {}", app.runner.responder_name()));
        app.sync_preview();
        app
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn submit_message(&mut self) {
        match self.studio.submit(&self.input_buffer) {
            Ok(submission) => {
                if let Some(turn) = submission.interrupted {
                    self.typing_task = None;
                    debug!(%turn, "typing interrupted");
                }
                self.request_task = Some(self.runner.request(
                    submission.turn,
                    submission.message,
                    submission.files,
                ));
                self.input_buffer.clear();
            }
            Err(err) => debug!(error = %err, "message not sent"),
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ResponseReady { turn, reply } => match self.studio.resolve(turn, reply) {
                Ok(text) => {
                    self.request_task = None;
                    self.typing_task = Some(self.runner.type_reply(turn, text));
                    self.log_diagnostic(format!("{turn}: reply ready"));
                }
                Err(err) => debug!(error = %err, "ignoring reply"),
            },
            AppEvent::ResponseFailed { turn, message } => {
                self.request_task = None;
                match self.studio.fail(turn, &message) {
                    Ok(()) => self.log_diagnostic(format!("{turn}: {message}")),
                    Err(err) => debug!(error = %err, "ignoring failure"),
                }
            }
            AppEvent::StreamDelta { turn, text } => {
                if let Err(err) = self.studio.stream_delta(turn, &text) {
                    self.handle_turn_error(err);
                }
            }
            AppEvent::StreamEnd { turn } => match self.studio.stream_end(turn) {
                Ok(()) => self.typing_task = None,
                Err(err) => self.handle_turn_error(err),
            },
            AppEvent::PreviewServerStarted(addr) => {
                self.preview_status = PreviewStatus::Listening(addr);
                self.log_diagnostic(format!("preview sandbox at http://{addr}/"));
                if self.open_browser_on_start {
                    self.open_browser_on_start = false;
                    self.open_preview_in_browser();
                }
            }
            AppEvent::PreviewServerFailed(message) => {
                self.log_diagnostic(format!("preview server: {message}"));
                self.studio
                    .notify(NoticeLevel::Error, "Preview unavailable", message.clone());
                self.preview_status = PreviewStatus::Failed(message);
            }
            AppEvent::PreviewLoaded { revision } => {
                self.last_loaded_revision = Some(revision);
            }
        }
    }

    fn handle_turn_error(&mut self, err: TurnError) {
        match err {
            TurnError::Stale(_) => debug!(error = %err, "ignoring stale event"),
            TurnError::Malformed(_) => {
                warn!(error = %err, "in-flight message discarded");
                self.request_task = None;
                self.typing_task = None;
                self.log_diagnostic(err.to_string());
            }
        }
    }

    /// Recomposes the preview when the file store changed since the last frame.
    fn sync_preview(&mut self) {
        let revision = self.studio.revision();
        if self.preview_document.revision == revision {
            return;
        }
        self.preview_document = PreviewDocument::from_store(self.studio.files(), revision);
        if let Some(publisher) = &self.publisher {
            publisher.publish(self.preview_document.clone());
        }
    }

    fn open_preview_in_browser(&mut self) {
        let PreviewStatus::Listening(addr) = &self.preview_status else {
            return;
        };
        let url = format!("http://{addr}/");
        info!(%url, "opening preview");
        if let Err(err) = open::that(&url) {
            warn!(error = %err, "failed to launch browser");
            self.studio.notify(
                NoticeLevel::Error,
                "Could not open browser",
                format!("Visit {url} manually ({err})"),
            );
        }
    }

    fn collect_notices(&mut self) {
        let now = Instant::now();
        for notice in self.studio.take_notices() {
            self.notices.push((notice, now));
        }
        self.notices
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < NOTICE_TTL);
    }

    fn render_tab_bar(&mut self, ctx: &egui::Context) {
        let fill = self.theme.tab_bar;
        egui::TopBottomPanel::top("tab_bar")
            .frame(egui::Frame::new().fill(fill).inner_margin(egui::Margin::same(6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for tab in Tab::ALL {
                        let text = RichText::new(tab.label()).strong();
                        if ui.selectable_label(self.active_tab == tab, text).clicked() {
                            self.active_tab = tab;
                        }
                    }
                });
            });
    }

    fn render_notices(&self, ctx: &egui::Context) {
        if self.notices.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .show(ctx, |ui| {
                for (notice, _) in &self.notices {
                    self.theme.notice_frame(notice.level).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.strong(&notice.title);
                        ui.label(&notice.body);
                    });
                }
            });
    }

    fn render_message(ui: &mut egui::Ui, theme: &Theme, message: &Message) {
        let max_width = ui.available_width() * 0.8;
        let layout = match message.author {
            Author::User => egui::Layout::right_to_left(egui::Align::TOP),
            Author::Assistant => egui::Layout::left_to_right(egui::Align::TOP),
        };
        ui.with_layout(layout, |ui| {
            theme.bubble_frame(message.author).show(ui, |ui| {
                ui.set_max_width(max_width);
                if message.is_streaming && message.text.is_empty() {
                    ui.label(RichText::new("AI is thinking...").italics().color(theme.text_muted));
                } else {
                    ui.label(format!("{}: {}", message.author.label(), message.text));
                }
            });
        });
    }

    fn render_chat(&mut self, ui: &mut egui::Ui) {
        let composer_height = 96.0;
        let transcript_height = (ui.available_height() - composer_height).max(120.0);
        let theme = self.theme.clone();

        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let greeting = Message {
                    author: Author::Assistant,
                    text: GREETING.to_string(),
                    is_streaming: false,
                    turn: TurnId(0),
                };
                Self::render_message(ui, &theme, &greeting);
                for message in self.studio.log().messages() {
                    Self::render_message(ui, &theme, message);
                }
            });

        ui.separator();
        egui::CollapsingHeader::new("Diagnostics")
            .default_open(false)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("diagnostics_log")
                    .max_height(90.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &self.diagnostics_log {
                            ui.label(RichText::new(entry).small());
                        }
                    });
            });

        let processing = self.studio.is_processing();
        let input_id = ui.make_persistent_id("chat_input");
        let has_focus = ui.memory(|memory| memory.has_focus(input_id));
        let mut send_now = has_focus
            && ui.input_mut(|input| {
                !input.modifiers.shift && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
            });

        ui.horizontal(|ui| {
            let input_width = (ui.available_width() - 80.0).max(120.0);
            ui.add_sized(
                [input_width, 48.0],
                egui::TextEdit::multiline(&mut self.input_buffer)
                    .id(input_id)
                    .desired_rows(2)
                    .hint_text("Describe your website..."),
            );
            send_now |= ui
                .add_enabled(!processing, egui::Button::new("Send"))
                .clicked();
        });

        if send_now && !processing {
            self.submit_message();
        }
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        let mut open_clicked = false;
        ui.horizontal(|ui| {
            match &self.preview_status {
                PreviewStatus::Disabled => {
                    ui.label(RichText::new("Sandbox server disabled").color(self.theme.text_muted));
                }
                PreviewStatus::Starting => {
                    ui.label(RichText::new("Starting sandbox...").color(self.theme.text_muted));
                }
                PreviewStatus::Listening(addr) => {
                    ui.label(RichText::new(format!("Sandbox: http://{addr}/")).color(self.theme.success));
                }
                PreviewStatus::Failed(message) => {
                    ui.label(RichText::new(format!("Sandbox failed: {message}")).color(self.theme.danger));
                }
            }
            ui.separator();
            let listening = matches!(self.preview_status, PreviewStatus::Listening(_));
            open_clicked = ui
                .add_enabled(listening, egui::Button::new("Open in browser"))
                .clicked();
            ui.separator();
            ui.label(format!("revision {}", self.preview_document.revision));
            match self.last_loaded_revision {
                Some(loaded) if loaded == self.preview_document.revision => {
                    ui.label(RichText::new("loaded").color(self.theme.success));
                }
                Some(loaded) => {
                    ui.label(
                        RichText::new(format!("browser has revision {loaded}, reload to update"))
                            .color(self.theme.text_muted),
                    );
                }
                None => {}
            }
        });
        ui.separator();

        let mut document = self.preview_document.html.as_str();
        ScrollArea::both()
            .id_salt("preview_document")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut document)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });

        if open_clicked {
            self.open_preview_in_browser();
        }
    }

    fn render_tree_nodes(
        ui: &mut egui::Ui,
        theme: &Theme,
        nodes: &[TreeNode],
        selected: &str,
        clicked: &mut Option<String>,
    ) {
        for node in nodes {
            match node {
                TreeNode::Folder { name, children } => {
                    egui::CollapsingHeader::new(name.as_str())
                        .id_salt(("folder", name.as_str(), children.len()))
                        .default_open(true)
                        .show(ui, |ui| {
                            Self::render_tree_nodes(ui, theme, children, selected, clicked);
                        });
                }
                TreeNode::File { name, path } => {
                    let kind = FileKind::from_path(path);
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(kind.badge())
                                .monospace()
                                .small()
                                .color(theme.kind_color(kind)),
                        );
                        if ui.selectable_label(path == selected, name.as_str()).clicked() {
                            *clicked = Some(path.clone());
                        }
                    });
                }
            }
        }
    }

    fn render_code(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme.clone();
        let mut clicked: Option<String> = None;
        let mut create_clicked = false;

        egui::SidePanel::left("file_tree")
            .resizable(true)
            .default_width(240.0)
            .frame(theme.sidebar_frame())
            .show_inside(ui, |ui| {
                ui.strong("Project Files");
                ui.separator();
                let nodes = tree::build(self.studio.files().list());
                ScrollArea::vertical()
                    .id_salt("file_tree_scroll")
                    .max_height((ui.available_height() - 80.0).max(80.0))
                    .show(ui, |ui| {
                        Self::render_tree_nodes(
                            ui,
                            &theme,
                            &nodes,
                            self.studio.selected_path(),
                            &mut clicked,
                        );
                    });
                ui.separator();
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_file_buffer)
                            .desired_width(150.0)
                            .hint_text("new/file.html"),
                    );
                    create_clicked = ui
                        .add_enabled(!self.studio.is_processing(), egui::Button::new("Add"))
                        .clicked();
                });
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Project Files").small().color(theme.text_muted));
                    ui.label(
                        RichText::new(format!("{} files", self.studio.files().len()))
                            .small()
                            .color(theme.text_muted),
                    );
                });
            });

        if let Some(path) = clicked {
            if let Err(err) = self.studio.select_file(&path) {
                self.studio
                    .notify(NoticeLevel::Error, "File unavailable", err.to_string());
            }
        }
        if create_clicked {
            match self.studio.create_file(&self.new_file_buffer) {
                Ok(path) => {
                    self.log_diagnostic(format!("created {path}"));
                    self.new_file_buffer.clear();
                }
                Err(err) => self
                    .studio
                    .notify(NoticeLevel::Error, "Cannot create file", err.to_string()),
            }
        }

        if self.editor_path != self.studio.selected_path()
            || self.editor_revision != self.studio.revision()
        {
            self.editor_path = self.studio.selected_path().to_string();
            self.editor_buffer = self.studio.selected_content().to_string();
            self.editor_revision = self.studio.revision();
        }

        let processing = self.studio.is_processing();
        let language = FileKind::from_path(&self.editor_path).language();
        egui::CentralPanel::default().show_inside(ui, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&self.editor_path);
                ui.label(RichText::new(language).color(theme.text_muted));
                if processing {
                    ui.label(RichText::new("locked while the AI is working").color(theme.text_muted));
                }
            });
            ui.separator();
            let mut changed = false;
            ScrollArea::both()
                .id_salt("code_editor")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    changed = ui
                        .add_enabled(
                            !processing && !self.editor_path.is_empty(),
                            egui::TextEdit::multiline(&mut self.editor_buffer)
                                .code_editor()
                                .desired_rows(30)
                                .desired_width(f32::INFINITY),
                        )
                        .changed();
                });
            if changed {
                match self.studio.edit_selected(self.editor_buffer.clone()) {
                    Ok(()) => self.editor_revision = self.studio.revision(),
                    Err(err) => {
                        self.editor_buffer = self.studio.selected_content().to_string();
                        self.studio
                            .notify(NoticeLevel::Error, "Edit rejected", err.to_string());
                    }
                }
            }
        });
    }
}

impl eframe::App for SiteCraftApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.render_tab_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.active_tab {
            Tab::Chat => self.render_chat(ui),
            Tab::Preview => self.render_preview(ui),
            Tab::Code => self.render_code(ui),
        });

        self.sync_preview();
        self.collect_notices();
        self.render_notices(ctx);

        let busy = self.studio.is_processing() || self.studio.is_typing();
        let next_frame = if busy {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(250)
        };
        ctx.request_repaint_after(next_frame);
    }
}
