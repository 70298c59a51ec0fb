use iced::task;
use iced::widget::{
    button, column, container, image, markdown, progress_bar, row, scrollable, text, text_input,
    Space,
};
use iced::{
    application, Background, Border, Color, Element, Length, Shadow, Size, Subscription, Task,
    Theme,
};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::chat::ChatRole;
use crate::app::{AppTab, OperationKind, StudyApp, Ticket};
use crate::config_store::FileConfigStore;
use crate::error::AppError;
use crate::interfaces::assistant::{
    GroundedAnswer, ImageInput, StudyAssistant, NOTE_AUDIT_INSTRUCTION,
};
use crate::quiz::session::OptionStatus;
use crate::quiz::sync::{SyncOutcome, WebhookSyncClient};
use crate::syllabus::SyllabusTrack;

const SIDEBAR_MIN_WIDTH: f32 = 900.0;
const INITIAL_WIDTH: f32 = 1280.0;

const HOW_IT_WORKS: [&str; 4] = [
    "AI Agent generates current affairs MCQs daily.",
    "Rows are added to Google Sheets (Pending Approval).",
    "You check the 'Approved' checkbox in the Sheet.",
    "n8n filters these rows and serves them to this URL.",
];

const FEATURE_CARDS: [(&str, &str, &str); 3] = [
    (
        "⚡",
        "n8n Live Feed",
        "MCQs are fetched via your Google Sheets Webhook in real-time.",
    ),
    (
        "🔍",
        "Search Verify",
        "Use Gemini AI to verify news topics generated by your AI Agent.",
    ),
    (
        "📸",
        "Note Audit",
        "Scan physical materials to check alignment with UPSC/BPSC syllabus.",
    ),
];

#[derive(Clone)]
pub struct IcedUiLaunchConfig {
    pub config_path: PathBuf,
    pub seed_webhook_url: Option<String>,
    pub sync_client: Arc<WebhookSyncClient>,
    pub assistant: Arc<dyn StudyAssistant>,
}

#[derive(Clone, Debug)]
pub struct PickedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

struct StudyIcedApp {
    app: StudyApp,
    sync_client: Arc<WebhookSyncClient>,
    assistant: Arc<dyn StudyAssistant>,
    window_width: f32,
    search_task: Option<task::Handle>,
    audit_task: Option<task::Handle>,
    chat_markdown: Vec<Vec<markdown::Item>>,
    report_markdown: Vec<markdown::Item>,
    preview: Option<image::Handle>,
}

#[derive(Clone, Debug)]
enum Message {
    TabSelected(AppTab),
    WindowResized(f32),
    WebhookUrlChanged(String),
    ToggleAutoSync,
    SyncPressed,
    SyncFinished(Ticket, Result<SyncOutcome, AppError>),
    OptionSelected(usize),
    NextQuestion,
    SearchQueryChanged(String),
    SearchSubmitted,
    SearchFinished(Ticket, Result<GroundedAnswer, AppError>),
    OpenSource(String),
    MarkdownLinkClicked(String),
    PickImagePressed,
    ImagePicked(Option<Result<PickedImage, AppError>>),
    DiscardImage,
    StartAnalysisPressed,
    AnalysisFinished(Ticket, Result<String, AppError>),
    SyllabusToggled(SyllabusTrack, usize),
}

pub fn launch_ui(config: IcedUiLaunchConfig) -> iced::Result {
    let boot_config = config.clone();
    application(
        move || {
            let mut state = StudyIcedApp::new(boot_config.clone());
            let boot = state.start_sync(true);
            (state, boot)
        },
        update,
        view,
    )
    .title(app_title)
    .theme(app_theme)
    .window(iced::window::Settings {
        size: Size::new(INITIAL_WIDTH, 860.0),
        min_size: Some(Size::new(420.0, 640.0)),
        ..Default::default()
    })
    .subscription(subscription)
    .run()
}

fn app_title(_state: &StudyIcedApp) -> String {
    "EducateUrSelf".to_string()
}

fn app_theme(_state: &StudyIcedApp) -> Theme {
    Theme::Dark
}

fn subscription(_state: &StudyIcedApp) -> Subscription<Message> {
    iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size.width))
}

impl StudyIcedApp {
    fn new(flags: IcedUiLaunchConfig) -> Self {
        let store = FileConfigStore::new(flags.config_path);
        info!(path = %store.path().display(), "loading workflow config");
        let mut app = StudyApp::new(Box::new(store));
        if let Some(url) = flags.seed_webhook_url.as_deref() {
            app.seed_webhook_url(url);
        }
        Self {
            app,
            sync_client: flags.sync_client,
            assistant: flags.assistant,
            window_width: INITIAL_WIDTH,
            search_task: None,
            audit_task: None,
            chat_markdown: vec![],
            report_markdown: vec![],
            preview: None,
        }
    }

    fn start_sync(&mut self, startup: bool) -> Task<Message> {
        let started = if startup {
            self.app.startup_sync()
        } else {
            self.app.begin_sync()
        };
        let Some((ticket, url)) = started else {
            return Task::none();
        };
        let client = Arc::clone(&self.sync_client);
        Task::perform(async move { client.sync(&url).await }, move |result| {
            Message::SyncFinished(ticket, result)
        })
    }

    fn abort_cancelled(&mut self, tickets: Vec<Ticket>) {
        for ticket in tickets {
            let handle = match ticket.kind() {
                OperationKind::Search => self.search_task.take(),
                OperationKind::ImageAudit => self.audit_task.take(),
                OperationKind::Sync => None,
            };
            if let Some(handle) = handle {
                debug!(kind = ?ticket.kind(), "aborting cancelled task");
                handle.abort();
            }
        }
    }

    fn refresh_chat_markdown(&mut self) {
        let history = self.app.chat().history();
        for message in &history[self.chat_markdown.len().min(history.len())..] {
            self.chat_markdown.push(parse_markdown_items(&message.content));
        }
    }

    fn clear_audit_view(&mut self) {
        self.report_markdown.clear();
        self.preview = None;
    }
}

fn update(state: &mut StudyIcedApp, message: Message) -> Task<Message> {
    match message {
        Message::TabSelected(tab) => {
            let cancelled = state.app.select_tab(tab);
            state.abort_cancelled(cancelled);
            state.refresh_chat_markdown();
            Task::none()
        }
        Message::WindowResized(width) => {
            state.window_width = width;
            Task::none()
        }
        Message::WebhookUrlChanged(url) => {
            state.app.set_webhook_url(url);
            Task::none()
        }
        Message::ToggleAutoSync => {
            state.app.toggle_auto_sync();
            Task::none()
        }
        Message::SyncPressed => state.start_sync(false),
        Message::SyncFinished(ticket, result) => {
            state.app.finish_sync(ticket, result);
            Task::none()
        }
        Message::OptionSelected(option) => {
            let outcome = state.app.select_option(option);
            debug!(option, ?outcome, "option selected");
            Task::none()
        }
        Message::NextQuestion => {
            state.app.next_question();
            Task::none()
        }
        Message::SearchQueryChanged(query) => {
            state.app.set_search_query(query);
            Task::none()
        }
        Message::SearchSubmitted => {
            let Some((ticket, query)) = state.app.submit_search() else {
                return Task::none();
            };
            state.refresh_chat_markdown();
            let assistant = Arc::clone(&state.assistant);
            let (task, handle) = Task::perform(
                async move { assistant.grounded_search(&query).await },
                move |result| Message::SearchFinished(ticket, result),
            )
            .abortable();
            state.search_task = Some(handle);
            task
        }
        Message::SearchFinished(ticket, result) => {
            if state.app.finish_search(ticket, result) {
                state.search_task = None;
                state.refresh_chat_markdown();
            }
            Task::none()
        }
        Message::OpenSource(uri) | Message::MarkdownLinkClicked(uri) => {
            if let Err(err) = open_uri_best_effort(&uri) {
                warn!(uri, error = %err, "failed to open link");
            }
            Task::none()
        }
        Message::PickImagePressed => Task::perform(pick_image(), Message::ImagePicked),
        Message::ImagePicked(None) => Task::none(),
        Message::ImagePicked(Some(Ok(picked))) => {
            info!(file = %picked.file_name, bytes = picked.bytes.len(), "image selected");
            state.clear_audit_view();
            state.preview = Some(image::Handle::from_bytes(picked.bytes.clone()));
            let cancelled = state
                .app
                .select_image(picked.file_name, ImageInput::from_bytes(picked.bytes));
            state.abort_cancelled(cancelled.into_iter().collect());
            Task::none()
        }
        Message::ImagePicked(Some(Err(err))) => {
            state.app.fail_image_upload(&err);
            Task::none()
        }
        Message::DiscardImage => {
            let cancelled = state.app.discard_image();
            state.abort_cancelled(cancelled.into_iter().collect());
            state.clear_audit_view();
            Task::none()
        }
        Message::StartAnalysisPressed => {
            let Some((ticket, image)) = state.app.begin_audit() else {
                return Task::none();
            };
            let assistant = Arc::clone(&state.assistant);
            let (task, handle) = Task::perform(
                async move {
                    assistant
                        .analyze_image(&image, NOTE_AUDIT_INSTRUCTION)
                        .await
                },
                move |result| Message::AnalysisFinished(ticket, result),
            )
            .abortable();
            state.audit_task = Some(handle);
            task
        }
        Message::AnalysisFinished(ticket, result) => {
            if state.app.finish_audit(ticket, result) {
                state.audit_task = None;
                state.report_markdown = state
                    .app
                    .audit()
                    .report()
                    .map(parse_markdown_items)
                    .unwrap_or_default();
            }
            Task::none()
        }
        Message::SyllabusToggled(track, topic) => {
            state.app.toggle_syllabus(track, topic);
            Task::none()
        }
    }
}

fn uses_sidebar(width: f32) -> bool {
    width >= SIDEBAR_MIN_WIDTH
}

fn view(state: &StudyIcedApp) -> Element<'_, Message> {
    let body = container(scrollable(
        container(match state.app.active_tab() {
            AppTab::Dashboard => view_dashboard_tab(state),
            AppTab::Quiz => view_quiz_tab(state),
            AppTab::Workflow => view_workflow_tab(state),
            AppTab::CurrentAffairs => view_search_tab(state),
            AppTab::ImageAnalyze => view_image_tab(state),
            AppTab::Syllabus => view_syllabus_tab(state),
        })
        .padding([0, 12])
        .width(Length::Fill),
    ))
    .width(Length::Fill)
    .height(Length::Fill);

    let content: Element<'_, Message> = if uses_sidebar(state.window_width) {
        row![view_sidebar(state), body]
            .spacing(16)
            .height(Length::Fill)
            .into()
    } else {
        column![
            row![
                text("🎓").size(24),
                text("EducateUrSelf").size(22),
                Space::new().width(Length::Fill),
                text(state.app.active_tab().label()).size(14)
            ]
            .spacing(10)
            .align_y(iced::Alignment::Center),
            body,
            view_bottom_bar(state)
        ]
        .spacing(12)
        .height(Length::Fill)
        .into()
    };

    container(
        container(content)
            .padding(16)
            .height(Length::Fill)
            .style(glass_shell),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

fn nav_button(tab: AppTab, active: AppTab) -> iced::widget::Button<'static, Message> {
    button(text(format!("{}  {}", tab.icon(), tab.label())).size(14))
        .padding([10, 14])
        .style(if tab == active {
            iced::widget::button::primary
        } else {
            iced::widget::button::text
        })
        .on_press(Message::TabSelected(tab))
}

fn view_sidebar(state: &StudyIcedApp) -> Element<'_, Message> {
    let active = state.app.active_tab();
    let tabs = AppTab::all()
        .into_iter()
        .fold(column!().spacing(6), |col, tab| {
            col.push(nav_button(tab, active).width(Length::Fill))
        });

    container(
        column![
            row![text("🎓").size(28), text("EducateUrSelf").size(22)]
                .spacing(10)
                .align_y(iced::Alignment::Center),
            text("Civil services study desk").size(12),
            tabs,
            Space::new().height(Length::Fill),
            text(format!("build {}", env!("EDUCATEURSELF_GIT_SHA"))).size(11)
        ]
        .spacing(14)
        .height(Length::Fill),
    )
    .padding(14)
    .width(230)
    .height(Length::Fill)
    .style(glass_panel)
    .into()
}

fn view_bottom_bar(state: &StudyIcedApp) -> Element<'_, Message> {
    let active = state.app.active_tab();
    let tabs = AppTab::all()
        .into_iter()
        .fold(row!().spacing(4), |row, tab| {
            row.push(
                button(
                    column![text(tab.icon()).size(18), text(tab.label()).size(10)]
                        .align_x(iced::Alignment::Center),
                )
                .padding([6, 4])
                .width(Length::Fill)
                .style(if tab == active {
                    iced::widget::button::primary
                } else {
                    iced::widget::button::text
                })
                .on_press(Message::TabSelected(tab)),
            )
        });

    container(tabs)
        .padding(6)
        .width(Length::Fill)
        .style(glass_panel)
        .into()
}

fn glass_shell(_theme: &Theme) -> iced::widget::container::Style {
    iced::widget::container::Style {
        text_color: None,
        background: Some(Background::Color(Color::from_rgba(0.06, 0.09, 0.17, 0.70))),
        border: Border {
            radius: 18.0.into(),
            width: 1.0,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.10),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn glass_panel(_theme: &Theme) -> iced::widget::container::Style {
    iced::widget::container::Style {
        text_color: None,
        background: Some(Background::Color(Color::from_rgba(0.10, 0.14, 0.24, 0.58))),
        border: Border {
            radius: 16.0.into(),
            width: 1.0,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.12),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn glass_hero(_theme: &Theme) -> iced::widget::container::Style {
    iced::widget::container::Style {
        text_color: Some(Color::WHITE),
        background: Some(Background::Color(Color::from_rgba(0.19, 0.18, 0.55, 0.70))),
        border: Border {
            radius: 24.0.into(),
            width: 1.0,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.08),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn glass_user_bubble(_theme: &Theme) -> iced::widget::container::Style {
    iced::widget::container::Style {
        text_color: Some(Color::WHITE),
        background: Some(Background::Color(Color::from_rgba(0.31, 0.27, 0.90, 0.70))),
        border: Border {
            radius: 16.0.into(),
            width: 1.0,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.14),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn glass_bot_bubble(_theme: &Theme) -> iced::widget::container::Style {
    iced::widget::container::Style {
        text_color: Some(Color::WHITE),
        background: Some(Background::Color(Color::from_rgba(0.14, 0.18, 0.30, 0.80))),
        border: Border {
            radius: 16.0.into(),
            width: 1.0,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.14),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn error_line(message: &str) -> Element<'_, Message> {
    text(message).size(13).color([0.95, 0.45, 0.45]).into()
}

fn stat_card<'a>(value: String, label: &'a str) -> Element<'a, Message> {
    container(column![text(value).size(24), text(label).size(11)].spacing(4))
        .padding(14)
        .width(Length::Fill)
        .style(glass_panel)
        .into()
}

fn view_dashboard_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let session = state.app.session();
    let hero = container(
        column![
            text("● n8n Backend Connected").size(11).color([0.42, 0.90, 0.66]),
            text("Smart Workflow Preparation.").size(34),
            text(
                "Your AI Agent creates the MCQs, you approve them in Google Sheets, \
                 and they appear here live."
            )
            .size(15),
            row![
                button(text("Start Quiz"))
                    .padding([10, 20])
                    .style(iced::widget::button::primary)
                    .on_press(Message::TabSelected(AppTab::Quiz)),
                button(text("Configure API"))
                    .padding([10, 20])
                    .style(iced::widget::button::secondary)
                    .on_press(Message::TabSelected(AppTab::Workflow)),
            ]
            .spacing(12),
            row![
                stat_card(session.len().to_string(), "TOTAL MCQS"),
                stat_card(session.score().to_string(), "SCORE"),
                stat_card(state.app.last_sync_label().to_string(), "LAST N8N REFRESH"),
            ]
            .spacing(12)
        ]
        .spacing(16),
    )
    .padding(28)
    .width(Length::Fill)
    .style(glass_hero);

    let cards = FEATURE_CARDS
        .iter()
        .fold(row!().spacing(12), |row, (icon, title, body)| {
            row.push(
                container(
                    column![text(*icon).size(28), text(*title).size(18), text(*body).size(13)]
                        .spacing(8),
                )
                .padding(18)
                .width(Length::Fill)
                .style(glass_panel),
            )
        });

    column![hero, cards].spacing(18).into()
}

fn view_quiz_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let session = state.app.session();
    let question = session.current();

    let status = if session.questions().iter().any(|q| q.is_live) {
        "Live Workflow Active"
    } else {
        "Local Sample Set"
    };
    let header = container(
        row![
            column![text("STATUS").size(10), text(status).size(14)].spacing(2),
            Space::new().width(Length::Fill),
            if state.app.is_syncing() {
                text("Syncing...").size(12)
            } else {
                text("")
            },
            column![
                text("SCORE").size(10),
                text(session.score().to_string()).size(20)
            ]
            .spacing(2)
            .align_x(iced::Alignment::End)
        ]
        .spacing(16)
        .align_y(iced::Alignment::Center),
    )
    .padding(14)
    .style(glass_panel);

    let mut badges = row![text(session.position_label()).size(12)].spacing(10);
    if question.is_live {
        badges = badges.push(text("FROM N8N WORKFLOW").size(11).color([0.55, 0.60, 1.0]));
    }
    if let Some(date) = question.published_date.as_deref() {
        badges = badges.push(text(date).size(11));
    }

    let options = question.options.iter().enumerate().fold(
        column!().spacing(10),
        |col, (idx, option)| {
            let status = session.option_status(idx);
            let label = match status {
                OptionStatus::Correct => format!("✓  {option}"),
                OptionStatus::WrongPick => format!("✗  {option}"),
                OptionStatus::Selectable | OptionStatus::Dimmed => option.clone(),
            };
            col.push(
                button(text(label).size(15))
                    .padding([12, 16])
                    .width(Length::Fill)
                    .style(match status {
                        OptionStatus::Selectable => iced::widget::button::secondary,
                        OptionStatus::Correct => iced::widget::button::success,
                        OptionStatus::WrongPick => iced::widget::button::danger,
                        OptionStatus::Dimmed => iced::widget::button::text,
                    })
                    .on_press_maybe(
                        (status == OptionStatus::Selectable)
                            .then_some(Message::OptionSelected(idx)),
                    ),
            )
        },
    );

    let mut card = column![
        badges,
        text(question.question.clone()).size(22),
        options
    ]
    .spacing(16);

    if session.is_answered() {
        card = card.push(
            container(
                column![
                    text("Explanation").size(14),
                    text(question.explanation.clone()).size(14),
                    button(text("Next Question"))
                        .padding([10, 18])
                        .style(iced::widget::button::primary)
                        .on_press(Message::NextQuestion)
                ]
                .spacing(10),
            )
            .padding(16)
            .width(Length::Fill)
            .style(glass_bot_bubble),
        );
    }

    column![
        header,
        container(card).padding(20).style(glass_panel),
        progress_bar(0.0..=1.0, session.progress())
    ]
    .spacing(14)
    .into()
}

fn view_workflow_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let workflow = state.app.workflow();
    let syncing = state.app.is_syncing();

    let mut url_panel = column![
        text("N8N WEBHOOK URL (PRODUCTION)").size(11),
        row![
            text_input("https://your-n8n.com/webhook/...", &workflow.webhook_url)
                .on_input(Message::WebhookUrlChanged)
                .on_submit(Message::SyncPressed)
                .padding(12)
                .width(Length::Fill),
            button(if syncing { "Syncing..." } else { "Test Connection" })
                .padding([10, 16])
                .style(iced::widget::button::primary)
                .on_press_maybe((!syncing).then_some(Message::SyncPressed)),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center)
    ]
    .spacing(10);

    if let Some(err) = state.app.sync_error() {
        url_panel = url_panel.push(error_line(err));
    } else if let Some(verified) = state.app.connection_status() {
        url_panel = url_panel.push(text(verified).size(13).color([0.42, 0.90, 0.66]));
    }
    if let Some(notice) = state.app.sync_notice() {
        url_panel = url_panel.push(text(notice).size(13).color([0.98, 0.80, 0.40]));
    }
    if let Some(err) = state.app.persist_error() {
        url_panel = url_panel.push(error_line(err));
    }

    let sync_settings = container(
        column![
            text("Sync Settings").size(16),
            row![
                text("Auto-sync on startup").size(13),
                Space::new().width(Length::Fill),
                button(if workflow.is_auto_sync { "ON" } else { "OFF" })
                    .padding([6, 14])
                    .style(if workflow.is_auto_sync {
                        iced::widget::button::primary
                    } else {
                        iced::widget::button::secondary
                    })
                    .on_press(Message::ToggleAutoSync)
            ]
            .align_y(iced::Alignment::Center)
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .style(glass_panel);

    let schema = container(
        column![
            text("n8n Node Schema").size(16),
            text(
                "Ensure your n8n Webhook returns a JSON array with properties: \
                 question, options[], correctAnswer."
            )
            .size(12)
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .style(glass_panel);

    let steps = HOW_IT_WORKS.iter().enumerate().fold(
        column![text("How it works:").size(16)].spacing(10),
        |col, (idx, step)| {
            col.push(
                row![text(format!("{}", idx + 1)).size(12), text(*step).size(13)]
                    .spacing(12)
                    .align_y(iced::Alignment::Center),
            )
        },
    );

    column![
        text("⚙  Workflow Configuration").size(24),
        container(url_panel).padding(18).style(glass_panel),
        row![sync_settings, schema].spacing(12),
        steps
    ]
    .spacing(18)
    .into()
}

fn view_search_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let chat = state.app.chat();

    let list: Element<'_, Message> = if chat.history().is_empty() {
        container(
            column![
                text("🌍").size(64),
                text("Search Grounding Enabled").size(20),
                text("Verify any claim from your n8n workflow news topics.").size(13)
            ]
            .spacing(8)
            .align_x(iced::Alignment::Center),
        )
        .padding(40)
        .center_x(Length::Fill)
        .into()
    } else {
        chat.history()
            .iter()
            .zip(state.chat_markdown.iter())
            .fold(column!().spacing(12).width(Length::Fill), |col, (msg, items)| {
                let mut bubble_body = column![markdown::view(
                    items.iter(),
                    markdown_render_settings()
                )
                .map(Message::MarkdownLinkClicked)]
                .spacing(8);
                if !msg.sources.is_empty() {
                    let chips = msg.sources.iter().fold(row!().spacing(6), |row, source| {
                        row.push(
                            button(text(source.label().to_uppercase()).size(10))
                                .padding([4, 10])
                                .style(iced::widget::button::secondary)
                                .on_press(Message::OpenSource(source.uri.clone())),
                        )
                    });
                    bubble_body = bubble_body.push(
                        scrollable(chips).direction(
                            iced::widget::scrollable::Direction::Horizontal(
                                iced::widget::scrollable::Scrollbar::default(),
                            ),
                        ),
                    );
                }
                let bubble = container(bubble_body)
                    .padding(14)
                    .max_width(720)
                    .style(match msg.role {
                        ChatRole::User => glass_user_bubble,
                        ChatRole::Assistant => glass_bot_bubble,
                    });
                col.push(match msg.role {
                    ChatRole::User => row![Space::new().width(Length::Fill), bubble],
                    ChatRole::Assistant => row![bubble, Space::new().width(Length::Fill)],
                })
            })
            .into()
    };

    let indicator = if chat.is_searching() {
        text("Consulting Search Grounding...").size(12)
    } else {
        text("")
    };

    let composer = row![
        text_input(
            "Verify a news topic with Google Search grounding...",
            chat.query()
        )
        .on_input(Message::SearchQueryChanged)
        .on_submit(Message::SearchSubmitted)
        .padding(12)
        .width(Length::Fill),
        button(if chat.is_searching() { "..." } else { "→" })
            .padding([10, 16])
            .style(iced::widget::button::primary)
            .on_press_maybe((!chat.is_searching()).then_some(Message::SearchSubmitted)),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    column![list, indicator, composer].spacing(12).into()
}

fn view_image_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let audit = state.app.audit();

    let upload: Element<'_, Message> = match (audit.selected(), state.preview.as_ref()) {
        (Some(selected), Some(preview)) => column![
            image::<image::Handle>(preview.clone()).height(320),
            text(selected.file_name.clone()).size(12),
            row![
                button(text("Discard"))
                    .padding([10, 18])
                    .style(iced::widget::button::text)
                    .on_press(Message::DiscardImage),
                button(if audit.is_analyzing() {
                    "Analyzing..."
                } else {
                    "Start Analysis"
                })
                .padding([10, 18])
                .style(iced::widget::button::primary)
                .on_press_maybe((!audit.is_analyzing()).then_some(Message::StartAnalysisPressed)),
            ]
            .spacing(12)
        ]
        .spacing(12)
        .align_x(iced::Alignment::Center)
        .into(),
        _ => column![
            text("📸").size(64),
            text("AI Note Analysis").size(24),
            text(
                "Scan physical materials to check accuracy before approving them \
                 for your n8n workflow."
            )
            .size(14),
            button(text("Upload Material"))
                .padding([12, 24])
                .style(iced::widget::button::primary)
                .on_press(Message::PickImagePressed)
        ]
        .spacing(12)
        .align_x(iced::Alignment::Center)
        .into(),
    };

    let mut page = column![container(upload)
        .padding(28)
        .center_x(Length::Fill)
        .style(glass_panel)]
    .spacing(16);

    if let Some(err) = audit.error() {
        page = page.push(error_line(err));
    }
    if audit.report().is_some() {
        page = page.push(
            container(
                column![
                    text("MATERIAL INTELLIGENCE REPORT").size(12),
                    markdown::view(state.report_markdown.iter(), markdown_render_settings())
                        .map(Message::MarkdownLinkClicked)
                ]
                .spacing(12),
            )
            .padding(20)
            .width(Length::Fill)
            .style(glass_bot_bubble),
        );
    }

    page.into()
}

fn view_syllabus_tab(state: &StudyIcedApp) -> Element<'_, Message> {
    let checklist = state.app.syllabus();
    let tracks = SyllabusTrack::all()
        .into_iter()
        .fold(row!().spacing(14), |row, track| {
            let topics = track.topics().iter().enumerate().fold(
                column!().spacing(8),
                |col, (idx, topic)| {
                    let mark = if checklist.is_checked(track, idx) {
                        "☑"
                    } else {
                        "☐"
                    };
                    col.push(
                        button(text(format!("{mark}  {topic}")).size(14))
                            .padding([8, 10])
                            .width(Length::Fill)
                            .style(iced::widget::button::text)
                            .on_press(Message::SyllabusToggled(track, idx)),
                    )
                },
            );
            row.push(
                container(
                    column![
                        text(format!("{}  {}", track.icon(), track.title())).size(18),
                        text(format!(
                            "{} of {} covered",
                            checklist.completed(track),
                            track.topics().len()
                        ))
                        .size(12),
                        topics
                    ]
                    .spacing(10),
                )
                .padding(18)
                .width(Length::Fill)
                .style(glass_panel),
            )
        });

    column![text("📚  Syllabus Milestones").size(24), tracks]
        .spacing(18)
        .into()
}

async fn pick_image() -> Option<Result<PickedImage, AppError>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Upload Material")
        .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif"])
        .pick_file()
        .await?;
    let file_name = handle.file_name();
    let result = match tokio::fs::read(handle.path()).await {
        Ok(bytes) => Ok(PickedImage { file_name, bytes }),
        Err(err) => Err(AppError::Storage(format!("could not read {file_name}: {err}"))),
    };
    Some(result)
}

fn parse_markdown_items(input: &str) -> Vec<markdown::Item> {
    markdown::parse(input).collect()
}

fn markdown_render_settings() -> markdown::Settings {
    let mut settings = markdown::Settings::with_text_size(15, Theme::Dark);
    settings.h1_size = 26.0.into();
    settings.h2_size = 22.0.into();
    settings.h3_size = 19.0.into();
    settings.code_size = 13.0.into();
    settings.spacing = 10.0.into();
    settings
}

fn open_uri_best_effort(uri: &str) -> std::io::Result<()> {
    if uri.trim().is_empty() {
        return Ok(());
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open")
            .arg(uri)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(uri)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", "", uri])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_switches_to_bottom_bar_below_900px() {
        assert!(uses_sidebar(1280.0));
        assert!(uses_sidebar(900.0));
        assert!(!uses_sidebar(899.5));
        assert!(!uses_sidebar(420.0));
    }

    #[test]
    fn blank_uri_is_not_opened() {
        assert!(open_uri_best_effort("   ").is_ok());
    }

    #[test]
    fn markdown_parse_keeps_links() {
        let items = parse_markdown_items("See [PIB](https://pib.gov.in) for details.");
        assert!(!items.is_empty());
    }
}
