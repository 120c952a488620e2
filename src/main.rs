mod config;
mod logging;
mod openai;
mod preview;
mod prompt;
mod sanitize;
mod state;

use iced::{
    widget::{button, column, container, row, text, text_editor, text_input, text_input::Id},
    Color, Element, Length, Task, Theme, Font, Subscription, Size,
    time, clipboard,
    keyboard::{self, Key},
    event::{self, Event as IcedEvent},
    alignment,
    window,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use openai::{GenerationError, OpenAiClient};
use state::GeneratorState;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn main() -> iced::Result {
    logging::init();
    let config = config::Config::load();

    iced::application("Landing Page Generator", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: Size::new(config.window.width as f32, config.window.height as f32),
            min_size: Some(Size::new(config.window.min_width as f32, config.window.min_height as f32)),
            position: window::Position::Centered,
            ..Default::default()
        })
        .run_with(move || App::new(config))
}

#[derive(Debug, Clone)]
enum Message {
    IdeaChanged(String),
    Submit,
    Generated(Result<String, GenerationError>),
    Tick,
    CopyOutput,
    OpenPreview,
    PreviewOpened(Result<PathBuf, String>),
    Exit,
}

struct App {
    state: GeneratorState,
    code: text_editor::Content,
    preview_status: Option<String>,
    loading_frame: usize,
    client: OpenAiClient,
    input_id: Id,
}

impl App {
    fn new(config: config::Config) -> (Self, Task<Message>) {
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!("{} is not set; requests will be rejected upstream", config.api.api_key_env);
        }

        let client = OpenAiClient::with_config(&config.api, api_key);
        info!(model = %config.api.model, style = ?client.style(), "pitchpage ready");

        let input_id = Id::unique();

        let app = App {
            state: GeneratorState::new(),
            code: text_editor::Content::new(),
            preview_status: None,
            loading_frame: 0,
            client,
            input_id: input_id.clone(),
        };

        (app, text_input::focus(input_id))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::IdeaChanged(value) => {
                self.state.set_idea(value);
                Task::none()
            }
            Message::Submit => {
                // Enter in the input bypasses the disabled button, so the
                // state machine is the real guard.
                let Some(idea) = self.state.begin() else {
                    return Task::none();
                };

                self.loading_frame = 0;
                self.preview_status = None;
                let client = self.client.clone();

                Task::perform(
                    async move { client.generate(&idea).await },
                    Message::Generated,
                )
            }
            Message::Generated(outcome) => {
                self.state.settle(outcome);
                self.code = text_editor::Content::with_text(self.state.generated().unwrap_or_default());
                Task::none()
            }
            Message::Tick => {
                if self.state.is_loading() {
                    self.loading_frame = (self.loading_frame + 1) % SPINNER_FRAMES.len();
                }
                Task::none()
            }
            Message::CopyOutput => match self.state.generated() {
                Some(html) => clipboard::write(html.to_string()),
                None => Task::none(),
            },
            Message::OpenPreview => {
                let Some(html) = self.state.generated().map(str::to_string) else {
                    return Task::none();
                };

                Task::perform(
                    async move {
                        tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
                            let path = preview::write_preview(&html)?;
                            preview::open_in_browser(&path)?;
                            Ok(path)
                        })
                        .await
                        .map_err(anyhow::Error::from)
                        .and_then(|result| result)
                        .map_err(|e| format!("{:#}", e))
                    },
                    Message::PreviewOpened,
                )
            }
            Message::PreviewOpened(result) => {
                self.preview_status = Some(match result {
                    Ok(path) => format!("Preview opened from {}", path.display()),
                    Err(e) => {
                        warn!(error = %e, "could not open preview");
                        format!("Could not open preview: {}", e)
                    }
                });
                Task::none()
            }
            Message::Exit => iced::exit(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let timer = if self.state.is_loading() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        let events = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Escape),
                ..
            }) = event
            {
                Some(Message::Exit)
            } else {
                None
            }
        });

        Subscription::batch([timer, events])
    }

    fn view(&self) -> Element<Message> {
        let loading = self.state.is_loading();

        let input = text_input("Enter your business service idea", self.state.idea())
            .on_input(Message::IdeaChanged)
            .on_submit(Message::Submit)
            .padding(12)
            .size(16)
            .id(self.input_id.clone());

        let label = if loading {
            format!("{} Generating...", SPINNER_FRAMES[self.loading_frame])
        } else {
            "Generate Landing Page".to_string()
        };
        let generate = button(text(label).size(15))
            .on_press_maybe((!loading).then_some(Message::Submit))
            .padding(12);

        let mut content = column![
            text("Landing Page Generator").size(28),
            row![input, generate].spacing(10).align_y(alignment::Vertical::Center),
        ]
        .spacing(15)
        .padding(20);

        if let Some(error) = self.state.error() {
            content = content.push(text(error).color(Color::from_rgb(0.9, 0.2, 0.2)));
        }

        if self.state.generated().is_some() {
            let code = text_editor(&self.code)
                .font(Font::MONOSPACE)
                .size(13)
                .height(Length::Fill);

            let actions = row![
                button(text("[Copy]").size(14)).on_press(Message::CopyOutput).padding(8),
                button(text("[Open preview]").size(14)).on_press(Message::OpenPreview).padding(8),
            ]
            .spacing(10);

            content = content
                .push(text("Generated Landing Page Code").size(20))
                .push(code)
                .push(
                    container(actions)
                        .width(Length::Fill)
                        .align_x(alignment::Horizontal::Right),
                );
        }

        if let Some(status) = &self.preview_status {
            content = content.push(text(status).size(13));
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}
