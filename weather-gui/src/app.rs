use iced::{
    Alignment, Color, Element, Length, Task,
    widget::{button, center, column, container, image, opaque, row, stack, text, text_input},
};
use std::sync::Arc;
use weather_core::{
    AssetDir, Effect, FetchError, Frame, ImageCrate, ShellState, WeatherProvider, WeatherReading,
    current_hour, render::compose_scene,
};

const WINDOW_SIZE: (f32, f32) = (520.0, 680.0);

/// Everything the window needs from startup.
#[derive(Debug, Clone)]
pub struct Startup {
    provider: Arc<dyn WeatherProvider>,
    assets: AssetDir,
    backdrop: image::Handle,
}

impl Startup {
    pub fn new(provider: Arc<dyn WeatherProvider>, assets: AssetDir, backdrop: Frame) -> Self {
        Self {
            provider,
            assets,
            backdrop: to_handle(backdrop),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    QueryChanged(String),
    Search,
    Fetched {
        query: String,
        result: Result<WeatherReading, FetchError>,
    },
    DismissError,
}

pub struct App {
    state: ShellState,
    provider: Arc<dyn WeatherProvider>,
    assets: AssetDir,
    scene: image::Handle,
}

pub fn run(startup: Startup) -> iced::Result {
    iced::application(move || App::new(startup.clone()), App::update, App::view)
        .title(App::title)
        .window_size(WINDOW_SIZE)
        .run()
}

fn to_handle(frame: Frame) -> image::Handle {
    image::Handle::from_rgba(frame.width, frame.height, frame.rgba)
}

fn fatal(err: impl Into<anyhow::Error>) -> Task<Message> {
    let err = err.into();
    tracing::error!("{err:#}");
    iced::exit()
}

impl App {
    pub fn new(startup: Startup) -> (Self, Task<Message>) {
        let app = Self {
            state: ShellState::default(),
            provider: startup.provider,
            assets: startup.assets,
            scene: startup.backdrop,
        };
        (app, Task::none())
    }

    pub fn title(&self) -> String {
        if self.state.labels.place.is_empty() {
            "Weather".to_string()
        } else {
            format!("Weather: {}", self.state.labels.place)
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryChanged(query) => {
                self.state.set_query(query);
                Task::none()
            }
            Message::Search => {
                let Some(place) = self.state.begin_search() else {
                    return Task::none();
                };
                tracing::info!(place = %place, "searching");

                let provider = Arc::clone(&self.provider);
                Task::perform(
                    async move {
                        let result = provider.get_weather(&place).await;
                        (place, result)
                    },
                    |(query, result)| Message::Fetched { query, result },
                )
            }
            Message::Fetched { query, result } => {
                match self.state.apply_lookup(&query, result, current_hour()) {
                    Ok(Effect::Render {
                        background,
                        icon_key,
                    }) => match compose_scene(&ImageCrate, &self.assets, background, &icon_key) {
                        Ok(frame) => {
                            self.scene = to_handle(frame);
                            Task::none()
                        }
                        Err(err) => fatal(err),
                    },
                    Ok(Effect::ShowError(message)) => {
                        tracing::warn!(query = %query, "{message}");
                        Task::none()
                    }
                    Err(err) => fatal(err),
                }
            }
            Message::DismissError => {
                self.state.dismiss_error();
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let labels = &self.state.labels;

        let search = row![
            text_input("Place name", &self.state.query)
                .on_input(Message::QueryChanged)
                .on_submit(Message::Search)
                .padding(8),
            button(text("Search weather"))
                .padding(8)
                .on_press_maybe((!self.state.searching).then_some(Message::Search)),
        ]
        .spacing(8);

        let content = column![
            search,
            image(self.scene.clone()).width(Length::Fill),
            text(labels.place.as_str()).size(24),
            text(labels.temperature.as_str()).size(18),
            text(labels.condition.as_str()).size(18),
        ]
        .spacing(12)
        .padding(16)
        .align_x(Alignment::Center);

        match &self.state.error {
            Some(message) => modal(content, error_dialog(message)),
            None => content.into(),
        }
    }
}

fn error_dialog(message: &str) -> Element<'_, Message> {
    container(
        column![
            text("Error").size(20),
            text(message),
            button(text("OK")).on_press(Message::DismissError),
        ]
        .spacing(12),
    )
    .width(320.0)
    .padding(20)
    .style(container::rounded_box)
    .into()
}

/// Lays `dialog` over a dimmed `base` that takes no input.
fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    dialog: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(center(opaque(dialog)).style(|_theme| container::Style {
            background: Some(
                Color {
                    a: 0.7,
                    ..Color::BLACK
                }
                .into(),
            ),
            ..container::Style::default()
        }))
    ]
    .into()
}
