use std::sync::Arc;

use futures::StreamExt;
use iced::Task;
use rfd::{AsyncMessageDialog, MessageButtons, MessageLevel};
use tracing::debug;

use crate::application::{Coordinator, DownloadEvent};
use crate::domain::{AppError, Notice, NoticeLevel};
use crate::extractor::{ExtractorConfig, FormatDescriptor, YtDlp};
use crate::ui::{Action, FormatsMessage, FormatsView};

pub struct CheezeApp {
    view: FormatsView,
    coordinator: Coordinator,
}

impl Default for CheezeApp {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl CheezeApp {
    pub fn new(config: ExtractorConfig) -> Self {
        let coordinator = Coordinator::new(Arc::new(YtDlp::new(config)));

        Self {
            view: FormatsView::default(),
            coordinator,
        }
    }

    /// Turns a view action into background work whose results come back as messages.
    fn dispatch(&self, action: Action) -> Task<Message> {
        match action {
            Action::None => Task::none(),
            Action::FetchFormats { url, generation } => {
                let coordinator = self.coordinator.clone();
                Task::perform(
                    async move { coordinator.fetch_formats(url).await },
                    move |result| Message::FormatsFetched(generation, result),
                )
            }
            Action::Download {
                url,
                format_id,
                generation,
            } => Task::stream(
                self.coordinator
                    .download(url, format_id)
                    .map(move |event| Message::Download(generation, event)),
            ),
            Action::Notify(notice) => show_notice(notice),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(FormatsMessage),
    FormatsFetched(u64, Result<Vec<FormatDescriptor>, AppError>),
    Download(u64, DownloadEvent),
    NoticeDismissed,
}

pub fn update(app: &mut CheezeApp, message: Message) -> Task<Message> {
    let action = match message {
        Message::UiMessage(ui_msg) => app.view.update(ui_msg),
        Message::FormatsFetched(generation, result) => app.view.on_formats_fetched(generation, result),
        Message::Download(generation, event) => app.view.on_download_event(generation, event),
        Message::NoticeDismissed => Action::None,
    };
    app.dispatch(action)
}

pub fn view(app: &CheezeApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

fn show_notice(notice: Notice) -> Task<Message> {
    debug!("{}: {}", notice.title, notice.message);
    let level = match notice.level {
        NoticeLevel::Info => MessageLevel::Info,
        NoticeLevel::Error => MessageLevel::Error,
    };

    Task::perform(
        async move {
            AsyncMessageDialog::new()
                .set_level(level)
                .set_title(notice.title)
                .set_description(notice.message)
                .set_buttons(MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::NoticeDismissed,
    )
}
