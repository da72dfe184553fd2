pub mod table;

use iced::{
    widget::{button, column, container, progress_bar, scrollable, text, text_input, Column},
    Alignment, Element, Font, Length,
};

use crate::application::{DownloadEvent, ProgressUpdate};
use crate::domain::{AppError, Notice};
use crate::extractor::FormatDescriptor;

const FETCHING: &str = "Fetching formats...";
const DOWNLOADING: &str = "Downloading...";
const DOWNLOADING_UNKNOWN_SIZE: &str = "Downloading... (size unknown)";
const TABLE_FONT_SIZE: f32 = 11.0;

/// Main view state
pub struct FormatsView {
    pub url: String,
    formats: Vec<FormatDescriptor>,
    /// Header, separator, then one line per entry of `formats`
    table: Vec<String>,
    selected: Option<usize>,
    pub download_status: String,
    /// Gauge value in `0.0..=100.0`
    pub progress: f32,
    fetch_generation: u64,
    fetching: bool,
    download_generation: u64,
    downloading: bool,
}

impl Default for FormatsView {
    fn default() -> Self {
        Self {
            url: String::new(),
            formats: Vec::new(),
            table: table::render_table(&[]),
            selected: None,
            download_status: String::new(),
            progress: 0.0,
            fetch_generation: 0,
            fetching: false,
            download_generation: 0,
            downloading: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormatsMessage {
    UrlChanged(String),
    FetchPressed,
    FormatSelected(usize),
    DownloadPressed,
}

/// Side effect requested by the view, carried out by the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    FetchFormats {
        url: String,
        generation: u64,
    },
    Download {
        url: String,
        format_id: String,
        generation: u64,
    },
    Notify(Notice),
}

impl FormatsView {
    pub fn update(&mut self, message: FormatsMessage) -> Action {
        match message {
            FormatsMessage::UrlChanged(url) => {
                self.url = url;
                Action::None
            }
            FormatsMessage::FetchPressed => self.request_formats(),
            FormatsMessage::FormatSelected(index) => {
                if index < self.formats.len() {
                    self.selected = Some(index);
                }
                Action::None
            }
            FormatsMessage::DownloadPressed => self.request_download(),
        }
    }

    /// A newer request supersedes one still in flight; its result is dropped on arrival.
    pub fn request_formats(&mut self) -> Action {
        let url = self.url.trim();
        if url.is_empty() {
            return Action::Notify(Notice::error(AppError::EmptyUrl.to_string()));
        }
        let url = url.to_string();

        self.fetch_generation += 1;
        self.fetching = true;

        Action::FetchFormats {
            url,
            generation: self.fetch_generation,
        }
    }

    pub fn request_download(&mut self) -> Action {
        let url = self.url.trim();
        let format = self.selected.and_then(|index| self.formats.get(index));
        let (false, Some(format)) = (url.is_empty(), format) else {
            return Action::Notify(Notice::error(AppError::UrlAndFormatRequired.to_string()));
        };
        if self.downloading {
            return Action::Notify(Notice::error(AppError::DownloadInProgress.to_string()));
        }
        let url = url.to_string();
        let format_id = format.id.clone();

        self.download_generation += 1;
        self.downloading = true;
        self.progress = 0.0;
        self.download_status = DOWNLOADING.to_string();

        Action::Download {
            url,
            format_id,
            generation: self.download_generation,
        }
    }

    pub fn on_formats_fetched(
        &mut self,
        generation: u64,
        result: Result<Vec<FormatDescriptor>, AppError>,
    ) -> Action {
        if generation != self.fetch_generation {
            return Action::None;
        }
        self.fetching = false;

        match result {
            Ok(formats) => {
                self.on_formats_ready(formats);
                Action::None
            }
            Err(e) => Action::Notify(Notice::error(e.to_string())),
        }
    }

    /// Replaces the whole list; the previous selection no longer applies.
    pub fn on_formats_ready(&mut self, formats: Vec<FormatDescriptor>) {
        self.table = table::render_table(&formats);
        self.formats = formats;
        self.selected = None;
    }

    pub fn on_download_event(&mut self, generation: u64, event: DownloadEvent) -> Action {
        if generation != self.download_generation {
            return Action::None;
        }
        match event {
            DownloadEvent::Progress(update) => {
                self.on_progress(update);
                Action::None
            }
            DownloadEvent::Completed => self.on_download_finished(Ok(())),
            DownloadEvent::Failed(e) => self.on_download_finished(Err(e)),
        }
    }

    pub fn on_progress(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::Percent(percent) => {
                self.progress = percent.clamp(0.0, 100.0);
                self.download_status = DOWNLOADING.to_string();
            }
            ProgressUpdate::Indeterminate => {
                self.download_status = DOWNLOADING_UNKNOWN_SIZE.to_string();
            }
        }
    }

    pub fn on_download_finished(&mut self, result: Result<(), AppError>) -> Action {
        self.downloading = false;
        self.download_status.clear();
        self.progress = 0.0;

        match result {
            Ok(()) => Action::Notify(Notice::info("Success", "Download complete!")),
            Err(e) => Action::Notify(Notice::error(e.to_string())),
        }
    }

    /// The data rows of the table, without header and separator.
    fn rows(&self) -> &[String] {
        &self.table[2..]
    }

    fn fetch_status(&self) -> &str {
        if self.fetching {
            FETCHING
        } else {
            ""
        }
    }

    pub fn view(&self) -> Element<'_, FormatsMessage> {
        let header = text(self.table[..2].join("\n"))
            .font(Font::MONOSPACE)
            .size(TABLE_FONT_SIZE);

        let rows = self
            .rows()
            .iter()
            .enumerate()
            .fold(Column::<FormatsMessage>::new(), |rows, (index, row)| {
                let style = if self.selected == Some(index) {
                    button::primary
                } else {
                    button::text
                };
                rows.push(
                    button(text(row).font(Font::MONOSPACE).size(TABLE_FONT_SIZE))
                        .on_press(FormatsMessage::FormatSelected(index))
                        .padding([1, 0])
                        .style(style),
                )
            });

        column![
            text("Enter YouTube URL:").size(16),
            text_input("https://www.youtube.com/watch?v=...", &self.url)
                .on_input(FormatsMessage::UrlChanged)
                .on_submit(FormatsMessage::FetchPressed)
                .padding(8)
                .width(Length::Fixed(420.0)),
            button("Fetch Formats")
                .on_press(FormatsMessage::FetchPressed)
                .padding([6, 16]),
            header,
            scrollable(rows)
                .width(Length::Fill)
                .height(Length::Fixed(220.0)),
            text(self.fetch_status()).size(14),
            button("Download")
                .on_press_maybe((!self.downloading).then_some(FormatsMessage::DownloadPressed))
                .padding([6, 16]),
            text(&self.download_status).size(14),
            container(progress_bar(0.0..=100.0, self.progress)).width(Length::Fixed(400.0)),
        ]
        .padding(10)
        .spacing(8)
        .align_x(Alignment::Center)
        .into()
    }
}
