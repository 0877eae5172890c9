//! Terminal styling for pipeline output
//!
//! Every colored piece of output goes through a [`Tone`], so the palette
//! lives in one place. `owo-colors` decides per stream whether to emit ANSI
//! codes (honouring `NO_COLOR`, `CLICOLOR_FORCE` and TTY detection).

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};

pub use owo_colors::Stream;

/// Semantic role of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Repository names, change numbers, branches
    Accent,
    /// Finished steps
    Success,
    /// Failed steps and validation errors
    Error,
    /// Conflicts and stopped runs
    Warn,
    /// Captured command output and hints
    Muted,
    /// Step labels
    Emphasis,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Accent => Style::new().cyan(),
            Self::Success => Style::new().green(),
            Self::Error => Style::new().red(),
            Self::Warn => Style::new().yellow(),
            Self::Muted => Style::new().dimmed(),
            Self::Emphasis => Style::new().bold(),
        }
    }

    /// Problems go to stderr, everything else to stdout
    const fn default_stream(self) -> Stream {
        match self {
            Self::Error | Self::Warn => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A value rendered in a [`Tone`] when its stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    tone: Tone,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, tone: Tone) -> Self {
        Self {
            value,
            tone,
            stream: tone.default_stream(),
        }
    }

    /// Check color support on `stream` instead of the tone's default
    #[must_use]
    pub const fn on(mut self, stream: Stream) -> Self {
        self.stream = stream;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.tone.style();
        write!(
            f,
            "{}",
            self.value.if_supports_color(self.stream, |v| v.style(style))
        )
    }
}

/// Tone shortcuts for anything printable
pub trait Stylize: Display {
    /// Render in `tone`
    fn tone(&self, tone: Tone) -> Styled<&Self> {
        Styled::new(self, tone)
    }

    /// Cyan, for repository names, change numbers and links
    fn accent(&self) -> Styled<&Self> {
        self.tone(Tone::Accent)
    }

    /// Red on stderr, for failures and field errors
    fn error(&self) -> Styled<&Self> {
        self.tone(Tone::Error)
    }

    /// Yellow on stderr, for conflicts and stopped runs
    fn warn(&self) -> Styled<&Self> {
        self.tone(Tone::Warn)
    }

    /// Dim, for captured command output and hints
    fn muted(&self) -> Styled<&Self> {
        self.tone(Tone::Muted)
    }

    /// Bold, for step labels and headers
    fn emphasis(&self) -> Styled<&Self> {
        self.tone(Tone::Emphasis)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Marker for a step that succeeded
pub const fn check() -> Styled<&'static str> {
    Styled::new("✓", Tone::Success)
}

/// Marker for a step that failed
pub const fn cross() -> Styled<&'static str> {
    Styled::new("✗", Tone::Error)
}

/// Prefix for a command line in previews
pub const fn arrow() -> Styled<&'static str> {
    Styled::new("→", Tone::Accent)
}

/// `url` as an OSC 8 hyperlink where the terminal supports it
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    let target = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(target) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while a step's commands run
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
