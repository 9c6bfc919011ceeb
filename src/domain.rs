use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use std::io::Error;

#[derive(Debug)]
pub enum RVError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for RVError {
    fn from(err: Error) -> Self {
        RVError::IoError(err)
    }
}

impl From<PolarsError> for RVError {
    fn from(err: PolarsError) -> Self {
        RVError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct RVConfig {
    /// Milliseconds to block on the terminal event queue per loop iteration.
    pub event_poll_time: u64,
    /// Upper bound on the render width of a single column.
    pub max_column_width: usize,
    /// Milliseconds a transient status message stays on screen.
    pub status_message_timeout: u64,
    /// Column names rendered as currency values.
    pub currency_columns: Vec<String>,
}

impl Default for RVConfig {
    fn default() -> Self {
        RVConfig {
            event_poll_time: 100,
            max_column_width: 80,
            status_message_timeout: 5000,
            currency_columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    EnterFilter,
    ToggleMark,
    DeleteRow,
    Confirm,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const CONFIRM_DELETE_PROMPT: &str = "Delete the selected row? [y/n]";

pub const HELP_TEXT: &str = "\
 rowview keys

 Up/k Down/j     move selection
 Left/h Right/l  scroll columns
 PgUp/PgDn       move one page
 Home/g End/G    first / last row
 /               live filter (type to narrow, Enter keeps, Esc clears)
 Esc             clear filter / close popup
 Space           mark row
 x               delete row (asks for confirmation)
 c               copy row to clipboard
 ?               this help
 q               quit
";
