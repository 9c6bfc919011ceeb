use arboard::Clipboard;
use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::domain::{CONFIRM_DELETE_PROMPT, HELP_TEXT, Message, RVConfig, RVError};
use crate::filter::{self, Row};
use crate::formatting;
use crate::inputter::{InputResult, Inputter};
use crate::ui::{COLUMN_WIDTH_MARGIN, STATUS_LINE_HEIGHT, TABLE_HEADER_HEIGHT, SCROLLBAR_WIDTH};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
}

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    LOADING,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    FILTER,
    CONFIRM,
    POPUP,
}

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// One column of the loaded table, fully materialized as display strings.
struct Column {
    name: String,
    max_width: usize,
    data: Vec<String>,
}

impl Column {
    fn render_width(&self, max_column_width: usize) -> usize {
        let width = std::cmp::max(self.name.len(), self.max_width) + COLUMN_WIDTH_MARGIN;
        std::cmp::min(width, max_column_width)
    }
}

/// Cursor and scroll state over the currently visible rows.
#[derive(Default)]
struct TableView {
    visible: Vec<usize>, // indices into Model.rows, visibility order preserved
    cursor_row: usize,   // relative to offset_row
    offset_row: usize,
    offset_column: usize,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width.saturating_sub(SCROLLBAR_WIDTH),
            table_height: ui_height.saturating_sub(TABLE_HEADER_HEIGHT + STATUS_LINE_HEIGHT),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

#[derive(Clone)]
pub struct UIRow {
    pub cells: Vec<String>,
    pub marked: bool,
}

/// Snapshot handed to the renderer. Fully derived from the model on every
/// change, nothing in here is authoritative.
pub struct UIData {
    pub name: String,
    pub headers: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<UIRow>, // the visible window only
    pub nvisible: usize,
    pub ntotal: usize,
    pub selected: usize, // index within the window
    pub abs_selected: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub confirm: Option<String>,
    pub active_input: bool,
    pub cmdinput: InputResult,
    pub query: String,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub layout: UILayout,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            widths: Vec::new(),
            rows: Vec::new(),
            nvisible: 0,
            ntotal: 0,
            selected: 0,
            abs_selected: 0,
            show_popup: false,
            popup_message: String::new(),
            confirm: None,
            active_input: false,
            cmdinput: InputResult::default(),
            query: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            layout: UILayout::default(),
        }
    }
}

pub struct Model {
    file_info: Option<FileInfo>,
    config: RVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    view: TableView,
    query: String,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    uilayout: UILayout,
    uidata: UIData,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &RVConfig, ui_width: usize, ui_height: usize) -> Result<Self, RVError> {
        let mut model = Self {
            file_info: None,
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            view: TableView::default(),
            query: String::new(),
            // Clipboard access is best effort, e.g. headless sessions have none.
            clipboard: Clipboard::new().ok(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.set_status_message("Loading ...");
        model.update_table_data();
        Ok(model)
    }

    pub fn load_data_file(&mut self, path: PathBuf) -> Result<(), RVError> {
        self.status = Status::LOADING;
        let file_info = Model::get_file_info(path)?;
        info!(
            "Loading {:?} ({} bytes)",
            file_info.path, file_info.file_size
        );
        let frame = match file_info.file_type {
            FileType::CSV => Model::load_csv(&file_info.path)?,
            FileType::PARQUET => Model::load_parquet(&file_info.path)?,
        };

        // Materialize every column as display strings, one column per
        // rayon task. Keeps startup latency flat on wide frames.
        let start_time = Instant::now();
        let df = frame.collect()?;
        let config = self.config.clone();
        let c_: Result<Vec<Column>, _> = df
            .get_column_names()
            .par_iter()
            .map(|name| Self::load_column(&df, name.as_str(), &config))
            .collect();
        let columns = c_?;
        let data_loading_duration = start_time.elapsed().as_millis();
        for c in columns.iter() {
            debug!(
                "Column \"{}\": max_width {}, {} rows",
                c.name,
                c.max_width,
                c.data.len()
            );
        }

        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        self.rows = (0..nrows)
            .map(|ridx| Row::new(ridx, columns.iter().map(|c| c.data[ridx].as_str())))
            .collect();
        self.columns = columns;
        self.name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        self.file_info = Some(file_info);
        self.status = Status::READY;
        self.rebuild_visible();
        self.set_status_message(format!(
            "Loaded {} rows in {}ms",
            formatting::thousands(nrows),
            data_loading_duration
        ));
        self.update_table_data();
        Ok(())
    }

    fn load_column(df: &DataFrame, col_name: &str, config: &RVConfig) -> Result<Column, PolarsError> {
        let original_dtype = df.column(col_name)?.dtype().clone();
        let as_date = matches!(original_dtype, DataType::Date);
        let as_currency = config.currency_columns.iter().any(|c| c == col_name);

        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());
        let mut max_width = 0;
        for value in series.into_iter() {
            let mut ss = match value {
                Some(s) => s.to_string().replace("\r\n", " ↵ ").replace("\n", " ↵ "),
                None => String::from("∅"),
            };
            if as_date && let Some(pretty) = formatting::date(&ss) {
                ss = pretty;
            }
            if as_currency && let Ok(v) = ss.parse::<f64>() {
                ss = formatting::currency(v);
            }
            if ss.chars().count() > max_width {
                max_width = ss.chars().count();
            }
            data.push(ss);
        }

        Ok(Column {
            name: col_name.to_string(),
            max_width,
            data,
        })
    }

    fn detect_file_type(path: &Path) -> Result<FileType, RVError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            _ => Err(RVError::UnknownFileType),
        }
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, RVError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RVError::FileNotFound,
            ErrorKind::PermissionDenied => RVError::PermissionDenied,
            _ => RVError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(RVError::LoadingFailed("Not a file!".into()));
        }
        let file_type = Model::detect_file_type(&path)?;
        Ok(FileInfo {
            path,
            file_size: metadata.len(),
            file_type,
        })
    }

    fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(
            PlPath::Local(path.as_path().into()),
            ScanArgsParquet::default(),
        )
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// The controller forwards raw key events while the filter prompt is open.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTER
    }

    /// The confirm modal answers to y alone, every other key cancels it.
    pub fn confirm_pending(&self) -> bool {
        self.modus == Modus::CONFIRM
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) -> Result<(), RVError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection(-1),
                Message::MoveDown => self.move_selection(1),
                Message::MovePageUp => self.move_selection(-(self.page_size() as isize)),
                Message::MovePageDown => self.move_selection(self.page_size() as isize),
                Message::MoveBeginning => self.move_selection(isize::MIN),
                Message::MoveEnd => self.move_selection(isize::MAX),
                Message::MoveLeft => self.scroll_columns_left(),
                Message::MoveRight => self.scroll_columns_right(),
                Message::EnterFilter => self.enter_filter(),
                Message::Exit => self.clear_filter(),
                Message::ToggleMark => self.toggle_mark(),
                Message::DeleteRow => self.request_delete(),
                Message::CopyRow => self.copy_row(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::FILTER => match message {
                Message::RawKey(key) => self.filter_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CONFIRM => match message {
                Message::Confirm => self.delete_selected_row(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => self.close_modal(),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::Help => self.close_modal(),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Filtering ---------------------- //

    /// Recomputes every row's visibility from the query and re-windows the
    /// view. Safe to call with no data loaded.
    fn apply_filter(&mut self, query: &str) {
        filter::apply_filter(query, &mut self.rows);
        self.query = query.to_string();
        self.rebuild_visible();
        self.update_table_data();
    }

    fn enter_filter(&mut self) {
        trace!("Entering filter mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::FILTER;
        self.input.clear();
        self.last_input = self.input.get();
        // A fresh prompt starts from the unfiltered table.
        self.apply_filter("");
    }

    /// Every keystroke re-applies the filter to the full row set. No
    /// debouncing: the scan is O(rows) and rows are UI scale.
    fn filter_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.modus = self.previous_modus;
            self.previous_modus = Modus::FILTER;
            if self.last_input.canceled || self.last_input.text.is_empty() {
                self.apply_filter("");
                self.set_status_message("Filter cleared");
            } else {
                let text = self.last_input.text.clone();
                self.apply_filter(&text);
                self.set_status_message(format!(
                    "{} of {} rows match \"{}\"",
                    formatting::thousands(self.view.visible.len()),
                    formatting::thousands(self.rows.len()),
                    text
                ));
            }
        } else {
            let text = self.last_input.text.clone();
            self.apply_filter(&text);
        }
        self.update_table_data();
    }

    fn clear_filter(&mut self) {
        if !self.query.is_empty() {
            self.apply_filter("");
            self.set_status_message("Filter cleared");
        }
    }

    // -------------------- Row actions ---------------------- //

    fn selected_row_idx(&self) -> Option<usize> {
        self.view
            .visible
            .get(self.view.offset_row + self.view.cursor_row)
            .copied()
    }

    fn toggle_mark(&mut self) {
        if let Some(idx) = self.selected_row_idx() {
            self.rows[idx].marked = !self.rows[idx].marked;
            self.update_table_data();
        }
    }

    fn request_delete(&mut self) {
        if self.selected_row_idx().is_some() {
            self.previous_modus = self.modus;
            self.modus = Modus::CONFIRM;
            self.update_table_data();
        } else {
            self.set_status_message("Nothing to delete");
        }
    }

    fn delete_selected_row(&mut self) {
        if let Some(idx) = self.selected_row_idx() {
            self.rows.remove(idx);
            // Row indices into the column store stay valid, only the filter
            // rows shifted. Re-window from the surviving flags.
            self.rebuild_visible();
            self.set_status_message("Row deleted");
        }
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CONFIRM;
        self.update_table_data();
    }

    fn close_modal(&mut self) {
        trace!("Closing modal ...");
        let m = self.modus;
        self.modus = self.previous_modus;
        self.previous_modus = m;
        self.update_table_data();
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_table_data();
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.contains([' ', '\t', ',']);
        let mut out = String::from(c);
        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn copy_row(&mut self) {
        let Some(idx) = self.selected_row_idx() else {
            return;
        };
        let data_idx = self.rows[idx].data_idx;
        let content = self
            .columns
            .iter()
            .map(|c| Model::wrap_cell_content(&c.data[data_idx]))
            .collect::<Vec<String>>()
            .join(",");
        trace!("Row content: {}", content);

        match self.clipboard.as_mut().map(|cb| cb.set_text(content)) {
            Some(Ok(_)) => self.set_status_message("Copied row to clipboard"),
            Some(Err(e)) => self.set_status_message(format!("Clipboard error: {e:?}")),
            None => self.set_status_message("No clipboard available"),
        }
        self.update_table_data();
    }

    // -------------------- Cursor movement ---------------------- //

    fn page_size(&self) -> usize {
        self.uilayout.table_height.max(1)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.visible.len();
        if len == 0 {
            return;
        }
        let abs = (self.view.offset_row + self.view.cursor_row) as isize;
        let abs = abs.saturating_add(delta).clamp(0, len as isize - 1) as usize;
        self.move_to(abs);
        self.update_table_data();
    }

    /// Positions cursor and scroll offset so that the absolute visible-row
    /// index `abs` is selected and on screen.
    fn move_to(&mut self, abs: usize) {
        let h = self.page_size();
        if abs < self.view.offset_row {
            self.view.offset_row = abs;
        } else if abs >= self.view.offset_row + h {
            self.view.offset_row = abs + 1 - h;
        }
        self.view.cursor_row = abs - self.view.offset_row;
    }

    fn scroll_columns_left(&mut self) {
        if self.view.offset_column > 0 {
            self.view.offset_column -= 1;
            self.update_table_data();
        }
    }

    fn scroll_columns_right(&mut self) {
        if self.view.offset_column + 1 < self.columns.len() {
            self.view.offset_column += 1;
            self.update_table_data();
        }
    }

    /// Rebuilds the visible-row window from the per-row flags and keeps the
    /// selection in bounds. Called after any change to the row set.
    fn rebuild_visible(&mut self) {
        self.view.visible = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.visible)
            .map(|(i, _)| i)
            .collect();
        let len = self.view.visible.len();
        if len == 0 {
            self.view.offset_row = 0;
            self.view.cursor_row = 0;
        } else {
            let abs = (self.view.offset_row + self.view.cursor_row).min(len - 1);
            self.view.offset_row = self.view.offset_row.min(len - 1);
            self.move_to(abs);
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.rebuild_visible();
        self.update_table_data();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
    }

    // -------------------- UI snapshot ---------------------- //

    fn visible_name(name: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if name.len() > width {
            let mut reduced: String = name.chars().take(width - 3).collect();
            reduced.push_str("...");
            reduced
        } else {
            name.to_string()
        }
    }

    /// Columns that fit into the table width, starting at the scroll offset.
    /// Always yields at least one column when any exist.
    fn visible_columns(&self) -> Vec<usize> {
        let mut selected = Vec::new();
        let mut used = 0;
        for (cidx, column) in self.columns[self.view.offset_column.min(self.columns.len())..]
            .iter()
            .enumerate()
        {
            let w = column.render_width(self.config.max_column_width) + 1;
            if selected.is_empty() || used + w <= self.uilayout.table_width {
                selected.push(cidx + self.view.offset_column);
                used += w;
            } else {
                break;
            }
        }
        selected
    }

    fn update_table_data(&mut self) {
        if self.columns.is_empty() {
            let mut empty = UIData::empty();
            empty.layout = self.uilayout.clone();
            empty.status_message = self.status_message.clone();
            empty.last_status_message_update = self.last_status_message_update;
            empty.show_popup = self.modus == Modus::POPUP;
            empty.popup_message = HELP_TEXT.to_string();
            empty.active_input = self.modus == Modus::FILTER;
            empty.cmdinput = self.last_input.clone();
            empty.query = self.query.clone();
            self.uidata = empty;
            return;
        }

        let visible_cols = self.visible_columns();
        let headers = visible_cols
            .iter()
            .map(|&c| {
                Self::visible_name(
                    &self.columns[c].name,
                    self.columns[c].render_width(self.config.max_column_width),
                )
            })
            .collect();
        let widths = visible_cols
            .iter()
            .map(|&c| self.columns[c].render_width(self.config.max_column_width) as u16)
            .collect();

        let rbegin = self.view.offset_row;
        let rend = std::cmp::min(
            rbegin + self.uilayout.table_height,
            self.view.visible.len(),
        );
        trace!(
            "Table: Cr {}, Or {}, Oc {}, Rb {}, Re {}, visible {}/{}",
            self.view.cursor_row,
            self.view.offset_row,
            self.view.offset_column,
            rbegin,
            rend,
            self.view.visible.len(),
            self.rows.len()
        );

        let rows = self.view.visible[rbegin..rend]
            .iter()
            .map(|&ridx| {
                let row = &self.rows[ridx];
                UIRow {
                    cells: visible_cols
                        .iter()
                        .map(|&c| self.columns[c].data[row.data_idx].clone())
                        .collect(),
                    marked: row.marked,
                }
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            headers,
            widths,
            rows,
            nvisible: self.view.visible.len(),
            ntotal: self.rows.len(),
            selected: self.view.cursor_row,
            abs_selected: self.view.offset_row + self.view.cursor_row,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            confirm: (self.modus == Modus::CONFIRM).then(|| CONFIRM_DELETE_PROMPT.to_string()),
            active_input: self.modus == Modus::FILTER,
            cmdinput: self.last_input.clone(),
            query: self.query.clone(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            layout: self.uilayout.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn test_model(names: &[&str], data: &[&[&str]]) -> Model {
        let mut model = Model::init(&RVConfig::default(), 80, 24).unwrap();
        model.columns = names
            .iter()
            .enumerate()
            .map(|(cidx, name)| Column {
                name: name.to_string(),
                max_width: data
                    .iter()
                    .map(|row| row[cidx].chars().count())
                    .max()
                    .unwrap_or(0),
                data: data.iter().map(|row| row[cidx].to_string()).collect(),
            })
            .collect();
        model.rows = (0..data.len())
            .map(|ridx| {
                Row::new(
                    ridx,
                    model.columns.iter().map(move |c| c.data[ridx].as_str()),
                )
            })
            .collect();
        model.name = "test".to_string();
        model.status = Status::READY;
        model.rebuild_visible();
        model.update_table_data();
        model
    }

    fn cars() -> Model {
        test_model(
            &["make", "model", "year"],
            &[
                &["Toyota", "Corolla", "2020"],
                &["Honda", "Civic", "2019"],
                &["Toyota", "Yaris", "2019"],
            ],
        )
    }

    fn key(model: &mut Model, code: KeyCode) {
        model
            .update(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn type_str(model: &mut Model, s: &str) {
        for c in s.chars() {
            key(model, KeyCode::Char(c));
        }
    }

    fn visible_first_cells(model: &Model) -> Vec<String> {
        model
            .get_uidata()
            .rows
            .iter()
            .map(|r| r.cells[0].clone())
            .collect()
    }

    #[test]
    fn filter_narrows_on_every_keystroke() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        assert!(model.raw_keyevents());

        type_str(&mut model, "to");
        assert_eq!(visible_first_cells(&model), vec!["Toyota", "Toyota"]);

        type_str(&mut model, "yota yaris");
        assert_eq!(visible_first_cells(&model), vec!["Toyota"]);
        assert_eq!(model.get_uidata().nvisible, 1);
        assert_eq!(model.get_uidata().ntotal, 3);
    }

    #[test]
    fn committed_filter_is_reported_and_kept() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "2019");
        key(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().nvisible, 2);
        assert!(model.get_uidata().status_message.contains("2 of 3 rows"));
    }

    #[test]
    fn canceled_filter_restores_all_rows() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "honda");
        assert_eq!(model.get_uidata().nvisible, 1);
        key(&mut model, KeyCode::Esc);
        assert_eq!(model.get_uidata().nvisible, 3);
    }

    #[test]
    fn escape_in_table_mode_clears_committed_filter() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "civic");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.get_uidata().nvisible, 1);
        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().nvisible, 3);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "COROLLA");
        assert_eq!(visible_first_cells(&model), vec!["Toyota"]);
    }

    #[test]
    fn no_match_hides_everything_without_error() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "Ferrari");
        assert_eq!(model.get_uidata().nvisible, 0);
        assert!(model.get_uidata().rows.is_empty());
    }

    #[test]
    fn filter_on_empty_model_is_a_noop() {
        let mut model = Model::init(&RVConfig::default(), 80, 24).unwrap();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "anything");
        key(&mut model, KeyCode::Enter);
        model.update(Message::MoveDown).unwrap();
        model.update(Message::MoveEnd).unwrap();
        assert_eq!(model.get_uidata().ntotal, 0);
    }

    #[test]
    fn committed_filter_text_survives_an_empty_snapshot() {
        let mut model = Model::init(&RVConfig::default(), 80, 24).unwrap();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "anything");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.get_uidata().query, "anything");
    }

    #[test]
    fn selection_is_clamped_when_filter_shrinks_the_table() {
        let mut model = cars();
        model.update(Message::MoveEnd).unwrap();
        assert_eq!(model.get_uidata().abs_selected, 2);
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "honda");
        assert_eq!(model.get_uidata().abs_selected, 0);
        assert_eq!(model.get_uidata().nvisible, 1);
    }

    #[test]
    fn movement_walks_visible_rows_only() {
        let mut model = cars();
        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "2019");
        key(&mut model, KeyCode::Enter);
        model.update(Message::MoveDown).unwrap();
        let d = model.get_uidata();
        assert_eq!(d.abs_selected, 1);
        assert_eq!(d.rows[d.selected].cells[1], "Yaris");
    }

    #[test]
    fn delete_asks_for_confirmation_first() {
        let mut model = cars();
        model.update(Message::DeleteRow).unwrap();
        assert!(model.get_uidata().confirm.is_some());
        assert_eq!(model.get_uidata().ntotal, 3);
        model.update(Message::Confirm).unwrap();
        assert_eq!(model.get_uidata().ntotal, 2);
        assert!(model.get_uidata().confirm.is_none());
        assert_eq!(visible_first_cells(&model), vec!["Honda", "Toyota"]);
    }

    #[test]
    fn any_other_key_cancels_the_delete() {
        let mut model = cars();
        model.update(Message::DeleteRow).unwrap();
        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().ntotal, 3);
        assert!(model.get_uidata().confirm.is_none());
    }

    #[test]
    fn quit_inside_the_modal_cancels_instead_of_exiting() {
        let mut model = cars();
        model.update(Message::DeleteRow).unwrap();
        assert!(model.confirm_pending());
        model.update(Message::Quit).unwrap();
        assert_ne!(model.status, Status::QUITTING);
        assert!(model.get_uidata().confirm.is_none());
        assert_eq!(model.get_uidata().ntotal, 3);
    }

    #[test]
    fn marking_survives_a_filter_round_trip() {
        let mut model = cars();
        model.update(Message::ToggleMark).unwrap();
        assert!(model.get_uidata().rows[0].marked);

        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "civic");
        key(&mut model, KeyCode::Enter);
        model.update(Message::Exit).unwrap();
        assert!(model.get_uidata().rows[0].marked);
        assert!(!model.get_uidata().rows[1].marked);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = cars();
        model.update(Message::Help).unwrap();
        assert!(model.get_uidata().show_popup);
        model.update(Message::Exit).unwrap();
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn column_scrolling_stays_in_bounds() {
        let mut model = cars();
        model.update(Message::MoveLeft).unwrap();
        assert_eq!(model.get_uidata().headers[0], "make");
        model.update(Message::MoveRight).unwrap();
        model.update(Message::MoveRight).unwrap();
        model.update(Message::MoveRight).unwrap();
        assert_eq!(model.get_uidata().headers[0], "year");
    }

    #[test]
    fn loads_the_vehicles_fixture() {
        let config = RVConfig::default()
            .with_currency_columns(vec!["price".to_string()]);
        let mut model = Model::init(&config, 120, 40).unwrap();
        model
            .load_data_file(PathBuf::from("tests/fixtures/vehicles.csv"))
            .unwrap();
        let d = model.get_uidata();
        assert_eq!(d.ntotal, 5);
        assert_eq!(d.headers[0], "make");
        // price column is rendered as currency
        let price_idx = d.headers.iter().position(|h| h == "price").unwrap();
        assert!(d.rows[0].cells[price_idx].starts_with('$'));

        model.update(Message::EnterFilter).unwrap();
        type_str(&mut model, "corolla");
        assert_eq!(model.get_uidata().nvisible, 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let mut model = Model::init(&RVConfig::default(), 80, 24).unwrap();
        let err = model.load_data_file(PathBuf::from("tests/fixtures/no_such_file.csv"));
        assert!(matches!(err, Err(RVError::FileNotFound)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut model = Model::init(&RVConfig::default(), 80, 24).unwrap();
        let err = model.load_data_file(PathBuf::from("Cargo.toml"));
        assert!(matches!(err, Err(RVError::UnknownFileType)));
    }

    #[test]
    fn quit_message_sets_status() {
        let mut model = cars();
        model.update(Message::Quit).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }
}
