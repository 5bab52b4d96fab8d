//! Presentation-side glue: form parsing, row selection, table rendering and
//! a line-oriented session driving a [`RecordStore`].
//!
//! Nothing in the store depends on this module.

use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;

use crate::config::ShellConfig;
use crate::error::{WineError, WineResult};
use crate::record::{WineDraft, WineRecord};
use crate::store::RecordStore;
use crate::types::RecordId;

/// Message shown for any rejected form input; the cause is not surfaced.
pub const INPUT_ERROR_MESSAGE: &str = "Input error: Please check the field values";

/// Prompt shown before leaving the session.
pub const EXIT_PROMPT: &str = "Are you sure you wish to exit? [y/N]";

/// Raw text of the detail form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFields {
    pub estate: String,
    pub grape: String,
    pub year: String,
    pub quantity: String,
    pub price: String,
}

impl FormFields {
    /// Fill the form from a stored record.
    pub fn from_record(record: &WineRecord) -> Self {
        Self {
            estate: record.estate.clone(),
            grape: record.grape.clone(),
            year: record.year.to_string(),
            quantity: record.quantity.to_string(),
            price: record.price.to_string(),
        }
    }

    /// Parse the form into a validated draft.
    pub fn parse(&self) -> WineResult<WineDraft> {
        let year = parse_number::<i32>("year", &self.year)?;
        let quantity = parse_number::<i32>("quantity", &self.quantity)?;
        let price = parse_number::<f64>("price", &self.price)?;
        WineDraft::new(self.estate.trim(), self.grape.trim(), year, quantity, price)
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> WineResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| WineError::validation(field, format!("'{}' is not a number", raw.trim())))
}

/// Text shown to the user for a failed action.
pub fn user_message(err: &WineError) -> String {
    match err {
        WineError::Validation {
            field: "selection", ..
        } => "Select a record first".to_string(),
        e if e.is_input_error() => INPUT_ERROR_MESSAGE.to_string(),
        WineError::EmptyStore => "There are no records to delete".to_string(),
        WineError::OutOfRange { id, .. } => format!("Record {} does not exist", id),
        other => format!("Error: {}", other),
    }
}

/// Currently selected row. Update and delete are only enabled with one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<RecordId>,
}

impl Selection {
    /// Select `id` if the store holds it.
    pub fn select<'a>(
        &mut self,
        store: &'a RecordStore,
        id: RecordId,
    ) -> WineResult<&'a WineRecord> {
        let record = store.get(id).ok_or(WineError::OutOfRange {
            id: id.as_u32(),
            len: store.len() as u32,
        })?;
        self.selected = Some(id);
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn can_update(&self) -> bool {
        self.selected.is_some()
    }

    pub fn can_delete(&self) -> bool {
        self.selected.is_some()
    }
}

/// Render records as a fixed-column table.
pub fn render_table(records: &[WineRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<15}  {:<15}  {:>4}  {:>5}  {:>9}",
        "ID", "Estate", "Grape", "Year", "Qty", "Price"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:>4}  {:<15}  {:<15}  {:>4}  {:>5}  {:>9.2}",
            r.id, r.estate, r.grape, r.year, r.quantity, r.price
        );
    }
    if records.is_empty() {
        out.push_str("  (no records)\n");
    }
    out
}

/// Whether an answer to [`EXIT_PROMPT`] confirms leaving.
pub fn confirm_exit(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Opens the help file for the user.
pub trait HelpViewer {
    fn open(&self, path: &Path) -> WineResult<()>;
}

/// Opens files with the platform's default editor.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEditor;

impl HelpViewer for SystemEditor {
    fn open(&self, path: &Path) -> WineResult<()> {
        let mut cmd = if cfg!(target_os = "windows") {
            Command::new("notepad")
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg("-t");
            c
        } else {
            Command::new("xdg-open")
        };
        cmd.arg(path)
            .spawn()
            .map(|_| ())
            .map_err(|e| WineError::io("open_help", e))
    }
}

/// One parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Select(RecordId),
    Add,
    Update,
    Delete,
    DeleteLast,
    About,
    Help,
    Exit,
}

impl ShellCommand {
    /// Parse a command line; `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let cmd = match parts.next()? {
            "list" | "ls" => ShellCommand::List,
            "select" | "sel" => {
                let id = parts.next()?.parse::<u32>().ok()?;
                ShellCommand::Select(RecordId(id))
            }
            "add" | "new" => ShellCommand::Add,
            "update" => ShellCommand::Update,
            "delete" | "rm" => ShellCommand::Delete,
            "delete-last" => ShellCommand::DeleteLast,
            "about" => ShellCommand::About,
            "help" | "?" => ShellCommand::Help,
            "exit" | "quit" => ShellCommand::Exit,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(cmd)
    }
}

const USAGE: &str = "\
commands:
  list             show all records
  select <id>      select a record for update/delete
  add              enter a new record
  update           edit the selected record
  delete           delete the selected record
  delete-last      delete the last record
  about            open the help file
  exit             leave (asks for confirmation)
";

/// Interactive session over arbitrary input/output streams.
pub struct Shell<R, W, H = SystemEditor> {
    store: RecordStore,
    selection: Selection,
    config: ShellConfig,
    viewer: H,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W, SystemEditor> {
    /// Start a session on the configured data file.
    ///
    /// Failure to load is not fatal: the session starts with an empty list.
    pub fn start(config: ShellConfig, input: R, output: W) -> Self {
        Self::with_viewer(config, SystemEditor, input, output)
    }
}

impl<R: BufRead, W: Write, H: HelpViewer> Shell<R, W, H> {
    /// Start a session with a custom help viewer.
    pub fn with_viewer(config: ShellConfig, viewer: H, input: R, output: W) -> Self {
        let store = match RecordStore::open(&config.data_path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "initial load failed, starting with no records");
                RecordStore::empty(&config.data_path)
            }
        };
        Self {
            store,
            selection: Selection::default(),
            config,
            viewer,
            input,
            output,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until exit is confirmed or input ends.
    pub fn run(&mut self) -> WineResult<()> {
        self.print(&render_table(self.store.records()))?;
        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            let Some(cmd) = ShellCommand::parse(&line) else {
                self.print("unknown command, type 'help'\n")?;
                continue;
            };
            if cmd == ShellCommand::Exit {
                let answer = self.prompt(&format!("{} ", EXIT_PROMPT))?;
                if answer.as_deref().map_or(true, confirm_exit) {
                    return Ok(());
                }
                continue;
            }
            match self.dispatch(cmd) {
                Ok(()) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "command failed");
                    self.print(&format!("{}\n", user_message(&e)))?;
                }
            }
        }
    }

    fn dispatch(&mut self, cmd: ShellCommand) -> WineResult<()> {
        match cmd {
            ShellCommand::List => self.print(&render_table(self.store.records())),
            ShellCommand::Help => self.print(USAGE),
            ShellCommand::Select(id) => {
                let record = self.selection.select(&self.store, id)?;
                let form = FormFields::from_record(record);
                self.print(&format!(
                    "selected {}: {} | {} | {} | {} | {}\n",
                    id, form.estate, form.grape, form.year, form.quantity, form.price
                ))
            }
            ShellCommand::Add => {
                let form = self.read_form(FormFields::default())?;
                self.selection.clear();
                self.store.append(form.parse()?)?;
                self.refresh()
            }
            ShellCommand::Update => {
                let id = self.require_selection()?;
                let current = self
                    .store
                    .get(id)
                    .map(FormFields::from_record)
                    .unwrap_or_default();
                let form = self.read_form(current)?;
                self.selection.clear();
                self.store.update(id, form.parse()?)?;
                self.refresh()
            }
            ShellCommand::Delete => {
                let id = self.require_selection()?;
                self.selection.clear();
                self.store.remove(id)?;
                self.refresh()
            }
            ShellCommand::DeleteLast => {
                self.selection.clear();
                self.store.delete_last()?;
                self.refresh()
            }
            ShellCommand::About => self.viewer.open(&self.config.help_path),
            ShellCommand::Exit => Ok(()),
        }
    }

    fn require_selection(&self) -> WineResult<RecordId> {
        self.selection
            .selected()
            .ok_or_else(|| WineError::validation("selection", "no record selected"))
    }

    fn refresh(&mut self) -> WineResult<()> {
        self.print(&render_table(self.store.records()))
    }

    /// Prompt for each field; a blank answer keeps the prefilled value.
    fn read_form(&mut self, prefill: FormFields) -> WineResult<FormFields> {
        let mut form = prefill;
        for (label, slot) in [
            ("estate", &mut form.estate),
            ("grape", &mut form.grape),
            ("year", &mut form.year),
            ("quantity", &mut form.quantity),
            ("price", &mut form.price),
        ] {
            let prompt = if slot.is_empty() {
                format!("{}: ", label)
            } else {
                format!("{} [{}]: ", label, slot)
            };
            let answer = Self::prompt_on(&mut self.input, &mut self.output, &prompt)?
                .unwrap_or_default();
            if !answer.trim().is_empty() {
                *slot = answer;
            }
        }
        Ok(form)
    }

    fn prompt(&mut self, text: &str) -> WineResult<Option<String>> {
        Self::prompt_on(&mut self.input, &mut self.output, text)
    }

    fn prompt_on(input: &mut R, output: &mut W, text: &str) -> WineResult<Option<String>> {
        output
            .write_all(text.as_bytes())
            .and_then(|_| output.flush())
            .map_err(|e| WineError::io("shell_output", e))?;
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| WineError::io("shell_input", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn print(&mut self, text: &str) -> WineResult<()> {
        self.output
            .write_all(text.as_bytes())
            .map_err(|e| WineError::io("shell_output", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingViewer {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl HelpViewer for &RecordingViewer {
        fn open(&self, path: &Path) -> WineResult<()> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn run_script(
        dir: &Path,
        viewer: &RecordingViewer,
        script: &str,
    ) -> (String, Vec<WineRecord>) {
        let config = ShellConfig::in_dir(dir);
        let mut shell = Shell::with_viewer(
            config,
            viewer,
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        );
        shell.run().unwrap();
        let records = shell.store().records().to_vec();
        let out = String::from_utf8(shell.into_output()).unwrap();
        (out, records)
    }

    #[test]
    fn form_parses_into_draft() {
        let form = FormFields {
            estate: " Oak Hill ".into(),
            grape: "Merlot".into(),
            year: "2015".into(),
            quantity: "12".into(),
            price: "24.5".into(),
        };
        let draft = form.parse().unwrap();
        assert_eq!(draft.estate(), "Oak Hill");
        assert_eq!(draft.year(), 2015);
        assert_eq!(draft.price(), 24.5);
    }

    #[test]
    fn bad_form_collapses_to_generic_message() {
        let form = FormFields {
            estate: "Oak Hill".into(),
            grape: "Merlot".into(),
            year: "nineteen".into(),
            quantity: "12".into(),
            price: "1".into(),
        };
        let err = form.parse().unwrap_err();
        assert_eq!(user_message(&err), INPUT_ERROR_MESSAGE);

        let zero_qty = FormFields {
            year: "2015".into(),
            quantity: "0".into(),
            ..form
        };
        assert_eq!(user_message(&zero_qty.parse().unwrap_err()), INPUT_ERROR_MESSAGE);
    }

    #[test]
    fn selection_gates_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(dir.path().join("wines.dat")).unwrap();
        store
            .append(WineDraft::new("Oak Hill", "Merlot", 2015, 12, 24.5).unwrap())
            .unwrap();

        let mut sel = Selection::default();
        assert!(!sel.can_update() && !sel.can_delete());
        assert!(sel.select(&store, RecordId(4)).is_err());
        assert!(!sel.can_update());

        let rec = sel.select(&store, RecordId(0)).unwrap();
        assert_eq!(rec.estate, "Oak Hill");
        assert!(sel.can_update() && sel.can_delete());
        sel.clear();
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn table_lists_every_record() {
        let rec = WineRecord {
            id: RecordId(0),
            estate: "Oak Hill".into(),
            grape: "Merlot".into(),
            year: 2015,
            quantity: 12,
            price: 24.5,
        };
        let table = render_table(std::slice::from_ref(&rec));
        assert!(table.starts_with("  ID  Estate"));
        assert!(table.contains("Oak Hill"));
        assert!(table.contains("24.50"));
        assert!(render_table(&[]).contains("(no records)"));
    }

    #[test]
    fn command_parsing() {
        assert_eq!(ShellCommand::parse("list"), Some(ShellCommand::List));
        assert_eq!(
            ShellCommand::parse("select 3"),
            Some(ShellCommand::Select(RecordId(3)))
        );
        assert_eq!(ShellCommand::parse("select"), None);
        assert_eq!(ShellCommand::parse("select -1"), None);
        assert_eq!(ShellCommand::parse("list extra"), None);
        assert_eq!(ShellCommand::parse("dance"), None);
    }

    #[test]
    fn exit_needs_confirmation() {
        assert!(confirm_exit("y"));
        assert!(confirm_exit(" YES\n"));
        assert!(!confirm_exit("n"));
        assert!(!confirm_exit(""));
    }

    #[test]
    fn session_adds_updates_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = RecordingViewer::default();
        let script = "\
add
Oak Hill
Merlot
2015
12
24.5
add
Blue Ridge
Syrah
2018
6
31
select 0
update


2016


delete-last
exit
y
";
        let (out, records) = run_script(dir.path(), &viewer, script);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].estate, "Oak Hill");
        assert_eq!(records[0].year, 2016);
        assert!(out.contains("selected 0: Oak Hill"));
        assert_eq!(
            std::fs::metadata(dir.path().join("wines.dat")).unwrap().len(),
            80
        );
    }

    #[test]
    fn session_rejects_bad_input_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = RecordingViewer::default();
        let script = "add\nOak Hill\nMerlot\n1979\n12\n24.5\nupdate\nexit\nyes\n";
        let (out, records) = run_script(dir.path(), &viewer, script);
        assert!(records.is_empty());
        assert!(out.contains(INPUT_ERROR_MESSAGE));
        assert!(out.contains("Select a record first"));
        assert!(!dir.path().join("wines.dat").exists());
    }

    #[test]
    fn declined_exit_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = RecordingViewer::default();
        let (out, _) = run_script(dir.path(), &viewer, "exit\nn\nabout\nexit\ny\n");
        assert_eq!(out.matches(EXIT_PROMPT).count(), 2);
        assert_eq!(
            viewer.opened.borrow().as_slice(),
            &[dir.path().join("readme.txt")]
        );
    }

    #[test]
    fn delete_on_empty_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = RecordingViewer::default();
        let (out, _) = run_script(dir.path(), &viewer, "delete-last\n");
        assert!(out.contains("There are no records to delete"));
    }
}
