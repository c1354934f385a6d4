//! Workbook Publisher - terminal front end for the workbook state store
//!
//! Entry point for the application. Handles CLI argument parsing,
//! logging initialization, and applies one command per invocation to the
//! file-backed workspace.

use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use std::time::Instant;
use workbook_publisher::config::Config;
use workbook_publisher::export::{export_workbook_pdf_placeholder, write_export_payload};
use workbook_publisher::fl;
use workbook_publisher::i18n;
use workbook_publisher::notification::NotificationCenter;
use workbook_publisher::state::{
    coerce_page_count, BlockId, BlockType, DocumentSettingsPatch, MoveDirection, OverlayKind,
    OverlayVisibilityPatch, ThemeMode, TrimSizePreset, UiLanguageCode, WorkspaceTab,
};
use workbook_publisher::storage::FileStorage;
use workbook_publisher::ui::{render_notifications, TerminalView};
use workbook_publisher::WorkbookStore;

/// Application name for logging
const APP_NAME: &str = "workbook-publisher";

/// What one invocation does to the workspace
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Show,
    Add(BlockType),
    Select(BlockId),
    Move(BlockId, MoveDirection),
    Drag(BlockId, BlockId),
    Settings(DocumentSettingsPatch),
    Overlay(OverlayKind, bool),
    Set { field: String, value: String },
    Lang(UiLanguageCode),
    Theme(ThemeMode),
    Tab(WorkspaceTab),
    Export { out: Option<PathBuf> },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
enum CliAction {
    Help,
    Version,
    Run {
        storage_dir: Option<PathBuf>,
        command: Command,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match parse_args(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    match action {
        CliAction::Help => print_help(),
        CliAction::Version => print_version(),
        CliAction::Run { storage_dir, command } => run(storage_dir, command)?,
    }

    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,workbook_publisher=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments (program name excluded)
fn parse_args(args: &[String]) -> anyhow::Result<CliAction> {
    let mut storage_dir = None;
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-v" | "--version" => return Ok(CliAction::Version),
            "-s" | "--storage" => {
                let dir = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--storage requires a directory argument"))?;
                storage_dir = Some(PathBuf::from(dir));
                i += 1;
            }
            _ => rest.push(args[i].as_str()),
        }
        i += 1;
    }

    let command = parse_command(&rest)?;
    Ok(CliAction::Run { storage_dir, command })
}

fn parse_command(args: &[&str]) -> anyhow::Result<Command> {
    let Some((name, params)) = args.split_first() else {
        return Ok(Command::Show);
    };

    let command = match (*name, params) {
        ("show", []) => Command::Show,
        ("add", [kind]) => Command::Add(kind.parse().map_err(anyhow::Error::msg)?),
        ("select", [id]) => Command::Select(BlockId::from(*id)),
        ("move", [id, direction]) => Command::Move(
            BlockId::from(*id),
            direction.parse().map_err(anyhow::Error::msg)?,
        ),
        ("drag", [source, target]) => Command::Drag(BlockId::from(*source), BlockId::from(*target)),
        ("settings", options) => Command::Settings(parse_settings(options)?),
        ("overlay", [name, state]) => Command::Overlay(
            name.parse().map_err(anyhow::Error::msg)?,
            parse_switch(state)?,
        ),
        ("set", [field, value]) => Command::Set {
            field: field.to_string(),
            value: value.to_string(),
        },
        ("lang", [code]) => Command::Lang(code.parse().map_err(anyhow::Error::msg)?),
        ("theme", [mode]) => Command::Theme(mode.parse().map_err(anyhow::Error::msg)?),
        ("tab", [tab]) => Command::Tab(tab.parse().map_err(anyhow::Error::msg)?),
        ("export", []) => Command::Export { out: None },
        ("export", ["--out", dir]) => Command::Export {
            out: Some(PathBuf::from(dir)),
        },
        ("reset", []) => Command::Reset,
        (arg, _) if arg.starts_with('-') => bail!("Unknown option: {}", arg),
        (name, _) => bail!("Invalid usage of command: {}", name),
    };

    Ok(command)
}

fn parse_settings(options: &[&str]) -> anyhow::Result<DocumentSettingsPatch> {
    let mut patch = DocumentSettingsPatch::new();
    let mut options = options.iter();

    while let Some(option) = options.next() {
        let value = options
            .next()
            .ok_or_else(|| anyhow!("{} requires a value", option))?;
        patch = match *option {
            "--trim" => patch.trim_size(value.parse::<TrimSizePreset>().map_err(anyhow::Error::msg)?),
            "--bleed" => patch.bleed(parse_switch(value)?),
            "--pages" => patch.page_count(coerce_page_count(value)),
            other => bail!("Unknown settings option: {}", other),
        };
    }

    if patch.is_empty() {
        bail!("settings requires at least one of --trim, --bleed, --pages");
    }
    Ok(patch)
}

fn parse_switch(value: &str) -> anyhow::Result<bool> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("Expected on or off, got {}", other),
    }
}

/// Open the workspace, apply `command`, and print the result
fn run(storage_dir: Option<PathBuf>, command: Command) -> anyhow::Result<()> {
    i18n::init();

    let config = Config::load().context("Failed to load configuration")?;
    let storage_dir = match storage_dir {
        Some(dir) => dir,
        None => config.storage_dir().context("Failed to locate storage directory")?,
    };
    log::debug!("Using storage directory {:?}", storage_dir);

    let mut store = WorkbookStore::open_with_key(FileStorage::new(storage_dir), config.storage.key.clone());
    store.subscribe(TerminalView::new(std::io::stdout()));

    let published = match command {
        Command::Show => false,
        Command::Add(block_type) => {
            let block_id = store
                .add_workbook_block(block_type)
                .ok_or_else(|| anyhow!("No block ids left to add a {} block", block_type))?;
            log::info!("Added {} block {}", block_type, block_id);
            true
        }
        Command::Select(block_id) => {
            store.select_workbook_block(block_id);
            true
        }
        Command::Move(block_id, direction) => {
            store.reorder_workbook_block_by_direction(block_id, direction);
            true
        }
        Command::Drag(source, target) => {
            store.reorder_workbook_blocks_by_drag(source, target);
            true
        }
        Command::Settings(patch) => {
            store.update_document_settings(patch);
            true
        }
        Command::Overlay(kind, visible) => {
            store.update_preview_overlay_visibility(OverlayVisibilityPatch::single(kind, visible));
            true
        }
        Command::Set { field, value } => {
            let updated = store
                .update_selected_block_field(&field, &value)
                .with_context(|| format!("Failed to set {}", field))?;
            if !updated {
                eprintln!("{}", fl!(store.state().active_ui_language_code, NoBlockSelected));
            }
            updated
        }
        Command::Lang(code) => {
            store.set_active_ui_language_code(code);
            true
        }
        Command::Theme(mode) => {
            store.set_active_theme_mode(mode);
            true
        }
        Command::Tab(tab) => {
            store.set_active_workspace_tab(tab);
            true
        }
        Command::Export { out } => {
            let payload = export_workbook_pdf_placeholder(store.state());
            let directory = out.unwrap_or_else(|| config.export_dir());
            let path = write_export_payload(&payload, &directory, config.export.pretty)
                .context("Failed to write export payload")?;
            println!("{}", path.display());

            let mut notifications = NotificationCenter::new(config.ui.notification_duration_ms);
            let now = Instant::now();
            notifications.show(
                fl!(store.state().active_ui_language_code, ToastExportPlaceholder),
                now,
            );
            let mut out = String::new();
            render_notifications(&mut out, &notifications, now);
            print!("{}", out);
            return Ok(());
        }
        Command::Reset => {
            store.reset();
            true
        }
    };

    if !published {
        TerminalView::new(std::io::stdout()).render(store.state());
    }
    if let Some(e) = store.persist_error() {
        eprintln!("{}", e.user_message());
    }

    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"Workbook Publisher - edit print workbooks from the terminal

USAGE:
    workbook-publisher [OPTIONS] [COMMAND]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
    -s, --storage DIR       Keep the workspace in DIR instead of the data directory

COMMANDS:
    show                                Print the workspace (default)
    add <kind>                          Append a block and select it
    select <id>                         Select a block
    move <id> up|down                   Swap a block with its neighbor
    drag <source> <target>              Move a block in front of another
    settings [--trim ID] [--bleed on|off] [--pages N]
                                        Change document settings
    overlay <name> on|off               Toggle a preview overlay
    set <field> <value>                 Change a field of the selected block
    lang en|ru|fr                       Switch the UI language
    theme light|dark                    Switch the theme
    tab editor|preview                  Switch the workspace tab
    export [--out DIR]                  Write the export payload as JSON
    reset                               Restore the default workspace

BLOCK KINDS:
    paragraph heading sectionBreak pageBreak chapterStart checklist
    answerLines calloutBox image

TRIM SIZES:
    trim_6x9 trim_85x11 trim_5x8

OVERLAYS:
    safeArea bleed margins gutter

EXAMPLES:
    workbook-publisher add checklist
    workbook-publisher set checklistItems "Read chapter
Take notes"
    workbook-publisher settings --trim trim_85x11 --bleed on --pages 200
    workbook-publisher move block_2 up
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
