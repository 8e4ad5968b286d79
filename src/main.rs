//! Lexicard - vocabulary flashcard trainer
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use lexicard::cli::cards::{CardsAction, CardsCommand, CardsOptions};
use lexicard::cli::reset::ResetTarget;
use lexicard::config::{lexicard_home, Config};
use lexicard::core::PracticeMode;
use lexicard::error::exit_codes;
use lexicard::speech::Accent;
use lexicard::storage::FileStateStore;
use lexicard::trainer::Trainer;

// =============================================================================
// CLI Definition
// =============================================================================

/// Lexicard - vocabulary flashcard trainer
#[derive(Parser)]
#[command(name = "lexicard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file layered over the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the Lexicard home directory and config file
    Init {
        /// Overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },

    /// Show the effective configuration
    Config,

    /// Manage and browse flashcards
    Cards {
        #[command(subcommand)]
        action: CardsSubcommand,
    },

    /// Run an interactive practice session
    Practice {
        /// typing, multiple-choice, fill-blank, scramble or listening
        mode: PracticeMode,
        /// Stop after this many answers
        #[arg(long, short)]
        count: Option<usize>,
        /// Accent for listening mode (american, british)
        #[arg(long)]
        accent: Option<Accent>,
    },

    /// Show scores, streak and weekly progress
    Stats,

    /// Reset scores, or delete all data
    Reset {
        /// A practice mode, "quiz", "scores" or "all"
        #[arg(value_parser = parse_reset_target)]
        target: ResetTarget,
        /// Required with "all"
        #[arg(long, short)]
        force: bool,
    },

    /// Export all cards to a JSON document
    Export {
        /// Directory or file to write (default: current directory)
        path: Option<PathBuf>,
    },

    /// Import cards from an exported JSON document
    Import {
        path: PathBuf,
    },

    /// Import cards extracted from a photo of a word list
    ImportImage {
        path: PathBuf,
    },

    /// Speak a word aloud (default: the current card's word)
    Speak {
        text: Option<String>,
        #[arg(long)]
        accent: Option<Accent>,
    },
}

#[derive(Subcommand)]
enum CardsSubcommand {
    /// Add a card
    Add {
        word: String,
        meaning: String,
        example: String,
    },
    /// List all cards
    List,
    /// Delete a card by id
    Delete { id: String },
    /// Show the current card
    Show,
    /// Move to the next card
    Next,
    /// Move to the previous card
    Prev,
    /// Jump to a card by position (1-based)
    Goto { position: usize },
    /// Flip the current card
    Flip,
    /// Turn shuffled order on or off
    Shuffle {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl From<CardsSubcommand> for CardsAction {
    fn from(action: CardsSubcommand) -> Self {
        match action {
            CardsSubcommand::Add {
                word,
                meaning,
                example,
            } => CardsAction::Add {
                word,
                meaning,
                example,
            },
            CardsSubcommand::List => CardsAction::List,
            CardsSubcommand::Delete { id } => CardsAction::Delete { id },
            CardsSubcommand::Show => CardsAction::Show,
            CardsSubcommand::Next => CardsAction::Next,
            CardsSubcommand::Prev => CardsAction::Previous,
            CardsSubcommand::Goto { position } => CardsAction::Goto { position },
            CardsSubcommand::Flip => CardsAction::Flip,
            CardsSubcommand::Shuffle { state } => CardsAction::Shuffle {
                enabled: matches!(state, Toggle::On),
            },
        }
    }
}

fn parse_reset_target(value: &str) -> Result<ResetTarget, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "quiz" => Ok(ResetTarget::Quiz),
        "scores" => Ok(ResetTarget::Scores),
        "all" => Ok(ResetTarget::Everything),
        other => other
            .parse::<PracticeMode>()
            .map(ResetTarget::Mode)
            .map_err(|_| format!("expected a practice mode, quiz, scores or all, got '{}'", value)),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lexicard error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to `<lexicard home>/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("lexicard panic: {}", info);

        if let Some(home) = lexicard_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let (json, quiet) = (cli.json, cli.quiet);

    match cli.command {
        Commands::Init { force } => run_init(json, quiet, force),
        Commands::Config => run_config(config, json, quiet),
        Commands::Cards { action } => run_cards(config, action.into(), json, quiet),
        Commands::Practice {
            mode,
            count,
            accent,
        } => run_practice(config, mode, count, accent, json, quiet),
        Commands::Stats => run_stats(config, json, quiet),
        Commands::Reset { target, force } => run_reset(config, target, force, json, quiet),
        Commands::Export { path } => run_export(config, path, json, quiet),
        Commands::Import { path } => run_import(config, path, false, json, quiet),
        Commands::ImportImage { path } => run_import(config, path, true, json, quiet),
        Commands::Speak { text, accent } => run_speak(config, text, accent, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn open_trainer(config: Config) -> Result<Trainer<FileStateStore>, Box<dyn std::error::Error>> {
    let store = FileStateStore::new()?;
    Ok(Trainer::open(store, config))
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}

fn run_init(json: bool, quiet: bool, force: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::init::{InitCommand, InitOptions};

    let home = lexicard_home().ok_or("could not determine the Lexicard home directory")?;
    let cmd = InitCommand::new(home);
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_config(
    config: Config,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::config_cmd::{ConfigCommand, ConfigOptions};

    let cmd = ConfigCommand::new(config);
    let options = ConfigOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_cards(
    config: Config,
    action: CardsAction,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut cmd = CardsCommand::new(open_trainer(config)?);
    let options = CardsOptions { json, quiet };

    let output = cmd.run(&action);
    print_formatted(&cmd.format_output(&action, &output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_practice(
    config: Config,
    mode: PracticeMode,
    count: Option<usize>,
    accent: Option<Accent>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::practice::{PracticeCommand, PracticeOptions};

    let speaker = lexicard::speech::from_config(&config.speech);
    let mut cmd = PracticeCommand::new(open_trainer(config)?, speaker);
    let options = PracticeOptions {
        json,
        quiet,
        count,
        accent,
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let output = cmd.run(mode, &options, stdin.lock(), &mut stdout);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_stats(config: Config, json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::stats::{StatsCommand, StatsOptions};

    let cmd = StatsCommand::new(open_trainer(config)?);
    let options = StatsOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_reset(
    config: Config,
    target: ResetTarget,
    force: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::reset::{ResetCommand, ResetOptions};

    let mut cmd = ResetCommand::new(open_trainer(config)?);
    let options = ResetOptions { json, quiet, force };

    let output = cmd.run(target, &options);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_export(
    config: Config,
    path: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::transfer::{default_export_dir, TransferCommand, TransferOptions};

    let cmd = TransferCommand::new(open_trainer(config)?);
    let options = TransferOptions { json, quiet };
    let target = path.unwrap_or_else(default_export_dir);

    let output = cmd.export(&target);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_import(
    config: Config,
    path: PathBuf,
    from_image: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::transfer::{image_extractor, TransferCommand, TransferOptions};

    let extraction = config.extraction.clone();
    let mut cmd = TransferCommand::new(open_trainer(config)?);
    let options = TransferOptions { json, quiet };

    let output = if from_image {
        let extractor = image_extractor(&extraction)?;
        cmd.import_image(&path, extractor.as_ref(), &extraction)
    } else {
        cmd.import(&path)
    };
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_speak(
    config: Config,
    text: Option<String>,
    accent: Option<Accent>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use lexicard::cli::speak::{SpeakCommand, SpeakOptions};

    let speaker = lexicard::speech::from_config(&config.speech);
    let cmd = SpeakCommand::new(open_trainer(config)?, speaker);
    let options = SpeakOptions {
        json,
        quiet,
        accent,
    };

    let output = cmd.run(text.as_deref(), &options);
    print_formatted(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}
