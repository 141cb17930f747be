// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtitle_translator::app_config::{self, Config};
use subtitle_translator::app_controller::Controller;
use subtitle_translator::language_utils;
use subtitle_translator::providers::LlmProvider;
use subtitle_translator::subtitle::SubtitleFormat;
use subtitle_translator::translation::{ConcurrencyMode, TranslationQuality};

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    #[value(name = "openai")]
    OpenAI,
    Claude,
    Gemini,
    #[value(name = "custom-openai", alias = "custom")]
    CustomOpenAI,
    #[value(alias = "ollama")]
    Local,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAI => LlmProvider::OpenAI,
            CliProvider::Claude => LlmProvider::Claude,
            CliProvider::Gemini => LlmProvider::Gemini,
            CliProvider::CustomOpenAI => LlmProvider::CustomOpenAI,
            CliProvider::Local => LlmProvider::Local,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Vtt,
    Ass,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Vtt => SubtitleFormat::Vtt,
            CliFormat::Ass => SubtitleFormat::Ass,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Low,
    Medium,
    High,
}

impl From<CliMode> for ConcurrencyMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Low => ConcurrencyMode::Low,
            CliMode::Medium => ConcurrencyMode::Medium,
            CliMode::High => ConcurrencyMode::High,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliQuality {
    Fast,
    Standard,
    Precise,
}

impl From<CliQuality> for TranslationQuality {
    fn from(quality: CliQuality) -> Self {
        match quality {
            CliQuality::Fast => TranslationQuality::Fast,
            CliQuality::Standard => TranslationQuality::Standard,
            CliQuality::Precise => TranslationQuality::Precise,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a subtitle file or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Convert a subtitle file to another format without translating it
    Convert {
        /// Subtitle file to convert
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: CliFormat,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the detected format, entry count and language of a subtitle file
    Detect {
        /// Subtitle file to inspect
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory for a single file (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key (overrides the config file)
    #[arg(long, env = "SUBTRANS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Endpoint for custom or local providers
    #[arg(long)]
    base_url: Option<String>,

    /// Source language code, or 'auto' to detect it
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh-CN', 'fr', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output format (defaults to the input format)
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Concurrency preset
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Translation quality
    #[arg(short, long, value_enum)]
    quality: Option<CliQuality>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtrans - subtitle translation with large language models
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Translate SRT, VTT and ASS subtitles with AI providers")]
#[command(long_about = "subtrans translates subtitle files with OpenAI, Claude, Gemini, OpenAI-compatible services or local models.

EXAMPLES:
    subtrans translate movie.srt                         # Translate using default config
    subtrans translate -t ja -p claude movie.ass         # Translate to Japanese with Claude
    subtrans translate --format vtt --mode high movie.srt
    subtrans translate -f /subtitles/                    # Process a directory, overwriting outputs
    subtrans convert movie.srt --to vtt                  # Convert without translating
    subtrans detect movie.ass                            # Show format and entry count
    subtrans completions bash > subtrans.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai        - OpenAI API (requires API key)
    claude        - Anthropic Claude API (requires API key)
    gemini        - Google Gemini API (requires API key)
    custom-openai - OpenAI-compatible service (requires base URL and API key)
    local         - Local OpenAI-compatible server such as Ollama (default http://localhost:11434)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself accepts everything; the global max level does the filtering
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or CLI says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Convert {
            input_path,
            to,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| parent_dir(&input_path));
            Controller::convert(&input_path, to.into(), &output_dir)?;
            Ok(())
        }
        Commands::Detect { input_path } => {
            let file = Controller::load_subtitle(&input_path)?;
            let sample: String = file
                .entries
                .iter()
                .take(20)
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            println!("Format:   {}", file.format);
            println!("Entries:  {}", file.len());
            println!(
                "Language: {}",
                language_utils::get_language_display_name(language_utils::detect_language(&sample))
            );
            Ok(())
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(level) = options.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(&options.input_path));
        if controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await?
            .is_none()
        {
            info!("Nothing to do");
        }
    } else if options.input_path.is_dir() {
        if options.output_dir.is_some() {
            warn!("--output-dir is ignored for directories; translations are written next to their sources");
        }
        let summary = controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

/// Command line values win over the config file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = options.provider {
        config.set_provider(provider.into());
    }
    if let Some(model) = &options.model {
        config.llm.model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.llm.api_key = api_key.clone();
    }
    if let Some(base_url) = &options.base_url {
        config.llm.base_url = base_url.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(format) = options.format {
        config.output_format = Some(format.into());
    }
    if let Some(mode) = options.mode {
        config.apply_concurrency_mode(mode.into());
    }
    if let Some(quality) = options.quality {
        config.quality = quality.into();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
