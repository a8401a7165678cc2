use breath_core::presets::PresetSummary;
use breath_core::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod speaker;
mod tui;

#[derive(Parser)]
#[command(name = "breathe", version)]
#[command(about = "Guidance in breathing")]
#[command(
    long_about = "Guidance in breathing.\n\nA tool that helps you in breathing certain ways. \
                  Press any key to stop a running exercise.\n\nAlways inhale through the nose!"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Sound cues to play: none, words, numbers or all
    #[arg(long, global = true)]
    sound: Option<SoundMode>,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the exercise plan without starting it
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// The box breathing cycle
    ///
    /// 4 seconds inhale, 4 seconds hold, 4 seconds exhale, 4 seconds hold.
    #[command(name = "box")]
    BoxBreathing,

    /// The long box breathing cycle
    ///
    /// 4 seconds inhale, 4 seconds hold, 6 seconds exhale, 2 seconds hold.
    BoxLong,

    /// The ideal way to breathe
    ///
    /// 5.5 seconds inhale and 5.5 seconds exhale, 55 times.
    Ideal,

    /// Train long breathing
    ///
    /// Starts with short inhales and raises the inhale length by one second
    /// per step. Every exhale is twice as long as its inhale.
    Long {
        /// Inhale length of the first step
        #[arg(short = 's', long, default_value_t = 4)]
        inhale_start_seconds: u32,

        /// Inhale length of the last step
        #[arg(short = 'e', long, default_value_t = 10)]
        inhale_end_seconds: u32,

        /// Cycles to breathe at each inhale length
        #[arg(short = 'c', long, default_value_t = 3)]
        cycles_per_step: u32,
    },

    /// Run a breathing pattern defined in the config file
    Custom {
        /// Pattern name
        name: String,
    },

    /// List available exercises
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or create the config file
    Config {
        /// Write a config file with default values
        #[arg(long, conflicts_with = "show")]
        init: bool,

        /// Print the effective configuration (default)
        #[arg(long)]
        show: bool,
    },
}

/// An exercise ready to run
struct Plan {
    title: String,
    cycles: Vec<BreathCycle>,
}

impl From<&Preset> for Plan {
    fn from(preset: &Preset) -> Self {
        Self {
            title: preset.title.clone(),
            cycles: preset.breath_cycles(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { init, .. } = &cli.command {
        logging::init_with_level("warn");
        return cmd_config(cli.config.as_deref(), *init);
    }

    let config = load_config(cli.config.as_deref())?;
    let sound = cli.sound.unwrap_or(config.sound.mode);

    let plan = match &cli.command {
        Commands::BoxBreathing => builtin("box")?,
        Commands::BoxLong => builtin("box-long")?,
        Commands::Ideal => builtin("ideal")?,
        Commands::Long {
            inhale_start_seconds,
            inhale_end_seconds,
            cycles_per_step,
        } => Plan {
            title: long_ramp_title(*inhale_start_seconds, *inhale_end_seconds, *cycles_per_step),
            cycles: long_ramp(*inhale_start_seconds, *inhale_end_seconds, *cycles_per_step),
        },
        Commands::Custom { name } => Plan::from(&config.pattern(name)?),
        Commands::List { json } => {
            logging::init_with_level(&config.logging.level);
            return cmd_list(&config, *json);
        }
        Commands::Config { .. } => return Ok(()),
    };

    if plan.cycles.is_empty() {
        return Err(Error::Preset(format!("'{}' has no cycles to run", plan.title)));
    }

    if cli.dry_run {
        logging::init_with_level(&config.logging.level);
        print_plan(&plan, sound);
        return Ok(());
    }

    run_session(plan, sound, &config)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn builtin(name: &str) -> Result<Plan> {
    get_default_presets()
        .get(name)
        .map(Plan::from)
        .ok_or_else(|| Error::Preset(format!("no built-in exercise named '{}'", name)))
}

fn print_plan(plan: &Plan, sound: SoundMode) {
    let phases: usize = plan.cycles.iter().map(|c| c.phases().count()).sum();
    println!("{}", plan.title);
    println!("Total duration: {}", format_duration(total_duration(&plan.cycles)));
    println!("Cycles: {}", plan.cycles.len());
    println!("Phases: {}", phases);
    println!("Sound: {}", sound);
}

fn run_session(plan: Plan, sound: SoundMode, config: &Config) -> Result<()> {
    // stdout belongs to the terminal UI from here on
    logging::init_to_file(&config.logging.file, &config.logging.level)?;

    let mut checked: Option<BreathCycle> = None;
    for cycle in &plan.cycles {
        if checked != Some(*cycle) {
            for problem in presets::validate_cycle(cycle) {
                tracing::warn!("{}", problem);
            }
            checked = Some(*cycle);
        }
    }

    // Assets are decoded before the terminal is touched so a bad asset
    // leaves the shell untouched
    let output = if sound.is_audible() {
        Some(speaker::AudioOutput::open()?)
    } else {
        None
    };
    let player: Box<dyn CuePlayer + Send> = match &output {
        Some(output) => Box::new(output.speaker(&config.sound.assets_dir, sound)?),
        None => Box::new(Silent),
    };

    let surface = tui::TerminalSurface::acquire(config.display.status_rows)?;
    let mut session = Session::init(plan.title, plan.cycles, surface)
        .with_exit_on_complete(config.display.exit_on_complete);
    let display = tui::TuiDisplay::new(config.display.status_rows)?;

    let report = session.run(display, player, SleepTicker, &mut tui::CrosstermKeys)?;
    drop(output);

    print_report(&report);
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!("{}", report_summary(report));
}

fn report_summary(report: &SessionReport) -> String {
    let elapsed = format_duration(Duration::from_secs(report.elapsed().as_secs()));
    let started = report
        .started_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");
    let outcome = match report.outcome {
        EngineOutcome::Completed => {
            format!("Completed all {} cycles in {}", report.total_cycles, elapsed)
        }
        EngineOutcome::Cancelled if report.cycles_started == 0 => {
            "Stopped before the first cycle".to_string()
        }
        EngineOutcome::Cancelled => format!(
            "Stopped during cycle {} of {} after {}",
            report.cycles_started, report.total_cycles, elapsed
        ),
    };
    format!("Session started at {}\n{}", started, outcome)
}

fn cycle_pattern(cycle: &BreathCycle) -> String {
    cycle
        .durations()
        .iter()
        .map(|d| format_duration(*d))
        .collect::<Vec<_>>()
        .join("/")
}

fn cmd_list(config: &Config, json: bool) -> Result<()> {
    let builtins = get_default_presets();
    let errors = builtins.validate();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("{}", error);
        }
        return Err(Error::Preset("invalid built-in exercises".into()));
    }

    let custom: Vec<Preset> = config.patterns.iter().map(CustomPattern::to_preset).collect();

    if json {
        let summaries: Vec<PresetSummary> = builtins
            .iter()
            .chain(custom.iter())
            .map(Preset::summary)
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Built-in exercises:");
    for preset in builtins.iter() {
        print_preset_line(preset);
    }
    println!(
        "  {:<10} {:<22} {:<14} {}",
        "long",
        "ramp",
        "",
        long_ramp_title(4, 10, 3)
    );

    if !custom.is_empty() {
        println!();
        println!("Custom patterns:");
        for preset in &custom {
            print_preset_line(preset);
        }
    }
    Ok(())
}

fn print_preset_line(preset: &Preset) {
    println!(
        "  {:<10} {:<22} x{:<4} {:<8} {}",
        preset.name,
        cycle_pattern(&preset.cycle),
        preset.cycles,
        format_duration(preset.total_duration()),
        preset.title
    );
}

fn cmd_config(path: Option<&Path>, init: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);

    if init {
        if path.exists() {
            return Err(Error::Config(format!(
                "{} already exists",
                path.display()
            )));
        }
        Config::default().save_to(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = if path.exists() {
        println!("# {}", path.display());
        Config::load_from(&path)?
    } else {
        println!("# {} does not exist, showing defaults", path.display());
        Config::default()
    };
    print!("{}", config.to_toml()?);
    Ok(())
}
