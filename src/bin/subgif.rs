use std::process;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use subgif::{
    Configuration, FfmpegLogLevel, ProgressCallback, ProgressInfo, RenderSummary, SubgifError,
    error::EXIT_SUCCESS,
};

const PROGRESS_TEMPLATE: &str = "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} ticks {msg}";

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "subgif=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(verbose)
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
                bar.set_style(style.progress_chars("##-"));
            }
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format!("@ {timestamp:.2}s"));
        }
    }

    fn on_finish(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        self.bar.finish_with_message("done");
    }
}

fn describe(summary: &RenderSummary) -> String {
    format!(
        "Wrote {} ({}x{}, {} frames, {:.3}s–{:.3}s from subtitle {})",
        summary.output.display(),
        summary.width,
        summary.height,
        summary.gif_frames,
        summary.start_seconds,
        summary.end_seconds,
        summary.subtitle_index,
    )
}

fn run(config: &Configuration) -> Result<(), Box<dyn std::error::Error>> {
    let progress = TerminalProgress::new(config.progress);
    let summary = subgif::convert(config, &progress)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} {}", "success:".green().bold(), describe(&summary).green());
    }
    Ok(())
}

fn fail(error: &SubgifError) -> ! {
    if let SubgifError::Usage(usage) = error {
        usage.exit();
    }
    eprintln!("{} {error}", "error:".red().bold());
    if let SubgifError::Selection(selection) = error {
        eprintln!("{}", selection.hint());
    }
    process::exit(error.exit_code());
}

fn main() {
    let config = match Configuration::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(error) => fail(&error),
    };

    init_logging(config.verbose);
    let ffmpeg_level = config
        .log_level
        .unwrap_or_else(|| FfmpegLogLevel::for_run(config.verbose));
    subgif::set_ffmpeg_log_level(ffmpeg_level);

    if let Err(error) = run(&config) {
        match error.downcast::<SubgifError>() {
            Ok(error) => fail(&error),
            Err(other) => {
                eprintln!("{} {other}", "error:".red().bold());
                process::exit(subgif::error::EXIT_FAILURE);
            }
        }
    }
    process::exit(EXIT_SUCCESS);
}
