use crate::orchestrator::{PipelineObserver, PipelineReport, Stage, StageResult};
use crate::ui::icons::{CHECK, CROSS, SPARKLE};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal progress for one pipeline run, rendered via `indicatif`.
///
/// Two bars are stacked vertically:
/// - Stage bar: how many of the six stages have finished
/// - Agent spinner: the agent currently working
///
/// Both draw to stderr, so stdout stays reserved for the generated text.
pub struct PipelineUI {
    multi: MultiProgress,
    stage_bar: ProgressBar,
    agent_bar: ProgressBar,
    verbose: bool,
}

impl PipelineUI {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let stage_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let stage_bar = multi.add(ProgressBar::new(Stage::ALL.len() as u64));
        stage_bar.set_style(stage_style);
        stage_bar.set_prefix("Stages");

        let agent_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg} {elapsed:.dim}")
            .expect("progress bar template is a valid static string");

        let agent_bar = multi.add(ProgressBar::new_spinner());
        agent_bar.set_style(agent_style);
        agent_bar.set_prefix(" Agent");

        Self {
            multi,
            stage_bar,
            agent_bar,
            verbose,
        }
    }

    /// Print a line above the bars, falling back to `eprintln!` if drawing fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Clear the bars and print a one-line summary of the run.
    pub fn finish(&self, report: &PipelineReport) {
        self.agent_bar.finish_and_clear();
        self.stage_bar.finish_and_clear();

        let failed = report.failed_stages();
        if failed.is_empty() {
            self.print_line(format!(
                "{}{}",
                SPARKLE,
                style("Pipeline complete: all stages succeeded").green().bold()
            ));
        } else {
            let names: Vec<&str> = failed.iter().map(|s| s.as_str()).collect();
            self.print_line(format!(
                "{}{} {}",
                CROSS,
                style(format!("Pipeline finished with {} failed stage(s):", failed.len()))
                    .yellow()
                    .bold(),
                names.join(", ")
            ));
        }
        self.print_line(format!("{}", style(format!("run id: {}", report.run_id)).dim()));
    }
}

impl PipelineObserver for PipelineUI {
    fn stage_started(&self, stage: Stage, prompt: &str) {
        self.stage_bar
            .set_message(format!("{}", style(stage.as_str()).yellow()));
        self.agent_bar.set_message(format!(
            "{} {}",
            style(stage.agent_name()).cyan(),
            style("(working...)").dim()
        ));
        self.agent_bar.enable_steady_tick(Duration::from_millis(100));
        if self.verbose {
            self.print_line(format!(
                "    {} {} prompt: {} chars",
                style("→").dim(),
                stage.agent_name(),
                prompt.chars().count()
            ));
        }
    }

    fn stage_finished(&self, result: &StageResult) {
        self.agent_bar.disable_steady_tick();
        self.agent_bar.set_message("");
        self.stage_bar.inc(1);

        let icon = if result.succeeded { CHECK } else { CROSS };
        let name = if result.succeeded {
            style(result.stage.as_str()).green().bold()
        } else {
            style(result.stage.as_str()).red().bold()
        };
        self.print_line(format!(
            "{}[{}/{}] {} {}",
            icon,
            result.stage.position(),
            Stage::ALL.len(),
            name,
            style(format!(
                "{:.1}s, {} chars",
                result.duration_seconds,
                result.text.chars().count()
            ))
            .dim()
        ));
    }
}
