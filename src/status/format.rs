//! Human readable status summary

use super::types::{ErrorCount, MapCount, Status};
use crate::defaults;
use crate::output::strip_ansi_codes;
use owo_colors::OwoColorize;
use std::io::Write;

const LABEL_WIDTH: usize = 23;
const NAME_WIDTH: usize = 25;

const LOGO: [&str; 5] = [
    "    /¯¯\\      ",
    " /¯¯\\__/¯¯\\   ",
    " \\__/¯¯\\__/   ",
    " /¯¯\\__/¯¯\\   ",
    " \\__/¯¯\\__/   ",
];
const LOGO_FOOTER: &str = "    \\__/       ";

/// Components shown next to the logo, in order
const COMPONENTS: [(&str, &str); 5] = [
    ("Cilium:", defaults::AGENT_DAEMONSET_NAME),
    ("Operator:", defaults::OPERATOR_DEPLOYMENT_NAME),
    ("Envoy DaemonSet:", defaults::ENVOY_DAEMONSET_NAME),
    ("Hubble Relay:", defaults::RELAY_DEPLOYMENT_NAME),
    ("ClusterMesh:", defaults::CLUSTERMESH_DEPLOYMENT_NAME),
];

fn pad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}

/// One row of the detail section, the label is only printed on the first row
fn row(out: &mut String, label: &str, first: bool, name: &str, value: &str) {
    let label = if first { label } else { "" };
    out.push_str(&format!(
        "{}{}{}\n",
        pad(label, LABEL_WIDTH),
        pad(name, NAME_WIDTH),
        value
    ));
}

fn format_counts(counts: &MapCount) -> String {
    counts
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Status {
    /// One-word health of a component: OK, disabled, or its finding counts
    pub fn component_summary(&self, component: &str) -> String {
        if self.is_disabled(component) {
            return "disabled".dimmed().to_string();
        }

        let (errors, warnings) = self
            .errors
            .get(component)
            .map(|pods| {
                pods.values().fold((0, 0), |(e, w), c| {
                    (e + c.errors.len(), w + c.warnings.len())
                })
            })
            .unwrap_or_default();

        match (errors, warnings) {
            (0, 0) => "OK".green().to_string(),
            (0, w) => format!("{w} warnings").yellow().to_string(),
            (e, 0) => format!("{e} errors").red().to_string(),
            (e, w) => format!(
                "{}, {}",
                format!("{e} errors").red(),
                format!("{w} warnings").yellow()
            ),
        }
    }

    /// Render the summary shown by `cilium-status status`
    pub fn format(&self) -> String {
        let mut out = String::new();

        for (i, (label, component)) in COMPONENTS.iter().enumerate() {
            out.push_str(LOGO[i]);
            out.push_str(&pad(label, 20));
            out.push_str(&self.component_summary(component));
            out.push('\n');
        }
        out.push_str(LOGO_FOOTER);
        out.push_str("\n\n");

        for (i, (name, state)) in self.pod_state.iter().enumerate() {
            let label = if i == 0 { "Workloads:" } else { "" };
            row(
                &mut out,
                label,
                true,
                &format!("{} {}", state.kind, name),
                &format!(
                    "Desired: {}, Ready: {}/{}, Available: {}/{}",
                    state.desired, state.ready, state.desired, state.available, state.desired
                ),
            );
        }

        for (i, (name, phases)) in self
            .phase_count
            .iter()
            .filter(|(_, p)| !p.is_empty())
            .enumerate()
        {
            row(&mut out, "Containers:", i == 0, name, &format_counts(phases));
        }

        row(
            &mut out,
            "Cluster Pods:",
            true,
            &format!(
                "{}/{} managed by Cilium",
                self.pods_count.by_cilium, self.pods_count.all
            ),
            "",
        );

        if !self.helm_chart_version.is_empty() {
            row(&mut out, "Helm chart version:", true, &self.helm_chart_version, "");
        }

        let mut first = true;
        for (name, images) in &self.image_count {
            for (image, count) in images {
                row(&mut out, "Image versions", first, name, &format!("{image}: {count}"));
                first = false;
            }
        }

        self.findings(&mut out, "Errors:".red().to_string(), |c| &c.errors);
        self.findings(&mut out, "Warnings:".yellow().to_string(), |c| &c.warnings);

        for (i, err) in self.config_errors.iter().enumerate() {
            row(&mut out, "Configuration:", i == 0, err, "");
        }

        for (i, err) in self.collection_errors.iter().enumerate() {
            row(&mut out, "Collection errors:", i == 0, err, "");
        }

        out
    }

    /// List one kind of finding of every component and pod under `label`
    fn findings(
        &self,
        out: &mut String,
        label: String,
        pick: impl Fn(&ErrorCount) -> &Vec<String>,
    ) {
        let mut label = Some(label);
        for (component, pods) in &self.errors {
            for (pod, counts) in pods {
                for finding in pick(counts) {
                    let heading = label.take().unwrap_or_default();
                    out.push_str(&format!(
                        "{}{}{}\t{}\n",
                        pad(&heading, LABEL_WIDTH + ansi_len(&heading)),
                        pad(component, NAME_WIDTH),
                        pod,
                        finding
                    ));
                }
            }
        }
    }
}

/// Number of bytes taken by ANSI escape sequences in `s`
fn ansi_len(s: &str) -> usize {
    s.len() - strip_ansi_codes(s).len()
}

/// Terminal width of stdout, 80 columns when it cannot be determined
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .ok()
        .filter(|w| *w > 0)
        .unwrap_or(80)
}

/// Number of terminal lines `text` occupies once wrapped at `width` columns
pub fn count_wrapped_lines(text: &str, width: usize) -> usize {
    let width = width.max(1);
    1 + text
        .split('\n')
        .map(|line| strip_ansi_codes(line).chars().count().div_ceil(width))
        .sum::<usize>()
}

/// Move the cursor up `lines` lines, clearing each of them
pub fn cursor_up(lines: usize) -> std::io::Result<()> {
    if lines == 0 {
        return Ok(());
    }
    let mut stdout = std::io::stdout();
    for _ in 0..lines {
        crossterm::execute!(
            stdout,
            crossterm::cursor::MoveUp(1),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::CurrentLine)
        )?;
    }
    stdout.flush()
}
