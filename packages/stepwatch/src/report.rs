//! Tabular summaries of timer durations.

use std::fmt;

use crate::{TOTAL_TIMER_NAME, Timer};

const TITLE: &str = "Timing of different code aspects";
const TOTAL_HUMAN_LABEL: &str = "Total (human readable)";
const DEFAULT_UNIT_LABEL: &str = "per time step";
const DEFAULT_WIDTH: usize = 128;

// Widths of the cell contents; each cell adds one space of padding on both sides.
const SECONDS_WIDTH: usize = 10;
const PER_UNIT_WIDTH: usize = 13;
const PERCENTAGE_WIDTH: usize = 10;

const SECONDS_PRECISION: usize = 5;
const PER_UNIT_PRECISION: usize = 6;

/// A snapshot of the durations of all timers in a registry.
///
/// Rows are in alphabetical order with the Total timer last. Every row shows the duration in
/// seconds, the duration divided by the number of units of work (typically steps) and the
/// share of the Total timer's duration.
///
/// The [`Display`](fmt::Display) implementation renders a fixed-width table centered in 128
/// columns; [`render()`](Self::render) accepts any other width.
///
/// # Examples
///
/// ```
/// use stepwatch::Registry;
///
/// let registry = Registry::new();
/// registry.total().start();
/// registry.timer("solve").add_seconds(3.0);
/// registry.stop_all();
///
/// let report = registry.report(100);
/// report.print_to_stdout();
///
/// let solve = &report.rows()[0];
/// assert_eq!(solve.name(), "solve");
/// assert!((solve.per_unit().unwrap() - 0.03).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    rows: Vec<ReportRow>,
    total_human_readable: String,
    unit_label: String,
}

/// One timer's line in a [`Report`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    name: String,
    seconds: f64,
    per_unit: Option<f64>,
    percentage: Option<f64>,
}

impl Report {
    pub(crate) fn from_timers(timers: &[Timer], units: u64) -> Self {
        for timer in timers {
            timer.update_duration();
        }

        let total_seconds = timers
            .iter()
            .find(|timer| timer.name() == TOTAL_TIMER_NAME)
            .map_or(0.0, Timer::duration_seconds);

        let total_human_readable = timers
            .iter()
            .find(|timer| timer.name() == TOTAL_TIMER_NAME)
            .map(Timer::human_readable)
            .unwrap_or_default();

        let rows = timers
            .iter()
            .map(|timer| ReportRow::new(timer.name(), timer.duration_seconds(), units, total_seconds))
            .collect();

        Self {
            rows,
            total_human_readable,
            unit_label: DEFAULT_UNIT_LABEL.to_owned(),
        }
    }

    /// Replaces the `per time step` header of the per-unit column.
    ///
    /// Labels longer than the column are cut to fit.
    #[must_use]
    pub fn with_unit_label(mut self, label: &str) -> Self {
        self.unit_label = label.chars().take(PER_UNIT_WIDTH.saturating_add(2)).collect();
        self
    }

    /// The rows of the report, Total last.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Whether the report has no rows at all, as is the case for a disabled registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prints the table to stdout.
    ///
    /// Prints nothing if the report is empty.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        println!("{self}");
    }

    /// Renders the table centered in a terminal that is `width` columns wide.
    ///
    /// Every line ends with a newline. An empty report renders as an empty string.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        if self.is_empty() {
            return String::new();
        }

        let name_width = self
            .rows
            .iter()
            .map(|row| row.name.chars().count())
            .chain([TOTAL_HUMAN_LABEL.len()])
            .max()
            .unwrap_or(0);

        let name_cell = name_width.saturating_add(2);
        let seconds_cell = SECONDS_WIDTH.saturating_add(2);
        let per_unit_cell = PER_UNIT_WIDTH.saturating_add(2);
        let percentage_cell = PERCENTAGE_WIDTH.saturating_add(2);
        let duration_cell = seconds_cell.saturating_add(per_unit_cell).saturating_add(1);
        let numbers_cell = duration_cell.saturating_add(percentage_cell).saturating_add(1);
        let inner_width = name_cell.saturating_add(numbers_cell).saturating_add(1);
        let line_width = inner_width.saturating_add(2);

        let indent = " ".repeat(width.saturating_sub(line_width) / 2);
        let separator = format!(
            "|{}|{}|{}|{}|",
            "-".repeat(name_cell),
            "-".repeat(seconds_cell),
            "-".repeat(per_unit_cell),
            "-".repeat(percentage_cell)
        );

        let mut lines = vec![
            format!(" {} ", "_".repeat(inner_width)),
            format!("|{TITLE:^inner_width$}|"),
            format!("|{}|", "-".repeat(inner_width)),
            format!("|{:^name_cell$}|{:^duration_cell$}|{:^percentage_cell$}|", "Code Aspect", "Duration", "Percentage"),
            format!(
                "|{:name_cell$}|{:^seconds_cell$}|{:^per_unit_cell$}|{:^percentage_cell$}|",
                "", "seconds", self.unit_label, "over total"
            ),
            separator.clone(),
        ];

        for row in &self.rows {
            lines.push(format!(
                "| {:<name_width$} | {:>SECONDS_WIDTH$} | {:>PER_UNIT_WIDTH$} | {:>PERCENTAGE_WIDTH$} |",
                row.name,
                format_general(row.seconds, SECONDS_PRECISION),
                row.per_unit
                    .map_or_else(|| "-".to_owned(), |value| format_general(value, PER_UNIT_PRECISION)),
                row.percentage
                    .map_or_else(|| "-".to_owned(), |value| format!("{value:.2}")),
            ));
        }

        let human_width = numbers_cell.saturating_sub(2);
        lines.push(separator);
        lines.push(format!(
            "| {TOTAL_HUMAN_LABEL:<name_width$} | {:>human_width$} |",
            self.total_human_readable
        ));
        lines.push(format!("|{}|", "_".repeat(inner_width)));

        lines
            .into_iter()
            .map(|line| format!("{indent}{line}\n"))
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_WIDTH))
    }
}

impl ReportRow {
    #[expect(
        clippy::cast_precision_loss,
        reason = "unit counts beyond 2^52 are unrealistic"
    )]
    fn new(name: &str, seconds: f64, units: u64, total_seconds: f64) -> Self {
        Self {
            name: name.to_owned(),
            seconds,
            per_unit: (units != 0).then(|| seconds / units as f64),
            percentage: (total_seconds > 0.0).then(|| seconds / total_seconds * 100.0),
        }
    }

    /// The timer's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The timer's duration in seconds.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// The duration divided by the number of units, or `None` if the report covers zero units.
    #[must_use]
    pub fn per_unit(&self) -> Option<f64> {
        self.per_unit
    }

    /// The duration as a percentage of the Total timer, or `None` if Total has no elapsed time.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

/// Formats `value` like the C `%.{precision}g` conversion.
///
/// Uses fixed notation when the decimal exponent lies in `-4..precision` and scientific notation
/// otherwise; trailing zeros are removed in both cases.
pub(crate) fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }

    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_owned()
        } else if value > 0.0 {
            "inf".to_owned()
        } else {
            "-inf".to_owned()
        };
    }

    let precision = precision.max(1);
    let mantissa_digits = precision.saturating_sub(1);

    // Rounding to the requested precision can bump the exponent (9.99999 -> 1.0000e1), so the
    // exponent is taken from the rounded scientific form.
    let scientific = format!("{value:.mantissa_digits$e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("scientific formatting always contains an exponent");
    let exponent: i32 = exponent
        .parse()
        .expect("scientific formatting always produces an integer exponent");

    let precision_exponent = i32::try_from(precision).unwrap_or(i32::MAX);

    if (-4..precision_exponent).contains(&exponent) {
        let decimals = usize::try_from(precision_exponent.saturating_sub(1).saturating_sub(exponent))
            .unwrap_or(0);

        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };

        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.unsigned_abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
