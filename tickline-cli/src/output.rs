use std::fmt::Write as _;

use clap::ValueEnum;

use tickline_core::model::{StatusCounts, Tick};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn render_ticks(ticks: &[Tick], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(ticks),
        OutputFormat::Table => Ok(ticks_table(ticks)),
    }
}

fn ticks_table(ticks: &[Tick]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12} {:>12} {:>5}  {:<8} {:<5} {:>6} {:>6} {:>7} {:>6}",
        "START", "END", "WIDTH", "STATUS", "EDGES", "OK", "MISSED", "TIMEOUT", "ERROR"
    );
    for tick in ticks {
        let totals = tick
            .env_mapping
            .values()
            .fold(StatusCounts::default(), |acc, c| acc + *c);
        let _ = writeln!(
            out,
            "{:>12} {:>12} {:>5}  {:<8} {:<5} {:>6} {:>6} {:>7} {:>6}",
            tick.start_ts,
            tick.end_ts,
            tick.width,
            tick.status().label(),
            edges(tick),
            totals.ok,
            totals.missed,
            totals.timeout,
            totals.error,
        );
    }
    out
}

fn edges(tick: &Tick) -> &'static str {
    match (tick.rounded_left, tick.rounded_right) {
        (true, true) => "(  )",
        (true, false) => "(  |",
        (false, true) => "|  )",
        (false, false) => "|  |",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickline_core::model::EnvironmentMapping;

    fn sample() -> Vec<Tick> {
        vec![Tick {
            start_ts: 1,
            end_ts: 4,
            width: 4,
            rounded_left: true,
            rounded_right: false,
            env_mapping: EnvironmentMapping::from([
                ("prod".to_string(), StatusCounts::new(3, 0, 0, 1)),
                ("dev".to_string(), StatusCounts::new(1, 0, 0, 0)),
            ]),
        }]
    }

    #[test]
    fn test_table_sums_envs() {
        let table = render_ticks(&sample(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("STATUS"));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("(  |"));
        let cols: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(&cols[cols.len() - 4..], ["4", "0", "0", "1"]);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = render_ticks(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["endTs"], 4);
        assert_eq!(value[0]["envMapping"]["prod"]["error"], 1);
    }
}
