use std::fs::File;
use std::io::Write;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::schedule::{DayIndex, RankedSchedule, Team, VerificationRow};

/// Rejects week starts that are not a Monday
pub fn parse_week_start(value: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", value, e))?;
    if date.weekday() != Weekday::Mon {
        return Err(format!("{} is a {:?}, not a Monday", date, date.weekday()));
    }
    Ok(date)
}

/// Day name, followed by its date when the week start is known
pub fn day_label(day: DayIndex, week_start: Option<NaiveDate>) -> String {
    match week_start {
        Some(start) => {
            let date = start + Duration::days(day.index() as i64);
            format!("{} {}", day.name(), date.format("%m/%d"))
        }
        None => day.name().to_string(),
    }
}

/// Formats team members as a comma separated list
pub fn format_team(team: &Team) -> String {
    team.names().join(", ")
}

pub fn verification_note(row: &VerificationRow) -> &'static str {
    if row.on_leave {
        "leave applied (3+ days off)"
    } else {
        "-"
    }
}

/// Prints one ranked schedule as a day-by-day table
pub fn print_schedule(rank: usize, ranked: &RankedSchedule, week_start: Option<NaiveDate>) {
    println!("\n=== Option {} ===", rank);
    println!(
        "Red-day variance: {:.3}, team strength variance: {:.3}",
        ranked.red_day_variance, ranked.team_strength_variance
    );
    for (day, team) in ranked.schedule.days() {
        println!(
            "  {:<16} {} ({} people)",
            day_label(day, week_start),
            format_team(team),
            team.len()
        );
    }
}

/// Prints the per-member target/actual check
pub fn print_verification(rows: &[VerificationRow]) {
    let width = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(6).max(6);
    println!("\n  Shift check:");
    println!("  {:<width$}  target  actual  note", "member", width = width);
    for row in rows {
        println!(
            "  {:<width$}  {:>6}  {:>6}  {}",
            row.name,
            row.target,
            row.actual,
            verification_note(row),
            width = width
        );
    }
}

/// Writes all ranked schedules to a plain text file, one line per day
pub fn write_schedules_to_file(
    schedules: &[RankedSchedule],
    week_start: Option<NaiveDate>,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    for (i, ranked) in schedules.iter().enumerate() {
        writeln!(file, "** Option {} **", i + 1)?;
        for (day, team) in ranked.schedule.days() {
            writeln!(file, "{} {}", day_label(day, week_start), format_team(team))?;
        }
        writeln!(file)?;
    }

    Ok(())
}
