/// Nicknames understood by cron.d in place of the five fields.
const SCHEDULE_MACROS: [&str; 8] = [
    "@reboot",
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AliasKind {
    None,
    Month,
    Weekday,
}

/// Checks a schedule as cron.d would read it: a macro such as `@daily`, or
/// five fields of numbers, names, ranges, steps and lists.
pub fn validate_cron_expression(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('@') {
        if SCHEDULE_MACROS.contains(&trimmed.to_ascii_lowercase().as_str()) {
            return Ok(());
        }
        return Err(format!("unknown cron macro `{trimmed}`"));
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!(
            "cron expression `{raw}` must use 5 fields: minute hour day_of_month month day_of_week"
        ));
    }
    validate_field(fields[0], 0, 59, AliasKind::None)?;
    validate_field(fields[1], 0, 23, AliasKind::None)?;
    validate_field(fields[2], 1, 31, AliasKind::None)?;
    validate_field(fields[3], 1, 12, AliasKind::Month)?;
    validate_field(fields[4], 0, 7, AliasKind::Weekday)
}

fn validate_field(raw: &str, min: u32, max: u32, aliases: AliasKind) -> Result<(), String> {
    raw.split(',')
        .try_for_each(|segment| validate_segment(segment, min, max, aliases))
}

fn validate_segment(raw: &str, min: u32, max: u32, aliases: AliasKind) -> Result<(), String> {
    let range_raw = match raw.split_once('/') {
        Some((range, step_raw)) => {
            let step = step_raw
                .parse::<u32>()
                .map_err(|_| format!("invalid cron step `{step_raw}`"))?;
            if step == 0 {
                return Err("cron step must be >= 1".to_string());
            }
            range
        }
        None => raw,
    };
    if range_raw == "*" {
        return Ok(());
    }

    let (start, end) = match range_raw.split_once('-') {
        Some((start_raw, end_raw)) => (
            cron_value(start_raw, min, max, aliases)?,
            cron_value(end_raw, min, max, aliases)?,
        ),
        None => {
            let value = cron_value(range_raw, min, max, aliases)?;
            (value, value)
        }
    };
    if start > end {
        return Err(format!("invalid cron range `{raw}`"));
    }
    Ok(())
}

fn cron_value(raw: &str, min: u32, max: u32, aliases: AliasKind) -> Result<u32, String> {
    let lower = raw.to_ascii_lowercase();
    let named = match aliases {
        AliasKind::None => None,
        AliasKind::Month => MONTH_NAMES
            .iter()
            .position(|name| *name == lower)
            .map(|idx| idx as u32 + 1),
        AliasKind::Weekday => WEEKDAY_NAMES
            .iter()
            .position(|name| *name == lower)
            .map(|idx| idx as u32),
    };
    let value = match named {
        Some(value) => value,
        None => lower
            .parse::<u32>()
            .map_err(|_| format!("invalid cron value `{raw}`"))?,
    };
    if value < min || value > max {
        return Err(format!("cron value `{raw}` is out of range {min}-{max}"));
    }
    Ok(value)
}
