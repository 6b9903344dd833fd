use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;

/// How many month boundaries to scan before giving up on a monthly rule.
const MONTH_SEARCH_WINDOW: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthWeekday {
    Nth(u8),
    Last,
}

/// A repeat specification, normalized to a compact 5-field string:
/// `minute hour day-of-month month day-of-week`, unused fields `*`.
///
/// The day-of-week field is either a comma list of weekday numbers
/// (0 = Sunday) or an nth-weekday form: `5#2` is the second Friday,
/// `5#L` (or `5L`) the last Friday of the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatRule {
    Once {
        minute: u32,
        hour: u32,
        day: u32,
        month: u32,
    },
    Daily {
        minute: u32,
        hour: u32,
    },
    Weekly {
        minute: u32,
        hour: u32,
        weekdays: Vec<u8>,
    },
    MonthlyDay {
        minute: u32,
        hour: u32,
        day: u32,
    },
    MonthlyNth {
        minute: u32,
        hour: u32,
        weekday: u8,
        nth: NthWeekday,
    },
}

impl RepeatRule {
    pub fn once(month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self::Once {
            minute,
            hour,
            day,
            month,
        }
    }

    pub fn daily(hour: u32, minute: u32) -> Self {
        Self::Daily { minute, hour }
    }

    pub fn weekly(mut weekdays: Vec<u8>, hour: u32, minute: u32) -> Self {
        weekdays.sort_unstable();
        weekdays.dedup();
        Self::Weekly {
            minute,
            hour,
            weekdays,
        }
    }

    pub fn monthly_day(day: u32, hour: u32, minute: u32) -> Self {
        Self::MonthlyDay { minute, hour, day }
    }

    pub fn monthly_nth(weekday: u8, nth: NthWeekday, hour: u32, minute: u32) -> Self {
        Self::MonthlyNth {
            minute,
            hour,
            weekday,
            nth,
        }
    }

    pub fn is_one_time(&self) -> bool {
        matches!(self, Self::Once { .. })
    }

    /// Next fire time strictly after `after`, at minute granularity.
    ///
    /// One-time rules are the exception: their literal date in the reference
    /// year is returned even when it has already passed. The scheduler, not
    /// this calculator, decides what an elapsed one-time rule means.
    pub fn next_occurrence(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            Self::Once {
                minute,
                hour,
                day,
                month,
            } => {
                let date = NaiveDate::from_ymd_opt(after.year(), *month, *day)?;
                local_at(date, *hour, *minute)
            }
            Self::Daily { minute, hour } => {
                let today = after.date_naive();
                if let Some(candidate) = local_at(today, *hour, *minute) {
                    if candidate > after {
                        return Some(candidate);
                    }
                }
                local_at(today.checked_add_days(Days::new(1))?, *hour, *minute)
            }
            Self::Weekly {
                minute,
                hour,
                weekdays,
            } => {
                let today = after.date_naive();
                for offset in 0..=7u64 {
                    let date = today.checked_add_days(Days::new(offset))?;
                    let weekday = date.weekday().num_days_from_sunday() as u8;
                    if !weekdays.contains(&weekday) {
                        continue;
                    }
                    if let Some(candidate) = local_at(date, *hour, *minute) {
                        if candidate > after {
                            return Some(candidate);
                        }
                    }
                }
                None
            }
            Self::MonthlyDay { minute, hour, day } => {
                for offset in 0..MONTH_SEARCH_WINDOW {
                    let (year, month) = add_months(after.year(), after.month(), offset);
                    // months without this day (e.g. 31 in February) are skipped
                    let Some(date) = NaiveDate::from_ymd_opt(year, month, *day) else {
                        continue;
                    };
                    if let Some(candidate) = local_at(date, *hour, *minute) {
                        if candidate > after {
                            return Some(candidate);
                        }
                    }
                }
                None
            }
            Self::MonthlyNth {
                minute,
                hour,
                weekday,
                nth,
            } => {
                for offset in 0..MONTH_SEARCH_WINDOW {
                    let (year, month) = add_months(after.year(), after.month(), offset);
                    let Some(date) = nth_weekday_in_month(year, month, *weekday, *nth) else {
                        continue;
                    };
                    if let Some(candidate) = local_at(date, *hour, *minute) {
                        if candidate > after {
                            return Some(candidate);
                        }
                    }
                }
                None
            }
        }
    }
}

impl fmt::Display for RepeatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once {
                minute,
                hour,
                day,
                month,
            } => write!(f, "{minute} {hour} {day} {month} *"),
            Self::Daily { minute, hour } => write!(f, "{minute} {hour} * * *"),
            Self::Weekly {
                minute,
                hour,
                weekdays,
            } => {
                let days = weekdays
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "{minute} {hour} * * {days}")
            }
            Self::MonthlyDay { minute, hour, day } => write!(f, "{minute} {hour} {day} * *"),
            Self::MonthlyNth {
                minute,
                hour,
                weekday,
                nth,
            } => match nth {
                NthWeekday::Nth(n) => write!(f, "{minute} {hour} * * {weekday}#{n}"),
                NthWeekday::Last => write!(f, "{minute} {hour} * * {weekday}#L"),
            },
        }
    }
}

impl FromStr for RepeatRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 5 {
            bail!("expected 5 fields, got {} in {s:?}", fields.len());
        }
        let minute = parse_field(fields[0], 0, 59).context("minute field")?;
        let hour = parse_field(fields[1], 0, 23).context("hour field")?;
        let day = parse_wildcard_field(fields[2], 1, 31).context("day-of-month field")?;
        let month = parse_wildcard_field(fields[3], 1, 12).context("month field")?;
        let dow = parse_dow_field(fields[4]).context("day-of-week field")?;

        match (day, month, dow) {
            (None, None, DowField::Any) => Ok(Self::Daily { minute, hour }),
            (Some(day), Some(month), DowField::Any) => Ok(Self::Once {
                minute,
                hour,
                day,
                month,
            }),
            (Some(day), None, DowField::Any) => Ok(Self::MonthlyDay { minute, hour, day }),
            (None, None, DowField::List(weekdays)) => Ok(Self::Weekly {
                minute,
                hour,
                weekdays,
            }),
            (None, None, DowField::Nth(weekday, nth)) => Ok(Self::MonthlyNth {
                minute,
                hour,
                weekday,
                nth,
            }),
            _ => bail!("unsupported field combination in rule {s:?}"),
        }
    }
}

enum DowField {
    Any,
    List(Vec<u8>),
    Nth(u8, NthWeekday),
}

fn parse_field(field: &str, min: u32, max: u32) -> Result<u32> {
    let value: u32 = field
        .parse()
        .with_context(|| format!("not a number: {field:?}"))?;
    if value < min || value > max {
        bail!("{value} out of range {min}..={max}");
    }
    Ok(value)
}

fn parse_wildcard_field(field: &str, min: u32, max: u32) -> Result<Option<u32>> {
    if field == "*" {
        return Ok(None);
    }
    parse_field(field, min, max).map(Some)
}

fn parse_dow_field(field: &str) -> Result<DowField> {
    if field == "*" {
        return Ok(DowField::Any);
    }
    if let Some((weekday, nth)) = field.split_once('#') {
        let weekday = parse_field(weekday, 0, 6)? as u8;
        if nth == "L" {
            return Ok(DowField::Nth(weekday, NthWeekday::Last));
        }
        let nth = parse_field(nth, 1, 5)? as u8;
        return Ok(DowField::Nth(weekday, NthWeekday::Nth(nth)));
    }
    if let Some(weekday) = field.strip_suffix('L') {
        let weekday = parse_field(weekday, 0, 6)? as u8;
        return Ok(DowField::Nth(weekday, NthWeekday::Last));
    }
    let mut weekdays = Vec::new();
    for part in field.split(',') {
        weekdays.push(parse_field(part, 0, 6)? as u8);
    }
    weekdays.sort_unstable();
    weekdays.dedup();
    Ok(DowField::List(weekdays))
}

fn local_at(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_hms_opt(hour, minute, 0)?)
        .single()
}

fn add_months(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + offset as i32;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

fn nth_weekday_in_month(year: i32, month: u32, weekday: u8, nth: NthWeekday) -> Option<NaiveDate> {
    match nth {
        NthWeekday::Nth(n) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let first_weekday = first.weekday().num_days_from_sunday() as u8;
            let offset = (weekday + 7 - first_weekday) % 7;
            let day = 1 + offset as u32 + (n as u32 - 1) * 7;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        NthWeekday::Last => {
            let (next_year, next_month) = add_months(year, month, 1);
            let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
            let last_weekday = last.weekday().num_days_from_sunday() as u8;
            let back = (last_weekday + 7 - weekday) % 7;
            last.checked_sub_days(Days::new(back as u64))
        }
    }
}
