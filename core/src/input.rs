use std::collections::HashMap;

use crate::error::TaskError;
use crate::model::task::{IntervalUnit, TaskColor};
use crate::time::parse_interval;

pub const OPTION_KEYS: [&str; 2] = ["every", "color"];

/// Free words plus `key:value` options, as typed after `add`.
#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub title: String,
    pub options: HashMap<String, String>,
}

/// A fully resolved `add` request.
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    pub title: String,
    pub interval_value: i64,
    pub interval_unit: IntervalUnit,
    pub color: TaskColor,
}

/// Splits `args` into title words and `key:value` options. A word is an
/// option only when its key names one of `keys`, or a unique prefix of one;
/// anything else, like `10:30` or a URL, stays in the title.
pub fn parse_args(args: &[String], keys: &[&str]) -> ParsedInput {
    let mut title_parts = Vec::new();
    let mut options = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && !value.is_empty() {
                if let Ok(key) = expand_key(&key.to_lowercase(), keys) {
                    options.insert(key, value.to_string());
                    continue;
                }
            }
        }
        title_parts.push(arg.as_str());
    }

    ParsedInput {
        title: title_parts.join(" "),
        options,
    }
}

/// Resolves an exact key or an unambiguous prefix of one.
pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String, TaskError> {
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(TaskError::UnknownOption(key.to_string())),
        _ => Err(TaskError::AmbiguousOption(key.to_string(), matches.join(", "))),
    }
}

/// Turns `Drink water every:30m color:green` into an [`AddRequest`].
/// Missing options default to every minute, blue.
pub fn parse_add(args: &[String]) -> Result<AddRequest, TaskError> {
    let parsed = parse_args(args, &OPTION_KEYS);
    let mut request = AddRequest {
        title: parsed.title,
        interval_value: 1,
        interval_unit: IntervalUnit::default(),
        color: TaskColor::default(),
    };

    for (key, value) in parsed.options {
        match key.as_str() {
            "every" => {
                let (value, unit) = parse_interval(&value)?;
                request.interval_value = i64::from(value);
                request.interval_unit = unit;
            }
            "color" => request.color = value.parse()?,
            _ => {}
        }
    }

    Ok(request)
}
