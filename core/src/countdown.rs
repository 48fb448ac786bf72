use std::fmt;

use chrono::{DateTime, Local, Utc};

use crate::model::task::Task;

/// Time left until a task's next reminder, at display granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Paused,
    /// Due, waiting for the next due-check.
    Imminent,
    /// A day or more away.
    On(DateTime<Utc>),
    Hours { hours: i64, minutes: i64 },
    Minutes { minutes: i64, seconds: i64 },
}

pub fn countdown(task: &Task, now: DateTime<Utc>) -> Countdown {
    if !task.active {
        return Countdown::Paused;
    }

    let left = task.next_notification_at - now;
    if left.num_milliseconds() <= 0 {
        return Countdown::Imminent;
    }

    if left.num_days() > 0 {
        Countdown::On(task.next_notification_at)
    } else if left.num_milliseconds() > 3_600_000 {
        Countdown::Hours {
            hours: left.num_hours(),
            minutes: left.num_minutes() % 60,
        }
    } else {
        Countdown::Minutes {
            minutes: left.num_minutes(),
            seconds: left.num_seconds() % 60,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Paused => write!(f, "paused"),
            Countdown::Imminent => write!(f, "any moment"),
            Countdown::On(at) => write!(f, "{}", at.with_timezone(&Local).format("%b %-d %H:%M")),
            Countdown::Hours { hours, minutes } => write!(f, "in {hours}h {minutes:02}m"),
            Countdown::Minutes { minutes, seconds } => write!(f, "in {minutes}m {seconds:02}s"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{IntervalUnit, TaskColor};
    use chrono::{Duration, TimeZone};

    fn task_due_in(left: Duration) -> (Task, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let mut task = Task::new("Tea".to_string(), 1, IntervalUnit::Minutes, TaskColor::Blue, now);
        task.next_notification_at = now + left;
        (task, now)
    }

    #[test]
    fn test_paused() {
        let (mut task, now) = task_due_in(Duration::minutes(5));
        task.pause();
        assert_eq!(countdown(&task, now), Countdown::Paused);
        assert_eq!(countdown(&task, now).to_string(), "paused");
    }

    #[test]
    fn test_overdue_is_imminent() {
        let (task, now) = task_due_in(Duration::seconds(-3));
        assert_eq!(countdown(&task, now), Countdown::Imminent);
        let (task, now) = task_due_in(Duration::zero());
        assert_eq!(countdown(&task, now).to_string(), "any moment");
    }

    #[test]
    fn test_minutes_and_seconds() {
        let (task, now) = task_due_in(Duration::seconds(4 * 60 + 9));
        assert_eq!(countdown(&task, now), Countdown::Minutes { minutes: 4, seconds: 9 });
        assert_eq!(countdown(&task, now).to_string(), "in 4m 09s");

        let (task, now) = task_due_in(Duration::hours(1));
        assert_eq!(countdown(&task, now).to_string(), "in 60m 00s");
    }

    #[test]
    fn test_hours_and_minutes() {
        let (task, now) = task_due_in(Duration::minutes(2 * 60 + 5) + Duration::seconds(30));
        assert_eq!(countdown(&task, now), Countdown::Hours { hours: 2, minutes: 5 });
        assert_eq!(countdown(&task, now).to_string(), "in 2h 05m");
    }

    #[test]
    fn test_a_day_or_more_shows_the_date() {
        let (task, now) = task_due_in(Duration::days(2));
        assert_eq!(countdown(&task, now), Countdown::On(task.next_notification_at));
    }
}
