//! Item compte à rebours : horloge, chronomètre, heure de fin ou durée.
//!
//! L'échéance est recalculée à chaque activation de l'item, jamais figée au
//! chargement de la playlist.

use chrono::{DateTime, Duration, Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::payload::RenderPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownMode {
    /// Horloge simple, pas d'échéance.
    Clock,
    /// Chronomètre démarrant à l'activation.
    Stopwatch,
    /// Compte à rebours vers l'heure donnée (aujourd'hui, sinon demain).
    EndTime,
    /// Compte à rebours d'une durée donnée à partir de l'activation.
    Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    pub mode: CountdownMode,
    /// `HH:MM[:SS]`, requis pour `end_time` et `duration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

pub struct CountdownItem {
    pub props: CountdownProps,
    /// Composantes horaires parsées une fois ; `None` si invalides.
    time: Option<(u32, u32, u32)>,
    deadline: Option<DateTime<Local>>,
}

impl CountdownItem {
    pub fn new(props: CountdownProps) -> Self {
        let time = props
            .time
            .as_deref()
            .and_then(rgcutils::parse_clock_time);
        Self {
            props,
            time,
            deadline: None,
        }
    }

    /// Un mode à échéance sans heure valide n'est pas affichable.
    pub fn displayable(&self) -> bool {
        match self.props.mode {
            CountdownMode::Clock | CountdownMode::Stopwatch => true,
            CountdownMode::EndTime | CountdownMode::Duration => self.time.is_some(),
        }
    }

    /// (Re)calcule l'échéance au moment de l'activation.
    pub fn arm(&mut self) {
        self.deadline = self.compute_deadline(Local::now());
    }

    fn compute_deadline(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match self.props.mode {
            CountdownMode::Clock => None,
            CountdownMode::Stopwatch => Some(now),
            CountdownMode::EndTime => {
                let (h, m, s) = self.time?;
                let target_time = NaiveTime::from_hms_opt(h % 24, m, s)?;
                let today = now.date_naive().and_time(target_time);
                let today = today.and_local_timezone(Local).single()?;
                if today > now {
                    Some(today)
                } else {
                    // Heure déjà passée : demain.
                    Some(today + Duration::days(1))
                }
            }
            CountdownMode::Duration => {
                let (h, m, s) = self.time?;
                let offset = Duration::hours(h as i64)
                    + Duration::minutes(m as i64)
                    + Duration::seconds(s as i64);
                Some(now + offset)
            }
        }
    }

    pub fn create_render_payload(&self) -> RenderPayload {
        RenderPayload::Template {
            template: "countdown".to_string(),
            data: serde_json::json!({
                "caption": self.props.caption,
                "mode": self.props.mode,
                "deadline": self.deadline.map(|d| d.to_rfc3339()),
            }),
        }
    }

    pub fn update(&mut self, props: CountdownProps) {
        self.props = props;
        self.time = self
            .props
            .time
            .as_deref()
            .and_then(rgcutils::parse_clock_time);
        // L'échéance sera recalculée à la prochaine activation.
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn item(mode: CountdownMode, time: Option<&str>) -> CountdownItem {
        CountdownItem::new(CountdownProps {
            caption: "Beginn".to_string(),
            color: String::new(),
            mode,
            time: time.map(str::to_string),
        })
    }

    #[test]
    fn test_end_time_today_when_still_ahead() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let deadline = item(CountdownMode::EndTime, Some("10:30"))
            .compute_deadline(now)
            .unwrap();
        assert_eq!(deadline.date_naive(), now.date_naive());
        assert_eq!((deadline.hour(), deadline.minute()), (10, 30));
    }

    #[test]
    fn test_end_time_rolls_to_tomorrow_when_past() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 11, 0, 0).unwrap();
        let deadline = item(CountdownMode::EndTime, Some("10:30"))
            .compute_deadline(now)
            .unwrap();
        assert_eq!(
            deadline.date_naive(),
            now.date_naive().succ_opt().unwrap()
        );
    }

    #[test]
    fn test_duration_offsets_from_now() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let deadline = item(CountdownMode::Duration, Some("0:05:30"))
            .compute_deadline(now)
            .unwrap();
        assert_eq!(deadline - now, Duration::seconds(330));
    }

    #[test]
    fn test_clock_has_no_deadline() {
        let now = Local::now();
        assert!(item(CountdownMode::Clock, None)
            .compute_deadline(now)
            .is_none());
    }

    #[test]
    fn test_missing_time_makes_item_non_displayable() {
        assert!(!item(CountdownMode::EndTime, None).displayable());
        assert!(!item(CountdownMode::Duration, Some("garbage")).displayable());
        assert!(item(CountdownMode::Stopwatch, None).displayable());
    }
}
