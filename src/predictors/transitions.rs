use chrono::NaiveDate;
use thiserror::Error;

use crate::core::asteroid::{CloseApproachObservation, TransitionPath};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid date {date:?}, expected YYYY-MM-DD")]
    InvalidDate { date: String },
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TransitionError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TransitionError::InvalidDate { date: raw.to_string() })
}

/// Orbiting-body changes across the observations dated within `[from, to]`.
///
/// - Both bounds are inclusive.
/// - Observations are ordered by their `YYYY-MM-DD` string, which sorts like the date.
///   The sort is stable, so same-day observations keep their input order.
/// - Runs of the same body collapse; each change emits one path spanning from
///   the start of the previous run to the first observation of the new body.
///
/// Any observation with an unparseable date fails the whole extraction.
pub fn extract_transitions(
    observations: &[CloseApproachObservation],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<TransitionPath>, TransitionError> {
    let mut in_range: Vec<&CloseApproachObservation> = Vec::with_capacity(observations.len());
    for obs in observations {
        let date = parse_date(&obs.date)?;
        if date >= from && date <= to {
            in_range.push(obs);
        }
    }
    in_range.sort_by(|a, b| a.date.cmp(&b.date));

    let mut paths = Vec::new();
    let Some((first, rest)) = in_range.split_first() else {
        return Ok(paths);
    };

    let mut current_body = first.orbiting_body.as_str();
    let mut current_from = first.date.as_str();
    for obs in rest {
        if obs.orbiting_body != current_body {
            paths.push(TransitionPath {
                from_body: current_body.to_string(),
                to_body: obs.orbiting_body.clone(),
                from_date: current_from.to_string(),
                to_date: obs.date.clone(),
            });
            current_body = obs.orbiting_body.as_str();
            current_from = obs.date.as_str();
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, body: &str) -> CloseApproachObservation {
        CloseApproachObservation { date: date.to_string(), orbiting_body: body.to_string() }
    }

    fn date(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    fn path(from_body: &str, to_body: &str, from_date: &str, to_date: &str) -> TransitionPath {
        TransitionPath {
            from_body: from_body.to_string(),
            to_body: to_body.to_string(),
            from_date: from_date.to_string(),
            to_date: to_date.to_string(),
        }
    }

    #[test]
    fn single_body_has_no_transitions() {
        let data = [obs("1917-04-30", "Earth"), obs("1920-05-01", "Earth"), obs("1950-08-07", "Earth")];
        let out = extract_transitions(&data, date("1900-01-01"), date("2000-12-31")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn there_and_back() {
        let data = [obs("1917-04-30", "A"), obs("1930-06-01", "B"), obs("1950-08-07", "A")];
        let out = extract_transitions(&data, date("1900-01-01"), date("2000-12-31")).unwrap();
        assert_eq!(
            out,
            vec![path("A", "B", "1917-04-30", "1930-06-01"), path("B", "A", "1930-06-01", "1950-08-07")]
        );
    }

    #[test]
    fn runs_merge_and_input_order_does_not_matter() {
        let data = [
            obs("1950-08-07", "Juptr"),
            obs("1920-05-01", "Juptr"),
            obs("1930-06-01", "Earth"),
            obs("1917-04-30", "Juptr"),
        ];
        let out = extract_transitions(&data, date("1900-01-01"), date("2000-12-31")).unwrap();
        assert_eq!(
            out,
            vec![
                path("Juptr", "Earth", "1917-04-30", "1930-06-01"),
                path("Earth", "Juptr", "1930-06-01", "1950-08-07"),
            ]
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let data = [obs("1920-01-01", "Earth"), obs("1935-03-03", "Mars"), obs("1950-12-31", "Earth")];
        let out = extract_transitions(&data, date("1920-01-01"), date("1950-12-31")).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].from_date, "1920-01-01");
        assert_eq!(out[1].to_date, "1950-12-31");
    }

    #[test]
    fn out_of_range_observations_are_dropped() {
        let data = [obs("1900-04-30", "Juptr"), obs("1930-06-01", "Earth"), obs("2100-08-07", "Juptr")];
        let out = extract_transitions(&data, date("1920-01-01"), date("1950-12-31")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn zero_or_one_observation_is_empty() {
        let from = date("1900-01-01");
        let to = date("2000-01-01");
        assert!(extract_transitions(&[], from, to).unwrap().is_empty());
        assert!(extract_transitions(&[obs("1950-01-01", "Earth")], from, to).unwrap().is_empty());
    }

    #[test]
    fn same_day_keeps_input_order() {
        let data = [obs("1950-01-01", "Earth"), obs("1950-01-01", "Moon"), obs("1949-01-01", "Earth")];
        let out = extract_transitions(&data, date("1900-01-01"), date("2000-01-01")).unwrap();
        assert_eq!(out, vec![path("Earth", "Moon", "1949-01-01", "1950-01-01")]);
    }

    #[test]
    fn bad_date_fails_extraction() {
        let data = [obs("1950-01-01", "Earth"), obs("1950-13-01", "Moon")];
        let err = extract_transitions(&data, date("1900-01-01"), date("2000-01-01")).unwrap_err();
        assert_eq!(err, TransitionError::InvalidDate { date: "1950-13-01".to_string() });
    }
}
