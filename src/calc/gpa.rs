use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AttendanceError;

pub const MAX_GRADE_POINT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLetter {
    O,
    APlus,
    A,
    BPlus,
    B,
    C,
    P,
    F,
}

impl GradeLetter {
    pub fn points(&self) -> f64 {
        match self {
            GradeLetter::O => 10.0,
            GradeLetter::APlus => 9.0,
            GradeLetter::A => 8.0,
            GradeLetter::BPlus => 7.0,
            GradeLetter::B => 6.0,
            GradeLetter::C => 5.0,
            GradeLetter::P => 4.0,
            GradeLetter::F => 0.0,
        }
    }
}

impl FromStr for GradeLetter {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "O" => Ok(GradeLetter::O),
            "A+" => Ok(GradeLetter::APlus),
            "A" => Ok(GradeLetter::A),
            "B+" => Ok(GradeLetter::BPlus),
            "B" => Ok(GradeLetter::B),
            "C" => Ok(GradeLetter::C),
            "P" => Ok(GradeLetter::P),
            "F" => Ok(GradeLetter::F),
            _ => Err(AttendanceError::InvalidGrade(format!("unknown grade '{}'", s))),
        }
    }
}

/// One weighted entry: a course's credits and its grade point, or a semester's
/// credits and its SGPA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weighted {
    pub credits: f64,
    pub points: f64,
}

impl FromStr for Weighted {
    type Err = AttendanceError;

    /// Parses `credits:points`, where points is a number or a grade letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (credits, points) = s
            .split_once(':')
            .ok_or_else(|| AttendanceError::InvalidGrade(format!("expected credits:grade, got '{}'", s)))?;
        let credits: f64 = credits
            .trim()
            .parse()
            .map_err(|_| AttendanceError::InvalidGrade(format!("bad credits '{}'", credits)))?;
        let points = match points.trim().parse::<f64>() {
            Ok(p) => p,
            Err(_) => points.parse::<GradeLetter>()?.points(),
        };
        Ok(Self { credits, points })
    }
}

fn weighted_mean(entries: &[Weighted]) -> Result<Option<f64>, AttendanceError> {
    let mut credits = 0.0;
    let mut sum = 0.0;
    for entry in entries {
        if !entry.credits.is_finite() || entry.credits < 0.0 {
            return Err(AttendanceError::InvalidGrade(format!(
                "credits must be non-negative, got {}",
                entry.credits
            )));
        }
        if !(0.0..=MAX_GRADE_POINT).contains(&entry.points) {
            return Err(AttendanceError::InvalidGrade(format!(
                "grade point must be within 0-{}, got {}",
                MAX_GRADE_POINT, entry.points
            )));
        }
        credits += entry.credits;
        sum += entry.credits * entry.points;
    }
    if credits == 0.0 {
        return Ok(None);
    }
    Ok(Some(sum / credits))
}

/// Credit-weighted grade point average for one semester.
pub fn sgpa(courses: &[Weighted]) -> Result<Option<f64>, AttendanceError> {
    weighted_mean(courses)
}

/// Credit-weighted average of semester SGPAs.
pub fn cgpa(semesters: &[Weighted]) -> Result<Option<f64>, AttendanceError> {
    weighted_mean(semesters)
}

pub fn percentage(obtained: f64, total: f64) -> Result<Option<f64>, AttendanceError> {
    if !obtained.is_finite()
        || !total.is_finite()
        || obtained < 0.0
        || total < 0.0
        || obtained > total
    {
        return Err(AttendanceError::InvalidGrade(format!(
            "cannot score {} out of {}",
            obtained, total
        )));
    }
    if total == 0.0 {
        return Ok(None);
    }
    Ok(Some(obtained / total * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(credits: f64, points: f64) -> Weighted {
        Weighted { credits, points }
    }

    #[test]
    fn sgpa_weights_by_credits() {
        let result = sgpa(&[w(4.0, 9.0), w(3.0, 8.0), w(1.0, 10.0)]).unwrap().unwrap();
        // (36 + 24 + 10) / 8
        assert!((result - 8.75).abs() < 1e-9);
    }

    #[test]
    fn zero_credits_has_no_average() {
        assert_eq!(sgpa(&[]).unwrap(), None);
        assert_eq!(cgpa(&[w(0.0, 9.0)]).unwrap(), None);
    }

    #[test]
    fn out_of_range_grade_is_rejected() {
        assert!(sgpa(&[w(3.0, 11.0)]).is_err());
        assert!(sgpa(&[w(-1.0, 8.0)]).is_err());
    }

    #[test]
    fn weighted_parses_numbers_and_letters() {
        assert_eq!("4:8.5".parse::<Weighted>(), Ok(w(4.0, 8.5)));
        assert_eq!("3:a+".parse::<Weighted>(), Ok(w(3.0, 9.0)));
        assert!("3".parse::<Weighted>().is_err());
        assert!("3:Z".parse::<Weighted>().is_err());
    }

    #[test]
    fn percentage_bounds() {
        assert_eq!(percentage(45.0, 60.0).unwrap(), Some(75.0));
        assert_eq!(percentage(0.0, 0.0).unwrap(), None);
        assert!(percentage(70.0, 60.0).is_err());
    }

    #[test]
    fn percentage_rejects_non_finite_marks() {
        assert!(percentage(f64::NAN, 10.0).is_err());
        assert!(percentage(5.0, f64::INFINITY).is_err());
        assert!(percentage(f64::INFINITY, f64::INFINITY).is_err());
    }
}
