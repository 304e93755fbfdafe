use crate::models::subject::clamp_goal;
use crate::models::{AttendanceRecord, AttendanceStatus, GoalReport, GoalStatus};
use crate::utils::format::pluralize;

/// Round-half-up percentage of `attended` out of `total`, done in integers.
pub fn attendance_percentage(attended: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (attended, total) = (attended as u64, total as u64);
    ((200 * attended + total) / (2 * total)) as u32
}

/// Classes that can still be skipped at or above `goal`, saturating at `u32::MAX`.
///
/// `floor((attended - g * total) / g)` with `g = goal / 100`, scaled by 100 to stay integral.
/// Rounding can report the goal as met while the exact ratio sits just under it; the
/// result is floored at zero in that case.
pub fn classes_can_miss(attended: u32, total: u32, goal: u8) -> u32 {
    let numerator = 100 * attended as i64 - goal as i64 * total as i64;
    u32::try_from(numerator.div_euclid(goal as i64).max(0)).unwrap_or(u32::MAX)
}

/// Consecutive classes to attend before reaching `goal`, or `None` if no number suffices.
///
/// `ceil((g * total - attended) / (1 - g))`. A goal of 100% with any absence is unreachable.
pub fn classes_must_attend(attended: u32, total: u32, goal: u8) -> Option<u32> {
    if goal >= 100 {
        return None;
    }
    let numerator = goal as i64 * total as i64 - 100 * attended as i64;
    let denominator = 100 - goal as i64;
    if numerator <= 0 {
        return Some(0);
    }
    Some(u32::try_from((numerator + denominator - 1) / denominator).unwrap_or(u32::MAX))
}

pub fn compute_goal_satisfaction(history: &[AttendanceRecord], goal: i64) -> GoalReport {
    let goal = clamp_goal(goal);
    let total = history.iter().filter(|r| r.status.is_held()).count() as u32;
    let attended = history
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u32;
    let percentage = attendance_percentage(attended, total);

    let mut report = GoalReport {
        attended,
        total,
        percentage,
        goal,
        status: GoalStatus::Neutral,
        message: "No classes recorded yet.".to_string(),
        can_miss: None,
        must_attend: None,
    };

    if total == 0 {
        return report;
    }

    if percentage >= goal as u32 {
        let can_miss = classes_can_miss(attended, total, goal);
        report.status = GoalStatus::Safe;
        report.can_miss = Some(can_miss);
        report.message = if can_miss == 0 {
            format!(
                "You're on the edge! Missing the next class will drop you below {}%.",
                goal
            )
        } else {
            format!(
                "You can miss {} more {} and stay at or above {}%.",
                can_miss,
                pluralize(can_miss, "class", "classes"),
                goal
            )
        };
        return report;
    }

    let must_attend = classes_must_attend(attended, total, goal);
    // Stands in for the classes still left to attend; see DESIGN.md.
    let remaining = total.saturating_sub(attended);
    report.status = GoalStatus::Danger;
    report.must_attend = must_attend;
    report.message = match must_attend {
        Some(needed) if needed <= remaining => format!(
            "You need to attend {} more {} in a row to reach {}%.",
            needed,
            pluralize(needed, "class", "classes"),
            goal
        ),
        _ => format!(
            "You must attend all remaining {} {} to get closer to {}%.",
            remaining,
            pluralize(remaining, "class", "classes"),
            goal
        ),
    };
    report
}
