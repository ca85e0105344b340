use chrono::NaiveDate;
use crate::models::{Interval, SampleDate, Session};

/// Create the list of dates sampled for a time interval, most recent first.
///
/// Only the selected preset is sampled. Longer intervals are sampled rather
/// than fully queried to keep the number of API calls small.
pub fn generate_timeline(interval: Interval, today: NaiveDate) -> Vec<SampleDate> {
    let mut timeline = Vec::with_capacity(interval.samples());
    let mut cursor = Some(today);
    walk_tier(interval, &mut cursor, &mut timeline);
    timeline
}

/// Historical sampling: the selected preset and every preset after it in
/// week, month, year, decade order are walked back to back, each one
/// continuing from where the previous stopped.
pub fn generate_cascading_timeline(interval: Interval, today: NaiveDate) -> Vec<SampleDate> {
    let tiers: Vec<Interval> = Interval::ALL
        .iter()
        .copied()
        .skip_while(|tier| *tier != interval)
        .collect();

    let mut timeline = Vec::with_capacity(tiers.iter().map(|t| t.samples()).sum());
    let mut cursor = Some(today);
    for tier in tiers {
        walk_tier(tier, &mut cursor, &mut timeline);
    }
    timeline
}

/// Timeline for the session's interval and sampling mode
pub fn timeline_for(session: &Session, today: NaiveDate) -> Vec<SampleDate> {
    if session.cascade_tiers {
        generate_cascading_timeline(session.interval, today)
    } else {
        generate_timeline(session.interval, today)
    }
}

fn walk_tier(tier: Interval, cursor: &mut Option<NaiveDate>, timeline: &mut Vec<SampleDate>) {
    let step = tier.step();
    for _ in 0..tier.samples() {
        let Some(date) = *cursor else {
            return;
        };
        timeline.push(SampleDate(date));
        *cursor = step.back(date);
    }
}
