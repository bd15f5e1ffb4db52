use std::collections::{BTreeSet, HashMap};

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate};
use uuid::Uuid;

use super::calendar::{days_between, month_end};
use crate::database::models::{
    DailyBreakdown, EntryStatistics, EntryStatus, MemberBreakdown, PeriodBreakdown, Project,
    ProjectBreakdown, TimeEntry, UserProfile, average, non_negative, percentage,
    total_actual_hours, total_billable_hours, zero_hours,
};

/// One row per calendar day of `[start, end]`, zero-filled.
pub fn daily_breakdown(entries: &[TimeEntry], start: NaiveDate, end: NaiveDate) -> Vec<DailyBreakdown> {
    let mut by_date: HashMap<NaiveDate, Vec<&TimeEntry>> = HashMap::new();
    for entry in entries {
        by_date.entry(entry.date).or_default().push(entry);
    }

    days_between(start, end)
        .map(|date| {
            let day = by_date.get(&date).map(Vec::as_slice).unwrap_or_default();
            DailyBreakdown {
                date,
                actual_hours: total_actual_hours(day.iter().copied()),
                billable_hours: total_billable_hours(day.iter().copied()),
                entries_count: day.len(),
            }
        })
        .collect()
}

/// Consecutive seven-day windows from `start`, the last one clipped to `end`.
pub fn weekly_breakdown(entries: &[TimeEntry], start: NaiveDate, end: NaiveDate) -> Vec<PeriodBreakdown> {
    let mut periods = Vec::new();
    let mut window_start = start;

    while window_start <= end {
        let window_end = window_start
            .checked_add_days(Days::new(6))
            .map_or(end, |last| last.min(end));
        periods.push(period(
            entries,
            format!("Week of {}", window_start),
            window_start,
            window_end,
        ));
        let Some(next) = window_end.succ_opt() else {
            break;
        };
        window_start = next;
    }

    periods
}

/// Calendar months overlapping `[start, end]`, the first and last clipped to the range.
pub fn monthly_breakdown(entries: &[TimeEntry], start: NaiveDate, end: NaiveDate) -> Vec<PeriodBreakdown> {
    let mut periods = Vec::new();
    let mut window_start = start;

    while window_start <= end {
        let window_end = month_end(window_start).unwrap_or(end).min(end);
        periods.push(period(
            entries,
            window_start.format("%Y-%m").to_string(),
            window_start,
            window_end,
        ));
        let Some(next) = window_end.succ_opt() else {
            break;
        };
        window_start = next;
    }

    periods
}

fn period(entries: &[TimeEntry], label: String, start: NaiveDate, end: NaiveDate) -> PeriodBreakdown {
    let inside: Vec<&TimeEntry> = entries
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .collect();

    PeriodBreakdown {
        label,
        start_date: start,
        end_date: end,
        actual_hours: total_actual_hours(inside.iter().copied()),
        billable_hours: total_billable_hours(inside.iter().copied()),
        entries_count: inside.len(),
        working_days: working_days(inside.iter().copied()),
    }
}

/// Distinct dates carrying at least one entry
pub fn working_days<'a, I>(entries: I) -> usize
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    entries
        .into_iter()
        .map(|entry| entry.date)
        .collect::<BTreeSet<_>>()
        .len()
}

/// `max(0, total - working_days * available_per_day)`
pub fn overtime(total: &BigDecimal, working_days: usize, available_per_day: &BigDecimal) -> BigDecimal {
    let expected = BigDecimal::from(working_days as u64) * available_per_day;
    non_negative(total - &expected)
}

/// Share of entries approved, in percent.
pub fn approval_rate(approved: usize, total: usize) -> BigDecimal {
    percentage(
        &BigDecimal::from(approved as u64),
        &BigDecimal::from(total as u64),
    )
}

/// Share of actual hours that were billable, in percent.
pub fn billable_rate(billable: &BigDecimal, actual: &BigDecimal) -> BigDecimal {
    percentage(billable, actual)
}

/// Counts, totals and rates over `entries`. Overtime is only computed when a
/// daily capacity is given.
pub fn summarize(entries: &[TimeEntry], available_per_day: Option<&BigDecimal>) -> EntryStatistics {
    let count = |status: EntryStatus| entries.iter().filter(|e| e.status == status).count();

    let total_actual_hours = total_actual_hours(entries);
    let total_billable_hours = total_billable_hours(entries);
    let working_days = working_days(entries);
    let approved_entries = count(EntryStatus::Approved);

    EntryStatistics {
        total_entries: entries.len(),
        approved_entries,
        pending_entries: count(EntryStatus::Pending),
        rejected_entries: count(EntryStatus::Rejected),
        average_hours_per_day: average(&total_actual_hours, working_days),
        overtime_hours: available_per_day
            .map(|available| overtime(&total_actual_hours, working_days, available))
            .unwrap_or_else(zero_hours),
        approval_rate: approval_rate(approved_entries, entries.len()),
        billable_rate: billable_rate(&total_billable_hours, &total_actual_hours),
        working_days,
        total_actual_hours,
        total_billable_hours,
    }
}

/// Hours per project, largest first. Entries attributed to no project are left out.
pub fn project_breakdown(entries: &[TimeEntry], projects: &[Project]) -> Vec<ProjectBreakdown> {
    let mut breakdown: Vec<ProjectBreakdown> = projects
        .iter()
        .filter_map(|project| {
            let attributed: Vec<&TimeEntry> = entries
                .iter()
                .filter(|e| e.project_details.references(project.id, &project.name))
                .collect();
            if attributed.is_empty() {
                return None;
            }
            Some(ProjectBreakdown {
                project_id: project.id,
                project_name: project.name.clone(),
                total_actual_hours: total_actual_hours(attributed.iter().copied()),
                total_billable_hours: total_billable_hours(attributed.iter().copied()),
                entries_count: attributed.len(),
            })
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.total_actual_hours
            .cmp(&a.total_actual_hours)
            .then_with(|| a.project_name.cmp(&b.project_name))
    });
    breakdown
}

/// Hours per member, in the order given; members without entries show zeros.
pub fn member_breakdown(entries: &[TimeEntry], members: &[UserProfile]) -> Vec<MemberBreakdown> {
    let mut by_user: HashMap<Uuid, Vec<&TimeEntry>> = HashMap::new();
    for entry in entries {
        by_user.entry(entry.user_id).or_default().push(entry);
    }

    members
        .iter()
        .map(|member| {
            let own = by_user.get(&member.id).map(Vec::as_slice).unwrap_or_default();
            let total = total_actual_hours(own.iter().copied());
            let days = working_days(own.iter().copied());
            MemberBreakdown {
                user_id: member.id,
                user_name: member.name.clone(),
                overtime_hours: overtime(&total, days, &member.available_hours),
                total_billable_hours: total_billable_hours(own.iter().copied()),
                total_actual_hours: total,
                entries_count: own.len(),
                working_days: days,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{EntryDraft, ProjectDetails, ProjectStatus, UserRole, hours};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn worker() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Alex Kim".to_string(),
            email: "alex@example.com".to_string(),
            role: UserRole::Employee,
            available_hours: hours(8),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn entry(owner: &UserProfile, on: NaiveDate, actual: i64, billable: i64, project: &str) -> TimeEntry {
        TimeEntry::new(
            owner,
            EntryDraft {
                date: on,
                actual_hours: hours(actual),
                billable_hours: hours(billable),
                task: "Work".to_string(),
                project_details: ProjectDetails {
                    name: project.to_string(),
                    ..Default::default()
                },
                is_billable: billable > 0,
            },
        )
    }

    #[test]
    fn daily_breakdown_is_dense() {
        let owner = worker();
        let entries = vec![
            entry(&owner, date(3, 4), 6, 4, ""),
            entry(&owner, date(3, 6), 3, 3, ""),
        ];

        let days = daily_breakdown(&entries, date(3, 4), date(3, 8));

        assert_eq!(days.len(), 5);
        assert_eq!(days[0].actual_hours, hours(6));
        assert_eq!(days[2].billable_hours, hours(3));
        for empty in [1, 3, 4] {
            assert_eq!(days[empty].actual_hours, zero_hours());
            assert_eq!(days[empty].entries_count, 0);
        }
    }

    #[test]
    fn weekly_windows_are_clipped_to_the_range() {
        let owner = worker();
        let entries = vec![entry(&owner, date(3, 12), 5, 0, "")];

        let weeks = weekly_breakdown(&entries, date(3, 1), date(3, 17));

        assert_eq!(weeks.len(), 3);
        assert_eq!((weeks[0].start_date, weeks[0].end_date), (date(3, 1), date(3, 7)));
        assert_eq!((weeks[2].start_date, weeks[2].end_date), (date(3, 15), date(3, 17)));
        assert_eq!(weeks[1].actual_hours, hours(5));
        assert_eq!(weeks[1].working_days, 1);
    }

    #[test]
    fn months_follow_the_calendar() {
        let months = monthly_breakdown(&[], date(1, 20), date(3, 10));

        let bounds: Vec<_> = months.iter().map(|m| (m.label.as_str(), m.start_date, m.end_date)).collect();
        assert_eq!(
            bounds,
            vec![
                ("2024-01", date(1, 20), date(1, 31)),
                ("2024-02", date(2, 1), date(2, 29)),
                ("2024-03", date(3, 1), date(3, 10)),
            ]
        );
    }

    #[test]
    fn windows_stop_at_the_last_representable_day() {
        let start = NaiveDate::MAX.checked_sub_days(Days::new(9)).unwrap();

        let weeks = weekly_breakdown(&[], start, NaiveDate::MAX);
        let months = monthly_breakdown(&[], start, NaiveDate::MAX);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[1].end_date, NaiveDate::MAX);
        assert_eq!(months.len(), 1);
        assert_eq!((months[0].start_date, months[0].end_date), (start, NaiveDate::MAX));
    }

    #[test]
    fn overtime_counts_only_days_with_entries() {
        let owner = worker();
        let entries = vec![entry(&owner, date(3, 4), 10, 0, "")];

        let stats = summarize(&entries, Some(&owner.available_hours));

        assert_eq!(stats.overtime_hours, hours(2));
        assert_eq!(stats.working_days, 1);
        assert_eq!(stats.average_hours_per_day, hours(10));
    }

    #[test]
    fn empty_input_has_zero_rates() {
        let stats = summarize(&[], Some(&hours(8)));

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.approval_rate, zero_hours());
        assert_eq!(stats.billable_rate, zero_hours());
        assert_eq!(stats.overtime_hours, zero_hours());
        assert_eq!(stats.average_hours_per_day, zero_hours());
    }

    #[test]
    fn rates_use_counts_and_hours() {
        let owner = worker();
        let mut approved = entry(&owner, date(3, 4), 8, 6, "");
        approved.status = EntryStatus::Approved;
        let entries = vec![approved, entry(&owner, date(3, 5), 8, 0, "")];

        let stats = summarize(&entries, None);

        assert_eq!(stats.approval_rate, hours(50));
        assert_eq!(stats.billable_rate.to_string(), "37.50");
        assert_eq!(stats.pending_entries, 1);
        assert_eq!(stats.overtime_hours, zero_hours());
    }

    #[test]
    fn projects_are_ranked_by_hours() {
        let owner = worker();
        let apollo = Project {
            id: Uuid::new_v4(),
            name: "Apollo".to_string(),
            status: ProjectStatus::Active,
        };
        let gemini = Project {
            id: Uuid::new_v4(),
            name: "Gemini".to_string(),
            status: ProjectStatus::Active,
        };
        let idle = Project {
            id: Uuid::new_v4(),
            name: "Idle".to_string(),
            status: ProjectStatus::OnHold,
        };
        let entries = vec![
            entry(&owner, date(3, 4), 2, 2, "Apollo"),
            entry(&owner, date(3, 5), 7, 0, &gemini.id.to_string()),
            entry(&owner, date(3, 6), 1, 0, "Unrelated"),
        ];

        let ranked = project_breakdown(&entries, &[apollo, gemini, idle]);

        let names: Vec<_> = ranked.iter().map(|p| p.project_name.as_str()).collect();
        assert_eq!(names, vec!["Gemini", "Apollo"]);
        assert_eq!(ranked[1].total_billable_hours, hours(2));
    }
}
