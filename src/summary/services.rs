use sqlx::PgPool;
use time::{Date, Duration};
use uuid::Uuid;

use crate::{
    error::ApiError,
    goals::{dto::GoalProgress, repo::Goal},
    limits, meals,
    nutrition::Nutrients,
    state::AppState,
    summary::{
        dto::{DailySummary, NutrientProgress, WeeklySummary},
        repo::{self, DayTotals},
    },
};

/// Monday of the week containing `day`.
pub fn week_start(day: Date) -> Date {
    day - Duration::days(i64::from(day.weekday().number_days_from_monday()))
}

/// Expand sparse per-day rows into exactly seven days starting at `start`,
/// zero-filling days without meals.
pub fn fill_week(start: Date, rows: Vec<DayTotals>) -> Vec<DayTotals> {
    (0..7)
        .map(|i| {
            let day = start + Duration::days(i);
            rows.iter()
                .find(|r| r.day == day)
                .cloned()
                .unwrap_or(DayTotals {
                    day,
                    totals: Nutrients::ZERO,
                })
        })
        .collect()
}

/// Arithmetic mean over the given days, zero days included.
pub fn weekly_average(days: &[DayTotals]) -> Nutrients {
    if days.is_empty() {
        return Nutrients::ZERO;
    }
    let mut total = Nutrients::ZERO;
    for d in days {
        total.add(&d.totals);
    }
    total.scaled(1.0 / days.len() as f64)
}

/// Consumption versus limit for every tracked nutrient.
pub fn progress(consumed: &Nutrients, limits: &Nutrients) -> Vec<NutrientProgress> {
    consumed
        .by_metric()
        .into_iter()
        .zip(limits.by_metric())
        .map(|((nutrient, consumed), (_, limit))| NutrientProgress {
            nutrient,
            consumed,
            limit,
            ratio: (limit > 0.0).then_some(consumed / limit),
        })
        .collect()
}

pub async fn daily_summary(
    state: &AppState,
    user_id: Uuid,
    day: Date,
) -> Result<DailySummary, ApiError> {
    let totals = repo::day_totals(&state.db, user_id, day).await?;
    let limits = limits::repo::get_or_create(&state.db, user_id).await?;
    let meals = meals::repo::list_by_day(&state.db, user_id, day).await?;
    Ok(DailySummary {
        date: day,
        progress: progress(&totals, &limits),
        totals,
        meals: meals.into_iter().map(Into::into).collect(),
    })
}

pub async fn weekly_summary(
    state: &AppState,
    user_id: Uuid,
    day: Date,
) -> Result<WeeklySummary, ApiError> {
    let start = week_start(day);
    let end = start + Duration::days(6);
    let rows = repo::range_day_totals(&state.db, user_id, start, end).await?;
    let days = fill_week(start, rows);
    let average = weekly_average(&days);
    Ok(WeeklySummary {
        week_start: start,
        week_end: end,
        days,
        average,
    })
}

/// Progress of one goal: metric consumption over the goal's window so far,
/// divided by the target. `None` when the goal's metric or target cannot
/// be evaluated.
pub async fn goal_progress(
    db: &PgPool,
    goal: &Goal,
    today: Date,
) -> anyhow::Result<Option<GoalProgress>> {
    if goal.target_value <= 0.0 || Nutrients::column_for(&goal.target_type).is_none() {
        return Ok(None);
    }
    let until = goal.end_date.map_or(today, |end| end.min(today));
    if until < goal.start_date {
        return Ok(Some(GoalProgress {
            consumed: 0.0,
            ratio: 0.0,
        }));
    }
    let consumed =
        repo::metric_total(db, goal.user_id, &goal.target_type, goal.start_date, until).await?;
    Ok(Some(GoalProgress {
        consumed,
        ratio: consumed / goal.target_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn day(d: Date, calories: f64) -> DayTotals {
        DayTotals {
            day: d,
            totals: Nutrients {
                calories,
                ..Nutrients::ZERO
            },
        }
    }

    #[test]
    fn week_start_is_monday() {
        assert_eq!(week_start(date!(2026 - 08 - 06)), date!(2026 - 08 - 03));
        assert_eq!(week_start(date!(2026 - 08 - 03)), date!(2026 - 08 - 03));
        assert_eq!(week_start(date!(2026 - 08 - 09)), date!(2026 - 08 - 03));
    }

    #[test]
    fn fill_week_zero_fills_missing_days() {
        let start = date!(2026 - 08 - 03);
        let rows = vec![day(date!(2026 - 08 - 04), 800.0)];
        let week = fill_week(start, rows);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, start);
        assert_eq!(week[0].totals, Nutrients::ZERO);
        assert_eq!(week[1].totals.calories, 800.0);
        assert_eq!(week[6].day, date!(2026 - 08 - 09));
        assert_eq!(week[6].totals, Nutrients::ZERO);
    }

    #[test]
    fn weekly_average_is_mean_over_seven_days_including_zeros() {
        let start = date!(2026 - 08 - 03);
        let rows = vec![day(date!(2026 - 08 - 03), 700.0), day(date!(2026 - 08 - 05), 700.0)];
        let week = fill_week(start, rows);
        let avg = weekly_average(&week);
        assert_eq!(avg.calories, 200.0);
    }

    #[test]
    fn weekly_average_of_empty_slice_is_zero() {
        assert_eq!(weekly_average(&[]), Nutrients::ZERO);
    }

    #[test]
    fn progress_ratio_is_unclamped() {
        let consumed = Nutrients {
            calories: 2500.0,
            ..Nutrients::ZERO
        };
        let limits = Nutrients {
            calories: 2000.0,
            ..Nutrients::ZERO
        };
        let rows = progress(&consumed, &limits);
        let calories = rows.iter().find(|p| p.nutrient == "calories").unwrap();
        assert_eq!(calories.ratio, Some(1.25));
    }

    #[test]
    fn progress_omits_ratio_without_a_limit() {
        let consumed = Nutrients {
            protein_g: 40.0,
            ..Nutrients::ZERO
        };
        let rows = progress(&consumed, &Nutrients::ZERO);
        let protein = rows.iter().find(|p| p.nutrient == "protein").unwrap();
        assert_eq!(protein.consumed, 40.0);
        assert_eq!(protein.ratio, None);
    }

    #[test]
    fn progress_covers_all_tracked_nutrients() {
        let rows = progress(&Nutrients::ZERO, &Nutrients::ZERO);
        assert_eq!(rows.len(), crate::nutrition::TRACKED.len());
    }
}
