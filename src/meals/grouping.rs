//! Shapes meal plans into the weekly planner grid.

use std::collections::BTreeMap;

use time::{Date, Weekday};

use super::dates::date_key;
use super::dto::{MealPlan, MealType};

/// The three planner slots of one calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySlots {
    pub breakfast: Option<MealPlan>,
    pub lunch: Option<MealPlan>,
    pub dinner: Option<MealPlan>,
}

impl DaySlots {
    pub fn slot(&self, meal_type: MealType) -> Option<&MealPlan> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
            MealType::Other => None,
        }
    }

    /// Puts `plan` into its slot, replacing what was there. Plans without a
    /// planner slot are dropped.
    fn assign(&mut self, plan: &MealPlan) {
        let slot = match plan.meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Other => return,
        };
        *slot = Some(plan.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.breakfast.is_none() && self.lunch.is_none() && self.dinner.is_none()
    }
}

/// Groups plans by calendar day; last plan wins per (day, slot).
///
/// Every date that has a plan gets an entry, even if its only plans have no
/// slot (such a day stays empty). Keys iterate in ascending date order, which
/// is also the order of their `YYYY-MM-DD` strings.
pub fn group_by_date(plans: &[MealPlan]) -> BTreeMap<Date, DaySlots> {
    let mut grouped: BTreeMap<Date, DaySlots> = BTreeMap::new();
    for plan in plans {
        grouped.entry(plan.planned_date).or_default().assign(plan);
    }
    grouped
}

/// Same grouping keyed by `YYYY-MM-DD`.
pub fn group_by_date_key(plans: &[MealPlan]) -> BTreeMap<String, DaySlots> {
    group_by_date(plans)
        .into_iter()
        .map(|(date, slots)| (date_key(date), slots))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayView {
    pub date: Date,
    pub weekday: Weekday,
    pub slots: DaySlots,
}

impl DayView {
    pub fn key(&self) -> String {
        date_key(self.date)
    }
}

/// Seven consecutive days starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekView {
    pub start: Date,
    pub days: Vec<DayView>,
}

pub const WEEK_DAYS: usize = 7;

pub fn week_view(grouped: &BTreeMap<Date, DaySlots>, start: Date) -> WeekView {
    let mut days = Vec::with_capacity(WEEK_DAYS);
    let mut date = Some(start);
    while let Some(day) = date {
        if days.len() == WEEK_DAYS {
            break;
        }
        days.push(DayView {
            date: day,
            weekday: day.weekday(),
            slots: grouped.get(&day).cloned().unwrap_or_default(),
        });
        date = day.next_day();
    }
    WeekView { start, days }
}
