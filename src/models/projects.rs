// src/models/projects.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planned,
    Active,
    OnHold,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Relaunch Website Bäckerei Schulz")]
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    #[schema(example = "Wireframes abstimmen")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("end_before_start".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_project_dates", skip_on_field_errors = false))]
pub struct ProjectPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_project_status")]
    pub status: ProjectStatus,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn default_project_status() -> ProjectStatus {
    ProjectStatus::Planned
}

fn validate_project_dates(p: &ProjectPayload) -> Result<(), ValidationError> {
    check_range(p.start_date, p.end_date)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_task_dates", skip_on_field_errors = false))]
pub struct TaskPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_task_status")]
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

fn default_task_status() -> TaskStatus {
    TaskStatus::Todo
}

fn validate_task_dates(t: &TaskPayload) -> Result<(), ValidationError> {
    check_range(t.start_date, t.due_date)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusPayload {
    pub status: TaskStatus,
}

// --- LINHA DO TEMPO (Gantt) ---

#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBar {
    pub task_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub offset_days: i64,
    pub duration_days: i64,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTimeline {
    pub project_id: Uuid,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub total_days: i64,
    pub bars: Vec<TimelineBar>,
    pub unscheduled: Vec<Uuid>,
}

impl ProjectTimeline {
    /// Intervalo geral = min/max das datas do projeto e das tarefas.
    /// Tarefa com só uma data vira barra de um dia; sem datas, "não agendada".
    pub fn build(project: &Project, tasks: &[Task]) -> Self {
        let task_spans: Vec<(&Task, Option<(NaiveDate, NaiveDate)>)> = tasks
            .iter()
            .map(|t| {
                let span = match (t.start_date, t.due_date) {
                    (Some(s), Some(e)) => Some((s.min(e), s.max(e))),
                    (Some(d), None) | (None, Some(d)) => Some((d, d)),
                    (None, None) => None,
                };
                (t, span)
            })
            .collect();

        let all_dates = task_spans
            .iter()
            .filter_map(|(_, span)| *span)
            .flat_map(|(s, e)| [s, e])
            .chain(project.start_date)
            .chain(project.end_date);

        let (start, end) = all_dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
            (
                Some(lo.map_or(d, |lo| lo.min(d))),
                Some(hi.map_or(d, |hi| hi.max(d))),
            )
        });

        let mut bars = Vec::new();
        let mut unscheduled = Vec::new();

        for (task, span) in task_spans {
            match (span, start) {
                (Some((s, e)), Some(origin)) => bars.push(TimelineBar {
                    task_id: task.id,
                    title: task.title.clone(),
                    status: task.status,
                    start: s,
                    end: e,
                    offset_days: (s - origin).num_days(),
                    duration_days: (e - s).num_days() + 1,
                }),
                _ => unscheduled.push(task.id),
            }
        }

        bars.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        let total_days = match (start, end) {
            (Some(s), Some(e)) => (e - s).num_days() + 1,
            _ => 0,
        };

        Self {
            project_id: project.id,
            start,
            end,
            total_days,
            bars,
            unscheduled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn project(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Project {
        Project {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Relaunch".into(),
            description: None,
            status: ProjectStatus::Active,
            customer_id: None,
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(title: &str, start: Option<NaiveDate>, due: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: None,
            start_date: start,
            due_date: due,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn range_spans_all_task_dates() {
        let p = project(None, None);
        let tasks = vec![
            task("Design", Some(date(3, 2)), Some(date(3, 6))),
            task("Build", Some(date(3, 9)), Some(date(3, 20))),
            task("Idea", None, None),
        ];

        let timeline = ProjectTimeline::build(&p, &tasks);

        assert_eq!(timeline.start, Some(date(3, 2)));
        assert_eq!(timeline.end, Some(date(3, 20)));
        assert_eq!(timeline.total_days, 19);
        assert_eq!(timeline.bars.len(), 2);
        assert_eq!(timeline.bars[1].offset_days, 7);
        assert_eq!(timeline.bars[1].duration_days, 12);
        assert_eq!(timeline.unscheduled, vec![tasks[2].id]);
    }

    #[test]
    fn project_dates_widen_the_range() {
        let p = project(Some(date(2, 25)), Some(date(4, 1)));
        let tasks = vec![task("Launch", None, Some(date(3, 31)))];

        let timeline = ProjectTimeline::build(&p, &tasks);

        assert_eq!(timeline.start, Some(date(2, 25)));
        assert_eq!(timeline.end, Some(date(4, 1)));
        assert_eq!(timeline.bars[0].duration_days, 1);
        assert_eq!(timeline.bars[0].offset_days, 34);
    }

    #[test]
    fn no_dates_means_empty_range() {
        let timeline = ProjectTimeline::build(&project(None, None), &[task("x", None, None)]);
        assert_eq!(timeline.start, None);
        assert_eq!(timeline.total_days, 0);
        assert!(timeline.bars.is_empty());
        assert_eq!(timeline.unscheduled.len(), 1);
    }

    #[test]
    fn due_before_start_is_rejected() {
        let payload = TaskPayload {
            title: "Bad".into(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: None,
            start_date: Some(date(5, 10)),
            due_date: Some(date(5, 1)),
        };
        assert!(payload.validate().is_err());
    }
}
