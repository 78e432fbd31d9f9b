//! Figures for the dashboard. Charts are drawn elsewhere; this only
//! aggregates the data they plot.

use pp_types::{Project, ProjectStatus};
use serde::Serialize;

pub const BUCKET_LABELS: [&str; 5] = ["0-19%", "20-39%", "40-59%", "60-79%", "80-100%"];
const TREND_LEN: usize = 10;
const TREND_LABEL_CHARS: usize = 10;
const RECENT_LEN: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub paused: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ProjectStatus) -> usize {
        match status {
            ProjectStatus::Active => self.active,
            ProjectStatus::Paused => self.paused,
            ProjectStatus::Completed => self.completed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub progress: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub counts: StatusCounts,
    /// Project counts per [`BUCKET_LABELS`] entry.
    pub distribution: [usize; 5],
    /// Progress of the most recent projects, oldest first.
    pub trend: Vec<TrendPoint>,
    /// Newest projects for the dashboard cards.
    pub recent: Vec<Project>,
}

impl DashboardStats {
    /// Aggregate a project list ordered newest first.
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut counts = StatusCounts::default();
        let mut distribution = [0usize; 5];
        for project in projects {
            match project.status {
                ProjectStatus::Active => counts.active += 1,
                ProjectStatus::Paused => counts.paused += 1,
                ProjectStatus::Completed => counts.completed += 1,
            }
            distribution[bucket_index(project.progress)] += 1;
        }

        let trend = projects
            .iter()
            .take(TREND_LEN)
            .rev()
            .map(|p| TrendPoint {
                label: trend_label(&p.name),
                progress: p.progress,
            })
            .collect();

        Self {
            total: projects.len(),
            counts,
            distribution,
            trend,
            recent: projects.iter().take(RECENT_LEN).cloned().collect(),
        }
    }

    /// `(label, count)` pairs for the distribution chart.
    pub fn distribution_series(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        BUCKET_LABELS.iter().copied().zip(self.distribution.iter().copied())
    }
}

/// Index into [`BUCKET_LABELS`] for a progress value.
pub fn bucket_index(progress: i32) -> usize {
    (progress.max(0) / 20).min(4) as usize
}

/// Chart label: names longer than ten characters are cut and get an ellipsis.
pub fn trend_label(name: &str) -> String {
    if name.chars().count() > TREND_LABEL_CHARS {
        let head: String = name.chars().take(TREND_LABEL_CHARS).collect();
        format!("{head}…")
    } else {
        name.to_string()
    }
}
