//! Course catalog: all courses or the student's own, searchable and paged.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tracing::error;

use ctd_client::{Course, PortalApi};

pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CatalogTab {
    /// Every course offered
    All,
    /// Courses you are enrolled in
    Your,
}

/// Both course lists, fetched together
#[derive(Debug, Default)]
pub struct Catalog {
    all: Vec<Course>,
    enrolled: Vec<Course>,
}

impl Catalog {
    pub fn new(all: Vec<Course>, enrolled: Vec<Course>) -> Self {
        Self { all, enrolled }
    }

    /// Fetch both lists concurrently. If either request fails, both lists
    /// come back empty and the failure is logged.
    pub async fn load(api: &dyn PortalApi) -> Self {
        let (all, enrolled) = tokio::join!(api.courses(), api.enrolled_courses());
        match (all, enrolled) {
            (Ok(all), Ok(enrolled)) => Self::new(all, enrolled),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to fetch courses");
                Self::default()
            }
        }
    }

    /// One page of the given tab, filtered by a case-insensitive name search.
    /// `page` is 1-based and clamped into range.
    pub fn page(&self, tab: CatalogTab, search: &str, page: usize) -> CatalogPage {
        let source = match tab {
            CatalogTab::All => &self.all,
            CatalogTab::Your => &self.enrolled,
        };

        let needle = search.trim().to_lowercase();
        let matches: Vec<&Course> = source
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();

        let total_pages = matches.len().div_ceil(PAGE_SIZE).max(1);
        let page = page.clamp(1, total_pages);
        let courses = matches
            .iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|c| (*c).clone())
            .collect();

        CatalogPage {
            tab,
            search: search.trim().to_string(),
            page,
            total_pages,
            total_matches: matches.len(),
            courses,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub tab: CatalogTab,
    pub search: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub courses: Vec<Course>,
}

impl CatalogPage {
    /// What to show when the page has no courses
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.courses.is_empty() {
            return None;
        }
        Some(if !self.search.is_empty() {
            "No courses found"
        } else if self.tab == CatalogTab::Your {
            "No courses enrolled"
        } else {
            "No courses available"
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let heading = match self.tab {
            CatalogTab::All => "All Courses",
            CatalogTab::Your => "Your Courses",
        };
        out.push_str(&format!("{}\n\n", heading.bold()));

        if let Some(message) = self.empty_message() {
            out.push_str(&format!("  {}\n", message.dimmed()));
            return out;
        }

        for course in &self.courses {
            out.push_str(&format!("  {}  {}\n", course.id.dimmed(), course.name.bold()));
        }

        if self.total_pages > 1 {
            out.push_str(&format!("\nPage {} of {}\n", self.page, self.total_pages));
        }
        out
    }
}
