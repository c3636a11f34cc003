use serde::Serialize;

use super::{Catalog, Course, CourseLevel};

/// Courses listed when the search box is empty.
pub const DEFAULT_RESULT_COUNT: usize = 6;

/// Card-sized view of a course for listings and the search dropdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub rating: f32,
    pub duration: String,
    pub students: u32,
    pub level: CourseLevel,
    pub module_count: usize,
    pub review_count: usize,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            rating: course.rating,
            duration: course.duration.clone(),
            students: course.students,
            level: course.level,
            module_count: course.modules.len(),
            review_count: course.reviews.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Matches before `limit` was applied.
    pub total: usize,
    pub courses: Vec<CourseSummary>,
}

fn matches(course: &Course, needle: &str) -> bool {
    [&course.title, &course.description, &course.category]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

impl Catalog {
    /// Case-insensitive substring match over title, description and category.
    /// A blank query lists the first few courses instead.
    pub fn search(&self, query: &str, limit: Option<usize>) -> SearchResults {
        let needle = query.trim().to_lowercase();
        let hits: Vec<&Course> = if needle.is_empty() {
            self.courses().iter().take(DEFAULT_RESULT_COUNT).collect()
        } else {
            self.courses()
                .iter()
                .filter(|course| matches(course, &needle))
                .collect()
        };

        let total = hits.len();
        let courses = hits
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(CourseSummary::from)
            .collect();

        SearchResults { total, courses }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn ids(results: &SearchResults) -> Vec<&str> {
        results.courses.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn blank_query_lists_leading_courses() {
        let results = catalog().search("   ", None);
        assert_eq!(results.total, 5);
        assert_eq!(ids(&results), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn matches_title_description_and_category_case_insensitively() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.search("QUANTUM", None)), vec!["1"]);
        // "Computer Science" category and "ML" in a description.
        assert_eq!(ids(&catalog.search("computer science", None)), vec!["2"]);
        assert_eq!(ids(&catalog.search("python", None)), vec!["5"]);
        assert_eq!(catalog.search("underwater basket weaving", None).total, 0);
    }

    #[test]
    fn limit_trims_results_but_not_total() {
        let results = catalog().search("e", Some(2));
        assert!(results.total > 2);
        assert_eq!(results.courses.len(), 2);
    }
}
