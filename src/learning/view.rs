use serde::Serialize;

use crate::catalog::{Catalog, Module};

/// What the learning page shows around the lesson body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningModuleView {
    pub course_id: String,
    pub course_title: String,
    pub module: Module,
    pub module_index: usize,
    pub module_count: usize,
    pub progress_percent: f64,
    /// `None` on the last module: the continue button leads back to the course.
    pub next_module_id: Option<String>,
}

impl LearningModuleView {
    pub fn build(catalog: &Catalog, course_id: &str, module_id: &str) -> Option<Self> {
        let course = catalog.course(course_id)?;
        let module_index = course.module_index(module_id)?;
        let module_count = course.modules.len();

        Some(Self {
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            module: course.modules[module_index].clone(),
            module_index,
            module_count,
            progress_percent: (module_index + 1) as f64 / module_count as f64 * 100.0,
            next_module_id: course
                .modules
                .get(module_index + 1)
                .map(|m| m.id.clone()),
        })
    }
}

/// Where "Start learning" / "Continue learning" go: the first module, since
/// completion is not tracked.
pub fn entry_module_id(catalog: &Catalog, course_id: &str) -> Option<String> {
    catalog
        .course(course_id)?
        .modules
        .first()
        .map(|m| m.id.clone())
}
