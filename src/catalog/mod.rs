//! Read-only course content provider.

#[cfg(feature = "desktop")]
pub(crate) mod commands;
pub mod model;
pub mod search;

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub use model::{Course, CourseLevel, Mcq, Module, Review};

const EMBEDDED_CATALOG: &str = include_str!("courses.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    courses: Vec<Course>,
    trending_topics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
    trending_topics: Vec<String>,
}

impl Catalog {
    /// The catalog bundled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG).context("embedded course catalog is invalid")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw).context("failed to parse catalog JSON")?;
        validate(&file.courses)?;
        Ok(Self {
            courses: file.courses,
            trending_topics: file.trending_topics,
        })
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn module(&self, course_id: &str, module_id: &str) -> Option<(&Course, &Module)> {
        let course = self.course(course_id)?;
        let module = course.module(module_id)?;
        Some((course, module))
    }

    pub fn trending_topics(&self) -> &[String] {
        &self.trending_topics
    }
}

fn validate(courses: &[Course]) -> Result<()> {
    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id.as_str()) {
            bail!("duplicate course id '{}'", course.id);
        }

        let mut module_ids = HashSet::new();
        for module in &course.modules {
            if !module_ids.insert(module.id.as_str()) {
                bail!("duplicate module id '{}' in course '{}'", module.id, course.id);
            }
            for (index, mcq) in module.mcqs.iter().enumerate() {
                if mcq.correct_answer >= mcq.options.len() {
                    bail!(
                        "question {} of module '{}' points at option {} of {}",
                        index,
                        module.id,
                        mcq.correct_answer,
                        mcq.options.len()
                    );
                }
            }
        }
    }
    Ok(())
}
