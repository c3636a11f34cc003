use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use tokio::sync::Mutex;

use crate::catalog::{Catalog, Mcq};

use super::{
    quiz::{QuizAction, QuizSession, QuizView},
    view::LearningModuleView,
};

const MODULE_NOT_FOUND: &str = "The learning module you're looking for doesn't exist.";

/// Quiz progress for every module opened this run, keyed by course and module.
#[derive(Clone)]
pub struct LearningController {
    catalog: Arc<Catalog>,
    sessions: Arc<Mutex<HashMap<(String, String), QuizSession>>>,
}

impl LearningController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn open_module(&self, course_id: &str, module_id: &str) -> Result<LearningModuleView> {
        LearningModuleView::build(&self.catalog, course_id, module_id)
            .ok_or_else(|| anyhow!(MODULE_NOT_FOUND))
    }

    pub async fn quiz(&self, course_id: &str, module_id: &str) -> Result<QuizView> {
        self.with_session(course_id, module_id, |session, mcqs| session.view(mcqs))
            .await
    }

    /// Applies the action and returns the refreshed view; ignored actions
    /// still return the current view.
    pub async fn apply(
        &self,
        course_id: &str,
        module_id: &str,
        action: QuizAction,
    ) -> Result<QuizView> {
        self.with_session(course_id, module_id, |session, mcqs| {
            if !session.apply(action, mcqs) {
                log::debug!("quiz action {action:?} ignored for {course_id}/{module_id}");
            }
            session.view(mcqs)
        })
        .await
    }

    /// Forgets quiz progress for a module.
    pub async fn restart(&self, course_id: &str, module_id: &str) -> Result<QuizView> {
        self.sessions
            .lock()
            .await
            .remove(&(course_id.to_string(), module_id.to_string()));
        self.quiz(course_id, module_id).await
    }

    async fn with_session<T>(
        &self,
        course_id: &str,
        module_id: &str,
        f: impl FnOnce(&mut QuizSession, &[Mcq]) -> T,
    ) -> Result<T> {
        let (_, module) = self
            .catalog
            .module(course_id, module_id)
            .ok_or_else(|| anyhow!(MODULE_NOT_FOUND))?;

        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry((course_id.to_string(), module_id.to_string()))
            .or_insert_with(|| QuizSession::new(module.mcqs.len()));
        Ok(f(session, &module.mcqs))
    }
}
