use std::sync::Arc;

use crate::error::AppError;
use domain::grouping::{Grouping, GroupingError, GroupingRepository};
use domain::value::GroupingId;

/// Move command: relocate one grouping to a new 1-based rank.
#[derive(Debug)]
pub struct MoveGroupingCmd {
    pub id: GroupingId,
    pub new_rank: i32,
}

/// Grouping application service: catalog ordering edits.
pub struct GroupingService {
    grouping_repository: Arc<dyn GroupingRepository>,
}

impl GroupingService {
    pub fn new(grouping_repository: Arc<dyn GroupingRepository>) -> Self {
        Self {
            grouping_repository,
        }
    }

    pub async fn list_groupings(&self) -> Result<Vec<Grouping>, AppError> {
        Ok(self.grouping_repository.list_all().await?)
    }

    pub async fn create_grouping(
        &self,
        id: GroupingId,
        title: String,
        thumbnail_url: String,
    ) -> Result<Grouping, AppError> {
        if id.is_empty() || title.is_empty() {
            return Err(AppError::InvalidInput(
                "grouping id and title are required".to_string(),
            ));
        }
        Ok(self
            .grouping_repository
            .create(id, title, thumbnail_url)
            .await?)
    }

    /// Relocates a grouping within the dense 1..N ranking. The shift and
    /// placement run in one transaction in the repository; a trailing
    /// compaction keeps ranks contiguous even against a stale count.
    pub async fn move_grouping(&self, cmd: MoveGroupingCmd) -> Result<(), AppError> {
        if cmd.new_rank < 1 {
            return Err(AppError::InvalidInput(format!(
                "rank must be >= 1, got {}",
                cmd.new_rank
            )));
        }
        self.grouping_repository
            .move_to_rank(&cmd.id, cmd.new_rank)
            .await
            .map_err(|e| match e {
                GroupingError::NotFound(id) => AppError::NotFound(format!("grouping {id}")),
                other => AppError::from(other),
            })
    }

    pub async fn delete_grouping(&self, id: &GroupingId, force: bool) -> Result<(), AppError> {
        self.grouping_repository
            .delete(id, force)
            .await
            .map_err(|e| match e {
                GroupingError::NotFound(id) => AppError::NotFound(format!("grouping {id}")),
                other => AppError::from(other),
            })
    }
}
