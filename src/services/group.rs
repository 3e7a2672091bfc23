use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::group::{CreateGroupRequest, Group};
use crate::services::Database;
use crate::utils::slug;

#[derive(Clone)]
pub struct GroupService {
    db: Arc<Database>,
}

impl GroupService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 创建分组；未提供 slug 时根据标题生成唯一 slug
    pub async fn create_group(&self, request: CreateGroupRequest) -> Result<Group> {
        debug!("Creating group: {}", request.title);

        request.validate().map_err(AppError::ValidatorError)?;

        let group_slug = match request.slug {
            Some(provided) => {
                if !slug::is_valid_slug(&provided) {
                    return Err(AppError::validation("Invalid group slug"));
                }
                provided
            }
            None => {
                let base = slug::generate_slug(&request.title);
                slug::make_slug_unique(&base, |candidate| self.db.group_slug_exists(candidate))
            }
        };

        let group = self
            .db
            .create_group(&request.title, &group_slug, &request.description)?;

        info!("Created group: {} ({})", group.slug, group.id);
        Ok(group)
    }

    /// 根据 slug 查找分组
    pub async fn get_by_slug(&self, group_slug: &str) -> Result<Group> {
        self.db
            .find_group_by_slug(group_slug)
            .ok_or_else(|| AppError::not_found("Group"))
    }

    /// All groups for the post form's select widget.
    pub async fn list_groups(&self) -> Vec<Group> {
        self.db.groups_all()
    }
}
