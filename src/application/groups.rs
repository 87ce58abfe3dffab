use std::sync::Arc;

use tracing::info;

use crate::application::error::AppError;
use crate::application::repos::{CreateGroupParams, GroupsRepo, GroupsWriteRepo, RepoError};
use crate::domain::entities::GroupRecord;
use crate::domain::slug::{SlugAsyncError, generate_unique_slug_async, validate_slug};

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct CreateGroupCommand {
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Clone)]
pub struct GroupService {
    reader: Arc<dyn GroupsRepo>,
    writer: Arc<dyn GroupsWriteRepo>,
}

impl GroupService {
    pub fn new(reader: Arc<dyn GroupsRepo>, writer: Arc<dyn GroupsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list(&self) -> Result<Vec<GroupRecord>, AppError> {
        Ok(self.reader.list_groups().await?)
    }

    pub async fn find(&self, slug: &str) -> Result<GroupRecord, AppError> {
        self.reader
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("group"))
    }

    pub async fn create(&self, command: CreateGroupCommand) -> Result<GroupRecord, AppError> {
        let CreateGroupCommand {
            title,
            slug,
            description,
        } = command;

        let title = title.trim().to_string();
        ensure_non_empty(&title, "title")?;
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let slug = match slug.map(|value| value.trim().to_string()) {
            Some(slug) if !slug.is_empty() => {
                validate_slug(&slug).map_err(|err| AppError::validation(err.to_string()))?;
                if self.reader.find_group_by_slug(&slug).await?.is_some() {
                    return Err(duplicate_slug(&slug));
                }
                slug
            }
            _ => self.derive_unique_slug(&title).await?,
        };

        let params = CreateGroupParams {
            title,
            slug: slug.clone(),
            description: description.trim().to_string(),
        };

        let group = match self.writer.create_group(params).await {
            Ok(group) => group,
            Err(RepoError::Duplicate { .. }) => return Err(duplicate_slug(&slug)),
            Err(err) => return Err(err.into()),
        };

        info!(
            target = "blogroll::groups",
            group_id = group.id,
            slug = %group.slug,
            "Group created"
        );
        Ok(group)
    }

    /// Delete a group. Posts that referenced it survive with no group.
    pub async fn delete(&self, slug: &str) -> Result<(), AppError> {
        let group = self.find(slug).await?;
        self.writer.delete_group(group.id).await?;
        info!(
            target = "blogroll::groups",
            group_id = group.id,
            slug = %group.slug,
            "Group deleted"
        );
        Ok(())
    }

    async fn derive_unique_slug(&self, title: &str) -> Result<String, AppError> {
        let reader = self.reader.clone();
        generate_unique_slug_async(title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_group_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(err) => AppError::validation(err.to_string()),
            SlugAsyncError::Predicate(err) => AppError::Repo(err),
        })
    }
}

fn duplicate_slug(slug: &str) -> AppError {
    AppError::validation(format!("group slug `{slug}` already exists"))
}

fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
