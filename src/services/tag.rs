use std::sync::Arc;

use crate::{
    error::AppError,
    models::tag::{CreateTagRequest, NewTag, Tag, TagChanges, TagListParams, UpdateTagRequest},
    repository::TagRepository,
    utils::slug::slugify_or,
};

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn create(&self, req: CreateTagRequest) -> Result<Tag, AppError> {
        let slug = slugify_or(req.slug.as_deref().unwrap_or(&req.name), "tag");
        if self.tags.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::BadRequest("Tag slug already exists".to_string()));
        }
        if self.tags.find_by_name(&req.name).await?.is_some() {
            return Err(AppError::BadRequest("Tag name already exists".to_string()));
        }

        let tag = self
            .tags
            .create(NewTag {
                name: req.name,
                slug,
                description: req.description.unwrap_or_default(),
                color: req.color.unwrap_or_default(),
            })
            .await?;

        tracing::info!("Tag created: {} ({})", tag.name, tag.slug);
        Ok(tag)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Tag, AppError> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Tag not found".to_string()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag, AppError> {
        self.tags
            .find_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound("Tag not found".to_string()))
    }

    pub async fn list(&self, params: TagListParams) -> Result<Vec<Tag>, AppError> {
        self.tags.list(&params).await
    }

    pub async fn update(&self, id: i64, req: UpdateTagRequest) -> Result<Tag, AppError> {
        let tag = self.get_by_id(id).await?;

        if let Some(name) = req.name.as_deref() {
            if let Some(existing) = self.tags.find_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::BadRequest("Tag name already exists".to_string()));
                }
            }
        }

        self.tags
            .update(
                id,
                TagChanges {
                    name: req.name.unwrap_or(tag.name),
                    description: req.description.unwrap_or(tag.description),
                    color: req.color.unwrap_or(tag.color),
                },
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let tag = self.get_by_id(id).await?;
        if tag.article_count > 0 {
            return Err(AppError::BadRequest(
                "Tag is used by articles and cannot be deleted".to_string(),
            ));
        }
        self.tags.delete(id).await?;
        tracing::info!("Tag {} deleted", id);
        Ok(())
    }
}
