use crate::core::sync_store::SyncStore;

use super::{ServiceError, ServiceResult, ValidationRules};

pub struct CategoryService;

impl CategoryService {
    /// Returns the trimmed name when it satisfies the length rules.
    pub fn validate(rules: &ValidationRules, raw: &str) -> ServiceResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("category", "Category name is required"));
        }
        let length = name.chars().count();
        if length < rules.category_min_len {
            return Err(ServiceError::invalid(
                "category",
                format!(
                    "Category name must be at least {} characters",
                    rules.category_min_len
                ),
            ));
        }
        if length > rules.category_max_len {
            return Err(ServiceError::invalid(
                "category",
                format!(
                    "Category name must be less than {} characters",
                    rules.category_max_len
                ),
            ));
        }
        Ok(name.to_string())
    }

    pub async fn submit(
        store: &SyncStore,
        user_id: &str,
        rules: &ValidationRules,
        raw: &str,
    ) -> ServiceResult<String> {
        let name = Self::validate(rules, raw)?;
        store.add_category(user_id, &name).await?;
        Ok(name)
    }
}
