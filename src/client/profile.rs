use tracing::info;

use super::NexusClient;
use crate::core::validation::{non_blank, validate_image_url, validate_profile_names};
use crate::entities::{Profile, ProfileForm, ProfileUpdate};
use crate::error::{AppError, AppResult};

impl NexusClient {
    /// Stages a new avatar; it is saved with the next profile update.
    pub async fn stage_avatar(&self, url: &str) -> AppResult<()> {
        let url = self.surface("Invalid image URL", validate_image_url(url)).await?;
        self.ui().stage_avatar(Some(url)).await;
        self.inform("Avatar updated! Remember to save your profile.").await;
        Ok(())
    }

    pub async fn update_profile(&self, form: ProfileForm) -> AppResult<Profile> {
        let session = self.require_session("Please login to edit your profile").await?;
        self.surface(
            "Failed to update profile",
            validate_profile_names(&form.first_name, &form.last_name),
        )
        .await?;

        let current = self.session().current_profile().await;
        let current = self
            .surface(
                "Failed to update profile",
                current.ok_or_else(|| AppError::NotFound("Profile not loaded".to_string())),
            )
            .await?;
        let avatar_url = self
            .ui()
            .drafts()
            .await
            .avatar_url
            .or(current.avatar_url);

        let update = ProfileUpdate {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            bio: non_blank(form.bio.as_deref())
                .unwrap_or_else(|| self.config().profile.bio.clone()),
            website: non_blank(form.website.as_deref()),
            phone: non_blank(form.phone.as_deref()),
            avatar_url,
        };
        let profile = self
            .surface(
                "Failed to update profile",
                self.backend()
                    .update_profile(session.user_id, update)
                    .await,
            )
            .await?;

        info!("Profile {} updated", profile.id);
        self.session().set_profile(profile.clone()).await;
        self.ui().stage_avatar(None).await;
        self.succeed("Profile updated successfully!").await;
        Ok(profile)
    }
}
