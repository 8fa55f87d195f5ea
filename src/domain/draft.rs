//! Transient create/edit form state and its validation.
//!
//! A draft exists only for the duration of a create or edit exchange; it
//! is validated into a [`CleanDraft`] before anything touches storage.
//! Validation failures never reach the repository layer.

use url::Url;

use crate::domain::entities::PostRecord;

pub const CAPTION_MAX_CHARS: usize = 280;

pub const CAPTION_REQUIRED: &str = "Caption is required.";
pub const CAPTION_TOO_LONG: &str = "Caption is too long.";
pub const IMAGE_URL_EMPTY: &str = "Image URL cannot be empty.";
pub const IMAGE_URL_INVALID: &str = "Enter a valid URL.";
pub const IMAGES_REQUIRED: &str = "Add at least one image URL.";

/// Editable form state for a post: a caption and a list of image URL
/// slots. The slot list never becomes empty; the UI always shows at
/// least one input.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub caption: String,
    pub image_urls: Vec<String>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PostDraft {
    /// A blank draft with a single empty image slot.
    pub fn new() -> Self {
        Self {
            caption: String::new(),
            image_urls: vec![String::new()],
        }
    }

    /// Seed a draft from an existing post, for the edit flow. A post
    /// with no images still yields one blank slot.
    pub fn seeded_from(post: &PostRecord) -> Self {
        let image_urls = if post.image_urls.is_empty() {
            vec![String::new()]
        } else {
            post.image_urls.clone()
        };
        Self {
            caption: post.caption.clone().unwrap_or_default(),
            image_urls,
        }
    }

    /// Build a draft from raw request input, restoring the one-slot
    /// minimum when the caller sent an empty list.
    pub fn from_parts(caption: String, image_urls: Vec<String>) -> Self {
        let image_urls = if image_urls.is_empty() {
            vec![String::new()]
        } else {
            image_urls
        };
        Self {
            caption,
            image_urls,
        }
    }

    pub fn add_slot(&mut self) {
        self.image_urls.push(String::new());
    }

    /// Remove the slot at `index`. The last remaining slot cannot be
    /// removed; out-of-range indexes are ignored.
    pub fn remove_slot(&mut self, index: usize) {
        if self.image_urls.len() > 1 && index < self.image_urls.len() {
            self.image_urls.remove(index);
        }
    }

    pub fn set_slot(&mut self, index: usize, value: String) {
        if let Some(slot) = self.image_urls.get_mut(index) {
            *slot = value;
        }
    }

    /// Validate the draft. On success the result carries the trimmed
    /// caption and the cleaned image list (trimmed, no empty entries);
    /// on failure, per-field messages positioned against the original
    /// slots.
    pub fn validate(&self) -> Result<CleanDraft, DraftErrors> {
        let trimmed_caption = self.caption.trim();
        let cleaned: Vec<&str> = self.image_urls.iter().map(|url| url.trim()).collect();

        let mut errors = DraftErrors {
            caption: None,
            images: vec![None; cleaned.len()],
            form: None,
        };
        let mut has_error = false;

        if trimmed_caption.is_empty() {
            errors.caption = Some(CAPTION_REQUIRED);
            has_error = true;
        } else if trimmed_caption.chars().count() > CAPTION_MAX_CHARS {
            errors.caption = Some(CAPTION_TOO_LONG);
            has_error = true;
        }

        if cleaned.iter().all(|url| url.is_empty()) {
            errors.form = Some(IMAGES_REQUIRED);
            has_error = true;
        }

        for (idx, url) in cleaned.iter().enumerate() {
            if url.is_empty() {
                errors.images[idx] = Some(IMAGE_URL_EMPTY);
                has_error = true;
            } else if Url::parse(url).is_err() {
                errors.images[idx] = Some(IMAGE_URL_INVALID);
                has_error = true;
            }
        }

        if has_error {
            return Err(errors);
        }

        Ok(CleanDraft {
            caption: trimmed_caption.to_string(),
            image_urls: cleaned
                .into_iter()
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

/// A draft that passed validation: trimmed caption, cleaned image list
/// with no empty entries, every entry a parsable URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanDraft {
    pub caption: String,
    pub image_urls: Vec<String>,
}

/// Per-field validation outcome. `images` is positional against the
/// draft's slots so the form can annotate the offending input.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftErrors {
    pub caption: Option<&'static str>,
    pub images: Vec<Option<&'static str>>,
    pub form: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(caption: &str, images: &[&str]) -> PostDraft {
        PostDraft::from_parts(
            caption.to_string(),
            images.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn whitespace_caption_is_required() {
        let errors = draft("   \t  ", &["https://x.test/a.png"])
            .validate()
            .unwrap_err();
        assert_eq!(errors.caption, Some(CAPTION_REQUIRED));
        assert_eq!(errors.form, None);
    }

    #[test]
    fn overlong_caption_is_rejected() {
        let caption = "x".repeat(CAPTION_MAX_CHARS + 1);
        let errors = draft(&caption, &["https://x.test/a.png"])
            .validate()
            .unwrap_err();
        assert_eq!(errors.caption, Some(CAPTION_TOO_LONG));
    }

    #[test]
    fn caption_at_limit_is_accepted() {
        let caption = "x".repeat(CAPTION_MAX_CHARS);
        assert!(draft(&caption, &["https://x.test/a.png"]).validate().is_ok());
    }

    #[test]
    fn all_blank_slots_report_both_levels() {
        let errors = draft("Hello", &["  ", ""]).validate().unwrap_err();
        assert_eq!(errors.form, Some(IMAGES_REQUIRED));
        assert_eq!(
            errors.images,
            vec![Some(IMAGE_URL_EMPTY), Some(IMAGE_URL_EMPTY)]
        );
    }

    #[test]
    fn malformed_url_is_flagged_in_place() {
        let errors = draft("Hello", &["https://x.test/a.png", "not a url"])
            .validate()
            .unwrap_err();
        assert_eq!(errors.images, vec![None, Some(IMAGE_URL_INVALID)]);
        assert_eq!(errors.form, None);
    }

    #[test]
    fn clean_draft_trims_and_drops_nothing_valid() {
        let clean = draft("  Hello  ", &[" https://x.test/a.png "])
            .validate()
            .expect("valid draft");
        assert_eq!(clean.caption, "Hello");
        assert_eq!(clean.image_urls, vec!["https://x.test/a.png".to_string()]);
    }

    #[test]
    fn last_slot_cannot_be_removed() {
        let mut form = PostDraft::new();
        form.remove_slot(0);
        assert_eq!(form.image_urls.len(), 1);

        form.add_slot();
        assert_eq!(form.image_urls.len(), 2);
        form.remove_slot(1);
        assert_eq!(form.image_urls.len(), 1);
    }

    #[test]
    fn seeding_an_imageless_post_keeps_one_slot() {
        let post = PostRecord {
            id: uuid::Uuid::new_v4(),
            caption: None,
            image_urls: Vec::new(),
            owner: None,
            created_at: time::OffsetDateTime::now_utc(),
            updated_at: None,
        };
        let form = PostDraft::seeded_from(&post);
        assert_eq!(form.image_urls, vec![String::new()]);
        assert_eq!(form.caption, "");
    }
}
