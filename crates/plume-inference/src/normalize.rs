//! Input shaping and validation.
//!
//! Runs before anything else in a submission and has no side effects beyond
//! returning a cleaned-up [`Submission`].

use tracing::debug;

use plume_core::defaults::{BODY_LIMIT, MAX_ATTACHMENTS, TITLE_LIMIT};
use plume_core::{CritiqueRequest, GenerationRequest, InputError, Submission};

/// Validate and normalize a submission for its mode.
pub fn normalize(submission: Submission) -> Result<Submission, InputError> {
    match submission {
        Submission::Generate(request) => normalize_generation(request).map(Submission::Generate),
        Submission::Critique(request) => normalize_critique(request).map(Submission::Critique),
    }
}

/// Generation input rules.
///
/// - no attachments: `MissingAttachments`
/// - blank key points: `MissingKeyPoints`
/// - more than [`MAX_ATTACHMENTS`] images: silently keep the first ones
/// - blank optional text: `None`
pub fn normalize_generation(
    mut request: GenerationRequest,
) -> Result<GenerationRequest, InputError> {
    if request.attachments.is_empty() {
        return Err(InputError::MissingAttachments);
    }

    let key_points = request.key_points.trim();
    if key_points.is_empty() {
        return Err(InputError::MissingKeyPoints);
    }
    request.key_points = key_points.to_string();

    if request.attachments.len() > MAX_ATTACHMENTS {
        debug!(
            subsystem = "orchestrator",
            component = "normalizer",
            attachment_count = request.attachments.len(),
            kept = MAX_ATTACHMENTS,
            "Dropping attachments beyond upload limit"
        );
        request.attachments.truncate(MAX_ATTACHMENTS);
    }

    request.brand_context = non_blank(request.brand_context);
    request.draft = non_blank(request.draft);

    Ok(request)
}

/// Critique input rules.
///
/// Over-length fields are rejected, never truncated: submitting a silently
/// shortened text would change what the user asked to have reviewed.
pub fn normalize_critique(mut request: CritiqueRequest) -> Result<CritiqueRequest, InputError> {
    request.title = required_within("title", &request.title, TITLE_LIMIT)?;
    request.body = required_within("body", &request.body, BODY_LIMIT)?;
    Ok(request)
}

fn required_within(field: &'static str, value: &str, max: usize) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingField(field));
    }
    let actual = trimmed.chars().count();
    if actual > max {
        return Err(InputError::TooLong { field, max, actual });
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_core::{Attachment, Goal, Purpose, Tone};

    fn image(i: usize) -> Attachment {
        Attachment::from_bytes(format!("{i}.png"), "image/png", vec![i as u8; 4])
    }

    fn generation(count: usize) -> GenerationRequest {
        GenerationRequest::new(Goal::Sales, Tone::Authentic, "8折限时3天")
            .with_attachments((0..count).map(image))
    }

    #[test]
    fn test_generation_requires_attachment() {
        let err = normalize_generation(generation(0)).unwrap_err();
        assert_eq!(err, InputError::MissingAttachments);
    }

    #[test]
    fn test_generation_requires_key_points() {
        let mut request = generation(1);
        request.key_points = "   \n ".to_string();
        let err = normalize_generation(request).unwrap_err();
        assert_eq!(err, InputError::MissingKeyPoints);
    }

    #[test]
    fn test_generation_caps_attachments_silently() {
        let request = normalize_generation(generation(12)).unwrap();
        assert_eq!(request.attachments.len(), MAX_ATTACHMENTS);
        assert_eq!(request.attachments[0].name, "0.png");
        assert_eq!(request.attachments[8].name, "8.png");
    }

    #[test]
    fn test_generation_blank_optionals_become_none() {
        let request = generation(1).with_draft("  ").with_brand_context("\t");
        let request = normalize_generation(request).unwrap();
        assert!(request.draft.is_none());
        assert!(request.brand_context.is_none());
    }

    #[test]
    fn test_generation_trims_key_points() {
        let mut request = generation(1);
        request.key_points = "  买一送一 ".to_string();
        let request = normalize_generation(request).unwrap();
        assert_eq!(request.key_points, "买一送一");
    }

    #[test]
    fn test_critique_requires_title_and_body() {
        let err = normalize_critique(CritiqueRequest::new(" ", "正文", Purpose::Growth)).unwrap_err();
        assert_eq!(err, InputError::MissingField("title"));
        let err = normalize_critique(CritiqueRequest::new("标题", "", Purpose::Growth)).unwrap_err();
        assert_eq!(err, InputError::MissingField("body"));
    }

    #[test]
    fn test_critique_title_limit_counts_code_points() {
        // 50 CJK characters are 150 bytes but exactly at the limit.
        let title = "瘦".repeat(TITLE_LIMIT);
        assert!(normalize_critique(CritiqueRequest::new(&title, "正文", Purpose::Growth)).is_ok());

        let title = "瘦".repeat(TITLE_LIMIT + 1);
        let err =
            normalize_critique(CritiqueRequest::new(title, "正文", Purpose::Growth)).unwrap_err();
        assert_eq!(
            err,
            InputError::TooLong {
                field: "title",
                max: TITLE_LIMIT,
                actual: TITLE_LIMIT + 1
            }
        );
    }

    #[test]
    fn test_critique_body_over_limit_rejected() {
        let body = "a".repeat(BODY_LIMIT + 1);
        let err = normalize_critique(CritiqueRequest::new("标题", body, Purpose::Conversion))
            .unwrap_err();
        assert!(matches!(err, InputError::TooLong { field: "body", .. }));
    }

    #[test]
    fn test_normalize_keeps_mode() {
        let submission = normalize(Submission::Critique(CritiqueRequest::new(
            " 标题 ",
            " 正文 ",
            Purpose::PersonalBrand,
        )))
        .unwrap();
        match submission {
            Submission::Critique(request) => {
                assert_eq!(request.title, "标题");
                assert_eq!(request.body, "正文");
            }
            Submission::Generate(_) => panic!("mode changed"),
        }
    }
}
