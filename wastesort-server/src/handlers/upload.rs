//! Upload form and classification handler

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Html,
};
use uuid::Uuid;
use wastesort_core::logic::report::writer::atomic_write;
use wastesort_core::Classification;

use crate::{views, AppError, AppResult, AppState};

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

pub async fn index() -> Html<String> {
    Html(views::index_page())
}

/// Save the upload, classify it and render the result
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<String>> {
    let (raw_name, data) = read_file_field(&mut multipart)
        .await?
        .ok_or(AppError::MissingUpload)?;

    let filename = sanitize_filename(&raw_name);
    // Unique on disk so concurrent uploads with the same name never share a file
    let path = state
        .config
        .upload_dir
        .join(format!("{}-{}", Uuid::new_v4().simple(), filename));

    let pipeline = state.pipeline.clone();
    let image_path = path.clone();
    let result = tokio::task::spawn_blocking(move || -> AppResult<Classification> {
        atomic_write(&image_path, &data).map_err(AppError::UploadStore)?;
        tracing::debug!("Stored upload {} ({} bytes)", image_path.display(), data.len());
        Ok(pipeline.classify_file(&image_path)?)
    })
    .await??;

    let image_url = state.config.static_url(&path);
    Ok(Html(views::result_page(
        image_url.as_deref(),
        &filename,
        &result,
    )))
}

/// First `file` field with a name and a non-empty body
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        if name.trim().is_empty() || data.is_empty() {
            return Ok(None);
        }
        return Ok(Some((name, data)));
    }
    Ok(None)
}

/// Reduce a client-supplied name to a safe final path component
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        format!("upload-{}", Uuid::new_v4())
    } else {
        cleaned
    }
}

#[cfg(test)]
mod sanitize_tests {
    use super::sanitize_filename;

    #[test]
    fn test_keeps_plain_names() {
        assert_eq!(sanitize_filename("bottle.jpg"), "bottle.jpg");
        assert_eq!(sanitize_filename("brown-glass_01.PNG"), "brown-glass_01.PNG");
    }

    #[test]
    fn test_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\box.png"), "box.png");
    }

    #[test]
    fn test_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
    }

    #[test]
    fn test_unusable_names_get_generated() {
        for raw in ["", "..", "uploads/", "   "] {
            let name = sanitize_filename(raw);
            assert!(name.starts_with("upload-"), "{:?} -> {:?}", raw, name);
        }
    }
}
