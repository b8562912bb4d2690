//! Attachment transcoding: raw image bytes to base64 inline parts.

use base64::Engine;
use futures::future::try_join_all;
use tracing::{debug, instrument, trace};

use plume_core::defaults::MAX_TRANSMITTED_ATTACHMENTS;
use plume_core::{Attachment, AttachmentSource, EncodedPart, Error, Result};

/// Encode up to [`MAX_TRANSMITTED_ATTACHMENTS`] attachments, in order.
///
/// Items are read and encoded concurrently; the output keeps input order.
/// Any single failure fails the whole batch, so the backend never sees a
/// partial image set.
#[instrument(skip(attachments), fields(subsystem = "orchestrator", component = "encoder", op = "encode", attachment_count = attachments.len()))]
pub async fn encode(attachments: &[Attachment]) -> Result<Vec<EncodedPart>> {
    let selected = &attachments[..attachments.len().min(MAX_TRANSMITTED_ATTACHMENTS)];
    if selected.len() < attachments.len() {
        debug!(
            transmitted = selected.len(),
            "Attachments beyond transmission limit are not sent"
        );
    }

    let parts =
        try_join_all(selected.iter().enumerate().map(|(index, a)| encode_one(index, a))).await?;

    debug!(
        payload_bytes = parts.iter().map(|p| p.data.len()).sum::<usize>(),
        "Attachments encoded"
    );
    Ok(parts)
}

async fn encode_one(index: usize, attachment: &Attachment) -> Result<EncodedPart> {
    let data = match &attachment.source {
        AttachmentSource::Bytes(bytes) => bytes.clone(),
        AttachmentSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            Error::Encoding(format!(
                "failed reading attachment {} ({}): {}",
                index,
                path.display(),
                e
            ))
        })?,
    };

    if data.is_empty() {
        return Err(Error::Encoding(format!(
            "attachment {} ({}) is empty",
            index, attachment.name
        )));
    }

    let mime_type = resolve_media_type(index, attachment, &data)?;

    // Base64 of a multi-megabyte photo is CPU work; keep it off the reactor.
    let encoded = tokio::task::spawn_blocking(move || {
        base64::engine::general_purpose::STANDARD.encode(data)
    })
    .await
    .map_err(|e| Error::Encoding(format!("encoding task for attachment {} failed: {}", index, e)))?;

    trace!(index, mime_type = %mime_type, encoded_len = encoded.len(), "Attachment encoded");

    Ok(EncodedPart {
        name: attachment.name.clone(),
        mime_type,
        data: encoded,
    })
}

/// Declared type if present, magic-byte sniffing otherwise. Only images pass.
fn resolve_media_type(index: usize, attachment: &Attachment, data: &[u8]) -> Result<String> {
    let declared = attachment.media_type.trim();
    let mime_type = if declared.is_empty() {
        infer::get(data)
            .map(|kind| kind.mime_type().to_string())
            .ok_or_else(|| {
                Error::Encoding(format!(
                    "attachment {} ({}) has no media type and could not be identified",
                    index, attachment.name
                ))
            })?
    } else {
        declared.to_ascii_lowercase()
    };

    if !mime_type.starts_with("image/") {
        return Err(Error::Encoding(format!(
            "attachment {} ({}) is {}, expected an image",
            index, attachment.name, mime_type
        )));
    }
    Ok(mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn image(i: u8) -> Attachment {
        Attachment::from_bytes(format!("{i}.png"), "image/png", vec![i; 3])
    }

    #[tokio::test]
    async fn test_transmits_min_of_four_and_count_in_order() {
        for count in 1..=9u8 {
            let attachments: Vec<_> = (0..count).map(image).collect();
            let parts = encode(&attachments).await.unwrap();
            assert_eq!(parts.len(), (count as usize).min(4));
            for (i, part) in parts.iter().enumerate() {
                assert_eq!(part.name, format!("{i}.png"));
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&part.data)
                    .unwrap();
                assert_eq!(decoded, vec![i as u8; 3]);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_input_yields_no_parts() {
        assert!(encode(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_batch() {
        let attachments = vec![
            image(0),
            Attachment::from_path(PathBuf::from("/definitely/not/here.png")),
            image(2),
        ];
        let err = encode(&attachments).await.unwrap_err();
        assert_eq!(err.kind(), "encoding");
        assert!(err.to_string().contains("attachment 1"));
    }

    #[tokio::test]
    async fn test_failure_beyond_cap_is_ignored() {
        // The fifth item is never transmitted, so it is never read.
        let mut attachments: Vec<_> = (0..4).map(image).collect();
        attachments.push(Attachment::from_path("/definitely/not/here.png"));
        assert_eq!(encode(&attachments).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_blob_rejected() {
        let attachments = vec![Attachment::from_bytes("a.png", "image/png", vec![])];
        assert!(matches!(encode(&attachments).await, Err(Error::Encoding(_))));
    }

    #[tokio::test]
    async fn test_non_image_media_type_rejected() {
        let attachments = vec![Attachment::from_bytes("a.pdf", "application/pdf", vec![1])];
        let err = encode(&attachments).await.unwrap_err();
        assert!(err.to_string().contains("expected an image"));
    }

    #[tokio::test]
    async fn test_missing_media_type_is_sniffed() {
        let mut data = PNG_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        let attachments = vec![Attachment::from_bytes("cover", "", data)];
        let parts = encode(&attachments).await.unwrap();
        assert_eq!(parts[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_unidentifiable_blob_rejected() {
        let attachments = vec![Attachment::from_bytes("mystery", "", vec![1, 2, 3])];
        assert!(encode(&attachments).await.is_err());
    }

    #[tokio::test]
    async fn test_reads_path_backed_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        tokio::fs::write(&path, PNG_MAGIC).await.unwrap();
        let parts = encode(&[Attachment::from_path(&path)]).await.unwrap();

        assert_eq!(parts[0].mime_type, "image/png");
        assert_eq!(
            parts[0].data,
            base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC)
        );
    }
}
