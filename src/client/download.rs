use crate::{
    error::{PopArtError, Result},
    models::GeneratedImage,
};
use reqwest::Client;
use std::path::{Path, PathBuf};

/// `pop-art-<first 20 chars of the prompt, whitespace runs as '-'>.jpg`
pub fn download_filename(prompt: &str) -> String {
    let head: String = prompt.chars().take(20).collect();
    let mut slug = String::with_capacity(head.len());
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    format!("pop-art-{}.jpg", slug)
}

/// Fetches the stored image and writes it into `dir`.
pub async fn download_image(client: &Client, image: &GeneratedImage, dir: &Path) -> Result<PathBuf> {
    let response = client
        .get(&image.image_url)
        .send()
        .await
        .map_err(|e| PopArtError::transport(format!("Cannot fetch {}", image.image_url), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PopArtError::ProxyRejected {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PopArtError::transport("Reading image body", e))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(download_filename(&image.prompt));
    tokio::fs::write(&path, &bytes).await?;

    log::info!("💾 Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
