//! Command handlers.

use super::commands::Commands;
use super::output::{
    default_title, file_name, guess_mimetype, print_json, read_file, write_file,
};
use atelier::{AssetService, BulkItemError, BulkItemResult, NewAsset};
use atelier_core::{
    AssetMetadata, AssetQuery, MetadataPatch, PageRequest, TransformSpec, Upload, parse_tag_list,
};
use atelier_error::AtelierResult;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

async fn load_upload(path: &Path, mimetype: Option<String>) -> AtelierResult<Upload> {
    let bytes = read_file(path).await?;
    let mimetype = mimetype.unwrap_or_else(|| guess_mimetype(path));
    Ok(Upload::new(file_name(path), mimetype, bytes))
}

/// Upload every readable file, reporting unreadable ones as failed items.
///
/// Results are in the order of `files`.
async fn bulk_upload(
    service: &AssetService,
    files: &[PathBuf],
    tags: &BTreeSet<String>,
) -> Vec<BulkItemResult> {
    let mut results = Vec::with_capacity(files.len());
    let mut positions = Vec::with_capacity(files.len());
    let mut items = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        match load_upload(file, None).await {
            Ok(upload) => {
                let metadata = AssetMetadata::new(default_title(file)).with_tags(tags.clone());
                positions.push(index);
                items.push(NewAsset::new(metadata, upload));
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                results.push(BulkItemResult {
                    index,
                    filename: file_name(file),
                    asset: None,
                    error: Some(BulkItemError::from(&e)),
                });
            }
        }
    }

    for mut result in service.bulk_create(items).await {
        if let Some(&index) = positions.get(result.index) {
            result.index = index;
        }
        results.push(result);
    }
    results.sort_by_key(|result| result.index);
    results
}

/// Execute one command against `service`, printing JSON results on stdout.
pub async fn handle_command(service: &AssetService, command: Commands) -> AtelierResult<()> {
    match command {
        Commands::Upload {
            file,
            title,
            description,
            tags,
            mimetype,
        } => {
            let upload = load_upload(&file, mimetype).await?;
            let mut metadata = AssetMetadata::new(title.unwrap_or_else(|| default_title(&file)))
                .with_tags(tags.as_deref().map(parse_tag_list).unwrap_or_default());
            if let Some(description) = description {
                metadata = metadata.with_description(description);
            }
            print_json(&service.create_asset(metadata, upload).await?)
        }

        Commands::BulkUpload { files, tags } => {
            let tags = tags.as_deref().map(parse_tag_list).unwrap_or_default();
            print_json(&bulk_upload(service, &files, &tags).await)
        }

        Commands::AddVersion { id, file, mimetype } => {
            let upload = load_upload(&file, mimetype).await?;
            print_json(&service.add_version(id, upload).await?)
        }

        Commands::Show { id } => print_json(&service.get_asset(id).await?),

        Commands::List {
            text,
            tags,
            mimetype,
            page,
            size,
        } => {
            let query = AssetQuery {
                text,
                tags: tags.into_iter().collect(),
                mimetype,
                page: PageRequest::new(page, size),
            };
            print_json(&service.search(&query).await?)
        }

        Commands::Versions { id } => print_json(&service.list_versions(id).await?),

        Commands::Download {
            id,
            version,
            output,
        } => {
            let download = service.download_version(id, version).await?;
            let path = output.unwrap_or_else(|| download.version.filename.clone().into());
            write_file(&path, &download.bytes).await?;
            print_json(&json!({
                "path": path.display().to_string(),
                "version": download.version,
            }))
        }

        Commands::Transform {
            id,
            version,
            width,
            height,
            crop,
            format,
            quality,
            output,
        } => {
            let spec = TransformSpec {
                width,
                height,
                crop,
                format,
                quality,
            };
            let rendition = service.transform(id, version, spec).await?;
            write_file(&output, rendition.bytes()).await?;
            print_json(&json!({
                "path": output.display().to_string(),
                "mimetype": rendition.mimetype(),
                "size": rendition.len(),
            }))
        }

        Commands::Preview {
            id,
            width,
            height,
            output,
        } => {
            let rendition = service.preview(id, width, height).await?;
            write_file(&output, rendition.bytes()).await?;
            print_json(&json!({
                "path": output.display().to_string(),
                "mimetype": rendition.mimetype(),
                "size": rendition.len(),
            }))
        }

        Commands::Tags { text, page, size } => {
            print_json(&service.list_tags(text.as_deref(), PageRequest::new(page, size)).await?)
        }

        Commands::SetTags { id, tags } => {
            print_json(&service.replace_tags(id, parse_tag_list(&tags)).await?)
        }

        Commands::Edit {
            id,
            title,
            description,
            clear_description,
        } => {
            let description = if clear_description {
                Some(None)
            } else {
                description.map(Some)
            };
            let patch = MetadataPatch {
                title,
                description,
                ..Default::default()
            };
            print_json(&service.update_metadata(id, patch).await?)
        }

        Commands::Usage => {
            let usage = service.storage_usage().await?;
            print_json(&json!({ "blobs": usage.blobs, "bytes": usage.bytes }))
        }
    }
}
