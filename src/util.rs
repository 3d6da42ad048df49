use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

const ENTRY_ID_HEX_LEN: usize = 16;

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn read_document(path: &Path) -> Result<String> {
    let raw =
        fs::read(path).with_context(|| format!("failed to read clippings file: {}", path.display()))?;
    String::from_utf8(raw)
        .with_context(|| format!("clippings file is not valid UTF-8 text: {}", path.display()))
}

/// Short stable digest over `parts`, separated so that adjacent fields cannot run together.
pub fn short_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f_u8]);
    }

    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(ENTRY_ID_HEX_LEN);
    hex
}

pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for character in input.chars() {
        if character.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(character.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    ensure_parent_directory(path)?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create file: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_directory(path)?;

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}
