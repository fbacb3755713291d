//! NPOT scale-factor override files.
//!
//! Each file is whitespace-delimited `<name> <scale_x> <scale_y>` records,
//! one per line, keyed by texture name without extension. A base file in
//! the texture directory is read first; compressed-format subdirectories
//! may ship their own copy, which overrides the base entries name by name.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info, warn};

pub const SCALE_FACTORS_FILENAME: &str = "scalefactors.txt";

pub type ScaleOverrides = HashMap<String, (f32, f32)>;

/// Parses one scale-factor file into `overrides`, entry by entry.
///
/// A record is accepted only if the name is non-empty and both factors
/// parse to non-zero values; anything else on the line is skipped.
pub fn read_scale_factors_file(
    path: &Path,
    overrides: &mut ScaleOverrides,
) -> io::Result<usize> {
    let content = fs::read_to_string(path)?;
    info!("Reading texture NPOT scale factors from {}", path.display());

    let mut accepted = 0;
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(sx), Some(sy)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let (Ok(sx), Ok(sy)) = (sx.parse::<f32>(), sy.parse::<f32>()) else {
            continue;
        };
        if sx == 0.0 || sy == 0.0 {
            continue;
        }
        debug!("Read name={} scale_x={} scale_y={}", name, sx, sy);
        overrides.insert(name.to_string(), (sx, sy));
        accepted += 1;
    }

    Ok(accepted)
}

/// Reads the base `scalefactors.txt` and then each format subdirectory's
/// copy, later files overriding earlier entries per name. Missing files
/// are skipped; absence is not an error.
pub fn read_scale_factors_files(
    textures_dir: &Path,
    format_subdirs: &[String],
    overrides: &mut ScaleOverrides,
) {
    let mut paths = vec![textures_dir.join(SCALE_FACTORS_FILENAME)];
    for subdir in format_subdirs {
        paths.push(textures_dir.join(subdir).join(SCALE_FACTORS_FILENAME));
    }

    for path in paths {
        if !path.is_file() {
            continue;
        }
        if let Err(e) = read_scale_factors_file(&path, overrides) {
            warn!("Failed to read scale factors from {}: {}", path.display(), e);
        }
    }
}

/// Strips the file extension; override entries are keyed without one.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if !name[i + 1..].contains('/') => &name[..i],
        _ => name,
    }
}
