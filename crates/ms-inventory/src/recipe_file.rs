//! Recipe files and recipe directory discovery.
//!
//! A recipe file is line oriented, `#` starts a comment:
//!
//! ```text
//! width 3
//! height 3
//! input
//! 5:* 5:* 5:*
//! -   280 -
//! -   280 -
//! output 270 1 0
//! ```
//!
//! Cells are `-` (must be empty), `id` (durability 0), `id:h` (durability
//! `h`) or `id:*` (any durability).

use std::path::{Path, PathBuf};

use ms_item::ItemStack;
use tracing::{debug, info, warn};

use crate::error::RecipeError;
use crate::recipe::{HealthMatch, Ingredient, Recipe, RecipeBook};

/// Entry of the enabled list that turns on every recipe.
pub const ALL_RECIPES: &str = "*";

fn parse_err(line: usize, message: impl Into<String>) -> RecipeError {
    RecipeError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_num<T: std::str::FromStr>(line: usize, what: &str, token: Option<&str>) -> Result<T, RecipeError> {
    let token = token.ok_or_else(|| parse_err(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| parse_err(line, format!("bad {what} `{token}`")))
}

fn parse_cell(line: usize, token: &str) -> Result<Ingredient, RecipeError> {
    if token == "-" {
        return Ok(Ingredient::Empty);
    }
    let (id, health) = match token.split_once(':') {
        Some((id, "*")) => (id, HealthMatch::Any),
        Some((id, h)) => (id, HealthMatch::Exact(parse_num(line, "durability", Some(h))?)),
        None => (token, HealthMatch::Exact(0)),
    };
    let item: i16 = parse_num(line, "item id", Some(id))?;
    if item < 0 {
        return Err(parse_err(line, format!("negative item id {item}")));
    }
    Ok(Ingredient::Item { item, health })
}

/// Parse the text of one recipe file.
pub fn parse_recipe(text: &str) -> Result<Recipe, RecipeError> {
    let mut width: Option<u8> = None;
    let mut height: Option<u8> = None;
    let mut cells: Vec<Ingredient> = Vec::new();
    let mut rows_left = 0usize;
    let mut output: Option<ItemStack> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let mut tokens = content.split_whitespace();

        if rows_left > 0 {
            let row: Vec<&str> = tokens.collect();
            let w = width.unwrap_or_default() as usize;
            if row.len() != w {
                return Err(parse_err(line, format!("expected {w} cells, got {}", row.len())));
            }
            for token in row {
                cells.push(parse_cell(line, token)?);
            }
            rows_left -= 1;
            continue;
        }

        match tokens.next() {
            Some("width") => width = Some(parse_num(line, "width", tokens.next())?),
            Some("height") => height = Some(parse_num(line, "height", tokens.next())?),
            Some("input") => {
                let (Some(w), Some(h)) = (width, height) else {
                    return Err(parse_err(line, "input before width and height"));
                };
                if w == 0 || h == 0 {
                    return Err(RecipeError::BadDimensions { width: w, height: h });
                }
                rows_left = h as usize;
            }
            Some("output") => {
                let item: i16 = parse_num(line, "output id", tokens.next())?;
                let count: u8 = match tokens.next() {
                    Some(t) => parse_num(line, "output count", Some(t))?,
                    None => 1,
                };
                let health: i16 = match tokens.next() {
                    Some(t) => parse_num(line, "output durability", Some(t))?,
                    None => 0,
                };
                output = Some(ItemStack::new(item, count, health));
            }
            Some(other) => return Err(parse_err(line, format!("unknown directive `{other}`"))),
            None => {}
        }
    }

    if rows_left > 0 {
        return Err(parse_err(text.lines().count(), format!("{rows_left} input row(s) missing")));
    }
    let (Some(width), Some(height)) = (width, height) else {
        return Err(parse_err(0, "width and height are required"));
    };
    if cells.is_empty() {
        return Err(parse_err(0, "no input section"));
    }
    let output = output.ok_or_else(|| parse_err(0, "no output line"))?;
    Recipe::new(width, height, cells, output)
}

impl RecipeBook {
    /// Parse one recipe file and register it.
    pub fn read_recipe(&mut self, path: &Path) -> Result<(), RecipeError> {
        let text = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register(parse_recipe(&text)?)
    }

    /// Register every enabled recipe file under `dir`. Malformed files are
    /// logged and skipped. Returns how many recipes were added.
    pub fn load_recipes(&mut self, dir: &Path, suffix: &str, enabled: &[String]) -> usize {
        let files = enabled_recipe_files(dir, suffix, enabled);
        let mut loaded = 0;
        for path in &files {
            match self.read_recipe(path) {
                Ok(()) => loaded += 1,
                Err(e) => warn!("Skipping recipe {}: {e}", path.display()),
            }
        }
        info!(
            "Loaded {loaded} of {} recipe file(s) from {}",
            files.len(),
            dir.display()
        );
        loaded
    }
}

/// Whether a file, given by its stem and the directory names between the
/// recipe root and the file, is selected by the enabled list.
fn is_enabled(stem: &str, dirs: &[String], enabled: &[String]) -> bool {
    enabled
        .iter()
        .any(|e| e == ALL_RECIPES || e == stem || dirs.iter().any(|d| d == e))
}

fn collect(dir: &Path, dirs: &mut Vec<String>, suffix: &str, enabled: &[String], out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            debug!("Cannot read recipe directory {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() {
            dirs.push(name);
            collect(&path, dirs, suffix, enabled, out);
            dirs.pop();
        } else if let Some(stem) = name.strip_suffix(suffix) {
            if is_enabled(stem, dirs, enabled) {
                out.push(path);
            }
        }
    }
}

/// Recipe files under `dir` whose name ends in `suffix` and which the
/// enabled list selects, either by file stem or by the name of a directory
/// they sit in. `"*"` selects everything. Sorted so registration order does
/// not depend on the filesystem.
pub fn enabled_recipe_files(dir: &Path, suffix: &str, enabled: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect(dir, &mut Vec::new(), suffix, enabled, &mut files);
    files.sort();
    files
}
