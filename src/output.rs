//! CLI output formatting.
//!
//! Output is information-first: each tile is shown by its position and
//! identity, with source and presentation details on indented lines.
//!
//! ## Show
//!
//! ```text
//! summer: Summer (simple grid, 3 images, 1 spacer)
//! 001 beach-day [2x2]
//!     Source: /content/summer/001-Beach-Day.jpg
//!     Crop: 20% 75%
//!     --- spacer 2x1
//! 002 harbour [1]
//!     Source: /content/summer/002-Harbour.jpg
//! ```
//!
//! ## Check
//!
//! ```text
//! portraits: 12 images
//! summer: ERROR Invalid gallery file content/summer.json: EOF
//! Checked 2 galleries, 1 failed
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::layout::{Layout, Tile};
use crate::types::GalleryConfig;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Tiles in order. Spacers are shown indented under the image before them.
pub fn format_layout(gallery: &GalleryConfig, layout: &Layout) -> Vec<String> {
    let images = layout.images().count();
    let spacers = layout.len() - images;
    let mut summary = format!(
        "{}: {} ({} grid, {}",
        gallery.id,
        gallery.title,
        layout.system(),
        plural(images, "image")
    );
    if spacers > 0 {
        summary.push_str(&format!(", {}", plural(spacers, "spacer")));
    }
    summary.push(')');

    let mut lines = vec![summary];
    let mut position = 0;
    for (index, tile) in layout.tiles().iter().enumerate() {
        match tile {
            Tile::Image(image) => {
                position += 1;
                let label = layout.size_of(index).map(|s| s.label()).unwrap_or("?");
                lines.push(format!("{} {} [{}]", format_index(position), image.id, label));
                lines.push(format!("{}Source: {}", indent(1), image.src));
                if let Some(crop) = image.crop() {
                    lines.push(format!("{}Crop: {}", indent(1), crop.to_css()));
                }
            }
            Tile::Spacer(spacer) => {
                lines.push(format!(
                    "{}--- spacer {}x{}",
                    indent(1),
                    spacer.cols,
                    spacer.rows
                ));
            }
        }
    }
    lines
}

pub fn print_layout(gallery: &GalleryConfig, layout: &Layout) {
    for line in format_layout(gallery, layout) {
        println!("{}", line);
    }
}

/// Result of loading one gallery: image count or error text.
pub type CheckResult = (String, Result<usize, String>);

pub fn format_check(results: &[CheckResult]) -> Vec<String> {
    let mut lines: Vec<String> = results
        .iter()
        .map(|(id, result)| match result {
            Ok(count) => format!("{id}: {}", plural(*count, "image")),
            Err(err) => format!("{id}: ERROR {err}"),
        })
        .collect();
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    let mut footer = match results.len() {
        1 => "Checked 1 gallery".to_string(),
        n => format!("Checked {n} galleries"),
    };
    if failed > 0 {
        footer.push_str(&format!(", {failed} failed"));
    }
    lines.push(footer);
    lines
}

pub fn print_check(results: &[CheckResult]) {
    for line in format_check(results) {
        println!("{}", line);
    }
}
