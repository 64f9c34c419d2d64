//! Markup for the gallery grid and the clipboard exports.
//!
//! Tiles are rendered in layout order. Visual classification is derived from
//! the tile's [`TileSize`](crate::grid::TileSize) (`size-2x2`, grid spans),
//! never the other way round. Crop becomes `object-position` only when it is
//! not centred. In editor mode each tile also gets its order badge, size
//! badge and controls, spacers get corner handles, and filler slots pad the
//! last row.

use crate::gesture::Corner;
use crate::grid::{GridSystem, Orientation};
use crate::layout::{Layout, Tile};
use crate::merge::to_entries;
use crate::reflow::{Decorations, decorate};
use crate::types::GalleryConfig;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS: &str = include_str!("../static/gallery.css");

fn span_style(cols: u32, rows: u32) -> String {
    format!("grid-column: span {cols}; grid-row: span {rows};")
}

/// Data value, tooltip and button text of an orientation button.
fn orientation_label(group: Orientation) -> (&'static str, &'static str, &'static str) {
    match group {
        Orientation::Square => ("square", "Square", "S"),
        Orientation::Horizontal => ("horizontal", "Landscape", "H"),
        Orientation::Vertical => ("vertical", "Portrait", "V"),
    }
}

/// The gallery grid. `decorations` switches on editor mode.
pub fn render_grid(layout: &Layout, decorations: Option<&Decorations>) -> Markup {
    let system = layout.system();
    let editing = decorations.is_some();
    let mut class = format!("gallery-grid grid-{system}");
    if editing {
        class.push_str(" editing");
    }
    html! {
        section class=(class) {
            @for (index, tile) in layout.tiles().iter().enumerate() {
                @let (cols, rows) = tile.span(system);
                @match tile {
                    Tile::Image(image) => {
                        @let size = layout.size_of(index).unwrap_or(system.default_size());
                        figure.tile.image.(size.css_class())
                            style=(span_style(cols, rows))
                            data-id=(image.id)
                            data-index=(index)
                        {
                            img src=(image.src)
                                alt=(image.alt)
                                loading="lazy"
                                style=[image.crop().map(|c| format!("object-position: {};", c.to_css()))];
                            @if let Some(decorations) = decorations {
                                @if let Some(Some(position)) = decorations.order.get(index) {
                                    span.order-badge { (position) }
                                }
                                @if let Some(Some(badge)) = decorations.badges.get(index) {
                                    span.size-badge style={ "background:" (badge.color) } { (badge.label) }
                                }
                                (tile_controls(system, index))
                            }
                        }
                    }
                    Tile::Spacer(_) => {
                        div.tile.spacer style=(span_style(cols, rows)) data-index=(index) {
                            @if editing {
                                @for corner in Corner::ALL {
                                    div.handle.(corner.css_class()) data-index=(index) {}
                                }
                                div.tile-controls {
                                    button.delete type="button" data-index=(index) title="Remove" { "×" }
                                }
                            }
                        }
                    }
                }
            }
            @if let Some(decorations) = decorations {
                @for _ in 0..decorations.fillers {
                    div.filler aria-hidden="true" {}
                }
            }
        }
    }
}

fn tile_controls(system: GridSystem, index: usize) -> Markup {
    html! {
        div.tile-controls {
            @if system == GridSystem::Dense {
                @for group in [Orientation::Square, Orientation::Horizontal, Orientation::Vertical] {
                    @let (name, title, text) = orientation_label(group);
                    button.orient type="button" data-index=(index) data-orient=(name) title=(title) {
                        (text)
                    }
                }
            }
            button.delete type="button" data-index=(index) title="Remove" { "×" }
        }
    }
}

/// Editor view: the grid with all decorations.
pub fn render_editor(layout: &Layout) -> Markup {
    render_grid(layout, Some(&decorate(layout)))
}

fn markdown(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    out
}

/// Full-markup export: a standalone document with the current layout.
pub fn export_markup(gallery: &GalleryConfig, layout: &Layout) -> String {
    let document = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (gallery.title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                header.gallery-header {
                    h1 { (gallery.title) }
                    @if !gallery.subtitle.trim().is_empty() {
                        div.subtitle { (PreEscaped(markdown(&gallery.subtitle))) }
                    }
                }
                (render_grid(layout, None))
            }
        }
    };
    document.into_string()
}

/// JSON export in the gallery image-entry shape.
pub fn export_json(layout: &Layout) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_entries(layout))
}
