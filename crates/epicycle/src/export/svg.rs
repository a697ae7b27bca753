//! SVG export of a laid-out system tree.
//!
//! Each system draws as a named rectangle centered on its position, with
//! its boundary circles when configured. Interactions draw as labeled
//! arrows clipped to the endpoint rectangles; endpoints are resolved by
//! name anywhere in the tree, and unresolvable interactions are silently
//! skipped.

use std::{fs::File, io::Write as _};

use log::{debug, info};
use svg::{
    Document,
    node::element::{Circle, Line, Polygon, Rectangle, Text},
};

use epicycle_core::geometry::{Point, Size};

use crate::{error::EpicycleError, system::System};

const BOX_FILL: &str = "#c8c8c8";
const ROOT_BOX_FILL: &str = "#b4b4fa";
const NAME_FONT_SIZE: f32 = 14.0;
const LABEL_FONT_SIZE: f32 = 12.0;
const ARROW_HEAD_LENGTH: f32 = 10.0;
const ARROW_HEAD_HALF_ANGLE: f32 = std::f32::consts::PI / 6.0;

/// SVG exporter writing to a file path.
pub struct Svg {
    file_name: String,
}

impl Svg {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    /// Renders the tree and writes the SVG document to the file.
    ///
    /// The caller is expected to have shifted the tree into non-negative
    /// coordinates with the given margin; the document's viewport extends
    /// to the tree's bounding box plus that margin.
    pub fn export(&self, root: &System, margin: f32) -> Result<(), EpicycleError> {
        let doc = render_document(root, margin);
        debug!("SVG document rendered");

        info!(file_name = self.file_name; "Creating SVG file");
        let mut file = File::create(&self.file_name)?;
        write!(file, "{doc}")?;

        Ok(())
    }
}

/// Renders the whole tree into an SVG document.
pub fn render_document(root: &System, margin: f32) -> Document {
    let bounds = root.bounding_box();
    let width = bounds.max_x() + margin;
    let height = bounds.max_y() + margin;

    let doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));

    render_system(doc, root, root, true)
}

/// Draws one system's rectangle, name, and boundary circles, then its
/// subsystems, then its interaction arrows (so arrows sit on top).
fn render_system(mut doc: Document, system: &System, root: &System, is_root: bool) -> Document {
    let bounds = system.position().to_bounds(system.size());

    doc = doc.add(
        Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("fill", if is_root { ROOT_BOX_FILL } else { BOX_FILL })
            .set("stroke", "black")
            .set("stroke-width", 2),
    );
    doc = doc.add(centered_text(
        system.name(),
        system.position(),
        NAME_FONT_SIZE,
    ));

    if let Some(radius) = system.outer_boundary_radius() {
        doc = doc.add(boundary_circle(system.position(), radius, "blue"));
    }
    if let Some(radius) = system.inner_boundary_radius() {
        doc = doc.add(boundary_circle(system.position(), radius, "red"));
    }

    for sub in system.subsystems() {
        doc = render_system(doc, sub, root, false);
    }

    for interaction in system.interactions() {
        let (Some(source), Some(dest)) =
            (root.find(interaction.source()), root.find(interaction.dest()))
        else {
            debug!(
                source = interaction.source(),
                dest = interaction.dest();
                "Skipping interaction with unresolvable endpoint"
            );
            continue;
        };

        let direction = dest.position().sub_point(source.position());
        let start = edge_point(source.position(), source.size(), direction);
        let end = edge_point(dest.position(), dest.size(), direction.scale(-1.0));
        doc = render_arrow(doc, start, end, &interaction.label());
    }

    doc
}

/// The point where the line from a rectangle's center along `direction`
/// crosses the rectangle's border. Returns the center itself when the
/// direction vector is zero.
pub fn edge_point(center: Point, size: Size, direction: Point) -> Point {
    if direction.is_zero() {
        return center;
    }

    let half_width = size.width() / 2.0;
    let half_height = size.height() / 2.0;

    let scale = if direction.x() == 0.0 {
        half_height / direction.y().abs()
    } else if direction.y() == 0.0 {
        half_width / direction.x().abs()
    } else {
        (half_width / direction.x().abs()).min(half_height / direction.y().abs())
    };

    center.add_point(direction.scale(scale))
}

/// Draws an arrow from `start` to `end` with a filled triangular head at
/// the destination and the label at the midpoint.
fn render_arrow(doc: Document, start: Point, end: Point, label: &str) -> Document {
    let line = Line::new()
        .set("x1", start.x())
        .set("y1", start.y())
        .set("x2", end.x())
        .set("y2", end.y())
        .set("stroke", "black")
        .set("stroke-width", 2);

    let rotation = (end.y() - start.y()).atan2(end.x() - start.x());
    let left = Point::new(
        end.x() - ARROW_HEAD_LENGTH * (rotation - ARROW_HEAD_HALF_ANGLE).cos(),
        end.y() - ARROW_HEAD_LENGTH * (rotation - ARROW_HEAD_HALF_ANGLE).sin(),
    );
    let right = Point::new(
        end.x() - ARROW_HEAD_LENGTH * (rotation + ARROW_HEAD_HALF_ANGLE).cos(),
        end.y() - ARROW_HEAD_LENGTH * (rotation + ARROW_HEAD_HALF_ANGLE).sin(),
    );
    let head = Polygon::new()
        .set(
            "points",
            format!(
                "{},{} {},{} {},{}",
                end.x(),
                end.y(),
                left.x(),
                left.y(),
                right.x(),
                right.y()
            ),
        )
        .set("fill", "black");

    doc.add(line)
        .add(head)
        .add(centered_text(label, start.midpoint(end), LABEL_FONT_SIZE))
}

fn boundary_circle(center: Point, radius: f32, stroke: &str) -> Circle {
    Circle::new()
        .set("cx", center.x())
        .set("cy", center.y())
        .set("r", radius)
        .set("fill", "none")
        .set("stroke", stroke)
        .set("stroke-width", 2)
}

fn centered_text(content: &str, center: Point, font_size: f32) -> Text {
    Text::new(content)
        .set("x", center.x())
        .set("y", center.y())
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central")
        .set("font-family", "sans-serif")
        .set("font-size", font_size)
        .set("fill", "black")
}
