//! The rendering session: everything one open image accumulates.

use std::collections::BTreeSet;

use planview_raster::Surface;
use serde_json::Value;

use crate::class_colors::{ClassColor, ClassColorRegistry};
use crate::error::{NormalizeError, NormalizeIssue};
use crate::normalize::normalize;
use crate::render::{ClassMap, RenderOptions, RenderStyle, render};
use crate::roi::{DimensionAreas, RoiTransform};
use crate::visibility::VisibilityState;

/// One row of the class toggle list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    pub name: String,
    pub count: usize,
    pub color: ClassColor,
    pub visible: bool,
}

/// Owns the transform, dimension areas, class colors, the current
/// annotation set and the display toggles for one image.
///
/// Separate sessions share nothing, so an image view and an alternate view
/// can run side by side.
#[derive(Debug)]
pub struct RenderSession {
    transform: RoiTransform,
    dimension_areas: DimensionAreas,
    colors: ClassColorRegistry,
    classes: ClassMap,
    visibility: VisibilityState,
    content_size: Option<(u32, u32)>,
    options: RenderOptions,
    style: RenderStyle,
    issues: Vec<NormalizeIssue>,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSession {
    pub fn new() -> Self {
        Self::with_colors(ClassColorRegistry::new())
    }

    /// A session whose class colors come from a seeded generator.
    pub fn with_color_seed(seed: u64) -> Self {
        Self::with_colors(ClassColorRegistry::with_seed(seed))
    }

    fn with_colors(colors: ClassColorRegistry) -> Self {
        Self {
            transform: RoiTransform::identity(),
            dimension_areas: DimensionAreas::new(),
            colors,
            classes: ClassMap::new(),
            visibility: VisibilityState::new(),
            content_size: None,
            options: RenderOptions::default(),
            style: RenderStyle::default(),
            issues: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Begin a new image. Transforms, annotations and toggles are reset;
    /// class colors are kept.
    pub fn start_image(&mut self, width: u32, height: u32) {
        self.transform = RoiTransform::identity();
        self.dimension_areas.clear();
        self.classes.clear();
        self.visibility = VisibilityState::new();
        self.issues.clear();
        self.content_size = Some((width, height));
    }

    /// Normalize a parsed detection file and make its objects the current
    /// annotation set.
    ///
    /// A crop manifest always replaces the dimension areas; one with a usable
    /// background also replaces the transform and the content size. On error
    /// nothing changes.
    pub fn ingest(&mut self, file_name: &str, json: &Value) -> Result<&ClassMap, NormalizeError> {
        let outcome = normalize(
            file_name,
            json,
            &self.transform,
            &self.dimension_areas,
            &mut self.colors,
        )?;

        if let Some(transform) = outcome.updated_transform {
            self.transform = transform;
            if let Some(size) = transform.original_size() {
                self.content_size = Some(size);
            }
        }
        if let Some(areas) = outcome.updated_dimension_areas {
            log::debug!("{}: {} dimension area(s)", file_name, areas.len());
            self.dimension_areas = areas;
        }

        let mut classes = ClassMap::new();
        for object in outcome.objects {
            classes.entry(object.class.clone()).or_default().push(object);
        }
        self.classes = classes;
        self.issues = outcome.issues;

        log::info!(
            "Loaded {} with {} class(es)",
            file_name,
            self.classes.len()
        );
        Ok(&self.classes)
    }

    pub fn transform(&self) -> &RoiTransform {
        &self.transform
    }

    pub fn dimension_areas(&self) -> &DimensionAreas {
        &self.dimension_areas
    }

    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    pub fn colors(&self) -> &ClassColorRegistry {
        &self.colors
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    /// Problems reported by the last successful ingest.
    pub fn issues(&self) -> &[NormalizeIssue] {
        &self.issues
    }

    /// Size of the canvas annotations are drawn in, when known.
    pub fn content_size(&self) -> Option<(u32, u32)> {
        self.content_size
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Classes in name order with object counts.
    pub fn class_summaries(&self) -> Vec<ClassSummary> {
        self.classes
            .iter()
            .map(|(name, objects)| ClassSummary {
                name: name.clone(),
                count: objects.len(),
                color: self
                    .colors
                    .get(name)
                    .or_else(|| objects.first().map(|o| o.color))
                    .unwrap_or_else(|| ClassColor::from_hue(0.0)),
                visible: self.visibility.is_class_visible(name),
            })
            .collect()
    }

    /// Distinct dimension indices present in the current annotations.
    pub fn dimension_indices(&self) -> Vec<i64> {
        self.classes
            .values()
            .flatten()
            .filter(|o| o.is_dimension_text())
            .filter_map(|o| o.crop_idx())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns true if the index is now hidden.
    pub fn toggle_dimension_index(&mut self, idx: i64) -> bool {
        self.visibility.toggle_dimension(idx)
    }

    pub fn set_dimension_hidden(&mut self, idx: i64, hidden: bool) {
        self.visibility.set_dimension_hidden(idx, hidden);
    }

    pub fn set_class_visible(&mut self, class: &str, visible: bool) {
        self.visibility.set_class_visible(class, visible);
    }

    pub fn set_show_labels(&mut self, show: bool) {
        self.options.show_labels = show;
    }

    pub fn set_show_key_points(&mut self, show: bool) {
        self.options.show_key_points = show;
    }

    /// Draw the current annotations. Returns the number of filled polygons.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, zoom: f32) -> usize {
        render(
            surface,
            &self.classes,
            &self.visibility,
            zoom,
            self.options,
            &self.style,
        )
    }
}
