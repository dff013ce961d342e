use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3};

bitflags! {
    /// Change signals published by [`Drawable::update`] for the current frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrawableState: u32 {
        const TRANSFORM_CHANGED = 1 << 0;
        const OPACITY_CHANGED   = 1 << 1;
        const RGB_CHANGED       = 1 << 2;
        const VISIBLE_CHANGED   = 1 << 3;
    }
}

/// Linear RGBA blend color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Per-fragment (and per-aggregate) transform/color state.
///
/// Setters only record what changed; nothing is visible to the packed buffer
/// until [`update`](Self::update) runs at the start of a frame. `update`
/// refreshes the cached model matrix and publishes the accumulated change
/// flags, which stay readable until the next `update` clears them.
#[derive(Debug, Clone)]
pub struct Drawable {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    color: Color,
    visible: bool,
    model_matrix: Mat4,
    pending: DrawableState,
    frame: DrawableState,
}

impl Default for Drawable {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            color: Color::WHITE,
            visible: true,
            model_matrix: Mat4::IDENTITY,
            pending: DrawableState::empty(),
            frame: DrawableState::empty(),
        }
    }
}

impl Drawable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Model matrix as of the last [`update`](Self::update).
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn is_drawn(&self) -> bool {
        self.visible
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.pending |= DrawableState::TRANSFORM_CHANGED;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.pending |= DrawableState::TRANSFORM_CHANGED;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.pending |= DrawableState::TRANSFORM_CHANGED;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.color.a = opacity;
        self.pending |= DrawableState::OPACITY_CHANGED;
    }

    pub fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.color.r = r;
        self.color.g = g;
        self.color.b = b;
        self.pending |= DrawableState::RGB_CHANGED;
    }

    pub fn set_color(&mut self, color: Color) {
        self.set_rgb(color.r, color.g, color.b);
        self.set_opacity(color.a);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.pending |= DrawableState::VISIBLE_CHANGED;
        }
    }

    /// Forces the given signals on the next frame, whether or not the
    /// underlying state moved. Used after buffer (re)generation to make the
    /// update pass fill regions that have no born data.
    pub(crate) fn mark(&mut self, states: DrawableState) {
        self.pending |= states;
    }

    /// Per-frame state resolution: refresh the model matrix if the transform
    /// moved, then publish and clear the pending change flags.
    pub fn update(&mut self) {
        if self.pending.contains(DrawableState::TRANSFORM_CHANGED) {
            self.model_matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        }
        self.frame = self.pending;
        self.pending = DrawableState::empty();
    }

    /// True when `state` was published by the most recent update.
    pub fn check_state(&self, state: DrawableState) -> bool {
        self.frame.contains(state)
    }
}
