//! Per-vertex color.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear RGB color with `f32` components.
///
/// Importers frequently hand over RGBA; the alpha channel has no place in
/// the exported streams and is dropped on conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexColor {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl VertexColor {
    /// Create a new color from RGB components.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::VertexColor;
    ///
    /// let red = VertexColor::new(1.0, 0.0, 0.0);
    /// assert_eq!(red.r, 1.0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from an RGBA quadruple, discarding alpha.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::VertexColor;
    ///
    /// let c = VertexColor::from_rgba([0.25, 0.5, 0.75, 0.1]);
    /// assert_eq!(c.to_array(), [0.25, 0.5, 0.75]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_rgba(rgba: [f32; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2])
    }

    /// Components as `[r, g, b]`.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Black color (0, 0, 0).
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// White color (1, 1, 1).
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
}

impl Default for VertexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for VertexColor {
    fn from(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl From<[f32; 4]> for VertexColor {
    fn from(rgba: [f32; 4]) -> Self {
        Self::from_rgba(rgba)
    }
}
