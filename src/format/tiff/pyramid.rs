//! Overview pyramid: image directories and their validity masks.
//!
//! # Structure
//!
//! A COG stores the full-resolution image first, followed by progressively
//! smaller overviews. GDAL-style internal masks add one deflate-compressed
//! directory per level. Directories are split into two lists in walk order:
//!
//! - **images**: index 0 is full resolution, index N is overview N
//! - **masks**: index N is the mask of overview N
//!
//! A file whose only directories are deflate-compressed is a plain deflate
//! TIFF rather than an image with masks, so the masks are promoted to images.

use tracing::warn;

use crate::error::TiffError;

use super::ifd::Ifd;
use super::image::ImageDescriptor;
use super::parser::ByteOrder;

// =============================================================================
// OverviewPyramid
// =============================================================================

/// Image and mask descriptors of a COG, in directory order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewPyramid {
    /// Image directories (0 = full resolution)
    pub images: Vec<ImageDescriptor>,

    /// Mask directories, aligned with `images` by overview index
    pub masks: Vec<ImageDescriptor>,
}

impl OverviewPyramid {
    /// Classify every parsed IFD as image or mask.
    ///
    /// Fails on the first directory whose descriptor cannot be built.
    pub fn from_ifds(ifds: &[Ifd], byte_order: ByteOrder) -> Result<Self, TiffError> {
        let mut images = Vec::new();
        let mut masks = Vec::new();

        for (ifd_index, ifd) in ifds.iter().enumerate() {
            let descriptor = ImageDescriptor::from_ifd(ifd, ifd_index, byte_order)?;
            if descriptor.is_mask() {
                masks.push(descriptor);
            } else {
                images.push(descriptor);
            }
        }

        if images.is_empty() && !masks.is_empty() {
            warn!(
                count = masks.len(),
                "no image directories found, serving mask directories as images"
            );
            images = std::mem::take(&mut masks);
        }

        Ok(OverviewPyramid { images, masks })
    }

    /// Number of addressable overviews.
    #[inline]
    pub fn overview_count(&self) -> usize {
        self.images.len()
    }

    /// Image descriptor of `overview`.
    pub fn image(&self, overview: usize) -> Option<&ImageDescriptor> {
        self.images.get(overview)
    }

    /// Mask descriptor of `overview`, if the file has one.
    pub fn mask(&self, overview: usize) -> Option<&ImageDescriptor> {
        self.masks.get(overview)
    }
}

// =============================================================================
// Tests
// =============================================================================
