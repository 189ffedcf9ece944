//! Image and form placement wrappers.

use std::cell::OnceCell;

use smol_str::SmolStr;

use crate::model::context::XObject;
use crate::model::objects::InlineImage;
use crate::utils::{Matrix, Rect, apply_matrix_rect, mult_matrix};

const UNIT_SQUARE: Rect = (0.0, 0.0, 1.0, 1.0);

/// View over one `Do` invocation.
#[derive(Debug, Clone)]
pub struct XObjectWrapper<'a> {
    name: SmolStr,
    xobject: &'a XObject,
    ctm: Matrix,
    bbox: OnceCell<Rect>,
}

impl<'a> XObjectWrapper<'a> {
    pub fn new(name: SmolStr, xobject: &'a XObject, ctm: Matrix) -> Self {
        Self {
            name,
            xobject,
            ctm,
            bbox: OnceCell::new(),
        }
    }

    /// Resource name the object was invoked by.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xobject(&self) -> &'a XObject {
        self.xobject
    }

    pub fn is_form(&self) -> bool {
        matches!(self.xobject, XObject::Form(_))
    }

    /// CTM in effect at the invocation.
    pub fn ctm(&self) -> Matrix {
        self.ctm
    }

    /// Device box: the form bbox through the form matrix, or the image unit square.
    pub fn bbox(&self) -> Rect {
        *self.bbox.get_or_init(|| match self.xobject {
            XObject::Form(form) => apply_matrix_rect(mult_matrix(form.matrix, self.ctm), form.bbox),
            XObject::Image(_) => apply_matrix_rect(self.ctm, UNIT_SQUARE),
        })
    }
}

/// View over one inline image.
#[derive(Debug, Clone)]
pub struct InlineImageWrapper {
    image: InlineImage,
    ctm: Matrix,
    bbox: OnceCell<Rect>,
}

impl InlineImageWrapper {
    pub fn new(image: &InlineImage, ctm: Matrix) -> Self {
        Self {
            image: image.clone(),
            ctm,
            bbox: OnceCell::new(),
        }
    }

    pub fn image(&self) -> &InlineImage {
        &self.image
    }

    /// Pixel size (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn ctm(&self) -> Matrix {
        self.ctm
    }

    pub fn bbox(&self) -> Rect {
        *self
            .bbox
            .get_or_init(|| apply_matrix_rect(self.ctm, UNIT_SQUARE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::context::{FormXObject, ImageXObject};
    use bytes::Bytes;

    #[test]
    fn test_form_box_goes_through_form_matrix() {
        let form = XObject::Form(
            FormXObject::new((0.0, 0.0, 10.0, 20.0), vec![])
                .with_matrix((2.0, 0.0, 0.0, 2.0, 5.0, 0.0)),
        );
        let wrapper = XObjectWrapper::new("Fm0".into(), &form, (1.0, 0.0, 0.0, 1.0, 0.0, 100.0));
        assert!(wrapper.is_form());
        assert_eq!(wrapper.bbox(), (5.0, 100.0, 25.0, 140.0));
    }

    #[test]
    fn test_image_box_is_unit_square_through_ctm() {
        let image = XObject::Image(ImageXObject {
            width: 4,
            height: 4,
            bits_per_component: 8,
            color_space: Some("DeviceGray".into()),
            data: Bytes::from_static(&[0; 16]),
        });
        let wrapper = XObjectWrapper::new("Im0".into(), &image, (50.0, 0.0, 0.0, 30.0, 10.0, 10.0));
        assert_eq!(wrapper.bbox(), (10.0, 10.0, 60.0, 40.0));
    }
}
