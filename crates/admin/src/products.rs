//! Product forms: create, edit and image payloads.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use robe_core::{Category, CouponCodeError, EmailError, Gender, Price, Product, Swatch, UnknownLabel};
use serde::Serialize;
use thiserror::Error;

/// Largest image accepted for upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Problems with an admin form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    /// No image URL: the upload failed or was never attempted.
    #[error("an image is required; upload one first")]
    MissingImage,

    #[error("invalid price {0:?}")]
    InvalidPrice(String),

    #[error(transparent)]
    UnknownLabel(#[from] UnknownLabel),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("invalid coupon code: {0}")]
    InvalidCouponCode(#[from] CouponCodeError),

    #[error("discount must be greater than zero")]
    NonPositiveDiscount,

    #[error("unsupported image type {0:?} (expected jpg, png, webp or gif)")]
    UnsupportedImage(String),

    #[error("image is too large ({0} bytes)")]
    ImageTooLarge(usize),

    #[error("could not read {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a strictly positive price typed into a form.
pub(crate) fn parse_positive_price(raw: &str) -> Result<Price, FormError> {
    let price: Price = raw
        .trim()
        .parse()
        .map_err(|_| FormError::InvalidPrice(raw.trim().to_string()))?;
    if price.is_zero() {
        return Err(FormError::InvalidPrice(raw.trim().to_string()));
    }
    Ok(price)
}

fn required(name: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField(name));
    }
    Ok(value.to_string())
}

/// Body of a product creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Swatch>,
    pub image: String,
}

/// The "add product" form as typed by an admin.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub gender: Option<String>,
    pub color: Option<String>,
    /// URL returned by the image upload. Stays `None` when the upload fails.
    pub image: Option<String>,
}

impl ProductForm {
    /// Check every field and produce the request body.
    ///
    /// # Errors
    ///
    /// Returns the first problem found; a missing image is reported as
    /// [`FormError::MissingImage`].
    pub fn validate(&self) -> Result<NewProduct, FormError> {
        let name = required("name", &self.name)?;
        let price = parse_positive_price(&self.price)?;
        let category: Category = required("category", &self.category)?.parse()?;
        let gender: Option<Gender> = non_blank(self.gender.as_deref()).map(str::parse).transpose()?;
        let color: Option<Swatch> = non_blank(self.color.as_deref()).map(str::parse).transpose()?;
        let image = non_blank(self.image.as_deref())
            .ok_or(FormError::MissingImage)?
            .to_string();

        Ok(NewProduct {
            name,
            price,
            description: self.description.trim().to_string(),
            category,
            gender,
            color,
            image,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Body of a product edit request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub image: String,
}

impl ProductUpdate {
    /// Start from the product's current values.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }

    /// Apply the fields an admin changed.
    ///
    /// # Errors
    ///
    /// Returns an error for blank names, non-positive prices, unknown
    /// categories or blank image URLs.
    pub fn with_changes(
        mut self,
        name: Option<&str>,
        price: Option<&str>,
        category: Option<&str>,
        image: Option<&str>,
    ) -> Result<Self, FormError> {
        if let Some(name) = name {
            self.name = required("name", name)?;
        }
        if let Some(price) = price {
            self.price = parse_positive_price(price)?;
        }
        if let Some(category) = category {
            self.category = category.parse::<Category>()?.as_str().to_string();
        }
        if let Some(image) = image {
            self.image = non_blank(Some(image)).ok_or(FormError::MissingImage)?.to_string();
        }
        Ok(self)
    }
}

/// An image ready to be sent to the upload endpoint as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime: &'static str,
    data_url: String,
    len: usize,
}

impl ImagePayload {
    /// Encode raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns `ImageTooLarge` above [`MAX_IMAGE_BYTES`].
    pub fn from_bytes(mime: &'static str, bytes: &[u8]) -> Result<Self, FormError> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge(bytes.len()));
        }
        Ok(Self {
            mime,
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            len: bytes.len(),
        })
    }

    /// Read and encode an image file; the type comes from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, unreadable or oversized files.
    pub fn from_file(path: &Path) -> Result<Self, FormError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mime = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => return Err(FormError::UnsupportedImage(extension)),
        };
        let read_error = |source| FormError::ImageRead {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(read_error)?.len();
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        if size > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge(size));
        }
        let bytes = std::fs::read(path).map_err(read_error)?;
        Self::from_bytes(mime, &bytes)
    }

    #[must_use]
    pub const fn mime(&self) -> &str {
        self.mime
    }

    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Size of the raw image in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use robe_core::ProductId;

    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: " Silk Panjabi ".into(),
            price: "3200".into(),
            description: "Festive wear".into(),
            category: "Panjabi".into(),
            gender: Some("men".into()),
            color: Some("".into()),
            image: Some("https://cdn.example.com/panjabi.jpg".into()),
        }
    }

    #[test]
    fn test_valid_form() {
        let product = form().validate().unwrap();
        assert_eq!(product.name, "Silk Panjabi");
        assert_eq!(product.category, Category::Panjabi);
        assert_eq!(product.gender, Some(Gender::Men));
        assert_eq!(product.color, None);

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["category"], "panjabi");
        assert_eq!(json["price"], 3200);
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_failed_upload_blocks_submission() {
        let mut form = form();
        form.image = None;
        assert!(matches!(form.validate(), Err(FormError::MissingImage)));
        form.image = Some("  ".into());
        assert!(matches!(form.validate(), Err(FormError::MissingImage)));
    }

    #[test]
    fn test_form_field_errors() {
        let mut bad = form();
        bad.name = String::new();
        assert!(matches!(bad.validate(), Err(FormError::MissingField("name"))));

        let mut bad = form();
        bad.price = "0".into();
        assert!(matches!(bad.validate(), Err(FormError::InvalidPrice(_))));

        let mut bad = form();
        bad.category = "shoes".into();
        assert!(matches!(bad.validate(), Err(FormError::UnknownLabel(_))));

        let mut bad = form();
        bad.color = Some("teal".into());
        assert!(matches!(bad.validate(), Err(FormError::UnknownLabel(_))));
    }

    #[test]
    fn test_update_applies_changes() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Tote".into(),
            price: Price::from_taka(900),
            category: "bag".into(),
            gender: None,
            color: None,
            image: "https://cdn.example.com/tote.jpg".into(),
            description: String::new(),
        };
        let update = ProductUpdate::from_product(&product)
            .with_changes(None, Some("950"), Some("BAG"), None)
            .unwrap();
        assert_eq!(update.name, "Tote");
        assert_eq!(update.price, Price::from_taka(950));
        assert_eq!(update.category, "bag");

        assert!(
            ProductUpdate::from_product(&product)
                .with_changes(Some(" "), None, None, None)
                .is_err()
        );
    }

    #[test]
    fn test_image_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swatch.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let image = ImagePayload::from_file(&path).unwrap();
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.len(), 4);
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw==");

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, "hi").unwrap();
        assert!(matches!(
            ImagePayload::from_file(&other),
            Err(FormError::UnsupportedImage(_))
        ));
        assert!(matches!(
            ImagePayload::from_file(&dir.path().join("missing.jpg")),
            Err(FormError::ImageRead { .. })
        ));
    }

    #[test]
    fn test_oversized_image_file_rejected_by_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES as u64 + 1).unwrap();

        assert!(matches!(
            ImagePayload::from_file(&path),
            Err(FormError::ImageTooLarge(size)) if size == MAX_IMAGE_BYTES + 1
        ));
    }
}
