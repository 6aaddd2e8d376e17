use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::ProductError;
use crate::money::Rupiah;

/// Mean Earth radius used for distances, in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Product category.
///
/// Unknown category names read from the store fall back to
/// [`Category::Lainnya`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "Sayur Daun")]
    SayurDaun,
    #[serde(rename = "Sayur Akar")]
    SayurAkar,
    #[serde(rename = "Sayur Buah")]
    SayurBuah,
    Buah,
    Rempah,
    #[serde(rename = "Umbi-umbian")]
    UmbiUmbian,
    Bibit,
    #[serde(other)]
    Lainnya,
}

impl Category {
    /// Returns the display name, which is also the stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SayurDaun => "Sayur Daun",
            Category::SayurAkar => "Sayur Akar",
            Category::SayurBuah => "Sayur Buah",
            Category::Buah => "Buah",
            Category::Rempah => "Rempah",
            Category::UmbiUmbian => "Umbi-umbian",
            Category::Bibit => "Bibit",
            Category::Lainnya => "Lainnya",
        }
    }

    /// Typical delivery time for produce of this category.
    pub fn default_shipping_estimate(&self) -> &'static str {
        match self {
            Category::SayurDaun => "Maksimal 1 Hari (Wajib Instan)",
            Category::SayurBuah => "1-2 Hari",
            Category::Rempah | Category::UmbiUmbian => "2-3 Hari",
            Category::Bibit => "3-5 Hari",
            _ => "2-3 Hari",
        }
    }

    /// Seedlings are sold per piece, everything else by weight.
    pub fn default_unit(&self) -> &'static str {
        match self {
            Category::Bibit => "Pcs",
            _ => "kg",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery reach of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShippingRange {
    /// Nearby buyers, instant courier.
    #[default]
    Dekat,
    /// Regular courier.
    Jauh,
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// A product listed by a farmer.
///
/// Cart lines and order items reuse this record as a snapshot, with the
/// purchased quantity stored in `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub farmer_id: UserId,
    pub name: String,
    pub price: Rupiah,
    pub stock: i64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shipping_range: ShippingRange,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub shipping_estimate: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub location_label: String,
    #[serde(default)]
    pub full_address: String,
}

impl Product {
    /// Creates a listing with the required fields; the rest start empty.
    pub fn new(
        farmer_id: impl Into<UserId>,
        name: impl Into<String>,
        price: Rupiah,
        stock: i64,
        category: Category,
    ) -> Self {
        Self {
            id: ProductId::default(),
            farmer_id: farmer_id.into(),
            name: name.into(),
            price,
            stock,
            image_urls: Vec::new(),
            category,
            description: String::new(),
            shipping_range: ShippingRange::default(),
            store_name: String::new(),
            unit: String::new(),
            shipping_estimate: String::new(),
            lat: 0.0,
            lng: 0.0,
            location_label: String::new(),
            full_address: String::new(),
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.lat = location.lat;
        self.lng = location.lng;
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// The stored shipping estimate, or the category default when empty.
    pub fn effective_shipping_estimate(&self) -> &str {
        if self.shipping_estimate.is_empty() {
            self.category.default_shipping_estimate()
        } else {
            &self.shipping_estimate
        }
    }

    /// The stored unit label, or the category default when empty.
    pub fn effective_unit(&self) -> &str {
        if self.unit.is_empty() {
            self.category.default_unit()
        } else {
            &self.unit
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::NameRequired);
        }
        if self.price.is_negative() {
            return Err(ProductError::InvalidPrice { price: self.price });
        }
        if self.stock < 0 {
            return Err(ProductError::InvalidStock { stock: self.stock });
        }
        Ok(())
    }
}

/// The farmer-editable fields of a product.
///
/// Identity and ownership never change through an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Rupiah,
    pub stock: i64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shipping_range: ShippingRange,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub shipping_estimate: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub location_label: String,
    #[serde(default)]
    pub full_address: String,
}

impl ProductUpdate {
    /// Applies the edit on top of an existing product.
    pub fn apply_to(self, product: &Product) -> Product {
        Product {
            id: product.id.clone(),
            farmer_id: product.farmer_id.clone(),
            name: self.name,
            price: self.price,
            stock: self.stock,
            image_urls: self.image_urls,
            category: self.category,
            description: self.description,
            shipping_range: self.shipping_range,
            store_name: self.store_name,
            unit: self.unit,
            shipping_estimate: self.shipping_estimate,
            lat: self.lat,
            lng: self.lng,
            location_label: self.location_label,
            full_address: self.full_address,
        }
    }
}

impl From<Product> for ProductUpdate {
    fn from(p: Product) -> Self {
        Self {
            name: p.name,
            price: p.price,
            stock: p.stock,
            image_urls: p.image_urls,
            category: p.category,
            description: p.description,
            shipping_range: p.shipping_range,
            store_name: p.store_name,
            unit: p.unit,
            shipping_estimate: p.shipping_estimate,
            lat: p.lat,
            lng: p.lng,
            location_label: p.location_label,
            full_address: p.full_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_estimate_falls_back_to_category() {
        let mut p = Product::new("f-1", "Bayam", Rupiah::new(5_000), 10, Category::SayurDaun);
        assert_eq!(p.effective_shipping_estimate(), "Maksimal 1 Hari (Wajib Instan)");

        p.category = Category::SayurBuah;
        assert_eq!(p.effective_shipping_estimate(), "1-2 Hari");
        p.category = Category::UmbiUmbian;
        assert_eq!(p.effective_shipping_estimate(), "2-3 Hari");
        p.category = Category::Bibit;
        assert_eq!(p.effective_shipping_estimate(), "3-5 Hari");
        p.category = Category::Buah;
        assert_eq!(p.effective_shipping_estimate(), "2-3 Hari");

        p.shipping_estimate = "Besok".to_string();
        assert_eq!(p.effective_shipping_estimate(), "Besok");
    }

    #[test]
    fn test_unit_falls_back_to_category() {
        let mut p = Product::new("f-1", "Cabai", Rupiah::new(5_000), 10, Category::Rempah);
        assert_eq!(p.effective_unit(), "kg");
        p.category = Category::Bibit;
        assert_eq!(p.effective_unit(), "Pcs");
        p.unit = "Ikat".to_string();
        assert_eq!(p.effective_unit(), "Ikat");
    }

    #[test]
    fn test_category_serializes_display_name() {
        let json = serde_json::to_string(&Category::SayurDaun).unwrap();
        assert_eq!(json, "\"Sayur Daun\"");

        let parsed: Category = serde_json::from_str("\"Umbi-umbian\"").unwrap();
        assert_eq!(parsed, Category::UmbiUmbian);

        let unknown: Category = serde_json::from_str("\"Jamur\"").unwrap();
        assert_eq!(unknown, Category::Lainnya);
    }

    #[test]
    fn test_haversine_distance() {
        let yogyakarta = GeoPoint::new(-7.7956, 110.3695);
        let jakarta = GeoPoint::new(-6.2088, 106.8456);
        let d = yogyakarta.distance_km(&jakarta);
        assert!((d - 427.0).abs() < 5.0, "got {d}");
        assert_eq!(jakarta.distance_km(&jakarta), 0.0);
    }

    #[test]
    fn test_validate() {
        let ok = Product::new("f-1", "Bayam", Rupiah::new(5_000), 0, Category::SayurDaun);
        assert!(ok.validate().is_ok());

        let mut bad = ok.clone();
        bad.name = "  ".to_string();
        assert!(matches!(bad.validate(), Err(ProductError::NameRequired)));

        let mut bad = ok.clone();
        bad.stock = -1;
        assert!(matches!(bad.validate(), Err(ProductError::InvalidStock { .. })));
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"farmer_id":"f-1","name":"Bayam","price":5000,"stock":3}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(p.id.is_empty());
        assert_eq!(p.category, Category::SayurDaun);
        assert_eq!(p.shipping_range, ShippingRange::Dekat);
    }
}
