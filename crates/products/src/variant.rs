use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, MAX_NAME_LEN, nullable};
use catalog_core::{BrandId, Entity, FieldErrors, ManufacturerId, ProductId, UserId, VariantId, WriteMode};

use crate::CatalogEntity;

/// Maximum SKU length.
pub const MAX_SKU_LEN: usize = 255;

/// A sellable unit of a product, identified by a globally unique SKU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub product: ProductId,
    pub manufacturer: ManufacturerId,
    pub brand: BrandId,
    pub price: f64,
    #[serde(rename = "SKU")]
    pub sku: String,
    pub stock: i32,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub user: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantInput {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub product: Option<Option<ProductId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: Option<Option<ManufacturerId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand: Option<Option<BrandId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    #[serde(rename = "SKU", default, deserialize_with = "nullable")]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub stock: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl VariantInput {
    /// The SKU as submitted, if any. Used to detect duplicates inside a batch
    /// before anything is validated against the store.
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_ref().and_then(|s| s.as_deref())
    }
}

/// Validated variant fields; `None` means "not supplied".
struct Fields {
    name: Option<String>,
    product: Option<ProductId>,
    manufacturer: Option<ManufacturerId>,
    brand: Option<BrandId>,
    price: Option<f64>,
    sku: Option<String>,
    stock: Option<i32>,
}

fn validate(input: &mut VariantInput, mode: WriteMode) -> Result<Fields, FieldErrors> {
    let mut errors = FieldErrors::new();
    let fields = Fields {
        name: fields::required_text(&mut errors, "name", input.name.take(), MAX_NAME_LEN, mode),
        product: fields::non_null(&mut errors, "product", input.product.take(), mode),
        manufacturer: fields::non_null(&mut errors, "manufacturer", input.manufacturer.take(), mode),
        brand: fields::non_null(&mut errors, "brand", input.brand.take(), mode),
        price: fields::non_null(&mut errors, "price", input.price.take(), mode),
        sku: fields::required_text(&mut errors, "SKU", input.sku.take(), MAX_SKU_LEN, mode),
        stock: fields::non_null(&mut errors, "stock", input.stock.take(), mode),
    };
    errors.into_result(fields)
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntity for Variant {
    const NAME: &'static str = "variant";
    type Input = VariantInput;

    fn create(mut input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let f = validate(&mut input, WriteMode::Full)?;

        match (f.name, f.product, f.manufacturer, f.brand, f.price, f.sku, f.stock) {
            (Some(name), Some(product), Some(manufacturer), Some(brand), Some(price), Some(sku), Some(stock)) => {
                Ok(Self {
                    id: VariantId::new(),
                    name,
                    product,
                    manufacturer,
                    brand,
                    price,
                    sku,
                    stock,
                    description: input.description.flatten(),
                    date_added: now,
                    user: owner,
                })
            }
            // Full mode reports every missing field, so this arm is not
            // reached with a complete input.
            _ => Err(FieldErrors::single("non_field_errors", "incomplete variant")),
        }
    }

    fn apply(&mut self, mut input: Self::Input, mode: WriteMode) -> Result<(), FieldErrors> {
        let f = validate(&mut input, mode)?;

        if let Some(name) = f.name {
            self.name = name;
        }
        if let Some(product) = f.product {
            self.product = product;
        }
        if let Some(manufacturer) = f.manufacturer {
            self.manufacturer = manufacturer;
        }
        if let Some(brand) = f.brand {
            self.brand = brand;
        }
        if let Some(price) = f.price {
            self.price = price;
        }
        if let Some(sku) = f.sku {
            self.sku = sku;
        }
        if let Some(stock) = f.stock {
            self.stock = stock;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        Ok(())
    }

    fn owner(&self) -> UserId {
        self.user
    }

    fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::fields::REQUIRED;
    use proptest::prelude::*;

    fn payload(sku: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "Phone X 128GB",
            "product": ProductId::new(),
            "manufacturer": ManufacturerId::new(),
            "brand": BrandId::new(),
            "price": 499.99,
            "SKU": sku,
            "stock": 12,
        })
    }

    fn input(value: serde_json::Value) -> VariantInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sku_uses_upper_case_wire_name() {
        let owner = UserId::new();
        let v = Variant::create(input(payload("PX-128")), owner, Utc::now()).unwrap();
        assert_eq!(v.sku, "PX-128");
        assert_eq!(v.owner(), owner);

        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["SKU"], "PX-128");
        assert!(json.get("sku").is_none());
        assert_eq!(json["price"], 499.99);
        assert_eq!(json["stock"], 12);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = Variant::create(VariantInput::default(), UserId::new(), Utc::now()).unwrap_err();
        for field in ["name", "product", "manufacturer", "brand", "price", "SKU", "stock"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
    }

    #[test]
    fn non_integer_stock_is_a_deserialization_error() {
        let mut value = payload("PX-128");
        value["stock"] = serde_json::json!("many");
        assert!(serde_json::from_value::<VariantInput>(value).is_err());
    }

    #[test]
    fn patch_updates_stock_only() {
        let mut v = Variant::create(input(payload("PX-128")), UserId::new(), Utc::now()).unwrap();
        v.apply(input(serde_json::json!({"stock": 3})), WriteMode::Partial).unwrap();

        assert_eq!(v.stock, 3);
        assert_eq!(v.sku, "PX-128");
        assert_eq!(v.price, 499.99);
    }

    #[test]
    fn input_exposes_submitted_sku() {
        assert_eq!(input(payload("ABC")).sku(), Some("ABC"));
        assert_eq!(VariantInput::default().sku(), None);
    }

    proptest! {
        #[test]
        fn skus_within_limit_are_accepted(sku in "[A-Z0-9-]{1,255}") {
            prop_assert!(Variant::create(input(payload(&sku)), UserId::new(), Utc::now()).is_ok());
        }

        #[test]
        fn overlong_skus_are_rejected(sku in "[A-Z0-9]{256,300}") {
            let errors = Variant::create(input(payload(&sku)), UserId::new(), Utc::now()).unwrap_err();
            prop_assert!(errors.get("SKU").is_some());
        }
    }
}
